//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Core types shared by the network transports.

use std::fmt;
use std::time::Duration;

/// A socket timeout held as whole seconds plus a microsecond remainder.
///
/// The split keeps fractional seconds exact at the boundary where the value
/// is handed to the OS. A zero timeout means "wait indefinitely".
///
/// # Examples
///
/// ```rust
/// use wirestream::transport::SocketTimeout;
///
/// let timeout = SocketTimeout::from_millis(9999);
/// assert_eq!(timeout.secs(), 9);
/// assert_eq!(timeout.micros(), 999_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SocketTimeout {
    secs: u64,
    micros: u32,
}

impl SocketTimeout {
    /// A timeout that never expires.
    pub const UNBOUNDED: Self = Self { secs: 0, micros: 0 };

    /// Splits a millisecond value into seconds and microseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            secs: millis / 1000,
            micros: ((millis % 1000) * 1000) as u32,
        }
    }

    /// Whole seconds component.
    pub const fn secs(&self) -> u64 {
        self.secs
    }

    /// Sub-second component in microseconds.
    pub const fn micros(&self) -> u32 {
        self.micros
    }

    /// Returns the timeout in milliseconds.
    pub const fn as_millis(&self) -> u64 {
        self.secs * 1000 + (self.micros / 1000) as u64
    }

    /// Returns `true` if this timeout never expires.
    pub const fn is_unbounded(&self) -> bool {
        self.secs == 0 && self.micros == 0
    }

    /// Converts to a [`Duration`], or `None` when unbounded.
    pub fn as_duration(&self) -> Option<Duration> {
        if self.is_unbounded() {
            None
        } else {
            Some(Duration::new(self.secs, self.micros * 1000))
        }
    }
}

impl fmt::Display for SocketTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}s", self.secs, self.micros)
    }
}

/// Splits an optional `scheme://` prefix off a host string.
///
/// A scheme is recognised only if it starts with an ASCII letter and contains
/// nothing but letters, digits, `+`, `-` and `.`.
pub(crate) fn split_scheme(host: &str) -> (Option<&str>, &str) {
    match host.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => (Some(scheme), rest),
        _ => (None, host),
    }
}

/// Returns `true` if `host` carries a recognised scheme prefix.
#[cfg(any(feature = "tls", test))]
pub(crate) fn has_scheme(host: &str) -> bool {
    split_scheme(host).0.is_some()
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
