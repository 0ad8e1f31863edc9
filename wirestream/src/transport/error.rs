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

//! Transport layer error types.
//!
//! Every failure raised by a transport falls into one of four kinds:
//!
//! - **NotOpen**: the transport is unopened or its configuration is unusable
//! - **AlreadyOpen**: `open` was called on a transport that is already open
//! - **TimedOut**: a readiness wait exceeded the configured timeout
//! - **Unknown**: the underlying I/O primitive failed for any other reason
//!
//! Each error carries a message naming the transport, the byte count involved
//! and, for network transports, the `host:port` pair. Errors are always raised
//! to the caller; transports never retry across an error.

use std::fmt;
use std::io;
use thiserror::Error;

/// Classification of a [`TransportError`].
///
/// # Examples
///
/// ```rust
/// use wirestream::transport::{TransportError, TransportErrorKind};
///
/// let error = TransportError::not_open("Cannot open null host");
/// assert_eq!(error.kind(), TransportErrorKind::NotOpen);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Operation attempted on an unopened transport or invalid configuration.
    NotOpen,
    /// `open` called on an already-open transport.
    AlreadyOpen,
    /// A readiness wait exceeded its timeout.
    TimedOut,
    /// The underlying primitive failed for an unclassified reason.
    Unknown,
}

impl TransportErrorKind {
    /// Returns the string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotOpen => "not_open",
            Self::AlreadyOpen => "already_open",
            Self::TimedOut => "timed_out",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the transport layer.
///
/// The display form of every variant is exactly its message, so callers and
/// tests can assert on the text directly.
///
/// # Examples
///
/// ```rust
/// use wirestream::transport::TransportError;
///
/// let error = TransportError::timed_out("SocketTransport: timed out reading 5 bytes from localhost:9090");
/// assert!(error.is_recoverable());
/// assert_eq!(
///     error.to_string(),
///     "SocketTransport: timed out reading 5 bytes from localhost:9090"
/// );
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport is not open or cannot be opened with its configuration.
    #[error("{message}")]
    NotOpen {
        /// Description of the failure
        message: String,
    },

    /// The transport is already open.
    #[error("{message}")]
    AlreadyOpen {
        /// Description of the failure
        message: String,
    },

    /// A read or write readiness wait timed out.
    #[error("{message}")]
    TimedOut {
        /// Description of the failure
        message: String,
    },

    /// The underlying I/O primitive failed.
    #[error("{message}")]
    Unknown {
        /// Description of the failure
        message: String,
        /// The underlying I/O error, if available
        #[source]
        source: Option<io::Error>,
    },
}

impl TransportError {
    /// Creates a [`TransportError::NotOpen`].
    pub fn not_open(message: impl Into<String>) -> Self {
        Self::NotOpen {
            message: message.into(),
        }
    }

    /// Creates a [`TransportError::AlreadyOpen`].
    pub fn already_open(message: impl Into<String>) -> Self {
        Self::AlreadyOpen {
            message: message.into(),
        }
    }

    /// Creates a [`TransportError::TimedOut`].
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::TimedOut {
            message: message.into(),
        }
    }

    /// Creates a [`TransportError::Unknown`] without an underlying cause.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a [`TransportError::Unknown`] caused by an I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Unknown {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::NotOpen { .. } => TransportErrorKind::NotOpen,
            Self::AlreadyOpen { .. } => TransportErrorKind::AlreadyOpen,
            Self::TimedOut { .. } => TransportErrorKind::TimedOut,
            Self::Unknown { .. } => TransportErrorKind::Unknown,
        }
    }

    /// Returns the message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::NotOpen { message }
            | Self::AlreadyOpen { message }
            | Self::TimedOut { message }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// Returns `true` if retrying the operation may succeed.
    ///
    /// Timeouts are recoverable, as are I/O failures whose cause is transient
    /// (interrupted, would-block) or a refused/reset connection that a fresh
    /// `open` may fix. Configuration errors and double opens are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::TimedOut { .. } => true,
            Self::Unknown {
                source: Some(source),
                ..
            } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ),
            Self::Unknown { source: None, .. } | Self::NotOpen { .. } | Self::AlreadyOpen { .. } => {
                false
            }
        }
    }

    /// Returns `true` if the transport that raised this error should be closed.
    ///
    /// An `AlreadyOpen` error leaves a healthy transport behind, and a
    /// `NotOpen` error is raised before any handle exists. Everything else
    /// indicates the channel is in an unknown state.
    pub fn should_close_transport(&self) -> bool {
        match self {
            Self::NotOpen { .. } | Self::AlreadyOpen { .. } => false,
            Self::TimedOut { .. } => true,
            Self::Unknown { source, .. } => !matches!(
                source.as_ref().map(io::Error::kind),
                Some(io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
            ),
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        Self::Unknown {
            message: error.to_string(),
            source: Some(error),
        }
    }
}
