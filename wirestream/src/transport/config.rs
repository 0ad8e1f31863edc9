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

//! Constructor-time configuration for the transports.
//!
//! Both types deserialize with serde (behind the `serde` feature) and fill
//! omitted fields from their defaults, so they can be embedded in a larger
//! application config file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default send timeout in milliseconds.
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 100;

/// Default receive timeout in milliseconds.
pub const DEFAULT_RECV_TIMEOUT_MS: u64 = 750;

/// Default read and write buffer capacity for [`BufferedTransport`](crate::transport::BufferedTransport).
pub const DEFAULT_BUFFER_SIZE: usize = 512;

/// Endpoint configuration for a [`SocketTransport`](crate::transport::SocketTransport).
///
/// # Examples
///
/// ```rust
/// use wirestream::transport::SocketConfig;
///
/// let config = SocketConfig::new("localhost", 9090)
///     .with_persist(true)
///     .with_recv_timeout_ms(2_000);
/// assert_eq!(config.host, "localhost");
/// assert_eq!(config.send_timeout_ms, 100);
/// assert_eq!(config.recv_timeout_ms, 2_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SocketConfig {
    /// Host name or address, optionally scheme-prefixed
    pub host: String,
    /// Remote port; zero is rejected at open time
    pub port: u16,
    /// Reuse a parked connection for the same `host:port` across opens
    pub persist: bool,
    /// Send (and connect) timeout in milliseconds; zero waits indefinitely
    pub send_timeout_ms: u64,
    /// Receive timeout in milliseconds; zero waits indefinitely
    pub recv_timeout_ms: u64,
}

impl SocketConfig {
    /// Creates a configuration for `host:port` with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Sets the persistence flag.
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Sets the send timeout.
    pub fn with_send_timeout_ms(mut self, millis: u64) -> Self {
        self.send_timeout_ms = millis;
        self
    }

    /// Sets the receive timeout.
    pub fn with_recv_timeout_ms(mut self, millis: u64) -> Self {
        self.recv_timeout_ms = millis;
        self
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: 9090,
            persist: false,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            recv_timeout_ms: DEFAULT_RECV_TIMEOUT_MS,
        }
    }
}

/// Buffer capacities for a [`BufferedTransport`](crate::transport::BufferedTransport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferConfig {
    /// Size of each underlying read issued on a read-buffer miss
    pub read_buffer_size: usize,
    /// Capacity of the write buffer before a flush-through
    pub write_buffer_size: usize,
}

impl BufferConfig {
    /// Creates a configuration with explicit capacities.
    ///
    /// Capacities below one byte are raised to one.
    pub fn new(read_buffer_size: usize, write_buffer_size: usize) -> Self {
        Self {
            read_buffer_size: read_buffer_size.max(1),
            write_buffer_size: write_buffer_size.max(1),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_config_defaults() {
        let config = SocketConfig::default();
        assert_eq!(config.port, 9090);
        assert!(!config.persist);
        assert_eq!(config.send_timeout_ms, DEFAULT_SEND_TIMEOUT_MS);
        assert_eq!(config.recv_timeout_ms, DEFAULT_RECV_TIMEOUT_MS);
    }

    #[test]
    fn test_socket_config_builder() {
        let config = SocketConfig::new("example.com", 443)
            .with_persist(true)
            .with_send_timeout_ms(0);
        assert_eq!(config.host, "example.com");
        assert_eq!(config.port, 443);
        assert!(config.persist);
        assert_eq!(config.send_timeout_ms, 0);
    }

    #[test]
    fn test_buffer_config_defaults() {
        let config = BufferConfig::default();
        assert_eq!(config.read_buffer_size, 512);
        assert_eq!(config.write_buffer_size, 512);
        assert_eq!(BufferConfig::new(10, 20).write_buffer_size, 20);
    }

    #[test]
    fn test_buffer_config_rejects_zero_capacity() {
        assert_eq!(BufferConfig::new(0, 0), BufferConfig::new(1, 1));
    }
}
