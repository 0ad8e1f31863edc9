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

//! Byte-stream transports.
//!
//! The [`Transport`] trait is the single capability the wire encoder sees:
//! open and close a channel, read up to N bytes or exactly N bytes, write,
//! flush, and push unread bytes back. This module provides:
//!
//! - [`SocketTransport`]: blocking TCP with per-operation timeouts
//! - [`TlsSocketTransport`]: TCP wrapped in a rustls session (requires `tls` feature)
//! - [`StreamTransport`]: the process's standard input and output
//! - [`MemoryBuffer`]: an in-memory byte queue
//! - [`NullTransport`]: a sink that discards writes and refuses reads
//! - [`BufferedTransport`]: read-ahead and write-behind buffering over any of the above
//!
//! # Layering
//!
//! ```text
//!         wire encoder
//!              |
//!      BufferedTransport
//!              |
//!  +-----------+-----------+-----------+
//!  |           |           |           |
//! Socket   TlsSocket    Stream    MemoryBuffer
//! ```
//!
//! `NullTransport` and `MemoryBuffer` are leaves and never delegate.
//!
//! # Errors
//!
//! Every failure is a [`TransportError`] carrying one of four
//! [`TransportErrorKind`]s: `NotOpen`, `AlreadyOpen`, `TimedOut` or
//! `Unknown`. Timeouts are the only kind a caller may retry on the same
//! instance.
//!
//! # Examples
//!
//! ```rust
//! use wirestream::transport::{BufferedTransport, MemoryBuffer, Transport};
//!
//! # fn example() -> Result<(), wirestream::transport::TransportError> {
//! let mut transport = BufferedTransport::new(MemoryBuffer::new());
//! transport.write(b"hello")?;
//! transport.flush()?;
//! assert_eq!(transport.inner().buffer(), b"hello");
//!
//! let hello = transport.read_all(5)?;
//! assert_eq!(hello, b"hello");
//! # Ok(())
//! # }
//! ```

mod buffer;
mod buffered;
mod config;
mod error;
mod memory;
mod null;
mod pool;
mod socket;
mod stream;
#[cfg(feature = "tls")]
mod tls;
mod traits;
mod types;

pub use self::buffered::BufferedTransport;
pub use self::config::{
    BufferConfig, SocketConfig, DEFAULT_BUFFER_SIZE, DEFAULT_RECV_TIMEOUT_MS,
    DEFAULT_SEND_TIMEOUT_MS,
};
pub use self::error::{TransportError, TransportErrorKind};
pub use self::memory::MemoryBuffer;
pub use self::null::NullTransport;
pub use self::socket::{DebugHandler, Interest, Readiness, SocketStream, SocketTransport};
pub use self::stream::{
    ExecutionContext, StdioProvider, StreamMode, StreamProvider, StreamTransport, INPUT_STREAM,
    OUTPUT_STREAM, STDIN_STREAM,
};
#[cfg(feature = "tls")]
pub use self::tls::{TlsContext, TlsSocketTransport, TLS_SCHEME};
pub use self::traits::Transport;
pub use self::types::SocketTimeout;
