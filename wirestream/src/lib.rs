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

#![doc = include_str!("../../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # Wirestream - Blocking Transports for RPC Wire Protocols
//!
//! Wirestream is the layer between an RPC wire encoder and the operating
//! system's I/O primitives. It provides:
//!
//! - **One contract**: every channel implements [`Transport`]
//! - **Sockets**: TCP with connect, send and receive timeouts
//! - **TLS**: rustls-backed sockets with native, PEM or explicit roots
//! - **Standard streams**: serve requests over the process's stdin/stdout
//! - **In-memory buffers**: deterministic peers for encoders and tests
//! - **Buffering**: read-ahead and write-behind over any transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wirestream::transport::{BufferedTransport, SocketTransport, Transport};
//!
//! # fn example() -> Result<(), wirestream::TransportError> {
//! let socket = SocketTransport::new("localhost", 9090).with_recv_timeout(2_000);
//! let mut transport = BufferedTransport::new(socket);
//!
//! transport.open()?;
//! transport.write(b"\x80\x01\x00\x01")?;
//! transport.flush()?;
//!
//! let header = transport.read_all(4)?;
//! transport.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Every operation blocks the calling thread until it completes or its
//! timeout elapses. A transport instance is owned by one caller; share work
//! across threads by giving each its own instance.
//!
//! ## Features
//!
//! - **`serde`** (default): `Serialize`/`Deserialize` for the config types
//! - **`tls`** (default): [`TlsSocketTransport`](transport::TlsSocketTransport)
//! - **`observability`**: `tracing` events for connects, closes and failures
//!
//! ## Safety
//!
//! Wirestream is written in 100% safe Rust with `#![deny(unsafe_code)]`.

pub mod transport;

pub use transport::{Transport, TransportError, TransportErrorKind};
