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

//! TCP socket transport implementation.
//!
//! [`SocketTransport`] owns a blocking TCP connection. Every read is preceded
//! by a readiness wait bounded by the receive timeout, and every write is
//! bounded by the send timeout, so a stuck peer surfaces as a `TimedOut`
//! error rather than a hung caller.

use crate::transport::buffer::ByteQueue;
use crate::transport::pool::PersistentPool;
use crate::transport::types::split_scheme;
use crate::transport::{SocketConfig, SocketTimeout, Transport, TransportError};
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "observability")]
use tracing::{debug, info, instrument, warn};

/// Name used in every socket error message.
pub(crate) const SOCKET_NAME: &str = "SocketTransport";

/// Callback receiving a formatted diagnostic just before a connect error is
/// raised. It observes the failure and cannot suppress it.
pub type DebugHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Direction of a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Wait until the channel can be read.
    Read,
    /// Wait until the channel can be written.
    Write,
}

/// Outcome of a readiness wait.
#[derive(Debug)]
pub enum Readiness {
    /// The channel is ready for the requested operation.
    Ready,
    /// The timeout elapsed first.
    TimedOut,
    /// The wait itself failed.
    Failed(io::Error),
}

impl Readiness {
    /// Classifies the result of a blocking probe.
    pub fn from_result(result: io::Result<()>) -> Self {
        match result {
            Ok(()) => Self::Ready,
            Err(e) if is_timeout(&e) => Self::TimedOut,
            Err(e) => Self::Failed(e),
        }
    }
}

/// A connected byte channel that a [`SocketTransport`] can drive.
///
/// Implemented for [`TcpStream`] and, with the `tls` feature, for the TLS
/// client stream. Callers holding an already-connected channel hand it over
/// with [`SocketTransport::set_handle`].
pub trait SocketStream: Read + Write + Send {
    /// Prepares the channel for `interest`, bounded by `timeout`.
    ///
    /// Implementations either block until the channel is ready or arm
    /// `timeout` on the operation that follows, which then fails with a
    /// timeout error instead. A `None` timeout waits indefinitely.
    fn ready(&mut self, interest: Interest, timeout: Option<Duration>) -> Readiness;

    /// Whether a parked channel can be handed to a new owner.
    ///
    /// Returns `false` once the peer has closed, the channel has failed, or
    /// unread bytes are waiting on it. Must not block.
    fn is_reusable(&mut self) -> bool {
        true
    }

    /// Shuts the channel down. Errors are ignored by callers.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SocketStream for TcpStream {
    fn ready(&mut self, interest: Interest, timeout: Option<Duration>) -> Readiness {
        let probe = match interest {
            Interest::Read => self
                .set_read_timeout(timeout)
                .and_then(|()| self.peek(&mut [0u8; 1]).map(drop)),
            // No write-side wait: the timeout is enforced by the write call.
            Interest::Write => self.set_write_timeout(timeout).and_then(|()| {
                match self.take_error()? {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }),
        };
        Readiness::from_result(probe)
    }

    fn is_reusable(&mut self) -> bool {
        if self.set_nonblocking(true).is_err() {
            return false;
        }
        let idle = matches!(
            self.peek(&mut [0u8; 1]),
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock
        );
        self.set_nonblocking(false).is_ok() && idle
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// TCP socket transport.
///
/// # Lifecycle
///
/// The transport is `Closed` until [`open`](Transport::open) succeeds or a
/// handle is injected with [`set_handle`](SocketTransport::set_handle), and
/// returns to `Closed` on [`close`](Transport::close). It can be reopened.
///
/// # Timeouts
///
/// Send and receive timeouts are stored as seconds plus microseconds (see
/// [`SocketTimeout`]). The send timeout also bounds the connect. Zero waits
/// indefinitely.
///
/// # Examples
///
/// ```rust,no_run
/// use wirestream::transport::{SocketTransport, Transport};
///
/// # fn example() -> Result<(), wirestream::transport::TransportError> {
/// let mut socket = SocketTransport::new("localhost", 9090)
///     .with_debug_handler(|message| eprintln!("{message}"));
/// socket.set_recv_timeout(2_000);
///
/// socket.open()?;
/// socket.write(b"ping")?;
/// let reply = socket.read_all(4)?;
/// socket.close()?;
/// # Ok(())
/// # }
/// ```
pub struct SocketTransport {
    host: String,
    port: u16,
    persist: bool,
    debug_handler: Option<DebugHandler>,
    send_timeout: SocketTimeout,
    recv_timeout: SocketTimeout,
    handle: Option<Box<dyn SocketStream>>,
    pending: ByteQueue,
}

impl SocketTransport {
    /// Creates a closed transport for `host:port` with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_config(SocketConfig::new(host, port))
    }

    /// Creates a closed transport from a [`SocketConfig`].
    pub fn from_config(config: SocketConfig) -> Self {
        Self {
            host: config.host,
            port: config.port,
            persist: config.persist,
            debug_handler: None,
            send_timeout: SocketTimeout::from_millis(config.send_timeout_ms),
            recv_timeout: SocketTimeout::from_millis(config.recv_timeout_ms),
            handle: None,
            pending: ByteQueue::new(),
        }
    }

    /// Sets the persistence flag.
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Installs a debug callback for connect failures.
    pub fn with_debug_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.debug_handler = Some(Arc::new(handler));
        self
    }

    /// Sets the send timeout, returning `self`.
    pub fn with_send_timeout(mut self, millis: u64) -> Self {
        self.set_send_timeout(millis);
        self
    }

    /// Sets the receive timeout, returning `self`.
    pub fn with_recv_timeout(mut self, millis: u64) -> Self {
        self.set_recv_timeout(millis);
        self
    }

    /// Replaces or clears the debug callback.
    pub fn set_debug_handler(&mut self, handler: Option<DebugHandler>) {
        self.debug_handler = handler;
    }

    /// Sets the send timeout in milliseconds.
    pub fn set_send_timeout(&mut self, millis: u64) {
        self.send_timeout = SocketTimeout::from_millis(millis);
    }

    /// Sets the receive timeout in milliseconds.
    pub fn set_recv_timeout(&mut self, millis: u64) {
        self.recv_timeout = SocketTimeout::from_millis(millis);
    }

    /// Current send timeout.
    pub fn send_timeout(&self) -> SocketTimeout {
        self.send_timeout
    }

    /// Current receive timeout.
    pub fn recv_timeout(&self) -> SocketTimeout {
        self.recv_timeout
    }

    /// The configured host, unchanged.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether closed connections are parked for reuse.
    pub fn is_persistent(&self) -> bool {
        self.persist
    }

    /// Injects an already-connected channel, bypassing `open`.
    ///
    /// Any previous handle is dropped without being parked.
    pub fn set_handle<S>(&mut self, stream: S)
    where
        S: SocketStream + 'static,
    {
        self.handle = Some(Box::new(stream));
    }

    /// Number of parked persistent connections for `host:port`.
    pub fn idle_persistent(host: &str, port: u16) -> usize {
        PersistentPool::global().idle_count(&PersistentPool::key(host, port))
    }

    /// Validates the endpoint and installs the handle returned by `dial`.
    ///
    /// `target` is the host as shown in the connect error, which for TLS
    /// carries the scheme prefix. `dial` receives that target, the port and
    /// the connect timeout.
    pub(crate) fn open_with<F>(&mut self, target: &str, dial: F) -> Result<(), TransportError>
    where
        F: FnOnce(&str, u16, Option<Duration>) -> io::Result<Box<dyn SocketStream>>,
    {
        if self.handle.is_some() {
            return Err(TransportError::already_open(format!(
                "{}: socket already connected",
                SOCKET_NAME
            )));
        }
        if self.host.is_empty() {
            return Err(TransportError::not_open("Cannot open null host"));
        }
        if self.port == 0 {
            return Err(TransportError::not_open("Cannot open without port"));
        }

        match dial(target, self.port, self.send_timeout.as_duration()) {
            Ok(stream) => {
                #[cfg(feature = "observability")]
                info!(host = target, port = self.port, "Socket connected");

                self.handle = Some(stream);
                Ok(())
            }
            Err(e) => Err(self.connect_error(target, e)),
        }
    }

    fn connect_error(&self, target: &str, error: io::Error) -> TransportError {
        let (message, code) = describe_io_error(&error);
        let text = format!(
            "{}: Could not connect to {}:{} ({} [{}])",
            SOCKET_NAME, target, self.port, message, code
        );

        #[cfg(feature = "observability")]
        warn!("{}", text);

        if let Some(handler) = &self.debug_handler {
            handler(&text);
        }
        TransportError::io(text, error)
    }
}

impl Transport for SocketTransport {
    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    #[cfg_attr(feature = "observability", instrument(skip(self), fields(host = %self.host, port = self.port, persist = self.persist)))]
    fn open(&mut self) -> Result<(), TransportError> {
        let persist = self.persist;
        let key = PersistentPool::key(&self.host, self.port);
        let target = self.host.clone();
        self.open_with(&target, move |host, port, timeout| {
            if persist {
                if let Some(stream) = PersistentPool::global().checkout(&key) {
                    return Ok(stream);
                }
            }
            dial_tcp(host, port, timeout)
        })
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.pending.take_all();
        if let Some(mut handle) = self.handle.take() {
            if self.persist {
                PersistentPool::global().release(PersistentPool::key(&self.host, self.port), handle);
            } else {
                let _ = handle.shutdown();
            }

            #[cfg(feature = "observability")]
            debug!(host = %self.host, port = self.port, "Socket closed");
        }
        Ok(())
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        if !self.pending.is_empty() {
            return Ok(self.pending.take(len));
        }
        if len == 0 {
            return Ok(Vec::new());
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(not_open(&self.host, self.port));
        };

        let timed_out = || {
            TransportError::timed_out(format!(
                "{}: timed out reading {} bytes from {}:{}",
                SOCKET_NAME, len, self.host, self.port
            ))
        };
        let failed = |e: io::Error| {
            TransportError::io(
                format!(
                    "{}: Could not read {} bytes from {}:{}",
                    SOCKET_NAME, len, self.host, self.port
                ),
                e,
            )
        };

        match handle.ready(Interest::Read, self.recv_timeout.as_duration()) {
            Readiness::TimedOut => Err(timed_out()),
            Readiness::Failed(e) => Err(failed(e)),
            Readiness::Ready => {
                let mut buf = vec![0u8; len];
                let received = loop {
                    match handle.read(&mut buf) {
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        other => break other,
                    }
                };
                match received {
                    Ok(0) => Err(TransportError::unknown(format!("{} read 0 bytes", SOCKET_NAME))),
                    Ok(n) => {
                        buf.truncate(n);
                        Ok(buf)
                    }
                    Err(e) if is_timeout(&e) => Err(timed_out()),
                    Err(e) => Err(failed(e)),
                }
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(not_open(&self.host, self.port));
        };

        let total = buf.len();
        let timed_out = |remaining: usize| {
            TransportError::timed_out(format!(
                "{}: timed out writing {} bytes from {}:{}",
                SOCKET_NAME, remaining, self.host, self.port
            ))
        };
        let failed = |count: usize, e: Option<io::Error>| {
            let message = format!(
                "{}: Could not write {} bytes {}:{}",
                SOCKET_NAME, count, self.host, self.port
            );
            match e {
                Some(e) => TransportError::io(message, e),
                None => TransportError::unknown(message),
            }
        };

        let mut offset = 0;
        while offset < total {
            let remaining = total - offset;
            match handle.ready(Interest::Write, self.send_timeout.as_duration()) {
                Readiness::TimedOut => return Err(timed_out(remaining)),
                Readiness::Failed(e) => return Err(failed(remaining, Some(e))),
                Readiness::Ready => match handle.write(&buf[offset..]) {
                    Ok(0) => return Err(failed(total, None)),
                    Ok(n) => offset += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) if is_timeout(&e) => return Err(timed_out(remaining)),
                    Err(e) => return Err(failed(total, Some(e))),
                },
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        match self.handle.as_mut() {
            Some(handle) => handle.flush().map_err(|e| {
                TransportError::io(
                    format!("{}: Could not flush {}:{}", SOCKET_NAME, self.host, self.port),
                    e,
                )
            }),
            None => Ok(()),
        }
    }

    fn put_back(&mut self, data: &[u8]) {
        self.pending.prepend(data);
    }

    fn available(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl fmt::Debug for SocketTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("persist", &self.persist)
            .field("send_timeout", &self.send_timeout)
            .field("recv_timeout", &self.recv_timeout)
            .field("open", &self.handle.is_some())
            .field("debug_handler", &self.debug_handler.is_some())
            .finish()
    }
}

/// Dials a plain TCP connection. Accepts bare hosts and `tcp://` hosts.
fn dial_tcp(target: &str, port: u16, timeout: Option<Duration>) -> io::Result<Box<dyn SocketStream>> {
    match split_scheme(target) {
        (None, host) | (Some("tcp"), host) => Ok(Box::new(connect_tcp(host, port, timeout)?)),
        (Some(scheme), _) => Err(unsupported_scheme(scheme)),
    }
}

/// Resolves `host` and connects to the first address that accepts.
pub(crate) fn connect_tcp(host: &str, port: u16, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no addresses resolved for {}", host),
        )
    }))
}

fn not_open(host: &str, port: u16) -> TransportError {
    TransportError::not_open(format!(
        "{}: transport to {}:{} is not open",
        SOCKET_NAME, host, port
    ))
}

pub(crate) fn unsupported_scheme(scheme: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("unsupported scheme '{}'", scheme),
    )
}

pub(crate) fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Splits an I/O error into a message and a numeric code (0 if none).
fn describe_io_error(error: &io::Error) -> (String, i32) {
    match error.raw_os_error() {
        Some(code) => (error.kind().to_string(), code),
        None => (error.to_string(), 0),
    }
}
