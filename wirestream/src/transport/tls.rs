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

//! TLS socket transport implementation.
//!
//! This module is only available with the `tls` feature enabled.
//!
//! [`TlsSocketTransport`] is a [`SocketTransport`] whose connections are
//! wrapped in a rustls client session. Timeouts, error messages and the
//! read/write loops are those of the plain socket; only the dial step and the
//! reported host differ.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "tls")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use wirestream::transport::{TlsContext, TlsSocketTransport, Transport};
//!
//! let context = TlsContext::native_roots()?;
//! let mut socket = TlsSocketTransport::new("example.com", 443, context);
//! assert_eq!(socket.host(), "ssl://example.com");
//!
//! socket.open()?;
//! socket.write(b"ping")?;
//! socket.flush()?;
//! # Ok(())
//! # }
//! ```

use crate::transport::socket::{
    connect_tcp, unsupported_scheme, DebugHandler, Interest, Readiness, SocketStream,
};
use crate::transport::types::{has_scheme, split_scheme};
use crate::transport::{SocketConfig, SocketTimeout, SocketTransport, Transport, TransportError};
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use std::borrow::Cow;
use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "observability")]
use tracing::debug;

/// Scheme marker reported by [`TlsSocketTransport::host`].
pub const TLS_SCHEME: &str = "ssl";

/// Client-side TLS parameters.
///
/// Wraps a shared rustls [`ClientConfig`] and an optional server name that
/// overrides the host for SNI and certificate verification.
#[derive(Clone)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
    server_name: Option<String>,
}

impl TlsContext {
    /// Creates a context trusting the operating system's root certificates.
    ///
    /// # Errors
    ///
    /// Returns an error if the native root store cannot be loaded or none of
    /// its certificates are usable.
    pub fn native_roots() -> Result<Self, TransportError> {
        let certs = rustls_native_certs::load_native_certs().map_err(|e| {
            TransportError::io("TlsContext: could not load native root certificates", e)
        })?;
        Self::with_root_certificates(certs)
    }

    /// Creates a context trusting the certificates in a PEM bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be parsed or holds no
    /// certificates.
    pub fn from_pem_roots(pem: &[u8]) -> Result<Self, TransportError> {
        let certs = rustls_pemfile::certs(&mut &pem[..])
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TransportError::io("TlsContext: could not parse PEM bundle", e))?;
        if certs.is_empty() {
            return Err(TransportError::unknown(
                "TlsContext: PEM bundle contains no certificates",
            ));
        }
        Self::with_root_certificates(certs)
    }

    /// Creates a context trusting exactly `certs`.
    ///
    /// # Errors
    ///
    /// Returns an error if no certificate could be added to the root store.
    pub fn with_root_certificates(
        certs: impl IntoIterator<Item = CertificateDer<'static>>,
    ) -> Result<Self, TransportError> {
        let mut roots = RootCertStore::empty();
        let (added, _ignored) = roots.add_parsable_certificates(certs);
        if added == 0 {
            return Err(TransportError::unknown(
                "TlsContext: no usable root certificates",
            ));
        }

        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(Self::from_config(Arc::new(config)))
    }

    /// Creates a context that accepts any server certificate.
    ///
    /// **WARNING**: certificate verification is disabled. Use only against
    /// test servers.
    pub fn insecure() -> Self {
        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth();
        Self::from_config(Arc::new(config))
    }

    /// Wraps a caller-built rustls configuration.
    pub fn from_config(config: Arc<ClientConfig>) -> Self {
        Self {
            config,
            server_name: None,
        }
    }

    /// Overrides the name used for SNI and certificate verification.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// The server name override, if any.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// The underlying rustls configuration.
    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }
}

impl std::fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsContext")
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

/// TLS-wrapped socket transport.
///
/// Behaves exactly like [`SocketTransport`] once connected. Connections are
/// never parked for reuse: closing sends `close_notify` and tears the
/// session down.
#[derive(Debug)]
pub struct TlsSocketTransport {
    socket: SocketTransport,
    context: TlsContext,
}

impl TlsSocketTransport {
    /// Creates a closed TLS transport for `host:port`.
    pub fn new(host: impl Into<String>, port: u16, context: TlsContext) -> Self {
        Self::from_config(SocketConfig::new(host, port), context)
    }

    /// Creates a closed TLS transport from a [`SocketConfig`].
    ///
    /// The persistence flag is ignored.
    pub fn from_config(config: SocketConfig, context: TlsContext) -> Self {
        Self {
            socket: SocketTransport::from_config(config).with_persist(false),
            context,
        }
    }

    /// Installs a debug callback for connect failures.
    pub fn with_debug_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.socket.set_debug_handler(Some(Arc::new(handler) as DebugHandler));
        self
    }

    /// Sets the send timeout in milliseconds.
    pub fn set_send_timeout(&mut self, millis: u64) {
        self.socket.set_send_timeout(millis);
    }

    /// Sets the receive timeout in milliseconds.
    pub fn set_recv_timeout(&mut self, millis: u64) {
        self.socket.set_recv_timeout(millis);
    }

    /// Current send timeout.
    pub fn send_timeout(&self) -> SocketTimeout {
        self.socket.send_timeout()
    }

    /// Current receive timeout.
    pub fn recv_timeout(&self) -> SocketTimeout {
        self.socket.recv_timeout()
    }

    /// The configured host, prefixed with `ssl://` unless it already carries
    /// a scheme.
    pub fn host(&self) -> Cow<'_, str> {
        let host = self.socket.host();
        if has_scheme(host) {
            Cow::Borrowed(host)
        } else {
            Cow::Owned(format!("{}://{}", TLS_SCHEME, host))
        }
    }

    /// The configured port.
    pub fn port(&self) -> u16 {
        self.socket.port()
    }

    /// The security context used for new sessions.
    pub fn context(&self) -> &TlsContext {
        &self.context
    }

    /// Injects an already-connected channel, bypassing `open`.
    pub fn set_handle<S>(&mut self, stream: S)
    where
        S: SocketStream + 'static,
    {
        self.socket.set_handle(stream);
    }
}

impl Transport for TlsSocketTransport {
    fn is_open(&self) -> bool {
        self.socket.is_open()
    }

    fn open(&mut self) -> Result<(), TransportError> {
        let target = self.host().into_owned();
        let context = self.context.clone();
        self.socket
            .open_with(&target, |host, port, timeout| dial_tls(&context, host, port, timeout))
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.socket.close()
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        self.socket.read(len)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.socket.write(buf)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.socket.flush()
    }

    fn put_back(&mut self, data: &[u8]) {
        self.socket.put_back(data);
    }

    fn available(&self) -> usize {
        self.socket.available()
    }
}

/// Connects and completes the TLS handshake within the connect timeout.
fn dial_tls(
    context: &TlsContext,
    target: &str,
    port: u16,
    timeout: Option<Duration>,
) -> io::Result<Box<dyn SocketStream>> {
    let host = match split_scheme(target) {
        (None, host) | (Some("ssl"), host) | (Some("tls"), host) => host,
        (Some(scheme), _) => return Err(unsupported_scheme(scheme)),
    };
    let name = context
        .server_name
        .as_deref()
        .unwrap_or(host)
        .trim_start_matches('[')
        .trim_end_matches(']');
    let server_name = ServerName::try_from(name.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut session =
        ClientConnection::new(Arc::clone(&context.config), server_name).map_err(io::Error::other)?;

    let mut tcp = connect_tcp(host, port, timeout)?;
    tcp.set_read_timeout(timeout)?;
    tcp.set_write_timeout(timeout)?;
    while session.is_handshaking() {
        session.complete_io(&mut tcp)?;
    }

    #[cfg(feature = "observability")]
    debug!(
        host,
        port,
        version = ?session.protocol_version(),
        "TLS handshake complete"
    );

    Ok(Box::new(StreamOwned::new(session, tcp)))
}

impl SocketStream for StreamOwned<ClientConnection, TcpStream> {
    fn ready(&mut self, interest: Interest, timeout: Option<Duration>) -> Readiness {
        match interest {
            Interest::Read => match self.conn.process_new_packets() {
                Ok(state) if state.plaintext_bytes_to_read() > 0 => Readiness::Ready,
                Ok(_) => Readiness::from_result(
                    self.sock
                        .set_read_timeout(timeout)
                        .and_then(|()| self.sock.peek(&mut [0u8; 1]).map(drop)),
                ),
                Err(e) => Readiness::Failed(io::Error::new(io::ErrorKind::InvalidData, e)),
            },
            Interest::Write => Readiness::from_result(
                self.sock.set_write_timeout(timeout).and_then(|()| {
                    match self.sock.take_error()? {
                        Some(e) => Err(e),
                        None => Ok(()),
                    }
                }),
            ),
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.conn.send_close_notify();
        while self.conn.wants_write() {
            self.conn.write_tls(&mut self.sock)?;
        }
        self.sock.shutdown(Shutdown::Both)
    }
}

/// Certificate verifier that accepts any certificate (insecure).
#[derive(Debug)]
struct NoVerifier;

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
