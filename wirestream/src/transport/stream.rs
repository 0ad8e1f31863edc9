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

//! Standard stream transport implementation.
//!
//! [`StreamTransport`] speaks over the process's own input and output
//! channels, which is how a service runs when it is spawned by a host that
//! pipes requests in and reads responses back. Which input channel is used
//! depends on the [`ExecutionContext`].

use crate::transport::buffer::ByteQueue;
use crate::transport::{Transport, TransportError};
use bitflags::bitflags;
use std::fmt;
use std::io::{self, IsTerminal, Read, Write};

#[cfg(feature = "observability")]
use tracing::debug;

/// Input channel name in an interactive context.
pub const STDIN_STREAM: &str = "stdio://stdin";
/// Input channel name in an embedded context.
pub const INPUT_STREAM: &str = "stdio://input";
/// Output channel name.
pub const OUTPUT_STREAM: &str = "stdio://output";

bitflags! {
    /// Directions a [`StreamTransport`] opens.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StreamMode: u8 {
        /// Open the input channel.
        const READ  = 0b01;
        /// Open the output channel.
        const WRITE = 0b10;
    }
}

/// How the process is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    /// Attached to a terminal.
    Interactive,
    /// Spawned by a host that owns the process's streams.
    Embedded,
}

impl ExecutionContext {
    /// Detects the context from whether standard input is a terminal.
    pub fn detect() -> Self {
        if io::stdin().is_terminal() {
            Self::Interactive
        } else {
            Self::Embedded
        }
    }

    /// Name of the input channel for this context.
    pub fn input_stream_name(&self) -> &'static str {
        match self {
            Self::Interactive => STDIN_STREAM,
            Self::Embedded => INPUT_STREAM,
        }
    }
}

/// Opens named process channels.
pub trait StreamProvider: Send {
    /// Opens the input channel called `name` for reading.
    fn open_input(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;

    /// Opens the output channel called `name` for writing.
    fn open_output(&self, name: &str) -> io::Result<Box<dyn Write + Send>>;
}

/// Maps channel names onto the process's standard streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioProvider;

impl StreamProvider for StdioProvider {
    fn open_input(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        match name {
            STDIN_STREAM | INPUT_STREAM => Ok(Box::new(io::stdin())),
            other => Err(unknown_stream(other)),
        }
    }

    fn open_output(&self, name: &str) -> io::Result<Box<dyn Write + Send>> {
        match name {
            OUTPUT_STREAM => Ok(Box::new(io::stdout())),
            other => Err(unknown_stream(other)),
        }
    }
}

fn unknown_stream(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such stream '{}'", name))
}

/// Transport over the process's standard streams.
///
/// Each direction selected by the [`StreamMode`] owns its own handle. The
/// transport is open once every selected direction is open.
///
/// # Examples
///
/// ```rust,no_run
/// use wirestream::transport::{StreamMode, StreamTransport, Transport};
///
/// # fn example() -> Result<(), wirestream::transport::TransportError> {
/// let mut stdio = StreamTransport::new(StreamMode::READ | StreamMode::WRITE);
/// stdio.open()?;
/// let request = stdio.read_all(4)?;
/// stdio.write(&request)?;
/// stdio.flush()?;
/// # Ok(())
/// # }
/// ```
pub struct StreamTransport<P: StreamProvider = StdioProvider> {
    mode: StreamMode,
    context: ExecutionContext,
    provider: P,
    input: Option<Box<dyn Read + Send>>,
    output: Option<Box<dyn Write + Send>>,
    pending: ByteQueue,
}

impl StreamTransport {
    /// Creates a closed transport over the standard streams, detecting the
    /// execution context.
    pub fn new(mode: StreamMode) -> Self {
        Self::with_provider(mode, ExecutionContext::detect(), StdioProvider)
    }
}

impl<P: StreamProvider> StreamTransport<P> {
    /// Creates a closed transport that opens its channels through `provider`.
    pub fn with_provider(mode: StreamMode, context: ExecutionContext, provider: P) -> Self {
        Self {
            mode,
            context,
            provider,
            input: None,
            output: None,
            pending: ByteQueue::new(),
        }
    }

    /// Directions this transport opens.
    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Execution context used to pick the input channel.
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// The channel provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: StreamProvider> Transport for StreamTransport<P> {
    fn is_open(&self) -> bool {
        (!self.mode.contains(StreamMode::READ) || self.input.is_some())
            && (!self.mode.contains(StreamMode::WRITE) || self.output.is_some())
    }

    fn open(&mut self) -> Result<(), TransportError> {
        if self.input.is_some() || self.output.is_some() {
            return Err(TransportError::already_open(
                "StreamTransport: stream already open",
            ));
        }

        if self.mode.contains(StreamMode::READ) {
            let name = self.context.input_stream_name();
            let input = self.provider.open_input(name).map_err(|e| {
                TransportError::io(format!("StreamTransport: Could not open {}", name), e)
            })?;
            self.input = Some(input);
        }

        if self.mode.contains(StreamMode::WRITE) {
            match self.provider.open_output(OUTPUT_STREAM) {
                Ok(output) => self.output = Some(output),
                Err(e) => {
                    self.input = None;
                    return Err(TransportError::io(
                        format!("StreamTransport: Could not open {}", OUTPUT_STREAM),
                        e,
                    ));
                }
            }
        }

        #[cfg(feature = "observability")]
        debug!(mode = ?self.mode, context = ?self.context, "Standard streams opened");

        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut output) = self.output.take() {
            let _ = output.flush();
        }
        self.input = None;
        self.pending.take_all();
        Ok(())
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        if !self.pending.is_empty() {
            return Ok(self.pending.take(len));
        }
        let Some(input) = self.input.as_mut() else {
            return Err(TransportError::not_open(
                "StreamTransport: input stream is not open",
            ));
        };

        let mut buf = vec![0u8; len];
        let received = loop {
            match input.read(&mut buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        let message = || format!("StreamTransport: Could not read {} bytes", len);
        match received {
            Ok(0) => Err(TransportError::unknown(message())),
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) => Err(TransportError::io(message(), e)),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let Some(output) = self.output.as_mut() else {
            return Err(TransportError::not_open(
                "StreamTransport: output stream is not open",
            ));
        };

        let message = || format!("StreamTransport: Could not write {} bytes", buf.len());
        let mut offset = 0;
        while offset < buf.len() {
            match output.write(&buf[offset..]) {
                Ok(0) => return Err(TransportError::unknown(message())),
                Ok(n) => offset += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::io(message(), e)),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        match self.output.as_mut() {
            Some(output) => output.flush().map_err(|e| {
                TransportError::io(format!("StreamTransport: Could not flush {}", OUTPUT_STREAM), e)
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

impl<P: StreamProvider> fmt::Debug for StreamTransport<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamTransport")
            .field("mode", &self.mode)
            .field("context", &self.context)
            .field("input", &self.input.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}
