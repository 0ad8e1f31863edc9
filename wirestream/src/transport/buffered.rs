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

//! Buffered transport wrapper.
//!
//! [`BufferedTransport`] wraps any [`Transport`] and adds a read-ahead buffer
//! and a write-coalescing buffer, so the wire encoder can issue many small
//! reads and writes while the inner transport sees few, larger calls.

use crate::transport::buffer::ByteQueue;
use crate::transport::{BufferConfig, Transport, TransportError};

#[cfg(feature = "observability")]
use tracing::{debug, instrument, trace};

/// A transport wrapper that buffers reads and writes.
///
/// # Read path
///
/// `read(n)` serves from the read buffer. On a miss it issues exactly one
/// inner `read(read_buffer_size)` and keeps whatever the caller did not ask
/// for. `read_all(n)` drains the buffer first and hands the shortfall to the
/// inner transport's own `read_all`.
///
/// # Write path
///
/// `write` appends to the write buffer. When the pending length would exceed
/// `write_buffer_size`, the buffered bytes plus the new chunk go to the inner
/// transport in a single `write` call and the buffer is cleared. The
/// combined write is never split, so framing code can rely on one inner call
/// per overflow.
///
/// # Examples
///
/// ```rust
/// use wirestream::transport::{BufferConfig, BufferedTransport, MemoryBuffer, Transport};
///
/// # fn example() -> Result<(), wirestream::transport::TransportError> {
/// let mut transport = BufferedTransport::with_config(MemoryBuffer::new(), BufferConfig::new(512, 10));
///
/// transport.write(b"12345")?;
/// assert!(transport.inner().buffer().is_empty());
///
/// transport.write(b"678901")?;
/// assert_eq!(transport.inner().buffer(), b"12345678901");
/// assert!(transport.write_buffer().is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BufferedTransport<T> {
    inner: T,
    read_buffer_size: usize,
    write_buffer_size: usize,
    read_buf: ByteQueue,
    write_buf: Vec<u8>,
}

impl<T: Transport> BufferedTransport<T> {
    /// Wraps `inner` with the default 512-byte buffers.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, BufferConfig::default())
    }

    /// Wraps `inner` with explicit buffer capacities.
    ///
    /// A zero capacity is treated as one byte, so a buffer miss always asks
    /// the inner transport for at least one byte.
    pub fn with_config(inner: T, config: BufferConfig) -> Self {
        let read_buffer_size = config.read_buffer_size.max(1);
        let write_buffer_size = config.write_buffer_size.max(1);
        Self {
            inner,
            read_buffer_size,
            write_buffer_size,
            read_buf: ByteQueue::new(),
            write_buf: Vec::with_capacity(write_buffer_size),
        }
    }

    /// Returns the wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Returns the wrapped transport mutably.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwraps the transport, discarding buffered data.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Size of each inner read issued on a buffer miss.
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    /// Write buffer capacity.
    pub fn write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }

    /// Returns a copy of the unread bytes held in the read buffer.
    pub fn read_buffer(&self) -> Vec<u8> {
        self.read_buf.to_vec()
    }

    /// Returns the bytes pending in the write buffer.
    pub fn write_buffer(&self) -> &[u8] {
        &self.write_buf
    }
}

impl<T: Transport> Transport for BufferedTransport<T> {
    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn open(&mut self) -> Result<(), TransportError> {
        self.inner.open()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.inner.close()
    }

    #[cfg_attr(feature = "observability", instrument(skip(self), fields(buffered = self.read_buf.len())))]
    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        if self.read_buf.is_empty() {
            let chunk = self.inner.read(self.read_buffer_size)?;

            #[cfg(feature = "observability")]
            trace!(received = chunk.len(), "Filled read buffer");

            self.read_buf.extend(&chunk);
        }
        Ok(self.read_buf.take(len))
    }

    fn read_all(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        let have = self.read_buf.len();
        if have == 0 {
            return self.inner.read_all(len);
        }
        if have >= len {
            return Ok(self.read_buf.take(len));
        }

        let mut data = self.read_buf.take_all();
        match self.inner.read_all(len - have) {
            Ok(rest) => {
                data.extend_from_slice(&rest);
                Ok(data)
            }
            Err(e) => {
                self.read_buf.prepend(&data);
                Err(e)
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        if self.write_buf.len() + buf.len() > self.write_buffer_size {
            let mut out = std::mem::take(&mut self.write_buf);
            out.extend_from_slice(buf);

            #[cfg(feature = "observability")]
            debug!(len = out.len(), "Write buffer full, flushing through");

            return self.inner.write(&out);
        }
        self.write_buf.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if !self.write_buf.is_empty() {
            let out = std::mem::take(&mut self.write_buf);
            self.inner.write(&out)?;
        }
        self.inner.flush()
    }

    fn put_back(&mut self, data: &[u8]) {
        self.read_buf.prepend(data);
    }

    fn available(&self) -> usize {
        self.read_buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportErrorKind;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        IsOpen,
        Open,
        Close,
        Read(usize),
        ReadAll(usize),
        Write(Vec<u8>),
        Flush,
    }

    /// Records every call and replays scripted read results.
    #[derive(Default)]
    struct Recorder {
        calls: std::cell::RefCell<Vec<Call>>,
        reads: Vec<Vec<u8>>,
        fail_read_all: bool,
    }

    impl Recorder {
        fn with_reads(reads: Vec<&[u8]>) -> Self {
            Self {
                reads: reads.into_iter().map(<[u8]>::to_vec).collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn writes(&self) -> Vec<Vec<u8>> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Write(data) => Some(data),
                    _ => None,
                })
                .collect()
        }

        fn next_read(&mut self) -> Vec<u8> {
            if self.reads.is_empty() {
                Vec::new()
            } else {
                self.reads.remove(0)
            }
        }
    }

    impl Transport for Recorder {
        fn is_open(&self) -> bool {
            self.calls.borrow_mut().push(Call::IsOpen);
            true
        }

        fn open(&mut self) -> Result<(), TransportError> {
            self.calls.borrow_mut().push(Call::Open);
            Ok(())
        }

        fn close(&mut self) -> Result<(), TransportError> {
            self.calls.borrow_mut().push(Call::Close);
            Ok(())
        }

        fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
            self.calls.borrow_mut().push(Call::Read(len));
            Ok(self.next_read())
        }

        fn read_all(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
            self.calls.borrow_mut().push(Call::ReadAll(len));
            if self.fail_read_all {
                return Err(TransportError::unknown("peer closed"));
            }
            Ok(self.next_read())
        }

        fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
            self.calls.borrow_mut().push(Call::Write(buf.to_vec()));
            Ok(())
        }

        fn flush(&mut self) -> Result<(), TransportError> {
            self.calls.borrow_mut().push(Call::Flush);
            Ok(())
        }

        fn put_back(&mut self, _data: &[u8]) {}
    }

    #[test]
    fn test_lifecycle_delegates() {
        let mut transport = BufferedTransport::new(Recorder::default());
        assert!(transport.is_open());
        transport.open().unwrap();
        transport.close().unwrap();
        assert_eq!(
            transport.inner().calls(),
            vec![Call::IsOpen, Call::Open, Call::Close]
        );
    }

    #[test]
    fn test_put_back_prepends() {
        let mut transport = BufferedTransport::new(Recorder::default());
        transport.put_back(b"test");
        assert_eq!(transport.read_buffer(), b"test");
        transport.put_back(b"abcde");
        assert_eq!(transport.read_buffer(), b"abcdetest");
        assert!(transport.inner().calls().is_empty());
    }

    #[test]
    fn test_read_all_with_empty_buffer() {
        let mut transport = BufferedTransport::new(Recorder::with_reads(vec![b"12345"]));
        assert_eq!(transport.read_all(5).unwrap(), b"12345");
        assert_eq!(transport.inner().calls(), vec![Call::ReadAll(5)]);
        assert!(transport.read_buffer().is_empty());
    }

    #[test]
    fn test_read_all_with_partly_loaded_buffer() {
        let mut transport = BufferedTransport::new(Recorder::with_reads(vec![b"67890"]));
        transport.put_back(b"12345");
        assert_eq!(transport.read_all(10).unwrap(), b"1234567890");
        assert_eq!(transport.inner().calls(), vec![Call::ReadAll(5)]);
        assert!(transport.read_buffer().is_empty());
    }

    #[test]
    fn test_read_all_from_full_buffer() {
        let mut transport = BufferedTransport::new(Recorder::default());
        transport.put_back(b"12345");
        assert_eq!(transport.read_all(5).unwrap(), b"12345");
        assert!(transport.inner().calls().is_empty());
        assert!(transport.read_buffer().is_empty());
    }

    #[test]
    fn test_read_all_less_than_buffered() {
        let mut transport = BufferedTransport::new(Recorder::default());
        transport.put_back(b"12345");
        assert_eq!(transport.read_all(3).unwrap(), b"123");
        assert!(transport.inner().calls().is_empty());
        assert_eq!(transport.read_buffer(), b"45");
    }

    #[test]
    fn test_read_all_failure_keeps_buffered_bytes() {
        let mut recorder = Recorder::default();
        recorder.fail_read_all = true;
        let mut transport = BufferedTransport::new(recorder);
        transport.put_back(b"123");

        let error = transport.read_all(10).unwrap_err();
        assert_eq!(error.kind(), TransportErrorKind::Unknown);
        assert_eq!(transport.read_buffer(), b"123");
    }

    #[test]
    fn test_read_fills_with_read_buffer_size() {
        let mut transport = BufferedTransport::with_config(
            Recorder::with_reads(vec![b"12345"]),
            BufferConfig::new(10, 512),
        );
        assert_eq!(transport.read(5).unwrap(), b"12345");
        assert_eq!(transport.inner().calls(), vec![Call::Read(10)]);
        assert!(transport.read_buffer().is_empty());
    }

    #[test]
    fn test_zero_read_buffer_still_returns_data() {
        let config = BufferConfig {
            read_buffer_size: 0,
            write_buffer_size: 8,
        };
        let mut transport = BufferedTransport::with_config(
            crate::transport::MemoryBuffer::with_contents(b"abc".to_vec()),
            config,
        );
        assert_eq!(transport.read_buffer_size(), 1);
        assert_eq!(transport.read(2).unwrap(), b"a");
        assert_eq!(transport.read_all(2).unwrap(), b"bc");
    }

    #[test]
    fn test_read_keeps_remainder() {
        let mut transport = BufferedTransport::with_config(
            Recorder::with_reads(vec![b"1234567890"]),
            BufferConfig::new(10, 512),
        );
        assert_eq!(transport.read(5).unwrap(), b"12345");
        assert_eq!(transport.read_buffer(), b"67890");
        assert_eq!(transport.available(), 5);

        assert_eq!(transport.read(5).unwrap(), b"67890");
        assert_eq!(transport.inner().calls(), vec![Call::Read(10)]);
    }

    #[test]
    fn test_read_from_buffer_skips_inner() {
        let mut transport = BufferedTransport::with_config(
            Recorder::default(),
            BufferConfig::new(10, 512),
        );
        transport.put_back(b"12345");
        assert_eq!(transport.read(5).unwrap(), b"12345");
        assert!(transport.inner().calls().is_empty());
        assert!(transport.read_buffer().is_empty());
    }

    #[test]
    fn test_write_within_capacity_is_buffered() {
        let mut transport =
            BufferedTransport::with_config(Recorder::default(), BufferConfig::new(512, 10));
        transport.write(b"12345").unwrap();
        assert!(transport.inner().writes().is_empty());
        assert_eq!(transport.write_buffer(), b"12345");

        transport.write(b"67890").unwrap();
        assert!(transport.inner().writes().is_empty());
        assert_eq!(transport.write_buffer(), b"1234567890");
    }

    #[test]
    fn test_oversized_first_write_goes_through() {
        let mut transport =
            BufferedTransport::with_config(Recorder::default(), BufferConfig::new(512, 10));
        transport.write(b"12345678901").unwrap();
        assert_eq!(transport.inner().writes(), vec![b"12345678901".to_vec()]);
        assert!(transport.write_buffer().is_empty());
    }

    #[test]
    fn test_overflow_writes_accumulated_content_once() {
        let mut transport =
            BufferedTransport::with_config(Recorder::default(), BufferConfig::new(512, 10));
        transport.write(b"12345").unwrap();
        transport.write(b"678901").unwrap();
        assert_eq!(transport.inner().writes(), vec![b"12345678901".to_vec()]);
        assert!(transport.write_buffer().is_empty());
    }

    #[test]
    fn test_flush_empty_buffer() {
        let mut transport = BufferedTransport::new(Recorder::default());
        transport.flush().unwrap();
        assert_eq!(transport.inner().calls(), vec![Call::Flush]);
        assert!(transport.write_buffer().is_empty());
    }

    #[test]
    fn test_flush_writes_before_inner_flush() {
        let mut transport = BufferedTransport::new(Recorder::default());
        transport.write(b"12345").unwrap();
        transport.flush().unwrap();
        assert_eq!(
            transport.inner().calls(),
            vec![Call::Write(b"12345".to_vec()), Call::Flush]
        );
        assert!(transport.write_buffer().is_empty());
    }

    #[test]
    fn test_over_memory_buffer() {
        let mut transport = BufferedTransport::with_config(
            crate::transport::MemoryBuffer::with_contents(b"hello world".to_vec()),
            BufferConfig::new(4, 4),
        );
        assert_eq!(transport.read(2).unwrap(), b"he");
        assert_eq!(transport.read_buffer(), b"ll");
        assert_eq!(transport.read_all(6).unwrap(), b"llo wo");
    }
}
