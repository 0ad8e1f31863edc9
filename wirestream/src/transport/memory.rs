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

//! In-memory transport implementation.
//!
//! [`MemoryBuffer`] holds its bytes in process memory and has no underlying
//! channel. Encoders use it to materialise a whole message before handing it
//! to a real transport, and tests use it as a deterministic peer.

use crate::transport::buffer::ByteQueue;
use crate::transport::{Transport, TransportError};

/// In-memory byte buffer implementing [`Transport`].
///
/// Reads consume from the front, writes append at the back, and the buffer
/// is always open. Slicing is byte-oriented: a read may split a multi-byte
/// UTF-8 sequence, which is correct for a transport.
///
/// # Examples
///
/// ```rust
/// use wirestream::transport::{MemoryBuffer, Transport};
///
/// # fn example() -> Result<(), wirestream::transport::TransportError> {
/// let mut buffer = MemoryBuffer::with_contents(b"1234567890".to_vec());
/// assert_eq!(buffer.read(5)?, b"12345");
/// assert_eq!(buffer.buffer(), b"67890");
///
/// buffer.write(b"abc")?;
/// assert_eq!(buffer.available(), 8);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    buf: ByteQueue,
}

impl MemoryBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer pre-filled with `contents`.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            buf: ByteQueue::from_vec(contents.into()),
        }
    }

    /// Returns a copy of the full current contents without consuming them.
    pub fn buffer(&self) -> Vec<u8> {
        self.buf.to_vec()
    }

    /// Consumes the buffer and returns its remaining contents.
    pub fn into_inner(mut self) -> Vec<u8> {
        self.buf.take_all()
    }
}

impl Transport for MemoryBuffer {
    fn is_open(&self) -> bool {
        true
    }

    fn open(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        if self.buf.is_empty() {
            return Err(TransportError::unknown(format!(
                "MemoryBuffer: Could not read {} bytes from buffer.",
                len
            )));
        }
        Ok(self.buf.take(len))
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.buf.extend(buf);
        Ok(())
    }

    fn put_back(&mut self, data: &[u8]) {
        self.buf.prepend(data);
    }

    fn available(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportErrorKind;

    #[test]
    fn test_memory_buffer_always_open() {
        let mut buffer = MemoryBuffer::new();
        assert!(buffer.is_open());
        buffer.open().unwrap();
        buffer.close().unwrap();
        assert!(buffer.is_open());
    }

    #[test]
    fn test_read_empty_buffer() {
        let mut buffer = MemoryBuffer::new();
        let error = buffer.read(1).unwrap_err();
        assert_eq!(error.kind(), TransportErrorKind::Unknown);
        assert_eq!(
            error.to_string(),
            "MemoryBuffer: Could not read 1 bytes from buffer."
        );
    }

    #[test]
    fn test_read_part_of_buffer() {
        let mut buffer = MemoryBuffer::with_contents(b"1234567890".to_vec());
        assert_eq!(buffer.read(5).unwrap(), b"12345");
        assert_eq!(buffer.buffer(), b"67890");
        assert_eq!(buffer.available(), 5);
    }

    #[test]
    fn test_read_splits_multibyte_sequences() {
        let mut buffer = MemoryBuffer::with_contents("Slovenščina".as_bytes().to_vec());
        assert_eq!(buffer.read(6).unwrap(), b"Sloven");
        assert_eq!(buffer.buffer(), "ščina".as_bytes());

        let mut buffer = MemoryBuffer::with_contents("Українська".as_bytes().to_vec());
        assert_eq!(buffer.read(6).unwrap(), "Укр".as_bytes());
        assert_eq!(buffer.buffer(), "аїнська".as_bytes());

        let mut buffer = MemoryBuffer::with_contents("ščina".as_bytes().to_vec());
        let head = buffer.read(1).unwrap();
        assert_eq!(head, [0xC5]);
        assert_eq!(buffer.available(), "ščina".len() - 1);
    }

    #[test]
    fn test_read_more_than_available() {
        let mut buffer = MemoryBuffer::with_contents(b"123456789".to_vec());
        assert_eq!(buffer.read(10).unwrap(), b"123456789");
        assert!(buffer.buffer().is_empty());
    }

    #[test]
    fn test_write_appends() {
        let mut buffer = MemoryBuffer::new();
        buffer.write(b"12345").unwrap();
        assert_eq!(buffer.buffer(), b"12345");

        let mut buffer = MemoryBuffer::with_contents(b"67890".to_vec());
        buffer.write(b"12345").unwrap();
        assert_eq!(buffer.buffer(), b"6789012345");

        let mut buffer = MemoryBuffer::with_contents("Slovenščina".as_bytes().to_vec());
        buffer.write("Українська".as_bytes()).unwrap();
        assert_eq!(buffer.buffer(), "SlovenščinaУкраїнська".as_bytes());
    }

    #[test]
    fn test_available() {
        let buffer = MemoryBuffer::with_contents(b"12345".to_vec());
        assert_eq!(buffer.available(), 5);
    }

    #[test]
    fn test_put_back() {
        let mut buffer = MemoryBuffer::with_contents(b"12345".to_vec());
        buffer.put_back(b"67890");
        assert_eq!(buffer.buffer(), b"6789012345");
    }

    #[test]
    fn test_read_all_exact() {
        let mut buffer = MemoryBuffer::with_contents(b"abcdef".to_vec());
        assert_eq!(buffer.read_all(6).unwrap(), b"abcdef");
        assert!(buffer.read_all(1).is_err());
    }

    #[test]
    fn test_into_inner() {
        let mut buffer = MemoryBuffer::with_contents(b"abc".to_vec());
        buffer.read(1).unwrap();
        assert_eq!(buffer.into_inner(), b"bc");
    }
}
