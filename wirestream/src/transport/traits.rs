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

use crate::transport::TransportError;

/// Core transport abstraction for blocking byte streams.
///
/// The `Transport` trait is the whole surface the wire encoder depends on.
/// Every variant (socket, TLS socket, standard stream, memory buffer, null)
/// implements it, and [`BufferedTransport`](crate::transport::BufferedTransport)
/// wraps any implementation to coalesce I/O.
///
/// # Contract
///
/// - [`open`](Transport::open) fails with `AlreadyOpen` if the transport is
///   open, and with `NotOpen` for an unusable configuration before touching
///   any I/O.
/// - [`close`](Transport::close) is idempotent and safe without a prior open.
/// - [`read`](Transport::read) returns between 1 and `len` bytes or fails.
///   A zero-byte read from the channel is peer closure and is an error.
/// - [`read_all`](Transport::read_all) returns exactly `len` bytes or fails.
/// - [`write`](Transport::write) consumes the whole input or fails.
/// - [`put_back`](Transport::put_back) prepends bytes to the pending read
///   queue without I/O. The most recent put-back is read first.
///
/// # Examples
///
/// ```rust
/// use wirestream::transport::{MemoryBuffer, Transport};
///
/// # fn example() -> Result<(), wirestream::transport::TransportError> {
/// let mut transport = MemoryBuffer::with_contents(b"1234567890".to_vec());
/// assert_eq!(transport.read(5)?, b"12345");
///
/// transport.put_back(b"ab");
/// assert_eq!(transport.read_all(4)?, b"ab67");
/// # Ok(())
/// # }
/// ```
pub trait Transport {
    /// Returns `true` if the underlying handle is valid.
    fn is_open(&self) -> bool;

    /// Establishes the underlying handle.
    ///
    /// # Errors
    ///
    /// - `AlreadyOpen` if the transport is already open
    /// - `NotOpen` if the configuration cannot be used
    /// - `Unknown` if the connect or allocate step fails
    fn open(&mut self) -> Result<(), TransportError>;

    /// Releases the underlying handle.
    ///
    /// Calling `close` on a closed or never-opened transport is a no-op.
    fn close(&mut self) -> Result<(), TransportError>;

    /// Reads between 1 and `len` bytes.
    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError>;

    /// Reads exactly `len` bytes, looping over [`read`](Transport::read).
    ///
    /// Never returns fewer than `len` bytes; fails instead.
    fn read_all(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut data = Vec::with_capacity(len);
        while data.len() < len {
            let chunk = self.read(len - data.len())?;
            if chunk.is_empty() {
                return Err(TransportError::unknown(format!(
                    "Could not read {} bytes: transport returned no data",
                    len - data.len()
                )));
            }
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    /// Writes all of `buf`.
    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError>;

    /// Forces any buffered output to the underlying channel.
    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Prepends `data` to the pending read queue without performing I/O.
    fn put_back(&mut self, data: &[u8]);

    /// Returns the number of bytes readable without blocking.
    ///
    /// Exact for [`MemoryBuffer`](crate::transport::MemoryBuffer), best effort
    /// elsewhere.
    fn available(&self) -> usize {
        0
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn open(&mut self) -> Result<(), TransportError> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).read(len)
    }

    fn read_all(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).read_all(len)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }

    fn put_back(&mut self, data: &[u8]) {
        (**self).put_back(data)
    }

    fn available(&self) -> usize {
        (**self).available()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn open(&mut self) -> Result<(), TransportError> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).read(len)
    }

    fn read_all(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).read_all(len)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }

    fn put_back(&mut self, data: &[u8]) {
        (**self).put_back(data)
    }

    fn available(&self) -> usize {
        (**self).available()
    }
}
