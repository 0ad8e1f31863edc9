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

//! Null transport: discards writes and refuses reads.

use crate::transport::{Transport, TransportError};

/// A sink transport.
///
/// Writes are discarded and always succeed; reads always fail. Useful as the
/// terminal of a pipeline whose output nobody consumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl NullTransport {
    /// Creates a null transport.
    pub fn new() -> Self {
        Self
    }
}

impl Transport for NullTransport {
    fn is_open(&self) -> bool {
        true
    }

    fn open(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn read(&mut self, _len: usize) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::not_open(
            "NullTransport: cannot read from a null transport",
        ))
    }

    fn write(&mut self, _buf: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }

    fn put_back(&mut self, _data: &[u8]) {}
}
