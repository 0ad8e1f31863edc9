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

//! Read-side byte queue shared by the buffering transports.

use std::collections::VecDeque;

/// An ordered byte queue consumed from the front.
///
/// Bytes leave the front only when handed to a caller. Put-back prepends, so
/// the most recently returned bytes are the next ones read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ByteQueue {
    bytes: VecDeque<u8>,
}

impl ByteQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: VecDeque::from(bytes),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Appends `data` at the back.
    pub(crate) fn extend(&mut self, data: &[u8]) {
        self.bytes.extend(data.iter().copied());
    }

    /// Prepends `data`, keeping its internal order.
    pub(crate) fn prepend(&mut self, data: &[u8]) {
        for &byte in data.iter().rev() {
            self.bytes.push_front(byte);
        }
    }

    /// Removes and returns up to `len` bytes from the front.
    pub(crate) fn take(&mut self, len: usize) -> Vec<u8> {
        let len = len.min(self.bytes.len());
        self.bytes.drain(..len).collect()
    }

    /// Removes and returns everything.
    pub(crate) fn take_all(&mut self) -> Vec<u8> {
        self.bytes.drain(..).collect()
    }

    /// Copies the full contents without consuming them.
    pub(crate) fn to_vec(&self) -> Vec<u8> {
        self.bytes.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_is_bounded_by_length() {
        let mut queue = ByteQueue::from_vec(b"abc".to_vec());
        assert_eq!(queue.take(2), b"ab");
        assert_eq!(queue.take(10), b"c");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_prepend_order() {
        let mut queue = ByteQueue::new();
        queue.prepend(b"test");
        queue.prepend(b"abcde");
        assert_eq!(queue.to_vec(), b"abcdetest");
        assert_eq!(queue.len(), 9);
    }

    #[test]
    fn test_extend_then_take_all() {
        let mut queue = ByteQueue::from_vec(b"12".to_vec());
        queue.extend(b"34");
        assert_eq!(queue.take_all(), b"1234");
        assert_eq!(queue.len(), 0);
    }
}
