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

//! Registry of idle persistent connections.
//!
//! A persistent [`SocketTransport`](crate::transport::SocketTransport) parks
//! its live handle here on `close` instead of tearing it down, and the next
//! `open` for the same `host:port` picks it back up.

use crate::transport::socket::SocketStream;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::LazyLock;

#[cfg(feature = "observability")]
use tracing::{debug, trace};

/// Process-wide registry of parked persistent connections.
static PERSISTENT: LazyLock<PersistentPool> = LazyLock::new(PersistentPool::default);

/// Idle connections keyed by `host:port`.
#[derive(Default)]
pub(crate) struct PersistentPool {
    idle: Mutex<HashMap<String, Vec<Box<dyn SocketStream>>>>,
}

impl PersistentPool {
    /// Returns the process-wide pool.
    pub(crate) fn global() -> &'static Self {
        &PERSISTENT
    }

    /// Builds the registry key for an endpoint.
    pub(crate) fn key(host: &str, port: u16) -> String {
        format!("{}:{}", host, port)
    }

    /// Takes the most recently parked connection for `key` that is still
    /// reusable, if any.
    ///
    /// Parked connections whose peer has gone away, or that hold unread
    /// bytes, are shut down and discarded along the way.
    pub(crate) fn checkout(&self, key: &str) -> Option<Box<dyn SocketStream>> {
        let mut idle = self.idle.lock();
        let mut found = None;
        if let Some(parked) = idle.get_mut(key) {
            while let Some(mut stream) = parked.pop() {
                if stream.is_reusable() {
                    found = Some(stream);
                    break;
                }

                #[cfg(feature = "observability")]
                debug!(key, "Discarding stale persistent connection");

                let _ = stream.shutdown();
            }
        }
        if idle.get(key).is_some_and(Vec::is_empty) {
            idle.remove(key);
        }

        #[cfg(feature = "observability")]
        {
            if found.is_some() {
                trace!(key, "Reusing persistent connection");
            }
        }

        found
    }

    /// Parks `stream` for later reuse under `key`.
    pub(crate) fn release(&self, key: String, stream: Box<dyn SocketStream>) {
        #[cfg(feature = "observability")]
        trace!(key = key.as_str(), "Parking persistent connection");

        self.idle.lock().entry(key).or_default().push(stream);
    }

    /// Number of parked connections for `key`.
    pub(crate) fn idle_count(&self, key: &str) -> usize {
        self.idle.lock().get(key).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::socket::{Interest, Readiness};
    use std::io::{self, Read, Write};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct Idle;

    impl Read for Idle {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for Idle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SocketStream for Idle {
        fn ready(&mut self, _interest: Interest, _timeout: Option<Duration>) -> Readiness {
            Readiness::Ready
        }
    }

    #[test]
    fn test_checkout_returns_parked_stream() {
        let pool = PersistentPool::default();
        let key = PersistentPool::key("pool-test", 1);
        assert!(pool.checkout(&key).is_none());

        pool.release(key.clone(), Box::new(Idle));
        pool.release(key.clone(), Box::new(Idle));
        assert_eq!(pool.idle_count(&key), 2);

        assert!(pool.checkout(&key).is_some());
        assert!(pool.checkout(&key).is_some());
        assert!(pool.checkout(&key).is_none());
        assert_eq!(pool.idle_count(&key), 0);
    }

    /// Parked stream whose peer has gone away.
    struct Stale(Arc<AtomicBool>);

    impl Read for Stale {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for Stale {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SocketStream for Stale {
        fn ready(&mut self, _interest: Interest, _timeout: Option<Duration>) -> Readiness {
            Readiness::Ready
        }

        fn is_reusable(&mut self) -> bool {
            false
        }

        fn shutdown(&mut self) -> io::Result<()> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_checkout_skips_stale_streams() {
        let pool = PersistentPool::default();
        let key = PersistentPool::key("pool-test", 2);
        let shut = Arc::new(AtomicBool::new(false));

        pool.release(key.clone(), Box::new(Idle));
        pool.release(key.clone(), Box::new(Stale(Arc::clone(&shut))));
        assert_eq!(pool.idle_count(&key), 2);

        assert!(pool.checkout(&key).is_some());
        assert!(shut.load(Ordering::SeqCst));
        assert_eq!(pool.idle_count(&key), 0);
    }

    #[test]
    fn test_checkout_with_only_stale_streams() {
        let pool = PersistentPool::default();
        let key = PersistentPool::key("pool-test", 3);
        pool.release(key.clone(), Box::new(Stale(Arc::new(AtomicBool::new(false)))));

        assert!(pool.checkout(&key).is_none());
        assert_eq!(pool.idle_count(&key), 0);
    }

    #[test]
    fn test_keys_are_isolated() {
        let pool = PersistentPool::default();
        pool.release(PersistentPool::key("a", 1), Box::new(Idle));
        assert_eq!(pool.idle_count(&PersistentPool::key("a", 2)), 0);
        assert_eq!(pool.idle_count(&PersistentPool::key("a", 1)), 1);
    }
}
