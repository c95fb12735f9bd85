//! In-memory transport for tests and dry runs.

use super::Transport;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock transport backed by shared in-memory buffers.
///
/// Clones share state, so a test can keep one handle to inject bytes and
/// inspect written commands while the runner owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    closed: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.lock().read_buffer.extend(data);
    }

    /// Inject each line followed by a newline
    pub fn inject_lines(&self, lines: &[&str]) {
        let mut inner = self.lock();
        for line in lines {
            inner.read_buffer.extend(line.as_bytes());
            inner.read_buffer.push_back(b'\n');
        }
    }

    /// Get all written data
    pub fn written(&self) -> Vec<u8> {
        self.lock().write_buffer.clone()
    }

    /// Number of bytes still waiting to be read
    pub fn pending(&self) -> usize {
        self.lock().read_buffer.len()
    }

    /// Simulate the device going away; reads fail once the buffer drains
    pub fn close(&self) {
        self.lock().closed = true;
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();
        if inner.read_buffer.is_empty() && inner.closed {
            return Err(Error::TransportClosed);
        }

        let count = inner.read_buffer.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..count)) {
            *slot = byte;
        }

        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(Error::TransportClosed);
        }
        inner.write_buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        let inner = self.lock();
        if inner.read_buffer.is_empty() && inner.closed {
            return Err(Error::TransportClosed);
        }
        Ok(inner.read_buffer.len())
    }
}
