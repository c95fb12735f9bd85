//! Operator key source.
//!
//! Standard input is read on a dedicated thread and forwarded over a
//! channel, so the capture loop can poll for keys without blocking and
//! without platform-specific console APIs.

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::io::Read;
use std::thread;

/// Non-blocking source of single-character operator keys.
pub struct KeySource {
    receiver: Receiver<char>,
}

impl KeySource {
    /// Spawn a reader thread over standard input.
    pub fn stdin() -> Self {
        let (sender, receiver) = bounded(64);

        let spawned = thread::Builder::new()
            .name("key-reader".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for byte in stdin.lock().bytes() {
                    let Ok(byte) = byte else { break };
                    if sender.send(byte as char).is_err() {
                        break;
                    }
                }
                tracing::debug!("Key reader finished");
            });

        // Without a reader the relay simply never sees a key
        if let Err(e) = spawned {
            tracing::warn!("Could not start key reader: {}", e);
        }

        Self { receiver }
    }

    /// Wrap an existing channel (used by tests and embedders).
    pub fn from_receiver(receiver: Receiver<char>) -> Self {
        Self { receiver }
    }

    /// Return the next pending key, if any, without blocking.
    pub fn try_next(&self) -> Option<char> {
        match self.receiver.try_recv() {
            Ok(key) => Some(key),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_next_is_non_blocking() {
        let (sender, receiver) = bounded(4);
        let keys = KeySource::from_receiver(receiver);

        assert_eq!(keys.try_next(), None);
        sender.send('o').unwrap();
        assert_eq!(keys.try_next(), Some('o'));
        assert_eq!(keys.try_next(), None);

        drop(sender);
        assert_eq!(keys.try_next(), None);
    }
}
