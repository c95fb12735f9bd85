//! Operator command relay.
//!
//! Keys typed by the operator are mapped to single-byte device commands and
//! written to the transport. The relay is advisory: the session only reacts
//! to markers that come back on the stream.

use crate::error::{Error, Result};
use crate::stream::{KeySource, Transport};

/// Single-byte device commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask the device to begin a capture
    Start,
    /// Ask the device to stop capturing
    Stop,
}

impl Command {
    /// Map an operator key to a command; other keys are ignored.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'o' => Some(Command::Start),
            'p' => Some(Command::Stop),
            _ => None,
        }
    }

    /// Byte sent on the wire.
    pub fn as_byte(self) -> u8 {
        match self {
            Command::Start => b'o',
            Command::Stop => b'p',
        }
    }
}

/// Forwards pending operator keys to the device.
pub struct CommandRelay {
    keys: KeySource,
}

impl CommandRelay {
    pub fn new(keys: KeySource) -> Self {
        Self { keys }
    }

    /// Handle at most one pending key. Never waits for input.
    pub fn poll<T: Transport + ?Sized>(&mut self, sink: &mut T) -> Result<Option<Command>> {
        let Some(command) = self.keys.try_next().and_then(Command::from_key) else {
            return Ok(None);
        };

        if sink.write(&[command.as_byte()])? != 1 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "command byte was not written",
            )));
        }
        sink.flush()?;
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MockTransport;
    use crossbeam_channel::bounded;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from_key('o'), Some(Command::Start));
        assert_eq!(Command::from_key('p'), Some(Command::Stop));
        assert_eq!(Command::from_key('\n'), None);
        assert_eq!(Command::from_key('O'), None);
        assert_eq!(Command::Start.as_byte(), b'o');
        assert_eq!(Command::Stop.as_byte(), b'p');
    }

    /// Sink that accepts nothing.
    struct StalledSink;

    impl Transport for StalledSink {
        fn read(&mut self, _buffer: &mut [u8]) -> Result<usize> {
            Ok(0)
        }

        fn write(&mut self, _data: &[u8]) -> Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn available(&mut self) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_unwritten_command_is_an_error() {
        let (sender, receiver) = bounded(1);
        let mut relay = CommandRelay::new(KeySource::from_receiver(receiver));

        sender.send('o').unwrap();
        assert!(matches!(
            relay.poll(&mut StalledSink),
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::WriteZero
        ));
    }

    #[test]
    fn test_relay_forwards_commands_only() {
        let (sender, receiver) = bounded(8);
        let mut relay = CommandRelay::new(KeySource::from_receiver(receiver));
        let mock = MockTransport::new();
        let mut sink = mock.clone();

        assert_eq!(relay.poll(&mut sink).unwrap(), None);

        for key in ['o', '\n', 'x', 'p'] {
            sender.send(key).unwrap();
        }
        let sent: Vec<Option<Command>> = (0..4).map(|_| relay.poll(&mut sink).unwrap()).collect();

        assert_eq!(
            sent,
            vec![Some(Command::Start), None, None, Some(Command::Stop)]
        );
        assert_eq!(mock.written(), b"op".to_vec());
    }
}
