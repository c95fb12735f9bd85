//! Byte-stream side of the capture tool.
//!
//! This module provides the transport abstraction over the serial link,
//! the line tokenizer that turns raw bytes into text lines, serial device
//! discovery, and the operator key source used by the command relay.

pub mod keys;
pub mod mock;
pub mod ports;
pub mod tokenizer;
pub mod transport;

// Re-export commonly used types
pub use keys::KeySource;
pub use mock::MockTransport;
pub use ports::{find_capture_port, list_ports, PortDescription};
pub use tokenizer::{LineTokenizer, Token, MAX_LINE_LEN};
pub use transport::{SerialTransport, Transport};
