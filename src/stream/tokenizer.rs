//! Line tokenizer for the raw device byte stream.
//!
//! Bytes are accumulated until a `\n` terminator arrives, then decoded as
//! UTF-8 and trimmed. Lines that fail to decode are reported and dropped;
//! the stream always continues.

/// Longest unterminated line kept before the partial line is discarded.
pub const MAX_LINE_LEN: usize = 4096;

/// One unit produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A decoded, trimmed text line
    Line(String),
    /// A terminated line whose bytes were not valid UTF-8 (length in bytes)
    Undecodable(usize),
    /// A line that exceeded [`MAX_LINE_LEN`] and was discarded
    Overlong,
}

/// Incremental byte-to-line splitter.
#[derive(Debug)]
pub struct LineTokenizer {
    buffer: Vec<u8>,
    max_len: usize,
    /// Set while skipping the tail of an overlong line
    discarding: bool,
}

impl Default for LineTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTokenizer {
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(128),
            max_len,
            discarding: false,
        }
    }

    /// Feed newly received bytes, returning every token completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();

        for &byte in bytes {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    tokens.push(Self::decode(&self.buffer));
                }
                self.buffer.clear();
                continue;
            }

            if self.discarding {
                continue;
            }

            self.buffer.push(byte);
            if self.buffer.len() > self.max_len {
                self.buffer.clear();
                self.discarding = true;
                tokens.push(Token::Overlong);
            }
        }

        tokens
    }

    /// Bytes of the current unterminated line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partial line, e.g. when the run is interrupted.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    fn decode(raw: &[u8]) -> Token {
        match std::str::from_utf8(raw) {
            Ok(text) => Token::Line(text.trim().to_string()),
            Err(_) => Token::Undecodable(raw.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(s: &str) -> Token {
        Token::Line(s.to_string())
    }

    #[test]
    fn test_splits_and_trims_lines() {
        let mut tokenizer = LineTokenizer::new();
        let tokens = tokenizer.push(b"1.0,2.0,3.0\r\n  Capture complete \n");
        assert_eq!(tokens, vec![line("1.0,2.0,3.0"), line("Capture complete")]);
        assert_eq!(tokenizer.pending(), 0);
    }

    #[test]
    fn test_partial_line_waits_for_terminator() {
        let mut tokenizer = LineTokenizer::new();
        assert!(tokenizer.push(b"-,-").is_empty());
        assert_eq!(tokenizer.pending(), 3);

        let tokens = tokenizer.push(b",-\n4.0");
        assert_eq!(tokens, vec![line("-,-,-")]);
        assert_eq!(tokenizer.pending(), 3);
    }

    #[test]
    fn test_invalid_utf8_is_dropped_and_stream_continues() {
        let mut tokenizer = LineTokenizer::new();
        let tokens = tokenizer.push(b"\xff\xfe\x01\nnoise\n");
        assert_eq!(tokens, vec![Token::Undecodable(3), line("noise")]);
    }

    #[test]
    fn test_truncated_multibyte_sequence_is_undecodable() {
        let mut tokenizer = LineTokenizer::new();
        // First two bytes of a three-byte UTF-8 sequence
        let tokens = tokenizer.push(b"1.0,\xe2\x82\n");
        assert_eq!(tokens, vec![Token::Undecodable(6)]);
    }

    #[test]
    fn test_overlong_line_is_discarded_until_newline() {
        let mut tokenizer = LineTokenizer::with_max_len(8);
        let tokens = tokenizer.push(b"0123456789abcdef\nok\n");
        assert_eq!(tokens, vec![Token::Overlong, line("ok")]);
    }

    #[test]
    fn test_empty_line_is_emitted() {
        let mut tokenizer = LineTokenizer::new();
        assert_eq!(tokenizer.push(b"\r\n"), vec![line("")]);
    }

    #[test]
    fn test_reset_drops_partial_line() {
        let mut tokenizer = LineTokenizer::new();
        tokenizer.push(b"1.0,2.0");
        tokenizer.reset();
        assert_eq!(tokenizer.push(b",3.0\n"), vec![line(",3.0")]);
    }
}
