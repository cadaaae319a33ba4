//! Tokenizer for the stash configuration language.

use std::io::{self, Read};

use crate::{CharReader, Mode, Span, Token};
use tracing::trace;

/// A tokenizer that pulls tokens from a byte stream.
///
/// The boundary rules are chosen per token by the caller, because which
/// characters separate tokens depends on where the grammar currently is.
pub struct Tokenizer<R> {
    chars: CharReader<R>,
    /// Current byte position in the stream.
    pos: u32,
    /// Characters of the token being accumulated.
    buffer: String,
    /// Byte offset where `buffer` starts.
    start: u32,
    /// Byte offset just past the last character pushed to `buffer`.
    end: u32,
}

impl<R: Read> Tokenizer<R> {
    /// Create a new tokenizer over `reader`.
    pub fn new(reader: R) -> Self {
        Self::from_chars(CharReader::new(reader))
    }

    /// Create a tokenizer that reads `chunk_size` bytes at a time.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self::from_chars(CharReader::with_chunk_size(reader, chunk_size))
    }

    fn from_chars(chars: CharReader<R>) -> Self {
        Self {
            chars,
            pos: 0,
            buffer: String::new(),
            start: 0,
            end: 0,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Get the next token using the boundary rules of `mode`.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. A token still being
    /// accumulated when the stream ends is returned first.
    pub fn next_token(&mut self, mode: Mode) -> io::Result<Option<Token>> {
        while let Some(c) = self.chars.next_char()? {
            let at = self.pos;
            self.pos += c.len_utf8() as u32;

            if mode.is_boundary(c) {
                if let Some(token) = self.flush() {
                    return Ok(Some(token));
                }
            } else {
                if self.buffer.is_empty() {
                    self.start = at;
                }
                self.buffer.push(c);
                self.end = self.pos;
            }
        }
        Ok(self.flush())
    }

    fn flush(&mut self) -> Option<Token> {
        if self.buffer.is_empty() {
            return None;
        }
        let span = Span::new(self.start, self.end);
        let text = std::mem::take(&mut self.buffer);
        trace!("Token at {:?}: {:?}", span, text);
        Some(Token::new(text, span))
    }
}
