//! Incremental UTF-8 decoding on top of `std::io::Read`.

use std::io::{self, Read};

use tracing::trace;

/// Default number of bytes requested per read.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Yields the characters of a byte stream one at a time.
///
/// Bytes are pulled in chunks. A multi-byte character cut in half by a chunk
/// boundary is carried over and completed by the next read.
pub struct CharReader<R> {
    inner: R,
    chunk: Box<[u8]>,
    /// Bytes of an incomplete trailing sequence from the previous read.
    carry: Vec<u8>,
    /// Characters decoded from the current chunk.
    decoded: String,
    /// Byte offset of the next unread character in `decoded`.
    cursor: usize,
    eof: bool,
}

impl<R: Read> CharReader<R> {
    /// Create a reader with the default chunk size.
    pub fn new(inner: R) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    /// Create a reader that requests `chunk_size` bytes per read (at least 1).
    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk: vec![0; chunk_size.max(1)].into_boxed_slice(),
            carry: Vec::with_capacity(4),
            decoded: String::new(),
            cursor: 0,
            eof: false,
        }
    }

    /// Get the next character, or `None` at end of stream.
    pub fn next_char(&mut self) -> io::Result<Option<char>> {
        loop {
            if let Some(c) = self.decoded[self.cursor..].chars().next() {
                self.cursor += c.len_utf8();
                return Ok(Some(c));
            }
            if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.decoded.clear();
        self.cursor = 0;

        let n = loop {
            match self.inner.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        trace!(bytes = n, carried = self.carry.len(), "read chunk");

        if n == 0 {
            self.eof = true;
            if !self.carry.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "stream ends inside a multi-byte character",
                ));
            }
            return Ok(());
        }

        self.carry.extend_from_slice(&self.chunk[..n]);
        match std::str::from_utf8(&self.carry) {
            Ok(text) => {
                self.decoded.push_str(text);
                self.carry.clear();
            }
            // An error with a length is a real encoding error; without one
            // the tail is merely incomplete and waits for the next read.
            Err(e) if e.error_len().is_some() => {
                return Err(io::Error::new(io::ErrorKind::InvalidData, e));
            }
            Err(e) => {
                let valid = e.valid_up_to();
                let text = std::str::from_utf8(&self.carry[..valid])
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                self.decoded.push_str(text);
                self.carry.drain(..valid);
            }
        }
        Ok(())
    }
}
