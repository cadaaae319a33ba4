//! Options for decoding.

/// Options for [`Decoder`](crate::Decoder).
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Bytes requested per read from the underlying stream (default: 8192).
    /// Values below 1 are treated as 1.
    pub chunk_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            chunk_size: 8 * 1024,
        }
    }
}

impl DecodeOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the read chunk size.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}
