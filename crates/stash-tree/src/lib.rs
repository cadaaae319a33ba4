#![doc = include_str!("../README.md")]

use std::io::Read;

mod decoder;
mod diagnostic;
mod node;
mod options;

pub use decoder::{DecodeError, Decoder};
pub use diagnostic::ParseError;
pub use node::{Branch, Config, Node, NodeId, Operation, OperationType, Plugin, Section};
pub use options::DecodeOptions;
pub use stash_parse::{BranchKind, ParseErrorKind, SectionName, Span, State};

/// Decode a configuration from a reader.
pub fn decode<R: Read>(reader: R) -> Result<Config, DecodeError> {
    Decoder::new(reader).decode()
}

/// Decode a configuration held in memory.
pub fn decode_str(source: &str) -> Result<Config, DecodeError> {
    decode(source.as_bytes())
}

#[cfg(test)]
mod tests;
