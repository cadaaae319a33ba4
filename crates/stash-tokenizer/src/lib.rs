#![doc = include_str!("../README.md")]

mod span;
pub use span::Span;

mod token;
pub use token::{Mode, Token};

mod reader;
pub use reader::CharReader;

mod tokenizer;
pub use tokenizer::Tokenizer;
