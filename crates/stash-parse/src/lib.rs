#![doc = include_str!("../README.md")]

pub use stash_tokenizer::{Mode, Span, Token, Tokenizer};

mod events;
pub use events::{BranchKind, Event, ParseErrorKind, SectionName};

mod automaton;
pub use automaton::{Automaton, State, Transition};
