//! Token types for the stash tokenizer.

use crate::Span;

/// Which characters end a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Any whitespace ends a token and is discarded.
    #[default]
    Word,
    /// Only `\n` ends a token; spaces and tabs stay inside it.
    Value,
}

impl Mode {
    /// Whether `c` is a token boundary in this mode.
    #[inline]
    pub fn is_boundary(self, c: char) -> bool {
        match self {
            Mode::Word => c.is_whitespace(),
            Mode::Value => c == '\n',
        }
    }
}

/// A token with its text and span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The source text of this token.
    pub text: String,
    /// The span in the source text.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// The token text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}
