//! Events that drive the grammar automaton, and the errors it can raise.

use std::fmt;

use crate::State;

/// Events understood by the automaton.
///
/// Most events are spelled literally in the source. `Driver`, `Key` and
/// `Val` are synthetic: the decoder raises them for tokens that are not
/// literals (plugin names, setting keys and setting values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// `input`
    Input,
    /// `filter`
    Filter,
    /// `output`
    Output,
    /// `{`
    Open,
    /// `}`
    Close,
    /// `if`
    If,
    /// `else`
    Else,
    /// `=>`
    Arrow,
    /// A plugin name.
    Driver,
    /// A setting key.
    Key,
    /// A setting value.
    Val,
}

impl Event {
    /// Match a token against the literal events.
    ///
    /// Synthetic events are never produced here, so a plugin that happens to
    /// be called `driver` is still a plugin.
    pub fn literal(text: &str) -> Option<Event> {
        Some(match text {
            "input" => Event::Input,
            "filter" => Event::Filter,
            "output" => Event::Output,
            "{" => Event::Open,
            "}" => Event::Close,
            "if" => Event::If,
            "else" => Event::Else,
            "=>" => Event::Arrow,
            _ => return None,
        })
    }

    /// The name of this event.
    pub fn name(self) -> &'static str {
        match self {
            Event::Input => "input",
            Event::Filter => "filter",
            Event::Output => "output",
            Event::Open => "{",
            Event::Close => "}",
            Event::If => "if",
            Event::Else => "else",
            Event::Arrow => "=>",
            Event::Driver => "driver",
            Event::Key => "key",
            Event::Val => "val",
        }
    }

    /// Whether this event stands for a non-literal token.
    pub fn is_synthetic(self) -> bool {
        matches!(self, Event::Driver | Event::Key | Event::Val)
    }

    /// The section opened by this event, if it is a section keyword.
    pub fn section(self) -> Option<SectionName> {
        match self {
            Event::Input => Some(SectionName::Input),
            Event::Filter => Some(SectionName::Filter),
            Event::Output => Some(SectionName::Output),
            _ => None,
        }
    }

    /// The branch kind opened by this event, if it is a condition keyword.
    pub fn branch(self) -> Option<BranchKind> {
        match self {
            Event::If => Some(BranchKind::If),
            Event::Else => Some(BranchKind::Else),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three top-level pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionName {
    /// `input { ... }`
    Input,
    /// `filter { ... }`
    Filter,
    /// `output { ... }`
    Output,
}

impl SectionName {
    /// All sections, in pipeline order.
    pub const ALL: [SectionName; 3] = [
        SectionName::Input,
        SectionName::Filter,
        SectionName::Output,
    ];

    /// The keyword for this section.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionName::Input => "input",
            SectionName::Filter => "filter",
            SectionName::Output => "output",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The keyword that opened a conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// `if <expr> { ... }`
    If,
    /// `else { ... }`
    Else,
}

impl BranchKind {
    /// The keyword for this branch kind.
    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::If => "if",
            BranchKind::Else => "else",
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that is not legal where it appears.
    UnexpectedToken {
        /// The offending token text.
        token: String,
        /// What would have been accepted instead.
        expected: &'static str,
    },
    /// The input ended inside a section, plugin or branch.
    UnclosedEntity {
        /// Where the automaton was stuck.
        state: State,
    },
    /// A conditional block was opened and closed with nothing in it.
    EmptyBranch,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedToken { token, expected } => {
                write!(f, "unexpected token `{token}`, expected {expected}")
            }
            ParseErrorKind::UnclosedEntity { state } => {
                write!(f, "unclosed entity (input ended in state {state})")
            }
            ParseErrorKind::EmptyBranch => write!(f, "empty if/else branch"),
        }
    }
}
