//! Table-driven grammar automaton.

use std::fmt;

use tracing::trace;

use crate::{BranchKind, Event, Mode, ParseErrorKind};

/// Automaton states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Between sections. Initial and only accepting state.
    #[default]
    Section,
    /// After a section keyword, waiting for `{`.
    SectionStart,
    /// Inside a section or branch body.
    Entity,
    /// After `if`/`else`, collecting the expression up to `{`.
    CondStart,
    /// After a plugin name, waiting for `{`.
    EntityStart,
    /// Inside a plugin body.
    Driver,
    /// After a setting key, waiting for `=>`.
    KeyStart,
    /// Reading a setting value.
    Value,
}

impl State {
    /// The state name.
    pub fn name(self) -> &'static str {
        match self {
            State::Section => "section",
            State::SectionStart => "section_start",
            State::Entity => "entity",
            State::CondStart => "cond_start",
            State::EntityStart => "entity_start",
            State::Driver => "driver",
            State::KeyStart => "key_start",
            State::Value => "value",
        }
    }

    /// Tokenizer mode for tokens read in this state.
    pub fn mode(self) -> Mode {
        match self {
            State::Value => Mode::Value,
            _ => Mode::Word,
        }
    }

    /// Human description of what this state accepts, for error messages.
    pub fn expected(self) -> &'static str {
        match self {
            State::Section => "`input`, `filter` or `output`",
            State::SectionStart | State::EntityStart => "`{`",
            State::Entity => "a plugin name, `if`, `else` or `}`",
            State::CondStart => "an expression or `{`",
            State::Driver => "a setting key or `}`",
            State::KeyStart => "`=>`",
            State::Value => "a value",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// (event, source, destination)
const TRANSITIONS: &[(Event, State, State)] = &[
    (Event::Input, State::Section, State::SectionStart),
    (Event::Output, State::Section, State::SectionStart),
    (Event::Filter, State::Section, State::SectionStart),
    (Event::Open, State::SectionStart, State::Entity),
    (Event::Close, State::Entity, State::Section),
    (Event::If, State::Entity, State::CondStart),
    (Event::Else, State::Entity, State::CondStart),
    (Event::Open, State::CondStart, State::Entity),
    (Event::Driver, State::Entity, State::EntityStart),
    (Event::Open, State::EntityStart, State::Driver),
    (Event::Close, State::Driver, State::Entity),
    (Event::Key, State::Driver, State::KeyStart),
    (Event::Arrow, State::KeyStart, State::Value),
    (Event::Val, State::Value, State::Driver),
];

fn destination(from: State, event: Event) -> Option<State> {
    TRANSITIONS
        .iter()
        .find(|(e, src, _)| *e == event && *src == from)
        .map(|(_, _, dst)| *dst)
}

/// A transition the automaton has taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The event that fired.
    pub event: Event,
    /// State before the event.
    pub from: State,
    /// State after the event.
    pub to: State,
    /// The table transition was vetoed by a guard and the state did not change.
    pub cancelled: bool,
}

impl Transition {
    /// Whether the tree cursor must move to its parent.
    ///
    /// Every `}` closes something: a plugin, a branch or a section.
    pub fn ascends(&self) -> bool {
        self.event == Event::Close
    }
}

/// The grammar automaton and its guard state.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    state: State,
    /// Conditional blocks currently open.
    nesting: u32,
    /// The innermost open conditional block has no content yet.
    fresh: bool,
    /// Keyword that led into the current `CondStart`.
    condition: Option<BranchKind>,
}

impl Automaton {
    /// Create an automaton in the initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of conditional blocks currently open.
    #[inline]
    pub fn nesting(&self) -> u32 {
        self.nesting
    }

    /// Keyword recorded when the current condition was entered.
    #[inline]
    pub fn condition(&self) -> Option<BranchKind> {
        self.condition
    }

    /// Whether the automaton is back in its initial state.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state == State::Section
    }

    /// Whether `event` has a table transition out of the current state.
    pub fn can(&self, event: Event) -> bool {
        destination(self.state, event).is_some()
    }

    /// Fire `event`.
    ///
    /// Returns `Ok(None)` when the current state has no transition for
    /// `event`; the automaton is left untouched. Guards may cancel a
    /// transition, which is reported with `cancelled` set.
    pub fn fire(&mut self, event: Event) -> Result<Option<Transition>, ParseErrorKind> {
        let from = self.state;
        let Some(to) = destination(from, event) else {
            return Ok(None);
        };

        // A `}` in a body closes the innermost branch before it may close
        // the section.
        if from == State::Entity && to == State::Section && self.nesting > 0 {
            if self.fresh {
                return Err(ParseErrorKind::EmptyBranch);
            }
            self.nesting -= 1;
            trace!(%event, %from, nesting = self.nesting, "transition cancelled");
            return Ok(Some(Transition {
                event,
                from,
                to: from,
                cancelled: true,
            }));
        }

        match from {
            State::CondStart => {
                self.nesting += 1;
                self.fresh = true;
            }
            State::Entity if to != State::Section => self.fresh = false,
            _ => {}
        }

        match to {
            State::CondStart => self.condition = event.branch(),
            State::Section => debug_assert_eq!(self.nesting, 0),
            _ => {}
        }

        self.state = to;
        trace!(%event, %from, %to, nesting = self.nesting, "transition");
        Ok(Some(Transition {
            event,
            from,
            to,
            cancelled: false,
        }))
    }
}
