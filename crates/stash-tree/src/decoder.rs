//! Decoder: drives the tokenizer and the grammar automaton and builds the tree.

use std::io::{self, Read};

use stash_parse::{
    Automaton, BranchKind, Event, ParseErrorKind, Span, State, Token, Tokenizer, Transition,
};
use tracing::{debug, trace};

use crate::node::{Branch, Config, NodeId, Operation, Plugin};
use crate::{DecodeOptions, ParseError};

/// Error during decoding.
#[derive(Debug)]
pub enum DecodeError {
    /// The input is not a valid configuration.
    Parse(ParseError),
    /// Reading the input failed.
    Io(io::Error),
}

impl DecodeError {
    /// The parse error, if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            DecodeError::Parse(error) => Some(error),
            DecodeError::Io(_) => None,
        }
    }

    /// The parse error kind, if this is a parse error.
    pub fn kind(&self) -> Option<&ParseErrorKind> {
        self.as_parse_error().map(|error| &error.kind)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Parse(error) => write!(f, "{error}"),
            DecodeError::Io(error) => write!(f, "read error: {error}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Parse(error) => Some(error),
            DecodeError::Io(error) => Some(error),
        }
    }
}

impl From<ParseError> for DecodeError {
    fn from(error: ParseError) -> Self {
        DecodeError::Parse(error)
    }
}

impl From<io::Error> for DecodeError {
    fn from(error: io::Error) -> Self {
        DecodeError::Io(error)
    }
}

/// Decodes one configuration from a reader.
///
/// `decode` consumes the decoder: a stream is read exactly once, from its
/// current position to the end.
pub struct Decoder<R> {
    tokens: Tokenizer<R>,
    automaton: Automaton,
    config: Config,
    /// Node receiving new children.
    cursor: Option<NodeId>,
    /// Expression tokens collected since `if`/`else`.
    expression: String,
    /// Span of the `if`/`else` keyword being collected.
    condition_span: Span,
    /// Key waiting for its value.
    pending_key: Option<String>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    /// Create a decoder with the given options.
    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self {
            tokens: Tokenizer::with_chunk_size(reader, options.chunk_size),
            automaton: Automaton::new(),
            config: Config::default(),
            cursor: None,
            expression: String::new(),
            condition_span: Span::default(),
            pending_key: None,
        }
    }

    /// Read the whole stream and return the decoded configuration.
    pub fn decode(mut self) -> Result<Config, DecodeError> {
        while let Some(token) = self.tokens.next_token(self.automaton.state().mode())? {
            self.step(token)?;
        }

        if !self.automaton.is_terminal() {
            let state = self.automaton.state();
            let span = match (state, self.cursor) {
                (State::CondStart, _) => self.condition_span,
                (_, Some(id)) => self.config.span_of(id),
                (_, None) => Span::empty(self.tokens.position()),
            };
            return Err(ParseError::new(ParseErrorKind::UnclosedEntity { state }, span).into());
        }

        debug!(nodes = self.config.len(), "decoded config");
        Ok(self.config)
    }

    fn step(&mut self, token: Token) -> Result<(), ParseError> {
        trace!(state = %self.automaton.state(), token = %token.text, "step");
        match self.automaton.state() {
            State::Section | State::SectionStart => self.on_section(token),
            State::Entity | State::EntityStart => self.on_entity(token),
            State::CondStart => self.on_condition(token),
            State::Driver => self.on_driver(token),
            State::KeyStart => self.on_literal(&token).map(|_| ()),
            State::Value => self.on_value(token),
        }
    }

    fn on_section(&mut self, token: Token) -> Result<(), ParseError> {
        let transition = self.on_literal(&token)?;
        let Some(name) = transition.event.section() else {
            return Ok(());
        };
        if self.config.has_section(name) {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    token: token.text,
                    expected: "a section that is not declared yet",
                },
                token.span,
            ));
        }
        let id = self.config.insert_section(name, token.span);
        debug!(section = %name, "section opened");
        self.cursor = Some(id);
        Ok(())
    }

    fn on_entity(&mut self, token: Token) -> Result<(), ParseError> {
        if Event::literal(&token.text).is_some() {
            let transition = self.on_literal(&token)?;
            if transition.to == State::CondStart {
                self.condition_span = token.span;
                self.expression.clear();
            }
            return Ok(());
        }
        if self.automaton.state() != State::Entity {
            return Err(self.unexpected(&token));
        }

        let parent = self.current(&token)?;
        self.fire(Event::Driver, &token)?;
        debug!(plugin = %token.text, "plugin opened");
        let id = self
            .config
            .append(parent, Operation::Plugin(Plugin::new(token.text)), token.span);
        self.cursor = Some(id);
        Ok(())
    }

    fn on_condition(&mut self, token: Token) -> Result<(), ParseError> {
        if Event::literal(&token.text) != Some(Event::Open) {
            self.expression.push_str(&token.text);
            return Ok(());
        }

        let kind = self.automaton.condition().unwrap_or(BranchKind::If);
        let parent = self.current(&token)?;
        self.fire(Event::Open, &token)?;
        let branch = Branch {
            kind,
            expression: std::mem::take(&mut self.expression),
        };
        debug!(kind = %branch.kind, expression = %branch.expression, "branch opened");
        let id = self
            .config
            .append(parent, Operation::Branch(branch), self.condition_span);
        self.cursor = Some(id);
        Ok(())
    }

    fn on_driver(&mut self, token: Token) -> Result<(), ParseError> {
        if Event::literal(&token.text).is_some() {
            return self.on_literal(&token).map(|_| ());
        }
        self.fire(Event::Key, &token)?;
        self.pending_key = Some(token.text);
        Ok(())
    }

    fn on_value(&mut self, token: Token) -> Result<(), ParseError> {
        let Some(key) = self.pending_key.take() else {
            return Err(self.unexpected(&token));
        };
        let Some(plugin) = self.cursor.and_then(|id| self.config.plugin_mut(id)) else {
            return Err(self.unexpected(&token));
        };
        plugin.set(key, token.text.trim());
        self.fire(Event::Val, &token)?;
        Ok(())
    }

    /// Fire the literal event spelled by `token`; anything else is a syntax error.
    fn on_literal(&mut self, token: &Token) -> Result<Transition, ParseError> {
        match Event::literal(&token.text) {
            Some(event) => self.fire(event, token),
            None => Err(self.unexpected(token)),
        }
    }

    fn fire(&mut self, event: Event, token: &Token) -> Result<Transition, ParseError> {
        match self.automaton.fire(event) {
            Ok(Some(transition)) => {
                if transition.ascends() {
                    self.cursor = self.cursor.and_then(|id| self.config.parent_of(id));
                }
                Ok(transition)
            }
            Ok(None) => Err(self.unexpected(token)),
            Err(ParseErrorKind::EmptyBranch) => {
                let opened = self.cursor.map_or(token.span, |id| self.config.span_of(id));
                Err(ParseError::new(
                    ParseErrorKind::EmptyBranch,
                    opened.to(token.span),
                ))
            }
            Err(kind) => Err(ParseError::new(kind, token.span)),
        }
    }

    fn current(&self, token: &Token) -> Result<NodeId, ParseError> {
        self.cursor.ok_or_else(|| self.unexpected(token))
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                token: token.text.clone(),
                expected: self.automaton.state().expected(),
            },
            token.span,
        )
    }
}
