//! Diagnostic rendering for decode errors.

use ariadne::{Color, IndexType, Label, Report, ReportKind, Source};
use stash_parse::{ParseErrorKind, Span};

/// A parse error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Source location.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range: std::ops::Range<usize> = self.span.into();
        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_config(ariadne::Config::default().with_index_type(IndexType::Byte));

        match &self.kind {
            ParseErrorKind::UnexpectedToken { token, expected } => report
                .with_message(format!("unexpected token `{token}`"))
                .with_label(
                    Label::new((filename, range))
                        .with_message(format!("expected {expected}"))
                        .with_color(Color::Red),
                ),

            ParseErrorKind::UnclosedEntity { state } => report
                .with_message("unclosed entity")
                .with_label(
                    Label::new((filename, range))
                        .with_message("opened here")
                        .with_color(Color::Red),
                )
                .with_help(format!("input ended in state `{state}`; add a closing '}}'")),

            ParseErrorKind::EmptyBranch => report
                .with_message("empty if/else branch")
                .with_label(
                    Label::new((filename, range))
                        .with_message("this branch has no content")
                        .with_color(Color::Red),
                )
                .with_help("add a plugin or a nested condition, or remove the branch"),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.span.start)
    }
}

impl std::error::Error for ParseError {}
