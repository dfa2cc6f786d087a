use std::ops::Range;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input at {pos}: expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("Mismatched closing tag at {pos}: expected </{expected}>, found </{found}>")]
    MismatchedClose {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },

    #[error("Lexer error at {pos}")]
    LexerError { pos: usize },
}

impl ParseError {
    pub fn unexpected_token(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn mismatched_close(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::MismatchedClose {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn lexer_error(pos: usize) -> Self {
        Self::LexerError { pos }
    }

    pub fn pos(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::UnexpectedEof { pos, .. }
            | ParseError::MismatchedClose { pos, .. }
            | ParseError::InvalidSyntax { pos, .. }
            | ParseError::LexerError { pos } => *pos,
        }
    }

    fn label(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. } | ParseError::UnexpectedEof { expected, .. } => {
                format!("expected {}", expected)
            }
            ParseError::MismatchedClose { expected, .. } => format!("expected </{}>", expected),
            ParseError::InvalidSyntax { message, .. } => message.clone(),
            ParseError::LexerError { .. } => "unrecognized input".to_string(),
        }
    }

    fn range(&self, source: &str) -> Range<usize> {
        let start = self.pos().min(source.len().saturating_sub(1));
        start..(start + 1).min(source.len()).max(start)
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let range = error.range(source);
    let mut output = Vec::new();

    let report = Report::build(ReportKind::Error, filename, range.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, range))
                .with_color(Color::Red)
                .with_message(error.label()),
        )
        .finish();

    if report.write((filename, Source::from(source)), &mut output).is_err() {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}

/// Plain single-line rendering when ariadne is disabled
#[cfg(not(feature = "pretty-errors"))]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    let range = error.range(source);
    format!("{}:{}: {} ({})", filename, range.start, error, error.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_positions() {
        let err = ParseError::mismatched_close(12, "mj-section", "mj-column");
        assert_eq!(err.pos(), 12);
        assert!(err.to_string().contains("</mj-section>"));
    }

    #[test]
    fn test_format_error_mentions_file() {
        let source = "<mjml><mj-body></mjml>";
        let err = ParseError::mismatched_close(15, "mj-body", "mjml");
        let rendered = format_error(source, "welcome.mjml", &err);
        assert!(rendered.contains("welcome.mjml"));
    }

    #[test]
    fn test_range_is_clamped_to_source() {
        let err = ParseError::unexpected_eof(100, "closing tag");
        let range = err.range("<mjml>");
        assert!(range.end <= 6);
        assert!(range.start <= range.end);
    }
}
