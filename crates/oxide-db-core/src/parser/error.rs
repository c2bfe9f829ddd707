//! Parser error types.

use crate::lexer::{Span, TokenKind};

/// Whether a parse error comes from the grammar or from name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The text does not match the grammar.
    Syntax,
    /// The text is well formed but names something the schema does not have.
    Semantic,
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at position {span}")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
    /// Syntax or semantic.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Creates a new syntax error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
            kind: ParseErrorKind::Syntax,
        }
    }

    /// Creates a name-resolution error.
    #[must_use]
    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::Semantic,
            ..Self::new(message, span)
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected: String = expected.into();
        let message = match &found {
            TokenKind::Eof => format!("Unexpected end of input: expected {expected}"),
            TokenKind::Error(reason) => reason.clone(),
            other => format!("Unexpected token: expected {expected}, found {other:?}"),
        };
        Self {
            message,
            span,
            expected: Some(expected),
            found: Some(found),
            kind: ParseErrorKind::Syntax,
        }
    }

    /// Returns true for name-resolution errors.
    #[must_use]
    pub fn is_semantic(&self) -> bool {
        self.kind == ParseErrorKind::Semantic
    }

    /// Byte offset where the error starts.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.span.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_eof_message() {
        let err = ParseError::unexpected("FROM", TokenKind::Eof, Span::at(9));
        assert_eq!(err.message, "Unexpected end of input: expected FROM");
        assert_eq!(err.to_string(), "Unexpected end of input: expected FROM at position 9..9");
        assert!(!err.is_semantic());
    }

    #[test]
    fn test_lexer_error_passes_through() {
        let err = ParseError::unexpected(
            "expression",
            TokenKind::Error(String::from("Unterminated string literal")),
            Span::new(7, 12),
        );
        assert_eq!(err.message, "Unterminated string literal");
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn test_semantic() {
        let err = ParseError::semantic("Unknown column 'ghost'", Span::new(7, 12));
        assert!(err.is_semantic());
        assert_eq!(err.found, None);
    }
}
