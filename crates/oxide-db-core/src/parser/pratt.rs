//! Pratt expression parser for operator precedence.

use crate::expression::{ExprToken, ExpressionClass};
use crate::lexer::{Keyword, TokenKind};

/// Binding power of `NOT` used as a prefix operator.
pub const NOT_BINDING_POWER: u8 = 5;

/// Binding power of the arithmetic prefix operators.
pub const UNARY_BINDING_POWER: u8 = 19;

/// Returns the prefix binding power for a token.
///
/// Returns `None` if the token is not a prefix operator.
#[must_use]
pub const fn prefix_binding_power(kind: &TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Minus | TokenKind::Plus | TokenKind::BitNot => Some(UNARY_BINDING_POWER),
        TokenKind::Keyword(Keyword::Not) => Some(NOT_BINDING_POWER),
        _ => None,
    }
}

/// Returns the infix binding power for a token.
///
/// Returns `(left_bp, right_bp)` where:
/// - Higher binding power = binds tighter
/// - Left associative: left_bp < right_bp
///
/// Returns `None` if the token is not an infix operator.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        // Logical OR and XOR (lowest precedence)
        TokenKind::Keyword(Keyword::Or | Keyword::Xor) => Some((1, 2)),

        // Logical AND
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),

        // Comparison operators
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::BangEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq => Some((7, 8)),

        // IS, IN, BETWEEN, LIKE, SIMILAR TO and their NOT forms
        TokenKind::Keyword(
            Keyword::Is
            | Keyword::In
            | Keyword::Between
            | Keyword::Like
            | Keyword::Similar
            | Keyword::Not,
        ) => Some((7, 8)),

        // Bitwise OR
        TokenKind::BitOr => Some((9, 10)),

        // Bitwise AND
        TokenKind::BitAnd => Some((11, 12)),

        // Bit shifts
        TokenKind::LeftShift | TokenKind::RightShift => Some((13, 14)),

        // Additive (string concat has same precedence as addition)
        TokenKind::Plus | TokenKind::Minus | TokenKind::Concat => Some((15, 16)),

        // Multiplicative
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((17, 18)),

        _ => None,
    }
}

/// Converts a token to a binary operator token and class.
#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<(ExprToken, ExpressionClass)> {
    let op = match kind {
        TokenKind::Plus => (ExprToken::from_char('+'), ExpressionClass::Arithmetic),
        TokenKind::Minus => (ExprToken::from_char('-'), ExpressionClass::Arithmetic),
        TokenKind::Star => (ExprToken::from_char('*'), ExpressionClass::Arithmetic),
        TokenKind::Slash => (ExprToken::from_char('/'), ExpressionClass::Arithmetic),
        TokenKind::Percent => (ExprToken::from_char('%'), ExpressionClass::Arithmetic),
        TokenKind::BitAnd => (ExprToken::from_char('&'), ExpressionClass::Arithmetic),
        TokenKind::BitOr => (ExprToken::from_char('|'), ExpressionClass::Arithmetic),
        TokenKind::LeftShift => (ExprToken::BITWISE_SHIFT_LEFT, ExpressionClass::Arithmetic),
        TokenKind::RightShift => (ExprToken::BITWISE_SHIFT_RIGHT, ExpressionClass::Arithmetic),
        TokenKind::Concat => (ExprToken::CONCATENATION, ExpressionClass::Arithmetic),
        TokenKind::Eq => (ExprToken::from_char('='), ExpressionClass::Relational),
        TokenKind::NotEq => (ExprToken::NOT_EQUAL, ExpressionClass::Relational),
        TokenKind::BangEq => (ExprToken::NOT_EQUAL2, ExpressionClass::Relational),
        TokenKind::Lt => (ExprToken::from_char('<'), ExpressionClass::Relational),
        TokenKind::LtEq => (ExprToken::LESS_OR_EQUAL, ExpressionClass::Relational),
        TokenKind::Gt => (ExprToken::from_char('>'), ExpressionClass::Relational),
        TokenKind::GtEq => (ExprToken::GREATER_OR_EQUAL, ExpressionClass::Relational),
        TokenKind::Keyword(Keyword::Like) => (ExprToken::LIKE, ExpressionClass::Relational),
        TokenKind::Keyword(Keyword::And) => (ExprToken::AND, ExpressionClass::Logical),
        TokenKind::Keyword(Keyword::Or) => (ExprToken::OR, ExpressionClass::Logical),
        TokenKind::Keyword(Keyword::Xor) => (ExprToken::XOR, ExpressionClass::Logical),
        _ => return None,
    };
    Some(op)
}

/// Converts a token to a unary operator token.
#[must_use]
pub const fn token_to_unary_op(kind: &TokenKind) -> Option<ExprToken> {
    match kind {
        TokenKind::Minus => Some(ExprToken::from_char('-')),
        TokenKind::Plus => Some(ExprToken::from_char('+')),
        TokenKind::BitNot => Some(ExprToken::from_char('~')),
        TokenKind::Keyword(Keyword::Not) => Some(ExprToken::NOT),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        // Multiplication should bind tighter than addition
        let add_bp = infix_binding_power(&TokenKind::Plus).unwrap();
        let mul_bp = infix_binding_power(&TokenKind::Star).unwrap();
        assert!(mul_bp.0 > add_bp.0);

        // AND should bind tighter than OR
        let and_bp = infix_binding_power(&TokenKind::Keyword(Keyword::And)).unwrap();
        let or_bp = infix_binding_power(&TokenKind::Keyword(Keyword::Or)).unwrap();
        assert!(and_bp.0 > or_bp.0);

        // NOT sits between AND and the comparisons
        let eq_bp = infix_binding_power(&TokenKind::Eq).unwrap();
        assert!(NOT_BINDING_POWER > and_bp.0);
        assert!(NOT_BINDING_POWER < eq_bp.0);
    }

    #[test]
    fn test_left_associativity() {
        let (left, right) = infix_binding_power(&TokenKind::Minus).unwrap();
        assert!(left < right);
    }

    #[test]
    fn test_token_to_binary_op() {
        assert_eq!(
            token_to_binary_op(&TokenKind::NotEq),
            Some((ExprToken::NOT_EQUAL, ExpressionClass::Relational))
        );
        assert_eq!(
            token_to_binary_op(&TokenKind::Keyword(Keyword::Xor)),
            Some((ExprToken::XOR, ExpressionClass::Logical))
        );
        assert_eq!(token_to_binary_op(&TokenKind::LeftParen), None);
    }

    #[test]
    fn test_token_to_unary_op() {
        assert_eq!(token_to_unary_op(&TokenKind::BitNot), Some(ExprToken::from_char('~')));
        assert_eq!(token_to_unary_op(&TokenKind::Keyword(Keyword::Not)), Some(ExprToken::NOT));
        assert_eq!(token_to_unary_op(&TokenKind::Star), None);
        assert_eq!(prefix_binding_power(&TokenKind::Star), None);
    }
}
