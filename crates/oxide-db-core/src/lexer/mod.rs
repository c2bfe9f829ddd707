//! SQL Lexer
//!
//! A hand-written lexer producing tokens with byte spans.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
