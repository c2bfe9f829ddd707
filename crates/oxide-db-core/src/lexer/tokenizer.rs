//! SQL tokenizer.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
///
/// Cloning a lexer is cheap and gives an independent cursor, which the parser
/// uses for lookahead.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // -- comment
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // /* comment */
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    const fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    const fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn error(&self, message: impl Into<String>) -> Token {
        self.make_token(TokenKind::Error(message.into()))
    }

    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(text.to_string())),
        }
    }

    /// Scans text delimited by `quote`, where a doubled quote stands for one
    /// quote character. The opening quote must be current.
    fn scan_delimited(&mut self, quote: char) -> Option<String> {
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    if self.peek_next() == Some(quote) {
                        value.push(quote);
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        return Some(value);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => return None,
            }
        }
    }

    fn scan_quoted_identifier(&mut self, quote: char) -> Token {
        match self.scan_delimited(quote) {
            Some(name) if name.is_empty() => self.error("Empty quoted identifier"),
            Some(name) => self.make_token(TokenKind::Identifier(name)),
            None => self.error("Unterminated quoted identifier"),
        }
    }

    fn scan_string(&mut self, quote: char) -> Token {
        match self.scan_delimited(quote) {
            Some(value) => self.make_token(TokenKind::String(value)),
            None => self.error("Unterminated string literal"),
        }
    }

    fn scan_query_parameter(&mut self) -> Token {
        self.advance();
        let content_start = self.pos;
        while self.peek().is_some_and(|c| c != ']') {
            self.advance();
        }
        if self.peek().is_none() {
            return self.error("Unterminated query parameter");
        }
        let message = self.input[content_start..self.pos].trim().to_string();
        self.advance();
        self.make_token(TokenKind::QueryParameter(message))
    }

    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];
        if is_float {
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() => self.make_token(TokenKind::Float(f)),
                Ok(_) => self.error(format!("Real number out of range: {text}")),
                Err(e) => self.error(format!("Invalid real number: {e}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(e) => self.error(format!("Invalid integer: {e}")),
            }
        }
    }

    /// Scans a blob literal (X'...' or x'...').
    fn scan_blob(&mut self) -> Token {
        self.advance();
        self.advance();

        let mut bytes = Vec::new();
        let mut pending: Option<u8> = None;
        loop {
            match self.advance() {
                Some('\'') => break,
                Some(c) if c.is_ascii_hexdigit() => {
                    #[allow(clippy::cast_possible_truncation)]
                    let nibble = c.to_digit(16).unwrap_or_default() as u8;
                    match pending.take() {
                        Some(high) => bytes.push(high << 4 | nibble),
                        None => pending = Some(nibble),
                    }
                }
                Some(c) if c.is_whitespace() => {}
                Some(_) => return self.error("Invalid character in blob literal"),
                None => return self.error("Unterminated blob literal"),
            }
        }

        if pending.is_some() {
            return self.error("Odd number of hex digits in blob literal");
        }
        self.make_token(TokenKind::Blob(bytes))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '\'' => return self.scan_string('\''),
            '"' => return self.scan_quoted_identifier('"'),
            '`' => return self.scan_quoted_identifier('`'),
            '[' => return self.scan_query_parameter(),
            'X' | 'x' if self.peek_next() == Some('\'') => return self.scan_blob(),
            c if c.is_ascii_digit() => return self.scan_number(),
            c if c.is_alphabetic() || c == '_' => return self.scan_identifier(),
            _ => {}
        }

        self.advance();
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '~' => TokenKind::BitNot,
            '&' => TokenKind::BitAnd,
            '?' => TokenKind::Question,
            '=' => TokenKind::Eq,
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::LtEq
                }
                Some('>') => {
                    self.advance();
                    TokenKind::NotEq
                }
                Some('<') => {
                    self.advance();
                    TokenKind::LeftShift
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::GtEq
                }
                Some('>') => {
                    self.advance();
                    TokenKind::RightShift
                }
                _ => TokenKind::Gt,
            },
            '!' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::BangEq
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    TokenKind::Concat
                } else {
                    TokenKind::BitOr
                }
            }
            other => TokenKind::Error(format!("Unexpected character: {other}")),
        };
        self.make_token(kind)
    }

    /// Tokenizes the entire input, including the trailing EOF token.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
