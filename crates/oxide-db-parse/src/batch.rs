//! Splitting SQL batches into statements.

use oxide_db_core::Lexer;

/// One statement of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatement {
    /// Statement text without the terminating `;` and surrounding whitespace.
    pub text: String,
    /// Byte offset of `text` in the batch.
    pub offset: usize,
    /// 1-based line of the first character of `text`.
    pub line: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
    Bracket,
    LineComment,
    BlockComment,
}

/// Splits `input` on `;` outside string literals, quoted identifiers,
/// `[...]` parameters, `--` and `/* */` comments. Statements holding only
/// whitespace and comments are skipped.
#[must_use]
pub fn split_statements(input: &str) -> Vec<BatchStatement> {
    let mut statements = Vec::new();
    let mut quote = Quote::None;
    let mut start = 0;
    let mut chars = input.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        quote = match (quote, c) {
            (Quote::None, '\'') => Quote::Single,
            (Quote::None, '"') => Quote::Double,
            (Quote::None, '[') => Quote::Bracket,
            (Quote::None, '-') if matches!(chars.peek(), Some((_, '-'))) => {
                chars.next();
                Quote::LineComment
            }
            (Quote::None, '/') if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                Quote::BlockComment
            }
            (Quote::BlockComment, '*') if matches!(chars.peek(), Some((_, '/'))) => {
                chars.next();
                Quote::None
            }
            (Quote::None, ';') => {
                push_statement(&mut statements, input, start, index);
                start = index + 1;
                Quote::None
            }
            // A doubled quote stays inside the literal.
            (Quote::Single, '\'') if matches!(chars.peek(), Some((_, '\''))) => {
                chars.next();
                Quote::Single
            }
            (Quote::Double, '"') if matches!(chars.peek(), Some((_, '"'))) => {
                chars.next();
                Quote::Double
            }
            (Quote::Single, '\'') | (Quote::Double, '"') | (Quote::Bracket, ']') => Quote::None,
            (Quote::LineComment, '\n') => Quote::None,
            (quote, _) => quote,
        };
    }
    push_statement(&mut statements, input, start, input.len());
    statements
}

fn push_statement(statements: &mut Vec<BatchStatement>, input: &str, start: usize, end: usize) {
    let raw = &input[start..end];
    if Lexer::new(raw).next_token().is_eof() {
        return;
    }
    let leading = raw.len() - raw.trim_start().len();
    let offset = start + leading;
    let line = input[..offset].matches('\n').count() + 1;
    statements.push(BatchStatement {
        text: raw.trim().to_string(),
        offset,
        line,
    });
}
