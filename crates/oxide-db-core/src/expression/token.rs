//! Expression tokens.
//!
//! A token is a 16-bit code. Printable ASCII characters stand for themselves
//! (`'+'`, `'='`, `'('`, ...). Multi-character operators and literal markers
//! use codes from 256 up and are described by a static name table.

use core::fmt;

/// Operator or literal marker of an expression node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ExprToken(pub u16);

macro_rules! named_tokens {
    ($($name:ident = $code:literal, $sql:literal;)*) => {
        impl ExprToken {
            $(
                #[doc = concat!("`", stringify!($name), "`")]
                pub const $name: Self = Self($code);
            )*
        }

        /// Sorted by code.
        static TOKEN_NAMES: &[(u16, &str, &str)] = &[
            $(($code, $sql, stringify!($name)),)*
        ];
    };
}

named_tokens! {
    SQL_NULL = 256, "NULL";
    SQL_TRUE = 257, "TRUE";
    SQL_FALSE = 258, "FALSE";
    INTEGER_CONST = 259, "";
    REAL_CONST = 260, "";
    CHARACTER_STRING_LITERAL = 261, "";
    BINARY_CONST = 262, "";
    IDENTIFIER = 263, "";
    QUERY_PARAMETER = 264, "";
    AND = 265, "AND";
    OR = 266, "OR";
    XOR = 267, "XOR";
    NOT = 268, "NOT";
    NOT_EQUAL = 269, "<>";
    NOT_EQUAL2 = 270, "!=";
    LESS_OR_EQUAL = 271, "<=";
    GREATER_OR_EQUAL = 272, ">=";
    LIKE = 273, "LIKE";
    NOT_LIKE = 274, "NOT LIKE";
    SQL_IN = 275, "IN";
    NOT_IN = 276, "NOT IN";
    SQL_IS_NULL = 277, "IS NULL";
    SQL_IS_NOT_NULL = 278, "IS NOT NULL";
    BETWEEN_AND = 279, "BETWEEN";
    NOT_BETWEEN_AND = 280, "NOT BETWEEN";
    SIMILAR_TO = 281, "SIMILAR TO";
    NOT_SIMILAR_TO = 282, "NOT SIMILAR TO";
    CONCATENATION = 283, "||";
    BITWISE_SHIFT_LEFT = 284, "<<";
    BITWISE_SHIFT_RIGHT = 285, ">>";
}

impl ExprToken {
    /// No token.
    pub const NONE: Self = Self(0);

    /// Token for a single printable character.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_char(c: char) -> Self {
        Self(c as u16)
    }

    /// Returns true for codes of printable ASCII characters.
    #[must_use]
    pub const fn is_printable_char(self) -> bool {
        self.0 >= 0x21 && self.0 <= 0x7e
    }

    /// The character for printable ASCII codes.
    #[must_use]
    pub fn as_char(self) -> Option<char> {
        if self.is_printable_char() {
            u8::try_from(self.0).ok().map(char::from)
        } else {
            None
        }
    }

    fn lookup(self) -> Option<&'static (u16, &'static str, &'static str)> {
        TOKEN_NAMES
            .binary_search_by_key(&self.0, |entry| entry.0)
            .ok()
            .map(|index| &TOKEN_NAMES[index])
    }

    /// SQL text of the token. Zero and unknown codes yield `""`.
    #[must_use]
    pub fn to_sql_string(self) -> String {
        if let Some(c) = self.as_char() {
            return c.to_string();
        }
        self.lookup().map_or_else(String::new, |entry| entry.1.to_string())
    }

    /// Debug name of the token. Zero yields `"0"`, unknown codes their number.
    #[must_use]
    pub fn to_debug_string(self) -> String {
        if let Some(c) = self.as_char() {
            return c.to_string();
        }
        self.lookup()
            .map_or_else(|| self.0.to_string(), |entry| entry.2.to_string())
    }
}

impl fmt::Debug for ExprToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_debug_string())
    }
}

impl fmt::Display for ExprToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_string())
    }
}
