// Token types shared by the SIMPLE and PQL pipelines.
//
// A token is a category plus its source text. Keyword and symbol text
// lives in typed constants so parser comparisons are spelled against
// named items rather than string literals scattered through the code.

use std::fmt;

/// Token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `[A-Za-z][A-Za-z0-9]*`
    Identifier,
    /// `[0-9]+` (raw text; leading zeros preserved by the tokenizer)
    Number,
    /// `+ - * / %`, comparison operators, `&&`, `||`
    Operator,
    /// One of `{ } ( ) ; _ " , . #`
    Delimiter,
    /// A single whitespace character (only emitted when the tokenizer is
    /// configured to retain whitespace)
    Whitespace,
}

/// A single token: category plus source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    /// Create a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Whether this token is exactly `kind` with text `text`.
    #[must_use]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// Whether this is the identifier `text`.
    #[must_use]
    pub fn is_identifier(&self, text: &str) -> bool {
        self.is(TokenKind::Identifier, text)
    }

    /// Whether this is the delimiter `text`.
    #[must_use]
    pub fn is_delimiter(&self, text: &str) -> bool {
        self.is(TokenKind::Delimiter, text)
    }

    /// Whether this is the operator `text`.
    #[must_use]
    pub fn is_operator(&self, text: &str) -> bool {
        self.is(TokenKind::Operator, text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// PQL keywords. All are ordinary identifiers; context decides whether
/// they act as keywords.
pub mod kw {
    pub const SELECT: &str = "Select";
    pub const SUCH: &str = "such";
    pub const THAT: &str = "that";
    pub const PATTERN: &str = "pattern";
    pub const WITH: &str = "with";
    pub const AND: &str = "and";
    pub const BOOLEAN: &str = "BOOLEAN";

    // Design entities. `prog_line` is three tokens: `prog`, `_`, `line`.
    pub const STMT: &str = "stmt";
    pub const READ: &str = "read";
    pub const PRINT: &str = "print";
    pub const CALL: &str = "call";
    pub const WHILE: &str = "while";
    pub const IF: &str = "if";
    pub const ASSIGN: &str = "assign";
    pub const VARIABLE: &str = "variable";
    pub const CONSTANT: &str = "constant";
    pub const PROCEDURE: &str = "procedure";
    pub const PROG: &str = "prog";
    pub const LINE: &str = "line";

    // Relations.
    pub const FOLLOWS: &str = "Follows";
    pub const PARENT: &str = "Parent";
    pub const CALLS: &str = "Calls";
    pub const NEXT: &str = "Next";
    pub const AFFECTS: &str = "Affects";
    pub const NEXT_BIP: &str = "NextBip";
    pub const AFFECTS_BIP: &str = "AffectsBip";
    pub const USES: &str = "Uses";
    pub const MODIFIES: &str = "Modifies";

    // Attribute names. `stmt#` is `stmt` followed by `#`.
    pub const PROC_NAME: &str = "procName";
    pub const VAR_NAME: &str = "varName";
    pub const VALUE: &str = "value";
}

/// Delimiter and operator spellings.
pub mod sym {
    pub const LPAREN: &str = "(";
    pub const RPAREN: &str = ")";
    pub const COMMA: &str = ",";
    pub const SEMICOLON: &str = ";";
    pub const UNDERSCORE: &str = "_";
    pub const QUOTE: &str = "\"";
    pub const DOT: &str = ".";
    pub const HASH: &str = "#";
    pub const STAR: &str = "*";
    pub const EQUALS: &str = "=";
    pub const LT: &str = "<";
    pub const GT: &str = ">";
    pub const SPACE: &str = " ";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_predicates() {
        let tok = Token::new(TokenKind::Identifier, kw::SELECT);
        assert!(tok.is_identifier("Select"));
        assert!(!tok.is_identifier("select"));
        assert!(!tok.is_delimiter("Select"));
        assert!(tok.is(TokenKind::Identifier, kw::SELECT));
    }

    #[test]
    fn display_is_source_text() {
        let tok = Token::new(TokenKind::Operator, sym::STAR);
        assert_eq!(tok.to_string(), "*");
    }
}
