// Character-class tokenizer shared by the SIMPLE and PQL pipelines.
//
// Behavior differs per pipeline in two ways, both configured per
// instance: whether whitespace is consumed or retained as tokens, and
// whether numbers may carry leading zeros. SIMPLE sources consume
// whitespace and reject leading zeros; PQL retains whitespace (the
// query grammar is whitespace-sensitive in places) and tolerates
// leading zeros, which the parser normalizes later.

use spa_error::{Result, SpaError};

use crate::token::{Token, TokenKind};

const DELIMITERS: &[char] = &['{', '}', '(', ')', ';', '_', '"', ',', '.', '#'];
const SINGLE_OPERATORS: &[char] = &['+', '-', '*', '/', '%'];
/// Valid alone or followed by `=`.
const MAYBE_EQUALS_OPERATORS: &[char] = &['>', '<', '=', '!'];

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{0B}' | '\u{0C}')
}

/// Configurable lexer. Construct, adjust with the builder methods, then
/// call [`Tokenizer::tokenize`].
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    consume_whitespace: bool,
    allow_leading_zeroes: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Default configuration: whitespace consumed, leading zeros
    /// rejected (the SIMPLE pipeline configuration).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            consume_whitespace: true,
            allow_leading_zeroes: false,
        }
    }

    /// Skip whitespace instead of emitting tokens for it.
    #[must_use]
    pub const fn consuming_whitespace(mut self) -> Self {
        self.consume_whitespace = true;
        self
    }

    /// Emit one token per whitespace character.
    #[must_use]
    pub const fn not_consuming_whitespace(mut self) -> Self {
        self.consume_whitespace = false;
        self
    }

    /// Accept numbers with leading zeros.
    #[must_use]
    pub const fn allowing_leading_zeroes(mut self) -> Self {
        self.allow_leading_zeroes = true;
        self
    }

    /// Reject numbers with leading zeros.
    #[must_use]
    pub const fn not_allowing_leading_zeroes(mut self) -> Self {
        self.allow_leading_zeroes = false;
        self
    }

    /// Tokenize the whole input.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;

        while pos < chars.len() {
            let c = chars[pos];
            if c.is_ascii_alphabetic() {
                tokens.push(Self::lex_identifier(&chars, &mut pos));
            } else if DELIMITERS.contains(&c) {
                tokens.push(Token::new(TokenKind::Delimiter, c));
                pos += 1;
            } else if c.is_ascii_digit() {
                tokens.push(self.lex_number(&chars, &mut pos)?);
            } else if SINGLE_OPERATORS.contains(&c)
                || MAYBE_EQUALS_OPERATORS.contains(&c)
                || c == '&'
                || c == '|'
            {
                tokens.push(Self::lex_operator(&chars, &mut pos)?);
            } else if is_whitespace(c) {
                if self.consume_whitespace {
                    while pos < chars.len() && is_whitespace(chars[pos]) {
                        pos += 1;
                    }
                } else {
                    tokens.push(Token::new(TokenKind::Whitespace, c));
                    pos += 1;
                }
            } else {
                return Err(SpaError::lex(format!(
                    "Failed to recognise character {c}"
                )));
            }
        }

        Ok(tokens)
    }

    /// `[A-Za-z][A-Za-z0-9]*`. The first character was already checked.
    fn lex_identifier(chars: &[char], pos: &mut usize) -> Token {
        let start = *pos;
        while *pos < chars.len() && chars[*pos].is_ascii_alphanumeric() {
            *pos += 1;
        }
        Token::new(TokenKind::Identifier, chars[start..*pos].iter().collect::<String>())
    }

    /// `[0-9]+`, with the leading-zero rule and a rejection of a letter
    /// directly after the digits (`12x` can never start a valid token).
    fn lex_number(&self, chars: &[char], pos: &mut usize) -> Result<Token> {
        let start = *pos;
        while *pos < chars.len() && chars[*pos].is_ascii_digit() {
            *pos += 1;
        }
        let text: String = chars[start..*pos].iter().collect();

        if !self.allow_leading_zeroes && text.len() > 1 && text.starts_with('0') {
            return Err(SpaError::lex(
                "Encountered 0 as the first digit of a number",
            ));
        }
        if *pos < chars.len() && chars[*pos].is_ascii_alphabetic() {
            return Err(SpaError::lex(
                "Encountered a letter while constructing a number",
            ));
        }

        Ok(Token::new(TokenKind::Number, text))
    }

    /// Single-char arithmetic operators; `> < = !` optionally followed
    /// by `=`; `&&` and `||` whose halves are invalid alone.
    fn lex_operator(chars: &[char], pos: &mut usize) -> Result<Token> {
        let c = chars[*pos];
        *pos += 1;

        if SINGLE_OPERATORS.contains(&c) {
            return Ok(Token::new(TokenKind::Operator, c));
        }

        if MAYBE_EQUALS_OPERATORS.contains(&c) {
            if *pos < chars.len() && chars[*pos] == '=' {
                *pos += 1;
                return Ok(Token::new(TokenKind::Operator, format!("{c}=")));
            }
            return Ok(Token::new(TokenKind::Operator, c));
        }

        // '&' or '|': only valid doubled.
        if *pos < chars.len() && chars[*pos] == c {
            *pos += 1;
            return Ok(Token::new(TokenKind::Operator, format!("{c}{c}")));
        }
        Err(SpaError::lex(format!("Expected {c}{c} but got {c}")))
    }
}
