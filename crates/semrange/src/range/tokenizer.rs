//! Tokenizer for range expressions

use super::operator::Op;
use super::RangeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Raw version literal, not yet parsed
    Version(&'a str),
    Op(Op),
    OpenParen,
    CloseParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Byte offset of the token in the range string
    pub offset: usize,
}

/// Splits a range string into tokens, skipping whitespace.
///
/// A version literal starts with a digit or `*` and runs until whitespace, an
/// operator character or a parenthesis. Iteration stops after the first error.
pub struct Tokenizer<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer { input, offset: 0 }
    }
}

fn ends_literal(c: char) -> bool {
    c.is_whitespace() || matches!(c, '|' | '&' | '!' | '=' | '<' | '>' | '(' | ')')
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, RangeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.input[self.offset..].trim_start();
        let start = self.input.len() - rest.len();
        let c = rest.chars().next()?;

        let (kind, len) = if c == '*' || c.is_ascii_digit() {
            let len = rest.find(ends_literal).unwrap_or(rest.len());
            (TokenKind::Version(&rest[..len]), len)
        } else if let Some((op, len)) = Op::lookup(rest) {
            (TokenKind::Op(op), len)
        } else if c == '(' {
            (TokenKind::OpenParen, 1)
        } else if c == ')' {
            (TokenKind::CloseParen, 1)
        } else {
            self.offset = self.input.len();
            return Some(Err(RangeError::InvalidCharacter { character: c, offset: start }));
        };

        self.offset = start + len;
        Some(Ok(Token { kind, offset: start }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Operator;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Tokenizer::new(input).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn test_tokenize_simple_range() {
        assert_eq!(
            kinds(">=1.2.0 <2.0.0 || 3.*"),
            vec![
                TokenKind::Op(Op::Compare(Operator::GreaterThanOrEqual)),
                TokenKind::Version("1.2.0"),
                TokenKind::Op(Op::Compare(Operator::LessThan)),
                TokenKind::Version("2.0.0"),
                TokenKind::Op(Op::Or),
                TokenKind::Version("3.*"),
            ]
        );
    }

    #[test]
    fn test_tokenize_without_spaces() {
        assert_eq!(
            kinds("!(1.0.0-beta+b.1||*)&&!=2.0.0"),
            vec![
                TokenKind::Op(Op::Not),
                TokenKind::OpenParen,
                TokenKind::Version("1.0.0-beta+b.1"),
                TokenKind::Op(Op::Or),
                TokenKind::Version("*"),
                TokenKind::CloseParen,
                TokenKind::Op(Op::And),
                TokenKind::Op(Op::Compare(Operator::NotEqual)),
                TokenKind::Version("2.0.0"),
            ]
        );
    }

    #[test]
    fn test_literal_runs_to_delimiter() {
        // The literal is handed to the version parser as-is
        assert_eq!(kinds("1.0.0abc"), vec![TokenKind::Version("1.0.0abc")]);
        assert_eq!(kinds("\t1.0.0\n"), vec![TokenKind::Version("1.0.0")]);
    }

    #[test]
    fn test_offsets() {
        let offsets: Vec<usize> = Tokenizer::new("  >= 1.0.0 )")
            .map(|t| t.unwrap().offset)
            .collect();
        assert_eq!(offsets, vec![2, 5, 11]);
    }

    #[test]
    fn test_invalid_character() {
        let mut tokens = Tokenizer::new(">=1.0.0 | 2.0.0");
        assert!(tokens.next().unwrap().is_ok());
        assert!(tokens.next().unwrap().is_ok());
        assert_eq!(
            tokens.next(),
            Some(Err(RangeError::InvalidCharacter { character: '|', offset: 8 }))
        );
        assert_eq!(tokens.next(), None);

        let err = Tokenizer::new("v1.0.0").next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Encountered invalid character 'v' at offset 0");
    }

    #[test]
    fn test_empty_input() {
        assert!(kinds("").is_empty());
        assert!(kinds("   ").is_empty());
    }
}
