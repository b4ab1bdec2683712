//! Byte-offset tokenizer
//!
//! Identifiers are maximal runs of letters, digits and `_` starting with a letter
//! or `_`. Numbers accept an optional fraction and exponent; `2e` followed by a
//! non-digit lexes as `2` and the identifier `e`.

use super::tokens::{Token, TokenKind};
use crate::core::error::{Expected, ParseError, Span};

pub(crate) fn lex(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let bytes = input.as_bytes();
    // Rough capacity: one token per two bytes
    let mut tokens: Vec<Token<'_>> = Vec::with_capacity(input.len() / 2 + 1);
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
            b'0'..=b'9' | b'.' => {
                let end = scan_number(bytes, pos);
                let text = &input[pos..end];
                let value: f64 = text
                    .parse()
                    .map_err(|_| ParseError::new(Span::new(pos, end), Expected::Operand))?;
                if !value.is_finite() {
                    return Err(ParseError::new(Span::new(pos, end), Expected::FiniteNumber));
                }
                tokens.push(Token::new(TokenKind::Number(value), Span::new(pos, end)));
                pos = end;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let end = bytes[pos..]
                    .iter()
                    .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
                    .map_or(bytes.len(), |n| pos + n);
                tokens.push(Token::new(
                    TokenKind::Identifier(&input[pos..end]),
                    Span::new(pos, end),
                ));
                pos = end;
            }
            b'(' => {
                tokens.push(Token::new(TokenKind::LeftParen, Span::at(pos)));
                pos += 1;
            }
            b')' => {
                tokens.push(Token::new(TokenKind::RightParen, Span::at(pos)));
                pos += 1;
            }
            b',' => {
                tokens.push(Token::new(TokenKind::Comma, Span::at(pos)));
                pos += 1;
            }
            _ => match Token::operator(char::from(c), pos) {
                Some(tok) => {
                    tokens.push(tok);
                    pos += 1;
                }
                None => {
                    let expected = if tokens.last().is_none_or(Token::expects_operand_next) {
                        Expected::Operand
                    } else {
                        Expected::Operator
                    };
                    return Err(ParseError::new(char_span(input, pos), expected));
                }
            },
        }
    }
    Ok(tokens)
}

/// Span of the (possibly multi-byte) character starting at `pos`
fn char_span(input: &str, pos: usize) -> Span {
    let width = input[pos..].chars().next().map_or(1, char::len_utf8);
    Span::new(pos, pos + width)
}

fn scan_number(bytes: &[u8], start: usize) -> usize {
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut end = digits(start);
    if end < bytes.len() && bytes[end] == b'.' {
        end = digits(end + 1);
    }
    // Exponent only when digits follow, so `2e` and `2exp(x)` stay implicit products
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut i = end + 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        if i < bytes.len() && bytes[i].is_ascii_digit() {
            end = digits(i);
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokens::Operator;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_numbers_and_exponents() {
        assert_eq!(kinds("3.25"), vec![TokenKind::Number(3.25)]);
        assert_eq!(kinds("1e3"), vec![TokenKind::Number(1000.0)]);
        assert_eq!(kinds(".5"), vec![TokenKind::Number(0.5)]);
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number(2.0), TokenKind::Identifier("e")]
        );
        assert_eq!(
            kinds("2exp"),
            vec![TokenKind::Number(2.0), TokenKind::Identifier("exp")]
        );
    }

    #[test]
    fn test_out_of_range_literal_is_rejected() {
        let err = lex("2 + 1e400").unwrap_err();
        assert_eq!(err.expected, Expected::FiniteNumber);
        assert_eq!(err.span, Span::new(4, 9));
        // Underflow is representable
        assert_eq!(kinds("1e-400"), vec![TokenKind::Number(0.0)]);
    }

    #[test]
    fn test_operators_and_spans() {
        let toks = lex("x_1 + 20").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Identifier("x_1"));
        assert_eq!(toks[0].span, Span::new(0, 3));
        assert_eq!(toks[1].kind, TokenKind::Operator(Operator::Add));
        assert_eq!(toks[2].span, Span::new(6, 8));
    }

    #[test]
    fn test_unknown_character_reports_position() {
        let err = lex("x # y").unwrap_err();
        assert_eq!(err.position(), 2);
        assert_eq!(err.expected, Expected::Operator);
        let err = lex("x + $").unwrap_err();
        assert_eq!(err.expected, Expected::Operand);
    }

    #[test]
    fn test_lone_dot_is_an_error() {
        assert!(lex(".").is_err());
    }
}
