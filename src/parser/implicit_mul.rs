//! Implicit multiplication insertion for natural notation
//!
//! Inserts `*` where a number or `)` is immediately followed by an identifier or
//! `(`, e.g. `2x` → `2 * x`, `(a)(b)` → `(a) * (b)`. An identifier followed by
//! `(` is a function call and is left alone.

use crate::core::error::Span;
use crate::parser::tokens::{Operator, Token, TokenKind};

fn should_insert_mul(current: &Token<'_>, next: &Token<'_>) -> bool {
    matches!(
        (&current.kind, &next.kind),
        (
            TokenKind::Number(_) | TokenKind::RightParen,
            TokenKind::Identifier(_) | TokenKind::LeftParen
        )
    )
}

pub(crate) fn insert_implicit_multiplication(tokens: Vec<Token<'_>>) -> Vec<Token<'_>> {
    let needs_insertion = tokens.windows(2).any(|w| should_insert_mul(&w[0], &w[1]));
    if !needs_insertion {
        return tokens;
    }

    let mut result = Vec::with_capacity(tokens.len() * 3 / 2);
    let mut it = tokens.into_iter().peekable();
    while let Some(current) = it.next() {
        let inserted = it
            .peek()
            .filter(|next| should_insert_mul(&current, next))
            .map(|next| Token::new(TokenKind::Operator(Operator::Mul), Span::at(next.span.start)));
        result.push(current);
        result.extend(inserted);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;

    fn count_mul(input: &str) -> usize {
        insert_implicit_multiplication(lex(input).unwrap())
            .iter()
            .filter(|t| t.kind == TokenKind::Operator(Operator::Mul))
            .count()
    }

    #[test]
    fn test_number_identifier() {
        assert_eq!(count_mul("2x"), 1);
        assert_eq!(count_mul("4sin(x)"), 1);
    }

    #[test]
    fn test_paren_groups() {
        assert_eq!(count_mul("(a)(b)"), 1);
        assert_eq!(count_mul("2(x+1)"), 1);
        assert_eq!(count_mul("(x+1)y"), 1);
    }

    #[test]
    fn test_function_call_is_not_multiplication() {
        assert_eq!(count_mul("sin(x)"), 0);
        assert_eq!(count_mul("f(x)"), 0);
    }

    #[test]
    fn test_identifier_followed_by_number_is_left_alone() {
        // `x 2` is a syntax error, not a product
        assert_eq!(count_mul("x 2"), 0);
    }
}
