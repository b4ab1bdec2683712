use crate::core::error::{Expected, ParseError, Span};
use crate::functions::Builtin;
use crate::parser::tokens::{Operator, Token, TokenKind, UNARY_PRECEDENCE};
use crate::Expr;

/// Deepest accepted nesting of groups, calls, unary signs and powers
pub const MAX_NESTING: usize = 256;

/// Parse tokens into an expression using Pratt parsing
pub(crate) fn parse_expression(tokens: &[Token<'_>], input_len: usize) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        input_len,
    };
    let expr = parser.parse_expr(0)?;
    match parser.current() {
        None => Ok(expr),
        Some(tok) => Err(ParseError::new(tok.span, Expected::Operator)),
    }
}

struct Parser<'a, 'src> {
    tokens: &'a [Token<'src>],
    pos: usize,
    depth: usize,
    input_len: usize,
}

impl<'a, 'src> Parser<'a, 'src> {
    fn current(&self) -> Option<&'a Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Span of the current token, or of the end of input
    fn here(&self) -> Span {
        self.current()
            .map_or_else(|| Span::at(self.input_len), |t| t.span)
    }

    fn error(&self, expected: Expected) -> ParseError {
        ParseError::new(self.here(), expected)
    }

    /// Recursive descent one level deeper
    fn nested(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error(Expected::ShallowerNesting));
        }
        let result = self.parse_expr(min_precedence);
        self.depth -= 1;
        result
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        while let Some(token) = self.current() {
            let op = match token.kind {
                TokenKind::Operator(op) => op,
                _ => break,
            };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();

            // `x^-2` is legal: the exponent of `^` starts at unary level
            let next_precedence = if op.is_right_associative() {
                UNARY_PRECEDENCE
            } else {
                precedence + 1
            };
            let right = self.nested(next_precedence)?;

            left = match op {
                Operator::Add => Expr::add_expr(left, right),
                Operator::Sub => Expr::sub_expr(left, right),
                Operator::Mul => Expr::mul_expr(left, right),
                Operator::Div => Expr::div_expr(left, right),
                Operator::Pow => Expr::pow(left, right),
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().ok_or_else(|| self.error(Expected::Operand))?;

        match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::number(n))
            }

            TokenKind::Identifier(name) => {
                self.advance();
                match self.current() {
                    Some(Token {
                        kind: TokenKind::LeftParen,
                        ..
                    }) => self.parse_call(name, token.span),
                    _ => Ok(Expr::symbol(name)),
                }
            }

            // Unary minus: between Mul (20) and Pow (30), so -x^2 parses as -(x^2)
            TokenKind::Operator(Operator::Sub) => {
                self.advance();
                let operand = self.nested(UNARY_PRECEDENCE)?;
                Ok(Expr::negate(operand))
            }

            TokenKind::Operator(Operator::Add) => {
                self.advance();
                self.nested(UNARY_PRECEDENCE)
            }

            TokenKind::LeftParen => {
                self.advance();
                let expr = self.nested(0)?;
                self.expect_right_paren(Expected::ClosingParen)?;
                Ok(expr)
            }

            _ => Err(self.error(Expected::Operand)),
        }
    }

    fn expect_right_paren(&mut self, expected: Expected) -> Result<(), ParseError> {
        match self.current() {
            Some(Token {
                kind: TokenKind::RightParen,
                ..
            }) => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(expected)),
        }
    }

    /// `name(arg, ...)`; the current token is the opening parenthesis
    fn parse_call(&mut self, name: &str, name_span: Span) -> Result<Expr, ParseError> {
        self.advance();
        let mut args = Vec::new();
        loop {
            args.push(self.nested(0)?);
            match self.current() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => self.advance(),
                _ => break,
            }
        }
        let close = self.here();
        self.expect_right_paren(Expected::CommaOrClosingParen)?;

        let Some(which) = Builtin::from_name(name, args.len()) else {
            return Ok(Expr::named_func(name, args));
        };
        let def = which.definition();
        if !def.validate_arity(args.len()) {
            return Err(ParseError::new(
                Span::new(name_span.start, close.end),
                Expected::ArgumentCount {
                    name: def.name,
                    min: *def.arity.start(),
                    max: *def.arity.end(),
                },
            ));
        }
        Ok(Expr::func(which, args))
    }
}
