use crate::core::error::Span;

/// Binary operators, lowest to highest precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
        }
    }

    pub(crate) fn is_right_associative(self) -> bool {
        matches!(self, Operator::Pow)
    }

    fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            '^' => Some(Operator::Pow),
            _ => None,
        }
    }
}

/// Binding power of unary `-`/`+`: above `*`, below `^`, so `-x^2` is `-(x^2)`
pub(crate) const UNARY_PRECEDENCE: u8 = 25;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind<'src> {
    Number(f64),
    Identifier(&'src str),
    Operator(Operator),
    LeftParen,
    RightParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token<'src> {
    pub kind: TokenKind<'src>,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub(crate) fn new(kind: TokenKind<'src>, span: Span) -> Self {
        Token { kind, span }
    }

    pub(crate) fn operator(c: char, at: usize) -> Option<Self> {
        Operator::from_char(c).map(|op| Token::new(TokenKind::Operator(op), Span::at(at)))
    }

    /// Whether an operand may start right after this token
    pub(crate) fn expects_operand_next(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Operator(_) | TokenKind::LeftParen | TokenKind::Comma
        )
    }
}
