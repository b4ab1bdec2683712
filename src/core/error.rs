use std::fmt;
use thiserror::Error;

/// Source location span for error reporting (byte offsets, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Span covering a single byte
    pub fn at(pos: usize) -> Self {
        Span {
            start: pos,
            end: pos + 1,
        }
    }
}

impl fmt::Display for Span {
    /// 1-indexed for users
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end.saturating_sub(self.start) <= 1 {
            write!(f, "position {}", self.start + 1)
        } else {
            write!(f, "positions {}-{}", self.start + 1, self.end)
        }
    }
}

/// The token class the parser wanted at the failure point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A number, identifier, `(` or unary sign
    Operand,
    /// A binary operator or the end of input
    Operator,
    ClosingParen,
    CommaOrClosingParen,
    /// The function was called with the wrong number of arguments
    ArgumentCount { name: &'static str, min: usize, max: usize },
    /// The input nests parentheses or operators too deeply
    ShallowerNesting,
    /// A numeric literal too large to represent
    FiniteNumber,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Operand => f.write_str("a number, variable, function call or '('"),
            Expected::Operator => f.write_str("an operator or end of input"),
            Expected::ClosingParen => f.write_str("')'"),
            Expected::CommaOrClosingParen => f.write_str("',' or ')'"),
            Expected::ArgumentCount { name, min, max } if min == max => {
                write!(f, "{min} argument(s) for '{name}'")
            }
            Expected::ArgumentCount { name, min, max } => {
                write!(f, "{min} to {max} arguments for '{name}'")
            }
            Expected::ShallowerNesting => f.write_str("less deeply nested input"),
            Expected::FiniteNumber => f.write_str("a number within floating-point range"),
        }
    }
}

/// Malformed input. Parsing never returns a partial tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {span}: expected {expected}")]
pub struct ParseError {
    pub span: Span,
    pub expected: Expected,
}

impl ParseError {
    pub(crate) fn new(span: Span, expected: Expected) -> Self {
        ParseError { span, expected }
    }

    /// Byte offset of the offending token
    pub fn position(&self) -> usize {
        self.span.start
    }
}

/// Errors from the differentiation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no derivative rule registered for function '{function_name}'")]
    UnsupportedDifferentiation { function_name: String },

    #[error("variable '{var}' cannot be both fixed and the differentiation variable")]
    VariableInBothFixedAndDiff { var: String },

    #[error("expression exceeds the maximum depth of {limit}")]
    MaxDepthExceeded { limit: usize },

    #[error("expression exceeds the maximum of {limit} nodes")]
    MaxNodesExceeded { limit: usize },

    #[error("covariance matrix must be {expected}x{expected}, found {found} rows")]
    CovarianceDimension { expected: usize, found: usize },
}

impl DiffError {
    pub(crate) fn unsupported(function_name: impl Into<String>) -> Self {
        DiffError::UnsupportedDifferentiation {
            function_name: function_name.into(),
        }
    }
}

/// Numeric evaluation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    /// The input lies outside the function's real domain or hits a pole
    #[error("{function} is undefined at {arg}")]
    DomainError { function: String, arg: f64 },

    #[error("numeric overflow")]
    Overflow,

    /// Named function with no registered evaluator
    #[error("no evaluator registered for function '{0}'")]
    UnknownFunction(String),

    /// The compiled program left no value on its stack
    #[error("compiled program produced no result")]
    EmptyResult,
}

impl EvaluationError {
    pub(crate) fn domain(function: impl Into<String>, arg: f64) -> Self {
        EvaluationError::DomainError {
            function: function.into(),
            arg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display_is_one_indexed() {
        assert_eq!(Span::at(0).to_string(), "position 1");
        assert_eq!(Span::new(2, 5).to_string(), "positions 3-5");
    }

    #[test]
    fn test_parse_error_message() {
        let err = ParseError::new(Span::at(3), Expected::ClosingParen);
        assert_eq!(err.position(), 3);
        assert_eq!(err.to_string(), "parse error at position 4: expected ')'");
    }

    #[test]
    fn test_diff_error_wraps_parse_error() {
        let err: DiffError = ParseError::new(Span::at(0), Expected::Operand).into();
        assert!(matches!(err, DiffError::Parse(_)));
    }
}
