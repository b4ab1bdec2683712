//! Parser module - converts strings to expressions
mod implicit_mul;
mod lexer;
mod pratt;
mod tokens;

pub use pratt::MAX_NESTING;

use crate::core::error::{Expected, ParseError, Span};
use crate::Expr;

/// Parse a formula string into an expression
///
/// Accepts numbers, identifiers, `+ - * / ^`, parentheses and function calls.
/// Builtin function names resolve to their tags; any other called name becomes
/// an opaque named function. Implicit multiplication is inserted after a
/// number or `)` that is directly followed by an identifier or `(`.
///
/// # Example
/// ```
/// use symb_kernel::parse;
///
/// let expr = parse("x^2 + sin(x)").unwrap();
/// assert_eq!(expr.to_string(), "x^2 + sin(x)");
/// ```
///
/// # Errors
/// Returns a [`ParseError`] carrying the byte span of the offending token and
/// the token class that was expected. No partial tree is ever returned.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    // Pipeline: validate -> lex -> implicit_mul -> parse
    if input.trim().is_empty() {
        return Err(ParseError::new(Span::at(input.len()), Expected::Operand));
    }
    let tokens = lexer::lex(input)?;
    let tokens = implicit_mul::insert_implicit_multiplication(tokens);
    let expr = pratt::parse_expression(&tokens, input.len())?;
    tracing::trace!(input, %expr, "parsed");
    Ok(expr)
}
