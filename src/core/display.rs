//! Display implementations for expressions.
//!
//! ## Standard Display (`to_string()` / `{}`)
//! Infix notation that parses back to the same canonical tree:
//! - `x^2 + 2*x + 1`
//! - `sin(x)/(x + 1)`
//!
//! ## LaTeX Format (`to_latex()`)
//! - `x^{2} + 2 \cdot x + 1`
//! - `\frac{\sin\left(x\right)}{x + 1}`
//!
//! # Display Behavior Notes
//! - Sums print their terms with `+`/`-` taken from the coefficients
//! - Products print positive exponents as the numerator and negative ones as
//!   the denominator
//! - Anonymous symbols print as `$<id>`
//! - Derivatives use ∂ notation and do not parse back

use std::fmt;

use super::expr::{Expr, ExprKind, Func};

// =============================================================================
// HELPERS
// =============================================================================

/// Atoms never need parentheses as a power base
fn is_atom(e: &Expr) -> bool {
    match e.kind() {
        ExprKind::Number(n) => *n >= 0.0,
        ExprKind::Symbol(_) | ExprKind::Function { .. } | ExprKind::Derivative { .. } => true,
        _ => false,
    }
}

/// Product factor that prints without parentheses next to `*`
fn is_mul_operand(e: &Expr) -> bool {
    is_atom(e) || matches!(e.kind(), ExprKind::Pow(..))
}

fn split_factors(factors: &[(Expr, f64)]) -> (Vec<(&Expr, f64)>, Vec<(&Expr, f64)>) {
    let num = factors.iter().filter(|(_, k)| *k > 0.0).map(|(b, k)| (b, *k)).collect();
    let den = factors.iter().filter(|(_, k)| *k < 0.0).map(|(b, k)| (b, -*k)).collect();
    (num, den)
}

// =============================================================================
// STANDARD
// =============================================================================

fn write_power(f: &mut fmt::Formatter<'_>, base: &Expr, k: f64) -> fmt::Result {
    if is_atom(base) {
        write!(f, "{base}")?;
    } else {
        write!(f, "({base})")?;
    }
    if k != 1.0 {
        write!(f, "^{k}")?;
    }
    Ok(())
}

fn write_factor_list(f: &mut fmt::Formatter<'_>, factors: &[(&Expr, f64)]) -> fmt::Result {
    for (i, (base, k)) in factors.iter().enumerate() {
        if i > 0 {
            f.write_str("*")?;
        }
        write_power(f, base, *k)?;
    }
    Ok(())
}

/// `coeff · Π factors` with a non-negative coefficient
fn write_product(f: &mut fmt::Formatter<'_>, coeff: f64, factors: &[(Expr, f64)]) -> fmt::Result {
    let (num, den) = split_factors(factors);
    match (coeff == 1.0, num.is_empty()) {
        (true, true) => f.write_str("1")?,
        (true, false) => write_factor_list(f, &num)?,
        (false, true) => write!(f, "{coeff}")?,
        (false, false) => {
            write!(f, "{coeff}*")?;
            write_factor_list(f, &num)?;
        }
    }
    match den.as_slice() {
        [] => Ok(()),
        [(base, k)] => {
            f.write_str("/")?;
            write_power(f, base, *k)
        }
        _ => {
            f.write_str("/(")?;
            write_factor_list(f, &den)?;
            f.write_str(")")
        }
    }
}

/// `coeff · term` with a non-negative coefficient
fn write_term(f: &mut fmt::Formatter<'_>, coeff: f64, term: &Expr) -> fmt::Result {
    match term.kind() {
        ExprKind::Number(n) => write!(f, "{}", coeff * n),
        ExprKind::Product(factors) => write_product(f, coeff, factors),
        _ if coeff == 1.0 => write!(f, "{term}"),
        _ if is_mul_operand(term) => write!(f, "{coeff}*{term}"),
        _ => write!(f, "{coeff}*({term})"),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Number(n) => write!(f, "{n}"),
            ExprKind::Symbol(s) => write!(f, "{s}"),
            ExprKind::Sum(terms) => {
                for (i, (c, t)) in terms.iter().enumerate() {
                    let sign = if *c < 0.0 { "-" } else { "+" };
                    match (i, sign) {
                        (0, "-") => f.write_str("-")?,
                        (0, _) => {}
                        _ => write!(f, " {sign} ")?,
                    }
                    write_term(f, c.abs(), t)?;
                }
                Ok(())
            }
            ExprKind::Product(factors) => write_product(f, 1.0, factors),
            ExprKind::Pow(base, exp) => {
                if is_atom(base) {
                    write!(f, "{base}^")?;
                } else {
                    write!(f, "({base})^")?;
                }
                if is_atom(exp) {
                    write!(f, "{exp}")
                } else {
                    write!(f, "({exp})")
                }
            }
            ExprKind::Function { func, args } => {
                write!(f, "{}(", func.name())?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
            ExprKind::Derivative { inner, var, order } => {
                write!(f, "\u{2202}^{order}_{inner}/\u{2202}_{var}^{order}")
            }
        }
    }
}

// =============================================================================
// LATEX
// =============================================================================

struct Latex<'a>(&'a Expr);

fn latex_function_name(func: &Func) -> String {
    use crate::functions::Builtin;
    match func {
        Func::Builtin(b) => match b {
            Builtin::Sin
            | Builtin::Cos
            | Builtin::Tan
            | Builtin::Cot
            | Builtin::Sec
            | Builtin::Csc
            | Builtin::Sinh
            | Builtin::Cosh
            | Builtin::Tanh
            | Builtin::Coth
            | Builtin::Exp
            | Builtin::Ln => format!("\\{}", b.name()),
            Builtin::Asin => "\\arcsin".to_string(),
            Builtin::Acos => "\\arccos".to_string(),
            Builtin::Atan => "\\arctan".to_string(),
            Builtin::Gamma => "\\Gamma".to_string(),
            Builtin::Digamma => "\\psi".to_string(),
            Builtin::Zeta => "\\zeta".to_string(),
            Builtin::Beta => "\\mathrm{B}".to_string(),
            _ => format!("\\operatorname{{{}}}", b.name()),
        },
        Func::Named(name) => format!("\\operatorname{{{name}}}"),
    }
}

fn latex_power(f: &mut fmt::Formatter<'_>, base: &Expr, k: f64) -> fmt::Result {
    if is_atom(base) {
        write!(f, "{}", Latex(base))?;
    } else {
        write!(f, "\\left({}\\right)", Latex(base))?;
    }
    if k != 1.0 {
        write!(f, "^{{{k}}}")?;
    }
    Ok(())
}

fn latex_factor_list(f: &mut fmt::Formatter<'_>, coeff: f64, factors: &[(&Expr, f64)]) -> fmt::Result {
    let mut first = true;
    if coeff != 1.0 || factors.is_empty() {
        write!(f, "{coeff}")?;
        first = false;
    }
    for (base, k) in factors {
        if !first {
            f.write_str(" \\cdot ")?;
        }
        first = false;
        latex_power(f, base, *k)?;
    }
    Ok(())
}

fn latex_term(f: &mut fmt::Formatter<'_>, coeff: f64, term: &Expr) -> fmt::Result {
    match term.kind() {
        ExprKind::Number(n) => write!(f, "{}", coeff * n),
        ExprKind::Product(factors) => {
            let (num, den) = split_factors(factors);
            if den.is_empty() {
                return latex_factor_list(f, coeff, &num);
            }
            f.write_str("\\frac{")?;
            latex_factor_list(f, coeff, &num)?;
            f.write_str("}{")?;
            latex_factor_list(f, 1.0, &den)?;
            f.write_str("}")
        }
        ExprKind::Sum(_) if coeff != 1.0 => write!(f, "{coeff} \\left({}\\right)", Latex(term)),
        _ if coeff == 1.0 => write!(f, "{}", Latex(term)),
        _ => write!(f, "{coeff} \\cdot {}", Latex(term)),
    }
}

impl fmt::Display for Latex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind() {
            ExprKind::Number(n) => write!(f, "{n}"),
            ExprKind::Symbol(s) => match s.name() {
                Some("pi") => f.write_str("\\pi"),
                Some(name) => f.write_str(name),
                None => write!(f, "\\${}", s.id()),
            },
            ExprKind::Sum(terms) => {
                for (i, (c, t)) in terms.iter().enumerate() {
                    if *c < 0.0 {
                        f.write_str(if i == 0 { "-" } else { " - " })?;
                    } else if i > 0 {
                        f.write_str(" + ")?;
                    }
                    latex_term(f, c.abs(), t)?;
                }
                Ok(())
            }
            ExprKind::Product(_) => latex_term(f, 1.0, self.0),
            ExprKind::Pow(base, exp) => {
                if is_atom(base) {
                    write!(f, "{}^{{{}}}", Latex(base), Latex(exp))
                } else {
                    write!(f, "\\left({}\\right)^{{{}}}", Latex(base), Latex(exp))
                }
            }
            ExprKind::Function { func, args } => {
                if let (Func::Builtin(crate::functions::Builtin::Sqrt), [arg]) = (func, args.as_slice()) {
                    return write!(f, "\\sqrt{{{}}}", Latex(arg));
                }
                write!(f, "{}\\left(", latex_function_name(func))?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Latex(a))?;
                }
                f.write_str("\\right)")
            }
            ExprKind::Derivative { inner, var, order } => {
                if *order == 1 {
                    write!(f, "\\frac{{\\partial}}{{\\partial {var}}} {}", Latex(inner))
                } else {
                    write!(
                        f,
                        "\\frac{{\\partial^{order}}}{{\\partial {var}^{order}}} {}",
                        Latex(inner)
                    )
                }
            }
        }
    }
}

impl Expr {
    /// LaTeX rendering for typesetting
    pub fn to_latex(&self) -> String {
        Latex(self).to_string()
    }
}
