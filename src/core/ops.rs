//! Operator overloading and method-style function calls
//!
//! `Expr`, `&Expr`, `Symbol` and `f64` combine with `+ - * /`; every result goes
//! through the canonical constructors.

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::expr::Expr;
use super::symbol::Symbol;
use crate::functions::Builtin;

// ===== Method-style functions =====

macro_rules! impl_math_functions {
    ($type:ty, $converter:expr, $($fn_name:ident => $tag:ident),* $(,)?) => {
        impl $type {
            $(
                pub fn $fn_name(self) -> Expr {
                    Expr::func(Builtin::$tag, vec![$converter(self)])
                }
            )*
        }
    };
}

macro_rules! math_function_list {
    ($macro_name:ident, $type:ty, $converter:expr) => {
        $macro_name!($type, $converter,
            sin => Sin, cos => Cos, tan => Tan,
            cot => Cot, sec => Sec, csc => Csc,
            asin => Asin, acos => Acos, atan => Atan,
            sinh => Sinh, cosh => Cosh, tanh => Tanh,
            asinh => Asinh, acosh => Acosh, atanh => Atanh,
            exp => Exp, ln => Ln, log10 => Log10, log2 => Log2,
            sqrt => Sqrt, cbrt => Cbrt, abs => Abs, sign => Sign,
            erf => Erf, erfc => Erfc, gamma => Gamma,
            digamma => Digamma, trigamma => Trigamma,
            zeta => Zeta, lambertw => LambertW,
            // Two-argument functions go through Expr::func
        );
    };
}

math_function_list!(impl_math_functions, Symbol, |s: Symbol| s.to_expr());
math_function_list!(impl_math_functions, Expr, |e: Expr| e);

impl Expr {
    /// `self^exp`; Rust's `^` is XOR
    pub fn pow_of(self, exp: impl Into<Expr>) -> Expr {
        Expr::pow(self, exp.into())
    }
}

impl Symbol {
    pub fn pow_of(self, exp: impl Into<Expr>) -> Expr {
        Expr::pow(self.to_expr(), exp.into())
    }
}

// ===== Binary operators =====

macro_rules! impl_binary_ops {
    ($lhs:ty, $rhs:ty, $to_lhs:expr, $to_rhs:expr) => {
        impl Add<$rhs> for $lhs {
            type Output = Expr;
            fn add(self, rhs: $rhs) -> Expr {
                Expr::add_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = Expr;
            fn sub(self, rhs: $rhs) -> Expr {
                Expr::sub_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = Expr;
            fn mul(self, rhs: $rhs) -> Expr {
                Expr::mul_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Div<$rhs> for $lhs {
            type Output = Expr;
            fn div(self, rhs: $rhs) -> Expr {
                Expr::div_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
    };
}

impl_binary_ops!(Expr, Expr, |s: Expr| s, |r: Expr| r);
impl_binary_ops!(Expr, &Expr, |s: Expr| s, |r: &Expr| r.clone());
impl_binary_ops!(&Expr, Expr, |s: &Expr| s.clone(), |r: Expr| r);
impl_binary_ops!(&Expr, &Expr, |s: &Expr| s.clone(), |r: &Expr| r.clone());
impl_binary_ops!(Expr, Symbol, |s: Expr| s, |r: Symbol| r.to_expr());
impl_binary_ops!(Expr, f64, |s: Expr| s, Expr::number);
impl_binary_ops!(&Expr, f64, |s: &Expr| s.clone(), Expr::number);

impl_binary_ops!(Symbol, Symbol, |s: Symbol| s.to_expr(), |r: Symbol| r.to_expr());
impl_binary_ops!(Symbol, Expr, |s: Symbol| s.to_expr(), |r: Expr| r);
impl_binary_ops!(Symbol, f64, |s: Symbol| s.to_expr(), Expr::number);

impl_binary_ops!(f64, Expr, Expr::number, |r: Expr| r);
impl_binary_ops!(f64, Symbol, Expr::number, |r: Symbol| r.to_expr());

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self.clone())
    }
}

impl Neg for Symbol {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self.to_expr())
    }
}
