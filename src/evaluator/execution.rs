//! Scalar execution of compiled programs
//!
//! Each run owns its stack and cache vectors, so one [`CompiledExpr`] can be
//! executed from many threads at once.
//!
//! Every instruction checks its own result:
//! - a domain violation (a pole, a negative base under a fractional power, a
//!   builtin returning `None` or NaN) becomes [`EvaluationError::DomainError`];
//! - an infinite or NaN result from finite inputs becomes [`EvaluationError::Overflow`].

use super::CompiledExpr;
use super::instruction::Instruction;
use crate::core::error::EvaluationError;
use crate::math::eval_zeta_deriv;
use crate::traits::as_integer;

impl CompiledExpr {
    pub(super) fn execute(&self, params: &[f64]) -> Result<f64, EvaluationError> {
        let mut stack: Vec<f64> = Vec::with_capacity(self.stack_size);
        let mut cache = vec![0.0; self.cache_size];

        for instr in self.instructions.iter() {
            match *instr {
                Instruction::LoadConst(idx) => stack.push(self.constants[idx as usize]),
                Instruction::LoadParam(idx) => stack.push(params[idx as usize]),
                Instruction::LoadCached(slot) => stack.push(cache[slot as usize]),
                Instruction::StoreCached(slot) => {
                    if let Some(&top) = stack.last() {
                        cache[slot as usize] = top;
                    }
                }
                Instruction::Sum { coeffs, len } => {
                    let base = stack.len() - len as usize;
                    let coeffs = &self.constants[coeffs as usize..][..len as usize];
                    let values = &stack[base..];
                    let total: f64 = coeffs.iter().zip(values).map(|(c, v)| c * v).sum();
                    let total = check_overflow(total, values)?;
                    stack.truncate(base);
                    stack.push(total);
                }
                Instruction::Product { exps, len } => {
                    let base = stack.len() - len as usize;
                    let exps = &self.constants[exps as usize..][..len as usize];
                    let values = &stack[base..];
                    let mut total = 1.0;
                    for (v, k) in values.iter().zip(exps) {
                        total *= check_overflow(power(*v, *k)?, &[*v])?;
                    }
                    let total = check_overflow(total, values)?;
                    stack.truncate(base);
                    stack.push(total);
                }
                Instruction::Pow => {
                    let base = stack.len() - 2;
                    let values = &stack[base..];
                    let result = check_overflow(power(values[0], values[1])?, values)?;
                    stack.truncate(base);
                    stack.push(result);
                }
                Instruction::Call { func, argc } => {
                    let base = stack.len() - argc as usize;
                    let args = &stack[base..];
                    let def = func.definition();
                    let result = match (def.eval)(args) {
                        Some(v) if !v.is_nan() || args.iter().any(|a| a.is_nan()) => v,
                        _ => return Err(EvaluationError::domain(def.name, first_arg(args))),
                    };
                    let result = check_overflow(result, args)?;
                    stack.truncate(base);
                    stack.push(result);
                }
                Instruction::Custom { index, argc } => {
                    let base = stack.len() - argc as usize;
                    let args = &stack[base..];
                    let (name, eval_fn) = &self.functions[index as usize];
                    let result = match eval_fn(args) {
                        Some(v) if !v.is_nan() || args.iter().any(|a| a.is_nan()) => v,
                        _ => return Err(EvaluationError::domain(name.as_ref(), first_arg(args))),
                    };
                    let result = check_overflow(result, args)?;
                    stack.truncate(base);
                    stack.push(result);
                }
                Instruction::ZetaChain { order } => {
                    let base = stack.len() - order as usize - 1;
                    let values = &stack[base..];
                    let result = check_overflow(zeta_chain(values[0], &values[1..])?, values)?;
                    stack.truncate(base);
                    stack.push(result);
                }
            }
        }

        stack.pop().ok_or(EvaluationError::EmptyResult)
    }
}

fn first_arg(args: &[f64]) -> f64 {
    args.first().copied().unwrap_or(f64::NAN)
}

/// `v^k` with the real-domain checks shared by products and general powers
fn power(v: f64, k: f64) -> Result<f64, EvaluationError> {
    if v == 0.0 && k < 0.0 {
        return Err(EvaluationError::domain("division", v));
    }
    match as_integer(k).and_then(|n| i32::try_from(n).ok()) {
        Some(1) => Ok(v),
        Some(n) => Ok(v.powi(n)),
        None if v < 0.0 => Err(EvaluationError::domain("pow", v)),
        None => Ok(v.powf(k)),
    }
}

/// Sums of huge terms can cancel `inf - inf` into NaN; that is an overflow too
fn check_overflow(result: f64, inputs: &[f64]) -> Result<f64, EvaluationError> {
    if !result.is_finite() && inputs.iter().all(|v| v.is_finite()) {
        return Err(EvaluationError::Overflow);
    }
    Ok(result)
}

/// `dⁿ/dxⁿ ζ(u) = Σₖ ζ⁽ᵏ⁾(u)·Bₙ,ₖ(u', u'', …)` with `derivs = [u', …, u⁽ⁿ⁾]`
fn zeta_chain(u: f64, derivs: &[f64]) -> Result<f64, EvaluationError> {
    let n = derivs.len();
    if n == 0 {
        return eval_zeta_deriv(0, u).ok_or_else(|| EvaluationError::domain("zeta", u));
    }

    // bell[m][k] = Bₘ,ₖ(u', …, u⁽ᵐ⁻ᵏ⁺¹⁾)
    let mut bell = vec![vec![0.0; n + 1]; n + 1];
    bell[0][0] = 1.0;
    for m in 1..=n {
        for k in 1..=m {
            let mut acc = 0.0;
            // C(m-1, i-1), updated in place
            let mut binom = 1.0;
            for i in 1..=(m - k + 1) {
                acc += binom * derivs[i - 1] * bell[m - i][k - 1];
                binom *= (m - i) as f64 / i as f64;
            }
            bell[m][k] = acc;
        }
    }

    let mut total = 0.0;
    for (k, weight) in bell[n].iter().enumerate().skip(1) {
        if *weight == 0.0 {
            continue;
        }
        let order = u32::try_from(k).map_err(|_| EvaluationError::Overflow)?;
        let zk = eval_zeta_deriv(order, u).ok_or_else(|| EvaluationError::domain("zeta", u))?;
        total += zk * weight;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_power_domain() {
        assert_eq!(power(0.0, -1.0), Err(EvaluationError::domain("division", 0.0)));
        assert_eq!(power(-8.0, 0.5), Err(EvaluationError::domain("pow", -8.0)));
        assert_eq!(power(-2.0, 3.0), Ok(-8.0));
        assert_eq!(power(0.0, 0.0), Ok(1.0));
    }

    #[test]
    fn test_overflow_only_from_finite_inputs() {
        assert_eq!(check_overflow(f64::INFINITY, &[1e308, 1e308]), Err(EvaluationError::Overflow));
        assert_eq!(check_overflow(f64::INFINITY, &[f64::INFINITY]), Ok(f64::INFINITY));
        assert_eq!(check_overflow(f64::NAN, &[1e300, -1e300]), Err(EvaluationError::Overflow));
    }

    #[test]
    fn test_empty_program_is_an_error() {
        let empty = CompiledExpr {
            instructions: Box::new([]),
            constants: Box::new([]),
            functions: Box::new([]),
            stack_size: 0,
            cache_size: 0,
            params: Box::new([]),
        };
        assert_eq!(empty.execute(&[]), Err(EvaluationError::EmptyResult));
    }

    #[test]
    fn test_zeta_chain_first_order_is_chain_rule() {
        // d/dx ζ(x²) at x = 1.5
        let expected = eval_zeta_deriv(1, 2.25).unwrap() * 3.0;
        assert_relative_eq!(zeta_chain(2.25, &[3.0]).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_zeta_chain_second_order() {
        // d²/dx² ζ(2x) = 4 ζ''(2x)
        let expected = 4.0 * eval_zeta_deriv(2, 3.0).unwrap();
        assert_relative_eq!(zeta_chain(3.0, &[2.0, 0.0]).unwrap(), expected, max_relative = 1e-12);
        // d²/dx² ζ(x²) = 2 ζ'(x²) + 4x² ζ''(x²)
        let x: f64 = 1.5;
        let u = x * x;
        let expected = 2.0 * eval_zeta_deriv(1, u).unwrap() + 4.0 * u * eval_zeta_deriv(2, u).unwrap();
        assert_relative_eq!(zeta_chain(u, &[2.0 * x, 2.0]).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_zeta_chain_pole() {
        assert_eq!(zeta_chain(1.0, &[1.0]), Err(EvaluationError::domain("zeta", 1.0)));
    }
}
