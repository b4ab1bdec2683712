use std::sync::Arc;

use crate::Expr;
use crate::core::expr::{Func, NodeKind};
use crate::functions::Builtin;
use crate::simplification::rules::{Rule, RuleContext};
use crate::traits::FLOAT_TOLERANCE;

/// Functions whose value at a number is exact and always worth folding
fn folds_exactly(b: Builtin) -> bool {
    matches!(
        b,
        Builtin::Abs | Builtin::Sign | Builtin::Floor | Builtin::Ceil | Builtin::Round
    )
}

rule!(
    NumericFoldRule,
    "numeric_fold",
    100,
    Numeric,
    &[NodeKind::Function],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let Some((Func::Builtin(b), args)) = expr.as_call() else {
            return None;
        };
        let values: Vec<f64> = args.iter().map(Expr::as_number).collect::<Option<_>>()?;
        let def = b.definition();
        if !def.validate_arity(values.len()) {
            return None;
        }
        let v = (def.eval)(&values)?;
        if !v.is_finite() {
            return None;
        }
        if folds_exactly(*b) {
            return Some(Expr::number(v));
        }
        // sin(1) stays symbolic; sqrt(4) and cos(0) fold
        let r = v.round();
        ((v - r).abs() <= FLOAT_TOLERANCE * r.abs().max(1.0)).then(|| Expr::number(r))
    }
);

rule!(
    LnERule,
    "ln_e",
    95,
    Numeric,
    &[NodeKind::Function],
    |expr: &Expr, context: &RuleContext| -> Option<Expr> {
        let arg = expr.unary_arg(Builtin::Ln)?;
        context.is_euler(arg).then(Expr::one)
    }
);

pub(crate) fn get_numeric_rules() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(NumericFoldRule), Arc::new(LnERule)]
}
