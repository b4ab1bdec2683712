//! Expression compiler for the bytecode evaluator.
//!
//! One pass over the tree emits postfix [`Instruction`]s while tracking stack
//! depth. Repeated function calls, powers and derivative nodes are stored in
//! cache slots the first time and reloaded afterwards.
//!
//! Derivative nodes are lowered before emission:
//! - `∂ⁿζ(u)/∂xⁿ` compiles `u` and its first `n` derivatives, then a
//!   [`Instruction::ZetaChain`] combines them with Faà di Bruno's formula;
//! - any other inner expression is differentiated symbolically and the result is compiled.

use std::collections::hash_map::Entry;
use std::f64::consts;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::instruction::Instruction;
use crate::builder::{CustomEvalFn, CustomFn};
use crate::core::error::{DiffError, EvaluationError};
use crate::core::expr::{ExprKind, Func};
use crate::diff::derive_raw;
use crate::functions::Builtin;
use crate::{Expr, Symbol};

/// Output of a finished compilation
pub(crate) struct Program {
    pub instructions: Vec<Instruction>,
    pub constants: Vec<f64>,
    pub functions: Vec<(Arc<str>, CustomEvalFn)>,
    pub stack_size: usize,
    pub cache_size: usize,
}

pub(crate) struct Compiler<'a> {
    instructions: Vec<Instruction>,
    /// Parameters in evaluation order
    params: &'a [Symbol],
    custom_fns: &'a FxHashMap<Arc<str>, CustomFn>,
    /// Evaluators referenced by `Custom` instructions, by index
    functions: Vec<(Arc<str>, CustomEvalFn)>,
    function_index: FxHashMap<Arc<str>, u32>,
    constants: Vec<f64>,
    const_map: FxHashMap<u64, u32>,
    cse_cache: FxHashMap<Expr, u32>,
    cache_size: usize,
    current_stack: usize,
    max_stack: usize,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(params: &'a [Symbol], custom_fns: &'a FxHashMap<Arc<str>, CustomFn>) -> Self {
        Compiler {
            instructions: Vec::with_capacity(64),
            params,
            custom_fns,
            functions: Vec::new(),
            function_index: FxHashMap::default(),
            constants: Vec::new(),
            const_map: FxHashMap::default(),
            cse_cache: FxHashMap::default(),
            cache_size: 0,
            current_stack: 0,
            max_stack: 0,
        }
    }

    pub(crate) fn finish(self) -> Program {
        Program {
            instructions: self.instructions,
            constants: self.constants,
            functions: self.functions,
            stack_size: self.max_stack,
            cache_size: self.cache_size,
        }
    }

    fn emit(&mut self, instr: Instruction) {
        let (pops, pushes) = instr.stack_effect();
        self.current_stack = self.current_stack.saturating_sub(pops) + pushes;
        self.max_stack = self.max_stack.max(self.current_stack);
        self.instructions.push(instr);
    }

    /// Add a constant to the pool, deduplicating by bit pattern
    fn add_const(&mut self, val: f64) -> u32 {
        match self.const_map.entry(val.to_bits()) {
            Entry::Occupied(o) => *o.get(),
            Entry::Vacant(v) => {
                let idx = pool_index(self.constants.len());
                self.constants.push(val);
                v.insert(idx);
                idx
            }
        }
    }

    /// Append a contiguous block of constants and return its start
    fn add_block(&mut self, values: impl Iterator<Item = f64>) -> u32 {
        let start = pool_index(self.constants.len());
        self.constants.extend(values);
        start
    }

    pub(crate) fn compile_expr(&mut self, expr: &Expr) -> Result<(), EvaluationError> {
        if let Some(&slot) = self.cse_cache.get(expr) {
            self.emit(Instruction::LoadCached(slot));
            return Ok(());
        }

        match expr.kind() {
            ExprKind::Number(n) => {
                let idx = self.add_const(*n);
                self.emit(Instruction::LoadConst(idx));
            }
            ExprKind::Symbol(s) => self.compile_symbol(s)?,
            ExprKind::Sum(terms) => {
                for (_, t) in terms {
                    self.compile_expr(t)?;
                }
                let coeffs = self.add_block(terms.iter().map(|(c, _)| *c));
                self.emit(Instruction::Sum {
                    coeffs,
                    len: pool_index(terms.len()),
                });
            }
            ExprKind::Product(factors) => {
                for (b, _) in factors {
                    self.compile_expr(b)?;
                }
                let exps = self.add_block(factors.iter().map(|(_, k)| *k));
                self.emit(Instruction::Product {
                    exps,
                    len: pool_index(factors.len()),
                });
            }
            ExprKind::Pow(base, exp) => {
                self.compile_expr(base)?;
                self.compile_expr(exp)?;
                self.emit(Instruction::Pow);
            }
            ExprKind::Function { func, args } => self.compile_call(func, args)?,
            ExprKind::Derivative { inner, var, order } => {
                self.compile_derivative(expr, inner, var, *order)?;
            }
        }

        if matches!(
            expr.kind(),
            ExprKind::Pow(..) | ExprKind::Function { .. } | ExprKind::Derivative { .. }
        ) {
            let slot = pool_index(self.cache_size);
            self.cache_size += 1;
            self.emit(Instruction::StoreCached(slot));
            self.cse_cache.insert(expr.clone(), slot);
        }
        Ok(())
    }

    /// Parameters first; unbound `pi` and `e` fall back to their constants
    fn compile_symbol(&mut self, s: &Symbol) -> Result<(), EvaluationError> {
        if let Some(pos) = self.params.iter().position(|p| p == s) {
            self.emit(Instruction::LoadParam(pool_index(pos)));
            return Ok(());
        }
        let value = match s.name() {
            Some("pi") => consts::PI,
            Some("e") => consts::E,
            _ => return Err(EvaluationError::UnboundVariable(s.label().into_owned())),
        };
        let idx = self.add_const(value);
        self.emit(Instruction::LoadConst(idx));
        Ok(())
    }

    fn compile_call(&mut self, func: &Func, args: &[Expr]) -> Result<(), EvaluationError> {
        let argc = pool_index(args.len());
        match func {
            Func::Builtin(b) => {
                if !b.definition().validate_arity(args.len()) {
                    return Err(EvaluationError::UnknownFunction(b.name().to_string()));
                }
                for a in args {
                    self.compile_expr(a)?;
                }
                self.emit(Instruction::Call { func: *b, argc });
            }
            Func::Named(name) => {
                let index = self.function_slot(name, args.len())?;
                for a in args {
                    self.compile_expr(a)?;
                }
                self.emit(Instruction::Custom { index, argc });
            }
        }
        Ok(())
    }

    fn function_slot(&mut self, name: &Arc<str>, argc: usize) -> Result<u32, EvaluationError> {
        if let Some(&index) = self.function_index.get(name) {
            return Ok(index);
        }
        let eval_fn = self
            .custom_fns
            .get(name)
            .and_then(|def| def.evaluator(argc))
            .ok_or_else(|| EvaluationError::UnknownFunction(name.to_string()))?;
        let index = pool_index(self.functions.len());
        self.functions.push((name.clone(), eval_fn.clone()));
        self.function_index.insert(name.clone(), index);
        Ok(index)
    }

    fn compile_derivative(
        &mut self,
        expr: &Expr,
        inner: &Expr,
        var: &Symbol,
        order: u32,
    ) -> Result<(), EvaluationError> {
        if let Some(u) = inner.unary_arg(Builtin::Zeta) {
            self.compile_expr(u)?;
            let mut current = u.clone();
            for _ in 0..order {
                current = derive_raw(&current, var).map_err(derivative_error)?;
                self.compile_expr(&current)?;
            }
            self.emit(Instruction::ZetaChain { order });
            return Ok(());
        }

        // Mixed partials of a live node have no numeric lowering
        if matches!(inner.kind(), ExprKind::Derivative { .. }) {
            return Err(EvaluationError::UnknownFunction(expr.to_string()));
        }

        debug!(%expr, "evaluating derivative node through its symbolic expansion");
        let mut current = inner.clone();
        for _ in 0..order {
            current = derive_raw(&current, var).map_err(derivative_error)?;
        }
        self.compile_expr(&current)
    }
}

fn derivative_error(err: DiffError) -> EvaluationError {
    match err {
        DiffError::UnsupportedDifferentiation { function_name } => {
            EvaluationError::UnknownFunction(function_name)
        }
        other => EvaluationError::UnknownFunction(other.to_string()),
    }
}

/// Pool, slot and length indices are bounded by the expression size
fn pool_index(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
