//! Bytecode instruction set of the stack machine

use crate::functions::Builtin;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Instruction {
    /// Push `constants[idx]`
    LoadConst(u32),
    /// Push the parameter value at `idx`
    LoadParam(u32),
    /// Push a value saved by `StoreCached`
    LoadCached(u32),
    /// Copy the top of the stack into a cache slot without popping
    StoreCached(u32),
    /// Pop `len` values and push `Σ cᵢ·vᵢ`, coefficients at `constants[coeffs..]`
    Sum { coeffs: u32, len: u32 },
    /// Pop `len` values and push `Π vᵢ^kᵢ`, exponents at `constants[exps..]`
    Product { exps: u32, len: u32 },
    /// Pop exponent, pop base, push the power
    Pow,
    /// Pop `argc` arguments and push the builtin's value
    Call { func: Builtin, argc: u32 },
    /// Pop `argc` arguments and push the value of user function `index`
    Custom { index: u32, argc: u32 },
    /// Pop `u, u', …, u⁽ⁿ⁾` and push `dⁿ/dxⁿ ζ(u)`
    ZetaChain { order: u32 },
}

impl Instruction {
    /// Values popped and pushed
    pub(crate) fn stack_effect(self) -> (usize, usize) {
        match self {
            Instruction::LoadConst(_) | Instruction::LoadParam(_) | Instruction::LoadCached(_) => {
                (0, 1)
            }
            Instruction::StoreCached(_) => (0, 0),
            Instruction::Sum { len, .. } | Instruction::Product { len, .. } => (len as usize, 1),
            Instruction::Pow => (2, 1),
            Instruction::Call { argc, .. } | Instruction::Custom { argc, .. } => (argc as usize, 1),
            Instruction::ZetaChain { order } => (order as usize + 1, 1),
        }
    }
}
