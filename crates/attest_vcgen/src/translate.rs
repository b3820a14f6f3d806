//! Expression translation (E2F): IR expressions to Z3 formulas.
//!
//! Translation is parameterised by an [`OldPolicy`] that fixes what
//! `old(v)` means:
//!
//! - [`OldPolicy::ProcEntry`]: `old(v)` is the procedure-entry snapshot
//!   `v_old`, bound by the procedure verifier. Used when a procedure's own
//!   contract is interpreted inside its own VC.
//! - [`OldPolicy::CallSite`]: `old(v)` is the pre-call snapshot
//!   `v_pre_call`, which the call rule later binds to the caller's current
//!   state. Used when a callee's contract is instantiated at a call site.
//!
//! `Var(v)` always means the current state. Sort mismatches (a boolean
//! operand under `+`, an integer under `and`) are ill-formed-IR errors;
//! nothing is coerced silently.
//!
//! Translation is pure given the context: the same expression under the
//! same policy always yields a structurally identical term, which is what
//! makes caching of spec functions sound.

use crate::context::VcgContext;
use crate::error::{VcgenError, VcgenResult};
use attest_ir::{ArrayRef, BinOp, Expr};
use z3::ast::{Array, Ast, Bool, Dynamic, Int};

/// How `old(..)` resolves during translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OldPolicy {
    /// `old(v)` is the pre-call snapshot `v_pre_call`.
    CallSite,
    /// `old(v)` is the procedure-entry snapshot `v_old`.
    ProcEntry,
}

impl OldPolicy {
    /// The symbol suffix this policy appends to snapshot names.
    pub fn suffix(self) -> &'static str {
        match self {
            OldPolicy::CallSite => "_pre_call",
            OldPolicy::ProcEntry => "_old",
        }
    }
}

impl<'ctx> VcgContext<'ctx> {
    /// Translates `expr` under `policy`.
    pub fn translate(&self, expr: &Expr, policy: OldPolicy) -> VcgenResult<Dynamic<'ctx>> {
        let ctx = self.z3();
        match expr {
            Expr::Int(n) => Ok(Dynamic::from_ast(&Int::from_i64(ctx, *n))),
            Expr::Bool(b) => Ok(Dynamic::from_ast(&Bool::from_bool(ctx, *b))),
            Expr::Var(name) => Ok(self.symbol(name)),
            Expr::Old(name) => Ok(self.suffixed_symbol(name, policy.suffix())),

            Expr::Select { base, index } => {
                let idx = self.translate_int(index, policy)?;
                let array = self.select_base(base, policy);
                Ok(array.select(&idx))
            }

            Expr::Binary { op, left, right } => self.translate_binary(*op, left, right, policy),

            Expr::Neg(inner) => {
                let value = self.translate_int(inner, policy)?;
                Ok(Dynamic::from_ast(&(Int::from_i64(ctx, 0) - value)))
            }

            Expr::Not(inner) => {
                let value = self.translate_bool(inner, policy)?;
                Ok(Dynamic::from_ast(&value.not()))
            }

            Expr::Call { name, args } => {
                let mut translated = Vec::with_capacity(args.len());
                for a in args {
                    let value = self.translate_int(a, policy)?;
                    translated.push(Dynamic::from_ast(&value));
                }
                self.apply_spec_fn(name, &translated)
            }
        }
    }

    /// Translates `expr` and requires a boolean result.
    pub fn translate_bool(&self, expr: &Expr, policy: OldPolicy) -> VcgenResult<Bool<'ctx>> {
        self.translate(expr, policy)?.as_bool().ok_or_else(|| {
            VcgenError::ill_formed(format!("expected a boolean expression: {}", expr))
        })
    }

    /// Translates `expr` and requires an integer result.
    pub fn translate_int(&self, expr: &Expr, policy: OldPolicy) -> VcgenResult<Int<'ctx>> {
        self.translate(expr, policy)?.as_int().ok_or_else(|| {
            VcgenError::ill_formed(format!("expected an integer expression: {}", expr))
        })
    }

    fn select_base(&self, base: &ArrayRef, policy: OldPolicy) -> Array<'ctx> {
        match base {
            ArrayRef::Cur(name) => self.array_symbol(name),
            ArrayRef::Old(name) => self.array_symbol(&format!("{}{}", name, policy.suffix())),
        }
    }

    fn translate_binary(
        &self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        policy: OldPolicy,
    ) -> VcgenResult<Dynamic<'ctx>> {
        let ctx = self.z3();
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                let l = self.translate_int(left, policy)?;
                let r = self.translate_int(right, policy)?;
                let result = match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    _ => unreachable!(),
                };
                Ok(Dynamic::from_ast(&result))
            }

            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let l = self.translate_int(left, policy)?;
                let r = self.translate_int(right, policy)?;
                let result = match op {
                    BinOp::Lt => l.lt(&r),
                    BinOp::Le => l.le(&r),
                    BinOp::Gt => l.gt(&r),
                    BinOp::Ge => l.ge(&r),
                    _ => unreachable!(),
                };
                Ok(Dynamic::from_ast(&result))
            }

            BinOp::Eq | BinOp::Ne => {
                let l = self.translate(left, policy)?;
                let r = self.translate(right, policy)?;
                if l.get_sort() != r.get_sort() {
                    return Err(VcgenError::ill_formed(format!(
                        "comparison between different sorts: ({} {} {})",
                        left,
                        op.symbol(),
                        right
                    )));
                }
                let eq = l._eq(&r);
                let result = if op == BinOp::Ne { eq.not() } else { eq };
                Ok(Dynamic::from_ast(&result))
            }

            BinOp::And | BinOp::Or => {
                let l = self.translate_bool(left, policy)?;
                let r = self.translate_bool(right, policy)?;
                let result = match op {
                    BinOp::And => Bool::and(ctx, &[&l, &r]),
                    BinOp::Or => Bool::or(ctx, &[&l, &r]),
                    _ => unreachable!(),
                };
                Ok(Dynamic::from_ast(&result))
            }
        }
    }
}
