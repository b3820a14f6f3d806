//! Per-procedure verification.
//!
//! For a procedure `f` the VC is `Pre => wp(body, Post)` where:
//!
//! - `Pre` is `requires` (under the procedure-entry policy) conjoined with
//!   snapshot assumptions `v_old = v` for every name the contract mentions
//!   under `old(..)` - scalars by equality, arrays pointwise;
//! - `Post` is `ensures`, strengthened with an array-frame obligation: an
//!   array outside `modifies` must be unchanged, pointwise, at exit. (A
//!   scalar outside `modifies` doubles as a procedure temporary in the flat
//!   namespace, so no such obligation exists for scalars.)
//!
//! ## Contract axioms
//!
//! A procedure used as a pure function inside some specification gets a
//! contract axiom `forall params, snapshots. Req => Ens[ret -> F(params)]`,
//! which is how recursive functional specifications become usable. The
//! axiom is asserted for *callers* only - never while checking the
//! procedure that introduces it, which would be circular.

use crate::context::VcgContext;
use crate::error::{VcgenError, VcgenResult};
use crate::translate::OldPolicy;
use attest_ir::RET;
use std::collections::BTreeSet;
use z3::ast::{forall_const, Ast, Bool, Dynamic};

impl<'ctx> VcgContext<'ctx> {
    /// The verification condition for procedure `name`.
    pub fn procedure_vc(&self, name: &str) -> VcgenResult<Bool<'ctx>> {
        let ctx = self.z3();
        let spec = self
            .program()
            .procs
            .get(name)
            .ok_or_else(|| VcgenError::ill_formed(format!("unknown procedure '{}'", name)))?;

        // Arrays the contract does not declare writable carry an implicit
        // frame obligation; their snapshots are needed even when `ensures`
        // never mentions them.
        let undeclared_arrays: Vec<String> = self
            .sorts()
            .array_names()
            .filter(|a| !spec.modifies.contains(*a))
            .map(str::to_string)
            .collect();

        let mut snapshot_names: BTreeSet<String> = spec.ensures.old_names();
        snapshot_names.extend(undeclared_arrays.iter().cloned());

        let mut pre_parts: Vec<Bool> = Vec::new();
        pre_parts.push(self.translate_bool(&spec.requires, OldPolicy::ProcEntry)?);
        for v in &snapshot_names {
            pre_parts.push(self.snapshot_assumption(v));
        }
        let pre_refs: Vec<&Bool> = pre_parts.iter().collect();
        let pre = Bool::and(ctx, &pre_refs);

        let mut post = self.translate_bool(&spec.ensures, OldPolicy::ProcEntry)?;
        for a in &undeclared_arrays {
            post = Bool::and(ctx, &[&post, &self.array_unchanged(a)]);
        }

        let wp = self.wp(&spec.body, post, Some(RET), OldPolicy::ProcEntry)?;
        Ok(pre.implies(&wp))
    }

    /// `v_old = v` at procedure entry, at `v`'s sort.
    fn snapshot_assumption(&self, v: &str) -> Bool<'ctx> {
        let old_name = format!("{}_old", v);
        if self.sorts().is_array(v) {
            let idx = self.int_symbol(&format!("i_frame_{}", self.fresh_id()));
            let pointwise = self
                .array_symbol(&old_name)
                .select(&idx)
                ._eq(&self.array_symbol(v).select(&idx));
            forall_const(self.z3(), &[&idx as &dyn Ast], &[], &pointwise)
        } else {
            self.int_symbol(&old_name)._eq(&self.int_symbol(v))
        }
    }

    /// `forall i. v[i] = old(v)[i]` - the exit-state frame obligation for
    /// an array the contract did not declare writable.
    fn array_unchanged(&self, v: &str) -> Bool<'ctx> {
        let idx = self.int_symbol(&format!("i_frame_{}", self.fresh_id()));
        let pointwise = self
            .array_symbol(v)
            .select(&idx)
            ._eq(&self.array_symbol(&format!("{}_old", v)).select(&idx));
        forall_const(self.z3(), &[&idx as &dyn Ast], &[], &pointwise)
    }

    /// The contract axiom for `name`:
    /// `forall params, snapshots. Req => Ens[ret -> F(params)]`.
    pub fn contract_axiom(&self, name: &str) -> VcgenResult<Bool<'ctx>> {
        let ctx = self.z3();
        let spec = self
            .program()
            .procs
            .get(name)
            .ok_or_else(|| VcgenError::ill_formed(format!("unknown procedure '{}'", name)))?;

        let param_syms: Vec<Dynamic> = spec
            .params
            .iter()
            .map(|p| Dynamic::from_ast(&self.int_symbol(p)))
            .collect();
        let application = self.apply_spec_fn(name, &param_syms)?;

        let req = self.translate_bool(&spec.requires, OldPolicy::ProcEntry)?;
        let ens = self.translate_bool(&spec.ensures, OldPolicy::ProcEntry)?;
        let ret_sym = Dynamic::from_ast(&self.int_symbol(RET));
        let ens = ens.substitute(&[(&ret_sym, &application)]);
        let body = req.implies(&ens);

        let mut bounds = param_syms;
        for v in &spec.ensures.old_names() {
            bounds.push(self.suffixed_symbol(v, OldPolicy::ProcEntry.suffix()));
        }
        if bounds.is_empty() {
            return Ok(body);
        }
        let bound_refs: Vec<&dyn Ast> = bounds.iter().map(|b| b as &dyn Ast).collect();
        Ok(forall_const(ctx, &bound_refs, &[], &body))
    }
}
