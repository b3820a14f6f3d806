//! The weakest-precondition transformer.
//!
//! `wp(stmt, post)` is the weakest condition on the initial state that
//! guarantees `post` holds after `stmt`, *if* `stmt` terminates - partial
//! correctness only.
//!
//! | Statement | wp |
//! |-----------|----|
//! | `skip` | `post` |
//! | `s1; s2` | `wp(s1, wp(s2, post))` |
//! | `assume e` | `e => post` |
//! | `assert e` | `e && post` |
//! | `if e { t } else { f }` | `(e => wp(t, post)) && (!e => wp(f, post))` |
//! | `v := e` | `post[v -> e]` |
//! | `a[i] := e` | `post[a -> store(a, i, e)]` |
//! | `return e` | `post[ret -> e]` |
//! | `while` | invariant entry, preservation, and exit clauses |
//! | `call` | the modular call rule below |
//!
//! ## The call rule
//!
//! For `lhs := f(actuals)` the caller learns exactly what `f`'s contract
//! promises, nothing more:
//!
//! 1. the instantiated precondition must hold at the site;
//! 2. every program variable is havocked to a fresh `v_k` (post-call state);
//! 3. variables outside `modifies(f) + {lhs}` are framed: scalars by
//!    equality, arrays pointwise;
//! 4. the instantiated postcondition and the frame are assumed of the
//!    havocked state, under a universal quantifier over the fresh symbols;
//! 5. `v_pre_call` snapshot symbols - what `old(..)` in the callee's
//!    contract translated to - are finally bound to the caller's current
//!    state (and, for the callee's parameters, to the actuals).
//!
//! Substitution order inside the contract is parameters, then `ret`, then
//! havoc; the three symbol families are disjoint by construction.

use crate::context::VcgContext;
use crate::error::{VcgenError, VcgenResult};
use crate::translate::OldPolicy;
use attest_ir::{Expr, Stmt, RET};
use std::collections::BTreeSet;
use z3::ast::{forall_const, Array, Ast, Bool, Int};

impl<'ctx> VcgContext<'ctx> {
    /// Weakest precondition of `stmt` with respect to `post`.
    ///
    /// `ret_var` is the symbol a `Return` substitutes, `None` outside
    /// procedure bodies. `policy` fixes how `old(..)` in embedded
    /// specifications resolves.
    pub fn wp(
        &self,
        stmt: &Stmt,
        post: Bool<'ctx>,
        ret_var: Option<&str>,
        policy: OldPolicy,
    ) -> VcgenResult<Bool<'ctx>> {
        match stmt {
            Stmt::Skip | Stmt::Invariant(_) => Ok(post),

            Stmt::Seq(stmts) => {
                let mut post = post;
                for s in stmts.iter().rev() {
                    post = self.wp(s, post, ret_var, policy)?;
                }
                Ok(post)
            }

            Stmt::Assume(e) => Ok(self.translate_bool(e, policy)?.implies(&post)),

            Stmt::Assert(e) => {
                let cond = self.translate_bool(e, policy)?;
                Ok(Bool::and(self.z3(), &[&cond, &post]))
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let test = self.translate_bool(cond, policy)?;
                let wp_then = self.wp(then_branch, post.clone(), ret_var, policy)?;
                let wp_else = self.wp(else_branch, post, ret_var, policy)?;
                Ok(Bool::and(
                    self.z3(),
                    &[&test.implies(&wp_then), &test.not().implies(&wp_else)],
                ))
            }

            Stmt::Assign { var, value } => {
                let sym = self.int_symbol(var);
                let value = self.translate_int(value, policy)?;
                Ok(post.substitute(&[(&sym, &value)]))
            }

            Stmt::ArrayStore {
                array,
                index,
                value,
            } => {
                let arr = self.array_symbol(array);
                let idx = self.translate_int(index, policy)?;
                let value = self.translate_int(value, policy)?;
                let stored = arr.store(&idx, &value);
                Ok(post.substitute(&[(&arr, &stored)]))
            }

            Stmt::Return(e) => {
                let ret = ret_var.ok_or_else(|| {
                    VcgenError::ill_formed(format!("'{}' outside a procedure body", stmt))
                })?;
                let sym = self.int_symbol(ret);
                let value = self.translate_int(e, policy)?;
                Ok(post.substitute(&[(&sym, &value)]))
            }

            Stmt::While {
                cond,
                body,
                invariants,
            } => self.wp_while(cond, body, invariants, post, ret_var, policy),

            Stmt::Call { callee, args, lhs } => {
                self.wp_call(callee, args, lhs.as_deref(), post, policy)
            }
        }
    }

    fn wp_while(
        &self,
        cond: &Expr,
        body: &Stmt,
        invariants: &[Expr],
        post: Bool<'ctx>,
        ret_var: Option<&str>,
        policy: OldPolicy,
    ) -> VcgenResult<Bool<'ctx>> {
        if invariants.is_empty() {
            // Without an invariant nothing is known about the post-state;
            // refuse to accept the loop rather than guess.
            tracing::warn!(condition = %cond, "while loop has no invariants; emitting an unprovable VC");
            return Ok(Bool::from_bool(self.z3(), false));
        }

        let ctx = self.z3();
        let test = self.translate_bool(cond, policy)?;
        let translated = invariants
            .iter()
            .map(|inv| self.translate_bool(inv, policy))
            .collect::<VcgenResult<Vec<_>>>()?;
        let inv_refs: Vec<&Bool> = translated.iter().collect();
        let inv = Bool::and(ctx, &inv_refs);

        // (a) the invariant holds on entry;
        // (b) it is preserved by the body when the test holds;
        // (c) it establishes the postcondition when the test fails.
        // The invariant carries the loop's frame: no explicit havoc needed.
        let preserved = self.wp(body, inv.clone(), ret_var, policy)?;
        let preservation = Bool::and(ctx, &[&inv, &test]).implies(&preserved);
        let exit = Bool::and(ctx, &[&inv, &test.not()]).implies(&post);
        Ok(Bool::and(ctx, &[&inv, &preservation, &exit]))
    }

    fn wp_call(
        &self,
        callee: &str,
        args: &[Expr],
        lhs: Option<&str>,
        post: Bool<'ctx>,
        policy: OldPolicy,
    ) -> VcgenResult<Bool<'ctx>> {
        let ctx = self.z3();
        let spec = self.program().procs.get(callee).ok_or_else(|| {
            VcgenError::ill_formed(format!("call to undefined procedure '{}'", callee))
        })?;
        if spec.params.len() != args.len() {
            return Err(VcgenError::ill_formed(format!(
                "call to '{}' passes {} arguments, procedure takes {}",
                callee,
                args.len(),
                spec.params.len()
            )));
        }

        // Actuals are caller-state expressions.
        let actuals = args
            .iter()
            .map(|a| self.translate_int(a, policy))
            .collect::<VcgenResult<Vec<_>>>()?;
        let param_syms: Vec<Int> = spec.params.iter().map(|p| self.int_symbol(p)).collect();
        let param_pairs: Vec<(&Int, &Int)> = param_syms.iter().zip(actuals.iter()).collect();

        // 1. The instantiated precondition is an obligation at this site.
        let req = self
            .translate_bool(&spec.requires, OldPolicy::CallSite)?
            .substitute(&param_pairs);

        // 2-3. Havoc: a fresh post-call symbol per variable, at its sort.
        let k = self.fresh_id();
        let vars = &self.program().vars;
        let mut int_cur = Vec::new();
        let mut int_fresh = Vec::new();
        let mut arr_cur = Vec::new();
        let mut arr_fresh = Vec::new();
        for v in vars {
            let fresh_name = format!("{}_{}", v, k);
            if self.sorts().is_array(v) {
                arr_cur.push(self.array_symbol(v));
                arr_fresh.push(self.array_symbol(&fresh_name));
            } else {
                int_cur.push(self.int_symbol(v));
                int_fresh.push(self.int_symbol(&fresh_name));
            }
        }
        let int_havoc: Vec<(&Int, &Int)> = int_cur.iter().zip(int_fresh.iter()).collect();
        let arr_havoc: Vec<(&Array, &Array)> = arr_cur.iter().zip(arr_fresh.iter()).collect();

        // 4. Frame: whatever the callee may not touch is unchanged. The
        // lhs is implicitly writable even when not in `modifies`.
        let mut writable: BTreeSet<&str> = spec.modifies.iter().map(String::as_str).collect();
        if let Some(lhs) = lhs {
            writable.insert(lhs);
        }
        let frame_idx = self.int_symbol(&format!("i_frame_{}", k));
        let mut frame: Vec<Bool> = Vec::new();
        for v in vars {
            if writable.contains(v.as_str()) {
                continue;
            }
            let fresh_name = format!("{}_{}", v, k);
            if self.sorts().is_array(v) {
                let pointwise = self
                    .array_symbol(&fresh_name)
                    .select(&frame_idx)
                    ._eq(&self.array_symbol(v).select(&frame_idx));
                frame.push(forall_const(ctx, &[&frame_idx as &dyn Ast], &[], &pointwise));
            } else {
                frame.push(
                    self.int_symbol(&fresh_name)
                        ._eq(&self.int_symbol(v)),
                );
            }
        }
        let frame_refs: Vec<&Bool> = frame.iter().collect();
        let frame_all = Bool::and(ctx, &frame_refs);

        // 5. The instantiated postcondition, over the havocked state.
        // Order: parameters, then ret, then havoc.
        let mut ens = self
            .translate_bool(&spec.ensures, OldPolicy::CallSite)?
            .substitute(&param_pairs);
        if let Some(lhs) = lhs {
            let ret_sym = self.int_symbol(RET);
            let lhs_fresh = self.int_symbol(&format!("{}_{}", lhs, k));
            ens = ens.substitute(&[(&ret_sym, &lhs_fresh)]);
        }
        let ens = ens.substitute(&int_havoc).substitute(&arr_havoc);

        // 6. The caller's obligation continues in the havocked state.
        let post_havoc = post.substitute(&int_havoc).substitute(&arr_havoc);
        let hypothesis = Bool::and(ctx, &[&ens, &frame_all]);
        let fragment = hypothesis.implies(&post_havoc);
        let bounds: Vec<&dyn Ast> = int_fresh
            .iter()
            .map(|i| i as &dyn Ast)
            .chain(arr_fresh.iter().map(|a| a as &dyn Ast))
            .collect();
        let quantified = if bounds.is_empty() {
            fragment
        } else {
            forall_const(ctx, &bounds, &[], &fragment)
        };
        let vc = Bool::and(ctx, &[&req, &quantified]);

        // Bind the snapshots: `old(p)` of a parameter is the actual's
        // pre-call value; every other snapshot is the caller's current
        // state, which *is* the pre-call state out here.
        let param_pre: Vec<Int> = spec
            .params
            .iter()
            .map(|p| self.int_symbol(&format!("{}_pre_call", p)))
            .collect();
        let param_pre_pairs: Vec<(&Int, &Int)> = param_pre.iter().zip(actuals.iter()).collect();
        let vc = vc.substitute(&param_pre_pairs);

        let mut int_pre_from = Vec::new();
        let mut arr_pre_from = Vec::new();
        for v in vars {
            let pre_name = format!("{}_pre_call", v);
            if self.sorts().is_array(v) {
                arr_pre_from.push((self.array_symbol(&pre_name), self.array_symbol(v)));
            } else {
                int_pre_from.push((self.int_symbol(&pre_name), self.int_symbol(v)));
            }
        }
        let int_pre_pairs: Vec<(&Int, &Int)> =
            int_pre_from.iter().map(|(a, b)| (a, b)).collect();
        let arr_pre_pairs: Vec<(&Array, &Array)> =
            arr_pre_from.iter().map(|(a, b)| (a, b)).collect();
        Ok(vc.substitute(&int_pre_pairs).substitute(&arr_pre_pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_ir::Program;
    use z3::{Config, Context, SatResult, Solver};

    fn with_context<F: FnOnce(&VcgContext)>(program: &Program, f: F) {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let vcg = VcgContext::new(&ctx, program).unwrap();
        f(&vcg);
    }

    /// Both formulas valid under exactly the same states.
    fn assert_equivalent(vcg: &VcgContext, a: &Bool, b: &Bool) {
        let solver = Solver::new(vcg.z3());
        solver.assert(&a.iff(b).not());
        assert_eq!(solver.check(), SatResult::Unsat, "{} !<=> {}", a, b);
    }

    #[test]
    fn skip_is_neutral() {
        let program = Program::from_main(vec![]);
        with_context(&program, |vcg| {
            let post = vcg.int_symbol("x").gt(&Int::from_i64(vcg.z3(), 0));
            let wp = vcg
                .wp(&Stmt::Skip, post.clone(), None, OldPolicy::CallSite)
                .unwrap();
            assert_equivalent(vcg, &wp, &post);
        });
    }

    #[test]
    fn assign_substitutes_into_post() {
        let program = Program::from_main(vec![Stmt::assign("x", Expr::int(0))]);
        with_context(&program, |vcg| {
            let post = vcg.int_symbol("x").gt(&Int::from_i64(vcg.z3(), 0));
            let stmt = Stmt::assign("x", Expr::add(Expr::var("x"), Expr::int(1)));
            let wp = vcg.wp(&stmt, post, None, OldPolicy::CallSite).unwrap();
            // wp is x + 1 > 0, i.e. x > -1
            let expected = vcg.int_symbol("x").gt(&Int::from_i64(vcg.z3(), -1));
            assert_equivalent(vcg, &wp, &expected);
        });
    }

    #[test]
    fn assume_then_assert_collapses_to_implication() {
        let program = Program::from_main(vec![]);
        with_context(&program, |vcg| {
            let e = Expr::gt(Expr::var("x"), Expr::int(0));
            let post = vcg.int_symbol("y")._eq(&Int::from_i64(vcg.z3(), 1));
            let stmt = Stmt::Seq(vec![Stmt::assume(e.clone()), Stmt::assert(e.clone())]);
            let wp = vcg.wp(&stmt, post.clone(), None, OldPolicy::CallSite).unwrap();
            let test = vcg.translate_bool(&e, OldPolicy::CallSite).unwrap();
            assert_equivalent(vcg, &wp, &test.implies(&post));
        });
    }

    #[test]
    fn seq_is_associative() {
        let program = Program::from_main(vec![]);
        with_context(&program, |vcg| {
            let s = Stmt::assign("x", Expr::add(Expr::var("x"), Expr::int(1)));
            let t = Stmt::assign("y", Expr::mul(Expr::var("x"), Expr::int(2)));
            let u = Stmt::assert(Expr::gt(Expr::var("y"), Expr::var("x")));
            let post = Bool::from_bool(vcg.z3(), true);

            let left = Stmt::Seq(vec![
                s.clone(),
                Stmt::Seq(vec![t.clone(), u.clone()]),
            ]);
            let right = Stmt::Seq(vec![Stmt::Seq(vec![s, t]), u]);
            let wp_left = vcg.wp(&left, post.clone(), None, OldPolicy::CallSite).unwrap();
            let wp_right = vcg.wp(&right, post, None, OldPolicy::CallSite).unwrap();
            assert_equivalent(vcg, &wp_left, &wp_right);
        });
    }

    #[test]
    fn stray_invariant_markers_are_transparent() {
        let program = Program::from_main(vec![]);
        with_context(&program, |vcg| {
            let marked = Stmt::Seq(vec![
                Stmt::Invariant(Expr::gt(Expr::var("x"), Expr::int(0))),
                Stmt::assign("x", Expr::int(5)),
            ]);
            let plain = Stmt::Seq(vec![Stmt::assign("x", Expr::int(5))]);
            let post = vcg.int_symbol("x")._eq(&Int::from_i64(vcg.z3(), 5));
            let wp_marked = vcg
                .wp(&marked, post.clone(), None, OldPolicy::CallSite)
                .unwrap();
            let wp_plain = vcg.wp(&plain, post, None, OldPolicy::CallSite).unwrap();
            assert_equivalent(vcg, &wp_marked, &wp_plain);
        });
    }

    #[test]
    fn loop_without_invariants_is_unprovable() {
        let program = Program::from_main(vec![]);
        with_context(&program, |vcg| {
            let w = Stmt::while_loop(
                Expr::lt(Expr::var("i"), Expr::var("n")),
                vec![Stmt::assign("i", Expr::add(Expr::var("i"), Expr::int(1)))],
                vec![],
            );
            let wp = vcg
                .wp(&w, Bool::from_bool(vcg.z3(), true), None, OldPolicy::CallSite)
                .unwrap();
            assert_equivalent(vcg, &wp, &Bool::from_bool(vcg.z3(), false));
        });
    }

    #[test]
    fn return_outside_procedure_is_ill_formed() {
        let program = Program::from_main(vec![]);
        with_context(&program, |vcg| {
            let err = vcg
                .wp(
                    &Stmt::ret(Expr::int(0)),
                    Bool::from_bool(vcg.z3(), true),
                    None,
                    OldPolicy::CallSite,
                )
                .unwrap_err();
            assert!(err.is_reportable());
            assert!(err.to_string().contains("return 0"));
        });
    }

    #[test]
    fn call_to_undefined_procedure_is_ill_formed() {
        let program = Program::from_main(vec![Stmt::call("nope", vec![])]);
        with_context(&program, |vcg| {
            let err = vcg
                .wp(
                    &Stmt::call("nope", vec![]),
                    Bool::from_bool(vcg.z3(), true),
                    None,
                    OldPolicy::CallSite,
                )
                .unwrap_err();
            assert!(err.is_reportable());
            assert!(err.to_string().contains("nope"));
        });
    }
}
