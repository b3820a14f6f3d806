//! Session orchestration.
//!
//! A [`VerificationSession`] verifies one program: every procedure in
//! declaration order, then the top-level statements. The first procedure
//! that does not verify halts the run - the top-level VC is meaningless
//! when the contracts it relies on are unproven - and the report records
//! how far the run got.
//!
//! Contract axioms are scoped per check: a procedure's own axiom is never
//! asserted while checking that procedure; every caller (including the
//! top-level program) gets all of them.

use crate::context::VcgContext;
use crate::error::VcgenResult;
use crate::outcome::{Outcome, ProcedureReport, Report};
use crate::solver::SolverGateway;
use crate::translate::OldPolicy;
use attest_ir::Program;
use z3::ast::Bool;
use z3::{Config, Context};

/// A Z3 configuration with the verifier's default 10-second timeout.
pub fn solver_config() -> Config {
    let mut cfg = Config::new();
    cfg.set_param_value("timeout", "10000");
    cfg
}

/// Verifies `program` in a fresh solver context and returns the report.
///
/// Convenience wrapper over [`VerificationSession`] for drivers that do
/// not need per-VC control.
pub fn verify_program(program: &Program) -> VcgenResult<Report> {
    let cfg = solver_config();
    let ctx = Context::new(&cfg);
    let session = VerificationSession::new(&ctx, program)?;
    session.run()
}

/// One program's verification run.
pub struct VerificationSession<'ctx> {
    vcg: VcgContext<'ctx>,
}

impl<'ctx> VerificationSession<'ctx> {
    /// Validates the program (reserved names, per-name sorts) and prepares
    /// the session. The same `ctx` must outlive every check of the run so
    /// cached spec functions stay bound to their axioms.
    pub fn new(ctx: &'ctx Context, program: &'ctx Program) -> VcgenResult<Self> {
        Ok(Self {
            vcg: VcgContext::new(ctx, program)?,
        })
    }

    /// The underlying generator context.
    pub fn vcg(&self) -> &VcgContext<'ctx> {
        &self.vcg
    }

    /// Checks one procedure's VC.
    pub fn verify_procedure(&self, name: &str) -> VcgenResult<Outcome> {
        let span = tracing::info_span!("verify_procedure", procedure = name);
        let _enter = span.enter();

        let vc = match self.vcg.procedure_vc(name) {
            Ok(vc) => vc,
            Err(err) if err.is_reportable() => {
                tracing::warn!(error = %err, "could not build the VC");
                return Ok(Outcome::failed(Some(err.to_string()), None));
            }
            Err(err) => return Err(err),
        };
        self.check(&vc, Some(name))
    }

    /// Checks the top-level program against `true`.
    pub fn verify_main(&self) -> VcgenResult<Outcome> {
        let span = tracing::info_span!("verify_main");
        let _enter = span.enter();

        let program = self.vcg.program();
        let post = Bool::from_bool(self.vcg.z3(), true);
        let vc = match self.vcg.wp(&program.main, post, None, OldPolicy::CallSite) {
            Ok(vc) => vc,
            Err(err) if err.is_reportable() => {
                tracing::warn!(error = %err, "could not build the VC");
                return Ok(Outcome::failed(Some(err.to_string()), None));
            }
            Err(err) => return Err(err),
        };
        self.check(&vc, None)
    }

    /// Verifies every procedure in declaration order, then the top-level
    /// program. Halts at the first procedure that does not verify.
    pub fn run(&self) -> VcgenResult<Report> {
        let mut report = Report::default();
        for name in self.vcg.program().procs.keys() {
            let outcome = self.verify_procedure(name)?;
            let verified = outcome.is_verified();
            report.procedures.push(ProcedureReport {
                name: name.clone(),
                outcome,
            });
            if !verified {
                tracing::warn!(procedure = name.as_str(), "halting: procedure did not verify");
                return Ok(report);
            }
        }
        report.program = Some(self.verify_main()?);
        Ok(report)
    }

    /// Discharges one VC, with contract axioms for every cached spec
    /// function except `checking` itself.
    fn check(&self, vc: &Bool<'ctx>, checking: Option<&str>) -> VcgenResult<Outcome> {
        let gateway = SolverGateway::new(self.vcg.z3());
        for name in self.vcg.cached_spec_fns() {
            if checking == Some(name.as_str()) {
                continue;
            }
            tracing::debug!(function = name.as_str(), "asserting contract axiom");
            gateway.assume(&self.vcg.contract_axiom(&name)?);
        }
        let outcome = gateway.check_valid(vc, &self.vcg);
        tracing::info!(outcome = outcome.label(), "VC checked");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_ir::{Expr, Stmt};

    #[test]
    fn straight_line_program_verifies() {
        let program = Program::from_main(vec![
            Stmt::assign("x", Expr::int(1)),
            Stmt::assert(Expr::gt(Expr::var("x"), Expr::int(0))),
        ]);
        let report = verify_program(&program).unwrap();
        assert!(report.all_verified(), "{}", report);
    }

    #[test]
    fn false_assertion_fails_with_model() {
        let program = Program::from_main(vec![
            Stmt::assume(Expr::gt(Expr::var("x"), Expr::int(0))),
            Stmt::assert(Expr::gt(Expr::var("x"), Expr::int(1))),
        ]);
        let report = verify_program(&program).unwrap();
        assert!(!report.all_verified());
        match report.program {
            Some(Outcome::Failed {
                counterexample: Some(ref ce),
                ..
            }) => {
                // x = 1 is the only witness
                assert!(ce.assignments.iter().any(|(n, v)| n == "x" && v == "1"));
            }
            ref other => panic!("expected FAILED with model, got {:?}", other),
        }
    }

    #[test]
    fn top_level_return_is_rejected() {
        let program = Program::from_main(vec![Stmt::ret(Expr::int(0))]);
        let report = verify_program(&program).unwrap();
        match report.program {
            Some(Outcome::Failed { detail: Some(ref d), .. }) => {
                assert!(d.contains("outside a procedure body"), "{}", d);
            }
            ref other => panic!("expected FAILED with detail, got {:?}", other),
        }
    }

    #[test]
    fn branching_verifies_per_path() {
        // if x > 0 { y := x } else { y := 0 - x }; assert y >= 0
        let program = Program::from_main(vec![
            Stmt::if_else(
                Expr::gt(Expr::var("x"), Expr::int(0)),
                Stmt::assign("y", Expr::var("x")),
                Stmt::assign("y", Expr::neg(Expr::var("x"))),
            ),
            Stmt::assert(Expr::ge(Expr::var("y"), Expr::int(0))),
        ]);
        let report = verify_program(&program).unwrap();
        assert!(report.all_verified(), "{}", report);
    }
}
