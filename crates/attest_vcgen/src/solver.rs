//! The solver gateway.
//!
//! A deliberately narrow adapter over Z3: background axioms in, one
//! validity verdict out. Validity is checked the standard way - `P` is
//! valid iff `not P` is unsatisfiable - inside a push/pop scope so the
//! gateway could be reused for a re-check with more axioms.
//!
//! One gateway is created per VC and dropped afterwards; VCs from
//! different procedures never share a solver context, so axioms scoped to
//! one check can never leak into another.

use crate::context::VcgContext;
use crate::outcome::{CounterExample, Outcome};
use z3::ast::Bool;
use z3::{Context, Model, SatResult, Solver};

/// A single-VC solver adapter.
pub struct SolverGateway<'ctx> {
    solver: Solver<'ctx>,
}

impl<'ctx> SolverGateway<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Self {
            solver: Solver::new(ctx),
        }
    }

    /// Asserts a background axiom for this VC's check.
    pub fn assume(&self, axiom: &Bool<'ctx>) {
        self.solver.assert(axiom);
    }

    /// Checks whether `vc` is valid under the assumed axioms.
    pub fn check_valid(&self, vc: &Bool<'ctx>, vcg: &VcgContext<'ctx>) -> Outcome {
        self.solver.push();
        self.solver.assert(&vc.not());

        let outcome = match self.solver.check() {
            SatResult::Unsat => Outcome::Verified,
            SatResult::Sat => {
                let counterexample = self
                    .solver
                    .get_model()
                    .map(|model| extract_counterexample(vcg, &model));
                Outcome::failed(None, counterexample)
            }
            SatResult::Unknown => {
                let reason = self
                    .solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "no reason given".to_string());
                Outcome::Unknown { reason }
            }
        };

        self.solver.pop(1);
        outcome
    }
}

/// Reads the program's own variables out of a falsifying model. The full
/// model text is kept verbatim alongside, since it also names snapshot and
/// havoc symbols.
fn extract_counterexample<'ctx>(
    vcg: &VcgContext<'ctx>,
    model: &Model<'ctx>,
) -> CounterExample {
    let mut assignments = Vec::new();
    for v in &vcg.program().vars {
        let rendered = if vcg.sorts().is_array(v) {
            model.eval(&vcg.array_symbol(v), false).map(|a| a.to_string())
        } else {
            model.eval(&vcg.int_symbol(v), false).map(|i| i.to_string())
        };
        // A variable the model does not constrain evaluates to itself.
        if let Some(value) = rendered {
            if value != *v {
                assignments.push((v.clone(), value));
            }
        }
    }
    CounterExample {
        assignments,
        model: model.to_string(),
    }
}
