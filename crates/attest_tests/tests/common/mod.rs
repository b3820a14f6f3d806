//! E2E Test Harness
//!
//! Builders and assertion helpers shared by the end-to-end scenarios.

#![allow(dead_code)]

use attest_ir::{ProcSpec, Program, Stmt};
use attest_vcgen::{verify_program, Outcome, Report};
use indexmap::IndexMap;

/// Builds a program from named procedures and a top-level body.
pub fn program(procs: Vec<(&str, ProcSpec)>, main: Vec<Stmt>) -> Program {
    let mut map = IndexMap::new();
    for (name, spec) in procs {
        map.insert(name.to_string(), spec);
    }
    Program::new(map, Stmt::Seq(main))
}

/// Runs the verifier and requires every VC to come back `VERIFIED`.
pub fn assert_all_verified(program: &Program) -> Report {
    let report = verify_program(program).expect("verification should not error");
    assert!(report.all_verified(), "expected full verification, got:\n{}", report);
    report
}

/// Runs the verifier and requires the top-level program VC to fail while
/// every procedure verifies.
pub fn assert_main_fails(program: &Program) -> Report {
    let report = verify_program(program).expect("verification should not error");
    for p in &report.procedures {
        assert!(
            p.outcome.is_verified(),
            "procedure {} unexpectedly not verified:\n{}",
            p.name,
            report
        );
    }
    match report.program {
        Some(Outcome::Failed { .. }) => {}
        ref other => panic!("expected the program VC to fail, got {:?}", other),
    }
    report
}

/// `VERIFIED` must not be the verdict (either `FAILED` or `UNKNOWN` is
/// acceptable where the solver may legitimately give up).
pub fn assert_not_verified(outcome: &Outcome) {
    assert!(
        !outcome.is_verified(),
        "expected FAILED or UNKNOWN, got VERIFIED"
    );
}
