//! E2E Tests: Frame Conditions
//!
//! Two sides of the same coin: callers may rely on everything outside
//! `modifies` being unchanged, and a procedure body that breaks its own
//! declared frame must fail its VC.

mod common;

use attest_ir::{Expr, ProcSpec, Program, Stmt, RET};
use attest_vcgen::{solver_config, VerificationSession};
use common::{assert_all_verified, assert_not_verified, program};
use z3::Context;

/// A procedure that writes `a[0]` while declaring `modifies` empty.
fn frame_liar() -> ProcSpec {
    ProcSpec::new(
        vec![],
        vec![
            Stmt::store("a", Expr::int(0), Expr::int(7)),
            Stmt::ret(Expr::int(0)),
        ],
    )
}

fn liar_program() -> Program {
    program(
        vec![("touch", frame_liar())],
        vec![
            Stmt::store("a", Expr::int(0), Expr::int(5)),
            Stmt::call_assign("r", "touch", vec![]),
            Stmt::assert(Expr::eq(Expr::select("a", Expr::int(0)), Expr::int(5))),
        ],
    )
}

#[test]
fn e2e_caller_may_trust_the_declared_frame() {
    // Modular reasoning believes the contract, so the caller verifies -
    // which is exactly why the lie must be caught on the callee's side.
    let p = liar_program();
    let cfg = solver_config();
    let ctx = Context::new(&cfg);
    let session = VerificationSession::new(&ctx, &p).unwrap();
    assert!(session.verify_main().unwrap().is_verified());
}

#[test]
fn e2e_lying_procedure_fails_its_own_vc() {
    let p = liar_program();
    let cfg = solver_config();
    let ctx = Context::new(&cfg);
    let session = VerificationSession::new(&ctx, &p).unwrap();
    assert_not_verified(&session.verify_procedure("touch").unwrap());
}

#[test]
fn e2e_lying_procedure_halts_the_full_run() {
    let report = attest_vcgen::verify_program(&liar_program()).unwrap();
    assert_not_verified(&report.procedures[0].outcome);
    assert!(report.program.is_none());
}

#[test]
fn e2e_declared_array_modification_verifies() {
    // The honest twin declares its write.
    let honest = ProcSpec::new(
        vec![],
        vec![
            Stmt::store("a", Expr::int(0), Expr::int(7)),
            Stmt::ret(Expr::int(0)),
        ],
    )
    .ensures(Expr::eq(Expr::select("a", Expr::int(0)), Expr::int(7)))
    .modifies(&["a"]);

    let p = program(
        vec![("touch", honest)],
        vec![
            Stmt::call_assign("r", "touch", vec![]),
            Stmt::assert(Expr::eq(Expr::select("a", Expr::int(0)), Expr::int(7))),
        ],
    );
    assert_all_verified(&p);
}

#[test]
fn e2e_arrays_outside_modifies_are_framed_at_call_sites() {
    // setter writes b, leaves a alone; the caller keeps its view of a.
    let setter = ProcSpec::new(
        vec![],
        vec![
            Stmt::store("b", Expr::int(0), Expr::int(1)),
            Stmt::ret(Expr::int(0)),
        ],
    )
    .modifies(&["b"]);

    let p = program(
        vec![("set_b", setter)],
        vec![
            Stmt::store("a", Expr::int(4), Expr::int(44)),
            Stmt::call_assign("r", "set_b", vec![]),
            Stmt::assert(Expr::eq(Expr::select("a", Expr::int(4)), Expr::int(44))),
        ],
    );
    assert_all_verified(&p);
}

#[test]
fn e2e_scalar_temporaries_do_not_trip_the_frame() {
    // The body uses a scratch scalar it never declares; scalars outside
    // `modifies` double as temporaries, so this must verify.
    let scratch = ProcSpec::new(
        vec!["x"],
        vec![
            Stmt::assign("t", Expr::mul(Expr::var("x"), Expr::int(2))),
            Stmt::ret(Expr::var("t")),
        ],
    )
    .ensures(Expr::eq(
        Expr::var(RET),
        Expr::mul(Expr::old("x"), Expr::int(2)),
    ));

    let p = program(
        vec![("double", scratch)],
        vec![
            Stmt::call_assign("y", "double", vec![Expr::int(21)]),
            Stmt::assert(Expr::eq(Expr::var("y"), Expr::int(42))),
        ],
    );
    assert_all_verified(&p);
}
