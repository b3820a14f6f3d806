//! # attest_vcgen
//!
//! Weakest-precondition verification-condition generation and Z3 discharge
//! for contract-annotated imperative programs.
//!
//! ## Quick Start
//!
//! ```ignore
//! use attest_ir::{Expr, Program, Stmt};
//! use attest_vcgen::verify_program;
//!
//! let program = Program::from_main(vec![
//!     Stmt::assign("x", Expr::int(1)),
//!     Stmt::assert(Expr::gt(Expr::var("x"), Expr::int(0))),
//! ]);
//! let report = verify_program(&program)?;
//! assert!(report.all_verified());
//! ```
//!
//! ## Architecture
//!
//! The pipeline is a stack of small layers, leaves first:
//!
//! | Layer | Module | Job |
//! |-------|--------|-----|
//! | Expression translation | [`translate`] | IR expression → Z3 formula under an [`OldPolicy`] |
//! | WP transformer | [`wp`] | statement × postcondition → weakest precondition |
//! | Procedure verifier | [`procedure`] | contracts, `old` snapshots, recursive-spec axioms |
//! | Session | [`session`] | per-procedure and top-level orchestration |
//! | Solver gateway | [`solver`] | validity as unsatisfiability of the negation |
//!
//! All shared state - the uninterpreted-function cache for spec-level calls
//! and the fresh-symbol counter - lives in one explicitly threaded
//! [`VcgContext`]; there are no globals, so independent programs can be
//! verified from independent contexts.
//!
//! ## Soundness posture
//!
//! Partial correctness only: a `VERIFIED` procedure satisfies its contract
//! *if it terminates*. Loops without invariants produce an unprovable VC
//! rather than being accepted silently. A procedure's own contract axiom is
//! never used to discharge that procedure's VC.

pub mod context;
pub mod error;
pub mod outcome;
pub mod procedure;
pub mod session;
pub mod solver;
pub mod translate;
pub mod wp;

pub use context::VcgContext;
pub use error::{VcgenError, VcgenErrorKind, VcgenResult};
pub use outcome::{CounterExample, Outcome, ProcedureReport, Report};
pub use session::{solver_config, verify_program, VerificationSession};
pub use solver::SolverGateway;
pub use translate::OldPolicy;
