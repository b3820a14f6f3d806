//! # attest_ir
//!
//! Verification IR for contract-annotated imperative programs.
//!
//! This crate defines the sole input of the `attest` verification core: a
//! [`Program`] of procedures with `requires` / `ensures` / `modifies`
//! contracts and a top-level statement sequence. Front-ends produce these
//! values; the VC generator consumes them read-only and never mutates them.
//!
//! ## Architecture
//!
//! The IR is deliberately decoupled from any surface syntax and from the
//! solver. This keeps the dependency graph acyclic:
//!
//! - Front-ends depend on `attest-ir` to build programs.
//! - `attest-vcgen` depends on `attest-ir` (and on Z3) to verify them.
//!
//! ## Typing discipline
//!
//! A name denotes either an integer or an array, never both. The choice is
//! inferred from use sites by [`sorts::infer`]: a name is an array exactly
//! when it occurs as a `Select` base or an `ArrayStore` target. Programs
//! that use one name both ways are rejected before any VC is generated.
//!
//! ## Modules
//!
//! - [`expr`] - specification and program expressions
//! - [`stmt`] - statements
//! - [`program`] - procedure specs, programs, and the variable census
//! - [`sorts`] - per-name sort inference
//! - [`error`] - IR-level errors

pub mod error;
pub mod expr;
pub mod program;
pub mod sorts;
pub mod stmt;

pub use error::{IrError, IrResult};
pub use expr::{ArrayRef, BinOp, Expr};
pub use program::{ProcSpec, Program, RET};
pub use sorts::{Sort, SortMap};
pub use stmt::Stmt;
