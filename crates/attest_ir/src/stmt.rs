//! Statements of the imperative language.
//!
//! Control flow is structured: `If`, `While`, `Seq`. The logical commands
//! `Assume` and `Assert` come from the specification layer. `Invariant` is a
//! decoration the front-end lifts into the enclosing [`Stmt::While`]'s
//! invariant list; a stray marker is transparent to verification.

use crate::expr::Expr;
use std::fmt;

/// Statement AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// No-op.
    Skip,
    /// Sequential composition.
    Seq(Vec<Stmt>),
    /// Conditional.
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
    },
    /// Scalar assignment `var := value`.
    Assign {
        var: String,
        value: Expr,
    },
    /// Array write `array[index] := value`.
    ArrayStore {
        array: String,
        index: Expr,
        value: Expr,
    },
    /// Logical assumption; constrains subsequent reasoning.
    Assume(Expr),
    /// Logical assertion; an obligation the verifier must discharge.
    Assert(Expr),
    /// Loop with front-end-supplied invariants.
    While {
        cond: Expr,
        body: Box<Stmt>,
        invariants: Vec<Expr>,
    },
    /// An invariant marker left in statement position. Transparent.
    Invariant(Expr),
    /// Procedure return; legal only inside a procedure body.
    Return(Expr),
    /// Statement-level procedure call `lhs := callee(args)`; `lhs` is
    /// omitted when the return value is discarded.
    Call {
        callee: String,
        args: Vec<Expr>,
        lhs: Option<String>,
    },
}

impl Stmt {
    /// Sequential composition of `stmts`.
    pub fn seq(stmts: Vec<Stmt>) -> Self {
        Stmt::Seq(stmts)
    }

    pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Stmt) -> Self {
        Stmt::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// `If` with an empty else branch.
    pub fn if_then(cond: Expr, then_branch: Stmt) -> Self {
        Self::if_else(cond, then_branch, Stmt::Skip)
    }

    pub fn assign(var: impl Into<String>, value: Expr) -> Self {
        Stmt::Assign {
            var: var.into(),
            value,
        }
    }

    pub fn store(array: impl Into<String>, index: Expr, value: Expr) -> Self {
        Stmt::ArrayStore {
            array: array.into(),
            index,
            value,
        }
    }

    pub fn assume(e: Expr) -> Self {
        Stmt::Assume(e)
    }

    pub fn assert(e: Expr) -> Self {
        Stmt::Assert(e)
    }

    pub fn while_loop(cond: Expr, body: Vec<Stmt>, invariants: Vec<Expr>) -> Self {
        Stmt::While {
            cond,
            body: Box::new(Stmt::Seq(body)),
            invariants,
        }
    }

    pub fn ret(e: Expr) -> Self {
        Stmt::Return(e)
    }

    /// `lhs := callee(args)`.
    pub fn call_assign(lhs: impl Into<String>, callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Stmt::Call {
            callee: callee.into(),
            args,
            lhs: Some(lhs.into()),
        }
    }

    /// `callee(args)` with the return value discarded.
    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Stmt::Call {
            callee: callee.into(),
            args,
            lhs: None,
        }
    }
}

impl fmt::Display for Stmt {
    /// One-line rendering, used when pinpointing a statement in diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Skip => write!(f, "skip"),
            Stmt::Seq(stmts) => write!(f, "{{ {} statements }}", stmts.len()),
            Stmt::If { cond, .. } => write!(f, "if {} ...", cond),
            Stmt::Assign { var, value } => write!(f, "{} := {}", var, value),
            Stmt::ArrayStore { array, index, value } => {
                write!(f, "{}[{}] := {}", array, index, value)
            }
            Stmt::Assume(e) => write!(f, "assume {}", e),
            Stmt::Assert(e) => write!(f, "assert {}", e),
            Stmt::While { cond, .. } => write!(f, "while {} ...", cond),
            Stmt::Invariant(e) => write!(f, "invariant {}", e),
            Stmt::Return(e) => write!(f, "return {}", e),
            Stmt::Call { callee, args, lhs } => {
                if let Some(lhs) = lhs {
                    write!(f, "{} := {}({} args)", lhs, callee, args.len())
                } else {
                    write!(f, "{}({} args)", callee, args.len())
                }
            }
        }
    }
}
