//! Procedure contracts and whole programs.
//!
//! A [`Program`] is the complete unit of verification: a mapping from
//! procedure names to their specs, the census of every variable name the
//! program references, and the top-level statement sequence.

use crate::error::{IrError, IrResult};
use crate::expr::Expr;
use crate::stmt::Stmt;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// The reserved name for a procedure's return value inside its spec.
pub const RET: &str = "ret";

/// A procedure together with its contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcSpec {
    /// Ordered parameter names. Parameters are integers and shadow
    /// like-named outer variables within the body.
    pub params: Vec<String>,
    /// Precondition; may use `old(..)` and spec-level calls.
    pub requires: Expr,
    /// Postcondition; may additionally use the reserved name `ret`.
    pub ensures: Expr,
    /// Globally-visible names the procedure may alter.
    pub modifies: BTreeSet<String>,
    /// The body.
    pub body: Stmt,
}

impl ProcSpec {
    /// A spec with trivial contracts, to be refined by the builder methods.
    pub fn new(params: Vec<&str>, body: Vec<Stmt>) -> Self {
        Self {
            params: params.into_iter().map(String::from).collect(),
            requires: Expr::Bool(true),
            ensures: Expr::Bool(true),
            modifies: BTreeSet::new(),
            body: Stmt::Seq(body),
        }
    }

    pub fn requires(mut self, e: Expr) -> Self {
        self.requires = e;
        self
    }

    pub fn ensures(mut self, e: Expr) -> Self {
        self.ensures = e;
        self
    }

    pub fn modifies(mut self, names: &[&str]) -> Self {
        self.modifies = names.iter().map(|n| n.to_string()).collect();
        self
    }
}

/// A complete program: procedures plus the top-level statement sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Procedures by name. Iteration order is insertion order, and
    /// procedures are verified and reported in exactly this order.
    pub procs: IndexMap<String, ProcSpec>,
    /// Every variable name the program references anywhere: bodies, specs,
    /// parameters, and `modifies` sets. Includes `ret` once any procedure
    /// exists, since the call rule treats the return value as state.
    pub vars: BTreeSet<String>,
    /// Top-level statements. A `Return` here is ill-formed.
    pub main: Stmt,
}

impl Program {
    /// Builds a program and computes its variable census.
    pub fn new(procs: IndexMap<String, ProcSpec>, main: Stmt) -> Self {
        let mut vars = BTreeSet::new();
        stmt_names(&main, &mut vars);
        for spec in procs.values() {
            vars.extend(spec.params.iter().cloned());
            vars.extend(spec.modifies.iter().cloned());
            expr_names(&spec.requires, &mut vars);
            expr_names(&spec.ensures, &mut vars);
            stmt_names(&spec.body, &mut vars);
        }
        if !procs.is_empty() {
            vars.insert(RET.to_string());
        }
        Self { procs, vars, main }
    }

    /// A program with no procedures.
    pub fn from_main(stmts: Vec<Stmt>) -> Self {
        Self::new(IndexMap::new(), Stmt::Seq(stmts))
    }

    /// Rejects user names that fall in the verifier's reserved namespace.
    ///
    /// Reserved: the suffixes `_old`, `_pre_call`, and `_<digits>`, and the
    /// prefix `i_frame_`. The name `ret` is exempt because the census
    /// itself introduces it.
    pub fn check_reserved_names(&self) -> IrResult {
        for name in &self.vars {
            if name == RET {
                continue;
            }
            if is_reserved(name) {
                return Err(IrError::ReservedName { name: name.clone() });
            }
        }
        Ok(())
    }
}

/// Whether `name` collides with verifier-internal symbol schemes.
pub fn is_reserved(name: &str) -> bool {
    if name.ends_with("_old") || name.ends_with("_pre_call") || name.starts_with("i_frame_") {
        return true;
    }
    // `_<digits>` suffix, the havoc scheme.
    match name.rsplit_once('_') {
        Some((_, digits)) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn expr_names(e: &Expr, out: &mut BTreeSet<String>) {
    match e {
        Expr::Var(n) | Expr::Old(n) => {
            out.insert(n.clone());
        }
        Expr::Select { base, index } => {
            out.insert(base.name().to_string());
            expr_names(index, out);
        }
        Expr::Binary { left, right, .. } => {
            expr_names(left, out);
            expr_names(right, out);
        }
        Expr::Neg(inner) | Expr::Not(inner) => expr_names(inner, out),
        Expr::Call { args, .. } => {
            for a in args {
                expr_names(a, out);
            }
        }
        Expr::Int(_) | Expr::Bool(_) => {}
    }
}

fn stmt_names(s: &Stmt, out: &mut BTreeSet<String>) {
    match s {
        Stmt::Skip => {}
        Stmt::Seq(stmts) => {
            for s in stmts {
                stmt_names(s, out);
            }
        }
        Stmt::If { cond, then_branch, else_branch } => {
            expr_names(cond, out);
            stmt_names(then_branch, out);
            stmt_names(else_branch, out);
        }
        Stmt::Assign { var, value } => {
            out.insert(var.clone());
            expr_names(value, out);
        }
        Stmt::ArrayStore { array, index, value } => {
            out.insert(array.clone());
            expr_names(index, out);
            expr_names(value, out);
        }
        Stmt::Assume(e) | Stmt::Assert(e) | Stmt::Invariant(e) | Stmt::Return(e) => {
            expr_names(e, out)
        }
        Stmt::While { cond, body, invariants } => {
            expr_names(cond, out);
            stmt_names(body, out);
            for inv in invariants {
                expr_names(inv, out);
            }
        }
        Stmt::Call { args, lhs, .. } => {
            for a in args {
                expr_names(a, out);
            }
            if let Some(lhs) = lhs {
                out.insert(lhs.clone());
            }
        }
    }
}

// Shared with the sort-inference walker, which needs the same traversal
// with a different classification.
pub(crate) fn select_bases(e: &Expr, out: &mut BTreeSet<String>) {
    match e {
        Expr::Select { base, index } => {
            out.insert(base.name().to_string());
            select_bases(index, out);
        }
        Expr::Binary { left, right, .. } => {
            select_bases(left, out);
            select_bases(right, out);
        }
        Expr::Neg(inner) | Expr::Not(inner) => select_bases(inner, out),
        Expr::Call { args, .. } => {
            for a in args {
                select_bases(a, out);
            }
        }
        Expr::Int(_) | Expr::Bool(_) | Expr::Var(_) | Expr::Old(_) => {}
    }
}
