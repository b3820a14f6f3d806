//! Per-name sort inference.
//!
//! The surface language is untyped: a name is an integer or an array
//! depending on how it is used. Verification needs one stable sort per name,
//! so the sort is decided once per program from the set of use sites:
//!
//! - a name is [`Sort::Array`] exactly when it occurs as a `Select` base or
//!   an `ArrayStore` target;
//! - every other referenced name is [`Sort::Int`];
//! - a name used both ways is rejected here, before any VC exists.
//!
//! Names that are only ever *mentioned* (e.g. listed in `modifies` but never
//! touched) default to integer.

use crate::error::{IrError, IrResult};
use crate::expr::Expr;
use crate::program::{select_bases, Program, RET};
use crate::stmt::Stmt;
use std::collections::{BTreeMap, BTreeSet};

/// The SMT sort chosen for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// Integer.
    Int,
    /// Array from integers to integers.
    Array,
}

/// The per-name sort assignment for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortMap {
    sorts: BTreeMap<String, Sort>,
}

impl SortMap {
    /// The sort of `name`. Names outside the census are integers.
    pub fn sort_of(&self, name: &str) -> Sort {
        self.sorts.get(name).copied().unwrap_or(Sort::Int)
    }

    /// Whether `name` denotes an array.
    pub fn is_array(&self, name: &str) -> bool {
        self.sort_of(name) == Sort::Array
    }

    /// Names with array sort, in lexicographic order.
    pub fn array_names(&self) -> impl Iterator<Item = &str> {
        self.sorts
            .iter()
            .filter(|(_, s)| **s == Sort::Array)
            .map(|(n, _)| n.as_str())
    }
}

/// Infers the sort of every name in `program`, rejecting mixed uses.
pub fn infer(program: &Program) -> IrResult<SortMap> {
    let mut arrays = BTreeSet::new();
    let mut scalars = BTreeSet::new();

    array_and_scalar_uses(&program.main, &mut arrays, &mut scalars);
    for spec in program.procs.values() {
        scalars.extend(spec.params.iter().cloned());
        spec_uses(&spec.requires, &mut arrays, &mut scalars);
        spec_uses(&spec.ensures, &mut arrays, &mut scalars);
        array_and_scalar_uses(&spec.body, &mut arrays, &mut scalars);
    }
    // The return value is always an integer.
    scalars.insert(RET.to_string());

    if let Some(name) = arrays.intersection(&scalars).next() {
        return Err(IrError::MixedSorts { name: name.clone() });
    }

    let mut sorts = BTreeMap::new();
    for name in &program.vars {
        let sort = if arrays.contains(name) { Sort::Array } else { Sort::Int };
        sorts.insert(name.clone(), sort);
    }
    Ok(SortMap { sorts })
}

/// Scalar evidence: `Var` / `Old` occurrences outside a `Select` base.
/// Array evidence: `Select` bases. Both live in the same expression walk.
fn spec_uses(e: &Expr, arrays: &mut BTreeSet<String>, scalars: &mut BTreeSet<String>) {
    select_bases(e, arrays);
    scalar_uses(e, scalars);
}

fn scalar_uses(e: &Expr, out: &mut BTreeSet<String>) {
    match e {
        Expr::Var(n) | Expr::Old(n) => {
            out.insert(n.clone());
        }
        Expr::Select { index, .. } => scalar_uses(index, out),
        Expr::Binary { left, right, .. } => {
            scalar_uses(left, out);
            scalar_uses(right, out);
        }
        Expr::Neg(inner) | Expr::Not(inner) => scalar_uses(inner, out),
        Expr::Call { args, .. } => {
            for a in args {
                scalar_uses(a, out);
            }
        }
        Expr::Int(_) | Expr::Bool(_) => {}
    }
}

fn array_and_scalar_uses(s: &Stmt, arrays: &mut BTreeSet<String>, scalars: &mut BTreeSet<String>) {
    match s {
        Stmt::Skip => {}
        Stmt::Seq(stmts) => {
            for s in stmts {
                array_and_scalar_uses(s, arrays, scalars);
            }
        }
        Stmt::If { cond, then_branch, else_branch } => {
            spec_uses(cond, arrays, scalars);
            array_and_scalar_uses(then_branch, arrays, scalars);
            array_and_scalar_uses(else_branch, arrays, scalars);
        }
        Stmt::Assign { var, value } => {
            scalars.insert(var.clone());
            spec_uses(value, arrays, scalars);
        }
        Stmt::ArrayStore { array, index, value } => {
            arrays.insert(array.clone());
            spec_uses(index, arrays, scalars);
            spec_uses(value, arrays, scalars);
        }
        Stmt::Assume(e) | Stmt::Assert(e) | Stmt::Invariant(e) | Stmt::Return(e) => {
            spec_uses(e, arrays, scalars)
        }
        Stmt::While { cond, body, invariants } => {
            spec_uses(cond, arrays, scalars);
            array_and_scalar_uses(body, arrays, scalars);
            for inv in invariants {
                spec_uses(inv, arrays, scalars);
            }
        }
        Stmt::Call { args, lhs, .. } => {
            for a in args {
                spec_uses(a, arrays, scalars);
            }
            if let Some(lhs) = lhs {
                scalars.insert(lhs.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use crate::program::ProcSpec;

    #[test]
    fn select_and_store_imply_array() {
        let program = Program::from_main(vec![
            Stmt::store("a", Expr::int(0), Expr::var("x")),
            Stmt::assert(Expr::eq(Expr::select("a", Expr::int(0)), Expr::var("x"))),
        ]);
        let sorts = infer(&program).unwrap();
        assert_eq!(sorts.sort_of("a"), Sort::Array);
        assert_eq!(sorts.sort_of("x"), Sort::Int);
    }

    #[test]
    fn old_array_base_counts_as_array_use() {
        let mut procs = IndexMap::new();
        procs.insert(
            "p".to_string(),
            ProcSpec::new(vec![], vec![Stmt::ret(Expr::int(0))]).ensures(Expr::eq(
                Expr::select("a", Expr::int(0)),
                Expr::old_select("a", Expr::int(0)),
            )),
        );
        let program = Program::new(procs, Stmt::Seq(vec![]));
        assert!(infer(&program).unwrap().is_array("a"));
    }

    #[test]
    fn mixed_use_is_rejected() {
        let program = Program::from_main(vec![
            Stmt::store("a", Expr::int(0), Expr::int(1)),
            Stmt::assign("a", Expr::int(2)),
        ]);
        assert!(matches!(
            infer(&program),
            Err(IrError::MixedSorts { name }) if name == "a"
        ));
    }

    #[test]
    fn unused_modifies_name_defaults_to_int() {
        let mut procs = IndexMap::new();
        procs.insert(
            "p".to_string(),
            ProcSpec::new(vec![], vec![Stmt::ret(Expr::int(0))]).modifies(&["g"]),
        );
        let program = Program::new(procs, Stmt::Seq(vec![]));
        let sorts = infer(&program).unwrap();
        assert_eq!(sorts.sort_of("g"), Sort::Int);
        assert_eq!(sorts.array_names().count(), 0);
    }
}
