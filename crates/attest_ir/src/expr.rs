//! Specification and program expressions.
//!
//! Expressions appear in two roles: ordinary program expressions (right-hand
//! sides, branch and loop conditions, array indices) and specification
//! expressions (`requires`, `ensures`, loop invariants). The specification
//! sublanguage additionally allows [`Expr::Old`], the reserved name `ret`,
//! and [`Expr::Call`] - a *pure* application of a procedure's contract,
//! encoded downstream as an uninterpreted function.
//!
//! Build expressions with the constructor helpers:
//!
//! ```
//! use attest_ir::Expr;
//!
//! // ret == old(x) + 1
//! let post = Expr::eq(
//!     Expr::var("ret"),
//!     Expr::add(Expr::old("x"), Expr::int(1)),
//! );
//! assert_eq!(post.to_string(), "(ret == (old(x) + 1))");
//! ```

use std::collections::BTreeSet;
use std::fmt;

/// Binary operations.
///
/// Grouped by category:
/// - **Arithmetic**: `Add`, `Sub`, `Mul`, `Div` (integer, solver division semantics)
/// - **Relational**: `Lt`, `Le`, `Gt`, `Ge`, `Eq`, `Ne`
/// - **Boolean**: `And`, `Or`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    /// The surface rendering of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

/// The base of an array read: the current array or its `old` snapshot.
///
/// Restricting `Select` bases to plain names keeps the memory model flat;
/// there are no nested or computed array references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayRef {
    /// The array's current state, `a[i]`.
    Cur(String),
    /// The array's snapshot state, `old(a)[i]`.
    Old(String),
}

impl ArrayRef {
    /// The underlying array name, regardless of state.
    pub fn name(&self) -> &str {
        match self {
            ArrayRef::Cur(n) | ArrayRef::Old(n) => n,
        }
    }
}

/// Expression AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
    /// Current-state variable reference.
    Var(String),
    /// A variable's value in a designated earlier state (procedure entry
    /// or pre-call, depending on where the enclosing spec is interpreted).
    Old(String),
    /// Array read, `a[i]` or `old(a)[i]`.
    Select {
        base: ArrayRef,
        index: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Arithmetic negation.
    Neg(Box<Expr>),
    /// Logical negation.
    Not(Box<Expr>),
    /// Pure application of procedure `name`'s contract inside a
    /// specification, e.g. `sum(n - 1)` in an `ensures` clause.
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Integer literal.
    pub fn int(n: i64) -> Self {
        Expr::Int(n)
    }

    /// Boolean literal.
    pub fn bool(b: bool) -> Self {
        Expr::Bool(b)
    }

    /// Current-state variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// `old(name)` - the variable's value in the designated earlier state.
    pub fn old(name: impl Into<String>) -> Self {
        Expr::Old(name.into())
    }

    /// Array read `base[index]` on the current state.
    pub fn select(base: impl Into<String>, index: Expr) -> Self {
        Expr::Select {
            base: ArrayRef::Cur(base.into()),
            index: Box::new(index),
        }
    }

    /// Array read `old(base)[index]` on the snapshot state.
    pub fn old_select(base: impl Into<String>, index: Expr) -> Self {
        Expr::Select {
            base: ArrayRef::Old(base.into()),
            index: Box::new(index),
        }
    }

    /// Binary operation.
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Spec-level contract application, `name(args)`.
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Arithmetic negation `-e`.
    pub fn neg(e: Expr) -> Self {
        Expr::Neg(Box::new(e))
    }

    /// Logical negation `not e`.
    pub fn not(e: Expr) -> Self {
        Expr::Not(Box::new(e))
    }

    pub fn add(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Add, l, r)
    }

    pub fn sub(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Sub, l, r)
    }

    pub fn mul(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Mul, l, r)
    }

    pub fn div(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Div, l, r)
    }

    pub fn lt(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Lt, l, r)
    }

    pub fn le(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Le, l, r)
    }

    pub fn gt(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Gt, l, r)
    }

    pub fn ge(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Ge, l, r)
    }

    pub fn eq(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Eq, l, r)
    }

    pub fn ne(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Ne, l, r)
    }

    pub fn and(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::And, l, r)
    }

    pub fn or(l: Expr, r: Expr) -> Self {
        Self::binary(BinOp::Or, l, r)
    }

    /// All variable names referenced inside `old(..)` in this expression,
    /// whether as scalars (`old(v)`) or array bases (`old(a)[i]`).
    ///
    /// The procedure verifier snapshots exactly these names at entry.
    pub fn old_names(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_old_names(&mut out);
        out
    }

    fn collect_old_names(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Old(name) => {
                out.insert(name.clone());
            }
            Expr::Select { base, index } => {
                if let ArrayRef::Old(name) = base {
                    out.insert(name.clone());
                }
                index.collect_old_names(out);
            }
            Expr::Binary { left, right, .. } => {
                left.collect_old_names(out);
                right.collect_old_names(out);
            }
            Expr::Neg(e) | Expr::Not(e) => e.collect_old_names(out),
            Expr::Call { args, .. } => {
                for a in args {
                    a.collect_old_names(out);
                }
            }
            Expr::Int(_) | Expr::Bool(_) | Expr::Var(_) => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Old(name) => write!(f, "old({})", name),
            Expr::Select { base, index } => match base {
                ArrayRef::Cur(name) => write!(f, "{}[{}]", name, index),
                ArrayRef::Old(name) => write!(f, "old({})[{}]", name, index),
            },
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Neg(e) => write!(f, "-{}", e),
            Expr::Not(e) => write!(f, "not {}", e),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}
