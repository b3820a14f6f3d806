//! Shared state for one verification session.
//!
//! Everything the generator needs across VCs lives in a [`VcgContext`] that
//! is threaded explicitly: the Z3 context, the program under verification,
//! the per-name sort assignment, the cache of uninterpreted functions
//! backing spec-level calls, and the fresh-symbol counter. Nothing is
//! global, so independent programs verify from independent contexts.
//!
//! Two invariants matter for soundness:
//!
//! - The function cache is monotone and shared by every VC of the session,
//!   so a contract axiom asserted for `f` binds the same `FuncDecl` that
//!   every occurrence of `f(..)` translated to.
//! - The fresh-id counter never repeats, so havoc symbols from different
//!   call sites can never capture one another.

use crate::error::{VcgenError, VcgenResult};
use attest_ir::{sorts, Program, SortMap};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use z3::ast::{Array, Ast, Dynamic, Int};
use z3::{Context, FuncDecl, Sort};

/// Session-wide verification state.
pub struct VcgContext<'ctx> {
    ctx: &'ctx Context,
    program: &'ctx Program,
    sorts: SortMap,
    /// Uninterpreted functions backing spec-level procedure calls.
    spec_fns: RefCell<HashMap<String, FuncDecl<'ctx>>>,
    /// Monotone counter behind havoc and frame-index symbols.
    fresh: Cell<u64>,
}

impl<'ctx> VcgContext<'ctx> {
    /// Validates `program` (reserved names, per-name sorts) and builds the
    /// session context.
    pub fn new(ctx: &'ctx Context, program: &'ctx Program) -> VcgenResult<Self> {
        program.check_reserved_names()?;
        let sorts = sorts::infer(program)?;
        Ok(Self {
            ctx,
            program,
            sorts,
            spec_fns: RefCell::new(HashMap::new()),
            fresh: Cell::new(0),
        })
    }

    /// The underlying Z3 context.
    pub fn z3(&self) -> &'ctx Context {
        self.ctx
    }

    pub fn program(&self) -> &'ctx Program {
        self.program
    }

    pub fn sorts(&self) -> &SortMap {
        &self.sorts
    }

    /// The next globally-unique id for generated symbols.
    pub fn fresh_id(&self) -> u64 {
        let id = self.fresh.get() + 1;
        self.fresh.set(id);
        id
    }

    /// The integer symbol `name`.
    pub fn int_symbol(&self, name: &str) -> Int<'ctx> {
        Int::new_const(self.ctx, name)
    }

    /// The `Int -> Int` array symbol `name`.
    pub fn array_symbol(&self, name: &str) -> Array<'ctx> {
        let int = Sort::int(self.ctx);
        Array::new_const(self.ctx, name, &int, &int)
    }

    /// The symbol `name` at its inferred sort.
    pub fn symbol(&self, name: &str) -> Dynamic<'ctx> {
        if self.sorts.is_array(name) {
            Dynamic::from_ast(&self.array_symbol(name))
        } else {
            Dynamic::from_ast(&self.int_symbol(name))
        }
    }

    /// The snapshot/havoc variant `name<suffix>` at `name`'s inferred sort.
    pub fn suffixed_symbol(&self, name: &str, suffix: &str) -> Dynamic<'ctx> {
        let full = format!("{}{}", name, suffix);
        if self.sorts.is_array(name) {
            Dynamic::from_ast(&self.array_symbol(&full))
        } else {
            Dynamic::from_ast(&self.int_symbol(&full))
        }
    }

    /// Applies the uninterpreted function for spec-level calls to `name`,
    /// introducing it on first use. Every occurrence of `name(..)` in any
    /// VC of this session resolves to the same declaration.
    pub fn apply_spec_fn(&self, name: &str, args: &[Dynamic<'ctx>]) -> VcgenResult<Dynamic<'ctx>> {
        let spec = self.program.procs.get(name).ok_or_else(|| {
            VcgenError::ill_formed(format!("specification calls undefined procedure '{}'", name))
        })?;
        if spec.params.len() != args.len() {
            return Err(VcgenError::ill_formed(format!(
                "specification call '{}' passes {} arguments, procedure takes {}",
                name,
                args.len(),
                spec.params.len()
            )));
        }

        let mut fns = self.spec_fns.borrow_mut();
        let decl = fns.entry(name.to_string()).or_insert_with(|| {
            let int = Sort::int(self.ctx);
            let domain: Vec<&Sort> = spec.params.iter().map(|_| &int).collect();
            FuncDecl::new(self.ctx, name, &domain, &int)
        });
        let arg_refs: Vec<&dyn Ast> = args.iter().map(|a| a as &dyn Ast).collect();
        Ok(decl.apply(&arg_refs))
    }

    /// Whether `name` has been used as a spec-level function so far.
    pub fn has_spec_fn(&self, name: &str) -> bool {
        self.spec_fns.borrow().contains_key(name)
    }

    /// Names with cached spec functions, sorted for deterministic axiom
    /// assertion order.
    pub fn cached_spec_fns(&self) -> Vec<String> {
        let mut names: Vec<String> = self.spec_fns.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}
