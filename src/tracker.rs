//! Variable dependency tracking.
//!
//! Runs the evaluator in its pessimistic configuration — every function name
//! resolves to a stub returning an unknown, and short-circuiting is disabled
//! — against a fresh, empty scope. Whatever the subtree could not compute
//! surfaces as an [`crate::value::Unknown`], whose references are the free
//! variables the subtree transitively depends on.

use std::collections::BTreeSet;

use crate::ast::{Block, Expr};
use crate::diagnostics::Result;
use crate::eval::Evaluator;
use crate::scope::Scope;
use crate::value::{Value, ValueKind};

/// The fully static variable paths an expression depends on. An expression
/// with no free variables yields the empty set.
pub fn expr_variable_references(expr: &Expr) -> Result<BTreeSet<Vec<String>>> {
    let mut scope = Scope::new();
    let value = Evaluator::tracking().eval(expr, &mut scope)?;
    Ok(harvest(value))
}

/// The fully static variable paths a block's body depends on.
pub fn block_variable_references(block: &Block) -> Result<BTreeSet<Vec<String>>> {
    let mut scope = Scope::new();
    let value = Evaluator::tracking().eval_block(block, &mut scope)?;
    Ok(harvest(value))
}

/// Resolves the tracked value and collects the static paths of its
/// references. Dynamic components (integer indexes, computed keys) make a
/// path non-static and drop it from the result.
fn harvest(value: Value) -> BTreeSet<Vec<String>> {
    match value.resolve().into_kind() {
        ValueKind::Unknown(unknown) => unknown
            .references()
            .iter()
            .filter_map(|reference| reference.static_path())
            .collect(),
        _ => BTreeSet::new(),
    }
}
