//! The expression evaluator.
//!
//! [`Evaluator::eval`] walks an AST against a [`Scope`] and produces a
//! [`Value`]. Identifiers missing from the scope do not fail evaluation:
//! they produce [`crate::value::Unknown`] values that flow through every
//! operator, accumulating the variable references the result depends on.
//! Only genuinely malformed operations (bad operand types, out-of-bounds
//! indexes, conflicting block keys, …) abort with a [`Diagnostic`].
//!
//! The evaluator owns two pieces of configuration: the intrinsic function
//! table and the `short_circuit` flag. Dependency tracking (see
//! [`crate::tracker`]) runs with a universal function stub and
//! short-circuiting disabled so that every reachable subexpression is
//! visited.

use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{
    Attribute, AttrSplat, BinaryExpr, Block, Conditional, Expr, ForObjectExpr, ForTupleExpr,
    FunctionCall, GetAttrKey, IndexSplat, Module, ObjectExpr, SplatKey, Stmt, UnaryExpr,
};
use crate::diagnostics::{Diagnostic, Result};
use crate::ops::{self, OpError};
use crate::scope::Scope;
use crate::span::Span;
use crate::value::{ObjectMap, Unknown, Value, ValueKind};

/// Failure signal raised by a host-provided intrinsic function. Turned into
/// a `hcl2::function_call::invalid_args` diagnostic at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("{0}")]
    Message(String),
}

/// A host-provided intrinsic. Receives fully evaluated, concrete arguments;
/// the evaluator never invokes an intrinsic with an unknown argument.
pub type IntrinsicFn = fn(&[Value]) -> std::result::Result<Value, FunctionError>;

/// Registry of intrinsic functions available to `FunctionCall` expressions.
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, IntrinsicFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, func: IntrinsicFn) {
        self.functions.insert(name.into(), func);
    }

    pub fn get(&self, name: &str) -> Option<IntrinsicFn> {
        self.functions.get(name).copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }
}

/// How function calls resolve: against a host registry, or against the
/// tracker's universal stub where every name exists and returns an unknown.
#[derive(Debug, Clone)]
enum FunctionTable {
    Host(FunctionRegistry),
    Stub,
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    functions: FunctionTable,
    short_circuit: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator with no intrinsic functions.
    pub fn new() -> Self {
        Self {
            functions: FunctionTable::Host(FunctionRegistry::new()),
            short_circuit: true,
        }
    }

    /// An evaluator dispatching function calls against `registry`.
    pub fn with_functions(registry: FunctionRegistry) -> Self {
        Self {
            functions: FunctionTable::Host(registry),
            short_circuit: true,
        }
    }

    /// The dependency-tracking configuration: every function name resolves
    /// to a stub returning an unknown over its arguments' references, and
    /// short-circuiting is disabled so every operand is visited.
    pub fn tracking() -> Self {
        Self {
            functions: FunctionTable::Stub,
            short_circuit: false,
        }
    }

    /// Controls whether a concrete `Bool` condition skips the untaken
    /// branch of a conditional. Must be off for dependency tracking.
    pub fn short_circuit(mut self, enabled: bool) -> Self {
        self.short_circuit = enabled;
        self
    }

    /// Evaluates an expression. The produced value carries the expression's
    /// span unless a more specific one was already attached.
    pub fn eval(&self, expr: &Expr, scope: &mut Scope) -> Result<Value> {
        let value = self.eval_expr(expr, scope)?;
        Ok(value.with_span_if_missing(expr.span()))
    }

    /// Evaluates a statement: an attribute binds and returns its value, a
    /// block evaluates to its merged object.
    pub fn eval_stmt(&self, stmt: &Stmt, scope: &mut Scope) -> Result<Value> {
        let value = match stmt {
            Stmt::Attribute(attr) => self.eval_attribute(attr, scope)?,
            Stmt::Block(block) => self.eval_block(block, scope)?,
        };
        Ok(value.with_span_if_missing(stmt.span()))
    }

    /// Evaluates a module as the implicit outermost block over its body.
    pub fn eval_module(&self, module: &Module, scope: &mut Scope) -> Result<Value> {
        let object = self.eval_body(&module.body, scope)?;
        Ok(Value::object(object).with_span_if_missing(module.span))
    }

    fn eval_expr(&self, expr: &Expr, scope: &mut Scope) -> Result<Value> {
        match expr {
            Expr::Literal(node) => Ok(node.value.clone()),
            Expr::Identifier(node) => Ok(scope.get(&node.name).cloned().unwrap_or_else(|| {
                Value::unknown(Unknown::from_identifier(node)).with_span(node.span)
            })),
            Expr::Array(node) => {
                let items = node
                    .values
                    .iter()
                    .map(|item| self.eval(item, scope))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::array(items))
            }
            Expr::Object(node) => self.eval_object(node, scope),
            Expr::Parenthesis(node) => self.eval(&node.expr, scope),
            Expr::Unary(node) => self.eval_unary(node, scope),
            Expr::Binary(node) => self.eval_binary(node, scope),
            Expr::Conditional(node) => self.eval_conditional(node, scope),
            Expr::GetAttr(node) => {
                let on = self.eval(&node.on, scope)?;
                self.get_attr(on, &node.key, node.span)
            }
            Expr::GetIndex(node) => {
                let on = self.eval(&node.on, scope)?;
                let key = self.eval(&node.key.expr, scope)?;
                self.get_index(on, key, node.span, node.key.span)
            }
            Expr::AttrSplat(node) => self.eval_attr_splat(node, scope),
            Expr::IndexSplat(node) => self.eval_index_splat(node, scope),
            Expr::FunctionCall(node) => self.eval_function_call(node, scope),
            Expr::ForTuple(node) => self.eval_for_tuple(node, scope),
            Expr::ForObject(node) => self.eval_for_object(node, scope),
        }
    }

    // -----------------------------------------------------------------------
    // Operators
    // -----------------------------------------------------------------------

    fn eval_unary(&self, node: &UnaryExpr, scope: &mut Scope) -> Result<Value> {
        let operand = self.eval(&node.expr, scope)?;
        if operand.is_unknown() {
            return Ok(Value::unknown(Unknown::indirect([&operand])));
        }

        let op = node.op.value;
        let func = ops::unary_fn(op).ok_or_else(|| {
            Diagnostic::error(
                "hcl2::unary_expression::unsupported_operator",
                format!("unary operator `{}` is not defined", op.symbol()),
            )
            .with_label(node.op.span, "unsupported operator")
        })?;

        func(&operand).map_err(|err| match err {
            OpError::Unsupported => Diagnostic::error(
                "hcl2::unary_expression::unsupported_operator",
                format!(
                    "unary operator `{}` is not supported for {}",
                    op.symbol(),
                    operand.type_name()
                ),
            )
            .with_label(node.op.span, "unsupported operator")
            .with_label(node.expr.span(), operand.type_name()),
            OpError::DivisionByZero | OpError::Overflow => Diagnostic::error(
                "hcl2::unary_expression::arithmetic_error",
                err.to_string(),
            )
            .with_label(node.span, "arithmetic error"),
        })
    }

    fn eval_binary(&self, node: &BinaryExpr, scope: &mut Scope) -> Result<Value> {
        // Both operands are always evaluated, even when the left side alone
        // would determine the result. The dependency tracker relies on this
        // to observe every reference.
        let left = self.eval(&node.left, scope)?;
        let right = self.eval(&node.right, scope)?;

        if left.is_unknown() || right.is_unknown() {
            return Ok(Value::unknown(Unknown::indirect([&left, &right])));
        }

        let op = node.op.value;
        let func = ops::binary_fn(op).ok_or_else(|| {
            Diagnostic::error(
                "hcl2::binary_expression::unsupported_operator",
                format!("binary operator `{}` is not defined", op.symbol()),
            )
            .with_label(node.op.span, "unsupported operator")
        })?;

        func(&left, &right).map_err(|err| match err {
            OpError::Unsupported => Diagnostic::error(
                "hcl2::binary_expression::unsupported_operator",
                format!(
                    "operator `{}` is not supported between {} and {}",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                ),
            )
            .with_label(node.op.span, "unsupported operator")
            .with_label(node.left.span(), left.type_name())
            .with_label(node.right.span(), right.type_name()),
            OpError::DivisionByZero | OpError::Overflow => Diagnostic::error(
                "hcl2::binary_expression::arithmetic_error",
                err.to_string(),
            )
            .with_label(node.right.span(), "arithmetic error"),
        })
    }

    fn eval_conditional(&self, node: &Conditional, scope: &mut Scope) -> Result<Value> {
        let cond = self.eval(&node.cond, scope)?;
        match cond.kind() {
            ValueKind::Bool(flag) => {
                if self.short_circuit {
                    if *flag {
                        self.eval(&node.then_expr, scope)
                    } else {
                        self.eval(&node.else_expr, scope)
                    }
                } else {
                    let then_value = self.eval(&node.then_expr, scope)?;
                    let else_value = self.eval(&node.else_expr, scope)?;
                    Ok(if *flag { then_value } else { else_value })
                }
            }
            ValueKind::Unknown(_) => {
                let then_value = self.eval(&node.then_expr, scope)?;
                let else_value = self.eval(&node.else_expr, scope)?;
                Ok(Value::unknown(Unknown::indirect([
                    &cond,
                    &then_value,
                    &else_value,
                ])))
            }
            _ => Err(Diagnostic::error(
                "hcl2::conditional::unsupported_condition",
                format!("condition must be a bool, got {}", cond.type_name()),
            )
            .with_label(node.cond.span(), cond.type_name())),
        }
    }

    // -----------------------------------------------------------------------
    // Containers
    // -----------------------------------------------------------------------

    fn eval_object(&self, node: &ObjectExpr, scope: &mut Scope) -> Result<Value> {
        enum FieldKey {
            Name(String),
            Blocked(Value),
        }

        let mut result = ObjectMap::new();
        let mut blockers: Vec<Value> = Vec::new();

        for (key_expr, value_expr) in &node.fields {
            let key = match key_expr {
                Expr::Identifier(ident) => FieldKey::Name(ident.name.clone()),
                Expr::Literal(literal) if literal.value.as_str().is_some() => {
                    FieldKey::Name(literal.value.as_str().unwrap_or_default().to_owned())
                }
                Expr::Parenthesis(_) => {
                    let key_value = self.eval(key_expr, scope)?;
                    match key_value.kind() {
                        ValueKind::String(name) => FieldKey::Name(name.clone()),
                        ValueKind::Unknown(_) => FieldKey::Blocked(key_value),
                        _ => {
                            return Err(Diagnostic::error(
                                "hcl2::object::unsupported_key",
                                format!(
                                    "object key must be a string, got {}",
                                    key_value.type_name()
                                ),
                            )
                            .with_label(key_expr.span(), key_value.type_name()));
                        }
                    }
                }
                _ => {
                    return Err(Diagnostic::error(
                        "hcl2::object::unsupported_key",
                        format!("{} cannot be used as an object key", key_expr.type_name()),
                    )
                    .with_label(key_expr.span(), "unsupported key")
                    .with_help(format!("Did you mean `({key_expr}) = ...`?")));
                }
            };

            // The value is evaluated even under a blocked key so its
            // errors surface, but only the key's references reach the
            // blocked result; the value's are dropped with it.
            let value = self.eval(value_expr, scope)?;
            match key {
                FieldKey::Name(name) => {
                    result.insert(name, value);
                }
                FieldKey::Blocked(unknown_key) => blockers.push(unknown_key),
            }
        }

        if blockers.is_empty() {
            Ok(Value::object(result))
        } else {
            Ok(Value::unknown(Unknown::indirect(blockers.iter())))
        }
    }

    // -----------------------------------------------------------------------
    // Path operations
    // -----------------------------------------------------------------------

    fn get_attr(&self, on: Value, key: &GetAttrKey, span: Span) -> Result<Value> {
        let name = &key.ident.name;
        match on.kind() {
            ValueKind::Object(items) => items.get(name).cloned().ok_or_else(|| {
                Diagnostic::error(
                    "hcl2::get_index::missing_key",
                    format!("key `{name}` not found in object"),
                )
                .with_label(key.ident.span, "unknown key")
            }),
            // Attribute syntax doubles as positional access: `[1,2,3].1`.
            ValueKind::Array(items) => match name.parse::<i64>() {
                Ok(index) => index_array(items, index, key.ident.span),
                Err(_) => Err(unsupported_attr_access(&on, span)),
            },
            ValueKind::Unknown(unknown) => {
                Ok(Value::unknown(unknown.extend_direct(span, name)))
            }
            _ => Err(unsupported_attr_access(&on, span)),
        }
    }

    fn get_index(&self, on: Value, key: Value, span: Span, key_span: Span) -> Result<Value> {
        match on.kind() {
            ValueKind::Unknown(unknown) => match key.kind() {
                ValueKind::String(raw) => Ok(Value::unknown(unknown.extend_direct(span, raw))),
                // Arrays are positional; the reference path language has no
                // integer component, so anything but a string key only
                // carries the references forward indirectly.
                _ => Ok(Value::unknown(Unknown::indirect([&on, &key]))),
            },
            ValueKind::Array(items) => match key.kind() {
                ValueKind::Int(index) => index_array(items, *index, key_span),
                ValueKind::Unknown(_) => Ok(Value::unknown(Unknown::indirect([&key]))),
                _ => Err(Diagnostic::error(
                    "hcl2::get_index::unsupported_type",
                    format!("cannot index array with {}", key.type_name()),
                )
                .with_label(key_span, key.type_name())),
            },
            ValueKind::Object(items) => match key.kind() {
                ValueKind::String(raw) => items.get(raw).cloned().ok_or_else(|| {
                    Diagnostic::error(
                        "hcl2::get_index::missing_key",
                        format!("key `{raw}` not found in object"),
                    )
                    .with_label(key_span, "unknown key")
                }),
                ValueKind::Unknown(_) => Ok(Value::unknown(Unknown::indirect([&key]))),
                _ => Err(Diagnostic::error(
                    "hcl2::get_index::unsupported_type",
                    format!("cannot index object with {}", key.type_name()),
                )
                .with_label(key_span, key.type_name())),
            },
            _ => Err(Diagnostic::error(
                "hcl2::get_index::unsupported_type",
                format!("cannot index into {}", on.type_name()),
            )
            .with_label(span, on.type_name())),
        }
    }

    fn eval_attr_splat(&self, node: &AttrSplat, scope: &mut Scope) -> Result<Value> {
        let on = self.eval(&node.on, scope)?;
        let was_unknown = on.is_unknown();
        let items = splat_items(on);

        let mut values = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let mut value = item;
            let mut span = node.on.span();
            for key in &node.keys {
                span = Span::enclose(span, key.span);
                value = self.get_attr(value, key, span).map_err(|diag| {
                    diag.with_context(format!("while evaluating element {i}"))
                        .with_context("while evaluating attribute splat expression")
                })?;
            }
            values.push(value);
        }

        if was_unknown {
            return Ok(Value::unknown(Unknown::indirect(values.iter())));
        }
        Ok(Value::array(values))
    }

    fn eval_index_splat(&self, node: &IndexSplat, scope: &mut Scope) -> Result<Value> {
        let on = self.eval(&node.on, scope)?;
        let was_unknown = on.is_unknown();
        let items = splat_items(on);

        let mut values = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let mut value = item;
            let mut span = node.on.span();
            for key in &node.keys {
                span = Span::enclose(span, key.span());
                let step = match key {
                    SplatKey::Attr(key) => self.get_attr(value, key, span),
                    SplatKey::Index(key) => {
                        let key_value = self.eval(&key.expr, scope)?;
                        self.get_index(value, key_value, span, key.span)
                    }
                };
                value = step.map_err(|diag| {
                    diag.with_context(format!("while evaluating element {i}"))
                        .with_context("while evaluating index splat expression")
                })?;
            }
            values.push(value);
        }

        if was_unknown {
            return Ok(Value::unknown(Unknown::indirect(values.iter())));
        }
        Ok(Value::array(values))
    }

    // -----------------------------------------------------------------------
    // Function calls
    // -----------------------------------------------------------------------

    fn eval_function_call(&self, node: &FunctionCall, scope: &mut Scope) -> Result<Value> {
        let name = &node.ident.name;
        if node.var_args {
            return Err(Diagnostic::error(
                "hcl2::function_call::unsupported_var_args",
                format!("variadic arguments to `{name}` are not supported"),
            )
            .with_label(node.args_span(), "variadic arguments here"));
        }

        let func = match &self.functions {
            FunctionTable::Stub => None,
            FunctionTable::Host(registry) => Some(registry.get(name).ok_or_else(|| {
                Diagnostic::error(
                    "hcl2::function_call::unsupported_function",
                    format!("function `{name}` is not defined"),
                )
                .with_label(node.ident.span, "unknown function")
            })?),
        };

        let args = node
            .args
            .iter()
            .map(|arg| self.eval(arg, scope))
            .collect::<Result<Vec<_>>>()?;

        // A call over unknown arguments is itself unknown; the intrinsic is
        // not invoked. The stub table always takes this path.
        let Some(func) = func else {
            return Ok(Value::unknown(Unknown::indirect(args.iter())));
        };
        if args.iter().any(Value::is_unknown) {
            return Ok(Value::unknown(Unknown::indirect(args.iter())));
        }

        func(&args).map_err(|err| {
            Diagnostic::error(
                "hcl2::function_call::invalid_args",
                format!("invalid arguments to function `{name}`"),
            )
            .with_label(node.args_span(), "invalid arguments")
            .caused_by(Diagnostic::error(
                "hcl2::function_call::invalid_args",
                err.to_string(),
            ))
        })
    }

    // -----------------------------------------------------------------------
    // Comprehensions
    // -----------------------------------------------------------------------

    fn eval_for_tuple(&self, node: &ForTupleExpr, scope: &mut Scope) -> Result<Value> {
        let collection = self.eval(&node.collection, scope)?;
        let pairs = iterate_collection(&collection).ok_or_else(|| {
            Diagnostic::error(
                "hcl2::for_tuple_expression::unsupported_collection",
                format!("cannot iterate over {}", collection.type_name()),
            )
            .with_label(node.collection.span(), collection.type_name())
        })?;

        let mut result = Vec::new();
        for (key, value) in pairs {
            let mut child = scope.child();
            child.set(node.value_ident.name.clone(), value);
            if let Some(key_ident) = &node.key_ident {
                child.set(key_ident.name.clone(), key);
            }

            let condition = match &node.condition {
                Some(cond_expr) => self.eval(cond_expr, &mut child)?,
                None => Value::bool(true),
            };

            match condition.kind() {
                ValueKind::Bool(true) => {
                    result.push(self.eval(&node.value, &mut child)?);
                }
                ValueKind::Bool(false) => {}
                ValueKind::Unknown(_) => {
                    let body = self.eval(&node.value, &mut child)?;
                    result.push(Value::unknown(Unknown::indirect([&condition, &body])));
                }
                _ => {
                    return Err(unsupported_condition(
                        "hcl2::for_tuple_expression::unsupported_condition",
                        &condition,
                        node.condition.as_deref(),
                        node.span,
                    ));
                }
            }
        }

        Ok(Value::array(result))
    }

    /// Duplicate keys produced by the comprehension overwrite earlier
    /// entries, keeping the first occurrence's position.
    fn eval_for_object(&self, node: &ForObjectExpr, scope: &mut Scope) -> Result<Value> {
        if node.grouping_mode {
            return Err(Diagnostic::error(
                "hcl2::for_object_expression::unsupported_grouping_mode",
                "grouping mode is not supported",
            )
            .with_label(node.span, "grouping mode used here"));
        }

        let collection = self.eval(&node.collection, scope)?;
        let pairs = iterate_collection(&collection).ok_or_else(|| {
            Diagnostic::error(
                "hcl2::for_object_expression::unsupported_collection",
                format!("cannot iterate over {}", collection.type_name()),
            )
            .with_label(node.collection.span(), collection.type_name())
        })?;

        let mut result = ObjectMap::new();
        let mut blockers: Vec<Value> = Vec::new();

        for (key, value) in pairs {
            let mut child = scope.child();
            child.set(node.value_ident.name.clone(), value);
            if let Some(key_ident) = &node.key_ident {
                child.set(key_ident.name.clone(), key);
            }

            let condition = match &node.condition {
                Some(cond_expr) => self.eval(cond_expr, &mut child)?,
                None => Value::bool(true),
            };
            let condition_unknown = match condition.kind() {
                ValueKind::Bool(false) => continue,
                ValueKind::Bool(true) => false,
                ValueKind::Unknown(_) => true,
                _ => {
                    return Err(unsupported_condition(
                        "hcl2::for_object_expression::unsupported_condition",
                        &condition,
                        node.condition.as_deref(),
                        node.span,
                    ));
                }
            };

            let entry_key = self.eval(&node.key, &mut child)?;
            let entry_value = self.eval(&node.value, &mut child)?;

            if condition_unknown {
                blockers.push(Value::unknown(Unknown::indirect([
                    &condition,
                    &entry_key,
                    &entry_value,
                ])));
                continue;
            }

            match entry_key.kind() {
                ValueKind::String(name) => {
                    result.insert(name.clone(), entry_value);
                }
                ValueKind::Unknown(_) => {
                    blockers.push(Value::unknown(Unknown::indirect([
                        &entry_key,
                        &entry_value,
                    ])));
                }
                _ => {
                    return Err(Diagnostic::error(
                        "hcl2::for_object_expression::unsupported_key",
                        format!("object key must be a string, got {}", entry_key.type_name()),
                    )
                    .with_label(node.key.span(), entry_key.type_name()));
                }
            }
        }

        if blockers.is_empty() {
            Ok(Value::object(result))
        } else {
            Ok(Value::unknown(Unknown::indirect(blockers.iter())))
        }
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn eval_attribute(&self, attr: &Attribute, scope: &mut Scope) -> Result<Value> {
        let value = self.eval(&attr.value, scope)?;
        scope.set(attr.key.name.clone(), value.clone());
        Ok(value)
    }

    /// Evaluates a block into its merged object. Each attribute child runs
    /// in its own child scope; nested blocks weave into arrays keyed by
    /// their type and labels.
    pub fn eval_block(&self, block: &Block, scope: &mut Scope) -> Result<Value> {
        let object = self.eval_body(&block.body, scope)?;
        Ok(Value::object(object).with_span_if_missing(block.span))
    }

    fn eval_body(&self, body: &[Stmt], scope: &mut Scope) -> Result<ObjectMap> {
        let mut result = ObjectMap::new();
        let mut attribute_spans: HashMap<&str, Span> = HashMap::new();

        for stmt in body {
            match stmt {
                Stmt::Attribute(attr) => {
                    let name = attr.key.name.as_str();
                    if result.contains_key(name) {
                        let mut diag = Diagnostic::error(
                            "hcl2::block::duplicate_key",
                            format!("attribute `{name}` is defined more than once"),
                        )
                        .with_label(attr.key.span, "redefined here");
                        if let Some(previous) = attribute_spans.get(name) {
                            diag = diag.with_label(*previous, "first defined here");
                        }
                        return Err(diag);
                    }

                    let mut child = scope.child();
                    let value = self.eval_attribute(attr, &mut child)?;
                    attribute_spans.insert(name, attr.key.span);
                    result.insert(name.to_owned(), value.with_span_if_missing(attr.span));
                }
                Stmt::Block(nested) => {
                    let value = {
                        let mut child = scope.child();
                        self.eval_block(nested, &mut child)?
                    };
                    weave_block(&mut result, nested, value)?;
                }
            }
        }

        Ok(result)
    }
}

/// Merges a nested block's object into its parent under the block's key
/// path. Sibling blocks sharing a path accumulate into an array.
fn weave_block(result: &mut ObjectMap, nested: &Block, value: Value) -> Result<()> {
    let path = nested.key_path();
    let (last, intermediate) = match path.split_last() {
        Some(parts) => parts,
        None => return Ok(()),
    };

    let mut current = result;
    for part in intermediate {
        let entry = current
            .entry(part.clone())
            .or_insert_with(|| Value::object(ObjectMap::new()));
        current = match entry.kind_mut() {
            ValueKind::Object(map) => map,
            occupant => {
                return Err(Diagnostic::error(
                    "hcl2::block::key_conflict",
                    format!(
                        "cannot nest block under `{part}`: the key already holds a {}",
                        occupant.type_name()
                    ),
                )
                .with_label(nested.r#type.span, "conflicting block"));
            }
        };
    }

    match current.entry(last.clone()) {
        indexmap::map::Entry::Vacant(slot) => {
            slot.insert(Value::array(vec![value]));
        }
        indexmap::map::Entry::Occupied(mut slot) => match slot.get_mut().kind_mut() {
            ValueKind::Array(items) => items.push(value),
            occupant => {
                return Err(Diagnostic::error(
                    "hcl2::block::key_conflict",
                    format!(
                        "block key `{}` conflicts with an existing {}",
                        path.join("."),
                        occupant.type_name()
                    ),
                )
                .with_label(nested.r#type.span, "conflicting block"));
            }
        },
    }
    Ok(())
}

/// The values an attribute or index splat iterates over. `Null` splats to
/// nothing; any non-array scalar splats to itself.
fn splat_items(on: Value) -> Vec<Value> {
    if on.is_null() {
        return Vec::new();
    }
    if let ValueKind::Array(items) = on.kind() {
        return items.clone();
    }
    vec![on]
}

/// Key/value pairs a comprehension iterates over, or `None` when the
/// collection is not iterable. An unknown collection yields one synthetic
/// pair so the comprehension body runs once pessimistically.
fn iterate_collection(collection: &Value) -> Option<Vec<(Value, Value)>> {
    match collection.kind() {
        ValueKind::Object(items) => Some(
            items
                .iter()
                .map(|(key, value)| (Value::string(key.clone()), value.clone()))
                .collect(),
        ),
        ValueKind::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(index, value)| (Value::int(index as i64), value.clone()))
                .collect(),
        ),
        ValueKind::Unknown(_) => {
            let placeholder = Value::unknown(Unknown::indirect([collection]));
            Some(vec![(placeholder.clone(), placeholder)])
        }
        _ => None,
    }
}

fn index_array(items: &[Value], index: i64, span: Span) -> Result<Value> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| {
            Diagnostic::error(
                "hcl2::get_index::index_out_of_bounds",
                format!("index {index} out of bounds (length {})", items.len()),
            )
            .with_label(span, "out of bounds")
        })
}

fn unsupported_attr_access(on: &Value, span: Span) -> Diagnostic {
    Diagnostic::error(
        "hcl2::get_attr::unsupported_type",
        format!("cannot access attributes on {}", on.type_name()),
    )
    .with_label(span, on.type_name())
}

fn unsupported_condition(
    code: &str,
    condition: &Value,
    condition_expr: Option<&Expr>,
    fallback_span: Span,
) -> Diagnostic {
    let span = condition_expr.map_or(fallback_span, Expr::span);
    Diagnostic::error(
        code,
        format!("condition must be a bool, got {}", condition.type_name()),
    )
    .with_label(span, condition.type_name())
}
