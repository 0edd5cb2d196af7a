//! AST builders shared by the integration tests.
//!
//! The parser is an external collaborator, so tests assemble AST nodes by
//! hand. Identifiers get a span covering their text from offset zero, the
//! way the upstream test fixtures do; everything else defaults to an empty
//! span unless a test cares.

#![allow(dead_code)]

use hcl2_eval::ast::{
    ArrayExpr, Attribute, AttrSplat, BinaryExpr, BinaryOp, Block, BlockLabel, Conditional, Expr,
    ForObjectExpr, ForTupleExpr, FunctionCall, GetAttr, GetAttrKey, GetIndex, GetIndexKey,
    Identifier, IndexSplat, Literal, Module, ObjectExpr, Parenthesis, SplatKey, Stmt, UnaryExpr,
    UnaryOp,
};
use hcl2_eval::span::{Span, Spanned};
use hcl2_eval::value::Value;

pub fn span(start: usize, end: usize) -> Span {
    Span::new(start, end)
}

pub fn ident(name: &str) -> Identifier {
    Identifier::new(name, span(0, name.len()))
}

pub fn lit(value: Value) -> Expr {
    Expr::Literal(Literal {
        value,
        span: Span::default(),
    })
}

pub fn null() -> Expr {
    lit(Value::null())
}

pub fn int(raw: i64) -> Expr {
    lit(Value::int(raw))
}

pub fn float(raw: f64) -> Expr {
    lit(Value::float(raw))
}

pub fn boolean(raw: bool) -> Expr {
    lit(Value::bool(raw))
}

pub fn string(raw: &str) -> Expr {
    lit(Value::string(raw))
}

pub fn var(name: &str) -> Expr {
    Expr::Identifier(ident(name))
}

pub fn array(values: Vec<Expr>) -> Expr {
    Expr::Array(ArrayExpr {
        values,
        span: Span::default(),
    })
}

pub fn object(fields: Vec<(Expr, Expr)>) -> Expr {
    Expr::Object(ObjectExpr {
        fields,
        span: Span::default(),
    })
}

pub fn paren(expr: Expr) -> Expr {
    Expr::Parenthesis(Parenthesis {
        expr: Box::new(expr),
        span: Span::default(),
    })
}

pub fn unary(op: UnaryOp, expr: Expr) -> Expr {
    Expr::Unary(UnaryExpr {
        op: Spanned::new(op, Span::default()),
        expr: Box::new(expr),
        span: Span::default(),
    })
}

pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op: Spanned::new(op, Span::default()),
        left: Box::new(left),
        right: Box::new(right),
        span: Span::default(),
    })
}

pub fn conditional(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
    Expr::Conditional(Conditional {
        cond: Box::new(cond),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
        span: Span::default(),
    })
}

pub fn attr_key(name: &str) -> GetAttrKey {
    GetAttrKey {
        ident: ident(name),
        span: span(0, name.len() + 1),
    }
}

pub fn index_key(expr: Expr) -> GetIndexKey {
    GetIndexKey {
        expr: Box::new(expr),
        span: Span::default(),
    }
}

pub fn get_attr(on: Expr, name: &str) -> Expr {
    Expr::GetAttr(GetAttr {
        on: Box::new(on),
        key: attr_key(name),
        span: Span::default(),
    })
}

pub fn get_index(on: Expr, key: Expr) -> Expr {
    Expr::GetIndex(GetIndex {
        on: Box::new(on),
        key: index_key(key),
        span: Span::default(),
    })
}

pub fn attr_splat(on: Expr, names: &[&str]) -> Expr {
    Expr::AttrSplat(AttrSplat {
        on: Box::new(on),
        keys: names.iter().map(|name| attr_key(name)).collect(),
        span: Span::default(),
    })
}

pub fn index_splat(on: Expr, keys: Vec<SplatKey>) -> Expr {
    Expr::IndexSplat(IndexSplat {
        on: Box::new(on),
        keys,
        span: Span::default(),
    })
}

pub fn splat_attr(name: &str) -> SplatKey {
    SplatKey::Attr(attr_key(name))
}

pub fn splat_index(key: Expr) -> SplatKey {
    SplatKey::Index(index_key(key))
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall(FunctionCall {
        ident: ident(name),
        args,
        var_args: false,
        span: Span::default(),
    })
}

pub fn call_var_args(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall(FunctionCall {
        ident: ident(name),
        args,
        var_args: true,
        span: Span::default(),
    })
}

pub fn for_tuple(
    key_ident: Option<&str>,
    value_ident: &str,
    collection: Expr,
    value: Expr,
    condition: Option<Expr>,
) -> Expr {
    Expr::ForTuple(ForTupleExpr {
        key_ident: key_ident.map(ident),
        value_ident: ident(value_ident),
        collection: Box::new(collection),
        value: Box::new(value),
        condition: condition.map(Box::new),
        span: Span::default(),
    })
}

pub fn for_object(
    key_ident: Option<&str>,
    value_ident: &str,
    collection: Expr,
    key: Expr,
    value: Expr,
    condition: Option<Expr>,
) -> Expr {
    for_object_grouping(key_ident, value_ident, collection, key, value, condition, false)
}

pub fn for_object_grouping(
    key_ident: Option<&str>,
    value_ident: &str,
    collection: Expr,
    key: Expr,
    value: Expr,
    condition: Option<Expr>,
    grouping_mode: bool,
) -> Expr {
    Expr::ForObject(ForObjectExpr {
        key_ident: key_ident.map(ident),
        value_ident: ident(value_ident),
        collection: Box::new(collection),
        key: Box::new(key),
        value: Box::new(value),
        condition: condition.map(Box::new),
        grouping_mode,
        span: Span::default(),
    })
}

pub fn attribute(name: &str, value: Expr) -> Stmt {
    Stmt::Attribute(Attribute {
        key: ident(name),
        value,
        span: Span::default(),
    })
}

pub fn label(text: &str) -> BlockLabel {
    BlockLabel::Literal(Literal {
        value: Value::string(text),
        span: span(0, text.len() + 2),
    })
}

pub fn label_ident(name: &str) -> BlockLabel {
    BlockLabel::Identifier(ident(name))
}

pub fn block(block_type: &str, labels: Vec<BlockLabel>, body: Vec<Stmt>) -> Block {
    Block {
        r#type: ident(block_type),
        labels,
        body,
        span: Span::default(),
    }
}

pub fn block_stmt(block_type: &str, labels: Vec<BlockLabel>, body: Vec<Stmt>) -> Stmt {
    Stmt::Block(block(block_type, labels, body))
}

pub fn module(body: Vec<Stmt>) -> Module {
    Module::new(body, Span::default())
}
