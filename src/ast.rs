//! The HCL2 abstract syntax tree consumed by the evaluator.
//!
//! The parser that produces these nodes is an external collaborator; this
//! module defines the shapes it must deliver. Every node carries a [`Span`]
//! into the source text. Object literal fields and block bodies preserve
//! their source order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Result};
use crate::span::{Span, Spanned};
use crate::value::Value;

/// A bare name, e.g. a variable reference, attribute key or block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A literal value embedded by the parser. Heredoc and quoted string bodies
/// arrive pre-processed as plain [`Value::string`] payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: Value,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpr {
    pub values: Vec<Expr>,
    pub span: Span,
}

/// An object literal. Keys are expressions: identifiers and string literals
/// name the field directly, a parenthesized expression is evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectExpr {
    pub fields: Vec<(Expr, Expr)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parenthesis {
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Unary operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: Spanned<UnaryOp>,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: Spanned<BinaryOp>,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub cond: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

/// The `.name` part of an attribute traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAttrKey {
    pub ident: Identifier,
    pub span: Span,
}

/// The `[expr]` part of an index traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetIndexKey {
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAttr {
    pub on: Box<Expr>,
    pub key: GetAttrKey,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetIndex {
    pub on: Box<Expr>,
    pub key: GetIndexKey,
    pub span: Span,
}

/// `on.*.a.b` — attribute-only splat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrSplat {
    pub on: Box<Expr>,
    pub keys: Vec<GetAttrKey>,
    pub span: Span,
}

/// One step of an index splat chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplatKey {
    Attr(GetAttrKey),
    Index(GetIndexKey),
}

impl SplatKey {
    pub fn span(&self) -> Span {
        match self {
            SplatKey::Attr(key) => key.span,
            SplatKey::Index(key) => key.span,
        }
    }
}

/// `on[*].a[0]` — splat allowing both attribute and index steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSplat {
    pub on: Box<Expr>,
    pub keys: Vec<SplatKey>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub ident: Identifier,
    pub args: Vec<Expr>,
    pub var_args: bool,
    pub span: Span,
}

impl FunctionCall {
    /// The span covering the argument list, used to label call failures.
    pub fn args_span(&self) -> Span {
        Span::new(self.ident.span.end, self.span.end)
    }
}

/// `[for k, v in coll: value if cond]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForTupleExpr {
    pub key_ident: Option<Identifier>,
    pub value_ident: Identifier,
    pub collection: Box<Expr>,
    pub value: Box<Expr>,
    pub condition: Option<Box<Expr>>,
    pub span: Span,
}

/// `{for k, v in coll: key => value if cond}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForObjectExpr {
    pub key_ident: Option<Identifier>,
    pub value_ident: Identifier,
    pub collection: Box<Expr>,
    pub key: Box<Expr>,
    pub value: Box<Expr>,
    pub condition: Option<Box<Expr>>,
    pub grouping_mode: bool,
    pub span: Span,
}

/// The expression sum type dispatched over by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Identifier(Identifier),
    Array(ArrayExpr),
    Object(ObjectExpr),
    Parenthesis(Parenthesis),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Conditional(Conditional),
    GetAttr(GetAttr),
    GetIndex(GetIndex),
    AttrSplat(AttrSplat),
    IndexSplat(IndexSplat),
    FunctionCall(FunctionCall),
    ForTuple(ForTupleExpr),
    ForObject(ForObjectExpr),
}

impl Expr {
    /// Returns the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(node) => node.span,
            Expr::Identifier(node) => node.span,
            Expr::Array(node) => node.span,
            Expr::Object(node) => node.span,
            Expr::Parenthesis(node) => node.span,
            Expr::Unary(node) => node.span,
            Expr::Binary(node) => node.span,
            Expr::Conditional(node) => node.span,
            Expr::GetAttr(node) => node.span,
            Expr::GetIndex(node) => node.span,
            Expr::AttrSplat(node) => node.span,
            Expr::IndexSplat(node) => node.span,
            Expr::FunctionCall(node) => node.span,
            Expr::ForTuple(node) => node.span,
            Expr::ForObject(node) => node.span,
        }
    }

    /// Node kind as a string, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "Literal",
            Expr::Identifier(_) => "Identifier",
            Expr::Array(_) => "Array",
            Expr::Object(_) => "Object",
            Expr::Parenthesis(_) => "Parenthesis",
            Expr::Unary(_) => "UnaryExpression",
            Expr::Binary(_) => "BinaryExpression",
            Expr::Conditional(_) => "Conditional",
            Expr::GetAttr(_) => "GetAttr",
            Expr::GetIndex(_) => "GetIndex",
            Expr::AttrSplat(_) => "AttrSplat",
            Expr::IndexSplat(_) => "IndexSplat",
            Expr::FunctionCall(_) => "FunctionCall",
            Expr::ForTuple(_) => "ForTupleExpression",
            Expr::ForObject(_) => "ForObjectExpression",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_compact(self, f)
    }
}

/// A `name = expr` binding inside a block body or at top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: Identifier,
    pub value: Expr,
    pub span: Span,
}

/// A block label: either a bare identifier or a quoted string literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockLabel {
    Identifier(Identifier),
    Literal(Literal),
}

impl BlockLabel {
    pub fn span(&self) -> Span {
        match self {
            BlockLabel::Identifier(ident) => ident.span,
            BlockLabel::Literal(literal) => literal.span,
        }
    }

    /// The label's textual form, if it has one. Labels that are neither
    /// identifiers nor string literals contribute nothing to a block's key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BlockLabel::Identifier(ident) => Some(&ident.name),
            BlockLabel::Literal(literal) => literal.value.as_str(),
        }
    }
}

/// A declarative block: a type, optional labels and a body of statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub r#type: Identifier,
    pub labels: Vec<BlockLabel>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    /// The block's identity key: type name followed by its label strings.
    pub fn key_path(&self) -> Vec<String> {
        let mut parts = vec![self.r#type.name.clone()];
        parts.extend(
            self.labels
                .iter()
                .filter_map(|label| label.as_str().map(str::to_owned)),
        );
        parts
    }

    /// The attribute children of this block, in source order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.body.iter().filter_map(|stmt| match stmt {
            Stmt::Attribute(attr) => Some(attr),
            Stmt::Block(_) => None,
        })
    }

    /// The nested block children of this block, in source order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.body.iter().filter_map(|stmt| match stmt {
            Stmt::Block(block) => Some(block),
            Stmt::Attribute(_) => None,
        })
    }
}

/// A statement inside a block body or module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Attribute(Attribute),
    Block(Block),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Attribute(attr) => attr.span,
            Stmt::Block(block) => block.span,
        }
    }
}

/// A whole source file: the implicit outermost block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Module {
    pub fn new(body: Vec<Stmt>, span: Span) -> Self {
        Self { body, span }
    }

    /// Block children, optionally filtered by type name.
    pub fn get_blocks(&self, block_type: Option<&str>) -> Vec<&Block> {
        self.body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Block(block)
                    if block_type.map_or(true, |name| block.r#type.name == name) =>
                {
                    Some(block)
                }
                _ => None,
            })
            .collect()
    }

    /// The unique block with the given type and labels, if any. More than
    /// one match is an error.
    pub fn get_block(&self, block_type: &str, labels: &[&str]) -> Result<Option<&Block>> {
        let mut matches = self.get_blocks(Some(block_type)).into_iter().filter(|block| {
            labels.is_empty()
                || (block.labels.len() == labels.len()
                    && block
                        .labels
                        .iter()
                        .zip(labels)
                        .all(|(label, expected)| label.as_str() == Some(expected)))
        });

        let first = matches.next();
        if let Some(extra) = matches.next() {
            return Err(Diagnostic::error(
                "hcl2::module::multiple_blocks",
                format!("multiple {block_type} blocks found"),
            )
            .with_label(extra.r#type.span, "second match here"));
        }
        Ok(first)
    }
}

// ---------------------------------------------------------------------------
// Compact rendering, used in diagnostic messages. This is not a formatter:
// whitespace and comments are not preserved.
// ---------------------------------------------------------------------------

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut write_item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_item(f, item)?;
    }
    Ok(())
}

fn write_compact(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::Literal(node) => write!(f, "{}", node.value),
        Expr::Identifier(node) => write!(f, "{}", node.name),
        Expr::Array(node) => {
            write!(f, "[")?;
            write_list(f, &node.values, |f, item| write!(f, "{item}"))?;
            write!(f, "]")
        }
        Expr::Object(node) => {
            write!(f, "{{ ")?;
            write_list(f, &node.fields, |f, (key, value)| {
                write!(f, "{key} = {value}")
            })?;
            write!(f, " }}")
        }
        Expr::Parenthesis(node) => write!(f, "({})", node.expr),
        Expr::Unary(node) => write!(f, "{}{}", node.op.value.symbol(), node.expr),
        Expr::Binary(node) => {
            write!(f, "{} {} {}", node.left, node.op.value.symbol(), node.right)
        }
        Expr::Conditional(node) => {
            write!(f, "{} ? {} : {}", node.cond, node.then_expr, node.else_expr)
        }
        Expr::GetAttr(node) => write!(f, "{}.{}", node.on, node.key.ident.name),
        Expr::GetIndex(node) => write!(f, "{}[{}]", node.on, node.key.expr),
        Expr::AttrSplat(node) => {
            write!(f, "{}.*", node.on)?;
            for key in &node.keys {
                write!(f, ".{}", key.ident.name)?;
            }
            Ok(())
        }
        Expr::IndexSplat(node) => {
            write!(f, "{}[*]", node.on)?;
            for key in &node.keys {
                match key {
                    SplatKey::Attr(key) => write!(f, ".{}", key.ident.name)?,
                    SplatKey::Index(key) => write!(f, "[{}]", key.expr)?,
                }
            }
            Ok(())
        }
        Expr::FunctionCall(node) => {
            write!(f, "{}(", node.ident.name)?;
            write_list(f, &node.args, |f, arg| write!(f, "{arg}"))?;
            if node.var_args {
                write!(f, "...")?;
            }
            write!(f, ")")
        }
        Expr::ForTuple(node) => {
            write!(f, "[for ")?;
            if let Some(key) = &node.key_ident {
                write!(f, "{}, ", key.name)?;
            }
            write!(
                f,
                "{} in {}: {}",
                node.value_ident.name, node.collection, node.value
            )?;
            if let Some(cond) = &node.condition {
                write!(f, " if {cond}")?;
            }
            write!(f, "]")
        }
        Expr::ForObject(node) => {
            write!(f, "{{for ")?;
            if let Some(key) = &node.key_ident {
                write!(f, "{}, ", key.name)?;
            }
            write!(
                f,
                "{} in {}: {} => {}",
                node.value_ident.name, node.collection, node.key, node.value
            )?;
            if let Some(cond) = &node.condition {
                write!(f, " if {cond}")?;
            }
            if node.grouping_mode {
                write!(f, "...")?;
            }
            write!(f, "}}")
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key.name, self.value)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.r#type.name)?;
        for label in &self.labels {
            match label {
                BlockLabel::Identifier(ident) => write!(f, " {}", ident.name)?,
                BlockLabel::Literal(literal) => write!(f, " {}", literal.value)?,
            }
        }
        write!(f, " {{ ")?;
        for (i, stmt) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{stmt}")?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Attribute(attr) => write!(f, "{attr}"),
            Stmt::Block(block) => write!(f, "{block}"),
        }
    }
}
