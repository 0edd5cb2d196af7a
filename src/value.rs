//! Runtime values for HCL2 evaluation.
//!
//! A [`Value`] is the result of evaluating any expression: a concrete datum
//! (null, bool, int, float, string, array, object) or an [`Unknown`] that
//! records which variable references kept evaluation from completing.
//! Arrays are ordered; objects preserve insertion order and key their fields
//! by strings only. Every value optionally carries the [`Span`] of the
//! expression that produced it.
//!
//! Equality between values ignores spans: `Value::int(1)` compares equal to
//! the same integer evaluated out of source text.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::Identifier;
use crate::diagnostics::{Diagnostic, Result};
use crate::span::Span;

/// Insertion-ordered string-keyed map payload of [`ValueKind::Object`].
pub type ObjectMap = IndexMap<String, Value>;

/// A variable path observed during evaluation. Components are `None` where
/// the path position was dynamic or unresolvable (e.g. an integer index).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VariableReference {
    pub key: Vec<Option<String>>,
    pub span: Span,
}

impl VariableReference {
    pub fn new(key: Vec<Option<String>>, span: Span) -> Self {
        Self { key, span }
    }

    /// True when every path component is known.
    pub fn is_static(&self) -> bool {
        self.key.iter().all(Option::is_some)
    }

    /// The concrete path, if fully static.
    pub fn static_path(&self) -> Option<Vec<String>> {
        self.key.iter().cloned().collect()
    }

    /// Dotted rendering with `?` standing in for dynamic components.
    pub fn dotted(&self) -> String {
        self.key
            .iter()
            .map(|part| part.as_deref().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// A value that could not be computed because of missing variables.
///
/// `direct` holds references that were dereferenced as paths; `indirect`
/// holds references that merely flowed into the computation (operator
/// operands, container elements, call arguments, comprehension sources).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unknown {
    pub direct: BTreeSet<VariableReference>,
    pub indirect: BTreeSet<VariableReference>,
}

impl Unknown {
    /// An unknown born from an identifier missing in scope: one direct
    /// reference to the bare name.
    pub fn from_identifier(ident: &Identifier) -> Self {
        let mut direct = BTreeSet::new();
        direct.insert(VariableReference::new(
            vec![Some(ident.name.clone())],
            ident.span,
        ));
        Self {
            direct,
            indirect: BTreeSet::new(),
        }
    }

    /// All references, direct and indirect.
    pub fn references(&self) -> BTreeSet<VariableReference> {
        self.direct.union(&self.indirect).cloned().collect()
    }

    /// An unknown whose indirect set is the union of all references found
    /// in the given values. Concrete values contribute nothing; wrapping an
    /// unknown this way twice yields the same reference set.
    pub fn indirect<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut indirect = BTreeSet::new();
        for value in values {
            if let ValueKind::Unknown(unknown) = value.kind() {
                indirect.extend(unknown.references());
            }
        }
        Self {
            direct: BTreeSet::new(),
            indirect,
        }
    }

    /// A path traversal off this unknown: each direct reference grows by
    /// `key`, or a fresh `(?, key)` reference is created when there is none.
    /// Everything previously known stays reachable through the indirect set.
    pub fn extend_direct(&self, span: Span, key: &str) -> Self {
        let direct = if self.direct.is_empty() {
            let mut refs = BTreeSet::new();
            refs.insert(VariableReference::new(
                vec![None, Some(key.to_owned())],
                span,
            ));
            refs
        } else {
            self.direct
                .iter()
                .map(|reference| {
                    let mut path = reference.key.clone();
                    path.push(Some(key.to_owned()));
                    VariableReference::new(path, span)
                })
                .collect()
        };

        Self {
            direct,
            indirect: self.references(),
        }
    }

    /// The `evaluator::unknown_variable` diagnostic for a value that had to
    /// be fully resolved but was not.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(
            "hcl2::evaluator::unknown_variable",
            "failed to evaluate expression due to unknown variables",
        );
        for reference in self.references() {
            let last = reference
                .key
                .last()
                .and_then(|part| part.as_deref())
                .unwrap_or("?");
            diag = diag.with_label(
                reference.span,
                format!("{last} could not be resolved ({})", reference.dotted()),
            );
        }
        diag
    }
}

/// The shape of a [`Value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum ValueKind {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(ObjectMap),
    Unknown(Unknown),
}

impl ValueKind {
    /// The kind's type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool(_) => "bool",
            ValueKind::Int(_) => "int",
            ValueKind::Float(_) => "float",
            ValueKind::String(_) => "string",
            ValueKind::Array(_) => "array",
            ValueKind::Object(_) => "object",
            ValueKind::Unknown(_) => "unknown",
        }
    }
}

/// A runtime value paired with the span of the expression that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Value {
    kind: ValueKind,
    span: Option<Span>,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self { kind, span: None }
    }

    pub fn null() -> Self {
        Self::new(ValueKind::Null)
    }

    pub fn bool(raw: bool) -> Self {
        Self::new(ValueKind::Bool(raw))
    }

    pub fn int(raw: i64) -> Self {
        Self::new(ValueKind::Int(raw))
    }

    pub fn float(raw: f64) -> Self {
        Self::new(ValueKind::Float(raw))
    }

    pub fn string(raw: impl Into<String>) -> Self {
        Self::new(ValueKind::String(raw.into()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::new(ValueKind::Array(items))
    }

    pub fn object(items: ObjectMap) -> Self {
        Self::new(ValueKind::Object(items))
    }

    pub fn unknown(unknown: Unknown) -> Self {
        Self::new(ValueKind::Unknown(unknown))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ValueKind {
        &mut self.kind
    }

    pub fn into_kind(self) -> ValueKind {
        self.kind
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Replaces this value's span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attaches `span` only if the value does not already carry a more
    /// specific one. The evaluator calls this on every produced value.
    pub fn with_span_if_missing(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// The value's type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, ValueKind::Unknown(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            ValueKind::Bool(raw) => Some(*raw),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &self.kind {
            ValueKind::Int(raw) => Some(*raw),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match &self.kind {
            ValueKind::Float(raw) => Some(*raw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match &self.kind {
            ValueKind::Object(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&Unknown> {
        match &self.kind {
            ValueKind::Unknown(unknown) => Some(unknown),
            _ => None,
        }
    }

    /// Lifts a container holding unknowns — at any depth — into a single
    /// [`Unknown`] carrying the union of their references. Fully concrete
    /// values are returned unchanged.
    pub fn resolve(self) -> Value {
        let span = self.span;
        match self.kind {
            ValueKind::Array(items) => {
                let resolved: Vec<Value> = items.into_iter().map(Value::resolve).collect();
                if resolved.iter().any(Value::is_unknown) {
                    let unknown =
                        Unknown::indirect(resolved.iter().filter(|item| item.is_unknown()));
                    Value {
                        kind: ValueKind::Unknown(unknown),
                        span,
                    }
                } else {
                    Value {
                        kind: ValueKind::Array(resolved),
                        span,
                    }
                }
            }
            ValueKind::Object(items) => {
                let resolved: ObjectMap = items
                    .into_iter()
                    .map(|(key, value)| (key, value.resolve()))
                    .collect();
                if resolved.values().any(Value::is_unknown) {
                    let unknown =
                        Unknown::indirect(resolved.values().filter(|item| item.is_unknown()));
                    Value {
                        kind: ValueKind::Unknown(unknown),
                        span,
                    }
                } else {
                    Value {
                        kind: ValueKind::Object(resolved),
                        span,
                    }
                }
            }
            kind => Value { kind, span },
        }
    }

    /// Converts into the host representation, failing with
    /// `hcl2::evaluator::unknown_variable` if any unknown remains.
    pub fn raw(&self) -> Result<serde_json::Value> {
        match &self.kind {
            ValueKind::Null => Ok(serde_json::Value::Null),
            ValueKind::Bool(raw) => Ok(serde_json::Value::Bool(*raw)),
            ValueKind::Int(raw) => Ok(serde_json::Value::from(*raw)),
            ValueKind::Float(raw) => Ok(serde_json::Number::from_f64(*raw)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)),
            ValueKind::String(raw) => Ok(serde_json::Value::String(raw.clone())),
            ValueKind::Array(items) => Ok(serde_json::Value::Array(
                items.iter().map(Value::raw).collect::<Result<_>>()?,
            )),
            ValueKind::Object(items) => {
                let mut map = serde_json::Map::with_capacity(items.len());
                for (key, value) in items {
                    map.insert(key.clone(), value.raw()?);
                }
                Ok(serde_json::Value::Object(map))
            }
            ValueKind::Unknown(unknown) => Err(unknown.to_diagnostic()),
        }
    }

    /// Lifts a host value into the lattice. Whole numbers become [`ValueKind::Int`],
    /// everything else follows the obvious mapping.
    pub fn infer(raw: serde_json::Value) -> Value {
        match raw {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(raw) => Value::bool(raw),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(int) => Value::int(int),
                None => Value::float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(raw) => Value::string(raw),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::infer).collect())
            }
            serde_json::Value::Object(items) => Value::object(
                items
                    .into_iter()
                    .map(|(key, value)| (key, Value::infer(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(raw: bool) -> Self {
        Value::bool(raw)
    }
}

impl From<i64> for Value {
    fn from(raw: i64) -> Self {
        Value::int(raw)
    }
}

impl From<f64> for Value {
    fn from(raw: f64) -> Self {
        Value::float(raw)
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Value::string(raw)
    }
}

impl From<String> for Value {
    fn from(raw: String) -> Self {
        Value::string(raw)
    }
}

impl From<&Path> for Value {
    fn from(raw: &Path) -> Self {
        Value::string(raw.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Value {
    fn from(raw: PathBuf) -> Self {
        Value::from(raw.as_path())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<ObjectMap> for Value {
    fn from(items: ObjectMap) -> Self {
        Value::object(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(raw: serde_json::Value) -> Self {
        Value::infer(raw)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Bool(raw) => write!(f, "{raw}"),
            ValueKind::Int(raw) => write!(f, "{raw}"),
            ValueKind::Float(raw) => write!(f, "{raw}"),
            ValueKind::String(raw) => write!(f, "{raw:?}"),
            ValueKind::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ValueKind::Object(items) => {
                write!(f, "{{")?;
                for (i, (key, value)) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                write!(f, "}}")
            }
            ValueKind::Unknown(unknown) => {
                write!(f, "<unknown direct: ")?;
                for (i, reference) in unknown.direct.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", reference.dotted())?;
                }
                write!(f, "; indirect: ")?;
                for (i, reference) in unknown.indirect.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", reference.dotted())?;
                }
                write!(f, ">")
            }
        }
    }
}
