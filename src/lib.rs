//! HCL2 evaluation core.
//!
//! This crate evaluates HCL2 abstract syntax trees against a variable
//! [`Scope`] and a table of host-provided functions, producing typed,
//! source-located [`Value`]s. Variables missing from the scope do not abort
//! evaluation: they surface as [`value::Unknown`] values that record the
//! references the result depends on, which powers the dependency
//! [`tracker`] and the [`generations`] planner for declarative blocks.
//!
//! The grammar and parser are external collaborators: anything that can
//! produce the [`ast`] node types (with source spans) can drive this crate.
//!
//! ```
//! use hcl2_eval::{Evaluator, Scope, Value};
//! use hcl2_eval::ast::{BinaryExpr, BinaryOp, Expr, Identifier, Literal};
//! use hcl2_eval::span::{Span, Spanned};
//!
//! let expr = Expr::Binary(BinaryExpr {
//!     op: Spanned::new(BinaryOp::Add, Span::new(2, 3)),
//!     left: Box::new(Expr::Identifier(Identifier::new("n", Span::new(0, 1)))),
//!     right: Box::new(Expr::Literal(Literal {
//!         value: Value::int(1),
//!         span: Span::new(4, 5),
//!     })),
//!     span: Span::new(0, 5),
//! });
//!
//! let mut scope = Scope::with_variables([("n", Value::int(41))]);
//! let result = Evaluator::new().eval(&expr, &mut scope).unwrap();
//! assert_eq!(result, Value::int(42));
//! ```

pub mod ast;
pub mod diagnostics;
pub mod eval;
pub mod generations;
pub mod ops;
pub mod scope;
pub mod span;
pub mod tracker;
pub mod value;

pub use crate::diagnostics::{Diagnostic, Severity};
pub use crate::eval::{Evaluator, FunctionError, FunctionRegistry};
pub use crate::generations::blocks_by_generation;
pub use crate::scope::Scope;
pub use crate::span::Span;
pub use crate::value::{Unknown, Value, VariableReference};
