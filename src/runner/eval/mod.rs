//! Evaluation module for executing the JavaScript AST.
//!
//! Walks the tree the way a teaching model of the engine would and records
//! every observable action as a step.

pub mod types;
pub mod hoisting;
pub mod expression;
pub mod statement;
pub mod function;

pub use types::{EvalContext, EvalResult, InvocationPhase, ValueResult};
