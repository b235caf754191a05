//! # jsim - step-by-step JavaScript engine simulator
//!
//! Turns a small subset of JavaScript into an ordered trace of engine
//! "steps": global context creation, hoisting, variable declaration and
//! assignment, heap allocation, function calls with their execution
//! contexts, and `console.log` output. The trace is meant to be replayed one
//! step at a time for teaching.
//!
//! ## Quick Start
//!
//! ```
//! use jsim::runner::api::simulate;
//! use jsim::runner::ds::step::StepType;
//!
//! let steps = simulate("var x = 1; console.log(x);").unwrap();
//! let types: Vec<StepType> = steps.iter().map(|s| s.step_type).collect();
//! assert_eq!(
//!     types,
//!     vec![
//!         StepType::CreateGlobalContext,
//!         StepType::DeclareVariable,
//!         StepType::AssignValue,
//!         StepType::ExecuteExpression,
//!         StepType::LogOutput,
//!     ]
//! );
//! ```
//!
//! ### Faults
//!
//! Reading a `let` binding before its initializer ran halts the run with a
//! single `ThrowReferenceError` step:
//!
//! ```
//! use jsim::runner::api::Simulator;
//! use jsim::runner::ds::step::StepType;
//!
//! let trace = Simulator::default().run("let y; console.log(y);").unwrap();
//! assert!(trace.is_halted());
//! assert_eq!(trace.steps.last().unwrap().step_type, StepType::ThrowReferenceError);
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG parser and AST types
//! - **[`runner`]** - The simulator
//!   - **[`runner::ds`]** - Data structures (values, bindings, heap, steps)
//!   - **[`runner::eval`]** - Hoisting, expression evaluation, statement execution
//!   - **[`runner::api`]** - Top-level driver
//!   - **[`runner::playback`]** - Cursor over a computed trace

pub mod parser;
pub mod runner;
