use serde::Serialize;
use thiserror::Error;

use crate::runner::ds::step::StepType;

/// Faults raised while simulating a program.
///
/// Every fault unwinds the frames pushed since the running call began and
/// halts the top-level driver, which records a single halting step for it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum JErrorType {
    #[error("ReferenceError: {0}")]
    ReferenceError(String),
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("RangeError: Maximum call stack size exceeded ({limit} frames)")]
    StackOverflow { limit: usize },
    #[error("RangeError: Step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },
}

impl JErrorType {
    pub fn not_defined(name: &str) -> Self {
        JErrorType::ReferenceError(format!("'{}' is not defined", name))
    }

    pub fn before_initialization(name: &str) -> Self {
        JErrorType::ReferenceError(format!("Cannot access '{}' before initialization", name))
    }

    pub fn not_a_function(name: &str) -> Self {
        JErrorType::TypeError(format!("'{}' is not a function", name))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JErrorType::ReferenceError(_) => "ReferenceError",
            JErrorType::TypeError(_) => "TypeError",
            JErrorType::StackOverflow { .. } | JErrorType::StepLimitExceeded { .. } => "RangeError",
        }
    }

    /// The step type the driver records when this fault halts execution.
    pub fn halting_step_type(&self) -> StepType {
        match self {
            JErrorType::ReferenceError(_) => StepType::ThrowReferenceError,
            JErrorType::TypeError(_) => StepType::ThrowTypeError,
            JErrorType::StackOverflow { .. } | JErrorType::StepLimitExceeded { .. } => {
                StepType::ThrowRangeError
            }
        }
    }
}
