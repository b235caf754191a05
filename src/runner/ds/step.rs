use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kinds of recorded engine activity.
///
/// The task-queue kinds (`RegisterWebAPI`, `AddMacroTask`, `AddMicroTask`,
/// `MoveTaskToStack`) and `CheckVariableAccess` belong to the vocabulary a
/// viewer understands but are never produced by the current executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepType {
    CreateGlobalContext,
    AllocateHeapObject,
    ReferenceVariable,
    CreateExecutionContext,
    DestroyExecutionContext,
    CreateLexicalEnvironment,
    DeclareVariable,
    CheckVariableAccess,
    AssignValue,
    LogOutput,
    #[serde(rename = "RegisterWebAPI")]
    RegisterWebApi,
    AddMacroTask,
    AddMicroTask,
    MoveTaskToStack,
    ThrowReferenceError,
    ExecuteExpression,
    ThrowTypeError,
    ThrowRangeError,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::CreateGlobalContext => "CreateGlobalContext",
            StepType::AllocateHeapObject => "AllocateHeapObject",
            StepType::ReferenceVariable => "ReferenceVariable",
            StepType::CreateExecutionContext => "CreateExecutionContext",
            StepType::DestroyExecutionContext => "DestroyExecutionContext",
            StepType::CreateLexicalEnvironment => "CreateLexicalEnvironment",
            StepType::DeclareVariable => "DeclareVariable",
            StepType::CheckVariableAccess => "CheckVariableAccess",
            StepType::AssignValue => "AssignValue",
            StepType::LogOutput => "LogOutput",
            StepType::RegisterWebApi => "RegisterWebAPI",
            StepType::AddMacroTask => "AddMacroTask",
            StepType::AddMicroTask => "AddMicroTask",
            StepType::MoveTaskToStack => "MoveTaskToStack",
            StepType::ThrowReferenceError => "ThrowReferenceError",
            StepType::ExecuteExpression => "ExecuteExpression",
            StepType::ThrowTypeError => "ThrowTypeError",
            StepType::ThrowRangeError => "ThrowRangeError",
        }
    }

    /// Whether this step ends the trace.
    pub fn is_halting(&self) -> bool {
        matches!(
            self,
            StepType::ThrowReferenceError | StepType::ThrowTypeError | StepType::ThrowRangeError
        )
    }
}

impl Display for StepType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic unit of recorded engine behaviour.
///
/// `data` is an owned JSON snapshot taken when the step was recorded, so
/// later changes to the simulated state never show up in earlier steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Step {
    /// Reads a top level field of the data snapshot.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.id, self.step_type, self.detail)
    }
}
