//! Append-only step trace.

use serde_json::{json, Value};
use tracing::debug;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::step::{Step, StepType};

/// Owns the trace of one run and hands out step ids.
///
/// Ids are `step-0`, `step-1`, ... in recording order. Every step of a trace
/// goes through here, which keeps ids unique and the trace append-only.
pub struct StepRecorder {
    steps: Vec<Step>,
    next_id: usize,
    max_steps: Option<usize>,
}

impl StepRecorder {
    pub fn new(max_steps: Option<usize>) -> Self {
        StepRecorder {
            steps: Vec::new(),
            next_id: 0,
            max_steps,
        }
    }

    fn push(&mut self, step_type: StepType, detail: String, data: Option<Value>) {
        let step = Step {
            id: format!("step-{}", self.next_id),
            step_type,
            detail,
            data,
        };
        self.next_id += 1;
        debug!(id = %step.id, step_type = %step.step_type, "{}", step.detail);
        self.steps.push(step);
    }

    /// Appends a non-halting step.
    ///
    /// Fails with [`JErrorType::StepLimitExceeded`] once the configured budget
    /// is used up; nothing is recorded in that case.
    pub fn record(
        &mut self,
        step_type: StepType,
        detail: impl Into<String>,
        data: Option<Value>,
    ) -> Result<(), JErrorType> {
        if let Some(limit) = self.max_steps {
            if self.steps.len() >= limit {
                return Err(JErrorType::StepLimitExceeded { limit });
            }
        }
        self.push(step_type, detail.into(), data);
        Ok(())
    }

    /// Appends the halting step for `fault`. Ignores the step budget.
    pub fn record_halt(&mut self, fault: &JErrorType, call_stack: &[String]) {
        let data = json!({
            "kind": fault.kind(),
            "message": fault.to_string(),
            "callStack": call_stack,
        });
        self.push(
            fault.halting_step_type(),
            format!("{}; execution halted", fault),
            Some(data),
        );
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}
