//! Core types for the evaluation engine.

use serde_json::Value;
use tracing::trace;

use crate::parser::ast::Program;
use crate::runner::config::SimulatorConfig;
use crate::runner::ds::env_record::{Binding, EnvId, Environments, GLOBAL_ENV_ID};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::{ExecutionContext, ExecutionContextStack};
use crate::runner::ds::heap::Heap;
use crate::runner::ds::step::{Step, StepType};
use crate::runner::ds::value::JsValue;
use crate::runner::recorder::StepRecorder;

/// Result type for evaluation operations.
pub type EvalResult<T = ()> = Result<T, JErrorType>;

/// Result type for value-returning operations.
pub type ValueResult = Result<JsValue, JErrorType>;

/// Lifecycle of a single user-function invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationPhase {
    Prepared,
    ContextCreated,
    EnvCreated,
    Hoisting,
    BodyExecuting,
    ContextDestroyed,
}

/// Everything a run mutates: the trace, the heap, the environment arena and
/// the execution context stack.
///
/// A context is created per run and dropped when the run ends.
pub struct EvalContext<'a> {
    pub program: &'a Program,
    pub config: &'a SimulatorConfig,
    pub recorder: StepRecorder,
    pub heap: Heap,
    pub environments: Environments,
    pub ctx_stack: ExecutionContextStack,
    fault_site: Option<Vec<String>>,
}

impl<'a> EvalContext<'a> {
    /// Creates the state of a fresh run with the global frame already on
    /// the stack.
    pub fn new(program: &'a Program, config: &'a SimulatorConfig) -> Self {
        let mut ctx_stack = ExecutionContextStack::new();
        ctx_stack.push_execution_ctx(ExecutionContext {
            name: config.global_frame_name.clone(),
            function: None,
            lex_env: GLOBAL_ENV_ID,
        });
        EvalContext {
            program,
            config,
            recorder: StepRecorder::new(config.max_steps),
            heap: Heap::new(),
            environments: Environments::new(&config.global_frame_name),
            ctx_stack,
            fault_site: None,
        }
    }

    pub fn record(
        &mut self,
        step_type: StepType,
        detail: impl Into<String>,
        data: Value,
    ) -> EvalResult {
        self.recorder.record(step_type, detail, Some(data))
    }

    /// Environment of the running execution context.
    pub fn current_env(&self) -> EnvId {
        self.ctx_stack
            .get_running_execution_ctx()
            .map(|c| c.lex_env)
            .unwrap_or(GLOBAL_ENV_ID)
    }

    /// How step details refer to an environment.
    pub fn env_label(&self, env: EnvId) -> String {
        match self.environments.get(env) {
            Some(record) if env == GLOBAL_ENV_ID => format!("the {} environment", record.name()),
            Some(record) => format!("the environment of '{}'", record.name()),
            None => format!("environment #{}", env),
        }
    }

    pub fn call_stack(&self) -> Vec<String> {
        self.ctx_stack.call_stack()
    }

    /// Reads `name` through the scope chain of the running context.
    pub fn get_binding_value(&self, name: &str) -> ValueResult {
        match self.environments.resolve(self.current_env(), name) {
            None => Err(JErrorType::not_defined(name)),
            Some((_, binding)) => binding
                .get_value()
                .ok_or_else(|| JErrorType::before_initialization(name)),
        }
    }

    /// Binds `name` in the running context's own environment. No scope walk.
    pub fn put_binding(&mut self, name: &str, binding: Binding) {
        let env = self.current_env();
        if let Some(record) = self.environments.get_mut(env) {
            record.put_binding(name, binding);
        }
    }

    pub fn snapshot(&self, value: &JsValue) -> Value {
        self.heap.snapshot(value)
    }

    /// Remembers the call stack where a fault surfaced. Only the innermost
    /// site is kept; outer frames call this again while unwinding.
    pub fn note_fault_site(&mut self) {
        if self.fault_site.is_none() {
            trace!(depth = self.ctx_stack.depth(), "fault site noted");
            self.fault_site = Some(self.call_stack());
        }
    }

    /// The call stack at the fault point, or the current one if no frame
    /// was unwound.
    pub fn take_fault_site(&mut self) -> Vec<String> {
        match self.fault_site.take() {
            Some(stack) => stack,
            None => self.call_stack(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        self.recorder.steps()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.recorder.into_steps()
    }
}
