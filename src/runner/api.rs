use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::parser::ast::{Program, StatementType};
use crate::parser::{JsParser, ParseError};
use crate::runner::config::{ConfigError, SimulatorConfig};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::step::{Step, StepType};
use crate::runner::eval::hoisting::{hoist_declarations, HoistingMode};
use crate::runner::eval::statement::execute_statement;
use crate::runner::eval::{EvalContext, EvalResult};

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub steps: Vec<Step>,
    /// The fault that halted the run, if any. Its halting step is the last
    /// entry of `steps`.
    pub fault: Option<JErrorType>,
    /// Call stack when the run ended. Only the global frame remains, even
    /// after a fault.
    pub final_call_stack: Vec<String>,
}

impl Trace {
    pub fn is_halted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn step_types(&self) -> Vec<StepType> {
        self.steps.iter().map(|s| s.step_type).collect()
    }
}

pub struct Simulator {
    config: SimulatorConfig,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new(SimulatorConfig::default())
    }
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Simulator { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Parses `source` and simulates it.
    ///
    /// Only a parse failure is an error here; a program that faults still
    /// yields a trace ending in a halting step.
    pub fn run(&self, source: &str) -> Result<Trace, SimulatorError> {
        let program = JsParser::parse_to_ast(source)?;
        Ok(self.run_program(&program))
    }

    pub fn run_program(&self, program: &Program) -> Trace {
        let mut ctx = EvalContext::new(program, &self.config);
        let fault = match execute_script(program, &mut ctx) {
            Ok(()) => None,
            Err(fault) => {
                let call_stack = ctx.take_fault_site();
                warn!(%fault, call_stack = ?call_stack, "execution halted");
                ctx.recorder.record_halt(&fault, &call_stack);
                Some(fault)
            }
        };
        let final_call_stack = ctx.call_stack();
        let steps = ctx.into_steps();
        info!(steps = steps.len(), halted = fault.is_some(), "simulation finished");
        Trace {
            steps,
            fault,
            final_call_stack,
        }
    }
}

/// Global context, global hoisting, then every top-level statement in order.
fn execute_script(program: &Program, ctx: &mut EvalContext) -> EvalResult {
    let global = ctx.config.global_frame_name.clone();
    ctx.record(
        StepType::CreateGlobalContext,
        format!(
            "Create the {} execution context and push it onto the call stack",
            global
        ),
        json!({ "name": global }),
    )?;

    hoist_declarations(&program.body, HoistingMode::Global, ctx)?;

    for stmt in &program.body {
        if let StatementType::FunctionDeclaration { .. } = stmt {
            continue;
        }
        execute_statement(stmt, ctx)?;
    }
    Ok(())
}

/// Simulates `source` with the default configuration and returns its steps.
pub fn simulate(source: &str) -> Result<Vec<Step>, SimulatorError> {
    Ok(Simulator::default().run(source)?.steps)
}
