//! User function invocation.

use serde_json::json;
use tracing::{debug, trace};

use crate::parser::ast::{FunctionId, IdentifierData};
use crate::runner::ds::env_record::EnvId;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::ExecutionContext;
use crate::runner::ds::step::StepType;
use crate::runner::ds::value::JsValue;

use super::hoisting::{hoist_declarations, HoistingMode};
use super::statement::execute_statement;
use super::types::{EvalContext, EvalResult, InvocationPhase};

fn enter_phase(name: &str, phase: InvocationPhase) {
    trace!(function = name, phase = ?phase, "invocation phase");
}

/// Calls the hoisted function named by `callee`.
///
/// Arguments are not evaluated and no parameters are bound. The frame pushed
/// here is popped again whatever the body does; on a fault no destroy step is
/// recorded and the fault is passed on to the caller.
pub fn call_function(callee: &IdentifierData, ctx: &mut EvalContext) -> EvalResult {
    let name = callee.name.as_str();
    enter_phase(name, InvocationPhase::Prepared);
    ctx.record(
        StepType::ExecuteExpression,
        format!("Prepare call to '{}()'", name),
        json!({ "name": name }),
    )?;

    let function = resolve_callee(name, ctx)?;

    let depth = ctx.ctx_stack.depth();
    let limit = ctx.config.call_depth_limit();
    if depth >= limit {
        debug!(function = name, depth, "call stack limit reached");
        return Err(JErrorType::StackOverflow { limit });
    }

    ctx.record(
        StepType::CreateExecutionContext,
        format!(
            "Create execution context for '{}' and push it onto the call stack",
            name
        ),
        json!({ "name": name, "depth": depth + 1 }),
    )?;
    enter_phase(name, InvocationPhase::ContextCreated);

    let outer = ctx.current_env();
    let env = ctx.environments.new_environment(name, outer);
    ctx.ctx_stack.push_execution_ctx(ExecutionContext {
        name: name.to_string(),
        function: Some(function),
        lex_env: env,
    });

    let result = run_function_body(name, function, env, outer, ctx);
    if result.is_err() {
        ctx.note_fault_site();
    }
    ctx.ctx_stack.pop_running_execution_ctx();
    result?;

    ctx.record(
        StepType::DestroyExecutionContext,
        format!(
            "Function '{}' finished; pop its execution context off the call stack",
            name
        ),
        json!({ "name": name, "depth": ctx.ctx_stack.depth() }),
    )?;
    enter_phase(name, InvocationPhase::ContextDestroyed);
    Ok(())
}

/// Looks the callee up in the heap's function table, then through a binding
/// that holds a function value. Failures fault before any frame is pushed.
fn resolve_callee(name: &str, ctx: &EvalContext) -> Result<FunctionId, JErrorType> {
    if let Some(function) = ctx.heap.get_function(name) {
        return Ok(function);
    }
    let value = match ctx.environments.resolve(ctx.current_env(), name) {
        None => return Err(JErrorType::not_defined(name)),
        Some((_, binding)) => match binding.get_value() {
            Some(value) => value,
            None => return Err(JErrorType::before_initialization(name)),
        },
    };
    match value {
        JsValue::Function(target) => ctx
            .heap
            .get_function(&target)
            .ok_or_else(|| JErrorType::not_a_function(name)),
        _ => Err(JErrorType::not_a_function(name)),
    }
}

fn run_function_body(
    name: &str,
    function: FunctionId,
    env: EnvId,
    outer: EnvId,
    ctx: &mut EvalContext,
) -> EvalResult {
    ctx.record(
        StepType::CreateLexicalEnvironment,
        format!("Create the lexical environment of '{}'", name),
        json!({ "name": name, "envId": env, "outerEnvId": outer }),
    )?;
    enter_phase(name, InvocationPhase::EnvCreated);

    let program = ctx.program;
    let body = match program.function(function) {
        Some(data) => &data.body,
        None => return Err(JErrorType::not_a_function(name)),
    };

    enter_phase(name, InvocationPhase::Hoisting);
    hoist_declarations(body, HoistingMode::FunctionBody, ctx)?;

    enter_phase(name, InvocationPhase::BodyExecuting);
    for stmt in body {
        execute_statement(stmt, ctx)?;
    }
    Ok(())
}
