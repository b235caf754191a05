//! Declaration hoisting.

use serde_json::json;
use tracing::trace;

use crate::parser::ast::{FunctionId, StatementType, VariableDeclarationData};
use crate::runner::ds::env_record::Binding;
use crate::runner::ds::step::StepType;
use crate::runner::ds::value::JsValue;

use super::types::{EvalContext, EvalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoistingMode {
    /// Function declarations and variables of the script.
    Global,
    /// Variables only. Nested function declarations are not hoisted.
    FunctionBody,
}

/// Registers the declarations found directly in `statements` with the
/// running context's environment, in source order.
///
/// Nested blocks are not searched.
pub fn hoist_declarations(
    statements: &[StatementType],
    mode: HoistingMode,
    ctx: &mut EvalContext,
) -> EvalResult {
    for stmt in statements {
        match stmt {
            StatementType::FunctionDeclaration { id, function, .. } => {
                if mode == HoistingMode::Global {
                    hoist_function(&id.name, *function, ctx)?;
                }
            }
            StatementType::VariableDeclaration(decl) => hoist_variables(decl, ctx)?,
            _ => {}
        }
    }
    Ok(())
}

fn hoist_function(name: &str, function: FunctionId, ctx: &mut EvalContext) -> EvalResult {
    ctx.record(
        StepType::AllocateHeapObject,
        format!("Store function '{}' in the Heap", name),
        json!({ "name": name }),
    )?;
    ctx.heap.allocate_function(name, function);

    let env_label = ctx.env_label(ctx.current_env());
    ctx.record(
        StepType::ReferenceVariable,
        format!("Register function '{}' in {}", name, env_label),
        json!({ "name": name }),
    )?;
    ctx.put_binding(name, Binding::initialized(JsValue::Function(name.to_string())));
    trace!(function = name, "hoisted function");
    Ok(())
}

fn hoist_variables(decl: &VariableDeclarationData, ctx: &mut EvalContext) -> EvalResult {
    let env_label = ctx.env_label(ctx.current_env());
    for declarator in &decl.declarations {
        let name = declarator.id.name.as_str();
        let lexical = decl.kind.is_lexical();
        let detail = if lexical {
            format!(
                "Hoist {} '{}' into {}: uninitialized (TDZ)",
                decl.kind, name, env_label
            )
        } else {
            format!("Hoist var '{}' into {} as undefined", name, env_label)
        };
        ctx.record(
            StepType::DeclareVariable,
            detail,
            json!({
                "name": name,
                "kind": decl.kind.as_str(),
                "initialized": !lexical,
            }),
        )?;
        let binding = if lexical {
            Binding::uninitialized()
        } else {
            Binding::initialized(JsValue::Undefined)
        };
        ctx.put_binding(name, binding);
    }
    Ok(())
}
