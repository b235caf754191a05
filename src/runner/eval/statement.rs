//! Statement execution.
//!
//! Variable declarations, assignments and calls are executed. Control-flow
//! statements are parsed but inert: nothing inside them runs.

use serde_json::json;
use tracing::trace;

use crate::parser::ast::{
    AssignmentTarget, ExpressionType, HasMeta, IdentifierData, MemberExpressionData,
    StatementType, VariableDeclarationData,
};
use crate::runner::ds::env_record::Binding;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::heap::object_label;
use crate::runner::ds::step::StepType;
use crate::runner::ds::value::JsValue;

use super::expression::evaluate_expression;
use super::function::call_function;
use super::types::{EvalContext, EvalResult};

/// Execute a statement.
pub fn execute_statement(stmt: &StatementType, ctx: &mut EvalContext) -> EvalResult {
    match stmt {
        StatementType::VariableDeclaration(decl) => execute_variable_declaration(decl, ctx),

        StatementType::ExpressionStatement { expression, .. } => {
            execute_expression_statement(expression, ctx)
        }

        // Declarations are handled entirely by hoisting.
        StatementType::FunctionDeclaration { .. } => Ok(()),

        StatementType::BlockStatement { .. }
        | StatementType::IfStatement { .. }
        | StatementType::WhileStatement { .. }
        | StatementType::ForStatement { .. }
        | StatementType::ReturnStatement { .. }
        | StatementType::EmptyStatement { .. } => {
            trace!(start = stmt.get_meta().start_index, "inert statement");
            Ok(())
        }
    }
}

fn execute_variable_declaration(decl: &VariableDeclarationData, ctx: &mut EvalContext) -> EvalResult {
    for declarator in &decl.declarations {
        let init = match &declarator.init {
            Some(init) => init,
            None => continue,
        };
        let name = declarator.id.name.as_str();
        let value = evaluate_expression(init, ctx)?;
        let snapshot = ctx.snapshot(&value);
        ctx.record(
            StepType::AssignValue,
            format!("{} '{}' assigned: {}", decl.kind, name, value),
            json!({ "name": name, "value": snapshot }),
        )?;
        ctx.put_binding(name, Binding::initialized(value));
    }
    Ok(())
}

fn execute_expression_statement(expression: &ExpressionType, ctx: &mut EvalContext) -> EvalResult {
    match expression {
        ExpressionType::AssignmentExpression { left, right, .. } => match left {
            AssignmentTarget::Identifier(id) => assign_to_identifier(id, right, ctx),
            AssignmentTarget::Member(member) => assign_to_member(member, right, ctx),
        },

        ExpressionType::CallExpression {
            callee, arguments, ..
        } => match callee.as_ref() {
            ExpressionType::MemberExpression(member) => execute_log_call(member, arguments, ctx),
            ExpressionType::Identifier(id) => call_function(id, ctx),
            other => {
                trace!(callee = %other.describe(), "call with unsupported callee is inert");
                Ok(())
            }
        },

        other => {
            trace!(
                start = other.get_meta().start_index,
                "expression statement has no effect"
            );
            Ok(())
        }
    }
}

/// `x = value` binds `x` in the running context's own environment.
fn assign_to_identifier(
    id: &IdentifierData,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> EvalResult {
    let value = evaluate_expression(right, ctx)?;
    let snapshot = ctx.snapshot(&value);
    ctx.record(
        StepType::AssignValue,
        format!("Variable '{}' assigned: {}", id.name, value),
        json!({ "name": id.name, "value": snapshot }),
    )?;
    ctx.put_binding(&id.name, Binding::initialized(value));
    Ok(())
}

fn assign_to_member(
    member: &MemberExpressionData,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> EvalResult {
    let value = evaluate_expression(right, ctx)?;
    let base = evaluate_expression(&member.object, ctx)?;
    let property = member.property.name.as_str();
    let object_id = match &base {
        JsValue::Object(id) => *id,
        JsValue::Undefined | JsValue::Null => {
            return Err(JErrorType::TypeError(format!(
                "Cannot set properties of {} (setting '{}')",
                base, property
            )))
        }
        other => {
            return Err(JErrorType::TypeError(format!(
                "Cannot set properties of a {} value (setting '{}')",
                other.type_of(),
                property
            )))
        }
    };

    let label = object_label(object_id);
    let snapshot = ctx.snapshot(&value);
    ctx.record(
        StepType::AssignValue,
        format!("Property '{}' of {} changed: {}", property, label, value),
        json!({ "objectId": label, "property": property, "value": snapshot }),
    )?;
    if let Some(object) = ctx.heap.get_object_mut(object_id) {
        object.set_property(property, value);
    }
    Ok(())
}

/// Any call through a member callee is treated as `console.log`: only the
/// first argument is evaluated and logged.
fn execute_log_call(
    member: &MemberExpressionData,
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
) -> EvalResult {
    let callee = member
        .path()
        .unwrap_or_else(|| format!("<expression>.{}", member.property.name));
    ctx.record(
        StepType::ExecuteExpression,
        format!("Execute {}()", callee),
        json!({ "callee": callee }),
    )?;

    let value = match arguments.first() {
        Some(arg) => evaluate_expression(arg, ctx)?,
        None => JsValue::Undefined,
    };
    let text = value.to_string();
    let snapshot = ctx.snapshot(&value);
    ctx.record(
        StepType::LogOutput,
        format!("Log output: {}", text),
        json!({ "value": snapshot, "text": text }),
    )
}
