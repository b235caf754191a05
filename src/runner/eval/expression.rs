//! Expression evaluation.
//!
//! Literals, identifiers, object literals and member access are evaluated.
//! Every other expression kind evaluates to `undefined` without recording a
//! step and without evaluating its sub-expressions.

use serde_json::json;
use tracing::trace;

use crate::parser::ast::{
    ExpressionType, HasMeta, LiteralData, MemberExpressionData, Meta, PropertyData, PropertyKey,
};
use crate::runner::ds::heap::object_label;
use crate::runner::ds::step::StepType;
use crate::runner::ds::value::JsValue;

use super::types::{EvalContext, ValueResult};

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),

        ExpressionType::Identifier(id) => ctx.get_binding_value(&id.name),

        ExpressionType::ObjectExpression { meta, properties } => {
            evaluate_object_expression(meta, properties, ctx)
        }

        ExpressionType::MemberExpression(member) => evaluate_member_expression(member, ctx),

        ExpressionType::ArrayExpression { .. }
        | ExpressionType::AssignmentExpression { .. }
        | ExpressionType::CallExpression { .. }
        | ExpressionType::FunctionExpression { .. }
        | ExpressionType::UnaryExpression { .. }
        | ExpressionType::BinaryExpression { .. } => {
            trace!(
                start = expr.get_meta().start_index,
                expression = %expr.describe(),
                "unsupported expression evaluates to undefined"
            );
            Ok(JsValue::Undefined)
        }
    }
}

fn evaluate_literal(lit: &LiteralData) -> JsValue {
    JsValue::from(&lit.value)
}

fn evaluate_object_expression(
    meta: &Meta,
    properties: &[PropertyData],
    ctx: &mut EvalContext,
) -> ValueResult {
    let object_id = ctx.heap.allocate_object();
    let label = object_label(object_id);
    ctx.record(
        StepType::AllocateHeapObject,
        format!("Create object literal {} in the Heap", label),
        json!({ "objectId": label }),
    )?;
    trace!(start = meta.start_index, object = %label, "allocated object");

    for property in properties {
        // Only identifier keys are initialized; other keys are skipped without
        // evaluating their values.
        let key = match &property.key {
            PropertyKey::Identifier(name) => name,
            PropertyKey::StringLiteral(_) | PropertyKey::NumberLiteral(_) => continue,
        };
        let value = evaluate_expression(&property.value, ctx)?;
        if let Some(object) = ctx.heap.get_object_mut(object_id) {
            object.set_property(key, value.clone());
        }
        let snapshot = ctx.snapshot(&value);
        ctx.record(
            StepType::AssignValue,
            format!("Initialize property '{}' of {}: {}", key, label, value),
            json!({ "objectId": label, "key": key, "value": snapshot }),
        )?;
    }
    Ok(JsValue::Object(object_id))
}

fn evaluate_member_expression(member: &MemberExpressionData, ctx: &mut EvalContext) -> ValueResult {
    let object = evaluate_expression(&member.object, ctx)?;
    let property = member.property.name.as_str();
    let described = member.object.describe();
    ctx.record(
        StepType::ExecuteExpression,
        format!("Access property '{}' of {}", property, described),
        json!({ "object": described, "property": property }),
    )?;
    Ok(read_property(&object, property, ctx))
}

/// Missing properties and non-object bases read as `undefined`.
pub fn read_property(base: &JsValue, property: &str, ctx: &EvalContext) -> JsValue {
    base.as_object_id()
        .and_then(|id| ctx.heap.get_object(id))
        .map(|object| object.get_property(property))
        .unwrap_or(JsValue::Undefined)
}
