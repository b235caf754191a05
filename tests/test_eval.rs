//! Tests for the evaluation engine on hand-built syntax trees.
//!
//! These tests drive the expression evaluator, the statement executor and
//! the hoisting pass directly, without going through the parser.

extern crate jsim;

use jsim::parser::ast::{
    AssignmentTarget, BinaryOperator, ExpressionType, IdentifierData, LiteralData, LiteralType,
    MemberExpressionData, Meta, Program, PropertyData, PropertyKey, StatementType,
    VariableDeclarationData, VariableDeclarationKind, VariableDeclaratorData,
};
use jsim::runner::config::SimulatorConfig;
use jsim::runner::ds::env_record::GLOBAL_ENV_ID;
use jsim::runner::ds::error::JErrorType;
use jsim::runner::ds::step::StepType;
use jsim::runner::ds::value::JsValue;
use jsim::runner::eval::expression::evaluate_expression;
use jsim::runner::eval::hoisting::{hoist_declarations, HoistingMode};
use jsim::runner::eval::statement::execute_statement;
use jsim::runner::eval::EvalContext;

/// Helper to create a simple meta for tests.
fn test_meta() -> Meta {
    Meta::default()
}

fn ident(name: &str) -> IdentifierData {
    IdentifierData {
        name: name.to_string(),
        meta: test_meta(),
    }
}

/// Helper to create a number literal expression.
fn num_expr(n: f64) -> ExpressionType {
    ExpressionType::Literal(LiteralData {
        meta: test_meta(),
        value: LiteralType::NumberLiteral(n),
    })
}

/// Helper to create a string literal expression.
fn str_expr(s: &str) -> ExpressionType {
    ExpressionType::Literal(LiteralData {
        meta: test_meta(),
        value: LiteralType::StringLiteral(s.to_string()),
    })
}

fn ident_expr(name: &str) -> ExpressionType {
    ExpressionType::Identifier(ident(name))
}

fn member(object: ExpressionType, property: &str) -> MemberExpressionData {
    MemberExpressionData {
        meta: test_meta(),
        object: Box::new(object),
        property: ident(property),
    }
}

fn object_expr(properties: Vec<(&str, ExpressionType)>) -> ExpressionType {
    ExpressionType::ObjectExpression {
        meta: test_meta(),
        properties: properties
            .into_iter()
            .map(|(k, v)| PropertyData {
                meta: test_meta(),
                key: PropertyKey::Identifier(k.to_string()),
                value: v,
            })
            .collect(),
    }
}

fn var_decl(kind: VariableDeclarationKind, name: &str, init: Option<ExpressionType>) -> StatementType {
    StatementType::VariableDeclaration(VariableDeclarationData {
        meta: test_meta(),
        kind,
        declarations: vec![VariableDeclaratorData {
            meta: test_meta(),
            id: ident(name),
            init,
        }],
    })
}

fn step_types(ctx: &EvalContext) -> Vec<StepType> {
    ctx.steps().iter().map(|s| s.step_type).collect()
}

#[test]
fn test_literals_record_nothing() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    assert_eq!(evaluate_expression(&num_expr(42.0), &mut ctx), Ok(JsValue::Number(42.0)));
    assert_eq!(
        evaluate_expression(&str_expr("hi"), &mut ctx),
        Ok(JsValue::String("hi".to_string()))
    );
    assert!(ctx.steps().is_empty());
}

#[test]
fn test_binary_expression_skips_its_operands() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    let expr = ExpressionType::BinaryExpression {
        meta: test_meta(),
        operator: BinaryOperator::Add,
        left: Box::new(ident_expr("unbound")),
        right: Box::new(object_expr(vec![("a", num_expr(1.0))])),
    };
    assert_eq!(evaluate_expression(&expr, &mut ctx), Ok(JsValue::Undefined));
    assert!(ctx.steps().is_empty());
    assert_eq!(ctx.heap.object_count(), 0);
}

#[test]
fn test_identifier_lookup_faults() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    assert_eq!(
        evaluate_expression(&ident_expr("x"), &mut ctx),
        Err(JErrorType::not_defined("x"))
    );

    hoist_declarations(
        &[var_decl(VariableDeclarationKind::Const, "x", Some(num_expr(1.0)))],
        HoistingMode::Global,
        &mut ctx,
    )
    .unwrap();
    assert_eq!(
        evaluate_expression(&ident_expr("x"), &mut ctx),
        Err(JErrorType::before_initialization("x"))
    );
}

#[test]
fn test_object_expression_allocates_then_assigns() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    let value = evaluate_expression(
        &object_expr(vec![("a", num_expr(1.0)), ("b", str_expr("two"))]),
        &mut ctx,
    )
    .unwrap();
    assert_eq!(value, JsValue::Object(0));
    assert_eq!(
        step_types(&ctx),
        vec![
            StepType::AllocateHeapObject,
            StepType::AssignValue,
            StepType::AssignValue
        ]
    );
    let object = ctx.heap.get_object(0).unwrap();
    assert_eq!(object.get_property("b"), JsValue::String("two".to_string()));
}

#[test]
fn test_member_access_on_primitive_is_undefined() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    let expr = ExpressionType::MemberExpression(member(num_expr(3.0), "x"));
    assert_eq!(evaluate_expression(&expr, &mut ctx), Ok(JsValue::Undefined));
    assert_eq!(step_types(&ctx), vec![StepType::ExecuteExpression]);
}

#[test]
fn test_var_initializer_binds_in_global_env() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    let stmts = vec![var_decl(VariableDeclarationKind::Var, "x", Some(num_expr(7.0)))];
    hoist_declarations(&stmts, HoistingMode::Global, &mut ctx).unwrap();
    for stmt in &stmts {
        execute_statement(stmt, &mut ctx).unwrap();
    }
    let record = ctx.environments.get(GLOBAL_ENV_ID).unwrap();
    assert_eq!(
        record.get_binding("x").and_then(|b| b.get_value()),
        Some(JsValue::Number(7.0))
    );
    assert_eq!(
        step_types(&ctx),
        vec![StepType::DeclareVariable, StepType::AssignValue]
    );
}

#[test]
fn test_member_assignment_writes_heap() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    let stmts = vec![
        var_decl(VariableDeclarationKind::Let, "o", Some(object_expr(vec![]))),
        StatementType::ExpressionStatement {
            meta: test_meta(),
            expression: ExpressionType::AssignmentExpression {
                meta: test_meta(),
                left: AssignmentTarget::Member(member(ident_expr("o"), "p")),
                right: Box::new(str_expr("v")),
            },
        },
    ];
    hoist_declarations(&stmts, HoistingMode::Global, &mut ctx).unwrap();
    for stmt in &stmts {
        execute_statement(stmt, &mut ctx).unwrap();
    }
    assert_eq!(
        ctx.heap.get_object(0).unwrap().get_property("p"),
        JsValue::String("v".to_string())
    );
}

#[test]
fn test_function_body_hoisting_skips_functions() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    let stmts = vec![
        StatementType::FunctionDeclaration {
            meta: test_meta(),
            id: ident("inner"),
            function: 0,
        },
        var_decl(VariableDeclarationKind::Let, "a", None),
    ];
    hoist_declarations(&stmts, HoistingMode::FunctionBody, &mut ctx).unwrap();
    assert_eq!(step_types(&ctx), vec![StepType::DeclareVariable]);
    assert_eq!(ctx.heap.get_function("inner"), None);

    hoist_declarations(&stmts, HoistingMode::Global, &mut ctx).unwrap();
    assert_eq!(ctx.heap.get_function("inner"), Some(0));
}

#[test]
fn test_inert_statements_record_nothing() {
    let program = Program::default();
    let config = SimulatorConfig::default();
    let mut ctx = EvalContext::new(&program, &config);
    let stmt = StatementType::WhileStatement {
        meta: test_meta(),
        test: ident_expr("missing"),
        body: Box::new(StatementType::EmptyStatement { meta: test_meta() }),
    };
    assert_eq!(execute_statement(&stmt, &mut ctx), Ok(()));
    assert!(ctx.steps().is_empty());
}
