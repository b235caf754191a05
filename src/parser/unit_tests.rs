use super::api::JsParser;
use super::api::Rule;
use super::ast::*;

use pest::consumes_to;
use pest::parses_to;
use pest::Parser;

fn parse(code: &str) -> Program {
    JsParser::parse_to_ast(code).unwrap()
}

fn first_expression(program: &Program) -> &ExpressionType {
    match &program.body[0] {
        StatementType::ExpressionStatement { expression, .. } => expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_numeric_literal_token() {
    parses_to! {
        parser: JsParser,
        input: "10.5",
        rule: Rule::numeric_literal,
        tokens: [
            numeric_literal(0, 4)
        ]
    };
}

#[test]
fn test_string_literal_tokens() {
    parses_to! {
        parser: JsParser,
        input: "'hi'",
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 4, [
                single_string_characters(1, 3)
            ])
        ]
    };
}

#[test]
fn test_identifier_rejects_reserved_words() {
    assert!(JsParser::parse(Rule::identifier, "var").is_err());
    assert!(JsParser::parse(Rule::identifier, "null").is_err());
    parses_to! {
        parser: JsParser,
        input: "variable",
        rule: Rule::identifier,
        tokens: [
            identifier(0, 8)
        ]
    };
}

#[test]
fn test_function_declaration_goes_to_arena() {
    let program = parse("function f() { var z = 2; }");
    assert_eq!(program.functions.len(), 1);
    match &program.body[0] {
        StatementType::FunctionDeclaration { id, function, .. } => {
            assert_eq!(id.name, "f");
            let data = program.function(*function).unwrap();
            assert_eq!(data.name(), Some("f"));
            assert_eq!(data.body.len(), 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_variable_statement_with_several_declarators() {
    let program = parse("let a = 1, b;");
    match &program.body[0] {
        StatementType::VariableDeclaration(decl) => {
            assert_eq!(decl.kind, VariableDeclarationKind::Let);
            assert_eq!(decl.declarations.len(), 2);
            assert_eq!(decl.declarations[0].id.name, "a");
            assert_eq!(
                decl.declarations[0].init,
                Some(ExpressionType::Literal(LiteralData {
                    meta: Meta {
                        start_index: 8,
                        end_index: 9
                    },
                    value: LiteralType::NumberLiteral(1.0),
                }))
            );
            assert!(decl.declarations[1].init.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_semicolons_are_optional() {
    let program = parse("var x = 1\nconsole.log(x)");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_member_call_expression() {
    let program = parse("console.log('a', b);");
    match first_expression(&program) {
        ExpressionType::CallExpression {
            callee, arguments, ..
        } => {
            assert_eq!(arguments.len(), 2);
            match callee.as_ref() {
                ExpressionType::MemberExpression(member) => {
                    assert_eq!(member.path(), Some("console.log".to_string()));
                }
                other => panic!("unexpected callee {:?}", other),
            }
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_member_assignment() {
    let program = parse("c.greeting = \"Hello\";");
    match first_expression(&program) {
        ExpressionType::AssignmentExpression { left, right, .. } => {
            match left {
                AssignmentTarget::Member(member) => assert_eq!(member.property.name, "greeting"),
                other => panic!("unexpected target {:?}", other),
            }
            match right.as_ref() {
                ExpressionType::Literal(lit) => {
                    assert_eq!(lit.value, LiteralType::StringLiteral("Hello".to_string()))
                }
                other => panic!("unexpected value {:?}", other),
            }
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_equality_is_not_assignment() {
    let program = parse("a == b;");
    assert!(matches!(
        first_expression(&program),
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::LooselyEqual,
            ..
        }
    ));
}

#[test]
fn test_object_literal_keys() {
    let program = parse("var o = { a: 1, 'b': 2, 3: x };");
    let init = match &program.body[0] {
        StatementType::VariableDeclaration(decl) => decl.declarations[0].init.as_ref().unwrap(),
        other => panic!("unexpected {:?}", other),
    };
    match init {
        ExpressionType::ObjectExpression { properties, .. } => {
            let keys: Vec<&PropertyKey> = properties.iter().map(|p| &p.key).collect();
            assert_eq!(
                keys,
                vec![
                    &PropertyKey::Identifier("a".to_string()),
                    &PropertyKey::StringLiteral("b".to_string()),
                    &PropertyKey::NumberLiteral(3.0),
                ]
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_literals() {
    let program = parse("x = 0x1F; y = 'it\\'s'; z = true; w = null;");
    let values: Vec<LiteralType> = program
        .body
        .iter()
        .map(|stmt| match stmt {
            StatementType::ExpressionStatement {
                expression: ExpressionType::AssignmentExpression { right, .. },
                ..
            } => match right.as_ref() {
                ExpressionType::Literal(lit) => lit.value.clone(),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(
        values,
        vec![
            LiteralType::NumberLiteral(31.0),
            LiteralType::StringLiteral("it's".to_string()),
            LiteralType::BooleanLiteral(true),
            LiteralType::NullLiteral,
        ]
    );
}

#[test]
fn test_wide_hex_literal_is_imprecise_number() {
    let program = parse("x = 0x10000000000000000;");
    match first_expression(&program) {
        ExpressionType::AssignmentExpression { right, .. } => match right.as_ref() {
            ExpressionType::Literal(lit) => {
                assert_eq!(lit.value, LiteralType::NumberLiteral(18446744073709551616.0))
            }
            other => panic!("unexpected {:?}", other),
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_control_flow_statements_parse() {
    let program = parse(
        "if (a) { b(); } else c();\n\
         while (x < 3) x = x + 1;\n\
         for (let i = 0; i < 2; i = i + 1) {}\n\
         for (;;) ;\n\
         function g() { return 1; }",
    );
    assert!(matches!(program.body[0], StatementType::IfStatement { .. }));
    assert!(matches!(program.body[1], StatementType::WhileStatement { .. }));
    assert!(matches!(program.body[2], StatementType::ForStatement { .. }));
    match &program.body[3] {
        StatementType::ForStatement {
            init, test, update, ..
        } => assert!(init.is_none() && test.is_none() && update.is_none()),
        other => panic!("unexpected {:?}", other),
    }
    let g = program.function(0).unwrap();
    assert!(matches!(g.body[0], StatementType::ReturnStatement { .. }));
}

#[test]
fn test_function_expression_gets_its_own_arena_slot() {
    let program = parse("var h = function named() {}; function f() {}");
    assert_eq!(program.functions.len(), 2);
    assert_eq!(program.function(0).unwrap().name(), Some("named"));
    assert_eq!(program.function(1).unwrap().name(), Some("f"));
}

#[test]
fn test_comments_are_skipped() {
    let program = parse("// leading\nvar a = 1; /* block */ var b;");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_syntax_errors() {
    assert!(JsParser::parse_to_ast("var = 1;").is_err());
    assert!(JsParser::parse_to_ast("console.log(").is_err());
    let err = JsParser::parse_to_ast("var a = 1;\nlet = ;").unwrap_err();
    assert_eq!(err.line_col().0, 2);
}

#[test]
fn test_invalid_assignment_target() {
    let err = JsParser::parse_to_ast("f() = 1;").unwrap_err();
    assert!(err.to_string().contains("Invalid left-hand side in assignment"));
}
