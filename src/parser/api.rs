use std::time::Instant;

use pest::error::{Error, ErrorVariant, LineColLocation};
use pest::iterators::{Pair, Pairs};
use pest::{Parser, Span};
use pest_derive::Parser;
use thiserror::Error;
use tracing::debug;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/js_grammar.pest"] // relative to src
pub struct JsParser;

const TAB_WIDTH: usize = 2;

/// Malformed source. No trace is produced for a script that fails to parse.
#[derive(Debug, Error)]
#[error("{inner}")]
pub struct ParseError {
    inner: Box<Error<Rule>>,
}

impl ParseError {
    /// 1-based line and column where parsing failed.
    pub fn line_col(&self) -> (usize, usize) {
        match &self.inner.line_col {
            LineColLocation::Pos(pos) => *pos,
            LineColLocation::Span(start, _) => *start,
        }
    }
}

impl From<Error<Rule>> for ParseError {
    fn from(e: Error<Rule>) -> Self {
        ParseError { inner: Box::new(e) }
    }
}

impl JsParser {
    pub fn parse_to_ast(script: &str) -> Result<Program, ParseError> {
        let start = Instant::now();
        let mut pairs = JsParser::parse(Rule::script, script)?;
        let script_pair = match pairs.next() {
            Some(pair) => pair,
            None => return Err(ParseError::from(end_of_input_error(script))),
        };
        let mut builder = AstBuilder::default();
        let body = builder.build_ast_from_statement_list(script_pair.into_inner())?;
        debug!(
            statements = body.len(),
            functions = builder.functions.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "parsed script"
        );
        Ok(Program {
            body,
            functions: builder.functions,
        })
    }

    /// Indented dump of the raw pest token tree, for debugging grammar issues.
    pub fn parse_to_token_tree(script: &str) -> Result<String, ParseError> {
        let mut tree = vec![];
        for pair in JsParser::parse(Rule::script, script)? {
            tree.push(pair_to_string(pair, 0).join("\n"));
        }
        Ok(tree.join("\n"))
    }
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    tree.push(format!(
        "{}{:?} => ({},{}) #{:?}",
        " ".repeat(level * TAB_WIDTH),
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    ));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

fn get_meta(pair: &Pair<Rule>) -> Meta {
    let span = pair.as_span();
    Meta {
        start_index: span.start(),
        end_index: span.end(),
    }
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn end_of_input_error(script: &str) -> Error<Rule> {
    let message = "Unexpected end of input".to_string();
    match Span::new(script, script.len(), script.len()) {
        Some(span) => Error::new_from_span(ErrorVariant::CustomError { message }, span),
        None => Error::new_from_pos(
            ErrorVariant::CustomError { message },
            pest::Position::from_start(script),
        ),
    }
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_function | Rule::kw_if | Rule::kw_else | Rule::kw_while | Rule::kw_for | Rule::kw_return
    )
}

/// Children of `pair` without the keyword tokens the grammar keeps as pairs.
fn significant_children<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn expect_next<'i, I: Iterator<Item = Pair<'i, Rule>>>(
    iter: &mut I,
    id: i32,
    parent: &Pair<'i, Rule>,
) -> Result<Pair<'i, Rule>, Error<Rule>> {
    iter.next().ok_or_else(|| get_unexpected_error(id, parent))
}

#[derive(Default)]
struct AstBuilder {
    functions: Vec<FunctionData>,
}

impl AstBuilder {
    fn build_ast_from_statement_list(
        &mut self,
        pairs: Pairs<Rule>,
    ) -> Result<Vec<StatementType>, Error<Rule>> {
        let mut statements = vec![];
        for pair in pairs {
            match pair.as_rule() {
                Rule::EOI => { /* Do nothing */ }
                _ => statements.push(self.build_ast_from_statement(pair)?),
            }
        }
        Ok(statements)
    }

    fn build_ast_from_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        Ok(match pair.as_rule() {
            Rule::function_declaration => {
                let parent = pair.clone();
                let mut inner = significant_children(pair);
                let id = build_identifier(expect_next(&mut inner, 1, &parent)?);
                let params = expect_next(&mut inner, 2, &parent)?;
                let body = expect_next(&mut inner, 3, &parent)?;
                let function = self.build_function(meta, Some(id.clone()), params, body)?;
                StatementType::FunctionDeclaration { meta, id, function }
            }
            Rule::variable_statement => {
                StatementType::VariableDeclaration(self.build_ast_from_variable_statement(pair)?)
            }
            Rule::if_statement => {
                let parent = pair.clone();
                let mut inner = significant_children(pair);
                let test = self.build_ast_from_expression(expect_next(&mut inner, 4, &parent)?)?;
                let consequent =
                    Box::new(self.build_ast_from_statement(expect_next(&mut inner, 5, &parent)?)?);
                let alternate = match inner.next() {
                    Some(p) => Some(Box::new(self.build_ast_from_statement(p)?)),
                    None => None,
                };
                StatementType::IfStatement {
                    meta,
                    test,
                    consequent,
                    alternate,
                }
            }
            Rule::while_statement => {
                let parent = pair.clone();
                let mut inner = significant_children(pair);
                let test = self.build_ast_from_expression(expect_next(&mut inner, 6, &parent)?)?;
                let body =
                    Box::new(self.build_ast_from_statement(expect_next(&mut inner, 7, &parent)?)?);
                StatementType::WhileStatement { meta, test, body }
            }
            Rule::for_statement => self.build_ast_from_for_statement(pair)?,
            Rule::return_statement => {
                let argument = match significant_children(pair).next() {
                    Some(p) => Some(self.build_ast_from_expression(p)?),
                    None => None,
                };
                StatementType::ReturnStatement { meta, argument }
            }
            Rule::block_statement => StatementType::BlockStatement {
                meta,
                body: self.build_ast_from_statement_list(pair.into_inner())?,
            },
            Rule::empty_statement => StatementType::EmptyStatement { meta },
            Rule::expression_statement => {
                let parent = pair.clone();
                let mut inner = pair.into_inner();
                let expression = self.build_ast_from_expression(expect_next(&mut inner, 8, &parent)?)?;
                StatementType::ExpressionStatement { meta, expression }
            }
            _ => return Err(get_unexpected_error(9, &pair)),
        })
    }

    fn build_function(
        &mut self,
        meta: Meta,
        id: Option<IdentifierData>,
        params_pair: Pair<Rule>,
        body_pair: Pair<Rule>,
    ) -> Result<FunctionId, Error<Rule>> {
        let params = params_pair.into_inner().map(build_identifier).collect();
        let body = self.build_ast_from_statement_list(body_pair.into_inner())?;
        self.functions.push(FunctionData {
            meta,
            id,
            params,
            body,
        });
        Ok(self.functions.len() - 1)
    }

    fn build_ast_from_variable_statement(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<VariableDeclarationData, Error<Rule>> {
        let meta = get_meta(&pair);
        let parent = pair.clone();
        let mut inner = pair.into_inner();
        let kind = get_variable_kind(&expect_next(&mut inner, 10, &parent)?)?;
        let mut declarations = vec![];
        for var_pair in inner {
            if var_pair.as_rule() == Rule::variable_declaration {
                declarations.push(self.build_ast_from_variable_declaration(var_pair)?);
            } else {
                return Err(get_unexpected_error(11, &var_pair));
            }
        }
        Ok(VariableDeclarationData {
            meta,
            kind,
            declarations,
        })
    }

    fn build_ast_from_variable_declaration(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<VariableDeclaratorData, Error<Rule>> {
        let meta = get_meta(&pair);
        let parent = pair.clone();
        let mut inner = pair.into_inner();
        let id = build_identifier(expect_next(&mut inner, 12, &parent)?);
        let init = match inner.next() {
            Some(p) => Some(self.build_ast_from_expression(p)?),
            None => None,
        };
        Ok(VariableDeclaratorData { meta, id, init })
    }

    fn build_ast_from_for_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let parent = pair.clone();
        let mut inner = significant_children(pair);

        let init_pair = expect_next(&mut inner, 13, &parent)?;
        let init = match init_pair.clone().into_inner().next() {
            None => None,
            Some(first) if first.as_rule() == Rule::variable_kind => {
                let kind = get_variable_kind(&first)?;
                let mut declarations = vec![];
                for p in init_pair.clone().into_inner().skip(1) {
                    declarations.push(self.build_ast_from_variable_declaration(p)?);
                }
                Some(VariableDeclarationOrExpression::VariableDeclaration(
                    VariableDeclarationData {
                        meta: get_meta(&init_pair),
                        kind,
                        declarations,
                    },
                ))
            }
            Some(expr) => Some(VariableDeclarationOrExpression::Expression(
                self.build_ast_from_expression(expr)?,
            )),
        };
        let test = match expect_next(&mut inner, 14, &parent)?.into_inner().next() {
            Some(p) => Some(self.build_ast_from_expression(p)?),
            None => None,
        };
        let update = match expect_next(&mut inner, 15, &parent)?.into_inner().next() {
            Some(p) => Some(self.build_ast_from_expression(p)?),
            None => None,
        };
        let body = Box::new(self.build_ast_from_statement(expect_next(&mut inner, 16, &parent)?)?);
        Ok(StatementType::ForStatement {
            meta,
            init,
            test,
            update,
            body,
        })
    }

    fn build_ast_from_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        Ok(match pair.as_rule() {
            Rule::assignment_expression => {
                let parent = pair.clone();
                let mut inner = pair.into_inner();
                let target_pair = expect_next(&mut inner, 20, &parent)?;
                let target = self.build_ast_from_expression(target_pair.clone())?;
                let left = match target {
                    ExpressionType::Identifier(id) => AssignmentTarget::Identifier(id),
                    ExpressionType::MemberExpression(member) => AssignmentTarget::Member(member),
                    _ => {
                        return Err(Error::new_from_span(
                            ErrorVariant::CustomError {
                                message: "Invalid left-hand side in assignment".to_string(),
                            },
                            target_pair.as_span(),
                        ))
                    }
                };
                let right = Box::new(self.build_ast_from_expression(expect_next(&mut inner, 21, &parent)?)?);
                ExpressionType::AssignmentExpression { meta, left, right }
            }
            Rule::binary_expression => self.build_ast_from_binary_expression(pair)?,
            Rule::prefix_expression => {
                let parent = pair.clone();
                let mut inner = pair.into_inner();
                let op_pair = expect_next(&mut inner, 22, &parent)?;
                let operator = match op_pair.as_str() {
                    "!" => UnaryOperator::Not,
                    "-" => UnaryOperator::Minus,
                    "+" => UnaryOperator::Plus,
                    _ => return Err(get_unexpected_error(23, &op_pair)),
                };
                let argument = Box::new(self.build_ast_from_expression(expect_next(&mut inner, 24, &parent)?)?);
                ExpressionType::UnaryExpression {
                    meta,
                    operator,
                    argument,
                }
            }
            Rule::member_expression => self.build_ast_from_member_expression(pair)?,
            Rule::identifier => ExpressionType::Identifier(build_identifier(pair)),
            Rule::numeric_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::NumberLiteral(parse_numeric_literal(&pair)?),
            }),
            Rule::string_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::StringLiteral(parse_string_literal(&pair)),
            }),
            Rule::boolean_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::BooleanLiteral(pair.as_str() == "true"),
            }),
            Rule::null_literal => ExpressionType::Literal(LiteralData {
                meta,
                value: LiteralType::NullLiteral,
            }),
            Rule::object_literal => {
                let mut properties = vec![];
                for prop_pair in pair.into_inner() {
                    properties.push(self.build_ast_from_property_definition(prop_pair)?);
                }
                ExpressionType::ObjectExpression { meta, properties }
            }
            Rule::array_literal => {
                let mut elements = vec![];
                for element in pair.into_inner() {
                    elements.push(self.build_ast_from_expression(element)?);
                }
                ExpressionType::ArrayExpression { meta, elements }
            }
            Rule::function_expression => {
                let parent = pair.clone();
                let mut inner = significant_children(pair).peekable();
                let named = matches!(inner.peek(), Some(p) if p.as_rule() == Rule::identifier);
                let id = if named { inner.next().map(build_identifier) } else { None };
                let params = expect_next(&mut inner, 25, &parent)?;
                let body = expect_next(&mut inner, 26, &parent)?;
                let function = self.build_function(meta, id, params, body)?;
                ExpressionType::FunctionExpression { meta, function }
            }
            _ => return Err(get_unexpected_error(27, &pair)),
        })
    }

    fn build_ast_from_binary_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let parent = pair.clone();
        let mut inner = pair.into_inner();
        let mut left = self.build_ast_from_expression(expect_next(&mut inner, 30, &parent)?)?;
        // Operators fold left to right without precedence; the executor
        // never evaluates them, the tree only has to be well formed.
        while let Some(op_pair) = inner.next() {
            let operator = get_binary_operator(&op_pair)?;
            let right = self.build_ast_from_expression(expect_next(&mut inner, 31, &parent)?)?;
            let meta = Meta {
                start_index: left.get_meta().start_index,
                end_index: right.get_meta().end_index,
            };
            left = ExpressionType::BinaryExpression {
                meta,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn build_ast_from_member_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let parent = pair.clone();
        let mut inner = pair.into_inner();
        let mut obj = self.build_ast_from_expression(expect_next(&mut inner, 40, &parent)?)?;
        for suffix in inner {
            let meta = Meta {
                start_index: obj.get_meta().start_index,
                end_index: suffix.as_span().end(),
            };
            obj = match suffix.as_rule() {
                Rule::dot_property => {
                    let name_pair = expect_next(&mut suffix.clone().into_inner(), 41, &suffix)?;
                    ExpressionType::MemberExpression(MemberExpressionData {
                        meta,
                        object: Box::new(obj),
                        property: build_identifier(name_pair),
                    })
                }
                Rule::call_arguments => {
                    let mut arguments = vec![];
                    for arg in suffix.into_inner() {
                        arguments.push(self.build_ast_from_expression(arg)?);
                    }
                    ExpressionType::CallExpression {
                        meta,
                        callee: Box::new(obj),
                        arguments,
                    }
                }
                _ => return Err(get_unexpected_error(42, &suffix)),
            };
        }
        Ok(obj)
    }

    fn build_ast_from_property_definition(&mut self, pair: Pair<Rule>) -> Result<PropertyData, Error<Rule>> {
        let meta = get_meta(&pair);
        let parent = pair.clone();
        let mut inner = pair.into_inner();
        let key_pair = expect_next(&mut inner, 50, &parent)?;
        let key = match key_pair.as_rule() {
            Rule::identifier_name => PropertyKey::Identifier(key_pair.as_str().to_string()),
            Rule::string_literal => PropertyKey::StringLiteral(parse_string_literal(&key_pair)),
            Rule::numeric_literal => PropertyKey::NumberLiteral(parse_numeric_literal(&key_pair)?),
            _ => return Err(get_unexpected_error(51, &key_pair)),
        };
        let value = self.build_ast_from_expression(expect_next(&mut inner, 52, &parent)?)?;
        Ok(PropertyData { meta, key, value })
    }
}

fn build_identifier(pair: Pair<Rule>) -> IdentifierData {
    IdentifierData {
        name: pair.as_str().to_string(),
        meta: get_meta(&pair),
    }
}

fn get_variable_kind(pair: &Pair<Rule>) -> Result<VariableDeclarationKind, Error<Rule>> {
    Ok(match pair.as_str() {
        "var" => VariableDeclarationKind::Var,
        "let" => VariableDeclarationKind::Let,
        "const" => VariableDeclarationKind::Const,
        _ => return Err(get_unexpected_error(60, pair)),
    })
}

fn get_binary_operator(pair: &Pair<Rule>) -> Result<BinaryOperator, Error<Rule>> {
    Ok(match pair.as_str() {
        "===" => BinaryOperator::StrictlyEqual,
        "!==" => BinaryOperator::StrictlyUnequal,
        "==" => BinaryOperator::LooselyEqual,
        "!=" => BinaryOperator::LooselyUnequal,
        "<=" => BinaryOperator::LessThanEqual,
        ">=" => BinaryOperator::GreaterThanEqual,
        "<" => BinaryOperator::LessThan,
        ">" => BinaryOperator::GreaterThan,
        "&&" => BinaryOperator::LogicalAnd,
        "||" => BinaryOperator::LogicalOr,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Modulo,
        _ => return Err(get_unexpected_error(61, pair)),
    })
}

fn parse_numeric_literal(pair: &Pair<Rule>) -> Result<f64, Error<Rule>> {
    let text = pair.as_str();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        hex.chars()
            .map(|c| c.to_digit(16))
            .try_fold(0f64, |acc, d| d.map(|d| acc * 16.0 + d as f64))
            .filter(|_| !hex.is_empty())
    } else {
        text.parse::<f64>().ok()
    };
    parsed.ok_or_else(|| {
        Error::new_from_span(
            ErrorVariant::CustomError {
                message: format!("Invalid numeric literal '{}'", text),
            },
            pair.as_span(),
        )
    })
}

/// Unescapes the body of a string literal. The quotes are not part of the
/// inner `*_string_characters` pair.
fn parse_string_literal(pair: &Pair<Rule>) -> String {
    let raw = match pair.clone().into_inner().next() {
        Some(chars) => chars.as_str(),
        None => "",
    };
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
