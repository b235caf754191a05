use std::fmt;
use std::fmt::{Display, Formatter};

/// Index of a function in [`Program::functions`].
pub type FunctionId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

pub trait HasMeta {
    fn get_meta(&self) -> &Meta;
}

/// A parsed script.
///
/// Function bodies are not nested inside the statements that declare them;
/// they live in the `functions` arena and are referenced by [`FunctionId`].
/// This keeps the tree free of back references so that the simulator can hold
/// plain ids in its heap instead of borrowed nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<StatementType>,
    pub functions: Vec<FunctionData>,
}

impl Program {
    pub fn function(&self, id: FunctionId) -> Option<&FunctionData> {
        self.functions.get(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierData {
    pub name: String,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionData {
    pub meta: Meta,
    pub id: Option<IdentifierData>,
    pub params: Vec<IdentifierData>,
    pub body: Vec<StatementType>,
}

impl FunctionData {
    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

impl VariableDeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableDeclarationKind::Var => "var",
            VariableDeclarationKind::Let => "let",
            VariableDeclarationKind::Const => "const",
        }
    }

    /// `let` and `const` bindings start out in the temporal dead zone.
    pub fn is_lexical(&self) -> bool {
        !matches!(self, VariableDeclarationKind::Var)
    }
}

impl Display for VariableDeclarationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaratorData {
    pub meta: Meta,
    pub id: IdentifierData,
    pub init: Option<ExpressionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationData {
    pub meta: Meta,
    pub kind: VariableDeclarationKind,
    pub declarations: Vec<VariableDeclaratorData>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariableDeclarationOrExpression {
    VariableDeclaration(VariableDeclarationData),
    Expression(ExpressionType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementType {
    FunctionDeclaration {
        meta: Meta,
        id: IdentifierData,
        function: FunctionId,
    },
    VariableDeclaration(VariableDeclarationData),
    ExpressionStatement {
        meta: Meta,
        expression: ExpressionType,
    },
    BlockStatement {
        meta: Meta,
        body: Vec<StatementType>,
    },
    IfStatement {
        meta: Meta,
        test: ExpressionType,
        consequent: Box<StatementType>,
        alternate: Option<Box<StatementType>>,
    },
    WhileStatement {
        meta: Meta,
        test: ExpressionType,
        body: Box<StatementType>,
    },
    ForStatement {
        meta: Meta,
        init: Option<VariableDeclarationOrExpression>,
        test: Option<ExpressionType>,
        update: Option<ExpressionType>,
        body: Box<StatementType>,
    },
    ReturnStatement {
        meta: Meta,
        argument: Option<ExpressionType>,
    },
    EmptyStatement {
        meta: Meta,
    },
}

impl HasMeta for StatementType {
    fn get_meta(&self) -> &Meta {
        match self {
            StatementType::FunctionDeclaration { meta, .. } => meta,
            StatementType::VariableDeclaration(data) => &data.meta,
            StatementType::ExpressionStatement { meta, .. } => meta,
            StatementType::BlockStatement { meta, .. } => meta,
            StatementType::IfStatement { meta, .. } => meta,
            StatementType::WhileStatement { meta, .. } => meta,
            StatementType::ForStatement { meta, .. } => meta,
            StatementType::ReturnStatement { meta, .. } => meta,
            StatementType::EmptyStatement { meta } => meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    NullLiteral,
    BooleanLiteral(bool),
    StringLiteral(String),
    NumberLiteral(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralData {
    pub meta: Meta,
    pub value: LiteralType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Identifier(String),
    StringLiteral(String),
    NumberLiteral(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyData {
    pub meta: Meta,
    pub key: PropertyKey,
    pub value: ExpressionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpressionData {
    pub meta: Meta,
    pub object: Box<ExpressionType>,
    pub property: IdentifierData,
}

impl MemberExpressionData {
    /// Dotted source path such as `console.log`, when the object side is a
    /// chain of plain identifiers.
    pub fn path(&self) -> Option<String> {
        let base = match &*self.object {
            ExpressionType::Identifier(id) => id.name.clone(),
            ExpressionType::MemberExpression(inner) => inner.path()?,
            _ => return None,
        };
        Some(format!("{}.{}", base, self.property.name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentTarget {
    Identifier(IdentifierData),
    Member(MemberExpressionData),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    StrictlyEqual,
    StrictlyUnequal,
    LooselyEqual,
    LooselyUnequal,
    LessThanEqual,
    GreaterThanEqual,
    LessThan,
    GreaterThan,
    LogicalAnd,
    LogicalOr,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionType {
    Literal(LiteralData),
    Identifier(IdentifierData),
    ObjectExpression {
        meta: Meta,
        properties: Vec<PropertyData>,
    },
    ArrayExpression {
        meta: Meta,
        elements: Vec<ExpressionType>,
    },
    MemberExpression(MemberExpressionData),
    AssignmentExpression {
        meta: Meta,
        left: AssignmentTarget,
        right: Box<ExpressionType>,
    },
    CallExpression {
        meta: Meta,
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
    FunctionExpression {
        meta: Meta,
        function: FunctionId,
    },
    UnaryExpression {
        meta: Meta,
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    BinaryExpression {
        meta: Meta,
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
}

impl HasMeta for ExpressionType {
    fn get_meta(&self) -> &Meta {
        match self {
            ExpressionType::Literal(data) => &data.meta,
            ExpressionType::Identifier(data) => &data.meta,
            ExpressionType::ObjectExpression { meta, .. } => meta,
            ExpressionType::ArrayExpression { meta, .. } => meta,
            ExpressionType::MemberExpression(data) => &data.meta,
            ExpressionType::AssignmentExpression { meta, .. } => meta,
            ExpressionType::CallExpression { meta, .. } => meta,
            ExpressionType::FunctionExpression { meta, .. } => meta,
            ExpressionType::UnaryExpression { meta, .. } => meta,
            ExpressionType::BinaryExpression { meta, .. } => meta,
        }
    }
}

impl ExpressionType {
    /// Short human readable rendering used in step details.
    pub fn describe(&self) -> String {
        match self {
            ExpressionType::Identifier(id) => id.name.clone(),
            ExpressionType::MemberExpression(member) => member
                .path()
                .unwrap_or_else(|| format!("<expression>.{}", member.property.name)),
            ExpressionType::Literal(lit) => match &lit.value {
                LiteralType::NullLiteral => "null".to_string(),
                LiteralType::BooleanLiteral(b) => b.to_string(),
                LiteralType::StringLiteral(s) => format!("{:?}", s),
                LiteralType::NumberLiteral(n) => n.to_string(),
            },
            ExpressionType::ObjectExpression { .. } => "{...}".to_string(),
            ExpressionType::ArrayExpression { .. } => "[...]".to_string(),
            ExpressionType::CallExpression { callee, .. } => format!("{}()", callee.describe()),
            ExpressionType::FunctionExpression { .. } => "function".to_string(),
            ExpressionType::AssignmentExpression { .. }
            | ExpressionType::UnaryExpression { .. }
            | ExpressionType::BinaryExpression { .. } => "<expression>".to_string(),
        }
    }
}
