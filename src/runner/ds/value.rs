use std::fmt;
use std::fmt::{Display, Formatter};

use crate::parser::ast::LiteralType;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";

/// Id of an object in the simulated heap.
pub type ObjectId = usize;

/// A simulated JavaScript value.
///
/// Objects and functions are references: objects point into the heap's object
/// arena, functions are named entries of the heap's function table.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    String(String),
    Number(f64),
    Object(ObjectId),
    Function(String),
}

impl JsValue {
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => TYPE_STR_UNDEFINED,
            // typeof null is "object" in JavaScript
            JsValue::Null => TYPE_STR_OBJECT,
            JsValue::Boolean(_) => TYPE_STR_BOOLEAN,
            JsValue::String(_) => TYPE_STR_STRING,
            JsValue::Number(_) => TYPE_STR_NUMBER,
            JsValue::Object(_) => TYPE_STR_OBJECT,
            JsValue::Function(_) => TYPE_STR_FUNCTION,
        }
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            JsValue::Object(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<&LiteralType> for JsValue {
    fn from(lit: &LiteralType) -> Self {
        match lit {
            LiteralType::NullLiteral => JsValue::Null,
            LiteralType::BooleanLiteral(b) => JsValue::Boolean(*b),
            LiteralType::StringLiteral(s) => JsValue::String(s.clone()),
            LiteralType::NumberLiteral(n) => JsValue::Number(*n),
        }
    }
}

/// Renders values the way template-string interpolation would.
impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => f.write_str(TYPE_STR_UNDEFINED),
            JsValue::Null => f.write_str(TYPE_STR_NULL),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::String(s) => f.write_str(s),
            JsValue::Number(n) => f.write_str(&number_to_string(*n)),
            JsValue::Object(_) => f.write_str("[object Object]"),
            JsValue::Function(name) => write!(f, "[Function: {}]", name),
        }
    }
}

/// Number-to-string conversion following JavaScript's output format for the
/// common cases: integral values print without a fraction, `-0` prints as
/// `0`, and large exponents carry an explicit sign.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let s = format!("{:e}", n);
        match s.find('e') {
            Some(pos) if !s[pos + 1..].starts_with('-') => {
                format!("{}e+{}", &s[..pos], &s[pos + 1..])
            }
            _ => s,
        }
    } else {
        format!("{}", n)
    }
}
