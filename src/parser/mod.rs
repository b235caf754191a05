mod api;
pub mod ast;
#[cfg(test)]
mod unit_tests;

pub use api::{JsParser, ParseError, Rule};
