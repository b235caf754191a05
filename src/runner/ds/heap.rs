//! Heap model for the simulator.
//!
//! The heap has two regions: the function table, filled by hoisting and
//! never shrunk, and an object arena for object literals. Nothing is ever
//! collected during a run.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Number, Value};

use crate::parser::ast::FunctionId;
use crate::runner::ds::value::{number_to_string, JsValue, ObjectId};

/// A plain object created from an object literal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsObject {
    properties: Vec<(String, JsValue)>,
}

impl JsObject {
    pub fn new() -> Self {
        JsObject::default()
    }

    /// Missing properties read as `undefined`, same as a property that was
    /// explicitly set to `undefined`.
    pub fn get_property(&self, key: &str) -> JsValue {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or(JsValue::Undefined)
    }

    pub fn set_property(&mut self, key: &str, value: JsValue) {
        match self.properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((key.to_string(), value)),
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &JsValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Default)]
pub struct Heap {
    functions: BTreeMap<String, FunctionId>,
    objects: Vec<JsObject>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    /// Stores a hoisted function declaration under its name. A later
    /// declaration with the same name replaces the earlier one.
    pub fn allocate_function(&mut self, name: &str, function: FunctionId) {
        self.functions.insert(name.to_string(), function);
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.functions.get(name).copied()
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|k| k.as_str())
    }

    pub fn allocate_object(&mut self) -> ObjectId {
        self.objects.push(JsObject::new());
        self.objects.len() - 1
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&JsObject> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut JsObject> {
        self.objects.get_mut(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Deep JSON copy of a value as it looks right now.
    ///
    /// `undefined` and `null` both become JSON `null`; objects are expanded
    /// recursively and a reference back into an object that is already being
    /// expanded is written as `"[Circular]"`.
    pub fn snapshot(&self, value: &JsValue) -> Value {
        let mut visiting = HashSet::new();
        self.snapshot_inner(value, &mut visiting)
    }

    fn snapshot_inner(&self, value: &JsValue, visiting: &mut HashSet<ObjectId>) -> Value {
        match value {
            JsValue::Undefined | JsValue::Null => Value::Null,
            JsValue::Boolean(b) => Value::Bool(*b),
            JsValue::String(s) => Value::String(s.clone()),
            JsValue::Number(n) => match Number::from_f64(*n) {
                Some(_) if n.fract() == 0.0 && n.abs() < 9.0e15 => Value::Number((*n as i64).into()),
                Some(num) => Value::Number(num),
                None => Value::String(number_to_string(*n)),
            },
            JsValue::Function(name) => Value::String(format!("[Function: {}]", name)),
            JsValue::Object(id) => {
                if !visiting.insert(*id) {
                    return Value::String("[Circular]".to_string());
                }
                let mut map = Map::new();
                if let Some(obj) = self.objects.get(*id) {
                    for (k, v) in obj.properties() {
                        map.insert(k.to_string(), self.snapshot_inner(v, visiting));
                    }
                }
                visiting.remove(id);
                Value::Object(map)
            }
        }
    }
}

/// Label used for object ids in step data.
pub fn object_label(id: ObjectId) -> String {
    format!("heap-{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_table() {
        let mut heap = Heap::new();
        heap.allocate_function("f", 0);
        heap.allocate_function("g", 1);
        assert_eq!(heap.get_function("g"), Some(1));
        assert_eq!(heap.get_function("h"), None);
        assert_eq!(heap.function_names().collect::<Vec<_>>(), vec!["f", "g"]);
    }

    #[test]
    fn test_missing_property_reads_undefined() {
        let mut heap = Heap::new();
        let id = heap.allocate_object();
        let obj = heap.get_object_mut(id).unwrap();
        obj.set_property("a", JsValue::Undefined);
        assert_eq!(obj.get_property("a"), JsValue::Undefined);
        assert_eq!(obj.get_property("b"), JsValue::Undefined);
    }

    #[test]
    fn test_snapshot_is_deep_and_detached() {
        let mut heap = Heap::new();
        let inner = heap.allocate_object();
        heap.get_object_mut(inner)
            .unwrap()
            .set_property("n", JsValue::Number(1.0));
        let outer = heap.allocate_object();
        heap.get_object_mut(outer)
            .unwrap()
            .set_property("inner", JsValue::Object(inner));

        let before = heap.snapshot(&JsValue::Object(outer));
        heap.get_object_mut(inner)
            .unwrap()
            .set_property("n", JsValue::Number(2.0));

        assert_eq!(before, json!({"inner": {"n": 1}}));
        assert_eq!(heap.snapshot(&JsValue::Object(outer)), json!({"inner": {"n": 2}}));
    }

    #[test]
    fn test_snapshot_marks_cycles() {
        let mut heap = Heap::new();
        let id = heap.allocate_object();
        heap.get_object_mut(id)
            .unwrap()
            .set_property("me", JsValue::Object(id));
        assert_eq!(heap.snapshot(&JsValue::Object(id)), json!({"me": "[Circular]"}));
    }

    #[test]
    fn test_snapshot_numbers() {
        let heap = Heap::new();
        assert_eq!(heap.snapshot(&JsValue::Number(2.0)), json!(2));
        assert_eq!(heap.snapshot(&JsValue::Number(2.5)), json!(2.5));
        assert_eq!(heap.snapshot(&JsValue::Number(f64::NAN)), json!("NaN"));
    }
}
