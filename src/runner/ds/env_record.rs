use tracing::trace;

use crate::runner::ds::value::JsValue;

/// Index of an environment record in [`Environments`].
pub type EnvId = usize;

pub const GLOBAL_ENV_ID: EnvId = 0;

/// A single name binding.
///
/// A binding starts uninitialized (in the temporal dead zone) when hoisted by
/// `let`/`const`, and becomes initialized exactly once. Afterwards its value
/// may still be overwritten by assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub initialized: bool,
    pub value: Option<JsValue>,
}

impl Binding {
    pub fn uninitialized() -> Self {
        Binding {
            initialized: false,
            value: None,
        }
    }

    pub fn initialized(value: JsValue) -> Self {
        Binding {
            initialized: true,
            value: Some(value),
        }
    }

    /// The readable value, `None` while in the TDZ.
    pub fn get_value(&self) -> Option<JsValue> {
        if self.initialized {
            Some(self.value.clone().unwrap_or(JsValue::Undefined))
        } else {
            None
        }
    }
}

pub struct DeclarativeEnvironmentRecord {
    name: String,
    outer: Option<EnvId>,
    bindings: Vec<(String, Binding)>,
}

impl DeclarativeEnvironmentRecord {
    fn new(name: String, outer: Option<EnvId>) -> Self {
        DeclarativeEnvironmentRecord {
            name,
            outer,
            bindings: Vec::new(),
        }
    }

    /// Name of the execution context that owns this record.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outer(&self) -> Option<EnvId> {
        self.outer
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.iter().any(|(n, _)| n == name)
    }

    pub fn get_binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }

    /// Inserts or replaces a binding, keeping the original declaration order
    /// when the name already exists.
    pub fn put_binding(&mut self, name: &str, binding: Binding) {
        match self.bindings.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = binding,
            None => self.bindings.push((name.to_string(), binding)),
        }
    }

    /// Bindings in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(n, b)| (n.as_str(), b))
    }
}

/// Arena of environment records.
///
/// Records are never freed during a run; a popped function frame only drops
/// its id from the execution context stack. Parent links are plain ids, so
/// the chain can be walked without shared ownership.
pub struct Environments {
    records: Vec<DeclarativeEnvironmentRecord>,
}

impl Environments {
    pub fn new(global_name: &str) -> Self {
        Environments {
            records: vec![DeclarativeEnvironmentRecord::new(global_name.to_string(), None)],
        }
    }

    pub fn new_environment(&mut self, name: &str, outer: EnvId) -> EnvId {
        self.records
            .push(DeclarativeEnvironmentRecord::new(name.to_string(), Some(outer)));
        self.records.len() - 1
    }

    pub fn get(&self, id: EnvId) -> Option<&DeclarativeEnvironmentRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: EnvId) -> Option<&mut DeclarativeEnvironmentRecord> {
        self.records.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Walks the parent chain starting at `from` and returns the first
    /// record that binds `name`, together with the binding.
    pub fn resolve(&self, from: EnvId, name: &str) -> Option<(EnvId, &Binding)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let record = self.records.get(id)?;
            if let Some(binding) = record.get_binding(name) {
                trace!(binding = name, env = id, "resolved binding");
                return Some((id, binding));
            }
            current = record.outer();
        }
        trace!(binding = name, from, "binding not found in scope chain");
        None
    }
}
