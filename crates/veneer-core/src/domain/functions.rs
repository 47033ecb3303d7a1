//! Engine-agnostic template function table.
//!
//! Functions are shared by every compiled template in the tree. They take
//! `serde_json::Value` arguments and return a value or a failure reason; the
//! engine adapter bridges them into the host engine's calling convention.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::error::DomainError;

/// A callable exposed to templates.
pub type TemplateFunction = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Mapping from function name to callable.
///
/// Duplicate registration is a fatal configuration error, detected eagerly
/// at insert time — two parts of an application silently fighting over one
/// function name is a deployment defect, not something to resolve at render.
#[derive(Clone, Default)]
pub struct FunctionTable {
    entries: HashMap<String, TemplateFunction>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `name`.
    pub fn insert(&mut self, name: String, function: TemplateFunction) -> Result<(), DomainError> {
        if self.entries.contains_key(&name) {
            return Err(DomainError::DuplicateFunction { name });
        }
        self.entries.insert(name, function);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TemplateFunction> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateFunction)> {
        self.entries.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// Registered names, sorted for deterministic diagnostics.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("names", &self.names())
            .finish()
    }
}
