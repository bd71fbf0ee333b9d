use std::collections::BTreeMap;

use crate::request::FilePart;

/// Raw, unvalidated input of one form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    values: BTreeMap<String, String>,
    files: BTreeMap<String, FilePart>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.get(name)
    }

    pub fn attach(&mut self, name: impl Into<String>, part: FilePart) {
        self.files.insert(name.into(), part);
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.is_empty()) && self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.files.clear();
    }
}
