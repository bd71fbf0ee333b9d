use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// Field name to message, for every field that failed
    #[error("Validation failed: {}", summarize(.0))]
    Invalid(BTreeMap<String, String>),

    #[error("Unknown field: {field} (available: {available})")]
    UnknownField { field: String, available: String },

    #[error("Field {0} takes a file; attach one instead of setting text")]
    FileField(String),

    #[error("Field {0} does not take a file")]
    NotAFileField(String),
}

impl FormError {
    /// Message for one field, if it failed
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            FormError::Invalid(errors) => errors.get(name).map(String::as_str),
            _ => None,
        }
    }
}

fn summarize(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}
