use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ListViewError {
    #[error("Unknown column: {column} (available: {available})")]
    UnknownColumn { column: String, available: String },

    #[error("Invalid sort direction: {0} (expected asc or desc)")]
    InvalidDirection(String),

    #[error("Invalid sort expression: {0}")]
    InvalidSort(String),
}
