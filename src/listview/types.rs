use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Header marker for the active column
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Asc => "^",
            SortDirection::Desc => "v",
        }
    }
}

/// Active sort column and direction for one list view
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    /// Header click: a new column sorts ascending, the active column flips
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flip();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

/// A record's value at one column, typed for ordering
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Empty,
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl AsRef<str>) -> Self {
        FieldValue::Text(value.as_ref().to_string())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => FieldValue::text(v),
            _ => FieldValue::Empty,
        }
    }

    pub fn number(value: impl Into<f64>) -> Self {
        FieldValue::Number(value.into())
    }

    /// Parse ISO-8601 timestamps or plain `YYYY-MM-DD` dates; anything
    /// else stays text
    pub fn date_str(value: Option<&str>) -> Self {
        let Some(raw) = value.filter(|v| !v.is_empty()) else {
            return FieldValue::Empty;
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return FieldValue::Date(dt.with_timezone(&Utc).naive_utc());
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return FieldValue::Date(date.and_hms_opt(0, 0, 0).unwrap_or_default());
        }
        FieldValue::text(raw)
    }

    /// Text that may hold a number; numeric strings order numerically
    pub fn numeric_str(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Number(n),
            _ => FieldValue::opt_text(Some(value)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Empty => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Date(_) => 2,
            FieldValue::Text(_) => 3,
        }
    }

    /// Total order: values of the same type compare naturally, mixed types
    /// by type rank, empty first
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Display text, also what search matches against
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d")),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of a record type's field accessor table
pub struct Column<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub get: fn(&R) -> FieldValue,
}

/// A record that can be shown in a sortable, searchable list
pub trait ListRecord: Sized + 'static {
    fn columns() -> &'static [Column<Self>];

    /// Every field search looks at. Defaults to the shown columns; records
    /// with fields the table leaves out list them here too.
    fn search_values(&self) -> Vec<FieldValue> {
        Self::columns().iter().map(|c| (c.get)(self)).collect()
    }

    fn column(key: &str) -> Option<&'static Column<Self>> {
        Self::columns().iter().find(|c| c.key.eq_ignore_ascii_case(key))
    }

    fn value(&self, key: &str) -> FieldValue {
        Self::column(key).map(|c| (c.get)(self)).unwrap_or(FieldValue::Empty)
    }
}
