use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::guard::Route;
use crate::resources::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// `YYYY-MM-DD` or RFC 3339 input, sent as ISO-8601 UTC with milliseconds
    Date,
    /// Binary attachment; forces a multipart request
    File,
}

/// A declarative check with the message shown when it fails
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    Required(&'static str),
    MinLength(usize, &'static str),
    Email(&'static str),
    /// Exactly `n` ASCII digits
    Digits(usize, &'static str),
    MinNumber(f64, &'static str),
}

impl FieldRule {
    pub fn message(&self) -> &'static str {
        match self {
            FieldRule::Required(m)
            | FieldRule::MinLength(_, m)
            | FieldRule::Email(m)
            | FieldRule::Digits(_, m)
            | FieldRule::MinNumber(_, m) => m,
        }
    }

    fn passes(&self, raw: &str) -> bool {
        match self {
            FieldRule::Required(_) => !raw.trim().is_empty(),
            FieldRule::MinLength(n, _) => raw.chars().count() >= *n,
            FieldRule::Email(_) => is_email(raw),
            FieldRule::Digits(n, _) => raw.len() == *n && raw.bytes().all(|b| b.is_ascii_digit()),
            FieldRule::MinNumber(min, _) => parse_number(raw).is_some_and(|v| v >= *min),
        }
    }
}

fn is_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !raw.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// ISO-8601 text the API expects for dates
pub(crate) fn format_date(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: &'static [FieldRule],
    /// Empty values skip the rules and are left out of the payload
    pub optional: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str, rules: &'static [FieldRule]) -> Self {
        Self { name, label, kind: FieldKind::Text, rules, optional: false }
    }

    pub const fn number(name: &'static str, label: &'static str, rules: &'static [FieldRule]) -> Self {
        Self { name, label, kind: FieldKind::Number, rules, optional: false }
    }

    pub const fn date(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Date, rules: &[], optional: false }
    }

    pub const fn file(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::File, rules: &[], optional: true }
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// First failing message for a raw text value
    pub fn check(&self, raw: &str) -> Option<String> {
        if raw.trim().is_empty() && self.optional {
            return None;
        }

        match self.kind {
            FieldKind::Number if parse_number(raw).is_none() => {
                return Some(if raw.trim().is_empty() {
                    format!("{} is required", self.label)
                } else {
                    format!("{} must be a number", self.label)
                });
            }
            FieldKind::Date if parse_date(raw).is_none() => {
                return Some(if raw.trim().is_empty() {
                    format!("{} is required", self.label)
                } else {
                    "Invalid date".to_string()
                });
            }
            _ => {}
        }

        self.rules
            .iter()
            .find(|rule| !rule.passes(raw))
            .map(|rule| rule.message().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

/// Everything one add/edit screen needs to validate, encode and report
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    pub title: &'static str,
    pub mode: FormMode,
    pub resource: Option<ResourceKind>,
    pub fields: &'static [FieldSpec],
    /// Where a successful submit navigates
    pub success_route: Route,
    /// Notice when the server sends no message of its own
    pub success_fallback: &'static str,
    pub failure_message: &'static str,
    /// Notice for a 409 response; `None` treats 409 like any other failure
    pub conflict_message: Option<String>,
    /// Show the server's error message instead of the generic one when present
    pub prefer_server_error: bool,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_files(&self) -> bool {
        self.fields.iter().any(|f| f.kind == FieldKind::File)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}
