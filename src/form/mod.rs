//! Schema-validated forms.
//!
//! A [`Form`] owns a [`Draft`] of raw text input. Fields are validated one at
//! a time on blur and all together on submit; a valid draft is encoded into a
//! JSON or multipart [`RequestBody`] and sent through a [`Mutation`]. The
//! draft survives every failed submit and is cleared only on success.

pub mod draft;
pub mod error;
pub mod schema;
pub mod schemas;

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use draft::Draft;
pub use error::FormError;
pub use schema::{FieldKind, FieldRule, FieldSpec, FormMode, FormSchema};

use crate::error::RequestError;
use crate::guard::Route;
use crate::notify::Notice;
use crate::request::{FilePart, Mutation, MultipartBody, RequestBody};
use crate::resources::MessageResponse;
use schema::{format_date, parse_date, parse_number};

/// What the screen does after a submit settles
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub notice: Notice,
    /// Set on success only
    pub navigate: Option<Route>,
    /// True when the draft was cleared
    pub reset: bool,
    pub response: Option<MessageResponse>,
    pub error: Option<RequestError>,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    schema: FormSchema,
    draft: Draft,
    errors: BTreeMap<String, String>,
}

impl Form {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            draft: Draft::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Messages from the latest blur or validate
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    fn spec(&self, name: &str) -> Result<&'static FieldSpec, FormError> {
        self.schema.field(name).ok_or_else(|| FormError::UnknownField {
            field: name.to_string(),
            available: self.schema.field_names().join(", "),
        })
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let spec = self.spec(name)?;
        if spec.kind == FieldKind::File {
            return Err(FormError::FileField(name.to_string()));
        }
        self.draft.set(name, value);
        Ok(())
    }

    pub fn attach(&mut self, name: &str, part: FilePart) -> Result<(), FormError> {
        let spec = self.spec(name)?;
        if spec.kind != FieldKind::File {
            return Err(FormError::NotAFileField(name.to_string()));
        }
        self.draft.attach(name, part);
        Ok(())
    }

    /// Seed the draft from an existing record (edit screens). Unknown keys
    /// are ignored; nested objects contribute their `name`.
    pub fn prefill(&mut self, record: &Value) {
        let Some(object) = record.as_object() else {
            return;
        };
        for spec in self.schema.fields.iter().filter(|f| f.kind != FieldKind::File) {
            let value = object
                .get(spec.name)
                .or_else(|| spec.name.strip_suffix("Name").and_then(|base| object.get(base)));
            let text = match value {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                Some(Value::Object(inner)) => match inner.get("name") {
                    Some(Value::String(s)) => s.clone(),
                    _ => continue,
                },
                _ => continue,
            };
            let text = match spec.kind {
                FieldKind::Date => parse_date(&text)
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or(text),
                _ => text,
            };
            self.draft.set(spec.name, text);
        }
    }

    /// Validate one field as it loses focus; returns its message, if any
    pub fn blur(&mut self, name: &str) -> Result<Option<String>, FormError> {
        let spec = self.spec(name)?;
        let message = self.check(spec);
        match &message {
            Some(m) => {
                self.errors.insert(name.to_string(), m.clone());
            }
            None => {
                self.errors.remove(name);
            }
        }
        Ok(message)
    }

    fn check(&self, spec: &FieldSpec) -> Option<String> {
        match spec.kind {
            FieldKind::File if spec.optional || self.draft.file(spec.name).is_some() => None,
            FieldKind::File => Some(format!("{} is required", spec.label)),
            _ => spec.check(self.draft.get(spec.name)),
        }
    }

    /// Validate every field; any failure blocks submission
    pub fn validate(&mut self) -> Result<(), FormError> {
        self.errors = self
            .schema
            .fields
            .iter()
            .filter_map(|spec| self.check(spec).map(|m| (spec.name.to_string(), m)))
            .collect();

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(self.errors.clone()))
        }
    }

    /// Validate and encode the draft
    pub fn payload(&mut self) -> Result<RequestBody, FormError> {
        self.validate()?;

        if self.schema.has_files() {
            let mut body = MultipartBody::default();
            for spec in self.schema.fields {
                if spec.kind == FieldKind::File {
                    if let Some(part) = self.draft.file(spec.name) {
                        body = body.file(FilePart { field: spec.name.to_string(), ..part.clone() });
                    }
                    continue;
                }
                if let Some(value) = self.encode(spec) {
                    let text = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    body = body.text(spec.name, text);
                }
            }
            return Ok(RequestBody::Multipart(body));
        }

        let mut object = Map::new();
        for spec in self.schema.fields {
            if let Some(value) = self.encode(spec) {
                object.insert(spec.name.to_string(), value);
            }
        }
        Ok(RequestBody::Json(Value::Object(object)))
    }

    /// Typed value of a validated field; `None` for empty optional fields
    fn encode(&self, spec: &FieldSpec) -> Option<Value> {
        let raw = self.draft.get(spec.name);
        if raw.trim().is_empty() && spec.optional {
            return None;
        }
        match spec.kind {
            FieldKind::Text => Some(Value::String(raw.to_string())),
            FieldKind::Number => parse_number(raw).map(number_value),
            FieldKind::Date => parse_date(raw).map(|dt| Value::String(format_date(&dt))),
            FieldKind::File => None,
        }
    }

    /// Validate, send, and map the result to notices and navigation.
    ///
    /// Validation failures return `Err` without touching the network.
    pub async fn submit(&mut self, mutation: &Mutation) -> Result<SubmitOutcome, FormError> {
        let body = self.payload()?;
        debug!("submitting {} to {}", self.schema.title, mutation.url());

        let outcome = match mutation.mutate::<MessageResponse>(body).await {
            Ok(response) => {
                let message = response
                    .message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| self.schema.success_fallback.to_string());
                self.reset();
                SubmitOutcome {
                    notice: Notice::success(message),
                    navigate: Some(self.schema.success_route.clone()),
                    reset: true,
                    response: Some(response),
                    error: None,
                }
            }
            Err(err) => {
                warn!("{} failed: {}", self.schema.title, err);
                SubmitOutcome {
                    notice: Notice::error(self.failure_message(&err)),
                    navigate: None,
                    reset: false,
                    response: None,
                    error: Some(err),
                }
            }
        };

        outcome.notice.log();
        Ok(outcome)
    }

    fn failure_message(&self, err: &RequestError) -> String {
        if err.is_conflict() {
            if let Some(message) = &self.schema.conflict_message {
                return message.clone();
            }
        }
        match err {
            RequestError::Status { message, .. } if self.schema.prefer_server_error && !message.is_empty() => {
                message.clone()
            }
            _ => self.schema.failure_message.to_string(),
        }
    }

    pub fn reset(&mut self) {
        self.draft.clear();
        self.errors.clear();
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;
    use serde_json::json;

    fn membership_form() -> Form {
        let mut form = Form::new(schemas::create(ResourceKind::Membership));
        form.set("name", "Gold").unwrap();
        form.set("categoryName", "Premium").unwrap();
        form.set("period", "30").unwrap();
        form.set("amount", "49.5").unwrap();
        form
    }

    #[test]
    fn blur_reports_and_clears_one_field() {
        let mut form = membership_form();
        form.set("name", "Go").unwrap();
        assert_eq!(
            form.blur("name").unwrap().as_deref(),
            Some("Name must be at least 3 characters")
        );
        assert!(form.errors().contains_key("name"));

        form.set("name", "Gold").unwrap();
        assert_eq!(form.blur("name").unwrap(), None);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn validate_collects_every_failure() {
        let mut form = Form::new(schemas::create(ResourceKind::Membership));
        let err = form.validate().unwrap_err();
        assert_eq!(err.field("categoryName"), Some("Category is required"));
        assert_eq!(err.field("period"), Some("Period is required"));
        assert_eq!(err.field("description"), None);
    }

    #[test]
    fn json_payload_coerces_numbers_and_omits_empty_optionals() {
        let mut form = membership_form();
        let body = form.payload().unwrap();
        assert_eq!(
            body,
            RequestBody::Json(json!({
                "name": "Gold", "categoryName": "Premium", "period": 30, "amount": 49.5
            }))
        );
    }

    #[test]
    fn member_payload_is_multipart_with_iso_dates() {
        let mut form = Form::new(schemas::create(ResourceKind::Member));
        for (k, v) in [
            ("firstName", "Amy"), ("lastName", "Lee"), ("gender", "female"),
            ("dateOfBirth", "1990-05-04"), ("groupName", "Morning"), ("phone", "01234567890"),
            ("email", "amy@gym.io"), ("weight", "60"), ("height", "170"), ("chest", "80"),
            ("waist", "70"), ("thigh", "50"), ("arms", "30"), ("fat", "20"),
            ("staffMemberName", "Dana"), ("memberShipName", "Gold"),
            ("memberShipValidFrom", "2024-01-01"), ("memberShipValidTo", "2024-12-31"),
        ] {
            form.set(k, v).unwrap();
        }
        form.attach("image", FilePart::new("upload", "amy.png", vec![1, 2, 3])).unwrap();

        let RequestBody::Multipart(body) = form.payload().unwrap() else {
            panic!("expected multipart");
        };
        assert_eq!(body.field("dateOfBirth"), Some("1990-05-04T00:00:00.000Z"));
        assert_eq!(body.field("weight"), Some("60"));
        assert_eq!(body.field("city"), None);
        assert_eq!(body.files.len(), 1);
        assert_eq!(body.files[0].field, "image");
    }

    #[test]
    fn file_and_text_fields_are_not_interchangeable() {
        let mut form = Form::new(schemas::create(ResourceKind::Staff));
        assert!(matches!(form.set("image", "x"), Err(FormError::FileField(_))));
        let part = FilePart::new("upload", "x.png", vec![0]);
        assert!(matches!(form.attach("firstName", part), Err(FormError::NotAFileField(_))));
        assert!(matches!(form.set("nope", "x"), Err(FormError::UnknownField { .. })));
    }

    #[test]
    fn prefill_reads_nested_names_and_dates() {
        let mut form = Form::new(schemas::update(ResourceKind::Membership).unwrap());
        form.prefill(&json!({
            "_id": "m1", "name": "Gold", "period": "30", "amount": 49,
            "category": { "_id": "c1", "name": "Premium" }
        }));
        assert_eq!(form.draft().get("categoryName"), "Premium");
        assert_eq!(form.draft().get("amount"), "49");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn conflict_message_only_for_conflicts() {
        let form = membership_form();
        let conflict = RequestError::Status { status: 409, message: "dup".into() };
        let server = RequestError::Status { status: 500, message: "boom".into() };
        assert_eq!(form.failure_message(&conflict), "Membership already exists");
        assert_eq!(form.failure_message(&server), "Failed to add membership");

        let login = Form::new(schemas::login());
        let denied = RequestError::Status { status: 401, message: "Invalid credentials".into() };
        assert_eq!(login.failure_message(&denied), "Invalid credentials");
        assert_eq!(login.failure_message(&RequestError::Network("down".into())), "An error occurred");
    }
}
