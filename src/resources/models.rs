use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::listview::{Column, FieldValue, ListRecord};

/// Accept ids and other scalars sent either as JSON strings or numbers
fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!("expected number, got {}", other))),
    }
}

/// Populated reference to another record (a membership's category, a
/// staff member's role). Unpopulated references arrive as a bare string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRef")]
pub struct NamedRef {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRef {
    Object {
        #[serde(default, rename = "_id", deserialize_with = "de_opt_text")]
        id: Option<String>,
        #[serde(default)]
        name: String,
    },
    Name(String),
}

fn de_opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    de_text(deserializer).map(|s| Some(s).filter(|s| !s.is_empty()))
}

impl From<RawRef> for NamedRef {
    fn from(raw: RawRef) -> Self {
        match raw {
            RawRef::Object { id, name } => NamedRef { id, name },
            RawRef::Name(name) => NamedRef { id: None, name },
        }
    }
}

fn ref_name(r: &Option<NamedRef>) -> FieldValue {
    FieldValue::opt_text(r.as_ref().map(|r| r.name.as_str()))
}

/// Shown columns followed by the fields the table leaves out
fn shown_and<R>(columns: &[Column<R>], record: &R, hidden: impl IntoIterator<Item = FieldValue>) -> Vec<FieldValue> {
    columns.iter().map(|c| (c.get)(record)).chain(hidden).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id", alias = "id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "de_text")]
    pub phone: String,
    #[serde(default, rename = "memberShipValidFrom", skip_serializing_if = "Option::is_none")]
    pub membership_valid_from: Option<String>,
    #[serde(default, rename = "memberShipValidTo", skip_serializing_if = "Option::is_none")]
    pub membership_valid_to: Option<String>,
    #[serde(default, rename = "memberShipName", skip_serializing_if = "Option::is_none")]
    pub membership_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

static MEMBER_COLUMNS: &[Column<Member>] = &[
    Column { key: "_id", label: "ID", get: |m| FieldValue::text(&m.id) },
    Column { key: "firstName", label: "First Name", get: |m| FieldValue::text(&m.first_name) },
    Column { key: "lastName", label: "Last Name", get: |m| FieldValue::text(&m.last_name) },
    Column { key: "email", label: "Email", get: |m| FieldValue::text(&m.email) },
    Column { key: "phone", label: "Phone", get: |m| FieldValue::text(&m.phone) },
    Column {
        key: "memberShipValidFrom",
        label: "Valid From",
        get: |m| FieldValue::date_str(m.membership_valid_from.as_deref()),
    },
    Column {
        key: "memberShipValidTo",
        label: "Valid To",
        get: |m| FieldValue::date_str(m.membership_valid_to.as_deref()),
    },
];

impl ListRecord for Member {
    fn columns() -> &'static [Column<Self>] {
        MEMBER_COLUMNS
    }

    fn search_values(&self) -> Vec<FieldValue> {
        shown_and(
            MEMBER_COLUMNS,
            self,
            [
                FieldValue::opt_text(self.membership_name.as_deref()),
                FieldValue::opt_text(self.group_name.as_deref()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(rename = "_id", alias = "id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<NamedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<NamedRef>,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "de_text")]
    pub phone: String,
}

static STAFF_COLUMNS: &[Column<Staff>] = &[
    Column { key: "_id", label: "ID", get: |s| FieldValue::text(&s.id) },
    Column { key: "name", label: "Name", get: |s| FieldValue::text(&s.name) },
    Column { key: "role", label: "Role", get: |s| ref_name(&s.role) },
    Column { key: "email", label: "Email", get: |s| FieldValue::text(&s.email) },
    Column { key: "phone", label: "Phone", get: |s| FieldValue::text(&s.phone) },
];

impl ListRecord for Staff {
    fn columns() -> &'static [Column<Self>] {
        STAFF_COLUMNS
    }

    fn search_values(&self) -> Vec<FieldValue> {
        shown_and(STAFF_COLUMNS, self, [ref_name(&self.specialization)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id", alias = "id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

static ROLE_COLUMNS: &[Column<Role>] = &[
    Column { key: "_id", label: "ID", get: |r| FieldValue::text(&r.id) },
    Column { key: "name", label: "Name", get: |r| FieldValue::text(&r.name) },
    Column { key: "description", label: "Description", get: |r| FieldValue::opt_text(r.description.as_deref()) },
];

impl ListRecord for Role {
    fn columns() -> &'static [Column<Self>] {
        ROLE_COLUMNS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    #[serde(rename = "_id", alias = "id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

static SPECIALIZATION_COLUMNS: &[Column<Specialization>] = &[
    Column { key: "_id", label: "ID", get: |s| FieldValue::text(&s.id) },
    Column { key: "name", label: "Name", get: |s| FieldValue::text(&s.name) },
    Column { key: "description", label: "Description", get: |s| FieldValue::opt_text(s.description.as_deref()) },
];

impl ListRecord for Specialization {
    fn columns() -> &'static [Column<Self>] {
        SPECIALIZATION_COLUMNS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(rename = "_id", alias = "id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub total_member: f64,
}

static GROUP_COLUMNS: &[Column<Group>] = &[
    Column { key: "_id", label: "ID", get: |g| FieldValue::text(&g.id) },
    Column { key: "name", label: "Name", get: |g| FieldValue::text(&g.name) },
    Column { key: "totalMember", label: "Total Members", get: |g| FieldValue::Number(g.total_member) },
];

impl ListRecord for Group {
    fn columns() -> &'static [Column<Self>] {
        GROUP_COLUMNS
    }

    fn search_values(&self) -> Vec<FieldValue> {
        shown_and(GROUP_COLUMNS, self, [FieldValue::opt_text(self.description.as_deref())])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

static CATEGORY_COLUMNS: &[Column<Category>] = &[
    Column { key: "_id", label: "ID", get: |c| FieldValue::text(&c.id) },
    Column { key: "name", label: "Name", get: |c| FieldValue::text(&c.name) },
];

impl ListRecord for Category {
    fn columns() -> &'static [Column<Self>] {
        CATEGORY_COLUMNS
    }

    fn search_values(&self) -> Vec<FieldValue> {
        shown_and(CATEGORY_COLUMNS, self, [FieldValue::opt_text(self.description.as_deref())])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(rename = "_id", alias = "id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Length in days; some endpoints send it as text
    #[serde(default, deserialize_with = "de_text")]
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<NamedRef>,
    #[serde(default, deserialize_with = "de_number")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

static MEMBERSHIP_COLUMNS: &[Column<Membership>] = &[
    Column { key: "_id", label: "ID", get: |m| FieldValue::text(&m.id) },
    Column { key: "name", label: "Name", get: |m| FieldValue::text(&m.name) },
    Column { key: "period", label: "Period", get: |m| FieldValue::numeric_str(&m.period) },
    Column { key: "category", label: "Category", get: |m| ref_name(&m.category) },
    Column { key: "amount", label: "Amount", get: |m| FieldValue::Number(m.amount) },
];

impl ListRecord for Membership {
    fn columns() -> &'static [Column<Self>] {
        MEMBERSHIP_COLUMNS
    }

    fn search_values(&self) -> Vec<FieldValue> {
        shown_and(MEMBERSHIP_COLUMNS, self, [FieldValue::opt_text(self.description.as_deref())])
    }
}

/// Signed-in user's own account details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "de_text")]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}
