pub mod attendance;
pub mod auth;
pub mod profile;
pub mod report;
pub mod resource;
pub mod settings;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cli::App;
use crate::error::RequestError;
use crate::request::QueryState;
use crate::resources::{Envelope, ResourceKind};

/// Run a generic function with the record type behind a resource kind
macro_rules! with_record {
    ($kind:expr, $f:ident($($arg:expr),* $(,)?)) => {
        match $kind {
            $crate::resources::ResourceKind::Member => $f::<$crate::resources::Member>($($arg),*).await,
            $crate::resources::ResourceKind::Staff => $f::<$crate::resources::Staff>($($arg),*).await,
            $crate::resources::ResourceKind::Role => $f::<$crate::resources::Role>($($arg),*).await,
            $crate::resources::ResourceKind::Specialization => {
                $f::<$crate::resources::Specialization>($($arg),*).await
            }
            $crate::resources::ResourceKind::Group => $f::<$crate::resources::Group>($($arg),*).await,
            $crate::resources::ResourceKind::Category => $f::<$crate::resources::Category>($($arg),*).await,
            $crate::resources::ResourceKind::Membership => {
                $f::<$crate::resources::Membership>($($arg),*).await
            }
        }
    };
}
pub(crate) use with_record;

/// Unwrap a read; a disabled read means there is no session
pub(crate) fn settle<T>(state: QueryState<T>, what: &str) -> anyhow::Result<T> {
    match state {
        QueryState::Success(data) => Ok(data),
        QueryState::Disabled => {
            Err(anyhow::Error::new(RequestError::Disabled).context(format!("Cannot load {}", what)))
        }
        QueryState::Loading => Err(anyhow!("{} is still loading", what)),
        QueryState::Error(err) if err.is_unauthorized() => Err(anyhow::Error::new(err)
            .context(format!("Failed to load {}; session rejected, run `gymdesk auth login`", what))),
        QueryState::Error(err) => Err(anyhow::Error::new(err).context(format!("Failed to load {}", what))),
    }
}

/// Fetch a resource's list through the query cache
pub(crate) async fn fetch_list<R: DeserializeOwned>(app: &App, kind: ResourceKind) -> anyhow::Result<Vec<R>> {
    let state = app
        .client
        .get::<Envelope<Vec<R>>>(kind.endpoints().list, kind.list_key(), None)
        .await;
    Ok(settle(state, kind.list_key())?.data)
}

/// Fetch one record as raw JSON, from the detail endpoint when there is one
pub(crate) async fn fetch_detail(app: &App, kind: ResourceKind, id: &str) -> anyhow::Result<Value> {
    if let Some(detail) = kind.endpoints().detail {
        let state = app
            .client
            .get::<Envelope<Value>>(detail, &kind.detail_key(), Some(id))
            .await;
        return Ok(settle(state, &format!("{} {}", kind, id))?.data);
    }

    let records: Vec<Value> = fetch_list(app, kind).await?;
    records
        .into_iter()
        .find(|r| record_id(r).as_deref() == Some(id))
        .ok_or_else(|| anyhow!("{} '{}' not found", kind.label(), id))
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("_id").or_else(|| record.get("id"))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Split `field=value`
pub(crate) fn parse_assignment(raw: &str) -> anyhow::Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| anyhow!("Expected field=value, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(parse_assignment("description=a=b").unwrap(), ("description", "a=b"));
        assert_eq!(parse_assignment("name=").unwrap(), ("name", ""));
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("name").is_err());
    }

    #[test]
    fn record_ids_may_be_numbers() {
        assert_eq!(record_id(&json!({ "_id": 7 })).as_deref(), Some("7"));
        assert_eq!(record_id(&json!({ "id": "x" })).as_deref(), Some("x"));
        assert_eq!(record_id(&json!({})), None);
    }
}
