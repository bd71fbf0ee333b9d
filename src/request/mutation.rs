use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::body::RequestBody;
use super::client::ApiClient;
use super::transport::{HttpRequest, Method};
use crate::error::RequestError;

/// Side effects run after a mutation settles. At most one of them fires,
/// and exactly one fires when it is set.
pub struct MutationCallbacks<'a, T> {
    on_success: Option<Box<dyn FnOnce(&T) + Send + 'a>>,
    on_error: Option<Box<dyn FnOnce(&RequestError) + Send + 'a>>,
}

impl<'a, T> Default for MutationCallbacks<'a, T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }
}

impl<'a, T> MutationCallbacks<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl FnOnce(&T) + Send + 'a) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&RequestError) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    fn settle(self, result: &Result<T, RequestError>) {
        match result {
            Ok(data) => {
                if let Some(f) = self.on_success {
                    f(data);
                }
            }
            Err(err) => {
                if let Some(f) = self.on_error {
                    f(err);
                }
            }
        }
    }
}

/// What a mutation is called with
#[derive(Debug, Clone, PartialEq)]
pub enum MutationInput {
    Body(RequestBody),
    /// Record id appended as a path segment (deletes)
    Id(String),
}

impl From<RequestBody> for MutationInput {
    fn from(body: RequestBody) -> Self {
        MutationInput::Body(body)
    }
}

impl From<Value> for MutationInput {
    fn from(value: Value) -> Self {
        MutationInput::Body(RequestBody::Json(value))
    }
}

impl From<&str> for MutationInput {
    fn from(id: &str) -> Self {
        MutationInput::Id(id.to_string())
    }
}

impl From<String> for MutationInput {
    fn from(id: String) -> Self {
        MutationInput::Id(id)
    }
}

/// Counts one call in flight; released on completion or when the call's
/// future is dropped
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A write bound to one endpoint, invoked on demand and never cached
#[derive(Clone)]
pub struct Mutation {
    client: ApiClient,
    method: Method,
    url: String,
    invalidates: Vec<String>,
    pending: Arc<AtomicUsize>,
}

impl Mutation {
    pub(crate) fn new(client: ApiClient, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            invalidates: Vec::new(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Query names whose cached reads are dropped after a successful call
    pub fn invalidates<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalidates.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True while at least one call is in flight
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub async fn mutate<T: DeserializeOwned>(
        &self,
        input: impl Into<MutationInput>,
    ) -> Result<T, RequestError> {
        self.mutate_with(input, MutationCallbacks::new()).await
    }

    pub async fn mutate_with<T: DeserializeOwned>(
        &self,
        input: impl Into<MutationInput>,
        callbacks: MutationCallbacks<'_, T>,
    ) -> Result<T, RequestError> {
        let pending = PendingGuard::enter(&self.pending);
        let result = self.execute(input.into()).await;
        drop(pending);

        if result.is_ok() {
            for key in &self.invalidates {
                self.client.invalidate(key).await;
            }
        }

        callbacks.settle(&result);
        result
    }

    async fn execute<T: DeserializeOwned>(&self, input: MutationInput) -> Result<T, RequestError> {
        let (url, body) = match input {
            MutationInput::Body(body) => (self.url.clone(), body),
            MutationInput::Id(id) => (format!("{}/{}", self.url, id), RequestBody::Empty),
        };

        let request = HttpRequest::new(self.method, url.clone())
            .bearer(self.client.auth().token())
            .body(body);

        let response = self.client.transport().execute(request).await?;
        debug!("{} {} -> {}", self.method.as_str(), url, response.status);

        let value = response.into_result()?;
        Ok(serde_json::from_value(value)?)
    }
}
