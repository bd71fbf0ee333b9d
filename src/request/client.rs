use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::cache::{QueryCache, QueryKey};
use super::mutation::Mutation;
use super::transport::{HttpRequest, Method, Transport};
use crate::auth::AuthContext;
use crate::error::RequestError;

type SharedFetch = Shared<BoxFuture<'static, Result<Value, RequestError>>>;

/// A read in flight and the cache generation it started under
#[derive(Clone)]
struct InFlight {
    generation: u64,
    fetch: SharedFetch,
}

/// Whether a read needs a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Public,
}

/// Outcome of a read
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// Not executed: private endpoint without a token, or a detail read without an id
    Disabled,
    Loading,
    Success(T),
    Error(RequestError),
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match self {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, QueryState::Disabled)
    }

    /// `Ok(None)` for reads that did not run
    pub fn into_result(self) -> Result<Option<T>, RequestError> {
        match self {
            QueryState::Success(data) => Ok(Some(data)),
            QueryState::Disabled | QueryState::Loading => Ok(None),
            QueryState::Error(err) => Err(err),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Disabled => QueryState::Disabled,
            QueryState::Loading => QueryState::Loading,
            QueryState::Success(data) => QueryState::Success(f(data)),
            QueryState::Error(err) => QueryState::Error(err),
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Loading
    }
}

/// Description of a cached read
#[derive(Debug, Clone)]
pub struct GetRequest<'a> {
    pub path: &'a str,
    pub query_key: &'a str,
    pub id: Option<&'a str>,
    pub visibility: Visibility,
}

impl<'a> GetRequest<'a> {
    pub fn new(path: &'a str, query_key: &'a str) -> Self {
        Self {
            path,
            query_key,
            id: None,
            visibility: Visibility::Private,
        }
    }

    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }
}

/// HTTP client with a keyed read cache and bearer-token injection.
///
/// Cheap to clone; clones share the cache, the in-flight table and the
/// auth context.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    auth: Arc<AuthContext>,
    cache: Arc<Mutex<QueryCache>>,
    in_flight: Arc<Mutex<HashMap<QueryKey, InFlight>>>,
}

impl ApiClient {
    pub fn new(
        base_url: impl AsRef<str>,
        transport: Arc<dyn Transport>,
        auth: Arc<AuthContext>,
        stale_time: Duration,
    ) -> Self {
        Self {
            base_url: Arc::from(base_url.as_ref().trim_end_matches('/')),
            transport,
            auth,
            cache: Arc::new(Mutex::new(QueryCache::new(stale_time))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Absolute URL for an endpoint path; absolute URLs pass through
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// `GET {path}` or `GET {path}/{id}`, cached under `(query_key, id)`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query_key: &str,
        id: Option<&str>,
    ) -> QueryState<T> {
        let mut request = GetRequest::new(path, query_key);
        request.id = id;
        self.fetch(request).await
    }

    pub async fn fetch<T: DeserializeOwned>(&self, request: GetRequest<'_>) -> QueryState<T> {
        let token = self.auth.token();

        if request.visibility == Visibility::Private && token.is_none() {
            debug!("query {} disabled: no session token", request.query_key);
            return QueryState::Disabled;
        }
        if matches!(request.id, Some(id) if id.trim().is_empty()) {
            debug!("query {} disabled: empty id", request.query_key);
            return QueryState::Disabled;
        }

        let key = QueryKey::new(request.query_key, request.id);
        let cached = self.cache.lock().await.get_fresh(&key);
        let value = match cached {
            Some(value) => {
                debug!("query {} served from cache", key);
                Ok(value)
            }
            None => {
                let url = match request.id {
                    Some(id) => format!("{}/{}", self.url(request.path), id),
                    None => self.url(request.path),
                };
                self.fetch_shared(key, url, token).await
            }
        };

        match value.and_then(|v| serde_json::from_value::<T>(v).map_err(RequestError::from)) {
            Ok(data) => QueryState::Success(data),
            Err(err) => QueryState::Error(err),
        }
    }

    /// Join an identical in-flight read or start a new one. A read that
    /// started before the latest invalidation of its name is never joined
    /// and never cached.
    async fn fetch_shared(
        &self,
        key: QueryKey,
        url: String,
        bearer: Option<String>,
    ) -> Result<Value, RequestError> {
        let shared = {
            let mut in_flight = self.in_flight.lock().await;
            let generation = self.cache.lock().await.generation(&key.name);

            match in_flight.get(&key) {
                Some(pending) if pending.generation == generation => {
                    debug!("query {} joined in-flight request", key);
                    pending.fetch.clone()
                }
                _ => {
                    let transport = Arc::clone(&self.transport);
                    let cache = Arc::clone(&self.cache);
                    let table = Arc::clone(&self.in_flight);
                    let entry_key = key.clone();

                    let fut = async move {
                        let request = HttpRequest::new(Method::Get, url.clone()).bearer(bearer);
                        let result = transport
                            .execute(request)
                            .await
                            .and_then(|response| {
                                debug!("GET {} -> {}", url, response.status);
                                response.into_result()
                            });

                        if let Ok(value) = &result {
                            cache
                                .lock()
                                .await
                                .insert_if_current(entry_key.clone(), value.clone(), generation);
                        }
                        let mut table = table.lock().await;
                        if table.get(&entry_key).is_some_and(|p| p.generation == generation) {
                            table.remove(&entry_key);
                        }
                        result
                    }
                    .boxed()
                    .shared();

                    in_flight.insert(key, InFlight { generation, fetch: fut.clone() });
                    fut
                }
            }
        };

        shared.await
    }

    /// Drop cached reads for a query name so the next read refetches.
    /// Reads still in flight for the name finish for their callers but
    /// are not cached.
    pub async fn invalidate(&self, query_key: &str) -> usize {
        let removed = self.cache.lock().await.invalidate(query_key);
        self.in_flight.lock().await.retain(|key, _| key.name != query_key);
        debug!("invalidated {} cached entries for {}", removed, query_key);
        removed
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        self.in_flight.lock().await.clear();
    }

    /// `POST {path}` with a JSON or multipart body
    pub fn post(&self, path: &str) -> Mutation {
        Mutation::new(self.clone(), Method::Post, self.url(path))
    }

    /// `PUT {path}` with a JSON or multipart body
    pub fn put(&self, path: &str) -> Mutation {
        Mutation::new(self.clone(), Method::Put, self.url(path))
    }

    /// `DELETE {path}/{id}`
    pub fn del(&self, path: &str) -> Mutation {
        Mutation::new(self.clone(), Method::Delete, self.url(path))
    }
}
