mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::{json, Value};

use common::{client, signed_in, url, FakeTransport, TOKEN};
use gymdesk::error::RequestError;
use gymdesk::request::{GetRequest, Method, MutationCallbacks, QueryState, RequestBody};
use gymdesk::resources::{Category, Envelope, MessageResponse, ResourceKind};

const CATEGORIES: &str = "memberShipTypes/category-list";

fn categories() -> Value {
    json!({ "statusCode": 200, "data": [{ "_id": "c1", "name": "Premium" }], "success": true })
}

#[tokio::test]
async fn reads_are_cached_until_invalidated() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Get, CATEGORIES, 200, categories());
    let api = signed_in(transport.clone());

    let first: QueryState<Envelope<Vec<Category>>> = api.get(CATEGORIES, "categoryList", None).await;
    let second: QueryState<Envelope<Vec<Category>>> = api.get(CATEGORIES, "categoryList", None).await;
    assert_eq!(first.data().map(|e| e.data.len()), Some(1));
    assert_eq!(first, second);
    assert_eq!(transport.count(Method::Get, CATEGORIES), 1);

    assert_eq!(api.invalidate("categoryList").await, 1);
    let _: QueryState<Value> = api.get(CATEGORIES, "categoryList", None).await;
    assert_eq!(transport.count(Method::Get, CATEGORIES), 2);
    Ok(())
}

#[tokio::test]
async fn detail_reads_append_id_and_cache_per_id() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Get, "memberShipTypes/category/c1", 200, json!({ "data": { "_id": "c1", "name": "A" } }));
    transport.respond(Method::Get, "memberShipTypes/category/c2", 200, json!({ "data": { "_id": "c2", "name": "B" } }));
    let api = signed_in(transport.clone());

    let a: QueryState<Envelope<Category>> = api.get("memberShipTypes/category", "categoryDetail", Some("c1")).await;
    let b: QueryState<Envelope<Category>> = api.get("memberShipTypes/category", "categoryDetail", Some("c2")).await;
    assert_eq!(a.data().map(|e| e.data.name.as_str()), Some("A"));
    assert_eq!(b.data().map(|e| e.data.name.as_str()), Some("B"));

    // One invalidation drops every id under the name
    assert_eq!(api.invalidate("categoryDetail").await, 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_identical_reads_share_one_request() -> Result<()> {
    let transport = Arc::new(FakeTransport::new().with_delay(Duration::from_millis(50)));
    transport.respond(Method::Get, CATEGORIES, 200, categories());
    let api = signed_in(transport.clone());

    let (a, b, c) = tokio::join!(
        api.get::<Value>(CATEGORIES, "categoryList", None),
        api.get::<Value>(CATEGORIES, "categoryList", None),
        api.get::<Value>(CATEGORIES, "categoryList", None),
    );
    assert_eq!(transport.count(Method::Get, CATEGORIES), 1);
    assert_eq!(a, b);
    assert_eq!(b, c);
    Ok(())
}

#[tokio::test]
async fn private_reads_without_token_are_disabled() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Get, CATEGORIES, 200, categories());
    let api = client(transport.clone(), None);

    let state: QueryState<Value> = api.get(CATEGORIES, "categoryList", None).await;
    assert!(state.is_disabled());
    assert!(transport.requests().is_empty());

    // Public reads still run, without a bearer header
    let state: QueryState<Value> = api.fetch(GetRequest::new(CATEGORIES, "categoryList").public()).await;
    assert!(state.data().is_some());
    assert_eq!(transport.last().and_then(|r| r.bearer), None);
    Ok(())
}

#[tokio::test]
async fn detail_read_with_empty_id_is_disabled() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    let api = signed_in(transport.clone());
    let state: QueryState<Value> = api.get("memberShipTypes/category", "categoryDetail", Some("")).await;
    assert!(state.is_disabled());
    assert!(transport.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_reads_surface_status_and_are_not_cached() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Get, CATEGORIES, 500, json!({ "message": "db down" }));
    let api = signed_in(transport.clone());

    let state: QueryState<Value> = api.get(CATEGORIES, "categoryList", None).await;
    assert_eq!(
        state.error(),
        Some(&RequestError::Status { status: 500, message: "db down".into() })
    );
    let _: QueryState<Value> = api.get(CATEGORIES, "categoryList", None).await;
    assert_eq!(transport.count(Method::Get, CATEGORIES), 2);
    Ok(())
}

#[tokio::test]
async fn mutations_attach_bearer_and_invalidate() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Get, CATEGORIES, 200, categories());
    transport.respond(Method::Post, "memberShipTypes/add-category", 201, json!({ "message": "Category added" }));
    let api = signed_in(transport.clone());

    let _: QueryState<Value> = api.get(CATEGORIES, "categoryList", None).await;
    let mutation = api
        .post("memberShipTypes/add-category")
        .invalidates([ResourceKind::Category.list_key()]);
    let response: MessageResponse = mutation.mutate(json!({ "name": "Kids" })).await?;
    assert_eq!(response.message.as_deref(), Some("Category added"));

    let sent = transport.last().expect("request");
    assert_eq!(sent.bearer.as_deref(), Some(TOKEN));
    assert_eq!(sent.body, RequestBody::Json(json!({ "name": "Kids" })));

    let _: QueryState<Value> = api.get(CATEGORIES, "categoryList", None).await;
    assert_eq!(transport.count(Method::Get, CATEGORIES), 2);
    Ok(())
}

#[tokio::test]
async fn anonymous_mutation_has_no_bearer() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Post, "user/login", 200, json!({ "data": { "accessToken": "t" } }));
    let api = client(transport.clone(), None);

    let _: Value = api.post("user/login").mutate(json!({ "username": "amy" })).await?;
    assert_eq!(transport.last().and_then(|r| r.bearer), None);
    Ok(())
}

#[tokio::test]
async fn delete_appends_id_segment() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Delete, "memberShipTypes/delete-category/c9", 200, json!({ "message": "Deleted" }));
    let api = signed_in(transport.clone());

    let mutation = api.del("memberShipTypes/delete-category");
    let _: MessageResponse = mutation.mutate("c9").await?;
    let sent = transport.last().expect("request");
    assert_eq!(sent.url, url("memberShipTypes/delete-category/c9"));
    assert_eq!(sent.body, RequestBody::Empty);
    assert!(!mutation.is_pending());
    Ok(())
}

async fn run_with_callbacks(status: u16) -> (usize, usize, Option<RequestError>) {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Post, "group/add-group", status, json!({ "message": "server says" }));
    let api = signed_in(transport);

    let successes = AtomicUsize::new(0);
    let failures = AtomicUsize::new(0);
    let callbacks = MutationCallbacks::new()
        .on_success(|_: &MessageResponse| {
            successes.fetch_add(1, Ordering::SeqCst);
        })
        .on_error(|_| {
            failures.fetch_add(1, Ordering::SeqCst);
        });

    let result = api
        .post("group/add-group")
        .mutate_with(json!({ "name": "Morning" }), callbacks)
        .await;
    (successes.load(Ordering::SeqCst), failures.load(Ordering::SeqCst), result.err())
}

#[tokio::test]
async fn exactly_one_callback_fires() {
    assert_eq!(run_with_callbacks(200).await, (1, 0, None));

    let (ok, failed, err) = run_with_callbacks(409).await;
    assert_eq!((ok, failed), (0, 1));
    assert!(err.is_some_and(|e| e.is_conflict()));

    let (ok, failed, err) = run_with_callbacks(500).await;
    assert_eq!((ok, failed), (0, 1));
    assert_eq!(err.and_then(|e| e.status_code()), Some(500));
}

#[tokio::test]
async fn network_failure_is_an_error_callback_too() {
    let transport = Arc::new(FakeTransport::new());
    let api = signed_in(transport);
    let fired = AtomicUsize::new(0);

    let result: Result<Value, RequestError> = api
        .put("memberShipTypes/update-category/c1")
        .mutate_with(
            json!({}),
            MutationCallbacks::new()
                .on_success(|_| panic!("no success without a response"))
                .on_error(|e| {
                    assert!(matches!(e, RequestError::Network(_)));
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .await;
    assert!(result.is_err());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalidation_wins_over_a_read_in_flight() -> Result<()> {
    const GROUPS: &str = "group/group-list";
    let transport = Arc::new(FakeTransport::new().with_delay(Duration::from_millis(50)));
    transport.respond(Method::Get, GROUPS, 200, json!({ "data": [] }));
    let api = signed_in(transport.clone());

    let reader = api.clone();
    let early = tokio::spawn(async move { reader.get::<Value>(GROUPS, "groupList", None).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(api.invalidate("groupList").await, 0);

    // The early read still completes for its caller
    assert!(early.await?.data().is_some());

    // ...but its result was not cached, so this read goes to the network
    let _: QueryState<Value> = api.get(GROUPS, "groupList", None).await;
    assert_eq!(transport.count(Method::Get, GROUPS), 2);

    // and the fresh result is cached as usual
    let _: QueryState<Value> = api.get(GROUPS, "groupList", None).await;
    assert_eq!(transport.count(Method::Get, GROUPS), 2);
    Ok(())
}

#[tokio::test]
async fn abandoned_mutation_is_not_left_pending() -> Result<()> {
    let transport = Arc::new(FakeTransport::new().with_delay(Duration::from_millis(200)));
    transport.respond(Method::Post, "group/add-group", 200, json!({ "message": "ok" }));
    let api = signed_in(transport);

    let mutation = api.post("group/add-group");
    let call = mutation.mutate::<MessageResponse>(json!({ "name": "Morning" }));
    let timed_out = tokio::time::timeout(Duration::from_millis(20), call).await;
    assert!(timed_out.is_err());
    assert!(!mutation.is_pending());
    Ok(())
}
