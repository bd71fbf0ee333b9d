mod common;

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use common::{signed_in, FakeTransport};
use gymdesk::form::{schemas, Form, FormError};
use gymdesk::guard::Route;
use gymdesk::notify::Level;
use gymdesk::request::{ApiClient, Method, Mutation, QueryState, RequestBody};
use gymdesk::resources::ResourceKind;

const ADD_MEMBERSHIP: &str = "memberShipTypes/add-memberShip";
const MEMBERSHIPS: &str = "memberShipTypes/membership";

fn add_membership(api: &ApiClient) -> Mutation {
    let kind = ResourceKind::Membership;
    api.post(kind.endpoints().create).invalidates([kind.list_key()])
}

fn filled_membership_form() -> Result<Form> {
    let mut form = Form::new(schemas::create(ResourceKind::Membership));
    form.set("name", "Gold")?;
    form.set("categoryName", "Premium")?;
    form.set("period", "30")?;
    form.set("amount", "100")?;
    Ok(form)
}

#[tokio::test]
async fn duplicate_membership_keeps_the_draft() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Post, ADD_MEMBERSHIP, 409, json!({ "message": "duplicate key" }));
    let api = signed_in(transport.clone());

    let mut form = filled_membership_form()?;
    let outcome = form.submit(&add_membership(&api)).await?;

    assert!(!outcome.is_success());
    assert_eq!(outcome.notice.level, Level::Error);
    assert_eq!(outcome.notice.message, "Membership already exists");
    assert_eq!(outcome.navigate, None);
    assert!(!outcome.reset);
    assert_eq!(form.draft().get("name"), "Gold");
    assert_eq!(form.draft().get("amount"), "100");
    assert_eq!(transport.count(Method::Post, ADD_MEMBERSHIP), 1);
    Ok(())
}

#[tokio::test]
async fn successful_submit_resets_navigates_and_refreshes_list() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Get, MEMBERSHIPS, 200, json!({ "data": [] }));
    transport.respond(Method::Post, ADD_MEMBERSHIP, 201, json!({ "message": "Membership created" }));
    let api = signed_in(transport.clone());

    let _: QueryState<Value> = api.get(MEMBERSHIPS, ResourceKind::Membership.list_key(), None).await;

    let mut form = filled_membership_form()?;
    let outcome = form.submit(&add_membership(&api)).await?;

    assert!(outcome.is_success());
    assert_eq!(outcome.notice.level, Level::Success);
    assert_eq!(outcome.notice.message, "Membership created");
    assert_eq!(outcome.navigate, Some(Route::List(ResourceKind::Membership)));
    assert!(outcome.reset);
    assert!(form.draft().is_empty());

    let sent = transport.last().expect("request");
    assert_eq!(
        sent.body,
        RequestBody::Json(json!({ "name": "Gold", "categoryName": "Premium", "period": 30, "amount": 100 }))
    );

    // The list read was invalidated and refetches
    let _: QueryState<Value> = api.get(MEMBERSHIPS, ResourceKind::Membership.list_key(), None).await;
    assert_eq!(transport.count(Method::Get, MEMBERSHIPS), 2);
    Ok(())
}

#[tokio::test]
async fn server_error_shows_generic_failure() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::Post, ADD_MEMBERSHIP, 500, json!({ "message": "stack trace" }));
    let api = signed_in(transport.clone());

    let mut form = filled_membership_form()?;
    let outcome = form.submit(&add_membership(&api)).await?;

    assert_eq!(outcome.notice.message, "Failed to add membership");
    assert_eq!(outcome.error.and_then(|e| e.status_code()), Some(500));
    assert_eq!(form.draft().get("categoryName"), "Premium");
    Ok(())
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_network() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    let api = signed_in(transport.clone());

    let mut form = filled_membership_form()?;
    form.set("amount", "0")?;
    let err = form.submit(&add_membership(&api)).await.unwrap_err();

    assert!(matches!(err, FormError::Invalid(_)));
    assert_eq!(err.field("amount"), Some("Amount must be greater than 0"));
    assert!(transport.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn edit_form_puts_to_the_record_url() -> Result<()> {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(
        Method::Put,
        "memberShipTypes/update-category/c1",
        200,
        json!({ "message": "" }),
    );
    let api = signed_in(transport.clone());

    let mut form = Form::new(schemas::update(ResourceKind::Category).expect("category is editable"));
    form.prefill(&json!({ "_id": "c1", "name": "Premium", "description": "Top tier" }));
    form.set("description", "Top tier plans")?;

    let outcome = form.submit(&api.put("memberShipTypes/update-category/c1")).await?;
    assert!(outcome.is_success());
    // Empty server message falls back to the local text
    assert_eq!(outcome.notice.message, "Category updated successfully");
    assert_eq!(
        transport.last().map(|r| r.body),
        Some(RequestBody::Json(json!({ "name": "Premium", "description": "Top tier plans" })))
    );
    Ok(())
}
