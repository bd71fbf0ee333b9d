use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::{fetch_detail, fetch_list, parse_assignment, with_record};
use crate::cli::utils::{output_empty_collection, output_form_errors, output_notice, render_table};
use crate::cli::{App, OutputFormat};
use crate::form::{schemas, Form, FormError, SubmitOutcome};
use crate::guard::Route;
use crate::cli::config::load_settings;
use crate::listview::{parse_sort, resolve_column, DerivedView, FieldValue, ListRecord, ListView};
use crate::notify::Notice;
use crate::request::FilePart;
use crate::resources::{MessageResponse, ResourceKind};

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    #[arg(long, help = "Case-insensitive search across all columns")]
    pub search: Option<String>,
    #[arg(long, help = "Sort expression, e.g. \"name desc\"")]
    pub sort: Option<String>,
    #[arg(long = "toggle", help = "Column header clicks, applied in order (repeatable)")]
    pub toggles: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(value_enum, help = "Resource type")]
    pub resource: ResourceKind,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(value_enum, help = "Resource type")]
    pub resource: ResourceKind,
    #[arg(help = "Output file path (stdout when omitted)")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(value_enum, help = "Resource type")]
    pub resource: ResourceKind,
    #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field value (repeatable)")]
    pub fields: Vec<String>,
    #[arg(long, help = "Image file to upload (members and staff)")]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[arg(value_enum, help = "Resource type")]
    pub resource: ResourceKind,
    #[arg(help = "Record ID")]
    pub id: String,
    #[arg(long = "set", value_name = "FIELD=VALUE", help = "Changed field value (repeatable)")]
    pub fields: Vec<String>,
}

/// Build the list screen's view state from the command line
pub(crate) fn build_view<R: ListRecord>(args: &ViewArgs) -> anyhow::Result<ListView> {
    let mut view = ListView::new();
    if let Some(expr) = &args.sort {
        view = view.with_sort(parse_sort::<R>(expr)?);
    }
    for column in &args.toggles {
        view.toggle_sort(resolve_column::<R>(column)?);
    }
    if let Some(search) = &args.search {
        view.set_search(search.as_str());
    }
    Ok(view)
}

pub async fn list(app: &App, args: ListArgs) -> anyhow::Result<()> {
    app.enter(&Route::List(args.resource))?;
    with_record!(args.resource, list_records(app, args.resource, &args.view))
}

async fn list_records<R>(app: &App, kind: ResourceKind, args: &ViewArgs) -> anyhow::Result<()>
where
    R: ListRecord + DeserializeOwned + Serialize,
{
    let view = build_view::<R>(args)?;
    let records: Vec<R> = fetch_list(app, kind).await?;
    let derived = view.derive(Some(records.as_slice()));

    let settings = match kind {
        ResourceKind::Membership => Some(load_settings()?),
        _ => None,
    };
    let cell = |key: &str, value: &FieldValue| match &settings {
        Some(settings) if key == "amount" => settings.format_amount(&value.display()),
        _ => value.display(),
    };

    output_rows(app, kind.list_key(), &format!("{} records", kind), &view, &derived, json!({}), cell)
}

/// Print a derived view as JSON or as a table with the sort marker on the
/// active header. `extra` fields are merged into the JSON object.
pub(crate) fn output_rows<R, F>(
    app: &App,
    collection: &str,
    noun: &str,
    view: &ListView,
    derived: &DerivedView<'_, R>,
    extra: Value,
    cell: F,
) -> anyhow::Result<()>
where
    R: ListRecord + Serialize,
    F: Fn(&str, &FieldValue) -> String,
{
    let (shown, total) = derived.counts();
    if shown == 0 {
        let message = if total == 0 {
            format!("No {}", noun)
        } else {
            format!("No {} match '{}' ({} total)", noun, view.search(), total)
        };
        return output_empty_collection(&app.output, collection, &message);
    }

    match app.output {
        OutputFormat::Json => {
            let mut body = json!({
                collection: derived.rows(),
                "shown": shown,
                "total": total,
                "sort": view.sort_state(),
                "search": view.search(),
            });
            if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
                body.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            let headers: Vec<String> = R::columns()
                .iter()
                .map(|c| match view.sort_state() {
                    s if s.is_active(c.key) => format!("{} {}", c.label, s.direction.indicator()),
                    _ => c.label.to_string(),
                })
                .collect();
            let rows: Vec<Vec<String>> = derived
                .rows()
                .iter()
                .map(|r| R::columns().iter().map(|c| cell(c.key, &(c.get)(r))).collect())
                .collect();
            println!("{}", render_table(&headers, &rows));
            println!("Showing {} of {} entries", shown, total);
        }
    }
    Ok(())
}

pub async fn export(app: &App, args: ExportArgs) -> anyhow::Result<()> {
    app.enter(&Route::List(args.resource))?;
    with_record!(args.resource, export_records(app, args.resource, &args))
}

async fn export_records<R>(app: &App, kind: ResourceKind, args: &ExportArgs) -> anyhow::Result<()>
where
    R: ListRecord + DeserializeOwned + Serialize,
{
    let view = build_view::<R>(&args.view)?;
    let records: Vec<R> = fetch_list(app, kind).await?;
    let derived = view.derive(Some(records.as_slice()));
    let content = serde_json::to_string_pretty(derived.rows())?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            output_notice(
                &app.output,
                &Notice::success(format!("Exported {} {} records to {}", derived.rows().len(), kind, path.display())),
                Some(json!({ "path": path, "count": derived.rows().len() })),
            )
        }
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

pub async fn show(app: &App, kind: ResourceKind, id: &str) -> anyhow::Result<()> {
    app.enter(&Route::List(kind))?;
    let record = fetch_detail(app, kind, id).await?;

    match app.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            if let Value::Object(fields) = &record {
                for (key, value) in fields.iter().filter(|(k, _)| !k.starts_with("__")) {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        Value::Object(o) => o.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
                        other => other.to_string(),
                    };
                    println!("{}: {}", key, text);
                }
            } else {
                println!("{}", record);
            }
        }
    }
    Ok(())
}

fn apply_fields(form: &mut Form, assignments: &[String]) -> anyhow::Result<()> {
    for raw in assignments {
        let (field, value) = parse_assignment(raw)?;
        form.set(field, value)?;
    }
    Ok(())
}

/// Submit a form; validation failures are printed field by field
pub(crate) async fn submit_form(
    app: &App,
    form: &mut Form,
    mutation: &crate::request::Mutation,
) -> anyhow::Result<SubmitOutcome> {
    match form.submit(mutation).await {
        Ok(outcome) => Ok(outcome),
        Err(err @ FormError::Invalid(_)) => {
            output_form_errors(&app.output, &err)?;
            bail!("{} was not submitted", form.schema().title);
        }
        Err(err) => Err(err.into()),
    }
}

/// Print a submit's notice and where the screen would go next
pub(crate) fn report_outcome(app: &App, outcome: SubmitOutcome) -> anyhow::Result<Option<MessageResponse>> {
    let data = json!({
        "navigate": outcome.navigate.as_ref().map(Route::path),
        "error_code": outcome.error.as_ref().map(|e| e.error_code()),
    });
    output_notice(&app.output, &outcome.notice, Some(data))?;

    match outcome.error {
        Some(err) => Err(anyhow::Error::new(err).context(outcome.notice.message)),
        None => Ok(outcome.response),
    }
}

pub(crate) async fn submit_and_report(
    app: &App,
    form: &mut Form,
    mutation: &crate::request::Mutation,
) -> anyhow::Result<Option<MessageResponse>> {
    let outcome = submit_form(app, form, mutation).await?;
    report_outcome(app, outcome)
}

pub async fn add(app: &App, args: AddArgs) -> anyhow::Result<()> {
    let kind = args.resource;
    app.enter(&Route::Add(kind))?;

    let mut form = Form::new(schemas::create(kind));
    apply_fields(&mut form, &args.fields)?;
    if let Some(path) = &args.image {
        let part = FilePart::from_path("image", path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        form.attach("image", part)?;
    }

    let mutation = app.client.post(kind.endpoints().create).invalidates([kind.list_key()]);
    submit_and_report(app, &mut form, &mutation).await?;
    Ok(())
}

pub async fn edit(app: &App, args: EditArgs) -> anyhow::Result<()> {
    let kind = args.resource;
    app.enter(&Route::Edit(kind, args.id.clone()))?;

    let schema = schemas::update(kind).ok_or_else(|| anyhow!("{} records cannot be edited", kind.label()))?;
    let update = kind
        .endpoints()
        .update
        .ok_or_else(|| anyhow!("{} records cannot be edited", kind.label()))?;

    let mut form = Form::new(schema);
    form.prefill(&fetch_detail(app, kind, &args.id).await?);
    apply_fields(&mut form, &args.fields)?;

    let detail_key = kind.detail_key();
    let mutation = app
        .client
        .put(&format!("{}/{}", update, args.id))
        .invalidates([kind.list_key(), detail_key.as_str()]);
    submit_and_report(app, &mut form, &mutation).await?;
    Ok(())
}

pub async fn delete(app: &App, kind: ResourceKind, id: &str) -> anyhow::Result<()> {
    app.enter(&Route::List(kind))?;
    let endpoint = kind
        .endpoints()
        .delete
        .ok_or_else(|| anyhow!("{} records cannot be deleted", kind.label()))?;

    let detail_key = kind.detail_key();
    let mutation = app
        .client
        .del(endpoint)
        .invalidates([kind.list_key(), detail_key.as_str()]);

    match mutation.mutate::<MessageResponse>(id).await {
        Ok(response) => {
            let message = response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("{} deleted successfully!", kind.label()));
            let notice = Notice::success(message);
            notice.log();
            output_notice(&app.output, &notice, Some(json!({ "id": id })))
        }
        Err(err) => {
            let notice = Notice::error(format!("Failed to delete {}!", kind));
            notice.log();
            output_notice(&app.output, &notice, Some(json!({ "error_code": err.error_code() })))?;
            Err(anyhow::Error::new(err).context(notice.message))
        }
    }
}
