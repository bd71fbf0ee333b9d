use chrono::{Local, NaiveDate};
use clap::Subcommand;
use serde_json::json;

use super::fetch_list;
use super::resource::{build_view, output_rows, ViewArgs};
use crate::attendance::{AttendanceEntry, AttendanceSheet, AttendanceStore};
use crate::cli::config::attendance_dir;
use crate::cli::utils::output_success;
use crate::cli::{App, OutputFormat};
use crate::guard::Route;
use crate::resources::{ResourceKind, Staff};

#[derive(Subcommand)]
pub enum AttendanceCommands {
    #[command(about = "Show the roster for a day")]
    Show {
        #[arg(long, help = "Date as YYYY-MM-DD (default: today)")]
        date: Option<NaiveDate>,
        #[command(flatten)]
        view: ViewArgs,
    },

    #[command(about = "Flip present/absent for staff members")]
    Toggle {
        #[arg(required = true, help = "Staff IDs")]
        ids: Vec<String>,
        #[arg(long, help = "Date as YYYY-MM-DD (default: today)")]
        date: Option<NaiveDate>,
    },
}

async fn open_sheet(app: &App, date: Option<NaiveDate>) -> anyhow::Result<(AttendanceStore, AttendanceSheet)> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let staff: Vec<Staff> = fetch_list(app, ResourceKind::Staff).await?;
    let store = AttendanceStore::new(attendance_dir()?);
    let sheet = store.open(date, &staff)?;
    Ok((store, sheet))
}

pub async fn handle(app: &App, cmd: AttendanceCommands) -> anyhow::Result<()> {
    app.enter(&Route::Attendance)?;

    match cmd {
        AttendanceCommands::Show { date, view } => {
            let view = build_view::<AttendanceEntry>(&view)?;
            let (_, sheet) = open_sheet(app, date).await?;
            let derived = view.derive(Some(sheet.entries.as_slice()));

            if let OutputFormat::Text = app.output {
                println!("Staff attendance for {} ({} present)", sheet.date, sheet.present_count());
            }
            output_rows(
                app,
                "entries",
                "staff on the roster",
                &view,
                &derived,
                json!({ "date": sheet.date, "present": sheet.present_count() }),
                |_, value| value.display(),
            )
        }
        AttendanceCommands::Toggle { ids, date } => {
            let (store, mut sheet) = open_sheet(app, date).await?;
            let mut changed = Vec::with_capacity(ids.len());
            for id in &ids {
                let present = sheet.toggle(id)?;
                changed.push(json!({ "id": id, "present": present }));
            }
            let path = store.save(&sheet)?;
            output_success(
                &app.output,
                &format!("Attendance updated for {} ({} present)", sheet.date, sheet.present_count()),
                Some(json!({ "changed": changed, "path": path })),
            )
        }
    }
}
