use serde_json::json;

use crate::cli::config::load_settings;
use crate::cli::{App, OutputFormat};
use crate::guard::Route;
use crate::report::{DashboardStats, MembershipReport, MembershipReportRow};
use crate::resources::{Group, Member, Membership, ResourceKind, Staff};

use super::fetch_list;
use super::resource::{build_view, output_rows, ViewArgs};

pub async fn dashboard(app: &App) -> anyhow::Result<()> {
    app.enter(&Route::Dashboard)?;

    let (members, staff, groups, memberships) = tokio::try_join!(
        fetch_list::<Member>(app, ResourceKind::Member),
        fetch_list::<Staff>(app, ResourceKind::Staff),
        fetch_list::<Group>(app, ResourceKind::Group),
        fetch_list::<Membership>(app, ResourceKind::Membership),
    )?;
    let stats = DashboardStats::from_collections(&members, &staff, &groups, &memberships);

    match app.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            let settings = load_settings()?;
            println!("{}", settings.gym_name);
            println!("Total members:      {}", stats.total_members);
            println!("Total staff:        {}", stats.total_staff);
            println!("Total groups:       {}", stats.total_groups);
            println!("Total memberships:  {}", stats.total_memberships);
        }
    }
    Ok(())
}

pub async fn membership(app: &App, args: &ViewArgs) -> anyhow::Result<()> {
    app.enter(&Route::MembershipReport)?;
    let view = build_view::<MembershipReportRow>(args)?;

    let (memberships, members) = tokio::try_join!(
        fetch_list::<Membership>(app, ResourceKind::Membership),
        fetch_list::<Member>(app, ResourceKind::Member),
    )?;
    let report = MembershipReport::build(&memberships, &members);
    let derived = view.derive(Some(report.rows.as_slice()));

    output_rows(
        app,
        "rows",
        "memberships to report",
        &view,
        &derived,
        json!({ "totalMembers": report.total_members() }),
        |_, value| value.display(),
    )
}
