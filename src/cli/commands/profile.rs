use clap::Subcommand;
use serde_json::json;

use super::{parse_assignment, settle};
use super::resource::submit_and_report;
use crate::cli::{App, OutputFormat};
use crate::form::{schemas, Form};
use crate::guard::Route;
use crate::resources::{user, Envelope, Profile};

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Show the signed-in user's details")]
    Show,

    #[command(about = "Update profile fields")]
    Update {
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "username, email, phone or address (repeatable)")]
        fields: Vec<String>,
    },
}

async fn fetch_profile(app: &App) -> anyhow::Result<Profile> {
    let state = app
        .client
        .get::<Envelope<Profile>>(user::DETAILS, user::PROFILE_KEY, None)
        .await;
    Ok(settle(state, "profile")?.data)
}

pub async fn handle(app: &App, cmd: ProfileCommands) -> anyhow::Result<()> {
    app.enter(&Route::Profile)?;

    match cmd {
        ProfileCommands::Show => {
            let profile = fetch_profile(app).await?;
            match app.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
                OutputFormat::Text => {
                    println!("Username: {}", profile.username);
                    println!("Email: {}", profile.email);
                    println!("Phone: {}", profile.phone);
                    println!("Address: {}", profile.address);
                }
            }
            Ok(())
        }
        ProfileCommands::Update { fields } => {
            let current = fetch_profile(app).await?;

            let mut form = Form::new(schemas::profile());
            form.prefill(&json!(current));
            for raw in &fields {
                let (field, value) = parse_assignment(raw)?;
                form.set(field, value)?;
            }

            let mutation = app.client.put(user::UPDATE_PROFILE).invalidates([user::PROFILE_KEY]);
            submit_and_report(app, &mut form, &mutation).await?;
            Ok(())
        }
    }
}
