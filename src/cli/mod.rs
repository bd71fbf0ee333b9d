pub mod commands;
pub mod config;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthContext, FileSessionStorage};
use crate::guard::{self, GuardOutcome, Route};
use crate::request::{ApiClient, ReqwestTransport};
use crate::resources::ResourceKind;

#[derive(Parser)]
#[command(name = "gymdesk")]
#[command(about = "Gymdesk CLI - members, staff, memberships and reports for your gym")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL (overrides GYMDESK_API_URL)")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, signup and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Show headline totals")]
    Dashboard,

    #[command(about = "List records with local search and sort")]
    List(commands::resource::ListArgs),

    #[command(about = "Show one record")]
    Show {
        #[arg(value_enum, help = "Resource type")]
        resource: ResourceKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from --set field=value pairs")]
    Add(commands::resource::AddArgs),

    #[command(about = "Update a category or membership")]
    Edit(commands::resource::EditArgs),

    #[command(about = "Delete a category or membership")]
    Delete {
        #[arg(value_enum, help = "Resource type")]
        resource: ResourceKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Export the derived list view as JSON")]
    Export(commands::resource::ExportArgs),

    #[command(about = "Staff attendance for a day")]
    Attendance {
        #[command(subcommand)]
        cmd: commands::attendance::AttendanceCommands,
    },

    #[command(about = "Members per membership type")]
    Report(commands::resource::ViewArgs),

    #[command(about = "View or update your profile")]
    Profile {
        #[command(subcommand)]
        cmd: commands::profile::ProfileCommands,
    },

    #[command(about = "Gym name and currency")]
    Settings {
        #[command(subcommand)]
        cmd: commands::settings::SettingsCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs: the API client (with its auth context) and
/// the output format
pub struct App {
    pub client: ApiClient,
    pub output: OutputFormat,
}

impl App {
    pub fn new(client: ApiClient, output: OutputFormat) -> Self {
        Self { client, output }
    }

    /// Wire the production client from configuration and resolve the session
    pub fn init(output: OutputFormat, api_url: Option<String>) -> anyhow::Result<Self> {
        let settings = crate::config::config();

        let storage = FileSessionStorage::new(config::session_file()?);
        let auth = AuthContext::new(storage)
            .with_storage_key(settings.session.storage_key.as_str())
            .with_expiry_validation(settings.session.validate_token_expiry);
        auth.load();

        let transport = ReqwestTransport::new(settings.api.connect_timeout_secs.map(Duration::from_secs))?;
        let base_url = match api_url {
            Some(url) => {
                url::Url::parse(&url).map_err(|e| anyhow!("Invalid API URL '{}': {}", url, e))?;
                url
            }
            None => settings.api.base_url.clone(),
        };

        let client = ApiClient::new(base_url, Arc::new(transport), Arc::new(auth), settings.cache.stale_time());
        Ok(Self::new(client, output))
    }

    /// Run the route's guard before building the screen
    pub fn enter(&self, route: &Route) -> anyhow::Result<()> {
        match guard::check(route, &self.client.auth().snapshot()) {
            GuardOutcome::Render => Ok(()),
            GuardOutcome::Placeholder => bail!("Session is still loading"),
            GuardOutcome::Redirect(Route::Login) => {
                bail!("Not logged in; run `gymdesk auth login` first (redirected to {})", Route::Login)
            }
            GuardOutcome::Redirect(Route::Dashboard) => {
                bail!("Already logged in; run `gymdesk auth logout` first (redirected to {})", Route::Dashboard)
            }
            GuardOutcome::Redirect(other) => bail!("Redirected to {}", other),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let app = App::init(output_format, cli.api_url)?;
    dispatch(&app, cli.command).await
}

pub async fn dispatch(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Auth { cmd } => commands::auth::handle(app, cmd).await,
        Commands::Dashboard => commands::report::dashboard(app).await,
        Commands::List(args) => commands::resource::list(app, args).await,
        Commands::Show { resource, id } => commands::resource::show(app, resource, &id).await,
        Commands::Add(args) => commands::resource::add(app, args).await,
        Commands::Edit(args) => commands::resource::edit(app, args).await,
        Commands::Delete { resource, id } => commands::resource::delete(app, resource, &id).await,
        Commands::Export(args) => commands::resource::export(app, args).await,
        Commands::Attendance { cmd } => commands::attendance::handle(app, cmd).await,
        Commands::Report(view) => commands::report::membership(app, &view).await,
        Commands::Profile { cmd } => commands::profile::handle(app, cmd).await,
        Commands::Settings { cmd } => commands::settings::handle(app, cmd).await,
    }
}
