use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_settings, save_settings};
use crate::cli::utils::output_success;
use crate::cli::{App, OutputFormat};
use crate::guard::Route;

#[derive(Subcommand)]
pub enum SettingsCommands {
    #[command(about = "Show gym settings")]
    Show,

    #[command(about = "Change gym settings")]
    Set {
        #[arg(long, help = "Gym name")]
        gym_name: Option<String>,
        #[arg(long, help = "Currency prefix for amounts, e.g. \"Rs.\"")]
        currency: Option<String>,
    },
}

pub async fn handle(app: &App, cmd: SettingsCommands) -> anyhow::Result<()> {
    app.enter(&Route::Settings)?;

    match cmd {
        SettingsCommands::Show => {
            let settings = load_settings()?;
            match app.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
                OutputFormat::Text => {
                    println!("Gym name: {}", settings.gym_name);
                    println!("Currency: {}", settings.currency);
                }
            }
            Ok(())
        }
        SettingsCommands::Set { gym_name, currency } => {
            let mut settings = load_settings()?;
            if let Some(name) = gym_name {
                settings.gym_name = name;
            }
            if let Some(currency) = currency {
                settings.currency = currency;
            }
            save_settings(&settings)?;
            output_success(&app.output, "Settings saved", Some(json!({ "settings": settings })))
        }
    }
}
