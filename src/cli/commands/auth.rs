use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;

use super::resource::{report_outcome, submit_and_report, submit_form};
use crate::auth::AuthState;
use crate::cli::utils::{output_notice, output_success};
use crate::cli::{App, OutputFormat};
use crate::form::{schemas, Form};
use crate::guard::Route;
use crate::notify::Notice;
use crate::resources::{user, MessageResponse};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the session token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "GYMDESK_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Register a new account")]
    Signup {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Phone number (11 digits)")]
        phone: String,
        #[arg(long, help = "Postal address")]
        address: String,
        #[arg(long, env = "GYMDESK_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Clear the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(app: &App, cmd: AuthCommands) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, email, password } => {
            app.enter(&Route::Login)?;

            let mut form = Form::new(schemas::login());
            form.set("username", username)?;
            form.set("email", email)?;
            form.set("password", password)?;

            let mutation = app.client.post(user::LOGIN);
            let outcome = submit_form(app, &mut form, &mutation).await?;
            if !outcome.is_success() {
                report_outcome(app, outcome)?;
                return Ok(());
            }

            let Some(token) = outcome.response.as_ref().and_then(MessageResponse::access_token) else {
                let notice = Notice::error("Login response did not include an access token");
                output_notice(&app.output, &notice, None)?;
                bail!(notice.message);
            };

            app.client.auth().login(token).context("Failed to store session token")?;
            app.client.clear_cache().await;
            report_outcome(app, outcome)?;
            Ok(())
        }
        AuthCommands::Signup { username, email, phone, address, password } => {
            app.enter(&Route::Signup)?;

            let mut form = Form::new(schemas::signup());
            form.set("username", username)?;
            form.set("email", email)?;
            form.set("phone", phone)?;
            form.set("address", address)?;
            form.set("password", password)?;

            let mutation = app.client.post(user::REGISTER);
            submit_and_report(app, &mut form, &mutation).await?;
            Ok(())
        }
        AuthCommands::Logout => {
            let next = app.client.auth().logout().context("Failed to clear session token")?;
            app.client.clear_cache().await;
            output_success(&app.output, "Logged out", Some(json!({ "navigate": next.path() })))
        }
        AuthCommands::Status => {
            let auth = app.client.auth();
            let claims = auth.claims();
            let authenticated = matches!(auth.state(), AuthState::Authenticated(_));

            match app.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "authenticated": authenticated,
                        "claims": claims,
                    }))?);
                }
                OutputFormat::Text => {
                    if !authenticated {
                        println!("Not logged in");
                        return Ok(());
                    }
                    println!("Logged in");
                    if let Some(claims) = claims {
                        if let Some(username) = claims.username {
                            println!("Username: {}", username);
                        }
                        if let Some(email) = claims.email {
                            println!("Email: {}", email);
                        }
                        if let Some(exp) = claims.exp.and_then(|e| chrono::DateTime::from_timestamp(e, 0)) {
                            println!("Expires: {}", exp.format("%Y-%m-%d %H:%M UTC"));
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
