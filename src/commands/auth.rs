//! Login, logout and session status.

use std::io::{self, BufRead, Write};

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, Context};
use crate::error::{AtriumError, Result};
use crate::session::{Credentials, FileSessionStore, login};

/// Read the password from stdin when it was not given as a flag.
fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn user_label(user: &serde_json::Value, fallback: &str) -> String {
    ["email", "name", "username"]
        .iter()
        .find_map(|key| user.get(key).and_then(|v| v.as_str()))
        .unwrap_or(fallback)
        .to_string()
}

pub async fn cmd_login(ctx: &Context, email: &str, password: Option<String>) -> Result<()> {
    if ctx.global.offline {
        return Err(AtriumError::Config(
            "login is not available with --offline".to_string(),
        ));
    }
    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };
    let credentials = Credentials::new(email, password);

    let client = ctx.config.http_client()?;
    let api = ctx.config.api_base()?;
    let response = login::login(&client, &api, &credentials, ctx.session()).await?;

    let who = user_label(&response.user, email);
    CommandOutput::new(json!({
        "action": "login",
        "success": true,
        "user": response.user,
    }))
    .with_text(format!("Logged in as {}", who.cyan()))
    .print(ctx.global.json)
}

pub fn cmd_logout(ctx: &Context) -> Result<()> {
    let was_logged_in = ctx.session().is_authenticated();
    ctx.session().logout()?;
    let text = if was_logged_in {
        "Logged out".to_string()
    } else {
        "Not logged in".dimmed().to_string()
    };
    CommandOutput::new(json!({
        "action": "logout",
        "was_logged_in": was_logged_in,
    }))
    .with_text(text)
    .print(ctx.global.json)
}

pub fn cmd_session(ctx: &Context) -> Result<()> {
    let session = ctx.session();
    let path = if ctx.global.offline {
        None
    } else {
        FileSessionStore::default_path().ok()
    };
    let user = session.user();

    let json_output = json!({
        "authenticated": session.is_authenticated(),
        "user": user,
        "saved_at": session.saved_at(),
        "session_file": path.as_ref().map(|p| p.to_string_lossy()),
        "api_url": ctx.config.api_url,
    });

    let mut text = String::new();
    match (&user, session.saved_at()) {
        (Some(user), saved_at) => {
            text.push_str(&format!(
                "{} {}\n",
                "Logged in as".green(),
                user_label(user, "unknown user")
            ));
            if let Some(saved_at) = saved_at {
                text.push_str(&format!("Since: {saved_at}\n"));
            }
        }
        (None, _) => text.push_str(&format!("{}\n", "Not logged in".yellow())),
    }
    text.push_str(&format!("API: {}", ctx.config.api_url));
    if let Some(path) = &path {
        text.push_str(&format!(
            "\n{}",
            format!("Session file: {}", path.display()).dimmed()
        ));
    }

    CommandOutput::new(json_output)
        .with_text(text)
        .print(ctx.global.json)
}
