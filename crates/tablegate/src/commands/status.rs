//! Status command - shows whether the saved session is active.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use tablegate_core::SessionCheck;

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Status response for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    authenticated: bool,
    verified: bool,
    user: Option<serde_json::Value>,
    server_url: String,
    reason: Option<String>,
}

/// Run the status command.
pub async fn run(_args: StatusArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let server_url = client.base_url().to_string();
    let oracle = ctx.oracle(client);

    let spinner = ctx.spinner("Checking session...");
    let check = oracle.check().await;
    spinner.finish_and_clear();

    let (user, reason) = match &check {
        SessionCheck::Active(user) => (Some(user.clone()), None),
        SessionCheck::Inactive => (None, None),
        SessionCheck::Unverifiable(reason) => (None, Some(reason.clone())),
    };

    if ctx.json_output {
        let output = StatusOutput {
            authenticated: user.is_some(),
            verified: !check.is_unverifiable(),
            user,
            server_url,
            reason,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();

    println!();
    println!("{}", style("Session Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();
    match &check {
        SessionCheck::Active(_) => {
            println!("  {} {}", dim.apply_to("Session:"), style("● authenticated").green());
        }
        SessionCheck::Inactive => {
            println!("  {} {}", dim.apply_to("Session:"), style("● not logged in").red());
        }
        SessionCheck::Unverifiable(_) => {
            println!("  {} {}", dim.apply_to("Session:"), style("● could not verify").yellow());
        }
    }
    if let Some(user) = &user {
        println!("  {} {}", dim.apply_to("User:"), display_user(user));
    }
    println!("  {} {}", dim.apply_to("Server:"), server_url);
    if let Some(reason) = reason.filter(|_| ctx.verbose) {
        println!("  {} {}", dim.apply_to("Error:"), reason);
    }
    println!();

    if user.is_none() {
        println!("  {}", dim.apply_to("Log in with: tablegate login --code <CODE>"));
        println!();
    }

    Ok(())
}

/// Best-effort display of the opaque identity payload.
pub(crate) fn display_user(user: &serde_json::Value) -> String {
    match user {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => ["email", "name", "id"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| user.to_string()),
        serde_json::Value::Null => "(anonymous)".to_string(),
        other => other.to_string(),
    }
}
