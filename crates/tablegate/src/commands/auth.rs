//! Login and logout commands.

use anyhow::Result;
use clap::Args;
use console::style;
use serde_json::json;
use tracing::info;

use super::Context;
use super::status::display_user;

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Authorization code returned by the Google consent screen
    #[arg(long)]
    pub code: String,
}

/// Arguments for the logout command.
#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Also discard the cached restaurant listing
    #[arg(long)]
    pub clear_cache: bool,
}

/// Run the login command.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let oracle = ctx.oracle(client.clone());

    let spinner = ctx.spinner("Signing in...");
    let result = oracle.login(args.code.trim()).await;
    spinner.finish_and_clear();

    let user = result?;
    ctx.save_session(&client)?;
    info!("Session saved");

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"success": true, "user": user}))?
        );
    } else {
        println!("{} Logged in as {}", style("✓").green(), display_user(&user));
    }
    Ok(())
}

/// Run the logout command.
///
/// The saved cookie is kept if the server did not acknowledge the logout.
pub async fn logout(args: LogoutArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let oracle = ctx.oracle(client);

    oracle.logout().await?;
    ctx.clear_session()?;

    if args.clear_cache {
        let cache = ctx.cache();
        cache.invalidate(&tablegate_cache::CacheKey::new(ctx.cache_config().key));
    }

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"success": true, "cache_cleared": args.clear_cache}))?
        );
    } else {
        println!("{} Logged out", style("✓").green());
        if args.clear_cache {
            println!("  Cached listing cleared");
        }
    }
    Ok(())
}
