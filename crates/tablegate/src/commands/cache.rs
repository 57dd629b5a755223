//! Cache command - inspect or clear the dataset cache.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use serde::Serialize;
use tablegate_cache::{CacheKey, is_fresh_at, remaining_millis};
use tablegate_core::{Clock, SystemClock, local_time_label};

use super::Context;

/// Arguments for the cache command.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show when the listing was fetched and whether it is still fresh
    Info,

    /// Discard the cached listing
    Clear,
}

#[derive(Debug, Serialize)]
struct CacheInfoOutput {
    key: String,
    present: bool,
    fetched_at: Option<i64>,
    fresh: bool,
    expires_in_secs: Option<i64>,
}

/// Run the cache command.
pub async fn run(args: CacheArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.cache();
    let config = ctx.cache_config();
    let key = CacheKey::new(config.key.clone());

    match args.command {
        CacheCommand::Info => {
            // Timestamp only; the listing itself is not decoded.
            let now = SystemClock.now_millis();
            let fetched_at = cache.fetched_at(&key);
            let ttl = config.ttl_millis();
            let fresh = fetched_at.is_some_and(|at| is_fresh_at(at, ttl, now));
            let expires_in_secs = fetched_at
                .filter(|_| fresh)
                .map(|at| remaining_millis(at, ttl, now) / 1000);

            if ctx.json_output {
                let output = CacheInfoOutput {
                    key: key.value_slot().to_string(),
                    present: fetched_at.is_some(),
                    fetched_at,
                    fresh,
                    expires_in_secs,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            let dim = Style::new().dim();
            println!();
            println!("{}", style("Dataset Cache").bold());
            println!("{}", dim.apply_to("─".repeat(40)));
            println!();
            println!("  {} {}", dim.apply_to("Key:"), key.value_slot());
            match fetched_at {
                Some(at) => {
                    println!("  {} {}", dim.apply_to("Fetched:"), local_time_label(at));
                    if let Some(secs) = expires_in_secs {
                        println!(
                            "  {} {} (expires in {}m {}s)",
                            dim.apply_to("State:"),
                            style("fresh").green(),
                            secs / 60,
                            secs % 60
                        );
                    } else {
                        println!("  {} {}", dim.apply_to("State:"), style("stale").yellow());
                    }
                }
                None => println!("  {} {}", dim.apply_to("State:"), style("empty").dim()),
            }
            println!();
        }
        CacheCommand::Clear => {
            cache.invalidate(&key);
            if ctx.json_output {
                println!("{}", serde_json::json!({"cleared": key.value_slot()}));
            } else {
                println!("{} Cleared {}", style("✓").green(), key.value_slot());
            }
        }
    }

    Ok(())
}
