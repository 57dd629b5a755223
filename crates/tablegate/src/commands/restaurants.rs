//! Restaurant listing and detail commands. Both are guarded routes.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use tablegate_client::{GateClient, Restaurant};
use tablegate_core::{
    Admission, DataViewController, Dataset, DetailView, Mount, NOT_FOUND_MESSAGE,
    NOT_FOUND_TITLE, RouteGuard, SessionOracle, local_time_label,
};

use super::Context;

/// Shown when the listing is empty.
const EMPTY_LISTING: &str = "No Restaurants Found";

/// Arguments for the restaurants command.
#[derive(Args, Debug)]
pub struct RestaurantsArgs {
    /// Discard the cached listing and fetch a new one
    #[arg(short, long)]
    pub refresh: bool,
}

/// Arguments for the show command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Restaurant id, or its position in the listing
    pub id: String,
}

/// One row of JSON output.
#[derive(Debug, Serialize)]
struct ListingItem<'a> {
    id: String,
    title: &'a str,
    price: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

impl<'a> ListingItem<'a> {
    fn new(index: usize, r: &'a Restaurant) -> Self {
        Self {
            id: r.route_id(index),
            title: &r.title,
            price: r.price_label(),
            description: r.description_label(),
            image: r.image.as_deref(),
        }
    }
}

/// Run the guard for a protected command. Errors out with the redirect
/// target when the session is not active; otherwise returns the view's
/// liveness flag.
async fn admit(ctx: &Context, client: GateClient) -> Result<Mount> {
    let oracle: SessionOracle<GateClient> = ctx.oracle(client);
    let guard = RouteGuard::new(ctx.config.entry_point());

    let spinner = ctx.spinner("Checking session...");
    let admission = guard.protect(&oracle, || guard.mount().clone()).await;
    spinner.finish_and_clear();

    match admission {
        Admission::Render(mount) => Ok(mount),
        Admission::Redirect(to) => {
            bail!("Not logged in (redirecting to {}). Run: tablegate login --code <CODE>", to)
        }
        Admission::Loading => bail!("Session check did not complete"),
    }
}

/// Run the restaurants command.
pub async fn list(args: RestaurantsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mount = admit(ctx, client.clone()).await?;

    let view =
        DataViewController::new(client, ctx.cache(), &ctx.cache_config()).with_mount(mount);

    let spinner = ctx.spinner("Loading restaurants...");
    let result = view.load_dataset(args.refresh).await;
    spinner.finish_and_clear();

    let restaurants = match result {
        Ok(restaurants) => restaurants,
        Err(e) => bail!("{}. Retry with: tablegate restaurants --refresh", e.reason()),
    };
    let snapshot = view.snapshot();

    if ctx.json_output {
        let items: Vec<_> = restaurants
            .iter()
            .enumerate()
            .map(|(i, r)| ListingItem::new(i, r))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "restaurants": items,
                "fetched_at": snapshot.last_fetched_at,
            }))?
        );
        return Ok(());
    }

    print_listing(&restaurants, snapshot.last_fetched_at);
    Ok(())
}

fn print_listing(restaurants: &Dataset, fetched_at: Option<i64>) {
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Restaurant Information").bold());
    if let Some(at) = fetched_at {
        println!("{}", dim.apply_to(format!("Last updated: {}", local_time_label(at))));
    }
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();

    if restaurants.is_empty() {
        println!("  {}", EMPTY_LISTING);
        println!();
        return;
    }

    for (index, r) in restaurants.iter().enumerate() {
        println!(
            "  {} {}  {}",
            dim.apply_to(format!("[{}]", r.route_id(index))),
            style(&r.title).bold(),
            style(r.price_label()).cyan()
        );
    }
    println!();
    println!("  {}", dim.apply_to("Details: tablegate show <id>"));
    println!();
}

/// Run the show command.
///
/// The detail view resolves against the cached listing, stale or not; it
/// never fetches.
pub async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mount = admit(ctx, client.clone()).await?;

    let view =
        DataViewController::new(client, ctx.cache(), &ctx.cache_config()).with_mount(mount);
    let listing = view.cached_listing().map(|entry| entry.value);
    let detail = DetailView::resolve(listing.as_deref(), &args.id);

    match (&detail, ctx.json_output) {
        (DetailView::Found(r), true) => {
            let mut item = ListingItem::new(0, r);
            item.id = args.id.clone();
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        (DetailView::NotFound, true) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "error": NOT_FOUND_TITLE,
                    "message": NOT_FOUND_MESSAGE,
                }))?
            );
        }
        (DetailView::Found(r), false) => {
            let dim = Style::new().dim();
            println!();
            println!("{}", style(&r.title).bold());
            println!("{}", dim.apply_to("─".repeat(40)));
            println!();
            println!("  {} {}", dim.apply_to("Price:"), r.price_label());
            if let Some(image) = &r.image {
                println!("  {} {}", dim.apply_to("Image:"), image);
            }
            println!();
            println!("  {}", r.description_label());
            println!();
        }
        (DetailView::NotFound, false) => {
            println!();
            println!("{}", style(NOT_FOUND_TITLE).bold());
            println!("  {}", NOT_FOUND_MESSAGE);
            println!();
            println!("  {}", style("Back to listing: tablegate restaurants").dim());
            println!();
        }
    }
    Ok(())
}
