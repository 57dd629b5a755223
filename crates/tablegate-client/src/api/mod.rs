//! API endpoint implementations.

mod auth;
mod scrape;

pub use auth::AuthApi;
pub use scrape::ScrapeApi;
