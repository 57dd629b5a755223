//! HTTP client for the tablegate backend.
//!
//! This crate provides a typed client for the two remote services the gate
//! depends on: the cookie-based auth service and the restaurant scrape
//! service.
//!
//! # Example
//!
//! ```no_run
//! use tablegate_client::{GateClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = GateClient::builder()
//!     .base_url("http://localhost:5000/api")
//!     .build()?;
//!
//! let login = client.auth().google_login("4/0Ab...").await?;
//! if login.success {
//!     let listing = client.scrape().restaurants().await?;
//!     println!("{} restaurants", listing.restaurants.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: check session, Google login, logout
//! - **Scrape**: restaurant listing

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, DEFAULT_TIMEOUT, GateClient};
pub use error::{Error, Result};
pub use types::*;
