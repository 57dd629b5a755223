//! Scrape API.

use crate::client::GateClient;
use crate::error::Result;
use crate::types::ScrapeResponse;

/// Scrape API client.
pub struct ScrapeApi {
    client: GateClient,
}

impl ScrapeApi {
    pub(crate) fn new(client: GateClient) -> Self {
        Self { client }
    }

    /// Fetch the restaurant listing.
    ///
    /// A `200` with `success: false` is returned as-is; only non-2xx
    /// statuses and transport failures become errors.
    pub async fn restaurants(&self) -> Result<ScrapeResponse> {
        self.client.get("scrape").await
    }
}
