//! Donation statistics API client
//!
//! Fetches the aggregate counters behind the statistics page and stamps
//! them with the fetch time, so the UI can show data freshness.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use super::{ApiError, DonationStats, InventoryLevel};

/// Wire shape of the statistics endpoint; `fetched_at` is client-side
#[derive(Debug, Deserialize)]
struct StatsResponse {
    total_donors: u64,
    total_donations: u64,
    active_drives: u32,
    inventory: Vec<InventoryLevel>,
}

/// Client for the `/api/stats` endpoint
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
}

impl StatsClient {
    /// Creates a client for the given API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches site-wide donation statistics
    ///
    /// # Returns
    /// * `Ok(DonationStats)` - Counters plus per-group inventory, stamped
    ///   with the fetch time
    /// * `Err(ApiError)` - If the request, status, or body parsing fails
    pub async fn fetch_stats(&self) -> Result<DonationStats, ApiError> {
        let url = format!("{}/api/stats", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let wire: StatsResponse = serde_json::from_str(&text)?;

        Ok(DonationStats {
            total_donors: wire.total_donors,
            total_donations: wire.total_donations,
            active_drives: wire.active_drives,
            inventory: wire.inventory,
            fetched_at: Utc::now(),
        })
    }
}
