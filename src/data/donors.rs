//! Donor directory API client
//!
//! Fetches the public donor directory from the DonorLink backend and parses
//! it into [`DonorSummary`] records, optionally filtered by blood group.

use reqwest::Client;
use serde::Deserialize;

use super::{ApiError, BloodGroup, DonorSummary};

/// Wire shape of the donor directory endpoint
#[derive(Debug, Deserialize)]
struct DonorDirectoryResponse {
    donors: Vec<DonorSummary>,
}

/// Client for the `/api/donors` endpoint
#[derive(Debug, Clone)]
pub struct DonorsClient {
    client: Client,
    base_url: String,
}

impl DonorsClient {
    /// Creates a client for the given API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing HTTP client
    ///
    /// Prefer this when several clients share one connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches the donor directory
    ///
    /// # Arguments
    /// * `blood_group` - When set, only donors of this group are requested
    ///
    /// # Returns
    /// * `Ok(Vec<DonorSummary>)` - The directory as the backend lists it
    /// * `Err(ApiError)` - If the request, status, or body parsing fails
    pub async fn fetch_donors(
        &self,
        blood_group: Option<BloodGroup>,
    ) -> Result<Vec<DonorSummary>, ApiError> {
        let url = format!("{}/api/donors", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(group) = blood_group {
            request = request.query(&[("blood_group", group.label())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let directory: DonorDirectoryResponse = serde_json::from_str(&text)?;
        Ok(directory.donors)
    }
}
