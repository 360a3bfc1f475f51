//! Cached API surface for the DonorLink client
//!
//! `DonorLinkApi` is the one object UI code talks to: it owns the HTTP
//! clients, the cache stores, and a fetch coordinator per cached resource.
//! It is constructed once at application start from a [`ClientConfig`] and
//! passed to whatever needs data; there is no module-level state.

use std::sync::Arc;

use crate::cache::{BoxError, CacheStore, CoordinatorError, FetchCoordinator, FetchOptions};
use crate::cancel::CancelToken;
use crate::config::ClientConfig;
use crate::data::{DonationStats, DonorSummary, DonorsClient, StatsClient};

/// Cache key for the donor directory
const DONORS_KEY: &str = "donors";
/// Cache key for the statistics page counters
const STATS_KEY: &str = "stats";

/// Cached access to the DonorLink backend
///
/// Each cached resource has a single coordinator, so concurrent refresh
/// triggers from different parts of the UI collapse into one outstanding
/// request per resource, last one winning.
pub struct DonorLinkApi {
    donor_store: Arc<CacheStore<Vec<DonorSummary>>>,
    stats_store: Arc<CacheStore<DonationStats>>,
    donors: FetchCoordinator<Vec<DonorSummary>>,
    stats: FetchCoordinator<DonationStats>,
    /// Set when the config disabled caching: every read becomes a forced
    /// refresh, so the store is never served from
    bypass_cache: bool,
}

impl DonorLinkApi {
    /// Wires up clients, stores, and coordinators from a validated config
    pub fn new(config: ClientConfig) -> Result<Self, CoordinatorError> {
        let http = reqwest::Client::new();
        let options = FetchOptions {
            ttl: config.default_ttl,
            enabled: true,
        };

        let donor_store = Arc::new(CacheStore::new());
        let donors_client = DonorsClient::with_client(http.clone(), config.api_base_url.clone());
        let donors = FetchCoordinator::new(
            Arc::clone(&donor_store),
            DONORS_KEY,
            options.clone(),
            move |_key, token: CancelToken| {
                let client = donors_client.clone();
                async move {
                    let donors = client.fetch_donors(None).await.map_err(BoxError::from)?;
                    token.checkpoint()?;
                    Ok(donors)
                }
            },
        )?;

        let stats_store = Arc::new(CacheStore::new());
        let stats_client = StatsClient::with_client(http, config.api_base_url);
        let stats = FetchCoordinator::new(
            Arc::clone(&stats_store),
            STATS_KEY,
            options,
            move |_key, token: CancelToken| {
                let client = stats_client.clone();
                async move {
                    let stats = client.fetch_stats().await.map_err(BoxError::from)?;
                    token.checkpoint()?;
                    Ok(stats)
                }
            },
        )?;

        Ok(Self {
            donor_store,
            stats_store,
            donors,
            stats,
            bypass_cache: !config.cache_enabled,
        })
    }

    /// Returns the donor directory, cached or fetched
    ///
    /// `Ok(None)` means the request was superseded by a newer one; see
    /// [`FetchCoordinator::fetch`]. With caching disabled in the config,
    /// every call fetches regardless of `force_refresh`.
    pub async fn donors(
        &self,
        force_refresh: bool,
    ) -> Result<Option<Vec<DonorSummary>>, CoordinatorError> {
        self.donors.fetch(force_refresh || self.bypass_cache).await
    }

    /// Returns the statistics counters, cached or fetched
    pub async fn stats(
        &self,
        force_refresh: bool,
    ) -> Result<Option<DonationStats>, CoordinatorError> {
        self.stats.fetch(force_refresh || self.bypass_cache).await
    }

    /// Returns the cached donor directory without fetching
    pub fn cached_donors(&self) -> Option<Vec<DonorSummary>> {
        self.donors.cached()
    }

    /// Returns the cached statistics without fetching
    pub fn cached_stats(&self) -> Option<DonationStats> {
        self.stats.cached()
    }

    /// Drops the cached donor directory, effective immediately
    pub fn invalidate_donors(&self) {
        self.donors.invalidate();
    }

    /// Drops the cached statistics, effective immediately
    pub fn invalidate_stats(&self) {
        self.stats.invalidate();
    }

    /// Empties every cache store
    pub fn clear_cache(&self) {
        self.donor_store.clear();
        self.stats_store.clear();
    }

    /// True while a donor directory fetch is outstanding
    pub fn is_fetching_donors(&self) -> bool {
        self.donors.is_fetching()
    }
}
