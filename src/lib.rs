//! DonorLink client data layer
//!
//! Library crate backing the DonorLink blood-donation site's client: typed
//! API clients for the donor directory and donation statistics, an
//! in-memory TTL cache so UI code avoids redundant network calls, and
//! per-key fetch coordination with last-request-wins cancellation.
//!
//! The usual entry point is [`DonorLinkApi`], built once at application
//! start from a validated [`ClientConfig`]:
//!
//! ```no_run
//! use donorlink::{ClientConfig, DonorLinkApi};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let api = DonorLinkApi::new(config)?;
//!
//! // First call fetches; later calls within the TTL serve the cache.
//! let donors = api.donors(false).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cancel;
pub mod client;
pub mod config;
pub mod data;

pub use cache::{CacheStore, CoordinatorError, FetchCoordinator, FetchOptions};
pub use cancel::CancelToken;
pub use client::DonorLinkApi;
pub use config::{ClientConfig, ConfigError};
pub use data::{ApiError, BloodGroup, DonationStats, DonorSummary, InventoryLevel};
