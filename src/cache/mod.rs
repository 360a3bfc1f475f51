//! TTL caching with request de-duplication
//!
//! This module provides the in-memory cache the DonorLink client uses to
//! avoid redundant network calls: a [`CacheStore`] holding values with
//! expiry timestamps, and a [`FetchCoordinator`] that serializes fetches per
//! cache key with last-request-wins cancellation. Entries live only for the
//! application session; nothing is persisted across reloads.

mod coordinator;
mod store;

pub use coordinator::{BoxError, CoordinatorError, FetchCoordinator, FetchOptions};
pub use store::CacheStore;
