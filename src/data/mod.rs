//! Core data models for the DonorLink client
//!
//! This module contains the data types used throughout the client for
//! representing donors, blood inventory, and site-wide donation statistics,
//! plus the API clients that fetch them.

pub mod donors;
pub mod stats;

pub use donors::DonorsClient;
pub use stats::StatsClient;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the API clients, classified for display
///
/// UI code maps these onto user-facing messages (e.g. a toast): transport
/// failures suggest a connectivity problem, status failures a backend one,
/// decode failures a deploy mismatch between client and API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server responded with status {0}")]
    Status(u16),

    /// The response body was not the JSON shape the client expects
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// ABO/Rh blood group of a donor or inventory bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    /// All eight groups, in the order the inventory page lists them
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    /// The short label used on the site, e.g. `"O-"`
    pub fn label(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }

    /// Parses a site label like `"ab+"` (case-insensitive) into a group
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|group| group.label() == normalized)
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A donor as listed in the public donor directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorSummary {
    /// Unique identifier assigned by the backend
    pub id: String,
    /// Display name
    pub name: String,
    /// Donor's blood group
    pub blood_group: BloodGroup,
    /// City the donor registered in
    pub city: String,
    /// Date of the most recent completed donation, if any
    pub last_donation: Option<NaiveDate>,
    /// Whether the donor is currently accepting donation requests
    pub available: bool,
}

/// Stocked units for one blood group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    /// Blood group this bucket tracks
    pub blood_group: BloodGroup,
    /// Units currently available
    pub units_available: u32,
}

/// Aggregate counters shown on the statistics page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationStats {
    /// Registered donors, all time
    pub total_donors: u64,
    /// Completed donations, all time
    pub total_donations: u64,
    /// Donation drives currently open for registration
    pub active_drives: u32,
    /// Current inventory per blood group
    pub inventory: Vec<InventoryLevel>,
    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,
}
