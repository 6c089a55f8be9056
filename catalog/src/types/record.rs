//! Canonical listing records as produced by translation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transmission kind, classified from free-form source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    Automatic,
    Manual,
    /// Present in the source but not classifiable (e.g. `"CVT"`).
    Unknown,
}

impl Transmission {
    /// Classifies a raw transmission value by case-insensitive substring.
    pub fn classify(raw: &str) -> Transmission {
        let lowered = raw.to_lowercase();
        if lowered.contains("auto") {
            Transmission::Automatic
        } else if lowered.contains("manu") {
            Transmission::Manual
        } else {
            Transmission::Unknown
        }
    }

    /// Returns the persisted cell value for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "automatic",
            Transmission::Manual => "manual",
            Transmission::Unknown => "unknown",
        }
    }

    /// Parses a persisted cell value back into a kind.
    pub fn from_cell(cell: &str) -> Option<Transmission> {
        match cell {
            "automatic" => Some(Transmission::Automatic),
            "manual" => Some(Transmission::Manual),
            "unknown" => Some(Transmission::Unknown),
            _ => None,
        }
    }
}

/// The fixed set of typed canonical fields of one listing observation.
///
/// Shared by [`CanonicalRecord`] (an incoming observation) and
/// [`crate::types::HistoryEntry`] (a persisted row). Unknown or unparseable
/// values are `None`, never empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFields {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
    pub mileage: Option<i64>,
    pub city: Option<String>,
    pub transmission: Option<Transmission>,
    pub displacement: Option<f64>,
    pub fuel: Option<String>,
    pub steering: Option<String>,
    pub upholstery: Option<String>,
    pub payment: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Names of the fields whose change supersedes an active entry.
pub(crate) const TRACKED_FIELDS: [&str; 7] = [
    "year",
    "price",
    "brand",
    "model",
    "mileage",
    "displacement",
    "transmission",
];

impl ListingFields {
    /// Returns whether any tracked field differs between two observations.
    ///
    /// Untracked fields (description, city, raw payload and so on) never trigger a
    /// version update. A `None` tracked field compares unequal to any
    /// non-`None` value, so a field that stops parsing correctly registers as
    /// drift instead of masking it.
    pub fn tracked_differs(&self, other: &ListingFields) -> bool {
        self.year != other.year
            || self.price != other.price
            || self.brand != other.brand
            || self.model != other.model
            || self.mileage != other.mileage
            || self.displacement != other.displacement
            || self.transmission != other.transmission
    }

    /// Names of the tracked fields that are missing from this observation.
    pub fn gaps(&self) -> Vec<&'static str> {
        let present = [
            self.year.is_some(),
            self.price.is_some(),
            self.brand.is_some(),
            self.model.is_some(),
            self.mileage.is_some(),
            self.displacement.is_some(),
            self.transmission.is_some(),
        ];
        TRACKED_FIELDS
            .into_iter()
            .zip(present)
            .filter(|(_, present)| !*present)
            .map(|(name, _)| name)
            .collect()
    }
}

/// One normalized listing observation, as produced by a translator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Source-assigned identifier; absent for some sources.
    pub id: Option<String>,
    pub fields: ListingFields,
    /// When this record was translated; becomes `ingested_at` on merge.
    pub captured_at: DateTime<Utc>,
    /// The original raw payload, retained opaquely for audit and debugging.
    pub raw: serde_json::Value,
}

impl CanonicalRecord {
    /// Names of the tracked fields this observation failed to obtain.
    pub fn gaps(&self) -> Vec<&'static str> {
        self.fields.gaps()
    }
}
