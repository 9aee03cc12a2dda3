//! Domain models for the feedforge ingestion pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Product`] - canonical product record built from a normalized feed row
//! - [`Availability`] - stock-derived availability state
//! - [`IssueCode`] - symbolic tag for one validation failure
//! - [`Issue`] - a flagged `(product id, issue code)` pair

use serde::{Deserialize, Serialize};

// =============================================================================
// Availability
// =============================================================================

/// Availability of a product, derived solely from the feed's stock count.
///
/// The feed never sets this directly: the schema normalizer computes it from
/// the sign of the parsed stock value, or marks it [`Availability::Unknown`]
/// when the feed carries no stock column at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Stock count is positive.
    InStock,
    /// Stock column present, but zero, negative, or unparseable.
    OutOfStock,
    /// The feed has no stock column.
    #[default]
    Unknown,
}

impl Availability {
    /// Stable string form used in storage and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the stable string form back (storage reads).
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim() {
            "in_stock" => Self::InStock,
            "out_of_stock" => Self::OutOfStock,
            _ => Self::Unknown,
        }
    }
}

// =============================================================================
// Issue Codes
// =============================================================================

/// Symbolic tag for one business-rule validation failure on a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Price missing, unparseable, or not positive.
    MissingOrInvalidPrice,
    /// GTIN missing or not 8/12/13/14 digits.
    MissingOrInvalidGtin,
    /// No usable image URL.
    MissingImageUrl,
    /// Title missing or shorter than 4 characters after trimming.
    WeakTitle,
}

impl IssueCode {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingOrInvalidPrice => "missing_or_invalid_price",
            Self::MissingOrInvalidGtin => "missing_or_invalid_gtin",
            Self::MissingImageUrl => "missing_image_url",
            Self::WeakTitle => "weak_title",
        }
    }

    /// Parse the stable string form back (storage reads).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "missing_or_invalid_price" => Some(Self::MissingOrInvalidPrice),
            "missing_or_invalid_gtin" => Some(Self::MissingOrInvalidGtin),
            "missing_image_url" => Some(Self::MissingImageUrl),
            "weak_title" => Some(Self::WeakTitle),
            _ => None,
        }
    }
}

/// A flagged validation failure, keyed `(id, code)` at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Product id the issue was raised against (empty when the feed row had none).
    pub id: String,
    /// The failure tag.
    pub code: IssueCode,
}

impl Issue {
    pub fn new(id: impl Into<String>, code: IssueCode) -> Self {
        Self { id: id.into(), code }
    }
}

// =============================================================================
// Product (canonical record)
// =============================================================================

/// A canonical product record.
///
/// One value type serves both in-flight processing and the storage
/// projection; the persistence adapter maps it to table columns directly.
/// All optional text fields hold `None` rather than blank strings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Product {
    /// Primary key in storage. Empty string when the feed row carried no id.
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Decimal price; `None` when missing or unparseable.
    pub price: Option<f64>,
    /// Always `"SEK"` — the feed is single-currency.
    pub currency: String,
    /// Digits-only GTIN of length 8, 12, 13 or 14; `None` otherwise.
    pub gtin: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub category: Option<String>,
    pub availability: Availability,
}

impl Product {
    /// Create an empty record with the given id and default currency.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            currency: "SEK".to_string(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
