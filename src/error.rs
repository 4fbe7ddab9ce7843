// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for Modemstat
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for Modemstat operations
pub type Result<T> = std::result::Result<T, ModemError>;

/// Main error type for Modemstat operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModemError {
    /// Field extraction error
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Metric registration or update error
    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    /// Transport error while fetching a page
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The page contained no parseable tables
    #[error("No stats found on page {path}")]
    EmptyPage { path: String },

    /// Invalid device configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record could not be projected to JSON
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Errors while reading typed fields out of a scraped page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Required label absent or empty
    #[error("Missing field: {label}")]
    MissingField { label: String },

    /// Present but not parseable as the target type
    #[error("Invalid value for {label}: {value:?} ({reason})")]
    InvalidValue {
        label: String,
        value: String,
        reason: String,
    },

    /// Datetime or duration string in an unknown shape
    #[error("Unsupported format for {label}: {value:?}")]
    UnsupportedFormat { label: String, value: String },

    /// Pivoted row count differs from what the page layout promises
    #[error("Shape mismatch in {label}: expected {expected} rows, found {actual}")]
    ShapeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors related to the metrics registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// Metric name already registered as another kind
    #[error("Metric {name} is already registered as a {existing}, cannot register it as a {requested}")]
    KindConflict {
        name: String,
        existing: String,
        requested: String,
    },

    /// Metric name already registered with another label set
    #[error("Metric {name} is already registered with labels {existing:?}, requested {requested:?}")]
    LabelConflict {
        name: String,
        existing: Vec<String>,
        requested: Vec<String>,
    },

    /// Error reported by the prometheus crate
    #[error("Prometheus error: {0}")]
    Prometheus(String),
}

/// Errors while fetching pages from the device
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Base URL or path could not be combined
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Request timed out
    #[error("Timeout connecting to {url}")]
    Timeout { url: String },

    /// Could not connect
    #[error("Connection error to {url}: {reason}")]
    Connection { url: String, reason: String },

    /// Non-success HTTP status
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Any other request failure
    #[error("Request failed for {url}: {reason}")]
    Request { url: String, reason: String },

    /// Local page file could not be read
    #[error("Cannot read {path}: {reason}")]
    Io { path: String, reason: String },
}

impl ExtractError {
    pub(crate) fn missing(label: &str) -> Self {
        ExtractError::MissingField {
            label: label.to_string(),
        }
    }

    pub(crate) fn unsupported(label: &str, value: &str) -> Self {
        ExtractError::UnsupportedFormat {
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid(label: &str, value: &str, reason: impl ToString) -> Self {
        ExtractError::InvalidValue {
            label: label.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
