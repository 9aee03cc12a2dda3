//! Error types for the feedforge ingestion pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - feed parsing errors
//! - [`FetchError`] - feed retrieval errors
//! - [`AiError`] - text-generation client errors
//! - [`DbError`] - persistence errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Per-record data problems (bad price text, invalid GTIN, ragged rows) are
//! never errors: they become `None` fields or issue codes. Only feed-level
//! and storage-level failures abort a run.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during feed parsing.
///
/// The tokenizer itself is lenient and never fails on malformed quoting;
/// these variants only cover structural problems with the feed as a whole.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Feed body is empty.
    #[error("Feed is empty")]
    EmptyFeed,

    /// Header line produced no columns.
    #[error("No headers found in feed")]
    NoHeaders,
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors while retrieving the feed over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (connection refused, timeout, DNS, ...).
    #[error("Feed request failed: {0}")]
    RequestFailed(String),

    /// Non-2xx response from the feed endpoint.
    #[error("Feed endpoint returned HTTP {status}")]
    BadStatus { status: u16 },
}

// =============================================================================
// AI Client Errors
// =============================================================================

/// Errors from the text-generation client.
///
/// The title enhancer catches these and treats them as "no improvement
/// available"; they never abort a pipeline run.
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing API key.
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be decoded.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    /// Provider-side error.
    #[error("API error: {0}")]
    ApiError(String),
}

// =============================================================================
// Persistence Errors
// =============================================================================

/// Errors from the SQLite persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying sqlx failure.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::run`].
/// It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Feed retrieval error (fatal, aborts before parsing).
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Feed parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Persistence error (fatal, nothing committed).
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// IO error (local feed files in debug subcommands).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for feed parsing operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Result type for persistence operations.
pub type DbResult<T> = Result<T, DbError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
