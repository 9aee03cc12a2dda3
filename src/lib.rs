//! # Feedforge - product feed ingestion and cleanup
//!
//! Feedforge downloads a semicolon-delimited vendor product feed, normalizes
//! it into a canonical product schema, flags data-quality issues, rewrites
//! weak titles through a pluggable AI backend, and upserts everything into
//! SQLite keyed by product id.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Feed (HTTP)│────▶│   Parser    │────▶│  Normalize  │────▶│  Validate + │
//! │  (; + "")   │     │ (lenient SM)│     │ (canonical) │     │  AI titles  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                                             ┌──────▼──────┐
//!                                                             │   SQLite    │
//!                                                             │  (upserts)  │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedforge::{run, MockTitleGenerator, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = PipelineConfig::new("https://vendor.example/csv/", "products.db");
//!     let report = run(&config, &MockTitleGenerator).await.unwrap();
//!     println!("Stored {} products", report.total);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Product, Availability, IssueCode)
//! - [`parser`] - Lenient feed tokenizer and row reconciler
//! - [`schema`] - Header normalization and type coercion
//! - [`validation`] - Business-rule validation
//! - [`ai`] - Title enhancement and generator backends
//! - [`fetch`] - Feed retrieval
//! - [`db`] - SQLite persistence
//! - [`pipeline`] - End-to-end orchestration

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Normalization
pub mod schema;

// Validation
pub mod validation;

// AI
pub mod ai;

// IO boundaries
pub mod db;
pub mod fetch;

// Orchestration
pub mod logs;
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AiError, CsvError, DbError, FetchError, PipelineError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Availability, Issue, IssueCode, Product};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, parse_feed, reconcile_row, tokenize, FeedTable, DEFAULT_DELIMITER,
};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use schema::{canonical_key, normalize_gtin, normalize_key, normalize_table, parse_price};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::validate_product;

// =============================================================================
// Re-exports - AI
// =============================================================================

pub use ai::{
    build_title_prompt, improve_title_if_needed, AnthropicClient, MockTitleGenerator,
    TitleGenerator,
};

// =============================================================================
// Re-exports - IO boundaries
// =============================================================================

pub use db::{Database, ProductRow};
pub use fetch::fetch_feed;

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{process_feed, run, PipelineConfig, PipelineReport, ProcessedFeed};
