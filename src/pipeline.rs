//! High-level pipeline: fetch → parse → normalize → validate + enhance → persist.
//!
//! The stages before validation are strictly ordered (normalization is a
//! prerequisite transform); validation and title enhancement then run per
//! record with no shared state. All writes are batched and committed once at
//! the end of the run — a failure anywhere leaves storage untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use feedforge::{run, MockTitleGenerator, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::new("https://vendor.example/csv/", "products.db");
//!     let report = run(&config, &MockTitleGenerator).await?;
//!     println!("{} products, {} issues", report.total, report.flagged);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use crate::ai::{improve_title_if_needed, TitleGenerator};
use crate::db::Database;
use crate::error::PipelineResult;
use crate::fetch::fetch_feed;
use crate::logs::{log_info, log_success};
use crate::models::{Issue, Product};
use crate::parser::{decode_content, parse_feed, DEFAULT_DELIMITER};
use crate::schema::normalize_table;
use crate::validation::validate_product;

// =============================================================================
// Configuration
// =============================================================================

/// Pipeline configuration, read once at process start and immutable for the
/// run's duration. The feed URL and database path are externally supplied.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Feed endpoint URL.
    pub feed_url: String,
    /// SQLite database path.
    pub db_path: String,
    /// Bound on the feed download.
    pub timeout: Duration,
    /// Field delimiter used by the feed.
    pub delimiter: char,
    /// Declared text encoding of the feed body.
    pub encoding: String,
}

impl PipelineConfig {
    pub fn new(feed_url: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            db_path: db_path.into(),
            timeout: Duration::from_secs(30),
            delimiter: DEFAULT_DELIMITER,
            encoding: "utf-8".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }
}

// =============================================================================
// Results
// =============================================================================

/// Processed feed content, ready for persistence.
#[derive(Debug, Clone)]
pub struct ProcessedFeed {
    /// Canonical records paired with their optional improved titles.
    pub products: Vec<(Product, Option<String>)>,
    /// All flagged `(id, issue)` pairs across the feed.
    pub issues: Vec<Issue>,
}

/// Summary of one full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Products processed.
    pub total: usize,
    /// Issue flags raised across all records.
    pub flagged: usize,
    /// Titles rewritten by the generator.
    pub improved: usize,
    /// First improved title, for the run summary.
    pub example_improved: Option<String>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Parse, normalize, validate, and enhance a raw feed body.
///
/// Network-free core of the pipeline; [`run`] wraps it with fetch and
/// persistence, and the debug subcommands call it on local files.
pub async fn process_feed(
    text: &str,
    delimiter: char,
    generator: &dyn TitleGenerator,
) -> PipelineResult<ProcessedFeed> {
    let table = parse_feed(text, delimiter)?;
    log_success(format!(
        "Parsed {} rows × {} columns",
        table.rows.len(),
        table.expected_cols()
    ));

    let records = normalize_table(&table);

    let mut products = Vec::with_capacity(records.len());
    let mut issues = Vec::new();

    for product in records {
        let improved = improve_title_if_needed(&product, generator).await;

        for code in validate_product(&product) {
            issues.push(Issue::new(product.id.clone(), code));
        }

        products.push((product, improved));
    }

    Ok(ProcessedFeed { products, issues })
}

/// Run the full pipeline: download the feed, process it, and commit
/// everything to storage in one transaction.
///
/// # Errors
///
/// Fetch failures abort before any parsing; persistence failures abort with
/// nothing committed. Per-record problems never error — they surface as
/// issue codes in storage and in the returned report.
pub async fn run(
    config: &PipelineConfig,
    generator: &dyn TitleGenerator,
) -> PipelineResult<PipelineReport> {
    log_info(format!("Downloading feed from {}", config.feed_url));
    let bytes = fetch_feed(&config.feed_url, config.timeout).await?;
    log_success(format!("Received {} bytes", bytes.len()));

    let text = decode_content(&bytes, &config.encoding);
    let processed = process_feed(&text, config.delimiter, generator).await?;

    let improved_titles: Vec<&String> = processed
        .products
        .iter()
        .filter_map(|(_, improved)| improved.as_ref())
        .collect();

    let report = PipelineReport {
        total: processed.products.len(),
        flagged: processed.issues.len(),
        improved: improved_titles.len(),
        example_improved: improved_titles.first().map(|t| (*t).clone()),
    };

    log_info(format!("Saving to {}", config.db_path));
    let db = Database::connect(&config.db_path).await?;
    db.save(&processed.products, &processed.issues).await?;
    log_success(format!(
        "Stored {} products and {} issues",
        report.total, report.flagged
    ));

    Ok(report)
}
