//! Title enhancement via a pluggable text-generation backend.
//!
//! The pipeline treats text generation as a capability with one method:
//! [`TitleGenerator::generate`]. Two implementations ship with the crate:
//!
//! - [`AnthropicClient`] — real backend over the Anthropic Messages API
//! - [`MockTitleGenerator`] — credential-free heuristic used for local runs
//!   and tests
//!
//! Swapping backends requires no change to the enhancer. Generator failures
//! are caught in [`improve_title_if_needed`] and treated as "no improvement
//! available" — a broken AI backend never aborts an ingestion run.

pub mod prompt;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{AiError, AiResult};
use crate::logs::log_warning;
use crate::models::Product;

pub use prompt::build_title_prompt;

/// Titles shorter than this (trimmed) are candidates for enhancement.
///
/// Looser than the validator's weak-title threshold of 4 on purpose:
/// short-but-valid titles still benefit from a rewrite.
const ENHANCE_THRESHOLD: usize = 12;

/// Hard cap on an improved title's length.
const MAX_TITLE_LEN: usize = 70;

/// Default number of retries against the real backend.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

// =============================================================================
// Generator capability
// =============================================================================

/// Text-generation collaborator: one prompt in, one string out.
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AiResult<String>;
}

// =============================================================================
// Anthropic backend
// =============================================================================

/// Anthropic Messages API client.
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AnthropicClient {
    /// Create a new client with explicit API key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 256,
        }
    }

    /// Create a client from environment variable ANTHROPIC_API_KEY
    pub fn from_env() -> AiResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AiError::MissingApiKey("ANTHROPIC_API_KEY not set".to_string()))?;

        Ok(Self::new(api_key))
    }

    /// Set the model to use
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Single API call, no retries.
    async fn call_api(&self, prompt: &str) -> AiResult<String> {
        let client = reqwest::Client::new();

        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": 0.7,
            "system": "You are an e-commerce copywriter. Reply with the improved title only, no quotes, no explanations.",
            "messages": [{ "role": "user", "content": prompt }]
        });

        let response = client
            .post("https://api.anthropic.com/v1/messages")
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<AnthropicError>(&body) {
                return Err(AiError::ApiError(error.error.message));
            }
            return Err(AiError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let response: AnthropicResponse =
            serde_json::from_str(&body).map_err(|e| AiError::InvalidJson(e.to_string()))?;

        let text = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(AiError::InvalidJson("Empty response".to_string()));
        }

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl TitleGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> AiResult<String> {
        let mut last_error = None;

        for attempt in 1..=DEFAULT_MAX_RETRIES {
            match self.call_api(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    log_warning(format!(
                        "Attempt {}/{} failed: {}",
                        attempt, DEFAULT_MAX_RETRIES, e
                    ));
                    last_error = Some(e);

                    if attempt < DEFAULT_MAX_RETRIES {
                        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AiError::ApiError("Unknown error".to_string())))
    }
}

// =============================================================================
// Mock backend
// =============================================================================

static BRAND_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Brand:\s*(.*)").expect("valid regex"));

static TITLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Current title:\s*"(.*)""#).expect("valid regex"));

/// Heuristic generator for running the pipeline without API credentials.
///
/// Reads the brand and current title back out of the structured prompt and
/// joins them into a cleaner base title; the enhancer's post-processing does
/// the rest.
#[derive(Debug, Clone, Default)]
pub struct MockTitleGenerator;

#[async_trait]
impl TitleGenerator for MockTitleGenerator {
    async fn generate(&self, prompt: &str) -> AiResult<String> {
        let brand = BRAND_LINE
            .captures(prompt)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or("");
        let base = TITLE_LINE
            .captures(prompt)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or("");

        let mut parts = Vec::new();
        if !brand.is_empty() && !brand.eq_ignore_ascii_case("n/a") {
            parts.push(brand);
        }
        if !base.is_empty() {
            parts.push(base);
        }

        if parts.is_empty() {
            Ok("Product".to_string())
        } else {
            Ok(parts.join(" "))
        }
    }
}

// =============================================================================
// Title enhancer
// =============================================================================

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Rewrite a weak title through the generator, or return `None`.
///
/// Triggers when the title is missing or shorter than 12 trimmed characters.
/// Records that do not trigger — and any generator failure — yield `None`;
/// the caller must not overwrite a previously stored improved title with it.
pub async fn improve_title_if_needed(
    product: &Product,
    generator: &dyn TitleGenerator,
) -> Option<String> {
    let needs_help = product
        .title
        .as_deref()
        .map_or(true, |t| t.trim().chars().count() < ENHANCE_THRESHOLD);
    if !needs_help {
        return None;
    }

    let prompt = build_title_prompt(product);
    match generator.generate(&prompt).await {
        Ok(text) => {
            let polished = polish_title(&text);
            if polished.is_empty() {
                None
            } else {
                Some(polished)
            }
        }
        Err(e) => {
            log_warning(format!("Title generation failed for '{}': {}", product.id, e));
            None
        }
    }
}

/// Post-process generator output: collapse whitespace runs, title-case, and
/// truncate to 70 characters with a trailing ellipsis marker.
fn polish_title(raw: &str) -> String {
    let collapsed = WHITESPACE.replace_all(raw.trim(), " ");
    let cased = title_case(&collapsed);

    if cased.chars().count() > MAX_TITLE_LEN {
        let cut: String = cased.chars().take(MAX_TITLE_LEN - 3).collect();
        format!("{}...", cut)
    } else {
        cased
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
