//! Business-rule validation for canonical product records.
//!
//! Validation is a pure function over an already-normalized record: nothing
//! is mutated and nothing fails. Each broken rule contributes one
//! [`IssueCode`], in a fixed order, and a record can accumulate zero to four.
//!
//! The GTIN length re-check overlaps with the normalizer, which already nulls
//! any GTIN with an invalid digit count. It is kept as a safety net in case
//! records ever reach validation without passing through normalization.

use crate::models::{IssueCode, Product};

/// Retail GTIN digit counts accepted by the feed.
const GTIN_LENGTHS: [usize; 4] = [8, 12, 13, 14];

/// Minimum trimmed title length before a title counts as weak.
const MIN_TITLE_LEN: usize = 4;

/// Validate one record, returning its issue codes in rule order.
pub fn validate_product(product: &Product) -> Vec<IssueCode> {
    let mut issues = Vec::new();

    if product.price.map_or(true, |p| p <= 0.0) {
        issues.push(IssueCode::MissingOrInvalidPrice);
    }

    match &product.gtin {
        Some(gtin) if GTIN_LENGTHS.contains(&gtin.len()) => {}
        _ => issues.push(IssueCode::MissingOrInvalidGtin),
    }

    if product.image_url.is_none() {
        issues.push(IssueCode::MissingImageUrl);
    }

    let title_len = product
        .title
        .as_deref()
        .map_or(0, |t| t.trim().chars().count());
    if title_len < MIN_TITLE_LEN {
        issues.push(IssueCode::WeakTitle);
    }

    issues
}
