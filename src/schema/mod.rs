//! Schema normalization: vendor column names to canonical fields, raw text
//! to typed values.
//!
//! Two steps run against every reconciled row:
//!
//! 1. **Key normalization + renaming.** Header names are lowercased with every
//!    run of non-word characters collapsed to one underscore, then mapped
//!    through a fixed vendor → canonical rename table. Unmapped keys pass
//!    through under their normalized name.
//! 2. **Type coercion.** Price, stock and GTIN text is parsed defensively:
//!    failures yield `None`, never an error — downstream validation turns the
//!    gaps into issue codes.
//!
//! Availability is derived here from the stock column and currency is pinned
//! to `SEK`; neither can be set directly by the feed.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Availability, Product};
use crate::parser::FeedTable;

// =============================================================================
// Key normalization
// =============================================================================

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid regex"));

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").expect("valid regex"));

/// Vendor feed headers → canonical internal field names.
static RENAME_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("artnr", "id"),
        ("varugrupp", "category"),
        ("produktnamn", "title"),
        ("tillverkare", "brand"),
        ("modell", "model"),
        ("ean", "gtin"),
        ("lagersaldo", "stock"),
        ("pris", "price"),
        ("kampanjvara_1_0", "promo_flag"),
        ("frakt", "shipping_cost"),
        ("url", "product_url"),
        ("bildurl", "image_url"),
        ("beskrivning", "description"),
    ])
});

/// Convert a feed column name to snake_case key form.
///
/// Collapses every maximal run of non-word characters to a single underscore
/// so punctuation and spacing variants land on the same key.
pub fn normalize_key(raw: &str) -> String {
    NON_WORD.replace_all(raw, "_").to_lowercase()
}

/// Normalize a header name and apply the canonical rename table.
pub fn canonical_key(raw: &str) -> String {
    let key = normalize_key(raw);
    match RENAME_MAP.get(key.as_str()) {
        Some(mapped) => (*mapped).to_string(),
        None => key,
    }
}

// =============================================================================
// Value coercion
// =============================================================================

/// Parse a feed price like `"199,90"` into a decimal. Unparseable → `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parse a stock count. Unparseable → `None`.
pub fn parse_stock(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Normalize a GTIN/EAN value to its digit string.
///
/// The feed sometimes places placeholder text in the EAN column (e.g.
/// `identifier_exists=no`). Everything but digits is stripped and only the
/// retail GTIN lengths 8, 12, 13 and 14 are accepted.
pub fn normalize_gtin(raw: &str) -> Option<String> {
    let digits = NON_DIGIT.replace_all(raw, "").to_string();
    match digits.len() {
        8 | 12 | 13 | 14 => Some(digits),
        _ => None,
    }
}

/// Empty or whitespace-only text → `None`, anything else kept verbatim.
pub fn blank_to_none(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

// =============================================================================
// Record construction
// =============================================================================

/// Normalize a tokenized feed table into canonical product records.
pub fn normalize_table(table: &FeedTable) -> Vec<Product> {
    let keys: Vec<String> = table.headers.iter().map(|h| canonical_key(h)).collect();
    let has_stock = keys.iter().any(|k| k == "stock");

    table
        .rows
        .iter()
        .map(|row| build_product(&keys, row, has_stock))
        .collect()
}

/// Build one canonical record from a reconciled row.
///
/// Rows are indexed positionally against the header; the reconciler's
/// fixed-width postcondition makes the zip exact. Columns outside the
/// canonical field set (model, promo_flag, shipping_cost, pass-through keys)
/// are not persisted and are skipped here.
fn build_product(keys: &[String], row: &[String], has_stock: bool) -> Product {
    let mut product = Product::new("");
    let mut stock: Option<i64> = None;

    for (key, value) in keys.iter().zip(row.iter()) {
        match key.as_str() {
            "id" => product.id = value.trim().to_string(),
            "title" => product.title = blank_to_none(value),
            "description" => product.description = blank_to_none(value),
            "price" => product.price = parse_price(value),
            "gtin" => product.gtin = normalize_gtin(value),
            "brand" => product.brand = blank_to_none(value),
            "image_url" => product.image_url = blank_to_none(value),
            "product_url" => product.product_url = blank_to_none(value),
            "category" => product.category = blank_to_none(value),
            "stock" => stock = parse_stock(value),
            _ => {}
        }
    }

    product.availability = if !has_stock {
        Availability::Unknown
    } else if stock.map_or(false, |s| s > 0) {
        Availability::InStock
    } else {
        Availability::OutOfStock
    };

    product
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_feed;

    #[test]
    fn test_normalize_key_collapses_punctuation() {
        assert_eq!(normalize_key("BildURL"), "bildurl");
        assert_eq!(normalize_key("Pris (SEK)"), "pris_sek_");
        assert_eq!(normalize_key("lager saldo"), "lager_saldo");
    }

    #[test]
    fn test_canonical_key_renames_vendor_headers() {
        assert_eq!(canonical_key("ArtNr"), "id");
        assert_eq!(canonical_key("Produktnamn"), "title");
        assert_eq!(canonical_key("EAN"), "gtin");
        assert_eq!(canonical_key("BildURL"), "image_url");
        // Unmapped keys pass through normalized.
        assert_eq!(canonical_key("Vikt KG"), "vikt_kg");
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("199,90"), Some(199.90));
        assert_eq!(parse_price("149.00"), Some(149.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("N/A"), None);
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("12"), Some(12));
        assert_eq!(parse_stock("-3"), Some(-3));
        assert_eq!(parse_stock("many"), None);
    }

    #[test]
    fn test_normalize_gtin() {
        assert_eq!(normalize_gtin("7312345678903"), Some("7312345678903".into()));
        assert_eq!(normalize_gtin("73-1234-567890-3"), Some("7312345678903".into()));
        assert_eq!(normalize_gtin("identifier_exists=no"), None);
        assert_eq!(normalize_gtin("123"), None);
        assert_eq!(normalize_gtin(""), None);
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none("   "), None);
        assert_eq!(blank_to_none(""), None);
        assert_eq!(blank_to_none("x"), Some("x".into()));
    }

    #[test]
    fn test_availability_from_stock_sign() {
        let feed = "artnr;lagersaldo\nA1;5\nA2;0\nA3;-2\nA4;soon\n";
        let table = parse_feed(feed, ';').unwrap();
        let products = normalize_table(&table);

        assert_eq!(products[0].availability, Availability::InStock);
        assert_eq!(products[1].availability, Availability::OutOfStock);
        assert_eq!(products[2].availability, Availability::OutOfStock);
        // Unparseable stock with the column present counts as out of stock.
        assert_eq!(products[3].availability, Availability::OutOfStock);
    }

    #[test]
    fn test_availability_unknown_without_stock_column() {
        let feed = "artnr;pris\nA1;10\n";
        let table = parse_feed(feed, ';').unwrap();
        let products = normalize_table(&table);
        assert_eq!(products[0].availability, Availability::Unknown);
    }

    #[test]
    fn test_currency_always_sek() {
        let feed = "artnr\nA1\n";
        let table = parse_feed(feed, ';').unwrap();
        assert_eq!(normalize_table(&table)[0].currency, "SEK");
    }

    #[test]
    fn test_blank_urls_become_none() {
        let feed = "artnr;url;bildurl\nA1;  ;https://x.se/a.jpg\n";
        let table = parse_feed(feed, ';').unwrap();
        let products = normalize_table(&table);
        assert_eq!(products[0].product_url, None);
        assert_eq!(products[0].image_url, Some("https://x.se/a.jpg".into()));
    }

    #[test]
    fn test_full_row_normalization() {
        let feed = "ArtNr;Produktnamn;Tillverkare;EAN;Lagersaldo;Pris;Beskrivning\n\
                    A100;Löpband X1;Acme;7312345678903;3;4999,00;\"Bra; robust\"\n";
        let table = parse_feed(feed, ';').unwrap();
        let p = &normalize_table(&table)[0];

        assert_eq!(p.id, "A100");
        assert_eq!(p.title.as_deref(), Some("Löpband X1"));
        assert_eq!(p.brand.as_deref(), Some("Acme"));
        assert_eq!(p.gtin.as_deref(), Some("7312345678903"));
        assert_eq!(p.price, Some(4999.0));
        assert_eq!(p.availability, Availability::InStock);
        assert_eq!(p.description.as_deref(), Some("Bra; robust"));
    }
}
