//! Prompt construction for title improvement.

use crate::models::Product;

/// Build the title-improvement prompt for one product.
///
/// The structured layout (labeled `Current title:` / `Brand:` / `Category:`
/// lines) is load-bearing: the mock generator parses these labels back out,
/// so the prompt format is the contract between the enhancer and any
/// generator backend.
pub fn build_title_prompt(product: &Product) -> String {
    let title = product.title.as_deref().unwrap_or("").trim();
    let brand = non_empty_or_na(product.brand.as_deref());
    let category = non_empty_or_na(product.category.as_deref());

    format!(
        r#"Improve this e-commerce product title.
Rules: <= 70 chars, include brand if present.
Current title: "{title}"
Brand: {brand}
Category: {category}
"#
    )
}

fn non_empty_or_na(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "N/A",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_product_fields() {
        let mut p = Product::new("A1");
        p.title = Some("Shoes".into());
        p.brand = Some("Acme".into());
        p.category = Some("Running".into());

        let prompt = build_title_prompt(&p);
        assert!(prompt.contains("Current title: \"Shoes\""));
        assert!(prompt.contains("Brand: Acme"));
        assert!(prompt.contains("Category: Running"));
    }

    #[test]
    fn test_prompt_missing_fields_become_na() {
        let p = Product::new("A1");
        let prompt = build_title_prompt(&p);
        assert!(prompt.contains("Current title: \"\""));
        assert!(prompt.contains("Brand: N/A"));
        assert!(prompt.contains("Category: N/A"));
    }
}
