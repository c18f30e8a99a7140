//! Structured data detection.
//!
//! Looks for schema.org markup in two forms:
//! - JSON-LD (`<script type="application/ld+json">`)
//! - microdata (`itemscope` / `itemtype` attributes)

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::utils::parse_selector_unsafe;

static JSON_LD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"script[type="application/ld+json"]"#, "JSON_LD_SELECTOR")
});
static MICRODATA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("[itemscope], [itemtype]", "MICRODATA_SELECTOR"));

#[derive(Debug, Clone, Default)]
pub(crate) struct StructuredData {
    pub present: bool,
    /// Schema.org types, e.g. "Organization" (from `@type` or the last `itemtype` path segment).
    pub schema_types: Vec<String>,
}

pub(crate) fn extract_structured_data(document: &Html) -> StructuredData {
    let mut data = StructuredData::default();

    for script in document.select(&JSON_LD_SELECTOR) {
        let json_str = script.text().collect::<String>();
        // A JSON-LD block that does not parse still signals intent to mark up the page.
        data.present = true;
        match serde_json::from_str::<serde_json::Value>(json_str.trim()) {
            Ok(value) => collect_types(&value, &mut data.schema_types),
            Err(e) => log::debug!("Ignoring malformed JSON-LD block: {}", e),
        }
    }

    for element in document.select(&MICRODATA_SELECTOR) {
        data.present = true;
        if let Some(item_type) = element.value().attr("itemtype") {
            for t in item_type.split_whitespace() {
                if let Some(name) = t.trim_end_matches('/').rsplit('/').next() {
                    if !name.is_empty() {
                        data.schema_types.push(name.to_string());
                    }
                }
            }
        }
    }

    data.schema_types.dedup();
    data
}

/// Collects `@type` values from a JSON-LD value, descending into arrays and `@graph`.
fn collect_types(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_types(item, out);
            }
        }
        serde_json::Value::Object(obj) => {
            match obj.get("@type") {
                Some(serde_json::Value::String(t)) => out.push(t.clone()),
                Some(serde_json::Value::Array(types)) => {
                    out.extend(types.iter().filter_map(|t| t.as_str().map(str::to_string)))
                }
                _ => {}
            }
            if let Some(graph) = obj.get("@graph") {
                collect_types(graph, out);
            }
        }
        _ => {}
    }
}
