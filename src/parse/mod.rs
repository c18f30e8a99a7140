//! HTML parsing into the owned document model.
//!
//! Pages are parsed once with `scraper` and converted into a `Document`
//! made of plain strings and vectors, which every analyzer of that page
//! reads concurrently.

mod document;
mod html;
mod structured;

pub use document::{
    Document, Element, FormControl, Heading, Image, Link, LinkKind, Meta, Script, Stylesheet,
};

use crate::error_handling::ParseError;

/// Parses a response body served from `url`.
///
/// Parsing is best-effort: malformed markup yields absent fields, never an error.
///
/// # Errors
///
/// Returns `ParseError::EmptyBody` when the body is empty or whitespace only.
pub fn parse(body: &[u8], url: &str) -> Result<Document, ParseError> {
    let html = String::from_utf8_lossy(body);
    if html.trim().is_empty() {
        return Err(ParseError::EmptyBody);
    }
    Ok(html::build_document(&html, url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(parse(b"", "https://example.com/"), Err(ParseError::EmptyBody));
        assert_eq!(
            parse(b" \n\t ", "https://example.com/"),
            Err(ParseError::EmptyBody)
        );
    }

    #[test]
    fn test_parse_minimal_page() {
        let doc = parse(
            b"<html><head><title>Short</title></head><body><img src=\"a.png\"></body></html>",
            "https://example.com/",
        )
        .expect("non-empty body parses");
        assert_eq!(doc.title.as_deref(), Some("Short"));
        assert_eq!(doc.images.len(), 1);
        assert!(doc.images[0].missing_alt());
        assert_eq!(doc.word_count, 0);
    }

    #[test]
    fn test_parse_invalid_utf8_is_lossy() {
        let doc = parse(b"<p>caf\xe9</p>", "https://example.com/").expect("parses");
        assert_eq!(doc.word_count, 1);
    }

    #[test]
    fn test_meta_lookups_ignore_case() {
        let doc = parse(
            br#"<head><meta name="Description" content="d"><meta property="og:title" content="Shop"></head>"#,
            "https://example.com/",
        )
        .expect("parses");
        assert_eq!(doc.meta("description"), Some("d"));
        assert_eq!(doc.meta_property("OG:TITLE"), Some("Shop"));
        assert_eq!(doc.meta_property("og:image"), None);
    }

    #[test]
    fn test_document_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Document>();
    }
}
