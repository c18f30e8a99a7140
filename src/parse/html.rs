//! Conversion of a scraper DOM into the owned `Document`.
//!
//! html5ever repairs malformed markup (unclosed tags, stray attributes), so
//! extraction never fails; anything it cannot find is simply absent.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::document::{
    Document, Element, FormControl, Heading, Image, Link, LinkKind, Meta, Script, Stylesheet,
};
use super::structured::extract_structured_data;
use crate::domain::same_host;
use crate::utils::{parse_selector_unsafe, resolve_link};

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("title", "TITLE_SELECTOR"));
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("meta", "META_SELECTOR"));
static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("h1, h2, h3, h4, h5, h6", "HEADING_SELECTOR"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "LINK_SELECTOR"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("img", "IMAGE_SELECTOR"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("script", "SCRIPT_SELECTOR"));
static LINK_REL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("link[rel]", "LINK_REL_SELECTOR"));
static STYLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("style", "STYLE_SELECTOR"));
static FORM_CONTROL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("input, select, textarea", "FORM_CONTROL_SELECTOR"));
static LABEL_FOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("label[for]", "LABEL_FOR_SELECTOR"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("body", "BODY_SELECTOR"));

/// Tags whose text is never rendered.
const HIDDEN_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Input types that need no label.
const UNLABELED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Builds the owned model of `html`, served from `url`.
pub(crate) fn build_document(html: &str, url: &str) -> Document {
    let parsed = Html::parse_document(html);
    let base = Url::parse(url).ok();

    let titles: Vec<String> = parsed
        .select(&TITLE_SELECTOR)
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .collect();
    let structured = extract_structured_data(&parsed);
    let visible_text = extract_visible_text(&parsed);
    let word_count = visible_text.split_whitespace().count();

    let document = Document {
        url: url.to_string(),
        title: titles.first().cloned(),
        title_count: titles.len(),
        lang: parsed
            .root_element()
            .value()
            .attr("lang")
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
        canonical: extract_canonical(&parsed),
        metas: extract_metas(&parsed),
        headings: extract_headings(&parsed),
        links: extract_links(&parsed, base.as_ref()),
        images: extract_images(&parsed),
        scripts: extract_scripts(&parsed),
        stylesheets: extract_stylesheets(&parsed),
        inline_styles: parsed
            .select(&STYLE_SELECTOR)
            .map(|s| s.text().collect::<String>())
            .collect(),
        form_controls: extract_form_controls(&parsed),
        has_structured_data: structured.present,
        schema_types: structured.schema_types,
        visible_text,
        word_count,
        elements: extract_elements(&parsed),
    };

    log::trace!(
        "Parsed {}: {} elements, {} links, {} words",
        url,
        document.elements.len(),
        document.links.len(),
        document.word_count
    );
    document
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn attr(element: &ElementRef, name: &str) -> Option<String> {
    element.value().attr(name).map(|v| v.trim().to_string())
}

fn extract_elements(parsed: &Html) -> Vec<Element> {
    parsed
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .map(|el| {
            let attrs: BTreeMap<String, String> = el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect();
            let own_text: String = el
                .children()
                .filter_map(|c| c.value().as_text().map(|t| t.to_string()))
                .collect::<Vec<_>>()
                .join(" ");
            Element {
                tag: el.value().name().to_ascii_lowercase(),
                attrs,
                own_text: collapse_whitespace(&own_text),
            }
        })
        .collect()
}

fn extract_metas(parsed: &Html) -> Vec<Meta> {
    parsed
        .select(&META_SELECTOR)
        .map(|m| Meta {
            name: attr(&m, "name"),
            property: attr(&m, "property"),
            http_equiv: attr(&m, "http-equiv"),
            content: attr(&m, "content"),
        })
        .collect()
}

fn extract_headings(parsed: &Html) -> Vec<Heading> {
    parsed
        .select(&HEADING_SELECTOR)
        .filter_map(|h| {
            let level = h.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            Some(Heading {
                level,
                text: collapse_whitespace(&h.text().collect::<String>()),
            })
        })
        .collect()
}

fn classify_link(base: Option<&Url>, href: &str) -> (LinkKind, Option<String>) {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return (LinkKind::Other, None);
    }
    let Some(base) = base else {
        return (LinkKind::Other, None);
    };
    match resolve_link(base, trimmed) {
        Some(target) => {
            let internal = match (base.host_str(), target.host_str()) {
                (Some(a), Some(b)) => same_host(a, b),
                _ => false,
            };
            let kind = if internal {
                LinkKind::Internal
            } else {
                LinkKind::External
            };
            (kind, Some(target.to_string()))
        }
        None => (LinkKind::Other, None),
    }
}

fn extract_links(parsed: &Html, base: Option<&Url>) -> Vec<Link> {
    parsed
        .select(&LINK_SELECTOR)
        .map(|a| {
            let href = a.value().attr("href").unwrap_or_default().to_string();
            let (kind, url) = classify_link(base, &href);
            Link {
                href,
                url,
                text: collapse_whitespace(&a.text().collect::<String>()),
                kind,
            }
        })
        .collect()
}

fn extract_images(parsed: &Html) -> Vec<Image> {
    parsed
        .select(&IMAGE_SELECTOR)
        .map(|img| {
            let role = attr(&img, "role").unwrap_or_default().to_ascii_lowercase();
            let aria_hidden = attr(&img, "aria-hidden").is_some_and(|v| v == "true");
            Image {
                src: attr(&img, "src"),
                alt: img.value().attr("alt").map(str::to_string),
                decorative: role == "presentation" || role == "none" || aria_hidden,
            }
        })
        .collect()
}

fn extract_scripts(parsed: &Html) -> Vec<Script> {
    parsed
        .select(&SCRIPT_SELECTOR)
        .map(|s| {
            let src = attr(&s, "src").filter(|v| !v.is_empty());
            Script {
                content: if src.is_some() {
                    String::new()
                } else {
                    s.text().collect()
                },
                src,
                script_type: attr(&s, "type"),
                nonce: attr(&s, "nonce").filter(|v| !v.is_empty()),
            }
        })
        .collect()
}

fn rel_contains(element: &ElementRef, value: &str) -> bool {
    element
        .value()
        .attr("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case(value)))
}

fn extract_stylesheets(parsed: &Html) -> Vec<Stylesheet> {
    parsed
        .select(&LINK_REL_SELECTOR)
        .filter(|l| rel_contains(l, "stylesheet"))
        .filter_map(|l| {
            Some(Stylesheet {
                href: attr(&l, "href").filter(|h| !h.is_empty())?,
                media: attr(&l, "media"),
            })
        })
        .collect()
}

fn extract_canonical(parsed: &Html) -> Option<String> {
    parsed
        .select(&LINK_REL_SELECTOR)
        .find(|l| rel_contains(l, "canonical"))
        .and_then(|l| attr(&l, "href"))
        .filter(|h| !h.is_empty())
}

fn extract_form_controls(parsed: &Html) -> Vec<FormControl> {
    let label_targets: HashSet<String> = parsed
        .select(&LABEL_FOR_SELECTOR)
        .filter_map(|l| attr(&l, "for"))
        .collect();

    parsed
        .select(&FORM_CONTROL_SELECTOR)
        .filter_map(|control| {
            let tag = control.value().name().to_ascii_lowercase();
            let input_type = attr(&control, "type").map(|t| t.to_ascii_lowercase());
            if tag == "input"
                && input_type
                    .as_deref()
                    .is_some_and(|t| UNLABELED_INPUT_TYPES.contains(&t))
            {
                return None;
            }
            let id = attr(&control, "id").filter(|i| !i.is_empty());
            let has_text_attr = |name: &str| attr(&control, name).is_some_and(|v| !v.is_empty());
            let wrapped = control.ancestors().any(|node| {
                node.value()
                    .as_element()
                    .is_some_and(|e| e.name().eq_ignore_ascii_case("label"))
            });
            let labelled = id.as_ref().is_some_and(|i| label_targets.contains(i))
                || wrapped
                || has_text_attr("aria-label")
                || has_text_attr("aria-labelledby")
                || has_text_attr("title");
            Some(FormControl {
                tag,
                input_type,
                id,
                labelled,
            })
        })
        .collect()
}

fn extract_visible_text(parsed: &Html) -> String {
    let Some(body) = parsed.select(&BODY_SELECTOR).next() else {
        return String::new();
    };
    let mut pieces: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_TEXT_TAGS.contains(&e.name()))
        });
        if !hidden {
            pieces.push(&**text);
        }
    }
    collapse_whitespace(&pieces.join(" "))
}
