//! The owned document model shared by all analyzers of a page.
//!
//! Nothing here borrows from the parser, so a `Document` is `Send + Sync` and
//! can sit behind an `Arc` while analyzers run on different tasks.

use std::collections::BTreeMap;

/// Any element of the page: tag name, attributes and its own (direct) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes keyed by lowercase name.
    pub attrs: BTreeMap<String, String>,
    /// Text of direct child text nodes, whitespace-collapsed.
    pub own_text: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(&name.to_ascii_lowercase())
    }

    /// Inline `style` attribute, empty when absent.
    pub fn style(&self) -> &str {
        self.attr("style").unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub name: Option<String>,
    pub property: Option<String>,
    pub http_equiv: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1 through 6.
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Same host as the page, ignoring a leading `www.`.
    Internal,
    External,
    /// mailto:, tel:, javascript:, fragment-only and unresolvable links.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// `href` as written.
    pub href: String,
    /// Absolute URL for internal and external links.
    pub url: Option<String>,
    pub text: String,
    pub kind: LinkKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: Option<String>,
    pub alt: Option<String>,
    /// `role="presentation"`/`"none"` or `aria-hidden="true"`.
    pub decorative: bool,
}

impl Image {
    /// Non-decorative image without usable alt text.
    pub fn missing_alt(&self) -> bool {
        !self.decorative && self.alt.as_deref().map_or(true, |alt| alt.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub src: Option<String>,
    pub script_type: Option<String>,
    pub nonce: Option<String>,
    /// Inline source; empty for external scripts.
    pub content: String,
}

impl Script {
    pub fn is_inline(&self) -> bool {
        self.src.is_none()
    }

    /// Executable JavaScript, as opposed to data blocks like JSON-LD.
    pub fn is_javascript(&self) -> bool {
        match self.script_type.as_deref().map(|t| t.trim().to_ascii_lowercase()) {
            None => true,
            Some(t) => {
                t.is_empty()
                    || t == "module"
                    || t.contains("javascript")
                    || t.contains("ecmascript")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub href: String,
    pub media: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    /// `input`, `select` or `textarea`.
    pub tag: String,
    pub input_type: Option<String>,
    pub id: Option<String>,
    pub labelled: bool,
}

/// A parsed, read-only page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// URL the page was served from; links are resolved against it.
    pub url: String,
    /// First `<title>`, trimmed.
    pub title: Option<String>,
    pub title_count: usize,
    /// `lang` of `<html>`.
    pub lang: Option<String>,
    pub canonical: Option<String>,
    pub metas: Vec<Meta>,
    pub headings: Vec<Heading>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub scripts: Vec<Script>,
    pub stylesheets: Vec<Stylesheet>,
    /// Contents of `<style>` blocks.
    pub inline_styles: Vec<String>,
    pub form_controls: Vec<FormControl>,
    /// JSON-LD or microdata present.
    pub has_structured_data: bool,
    /// Schema.org types named by JSON-LD `@type` or microdata `itemtype`.
    pub schema_types: Vec<String>,
    /// Text under `<body>` outside script/style/noscript/template.
    pub visible_text: String,
    pub word_count: usize,
    /// Every element in document order.
    pub elements: Vec<Element>,
}

impl Document {
    pub fn elements(&self, tag: &str) -> impl Iterator<Item = &Element> {
        let tag = tag.to_ascii_lowercase();
        self.elements.iter().filter(move |e| e.tag == tag)
    }

    pub fn elements_with_attr(&self, name: &str) -> impl Iterator<Item = &Element> {
        let name = name.to_ascii_lowercase();
        self.elements.iter().filter(move |e| e.attrs.contains_key(&name))
    }

    pub fn has_element(&self, tag: &str) -> bool {
        self.elements(tag).next().is_some()
    }

    /// Case-insensitive search of the visible text.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.visible_text
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    /// Content of the first `<meta name=...>`, name compared case-insensitively.
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.metas
            .iter()
            .find(|m| m.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .and_then(|m| m.content.as_deref())
    }

    pub fn meta_property(&self, property: &str) -> Option<&str> {
        self.metas
            .iter()
            .find(|m| {
                m.property
                    .as_deref()
                    .is_some_and(|p| p.eq_ignore_ascii_case(property))
            })
            .and_then(|m| m.content.as_deref())
    }

    /// Content of the first `<meta http-equiv=...>`.
    pub fn meta_http_equiv(&self, header: &str) -> Option<&str> {
        self.metas
            .iter()
            .find(|m| {
                m.http_equiv
                    .as_deref()
                    .is_some_and(|h| h.eq_ignore_ascii_case(header))
            })
            .and_then(|m| m.content.as_deref())
    }

    pub fn headings_at(&self, level: u8) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |h| h.level == level)
    }

    pub fn links_of(&self, kind: LinkKind) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.kind == kind)
    }

    pub fn inline_scripts(&self) -> impl Iterator<Item = &Script> {
        self.scripts
            .iter()
            .filter(|s| s.is_inline() && s.is_javascript() && !s.content.trim().is_empty())
    }

    pub fn external_scripts(&self) -> impl Iterator<Item = &Script> {
        self.scripts.iter().filter(|s| !s.is_inline())
    }

    /// Words of the visible text, in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.visible_text.split_whitespace()
    }
}
