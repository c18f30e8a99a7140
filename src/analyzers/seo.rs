//! Title, description, heading, canonical and structured-data checks.

use crate::config::AuditConfig;
use crate::error_handling::AnalyzerError;
use crate::fetch::FetchResult;
use crate::models::{Axis, AxisResult, Severity};
use crate::parse::{Document, LinkKind};

use super::{Analyzer, Findings};

const TITLE_MIN_CHARS: usize = 10;
const TITLE_MAX_CHARS: usize = 60;
const DESCRIPTION_MIN_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 160;

pub struct SeoAnalyzer;

impl Analyzer for SeoAnalyzer {
    fn axis(&self) -> Axis {
        Axis::Seo
    }

    fn analyze(
        &self,
        doc: &Document,
        _fetch: &FetchResult,
        _config: &AuditConfig,
    ) -> Result<AxisResult, AnalyzerError> {
        let mut findings = Findings::new(Axis::Seo);

        match doc.title.as_deref().filter(|t| !t.is_empty()) {
            None => findings.flag(
                Severity::High,
                20.0,
                "Missing title tag",
                "Add a descriptive title tag",
            ),
            Some(title) => {
                let length = title.chars().count();
                findings.metric("title_length", length);
                if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&length) {
                    let kind = if length < TITLE_MIN_CHARS { "short" } else { "long" };
                    findings.flag(
                        Severity::Medium,
                        10.0,
                        format!("Title too {kind}: {length} chars"),
                        format!(
                            "Keep the title between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"
                        ),
                    );
                }
            }
        }
        if doc.title_count > 1 {
            findings.flag(
                Severity::Medium,
                10.0,
                format!("Duplicate title tags: {}", doc.title_count),
                "Use exactly one title tag per page",
            );
        }

        match doc.meta("description").map(str::trim) {
            None | Some("") => findings.flag(
                Severity::High,
                15.0,
                "Missing meta description",
                "Add a meta description tag",
            ),
            Some(description) => {
                let length = description.chars().count();
                findings.metric("meta_description_length", length);
                if length < DESCRIPTION_MIN_CHARS {
                    findings.flag(
                        Severity::Medium,
                        10.0,
                        format!("Meta description too short: {length} chars"),
                        format!(
                            "Write a meta description of {DESCRIPTION_MIN_CHARS}-{DESCRIPTION_MAX_CHARS} characters"
                        ),
                    );
                } else if length > DESCRIPTION_MAX_CHARS {
                    findings.flag(
                        Severity::Low,
                        5.0,
                        format!("Meta description too long: {length} chars"),
                        format!("Trim the meta description to {DESCRIPTION_MAX_CHARS} characters"),
                    );
                }
            }
        }

        let h1_count = doc.headings_at(1).count();
        findings.metric("h1_count", h1_count);
        findings.metric("heading_count", doc.headings.len());
        if h1_count == 0 {
            findings.flag(
                Severity::High,
                15.0,
                "No H1 tag found",
                "Add an H1 tag for the main heading",
            );
        } else if h1_count > 1 {
            findings.flag(
                Severity::Medium,
                10.0,
                format!("Multiple H1 tags found: {h1_count}"),
                "Use only one H1 tag per page",
            );
        }
        if let Some((from, to)) = first_skipped_level(doc) {
            findings.flag(
                Severity::Low,
                5.0,
                format!("Heading level skipped: h{from} followed by h{to}"),
                "Nest headings without skipping levels",
            );
        }

        findings.metric("internal_links", doc.links_of(LinkKind::Internal).count());

        if doc.canonical.is_none() {
            findings.flag(
                Severity::Medium,
                10.0,
                "Missing canonical URL",
                "Add a canonical link to prevent duplicate content",
            );
        }

        if !doc.has_structured_data {
            findings.flag(
                Severity::Low,
                5.0,
                "No structured data found",
                "Describe the page with schema.org JSON-LD",
            );
        }

        Ok(findings.finish())
    }
}

/// First place where the outline jumps down more than one level.
fn first_skipped_level(doc: &Document) -> Option<(u8, u8)> {
    doc.headings
        .windows(2)
        .map(|pair| (pair[0].level, pair[1].level))
        .find(|(from, to)| *to > from + 1)
}
