//! Alt text, form labels, landmarks, language and contrast checks.

use crate::config::AuditConfig;
use crate::error_handling::AnalyzerError;
use crate::fetch::FetchResult;
use crate::models::{Axis, AxisResult, Severity};
use crate::parse::Document;

use super::css;
use super::{Analyzer, Findings};

/// Maximum penalty for images without alt text, scaled by the missing share.
const ALT_TEXT_PENALTY: f64 = 30.0;
const LABEL_PENALTY: f64 = 20.0;
/// WCAG AA minimum for normal text.
const MIN_CONTRAST: f64 = 4.5;

const LANDMARK_TAGS: &[&str] = &["main", "nav", "header", "footer"];
const LANDMARK_ROLES: &[&str] = &["main", "navigation", "banner", "contentinfo"];

pub struct AccessibilityAnalyzer;

impl Analyzer for AccessibilityAnalyzer {
    fn axis(&self) -> Axis {
        Axis::Accessibility
    }

    fn analyze(
        &self,
        doc: &Document,
        _fetch: &FetchResult,
        _config: &AuditConfig,
    ) -> Result<AxisResult, AnalyzerError> {
        let mut findings = Findings::new(Axis::Accessibility);

        let total_images = doc.images.len();
        let missing_alt = doc.images.iter().filter(|img| img.missing_alt()).count();
        findings.metric("images_missing_alt", missing_alt);
        if missing_alt > 0 {
            let share = missing_alt as f64 / total_images as f64;
            let severity = if share >= 0.5 {
                Severity::High
            } else {
                Severity::Medium
            };
            findings.flag(
                severity,
                ALT_TEXT_PENALTY * share,
                format!("{missing_alt} of {total_images} images missing alt text"),
                "Add descriptive alt text to all images",
            );
        }

        let total_controls = doc.form_controls.len();
        let unlabeled = doc.form_controls.iter().filter(|c| !c.labelled).count();
        findings.metric("unlabeled_inputs", unlabeled);
        if unlabeled > 0 {
            findings.flag(
                Severity::High,
                LABEL_PENALTY * unlabeled as f64 / total_controls as f64,
                format!("{unlabeled} form inputs without labels"),
                "Associate a <label> or aria-label with every form input",
            );
        }

        if !has_landmarks(doc) {
            findings.flag(
                Severity::Medium,
                10.0,
                "No ARIA landmarks found",
                "Wrap page regions in <main>, <nav>, <header> and <footer>",
            );
        }

        if doc.lang.is_none() {
            findings.flag(
                Severity::Medium,
                10.0,
                "Missing lang attribute on <html>",
                "Declare the page language, e.g. <html lang=\"en\">",
            );
        }

        if !doc.links.is_empty() && !has_skip_link(doc) {
            findings.flag(
                Severity::Low,
                5.0,
                "No skip link found",
                "Add a \"skip to content\" link for keyboard navigation",
            );
        }

        let low_contrast = count_low_contrast(doc);
        findings.metric("low_contrast_elements", low_contrast);
        if low_contrast > 0 {
            findings.flag(
                Severity::Medium,
                (5.0 * low_contrast as f64).min(15.0),
                format!("{low_contrast} elements with insufficient color contrast"),
                format!("Use a contrast ratio of at least {MIN_CONTRAST}:1 for text"),
            );
        }

        Ok(findings.finish())
    }
}

fn has_landmarks(doc: &Document) -> bool {
    LANDMARK_TAGS.iter().any(|tag| doc.has_element(tag))
        || doc.elements_with_attr("role").any(|e| {
            e.attr("role")
                .is_some_and(|role| LANDMARK_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()))
        })
}

fn has_skip_link(doc: &Document) -> bool {
    doc.links.iter().any(|link| {
        let href = link.href.to_ascii_lowercase();
        href.len() > 1
            && href.starts_with('#')
            && (href == "#main"
                || href == "#content"
                || href.contains("main-content")
                || link.text.to_lowercase().contains("skip"))
    })
}

/// Elements whose inline `color` and background are both known and too close.
fn count_low_contrast(doc: &Document) -> usize {
    doc.elements_with_attr("style")
        .filter(|e| {
            let style = e.style();
            let foreground = css::property(style, "color").and_then(|c| css::parse_color(&c));
            let background = css::property(style, "background-color")
                .or_else(|| css::property(style, "background"))
                .and_then(|c| css::parse_color(&c));
            match (foreground, background) {
                (Some(fg), Some(bg)) => css::contrast_ratio(fg, bg) < MIN_CONTRAST,
                _ => false,
            }
        })
        .count()
}
