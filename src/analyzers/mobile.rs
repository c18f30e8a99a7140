//! Viewport, zoom, breakpoint and touch-target checks.
//!
//! Layout is not rendered; everything is inferred from the viewport meta tag
//! and inline styles.

use crate::config::AuditConfig;
use crate::error_handling::AnalyzerError;
use crate::fetch::FetchResult;
use crate::models::{Axis, AxisResult, Severity};
use crate::parse::Document;

use super::css;
use super::{Analyzer, Findings};

/// Smallest comfortable touch target, in CSS pixels.
const MIN_TOUCH_TARGET_PX: f64 = 44.0;
const MAX_FIXED_WIDTH_PX: f64 = 640.0;
const MIN_ZOOM_SCALE: f64 = 2.0;

const TOUCH_TARGET_TAGS: &[&str] = &["a", "button"];

pub struct MobileAnalyzer;

impl Analyzer for MobileAnalyzer {
    fn axis(&self) -> Axis {
        Axis::Mobile
    }

    fn analyze(
        &self,
        doc: &Document,
        _fetch: &FetchResult,
        _config: &AuditConfig,
    ) -> Result<AxisResult, AnalyzerError> {
        let mut findings = Findings::new(Axis::Mobile);

        let viewport = doc.meta("viewport");
        findings.metric("has_viewport", viewport.is_some());
        match viewport.map(parse_viewport) {
            None => findings.flag(
                Severity::Medium,
                20.0,
                "Missing viewport meta tag",
                "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            ),
            Some(settings) => {
                let device_width = settings
                    .iter()
                    .any(|(k, v)| k == "width" && v == "device-width");
                if !device_width {
                    findings.flag(
                        Severity::Medium,
                        10.0,
                        "Viewport does not use width=device-width",
                        "Set width=device-width in the viewport meta tag",
                    );
                }
                if zoom_disabled(&settings) {
                    findings.flag(
                        Severity::Medium,
                        10.0,
                        "Viewport disables zooming",
                        "Remove user-scalable=no and keep maximum-scale at 2 or more",
                    );
                }
            }
        }

        let has_styles = !doc.inline_styles.is_empty();
        let has_breakpoints = doc.inline_styles.iter().any(|s| s.contains("@media"))
            || doc.stylesheets.iter().any(|s| s.media.is_some());
        if has_styles && !has_breakpoints {
            findings.flag(
                Severity::Low,
                5.0,
                "No responsive breakpoints in inline styles",
                "Add @media queries for small screens",
            );
        }

        let small_targets = count_small_touch_targets(doc);
        findings.metric("small_touch_targets", small_targets);
        if small_targets > 0 {
            findings.flag(
                Severity::Medium,
                10.0,
                format!("{small_targets} touch targets smaller than {MIN_TOUCH_TARGET_PX}px"),
                format!("Make links and buttons at least {MIN_TOUCH_TARGET_PX}x{MIN_TOUCH_TARGET_PX}px"),
            );
        }

        let fixed_width = count_fixed_width(doc);
        findings.metric("fixed_width_elements", fixed_width);
        if fixed_width > 0 {
            findings.flag(
                Severity::Medium,
                10.0,
                format!("{fixed_width} elements wider than {MAX_FIXED_WIDTH_PX}px"),
                "Use relative widths or max-width instead of fixed pixel widths",
            );
        }

        Ok(findings.finish())
    }
}

/// `key=value` pairs of a viewport `content`, lowercased.
fn parse_viewport(content: &str) -> Vec<(String, String)> {
    content
        .split([',', ';'])
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((
                key.trim().to_ascii_lowercase(),
                value.trim().to_ascii_lowercase(),
            ))
        })
        .collect()
}

fn zoom_disabled(settings: &[(String, String)]) -> bool {
    settings.iter().any(|(key, value)| match key.as_str() {
        "user-scalable" => value == "no" || value == "0",
        "maximum-scale" => value.parse::<f64>().is_ok_and(|scale| scale < MIN_ZOOM_SCALE),
        _ => false,
    })
}

fn count_small_touch_targets(doc: &Document) -> usize {
    TOUCH_TARGET_TAGS
        .iter()
        .flat_map(|tag| doc.elements(tag))
        .filter(|e| {
            let style = e.style();
            ["width", "height"].iter().any(|dim| {
                css::property(style, dim)
                    .and_then(|v| css::px_value(&v))
                    .is_some_and(|px| px < MIN_TOUCH_TARGET_PX)
            })
        })
        .count()
}

fn count_fixed_width(doc: &Document) -> usize {
    doc.elements_with_attr("style")
        .filter(|e| {
            let style = e.style();
            css::property(style, "width")
                .and_then(|v| css::px_value(&v))
                .is_some_and(|px| px > MAX_FIXED_WIDTH_PX)
                || css::property(style, "min-width")
                    .and_then(|v| css::px_value(&v))
                    .is_some_and(|px| px > MAX_FIXED_WIDTH_PX)
        })
        .count()
}
