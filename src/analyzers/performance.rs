//! Page weight, compression, caching and asset-count checks.

use crate::config::{AuditConfig, CACHING_HEADERS, HEADER_CONTENT_ENCODING};
use crate::error_handling::AnalyzerError;
use crate::fetch::FetchResult;
use crate::models::{Axis, AxisResult, Severity};
use crate::parse::Document;

use super::{round2, Analyzer, Findings};

const LARGE_PAGE_BYTES: usize = 1024 * 1024;
const VERY_LARGE_PAGE_BYTES: usize = 2 * 1024 * 1024;
const MAX_STYLESHEETS: usize = 5;
const MAX_EXTERNAL_SCRIPTS: usize = 10;
/// Total inline `<script>` or `<style>` bytes above which bundling is suggested.
const LARGE_INLINE_BYTES: usize = 50 * 1024;

pub struct PerformanceAnalyzer;

impl Analyzer for PerformanceAnalyzer {
    fn axis(&self) -> Axis {
        Axis::Performance
    }

    fn analyze(
        &self,
        doc: &Document,
        fetch: &FetchResult,
        _config: &AuditConfig,
    ) -> Result<AxisResult, AnalyzerError> {
        let mut findings = Findings::new(Axis::Performance);

        let page_size = fetch.body.len();
        let page_kb = round2(page_size as f64 / 1024.0);
        findings.metric("page_size_bytes", page_size);
        findings.metric("page_size_kb", page_kb);
        findings.metric("transfer_size_bytes", fetch.transfer_size);
        findings.metric("response_time_ms", fetch.elapsed.as_millis() as i64);

        if page_size > VERY_LARGE_PAGE_BYTES {
            findings.flag(
                Severity::High,
                30.0,
                format!("Very large page size: {page_kb}KB"),
                "Split the page and optimize images, CSS and JavaScript",
            );
        } else if page_size > LARGE_PAGE_BYTES {
            findings.flag(
                Severity::Medium,
                15.0,
                format!("Large page size: {page_kb}KB"),
                "Optimize images and minify CSS/JS",
            );
        }

        if !fetch.headers.contains(HEADER_CONTENT_ENCODING) {
            findings.flag(
                Severity::Medium,
                15.0,
                "No compression detected",
                "Enable gzip or brotli compression",
            );
        }

        if !CACHING_HEADERS.iter().any(|h| fetch.headers.contains(h)) {
            findings.flag(
                Severity::Medium,
                10.0,
                "No caching headers found",
                "Send Cache-Control, ETag or Last-Modified headers",
            );
        }

        let css_files = doc.stylesheets.len();
        let js_files = doc.external_scripts().count();
        findings.metric("total_images", doc.images.len());
        findings.metric("css_files", css_files);
        findings.metric("js_files", js_files);

        if css_files > MAX_STYLESHEETS {
            findings.flag(
                Severity::Medium,
                10.0,
                format!("Too many CSS files: {css_files}"),
                "Combine CSS files to reduce HTTP requests",
            );
        }
        if js_files > MAX_EXTERNAL_SCRIPTS {
            findings.flag(
                Severity::Medium,
                10.0,
                format!("Too many JS files: {js_files}"),
                "Combine and minify JavaScript files",
            );
        }

        let inline_script_bytes: usize = doc.inline_scripts().map(|s| s.content.len()).sum();
        let inline_style_bytes: usize = doc.inline_styles.iter().map(String::len).sum();
        findings.metric("inline_script_bytes", inline_script_bytes);
        findings.metric("inline_style_bytes", inline_style_bytes);

        if inline_script_bytes > LARGE_INLINE_BYTES {
            findings.flag(
                Severity::Medium,
                10.0,
                format!(
                    "Large inline scripts: {}KB",
                    round2(inline_script_bytes as f64 / 1024.0)
                ),
                "Move inline JavaScript into minified, cacheable files",
            );
        }
        if inline_style_bytes > LARGE_INLINE_BYTES {
            findings.flag(
                Severity::Low,
                5.0,
                format!(
                    "Large inline styles: {}KB",
                    round2(inline_style_bytes as f64 / 1024.0)
                ),
                "Move inline CSS into minified, cacheable stylesheets",
            );
        }

        Ok(findings.finish())
    }
}
