//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (locale,
//! category, page) leads with its positional index and title. Filesystem
//! paths are secondary context on indented `Source:` lines, so the output
//! reads as a content inventory while still pointing back at files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Locale nl (default)
//! 001 Giftig voor huisdieren (2 pages)
//!     Source: nl/010-toxiciteit/
//!     001 Is chocolade giftig voor honden?
//!         Source: nl/010-toxiciteit/010-chocolade-hond.toml
//!         FAQ: 5 questions
//!     concepten (1 page, hidden)
//!
//! Lists
//!     veilige-snacks-hond (3 entries)
//! ```
//!
//! ## Generate
//!
//! ```text
//! nl → nl/index.html
//!     4 categories, 5 pages
//! en → en/index.html
//!     3 categories, 3 pages
//!
//! Assets: 1
//! Cache: 2 written, 5 unchanged (7 total)
//! ```
//!
//! ## Audit
//!
//! ```text
//! dangling-link /nl/toxiciteit/druiven-hond/
//!     /nl/nergens/ → /nl/nergens/
//!
//! Audited 14 documents, 1 finding
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::audit::AuditReport;
use crate::generate::GenerateResult;
use crate::types::{Category, LocaleSite, Manifest};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Header line for a category: numbered ones get an index, hidden ones are
/// indented and flagged.
fn category_header(index: Option<usize>, category: &Category) -> String {
    let count = plural(category.pages.len(), "page", "pages");
    match index {
        Some(i) => format!("{} {} ({})", format_index(i), category.title, count),
        None => format!("{}{} ({}, hidden)", indent(1), category.slug, count),
    }
}

// ============================================================================
// Scan
// ============================================================================

fn format_locale(locale: &LocaleSite, is_default: bool, lines: &mut Vec<String>) {
    let marker = if is_default { " (default)" } else { "" };
    lines.push(format!("Locale {}{}", locale.code, marker));

    let mut position = 0;
    for category in &locale.categories {
        let index = category.in_nav.then(|| {
            position += 1;
            position
        });
        lines.push(category_header(index, category));
        lines.push(format!("{}Source: {}/", indent(1), category.source_dir));

        let mut page_position = 0;
        for page in &category.pages {
            let label = if page.in_nav {
                page_position += 1;
                format!("{} {}", format_index(page_position), page.article.title)
            } else {
                format!("{} (hidden)", page.article.title)
            };
            lines.push(format!("{}{}", indent(1), label));
            lines.push(format!("{}Source: {}", indent(2), page.source_path));
            if !page.article.faq.is_empty() {
                lines.push(format!(
                    "{}FAQ: {}",
                    indent(2),
                    plural(page.article.faq.len(), "question", "questions")
                ));
            }
            if let Some(key) = &page.article.translation_key {
                lines.push(format!("{}Translation: {}", indent(2), key));
            }
        }
    }

    if !locale.lists.is_empty() {
        lines.push(String::new());
        lines.push("Lists".to_string());
        for (name, entries) in &locale.lists {
            lines.push(format!(
                "{}{} ({})",
                indent(1),
                name,
                plural(entries.len(), "entry", "entries")
            ));
        }
    }
}

/// Format scan stage output showing the discovered content per locale.
pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, locale) in manifest.locales.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        let is_default = locale.code == manifest.config.site.default_locale;
        format_locale(locale, is_default, &mut lines);
    }
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format generate stage output: per-locale totals, assets, and cache stats.
pub fn format_generate_output(result: &GenerateResult) -> Vec<String> {
    let mut lines = Vec::new();
    for locale in &result.locales {
        lines.push(format!("{} → {}/index.html", locale.code, locale.code));
        lines.push(format!(
            "{}{}, {}",
            indent(1),
            plural(locale.categories, "category", "categories"),
            plural(locale.pages, "page", "pages")
        ));
    }
    lines.push(String::new());
    lines.push(format!("Assets: {}", result.assets));
    lines.push(format!("Cache: {}", result.cache));
    lines
}

pub fn print_generate_output(result: &GenerateResult) {
    for line in format_generate_output(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Audit
// ============================================================================

/// Format audit findings, one header plus an indented detail line each,
/// followed by a summary.
pub fn format_audit_report(report: &AuditReport) -> Vec<String> {
    let mut lines = Vec::new();
    for finding in &report.findings {
        lines.push(format!("{} {}", finding.kind, finding.page));
        lines.push(format!("{}{}", indent(1), finding.detail));
    }
    if !report.findings.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Audited {}, {}",
        plural(report.documents, "document", "documents"),
        plural(report.findings.len(), "finding", "findings")
    ));
    lines
}

pub fn print_audit_report(report: &AuditReport) {
    for line in format_audit_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Finding, FindingKind};
    use crate::cache::CacheStats;
    use crate::generate::LocaleSummary;
    use crate::scan::scan;
    use crate::test_helpers::*;

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_picks_form() {
        assert_eq!(plural(1, "page", "pages"), "1 page");
        assert_eq!(plural(0, "page", "pages"), "0 pages");
        assert_eq!(plural(3, "entry", "entries"), "3 entries");
    }

    #[test]
    fn scan_output_sample_manifest() {
        let lines = format_scan_output(&sample_manifest());
        assert_eq!(
            lines,
            vec![
                "Locale nl (default)",
                "001 toxiciteit (1 page)",
                "    Source: nl/010-toxiciteit/",
                "    001 Chocolade",
                "        Source: nl/010-toxiciteit/010-chocolade-hond.toml",
                "        Translation: chocolate-dog",
                "",
                "Locale en",
                "001 toxicity (1 page)",
                "    Source: en/010-toxicity/",
                "    001 Chocolate",
                "        Source: en/010-toxicity/010-chocolate-dog.toml",
                "        Translation: chocolate-dog",
            ]
        );
    }

    #[test]
    fn scan_output_fixtures() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest);

        assert_eq!(lines[0], "Locale nl (default)");
        assert!(lines.contains(&"001 Giftig voor huisdieren (2 pages)".to_string()));
        assert!(lines.contains(&"    001 Is chocolade giftig voor honden?".to_string()));
        assert!(lines.contains(&"        FAQ: 5 questions".to_string()));
        assert!(lines.contains(&"    concepten (1 page, hidden)".to_string()));
        assert!(lines.contains(&"Locale en".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("    veilige-snacks-hond (")));
    }

    #[test]
    fn generate_output_lists_locales_and_cache() {
        let result = GenerateResult {
            locales: vec![
                LocaleSummary {
                    code: "nl".to_string(),
                    categories: 4,
                    pages: 5,
                },
                LocaleSummary {
                    code: "en".to_string(),
                    categories: 1,
                    pages: 1,
                },
            ],
            assets: 1,
            cache: CacheStats {
                unchanged: 5,
                written: 2,
                removed: 0,
            },
        };
        assert_eq!(
            format_generate_output(&result),
            vec![
                "nl → nl/index.html",
                "    4 categories, 5 pages",
                "en → en/index.html",
                "    1 category, 1 page",
                "",
                "Assets: 1",
                "Cache: 2 written, 5 unchanged (7 total)",
            ]
        );
    }

    #[test]
    fn audit_report_clean() {
        let report = AuditReport {
            documents: 14,
            findings: vec![],
        };
        assert_eq!(
            format_audit_report(&report),
            vec!["Audited 14 documents, 0 findings"]
        );
    }

    #[test]
    fn audit_report_with_findings() {
        let report = AuditReport {
            documents: 2,
            findings: vec![Finding {
                kind: FindingKind::DanglingLink,
                page: "/nl/a/".to_string(),
                detail: "/nl/nergens/ → /nl/nergens/".to_string(),
            }],
        };
        assert_eq!(
            format_audit_report(&report),
            vec![
                "dangling-link /nl/a/",
                "    /nl/nergens/ → /nl/nergens/",
                "",
                "Audited 2 documents, 1 finding",
            ]
        );
    }
}
