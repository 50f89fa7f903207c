//! Content-consistency audit over a generated site.
//!
//! Stage 3 of the pipeline. Reads every HTML document under the output
//! directory and reports findings the renderer is meant to rule out by
//! construction. Running it after `generate` (or against a deployed copy of
//! `dist/`) catches hand edits and regressions.
//!
//! ## Checks
//!
//! | Finding                    | Condition                                                    |
//! |----------------------------|--------------------------------------------------------------|
//! | `faq-mismatch`             | Accordion pairs differ from FAQPage JSON-LD (count, order, text) |
//! | `dangling-link`            | Same-site link whose target route was not generated          |
//! | `alternate-not-reciprocal` | Page A lists B as alternate, but B is missing or omits A     |
//! | `canonical-mismatch`       | Canonical URL is not the document's own location             |
//! | `mixed-affiliate-domains`  | Sponsored links on one page point at more than one host      |
//!
//! Findings are data. The CLI exits non-zero when any are reported.

use crate::routes::{absolute_url, directory_path, normalize_internal};
use crate::types::Manifest;
use rayon::prelude::*;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;
use url::Url;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Output directory does not exist: {0}")]
    MissingOutput(PathBuf),
}

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("Failed to parse anchor selector - this is a bug")
});

static SPONSORED_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href][rel~='sponsored']")
        .expect("Failed to parse sponsored selector - this is a bug")
});

static CANONICAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel='canonical'][href]")
        .expect("Failed to parse canonical selector - this is a bug")
});

static ALTERNATE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel='alternate'][hreflang][href]")
        .expect("Failed to parse alternate selector - this is a bug")
});

static REFRESH_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[http-equiv='refresh']")
        .expect("Failed to parse refresh selector - this is a bug")
});

static FAQ_ITEM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".faq-item").expect("Failed to parse FAQ item selector - this is a bug")
});

static FAQ_QUESTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".faq-question")
        .expect("Failed to parse FAQ question selector - this is a bug")
});

static FAQ_ANSWER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".faq-answer").expect("Failed to parse FAQ answer selector - this is a bug")
});

static JSON_LD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type='application/ld+json']")
        .expect("Failed to parse JSON-LD selector - this is a bug")
});

/// Origin used to resolve relative hrefs against a document's route.
const LOCAL_ORIGIN: &str = "http://audit.invalid/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingKind {
    FaqMismatch,
    DanglingLink,
    AlternateNotReciprocal,
    CanonicalMismatch,
    MixedAffiliateDomains,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FindingKind::FaqMismatch => "faq-mismatch",
            FindingKind::DanglingLink => "dangling-link",
            FindingKind::AlternateNotReciprocal => "alternate-not-reciprocal",
            FindingKind::CanonicalMismatch => "canonical-mismatch",
            FindingKind::MixedAffiliateDomains => "mixed-affiliate-domains",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    /// Route of the document the finding was raised on.
    pub page: String,
    pub detail: String,
}

#[derive(Debug, Default)]
pub struct AuditReport {
    /// Number of HTML documents inspected.
    pub documents: usize,
    /// Findings sorted by page, then kind.
    pub findings: Vec<Finding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Site origin. When set, canonical URLs must match it exactly and
    /// absolute links to this host are checked like relative ones.
    pub base_url: Option<Url>,
    /// Route prefixes served by other applications (e.g. `/nl/dierenartsen/`).
    /// Links under them are never dangling.
    pub external_prefixes: Vec<String>,
}

impl AuditOptions {
    /// Options matching how `manifest` was generated: its base URL and the
    /// vet directory route of every locale.
    pub fn for_manifest(manifest: &Manifest) -> Self {
        Self {
            base_url: manifest.config.base_url().ok(),
            external_prefixes: manifest
                .locales
                .iter()
                .map(|l| directory_path(&l.code, &l.config.directory.path))
                .collect(),
        }
    }
}

/// Facts extracted from one HTML document.
#[derive(Debug, Default)]
struct PageFacts {
    route: String,
    redirect: bool,
    canonical: Option<String>,
    /// `(hreflang, href)`
    alternates: Vec<(String, String)>,
    links: Vec<String>,
    sponsored_hosts: BTreeSet<String>,
    faq_visible: Vec<(String, String)>,
    faq_schema: Option<Vec<(String, String)>>,
}

/// Audit every document under `output_dir`.
pub fn audit(output_dir: &Path, options: &AuditOptions) -> Result<AuditReport, AuditError> {
    if !output_dir.is_dir() {
        return Err(AuditError::MissingOutput(output_dir.to_path_buf()));
    }

    let mut routes = BTreeSet::new();
    let mut documents = Vec::new();
    for entry in WalkDir::new(output_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(output_dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if rel.starts_with('.') {
            continue;
        }
        let route = file_route(&rel);
        if rel.ends_with(".html") {
            documents.push((route.clone(), entry.into_path()));
        }
        routes.insert(route);
    }

    let pages: Vec<PageFacts> = documents
        .par_iter()
        .map(|(route, path)| -> Result<PageFacts, AuditError> {
            let source = fs::read_to_string(path)?;
            Ok(extract_facts(route, &source, options.base_url.as_ref()))
        })
        .collect::<Result<_, AuditError>>()?;
    let by_route: BTreeMap<&str, &PageFacts> =
        pages.iter().map(|p| (p.route.as_str(), p)).collect();

    let mut findings = Vec::new();
    for page in &pages {
        check_faq(page, &mut findings);
        check_links(page, &routes, options, &mut findings);
        check_alternates(page, &by_route, &mut findings);
        check_canonical(page, options.base_url.as_ref(), &mut findings);
        check_affiliate_hosts(page, &mut findings);
    }
    findings.sort_by(|a, b| (&a.page, a.kind).cmp(&(&b.page, b.kind)));
    debug!(documents = pages.len(), findings = findings.len(), "audit finished");

    Ok(AuditReport {
        documents: pages.len(),
        findings,
    })
}

/// Route served by a file: `nl/x/index.html` → `/nl/x/`, `style.css` → `/style.css`.
fn file_route(rel: &str) -> String {
    if rel == "index.html" {
        "/".to_string()
    } else if let Some(dir) = rel.strip_suffix("/index.html") {
        format!("/{dir}/")
    } else {
        format!("/{rel}")
    }
}

/// Collapse runs of whitespace so markup indentation never counts as a difference.
fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(element: &ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| normalize_text(e.text()))
        .unwrap_or_default()
}

/// Same-site path an href points at, or `None` for external and non-http links.
fn internal_path(route: &str, href: &str, base: Option<&Url>) -> Option<String> {
    if href.starts_with('#') {
        return None;
    }
    let origin = Url::parse(LOCAL_ORIGIN).ok()?;
    let target = origin.join(route).ok()?.join(href).ok()?;
    if !matches!(target.scheme(), "http" | "https") {
        return None;
    }
    let same_site = target.host_str() == origin.host_str()
        || base.is_some_and(|b| b.host_str() == target.host_str());
    if !same_site {
        return None;
    }
    normalize_internal(target.path())
}

fn extract_facts(route: &str, source: &str, base: Option<&Url>) -> PageFacts {
    let document = Html::parse_document(source);
    let mut facts = PageFacts {
        route: route.to_string(),
        redirect: document.select(&REFRESH_SELECTOR).next().is_some(),
        canonical: document
            .select(&CANONICAL_SELECTOR)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(str::to_string),
        ..Default::default()
    };

    for link in document.select(&ALTERNATE_SELECTOR) {
        if let (Some(lang), Some(href)) = (link.value().attr("hreflang"), link.value().attr("href"))
        {
            facts.alternates.push((lang.to_string(), href.to_string()));
        }
    }
    for anchor in document.select(&ANCHOR_SELECTOR) {
        if let Some(href) = anchor.value().attr("href") {
            facts.links.push(href.to_string());
        }
    }
    for anchor in document.select(&SPONSORED_SELECTOR) {
        let host = anchor
            .value()
            .attr("href")
            .and_then(|href| Url::parse(href).ok())
            .and_then(|url| url.host_str().map(str::to_string));
        match host {
            Some(host) => facts.sponsored_hosts.insert(host),
            None => facts.sponsored_hosts.insert(String::new()),
        };
    }

    for item in document.select(&FAQ_ITEM_SELECTOR) {
        facts.faq_visible.push((
            element_text(&item, &FAQ_QUESTION_SELECTOR),
            element_text(&item, &FAQ_ANSWER_SELECTOR),
        ));
    }
    for script in document.select(&JSON_LD_SELECTOR) {
        let text: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        if value["@type"] == "FAQPage" {
            facts.faq_schema = Some(schema_faq_pairs(&value));
        }
    }

    // Alternate hrefs are absolute; keep only their same-site path.
    facts.alternates = facts
        .alternates
        .into_iter()
        .filter_map(|(lang, href)| internal_path(route, &href, base).map(|p| (lang, p)))
        .collect();
    facts
}

fn schema_faq_pairs(value: &Value) -> Vec<(String, String)> {
    value["mainEntity"]
        .as_array()
        .map(|entities| {
            entities
                .iter()
                .map(|q| {
                    let text = |v: &Value| normalize_text(v.as_str().unwrap_or_default().split(' '));
                    (text(&q["name"]), text(&q["acceptedAnswer"]["text"]))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn finding(kind: FindingKind, page: &PageFacts, detail: String) -> Finding {
    Finding {
        kind,
        page: page.route.clone(),
        detail,
    }
}

fn check_faq(page: &PageFacts, findings: &mut Vec<Finding>) {
    let visible = &page.faq_visible;
    let schema = page.faq_schema.as_deref().unwrap_or_default();
    if visible.is_empty() && page.faq_schema.is_none() {
        return;
    }
    if visible.len() != schema.len() {
        findings.push(finding(
            FindingKind::FaqMismatch,
            page,
            format!(
                "accordion has {} questions, FAQPage has {}",
                visible.len(),
                schema.len()
            ),
        ));
        return;
    }
    if let Some(i) = visible.iter().zip(schema).position(|(a, b)| a != b) {
        findings.push(finding(
            FindingKind::FaqMismatch,
            page,
            format!(
                "entry {} differs: accordion '{}' vs FAQPage '{}'",
                i + 1,
                visible[i].0,
                schema[i].0
            ),
        ));
    }
}

fn check_links(
    page: &PageFacts,
    routes: &BTreeSet<String>,
    options: &AuditOptions,
    findings: &mut Vec<Finding>,
) {
    let mut reported = BTreeSet::new();
    for href in &page.links {
        let Some(path) = internal_path(&page.route, href, options.base_url.as_ref()) else {
            continue;
        };
        let resolves = routes.contains(&path)
            || options
                .external_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()));
        if !resolves && reported.insert(path.clone()) {
            findings.push(finding(
                FindingKind::DanglingLink,
                page,
                format!("{href} → {path} was not generated"),
            ));
        }
    }
}

fn check_alternates(
    page: &PageFacts,
    by_route: &BTreeMap<&str, &PageFacts>,
    findings: &mut Vec<Finding>,
) {
    if page.redirect {
        return;
    }
    for (lang, target) in &page.alternates {
        if *target == page.route {
            continue;
        }
        match by_route.get(target.as_str()) {
            None => findings.push(finding(
                FindingKind::AlternateNotReciprocal,
                page,
                format!("{lang} alternate {target} does not exist"),
            )),
            Some(other) if lang != "x-default" => {
                if !other.alternates.iter().any(|(_, p)| *p == page.route) {
                    findings.push(finding(
                        FindingKind::AlternateNotReciprocal,
                        page,
                        format!("{lang} alternate {target} does not link back"),
                    ));
                }
            }
            Some(_) => {}
        }
    }
}

fn check_canonical(page: &PageFacts, base: Option<&Url>, findings: &mut Vec<Finding>) {
    let Some(canonical) = &page.canonical else {
        return;
    };
    let matches = match base {
        Some(base) => *canonical == absolute_url(base, &page.route),
        None => Url::parse(canonical).is_ok_and(|url| url.path() == page.route),
    };
    if !matches {
        findings.push(finding(
            FindingKind::CanonicalMismatch,
            page,
            format!("canonical {canonical} is not this document"),
        ));
    }
}

fn check_affiliate_hosts(page: &PageFacts, findings: &mut Vec<Finding>) {
    if page.sponsored_hosts.len() > 1 {
        let hosts: Vec<&str> = page.sponsored_hosts.iter().map(String::as_str).collect();
        findings.push(finding(
            FindingKind::MixedAffiliateDomains,
            page,
            format!("sponsored links point at {}", hosts.join(", ")),
        ));
    }
}
