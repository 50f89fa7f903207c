//! Content scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Walks the content tree, loads and validates
//! every content record, and produces the [`Manifest`] the generate stage
//! consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                             # Content root
//! ├── config.toml                      # Site configuration (optional)
//! ├── assets/                          # Copied verbatim to the output root
//! ├── nl/                              # Locale (must be configured)
//! │   ├── config.toml                  # Locale overrides (optional)
//! │   ├── lists.toml                   # Named lists (optional)
//! │   ├── 010-toxiciteit/              # Category (numbered = in nav)
//! │   │   ├── category.toml            # Title and description (optional)
//! │   │   ├── 010-chocolade-hond.toml  # Page (numbered = in nav)
//! │   │   └── 020-druiven-hond.toml
//! │   └── concepten/                   # Unnumbered = built, hidden from nav
//! └── en/
//!     └── 010-toxicity/
//!         └── 010-chocolate-dog.toml
//! ```
//!
//! ## Validation
//!
//! The scanner enforces these rules:
//! - Every locale directory is declared in config, and the default locale exists
//! - Slugs are lowercase and unique within their parent
//! - A translation key appears at most once per locale
//! - `related_list` names a list from the locale's `lists.toml`
//! - `related` references and site-absolute card/list links resolve to a route
//! - Affiliate calls to action require a configured affiliate domain

use crate::config::{self, ConfigError, SiteConfig};
use crate::content::{self, CATEGORY_FILE, ContentError, LISTS_FILE};
use crate::naming::{is_valid_slug, parse_entry_name};
use crate::routes::{self, RouteTable};
use crate::types::{Category, CtaKind, ListEntry, LocaleSite, Manifest, NavItem, Page};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{path}: {source}")]
    Content { path: PathBuf, source: ContentError },
    #[error("Directory is not a configured locale: {0}")]
    UnknownLocale(PathBuf),
    #[error("Default locale '{0}' has no content directory")]
    MissingDefaultLocale(String),
    #[error("Invalid slug (lowercase letters, digits, and dashes only): {0}")]
    InvalidSlug(PathBuf),
    #[error("Duplicate slug '{0}' in {1}")]
    DuplicateSlug(String, PathBuf),
    #[error("Translation key '{key}' used twice in locale '{locale}'")]
    DuplicateTranslationKey { key: String, locale: String },
    #[error("{page}: unknown related_list '{list}'")]
    UnknownList { list: String, page: PathBuf },
    #[error("{page}: link '{reference}' does not resolve to a page")]
    UnresolvedLink { reference: String, page: PathBuf },
    #[error("{0}: affiliate call to action but affiliate.domain is empty")]
    AffiliateDisabled(PathBuf),
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;

    let mut locales = Vec::new();
    for dir in list_dirs(root)? {
        let name = file_name(&dir);
        if name == config.assets_dir {
            continue;
        }
        if !config.locales.contains_key(&name) {
            return Err(ScanError::UnknownLocale(dir));
        }
        locales.push(scan_locale(root, &dir, &name, &config)?);
    }

    let default_locale = config.site.default_locale.clone();
    if !locales.iter().any(|l| l.code == default_locale) {
        return Err(ScanError::MissingDefaultLocale(default_locale));
    }
    locales.sort_by_key(|l| (l.code != default_locale, l.code.clone()));

    let manifest = Manifest { config, locales };
    check_links(&manifest)?;
    Ok(manifest)
}

fn scan_locale(
    root: &Path,
    dir: &Path,
    code: &str,
    root_config: &SiteConfig,
) -> Result<LocaleSite, ScanError> {
    let config = config::load_locale_config(root_config, dir)?;
    let lists_path = dir.join(LISTS_FILE);
    let lists = content::load_lists(&lists_path).map_err(|source| ScanError::Content {
        path: lists_path.clone(),
        source,
    })?;

    let mut categories = Vec::new();
    let mut seen = HashSet::new();
    for category_dir in list_dirs(dir)? {
        let category = scan_category(root, &category_dir, &config, &lists)?;
        if !seen.insert(category.slug.clone()) {
            return Err(ScanError::DuplicateSlug(category.slug, dir.to_path_buf()));
        }
        categories.push(category);
    }
    categories.sort_by(|a, b| (a.sort_key, &a.slug).cmp(&(b.sort_key, &b.slug)));

    let mut keys = HashSet::new();
    for page in categories.iter().flat_map(|c| &c.pages) {
        if let Some(key) = &page.article.translation_key
            && !keys.insert(key.clone())
        {
            return Err(ScanError::DuplicateTranslationKey {
                key: key.clone(),
                locale: code.to_string(),
            });
        }
    }

    let navigation = build_navigation(code, &categories);
    debug!(locale = code, categories = categories.len(), "scanned locale");

    Ok(LocaleSite {
        code: code.to_string(),
        config,
        categories,
        lists,
        navigation,
    })
}

fn scan_category(
    root: &Path,
    dir: &Path,
    config: &SiteConfig,
    lists: &BTreeMap<String, Vec<ListEntry>>,
) -> Result<Category, ScanError> {
    let parsed = parse_entry_name(&file_name(dir));
    if !is_valid_slug(&parsed.slug) {
        return Err(ScanError::InvalidSlug(dir.to_path_buf()));
    }
    let meta = content::load_category_meta(dir).map_err(|source| ScanError::Content {
        path: dir.join(CATEGORY_FILE),
        source,
    })?;

    let mut pages = Vec::new();
    let mut seen = HashSet::new();
    for path in list_files(dir)? {
        let name = file_name(&path);
        if name == CATEGORY_FILE {
            continue;
        }
        if path.extension().is_none_or(|e| e != "toml") {
            warn!(path = %path.display(), "ignoring non-page file");
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let page_name = parse_entry_name(&stem);
        if !is_valid_slug(&page_name.slug) {
            return Err(ScanError::InvalidSlug(path));
        }
        if !seen.insert(page_name.slug.clone()) {
            return Err(ScanError::DuplicateSlug(page_name.slug, dir.to_path_buf()));
        }

        let article = content::load_article(&path).map_err(|source| ScanError::Content {
            path: path.clone(),
            source,
        })?;
        if let Some(list) = &article.related_list
            && !lists.contains_key(list)
        {
            return Err(ScanError::UnknownList {
                list: list.clone(),
                page: path,
            });
        }
        if config.affiliate.domain.is_empty()
            && article.ctas.iter().any(|c| c.kind == CtaKind::Affiliate)
        {
            return Err(ScanError::AffiliateDisabled(path));
        }

        pages.push(Page {
            slug: page_name.slug.clone(),
            source_path: relative(root, &path),
            in_nav: page_name.in_nav(),
            sort_key: page_name.sort_key(),
            article,
        });
    }
    pages.sort_by(|a, b| (a.sort_key, &a.slug).cmp(&(b.sort_key, &b.slug)));
    if pages.is_empty() {
        warn!(dir = %dir.display(), "category has no pages");
    }

    Ok(Category {
        title: meta.title.unwrap_or(parsed.display_title.clone()),
        description: meta.description,
        in_nav: parsed.in_nav(),
        sort_key: parsed.sort_key(),
        slug: parsed.slug,
        source_dir: relative(root, dir),
        pages,
    })
}

/// Navigation tree: numbered categories, each with its numbered pages.
fn build_navigation(locale: &str, categories: &[Category]) -> Vec<NavItem> {
    categories
        .iter()
        .filter(|c| c.in_nav)
        .map(|category| NavItem {
            title: category.title.clone(),
            path: routes::category_path(locale, &category.slug),
            source_dir: category.source_dir.clone(),
            children: category
                .pages
                .iter()
                .filter(|p| p.in_nav)
                .map(|page| NavItem {
                    title: page.article.title.clone(),
                    path: routes::page_path(locale, &category.slug, &page.slug),
                    source_dir: String::new(),
                    children: vec![],
                })
                .collect(),
        })
        .collect()
}

/// Every `related` reference and every site-absolute card or list link must
/// land on a route.
fn check_links(manifest: &Manifest) -> Result<(), ScanError> {
    let table = RouteTable::build(manifest);
    debug!(routes = table.len(), "resolving links");
    for (locale, _, page) in manifest.pages() {
        let unresolved = |reference: &str| ScanError::UnresolvedLink {
            reference: reference.to_string(),
            page: PathBuf::from(&page.source_path),
        };
        for reference in &page.article.related {
            if table.resolve_related(&locale.code, reference).is_none() {
                return Err(unresolved(reference));
            }
        }
        let card_links = page
            .article
            .sections
            .iter()
            .flat_map(|s| &s.cards)
            .filter_map(|c| c.link.as_deref());
        for link in card_links.filter(|l| l.starts_with('/')) {
            if !table.resolves(link) {
                return Err(unresolved(link));
            }
        }
        if let Some(entries) = page
            .article
            .related_list
            .as_ref()
            .and_then(|name| locale.lists.get(name))
        {
            for link in entries.iter().filter_map(|e| e.link.as_deref()) {
                if link.starts_with('/') && !table.resolves(link) {
                    return Err(unresolved(link));
                }
            }
        }
    }
    Ok(())
}

/// Immediate subdirectories, sorted by name, hidden entries skipped.
fn list_dirs(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    list_entries(path, true)
}

/// Immediate files, sorted by name, hidden entries and `config.toml`/`lists.toml` skipped.
fn list_files(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    list_entries(path, false)
}

fn list_entries(path: &Path, dirs: bool) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || name == "config.toml" || name == LISTS_FILE {
            continue;
        }
        if entry.file_type().is_dir() == dirs {
            entries.push(entry.into_path());
        }
    }
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Path relative to the content root, with forward slashes.
fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
