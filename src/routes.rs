//! Locale-prefixed routing.
//!
//! Every generated document lives at a directory-style route written as
//! `index.html`:
//!
//! ```text
//! /                              → redirect to /{default_locale}/
//! /{locale}/                     → locale home (category cards)
//! /{locale}/{category}/          → category index (page cards)
//! /{locale}/{category}/{page}/   → content page
//! ```
//!
//! The [`RouteTable`] is the set of all routes the site will contain. It
//! resolves cross-links during scan, and maps translation keys to the locale
//! variants of an article so alternates are reciprocal by construction: every
//! variant is computed from the same key → locale → path map.

use crate::types::Manifest;
use percent_encoding::percent_decode_str;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// `hreflang` value pointing at the default-locale variant.
pub const X_DEFAULT: &str = "x-default";

pub fn home_path(locale: &str) -> String {
    format!("/{locale}/")
}

pub fn category_path(locale: &str, category: &str) -> String {
    format!("/{locale}/{category}/")
}

pub fn page_path(locale: &str, category: &str, page: &str) -> String {
    format!("/{locale}/{category}/{page}/")
}

/// Provider directory route; served by another application.
pub fn directory_path(locale: &str, directory: &str) -> String {
    format!("/{locale}/{directory}/")
}

/// A locale variant of the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternate {
    pub hreflang: String,
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeSet<String>,
    /// translation key → locale → page path
    translations: BTreeMap<String, BTreeMap<String, String>>,
    /// locale → home path
    homes: BTreeMap<String, String>,
    /// Route prefixes owned by other applications (the provider directory).
    external_prefixes: Vec<String>,
    default_locale: String,
}

impl RouteTable {
    /// Collect every route the generate stage will write.
    pub fn build(manifest: &Manifest) -> Self {
        let mut table = RouteTable {
            default_locale: manifest.config.site.default_locale.clone(),
            ..Default::default()
        };
        table.routes.insert("/".to_string());
        for file in ["/sitemap.xml", "/robots.txt", "/style.css"] {
            table.routes.insert(file.to_string());
        }

        for locale in &manifest.locales {
            let home = home_path(&locale.code);
            table.routes.insert(home.clone());
            table.homes.insert(locale.code.clone(), home);
            table
                .external_prefixes
                .push(directory_path(&locale.code, &locale.config.directory.path));

            for category in &locale.categories {
                table
                    .routes
                    .insert(category_path(&locale.code, &category.slug));
                for page in &category.pages {
                    let path = page_path(&locale.code, &category.slug, &page.slug);
                    if let Some(key) = &page.article.translation_key {
                        table
                            .translations
                            .entry(key.clone())
                            .or_default()
                            .insert(locale.code.clone(), path.clone());
                    }
                    table.routes.insert(path);
                }
            }
        }
        table
    }

    /// Whether an internal href points at a route of this site or at a
    /// route owned by a known external application.
    pub fn resolves(&self, href: &str) -> bool {
        match normalize_internal(href) {
            Some(path) => {
                self.routes.contains(&path)
                    || self.external_prefixes.iter().any(|p| path.starts_with(p))
            }
            None => false,
        }
    }

    /// Resolve a `related` reference from a page in `locale`.
    ///
    /// A reference starting with `/` is a site path inside `locale`; anything
    /// else is a translation key, resolved to that key's variant in the same
    /// locale. Paths into another locale do not resolve.
    pub fn resolve_related(&self, locale: &str, reference: &str) -> Option<String> {
        if reference.starts_with('/') {
            let path = normalize_internal(reference)?;
            let in_locale = path.starts_with(&home_path(locale));
            return (in_locale && self.routes.contains(&path)).then_some(path);
        }
        self.translation(reference, locale).map(str::to_string)
    }

    /// Path of a translation key's variant in one locale.
    pub fn translation(&self, key: &str, locale: &str) -> Option<&str> {
        self.translations
            .get(key)
            .and_then(|variants| variants.get(locale))
            .map(String::as_str)
    }

    /// Alternates for an article. Empty unless the key has at least two
    /// locale variants.
    pub fn alternates(&self, translation_key: Option<&str>) -> Vec<Alternate> {
        let Some(variants) = translation_key.and_then(|k| self.translations.get(k)) else {
            return Vec::new();
        };
        self.alternates_from(variants)
    }

    /// Alternates for the locale home pages.
    pub fn home_alternates(&self) -> Vec<Alternate> {
        self.alternates_from(&self.homes)
    }

    fn alternates_from(&self, variants: &BTreeMap<String, String>) -> Vec<Alternate> {
        if variants.len() < 2 {
            return Vec::new();
        }
        let mut alternates: Vec<Alternate> = variants
            .iter()
            .map(|(locale, path)| Alternate {
                hreflang: locale.clone(),
                path: path.clone(),
            })
            .collect();
        if let Some(path) = variants.get(&self.default_locale) {
            alternates.push(Alternate {
                hreflang: X_DEFAULT.to_string(),
                path: path.clone(),
            });
        }
        alternates
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Normalize a site-absolute href to its route.
///
/// Query strings and fragments are dropped, percent-escapes are decoded,
/// `…/index.html` collapses to its directory route, and extension-less paths
/// gain a trailing slash. Returns `None` for anything that is not a
/// site-absolute path (external URLs, protocol-relative URLs, `mailto:`,
/// bare fragments).
pub fn normalize_internal(href: &str) -> Option<String> {
    if !href.starts_with('/') || href.starts_with("//") {
        return None;
    }
    let end = href.find(['?', '#']).unwrap_or(href.len());
    let mut path = percent_decode_str(&href[..end])
        .decode_utf8_lossy()
        .into_owned();
    if path.ends_with("/index.html") {
        path.truncate(path.len() - "index.html".len());
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    if !path.ends_with('/') && !last.contains('.') {
        path.push('/');
    }
    Some(path)
}

/// Join a site path onto the configured origin.
pub fn absolute_url(base: &Url, path: &str) -> String {
    base.join(path)
        .map(String::from)
        .unwrap_or_else(|_| format!("{}{}", base.as_str().trim_end_matches('/'), path))
}
