//! Shared test utilities for the petpedia test suite.
//!
//! Provides fixture setup, lookup helpers, and navigation tree assertions
//! that work with scan-phase data structures (`Manifest`, `LocaleSite`,
//! `Category`, `Page`), plus small in-memory manifests for unit tests that
//! should not touch the filesystem.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let nl = find_locale(&manifest, "nl");
//! let page = find_page(find_category(nl, "toxiciteit"), "chocolade-hond");
//! assert_eq!(page.article.faq.len(), 5);
//!
//! assert_nav_shape(nl, &[
//!     ("Giftig voor huisdieren", &["Is chocolade giftig voor honden?"]),
//!     ("Verzorging", &[]),
//! ]);
//! ```

use chrono::NaiveDate;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::types::{Article, Category, Hero, LocaleSite, Manifest, Page};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Manifest lookups; panic with a clear message on miss
// =========================================================================

/// Find a locale by code. Panics if not found.
pub fn find_locale<'a>(manifest: &'a Manifest, code: &str) -> &'a LocaleSite {
    manifest.locale(code).unwrap_or_else(|| {
        let codes: Vec<&str> = manifest.locales.iter().map(|l| l.code.as_str()).collect();
        panic!("locale '{code}' not found. Available: {codes:?}")
    })
}

/// Find a category by slug. Panics if not found.
pub fn find_category<'a>(locale: &'a LocaleSite, slug: &str) -> &'a Category {
    locale
        .categories
        .iter()
        .find(|c| c.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = locale.categories.iter().map(|c| c.slug.as_str()).collect();
            panic!(
                "category '{slug}' not found in locale '{}'. Available: {slugs:?}",
                locale.code
            )
        })
}

/// Find a page by slug within a category. Panics if not found.
pub fn find_page<'a>(category: &'a Category, slug: &str) -> &'a Page {
    category
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = category.pages.iter().map(|p| p.slug.as_str()).collect();
            panic!(
                "page '{slug}' not found in category '{}'. Available: {slugs:?}",
                category.slug
            )
        })
}

// =========================================================================
// Navigation helpers
// =========================================================================

/// Top-level navigation titles in order.
pub fn nav_titles(locale: &LocaleSite) -> Vec<&str> {
    locale
        .navigation
        .iter()
        .map(|n| n.title.as_str())
        .collect()
}

/// Child titles under a given nav parent. Panics if parent not found.
pub fn nav_children_titles<'a>(locale: &'a LocaleSite, parent_title: &str) -> Vec<&'a str> {
    locale
        .navigation
        .iter()
        .find(|n| n.title == parent_title)
        .map(|n| n.children.iter().map(|c| c.title.as_str()).collect())
        .unwrap_or_else(|| {
            let titles = nav_titles(locale);
            panic!("nav item '{parent_title}' not found. Available: {titles:?}")
        })
}

/// Assert that a locale's navigation tree matches an expected shape.
///
/// Each entry is `(title, children)`. Use `&[]` to skip checking children.
pub fn assert_nav_shape(locale: &LocaleSite, expected: &[(&str, &[&str])]) {
    let actual: Vec<&str> = nav_titles(locale);
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(actual, expected_titles, "nav top-level titles mismatch");

    for (title, children) in expected {
        if children.is_empty() {
            continue;
        }
        let actual_children = nav_children_titles(locale, title);
        assert_eq!(
            actual_children,
            children.to_vec(),
            "nav children of '{title}' mismatch"
        );
    }
}

// =========================================================================
// In-memory samples
// =========================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Minimal valid article with the given title.
pub fn sample_article(title: &str) -> Article {
    Article {
        title: title.to_string(),
        description: format!("{title} beschrijving"),
        keywords: vec!["chocolade".to_string(), "hond".to_string()],
        translation_key: None,
        published: date(2024, 2, 1),
        modified: date(2024, 5, 12),
        hero: Hero {
            heading: title.to_string(),
            subheading: None,
            badge: None,
        },
        intro: format!("Over {title}."),
        toxicity: None,
        sections: vec![],
        faq: vec![],
        related: vec![],
        related_list: None,
        ctas: vec![],
        ads: vec![],
    }
}

fn sample_locale(code: &str, category: &str, page: &str, title: &str) -> LocaleSite {
    let mut article = sample_article(title);
    article.translation_key = Some("chocolate-dog".to_string());
    LocaleSite {
        code: code.to_string(),
        config: SiteConfig::default(),
        categories: vec![Category {
            slug: category.to_string(),
            title: category.to_string(),
            description: None,
            in_nav: true,
            sort_key: 10,
            source_dir: format!("{code}/010-{category}"),
            pages: vec![Page {
                slug: page.to_string(),
                source_path: format!("{code}/010-{category}/010-{page}.toml"),
                in_nav: true,
                sort_key: 10,
                article,
            }],
        }],
        lists: Default::default(),
        navigation: vec![],
    }
}

/// Two locales, each with one category holding one variant of the
/// `chocolate-dog` article. `nl` is the default and comes first.
pub fn sample_manifest() -> Manifest {
    Manifest {
        config: SiteConfig::default(),
        locales: vec![
            sample_locale("nl", "toxiciteit", "chocolade-hond", "Chocolade"),
            sample_locale("en", "toxicity", "chocolate-dog", "Chocolate"),
        ],
    }
}
