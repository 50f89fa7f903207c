//! Shared types used across pipeline stages.
//!
//! The content record types ([`Article`] and its parts) are deserialized from
//! page files during scan. The [`Manifest`] tree is serialized to JSON between
//! scan and generate, so both stages read the exact same shapes.

use crate::config::SiteConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Output of the scan stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Root configuration (stock defaults merged with `content/config.toml`).
    pub config: SiteConfig,
    /// One entry per locale directory, default locale first.
    pub locales: Vec<LocaleSite>,
}

impl Manifest {
    pub fn locale(&self, code: &str) -> Option<&LocaleSite> {
        self.locales.iter().find(|l| l.code == code)
    }

    /// Every page of every locale, with its locale and category.
    pub fn pages(&self) -> impl Iterator<Item = (&LocaleSite, &Category, &Page)> {
        self.locales.iter().flat_map(|locale| {
            locale.categories.iter().flat_map(move |category| {
                category
                    .pages
                    .iter()
                    .map(move |page| (locale, category, page))
            })
        })
    }
}

/// All content authored for one locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleSite {
    /// Two-letter language code; also the first route segment.
    pub code: String,
    /// Config resolved for this locale (root merged with `content/{code}/config.toml`).
    pub config: SiteConfig,
    pub categories: Vec<Category>,
    /// Named lists from `lists.toml`, referenced by pages as `related_list`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lists: BTreeMap<String, Vec<ListEntry>>,
    /// Navigation tree (numbered categories and their numbered pages).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub navigation: Vec<NavItem>,
}

/// A topic directory (`010-toxiciteit/`) grouping pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub in_nav: bool,
    pub sort_key: u32,
    /// Category directory relative to the content root.
    pub source_dir: String,
    pub pages: Vec<Page>,
}

/// A content page: a route plus the record it renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    /// Page file relative to the content root.
    pub source_path: String,
    pub in_nav: bool,
    pub sort_key: u32,
    pub article: Article,
}

/// Navigation tree item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_dir: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

// ============================================================================
// Content record
// ============================================================================

/// The content record of one page, as authored in `NNN-slug.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Article {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Shared by the locale variants of one article; drives hreflang alternates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,
    pub published: NaiveDate,
    pub modified: NaiveDate,
    pub hero: Hero,
    /// Markdown summary shown under the hero.
    pub intro: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toxicity: Option<Toxicity>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
    /// Cross-links: absolute site paths (`/nl/verzorging/vacht/`) or translation keys.
    #[serde(default)]
    pub related: Vec<String>,
    /// Name of a list in the locale's `lists.toml`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_list: Option<String>,
    #[serde(default)]
    pub ctas: Vec<Cta>,
    #[serde(default)]
    pub ads: Vec<AdPlacement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hero {
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    /// Short label above the heading ("Giftig", "Gids").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Toxicity summary for "is X dangerous for species Y" pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Toxicity {
    pub substance: String,
    pub species: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Fatal,
}

impl Severity {
    /// CSS modifier class.
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Low => "severity-low",
            Severity::Moderate => "severity-moderate",
            Severity::High => "severity-high",
            Severity::Fatal => "severity-fatal",
        }
    }
}

/// A thematic section: heading plus any mix of prose, bullet list, and cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    pub heading: String,
    /// Markdown prose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Info,
    Warning,
    Danger,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Info => "tone-info",
            Tone::Warning => "tone-warning",
            Tone::Danger => "tone-danger",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Card {
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A question/answer pair, rendered in the accordion and in FAQPage JSON-LD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Entry of a named list, e.g. a safe or unsafe food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListEntry {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Navigational trail element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreadcrumbItem {
    pub name: String,
    pub path: String,
}

/// Call to action button.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cta {
    pub label: String,
    pub kind: CtaKind,
    /// Affiliate: redirect target slug. Directory: category filter.
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaKind {
    Affiliate,
    Directory,
}

/// Where an advertisement placeholder goes within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdPlacement {
    AfterIntro,
    MidArticle,
    BeforeFaq,
}

impl AdPlacement {
    /// Key used in `[ads.slots]`.
    pub fn key(self) -> &'static str {
        match self {
            AdPlacement::AfterIntro => "after-intro",
            AdPlacement::MidArticle => "mid-article",
            AdPlacement::BeforeFaq => "before-faq",
        }
    }
}

impl fmt::Display for AdPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
