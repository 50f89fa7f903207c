//! Content record loading and validation.
//!
//! A page is a single TOML file. Prose fields (`intro`, section `body`) are
//! markdown; everything else is plain text that is rendered verbatim and, for
//! FAQ entries, mirrored into structured data.
//!
//! ```toml
//! title = "Is chocolade giftig voor honden?"
//! description = "Waarom chocolade gevaarlijk is en wat je moet doen."
//! keywords = ["chocolade", "hond", "vergiftiging"]
//! translation_key = "chocolate-dog"
//! published = "2024-02-01"
//! modified = "2024-05-12"
//! intro = "Chocolade bevat **theobromine**..."
//! related_list = "veilige-snacks-hond"
//! ads = ["after-intro", "before-faq"]
//!
//! [hero]
//! heading = "Chocolade en honden"
//! badge = "Giftig"
//!
//! [toxicity]
//! substance = "Chocolade"
//! species = "Hond"
//! severity = "high"
//!
//! [[sections]]
//! heading = "Symptomen"
//! items = ["Braken", "Onrust"]
//! tone = "warning"
//!
//! [[faq]]
//! question = "Hoeveel chocolade is gevaarlijk?"
//! answer = "..."
//!
//! [[ctas]]
//! label = "Vind een dierenarts"
//! kind = "directory"
//! target = "spoedeisende-hulp"
//! ```
//!
//! Named lists live next to the categories in `{locale}/lists.toml`:
//!
//! ```toml
//! [[veilige-snacks-hond]]
//! name = "Wortel"
//! description = "Knapperig en caloriearm."
//! ```

use crate::types::{Article, ListEntry};
use pulldown_cmark::{Options, Parser, html as md_html};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Optional `category.toml` inside a category directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryMeta {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Name of the per-category metadata file; never treated as a page.
pub const CATEGORY_FILE: &str = "category.toml";
/// Name of the per-locale named-list file.
pub const LISTS_FILE: &str = "lists.toml";

/// Parse and validate a content record.
pub fn parse_article(source: &str) -> Result<Article, ContentError> {
    let article: Article = toml::from_str(source)?;
    validate_article(&article)?;
    Ok(article)
}

/// Read, parse, and validate a page file.
pub fn load_article(path: &Path) -> Result<Article, ContentError> {
    let source = fs::read_to_string(path)?;
    parse_article(&source)
}

/// Check the invariants rendering relies on.
///
/// Every displayed string must be non-empty, dates must be ordered, and
/// FAQ entries must be complete since they are duplicated into JSON-LD.
pub fn validate_article(article: &Article) -> Result<(), ContentError> {
    require_text("title", &article.title)?;
    require_text("description", &article.description)?;
    require_text("hero.heading", &article.hero.heading)?;
    require_text("intro", &article.intro)?;

    if article.modified < article.published {
        return Err(ContentError::Invalid(format!(
            "modified ({}) is before published ({})",
            article.modified, article.published
        )));
    }
    if let Some(key) = &article.translation_key
        && key.trim().is_empty()
    {
        return Err(ContentError::Invalid(
            "translation_key must not be empty".into(),
        ));
    }
    if let Some(tox) = &article.toxicity {
        require_text("toxicity.substance", &tox.substance)?;
        require_text("toxicity.species", &tox.species)?;
    }
    for (i, section) in article.sections.iter().enumerate() {
        require_text(&format!("sections[{i}].heading"), &section.heading)?;
        if section.body.is_none() && section.items.is_empty() && section.cards.is_empty() {
            return Err(ContentError::Invalid(format!(
                "sections[{i}] ('{}') has no body, items, or cards",
                section.heading
            )));
        }
        for (j, card) in section.cards.iter().enumerate() {
            require_text(&format!("sections[{i}].cards[{j}].title"), &card.title)?;
        }
    }
    for (i, entry) in article.faq.iter().enumerate() {
        require_text(&format!("faq[{i}].question"), &entry.question)?;
        require_text(&format!("faq[{i}].answer"), &entry.answer)?;
    }
    for (i, cta) in article.ctas.iter().enumerate() {
        require_text(&format!("ctas[{i}].label"), &cta.label)?;
        if !crate::naming::is_valid_slug(&cta.target) {
            return Err(ContentError::Invalid(format!(
                "ctas[{i}].target '{}' must be a lowercase slug",
                cta.target
            )));
        }
    }
    let mut placements = article.ads.clone();
    placements.sort();
    placements.dedup();
    if placements.len() != article.ads.len() {
        return Err(ContentError::Invalid("duplicate ad placement".into()));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        Err(ContentError::Invalid(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Load the named lists of a locale. A missing file means no lists.
pub fn load_lists(path: &Path) -> Result<BTreeMap<String, Vec<ListEntry>>, ContentError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let source = fs::read_to_string(path)?;
    let lists: BTreeMap<String, Vec<ListEntry>> = toml::from_str(&source)?;
    for (name, entries) in &lists {
        if entries.is_empty() {
            return Err(ContentError::Invalid(format!("list '{name}' is empty")));
        }
        for entry in entries {
            require_text(&format!("{name}.name"), &entry.name)?;
        }
    }
    Ok(lists)
}

/// Load `category.toml` from a category directory, if present.
pub fn load_category_meta(dir: &Path) -> Result<CategoryMeta, ContentError> {
    let path = dir.join(CATEGORY_FILE);
    if !path.exists() {
        return Ok(CategoryMeta::default());
    }
    let source = fs::read_to_string(path)?;
    Ok(toml::from_str(&source)?)
}

/// Render markdown prose to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}
