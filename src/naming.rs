//! Centralized filename parsing for the `NNN-slug` convention.
//!
//! Categories (directories) and pages (`.toml` records) share one naming
//! pattern: an optional numeric prefix (`NNN-`) followed by the URL slug.
//! The prefix only controls ordering and navigation visibility; it never
//! appears in a route.
//!
//! - `010-toxiciteit/` → slug `toxiciteit`, shown in nav, sort key 10
//! - `020-chocolade-hond.toml` → slug `chocolade-hond`, sort key 20
//! - `concepten/` → slug `concepten`, hidden from nav

/// Result of parsing an entry name like `020-chocolade-hond`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `20` from `020-chocolade-hond`)
    pub number: Option<u32>,
    /// Route segment: the part after `NNN-`, or the full input when unnumbered.
    pub slug: String,
    /// Fallback title: slug with dashes converted to spaces, first letter upper-cased.
    pub display_title: String,
}

impl ParsedName {
    /// Numbered entries are listed in navigation.
    pub fn in_nav(&self) -> bool {
        self.number.is_some()
    }

    /// Ordering key; unnumbered entries sort last.
    pub fn sort_key(&self) -> u32 {
        self.number.unwrap_or(u32::MAX)
    }
}

/// Parse an entry name following the `NNN-slug` convention.
///
/// - `"010-toxiciteit"` → number=Some(10), slug="toxiciteit"
/// - `"020-chocolade-hond"` → number=Some(20), slug="chocolade-hond"
/// - `"concepten"` → number=None, slug="concepten"
/// - `"2024-overzicht"` → number=Some(2024), slug="overzicht"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once('-')
        && !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_digit())
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            slug: rest.to_string(),
            display_title: display_title(rest),
        };
    }
    ParsedName {
        number: None,
        slug: name.to_string(),
        display_title: display_title(name),
    }
}

fn display_title(slug: &str) -> String {
    let spaced = slug.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A slug is non-empty lowercase ASCII letters, digits, and single dashes,
/// with no leading or trailing dash.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
