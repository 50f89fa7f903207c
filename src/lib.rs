//! # Petpedia
//!
//! Static site generator and content linter for a localized pet care
//! encyclopedia. Articles are authored as TOML records, one file per page,
//! grouped into category directories under a locale directory. The generator
//! renders them into plain HTML with Open Graph tags, hreflang alternates,
//! and JSON-LD structured data.
//!
//! # Architecture: Pipeline Stages
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (filesystem → structured data)
//! 2. Generate  manifest  →  dist/            (final HTML site)
//! 3. Audit     dist/     →  findings         (lint the rendered output)
//! ```
//!
//! The manifest is human-readable JSON, so a failed build can be debugged by
//! reading what scan produced. Generate never touches the content tree except
//! to copy static assets, and audit only reads the rendered output. It checks
//! the HTML a crawler would see, not the records it was built from.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the content directory, validates records and references, produces the [`types::Manifest`] |
//! | [`generate`] | Renders every locale home, category, and page with Maud; writes sitemap, robots, CSS, assets |
//! | [`audit`] | Lints rendered HTML: FAQ/JSON-LD agreement, dangling links, alternates, canonicals, affiliate hosts |
//! | [`config`] | Layered `config.toml` loading (stock → root → locale), validation, CSS color variables |
//! | [`content`] | Parsing and validation of page records, lists, and category metadata |
//! | [`routes`] | URL scheme and the route table used for link resolution and hreflang alternates |
//! | [`links`] | Affiliate and vet directory CTA URLs |
//! | [`schema`] | JSON-LD builders (`Article`, `FAQPage`, `BreadcrumbList`, `ItemList`) |
//! | [`components`] | Reusable Maud fragments: breadcrumb, FAQ accordion, CTA, ad slot, lists |
//! | [`cache`] | Content-hash write cache so unchanged files are not rewritten |
//! | [`types`] | Shared types serialized between stages |
//! | [`naming`] | `NNN-name` ordering convention and slug rules |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## One Record, Two Renderings
//!
//! FAQ entries, breadcrumbs, and related lists each render twice: once as
//! visible markup and once as JSON-LD. Both renderings come from the same
//! record in the same pass, so they cannot drift apart. The audit stage still
//! checks the agreement on the rendered output, since hand-edited or
//! post-processed HTML can break it.
//!
//! ## NNN-Prefix Ordering
//!
//! Category directories and page files use a numeric prefix (`010-`, `020-`)
//! for explicit ordering, parsed by [`naming::parse_entry_name`]. Entries
//! without a prefix are rendered but kept out of navigation and the locale
//! home.
//!
//! ## Translation Keys
//!
//! Locale variants of an article share a `translation_key`. The route table
//! maps each key to its per-locale paths; hreflang alternates, the language
//! switcher, and `related` references all resolve through it.

pub mod audit;
pub mod cache;
pub mod components;
pub mod config;
pub mod content;
pub mod generate;
pub mod links;
pub mod naming;
pub mod output;
pub mod routes;
pub mod scan;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
