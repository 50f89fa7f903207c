//! HTML site generation.
//!
//! Stage 2 of the petpedia build pipeline. Takes the scan manifest and
//! generates the final static site.
//!
//! ## Generated Files
//!
//! - **Root redirect** (`/index.html`): sends visitors to the default locale
//! - **Locale home** (`/{locale}/index.html`): category cards
//! - **Category index** (`/{locale}/{category}/index.html`): page cards
//! - **Content page** (`/{locale}/{category}/{page}/index.html`): hero, intro,
//!   toxicity summary, sections, calls to action, related list, FAQ accordion,
//!   cross-links, ad placements, and Article/FAQPage/BreadcrumbList JSON-LD
//! - **`sitemap.xml`**: every document with its hreflang alternates
//! - **`robots.txt`**: allows everything and points at the sitemap
//! - **`style.css`**: base styles with colors injected from config
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                       # Redirect to /nl/
//! ├── sitemap.xml
//! ├── robots.txt
//! ├── style.css
//! ├── assets/                          # Copied from content/assets/
//! ├── nl/
//! │   ├── index.html                   # Locale home
//! │   └── toxiciteit/
//! │       ├── index.html               # Category index
//! │       └── chocolade-hond/
//! │           └── index.html           # Content page
//! └── en/
//!     └── ...
//! ```
//!
//! ## Rendering
//!
//! Documents are rendered in parallel on the rayon pool, collected, and then
//! written sequentially through the [`WriteCache`], which skips files whose
//! bytes did not change and prunes files the previous build wrote that no
//! longer exist.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::cache::{CacheStats, WriteCache};
use crate::components;
use crate::config::{self, ConfigError, LocaleConfig};
use crate::content::markdown_to_html;
use crate::links::{self, LinkError};
use crate::routes::{self, Alternate, RouteTable, X_DEFAULT, absolute_url};
use crate::schema;
use crate::types::{AdPlacement, Category, LocaleSite, Manifest, NavItem, Page};
use maud::{DOCTYPE, Markup, html};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Locale '{0}' has no settings in config")]
    UnknownLocale(String),
    #[error("{page}: related link '{reference}' does not resolve")]
    UnresolvedLink { reference: String, page: String },
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Summary of one generate run.
#[derive(Debug, Default)]
pub struct GenerateResult {
    pub locales: Vec<LocaleSummary>,
    pub assets: usize,
    pub cache: CacheStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSummary {
    pub code: String,
    pub categories: usize,
    pub pages: usize,
}

/// A rendered output file, relative to the output directory.
#[derive(Debug)]
struct Document {
    rel_path: String,
    contents: String,
}

/// One unit of parallel rendering work.
enum Job<'a> {
    Home(&'a LocaleSite),
    Category(&'a LocaleSite, &'a Category),
    Page(&'a LocaleSite, &'a Category, &'a Page),
}

/// Read-only state shared by every renderer.
struct SiteContext<'a> {
    manifest: &'a Manifest,
    table: RouteTable,
    base: Url,
    /// Route → display title, for cross-link text.
    titles: HashMap<String, String>,
}

/// Generate the site from a manifest file written by the scan stage.
///
/// `source_root` is the content root; its `assets_dir` is copied verbatim.
pub fn generate(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
) -> Result<GenerateResult, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    generate_site(&manifest, source_root, output_dir, use_cache)
}

/// Generate the site from an in-memory manifest.
pub fn generate_site(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
) -> Result<GenerateResult, GenerateError> {
    let ctx = SiteContext::new(manifest)?;

    let mut jobs = Vec::new();
    for locale in &manifest.locales {
        jobs.push(Job::Home(locale));
        for category in &locale.categories {
            jobs.push(Job::Category(locale, category));
            for page in &category.pages {
                jobs.push(Job::Page(locale, category, page));
            }
        }
    }

    let mut documents: Vec<Document> = jobs
        .par_iter()
        .map(|job| ctx.render(job))
        .collect::<Result<_, _>>()?;
    documents.push(Document {
        rel_path: "index.html".to_string(),
        contents: render_root_redirect(&ctx).into_string(),
    });
    documents.push(Document {
        rel_path: "sitemap.xml".to_string(),
        contents: render_sitemap(&ctx),
    });
    documents.push(Document {
        rel_path: "robots.txt".to_string(),
        contents: render_robots(&ctx.base),
    });
    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&manifest.config.colors),
        CSS_STATIC
    );
    documents.push(Document {
        rel_path: "style.css".to_string(),
        contents: css,
    });

    fs::create_dir_all(output_dir)?;
    let mut cache = WriteCache::load(output_dir);
    if !use_cache {
        cache.force_rewrite();
    }
    let mut stats = CacheStats::default();

    for doc in &documents {
        cache.write(output_dir, &doc.rel_path, doc.contents.as_bytes(), &mut stats)?;
    }
    let assets = copy_assets(
        &source_root.join(&manifest.config.assets_dir),
        &manifest.config.assets_dir,
        output_dir,
        &mut cache,
        &mut stats,
    )?;
    cache.prune(output_dir, &mut stats)?;
    cache.save(output_dir)?;
    info!(documents = documents.len(), assets, %stats, "site generated");

    let locales = manifest
        .locales
        .iter()
        .map(|l| LocaleSummary {
            code: l.code.clone(),
            categories: l.categories.len(),
            pages: l.categories.iter().map(|c| c.pages.len()).sum(),
        })
        .collect();

    Ok(GenerateResult {
        locales,
        assets,
        cache: stats,
    })
}

/// Copy the assets directory through the write cache. Returns the file count.
fn copy_assets(
    src: &Path,
    dir_name: &str,
    output_dir: &Path,
    cache: &mut WriteCache,
    stats: &mut CacheStats,
) -> Result<usize, GenerateError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        let bytes = fs::read(entry.path())?;
        cache.write(output_dir, &format!("{dir_name}/{rel}"), &bytes, stats)?;
        count += 1;
    }
    Ok(count)
}

/// Output file for a directory-style route: `/nl/x/` → `nl/x/index.html`.
fn route_file(path: &str) -> String {
    format!("{}index.html", path.trim_start_matches('/'))
}

impl<'a> SiteContext<'a> {
    fn new(manifest: &'a Manifest) -> Result<Self, GenerateError> {
        let base = manifest.config.base_url()?;
        let table = RouteTable::build(manifest);
        let mut titles = HashMap::new();
        for locale in &manifest.locales {
            titles.insert(routes::home_path(&locale.code), locale.config.site.name.clone());
            for category in &locale.categories {
                titles.insert(
                    routes::category_path(&locale.code, &category.slug),
                    category.title.clone(),
                );
                for page in &category.pages {
                    titles.insert(
                        routes::page_path(&locale.code, &category.slug, &page.slug),
                        page.article.title.clone(),
                    );
                }
            }
        }
        Ok(Self {
            manifest,
            table,
            base,
            titles,
        })
    }

    fn render(&self, job: &Job<'_>) -> Result<Document, GenerateError> {
        let (path, markup) = match job {
            Job::Home(locale) => {
                let path = routes::home_path(&locale.code);
                let markup = render_home(self, locale)?;
                (path, markup)
            }
            Job::Category(locale, category) => {
                let path = routes::category_path(&locale.code, &category.slug);
                let markup = render_category(self, locale, category)?;
                (path, markup)
            }
            Job::Page(locale, category, page) => {
                let path = routes::page_path(&locale.code, &category.slug, &page.slug);
                let markup = render_page(self, locale, category, page)?;
                (path, markup)
            }
        };
        debug!(route = %path, "rendered");
        Ok(Document {
            rel_path: route_file(&path),
            contents: markup.into_string(),
        })
    }
}

fn locale_settings(locale: &LocaleSite) -> Result<&LocaleConfig, GenerateError> {
    locale
        .config
        .locale(&locale.code)
        .ok_or_else(|| GenerateError::UnknownLocale(locale.code.clone()))
}

// ============================================================================
// HTML Components
// ============================================================================

/// Head metadata for one document.
struct PageMeta<'a> {
    title: &'a str,
    description: &'a str,
    keywords: &'a [String],
    path: &'a str,
    alternates: &'a [Alternate],
    og_type: &'static str,
}

/// Renders the base HTML document structure with SEO metadata in `<head>`.
fn base_document(
    ctx: &SiteContext<'_>,
    locale: &LocaleSite,
    meta: &PageMeta<'_>,
    content: Markup,
) -> Result<Markup, GenerateError> {
    let settings = locale_settings(locale)?;
    let site_name = &locale.config.site.name;
    let canonical = absolute_url(&ctx.base, meta.path);
    let full_title = if meta.title == site_name.as_str() {
        site_name.clone()
    } else {
        format!("{} | {}", meta.title, site_name)
    };
    let og_alternates: Vec<&str> = meta
        .alternates
        .iter()
        .filter(|a| a.hreflang != locale.code && a.hreflang != X_DEFAULT)
        .filter_map(|a| locale.config.locale(&a.hreflang))
        .map(|l| l.og_locale.as_str())
        .collect();

    Ok(html! {
        (DOCTYPE)
        html lang=(locale.code) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                meta name="description" content=(meta.description);
                @if !meta.keywords.is_empty() {
                    meta name="keywords" content=(meta.keywords.join(", "));
                }
                link rel="canonical" href=(canonical);
                @for alternate in meta.alternates {
                    link rel="alternate" hreflang=(alternate.hreflang) href=(absolute_url(&ctx.base, &alternate.path));
                }
                meta property="og:type" content=(meta.og_type);
                meta property="og:title" content=(meta.title);
                meta property="og:description" content=(meta.description);
                meta property="og:url" content=(canonical);
                meta property="og:site_name" content=(site_name);
                meta property="og:locale" content=(settings.og_locale);
                @for og_locale in &og_alternates {
                    meta property="og:locale:alternate" content=(og_locale);
                }
                link rel="stylesheet" href="/style.css";
            }
            body {
                (site_header(ctx, locale, meta.path, meta.alternates))
                (content)
                (site_footer(locale))
            }
        }
    })
}

/// Renders the site header: site name, navigation, and locale switcher.
fn site_header(
    ctx: &SiteContext<'_>,
    locale: &LocaleSite,
    current_path: &str,
    alternates: &[Alternate],
) -> Markup {
    html! {
        header.site-header {
            a.site-name href=(routes::home_path(&locale.code)) { (locale.config.site.name) }
            nav.site-nav {
                (render_nav(&locale.navigation, current_path))
            }
            (locale_switcher(ctx, locale, alternates))
        }
    }
}

fn site_footer(locale: &LocaleSite) -> Markup {
    html! {
        footer.site-footer {
            p { (locale.config.site.name) }
        }
    }
}

/// Renders the navigation menu (hamburger style, slides from right)
pub fn render_nav(items: &[NavItem], current_path: &str) -> Markup {
    html! {
        input.nav-toggle type="checkbox" id="nav-toggle";
        label.nav-hamburger for="nav-toggle" {
            span.hamburger-line {}
            span.hamburger-line {}
            span.hamburger-line {}
        }
        div.nav-panel {
            label.nav-close for="nav-toggle" { "×" }
            ul {
                @for item in items {
                    (render_nav_item(item, current_path))
                }
            }
        }
    }
}

/// Renders a single navigation item (may have children)
fn render_nav_item(item: &NavItem, current_path: &str) -> Markup {
    let is_current = current_path.starts_with(&item.path);

    html! {
        li class=[is_current.then_some("current")] {
            a href=(item.path) { (item.title) }
            @if !item.children.is_empty() {
                ul {
                    @for child in &item.children {
                        (render_nav_item(child, current_path))
                    }
                }
            }
        }
    }
}

/// Links to the other locales: the translated variant when one exists,
/// otherwise that locale's home.
fn locale_switcher(ctx: &SiteContext<'_>, locale: &LocaleSite, alternates: &[Alternate]) -> Markup {
    let others: Vec<(&str, &str, String)> = ctx
        .manifest
        .locales
        .iter()
        .filter(|l| l.code != locale.code)
        .map(|l| {
            let name = locale
                .config
                .locale(&l.code)
                .map(|s| s.name.as_str())
                .unwrap_or(l.code.as_str());
            let path = alternates
                .iter()
                .find(|a| a.hreflang == l.code)
                .map(|a| a.path.clone())
                .unwrap_or_else(|| routes::home_path(&l.code));
            (l.code.as_str(), name, path)
        })
        .collect();
    let label = locale_settings(locale)
        .map(|s| s.labels.languages.as_str())
        .unwrap_or_default();

    html! {
        @if !others.is_empty() {
            nav.locale-switcher aria-label=(label) {
                @for (code, name, path) in &others {
                    a hreflang=(code) lang=(code) href=(path) { (name) }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a locale home page with category cards.
fn render_home(ctx: &SiteContext<'_>, locale: &LocaleSite) -> Result<Markup, GenerateError> {
    let labels = &locale_settings(locale)?.labels;
    let path = routes::home_path(&locale.code);
    let alternates = ctx.table.home_alternates();
    let trail = components::trail(labels, &locale.code, None, None);

    let content = html! {
        main.home-page {
            (components::breadcrumb(&ctx.base, &labels.breadcrumb, &trail))
            header.hero {
                h1 { (locale.config.site.name) }
            }
            ul.card-grid {
                @for category in locale.categories.iter().filter(|c| c.in_nav) {
                    li.card {
                        a.card-title href=(routes::category_path(&locale.code, &category.slug)) {
                            (category.title)
                        }
                        @if let Some(description) = &category.description {
                            p { (description) }
                        }
                    }
                }
            }
        }
    };

    let site = &locale.config.site;
    let description = if site.description.trim().is_empty() {
        &site.name
    } else {
        &site.description
    };
    let meta = PageMeta {
        title: &site.name,
        description,
        keywords: &[],
        path: &path,
        alternates: &alternates,
        og_type: "website",
    };
    base_document(ctx, locale, &meta, content)
}

/// Renders a category index with page cards.
fn render_category(
    ctx: &SiteContext<'_>,
    locale: &LocaleSite,
    category: &Category,
) -> Result<Markup, GenerateError> {
    let labels = &locale_settings(locale)?.labels;
    let path = routes::category_path(&locale.code, &category.slug);
    let trail = components::trail(labels, &locale.code, Some(category), None);

    let content = html! {
        main.category-page {
            (components::breadcrumb(&ctx.base, &labels.breadcrumb, &trail))
            header.category-header {
                h1 { (category.title) }
                @if let Some(description) = &category.description {
                    p.category-description { (description) }
                }
            }
            ul.card-grid {
                @for page in category.pages.iter().filter(|p| p.in_nav) {
                    li.card {
                        a.card-title href=(routes::page_path(&locale.code, &category.slug, &page.slug)) {
                            (page.article.title)
                        }
                        p { (page.article.description) }
                        @if let Some(toxicity) = &page.article.toxicity {
                            span class={ "severity-badge " (toxicity.severity.css_class()) } {
                                (toxicity.substance)
                            }
                        }
                    }
                }
            }
        }
    };

    let description = category.description.as_deref().unwrap_or(&category.title);
    let meta = PageMeta {
        title: &category.title,
        description,
        keywords: &[],
        path: &path,
        alternates: &[],
        og_type: "website",
    };
    base_document(ctx, locale, &meta, content)
}

/// Renders a content page from its record.
fn render_page(
    ctx: &SiteContext<'_>,
    locale: &LocaleSite,
    category: &Category,
    page: &Page,
) -> Result<Markup, GenerateError> {
    let article = &page.article;
    let labels = &locale_settings(locale)?.labels;
    let path = routes::page_path(&locale.code, &category.slug, &page.slug);
    let alternates = ctx.table.alternates(article.translation_key.as_deref());
    let trail = components::trail(
        labels,
        &locale.code,
        Some(category),
        Some((article.title.as_str(), page.slug.as_str())),
    );

    let ctas = article
        .ctas
        .iter()
        .map(|cta| {
            links::cta_link(&locale.config, &locale.code, &page.slug, cta)
                .map(|link| (cta.label.as_str(), link))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut cross_links = Vec::new();
    for reference in &article.related {
        let target = ctx
            .table
            .resolve_related(&locale.code, reference)
            .ok_or_else(|| GenerateError::UnresolvedLink {
                reference: reference.clone(),
                page: page.source_path.clone(),
            })?;
        let title = ctx.titles.get(&target).cloned().unwrap_or_else(|| target.clone());
        cross_links.push((title, target));
    }

    let related_entries = article
        .related_list
        .as_ref()
        .and_then(|name| locale.lists.get(name))
        .map(Vec::as_slice)
        .unwrap_or_default();

    let ad = |placement: AdPlacement| -> Markup {
        if article.ads.contains(&placement) {
            components::ad_slot(&locale.config.ads, placement, &labels.advertisement)
        } else {
            html! {}
        }
    };
    let mid = article.sections.len().saturating_sub(1) / 2;
    let published = article.published.to_string();
    let modified = article.modified.to_string();
    let article_ld = schema::article(&locale.config, &ctx.base, &locale.code, &path, article);

    let content = html! {
        main.content-page {
            (components::breadcrumb(&ctx.base, &labels.breadcrumb, &trail))
            article {
                header.hero {
                    @if let Some(badge) = &article.hero.badge {
                        span.hero-badge { (badge) }
                    }
                    h1 { (article.hero.heading) }
                    @if let Some(subheading) = &article.hero.subheading {
                        p.hero-subheading { (subheading) }
                    }
                    p.dates {
                        (labels.published) " "
                        time datetime=(published) { (published) }
                        @if article.modified != article.published {
                            " · " (labels.updated) " "
                            time datetime=(modified) { (modified) }
                        }
                    }
                }
                div.intro { (maud::PreEscaped(markdown_to_html(&article.intro))) }
                (ad(AdPlacement::AfterIntro))
                @if let Some(toxicity) = &article.toxicity {
                    (components::toxicity_panel(labels, toxicity))
                }
                @for (i, section) in article.sections.iter().enumerate() {
                    (components::section_block(section))
                    @if i == mid {
                        (ad(AdPlacement::MidArticle))
                    }
                }
                @if article.sections.is_empty() {
                    (ad(AdPlacement::MidArticle))
                }
                @if !ctas.is_empty() {
                    div.cta-row {
                        @for (label, link) in &ctas {
                            (components::cta_button(label, link))
                        }
                    }
                }
                (components::related_list(&ctx.base, &labels.related_items, related_entries))
                (ad(AdPlacement::BeforeFaq))
                (components::faq_accordion(&labels.faq, &article.faq))
                (components::cross_links(&labels.related_pages, &cross_links))
            }
            (components::json_ld(&article_ld))
        }
    };

    let meta = PageMeta {
        title: &article.title,
        description: &article.description,
        keywords: &article.keywords,
        path: &path,
        alternates: &alternates,
        og_type: "article",
    };
    base_document(ctx, locale, &meta, content)
}

/// Root `index.html`: redirect to the default locale home.
fn render_root_redirect(ctx: &SiteContext<'_>) -> Markup {
    let config = &ctx.manifest.config;
    let home = routes::home_path(&config.site.default_locale);
    html! {
        (DOCTYPE)
        html lang=(config.site.default_locale) {
            head {
                meta charset="UTF-8";
                title { (config.site.name) }
                meta http-equiv="refresh" content={ "0; url=" (home) };
                @for alternate in ctx.table.home_alternates() {
                    link rel="alternate" hreflang=(alternate.hreflang) href=(absolute_url(&ctx.base, &alternate.path));
                }
            }
            body {
                a href=(home) { (config.site.name) }
            }
        }
    }
}

// ============================================================================
// Sitemap and robots
// ============================================================================

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `sitemap.xml` listing every HTML document with its hreflang alternates.
fn render_sitemap(ctx: &SiteContext<'_>) -> String {
    let mut entries: Vec<(String, Option<String>, Vec<Alternate>)> = Vec::new();
    let home_alternates = ctx.table.home_alternates();
    for locale in &ctx.manifest.locales {
        entries.push((routes::home_path(&locale.code), None, home_alternates.clone()));
        for category in &locale.categories {
            entries.push((
                routes::category_path(&locale.code, &category.slug),
                None,
                Vec::new(),
            ));
            for page in &category.pages {
                let article = &page.article;
                entries.push((
                    routes::page_path(&locale.code, &category.slug, &page.slug),
                    Some(article.modified.to_string()),
                    ctx.table.alternates(article.translation_key.as_deref()),
                ));
            }
        }
    }

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );
    for (path, lastmod, alternates) in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            xml_escape(&absolute_url(&ctx.base, &path))
        ));
        if let Some(lastmod) = lastmod {
            xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        }
        for alternate in alternates {
            xml.push_str(&format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                xml_escape(&alternate.hreflang),
                xml_escape(&absolute_url(&ctx.base, &alternate.path))
            ));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn render_robots(base: &Url) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        absolute_url(base, "/sitemap.xml")
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn build_fixture_site() -> (TempDir, TempDir, GenerateResult) {
        let source = setup_fixtures();
        let manifest = scan(source.path()).unwrap();
        let out = TempDir::new().unwrap();
        let result = generate_site(&manifest, source.path(), out.path(), true).unwrap();
        (source, out, result)
    }

    fn read(out: &TempDir, rel: &str) -> String {
        fs::read_to_string(out.path().join(rel))
            .unwrap_or_else(|e| panic!("could not read {rel}: {e}"))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn nav_renders_items() {
        let items = vec![NavItem {
            title: "Toxiciteit".to_string(),
            path: "/nl/toxiciteit/".to_string(),
            source_dir: String::new(),
            children: vec![],
        }];
        let html = render_nav(&items, "").into_string();
        assert!(html.contains("Toxiciteit"));
        assert!(html.contains(r#"href="/nl/toxiciteit/""#));
    }

    #[test]
    fn nav_marks_current_item() {
        let items = vec![
            NavItem {
                title: "Toxiciteit".to_string(),
                path: "/nl/toxiciteit/".to_string(),
                source_dir: String::new(),
                children: vec![],
            },
            NavItem {
                title: "Verzorging".to_string(),
                path: "/nl/verzorging/".to_string(),
                source_dir: String::new(),
                children: vec![],
            },
        ];
        let html = render_nav(&items, "/nl/verzorging/vacht-borstelen/").into_string();
        assert_eq!(html.matches(r#"class="current""#).count(), 1);
        let current = html.find(r#"class="current""#).unwrap();
        let verzorging = html.find("Verzorging").unwrap();
        assert!(current < verzorging);
        assert!(html.find("Toxiciteit").unwrap() < current);
    }

    #[test]
    fn nav_renders_nested_children() {
        let items = vec![NavItem {
            title: "Toxiciteit".to_string(),
            path: "/nl/toxiciteit/".to_string(),
            source_dir: String::new(),
            children: vec![NavItem {
                title: "Chocolade".to_string(),
                path: "/nl/toxiciteit/chocolade-hond/".to_string(),
                source_dir: String::new(),
                children: vec![],
            }],
        }];
        let html = render_nav(&items, "").into_string();
        assert!(html.contains("Chocolade"));
        assert!(html.contains("/nl/toxiciteit/chocolade-hond/"));
    }

    #[test]
    fn route_file_maps_directories_to_index() {
        assert_eq!(route_file("/nl/"), "nl/index.html");
        assert_eq!(
            route_file("/nl/toxiciteit/chocolade-hond/"),
            "nl/toxiciteit/chocolade-hond/index.html"
        );
    }

    #[test]
    fn xml_escape_handles_ampersand() {
        assert_eq!(xml_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
    }

    // =========================================================================
    // Full site generation
    // =========================================================================

    #[test]
    fn generates_every_route() {
        let (_src, out, result) = build_fixture_site();
        for rel in [
            "index.html",
            "sitemap.xml",
            "robots.txt",
            "style.css",
            "nl/index.html",
            "nl/toxiciteit/index.html",
            "nl/toxiciteit/chocolade-hond/index.html",
            "nl/concepten/kattengras/index.html",
            "en/toxicity/chocolate-dog/index.html",
            "assets/logo.svg",
        ] {
            assert!(out.path().join(rel).exists(), "missing {rel}");
        }
        assert_eq!(result.locales[0].code, "nl");
        assert_eq!(result.assets, 1);
    }

    #[test]
    fn page_head_has_canonical_and_alternates() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "nl/toxiciteit/chocolade-hond/index.html");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="nl">"#));
        assert!(html.contains(
            r#"<link rel="canonical" href="https://www.petpedia.example/nl/toxiciteit/chocolade-hond/">"#
        ));
        assert!(html.contains(
            r#"<link rel="alternate" hreflang="en" href="https://www.petpedia.example/en/toxicity/chocolate-dog/">"#
        ));
        assert!(html.contains(
            r#"<link rel="alternate" hreflang="x-default" href="https://www.petpedia.example/nl/toxiciteit/chocolade-hond/">"#
        ));
        assert!(html.contains(r#"<meta property="og:locale" content="nl_NL">"#));
        assert!(html.contains(r#"<meta property="og:locale:alternate" content="en_GB">"#));
    }

    #[test]
    fn untranslated_page_has_no_alternates() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "nl/toxiciteit/druiven-hond/index.html");
        assert!(!html.contains("hreflang=\"x-default\""));
        // Switcher falls back to the other locale's home
        assert!(html.contains(r#"<a hreflang="en" lang="en" href="/en/">English</a>"#));
    }

    #[test]
    fn page_body_has_all_regions() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "nl/toxiciteit/chocolade-hond/index.html");
        for needle in [
            "hero-badge",
            "toxicity-panel",
            "article-section",
            "cta-affiliate",
            "cta-directory",
            "related-items",
            "related-pages",
            r#"id="faq""#,
            r#""@type":"Article""#,
            r#""@type":"FAQPage""#,
            r#""@type":"BreadcrumbList""#,
            r#""@type":"ItemList""#,
        ] {
            assert!(html.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn ad_slots_follow_page_placements() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "nl/toxiciteit/chocolade-hond/index.html");
        assert!(html.contains(r#"data-placement="after-intro""#));
        assert!(html.contains(r#"data-placement="before-faq""#));
        assert!(!html.contains(r#"data-placement="mid-article""#));
    }

    #[test]
    fn affiliate_links_are_sponsored_with_utm() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "nl/toxiciteit/chocolade-hond/index.html");
        assert!(html.contains("https://go.petpedia-partners.example/out/hondensnacks?utm_source=petpedia&amp;utm_medium=affiliate&amp;utm_campaign=chocolade-hond"));
        assert!(html.contains(r#"rel="sponsored nofollow noopener""#));
    }

    #[test]
    fn directory_cta_uses_locale_directory_path() {
        let (_src, out, _) = build_fixture_site();
        let nl = read(&out, "nl/toxiciteit/chocolade-hond/index.html");
        assert!(nl.contains(r#"href="/nl/dierenartsen/?category=spoedeisende-hulp""#));
        let en = read(&out, "en/toxicity/chocolate-dog/index.html");
        assert!(en.contains(r#"href="/en/vets/?category=emergency-care""#));
    }

    #[test]
    fn cross_links_use_target_titles() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "nl/toxiciteit/chocolade-hond/index.html");
        assert!(html.contains(
            r#"<a href="/nl/toxiciteit/druiven-hond/">Zijn druiven giftig voor honden?</a>"#
        ));
    }

    #[test]
    fn home_lists_only_nav_categories() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "nl/index.html");
        assert!(html.contains("Giftig voor huisdieren"));
        assert!(!html.contains(r#"href="/nl/concepten/""#));
        assert!(html.contains(r#"hreflang="x-default" href="https://www.petpedia.example/nl/""#));
    }

    #[test]
    fn home_description_comes_from_locale_config() {
        let (_src, out, _) = build_fixture_site();
        let nl = read(&out, "nl/index.html");
        let description =
            "Betrouwbare informatie over gezondheid, verzorging en gevaren voor je huisdier.";
        assert!(nl.contains(&format!(r#"<meta name="description" content="{description}">"#)));
        assert!(nl.contains(&format!(r#"<meta property="og:description" content="{description}">"#)));
        let en = read(&out, "en/index.html");
        assert!(en.contains(
            r#"<meta name="description" content="Reliable advice on pet health, grooming, and hazards.">"#
        ));
    }

    #[test]
    fn root_redirects_to_default_locale() {
        let (_src, out, _) = build_fixture_site();
        let html = read(&out, "index.html");
        assert!(html.contains(r#"content="0; url=/nl/""#));
        assert!(!html.contains("rel=\"canonical\""));
    }

    #[test]
    fn sitemap_lists_pages_with_alternates() {
        let (_src, out, _) = build_fixture_site();
        let xml = read(&out, "sitemap.xml");
        assert!(xml.contains(
            "<loc>https://www.petpedia.example/nl/toxiciteit/chocolade-hond/</loc>"
        ));
        assert!(xml.contains("<lastmod>2024-05-12</lastmod>"));
        assert!(xml.contains(
            r#"<xhtml:link rel="alternate" hreflang="en" href="https://www.petpedia.example/en/toxicity/chocolate-dog/"/>"#
        ));
    }

    #[test]
    fn robots_points_at_sitemap() {
        let (_src, out, _) = build_fixture_site();
        assert!(read(&out, "robots.txt")
            .contains("Sitemap: https://www.petpedia.example/sitemap.xml"));
    }

    #[test]
    fn style_css_has_config_colors() {
        let (_src, out, _) = build_fixture_site();
        let css = read(&out, "style.css");
        assert!(css.contains("--color-bg: #fffdf8"));
        assert!(css.contains(".faq-item"));
    }

    // =========================================================================
    // Incremental writes
    // =========================================================================

    #[test]
    fn second_build_writes_nothing() {
        let source = setup_fixtures();
        let manifest = scan(source.path()).unwrap();
        let out = TempDir::new().unwrap();
        let first = generate_site(&manifest, source.path(), out.path(), true).unwrap();
        assert_eq!(first.cache.unchanged, 0);

        let second = generate_site(&manifest, source.path(), out.path(), true).unwrap();
        assert_eq!(second.cache.written, 0);
        assert_eq!(second.cache.unchanged, first.cache.written);
    }

    #[test]
    fn hand_edited_output_is_restored_on_rebuild() {
        let source = setup_fixtures();
        let manifest = scan(source.path()).unwrap();
        let out = TempDir::new().unwrap();
        let first = generate_site(&manifest, source.path(), out.path(), true).unwrap();

        let page = out.path().join("nl/toxiciteit/chocolade-hond/index.html");
        let html = fs::read_to_string(&page).unwrap();
        fs::write(
            &page,
            html.replacen("Hoe snel treden de symptomen op?", "Bewerkt", 1),
        )
        .unwrap();

        let second = generate_site(&manifest, source.path(), out.path(), true).unwrap();
        assert_eq!(second.cache.written, 1);
        assert_eq!(second.cache.unchanged, first.cache.written - 1);
        let report = crate::audit::audit(
            out.path(),
            &crate::audit::AuditOptions::for_manifest(&manifest),
        )
        .unwrap();
        assert!(report.is_clean(), "{:#?}", report.findings);
    }

    #[test]
    fn no_cache_rewrites_everything() {
        let source = setup_fixtures();
        let manifest = scan(source.path()).unwrap();
        let out = TempDir::new().unwrap();
        let first = generate_site(&manifest, source.path(), out.path(), true).unwrap();
        let second = generate_site(&manifest, source.path(), out.path(), false).unwrap();
        assert_eq!(second.cache.written, first.cache.written);
        assert_eq!(second.cache.unchanged, 0);
    }

    #[test]
    fn removed_page_is_pruned() {
        let source = setup_fixtures();
        let out = TempDir::new().unwrap();
        let manifest = scan(source.path()).unwrap();
        generate_site(&manifest, source.path(), out.path(), true).unwrap();
        assert!(out.path().join("nl/concepten/kattengras/index.html").exists());

        fs::remove_dir_all(source.path().join("nl/concepten")).unwrap();
        let manifest = scan(source.path()).unwrap();
        let result = generate_site(&manifest, source.path(), out.path(), true).unwrap();
        assert!(result.cache.removed >= 2);
        assert!(!out.path().join("nl/concepten").exists());
    }

    #[test]
    fn generate_reads_manifest_json() {
        let source = setup_fixtures();
        let manifest = scan(source.path()).unwrap();
        let json_dir = TempDir::new().unwrap();
        let manifest_path = json_dir.path().join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();

        let out = TempDir::new().unwrap();
        let result = generate(&manifest_path, source.path(), out.path(), true).unwrap();
        assert_eq!(result.locales.len(), 2);
        assert!(out.path().join("en/index.html").exists());
    }
}
