//! Site and locale configuration.
//!
//! Handles loading, validating, and merging `config.toml` files. Configuration
//! is layered: stock defaults are overridden by the root `config.toml`, which
//! is in turn overridden by an optional per-locale `config.toml`.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Root config (overrides stock defaults)
//! ├── nl/
//! │   ├── config.toml          # Locale config (overrides root for nl pages)
//! │   └── ...
//! └── en/
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! assets_dir = "assets"
//!
//! [site]
//! name = "Petpedia"
//! base_url = "https://www.petpedia.example"
//! default_locale = "nl"
//!
//! [publisher]
//! name = "Petpedia"
//! logo_url = "https://www.petpedia.example/assets/logo.png"
//!
//! [affiliate]
//! domain = "go.petpedia-partners.example"   # empty disables affiliate CTAs
//! path_prefix = "out"
//! utm_source = "petpedia"
//!
//! [directory]
//! path = "directory"           # internal provider directory search route
//!
//! [ads]
//! enabled = false
//! client = ""
//!
//! [locales.nl]
//! name = "Nederlands"
//! og_locale = "nl_NL"
//!
//! [locales.nl.labels]
//! home = "Home"
//! faq = "Veelgestelde vragen"
//! ...
//! ```
//!
//! ## Partial Configuration
//!
//! A locale file only lists what differs from the root:
//!
//! ```toml
//! # content/en/config.toml
//! [site]
//! name = "Petpedia Encyclopedia"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory (relative to the content root) copied verbatim to the output.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// Site identity and routing defaults.
    pub site: SiteInfo,
    /// Organization named as author and publisher in structured data.
    pub publisher: PublisherConfig,
    /// Outbound affiliate redirect settings.
    pub affiliate: AffiliateConfig,
    /// Internal provider directory search route.
    pub directory: DirectoryConfig,
    /// Advertisement slot settings.
    pub ads: AdsConfig,
    /// Known locales keyed by two-letter language code.
    pub locales: BTreeMap<String, LocaleConfig>,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut locales = BTreeMap::new();
        locales.insert("nl".to_string(), LocaleConfig::default_nl());
        locales.insert("en".to_string(), LocaleConfig::default_en());
        Self {
            assets_dir: default_assets_dir(),
            site: SiteInfo::default(),
            publisher: PublisherConfig::default(),
            affiliate: AffiliateConfig::default(),
            directory: DirectoryConfig::default(),
            ads: AdsConfig::default(),
            locales,
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = Url::parse(&self.site.base_url).map_err(|e| {
            ConfigError::Validation(format!("site.base_url is not a valid URL: {e}"))
        })?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ConfigError::Validation(
                "site.base_url must use http or https".into(),
            ));
        }
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if self.publisher.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "publisher.name must not be empty".into(),
            ));
        }
        if self.locales.is_empty() {
            return Err(ConfigError::Validation(
                "at least one locale must be configured".into(),
            ));
        }
        for code in self.locales.keys() {
            if !is_locale_code(code) {
                return Err(ConfigError::Validation(format!(
                    "locale code '{code}' must be two lowercase letters"
                )));
            }
        }
        if !self.locales.contains_key(&self.site.default_locale) {
            return Err(ConfigError::Validation(format!(
                "site.default_locale '{}' is not a configured locale",
                self.site.default_locale
            )));
        }
        if self.affiliate.domain.contains('/') || self.affiliate.domain.contains(':') {
            return Err(ConfigError::Validation(
                "affiliate.domain must be a bare host name".into(),
            ));
        }
        if !crate::naming::is_valid_slug(&self.directory.path) {
            return Err(ConfigError::Validation(
                "directory.path must be a lowercase slug".into(),
            ));
        }
        if self.ads.enabled && self.ads.client.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ads.client is required when ads are enabled".into(),
            ));
        }
        Ok(())
    }

    /// Parsed base URL. Only call on a validated config.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.site.base_url)
            .map_err(|e| ConfigError::Validation(format!("site.base_url: {e}")))
    }

    /// Settings for one locale, if configured.
    pub fn locale(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.get(code)
    }
}

fn is_locale_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase())
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Display name used in titles, headers, and Open Graph `site_name`.
    pub name: String,
    /// Meta and Open Graph description of the locale home page. Empty falls
    /// back to `name`.
    pub description: String,
    /// Absolute origin the site is served from; canonical URLs join onto it.
    pub base_url: String,
    /// Locale the root `/` redirects to and `x-default` alternates point at.
    pub default_locale: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Petpedia".to_string(),
            description: String::new(),
            base_url: "https://www.petpedia.example".to_string(),
            default_locale: "nl".to_string(),
        }
    }
}

/// Organization credited in Article structured data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublisherConfig {
    pub name: String,
    pub logo_url: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            name: "Petpedia".to_string(),
            logo_url: "https://www.petpedia.example/assets/logo.png".to_string(),
        }
    }
}

/// Affiliate redirect endpoint.
///
/// Links are built as `https://{domain}/{path_prefix}/{target}` with UTM
/// query parameters. An empty `domain` disables affiliate CTAs entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AffiliateConfig {
    pub domain: String,
    pub path_prefix: String,
    pub utm_source: String,
}

impl Default for AffiliateConfig {
    fn default() -> Self {
        Self {
            domain: "go.petpedia-partners.example".to_string(),
            path_prefix: "out".to_string(),
            utm_source: "petpedia".to_string(),
        }
    }
}

/// Provider directory search route (`/{locale}/{path}/?category=...`).
///
/// The directory itself is served by another application; pages only link
/// into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    pub path: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            path: "directory".to_string(),
        }
    }
}

/// Advertisement placeholders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdsConfig {
    /// When false, ad placements render nothing.
    pub enabled: bool,
    /// Publisher/client id written to `data-ad-client`.
    pub client: String,
    /// Slot ids keyed by placement name (`after-intro`, `mid-article`, `before-faq`).
    pub slots: BTreeMap<String, String>,
}

/// Per-locale settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleConfig {
    /// Language name shown in the locale switcher.
    pub name: String,
    /// Open Graph locale (`nl_NL`, `en_GB`).
    pub og_locale: String,
    /// UI strings.
    pub labels: Labels,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::default_en()
    }
}

impl LocaleConfig {
    pub fn default_nl() -> Self {
        Self {
            name: "Nederlands".to_string(),
            og_locale: "nl_NL".to_string(),
            labels: Labels::default_nl(),
        }
    }

    pub fn default_en() -> Self {
        Self {
            name: "English".to_string(),
            og_locale: "en_GB".to_string(),
            labels: Labels::default_en(),
        }
    }
}

/// Localized interface strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    pub home: String,
    pub breadcrumb: String,
    pub faq: String,
    pub related_items: String,
    pub related_pages: String,
    pub advertisement: String,
    pub published: String,
    pub updated: String,
    pub substance: String,
    pub species: String,
    pub severity: String,
    pub severity_low: String,
    pub severity_moderate: String,
    pub severity_high: String,
    pub severity_fatal: String,
    pub read_more: String,
    pub languages: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self::default_en()
    }
}

impl Labels {
    pub fn default_nl() -> Self {
        Self {
            home: "Home".to_string(),
            breadcrumb: "Kruimelpad".to_string(),
            faq: "Veelgestelde vragen".to_string(),
            related_items: "Wel veilig".to_string(),
            related_pages: "Lees ook".to_string(),
            advertisement: "Advertentie".to_string(),
            published: "Gepubliceerd".to_string(),
            updated: "Bijgewerkt".to_string(),
            substance: "Stof".to_string(),
            species: "Diersoort".to_string(),
            severity: "Ernst".to_string(),
            severity_low: "Laag".to_string(),
            severity_moderate: "Matig".to_string(),
            severity_high: "Hoog".to_string(),
            severity_fatal: "Levensgevaarlijk".to_string(),
            read_more: "Lees meer".to_string(),
            languages: "Taal".to_string(),
        }
    }

    pub fn default_en() -> Self {
        Self {
            home: "Home".to_string(),
            breadcrumb: "Breadcrumb".to_string(),
            faq: "Frequently asked questions".to_string(),
            related_items: "Safe alternatives".to_string(),
            related_pages: "Read also".to_string(),
            advertisement: "Advertisement".to_string(),
            published: "Published".to_string(),
            updated: "Updated".to_string(),
            substance: "Substance".to_string(),
            species: "Species".to_string(),
            severity: "Severity".to_string(),
            severity_low: "Low".to_string(),
            severity_moderate: "Moderate".to_string(),
            severity_high: "High".to_string(),
            severity_fatal: "Life-threatening".to_string(),
            read_more: "Read more".to_string(),
            languages: "Language".to_string(),
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel rendering workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Background color.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (breadcrumbs, dates, ad labels).
    pub text_muted: String,
    /// Border color.
    pub border: String,
    /// Link color.
    pub link: String,
    /// Call-to-action button background.
    pub accent: String,
    /// Warning panels on toxicity pages.
    pub warning: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fffdf8".to_string(),
            text: "#1f2933".to_string(),
            text_muted: "#616e7c".to_string(),
            border: "#e4e7eb".to_string(),
            link: "#0b6e4f".to_string(),
            accent: "#f29e4c".to_string(),
            warning: "#c0392b".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#12181f".to_string(),
            text: "#e4e7eb".to_string(),
            text_muted: "#9aa5b1".to_string(),
            border: "#323f4b".to_string(),
            link: "#5fd3a6".to_string(),
            accent: "#f7b267".to_string(),
            warning: "#ff6b5b".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Resolve the config that applies to one locale directory.
///
/// The locale's own `config.toml` (if any) is merged on top of the already
/// resolved root config.
pub fn load_locale_config(root: &SiteConfig, locale_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(locale_dir)?;
    if overlay.is_none() {
        return Ok(root.clone());
    }
    let base = toml::Value::try_from(root)
        .map_err(|e| ConfigError::Validation(format!("config must serialize: {e}")))?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Petpedia Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Config files can be placed at two levels:
#   content/config.toml     -> root (overrides stock defaults)
#   content/nl/config.toml  -> locale (overrides root for that locale)
#
# Each level only needs the keys it wants to override.
# Unknown keys will cause an error.

# Directory copied verbatim to the output root (favicons, logos, images)
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
name = "Petpedia"
# Description of the locale home page; usually set per locale. Empty uses name.
description = ""
# Absolute origin; canonical and alternate URLs are built from it.
base_url = "https://www.petpedia.example"
# Locale served at / and used as the hreflang x-default.
default_locale = "nl"

# ---------------------------------------------------------------------------
# Publisher named in Article structured data
# ---------------------------------------------------------------------------
[publisher]
name = "Petpedia"
logo_url = "https://www.petpedia.example/assets/logo.png"

# ---------------------------------------------------------------------------
# Affiliate redirect links: https://{domain}/{path_prefix}/{target}
# Leave domain empty to disable affiliate calls to action.
# ---------------------------------------------------------------------------
[affiliate]
domain = "go.petpedia-partners.example"
path_prefix = "out"
utm_source = "petpedia"

# ---------------------------------------------------------------------------
# Provider directory search route: /{locale}/{path}/?category=...
# ---------------------------------------------------------------------------
[directory]
path = "directory"

# ---------------------------------------------------------------------------
# Advertisement placeholders
# ---------------------------------------------------------------------------
[ads]
enabled = false
client = ""

# Slot ids per placement: after-intro, mid-article, before-faq
[ads.slots]

# ---------------------------------------------------------------------------
# Locales
# ---------------------------------------------------------------------------
[locales.en]
name = "English"
og_locale = "en_GB"

[locales.en.labels]
home = "Home"
breadcrumb = "Breadcrumb"
faq = "Frequently asked questions"
related_items = "Safe alternatives"
related_pages = "Read also"
advertisement = "Advertisement"
published = "Published"
updated = "Updated"
substance = "Substance"
species = "Species"
severity = "Severity"
severity_low = "Low"
severity_moderate = "Moderate"
severity_high = "High"
severity_fatal = "Life-threatening"
read_more = "Read more"
languages = "Language"

[locales.nl]
name = "Nederlands"
og_locale = "nl_NL"

[locales.nl.labels]
home = "Home"
breadcrumb = "Kruimelpad"
faq = "Veelgestelde vragen"
related_items = "Wel veilig"
related_pages = "Lees ook"
advertisement = "Advertentie"
published = "Gepubliceerd"
updated = "Bijgewerkt"
substance = "Stof"
species = "Diersoort"
severity = "Ernst"
severity_low = "Laag"
severity_moderate = "Matig"
severity_high = "Hoog"
severity_fatal = "Levensgevaarlijk"
read_more = "Lees meer"
languages = "Taal"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fffdf8"
text = "#1f2933"
text_muted = "#616e7c"    # Breadcrumbs, dates, ad labels
border = "#e4e7eb"
link = "#0b6e4f"
accent = "#f29e4c"        # Call-to-action buttons
warning = "#c0392b"       # Toxicity warning panels

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#12181f"
text = "#e4e7eb"
text_muted = "#9aa5b1"
border = "#323f4b"
link = "#5fd3a6"
accent = "#f7b267"
warning = "#ff6b5b"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel rendering workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-accent: {light_accent};
    --color-warning: {light_warning};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-accent: {dark_accent};
        --color-warning: {dark_warning};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_accent = colors.light.accent,
        light_warning = colors.light.warning,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_accent = colors.dark.accent,
        dark_warning = colors.dark.warning,
    )
}
