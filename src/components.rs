//! Shared presentational helpers.
//!
//! Stateless maud fragments used by every page renderer. Helpers that show
//! a list to readers (breadcrumb trail, related items, FAQ) take the same
//! slice the structured-data builders take, so both renderings come from one
//! value.

use crate::config::{AdsConfig, Labels};
use crate::content::markdown_to_html;
use crate::links::{CtaLink, SPONSORED_REL};
use crate::routes;
use crate::schema;
use crate::types::{AdPlacement, BreadcrumbItem, Category, FaqEntry, ListEntry, Section, Severity, Toxicity};
use maud::{Markup, PreEscaped, html};
use serde_json::Value;
use url::Url;

/// `<script type="application/ld+json">` wrapper.
pub fn json_ld(value: &Value) -> Markup {
    html! {
        script type="application/ld+json" {
            (PreEscaped(schema::to_script_text(value)))
        }
    }
}

/// Breadcrumb items for a locale home, category, or page.
pub fn trail(
    labels: &Labels,
    locale: &str,
    category: Option<&Category>,
    page: Option<(&str, &str)>,
) -> Vec<BreadcrumbItem> {
    let mut items = vec![BreadcrumbItem {
        name: labels.home.clone(),
        path: routes::home_path(locale),
    }];
    if let Some(category) = category {
        items.push(BreadcrumbItem {
            name: category.title.clone(),
            path: routes::category_path(locale, &category.slug),
        });
        if let Some((title, slug)) = page {
            items.push(BreadcrumbItem {
                name: title.to_string(),
                path: routes::page_path(locale, &category.slug, slug),
            });
        }
    }
    items
}

/// Ordered navigational trail plus its `BreadcrumbList` block.
///
/// The last item is the current page and is not linked.
pub fn breadcrumb(base: &Url, aria_label: &str, items: &[BreadcrumbItem]) -> Markup {
    if items.is_empty() {
        return html! {};
    }
    let last = items.len() - 1;
    html! {
        nav.breadcrumb aria-label=(aria_label) {
            ol {
                @for (i, item) in items.iter().enumerate() {
                    li {
                        @if i == last {
                            span aria-current="page" { (item.name) }
                        } @else {
                            a href=(item.path) { (item.name) }
                        }
                    }
                }
            }
        }
        @if let Some(value) = schema::breadcrumb_list(base, items) {
            (json_ld(&value))
        }
    }
}

/// Card grid of related items (e.g. safe foods) plus its `ItemList` block.
pub fn related_list(base: &Url, heading: &str, entries: &[ListEntry]) -> Markup {
    if entries.is_empty() {
        return html! {};
    }
    html! {
        section.related-items {
            h2 { (heading) }
            ul.card-grid {
                @for entry in entries {
                    li.card {
                        @if let Some(link) = &entry.link {
                            a.card-title href=(link) { (entry.name) }
                        } @else {
                            span.card-title { (entry.name) }
                        }
                        p { (entry.description) }
                    }
                }
            }
        }
        @if let Some(value) = schema::item_list(base, heading, entries) {
            (json_ld(&value))
        }
    }
}

/// Internal cross-links to related articles: `(title, path)` pairs.
pub fn cross_links(heading: &str, links: &[(String, String)]) -> Markup {
    if links.is_empty() {
        return html! {};
    }
    html! {
        aside.related-pages {
            h2 { (heading) }
            ul {
                @for (title, path) in links {
                    li { a href=(path) { (title) } }
                }
            }
        }
    }
}

/// Advertisement placeholder; renders nothing when ads are disabled.
pub fn ad_slot(ads: &AdsConfig, placement: AdPlacement, label: &str) -> Markup {
    if !ads.enabled {
        return html! {};
    }
    let slot = ads.slots.get(placement.key());
    html! {
        aside.ad-slot data-placement=(placement.key()) {
            span.ad-label { (label) }
            ins.ad-unit data-ad-client=(ads.client) data-ad-slot=[slot] {}
        }
    }
}

/// FAQ accordion. Question and answer text is rendered verbatim so it
/// matches the `FAQPage` block character for character.
pub fn faq_accordion(heading: &str, faq: &[FaqEntry]) -> Markup {
    if faq.is_empty() {
        return html! {};
    }
    html! {
        section.faq id="faq" {
            h2 { (heading) }
            @for entry in faq {
                details.faq-item {
                    summary.faq-question { (entry.question) }
                    div.faq-answer {
                        p { (entry.answer) }
                    }
                }
            }
        }
        @if let Some(value) = schema::faq_page(faq) {
            (json_ld(&value))
        }
    }
}

/// Call-to-action button. Affiliate links open in a new tab and carry
/// `rel="sponsored"`.
pub fn cta_button(label: &str, link: &CtaLink) -> Markup {
    html! {
        @if link.sponsored {
            a.cta.cta-affiliate href=(link.href) rel=(SPONSORED_REL) target="_blank" { (label) }
        } @else {
            a.cta.cta-directory href=(link.href) { (label) }
        }
    }
}

fn severity_label(labels: &Labels, severity: Severity) -> &str {
    match severity {
        Severity::Low => &labels.severity_low,
        Severity::Moderate => &labels.severity_moderate,
        Severity::High => &labels.severity_high,
        Severity::Fatal => &labels.severity_fatal,
    }
}

/// Summary panel for toxicity pages.
pub fn toxicity_panel(labels: &Labels, toxicity: &Toxicity) -> Markup {
    html! {
        aside class={ "toxicity-panel " (toxicity.severity.css_class()) } {
            dl {
                dt { (labels.substance) }
                dd { (toxicity.substance) }
                dt { (labels.species) }
                dd { (toxicity.species) }
                dt { (labels.severity) }
                dd.severity { (severity_label(labels, toxicity.severity)) }
            }
        }
    }
}

/// One thematic section: heading, then prose, bullets, and cards in that order.
pub fn section_block(section: &Section) -> Markup {
    html! {
        section class={ "article-section " (section.tone.css_class()) } {
            h2 { (section.heading) }
            @if let Some(body) = &section.body {
                div.prose { (PreEscaped(markdown_to_html(body))) }
            }
            @if !section.items.is_empty() {
                ul.bullets {
                    @for item in &section.items {
                        li { (item) }
                    }
                }
            }
            @if !section.cards.is_empty() {
                div.card-grid {
                    @for card in &section.cards {
                        div.card {
                            @if let Some(link) = &card.link {
                                a.card-title href=(link) { (card.title) }
                            } @else {
                                span.card-title { (card.title) }
                            }
                            p { (card.text) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tone;

    fn base() -> Url {
        Url::parse("https://www.petpedia.example").unwrap()
    }

    fn items() -> Vec<BreadcrumbItem> {
        vec![
            BreadcrumbItem {
                name: "Home".into(),
                path: "/nl/".into(),
            },
            BreadcrumbItem {
                name: "Toxiciteit".into(),
                path: "/nl/toxiciteit/".into(),
            },
            BreadcrumbItem {
                name: "Chocolade".into(),
                path: "/nl/toxiciteit/chocolade-hond/".into(),
            },
        ]
    }

    #[test]
    fn breadcrumb_links_all_but_last() {
        let html = breadcrumb(&base(), "Kruimelpad", &items()).into_string();
        assert!(html.contains(r#"aria-label="Kruimelpad""#));
        assert!(html.contains(r#"<a href="/nl/">Home</a>"#));
        assert!(html.contains(r#"<a href="/nl/toxiciteit/">Toxiciteit</a>"#));
        assert!(html.contains(r#"<span aria-current="page">Chocolade</span>"#));
        assert!(html.contains("BreadcrumbList"));
    }

    #[test]
    fn breadcrumb_empty_renders_nothing() {
        assert!(breadcrumb(&base(), "x", &[]).into_string().is_empty());
    }

    #[test]
    fn trail_for_page() {
        let category = Category {
            slug: "toxiciteit".into(),
            title: "Toxiciteit".into(),
            description: None,
            in_nav: true,
            sort_key: 10,
            source_dir: "nl/010-toxiciteit".into(),
            pages: vec![],
        };
        let labels = Labels::default_nl();
        let items = trail(&labels, "nl", Some(&category), Some(("Chocolade", "chocolade-hond")));
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].path, "/nl/toxiciteit/chocolade-hond/");
        assert_eq!(trail(&labels, "nl", None, None).len(), 1);
    }

    #[test]
    fn related_list_renders_cards_and_item_list() {
        let entries = vec![ListEntry {
            name: "Wortel".into(),
            description: "Caloriearm".into(),
            link: None,
        }];
        let html = related_list(&base(), "Wel veilig", &entries).into_string();
        assert!(html.contains("Wortel"));
        assert!(html.contains("Caloriearm"));
        assert!(html.contains("ItemList"));
    }

    #[test]
    fn ad_slot_disabled_renders_nothing() {
        let ads = AdsConfig::default();
        assert!(ad_slot(&ads, AdPlacement::AfterIntro, "Advertentie")
            .into_string()
            .is_empty());
    }

    #[test]
    fn ad_slot_enabled_renders_placeholder() {
        let mut ads = AdsConfig {
            enabled: true,
            client: "ca-pub-42".into(),
            ..Default::default()
        };
        ads.slots.insert("before-faq".into(), "998877".into());
        let html = ad_slot(&ads, AdPlacement::BeforeFaq, "Advertentie").into_string();
        assert!(html.contains(r#"data-placement="before-faq""#));
        assert!(html.contains(r#"data-ad-client="ca-pub-42""#));
        assert!(html.contains(r#"data-ad-slot="998877""#));
        assert!(html.contains("Advertentie"));

        let html = ad_slot(&ads, AdPlacement::MidArticle, "Advertentie").into_string();
        assert!(!html.contains("data-ad-slot"));
    }

    #[test]
    fn faq_accordion_mirrors_entries() {
        let faq = vec![FaqEntry {
            question: "Mag mijn hond \"witte\" chocolade?".into(),
            answer: "Liever niet.".into(),
        }];
        let html = faq_accordion("Veelgestelde vragen", &faq).into_string();
        assert!(html.contains("faq-question"));
        assert!(html.contains("Mag mijn hond &quot;witte&quot; chocolade?"));
        assert!(html.contains("FAQPage"));
    }

    #[test]
    fn cta_button_affiliate_is_sponsored() {
        let link = CtaLink {
            href: "https://go.example/out/x".into(),
            sponsored: true,
        };
        let html = cta_button("Bestel", &link).into_string();
        assert!(html.contains(r#"rel="sponsored nofollow noopener""#));
        assert!(html.contains(r#"target="_blank""#));
    }

    #[test]
    fn section_block_renders_all_content_kinds() {
        let section = Section {
            heading: "Symptomen".into(),
            body: Some("Let op **braken**.".into()),
            items: vec!["Onrust".into()],
            cards: vec![crate::types::Card {
                title: "Spoed".into(),
                text: "Bel direct".into(),
                link: Some("/nl/directory/".into()),
            }],
            tone: Tone::Danger,
        };
        let html = section_block(&section).into_string();
        assert!(html.contains("tone-danger"));
        assert!(html.contains("<strong>braken</strong>"));
        assert!(html.contains("<li>Onrust</li>"));
        assert!(html.contains(r#"href="/nl/directory/""#));
    }

    #[test]
    fn toxicity_panel_uses_localized_severity() {
        let tox = Toxicity {
            substance: "Xylitol".into(),
            species: "Hond".into(),
            severity: Severity::Fatal,
        };
        let html = toxicity_panel(&Labels::default_nl(), &tox).into_string();
        assert!(html.contains("severity-fatal"));
        assert!(html.contains("Levensgevaarlijk"));
    }
}
