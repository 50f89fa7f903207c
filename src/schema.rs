//! JSON-LD structured data.
//!
//! Each builder mirrors content that is also rendered visibly, from the same
//! input values, so the machine-readable copy cannot drift from the page.

use crate::config::SiteConfig;
use crate::routes::absolute_url;
use crate::types::{Article, BreadcrumbItem, FaqEntry, ListEntry};
use serde_json::{Value, json};
use url::Url;

const CONTEXT: &str = "https://schema.org";

fn organization(config: &SiteConfig) -> Value {
    json!({
        "@type": "Organization",
        "name": config.publisher.name,
        "logo": {
            "@type": "ImageObject",
            "url": config.publisher.logo_url,
        },
    })
}

/// `Article` block for a content page.
pub fn article(config: &SiteConfig, base: &Url, locale: &str, path: &str, page: &Article) -> Value {
    let canonical = absolute_url(base, path);
    let mut value = json!({
        "@context": CONTEXT,
        "@type": "Article",
        "headline": page.title,
        "description": page.description,
        "inLanguage": locale,
        "author": organization(config),
        "publisher": organization(config),
        "datePublished": page.published.format("%Y-%m-%d").to_string(),
        "dateModified": page.modified.format("%Y-%m-%d").to_string(),
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": canonical,
        },
    });
    if !page.keywords.is_empty()
        && let Some(obj) = value.as_object_mut()
    {
        obj.insert("keywords".to_string(), Value::from(page.keywords.join(", ")));
    }
    value
}

/// `FAQPage` block; `None` when there are no entries.
pub fn faq_page(faq: &[FaqEntry]) -> Option<Value> {
    if faq.is_empty() {
        return None;
    }
    let entities: Vec<Value> = faq
        .iter()
        .map(|entry| {
            json!({
                "@type": "Question",
                "name": entry.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": entry.answer,
                },
            })
        })
        .collect();
    Some(json!({
        "@context": CONTEXT,
        "@type": "FAQPage",
        "mainEntity": entities,
    }))
}

/// `BreadcrumbList` block; `None` for an empty trail.
pub fn breadcrumb_list(base: &Url, items: &[BreadcrumbItem]) -> Option<Value> {
    if items.is_empty() {
        return None;
    }
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": item.name,
                "item": absolute_url(base, &item.path),
            })
        })
        .collect();
    Some(json!({
        "@context": CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    }))
}

/// `ItemList` block for a related-items list; `None` for an empty list.
pub fn item_list(base: &Url, name: &str, entries: &[ListEntry]) -> Option<Value> {
    if entries.is_empty() {
        return None;
    }
    let elements: Vec<Value> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut element = json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": entry.name,
                "description": entry.description,
            });
            if let Some(link) = &entry.link
                && let Some(obj) = element.as_object_mut()
            {
                let url = if link.starts_with('/') {
                    absolute_url(base, link)
                } else {
                    link.clone()
                };
                obj.insert("url".to_string(), Value::from(url));
            }
            element
        })
        .collect();
    Some(json!({
        "@context": CONTEXT,
        "@type": "ItemList",
        "name": name,
        "itemListElement": elements,
    }))
}

/// Serialize for embedding in a `<script>` element.
///
/// `</` is escaped so text content can never close the script early.
pub fn to_script_text(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_article;

    fn base() -> Url {
        Url::parse("https://www.petpedia.example").unwrap()
    }

    #[test]
    fn article_has_required_fields() {
        let config = SiteConfig::default();
        let page = sample_article("Chocolade");
        let value = article(&config, &base(), "nl", "/nl/toxiciteit/chocolade-hond/", &page);
        assert_eq!(value["@type"], "Article");
        assert_eq!(value["headline"], "Chocolade");
        assert_eq!(value["inLanguage"], "nl");
        assert_eq!(value["publisher"]["name"], "Petpedia");
        assert_eq!(
            value["publisher"]["logo"]["url"],
            "https://www.petpedia.example/assets/logo.png"
        );
        assert_eq!(value["datePublished"], "2024-02-01");
        assert_eq!(value["dateModified"], "2024-05-12");
        assert_eq!(
            value["mainEntityOfPage"]["@id"],
            "https://www.petpedia.example/nl/toxiciteit/chocolade-hond/"
        );
        assert_eq!(value["keywords"], "chocolade, hond");
    }

    #[test]
    fn faq_page_preserves_order_and_text() {
        let faq = vec![
            FaqEntry {
                question: "Eerste?".into(),
                answer: "Een".into(),
            },
            FaqEntry {
                question: "Tweede?".into(),
                answer: "Twee".into(),
            },
        ];
        let value = faq_page(&faq).unwrap();
        let entities = value["mainEntity"].as_array().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0]["name"], "Eerste?");
        assert_eq!(entities[1]["acceptedAnswer"]["text"], "Twee");
    }

    #[test]
    fn faq_page_empty_is_none() {
        assert!(faq_page(&[]).is_none());
    }

    #[test]
    fn breadcrumb_positions_are_one_based() {
        let items = vec![
            BreadcrumbItem {
                name: "Home".into(),
                path: "/nl/".into(),
            },
            BreadcrumbItem {
                name: "Toxiciteit".into(),
                path: "/nl/toxiciteit/".into(),
            },
        ];
        let value = breadcrumb_list(&base(), &items).unwrap();
        let elements = value["itemListElement"].as_array().unwrap();
        assert_eq!(elements[0]["position"], 1);
        assert_eq!(elements[1]["position"], 2);
        assert_eq!(
            elements[1]["item"],
            "https://www.petpedia.example/nl/toxiciteit/"
        );
    }

    #[test]
    fn item_list_makes_site_links_absolute() {
        let entries = vec![
            ListEntry {
                name: "Wortel".into(),
                description: "Caloriearm".into(),
                link: Some("/nl/voeding/wortel/".into()),
            },
            ListEntry {
                name: "Appel".into(),
                description: "Zonder pit".into(),
                link: None,
            },
        ];
        let value = item_list(&base(), "Wel veilig", &entries).unwrap();
        let elements = value["itemListElement"].as_array().unwrap();
        assert_eq!(
            elements[0]["url"],
            "https://www.petpedia.example/nl/voeding/wortel/"
        );
        assert!(elements[1].get("url").is_none());
    }

    #[test]
    fn script_text_escapes_closing_tags() {
        let value = json!({ "text": "</script><script>alert(1)" });
        let text = to_script_text(&value);
        assert!(!text.contains("</script>"));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back["text"], "</script><script>alert(1)");
    }
}
