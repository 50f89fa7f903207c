//! Outbound call-to-action links.
//!
//! Two kinds of targets exist. Affiliate links leave the site through the
//! configured redirect domain; directory links stay on the site's origin but
//! land in the provider directory, which another application serves.

use crate::config::SiteConfig;
use crate::routes;
use crate::types::{Cta, CtaKind};
use thiserror::Error;
use url::Url;

/// `rel` for affiliate anchors.
pub const SPONSORED_REL: &str = "sponsored nofollow noopener";

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("affiliate link '{0}' requires affiliate.domain to be configured")]
    AffiliateDisabled(String),
    #[error("invalid affiliate URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A rendered call-to-action target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtaLink {
    pub href: String,
    pub sponsored: bool,
}

/// Affiliate redirect URL: `https://{domain}/{path_prefix}/{target}` with
/// UTM parameters. `campaign` is the slug of the page carrying the link.
pub fn affiliate_url(config: &SiteConfig, target: &str, campaign: &str) -> Result<Url, LinkError> {
    let affiliate = &config.affiliate;
    if affiliate.domain.is_empty() {
        return Err(LinkError::AffiliateDisabled(target.to_string()));
    }
    let prefix = affiliate.path_prefix.trim_matches('/');
    let raw = if prefix.is_empty() {
        format!("https://{}/{}", affiliate.domain, target)
    } else {
        format!("https://{}/{}/{}", affiliate.domain, prefix, target)
    };
    let mut url = Url::parse(&raw)?;
    url.query_pairs_mut()
        .append_pair("utm_source", &affiliate.utm_source)
        .append_pair("utm_medium", "affiliate")
        .append_pair("utm_campaign", campaign);
    Ok(url)
}

/// Provider directory search filtered by category.
pub fn directory_url(config: &SiteConfig, locale: &str, category: &str) -> String {
    let mut path = routes::directory_path(locale, &config.directory.path);
    path.push_str("?category=");
    path.extend(url::form_urlencoded::byte_serialize(category.as_bytes()));
    path
}

/// Resolve a CTA to its href.
pub fn cta_link(
    config: &SiteConfig,
    locale: &str,
    campaign: &str,
    cta: &Cta,
) -> Result<CtaLink, LinkError> {
    match cta.kind {
        CtaKind::Affiliate => Ok(CtaLink {
            href: affiliate_url(config, &cta.target, campaign)?.into(),
            sponsored: true,
        }),
        CtaKind::Directory => Ok(CtaLink {
            href: directory_url(config, locale, &cta.target),
            sponsored: false,
        }),
    }
}
