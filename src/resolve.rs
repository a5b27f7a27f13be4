//! Turn raw extracted metadata into display-ready fields.
//!
//! Two behaviors live here: relative URL resolution against the request
//! URL, and fallback chains where a field has one canonical source plus
//! secondary sources. Chain order is a named constant, first non-empty
//! value wins.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::html::RawMetadata;

/// One raw occurrence of a multi-valued field (e.g. one favicon link).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataValue {
    pub value: String,
    pub label: Option<String>,
    /// Where the value came from, e.g. `link[rel="icon"]`.
    pub source: Option<String>,
    pub resolved_url: Option<String>,
}

/// One logical piece of metadata after resolution. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub label: String,
    pub value: Option<String>,
    pub values: Vec<MetadataValue>,
    pub resolved_url: Option<String>,
}

impl MetadataField {
    fn text(label: &str, value: Option<String>) -> Self {
        Self {
            label: label.to_string(),
            value,
            ..Self::default()
        }
    }

    fn url(label: &str, value: Option<String>, base: &str) -> Self {
        let resolved_url = value.as_deref().and_then(|v| resolve_url(v, base));
        Self {
            label: label.to_string(),
            value,
            resolved_url,
            ..Self::default()
        }
    }

    fn list(label: &str, values: Vec<MetadataValue>) -> Self {
        Self {
            label: label.to_string(),
            values,
            ..Self::default()
        }
    }
}

/// A metadata namespace that can feed a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    General,
    OpenGraph,
    Twitter,
}

/// Social preview title: Twitter wins, then Open Graph, then the plain
/// document title.
pub const PREVIEW_TITLE_CHAIN: [Source; 3] = [Source::Twitter, Source::OpenGraph, Source::General];

/// Social preview description: Open Graph wins.
pub const PREVIEW_DESCRIPTION_CHAIN: [Source; 3] =
    [Source::OpenGraph, Source::Twitter, Source::General];

/// Social preview image: Twitter wins, then Open Graph.
pub const PREVIEW_IMAGE_CHAIN: [Source; 2] = [Source::Twitter, Source::OpenGraph];

/// Site name: Open Graph wins, then the Twitter site handle.
pub const PREVIEW_SITE_NAME_CHAIN: [Source; 2] = [Source::OpenGraph, Source::Twitter];

/// Evaluate a chain: first source whose value is non-empty wins.
fn first_non_empty<'a>(
    chain: &[Source],
    mut get: impl FnMut(Source) -> Option<&'a str>,
) -> Option<&'a str> {
    chain
        .iter()
        .copied()
        .find_map(|source| get(source).filter(|v| !v.trim().is_empty()))
}

/// Resolve a possibly-relative URL against the request URL.
///
/// Handles relative paths, protocol-relative, and already-absolute
/// values. Malformed input yields `None`, never an error.
pub fn resolve_url(href: &str, base: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(String::from)
}

/// Display-ready metadata for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub raw_url: String,
    pub general: ResolvedGeneral,
    pub open_graph: ResolvedOpenGraph,
    pub twitter: ResolvedTwitter,
    pub mobile: ResolvedMobile,
    pub preview: SocialPreview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGeneral {
    pub title: MetadataField,
    pub description: MetadataField,
    pub canonical: MetadataField,
    pub favicons: MetadataField,
    pub authors: MetadataField,
    pub robots: MetadataField,
    pub theme_colors: MetadataField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOpenGraph {
    pub title: MetadataField,
    pub description: MetadataField,
    pub image: MetadataField,
    pub images: MetadataField,
    pub site_name: MetadataField,
    pub kind: MetadataField,
    pub url: MetadataField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTwitter {
    pub title: MetadataField,
    pub description: MetadataField,
    pub image: MetadataField,
    pub card: MetadataField,
    pub site: MetadataField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMobile {
    pub apple_touch_icons: MetadataField,
}

/// The values a link-preview renderer would pick, after fallback
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPreview {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Resolved image URL.
    pub image: Option<String>,
    pub site_name: Option<String>,
    /// Card type, defaulting to `summary` when undeclared.
    pub card: String,
}

/// Resolve raw metadata into UI-ready fields.
pub fn resolve_metadata(raw: &RawMetadata) -> ResolvedMetadata {
    let base = raw.raw_url.as_str();

    let general = ResolvedGeneral {
        title: MetadataField::text("title", raw.general.title.clone()),
        description: MetadataField::text("description", raw.general.description.clone()),
        canonical: MetadataField::url("canonical", raw.general.canonical.clone(), base),
        favicons: resolve_favicons(raw, base),
        authors: MetadataField::list(
            "author",
            raw.general
                .authors
                .iter()
                .map(|a| MetadataValue {
                    value: a.name.clone(),
                    label: Some(a.name.clone()),
                    source: None,
                    resolved_url: a.href.as_deref().and_then(|h| resolve_url(h, base)),
                })
                .collect(),
        ),
        robots: MetadataField::text("robots", raw.general.robots.clone()),
        theme_colors: MetadataField::list(
            "theme-color",
            raw.general
                .theme_colors
                .iter()
                .filter_map(|tc| {
                    tc.value.as_ref().map(|v| MetadataValue {
                        value: v.clone(),
                        label: tc.media.clone(),
                        source: None,
                        resolved_url: None,
                    })
                })
                .collect(),
        ),
    };

    let open_graph = ResolvedOpenGraph {
        title: MetadataField::text("og:title", raw.open_graph.title.clone()),
        description: MetadataField::text("og:description", raw.open_graph.description.clone()),
        image: MetadataField::url("og:image", raw.open_graph.image.clone(), base),
        images: MetadataField::list(
            "og:image (structured)",
            raw.open_graph
                .images
                .iter()
                .map(|img| MetadataValue {
                    value: img.url.clone(),
                    label: img.alt.clone(),
                    source: img.kind.clone(),
                    resolved_url: resolve_url(&img.url, base),
                })
                .collect(),
        ),
        site_name: MetadataField::text("og:site_name", raw.open_graph.site_name.clone()),
        kind: MetadataField::text("og:type", raw.open_graph.kind.clone()),
        url: MetadataField::url("og:url", raw.open_graph.url.clone(), base),
    };

    let twitter = ResolvedTwitter {
        title: MetadataField::text("twitter:title", raw.twitter.title.clone()),
        description: MetadataField::text("twitter:description", raw.twitter.description.clone()),
        image: MetadataField::url("twitter:image", raw.twitter.image.clone(), base),
        card: MetadataField::text("twitter:card", raw.twitter.card.clone()),
        site: MetadataField::text("twitter:site", raw.twitter.site.clone()),
    };

    let mobile = ResolvedMobile {
        apple_touch_icons: MetadataField::list(
            "apple-touch-icon",
            raw.mobile
                .apple_touch_icons
                .iter()
                .filter_map(|icon| {
                    icon.href.as_ref().map(|href| MetadataValue {
                        value: href.clone(),
                        label: icon.sizes.clone(),
                        source: Some(r#"link[rel="apple-touch-icon"]"#.to_string()),
                        resolved_url: resolve_url(href, base),
                    })
                })
                .collect(),
        ),
    };

    let preview = build_preview(raw, &open_graph, &twitter);

    ResolvedMetadata {
        raw_url: raw.raw_url.clone(),
        general,
        open_graph,
        twitter,
        mobile,
        preview,
    }
}

fn build_preview(raw: &RawMetadata, og: &ResolvedOpenGraph, tw: &ResolvedTwitter) -> SocialPreview {
    let title = first_non_empty(&PREVIEW_TITLE_CHAIN, |s| match s {
        Source::Twitter => raw.twitter.title.as_deref(),
        Source::OpenGraph => raw.open_graph.title.as_deref(),
        Source::General => raw.general.title.as_deref(),
    });

    let description = first_non_empty(&PREVIEW_DESCRIPTION_CHAIN, |s| match s {
        Source::OpenGraph => raw.open_graph.description.as_deref(),
        Source::Twitter => raw.twitter.description.as_deref(),
        Source::General => raw.general.description.as_deref(),
    });

    // For images the chain runs over resolved URLs; within Open Graph the
    // last structured record wins over the plain og:image tag.
    let image = first_non_empty(&PREVIEW_IMAGE_CHAIN, |s| match s {
        Source::Twitter => tw.image.resolved_url.as_deref(),
        Source::OpenGraph => og
            .images
            .values
            .last()
            .and_then(|v| v.resolved_url.as_deref())
            .or(og.image.resolved_url.as_deref()),
        Source::General => None,
    });

    let site_name = first_non_empty(&PREVIEW_SITE_NAME_CHAIN, |s| match s {
        Source::OpenGraph => raw.open_graph.site_name.as_deref(),
        Source::Twitter => raw.twitter.site.as_deref(),
        Source::General => None,
    });

    SocialPreview {
        title: title.map(String::from),
        description: description.map(String::from),
        image: image.map(String::from),
        site_name: site_name.map(String::from),
        card: raw
            .twitter
            .card
            .clone()
            .unwrap_or_else(|| "summary".to_string()),
    }
}

/// Declared favicon links plus the conventional well-known fallbacks.
fn resolve_favicons(raw: &RawMetadata, base: &str) -> MetadataField {
    let mut values: Vec<MetadataValue> = raw
        .general
        .favicons
        .iter()
        .filter_map(|icon| {
            let href = icon.href.as_ref()?;
            Some(MetadataValue {
                value: href.clone(),
                label: Some(icon.kind.clone().unwrap_or_else(|| "unknown".to_string())),
                source: Some(format!(
                    r#"link[rel="{}"]"#,
                    icon.rel.as_deref().unwrap_or("icon")
                )),
                resolved_url: resolve_url(href, base),
            })
        })
        .collect();

    for (path, kind) in [("/favicon.ico", "image/x-icon"), ("/favicon.png", "image/png")] {
        values.push(MetadataValue {
            value: path.to_string(),
            label: Some(kind.to_string()),
            source: Some(format!("direct link to {path}")),
            resolved_url: resolve_url(path, base),
        });
    }

    MetadataField::list("favicons", values)
}
