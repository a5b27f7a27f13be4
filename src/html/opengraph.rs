//! Open Graph metadata, including the order-dependent structured image
//! list.

use scraper::Html;
use serde::{Deserialize, Serialize};

use super::{attr, meta_property, meta_property_all, select_all};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraphMeta {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Plain `og:image` content (first occurrence), unresolved.
    pub image: Option<String>,
    pub url: Option<String>,
    pub audio: Option<String>,
    pub description: Option<String>,
    pub determiner: Option<String>,
    pub locale: Option<String>,
    pub locale_alternates: Vec<String>,
    pub site_name: Option<String>,
    pub video: Option<String>,
    pub image_alt: Option<String>,
    /// Structured image records assembled from `og:image` and
    /// `og:image:*` tags in document order.
    pub images: Vec<OgImage>,
    pub article_published_time: Option<String>,
    pub article_modified_time: Option<String>,
    pub article_expiration_time: Option<String>,
    pub article_authors: Vec<String>,
    pub article_section: Option<String>,
    pub article_tags: Vec<String>,
}

/// One structured Open Graph image record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OgImage {
    pub url: String,
    pub secure_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub alt: Option<String>,
}

pub fn extract(doc: &Html) -> OpenGraphMeta {
    OpenGraphMeta {
        title: meta_property(doc, "og:title"),
        kind: meta_property(doc, "og:type"),
        image: meta_property(doc, "og:image"),
        url: meta_property(doc, "og:url"),
        audio: meta_property(doc, "og:audio"),
        description: meta_property(doc, "og:description"),
        determiner: meta_property(doc, "og:determiner"),
        locale: meta_property(doc, "og:locale"),
        locale_alternates: meta_property_all(doc, "og:locale:alternate"),
        site_name: meta_property(doc, "og:site_name"),
        video: meta_property(doc, "og:video"),
        image_alt: meta_property(doc, "og:image:alt"),
        images: extract_images(doc),
        article_published_time: meta_property(doc, "article:published_time"),
        article_modified_time: meta_property(doc, "article:modified_time"),
        article_expiration_time: meta_property(doc, "article:expiration_time"),
        article_authors: meta_property_all(doc, "article:author"),
        article_section: meta_property(doc, "article:section"),
        article_tags: meta_property_all(doc, "article:tag"),
    }
}

/// Assemble structured image records from `meta[property*="og:image"]`
/// tags, scanned in document order.
///
/// A property of exactly `og:image` starts a new record; an
/// `og:image:<suffix>` tag sets that suffix on the most recently started
/// record. A suffix tag arriving before any `og:image` tag has no record
/// to attach to and is dropped.
fn extract_images(doc: &Html) -> Vec<OgImage> {
    let mut images: Vec<OgImage> = Vec::new();

    for el in select_all(doc, r#"meta[property*="og:image"]"#) {
        let (Some(property), Some(content)) = (attr(el, "property"), attr(el, "content")) else {
            continue;
        };
        let Some(suffix) = property.strip_prefix("og:image") else {
            continue;
        };

        if suffix.is_empty() {
            images.push(OgImage {
                url: content,
                ..OgImage::default()
            });
            continue;
        }

        let Some(last) = images.last_mut() else {
            continue; // orphaned suffix tag
        };
        match suffix.trim_start_matches(':') {
            "secure_url" => last.secure_url = Some(content),
            "type" => last.kind = Some(content),
            "width" => last.width = Some(content),
            "height" => last.height = Some(content),
            "alt" => last.alt = Some(content),
            _ => {}
        }
    }

    images
}
