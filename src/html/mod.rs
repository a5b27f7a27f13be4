//! Extract raw metadata from a parsed HTML document.
//!
//! Each namespace (general, Open Graph, Twitter, mobile, JSON-LD) is
//! extracted with independent, non-failing lookups: a missing tag yields
//! `None`, never an error. The single fatal case is a JSON-LD block that
//! fails to parse — list extraction is all-or-nothing and the whole
//! extraction aborts, wrapped as "Metadata Parse Failed".

pub mod general;
pub mod jsonld;
pub mod mobile;
pub mod opengraph;
pub mod twitter;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::LensError;
pub use general::GeneralMeta;
pub use mobile::MobileMeta;
pub use opengraph::{OgImage, OpenGraphMeta};
pub use twitter::TwitterMeta;

/// Raw per-namespace metadata extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetadata {
    /// The request URL the document was fetched from; used later as the
    /// base for URL resolution, never interpreted here.
    pub raw_url: String,
    pub general: GeneralMeta,
    pub open_graph: OpenGraphMeta,
    pub twitter: TwitterMeta,
    pub mobile: MobileMeta,
    /// Parsed `application/ld+json` blocks, in document order.
    pub json_ld: Vec<serde_json::Value>,
}

/// Extract all metadata namespaces from a parsed document.
pub fn extract_html_metadata(doc: &Html, raw_url: &str) -> Result<RawMetadata, LensError> {
    let json_ld = jsonld::extract(doc)
        .map_err(|e| LensError::wrap_with("extract_html_metadata", "Metadata Parse Failed", e))?;

    let metadata = RawMetadata {
        raw_url: raw_url.to_string(),
        general: general::extract(doc),
        open_graph: opengraph::extract(doc),
        twitter: twitter::extract(doc),
        mobile: mobile::extract(doc),
        json_ld,
    };
    tracing::debug!(url = raw_url, "extracted head metadata");
    Ok(metadata)
}

/// First element matching a selector, or `None`.
pub(crate) fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next()
}

/// All elements matching a selector, in document order.
pub(crate) fn select_all<'a>(doc: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => doc.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

pub(crate) fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value().attr(name).map(str::to_string)
}

/// `content` of `meta[name=...]`.
pub(crate) fn meta_named(doc: &Html, name: &str) -> Option<String> {
    select_first(doc, &format!(r#"meta[name="{name}"]"#)).and_then(|el| attr(el, "content"))
}

/// `content` of `meta[property=...]`.
pub(crate) fn meta_property(doc: &Html, property: &str) -> Option<String> {
    select_first(doc, &format!(r#"meta[property="{property}"]"#)).and_then(|el| attr(el, "content"))
}

/// `content` of every `meta[property=...]`, in document order.
pub(crate) fn meta_property_all(doc: &Html, property: &str) -> Vec<String> {
    select_all(doc, &format!(r#"meta[property="{property}"]"#))
        .into_iter()
        .filter_map(|el| attr(el, "content"))
        .collect()
}
