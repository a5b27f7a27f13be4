//! Transport seam between the engine and the network.
//!
//! The engine never talks to the network itself; callers hand it a
//! [`Transport`] and every fetch goes through that object. Tests drive the
//! engine with canned in-memory transports, real deployments plug in an
//! HTTP client.

use scraper::Html;

use crate::error::LensError;

/// A fetched HTML document: the parsed tree plus the bytes it came from.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub tree: Html,
    pub raw_html: String,
}

impl FetchedDocument {
    /// Parse raw HTML into a document. Parsing is non-failing; malformed
    /// markup yields a best-effort tree.
    pub fn from_html(raw_html: impl Into<String>) -> Self {
        let raw_html = raw_html.into();
        Self {
            tree: Html::parse_document(&raw_html),
            raw_html,
        }
    }
}

/// Outcome of a lightweight image probe (a HEAD-style request).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageProbe {
    /// Whether the URL serves a real image.
    pub is_image: bool,
    pub content_type: Option<String>,
    pub byte_size: Option<u64>,
}

/// Network collaborator. Implementations decide policy: redirects,
/// timeouts, user-agent, caching.
pub trait Transport {
    /// Fetch a URL expected to return an HTML page. Implementations fail
    /// when the response is not HTML or not valid UTF-8.
    fn fetch_document(&self, url: &str) -> Result<FetchedDocument, LensError>;

    /// Fetch a URL expected to return a plain-text body (robots.txt,
    /// sitemap.xml).
    fn fetch_text(&self, url: &str) -> Result<String, LensError>;

    /// Probe a URL to learn whether it serves an image, without
    /// downloading the body.
    fn probe_image(&self, url: &str) -> Result<ImageProbe, LensError>;
}
