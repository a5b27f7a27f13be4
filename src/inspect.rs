//! Top-level orchestration: one URL in, inspection results out.
//!
//! Every entry point here goes through [`normalize_input_url`] first, so
//! downstream code only ever sees an absolute http(s) URL, and every
//! failure gains exactly one wrapping layer so the cause chain reads
//! entry-point-first.

use crate::error::{ErrorKind, LensError};
use crate::html::extract_html_metadata;
use crate::resolve::{resolve_metadata, MetadataValue, ResolvedMetadata};
use crate::robots::{parse_robots, RobotsTxt};
use crate::sitemap::{parse_and_validate_sitemap, SitemapReport};
use crate::transport::Transport;

/// The result of inspecting one page.
#[derive(Debug, Clone)]
pub struct SiteInspection {
    /// The normalized URL the page was fetched from.
    pub url: String,
    pub metadata: ResolvedMetadata,
    /// First declared or well-known favicon that probes as a real image.
    pub favicon: Option<String>,
}

/// Normalize user input into an absolute http(s) URL.
///
/// A missing scheme defaults to `http://` (servers upgrade via redirect);
/// anything that still fails to parse, or parses to a non-web scheme, is
/// rejected as caller input.
pub fn normalize_input_url(input: &str) -> Result<String, LensError> {
    let trimmed = input.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = url::Url::parse(&candidate).map_err(|e| {
        LensError::new(ErrorKind::Input, "normalize_input_url", "Invalid URL")
            .with_detail(e.to_string())
            .with_context(format!("url: {input}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(
            LensError::new(ErrorKind::Input, "normalize_input_url", "Invalid URL")
                .with_detail(format!("unsupported scheme '{}'", url.scheme()))
                .with_context(format!("url: {input}")),
        );
    }

    Ok(url.to_string())
}

/// Fetch a page and run extraction, resolution, and the favicon probe.
pub fn inspect_site(transport: &dyn Transport, input: &str) -> Result<SiteInspection, LensError> {
    let url = normalize_input_url(input).map_err(|e| LensError::wrap("inspect_site", e))?;

    let document = transport
        .fetch_document(&url)
        .map_err(|e| LensError::wrap("inspect_site", e).with_context(format!("url: {url}")))?;

    let raw = extract_html_metadata(&document.tree, &url)
        .map_err(|e| LensError::wrap("inspect_site", e))?;
    let metadata = resolve_metadata(&raw);

    let favicon = pick_favicon(transport, &metadata.general.favicons.values);

    tracing::debug!(url = %url, favicon = favicon.is_some(), "inspected site");

    Ok(SiteInspection {
        url,
        metadata,
        favicon,
    })
}

/// Fetch and parse the site's robots.txt.
pub fn inspect_robots(transport: &dyn Transport, input: &str) -> Result<RobotsTxt, LensError> {
    let url = well_known_url(input, "robots.txt").map_err(|e| LensError::wrap("inspect_robots", e))?;
    let text = transport
        .fetch_text(&url)
        .map_err(|e| LensError::wrap("inspect_robots", e).with_context(format!("url: {url}")))?;
    parse_robots(&text).map_err(|e| LensError::wrap("inspect_robots", e))
}

/// Fetch, parse, and validate the site's sitemap.xml.
pub fn inspect_sitemap(transport: &dyn Transport, input: &str) -> Result<SitemapReport, LensError> {
    let url =
        well_known_url(input, "sitemap.xml").map_err(|e| LensError::wrap("inspect_sitemap", e))?;
    let text = transport
        .fetch_text(&url)
        .map_err(|e| LensError::wrap("inspect_sitemap", e).with_context(format!("url: {url}")))?;
    parse_and_validate_sitemap(&text).map_err(|e| LensError::wrap("inspect_sitemap", e))
}

/// First favicon candidate whose probe reports a real image. Probe
/// failures skip the candidate rather than failing the inspection.
pub fn pick_favicon(transport: &dyn Transport, candidates: &[MetadataValue]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.resolved_url.as_deref())
        .find(|url| {
            transport
                .probe_image(url)
                .map(|probe| probe.is_image)
                .unwrap_or(false)
        })
        .map(String::from)
}

/// Root-level well-known file URL for a site.
fn well_known_url(input: &str, file: &str) -> Result<String, LensError> {
    let normalized = normalize_input_url(input)?;
    // normalize_input_url guarantees an absolute http(s) URL.
    let mut url = url::Url::parse(&normalized).map_err(|e| {
        LensError::new(ErrorKind::Server, "well_known_url", "URL re-parse failed")
            .with_detail(e.to_string())
    })?;
    url.set_path(&format!("/{file}"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{FetchedDocument, ImageProbe};
    use std::collections::HashMap;

    /// Canned transport: URL -> body, with image probes keyed separately.
    #[derive(Default)]
    struct FakeTransport {
        pages: HashMap<String, String>,
        texts: HashMap<String, String>,
        images: HashMap<String, bool>,
    }

    impl Transport for FakeTransport {
        fn fetch_document(&self, url: &str) -> Result<FetchedDocument, LensError> {
            self.pages
                .get(url)
                .map(|html| FetchedDocument::from_html(html.clone()))
                .ok_or_else(|| {
                    LensError::new(ErrorKind::Fetch, "fake_transport", "404 Not Found")
                })
        }

        fn fetch_text(&self, url: &str) -> Result<String, LensError> {
            self.texts.get(url).cloned().ok_or_else(|| {
                LensError::new(ErrorKind::Fetch, "fake_transport", "404 Not Found")
            })
        }

        fn probe_image(&self, url: &str) -> Result<ImageProbe, LensError> {
            match self.images.get(url) {
                Some(&is_image) => Ok(ImageProbe {
                    is_image,
                    content_type: is_image.then(|| "image/png".to_string()),
                    byte_size: None,
                }),
                None => Err(LensError::new(
                    ErrorKind::Fetch,
                    "fake_transport",
                    "404 Not Found",
                )),
            }
        }
    }

    #[test]
    fn test_normalize_adds_default_scheme() {
        assert_eq!(
            normalize_input_url("example.com").unwrap(),
            "http://example.com/"
        );
        assert_eq!(
            normalize_input_url("https://example.com/a?b=1").unwrap(),
            "https://example.com/a?b=1"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage_and_non_web_schemes() {
        let err = normalize_input_url("http://").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Input);
        assert_eq!(err.context, vec!["url: http://"]);

        let err = normalize_input_url("ftp://example.com/").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Input);
        assert!(err.detail.unwrap().contains("ftp"));
    }

    #[test]
    fn test_inspect_site_happy_path() {
        let mut t = FakeTransport::default();
        t.pages.insert(
            "http://example.com/".to_string(),
            r#"<head><title>Hello</title><link rel="icon" href="/icon.png"></head>"#.to_string(),
        );
        t.images.insert("http://example.com/icon.png".to_string(), true);

        let inspection = inspect_site(&t, "example.com").unwrap();
        assert_eq!(inspection.url, "http://example.com/");
        assert_eq!(
            inspection.metadata.general.title.value.as_deref(),
            Some("Hello")
        );
        assert_eq!(
            inspection.favicon.as_deref(),
            Some("http://example.com/icon.png")
        );
    }

    #[test]
    fn test_favicon_falls_through_to_well_known_default() {
        let mut t = FakeTransport::default();
        t.pages.insert(
            "http://example.com/".to_string(),
            r#"<head><link rel="icon" href="/missing.png"></head>"#.to_string(),
        );
        t.images
            .insert("http://example.com/missing.png".to_string(), false);
        t.images
            .insert("http://example.com/favicon.ico".to_string(), true);

        let inspection = inspect_site(&t, "example.com").unwrap();
        assert_eq!(
            inspection.favicon.as_deref(),
            Some("http://example.com/favicon.ico")
        );
    }

    #[test]
    fn test_fetch_failure_gains_one_layer() {
        let t = FakeTransport::default();
        let err = inspect_site(&t, "example.com").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Fetch);
        assert_eq!(err.causes, vec!["inspect_site", "fake_transport"]);
        assert_eq!(err.context, vec!["url: http://example.com/"]);
    }

    #[test]
    fn test_inspect_robots_uses_well_known_path() {
        let mut t = FakeTransport::default();
        t.texts.insert(
            "http://example.com/robots.txt".to_string(),
            "User-agent: *\nDisallow: /private".to_string(),
        );

        let robots = inspect_robots(&t, "example.com/some/deep/page?x=1").unwrap();
        assert_eq!(robots.rule_sets.len(), 1);
        assert_eq!(robots.rule_sets[0].rules[0].pattern, "/private");
    }

    #[test]
    fn test_inspect_sitemap_wraps_parse_failure() {
        let mut t = FakeTransport::default();
        t.texts.insert(
            "http://example.com/sitemap.xml".to_string(),
            "<urlset><url></urlset>".to_string(),
        );

        let err = inspect_sitemap(&t, "example.com").unwrap_err();
        assert_eq!(err.summary, "Error parsing sitemap.xml");
        assert_eq!(
            err.causes,
            vec!["inspect_sitemap", "parse_and_validate_sitemap", "parse_xml_tree"]
        );
    }
}
