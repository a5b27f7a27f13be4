//! Sitemap parsing and protocol validation.
//!
//! Parsing and validation are separate stages: [`tree`] turns raw XML into
//! a generic attribute-prefixed tree, [`validate`] checks that tree against
//! the Sitemap Protocol and collects diagnostics instead of failing on the
//! first bad entry. Only unparseable XML is a fatal error.

pub mod datetime;
pub mod tree;
pub mod validate;

pub use datetime::{check_w3c_datetime, DateIssue, DatePrecision};
pub use tree::{coerce_list, parse_xml_tree, XmlValue};
pub use validate::{
    validate_sitemap, ChangeFreq, SitemapIndexEntry, SitemapReport, SitemapResult,
    SitemapUrlEntry, SITEMAP_XMLNS,
};

use crate::error::{snippet, LensError};

/// Parse a sitemap.xml document and validate it in one call.
///
/// Fails only when the XML itself cannot be parsed; every protocol problem
/// past that point lands in the report's diagnostics.
pub fn parse_and_validate_sitemap(text: &str) -> Result<SitemapReport, LensError> {
    let tree = parse_xml_tree(text).map_err(|e| {
        LensError::wrap_with("parse_and_validate_sitemap", "Error parsing sitemap.xml", e)
            .with_context(format!("content: {}", snippet(text)))
    })?;
    let report = validate_sitemap(&tree);
    tracing::debug!(
        diagnostics = report.diagnostics.len(),
        is_index = report.is_index,
        "validated sitemap"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_unparseable_xml_is_wrapped() {
        let err = parse_and_validate_sitemap("<urlset><url></urlset>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.summary, "Error parsing sitemap.xml");
        assert_eq!(err.causes, vec!["parse_and_validate_sitemap", "parse_xml_tree"]);
        assert!(err.context[0].starts_with("content: "));
    }

    #[test]
    fn test_parse_error_context_is_bounded() {
        let big = format!("<a>{}", "y".repeat(5000));
        let err = parse_and_validate_sitemap(&big).unwrap_err();
        assert!(err.context[0].len() <= 1000 + "content: ".len());
    }

    #[test]
    fn test_valid_document_round_trip() {
        let report = parse_and_validate_sitemap(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://example.com/</loc></url>
            </urlset>"#,
        )
        .unwrap();
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.result.urls().len(), 1);
    }

    #[test]
    fn test_arbitrary_text_never_panics() {
        for input in [
            "",
            "not xml at all",
            "<",
            "<?xml?>",
            "<urlset/>",
            "<a><b></b></a>",
            "\u{0}\u{1}\u{2}",
            "<urlset xmlns=\"x\"><url/><url/></urlset>",
        ] {
            let _ = parse_and_validate_sitemap(input);
        }
    }
}
