//! Rule-based validation of a parsed sitemap tree.
//!
//! Validation is two-tier: one terminal error when the document cannot be
//! classified as `urlset` or `sitemapindex` at all, and per-entry
//! diagnostics collected for everything else. Every entry is validated
//! regardless of earlier entries' outcomes, and an entry with a failing
//! `loc` still occupies a row (with `loc` left empty) so row count and
//! identity survive validation.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Diagnostics};

use super::datetime::{check_w3c_datetime, DateIssue};
use super::tree::{coerce_list, XmlValue, DECL_KEY};

/// The Sitemap Protocol namespace a root tag must declare.
pub const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Allowed `changefreq` values, exact-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl FromStr for ChangeFreq {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(()),
        }
    }
}

/// One `<url>` entry of a urlset document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SitemapUrlEntry {
    /// Empty string when the entry's `loc` failed validation.
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<ChangeFreq>,
    pub priority: Option<f64>,
}

/// One `<sitemap>` entry of a sitemap-index document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapIndexEntry {
    pub loc: String,
    pub lastmod: Option<String>,
}

/// The classified document content. A document is one kind or the other,
/// never both; `Empty` is the terminal-error case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SitemapResult {
    Empty,
    Urlset { urls: Vec<SitemapUrlEntry> },
    Sitemapindex { sitemaps: Vec<SitemapIndexEntry> },
}

impl SitemapResult {
    pub fn urls(&self) -> &[SitemapUrlEntry] {
        match self {
            SitemapResult::Urlset { urls } => urls,
            _ => &[],
        }
    }

    pub fn sitemaps(&self) -> &[SitemapIndexEntry] {
        match self {
            SitemapResult::Sitemapindex { sitemaps } => sitemaps,
            _ => &[],
        }
    }
}

/// Validation output: best-effort result plus ordered diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapReport {
    pub diagnostics: Vec<Diagnostic>,
    pub is_index: bool,
    pub result: SitemapResult,
}

/// Validate a parsed sitemap tree against the Sitemap Protocol.
pub fn validate_sitemap(root: &BTreeMap<String, XmlValue>) -> SitemapReport {
    let mut diags = Diagnostics::new();

    check_declaration(root, &mut diags);

    // urlset is checked first; a document carrying both roots is treated
    // as a urlset and sitemapindex is not consulted.
    if let Some(urlset) = root.get("urlset") {
        let urls = validate_urlset(urlset, &mut diags);
        return SitemapReport {
            diagnostics: diags.into_vec(),
            is_index: false,
            result: SitemapResult::Urlset { urls },
        };
    }

    if let Some(index) = root.get("sitemapindex") {
        let sitemaps = validate_index(index, &mut diags);
        return SitemapReport {
            diagnostics: diags.into_vec(),
            is_index: true,
            result: SitemapResult::Sitemapindex { sitemaps },
        };
    }

    diags.error(
        "Sitemap root element is missing. A sitemap requires one <urlset> or <sitemapindex> root tag.",
        "root",
    );
    SitemapReport {
        diagnostics: diags.into_vec(),
        is_index: false,
        result: SitemapResult::Empty,
    }
}

/// Advisory checks on the XML declaration. Independent of classification;
/// always run when the declaration node is present.
fn check_declaration(root: &BTreeMap<String, XmlValue>, diags: &mut Diagnostics) {
    let Some(decl) = root.get(DECL_KEY) else {
        diags.warn("XML declaration not found.", "root.xml");
        return;
    };

    match decl.attr("version").and_then(XmlValue::as_text) {
        None => diags.warn("XML declaration has no version attribute.", "root.xml.version"),
        Some(version) if version != "1.0" && version != "1.1" => diags.error(
            format!("XML version is invalid. Set it to '1.0' or '1.1'. Received: \"{version}\""),
            "root.xml.version",
        ),
        Some(_) => {}
    }

    match decl.attr("encoding").and_then(XmlValue::as_text) {
        None => diags.warn("XML declaration has no encoding attribute.", "root.xml.encoding"),
        Some(encoding) if !encoding.eq_ignore_ascii_case("utf-8") => diags.error(
            format!("XML encoding is invalid. Set it to 'UTF-8'. Received: \"{encoding}\""),
            "root.xml.encoding",
        ),
        Some(_) => {}
    }
}

fn check_xmlns(root: &XmlValue, tag: &str, diags: &mut Diagnostics) {
    let path = format!("root.{tag}.xmlns");
    match root.attr("xmlns").and_then(XmlValue::as_text) {
        None => diags.error(
            format!("<{tag}> is missing the xmlns attribute. Set it to '{SITEMAP_XMLNS}'."),
            path,
        ),
        Some(ns) if ns != SITEMAP_XMLNS => diags.error(
            format!("xmlns attribute is invalid. Set it to '{SITEMAP_XMLNS}'. Received: \"{ns}\""),
            path,
        ),
        Some(_) => {}
    }
}

fn validate_urlset(urlset: &XmlValue, diags: &mut Diagnostics) -> Vec<SitemapUrlEntry> {
    let mut urls = Vec::new();

    if urlset.as_node().is_none() {
        diags.error("<urlset> is not a valid element.", "root.urlset");
        return urls;
    }
    check_xmlns(urlset, "urlset", diags);

    let Some(entries) = urlset.get("url") else {
        diags.error(
            "<urlset> has no URL entries. A sitemap requires at least one <url> tag.",
            "root.urlset.url",
        );
        return urls;
    };

    for (i, entry) in coerce_list(entries).iter().enumerate() {
        let ordinal = i + 1;
        let path = format!("root.urlset.url[{i}]");

        if entry.as_node().is_none() {
            diags.error(
                format!("URL entry #{ordinal} is invalid. Each <url> entry must be an element."),
                path,
            );
            continue;
        }

        // The row exists even when loc fails, so row count is preserved.
        let mut row = SitemapUrlEntry::default();

        match entry.get("loc") {
            None => diags.error(
                format!(
                    "URL entry #{ordinal} is missing a <loc> tag. Each entry must carry the URL of the page."
                ),
                format!("{path}.loc"),
            ),
            Some(loc) => match validate_loc(loc) {
                Ok(value) => row.loc = value,
                Err(reason) => diags.error(
                    format!("URL entry #{ordinal} loc attribute is invalid. {reason}"),
                    format!("{path}.loc"),
                ),
            },
        }

        if let Some(lastmod) = entry.get("lastmod") {
            validate_lastmod(
                lastmod,
                &format!("URL entry #{ordinal}"),
                &format!("{path}.lastmod"),
                &mut row.lastmod,
                diags,
            );
        }

        if let Some(changefreq) = entry.get("changefreq") {
            let field_path = format!("{path}.changefreq");
            if changefreq.is_list() {
                diags.error(
                    format!(
                        "URL entry #{ordinal} changefreq attribute is invalid. There can only be one <changefreq> per entry."
                    ),
                    field_path,
                );
            } else {
                match changefreq.as_text() {
                    None => diags.error(
                        format!(
                            "URL entry #{ordinal} changefreq attribute is invalid. changefreq must be a plain string value."
                        ),
                        field_path,
                    ),
                    Some(text) => match ChangeFreq::from_str(text) {
                        Ok(freq) => row.changefreq = Some(freq),
                        Err(()) => diags.error(
                            format!(
                                "URL entry #{ordinal} changefreq attribute is invalid. changefreq must be one of: 'always', 'hourly', 'daily', 'weekly', 'monthly', 'yearly', 'never'. Received: \"{text}\""
                            ),
                            field_path,
                        ),
                    },
                }
            }
        }

        if let Some(priority) = entry.get("priority") {
            let field_path = format!("{path}.priority");
            if priority.is_list() {
                diags.error(
                    format!(
                        "URL entry #{ordinal} priority attribute is invalid. There can only be one <priority> per entry."
                    ),
                    field_path,
                );
            } else {
                match priority.as_text().and_then(|t| t.trim().parse::<f64>().ok()) {
                    None => diags.error(
                        format!(
                            "URL entry #{ordinal} priority attribute is invalid. priority must be a number. Received: \"{}\"",
                            priority.as_text().unwrap_or("<non-text>")
                        ),
                        field_path,
                    ),
                    Some(num) if !(0.0..=1.0).contains(&num) => diags.error(
                        format!(
                            "URL entry #{ordinal} priority attribute is invalid. priority must be a number between 0 and 1. Received: \"{num}\""
                        ),
                        field_path,
                    ),
                    Some(num) => row.priority = Some(num),
                }
            }
        }

        urls.push(row);
    }

    urls
}

fn validate_index(index: &XmlValue, diags: &mut Diagnostics) -> Vec<SitemapIndexEntry> {
    let mut sitemaps = Vec::new();

    if index.as_node().is_none() {
        diags.error("<sitemapindex> is not a valid element.", "root.sitemapindex");
        return sitemaps;
    }
    check_xmlns(index, "sitemapindex", diags);

    let Some(entries) = index.get("sitemap") else {
        diags.error(
            "Sitemap index has no <sitemap> entries. A <sitemapindex> requires at least one <sitemap> tag.",
            "root.sitemapindex.sitemap",
        );
        return sitemaps;
    };

    for (i, entry) in coerce_list(entries).iter().enumerate() {
        let ordinal = i + 1;
        let path = format!("root.sitemapindex.sitemap[{i}]");

        if entry.as_node().is_none() {
            diags.error(
                format!(
                    "Sitemap entry #{ordinal} is invalid. Each <sitemap> entry must be an element."
                ),
                path,
            );
            continue;
        }

        let mut row = SitemapIndexEntry::default();

        match entry.get("loc") {
            None => diags.error(
                format!(
                    "Sitemap entry #{ordinal} is missing a <loc> tag. Each entry must carry the URL of the sitemap."
                ),
                format!("{path}.loc"),
            ),
            Some(loc) => match validate_loc(loc) {
                Ok(value) => row.loc = value,
                Err(reason) => diags.error(
                    format!("Sitemap entry #{ordinal} loc attribute is invalid. {reason}"),
                    format!("{path}.loc"),
                ),
            },
        }

        if let Some(lastmod) = entry.get("lastmod") {
            validate_lastmod(
                lastmod,
                &format!("Sitemap entry #{ordinal}"),
                &format!("{path}.lastmod"),
                &mut row.lastmod,
                diags,
            );
        }

        sitemaps.push(row);
    }

    sitemaps
}

/// Shared `lastmod` validation for both entry kinds.
fn validate_lastmod(
    lastmod: &XmlValue,
    ctx: &str,
    path: &str,
    slot: &mut Option<String>,
    diags: &mut Diagnostics,
) {
    if lastmod.is_list() {
        diags.error(
            format!("{ctx} lastmod attribute is invalid. There can only be one <lastmod> per entry."),
            path.to_string(),
        );
        return;
    }
    let Some(text) = lastmod.as_text() else {
        diags.error(
            format!("{ctx} lastmod attribute is invalid. lastmod must be a plain string value."),
            path.to_string(),
        );
        return;
    };

    match check_w3c_datetime(text) {
        Err(DateIssue::InvalidFormat) => diags.error(
            format!(
                "{ctx} lastmod attribute is invalid. lastmod must be in W3C datetime format. Received: \"{text}\""
            ),
            path.to_string(),
        ),
        Err(DateIssue::InvalidDate) => diags.error(
            format!(
                "{ctx} lastmod attribute is invalid. lastmod must be a valid, parseable date. Received: \"{text}\""
            ),
            path.to_string(),
        ),
        Ok(precision) => {
            *slot = Some(text.to_string());
            if precision.is_generic() {
                diags.warn(
                    format!(
                        "{ctx} lastmod is too generic. Prefer a precise date such as YYYY-MM-DD or a full timestamp. Received: \"{text}\""
                    ),
                    path.to_string(),
                );
            }
        }
    }
}

/// Validate a `loc` value; returns the accepted string or a message tail.
fn validate_loc(loc: &XmlValue) -> Result<String, String> {
    if loc.is_list() {
        return Err("There can only be one <loc> per entry.".to_string());
    }
    let Some(text) = loc.as_text() else {
        return Err("loc must be a plain string value.".to_string());
    };
    if text.len() < 12 {
        return Err(format!(
            "loc must be at least 12 characters long. Received: \"{text}\""
        ));
    }
    if text.len() > 2048 {
        return Err("loc must be less than 2048 characters long.".to_string());
    }
    let scheme = text.split("://").next().unwrap_or("");
    if !matches!(scheme, "http" | "https" | "ftp") {
        return Err(format!(
            "loc must start with 'http://', 'https://', or 'ftp://'. Received: \"{text}\""
        ));
    }
    if !text.is_ascii() {
        return Err(format!(
            "loc must only contain ASCII characters. Received: \"{text}\""
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::sitemap::tree::parse_xml_tree;

    fn report(xml: &str) -> SitemapReport {
        validate_sitemap(&parse_xml_tree(xml).unwrap())
    }

    fn errors(r: &SitemapReport) -> Vec<&Diagnostic> {
        r.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    }

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

    fn urlset(body: &str) -> String {
        format!(r#"{DECL}<urlset xmlns="{SITEMAP_XMLNS}">{body}</urlset>"#)
    }

    #[test]
    fn test_valid_urlset_no_errors() {
        let xml = urlset(
            "<url><loc>https://example.com/</loc><lastmod>2024-06-15</lastmod>\
             <changefreq>daily</changefreq><priority>0.5</priority></url>\
             <url><loc>https://example.com/about</loc></url>",
        );
        let r = report(&xml);

        assert!(errors(&r).is_empty(), "{:?}", r.diagnostics);
        assert!(!r.is_index);
        assert_eq!(r.result.urls().len(), 2);
        assert_eq!(r.result.urls()[0].loc, "https://example.com/");
        assert_eq!(r.result.urls()[0].changefreq, Some(ChangeFreq::Daily));
        assert_eq!(r.result.urls()[0].priority, Some(0.5));
    }

    #[test]
    fn test_singleton_url_coerced_to_one_row() {
        let xml = urlset("<url><loc>https://example.com/</loc></url>");
        let r = report(&xml);
        assert_eq!(r.result.urls().len(), 1);
        assert!(errors(&r).is_empty());
    }

    #[test]
    fn test_missing_root_is_single_terminal_error() {
        let r = report(&format!("{DECL}<notasitemap></notasitemap>"));
        assert_eq!(r.result, SitemapResult::Empty);
        assert!(!r.is_index);
        let errs = errors(&r);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("root element is missing"));
        assert_eq!(errs[0].path.as_deref(), Some("root"));
    }

    #[test]
    fn test_urlset_wins_over_sitemapindex() {
        let xml = format!(
            r#"{DECL}<urlset xmlns="{SITEMAP_XMLNS}"><url><loc>https://example.com/</loc></url></urlset>"#
        );
        let r = report(&xml);
        assert!(!r.is_index);
        assert!(matches!(r.result, SitemapResult::Urlset { .. }));
    }

    #[test]
    fn test_sitemapindex_document() {
        let xml = format!(
            r#"{DECL}<sitemapindex xmlns="{SITEMAP_XMLNS}">
            <sitemap><loc>https://example.com/sitemap-a.xml</loc><lastmod>2024-06-15</lastmod></sitemap>
            <sitemap><loc>https://example.com/sitemap-b.xml</loc></sitemap>
            </sitemapindex>"#
        );
        let r = report(&xml);

        assert!(r.is_index);
        assert!(errors(&r).is_empty(), "{:?}", r.diagnostics);
        assert_eq!(r.result.sitemaps().len(), 2);
        assert!(r.result.urls().is_empty());
        assert_eq!(
            r.result.sitemaps()[0].lastmod.as_deref(),
            Some("2024-06-15")
        );
    }

    #[test]
    fn test_missing_xmlns_is_error_but_validation_continues() {
        let r = report(&format!(
            "{DECL}<urlset><url><loc>https://example.com/</loc></url></urlset>"
        ));
        assert_eq!(errors(&r).len(), 1);
        assert!(errors(&r)[0].message.contains("xmlns"));
        assert_eq!(r.result.urls().len(), 1);
    }

    #[test]
    fn test_declaration_advisories() {
        // No declaration at all: one warning.
        let r = report(&format!(
            r#"<urlset xmlns="{SITEMAP_XMLNS}"><url><loc>https://example.com/</loc></url></urlset>"#
        ));
        assert!(r
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warn && d.message.contains("declaration not found")));

        // Wrong version and wrong encoding: two errors.
        let r = report(&format!(
            r#"<?xml version="2.0" encoding="latin-1"?><urlset xmlns="{SITEMAP_XMLNS}"><url><loc>https://example.com/</loc></url></urlset>"#
        ));
        assert_eq!(errors(&r).len(), 2);

        // Encoding comparison is case-insensitive.
        let r = report(&format!(
            r#"<?xml version="1.0" encoding="utf-8"?><urlset xmlns="{SITEMAP_XMLNS}"><url><loc>https://example.com/</loc></url></urlset>"#
        ));
        assert!(errors(&r).is_empty());
    }

    #[test]
    fn test_invalid_loc_keeps_row_with_empty_loc() {
        let xml = urlset(
            "<url><loc>short</loc></url>\
             <url><loc>https://example.com/ok</loc></url>\
             <url><loc>nothttp://example.com/page</loc></url>",
        );
        let r = report(&xml);

        let urls = r.result.urls();
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0].loc, "");
        assert_eq!(urls[1].loc, "https://example.com/ok");
        assert_eq!(urls[2].loc, "");
        assert_eq!(errors(&r).len(), 2);
    }

    #[test]
    fn test_non_ascii_loc_rejected() {
        let xml = urlset("<url><loc>https://example.com/über</loc></url>");
        let r = report(&xml);
        assert_eq!(errors(&r).len(), 1);
        assert!(errors(&r)[0].message.contains("ASCII"));
        assert_eq!(r.result.urls()[0].loc, "");
    }

    #[test]
    fn test_array_loc_rejected() {
        let xml = urlset("<url><loc>https://example.com/a</loc><loc>https://example.com/b</loc></url>");
        let r = report(&xml);
        assert_eq!(errors(&r).len(), 1);
        assert!(errors(&r)[0].message.contains("one <loc> per entry"));
        assert_eq!(r.result.urls()[0].loc, "");
    }

    #[test]
    fn test_priority_boundaries() {
        for ok in ["0", "1", "0.5"] {
            let xml = urlset(&format!(
                "<url><loc>https://example.com/</loc><priority>{ok}</priority></url>"
            ));
            let r = report(&xml);
            assert!(errors(&r).is_empty(), "priority {ok}: {:?}", r.diagnostics);
            assert!(r.result.urls()[0].priority.is_some());
        }
        for bad in ["-0.1", "1.1", "abc"] {
            let xml = urlset(&format!(
                "<url><loc>https://example.com/</loc><priority>{bad}</priority></url>"
            ));
            let r = report(&xml);
            assert_eq!(errors(&r).len(), 1, "priority {bad}");
            assert!(r.result.urls()[0].priority.is_none());
        }
    }

    #[test]
    fn test_changefreq_case_set() {
        for ok in ["always", "hourly", "daily", "weekly", "monthly", "yearly", "never"] {
            let xml = urlset(&format!(
                "<url><loc>https://example.com/</loc><changefreq>{ok}</changefreq></url>"
            ));
            let r = report(&xml);
            assert!(errors(&r).is_empty(), "changefreq {ok}");
            assert!(r.result.urls()[0].changefreq.is_some());
        }

        let xml = urlset(
            "<url><loc>https://example.com/</loc><changefreq>fortnightly</changefreq></url>",
        );
        let r = report(&xml);
        assert_eq!(errors(&r).len(), 1);
        assert!(r.result.urls()[0].changefreq.is_none());
    }

    #[test]
    fn test_lastmod_year_warns_but_parses() {
        let xml = urlset("<url><loc>https://example.com/</loc><lastmod>2024</lastmod></url>");
        let r = report(&xml);

        assert!(errors(&r).is_empty());
        let warns: Vec<_> = r
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warn && d.message.contains("too generic"))
            .collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(r.result.urls()[0].lastmod.as_deref(), Some("2024"));
    }

    #[test]
    fn test_lastmod_impossible_date_is_error() {
        let xml = urlset("<url><loc>https://example.com/</loc><lastmod>2024-13-50</lastmod></url>");
        let r = report(&xml);
        assert_eq!(errors(&r).len(), 1);
        assert!(errors(&r)[0].message.contains("valid, parseable date"));
        assert!(r.result.urls()[0].lastmod.is_none());
    }

    #[test]
    fn test_diagnostics_per_entry_no_short_circuit() {
        let xml = urlset(
            "<url><loc>bad</loc></url>\
             <url><loc>also-bad</loc></url>\
             <url><loc>https://example.com/fine</loc></url>",
        );
        let r = report(&xml);
        assert_eq!(errors(&r).len(), 2);
        // 1-based ordinals in messages.
        assert!(errors(&r)[0].message.contains("#1"));
        assert!(errors(&r)[1].message.contains("#2"));
        assert_eq!(r.result.urls().len(), 3);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let xml = urlset(
            "<url><loc>short</loc><lastmod>2024</lastmod><priority>2</priority></url>\
             <url><loc>https://example.com/x</loc></url>",
        );
        let tree = parse_xml_tree(&xml).unwrap();
        let first = validate_sitemap(&tree);
        let second = validate_sitemap(&tree);
        assert_eq!(first, second);
    }
}
