//! Structured engine error with an explicit cause chain.
//!
//! Every fatal failure in the engine is a [`LensError`]: a short summary,
//! an optional longer detail, bounded context strings, and a list of
//! wrapping layers that reconstructs "who called whom" without relying on
//! a captured native backtrace. The type serializes with an explicit
//! discriminator so the chain survives a process or request boundary.

use serde::{Deserialize, Serialize};

/// Maximum length of a raw-content snippet attached to an error context.
pub const MAX_CONTEXT_SNIPPET: usize = 1000;

/// Broad classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-supplied input was unusable (e.g. an unparseable URL).
    Input,
    /// A transport collaborator reported a failure.
    Fetch,
    /// A document could not be parsed at all.
    Parse,
    /// A document failed a cheap shape gate before full parsing.
    InvalidFormat,
    /// An internal invariant was violated.
    Server,
    Other,
}

/// A fatal, structured error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{summary}")]
#[serde(tag = "error", rename = "lens")]
pub struct LensError {
    pub kind: ErrorKind,
    /// Short human-readable title.
    pub summary: String,
    /// Longer description, when one exists.
    pub detail: Option<String>,
    /// Debugging context such as parameters or bounded raw-content
    /// snippets, innermost first.
    pub context: Vec<String>,
    /// Wrapping layers, outermost first.
    pub causes: Vec<String>,
}

impl LensError {
    pub fn new(kind: ErrorKind, layer: &str, summary: impl Into<String>) -> Self {
        Self {
            kind,
            summary: summary.into(),
            detail: None,
            context: Vec::new(),
            causes: vec![layer.to_string()],
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Wrap an inner error with a new layer.
    ///
    /// Context is the inner context followed by any context later added to
    /// the returned error; the new layer is prepended to the cause chain.
    /// Summary and detail fall through from the inner error unless
    /// overridden with [`with_detail`](Self::with_detail) or by replacing
    /// `summary` directly.
    pub fn wrap(layer: &str, inner: LensError) -> Self {
        let mut causes = Vec::with_capacity(inner.causes.len() + 1);
        causes.push(layer.to_string());
        causes.extend(inner.causes);
        Self {
            kind: inner.kind,
            summary: inner.summary,
            detail: inner.detail,
            context: inner.context,
            causes,
        }
    }

    /// Wrap with a replacement summary, keeping the inner detail and chain.
    pub fn wrap_with(layer: &str, summary: impl Into<String>, inner: LensError) -> Self {
        let mut wrapped = Self::wrap(layer, inner);
        wrapped.summary = summary.into();
        wrapped
    }
}

/// Bound a raw-content snippet for attachment to an error context.
///
/// Truncates to [`MAX_CONTEXT_SNIPPET`] characters on a char boundary.
pub fn snippet(raw: &str) -> String {
    match raw.char_indices().nth(MAX_CONTEXT_SNIPPET) {
        Some((idx, _)) => raw[..idx].to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_concatenates_context_and_prepends_cause() {
        let inner = LensError::new(ErrorKind::Parse, "parse_sitemap", "bad xml")
            .with_context("url: https://example.com/sitemap.xml");
        let outer = LensError::wrap("inspect_site", inner).with_context("attempt: 1");

        assert_eq!(outer.causes, vec!["inspect_site", "parse_sitemap"]);
        assert_eq!(
            outer.context,
            vec!["url: https://example.com/sitemap.xml", "attempt: 1"]
        );
        assert_eq!(outer.summary, "bad xml");
        assert_eq!(outer.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_wrap_with_replaces_summary_only() {
        let inner = LensError::new(ErrorKind::Parse, "json_ld", "expected value at line 1")
            .with_detail("trailing comma");
        let outer = LensError::wrap_with("extract_html_metadata", "Metadata Parse Failed", inner);

        assert_eq!(outer.summary, "Metadata Parse Failed");
        assert_eq!(outer.detail.as_deref(), Some("trailing comma"));
        assert_eq!(outer.causes, vec!["extract_html_metadata", "json_ld"]);
    }

    #[test]
    fn test_snippet_bounds_content() {
        let long = "x".repeat(5000);
        assert_eq!(snippet(&long).len(), MAX_CONTEXT_SNIPPET);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_serde_round_trip_keeps_chain() {
        let err = LensError::new(ErrorKind::InvalidFormat, "parse_robots", "Invalid robots.txt")
            .with_detail("must start with a comment or directive");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""error":"lens""#));

        let back: LensError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
