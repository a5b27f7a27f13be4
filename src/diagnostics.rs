//! Severity-tagged validation findings shared by every parser.

use serde::{Deserialize, Serialize};

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

/// A non-fatal validation finding attached to a document location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Dotted locator into the document, e.g. `root.urlset.url[3].loc`.
    pub path: Option<String>,
}

/// Ordered accumulator for diagnostics.
///
/// Findings are kept in arrival order and never deduplicated: repeated
/// structural problems produce one finding per offending entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>, path: impl Into<String>) {
        self.push(Severity::Error, message, Some(path.into()));
    }

    pub fn warn(&mut self, message: impl Into<String>, path: impl Into<String>) {
        self.push(Severity::Warn, message, Some(path.into()));
    }

    pub fn info(&mut self, message: impl Into<String>, path: impl Into<String>) {
        self.push(Severity::Info, message, Some(path.into()));
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>, path: Option<String>) {
        self.0.push(Diagnostic {
            severity,
            message: message.into(),
            path,
        });
    }

    pub fn error_count(&self) -> usize {
        self.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Diagnostics> for Vec<Diagnostic> {
    fn from(d: Diagnostics) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_order_no_dedup() {
        let mut diags = Diagnostics::new();
        diags.error("missing loc", "root.urlset.url[0].loc");
        diags.error("missing loc", "root.urlset.url[1].loc");
        diags.warn("lastmod is too generic", "root.urlset.url[1].lastmod");

        let list = diags.into_vec();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].severity, Severity::Error);
        assert_eq!(list[1].path.as_deref(), Some("root.urlset.url[1].loc"));
        assert_eq!(list[2].severity, Severity::Warn);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warn).unwrap();
        assert_eq!(json, r#""warn""#);
    }
}
