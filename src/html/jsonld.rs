//! JSON-LD (`application/ld+json`) block extraction.

use scraper::Html;

use crate::error::{ErrorKind, LensError};

use super::select_all;

/// Parse every JSON-LD block in the document, in order.
///
/// All-or-nothing: one unparseable block fails the whole extraction, with
/// the raw parse error carried as detail.
pub fn extract(doc: &Html) -> Result<Vec<serde_json::Value>, LensError> {
    select_all(doc, r#"script[type="application/ld+json"]"#)
        .into_iter()
        .map(|el| {
            let text: String = el.text().collect();
            serde_json::from_str(&text).map_err(|e| {
                LensError::new(ErrorKind::Parse, "json_ld", "JSON Parse Failed")
                    .with_detail(e.to_string())
            })
        })
        .collect()
}
