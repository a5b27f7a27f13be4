//! Generic attribute-prefixed XML tree.
//!
//! The validator works on a dynamic "bag of properties" tree rather than
//! on raw XML events: tags become map keys, attributes get an `@` prefix
//! so they can never collide with child tags, the XML declaration lands
//! under `?xml`, and repeated tags are promoted to a list. A tag that
//! appears once stays a bare value, which is why every iteration site
//! goes through [`coerce_list`] first.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ErrorKind, LensError};

/// Prefix distinguishing attributes from child tags.
pub const ATTR_PREFIX: &str = "@";

/// Key the XML declaration is stored under.
pub const DECL_KEY: &str = "?xml";

/// Key for text content of an element that also has attributes/children.
pub const TEXT_KEY: &str = "#text";

/// A value in the parsed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// Text-only element content (possibly empty).
    Text(String),
    /// A tag that appeared more than once under the same parent.
    List(Vec<XmlValue>),
    /// An element with attributes and/or child tags.
    Node(BTreeMap<String, XmlValue>),
}

impl XmlValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&BTreeMap<String, XmlValue>> {
        match self {
            XmlValue::Node(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, XmlValue::List(_))
    }

    /// Child tag lookup; `None` for non-node values.
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        self.as_node()?.get(key)
    }

    /// Attribute lookup via the `@` prefix.
    pub fn attr(&self, name: &str) -> Option<&XmlValue> {
        self.as_node()?.get(&format!("{ATTR_PREFIX}{name}"))
    }
}

/// Normalize a value to a list of entries.
///
/// A singleton tag is a bare value in the tree; validators must see it as
/// a one-element list before iterating.
pub fn coerce_list(value: &XmlValue) -> Vec<&XmlValue> {
    match value {
        XmlValue::List(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Parse raw XML into the attribute-prefixed tree.
pub fn parse_xml_tree(xml: &str) -> Result<BTreeMap<String, XmlValue>, LensError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    // Frame 0 is the document itself; Start pushes, End pops.
    let mut stack: Vec<Frame> = vec![Frame::default()];

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let mut frame = Frame {
                    name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    ..Frame::default()
                };
                for attr in e.attributes().flatten() {
                    let key = format!(
                        "{ATTR_PREFIX}{}",
                        String::from_utf8_lossy(attr.key.as_ref())
                    );
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    insert_child(&mut frame.children, key, XmlValue::Text(value));
                }
                stack.push(frame);
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let mut children = BTreeMap::new();
                for attr in e.attributes().flatten() {
                    let key = format!(
                        "{ATTR_PREFIX}{}",
                        String::from_utf8_lossy(attr.key.as_ref())
                    );
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    insert_child(&mut children, key, XmlValue::Text(value));
                }
                let value = if children.is_empty() {
                    XmlValue::Text(String::new())
                } else {
                    XmlValue::Node(children)
                };
                if let Some(parent) = stack.last_mut() {
                    insert_child(&mut parent.children, name, value);
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(&e.clone().into_inner()).to_string();
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::Decl(ref e)) => {
                let mut decl = BTreeMap::new();
                if let Ok(version) = e.version() {
                    decl.insert(
                        format!("{ATTR_PREFIX}version"),
                        XmlValue::Text(String::from_utf8_lossy(&version).to_string()),
                    );
                }
                if let Some(Ok(encoding)) = e.encoding() {
                    decl.insert(
                        format!("{ATTR_PREFIX}encoding"),
                        XmlValue::Text(String::from_utf8_lossy(&encoding).to_string()),
                    );
                }
                if let Some(Ok(standalone)) = e.standalone() {
                    decl.insert(
                        format!("{ATTR_PREFIX}standalone"),
                        XmlValue::Text(String::from_utf8_lossy(&standalone).to_string()),
                    );
                }
                if let Some(frame) = stack.last_mut() {
                    insert_child(&mut frame.children, DECL_KEY.to_string(), XmlValue::Node(decl));
                }
            }
            Ok(Event::End(_)) => {
                // Malformed close tags surface as reader errors, so the
                // stack never underflows past the document frame here.
                if stack.len() > 1 {
                    if let Some(frame) = stack.pop() {
                        let (name, value) = frame.into_value();
                        if let Some(parent) = stack.last_mut() {
                            insert_child(&mut parent.children, name, value);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(
                    LensError::new(ErrorKind::Parse, "parse_xml_tree", "XML parse error")
                        .with_detail(e.to_string()),
                )
            }
        }
        buf.clear();
    }

    let document = stack.swap_remove(0);
    Ok(document.children)
}

#[derive(Debug, Default)]
struct Frame {
    name: String,
    children: BTreeMap<String, XmlValue>,
    text: String,
}

impl Frame {
    fn into_value(self) -> (String, XmlValue) {
        let text = self.text.trim().to_string();
        let value = if self.children.is_empty() {
            XmlValue::Text(text)
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert(TEXT_KEY.to_string(), XmlValue::Text(text));
            }
            XmlValue::Node(children)
        };
        (self.name, value)
    }
}

/// Insert a child, promoting repeated keys to a list.
fn insert_child(map: &mut BTreeMap<String, XmlValue>, key: String, value: XmlValue) {
    match map.remove(&key) {
        None => {
            map.insert(key, value);
        }
        Some(XmlValue::List(mut items)) => {
            items.push(value);
            map.insert(key, XmlValue::List(items));
        }
        Some(existing) => {
            map.insert(key, XmlValue::List(vec![existing, value]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_child_stays_bare() {
        let tree = parse_xml_tree(
            r#"<urlset xmlns="a"><url><loc>https://example.com/</loc></url></urlset>"#,
        )
        .unwrap();

        let urlset = tree.get("urlset").unwrap();
        assert_eq!(urlset.attr("xmlns").and_then(XmlValue::as_text), Some("a"));
        let url = urlset.get("url").unwrap();
        assert!(!url.is_list());
        assert_eq!(coerce_list(url).len(), 1);
        assert_eq!(
            url.get("loc").and_then(XmlValue::as_text),
            Some("https://example.com/")
        );
    }

    #[test]
    fn test_repeated_tags_promoted_to_list() {
        let tree = parse_xml_tree(
            "<urlset><url><loc>a</loc></url><url><loc>b</loc></url><url><loc>c</loc></url></urlset>",
        )
        .unwrap();

        let url = tree.get("urlset").unwrap().get("url").unwrap();
        assert!(url.is_list());
        assert_eq!(coerce_list(url).len(), 3);
    }

    #[test]
    fn test_declaration_captured_with_prefixed_attrs() {
        let tree =
            parse_xml_tree(r#"<?xml version="1.0" encoding="UTF-8"?><urlset></urlset>"#).unwrap();

        let decl = tree.get(DECL_KEY).unwrap();
        assert_eq!(decl.attr("version").and_then(XmlValue::as_text), Some("1.0"));
        assert_eq!(
            decl.attr("encoding").and_then(XmlValue::as_text),
            Some("UTF-8")
        );
    }

    #[test]
    fn test_empty_element_is_empty_text() {
        let tree = parse_xml_tree("<url><loc></loc></url>").unwrap();
        let loc = tree.get("url").unwrap().get("loc").unwrap();
        assert_eq!(loc.as_text(), Some(""));
    }

    #[test]
    fn test_unclosed_tag_is_a_parse_error() {
        let err = parse_xml_tree("<urlset><url></urlset>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.causes, vec!["parse_xml_tree"]);
    }

    #[test]
    fn test_entity_unescaped_in_text() {
        let tree = parse_xml_tree("<url><loc>https://x.test/?a=1&amp;b=2</loc></url>").unwrap();
        let loc = tree.get("url").unwrap().get("loc").unwrap();
        assert_eq!(loc.as_text(), Some("https://x.test/?a=1&b=2"));
    }
}
