//! General head metadata: title, description, canonical, icons, authors,
//! robots directives, and the assorted single-value meta tags.

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

use super::{attr, meta_named, select_all, select_first};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `link[rel=canonical]` href, unresolved.
    pub canonical: Option<String>,
    /// Every `link[rel~=icon]`, unfiltered. Whether an href actually
    /// resolves to an image is a transport concern, not extraction's.
    pub favicons: Vec<IconLink>,
    pub authors: Vec<AuthorRef>,
    /// `meta[name=robots]` content.
    pub robots: Option<String>,
    pub keywords: Option<String>,
    pub generator: Option<String>,
    pub license: Option<String>,
    pub viewport: Option<String>,
    pub theme_colors: Vec<ThemeColor>,
    pub color_scheme: Option<String>,
    pub format_detection: Option<String>,
    pub application_name: Option<String>,
}

/// One favicon `<link>` tag as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconLink {
    pub rel: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sizes: Option<String>,
    pub href: Option<String>,
}

/// An author from `link[rel=author]` or `meta[name=author]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub name: String,
    pub href: Option<String>,
}

/// One `meta[name=theme-color]` occurrence, with its media query if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColor {
    pub media: Option<String>,
    pub value: Option<String>,
}

pub fn extract(doc: &Html) -> GeneralMeta {
    GeneralMeta {
        title: select_first(doc, "title").map(|el| el.text().collect::<String>()),
        description: meta_named(doc, "description"),
        canonical: select_first(doc, r#"link[rel="canonical"]"#).and_then(|el| attr(el, "href")),
        favicons: select_all(doc, r#"link[rel~="icon"]"#)
            .into_iter()
            .map(|el| IconLink {
                rel: attr(el, "rel"),
                kind: attr(el, "type"),
                sizes: attr(el, "sizes"),
                href: attr(el, "href"),
            })
            .collect(),
        authors: extract_authors(doc),
        robots: meta_named(doc, "robots"),
        keywords: meta_named(doc, "keywords"),
        generator: meta_named(doc, "generator"),
        license: meta_named(doc, "license"),
        viewport: meta_named(doc, "viewport"),
        theme_colors: select_all(doc, r#"meta[name="theme-color"]"#)
            .into_iter()
            .map(|el| ThemeColor {
                media: attr(el, "media"),
                value: attr(el, "content"),
            })
            .collect(),
        color_scheme: meta_named(doc, "color-scheme"),
        format_detection: meta_named(doc, "format-detection"),
        application_name: meta_named(doc, "application-name"),
    }
}

/// Collect authors from `link[rel=author]` and `meta[name=author]` tags.
///
/// A link tag names its author through the immediately following meta
/// sibling; entries without a resolvable name are skipped. First
/// occurrence of a name wins.
fn extract_authors(doc: &Html) -> Vec<AuthorRef> {
    let mut authors: Vec<AuthorRef> = Vec::new();

    for el in select_all(doc, r#"link[rel="author"], meta[name="author"]"#) {
        let author = if el.value().name() == "link" {
            let href = attr(el, "href");
            let name = next_element(el)
                .filter(|sib| sib.value().name() == "meta")
                .and_then(|sib| attr(sib, "content"));
            match (href, name) {
                (Some(href), Some(name)) => AuthorRef {
                    name,
                    href: Some(href),
                },
                _ => continue,
            }
        } else {
            match attr(el, "content") {
                Some(name) => AuthorRef { name, href: None },
                None => continue,
            }
        };

        if !authors.iter().any(|a| a.name == author.name) {
            authors.push(author);
        }
    }

    authors
}

fn next_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}
