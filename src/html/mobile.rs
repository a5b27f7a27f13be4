//! Mobile/web-app metadata: apple-touch-icons and the apple web-app tags.

use scraper::Html;
use serde::{Deserialize, Serialize};

use super::{attr, meta_named, select_all};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileMeta {
    pub apple_touch_icons: Vec<TouchIcon>,
    pub apple_touch_icons_precomposed: Vec<TouchIcon>,
    pub apple_mobile_web_app_capable: Option<String>,
    pub apple_mobile_web_app_title: Option<String>,
    pub apple_mobile_web_app_status_bar_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchIcon {
    pub sizes: Option<String>,
    pub href: Option<String>,
}

pub fn extract(doc: &Html) -> MobileMeta {
    MobileMeta {
        apple_touch_icons: touch_icons(doc, "apple-touch-icon"),
        apple_touch_icons_precomposed: touch_icons(doc, "apple-touch-icon-precomposed"),
        apple_mobile_web_app_capable: meta_named(doc, "apple-mobile-web-app-capable"),
        apple_mobile_web_app_title: meta_named(doc, "apple-mobile-web-app-title"),
        apple_mobile_web_app_status_bar_style: meta_named(
            doc,
            "apple-mobile-web-app-status-bar-style",
        ),
    }
}

fn touch_icons(doc: &Html, rel: &str) -> Vec<TouchIcon> {
    select_all(doc, &format!(r#"link[rel="{rel}"]"#))
        .into_iter()
        .map(|el| TouchIcon {
            sizes: attr(el, "sizes"),
            href: attr(el, "href"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_icons_by_rel() {
        let doc = Html::parse_document(
            r#"<head>
            <link rel="apple-touch-icon" sizes="180x180" href="/apple-180.png">
            <link rel="apple-touch-icon-precomposed" href="/apple-pre.png">
            </head>"#,
        );

        let meta = extract(&doc);
        assert_eq!(meta.apple_touch_icons.len(), 1);
        assert_eq!(meta.apple_touch_icons[0].sizes.as_deref(), Some("180x180"));
        assert_eq!(meta.apple_touch_icons_precomposed.len(), 1);
    }
}
