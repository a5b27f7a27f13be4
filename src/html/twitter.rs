//! Twitter Card metadata.
//!
//! Twitter tags appear in the wild as both `meta[name=...]` and
//! `meta[property=...]`; `name` wins, `property` is the fallback.

use scraper::Html;
use serde::{Deserialize, Serialize};

use super::{meta_named, meta_property};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterMeta {
    pub title: Option<String>,
    pub card: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub site: Option<String>,
    pub site_id: Option<String>,
    pub creator: Option<String>,
    pub creator_id: Option<String>,
    pub player: Option<String>,
    pub player_width: Option<String>,
    pub player_height: Option<String>,
    pub player_stream: Option<String>,
    pub app_country: Option<String>,
    pub app_name_iphone: Option<String>,
    pub app_id_iphone: Option<String>,
    pub app_url_iphone: Option<String>,
    pub app_name_ipad: Option<String>,
    pub app_id_ipad: Option<String>,
    pub app_url_ipad: Option<String>,
    pub app_name_googleplay: Option<String>,
    pub app_id_googleplay: Option<String>,
    pub app_url_googleplay: Option<String>,
}

fn twitter_meta(doc: &Html, key: &str) -> Option<String> {
    meta_named(doc, key).or_else(|| meta_property(doc, key))
}

pub fn extract(doc: &Html) -> TwitterMeta {
    TwitterMeta {
        title: twitter_meta(doc, "twitter:title"),
        card: twitter_meta(doc, "twitter:card"),
        description: twitter_meta(doc, "twitter:description"),
        image: twitter_meta(doc, "twitter:image"),
        image_alt: twitter_meta(doc, "twitter:image:alt"),
        site: twitter_meta(doc, "twitter:site"),
        site_id: twitter_meta(doc, "twitter:site:id"),
        creator: twitter_meta(doc, "twitter:creator"),
        creator_id: twitter_meta(doc, "twitter:creator:id"),
        player: twitter_meta(doc, "twitter:player"),
        player_width: twitter_meta(doc, "twitter:player:width"),
        player_height: twitter_meta(doc, "twitter:player:height"),
        player_stream: twitter_meta(doc, "twitter:player:stream"),
        app_country: twitter_meta(doc, "twitter:app:country"),
        app_name_iphone: twitter_meta(doc, "twitter:app:name:iphone"),
        app_id_iphone: twitter_meta(doc, "twitter:app:id:iphone"),
        app_url_iphone: twitter_meta(doc, "twitter:app:url:iphone"),
        app_name_ipad: twitter_meta(doc, "twitter:app:name:ipad"),
        app_id_ipad: twitter_meta(doc, "twitter:app:id:ipad"),
        app_url_ipad: twitter_meta(doc, "twitter:app:url:ipad"),
        app_name_googleplay: twitter_meta(doc, "twitter:app:name:googleplay"),
        app_id_googleplay: twitter_meta(doc, "twitter:app:id:googleplay"),
        app_url_googleplay: twitter_meta(doc, "twitter:app:url:googleplay"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_wins_over_property() {
        let doc = Html::parse_document(
            r#"<head>
            <meta property="twitter:title" content="From property">
            <meta name="twitter:title" content="From name">
            </head>"#,
        );

        let meta = extract(&doc);
        assert_eq!(meta.title.as_deref(), Some("From name"));
    }

    #[test]
    fn test_property_is_the_fallback() {
        let doc = Html::parse_document(
            r#"<head><meta property="twitter:card" content="summary_large_image"></head>"#,
        );

        let meta = extract(&doc);
        assert_eq!(meta.card.as_deref(), Some("summary_large_image"));
    }
}
