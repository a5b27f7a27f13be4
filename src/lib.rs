//! Site metadata extraction and validation engine: HTML head metadata with
//! fallback resolution, robots.txt parsing, and sitemap protocol
//! validation with severity-tagged diagnostics.

pub mod diagnostics;
pub mod error;
pub mod html;
pub mod inspect;
pub mod resolve;
pub mod robots;
pub mod sitemap;
pub mod transport;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ErrorKind, LensError};
pub use html::{extract_html_metadata, RawMetadata};
pub use inspect::{inspect_site, normalize_input_url, SiteInspection};
pub use resolve::{resolve_metadata, resolve_url, MetadataField, MetadataValue, ResolvedMetadata};
pub use robots::{parse_robots, RobotsRule, RobotsRuleSet, RobotsTxt};
pub use sitemap::{
    check_w3c_datetime, parse_and_validate_sitemap, validate_sitemap, SitemapReport, SitemapResult,
};
pub use transport::{FetchedDocument, ImageProbe, Transport};
