//! Parse robots.txt into per-user-agent rule sets.
//!
//! The document is gated on its first non-whitespace character before any
//! real parsing: a robots.txt must open with a comment or with one of the
//! User-agent / Disallow / Allow / Sitemap directives. Rule lines are then
//! grouped into blocks keyed by `User-agent`; consecutive `User-agent`
//! lines share the rules that follow them, and rule sets for a repeated
//! agent name merge rather than shadow. `Sitemap:` lines are global,
//! ordered, and deliberately not deduplicated.

use serde::{Deserialize, Serialize};

use crate::error::{snippet, ErrorKind, LensError};

/// Characters a well-formed robots.txt can start with: a comment marker or
/// the first letter of User-agent, Disallow, Allow, or Sitemap.
const VALID_LEADING: [char; 5] = ['#', 'U', 'D', 'A', 'S'];

/// One Allow/Disallow line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsRule {
    pub pattern: String,
    pub allow: bool,
    /// 1-based source line the rule came from.
    pub line_number: usize,
}

/// All rules attached to one user-agent name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotsRuleSet {
    pub user_agent: String,
    pub crawl_delay: Option<f64>,
    pub rules: Vec<RobotsRule>,
}

/// Parsed robots.txt document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotsTxt {
    /// Rule sets ordered by first appearance of the agent name. `*` is a
    /// normal entry here, special only in presentation.
    pub rule_sets: Vec<RobotsRuleSet>,
    /// Every `Sitemap:` value in document order, duplicates kept.
    pub sitemaps: Vec<String>,
    /// The raw document text as fetched.
    pub raw: String,
}

/// Parse a robots.txt document.
///
/// Fails fast with [`ErrorKind::InvalidFormat`] when the leading-character
/// gate rejects the document; this is a cheap shape heuristic, not a
/// grammar check.
pub fn parse_robots(text: &str) -> Result<RobotsTxt, LensError> {
    let leading = text.trim_start().chars().next();
    if !leading.is_some_and(|c| VALID_LEADING.contains(&c)) {
        return Err(LensError::new(
            ErrorKind::InvalidFormat,
            "parse_robots",
            "Invalid robots.txt",
        )
        .with_detail("robots.txt must start with a comment or a user-agent directive")
        .with_context(format!("content: {}", snippet(text))));
    }

    let mut rule_sets: Vec<RobotsRuleSet> = Vec::new();
    // Indexes into rule_sets that the current User-agent block targets.
    let mut active: Vec<usize> = Vec::new();
    let mut last_line_was_agent = false;
    // Crawl-delay is attached by agent name after grouping, since an agent
    // may repeat across the document.
    let mut delays: Vec<(String, f64)> = Vec::new();
    let mut sitemaps: Vec<String> = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !last_line_was_agent {
                    active.clear();
                }
                let index = ensure_rule_set(&mut rule_sets, value);
                if !active.contains(&index) {
                    active.push(index);
                }
                last_line_was_agent = true;
                continue;
            }
            "allow" | "disallow" if !value.is_empty() => {
                let allow = key == "allow";
                for &index in &active {
                    rule_sets[index].rules.push(RobotsRule {
                        pattern: value.to_string(),
                        allow,
                        line_number,
                    });
                }
            }
            "crawl-delay" => {
                if let Ok(delay) = value.parse::<f64>() {
                    for &index in &active {
                        delays.push((rule_sets[index].user_agent.clone(), delay));
                    }
                }
            }
            "sitemap" => {
                // Sitemap directives are global, regardless of block.
                if !value.is_empty() {
                    sitemaps.push(value.to_string());
                }
            }
            _ => {}
        }
        last_line_was_agent = false;
    }

    // Second pass: attach crawl-delays by agent name, first value wins.
    for (agent, delay) in delays {
        if let Some(set) = rule_sets.iter_mut().find(|s| s.user_agent == agent) {
            if set.crawl_delay.is_none() {
                set.crawl_delay = Some(delay);
            }
        }
    }

    tracing::debug!(
        rule_sets = rule_sets.len(),
        sitemaps = sitemaps.len(),
        "parsed robots.txt"
    );

    Ok(RobotsTxt {
        rule_sets,
        sitemaps,
        raw: text.to_string(),
    })
}

/// Index of the rule set for an agent name, creating it on first sight.
fn ensure_rule_set(rule_sets: &mut Vec<RobotsRuleSet>, user_agent: &str) -> usize {
    if let Some(index) = rule_sets.iter().position(|s| s.user_agent == user_agent) {
        return index;
    }
    rule_sets.push(RobotsRuleSet {
        user_agent: user_agent.to_string(),
        crawl_delay: None,
        rules: Vec::new(),
    });
    rule_sets.len() - 1
}
