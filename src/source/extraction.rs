//! Link extraction from article summary HTML (regex-based).

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn paragraph_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<p(?:\s[^>]*)?>(.*?)</p>").expect("Invalid regex pattern"))
}

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<a\s[^>]*?href="/wiki/([^"]+)"[^>]*>"#).expect("Invalid regex pattern")
    })
}

fn title_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\stitle="([^"]+)""#).expect("Invalid regex pattern"))
}

/// Extract article links from the paragraphs of a summary (lead section) HTML.
///
/// Only `<a href="/wiki/...">` anchors inside `<p>` elements count. The link
/// title comes from the anchor's `title` attribute, falling back to the href
/// path with underscores replaced. Namespaced targets (`File:`, `Help:` ...)
/// are skipped. Order is preserved, duplicates are dropped.
pub fn extract_summary_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for paragraph in paragraph_regex().captures_iter(html) {
        let body = paragraph.get(1).map_or("", |m| m.as_str());

        for anchor in anchor_regex().captures_iter(body) {
            let tag = anchor.get(0).map_or("", |m| m.as_str());
            let href = anchor.get(1).map_or("", |m| m.as_str());

            let target = href.split('#').next().unwrap_or("");
            if target.is_empty() || target.contains(':') {
                continue;
            }

            let title = match title_attr_regex().captures(tag) {
                Some(cap) => decode_entities(&cap[1]),
                None => decode_entities(&target.replace('_', " ")),
            };

            if title.contains(':') || title.trim().is_empty() {
                continue;
            }

            if seen.insert(title.clone()) {
                links.push(title);
            }
        }
    }

    links
}

/// Decode the handful of HTML entities MediaWiki emits in attributes.
fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
