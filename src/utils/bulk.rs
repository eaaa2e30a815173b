//! Parsing of bulk-pasted episode lists.
//!
//! Admins paste free text that interleaves episode names and links, often copied
//! from a mobile client that wraps long query strings onto new lines. The parser
//! pairs every `http(s)://` token with the text that precedes it.

use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::{is_valid_url, normalize_episode_name, normalize_url};

const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Line starts that belong to the URL on the previous line.
const CONTINUATION_PREFIXES: &[&str] = &["?", "&", "story_fbid=", "fbid="];

static URL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://\S+").unwrap_or_else(|_| unreachable!("static regex"))
});

/// Outcome of parsing one bulk buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkParse {
    /// Normalized `(name, url)` pairs, in input order.
    pub entries: Vec<(String, String)>,
    /// Pairs dropped for an empty name or an invalid link.
    pub skipped: usize,
}

impl BulkParse {
    pub fn added(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BulkParseError {
    #[error("Please include at least one http/https link.")]
    NoLinks,
}

/// Strips zero-width characters, drops blank lines and re-joins wrapped query strings.
pub fn merge_wrapped_lines(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect();

    let mut merged: Vec<String> = Vec::new();
    for line in cleaned.lines() {
        let part = line.trim();
        if part.is_empty() {
            continue;
        }
        let continues = CONTINUATION_PREFIXES.iter().any(|p| part.starts_with(p));
        match merged.last_mut() {
            Some(previous) if continues => previous.push_str(part),
            _ => merged.push(part.to_string()),
        }
    }
    merged.join("\n")
}

pub fn parse_bulk_links(text: &str) -> Result<BulkParse, BulkParseError> {
    let raw = merge_wrapped_lines(text);

    let mut result = BulkParse::default();
    let mut prev_end = 0usize;
    let mut found_any = false;

    for token in URL_TOKEN.find_iter(&raw) {
        found_any = true;
        let name = raw[prev_end..token.start()].trim();
        prev_end = token.end();

        if name.is_empty() {
            result.skipped += 1;
            continue;
        }
        let url = normalize_url(token.as_str());
        if !is_valid_url(&url) {
            result.skipped += 1;
            continue;
        }
        result.entries.push((normalize_episode_name(name), url));
    }

    if !found_any {
        return Err(BulkParseError::NoLinks);
    }
    Ok(result)
}
