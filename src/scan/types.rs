use serde::{Deserialize, Serialize};

/// One place where a keyword occurs in a page, in char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: usize,
    pub end: usize,
}

/// Bounded slice of page text around an occurrence.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub text: &'a str,
    /// Absolute char offset of the window's first char.
    pub start: usize,
}

/// An `https://` anchor found inside a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub href: String,
    /// Char offset of the anchor's `<a` within the window text.
    pub offset: usize,
}

/// A fetched page body ready for scanning.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub text: String,
}

/// Selected links for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    /// Closest distinct links, nearest first.
    pub links: Vec<String>,
    /// Recruitment period, e.g. "25.11.28~25.12.10".
    #[serde(default)]
    pub period: Option<String>,
}

/// Per-keyword selections, kept in configured keyword order.
/// Keywords without any selected link are never present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    entries: Vec<KeywordMatch>,
}

impl SelectionResult {
    pub fn push(&mut self, entry: KeywordMatch) {
        if entry.links.is_empty() {
            return;
        }
        self.entries.push(entry);
    }

    #[cfg(test)]
    pub fn get(&self, keyword: &str) -> Option<&KeywordMatch> {
        self.entries.iter().find(|e| e.keyword == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordMatch> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
