pub mod anchors;
pub mod page;
pub mod period;
pub mod rank;
pub mod types;

use tracing::debug;

use crate::state::ScanConfig;

use page::PageText;
use rank::Candidate;
use types::{KeywordMatch, Occurrence, Page, SelectionResult};

/// Match every keyword against every page and keep the closest links.
///
/// Pure and deterministic: the same pages, keywords and config always produce
/// the same result. Entries follow keyword order.
pub fn select(pages: &[Page], keywords: &[String], config: &ScanConfig) -> SelectionResult {
    let indexed: Vec<PageText<'_>> = pages
        .iter()
        .map(|p| {
            let text = PageText::new(&p.text);
            debug!(page = %p.url, chars = text.char_len(), "Page indexed");
            text
        })
        .collect();
    let mut result = SelectionResult::default();

    for keyword in keywords {
        if let Some(entry) = scan_keyword(&indexed, keyword, config) {
            debug!(
                keyword = %entry.keyword,
                links = entry.links.len(),
                period = ?entry.period,
                "keyword matched"
            );
            result.push(entry);
        }
    }

    result
}

/// Links and period for one keyword across all pages, or `None` if no
/// occurrence had an `https://` anchor within its window.
pub fn scan_keyword(
    pages: &[PageText<'_>],
    keyword: &str,
    config: &ScanConfig,
) -> Option<KeywordMatch> {
    // (page index, occurrence) in observation order
    let mut occurrences: Vec<(usize, Occurrence)> = Vec::new();
    let mut observations: Vec<Candidate> = Vec::new();

    for (page_idx, page) in pages.iter().enumerate() {
        for occ in page.occurrences(keyword) {
            let ordinal = occurrences.len();
            occurrences.push((page_idx, occ));

            let window = page.window(occ, config.window_radius);
            for link in anchors::extract_links(window.text) {
                let absolute = window.start + link.offset;
                observations.push(Candidate {
                    url: link.href,
                    distance: absolute.abs_diff(occ.start),
                    occurrence: ordinal,
                });
            }
        }
    }

    let selected = rank::select_closest(observations, config.max_links);
    let best = selected.first()?;

    let period_of = |ordinal: usize| {
        let (page_idx, occ) = occurrences[ordinal];
        period::extract_period(&pages[page_idx], occ, keyword, config.window_radius)
    };
    let period = period_of(best.occurrence)
        .or_else(|| (0..occurrences.len()).find_map(period_of));

    Some(KeywordMatch {
        keyword: keyword.to_string(),
        links: selected.into_iter().map(|c| c.url).collect(),
        period,
    })
}
