use futures::future::join_all;
use tracing::{info, warn};

use crate::fetch::{origin_key, FetchOutcome, PageFetcher};
use crate::scan;
use crate::scan::types::Page;
use crate::state::AppState;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    NoKeywords,
    /// No configured page could be fetched; a failure notice was sent.
    AllPagesFailed { pages: usize },
    NoMatches { pages: usize },
    Notified { pages: usize, keywords: usize },
}

/// Indices of `addresses` grouped by fetch origin. Groups appear in order of
/// their first address; indices within a group keep configured order.
pub fn group_by_origin(addresses: &[String]) -> Vec<Vec<usize>> {
    let mut keys: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (idx, url) in addresses.iter().enumerate() {
        let key = origin_key(url);
        match keys.iter().position(|k| *k == key) {
            Some(g) => groups[g].push(idx),
            None => {
                keys.push(key);
                groups.push(vec![idx]);
            }
        }
    }
    groups
}

/// Fetch every address. Different origins are fetched concurrently, pages of
/// one origin one after another so the fetcher's delays space them out.
/// Outcomes come back in configured order.
pub async fn fetch_all(fetcher: &PageFetcher, addresses: &[String]) -> Vec<FetchOutcome> {
    let groups = group_by_origin(addresses);
    let per_origin = join_all(groups.iter().map(|indices| async move {
        let mut outcomes = Vec::with_capacity(indices.len());
        for &idx in indices {
            outcomes.push((idx, fetcher.fetch(&addresses[idx]).await));
        }
        outcomes
    }))
    .await;

    let mut outcomes: Vec<(usize, FetchOutcome)> = per_origin.into_iter().flatten().collect();
    outcomes.sort_by_key(|(idx, _)| *idx);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

/// Split fetch outcomes into scannable pages and `(url, outcome)` failures,
/// both in configured order.
pub fn partition(
    outcomes: Vec<(String, FetchOutcome)>,
) -> (Vec<Page>, Vec<(String, FetchOutcome)>) {
    let mut pages = Vec::new();
    let mut failures = Vec::new();
    for (url, outcome) in outcomes {
        match outcome {
            FetchOutcome::Fetched(text) => pages.push(Page { url, text }),
            other => {
                warn!(url = %url, outcome = %other, "Skipping page");
                failures.push((url, other));
            }
        }
    }
    (pages, failures)
}

pub async fn run(state: &AppState) -> RunSummary {
    if state.keywords.is_empty() {
        warn!("No keywords configured, nothing to look for");
        return RunSummary::NoKeywords;
    }
    info!(keywords = ?state.keywords, "Loaded keywords");

    let addresses: Vec<String> = state
        .config
        .web_addresses
        .iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    let outcomes = fetch_all(&state.fetcher, &addresses).await;
    let (pages, failures) = partition(addresses.into_iter().zip(outcomes).collect());

    if pages.is_empty() {
        warn!(failed = failures.len(), "Every page failed to load");
        let ip = state.fetcher.public_ip().await;
        state
            .notifier
            .send_failure_notice(&failures, ip.as_deref())
            .await;
        return RunSummary::AllPagesFailed {
            pages: failures.len(),
        };
    }

    let results = scan::select(&pages, &state.keywords, &state.scan_config());
    if results.is_empty() {
        info!(pages = pages.len(), "No keyword matched this run");
        return RunSummary::NoMatches { pages: pages.len() };
    }

    info!(pages = pages.len(), keywords = results.len(), "Keywords matched");
    let ip = state.fetcher.public_ip().await;
    state.notifier.send_matches(&results, ip.as_deref()).await;

    RunSummary::Notified {
        pages: pages.len(),
        keywords: results.len(),
    }
}
