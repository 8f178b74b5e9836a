use std::collections::HashMap;

/// A link observed near one occurrence of a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    /// Char distance between the anchor and the occurrence.
    pub distance: usize,
    /// Ordinal of the occurrence that produced this observation.
    pub occurrence: usize,
}

/// Closest distinct links, nearest first, at most `max_links`.
///
/// A URL seen more than once keeps its smallest distance but holds the
/// position of its first observation, which is what breaks distance ties.
pub fn select_closest<I>(observations: I, max_links: usize) -> Vec<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut ranked: Vec<Candidate> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for obs in observations {
        match seen.get(&obs.url) {
            Some(&idx) => {
                if obs.distance < ranked[idx].distance {
                    ranked[idx].distance = obs.distance;
                    ranked[idx].occurrence = obs.occurrence;
                }
            }
            None => {
                seen.insert(obs.url.clone(), ranked.len());
                ranked.push(obs);
            }
        }
    }

    // Stable: equal distances keep first-observed order.
    ranked.sort_by_key(|c| c.distance);
    ranked.truncate(max_links);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(url: &str, distance: usize) -> Candidate {
        Candidate {
            url: url.to_string(),
            distance,
            occurrence: 0,
        }
    }

    fn urls(selected: &[Candidate]) -> Vec<&str> {
        selected.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn test_select_sorted_by_distance() {
        let picked = select_closest(vec![obs("b", 900), obs("a", 30)], 2);
        assert_eq!(urls(&picked), vec!["a", "b"]);
    }

    #[test]
    fn test_select_caps_results() {
        let picked = select_closest(vec![obs("a", 10), obs("b", 20), obs("c", 15)], 2);
        assert_eq!(urls(&picked), vec!["a", "c"]);
    }

    #[test]
    fn test_select_dedup_keeps_min_distance() {
        let mut second = obs("x", 10);
        second.occurrence = 1;
        let picked = select_closest(vec![obs("x", 40), obs("y", 20), second], 2);
        assert_eq!(urls(&picked), vec!["x", "y"]);
        assert_eq!(picked[0].distance, 10);
        assert_eq!(picked[0].occurrence, 1);
    }

    #[test]
    fn test_select_ties_keep_first_observed() {
        let picked = select_closest(vec![obs("late", 5), obs("early", 5), obs("z", 0)], 3);
        assert_eq!(urls(&picked), vec!["z", "late", "early"]);
    }

    #[test]
    fn test_select_tie_uses_first_observation_position() {
        // "a" first seen at 50, later at 5; it ties "b" at 5 and was observed first.
        let picked = select_closest(vec![obs("a", 50), obs("b", 5), obs("a", 5)], 2);
        assert_eq!(urls(&picked), vec!["a", "b"]);
    }

    #[test]
    fn test_select_empty() {
        assert!(select_closest(Vec::new(), 2).is_empty());
    }
}
