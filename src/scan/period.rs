use std::sync::LazyLock;

use regex::Regex;

use super::page::PageText;
use super::types::Occurrence;

/// Listing containers a recruitment entry is usually wrapped in.
const CONTAINER_TAGS: &[&str] = &["li", "tr", "article", "dd"];

/// Fallback marker when no date range is present ("recruitment period").
const PERIOD_MARKER: &str = "모집기간";
const MARKER_TAIL_MAX_CHARS: usize = 40;

static CONTAINER_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)<({})\b", CONTAINER_TAGS.join("|")))
        .expect("container pattern is valid")
});

/// `25.11.28~25.12.10` or `25.11.28 ~ 채용시`.
static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2}\.\d{2}\.\d{2})\s*~\s*(\d{2}\.\d{2}\.\d{2}|[\p{Hangul}A-Za-z]{1,12})")
        .expect("period pattern is valid")
});

/// Best-effort recruitment period for one keyword occurrence.
///
/// Looks inside the nearest listing container enclosing the occurrence (or the
/// occurrence window when there is none), renders it to text and picks the
/// date range nearest the keyword.
pub fn extract_period(
    page: &PageText<'_>,
    occurrence: Occurrence,
    keyword: &str,
    radius: usize,
) -> Option<String> {
    let markup = enclosing_container(page, occurrence, radius)
        .unwrap_or_else(|| page.window(occurrence, radius).text);
    let text = render_text(markup);
    find_period(&text, keyword)
}

/// Markup of the innermost container opened before the occurrence and still
/// open at it, searched within `radius` chars on either side.
fn enclosing_container<'a>(
    page: &PageText<'a>,
    occurrence: Occurrence,
    radius: usize,
) -> Option<&'a str> {
    let text = page.as_str();
    let lo = page.byte_at(occurrence.start.saturating_sub(radius));
    let occ_start = page.byte_at(occurrence.start);
    let occ_end = page.byte_at(occurrence.end);
    let hi = page.byte_at(occurrence.end.saturating_add(radius));

    let before = &text[lo..occ_start];
    let open = CONTAINER_OPEN_RE.captures_iter(before).last()?;
    let tag = open.get(1)?.as_str().to_ascii_lowercase();
    let open_start = lo + open.get(0)?.start();
    let close_pat = format!("</{}", tag);

    // ASCII lowercasing keeps byte offsets stable.
    let between = text[open_start..occ_start].to_ascii_lowercase();
    if between.contains(&close_pat) {
        return None;
    }

    let after = text[occ_end..hi].to_ascii_lowercase();
    let close_end = match after.find(&close_pat) {
        Some(rel) => {
            let close_start = occ_end + rel;
            text[close_start..hi]
                .find('>')
                .map(|gt| close_start + gt + 1)
                .unwrap_or(hi)
        }
        None => hi,
    };

    Some(&text[open_start..close_end])
}

fn render_text(markup: &str) -> String {
    html2text::from_read(markup.as_bytes(), 10_000).unwrap_or_else(|_| strip_tags(markup))
}

/// Remove `<...>` tags and collapse whitespace.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn find_period(text: &str, keyword: &str) -> Option<String> {
    let anchor = text.find(keyword);
    let best = PERIOD_RE.captures_iter(text).min_by_key(|caps| {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        anchor.map(|a| a.abs_diff(start)).unwrap_or(0)
    });

    if let Some(caps) = best {
        return Some(format!("{}~{}", &caps[1], &caps[2]));
    }

    let marker = text.find(PERIOD_MARKER)?;
    let tail: String = text[marker + PERIOD_MARKER.len()..]
        .lines()
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '|')
        .chars()
        .take(MARKER_TAIL_MAX_CHARS)
        .collect();
    let tail = tail.trim();
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period_for(html: &str, keyword: &str) -> Option<String> {
        let page = PageText::new(html);
        let occ = page.occurrences(keyword)[0];
        extract_period(&page, occ, keyword, 1000)
    }

    #[test]
    fn test_period_date_range() {
        let html = r#"<ul><li class="row"><span>경희대학교</span> <span class="td_receipt">25.11.28~25.12.10</span></li></ul>"#;
        assert_eq!(
            period_for(html, "경희대학교").as_deref(),
            Some("25.11.28~25.12.10")
        );
    }

    #[test]
    fn test_period_label_end() {
        let html = "<li>한양대학교 교원 초빙 <em>25.12.01 ~ 채용시</em></li>";
        assert_eq!(
            period_for(html, "한양대학교").as_deref(),
            Some("25.12.01~채용시")
        );
    }

    #[test]
    fn test_period_stays_in_own_container() {
        let html = "<ul>\
            <li>경희대학교 <span>25.11.28~25.12.10</span></li>\
            <li>고려대학교 <span>25.10.01~25.10.20</span></li>\
            </ul>";
        assert_eq!(
            period_for(html, "고려대학교").as_deref(),
            Some("25.10.01~25.10.20")
        );
        assert_eq!(
            period_for(html, "경희대학교").as_deref(),
            Some("25.11.28~25.12.10")
        );
    }

    #[test]
    fn test_period_closed_container_falls_back_to_window() {
        // The only <li> closes before the keyword; the window still sees the date.
        let html = "<li>other</li><div>서울대학교 26.01.02~26.01.30</div>";
        assert_eq!(
            period_for(html, "서울대학교").as_deref(),
            Some("26.01.02~26.01.30")
        );
    }

    #[test]
    fn test_period_marker_fallback() {
        let html = "<tr><td>부산대학교</td><td>모집기간: 상시 모집</td></tr>";
        let period = period_for(html, "부산대학교").unwrap();
        assert!(period.contains("상시 모집"), "got {period:?}");
    }

    #[test]
    fn test_period_absent() {
        let html = "<li>경북대학교 공고</li>";
        assert_eq!(period_for(html, "경북대학교"), None);
    }

    #[test]
    fn test_period_truncated_markup() {
        let html = "<li class=\"x\">전남대학교 25.03.04~25.03.15 <a href=\"https://m.hibr";
        assert_eq!(
            period_for(html, "전남대학교").as_deref(),
            Some("25.03.04~25.03.15")
        );
    }

    #[test]
    fn test_strip_tags_collapses_whitespace() {
        assert_eq!(strip_tags("<b>a</b>\n\n  <i>b</i>"), "a b");
    }
}
