use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;

use super::types::CandidateLink;

/// Opening `<a ...>` tag with an href in any of the three attribute quoting styles.
/// Window text is an arbitrary slice, so a tag cut off before its href value
/// closes does not match: quoted values need the closing quote, unquoted ones
/// need a following whitespace or `>`.
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s+(?:[^>]*?\s)?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>]+)(?:\s|/?>))"#)
        .expect("anchor pattern is valid")
});

const SECURE_SCHEME: &str = "https://";

/// Extract every anchor whose href starts with `https://`, in document order.
///
/// Offsets are char offsets of the `<a` within `text`. The href is returned
/// whitespace-trimmed with HTML entities decoded (`&amp;` becomes `&`), and
/// the scheme check applies to the decoded value.
pub fn extract_links(text: &str) -> Vec<CandidateLink> {
    let mut links = Vec::new();
    let mut last_byte = 0;
    let mut last_char = 0;

    for caps in ANCHOR_RE.captures_iter(text) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        let href = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| decode_html_entities(m.as_str().trim()))
            .unwrap_or_default();
        if !href.starts_with(SECURE_SCHEME) {
            continue;
        }

        last_char += text[last_byte..tag.start()].chars().count();
        last_byte = tag.start();

        links.push(CandidateLink {
            href: href.to_string(),
            offset: last_char,
        });
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_quoted_styles() {
        let html = r#"<a href="https://a.example/1">x</a> <A HREF='https://a.example/2'>y</A> <a href=https://a.example/3>z</a>"#;
        let hrefs: Vec<_> = extract_links(html).into_iter().map(|l| l.href).collect();
        assert_eq!(
            hrefs,
            vec![
                "https://a.example/1",
                "https://a.example/2",
                "https://a.example/3"
            ]
        );
    }

    #[test]
    fn test_extract_skips_non_https() {
        let html = r#"<a href="http://plain.example">p</a><a href="/relative">r</a><a href="https://ok.example">o</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://ok.example");
    }

    #[test]
    fn test_extract_offset_is_tag_start_in_chars() {
        let html = r#"경희대학교 <a class="t" href="https://m.hibrain.net/x">job</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        // 5 hangul chars + 1 space before `<a`
        assert_eq!(links[0].offset, 6);
    }

    #[test]
    fn test_extract_attribute_before_href() {
        let html = "<a\n  class=\"recruit\"\n  target=_blank href=\"https://x.example/y\">t</a>";
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://x.example/y");
        assert_eq!(links[0].offset, 0);
    }

    #[test]
    fn test_extract_tolerates_truncation() {
        // Leading fragment of a tag, and a trailing tag cut mid-value.
        let html = r#"ef="https://cut.example">a</a> <a href="https://whole.example">b</a> <a href="https://trunc"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://whole.example");
    }

    #[test]
    fn test_extract_skips_unquoted_cut_at_edge() {
        let html = "<a href=https://m.hibrain.net/r/1>a</a> <a href=https://m.hi";
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://m.hibrain.net/r/1");
    }

    #[test]
    fn test_extract_unquoted_terminators() {
        let html = "<a href=https://a.example/1 class=x>a</a><a href=https://a.example/2/>b</a>";
        let hrefs: Vec<_> = extract_links(html).into_iter().map(|l| l.href).collect();
        assert_eq!(hrefs, vec!["https://a.example/1", "https://a.example/2/"]);
    }

    #[test]
    fn test_extract_decodes_entities() {
        let html = r#"<a href="https://m.hibrain.net/r?a=1&amp;b=2">x</a> <a href="&#104;ttps://enc.example">y</a>"#;
        let hrefs: Vec<_> = extract_links(html).into_iter().map(|l| l.href).collect();
        assert_eq!(
            hrefs,
            vec!["https://m.hibrain.net/r?a=1&b=2", "https://enc.example"]
        );
    }

    #[test]
    fn test_extract_ignores_similar_tags() {
        let html = r#"<abbr href="https://no.example">a</abbr><area href="https://no2.example"><a data-x="1" href="https://yes.example">y</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://yes.example");
    }

    #[test]
    fn test_extract_empty() {
        assert!(extract_links("no anchors <b>here</b>").is_empty());
        assert!(extract_links("").is_empty());
    }
}
