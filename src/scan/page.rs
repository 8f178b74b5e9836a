use super::types::{Occurrence, Window};

/// Page text with a char-boundary index, so char offsets can be turned back
/// into byte offsets for slicing.
pub struct PageText<'a> {
    text: &'a str,
    /// `bounds[i]` is the byte offset of char `i`; the last entry is `text.len()`.
    bounds: Vec<usize>,
}

impl<'a> PageText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut bounds: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        bounds.push(text.len());
        Self { text, bounds }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in chars.
    pub fn char_len(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Byte offset of a char offset, clamped to the end of the text.
    pub fn byte_at(&self, char_offset: usize) -> usize {
        self.bounds[char_offset.min(self.char_len())]
    }

    /// Char offset of a byte offset that lies on a char boundary.
    fn char_at(&self, byte_offset: usize) -> usize {
        self.bounds.partition_point(|&b| b < byte_offset)
    }

    /// Every non-overlapping occurrence of `keyword`, scanning left to right.
    pub fn occurrences(&self, keyword: &str) -> Vec<Occurrence> {
        if keyword.is_empty() {
            return Vec::new();
        }
        let keyword_chars = keyword.chars().count();
        self.text
            .match_indices(keyword)
            .map(|(byte, _)| {
                let start = self.char_at(byte);
                Occurrence {
                    start,
                    end: start + keyword_chars,
                }
            })
            .collect()
    }

    /// Text within `radius` chars of the occurrence, clamped to the page.
    pub fn window(&self, occurrence: Occurrence, radius: usize) -> Window<'a> {
        let start = occurrence.start.saturating_sub(radius);
        let end = occurrence.end.saturating_add(radius).min(self.char_len());
        Window {
            text: &self.text[self.byte_at(start)..self.byte_at(end)],
            start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurrences_all_matches() {
        let page = PageText::new("ab--ab--ab");
        let starts: Vec<_> = page.occurrences("ab").iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![0, 4, 8]);
    }

    #[test]
    fn test_occurrences_non_overlapping() {
        let page = PageText::new("aaaa");
        let starts: Vec<_> = page.occurrences("aa").iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![0, 2]);
    }

    #[test]
    fn test_occurrences_char_offsets() {
        let page = PageText::new("서울 경희대학교 x");
        let occ = page.occurrences("경희대학교");
        assert_eq!(occ, vec![Occurrence { start: 3, end: 8 }]);
    }

    #[test]
    fn test_occurrences_missing_or_empty() {
        let page = PageText::new("nothing here");
        assert!(page.occurrences("경희대학교").is_empty());
        assert!(page.occurrences("").is_empty());
    }

    #[test]
    fn test_occurrences_keyword_case_sensitive() {
        let page = PageText::new("Seoul seoul");
        assert_eq!(page.occurrences("Seoul").len(), 1);
    }

    #[test]
    fn test_window_clamps_at_edges() {
        let page = PageText::new("0123456789");
        let occ = Occurrence { start: 1, end: 3 };
        let w = page.window(occ, 4);
        assert_eq!(w.start, 0);
        assert_eq!(w.text, "0123456");

        let occ = Occurrence { start: 8, end: 9 };
        let w = page.window(occ, 4);
        assert_eq!(w.start, 4);
        assert_eq!(w.text, "456789");
    }

    #[test]
    fn test_window_counts_chars_not_bytes() {
        let page = PageText::new("가나다라마바사");
        let occ = page.occurrences("라")[0];
        let w = page.window(occ, 2);
        assert_eq!(w.text, "나다라마바");
        assert_eq!(w.start, 1);
    }

    #[test]
    fn test_window_large_radius() {
        let page = PageText::new("abc");
        let w = page.window(Occurrence { start: 1, end: 2 }, usize::MAX);
        assert_eq!(w.text, "abc");
        assert_eq!(w.start, 0);
    }
}
