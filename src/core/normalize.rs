//! Company-name canonicalization used as the join key between the registry
//! and scraped postings.

/// Corporate-entity markers removed before comparison: `(주)` / `(유)`,
/// `주식회사` / `유한회사`, and the single-glyph forms `㈜` (U+321C) and `㈔` (U+3214).
const ENTITY_MARKERS: [&str; 6] = ["(주)", "(유)", "주식회사", "유한회사", "\u{321C}", "\u{3214}"];

/// Canonical form of a company name. Two names denote the same company iff
/// their normalized forms are equal.
///
/// Markers are stripped, then all whitespace (and any U+FEFF) is removed, then
/// the result is lower-cased (a no-op for Hangul). The pass repeats until
/// nothing changes so that inputs like `(주(주))` or `(주 )` still reach a fixed point.
pub fn normalize(name: &str) -> String {
    let mut current = strip_once(name);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Not Unicode whitespace, but turns up in scraped names.
const BYTE_ORDER_MARK: char = '\u{FEFF}';

fn strip_once(name: &str) -> String {
    let mut out = name.to_string();
    for marker in ENTITY_MARKERS {
        if out.contains(marker) {
            out = out.replace(marker, "");
        }
    }
    out.chars()
        .filter(|c| !c.is_whitespace() && *c != BYTE_ORDER_MARK)
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_parenthesized_markers() {
        assert_eq!(normalize("(주)한국소프트"), normalize("한국소프트"));
        assert_eq!(normalize("한국소프트(유)"), "한국소프트");
    }

    #[test]
    fn test_strips_word_markers_and_glyphs() {
        assert_eq!(normalize("주식회사 테크코"), "테크코");
        assert_eq!(normalize("유한회사 테크코"), "테크코");
        assert_eq!(normalize("㈜테크코"), "테크코");
        assert_eq!(normalize("㈔테크코"), "테크코");
    }

    #[test]
    fn test_removes_all_whitespace() {
        assert_eq!(normalize("  한국 소프트\t웨어 \n"), "한국소프트웨어");
    }

    #[test]
    fn test_removes_byte_order_mark() {
        assert_eq!(normalize("\u{FEFF}(주)테크코"), "테크코");
        assert_eq!(normalize("테크\u{FEFF}코"), normalize("테크코"));
    }

    #[test]
    fn test_case_folds_latin_names() {
        assert_eq!(normalize("NAVER Cloud"), normalize("naver cloud"));
    }

    #[test]
    fn test_nested_markers_reach_fixed_point() {
        assert_eq!(normalize("(주(주))테크"), "테크");
        assert_eq!(normalize("(주 )테크"), "테크");
    }

    #[test]
    fn test_does_not_strip_partial_markers() {
        assert_eq!(normalize("주식테크"), "주식테크");
        assert_eq!(normalize("(주식)테크"), "(주식)테크");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(name in "[ (주유)식회사㈜㈔가-힣a-zA-Z0-9\\t]{0,24}") {
            let once = normalize(&name);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalized_has_no_whitespace(name in "\\PC{0,32}") {
            prop_assert!(!normalize(&name).chars().any(char::is_whitespace));
        }
    }
}
