//! Span text normalization.

use unicode_normalization::UnicodeNormalization;

/// Expand a typographic ligature into its letters.
fn expand_ligature(c: char) -> Option<&'static str> {
    match c {
        '\u{FB00}' => Some("ff"),
        '\u{FB01}' => Some("fi"),
        '\u{FB02}' => Some("fl"),
        '\u{FB03}' => Some("ffi"),
        '\u{FB04}' => Some("ffl"),
        '\u{FB05}' | '\u{FB06}' => Some("st"),
        _ => None,
    }
}

/// Normalize span text: NFC, ligature expansion, whitespace collapsing.
///
/// Leading and trailing whitespace is preserved as a single space so the
/// line merger can still see word boundaries between spans.
pub fn normalize_text(text: &str) -> String {
    let mut expanded = String::with_capacity(text.len());
    for c in text.chars() {
        match expand_ligature(c) {
            Some(s) => expanded.push_str(s),
            None if c.is_control() && c != '\t' && c != '\n' => {}
            None => expanded.push(c),
        }
    }

    let composed: String = expanded.nfc().collect();

    let mut result = String::with_capacity(composed.len());
    let mut last_was_space = false;
    for c in composed.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
            }
            last_was_space = true;
        } else {
            result.push(c);
            last_was_space = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ligatures_expanded() {
        assert_eq!(normalize_text("\u{FB01}nal e\u{FB03}cient"), "final efficient");
    }

    #[test]
    fn test_nfc_composition() {
        // "e" + combining acute
        assert_eq!(normalize_text("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn test_whitespace_collapsed_but_edges_kept() {
        assert_eq!(normalize_text("  Hello \t\n world "), " Hello world ");
        assert_eq!(normalize_text("a\u{0000}b"), "ab");
    }
}
