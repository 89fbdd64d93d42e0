// Cursor sentinels.
//
// An editor marks the caret position with a reserved character inside text.
// It travels through every conversion untouched: never escaped, never read as
// Markdown punctuation, never counted when deciding whether text is empty.

/// Caret sentinel carried inside text (U+2038 CARET).
pub const CARET: &str = "\u{2038}";

/// Zero-width space used by editors as an empty-node placeholder.
pub const ZWSP: &str = "\u{200b}";

/// Zero-width joiner.
pub const ZWJ: &str = "\u{200d}";

/// Caret marker as the browser front end writes it.
pub const FRONT_END_CARET: &str = "<wbr>";

/// Remove zero-width spaces.
pub fn strip_zwsp(text: &str) -> String {
    text.replace(ZWSP, "")
}

/// Remove the caret.
pub fn strip_caret(text: &str) -> String {
    text.replace(CARET, "")
}

/// Whether `text` carries no content besides whitespace, zero-width
/// placeholders and the caret.
pub fn is_empty_text(text: &str) -> bool {
    let visible = strip_zwsp(text).replace(ZWJ, "");
    let trimmed = visible.trim();
    trimmed.is_empty() || trimmed == CARET
}

/// Whether `text` is exactly the caret, possibly with placeholders around it.
pub fn is_caret_only(text: &str) -> bool {
    strip_zwsp(text).trim() == CARET
}

/// Decode the five XML entities the editors escape in code payloads.
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_variants() {
        assert!(is_empty_text(""));
        assert!(is_empty_text("  \n"));
        assert!(is_empty_text(ZWSP));
        assert!(is_empty_text(CARET));
        assert!(is_empty_text(&format!("{CARET}{ZWSP}")));
        assert!(is_empty_text(&format!("{ZWSP}{CARET}")));
        assert!(!is_empty_text("a"));
        assert!(!is_empty_text(&format!("a{CARET}")));
        assert!(is_empty_text(&format!("{ZWJ}{ZWSP}")));
        assert!(!is_empty_text(&format!("a{ZWJ}b")));
    }

    #[test]
    fn test_caret_only() {
        assert!(is_caret_only(&format!("{ZWSP}{CARET}")));
        assert!(!is_caret_only(&format!("x{CARET}")));
    }

    #[test]
    fn test_unescape_keeps_escaped_ampersand_last() {
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
        assert_eq!(unescape_html("a &lt;b&gt; &quot;c&quot;"), "a <b> \"c\"");
    }

    #[test]
    fn test_escape_leaves_caret() {
        assert_eq!(escape_html(&format!("<a>{CARET}")), format!("&lt;a&gt;{CARET}"));
    }
}
