use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_STYLE: Regex =
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap();
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]+>").unwrap();
}

/// Extract checkable text from HTML-like markup: script/style bodies,
/// comments, and tags are removed, the handful of entities that appear in
/// generated content are decoded.
pub fn extract(content: &str) -> String {
    let text = SCRIPT_STYLE.replace_all(content, " ");
    let text = COMMENT.replace_all(&text, " ");
    let text = TAG.replace_all(&text, " ");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    // &amp; is decoded last so entity names are never double-decoded.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stripped() {
        let text = extract("<html><body><p>Hello <b>bold</b> world.</p></body></html>");
        assert!(text.contains("Hello"));
        assert!(text.contains("bold"));
        assert!(!text.contains("body"));
    }

    #[test]
    fn test_script_and_style_bodies_are_dropped() {
        let text = extract(
            "<p>kept</p><script>var dropped = 1;</script><style>.cls { color: red }</style>",
        );
        assert!(text.contains("kept"));
        assert!(!text.contains("dropped"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let text = extract("<p>kept</p><!-- spelling-exceptions: wrd -->");
        assert!(text.contains("kept"));
        assert!(!text.contains("wrd"));
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(
            extract("don&#39;t &amp; won&apos;t").trim(),
            "don't & won't"
        );
    }

    #[test]
    fn test_phrases_survive_within_a_text_run() {
        let text = extract("<p>Geoffrey Challen wrote this.</p>");
        assert!(text.contains("Geoffrey Challen"));
    }
}
