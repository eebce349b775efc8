//! Utility helpers shared across the WASM frontend.

use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

/// `true` when `s` is a hyphenated UUID (`8-4-4-4-12` hex digits, any
/// version).  Braced, URN and simple forms are rejected: configuration may
/// carry graph names that are not meant as instance ids.
pub fn is_uuid(s: &str) -> bool {
    s.len() == 36 && s.as_bytes()[8] == b'-' && Uuid::try_parse(s).is_ok()
}

/// Shorten `text` to at most `max` grapheme clusters, appending an ellipsis
/// when something was cut.  Works on user-visible characters so emoji and
/// combining marks are never split.
pub fn truncate_graphemes(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Fresh random identifier for locally created messages.
pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_detection() {
        assert!(is_uuid("11111111-1111-1111-1111-111111111111"));
        assert!(is_uuid("6F9619FF-8B86-D011-B42D-00C04FC964FF"));
        assert!(!is_uuid("agent-42"));
        assert!(!is_uuid("agent"));
        assert!(!is_uuid(""));
        assert!(!is_uuid("11111111111111111111111111111111"));
        assert!(!is_uuid("{11111111-1111-1111-1111-111111111111}"));
        assert!(!is_uuid("1111111g-1111-1111-1111-111111111111"));
    }

    #[test]
    fn truncation_respects_graphemes() {
        assert_eq!(truncate_graphemes("hello", 10), "hello");
        assert_eq!(truncate_graphemes("hello world", 5), "hello…");
        assert_eq!(truncate_graphemes("hello world", 6), "hello…");
        // family emoji is a single grapheme made of several code points
        let family = "👨‍👩‍👧abc";
        assert_eq!(truncate_graphemes(family, 1), "👨‍👩‍👧…");
    }
}
