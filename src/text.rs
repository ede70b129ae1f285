use regex::Regex;
use std::sync::LazyLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid space regex"));
static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&#(?:x([0-9a-f]+)|([0-9]+));").expect("valid entity regex")
});

// `&#233;` and `&#xE9;` to their character. Out-of-range code points stay
// as written.
fn decode_numeric_entities(s: &str) -> String {
    NUMERIC_ENTITY
        .replace_all(s, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (None, Some(dec)) => dec.as_str().parse().ok(),
                (None, None) => None,
            };
            match code.and_then(char::from_u32) {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Plain text of an API summary: tags removed, common entities decoded,
/// whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    let without_tags = TAG.replace_all(html, " ");
    let decoded = decode_numeric_entities(&without_tags)
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    SPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut result = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags() {
        assert_eq!(
            strip_html("<p><b>Under the Dome</b> is the story of a small town.</p>"),
            "Under the Dome is the story of a small town."
        );
    }

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(strip_html("Tom &amp; Jerry&#39;s &quot;day&quot;"), "Tom & Jerry's \"day\"");
        assert_eq!(strip_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_strip_html_decodes_numeric_references() {
        assert_eq!(strip_html("Caf&#233; &#xE9;t&#xe9;"), "Café été");
        assert_eq!(strip_html("<p>It&#8217;s here</p>"), "It\u{2019}s here");
        assert_eq!(strip_html("&amp;#39;"), "&#39;");
        assert_eq!(strip_html("&#1114112; &#xD800;"), "&#1114112; &#xD800;");
    }

    #[test]
    fn test_strip_html_collapses_whitespace() {
        assert_eq!(strip_html("<p>one</p>\n<p>two</p>"), "one two");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Lost", 10), "Lost");
        assert_eq!(truncate_str("Battlestar Galactica", 10), "Battlesta…");
        assert_eq!(truncate_str("abc", 0), "…");
    }

    #[test]
    fn test_truncate_str_counts_wide_chars() {
        // each CJK char is two columns
        assert_eq!(truncate_str("進撃の巨人", 6), "進撃…");
    }
}
