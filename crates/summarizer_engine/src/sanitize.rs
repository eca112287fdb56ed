use std::sync::LazyLock;

use regex::Regex;

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```html?[ \t]*\n?").expect("fence-open pattern"));
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("fence-close pattern"));
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script-block pattern"));
static SCRIPT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?script\b[^>]*>").expect("script-tag pattern"));
static EVENT_ATTR_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\son\w+\s*=\s*("[^"]*"|'[^']*')"#).expect("quoted-handler pattern")
});
static EVENT_ATTR_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\son\w+\s*=\s*[^\s>]+").expect("bare-handler pattern"));

/// Clean provider output for display: drop a surrounding markdown code fence
/// if the model wrapped its HTML in one, then remove script elements and
/// inline event-handler attributes.
///
/// Idempotent: sanitizing already-sanitized output is a no-op.
pub fn sanitize_summary_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let cleaned = FENCE_OPEN.replace(html, "");
    let cleaned = FENCE_CLOSE.replace(&cleaned, "");
    let cleaned = SCRIPT_BLOCK.replace_all(&cleaned, "");
    let cleaned = SCRIPT_TAG.replace_all(&cleaned, "");
    let cleaned = EVENT_ATTR_QUOTED.replace_all(&cleaned, "");
    let cleaned = EVENT_ATTR_BARE.replace_all(&cleaned, "");
    cleaned.into_owned()
}

#[cfg(test)]
mod tests {
    use super::sanitize_summary_html;

    #[test]
    fn strips_markdown_fences_around_html() {
        let wrapped = "```html\n<h2>サマリー</h2><p>本文</p>\n```";
        assert_eq!(
            sanitize_summary_html(wrapped),
            "<h2>サマリー</h2><p>本文</p>"
        );
    }

    #[test]
    fn removes_script_blocks_and_stray_tags() {
        let html = r#"<p>ok</p><script type="text/javascript">alert(1)</script><script src="x.js">"#;
        let cleaned = sanitize_summary_html(html);
        assert_eq!(cleaned, "<p>ok</p>");
    }

    #[test]
    fn removes_event_handler_attributes() {
        let html = r#"<div class="stat-card" onclick="evil()" onmouseover=evil2>n</div>"#;
        let cleaned = sanitize_summary_html(html);
        assert!(!cleaned.to_lowercase().contains("onclick"));
        assert!(!cleaned.to_lowercase().contains("onmouseover"));
        assert!(cleaned.contains(r#"class="stat-card""#));
    }

    #[test]
    fn sanitizing_twice_equals_sanitizing_once() {
        let html = "```html\n<div onclick=\"x()\">a</div><script>b()</script>\n```";
        let once = sanitize_summary_html(html);
        let twice = sanitize_summary_html(&once);
        assert_eq!(once, twice);
        assert!(!twice.contains("<script"));
        assert!(!twice.contains("onclick"));
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize_summary_html(""), "");
    }
}
