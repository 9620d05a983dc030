//! Plain-text views of slide HTML for listings and progress messages.
//!
//! ```rust
//! use ddeck::text::{slide_content, slide_title};
//!
//! let html = "<div><h1>Ocean   tides</h1><ul><li>Moon</li><li>Sun</li></ul></div>";
//! assert_eq!(slide_title(html).as_deref(), Some("Ocean tides"));
//! assert_eq!(slide_content(html).as_deref(), Some("• Moon\n• Sun"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

const TITLE_LIMIT: usize = 60;
const CONTENT_LIMIT: usize = 500;
const PREVIEW_SOURCE_LIMIT: usize = 200;
const PREVIEW_LIMIT: usize = 100;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[12][^>]*>([^<]+)</h[12]>").expect("valid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("valid regex"));
static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").expect("valid regex"));
static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static HEADING_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h[12][^>]*>.*?</h[12]>").expect("valid regex"));
static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(?:div|p|li|br)[^>]*>|<br\s*/?>").expect("valid regex"));

/// Collapses every whitespace run into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replaces tags with spaces and collapses whitespace.
pub fn strip_tags(html: &str) -> String {
    collapse_whitespace(&TAG.replace_all(html, " "))
}

/// Short single-line preview used by slide listings.
pub fn slide_preview(html: &str) -> String {
    let head = take_chars(html, PREVIEW_SOURCE_LIMIT)
        .replace('<', " <")
        .replace('>', "> ");
    let text = collapse_whitespace(&TAG.replace_all(&head, ""));
    take_chars(&text, PREVIEW_LIMIT).to_string()
}

/// Best-effort title: the first `<h1>`/`<h2>`, else the start of the text.
pub fn slide_title(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    if let Some(captures) = HEADING.captures(html) {
        let title = collapse_whitespace(&captures[1]);
        if title.chars().count() > TITLE_LIMIT {
            return Some(format!("{}...", take_chars(&title, TITLE_LIMIT - 3)));
        }
        return Some(title);
    }

    let text = strip_tags(html);
    if text.is_empty() {
        return None;
    }

    if text.chars().count() <= TITLE_LIMIT {
        return Some(text);
    }

    let head = take_chars(&text, TITLE_LIMIT);
    let cut = head.rsplit_once(' ').map(|(before, _)| before).unwrap_or(head);
    Some(format!("{cut}..."))
}

/// Readable body text: bullet items, else paragraphs, else block-level lines.
pub fn slide_content(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    let mut parts = LIST_ITEM
        .captures_iter(html)
        .map(|captures| strip_tags(&captures[1]))
        .filter(|item| !item.is_empty())
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>();

    if parts.is_empty() {
        parts = PARAGRAPH
            .captures_iter(html)
            .map(|captures| strip_tags(&captures[1]))
            .filter(|paragraph| !paragraph.is_empty())
            .collect();
    }

    if parts.is_empty() {
        let text = SCRIPT.replace_all(html, "");
        let text = STYLE.replace_all(&text, "");
        let text = HEADING_BLOCK.replace_all(&text, "");
        let text = BLOCK_END.replace_all(&text, "\n");
        let text = TAG.replace_all(&text, " ");
        parts = text
            .split('\n')
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect();
    }

    if parts.is_empty() {
        return None;
    }

    let content = parts.join("\n");
    if content.chars().count() > CONTENT_LIMIT {
        return Some(format!("{}...", take_chars(&content, CONTENT_LIMIT - 3)));
    }
    Some(content)
}

fn take_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
