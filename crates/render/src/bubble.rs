//! Chat-bubble formatting for the subset of markdown AI models actually
//! produce: fenced code blocks, inline code spans, and bold emphasis.
//!
//! Only bot-authored text is formatted; user-authored text is escaped and
//! never interpreted as markup.

use std::sync::OnceLock;

use regex::Regex;

use crate::escape_html;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_CODE_RE: OnceLock<Regex> = OnceLock::new();
static BOLD_RE: OnceLock<Regex> = OnceLock::new();

fn fence_re() -> &'static Regex {
    FENCE_RE.get_or_init(|| Regex::new(r"(?s)```(.*?)```").unwrap())
}

fn inline_code_re() -> &'static Regex {
    INLINE_CODE_RE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap())
}

fn bold_re() -> &'static Regex {
    BOLD_RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").unwrap())
}

/// Render bot text: escape, then paired fences to `<pre>`, single-backtick
/// spans to `<code>`, doubled asterisks to `<strong>`. Unpaired markers are
/// left as literal text.
pub fn render_bot_text(raw: &str) -> String {
    let escaped = escape_html(raw);
    let with_pre = fence_re().replace_all(&escaped, "<pre>$1</pre>");
    let with_code = inline_code_re().replace_all(&with_pre, "<code>$1</code>");
    bold_re().replace_all(&with_code, "<strong>$1</strong>").into_owned()
}

/// User text is display-only: escaped, no formatting.
pub fn render_user_text(raw: &str) -> String {
    escape_html(raw)
}
