//! Response rendering: raw model text in, HTML fragment out.
//!
//! Two variants share the escape helper but nothing else: `bubble` is the
//! markdown-lite formatter for chat messages, `codebox` is the cleanup +
//! heuristic highlighter for generated code panels. Neither executes or
//! interprets returned text beyond these textual substitutions.

pub mod bubble;
pub mod codebox;

/// Escape the three HTML-significant characters, `&` first so the later
/// replacements don't get double-escaped.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
