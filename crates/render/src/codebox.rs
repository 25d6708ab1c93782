//! Cleanup and heuristic highlighting for generated code panels.
//!
//! The highlighter is regex substitution, not a lexer. Passes run in a
//! fixed order over already-escaped text; inserted spans use unquoted class
//! attribute values so the quoted-string pass cannot re-match inside a tag.
//! Nested spans can still appear inside string literals (a capitalized word
//! in a wrapped string gets wrapped again) — accepted limitation.

use std::sync::OnceLock;

use regex::Regex;

use crate::escape_html;

/// Header phrase some model replies prepend to code output.
const HEADER_PHRASE: &str = "output of the code";

static HEADER_RE: OnceLock<Regex> = OnceLock::new();
static FENCE_RE: OnceLock<Regex> = OnceLock::new();
static KEYWORD_RE: OnceLock<Regex> = OnceLock::new();
static STRING_RE: OnceLock<Regex> = OnceLock::new();
static TYPE_RE: OnceLock<Regex> = OnceLock::new();
static CALL_RE: OnceLock<Regex> = OnceLock::new();

fn header_re() -> &'static Regex {
    HEADER_RE.get_or_init(|| Regex::new(&format!(r"(?i){}:?", HEADER_PHRASE)).unwrap())
}

fn fence_re() -> &'static Regex {
    // A fence with an optional language tag, wherever it appears.
    FENCE_RE.get_or_init(|| Regex::new(r"```[A-Za-z0-9_+\-]*").unwrap())
}

fn keyword_re() -> &'static Regex {
    // Python + Java keywords the widget's persona produces. `print` is
    // intentionally absent: calls are handled by the method-call pass.
    // Capitalized literals (True, False, None) fall to the type pass.
    KEYWORD_RE.get_or_init(|| {
        Regex::new(
            r"\b(def|class|import|from|return|yield|if|elif|else|for|while|try|except|finally|with|as|in|is|not|and|or|lambda|pass|break|continue|global|del|raise|assert|public|private|protected|static|final|void|abstract|interface|extends|implements|throws|throw|new|this|super|int|long|double|float|boolean|char|byte|short|null|true|false|var|const|let|function|switch|case|default|do|catch|instanceof|synchronized|volatile|transient|native|enum|package)\b",
        )
        .unwrap()
    })
}

fn string_re() -> &'static Regex {
    STRING_RE.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'"#).unwrap())
}

fn type_re() -> &'static Regex {
    TYPE_RE.get_or_init(|| Regex::new(r"\b[A-Z][A-Za-z0-9_]*\b").unwrap())
}

fn call_re() -> &'static Regex {
    CALL_RE.get_or_init(|| Regex::new(r"\b([a-z_][A-Za-z0-9_]*)\(").unwrap())
}

/// Strip the header phrase and any code fences, then trim.
pub fn clean(raw: &str) -> String {
    let without_header = header_re().replace_all(raw, "");
    let without_fences = fence_re().replace_all(&without_header, "");
    without_fences.trim().to_string()
}

/// Apply the four span-wrapping passes to already-escaped text.
fn highlight(escaped: &str) -> String {
    let pass1 = keyword_re().replace_all(escaped, "<span class=hl-kw>$0</span>");
    let pass2 = string_re().replace_all(&pass1, "<span class=hl-str>$0</span>");
    let pass3 = type_re().replace_all(&pass2, "<span class=hl-type>$0</span>");
    call_re()
        .replace_all(&pass3, "<span class=hl-call>$1</span>(")
        .into_owned()
}

/// Full code-box pipeline: clean, escape `&`/`<`/`>` in that order, then
/// highlight.
pub fn render_code(raw: &str) -> String {
    highlight(&escape_html(&clean(raw)))
}
