//! Allow-list markup for transcript display.
//!
//! Text is always HTML-escaped first; the only tags that can appear in the
//! output are `pre`, `code`, `strong` and `em`, produced from markdown-style
//! markers in assistant replies.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::chat::{ Role, Turn };

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders an assistant reply. Code regions are emitted verbatim (escaped),
/// so emphasis markers inside them stay literal.
pub fn render_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    let mut last = 0;
    for caps in FENCED_CODE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        render_inline(&text[last..whole.start()], &mut out);
        out.push_str("<pre><code>");
        out.push_str(&escape_html(&caps[2]));
        out.push_str("</code></pre>");
        last = whole.end();
    }
    render_inline(&text[last..], &mut out);
    out
}

fn render_inline(text: &str, out: &mut String) {
    let mut last = 0;
    for caps in INLINE_CODE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&render_emphasis(&text[last..whole.start()]));
        out.push_str("<code>");
        out.push_str(&escape_html(&caps[1]));
        out.push_str("</code>");
        last = whole.end();
    }
    out.push_str(&render_emphasis(&text[last..]));
}

// `*` and the word characters it wraps are untouched by escaping, so the
// emphasis patterns can run on escaped text.
fn render_emphasis(text: &str) -> String {
    let escaped = escape_html(text);
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    ITALIC.replace_all(&bold, "<em>$1</em>").into_owned()
}

/// Display form of a turn: assistant replies get markup, user text is only
/// escaped.
pub fn render_turn(turn: &Turn) -> String {
    match turn.role {
        Role::Assistant => render_markup(&turn.content),
        Role::User => escape_html(&turn.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_code_and_bold() {
        let html = render_markup("Use `print` for **output**.");
        assert_eq!(html, "Use <code>print</code> for <strong>output</strong>.");
        assert!(!html.contains('`'));
        assert!(!html.contains("**"));
    }

    #[test]
    fn italic() {
        assert_eq!(render_markup("an *important* step"), "an <em>important</em> step");
    }

    #[test]
    fn fenced_block_keeps_contents_literal() {
        let html = render_markup("Try:\n```python\nx = 2 * 3 * 4\nprint(x)\n```\nDone **now**");
        assert_eq!(
            html,
            "Try:\n<pre><code>x = 2 * 3 * 4\nprint(x)\n</code></pre>\nDone <strong>now</strong>"
        );
    }

    #[test]
    fn emphasis_inside_inline_code_is_literal() {
        assert_eq!(render_markup("`**kwargs`"), "<code>**kwargs</code>");
    }

    #[test]
    fn raw_html_from_model_is_escaped() {
        let html = render_markup("<script>alert('x')</script> **ok**");
        assert_eq!(
            html,
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; <strong>ok</strong>"
        );
    }

    #[test]
    fn html_inside_code_is_escaped() {
        assert_eq!(render_markup("`<b>`"), "<code>&lt;b&gt;</code>");
    }

    #[test]
    fn user_turns_are_not_interpreted() {
        let turn = Turn::user("**not bold** <i>");
        assert_eq!(render_turn(&turn), "**not bold** &lt;i&gt;");
    }

    #[test]
    fn assistant_turns_get_markup() {
        let turn = Turn::assistant("`x`");
        assert_eq!(render_turn(&turn), "<code>x</code>");
    }
}
