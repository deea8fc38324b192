//! Escaping of text so it reads back as the same literal characters.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::RenderContext;

static SETEXT_UNDERLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(=+|-+)([ \t]*)$").expect("setext underline pattern should compile")
});
static ATX_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(#{1,6})([ \t]|$)").expect("heading pattern should compile")
});
static BULLET_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)([-+])([ \t]|$)").expect("bullet pattern should compile")
});
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(\d+)([.)])([ \t]|$)").expect("ordered item pattern should compile")
});
static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)>").expect("blockquote pattern should compile"));

/// Escape text for the position described by `ctx`.
///
/// Text inside code regions is returned unchanged.
pub fn escape(text: &str, ctx: &RenderContext<'_>) -> String {
    if ctx.in_code {
        return text.to_string();
    }
    escape_markdown(text, ctx.in_table_cell)
}

/// Escape characters that would otherwise be read as Markdown syntax.
///
/// Backslashes, `*`, `[` and `]` are always escaped. Underscores are left alone
/// inside words and inside table cells. Backtick runs that close a code span are
/// kept; unbalanced ones are escaped. Control characters are dropped.
pub fn escape_markdown(text: &str, in_table_cell: bool) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let mut out = String::with_capacity(cleaned.len() + 8);
    let mut rest = cleaned.as_str();
    let mut prev = None;

    while let Some(tick) = rest.find('`') {
        escape_chars(&rest[..tick], prev, in_table_cell, &mut out);

        let run = rest[tick..].len() - rest[tick..].trim_start_matches('`').len();
        let after = &rest[tick + run..];
        match closing_run(after, run) {
            Some(close) => {
                let span_end = tick + run + close + run;
                out.push_str(&rest[tick..span_end]);
                rest = &rest[span_end..];
            }
            None => {
                for _ in 0..run {
                    out.push_str("\\`");
                }
                rest = after;
            }
        }
        prev = Some('`');
    }
    escape_chars(rest, prev, in_table_cell, &mut out);

    escape_line_starts(&out)
}

fn escape_chars(segment: &str, mut prev: Option<char>, in_table_cell: bool, out: &mut String) {
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match c {
            '\\' | '*' | '[' | ']' => {
                out.push('\\');
                out.push(c);
            }
            '_' if !in_table_cell && !is_intraword(prev, next) => out.push_str("\\_"),
            '~' if prev == Some('~') || next == Some('~') => out.push_str("\\~"),
            _ => out.push(c),
        }
        prev = Some(c);
    }
}

fn is_intraword(prev: Option<char>, next: Option<char>) -> bool {
    prev.is_some_and(char::is_alphanumeric) && next.is_some_and(char::is_alphanumeric)
}

/// Byte offset of the next backtick run of exactly `run` characters
fn closing_run(text: &str, run: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        if i - start == run {
            return Some(start);
        }
    }
    None
}

fn escape_line_starts(text: &str) -> String {
    let text = SETEXT_UNDERLINE.replace_all(text, "${1}\\${2}${3}");
    let text = ATX_HEADING.replace_all(&text, "${1}\\${2}${3}");
    let text = BULLET_ITEM.replace_all(&text, "${1}\\${2}${3}");
    let text = ORDERED_ITEM.replace_all(&text, "${1}${2}\\${3}${4}");
    BLOCKQUOTE.replace_all(&text, "${1}\\>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esc(text: &str) -> String {
        escape_markdown(text, false)
    }

    #[test]
    fn test_always_escaped() {
        assert_eq!(esc("*test*"), "\\*test\\*");
        assert_eq!(esc("[link]"), "\\[link\\]");
        assert_eq!(esc("C:\\path"), "C:\\\\path");
        assert_eq!(esc("normal"), "normal");
    }

    #[test]
    fn test_underscores() {
        assert_eq!(esc("_test_"), "\\_test\\_");
        assert_eq!(esc("snake_case_name"), "snake_case_name");
        assert_eq!(esc("__init__"), "\\_\\_init\\_\\_");
        assert_eq!(escape_markdown("_leading", true), "_leading");
    }

    #[test]
    fn test_backticks() {
        assert_eq!(esc("a `b` c"), "a `b` c");
        assert_eq!(esc("stray ` tick"), "stray \\` tick");
        assert_eq!(esc("``x` y``"), "``x` y``");
    }

    #[test]
    fn test_strikethrough_tildes() {
        assert_eq!(esc("~~gone~~"), "\\~\\~gone\\~\\~");
        assert_eq!(esc("~/home"), "~/home");
    }

    #[test]
    fn test_line_start_markers() {
        assert_eq!(esc("# not a heading"), "\\# not a heading");
        assert_eq!(esc("#hashtag"), "#hashtag");
        assert_eq!(esc("- not a list"), "\\- not a list");
        assert_eq!(esc("+ plus"), "\\+ plus");
        assert_eq!(esc("1. first"), "1\\. first");
        assert_eq!(esc("2) second"), "2\\) second");
        assert_eq!(esc("> quote"), "\\> quote");
        assert_eq!(esc("==="), "\\===");
        assert_eq!(esc("---"), "\\---");
        assert_eq!(esc("a - b"), "a - b");
        assert_eq!(esc("E.g. 1.5"), "E.g. 1.5");
    }

    #[test]
    fn test_special_characters_pass_through() {
        assert_eq!(esc("Special chars: < > & \""), "Special chars: < > & \"");
        assert_eq!(esc("&hourly=temperature_2m"), "&hourly=temperature_2m");
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(esc("a\u{1f}b\u{0}c"), "abc");
    }
}
