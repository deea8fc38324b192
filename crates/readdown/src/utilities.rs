//! Small string helpers shared by the rules and the engine.

/// Collapse runs of ASCII whitespace to a single space.
///
/// Non-breaking spaces are content and are left alone.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_ascii_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Clean an attribute value (trim, collapse newlines, handle missing)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| {
            v.trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Split content into leading whitespace, body and trailing whitespace
pub(crate) fn split_flanking(content: &str) -> (&str, &str, &str) {
    let body_start = content.len() - content.trim_start().len();
    let body_end = content.trim_end().len();
    if body_start >= body_end {
        return (content, "", "");
    }
    (
        &content[..body_start],
        &content[body_start..body_end],
        &content[body_end..],
    )
}

/// Collapse flanking whitespace to at most one space, keeping line breaks
pub(crate) fn flanking_space(whitespace: &str) -> &'static str {
    if whitespace.is_empty() {
        ""
    } else if whitespace.contains('\n') {
        "\n"
    } else {
        " "
    }
}

/// Length of the longest run of `ch`
pub(crate) fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Prefix every non-blank line after the first with `indent`
pub(crate) fn indent_continuation(content: &str, indent: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for (i, line) in content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(indent);
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("  lead"), " lead");
        assert_eq!(collapse_whitespace("keep\u{a0}\u{a0}nbsp"), "keep\u{a0}\u{a0}nbsp");
    }

    #[test]
    fn test_clean_attribute() {
        assert_eq!(clean_attribute(Some("  x  ")), "x");
        assert_eq!(clean_attribute(Some("a\n\n  b")), "a b");
        assert_eq!(clean_attribute(None), "");
    }

    #[test]
    fn test_split_flanking() {
        assert_eq!(split_flanking(" bold "), (" ", "bold", " "));
        assert_eq!(split_flanking("bold"), ("", "bold", ""));
        assert_eq!(split_flanking("   "), ("   ", "", ""));
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("a ``b`` c", '`'), 2);
        assert_eq!(longest_run("none", '`'), 0);
    }

    #[test]
    fn test_indent_continuation() {
        assert_eq!(
            indent_continuation("one\ntwo\n\nthree", "    "),
            "one\n    two\n\n    three"
        );
    }
}
