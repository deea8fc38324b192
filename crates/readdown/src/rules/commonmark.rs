//! CommonMark rules for DOM to Markdown conversion.

use readdown_dom::{is_block, traverse, Edge, Node, NodeRef};

use super::{Filter, Rule};
use crate::context::RenderContext;
use crate::options::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle};
use crate::utilities::{
    clean_attribute, flanking_space, indent_continuation, longest_run, split_flanking,
};

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        non_content_rule(),
        block_anchor_rule(),
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        indented_code_block_rule(),
        fenced_code_block_rule(),
        horizontal_rule(),
        inline_link_rule(),
        reference_link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn non_content_rule() -> Rule {
    Rule::for_tags(&["script", "style", "noscript", "template", "head"], |_, _, _| {
        String::new()
    })
}

/// A link wrapped around a single block renders as that block
fn block_anchor_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "a" && wraps_single_block(node.node)),
        |_, content, _| content.to_string(),
    )
}

fn wraps_single_block(node: &Node) -> bool {
    let mut significant = node.children().filter(|child| {
        child.is_element()
            || (child.is_text() && !child.node_value.as_deref().unwrap_or("").trim().is_empty())
    });
    match (significant.next(), significant.next()) {
        (Some(only), None) => only.is_element() && is_block(only.tag_name()),
        _ => false,
    }
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content.trim()))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, ctx| {
        if ctx.in_table_cell {
            ctx.options.table_cell_break.clone()
        } else {
            format!("{}\n", ctx.options.br)
        }
    })
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |node, content, ctx| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        // Headings are a single line
        let content = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if content.is_empty() {
            return String::new();
        }

        match ctx.options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    underline.repeat(content.chars().count().max(3))
                )
            }
            _ => format!("\n\n{} {}\n\n", "#".repeat(level), content),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = content.trim_matches('\n').trim_end();
        if content.trim().is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        let content = content.trim_matches('\n');

        // A list closing its parent item continues that item
        let ends_item = node.parent().is_some_and(|p| p.is("li"))
            && node.next_element_sibling().is_none();

        if ends_item {
            format!("\n{}", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, ctx| {
        let marker = list_marker(node, ctx);
        let indent = " ".repeat(marker.len());
        let body = indent_continuation(content.trim_start_matches('\n').trim_end(), &indent);
        format!("{}{}\n", marker, body)
    })
}

/// Marker padded so item content starts at a fixed column
fn list_marker(node: &NodeRef<'_>, ctx: &RenderContext<'_>) -> String {
    let marker = match node.parent() {
        Some(parent) if parent.is("ol") => {
            let start = parent
                .attr("start")
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(1);
            let position = parent.node.children[..node.index()]
                .iter()
                .filter(|sibling| sibling.is("li"))
                .count() as i64;
            format!(
                "{}{}",
                start + position,
                ctx.options.ordered_list_delimiter.as_char()
            )
        }
        _ => ctx.options.bullet_list_marker.to_string(),
    };
    let width = (marker.len() + 1).max(4);
    format!("{:<width$}", marker, width = width)
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, ctx| {
            tag == "pre" && ctx.options.code_block_style == CodeBlockStyle::Indented
        }),
        |node, _, _| {
            let code = code_block_text(node.node);
            let code = code.strip_suffix('\n').unwrap_or(&code);
            let indented: Vec<String> = code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("    {}", line)
                    }
                })
                .collect();
            format!("\n\n{}\n\n", indented.join("\n"))
        },
    )
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, ctx| {
            tag == "pre" && ctx.options.code_block_style == CodeBlockStyle::Fenced
        }),
        |node, _, ctx| {
            let code = code_block_text(node.node);
            let code = code.strip_suffix('\n').unwrap_or(&code);
            let language = code_language(node);

            // The fence must be longer than any fence-like run in the code
            let fence_char = ctx.options.fence_char();
            let fence_len = ctx
                .options
                .fence
                .chars()
                .count()
                .max(longest_run(code, fence_char) + 1);
            let fence = fence_char.to_string().repeat(fence_len);

            format!("\n\n{}{}\n{}\n{}\n\n", fence, language, code, fence)
        },
    )
}

/// Text of a code block with `<br>` as newlines
fn code_block_text(node: &Node) -> String {
    let mut text = String::new();
    for edge in traverse(node) {
        if let Edge::Open(child) = edge {
            if child.is_text() {
                text.push_str(child.node_value.as_deref().unwrap_or(""));
            } else if child.is("br") {
                text.push('\n');
            }
        }
    }
    text
}

/// `language-*` or `lang-*` class on the code element or the pre itself
fn code_language<'a>(node: &NodeRef<'a>) -> &'a str {
    let from_classes = |n: &'a Node| {
        n.class_list().find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
    };
    node.node
        .find_child("code")
        .and_then(from_classes)
        .or_else(|| from_classes(node.node))
        .unwrap_or("")
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, ctx| format!("\n\n{}\n\n", ctx.options.hr))
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, ctx| {
            tag == "a" && node.has_attr("href") && ctx.options.link_style == LinkStyle::Inlined
        }),
        |node, content, _| {
            let href = clean_attribute(node.attr("href"));
            if href.is_empty() {
                return content.to_string();
            }

            let (lead, text, trail) = split_flanking(content);
            format!(
                "{}[{}]({}{}){}",
                flanking_space(lead),
                text,
                link_destination(&href),
                title_part(link_title(node).as_deref()),
                flanking_space(trail)
            )
        },
    )
}

fn reference_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, ctx| {
            tag == "a" && node.has_attr("href") && ctx.options.link_style == LinkStyle::Referenced
        }),
        |node, content, ctx| {
            let href = clean_attribute(node.attr("href"));
            if href.is_empty() {
                return content.to_string();
            }

            let (lead, text, trail) = split_flanking(content);
            let title = link_title(node);
            let link = reference(text, &link_destination(&href), title.as_deref(), ctx);
            format!("{}{}{}", flanking_space(lead), link, flanking_space(trail))
        },
    )
}

/// `[label][n]`, `[label][]` or `[label]`, recording the definition
fn reference(label: &str, href: &str, title: Option<&str>, ctx: &RenderContext<'_>) -> String {
    let references = ctx.references();
    match ctx.options.link_reference_style {
        LinkReferenceStyle::Collapsed if !label.is_empty() => {
            references.labeled(label, href, title);
            format!("[{}][]", label)
        }
        LinkReferenceStyle::Shortcut if !label.is_empty() => {
            references.labeled(label, href, title);
            format!("[{}]", label)
        }
        _ => {
            let number = references.numbered(href, title);
            format!("[{}][{}]", label, number)
        }
    }
}

fn link_title(node: &NodeRef<'_>) -> Option<String> {
    let title = clean_attribute(node.attr("title"));
    (!title.is_empty()).then_some(title)
}

fn title_part(title: Option<&str>) -> String {
    title
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default()
}

/// Escape parentheses; wrap in angle brackets when the URL has spaces
fn link_destination(href: &str) -> String {
    let escaped = href.replace('(', "\\(").replace(')', "\\)");
    if escaped.contains(char::is_whitespace) {
        format!("<{}>", escaped.replace('<', "%3C").replace('>', "%3E"))
    } else {
        escaped
    }
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, ctx| {
        wrap_delimited(content, &ctx.options.em_delimiter.to_string())
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, ctx| {
        wrap_delimited(content, &ctx.options.strong_delimiter)
    })
}

/// Wrap content in a delimiter, moving flanking whitespace outside it
pub(super) fn wrap_delimited(content: &str, delimiter: &str) -> String {
    let (lead, body, trail) = split_flanking(content);
    if body.is_empty() {
        return flanking_space(lead).to_string();
    }
    format!(
        "{}{}{}{}{}",
        flanking_space(lead),
        delimiter,
        body,
        delimiter,
        flanking_space(trail)
    )
}

fn code_rule() -> Rule {
    Rule::new(
        // Code inside <pre> belongs to the code block
        Filter::predicate(|tag, _, ctx| tag == "code" && !ctx.in_pre),
        |node, _, _| inline_code(&node.text_content()),
    )
}

/// Wrap text in a backtick fence longer than any run inside it
pub(super) fn inline_code(text: &str) -> String {
    let text = text.replace(&['\r', '\n'][..], " ");
    if text.is_empty() {
        return String::new();
    }

    let fence = "`".repeat(longest_run(&text, '`') + 1);
    let needs_space = text.starts_with('`')
        || text.ends_with('`')
        || (text.starts_with(' ') && text.ends_with(' ') && !text.trim().is_empty());

    if needs_space {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, ctx| {
        let src = clean_attribute(node.attr("src"));
        if src.is_empty() {
            return String::new();
        }

        let alt = clean_attribute(node.attr("alt"))
            .replace('[', "\\[")
            .replace(']', "\\]");
        let title = link_title(node);

        match ctx.options.link_style {
            LinkStyle::Inlined => format!(
                "![{}]({}{})",
                alt,
                link_destination(&src),
                title_part(title.as_deref())
            ),
            LinkStyle::Referenced => format!(
                "!{}",
                reference(&alt, &link_destination(&src), title.as_deref(), ctx)
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_code_fences() {
        assert_eq!(inline_code("code"), "`code`");
        assert_eq!(inline_code("a `b` c"), "``a `b` c``");
        assert_eq!(inline_code("`tick"), "`` `tick ``");
        assert_eq!(inline_code(" padded "), "`  padded  `");
        assert_eq!(inline_code(""), "");
    }

    #[test]
    fn test_wrap_delimited_moves_whitespace_out() {
        assert_eq!(wrap_delimited(" bold ", "**"), " **bold** ");
        assert_eq!(wrap_delimited("x", "*"), "*x*");
        assert_eq!(wrap_delimited("  ", "*"), " ");
    }

    #[test]
    fn test_link_destination() {
        assert_eq!(link_destination("https://a.example/x_(y)"), "https://a.example/x_\\(y\\)");
        assert_eq!(link_destination("my file.html"), "<my file.html>");
    }

    #[test]
    fn test_code_language() {
        let mut pre = Node::element("pre");
        pre.add_child(Node::element_with_attrs("code", vec![("class", "hl language-rust")]));
        assert_eq!(code_language(&NodeRef::new(&pre)), "rust");

        let pre = Node::element_with_attrs("pre", vec![("class", "lang-js")]);
        assert_eq!(code_language(&NodeRef::new(&pre)), "js");
    }

    #[test]
    fn test_code_block_text_keeps_breaks() {
        let mut pre = Node::element("pre");
        pre.add_child(Node::text("a"));
        pre.add_child(Node::element("br"));
        pre.add_child(Node::text("b"));
        assert_eq!(code_block_text(&pre), "a\nb");
    }
}
