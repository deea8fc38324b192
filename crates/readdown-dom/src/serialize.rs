//! HTML serialization of a [`Node`] tree.

use crate::elements::{is_raw_text, is_void};
use crate::node::{Node, NodeType};
use crate::traverse::{traverse, Edge};

/// Serialize a node and its subtree
pub(crate) fn outer_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Serialize only the children of a node
pub(crate) fn inner_html(node: &Node) -> String {
    let mut out = String::new();
    for child in node.children() {
        write_node(child, &mut out);
    }
    out
}

fn write_node(root: &Node, out: &mut String) {
    // Open raw-text elements (script/style) around the current position
    let mut raw_depth = 0usize;

    for edge in traverse(root) {
        match edge {
            Edge::Open(node) => match node.node_type {
                NodeType::Text => {
                    let text = node.node_value.as_deref().unwrap_or("");
                    if raw_depth > 0 {
                        out.push_str(text);
                    } else {
                        out.push_str(&escape_text(text));
                    }
                }
                NodeType::Comment => {
                    out.push_str("<!--");
                    out.push_str(node.node_value.as_deref().unwrap_or(""));
                    out.push_str("-->");
                }
                NodeType::Element => {
                    open_tag(node, out);
                    if is_raw_text(node.tag_name()) {
                        raw_depth += 1;
                    }
                }
                NodeType::Document | NodeType::DocumentFragment => {}
            },
            Edge::Close(node) => {
                if node.is_element() {
                    if is_raw_text(node.tag_name()) {
                        raw_depth = raw_depth.saturating_sub(1);
                    }
                    if !is_void(node.tag_name()) {
                        out.push_str("</");
                        out.push_str(node.tag_name());
                        out.push('>');
                    }
                }
            }
        }
    }
}

fn open_tag(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(node.tag_name());
    for (name, value) in &node.attributes {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
    out.push('>');
}

/// Escape text content for HTML output
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape HTML attribute value
pub fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outer_html() {
        let mut a = Node::element_with_attrs("a", vec![("href", "https://example.com")]);
        a.add_child(Node::text("Link"));

        assert_eq!(a.outer_html(), "<a href=\"https://example.com\">Link</a>");
    }

    #[test]
    fn test_void_element_html() {
        let br = Node::element("br");
        assert_eq!(br.outer_html(), "<br>");

        let img = Node::element_with_attrs("img", vec![("src", "test.png"), ("alt", "Test")]);
        assert_eq!(img.outer_html(), "<img src=\"test.png\" alt=\"Test\">");
    }

    #[test]
    fn test_text_is_escaped() {
        let mut p = Node::element("p");
        p.add_child(Node::text("a < b && c > \"d\""));
        assert_eq!(p.outer_html(), "<p>a &lt; b &amp;&amp; c &gt; \"d\"</p>");
    }

    #[test]
    fn test_attribute_is_escaped() {
        let div = Node::element_with_attrs("div", vec![("title", "say \"hi\" & <go>"), ("hidden", "")]);
        assert_eq!(
            div.outer_html(),
            "<div title=\"say &quot;hi&quot; &amp; &lt;go&gt;\" hidden></div>"
        );
    }

    #[test]
    fn test_script_text_is_raw() {
        let mut script = Node::element("script");
        script.add_child(Node::text("if (a < b) {}"));
        assert_eq!(script.outer_html(), "<script>if (a < b) {}</script>");
    }

    #[test]
    fn test_inner_html_and_comments() {
        let mut div = Node::element("div");
        div.add_child(Node::comment(" note "));
        let mut em = Node::element("em");
        em.add_child(Node::text("x"));
        div.add_child(em);
        assert_eq!(div.inner_html(), "<!-- note --><em>x</em>");
    }

    #[test]
    fn test_document_wrappers_are_transparent() {
        let mut doc = Node::document();
        let mut html = Node::element("html");
        html.add_child(Node::element("body"));
        doc.add_child(html);
        assert_eq!(doc.outer_html(), "<html><body></body></html>");
    }
}
