//! HTML parsing support.
//!
//! This module parses HTML strings with scraper/html5ever and converts the
//! result to the [`Node`] structure used by the readdown engines. Entities are
//! decoded by the parser and malformed markup is repaired by it, so the engines
//! only ever see a well-formed tree.

use ego_tree::iter::Edge as TreeEdge;
use scraper::{Html, Node as ScraperNode};

use crate::node::Node;

/// Parse an HTML fragment into a Node tree.
///
/// The returned root is the `html` element html5ever wraps fragments in.
///
/// # Example
///
/// ```rust
/// use readdown_dom::parse_html;
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
/// assert_eq!(node.tag_name(), "html");
/// assert_eq!(node.text_content(), "Hello World");
/// ```
pub fn parse_html(html: &str) -> Node {
    let fragment = Html::parse_fragment(html);
    convert(*fragment.root_element())
}

/// Parse a complete HTML document into a Node tree.
///
/// The returned root is a `#document` node holding `<html>` with its `<head>`
/// and `<body>`.
pub fn parse_document(html: &str) -> Node {
    let document = Html::parse_document(html);
    convert(document.tree.root())
}

/// Convert a scraper subtree to our Node structure without recursing
fn convert(root: ego_tree::NodeRef<'_, ScraperNode>) -> Node {
    let mut open: Vec<Node> = Vec::new();
    let mut finished = Node::document_fragment();

    for edge in root.traverse() {
        match edge {
            TreeEdge::Open(tree_node) => {
                if let Some(node) = to_node(tree_node.value()) {
                    open.push(node);
                }
            }
            TreeEdge::Close(tree_node) => {
                if !is_converted(tree_node.value()) {
                    continue;
                }
                let Some(node) = open.pop() else {
                    continue;
                };
                match open.last_mut() {
                    Some(parent) => parent.add_child(node),
                    None => finished = node,
                }
            }
        }
    }

    finished
}

fn to_node(value: &ScraperNode) -> Option<Node> {
    match value {
        ScraperNode::Document => Some(Node::document()),
        ScraperNode::Fragment => Some(Node::document_fragment()),
        ScraperNode::Element(element) => Some(Node::element_with_attrs(
            element.name(),
            element.attrs(),
        )),
        ScraperNode::Text(text) => Some(Node::text(&text.text)),
        ScraperNode::Comment(comment) => Some(Node::comment(&comment.comment)),
        _ => None,
    }
}

fn is_converted(value: &ScraperNode) -> bool {
    matches!(
        value,
        ScraperNode::Document
            | ScraperNode::Fragment
            | ScraperNode::Element(_)
            | ScraperNode::Text(_)
            | ScraperNode::Comment(_)
    )
}
