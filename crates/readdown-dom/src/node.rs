//! DOM node structure consumed by the readdown engines.
//!
//! The shape follows the DOM `Node` interface closely enough that any parser
//! (html5ever, a browser DevTools dump, hand-built trees in tests) can be
//! mapped onto it.

use indexmap::IndexMap;

use crate::serialize;
use crate::traverse::{traverse, Edge};

/// Node types matching DOM nodeType values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element node (nodeType = 1)
    Element = 1,
    /// Text node (nodeType = 3)
    Text = 3,
    /// Comment node (nodeType = 8)
    Comment = 8,
    /// Document node (nodeType = 9)
    Document = 9,
    /// Document fragment node (nodeType = 11)
    DocumentFragment = 11,
}

impl From<u32> for NodeType {
    fn from(value: u32) -> Self {
        match value {
            3 => NodeType::Text,
            8 => NodeType::Comment,
            9 => NodeType::Document,
            11 => NodeType::DocumentFragment,
            _ => NodeType::Element,
        }
    }
}

/// A DOM node.
///
/// Element names and attribute names are stored lowercase. A tree owns all of
/// its nodes; a node never has more than one parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node type
    pub node_type: NodeType,

    /// Lowercase tag name for elements, `#text`, `#comment`, `#document`
    /// or `#document-fragment` otherwise
    pub node_name: String,

    /// Text content for text and comment nodes
    pub node_value: Option<String>,

    /// Attributes in source order
    pub attributes: IndexMap<String, String>,

    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            node_name: tag_name.to_ascii_lowercase(),
            node_value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs<'s>(
        tag_name: &str,
        attrs: impl IntoIterator<Item = (&'s str, &'s str)>,
    ) -> Self {
        let mut node = Self::element(tag_name);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::leaf(NodeType::Text, "#text", content)
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self::leaf(NodeType::Comment, "#comment", content)
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::container(NodeType::Document, "#document")
    }

    /// Create a document fragment node
    pub fn document_fragment() -> Self {
        Self::container(NodeType::DocumentFragment, "#document-fragment")
    }

    fn leaf(node_type: NodeType, name: &str, content: &str) -> Self {
        Self {
            node_type,
            node_name: name.to_string(),
            node_value: Some(content.to_string()),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    fn container(node_type: NodeType, name: &str) -> Self {
        Self {
            node_type,
            node_name: name.to_string(),
            node_value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Check if this is a comment node
    pub fn is_comment(&self) -> bool {
        self.node_type == NodeType::Comment
    }

    /// Check if this is an element with the given (lowercase) tag
    pub fn is(&self, tag: &str) -> bool {
        self.is_element() && self.node_name == tag
    }

    /// Get the tag name (lowercase)
    pub fn tag_name(&self) -> &str {
        &self.node_name
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.attributes.get(name) {
            return Some(value.as_str());
        }
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(&name.to_ascii_lowercase())
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// `class` and `id` joined, the string name heuristics match against
    pub fn class_and_id(&self) -> String {
        format!(
            "{} {}",
            self.attr("class").unwrap_or(""),
            self.attr("id").unwrap_or("")
        )
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get mutable access to the child list
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    /// First element child with the given tag
    pub fn find_child(&self, tag: &str) -> Option<&Node> {
        self.element_children().find(|c| c.node_name == tag)
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self.node_type {
            NodeType::Text => self.node_value.clone().unwrap_or_default(),
            NodeType::Comment => String::new(),
            _ => {
                let mut text = String::new();
                for edge in traverse(self) {
                    if let Edge::Open(node) = edge {
                        if node.is_text() {
                            text.push_str(node.node_value.as_deref().unwrap_or(""));
                        }
                    }
                }
                text
            }
        }
    }

    /// Serialize this node and its descendants as HTML
    pub fn outer_html(&self) -> String {
        serialize::outer_html(self)
    }

    /// Serialize the children of this node as HTML
    pub fn inner_html(&self) -> String {
        serialize::inner_html(self)
    }
}

impl Drop for Node {
    // Flatten the subtree onto a heap stack so very deep trees drop without
    // recursing once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A reference to a node with parent context.
///
/// Each `NodeRef` links to the `NodeRef` of its parent, so a recursive walk can
/// look up the ancestor chain and siblings without the tree storing parent
/// pointers.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a NodeRef<'a>>,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Create a new NodeRef without parent context
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    /// Get the parent if known
    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.map(|p| p.node.tag_name())
    }

    /// Position among the parent's children
    pub fn index(&self) -> usize {
        self.index
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = &'a NodeRef<'a>> {
        std::iter::successors(self.parent, |p| p.parent)
    }

    /// Number of ancestors
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Check whether any ancestor is an element with the given tag
    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors().any(|a| a.node.is(tag))
    }

    /// Get the child at `index` with this node as its parent
    pub fn child(&self, index: usize) -> Option<NodeRef<'_>> {
        self.node.children.get(index).map(|node| NodeRef {
            node,
            parent: Some(self),
            index,
        })
    }

    /// Iterate children with this node as their parent
    pub fn child_refs(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.node
            .children
            .iter()
            .enumerate()
            .map(move |(index, node)| NodeRef {
                node,
                parent: Some(self),
                index,
            })
    }

    /// Sibling immediately before this node
    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent?;
        let index = self.index.checked_sub(1)?;
        parent.node.children.get(index).map(|node| NodeRef {
            node,
            parent: self.parent,
            index,
        })
    }

    /// Sibling immediately after this node
    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent?;
        let index = self.index + 1;
        parent.node.children.get(index).map(|node| NodeRef {
            node,
            parent: self.parent,
            index,
        })
    }

    /// Closest preceding sibling that is an element
    pub fn previous_element_sibling(&self) -> Option<NodeRef<'a>> {
        let mut current = self.previous_sibling();
        while let Some(sibling) = current {
            if sibling.is_element() {
                return Some(sibling);
            }
            current = sibling.previous_sibling();
        }
        None
    }

    /// Closest following sibling that is an element
    pub fn next_element_sibling(&self) -> Option<NodeRef<'a>> {
        let mut current = self.next_sibling();
        while let Some(sibling) = current {
            if sibling.is_element() {
                return Some(sibling);
            }
            current = sibling.next_sibling();
        }
        None
    }

    /// Delegate to Node methods
    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn is_text(&self) -> bool {
        self.node.is_text()
    }

    pub fn is(&self, tag: &str) -> bool {
        self.node.is(tag)
    }

    pub fn tag_name(&self) -> &'a str {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.node.has_attr(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.element_children()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    pub fn outer_html(&self) -> String {
        self.node.outer_html()
    }

    pub fn inner_html(&self) -> String {
        self.node.inner_html()
    }
}
