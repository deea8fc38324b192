//! Iterative tree traversal.
//!
//! [`traverse`] yields an [`Edge::Open`] when a node is entered and an
//! [`Edge::Close`] once all of its descendants have been visited, in document
//! order. The walk keeps its own stack, so depth is bounded only by memory.

use crate::node::Node;

/// An edge of a depth-first walk
#[derive(Debug, Clone, Copy)]
pub enum Edge<'a> {
    /// Entering a node
    Open(&'a Node),
    /// Leaving a node after its descendants
    Close(&'a Node),
}

/// Open/close iterator over a subtree, root included
pub struct Traverse<'a> {
    root: Option<&'a Node>,
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Edge<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.stack.push((root, 0));
            return Some(Edge::Open(root));
        }

        let (node, next_child) = self.stack.last_mut()?;
        let node: &'a Node = *node;
        if let Some(child) = node.children.get(*next_child) {
            *next_child += 1;
            self.stack.push((child, 0));
            return Some(Edge::Open(child));
        }

        self.stack.pop();
        Some(Edge::Close(node))
    }
}

/// Walk a subtree, yielding open and close edges in document order
pub fn traverse(root: &Node) -> Traverse<'_> {
    Traverse {
        root: Some(root),
        stack: Vec::new(),
    }
}

/// Pre-order iterator over the descendants of a node, root excluded
pub struct Descendants<'a> {
    inner: Traverse<'a>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Edge::Open(node) => return Some(node),
                Edge::Close(_) => continue,
            }
        }
    }
}

/// Iterate every descendant of `root` in document order
pub fn descendants(root: &Node) -> Descendants<'_> {
    let mut inner = traverse(root);
    // Skip the root's own open edge.
    inner.next();
    Descendants { inner }
}
