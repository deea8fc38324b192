//! Arena copy of a [`Node`] tree for in-place editing.
//!
//! Extraction removes, moves and retags elements while it walks the document,
//! which an owned tree makes awkward. The arena stores every node once with
//! parent and child indices. A removed node is only unlinked, so ids stay valid
//! for the whole pass and can key score tables.

use readdown_dom::{traverse, Edge, Node};

pub(crate) type NodeId = usize;

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    slots: Vec<Slot>,
}

impl Dom {
    pub(crate) const ROOT: NodeId = 0;

    pub(crate) fn from_node(root: &Node) -> Self {
        let mut dom = Dom { slots: Vec::new() };
        let mut open: Vec<NodeId> = Vec::new();

        for edge in traverse(root) {
            match edge {
                Edge::Open(node) => {
                    let id = dom.push(shallow(node));
                    if let Some(&parent) = open.last() {
                        dom.slots[id].parent = Some(parent);
                        dom.slots[parent].children.push(id);
                    }
                    open.push(id);
                }
                Edge::Close(_) => {
                    open.pop();
                }
            }
        }

        dom
    }

    /// Build an owned copy of the subtree at `id`
    pub(crate) fn to_node(&self, id: NodeId) -> Node {
        let mut built: Vec<Node> = vec![shallow(&self.slots[id].node)];
        let mut stack: Vec<(NodeId, usize)> = vec![(id, 0)];

        while let Some(top) = stack.last_mut() {
            let (current, next) = *top;
            top.1 += 1;
            match self.slots[current].children.get(next) {
                Some(&child) => {
                    built.push(shallow(&self.slots[child].node));
                    stack.push((child, 0));
                }
                None => {
                    stack.pop();
                    if stack.is_empty() {
                        break;
                    }
                    if let Some(node) = built.pop() {
                        if let Some(parent) = built.last_mut() {
                            parent.add_child(node);
                        }
                    }
                }
            }
        }

        built.pop().unwrap_or_else(Node::document_fragment)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.slots.push(Slot {
            node,
            parent: None,
            children: Vec::new(),
        });
        self.slots.len() - 1
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.slots[id].node
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.slots[id].node
    }

    /// Tag name of an element, empty for other nodes
    pub(crate) fn tag(&self, id: NodeId) -> &str {
        let node = self.node(id);
        if node.is_element() {
            &node.node_name
        } else {
            ""
        }
    }

    pub(crate) fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_element()
    }

    pub(crate) fn is(&self, id: NodeId, tag: &str) -> bool {
        self.node(id).is(tag)
    }

    pub(crate) fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attr(name)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id].parent
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id].children
    }

    pub(crate) fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    /// Number of slots, attached or not
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&s| s == id)?;
        siblings.get(index + 1).copied()
    }

    pub(crate) fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&s| s == id)?;
        siblings[index + 1..]
            .iter()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// Every node below `id` in document order
    pub(crate) fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Elements below `id` whose tag is one of `tags`, in document order
    pub(crate) fn elements_by_tag(&self, id: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&d| self.is_element(d) && tags.contains(&self.tag(d)))
            .collect()
    }

    pub(crate) fn first_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id).find(|&d| self.is(d, tag))
    }

    pub(crate) fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Whether an ancestor within `max_depth` levels (all levels when `None`)
    /// has the tag and passes `filter`
    pub(crate) fn has_ancestor_where(
        &self,
        id: NodeId,
        tag: &str,
        max_depth: Option<usize>,
        filter: impl Fn(NodeId) -> bool,
    ) -> bool {
        self.ancestors(id)
            .take(max_depth.unwrap_or(usize::MAX))
            .any(|a| self.is(a, tag) && filter(a))
    }

    pub(crate) fn has_ancestor(&self, id: NodeId, tag: &str) -> bool {
        self.has_ancestor_where(id, tag, None, |_| true)
    }

    /// Whether the node is still linked under the root
    pub(crate) fn is_attached(&self, id: NodeId) -> bool {
        id == Self::ROOT || self.ancestors(id).any(|a| a == Self::ROOT)
    }

    /// Raw concatenated text of the subtree
    pub(crate) fn text_content(&self, id: NodeId) -> String {
        if self.node(id).is_text() {
            return self.node(id).node_value.clone().unwrap_or_default();
        }
        let mut text = String::new();
        for d in self.descendants(id) {
            let node = self.node(d);
            if node.is_text() {
                text.push_str(node.node_value.as_deref().unwrap_or(""));
            }
        }
        text
    }

    /// Trimmed text with whitespace runs collapsed to one space
    pub(crate) fn inner_text(&self, id: NodeId) -> String {
        normalize_spaces(&self.text_content(id))
    }

    /// Share of the text that sits inside links; in-page links count less
    pub(crate) fn link_density(&self, id: NodeId) -> f64 {
        let text_length = self.inner_text(id).chars().count();
        if text_length == 0 {
            return 0.0;
        }

        let link_length: f64 = self
            .elements_by_tag(id, &["a"])
            .into_iter()
            .map(|a| {
                let coefficient = match self.attr(a, "href") {
                    Some(href) if href.starts_with('#') => 0.3,
                    _ => 1.0,
                };
                self.inner_text(a).chars().count() as f64 * coefficient
            })
            .sum();

        link_length / text_length as f64
    }

    /// Create an element that is not linked anywhere yet
    pub(crate) fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    pub(crate) fn set_tag(&mut self, id: NodeId, tag: &str) {
        self.node_mut(id).node_name = tag.to_ascii_lowercase();
    }

    /// Unlink a node from its parent
    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id].parent.take() {
            self.slots[parent].children.retain(|&c| c != id);
        }
    }

    /// Move `child` to the end of `parent`'s children
    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.slots[child].parent = Some(parent);
        self.slots[parent].children.push(child);
    }

    /// Move `node` in front of `reference`
    pub(crate) fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(node);
        let index = self.slots[parent]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(0);
        self.slots[node].parent = Some(parent);
        self.slots[parent].children.insert(index, node);
    }

    /// Put `replacement` where `old` was
    pub(crate) fn replace(&mut self, old: NodeId, replacement: NodeId) {
        self.insert_before(old, replacement);
        self.detach(old);
    }

    /// Replace a node with its own children
    pub(crate) fn unwrap(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.insert_before(id, child);
        }
        self.detach(id);
    }

    /// Position of every attached node in document order
    pub(crate) fn document_order(&self) -> Vec<usize> {
        let mut order = vec![usize::MAX; self.slots.len()];
        order[Self::ROOT] = 0;
        for (position, id) in self.descendants(Self::ROOT).enumerate() {
            order[id] = position + 1;
        }
        order
    }

    /// Number of attached elements
    pub(crate) fn element_count(&self) -> usize {
        self.descendants(Self::ROOT)
            .filter(|&d| self.is_element(d))
            .count()
    }

    /// The `<body>` element, or the root for fragments
    pub(crate) fn body(&self) -> NodeId {
        self.first_by_tag(Self::ROOT, "body").unwrap_or(Self::ROOT)
    }

    /// The next element after `id` in document order, skipping its subtree
    /// when `skip_children` is set
    pub(crate) fn next_element(&self, id: NodeId, skip_children: bool) -> Option<NodeId> {
        if !skip_children {
            if let Some(&child) = self.children(id).iter().find(|&&c| self.is_element(c)) {
                return Some(child);
            }
        }
        let mut current = id;
        loop {
            if let Some(sibling) = self.next_element_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    /// Remove `id` and return the element the walk continues with
    pub(crate) fn remove_and_next(&mut self, id: NodeId) -> Option<NodeId> {
        let next = self.next_element(id, true);
        self.detach(id);
        next
    }
}

/// Pre-order walk below a node, see [`Dom::descendants`]
pub(crate) struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.dom.children(current).iter().rev().copied());
        Some(current)
    }
}

/// Copy a node without its children
fn shallow(node: &Node) -> Node {
    Node {
        node_type: node.node_type,
        node_name: node.node_name.clone(),
        node_value: node.node_value.clone(),
        attributes: node.attributes.clone(),
        children: Vec::new(),
    }
}

/// Trim and collapse whitespace runs to a single space
pub(crate) fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
