//! Text and element totals for every subtree.
//!
//! Scoring and cleanup ask the same questions of nested containers again and
//! again: how much text sits below, how many commas, how much of it is linked,
//! how many paragraphs or images. A [`Tally`] answers from the children's
//! totals, so each node is folded once. Removing a node through the tally
//! marks its ancestors stale and they are folded again on the next lookup.

use std::collections::HashSet;

use crate::cleanup::is_video_embed;
use crate::dom::{Dom, NodeId};
use crate::patterns::{COMMAS, HEADINGS};

/// Length of text with whitespace runs collapsed, plus its edges, so two runs
/// can be joined without looking at the text again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Run {
    chars: usize,
    leading_space: bool,
    trailing_space: bool,
}

impl Run {
    fn of(text: &str) -> Self {
        let mut chars = 0;
        let mut in_space = false;
        for c in text.chars() {
            let space = c.is_whitespace();
            if !(space && in_space) {
                chars += 1;
            }
            in_space = space;
        }
        Run {
            chars,
            leading_space: text.starts_with(char::is_whitespace),
            trailing_space: in_space,
        }
    }

    fn then(self, next: Run) -> Run {
        if self.chars == 0 {
            return next;
        }
        if next.chars == 0 {
            return self;
        }
        let shared = usize::from(self.trailing_space && next.leading_space);
        Run {
            chars: self.chars + next.chars - shared,
            leading_space: self.leading_space,
            trailing_space: next.trailing_space,
        }
    }

    fn trimmed(self) -> usize {
        self.chars
            .saturating_sub(usize::from(self.leading_space) + usize::from(self.trailing_space))
    }
}

/// What lies below one node, the node itself excluded
#[derive(Debug, Clone, Default)]
pub(crate) struct Totals {
    text: Run,
    link_chars: f64,
    pub commas: usize,
    pub paragraphs: usize,
    pub images: usize,
    pub list_items: usize,
    pub inputs: usize,
    /// `object`, `embed` and `iframe` elements that are not videos
    pub embeds: usize,
    pub heading_chars: usize,
    pub list_chars: usize,
    pub has_pre: bool,
    pub has_data_table: bool,
}

impl Totals {
    /// Same as the character count of [`Dom::inner_text`]
    pub(crate) fn text_length(&self) -> usize {
        self.text.trimmed()
    }

    /// Same as [`Dom::link_density`]
    pub(crate) fn link_density(&self) -> f64 {
        match self.text_length() {
            0 => 0.0,
            length => self.link_chars / length as f64,
        }
    }

    fn add(&mut self, other: &Totals) {
        self.text = self.text.then(other.text);
        self.link_chars += other.link_chars;
        self.commas += other.commas;
        self.paragraphs += other.paragraphs;
        self.images += other.images;
        self.list_items += other.list_items;
        self.inputs += other.inputs;
        self.embeds += other.embeds;
        self.heading_chars += other.heading_chars;
        self.list_chars += other.list_chars;
        self.has_pre |= other.has_pre;
        self.has_data_table |= other.has_data_table;
    }
}

/// Lazily folded [`Totals`] for the nodes of one [`Dom`]
pub(crate) struct Tally<'a> {
    totals: Vec<Totals>,
    fresh: Vec<bool>,
    data_tables: &'a HashSet<NodeId>,
}

impl<'a> Tally<'a> {
    pub(crate) fn new(dom: &Dom, data_tables: &'a HashSet<NodeId>) -> Self {
        Self {
            totals: vec![Totals::default(); dom.len()],
            fresh: vec![false; dom.len()],
            data_tables,
        }
    }

    /// Totals below `id`, folding whatever is stale
    pub(crate) fn get(&mut self, dom: &Dom, id: NodeId) -> &Totals {
        if self.totals.len() < dom.len() {
            self.totals.resize(dom.len(), Totals::default());
            self.fresh.resize(dom.len(), false);
        }

        let mut stack = vec![(id, false)];
        while let Some((current, children_ready)) = stack.pop() {
            if self.fresh[current] {
                continue;
            }
            if children_ready {
                let mut totals = Totals::default();
                for &child in dom.children(current) {
                    totals.add(&self.contribution(dom, child));
                }
                self.totals[current] = totals;
                self.fresh[current] = true;
            } else {
                stack.push((current, true));
                stack.extend(
                    dom.children(current)
                        .iter()
                        .filter(|&&child| !self.fresh[child])
                        .map(|&child| (child, false)),
                );
            }
        }

        &self.totals[id]
    }

    /// Detach `id` from the document and mark everything above it stale
    pub(crate) fn detach(&mut self, dom: &mut Dom, id: NodeId) {
        let mut above = dom.parent(id);
        dom.detach(id);
        while let Some(ancestor) = above {
            // Everything above a stale node is already stale
            if !self.fresh.get(ancestor).copied().unwrap_or(false) {
                break;
            }
            self.fresh[ancestor] = false;
            above = dom.parent(ancestor);
        }
    }

    /// A child's totals together with what the child itself adds
    fn contribution(&self, dom: &Dom, id: NodeId) -> Totals {
        let node = dom.node(id);
        if node.is_text() {
            let text = node.node_value.as_deref().unwrap_or("");
            return Totals {
                text: Run::of(text),
                commas: COMMAS.find_iter(text).count(),
                ..Totals::default()
            };
        }

        let mut totals = self.totals[id].clone();
        if !node.is_element() {
            return totals;
        }

        let own = totals.text_length();
        match dom.tag(id) {
            "p" => totals.paragraphs += 1,
            "img" => totals.images += 1,
            "li" => totals.list_items += 1,
            "input" => totals.inputs += 1,
            "pre" => totals.has_pre = true,
            "ul" | "ol" => totals.list_chars += own,
            "table" if self.data_tables.contains(&id) => totals.has_data_table = true,
            "object" | "embed" | "iframe" if !is_video_embed(dom, id) => totals.embeds += 1,
            "a" => {
                let coefficient = match node.attr("href") {
                    Some(href) if href.starts_with('#') => 0.3,
                    _ => 1.0,
                };
                totals.link_chars += own as f64 * coefficient;
            }
            tag if HEADINGS.contains(&tag) => totals.heading_chars += own,
            _ => {}
        }
        totals
    }
}
