//! Per-call rendering state.

use std::cell::RefCell;

use indexmap::{IndexMap, IndexSet};
use readdown_dom::NodeRef;

use crate::options::MarkdownOptions;

/// State threaded through one render call.
///
/// A fresh context is derived for every element with [`RenderContext::enter`];
/// siblings never see each other's changes, and nothing outlives the call.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Options of the service doing the rendering
    pub options: &'a MarkdownOptions,
    references: &'a LinkReferences,
    /// Number of enclosing `ul`/`ol` elements
    pub list_depth: usize,
    /// Whether the innermost enclosing list is ordered
    pub ordered: bool,
    /// Number of enclosing `blockquote` elements
    pub blockquote_depth: usize,
    /// Inside a `pre` element
    pub in_pre: bool,
    /// Inside `pre`, `code` or `mark`; text is emitted raw
    pub in_code: bool,
    /// Inside a table cell
    pub in_table_cell: bool,
    /// Element nesting depth from the render root
    pub depth: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(options: &'a MarkdownOptions, references: &'a LinkReferences) -> Self {
        Self {
            options,
            references,
            list_depth: 0,
            ordered: false,
            blockquote_depth: 0,
            in_pre: false,
            in_code: false,
            in_table_cell: false,
            depth: 0,
        }
    }

    /// Context for the children of `node`
    pub fn enter(&self, node: &NodeRef<'_>) -> Self {
        let mut inner = *self;
        inner.depth += 1;
        match node.tag_name() {
            "pre" => {
                inner.in_pre = true;
                inner.in_code = true;
            }
            "code" | "mark" => inner.in_code = true,
            "ul" => {
                inner.list_depth += 1;
                inner.ordered = false;
            }
            "ol" => {
                inner.list_depth += 1;
                inner.ordered = true;
            }
            "blockquote" => inner.blockquote_depth += 1,
            "td" | "th" => inner.in_table_cell = true,
            _ => {}
        }
        inner
    }

    /// Reference definitions collected during this call
    pub fn references(&self) -> &'a LinkReferences {
        self.references
    }

    /// Outside lists, quotes, code and tables
    pub fn is_top_flow(&self) -> bool {
        self.list_depth == 0 && self.blockquote_depth == 0 && !self.in_pre && !self.in_table_cell
    }
}

/// Reference-style link definitions gathered while rendering.
///
/// Numbered labels are assigned once per distinct destination and title, so
/// repeated links share a definition.
#[derive(Debug, Default)]
pub struct LinkReferences {
    numbers: RefCell<IndexMap<(String, String), usize>>,
    labels: RefCell<IndexSet<String>>,
    pending: RefCell<Vec<String>>,
}

impl LinkReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number for a destination, defining it on first use
    pub fn numbered(&self, href: &str, title: Option<&str>) -> usize {
        let key = (href.to_string(), title.unwrap_or_default().to_string());
        let mut numbers = self.numbers.borrow_mut();
        if let Some(number) = numbers.get(&key) {
            return *number;
        }
        let number = numbers.len() + 1;
        numbers.insert(key, number);
        self.pending
            .borrow_mut()
            .push(definition(&number.to_string(), href, title));
        number
    }

    /// Define a text label unless one with the same text exists
    pub fn labeled(&self, label: &str, href: &str, title: Option<&str>) {
        if !self.labels.borrow_mut().insert(label.to_string()) {
            return;
        }
        self.pending.borrow_mut().push(definition(label, href, title));
    }

    /// Definitions not yet written, in first-use order
    pub fn take_pending(&self) -> Vec<String> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }
}

fn definition(label: &str, href: &str, title: Option<&str>) -> String {
    match title {
        Some(title) => format!("[{}]: {} \"{}\"", label, href, title.replace('"', "\\\"")),
        None => format!("[{}]: {}", label, href),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readdown_dom::Node;

    #[test]
    fn test_enter_tracks_nesting() {
        let options = MarkdownOptions::default();
        let references = LinkReferences::new();
        let ctx = RenderContext::new(&options, &references);

        let ol = Node::element("ol");
        let ul = Node::element("ul");
        let pre = Node::element("pre");

        let inner = ctx.enter(&NodeRef::new(&ol)).enter(&NodeRef::new(&ul));
        assert_eq!(inner.list_depth, 2);
        assert!(!inner.ordered);
        assert_eq!(inner.depth, 2);
        assert!(!inner.is_top_flow());

        let code = ctx.enter(&NodeRef::new(&pre));
        assert!(code.in_pre && code.in_code);

        // The parent context is untouched
        assert_eq!(ctx.list_depth, 0);
        assert!(ctx.is_top_flow());
    }

    #[test]
    fn test_numbered_references_are_shared() {
        let references = LinkReferences::new();
        assert_eq!(references.numbered("https://a.example", None), 1);
        assert_eq!(references.numbered("https://b.example", Some("B")), 2);
        assert_eq!(references.numbered("https://a.example", None), 1);

        assert_eq!(
            references.take_pending(),
            vec![
                "[1]: https://a.example".to_string(),
                "[2]: https://b.example \"B\"".to_string(),
            ]
        );
        assert!(!references.has_pending());

        // Numbering continues after a flush
        assert_eq!(references.numbered("https://c.example", None), 3);
    }

    #[test]
    fn test_labeled_references() {
        let references = LinkReferences::new();
        references.labeled("Docs", "https://docs.example", None);
        references.labeled("Docs", "https://other.example", None);
        assert_eq!(references.take_pending(), vec!["[Docs]: https://docs.example"]);
    }
}
