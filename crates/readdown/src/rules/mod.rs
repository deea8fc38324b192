//! Rule system for DOM to Markdown conversion.

mod commonmark;
mod gfm;
mod rule;

pub use commonmark::commonmark_rules;
pub use gfm::gfm_rules;
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::IndexMap;
use readdown_dom::{descendants, is_block, is_meaningful_when_blank, is_void, Node, NodeRef, NodeType};

use crate::context::RenderContext;

/// Collection of rules for conversion.
///
/// Lookup order for an element: blank elements, custom rules in registration
/// order, built-in rules, keep filters, remove filters, then the default rule.
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Built-in CommonMark and GFM rules
    builtin_rules: Vec<Rule>,
    /// Keep filters (preserve as HTML)
    keep_filters: Vec<Filter>,
    /// Remove filters (drop entirely)
    remove_filters: Vec<Filter>,
    blank_rule: Rule,
    keep_rule: Rule,
    remove_rule: Rule,
    default_rule: Rule,
}

impl Rules {
    /// Create a new Rules instance with the built-in rules
    pub fn new() -> Self {
        let mut builtin_rules = commonmark_rules();
        builtin_rules.extend(gfm_rules());
        Self {
            custom_rules: IndexMap::new(),
            builtin_rules,
            keep_filters: Vec::new(),
            remove_filters: Vec::new(),
            blank_rule: Rule::new(Filter::predicate(|_, _, _| true), |node, _, _| {
                if is_block(node.tag_name()) {
                    "\n\n".to_string()
                } else {
                    String::new()
                }
            }),
            keep_rule: Rule::new(Filter::predicate(|_, _, _| true), |node, _, _| {
                if is_block(node.tag_name()) {
                    format!("\n\n{}\n\n", node.outer_html())
                } else {
                    node.outer_html()
                }
            }),
            remove_rule: Rule::new(Filter::predicate(|_, _, _| true), |_, _, _| String::new()),
            default_rule: Rule::new(Filter::predicate(|_, _, _| true), |node, content, _| {
                if is_block(node.tag_name()) {
                    format!("\n\n{}\n\n", content.trim_start_matches('\n').trim_end())
                } else {
                    content.to_string()
                }
            }),
        }
    }

    /// Add a custom rule, replacing any rule registered under the same key
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_filters.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_filters.push(filter);
    }

    /// Keys of the custom rules in registration order
    pub fn custom_keys(&self) -> impl Iterator<Item = &str> {
        self.custom_rules.keys().map(String::as_str)
    }

    /// Find the rule for an element. Some rule always applies.
    pub fn for_node<'a>(&'a self, node: &NodeRef<'_>, ctx: &RenderContext<'_>) -> &'a Rule {
        if is_blank(node.node) {
            return &self.blank_rule;
        }

        let tag = node.tag_name();

        if let Some(rule) = self
            .custom_rules
            .values()
            .chain(self.builtin_rules.iter())
            .find(|rule| rule.filter.matches(tag, node, ctx))
        {
            return rule;
        }

        if self.keep_filters.iter().any(|f| f.matches(tag, node, ctx)) {
            return &self.keep_rule;
        }

        if self.remove_filters.iter().any(|f| f.matches(tag, node, ctx)) {
            return &self.remove_rule;
        }

        &self.default_rule
    }

    /// Whether `rule` is the internal rule that drops elements
    pub(crate) fn is_remove_rule(&self, rule: &Rule) -> bool {
        std::ptr::eq(rule, &self.remove_rule)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

/// An element with no text and nothing that renders on its own
pub fn is_blank(node: &Node) -> bool {
    let tag = node.tag_name();
    if !node.is_element() || is_void(tag) || is_meaningful_when_blank(tag) {
        return false;
    }
    descendants(node).all(|d| match d.node_type {
        NodeType::Text => d.node_value.as_deref().unwrap_or("").trim().is_empty(),
        NodeType::Element => !is_void(d.tag_name()) && !is_meaningful_when_blank(d.tag_name()),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LinkReferences;
    use crate::options::MarkdownOptions;

    fn element_with_text(tag: &str, text: &str) -> Node {
        let mut node = Node::element(tag);
        node.add_child(Node::text(text));
        node
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&element_with_text("p", "  \n ")));
        assert!(!is_blank(&element_with_text("p", "x")));
        assert!(!is_blank(&Node::element("td")));
        assert!(!is_blank(&Node::element("br")));

        let mut p = Node::element("p");
        p.add_child(Node::element("img"));
        assert!(!is_blank(&p));
    }

    #[test]
    fn test_custom_rule_wins_and_replaces_by_key() {
        let options = MarkdownOptions::default();
        let references = LinkReferences::new();
        let ctx = RenderContext::new(&options, &references);
        let node = element_with_text("strong", "x");
        let node_ref = NodeRef::new(&node);

        let mut rules = Rules::new();
        rules.add("shout", Rule::for_tag("strong", |_, c, _| c.to_uppercase()));
        assert_eq!(rules.for_node(&node_ref, &ctx).replace(&node_ref, "x", &ctx), "X");

        rules.add("shout", Rule::for_tag("strong", |_, c, _| format!("!{c}")));
        assert_eq!(rules.custom_keys().count(), 1);
        assert_eq!(rules.for_node(&node_ref, &ctx).replace(&node_ref, "x", &ctx), "!x");
    }

    #[test]
    fn test_keep_and_remove_only_apply_to_unclaimed_elements() {
        let options = MarkdownOptions::default();
        let references = LinkReferences::new();
        let ctx = RenderContext::new(&options, &references);

        let mut rules = Rules::new();
        rules.keep(Filter::tags(&["abbr", "em"]));
        rules.remove(Filter::tag("aside"));

        let abbr = element_with_text("abbr", "HTML");
        let abbr_ref = NodeRef::new(&abbr);
        assert_eq!(
            rules.for_node(&abbr_ref, &ctx).replace(&abbr_ref, "HTML", &ctx),
            "<abbr>HTML</abbr>"
        );

        // em is claimed by the emphasis rule
        let em = element_with_text("em", "x");
        let em_ref = NodeRef::new(&em);
        assert_eq!(rules.for_node(&em_ref, &ctx).replace(&em_ref, "x", &ctx), "*x*");

        let aside = element_with_text("aside", "x");
        let aside_ref = NodeRef::new(&aside);
        assert!(rules.is_remove_rule(rules.for_node(&aside_ref, &ctx)));
    }
}
