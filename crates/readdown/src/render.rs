//! The conversion walk.
//!
//! Children are converted before their parent so every rule sees the finished
//! Markdown of its content. Fragments are joined the way turndown joins them:
//! newlines at a boundary are trimmed on both sides and replaced by the larger
//! of the two counts, capped at one blank line.

use readdown_dom::{is_block, Node, NodeRef, NodeType};
use tracing::trace;

use crate::context::{LinkReferences, RenderContext};
use crate::escape::escape;
use crate::options::{LinkReferencePlacement, MarkdownOptions};
use crate::rules::Rules;
use crate::utilities::collapse_whitespace;

/// Elements nested deeper than this are flattened to their escaped text
pub const MAX_RENDER_DEPTH: usize = 200;

pub(crate) struct Renderer<'r> {
    rules: &'r Rules,
    options: &'r MarkdownOptions,
}

impl<'r> Renderer<'r> {
    pub(crate) fn new(rules: &'r Rules, options: &'r MarkdownOptions) -> Self {
        Self { rules, options }
    }

    pub(crate) fn render(&self, root: &Node) -> String {
        let references = LinkReferences::new();
        let ctx = RenderContext::new(self.options, &references);
        let root_ref = NodeRef::new(root);

        let output = match root.node_type {
            NodeType::Element => self.process_element(&root_ref, &ctx),
            NodeType::Text => self.process_text(&root_ref, &ctx, ""),
            NodeType::Comment => String::new(),
            NodeType::Document | NodeType::DocumentFragment => {
                self.process_children(&root_ref, &ctx)
            }
        };

        self.post_process(output, &references)
    }

    fn process_children(&self, parent: &NodeRef<'_>, ctx: &RenderContext<'_>) -> String {
        let mut output = String::new();

        for child in parent.child_refs() {
            match child.node.node_type {
                NodeType::Text => {
                    let text = self.process_text(&child, ctx, &output);
                    append_inline(&mut output, &text, ctx);
                }
                NodeType::Element => {
                    let replacement = self.process_element(&child, ctx);
                    append_inline(&mut output, &replacement, ctx);

                    if self.options.link_reference_placement == LinkReferencePlacement::Block
                        && ctx.is_top_flow()
                        && is_block(child.tag_name())
                        && ctx.references().has_pending()
                    {
                        let definitions = ctx.references().take_pending().join("\n");
                        join(&mut output, &format!("\n\n{}\n\n", definitions));
                    }
                }
                _ => {}
            }
        }

        output
    }

    fn process_element(&self, node: &NodeRef<'_>, ctx: &RenderContext<'_>) -> String {
        if ctx.depth >= MAX_RENDER_DEPTH {
            trace!(
                tag = node.tag_name(),
                depth = ctx.depth,
                "flattening deeply nested subtree"
            );
            let text = escape(collapse_whitespace(&node.text_content()).trim(), ctx);
            return if is_block(node.tag_name()) {
                format!("\n\n{}\n\n", text)
            } else {
                text
            };
        }

        let inner = ctx.enter(node);
        let rule = self.rules.for_node(node, &inner);
        if self.rules.is_remove_rule(rule) {
            return String::new();
        }

        let content = self.process_children(node, &inner);
        rule.replace(node, &content, &inner)
    }

    /// Convert a text node. `output` is what its parent has produced so far.
    fn process_text(&self, node: &NodeRef<'_>, ctx: &RenderContext<'_>, output: &str) -> String {
        let raw = node.node.node_value.as_deref().unwrap_or("");
        if ctx.in_code {
            return raw.to_string();
        }

        let collapsed = collapse_whitespace(raw);
        if collapsed.trim_matches(' ').is_empty() {
            // Whitespace only survives between two inline neighbours
            let between_inline = node.previous_sibling().is_some_and(|n| is_inline(n.node))
                && node.next_sibling().is_some_and(|n| is_inline(n.node));
            return if between_inline && !output.ends_with('\n') {
                " ".to_string()
            } else {
                String::new()
            };
        }

        let starts_line = output.ends_with('\n')
            || (output.is_empty()
                && node
                    .parent()
                    .map_or(true, |parent| !parent.is_element() || is_block(parent.tag_name())));
        let text = if starts_line {
            collapsed.trim_start_matches(' ')
        } else {
            collapsed.as_str()
        };

        // Trailing space before a block sibling or at the end of a block is dropped
        let ends_block = match node.next_sibling() {
            Some(next) => next.is_element() && is_block(next.tag_name()),
            None => node
                .parent()
                .map_or(true, |parent| !parent.is_element() || is_block(parent.tag_name())),
        };
        let text = if ends_block {
            text.trim_end_matches(' ')
        } else {
            text
        };

        escape(text, ctx)
    }

    fn post_process(&self, output: String, references: &LinkReferences) -> String {
        let mut result = output.trim_start_matches('\n').trim_end().to_string();

        let definitions = references.take_pending();
        if !definitions.is_empty() {
            if !result.is_empty() {
                result.push_str("\n\n");
            }
            result.push_str(&definitions.join("\n"));
        }

        result
    }
}

fn is_inline(node: &Node) -> bool {
    match node.node_type {
        NodeType::Text => true,
        NodeType::Element => !is_block(node.tag_name()),
        _ => false,
    }
}

/// Join a fragment, letting neighbouring inline fragments share one space
fn append_inline(output: &mut String, fragment: &str, ctx: &RenderContext<'_>) {
    let fragment = if !ctx.in_code && output.ends_with(' ') && fragment.starts_with(' ') {
        &fragment[1..]
    } else {
        fragment
    };
    join(output, fragment);
}

/// Append a fragment, normalizing the newlines at the seam
pub(crate) fn join(output: &mut String, replacement: &str) {
    if replacement.is_empty() {
        return;
    }

    let body = replacement.trim_start_matches('\n');
    let leading = replacement.len() - body.len();
    let kept = output.trim_end_matches('\n').len();
    let trailing = output.len() - kept;
    let separator = leading.max(trailing).min(2);

    output.truncate(kept);
    if leading > 0 {
        // Hard-break spaces mean nothing before a block
        let trimmed = output.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
        output.truncate(trimmed);
    }
    for _ in 0..separator {
        output.push('\n');
    }
    output.push_str(body);
}
