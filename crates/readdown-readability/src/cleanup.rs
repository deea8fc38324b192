//! Cleanup of the merged article content.
//!
//! Runs on the detached content `div` only. Data tables, code blocks and
//! figures are left intact; everything else that looks like page furniture is
//! removed.

use std::collections::HashSet;

use tracing::trace;

use crate::dom::{Dom, NodeId};
use crate::extract::is_whitespace;
use crate::options::ReadabilityOptions;
use crate::patterns::{DEPRECATED_SIZE_ELEMENTS, PRESENTATIONAL_ATTRIBUTES, SHARE_ELEMENTS, VIDEOS};
use crate::scoring::{class_weight, Flags};
use crate::tally::Tally;

/// Share widgets with more text than this are left alone
const SHARE_ELEMENT_THRESHOLD: usize = 500;

/// Clean the article content in place
pub(crate) fn prepare_article(
    dom: &mut Dom,
    article: NodeId,
    flags: Flags,
    options: &ReadabilityOptions,
) {
    clean_styles(dom, article);
    let data_tables = mark_data_tables(dom, article);
    let conditional = Conditional {
        flags,
        options,
        data_tables: &data_tables,
    };

    conditional.clean(dom, article, &["form", "fieldset"]);
    remove_embeds(dom, article, &["object", "embed", "iframe"]);
    remove_tags(
        dom,
        article,
        &["footer", "aside", "nav", "link", "input", "textarea", "select", "button"],
    );
    remove_share_elements(dom, article);

    if flags.weight_classes {
        for heading in dom.elements_by_tag(article, &["h1", "h2"]) {
            if class_weight(dom, heading, flags, options) < 0.0 {
                dom.detach(heading);
            }
        }
    }

    conditional.clean(dom, article, &["table", "ul", "div", "section"]);

    for heading in dom.elements_by_tag(article, &["h1"]) {
        dom.set_tag(heading, "h2");
    }

    remove_empty_paragraphs(dom, article);
    remove_breaks_before_paragraphs(dom, article);
    simplify_nested_wrappers(dom, article);
}

/// Remove classes not listed in `preserve` from the subtree, dropping empty
/// `class` attributes
pub(crate) fn clean_classes(dom: &mut Dom, root: NodeId, preserve: &[String]) {
    let ids: Vec<NodeId> = std::iter::once(root).chain(dom.descendants(root)).collect();
    for id in ids {
        if !dom.is_element(id) {
            continue;
        }
        let node = dom.node_mut(id);
        let kept = node
            .class_list()
            .filter(|class| preserve.iter().any(|p| p == class))
            .collect::<Vec<_>>()
            .join(" ");
        if kept.is_empty() {
            node.remove_attr("class");
        } else {
            node.set_attr("class", &kept);
        }
    }
}

/// Drop presentational attributes everywhere outside `svg`
fn clean_styles(dom: &mut Dom, article: NodeId) {
    if dom.is(article, "svg") || dom.has_ancestor(article, "svg") {
        return;
    }

    let mut stack: Vec<NodeId> = dom.children(article).to_vec();
    while let Some(id) = stack.pop() {
        if !dom.is_element(id) || dom.is(id, "svg") {
            continue;
        }
        let sized = DEPRECATED_SIZE_ELEMENTS.contains(&dom.tag(id));
        let node = dom.node_mut(id);
        for attribute in PRESENTATIONAL_ATTRIBUTES {
            node.remove_attr(attribute);
        }
        if sized {
            node.remove_attr("width");
            node.remove_attr("height");
        }
        stack.extend_from_slice(dom.children(id));
    }
}

/// Tables that hold data rather than layout
fn mark_data_tables(dom: &Dom, article: NodeId) -> HashSet<NodeId> {
    dom.elements_by_tag(article, &["table"])
        .into_iter()
        .filter(|&table| is_data_table(dom, table))
        .collect()
}

fn is_data_table(dom: &Dom, table: NodeId) -> bool {
    if dom.attr(table, "role") == Some("presentation") || dom.attr(table, "datatable") == Some("0")
    {
        return false;
    }
    if dom.attr(table, "summary").is_some_and(|s| !s.is_empty()) {
        return true;
    }

    let has_caption = dom
        .element_children(table)
        .into_iter()
        .any(|child| dom.is(child, "caption") && !dom.children(child).is_empty());
    if has_caption {
        return true;
    }

    if !dom
        .elements_by_tag(table, &["col", "colgroup", "tfoot", "thead", "th"])
        .is_empty()
    {
        return true;
    }
    if dom.first_by_tag(table, "table").is_some() {
        return false;
    }

    let (rows, columns) = row_and_column_count(dom, table);
    rows >= 10 || columns > 4 || rows * columns > 10
}

fn row_and_column_count(dom: &Dom, table: NodeId) -> (usize, usize) {
    let span = |id: NodeId, name: &str| {
        dom.attr(id, name)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1)
    };

    let mut rows = 0;
    let mut columns = 0;
    for row in dom.elements_by_tag(table, &["tr"]) {
        rows += span(row, "rowspan");
        let cells: usize = dom
            .element_children(row)
            .into_iter()
            .filter(|&cell| dom.is(cell, "td") || dom.is(cell, "th"))
            .map(|cell| span(cell, "colspan"))
            .sum();
        columns = columns.max(cells);
    }
    (rows, columns)
}

pub(crate) fn is_video_embed(dom: &Dom, id: NodeId) -> bool {
    let by_attribute = dom
        .node(id)
        .attributes
        .values()
        .any(|value| VIDEOS.is_match(value));
    by_attribute || (dom.is(id, "object") && VIDEOS.is_match(&dom.to_node(id).inner_html()))
}

fn remove_embeds(dom: &mut Dom, article: NodeId, tags: &[&str]) {
    for id in dom.elements_by_tag(article, tags) {
        if !is_video_embed(dom, id) {
            dom.detach(id);
        }
    }
}

fn remove_tags(dom: &mut Dom, article: NodeId, tags: &[&str]) {
    for id in dom.elements_by_tag(article, tags) {
        dom.detach(id);
    }
}

fn remove_share_elements(dom: &mut Dom, article: NodeId) {
    for child in dom.element_children(article) {
        let ids: Vec<NodeId> = dom.descendants(child).collect();
        for id in ids {
            if !dom.is_element(id) {
                continue;
            }
            let match_string = dom.node(id).class_and_id();
            if SHARE_ELEMENTS.is_match(&match_string)
                && dom.text_content(id).chars().count() < SHARE_ELEMENT_THRESHOLD
            {
                trace!(%match_string, "removing share widget");
                dom.detach(id);
            }
        }
    }
}

/// Paragraphs with neither text nor media
fn remove_empty_paragraphs(dom: &mut Dom, article: NodeId) {
    for p in dom.elements_by_tag(article, &["p"]) {
        let has_media = !dom
            .elements_by_tag(p, &["img", "embed", "object", "iframe"])
            .is_empty();
        if !has_media && dom.text_content(p).trim().is_empty() {
            dom.detach(p);
        }
    }
}

fn remove_breaks_before_paragraphs(dom: &mut Dom, article: NodeId) {
    for br in dom.elements_by_tag(article, &["br"]) {
        let mut next = dom.next_sibling(br);
        while let Some(id) = next {
            if dom.node(id).is_text() && is_whitespace(dom, id) {
                next = dom.next_sibling(id);
            } else {
                break;
            }
        }
        if next.is_some_and(|id| dom.is(id, "p")) {
            dom.detach(br);
        }
    }
}

/// Collapse `div`/`section` wrappers whose only content is another wrapper
fn simplify_nested_wrappers(dom: &mut Dom, article: NodeId) {
    for id in dom.elements_by_tag(article, &["div", "section"]) {
        if dom.parent(id).is_none() {
            continue;
        }
        if is_empty_wrapper(dom, id) {
            dom.detach(id);
            continue;
        }

        let elements = dom.element_children(id);
        let [only] = elements.as_slice() else {
            continue;
        };
        let only = *only;
        let loose_text = dom
            .children(id)
            .iter()
            .any(|&child| dom.node(child).is_text() && !is_whitespace(dom, child));
        if loose_text || !(dom.is(only, "div") || dom.is(only, "section")) {
            continue;
        }

        let attributes: Vec<(String, String)> = dom
            .node(id)
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let child = dom.node_mut(only);
        for (name, value) in attributes {
            if !child.has_attr(&name) {
                child.set_attr(&name, &value);
            }
        }
        dom.replace(id, only);
    }
}

fn is_empty_wrapper(dom: &Dom, id: NodeId) -> bool {
    dom.descendants(id)
        .all(|d| !dom.is_element(d) || dom.is(d, "br") || dom.is(d, "hr"))
        && dom.text_content(id).trim().is_empty()
}

/// Conditional removal of containers that look like furniture
struct Conditional<'a> {
    flags: Flags,
    options: &'a ReadabilityOptions,
    data_tables: &'a HashSet<NodeId>,
}

impl Conditional<'_> {
    fn clean(&self, dom: &mut Dom, article: NodeId, tags: &[&str]) {
        if !self.flags.clean_conditionally {
            return;
        }
        let enclosing = Enclosing::of(dom, article, self.data_tables);
        let mut tally = Tally::new(dom, self.data_tables);
        for id in dom.elements_by_tag(article, tags).into_iter().rev() {
            if self.should_remove(dom, &mut tally, &enclosing, id) {
                trace!(tag = dom.tag(id), "conditionally removing");
                tally.detach(dom, id);
            }
        }
    }

    fn should_remove(
        &self,
        dom: &Dom,
        tally: &mut Tally<'_>,
        enclosing: &Enclosing,
        id: NodeId,
    ) -> bool {
        if dom.is(id, "table") && self.data_tables.contains(&id) {
            return false;
        }
        if enclosing.protected[id] {
            return false;
        }
        let totals = tally.get(dom, id).clone();
        if totals.has_data_table || totals.has_pre {
            return false;
        }

        let content_length = totals.text_length();
        let tag = dom.tag(id);
        let is_list = matches!(tag, "ul" | "ol")
            || (content_length > 0 && totals.list_chars as f64 / content_length as f64 > 0.9);

        let weight = class_weight(dom, id, self.flags, self.options);
        if weight < 0.0 {
            return true;
        }
        if totals.commas >= 10 {
            return false;
        }

        let paragraphs = totals.paragraphs as f64;
        let images = totals.images;
        let list_items = totals.list_items as f64 - 100.0;
        let inputs = totals.inputs as f64;
        let heading_density = if content_length == 0 {
            0.0
        } else {
            totals.heading_chars as f64 / content_length as f64
        };
        let embeds = totals.embeds;
        let link_density = totals.link_density();
        let in_figure = enclosing.in_figure[id];

        let remove = (!in_figure && images > 1 && paragraphs / (images as f64) < 0.5)
            || (!is_list && list_items > paragraphs)
            || inputs > (paragraphs / 3.0).floor()
            || (!is_list
                && !in_figure
                && heading_density < 0.9
                && content_length < 25
                && (images == 0 || images > 2)
                && link_density > 0.0)
            || (!is_list && weight < 25.0 && link_density > 0.2)
            || (weight >= 25.0 && link_density > 0.5)
            || (embeds == 1 && content_length < 75)
            || embeds > 1;

        // Image galleries are lists with one image per item
        if is_list && remove {
            if dom
                .element_children(id)
                .into_iter()
                .any(|child| dom.element_children(child).len() > 1)
            {
                return remove;
            }
            if images == totals.list_items {
                return false;
            }
        }

        remove
    }
}

/// What encloses each node of the article
struct Enclosing {
    /// Inside a data table, `code` or `pre`
    protected: Vec<bool>,
    in_figure: Vec<bool>,
}

impl Enclosing {
    fn of(dom: &Dom, article: NodeId, data_tables: &HashSet<NodeId>) -> Self {
        let protects = |id: NodeId| {
            (dom.is(id, "table") && data_tables.contains(&id))
                || dom.is(id, "code")
                || dom.is(id, "pre")
        };

        let mut protected = vec![false; dom.len()];
        let mut in_figure = vec![false; dom.len()];
        protected[article] = dom.ancestors(article).any(protects);
        in_figure[article] = dom.has_ancestor(article, "figure");

        let mut stack = vec![article];
        while let Some(id) = stack.pop() {
            let shields = protected[id] || protects(id);
            let figure = in_figure[id] || dom.is(id, "figure");
            for &child in dom.children(id) {
                protected[child] = shields;
                in_figure[child] = figure;
                stack.push(child);
            }
        }

        Self {
            protected,
            in_figure,
        }
    }
}
