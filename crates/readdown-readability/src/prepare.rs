//! Document preparation before the candidate walk.

use crate::dom::{Dom, NodeId};
use crate::extract::{is_phrasing, is_whitespace, trim_trailing_whitespace};
use crate::patterns::VIDEOS;

const REMOVED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "link", "meta", "svg",
];
const UNWRAPPED_TAGS: &[&str] = &["font", "center", "big"];
const WHITESPACE_SENSITIVE: &[&str] = &["pre", "textarea", "code"];

/// Strip non-content nodes, legacy wrappers and `<br>` chains
pub(crate) fn prepare_document(dom: &mut Dom) {
    let ids: Vec<NodeId> = dom.descendants(Dom::ROOT).collect();
    for id in ids {
        let node = dom.node(id);
        let removable = node.is_comment()
            || REMOVED_TAGS.contains(&dom.tag(id))
            || (node.is("iframe")
                && !node
                    .attr("src")
                    .is_some_and(|src| VIDEOS.is_match(src)));
        if removable {
            dom.detach(id);
        }
    }

    for id in dom.elements_by_tag(Dom::ROOT, UNWRAPPED_TAGS) {
        dom.unwrap(id);
    }

    collapse_whitespace(dom);
    replace_brs(dom);
}

/// Whitespace-only text runs become a single space
fn collapse_whitespace(dom: &mut Dom) {
    let mut stack = vec![(Dom::ROOT, false)];
    while let Some((id, sensitive)) = stack.pop() {
        if dom.node(id).is_text() {
            if !sensitive && is_whitespace(dom, id) {
                dom.node_mut(id).node_value = Some(" ".to_string());
            }
            continue;
        }
        let sensitive = sensitive || WHITESPACE_SENSITIVE.contains(&dom.tag(id));
        stack.extend(dom.children(id).iter().map(|&child| (child, sensitive)));
    }
}

/// The next sibling that is not whitespace-only text
fn next_significant(dom: &Dom, mut id: Option<NodeId>) -> Option<NodeId> {
    while let Some(current) = id {
        let node = dom.node(current);
        if node.is_element() || !dom.text_content(current).trim().is_empty() {
            return Some(current);
        }
        id = dom.next_sibling(current);
    }
    None
}

/// Two or more consecutive `<br>`s end a paragraph; the phrasing content
/// after them is moved into a new `<p>`
fn replace_brs(dom: &mut Dom) {
    for br in dom.elements_by_tag(Dom::ROOT, &["br"]) {
        if !dom.is_attached(br) {
            continue;
        }

        let mut replaced = false;
        let mut next = next_significant(dom, dom.next_sibling(br));
        while let Some(id) = next.filter(|&id| dom.is(id, "br")) {
            replaced = true;
            let sibling = dom.next_sibling(id);
            dom.detach(id);
            next = next_significant(dom, sibling);
        }
        if !replaced {
            continue;
        }

        let p = dom.create_element("p");
        dom.replace(br, p);

        let mut next = dom.next_sibling(p);
        while let Some(id) = next {
            if dom.is(id, "br") {
                let after = next_significant(dom, dom.next_sibling(id));
                if after.is_some_and(|a| dom.is(a, "br")) {
                    break;
                }
            }
            if !is_phrasing(dom, id) && !dom.is(id, "br") {
                break;
            }
            next = dom.next_sibling(id);
            dom.append(p, id);
        }

        trim_trailing_whitespace(dom, p);

        if let Some(parent) = dom.parent(p).filter(|&parent| dom.is(parent, "p")) {
            dom.set_tag(parent, "div");
        }
    }
}
