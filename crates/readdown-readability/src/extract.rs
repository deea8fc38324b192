//! One extraction attempt: walk, score, select and merge.

use std::collections::HashSet;

use readdown_dom::Node;
use tracing::{debug, trace};

use crate::cleanup::prepare_article;
use crate::dom::{Dom, NodeId};
use crate::metadata::text_similarity;
use crate::options::ReadabilityOptions;
use crate::patterns::{
    BYLINE, DIV_TO_P_ELEMENTS, HEADINGS, MAYBE_CANDIDATE, PHRASING_ELEMENTS, SENTENCE_END,
    TAGS_TO_SCORE, UNLIKELY_CANDIDATES, UNLIKELY_ROLES,
};
use crate::scoring::{ancestor_divider, class_weight, paragraph_score, Flags, Scores};
use crate::tally::Tally;

/// Near-top candidates that must share an ancestor before it is promoted
const MINIMUM_TOP_CANDIDATES: usize = 3;

/// Shortest paragraph text that feeds the content score
const MIN_PARAGRAPH_LENGTH: usize = 25;

/// Content beyond running text that gives a page its structure
const STRUCTURE_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "dl", "table", "pre", "blockquote", "img",
    "picture", "figure", "video", "audio", "iframe",
];

/// Result of one attempt, owning the document it edited
#[derive(Debug)]
pub(crate) struct Attempt {
    pub dom: Dom,
    /// Detached `div` holding the merged article content
    pub content: NodeId,
    pub text_length: usize,
    /// Nothing above the body scored and the content is one bare paragraph
    pub unstructured: bool,
    pub byline: Option<String>,
    pub dir: Option<String>,
}

/// Run one attempt over a prepared document
pub(crate) fn grab_article(
    mut dom: Dom,
    flags: Flags,
    title: &str,
    options: &ReadabilityOptions,
) -> Attempt {
    let body = dom.body();
    let walked = walk(&mut dom, body, flags, title);

    let no_tables = HashSet::new();
    let mut tally = Tally::new(&dom, &no_tables);
    let order = dom.document_order();
    let mut scores = Scores::new(dom.len());
    score_paragraphs(
        &dom,
        &mut tally,
        &order,
        &walked.to_score,
        &mut scores,
        flags,
        options,
    );
    debug!(
        ?flags,
        candidates = scores.candidates().len(),
        "scored paragraphs"
    );

    let top = top_candidates(&dom, &mut tally, &order, &mut scores, options);
    let (candidate, wrapped_body) = match top.first() {
        Some(&first) if first != body => (
            promote(&dom, &top, body, &mut scores, flags, options),
            false,
        ),
        _ => (wrap_body(&mut dom, body, &mut scores, flags, options), true),
    };
    debug!(
        tag = dom.tag(candidate),
        score = scores.get(candidate).unwrap_or(0.0),
        "selected top candidate"
    );

    let dir = std::iter::once(candidate)
        .chain(dom.ancestors(candidate))
        .find_map(|id| dom.attr(id, "dir").map(str::to_string));

    let content = merge_siblings(&mut dom, candidate, &scores, flags, options);
    prepare_article(&mut dom, content, flags, options);
    let text_length = dom.inner_text(content).chars().count();
    let unstructured = wrapped_body && is_lone_paragraph(&dom, content);

    Attempt {
        dom,
        content,
        text_length,
        unstructured,
        byline: walked.byline,
        dir,
    }
}

struct Walked {
    to_score: Vec<NodeId>,
    byline: Option<String>,
}

/// Drop unlikely nodes, find the byline and collect the elements to score
fn walk(dom: &mut Dom, body: NodeId, flags: Flags, title: &str) -> Walked {
    let mut to_score = Vec::new();
    let mut byline = None;
    let mut title_header_removed = false;
    let mut current = Some(body);

    while let Some(id) = current {
        let tag = dom.tag(id).to_string();
        let match_string = dom.node(id).class_and_id();

        if !is_probably_visible(dom.node(id)) {
            trace!(tag = %tag, "removing hidden element");
            current = dom.remove_and_next(id);
            continue;
        }

        if dom.attr(id, "aria-modal") == Some("true") && dom.attr(id, "role") == Some("dialog") {
            current = dom.remove_and_next(id);
            continue;
        }

        if byline.is_none() && is_byline(dom, id, &match_string) {
            byline = Some(dom.inner_text(id));
            current = dom.remove_and_next(id);
            continue;
        }

        if !title_header_removed && duplicates_title(dom, id, title) {
            title_header_removed = true;
            current = dom.remove_and_next(id);
            continue;
        }

        if flags.strip_unlikelys && id != body && is_unlikely(dom, id, &tag, &match_string) {
            trace!(tag = %tag, %match_string, "removing unlikely candidate");
            current = dom.remove_and_next(id);
            continue;
        }

        if matches!(
            tag.as_str(),
            "div" | "section" | "header" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        ) && is_without_content(dom, id)
        {
            current = dom.remove_and_next(id);
            continue;
        }

        if TAGS_TO_SCORE.contains(&tag.as_str()) {
            to_score.push(id);
        }

        if tag == "div" {
            wrap_phrasing_runs(dom, id);

            if let Some(paragraph) = single_child_tag(dom, id, "p") {
                if dom.link_density(id) < 0.25 {
                    dom.replace(id, paragraph);
                    to_score.push(paragraph);
                    current = dom.next_element(paragraph, false);
                    continue;
                }
            }
            if !has_block_descendant(dom, id) {
                dom.set_tag(id, "p");
                to_score.push(id);
            }
        }

        current = dom.next_element(id, false);
    }

    Walked { to_score, byline }
}

fn score_paragraphs(
    dom: &Dom,
    tally: &mut Tally<'_>,
    order: &[usize],
    to_score: &[NodeId],
    scores: &mut Scores,
    flags: Flags,
    options: &ReadabilityOptions,
) {
    for &element in to_score {
        let parent_is_element = dom.parent(element).is_some_and(|p| dom.is_element(p));
        let attached = order[element] != usize::MAX;
        if !parent_is_element || !attached {
            continue;
        }

        let totals = tally.get(dom, element);
        let length = totals.text_length();
        if length < MIN_PARAGRAPH_LENGTH {
            continue;
        }

        let score = paragraph_score(length, totals.commas);
        let ancestors: Vec<NodeId> = dom.ancestors(element).take(5).collect();
        for (level, ancestor) in ancestors.into_iter().enumerate() {
            let under_element = dom.parent(ancestor).is_some_and(|p| dom.is_element(p));
            if !dom.is_element(ancestor) || !under_element {
                continue;
            }
            scores.initialize(dom, ancestor, flags, options);
            scores.add(ancestor, score / ancestor_divider(level));
        }
    }
}

/// Candidates scaled by link density, best first; earlier wins ties
fn top_candidates(
    dom: &Dom,
    tally: &mut Tally<'_>,
    order: &[usize],
    scores: &mut Scores,
    options: &ReadabilityOptions,
) -> Vec<NodeId> {
    let mut top = Vec::new();

    for candidate in scores.candidates().to_vec() {
        let density = tally.get(dom, candidate).link_density();
        let score = scores.get(candidate).unwrap_or(0.0) * (1.0 - density);
        scores.set(candidate, score);
        if density > options.link_density_threshold {
            trace!(tag = dom.tag(candidate), density, "rejecting link-dense candidate");
            continue;
        }
        top.push(candidate);
    }

    top.sort_by(|&a, &b| {
        let score_a = scores.get(a).unwrap_or(0.0);
        let score_b = scores.get(b).unwrap_or(0.0);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(order[a].cmp(&order[b]))
    });
    top.truncate(options.nb_top_candidates);
    top
}

/// Move everything in the body into a new `div` and use that
fn wrap_body(
    dom: &mut Dom,
    body: NodeId,
    scores: &mut Scores,
    flags: Flags,
    options: &ReadabilityOptions,
) -> NodeId {
    let wrapper = dom.create_element("div");
    for child in dom.children(body).to_vec() {
        dom.append(wrapper, child);
    }
    dom.append(body, wrapper);
    scores.initialize(dom, wrapper, flags, options);
    wrapper
}

/// Climb from the best candidate to the ancestor that holds the article
fn promote(
    dom: &Dom,
    top: &[NodeId],
    body: NodeId,
    scores: &mut Scores,
    flags: Flags,
    options: &ReadabilityOptions,
) -> NodeId {
    let within = |id: NodeId| id != body && dom.is_element(id);

    let mut candidate = top[0];
    let best = score_of(scores, candidate);

    // Several near-top candidates under one ancestor: the ancestor is the article
    if best > 0.0 {
        let alternatives: Vec<Vec<NodeId>> = top[1..]
            .iter()
            .filter(|&&other| score_of(scores, other) / best >= 0.75)
            .map(|&other| dom.ancestors(other).collect())
            .collect();
        if alternatives.len() >= MINIMUM_TOP_CANDIDATES {
            let mut parent = dom.parent(candidate).filter(|&p| within(p));
            while let Some(p) = parent {
                let containing = alternatives.iter().filter(|a| a.contains(&p)).count();
                if containing >= MINIMUM_TOP_CANDIDATES {
                    candidate = p;
                    break;
                }
                parent = dom.parent(p).filter(|&p| within(p));
            }
        }
    }
    scores.initialize(dom, candidate, flags, options);

    // A parent scoring higher than the candidate takes over
    let mut last_score = score_of(scores, candidate);
    let threshold = last_score / 3.0;
    let mut parent = dom.parent(candidate).filter(|&p| within(p));
    while let Some(p) = parent {
        if let Some(parent_score) = scores.get(p) {
            if parent_score < threshold {
                break;
            }
            if parent_score > last_score {
                candidate = p;
                break;
            }
            last_score = parent_score;
        }
        parent = dom.parent(p).filter(|&p| within(p));
    }

    // Wrappers with nothing else in them belong to the article
    while let Some(p) = dom.parent(candidate).filter(|&p| within(p)) {
        if dom.element_children(p).len() != 1 {
            break;
        }
        candidate = p;
    }
    scores.initialize(dom, candidate, flags, options);

    candidate
}

fn score_of(scores: &Scores, id: NodeId) -> f64 {
    scores.get(id).unwrap_or(0.0)
}

/// Collect the candidate and its worthwhile siblings into a new `div`
fn merge_siblings(
    dom: &mut Dom,
    candidate: NodeId,
    scores: &Scores,
    flags: Flags,
    options: &ReadabilityOptions,
) -> NodeId {
    let top_score = scores.get(candidate).unwrap_or(0.0);
    let threshold = top_score * options.sibling_score_ratio;
    let top_class = dom.attr(candidate, "class").unwrap_or("").to_string();

    let siblings = match dom.parent(candidate) {
        Some(parent) => dom.element_children(parent),
        None => vec![candidate],
    };

    let article = dom.create_element("div");
    for sibling in siblings {
        let include = sibling == candidate || {
            let bonus = if !top_class.is_empty() && dom.attr(sibling, "class") == Some(top_class.as_str()) {
                top_score * 0.2
            } else {
                0.0
            };
            scores
                .get(sibling)
                .is_some_and(|score| score > 0.0 && score + bonus >= threshold)
                || (dom.is(sibling, "p") && is_good_paragraph(dom, sibling))
                || is_leading_heading(dom, sibling, candidate, flags, options)
        };

        if include {
            trace!(tag = dom.tag(sibling), "merging sibling");
            dom.append(article, sibling);
        }
    }

    article
}

fn is_good_paragraph(dom: &Dom, id: NodeId) -> bool {
    let text = dom.inner_text(id);
    let length = text.chars().count();
    let density = dom.link_density(id);

    (length > 80 && density < 0.25)
        || (length < 80 && length > 0 && density == 0.0 && SENTENCE_END.is_match(&text))
}

/// A heading directly in front of the candidate titles its content
fn is_leading_heading(
    dom: &Dom,
    id: NodeId,
    candidate: NodeId,
    flags: Flags,
    options: &ReadabilityOptions,
) -> bool {
    HEADINGS.contains(&dom.tag(id))
        && dom.next_element_sibling(id) == Some(candidate)
        && class_weight(dom, id, flags, options) >= 0.0
        && !dom.inner_text(id).is_empty()
}

/// At most one paragraph and nothing else worth keeping
fn is_lone_paragraph(dom: &Dom, content: NodeId) -> bool {
    dom.elements_by_tag(content, &["p"]).len() <= 1
        && dom.elements_by_tag(content, STRUCTURE_TAGS).is_empty()
}

fn is_probably_visible(node: &Node) -> bool {
    let style: String = node
        .attr("style")
        .unwrap_or("")
        .to_ascii_lowercase()
        .split_whitespace()
        .collect();
    let aria_hidden = node.attr("aria-hidden") == Some("true")
        && !node.class_list().any(|class| class == "fallback-image");

    !style.contains("display:none")
        && !style.contains("visibility:hidden")
        && !node.has_attr("hidden")
        && !aria_hidden
}

fn is_byline(dom: &Dom, id: NodeId, match_string: &str) -> bool {
    let marked = dom.attr(id, "rel") == Some("author")
        || dom.attr(id, "itemprop").is_some_and(|p| p.contains("author"))
        || BYLINE.is_match(match_string);
    if !marked {
        return false;
    }
    let length = dom.inner_text(id).chars().count();
    length > 0 && length < 100
}

fn duplicates_title(dom: &Dom, id: NodeId, title: &str) -> bool {
    (dom.is(id, "h1") || dom.is(id, "h2")) && text_similarity(title, &dom.inner_text(id)) > 0.75
}

fn is_unlikely(dom: &Dom, id: NodeId, tag: &str, match_string: &str) -> bool {
    if tag == "a" || tag == "body" {
        return false;
    }

    let by_name =
        UNLIKELY_CANDIDATES.is_match(match_string) && !MAYBE_CANDIDATE.is_match(match_string);
    let by_tag = matches!(tag, "nav" | "aside" | "footer");
    let by_role = dom
        .attr(id, "role")
        .is_some_and(|role| UNLIKELY_ROLES.contains(&role));

    (by_name || by_tag || by_role) && !dom.has_ancestor(id, "table") && !dom.has_ancestor(id, "code")
}

/// No text, and nothing but line breaks and rules
fn is_without_content(dom: &Dom, id: NodeId) -> bool {
    dom.children(id)
        .iter()
        .all(|&child| !dom.is_element(child) || dom.is(child, "br") || dom.is(child, "hr"))
        && dom.text_content(id).trim().is_empty()
}

/// The only element child when it has `tag` and no text sits beside it
fn single_child_tag(dom: &Dom, id: NodeId, tag: &str) -> Option<NodeId> {
    let elements = dom.element_children(id);
    let [only] = elements.as_slice() else {
        return None;
    };
    let bare_text = dom.children(id).iter().any(|&child| {
        dom.node(child).is_text() && !dom.text_content(child).trim().is_empty()
    });
    (dom.is(*only, tag) && !bare_text).then_some(*only)
}

fn has_block_descendant(dom: &Dom, id: NodeId) -> bool {
    dom.descendants(id)
        .any(|d| DIV_TO_P_ELEMENTS.contains(&dom.tag(d)))
}

/// Text, or inline markup made only of text
pub(crate) fn is_phrasing(dom: &Dom, id: NodeId) -> bool {
    let node = dom.node(id);
    if node.is_text() {
        return true;
    }
    if !node.is_element() {
        return false;
    }

    let tag = dom.tag(id);
    PHRASING_ELEMENTS.contains(&tag)
        || (matches!(tag, "a" | "del" | "ins")
            && dom.descendants(id).all(|d| {
                let inner = dom.node(d);
                !inner.is_element()
                    || PHRASING_ELEMENTS.contains(&inner.tag_name())
                    || matches!(inner.tag_name(), "a" | "del" | "ins")
            }))
}

/// Whitespace-only text or a line break
pub(crate) fn is_whitespace(dom: &Dom, id: NodeId) -> bool {
    let node = dom.node(id);
    (node.is_text() && dom.text_content(id).trim().is_empty()) || node.is("br")
}

/// Group runs of phrasing content inside a `div` into paragraphs
fn wrap_phrasing_runs(dom: &mut Dom, div: NodeId) {
    let mut paragraph: Option<NodeId> = None;

    for child in dom.children(div).to_vec() {
        if is_phrasing(dom, child) {
            match paragraph {
                Some(p) => dom.append(p, child),
                None if !is_whitespace(dom, child) => {
                    let p = dom.create_element("p");
                    dom.insert_before(child, p);
                    dom.append(p, child);
                    paragraph = Some(p);
                }
                None => {}
            }
        } else if let Some(p) = paragraph.take() {
            trim_trailing_whitespace(dom, p);
        }
    }

    if let Some(p) = paragraph {
        trim_trailing_whitespace(dom, p);
    }
}

pub(crate) fn trim_trailing_whitespace(dom: &mut Dom, id: NodeId) {
    while let Some(&last) = dom.children(id).last() {
        if !is_whitespace(dom, last) {
            break;
        }
        dom.detach(last);
    }
}
