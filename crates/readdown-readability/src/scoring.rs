//! Content scores for candidate containers.
//!
//! Scores live in a table indexed by [`NodeId`] that belongs to a single
//! extraction attempt, so the document itself is never annotated.

use crate::dom::{Dom, NodeId};
use crate::options::ReadabilityOptions;
use crate::patterns::{NEGATIVE, POSITIVE};

/// Heuristics enabled for one extraction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Flags {
    pub strip_unlikelys: bool,
    pub weight_classes: bool,
    pub clean_conditionally: bool,
}

impl Flags {
    pub(crate) const ALL: Flags = Flags {
        strip_unlikelys: true,
        weight_classes: true,
        clean_conditionally: true,
    };

    /// The next looser set of flags, `None` once all are off
    pub(crate) fn loosen(self) -> Option<Flags> {
        if self.strip_unlikelys {
            Some(Flags {
                strip_unlikelys: false,
                ..self
            })
        } else if self.weight_classes {
            Some(Flags {
                weight_classes: false,
                ..self
            })
        } else if self.clean_conditionally {
            Some(Flags {
                clean_conditionally: false,
                ..self
            })
        } else {
            None
        }
    }
}

/// Class and id weighting: ±25 for each of `class` and `id`
pub(crate) fn class_weight(
    dom: &Dom,
    id: NodeId,
    flags: Flags,
    options: &ReadabilityOptions,
) -> f64 {
    if !flags.weight_classes {
        return 0.0;
    }

    let node = dom.node(id);
    let mut weight = 0.0;
    for name in [node.attr("class"), node.attr("id")].into_iter().flatten() {
        if name.is_empty() {
            continue;
        }
        if NEGATIVE.is_match(name) || matches_token(name, &options.negative_tokens) {
            weight -= 25.0;
        }
        if POSITIVE.is_match(name) || matches_token(name, &options.positive_tokens) {
            weight += 25.0;
        }
    }
    weight
}

fn matches_token(name: &str, tokens: &[String]) -> bool {
    let name = name.to_ascii_lowercase();
    tokens
        .iter()
        .any(|token| name.contains(&token.trim().to_ascii_lowercase()))
}

/// Starting score of a candidate from its tag
pub(crate) fn tag_score(tag: &str) -> f64 {
    match tag {
        "article" => 10.0,
        "div" | "section" | "main" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        "nav" | "aside" | "footer" | "header" => -25.0,
        _ => 0.0,
    }
}

/// What one scored paragraph contributes: a point, a point per comma and a
/// point per hundred characters, at most three
pub(crate) fn paragraph_score(length: usize, commas: usize) -> f64 {
    1.0 + commas as f64 + (length / 100).min(3) as f64
}

/// Share of a paragraph's score passed to the ancestor `level` steps up
pub(crate) fn ancestor_divider(level: usize) -> f64 {
    match level {
        0 => 1.0,
        1 => 2.0,
        _ => (level * 3) as f64,
    }
}

/// Per-attempt score table
#[derive(Debug, Default)]
pub(crate) struct Scores {
    scores: Vec<Option<f64>>,
    candidates: Vec<NodeId>,
}

impl Scores {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            scores: vec![None; size],
            candidates: Vec::new(),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<f64> {
        self.scores.get(id).copied().flatten()
    }

    pub(crate) fn is_initialized(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Give a node its starting score and record it as a candidate
    pub(crate) fn initialize(
        &mut self,
        dom: &Dom,
        id: NodeId,
        flags: Flags,
        options: &ReadabilityOptions,
    ) {
        if self.is_initialized(id) {
            return;
        }
        self.ensure(id);
        self.scores[id] = Some(tag_score(dom.tag(id)) + class_weight(dom, id, flags, options));
        self.candidates.push(id);
    }

    pub(crate) fn add(&mut self, id: NodeId, amount: f64) {
        self.ensure(id);
        self.scores[id] = Some(self.scores[id].unwrap_or(0.0) + amount);
    }

    pub(crate) fn set(&mut self, id: NodeId, score: f64) {
        self.ensure(id);
        self.scores[id] = Some(score);
    }

    /// Candidates in the order they were first scored
    pub(crate) fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }

    fn ensure(&mut self, id: NodeId) {
        if id >= self.scores.len() {
            self.scores.resize(id + 1, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use readdown_dom::Node;

    #[test]
    fn test_flags_loosen_in_order() {
        let first = Flags::ALL.loosen().unwrap();
        assert!(!first.strip_unlikelys && first.weight_classes);
        let second = first.loosen().unwrap();
        assert!(!second.weight_classes && second.clean_conditionally);
        let third = second.loosen().unwrap();
        assert!(!third.clean_conditionally);
        assert_eq!(third.loosen(), None);
    }

    #[test]
    fn test_class_weight() {
        let node = Node::element_with_attrs(
            "div",
            vec![("class", "entry-content"), ("id", "sidebar")],
        );
        let dom = Dom::from_node(&node);
        let options = ReadabilityOptions::default();
        assert_eq!(class_weight(&dom, Dom::ROOT, Flags::ALL, &options), 0.0);

        let no_classes = Flags {
            weight_classes: false,
            ..Flags::ALL
        };
        let promo = Dom::from_node(&Node::element_with_attrs("div", vec![("class", "promo-box")]));
        assert_eq!(class_weight(&promo, Dom::ROOT, no_classes, &options), 0.0);
        assert_eq!(class_weight(&promo, Dom::ROOT, Flags::ALL, &options), -25.0);
    }

    #[test]
    fn test_custom_tokens() {
        let dom = Dom::from_node(&Node::element_with_attrs("div", vec![("class", "Docs-Pane")]));
        let options = ReadabilityOptions {
            positive_tokens: vec!["docs".to_string()],
            ..Default::default()
        };
        assert_eq!(class_weight(&dom, Dom::ROOT, Flags::ALL, &options), 25.0);
    }

    #[test]
    fn test_paragraph_score() {
        assert_eq!(paragraph_score(5, 0), 1.0);
        assert_eq!(paragraph_score(15, 2), 3.0);
        assert_eq!(paragraph_score(250, 0), 3.0);
        assert_eq!(paragraph_score(900, 0), 4.0);
    }

    #[test]
    fn test_tag_score_and_divider() {
        assert_eq!(tag_score("article"), 10.0);
        assert_eq!(tag_score("nav"), -25.0);
        assert_eq!(tag_score("span"), 0.0);
        assert_eq!(
            (0..4).map(ancestor_divider).collect::<Vec<_>>(),
            vec![1.0, 2.0, 6.0, 9.0]
        );
    }
}
