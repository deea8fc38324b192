//! # readdown
//!
//! Convert DOM nodes to Markdown.
//!
//! This is a rule-driven HTML to Markdown converter in the spirit of
//! [turndown](https://github.com/mixmark-io/turndown): every element is matched
//! against an ordered list of rules, and the first rule whose filter accepts the
//! element turns the element's already-converted children into Markdown.
//!
//! ## Design
//!
//! - **Parser agnostic**: the engine consumes a [`readdown_dom::Node`] tree, so
//!   any HTML parser can feed it. With the `html` feature,
//!   [`MarkdownService::render_html`] parses with scraper/html5ever first.
//! - **Open rule registry**: custom rules registered with
//!   [`MarkdownService::add_rule`] are tried before the built-in CommonMark and
//!   GFM rules, and re-registering a key replaces the rule in place.
//! - **Explicit context**: list depth, code regions and table cells are tracked
//!   in a [`RenderContext`] value copied into each recursive call, so one service
//!   can render many trees in parallel.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use readdown::{MarkdownService, Node};
//!
//! let service = MarkdownService::new();
//!
//! let mut h1 = Node::element("h1");
//! h1.add_child(Node::text("Hello World"));
//!
//! assert_eq!(service.render(&h1), "# Hello World");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use readdown::MarkdownService;
//!
//! let service = MarkdownService::new();
//! let markdown = service.render_html("<p>Use <code>temperature_2m</code> here</p>");
//! assert_eq!(markdown, "Use `temperature_2m` here");
//! ```

mod context;
mod escape;
mod options;
mod render;
mod rules;
mod service;
mod utilities;

pub use context::{LinkReferences, RenderContext};
pub use escape::{escape, escape_markdown};
pub use options::{
    CodeBlockStyle, HeadingStyle, LinkReferencePlacement, LinkReferenceStyle, LinkStyle,
    MarkdownOptions, OrderedListDelimiter,
};
pub use readdown_dom::{Node, NodeRef, NodeType};
pub use render::MAX_RENDER_DEPTH;
pub use rules::{Filter, PredicateFn, ReplacementFn, Rule, Rules};
pub use service::MarkdownService;
pub use utilities::{clean_attribute, collapse_whitespace};

/// Error type for readdown operations
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarkdownError>;
