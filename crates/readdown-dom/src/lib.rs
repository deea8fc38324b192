//! # readdown-dom
//!
//! The DOM tree shared by the readdown engines.
//!
//! Both the Markdown renderer and the article extractor consume the same owned
//! [`Node`] tree. Any HTML parser can produce it; with the default `html`
//! feature, [`parse_html`] and [`parse_document`] build one through
//! scraper/html5ever.
//!
//! ## Design
//!
//! - **Owned tree**: a node owns its children, so a tree can be handed to an
//!   engine that mutates it without any shared state.
//! - **Borrowed parent links**: [`NodeRef`] carries a link to its parent
//!   `NodeRef`, giving parent and sibling access during a walk without storing
//!   parent pointers in the tree.
//! - **No deep recursion**: traversal, text extraction, serialization and drop
//!   run on explicit stacks, so pathologically nested input cannot exhaust the
//!   call stack.
//!
//! ## Example
//!
//! ```rust
//! use readdown_dom::{traverse, Edge, Node};
//!
//! let mut p = Node::element("p");
//! p.add_child(Node::text("Hello "));
//! let mut em = Node::element("em");
//! em.add_child(Node::text("World"));
//! p.add_child(em);
//!
//! assert_eq!(p.text_content(), "Hello World");
//! assert_eq!(p.outer_html(), "<p>Hello <em>World</em></p>");
//!
//! let opened = traverse(&p).filter(|edge| matches!(edge, Edge::Open(_))).count();
//! assert_eq!(opened, 4);
//! ```

pub mod elements;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod serialize;
pub mod traverse;

pub use elements::{is_block, is_meaningful_when_blank, is_void};
#[cfg(feature = "html")]
pub use html::{parse_document, parse_html};
pub use node::{Node, NodeRef, NodeType};
pub use serialize::{escape_attribute, escape_text};
pub use traverse::{descendants, traverse, Descendants, Edge, Traverse};
