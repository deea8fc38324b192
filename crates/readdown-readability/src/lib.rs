//! # readdown-readability
//!
//! Find the main article in a web page and return it as clean HTML or
//! Markdown.
//!
//! The extractor scores paragraphs and hands their score up to the
//! containers around them, picks the best container, merges related siblings
//! and strips page furniture (navigation, share widgets, forms, link farms)
//! from the result. When an attempt yields too little text it is retried with
//! looser heuristics.
//!
//! ## Design
//!
//! - **Non-destructive**: [`Readability::parse`] takes the document by
//!   reference and works on a copy, so one tree can be parsed repeatedly with
//!   identical results.
//! - **Metadata first**: title, byline, excerpt, site name and publish date
//!   come from `<meta>` tags and JSON-LD before the body is touched.
//! - **Markdown output**: with [`ContentFormat::Markdown`] the cleaned article
//!   is rendered through [`readdown`].
//!
//! ## Example
//!
//! ```rust
//! use readdown_readability::Readability;
//!
//! let html = r#"<html><head><title>Weather API</title></head><body>
//!   <nav><a href="/">Home</a> <a href="/docs">Docs</a></nav>
//!   <article>
//!     <h1>Weather API</h1>
//!     <p>The forecast endpoint returns hourly temperature, humidity and wind
//!     speed for any location, with up to sixteen days of lookahead.</p>
//!   </article>
//! </body></html>"#;
//!
//! let article = Readability::new().parse_html(html).unwrap();
//! assert_eq!(article.title, "Weather API");
//! assert!(article.text_content.contains("hourly temperature"));
//! assert!(!article.content.contains("Docs"));
//! ```

mod article;
mod cleanup;
mod dom;
mod extract;
mod metadata;
mod options;
mod patterns;
mod prepare;
mod readability;
mod scoring;
mod tally;

pub use article::Article;
pub use options::{ContentFormat, ReadabilityOptions};
pub use readability::Readability;
pub use readdown_dom::Node;

/// Error type for readdown-readability operations
#[derive(Debug, thiserror::Error)]
pub enum ReadabilityError {
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid markdown options: {0}")]
    Markdown(#[from] readdown::MarkdownError),
}

pub type Result<T> = std::result::Result<T, ReadabilityError>;
