//! The extraction service.

use readdown::MarkdownService;
use readdown_dom::Node;
use tracing::debug;

use crate::article::Article;
use crate::cleanup::clean_classes;
use crate::dom::{normalize_spaces, Dom};
use crate::extract::{grab_article, Attempt};
use crate::metadata::{self, Metadata};
use crate::options::{ContentFormat, ReadabilityOptions};
use crate::prepare::prepare_document;
use crate::scoring::Flags;
use crate::Result;

/// Extracts the main article from a document
///
/// A service is immutable once built and can be shared between threads;
/// every call to [`parse`](Readability::parse) works on its own copy of the
/// document.
pub struct Readability {
    options: ReadabilityOptions,
    markdown: MarkdownService,
}

impl Default for Readability {
    fn default() -> Self {
        Self::new()
    }
}

impl Readability {
    /// A service with default options
    pub fn new() -> Self {
        Self {
            options: ReadabilityOptions::default(),
            markdown: MarkdownService::new(),
        }
    }

    /// A service with validated options
    pub fn with_options(options: ReadabilityOptions) -> Result<Self> {
        options.validate()?;
        let markdown = MarkdownService::with_options(options.markdown.clone())?;
        debug!(
            char_threshold = options.char_threshold,
            content_format = ?options.content_format,
            "readability service configured"
        );
        Ok(Self { options, markdown })
    }

    /// A service configured from a JSON options object
    pub fn from_json(json: &str) -> Result<Self> {
        Self::with_options(ReadabilityOptions::from_json(json)?)
    }

    pub fn options(&self) -> &ReadabilityOptions {
        &self.options
    }

    /// Extract the article from a document tree.
    ///
    /// Returns `None` when no content of at least
    /// [`min_content_length`](ReadabilityOptions::min_content_length)
    /// characters is found, when the page is a single bare paragraph shorter
    /// than [`min_unstructured_length`](ReadabilityOptions::min_unstructured_length),
    /// or when the document has more elements than
    /// [`max_elems_to_parse`](ReadabilityOptions::max_elems_to_parse).
    pub fn parse(&self, document: &Node) -> Option<Article> {
        let mut dom = Dom::from_node(document);

        let limit = self.options.max_elems_to_parse;
        if limit > 0 {
            let count = dom.element_count();
            if count > limit {
                debug!(count, limit, "document too large to parse");
                return None;
            }
        }

        let metadata = metadata::collect(&dom);
        prepare_document(&mut dom);

        let title = metadata.title.clone().unwrap_or_default();
        let attempt = self.best_attempt(&dom, &title)?;
        Some(self.assemble(attempt, metadata))
    }

    /// Parse an HTML document and extract its article
    #[cfg(feature = "html")]
    pub fn parse_html(&self, html: &str) -> Option<Article> {
        self.parse(&readdown_dom::parse_document(html))
    }

    /// Run attempts with progressively looser flags until one is long enough
    fn best_attempt(&self, dom: &Dom, title: &str) -> Option<Attempt> {
        let mut flags = Some(Flags::ALL);
        let mut best: Option<Attempt> = None;

        while let Some(current) = flags {
            let attempt = grab_article(dom.clone(), current, title, &self.options);
            debug!(
                ?current,
                text_length = attempt.text_length,
                "extraction attempt finished"
            );

            if attempt.text_length >= self.options.char_threshold {
                best = Some(attempt);
                break;
            }
            if best
                .as_ref()
                .map_or(true, |b| attempt.text_length > b.text_length)
            {
                best = Some(attempt);
            }
            flags = current.loosen();
        }

        best.filter(|attempt| {
            let min = if attempt.unstructured {
                self.options
                    .min_unstructured_length
                    .max(self.options.min_content_length)
            } else {
                self.options.min_content_length
            };
            let long_enough = attempt.text_length >= min;
            if !long_enough {
                debug!(
                    text_length = attempt.text_length,
                    min,
                    unstructured = attempt.unstructured,
                    "no article found"
                );
            }
            long_enough
        })
    }

    fn assemble(&self, attempt: Attempt, metadata: Metadata) -> Article {
        let Attempt {
            mut dom,
            content,
            byline,
            dir,
            ..
        } = attempt;

        if !self.options.keep_classes {
            clean_classes(&mut dom, content, &self.options.classes_to_preserve);
        }

        let mut page = Node::element_with_attrs(
            "div",
            vec![("id", "readability-page-1"), ("class", "page")],
        );
        let mut wrapper = dom.to_node(content);
        page.children = std::mem::take(&mut wrapper.children);

        let text_content = normalize_spaces(&page.text_content());
        let length = text_content.chars().count();

        let excerpt = metadata.excerpt.or_else(|| {
            dom.elements_by_tag(content, &["p"])
                .into_iter()
                .map(|p| dom.inner_text(p))
                .find(|text| text.chars().count() >= self.options.excerpt_char_threshold)
        });

        let content = match self.options.content_format {
            ContentFormat::Html => page.outer_html(),
            ContentFormat::Markdown => self.markdown.render(&page),
        };

        Article {
            title: metadata.title.unwrap_or_default(),
            byline: metadata.byline.or(byline),
            dir: dir.or(metadata.dir),
            lang: metadata.lang,
            content,
            text_content,
            length,
            excerpt,
            site_name: metadata.site_name,
            published_time: metadata.published_time,
        }
    }
}
