//! MarkdownService - the main entry point for DOM to Markdown conversion.

use readdown_dom::Node;
use tracing::debug;

use crate::escape::escape_markdown;
use crate::options::MarkdownOptions;
use crate::render::Renderer;
use crate::rules::{Filter, Rule, Rules};
use crate::Result;

/// The main service for converting DOM trees to Markdown.
///
/// A service holds validated options and a rule registry. Rendering only reads
/// them, so one service can be shared between threads.
pub struct MarkdownService {
    options: MarkdownOptions,
    rules: Rules,
}

impl MarkdownService {
    /// Create a new MarkdownService with default options
    pub fn new() -> Self {
        Self {
            options: MarkdownOptions::default(),
            rules: Rules::new(),
        }
    }

    /// Create a MarkdownService with custom options.
    ///
    /// Fails with [`MarkdownError::InvalidOption`](crate::MarkdownError::InvalidOption)
    /// when a delimiter would not produce valid Markdown.
    pub fn with_options(options: MarkdownOptions) -> Result<Self> {
        options.validate()?;
        debug!(?options, "creating markdown service");
        Ok(Self {
            options,
            rules: Rules::new(),
        })
    }

    /// Create a MarkdownService from a JSON options object
    pub fn from_json(json: &str) -> Result<Self> {
        Self::with_options(MarkdownOptions::from_json(json)?)
    }

    /// Convert a node tree to Markdown.
    ///
    /// Element roots are converted themselves; document roots convert their
    /// children.
    pub fn render(&self, node: &Node) -> String {
        Renderer::new(&self.rules, &self.options).render(node)
    }

    /// Parse an HTML fragment and convert it to Markdown
    #[cfg(feature = "html")]
    pub fn render_html(&self, html: &str) -> String {
        tracing::trace!(bytes = html.len(), "parsing html fragment");
        let document = readdown_dom::parse_html(html);
        self.render(&document)
    }

    /// Add a custom rule, checked before the built-in rules.
    ///
    /// Adding a rule under an existing key replaces it.
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        debug!(key, "adding rule");
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text, false)
    }

    /// Get the current options
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Replace the options after validating them
    pub fn set_options(&mut self, options: MarkdownOptions) -> Result<&mut Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Get the rule registry
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}

impl Default for MarkdownService {
    fn default() -> Self {
        Self::new()
    }
}
