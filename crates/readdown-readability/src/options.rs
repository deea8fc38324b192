//! Extraction options.

use readdown::MarkdownOptions;
use serde::{Deserialize, Serialize};

use crate::{ReadabilityError, Result};

/// Format of [`Article::content`](crate::Article::content)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    /// Serialized HTML of the cleaned article
    #[default]
    Html,
    /// Markdown rendered from the cleaned article
    Markdown,
}

/// Options for article extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadabilityOptions {
    /// Text length an attempt must reach before the looser retries are skipped
    pub char_threshold: usize,

    /// Articles with less text than this are not returned
    pub min_content_length: usize,

    /// Minimum text for a page that is one bare paragraph, with no container
    /// scoring above the body and no headings, lists, tables, code or media
    /// (0 = same as `min_content_length`)
    pub min_unstructured_length: usize,

    /// The first paragraph at least this long becomes the excerpt
    pub excerpt_char_threshold: usize,

    /// Number of top candidates considered when promoting an ancestor
    pub nb_top_candidates: usize,

    /// Give up on documents with more elements than this (0 = no limit)
    pub max_elems_to_parse: usize,

    /// Candidates whose link density exceeds this are rejected
    pub link_density_threshold: f64,

    /// Siblings scoring at least this fraction of the winner are merged in
    pub sibling_score_ratio: f64,

    /// Extra class/id tokens that raise a container's score
    pub positive_tokens: Vec<String>,

    /// Extra class/id tokens that lower a container's score
    pub negative_tokens: Vec<String>,

    /// Keep every `class` attribute in the extracted content
    pub keep_classes: bool,

    /// Classes kept when `keep_classes` is false
    pub classes_to_preserve: Vec<String>,

    /// Output format for the article content
    pub content_format: ContentFormat,

    /// Options used when `content_format` is Markdown
    pub markdown: MarkdownOptions,
}

impl Default for ReadabilityOptions {
    fn default() -> Self {
        Self {
            char_threshold: 500,
            min_content_length: 20,
            min_unstructured_length: 140,
            excerpt_char_threshold: 25,
            nb_top_candidates: 5,
            max_elems_to_parse: 0,
            link_density_threshold: 0.5,
            sibling_score_ratio: 0.2,
            positive_tokens: Vec::new(),
            negative_tokens: Vec::new(),
            keep_classes: false,
            classes_to_preserve: vec!["page".to_string()],
            content_format: ContentFormat::Html,
            markdown: MarkdownOptions::default(),
        }
    }
}

impl ReadabilityOptions {
    /// Load options from a JSON object; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check that every option is usable
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("link_density_threshold", self.link_density_threshold),
            ("sibling_score_ratio", self.sibling_score_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ReadabilityError::InvalidOption(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if self.nb_top_candidates == 0 {
            return Err(ReadabilityError::InvalidOption(
                "nb_top_candidates must be at least 1".to_string(),
            ));
        }

        if let Some(token) = self
            .positive_tokens
            .iter()
            .chain(&self.negative_tokens)
            .find(|token| token.trim().is_empty())
        {
            return Err(ReadabilityError::InvalidOption(format!(
                "class tokens must not be blank, got {:?}",
                token
            )));
        }

        self.markdown.validate()?;
        Ok(())
    }
}
