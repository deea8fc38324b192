use serde::{Deserialize, Serialize};

/// An extracted article
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Article {
    /// Article title
    pub title: String,

    /// Author attribution
    pub byline: Option<String>,

    /// Text direction (`ltr`, `rtl` or `auto`)
    pub dir: Option<String>,

    /// Document language from `<html lang>`
    pub lang: Option<String>,

    /// Cleaned article content, HTML or Markdown
    pub content: String,

    /// Plain text of the content with whitespace collapsed
    pub text_content: String,

    /// Character count of `text_content`
    pub length: usize,

    /// Short description or the first substantial paragraph
    pub excerpt: Option<String>,

    /// Name of the publishing site
    pub site_name: Option<String>,

    /// Publication timestamp as found in the document
    pub published_time: Option<String>,
}
