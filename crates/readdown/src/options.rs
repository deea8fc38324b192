//! Rendering options for [`MarkdownService`](crate::MarkdownService).

use serde::{Deserialize, Serialize};

use crate::{MarkdownError, Result};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -) for levels 1 and 2
    Setext,
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    Indented,
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Use reference links [text][ref]
    Referenced,
}

/// Reference style for referenced links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkReferenceStyle {
    /// `[text][1]` with numbered definitions
    #[default]
    Full,
    /// `[text][]` with the text as label
    Collapsed,
    /// `[text]` with the text as label
    Shortcut,
}

/// Where reference definitions are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkReferencePlacement {
    /// All definitions at the end of the output
    #[default]
    Document,
    /// Definitions after the top-level block that used them
    Block,
}

/// Delimiter after ordered list numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderedListDelimiter {
    /// `1.`
    #[default]
    Period,
    /// `1)`
    Paren,
}

impl OrderedListDelimiter {
    pub fn as_char(self) -> char {
        match self {
            OrderedListDelimiter::Period => '.',
            OrderedListDelimiter::Paren => ')',
        }
    }
}

/// Options for MarkdownService
///
/// Missing fields fall back to their defaults when deserialized, so a partial
/// JSON object such as `{"bullet_list_marker": "*"}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Delimiter after ordered list numbers
    pub ordered_list_delimiter: OrderedListDelimiter,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Reference style for referenced links
    pub link_reference_style: LinkReferenceStyle,

    /// Where reference definitions go
    pub link_reference_placement: LinkReferencePlacement,

    /// Characters emitted before the newline of a hard line break
    pub br: String,

    /// Marker standing in for a line break inside a table cell
    pub table_cell_break: String,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "---".to_string(),
            bullet_list_marker: '-',
            ordered_list_delimiter: OrderedListDelimiter::Period,
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: '*',
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            link_reference_placement: LinkReferencePlacement::Document,
            br: "  ".to_string(),
            table_cell_break: "<br>".to_string(),
        }
    }
}

impl MarkdownOptions {
    /// Parse options from a JSON object, then validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let options: MarkdownOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check that every delimiter produces valid Markdown
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.bullet_list_marker, '-' | '*' | '+') {
            return Err(MarkdownError::InvalidOption(format!(
                "bullet_list_marker must be one of '-', '*', '+', got {:?}",
                self.bullet_list_marker
            )));
        }

        if !matches!(self.em_delimiter, '*' | '_') {
            return Err(MarkdownError::InvalidOption(format!(
                "em_delimiter must be '*' or '_', got {:?}",
                self.em_delimiter
            )));
        }

        if !matches!(self.strong_delimiter.as_str(), "**" | "__") {
            return Err(MarkdownError::InvalidOption(format!(
                "strong_delimiter must be \"**\" or \"__\", got {:?}",
                self.strong_delimiter
            )));
        }

        let fence_char = self.fence.chars().next().unwrap_or(' ');
        if self.fence.chars().count() < 3
            || !matches!(fence_char, '`' | '~')
            || self.fence.chars().any(|c| c != fence_char)
        {
            return Err(MarkdownError::InvalidOption(format!(
                "fence must be three or more backticks or tildes, got {:?}",
                self.fence
            )));
        }

        if !is_thematic_break(&self.hr) {
            return Err(MarkdownError::InvalidOption(format!(
                "hr must be a thematic break such as \"---\" or \"* * *\", got {:?}",
                self.hr
            )));
        }

        if self.br.contains('\n') || self.table_cell_break.contains('\n') {
            return Err(MarkdownError::InvalidOption(
                "br and table_cell_break must not contain newlines".to_string(),
            ));
        }

        Ok(())
    }

    /// The character a fenced code block is built from
    pub(crate) fn fence_char(&self) -> char {
        self.fence.chars().next().unwrap_or('`')
    }
}

/// Three or more of the same `-`, `*` or `_`, optionally separated by spaces
fn is_thematic_break(hr: &str) -> bool {
    let mut marks = hr.chars().filter(|c| *c != ' ' && *c != '\t');
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = MarkdownOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.heading_style, HeadingStyle::Atx);
        assert_eq!(options.bullet_list_marker, '-');
        assert_eq!(options.code_block_style, CodeBlockStyle::Fenced);
    }

    #[test]
    fn test_invalid_bullet_marker() {
        let options = MarkdownOptions {
            bullet_list_marker: '#',
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(MarkdownError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_invalid_fence() {
        for fence in ["``", "~~`", "---", ""] {
            let options = MarkdownOptions {
                fence: fence.to_string(),
                ..Default::default()
            };
            assert!(options.validate().is_err(), "fence {fence:?} accepted");
        }

        let options = MarkdownOptions {
            fence: "~~~~".to_string(),
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_thematic_break() {
        assert!(is_thematic_break("---"));
        assert!(is_thematic_break("* * *"));
        assert!(is_thematic_break("___"));
        assert!(!is_thematic_break("--"));
        assert!(!is_thematic_break("-*-"));
        assert!(!is_thematic_break("==="));
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            MarkdownOptions::from_json(r#"{"bullet_list_marker": "*", "heading_style": "setext"}"#)
                .unwrap();
        assert_eq!(options.bullet_list_marker, '*');
        assert_eq!(options.heading_style, HeadingStyle::Setext);
        assert_eq!(options.fence, "```");
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(matches!(
            MarkdownOptions::from_json(r#"{"em_delimiter": "~"}"#),
            Err(MarkdownError::InvalidOption(_))
        ));
        assert!(matches!(
            MarkdownOptions::from_json(r#"{"heading_style": "fancy"}"#),
            Err(MarkdownError::Config(_))
        ));
    }
}
