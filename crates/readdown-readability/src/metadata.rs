//! Document metadata: JSON-LD, `<meta>` tags and the page title.
//!
//! Metadata is read from the untouched document before any cleanup, since the
//! preprocessing pass drops `<script>` and `<meta>` elements.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::dom::{normalize_spaces, Dom, NodeId};
use crate::patterns::JSON_LD_ARTICLE_TYPES;

static META_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s*(article|dc|dcterm|og|twitter)\s*:\s*(author|creator|description|published_time|title|site_name)\s*",
    )
    .expect("valid meta property regex")
});

static META_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(dc|dcterm|og|twitter|parsely|weibo:(article|webpage))\s*[-\.:]\s*)?(author|creator|pub-date|description|title|site_name)\s*$",
    )
    .expect("valid meta name regex")
});

const HEADING_BREAKS: &[&str] = &[
    "p", "div", "section", "ul", "ol", "dl", "table", "pre", "blockquote",
];

static SCHEMA_ORG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://schema\.org/?$").expect("valid schema.org regex"));

static TITLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" [\|\-–—\\/>»] ").expect("valid title separator regex"));

static HIERARCHICAL_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" [\\/>»] ").expect("valid hierarchical separator regex"));

static BEFORE_LAST_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)[\|\-–—\\/>»] .*$").expect("valid title prefix regex"));

static AFTER_FIRST_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\|\-–—\\/>»]*[\|\-–—\\/>»](.*)$").expect("valid title suffix regex"));

static SEPARATOR_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\|\-–—\\/>»]+").expect("valid separator run regex"));

const TITLE_KEYS: &[&str] = &[
    "dc:title",
    "dcterm:title",
    "og:title",
    "weibo:article:title",
    "weibo:webpage:title",
    "title",
    "twitter:title",
    "parsely-title",
];

const BYLINE_KEYS: &[&str] = &["dc:creator", "dcterm:creator", "author", "parsely-author"];

const EXCERPT_KEYS: &[&str] = &[
    "dc:description",
    "dcterm:description",
    "og:description",
    "weibo:article:description",
    "weibo:webpage:description",
    "description",
    "twitter:description",
];

const PUBLISHED_KEYS: &[&str] = &["article:published_time", "parsely-pub-date"];

/// Metadata gathered from the document head and structured data
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
    pub lang: Option<String>,
    pub dir: Option<String>,
}

/// Collect metadata, preferring JSON-LD over `<meta>` tags over the markup
pub(crate) fn collect(dom: &Dom) -> Metadata {
    let json_ld = json_ld(dom);
    let values = meta_values(dom);
    let pick = |keys: &[&str]| keys.iter().find_map(|key| values.get(*key).cloned());

    let html = dom.first_by_tag(Dom::ROOT, "html");
    let html_attr = |name: &str| {
        html.and_then(|h| dom.attr(h, name))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let metadata = Metadata {
        title: json_ld
            .title
            .or_else(|| pick(TITLE_KEYS))
            .or_else(|| article_title(dom)),
        byline: json_ld.byline.or_else(|| pick(BYLINE_KEYS)).or_else(|| {
            values
                .get("article:author")
                .filter(|author| !author.starts_with("http://") && !author.starts_with("https://"))
                .cloned()
        }),
        excerpt: json_ld.excerpt.or_else(|| pick(EXCERPT_KEYS)),
        site_name: json_ld.site_name.or_else(|| pick(&["og:site_name"])),
        published_time: json_ld.published_time.or_else(|| pick(PUBLISHED_KEYS)),
        lang: html_attr("lang"),
        dir: html_attr("dir"),
    };
    trace!(?metadata, "collected metadata");
    metadata
}

/// `<meta>` contents keyed by their normalized `property` or `name`
fn meta_values(dom: &Dom) -> IndexMap<String, String> {
    let mut values = IndexMap::new();

    for meta in dom.elements_by_tag(Dom::ROOT, &["meta"]) {
        let Some(content) = dom
            .attr(meta, "content")
            .map(str::trim)
            .filter(|content| !content.is_empty())
        else {
            continue;
        };

        let mut matched = false;
        if let Some(property) = dom.attr(meta, "property") {
            for found in META_PROPERTY.find_iter(property) {
                let key: String = found
                    .as_str()
                    .to_ascii_lowercase()
                    .split_whitespace()
                    .collect();
                values.insert(key, content.to_string());
                matched = true;
            }
        }

        if !matched {
            if let Some(name) = dom.attr(meta, "name").filter(|n| META_NAME.is_match(n)) {
                let key: String = name
                    .to_ascii_lowercase()
                    .split_whitespace()
                    .collect::<String>()
                    .replace('.', ":");
                values.insert(key, content.to_string());
            }
        }
    }

    values
}

/// Metadata from the first schema.org article object in JSON-LD
fn json_ld(dom: &Dom) -> Metadata {
    let document_title = dom
        .first_by_tag(Dom::ROOT, "title")
        .map(|t| dom.inner_text(t))
        .unwrap_or_default();

    for script in dom.elements_by_tag(Dom::ROOT, &["script"]) {
        let is_json_ld = dom
            .attr(script, "type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            continue;
        }

        let text = dom.text_content(script);
        let text = text
            .trim()
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();
        let Ok(parsed) = serde_json::from_str::<Value>(text) else {
            trace!("skipping unparsable json-ld");
            continue;
        };

        if let Some(article) = article_object(parsed) {
            return json_ld_metadata(&article, &document_title);
        }
    }

    Metadata::default()
}

fn is_article_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => JSON_LD_ARTICLE_TYPES.is_match(kind),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| JSON_LD_ARTICLE_TYPES.is_match(kind)),
        _ => false,
    }
}

fn has_schema_context(value: &Value) -> bool {
    match value.get("@context") {
        Some(Value::String(context)) => SCHEMA_ORG.is_match(context),
        Some(Value::Object(context)) => context
            .get("@vocab")
            .and_then(Value::as_str)
            .is_some_and(|vocab| SCHEMA_ORG.is_match(vocab)),
        _ => false,
    }
}

fn article_object(parsed: Value) -> Option<Value> {
    let parsed = match parsed {
        Value::Array(items) => items.into_iter().find(is_article_type)?,
        other => other,
    };

    if !has_schema_context(&parsed) {
        return None;
    }

    if parsed.get("@type").is_none() {
        return parsed
            .get("@graph")?
            .as_array()?
            .iter()
            .find(|item| is_article_type(item))
            .cloned();
    }

    is_article_type(&parsed).then_some(parsed)
}

fn json_ld_metadata(article: &Value, document_title: &str) -> Metadata {
    let string = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let name = string(article.get("name"));
    let headline = string(article.get("headline"));
    let title = match (name, headline) {
        (Some(name), Some(headline)) if name != headline => {
            let name_matches = text_similarity(&name, document_title) > 0.75;
            let headline_matches = text_similarity(&headline, document_title) > 0.75;
            if headline_matches && !name_matches {
                Some(headline)
            } else {
                Some(name)
            }
        }
        (name, headline) => name.or(headline),
    };

    let byline = match article.get("author") {
        Some(Value::String(author)) => Some(author.trim().to_string()),
        Some(Value::Array(authors)) => {
            let names: Vec<String> = authors
                .iter()
                .filter_map(|author| string(author.get("name")))
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        Some(author) => string(author.get("name")),
        None => None,
    };

    Metadata {
        title,
        byline,
        excerpt: string(article.get("description")),
        site_name: article.get("publisher").and_then(|p| string(p.get("name"))),
        published_time: string(article.get("datePublished")),
        ..Metadata::default()
    }
}

/// The `<title>` with site names and section paths cut away
fn article_title(dom: &Dom) -> Option<String> {
    let original = dom
        .first_by_tag(Dom::ROOT, "title")
        .map(|t| dom.inner_text(t))
        .unwrap_or_default();

    let mut title = original.clone();
    let mut hierarchical = false;

    if TITLE_SEPARATOR.is_match(&original) {
        hierarchical = HIERARCHICAL_SEPARATOR.is_match(&original);
        title = BEFORE_LAST_SEPARATOR.replace(&original, "$1").into_owned();
        if word_count(&title) < 3 {
            title = AFTER_FIRST_SEPARATOR.replace(&original, "$1").into_owned();
        }
    } else if let Some(first_colon) = original.find(": ") {
        let repeated_in_heading = dom
            .elements_by_tag(Dom::ROOT, &["h1", "h2"])
            .into_iter()
            .any(|h| dom.inner_text(h) == original);
        if !repeated_in_heading {
            let last_colon = original.rfind(':').unwrap_or(first_colon);
            title = original[last_colon + 1..].to_string();
            if word_count(&title) < 3 {
                title = original[first_colon + 1..].to_string();
            } else if word_count(&original[..first_colon]) > 5 {
                title = original.clone();
            }
        }
    } else if original.chars().count() > 150 || original.chars().count() < 15 {
        let headings = dom.elements_by_tag(Dom::ROOT, &["h1"]);
        if let [only] = headings.as_slice() {
            title = heading_text(dom, *only);
        }
    }

    let mut title = normalize_spaces(&title);
    let words = word_count(&title);
    if !original.is_empty()
        && words <= 4
        && (!hierarchical
            || words + 1 != word_count(&SEPARATOR_RUNS.replace_all(&original, "")))
    {
        title = original;
    }

    if title.is_empty() {
        // No usable <title>: fall back to the first top-level heading
        title = dom
            .first_by_tag(Dom::ROOT, "h1")
            .map(|h| heading_text(dom, h))
            .unwrap_or_default();
    }

    (!title.is_empty()).then_some(title)
}

/// Text of a heading up to the first block the parser moved into it, as
/// happens when a heading is never closed
fn heading_text(dom: &Dom, heading: NodeId) -> String {
    let mut text = String::new();
    for &child in dom.children(heading) {
        if HEADING_BREAKS.contains(&dom.tag(child)) && !text.trim().is_empty() {
            break;
        }
        text.push_str(&dom.text_content(child));
    }
    normalize_spaces(&text)
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// How much of `b` is covered by the words of `a`, from 0 to 1
pub(crate) fn text_similarity(a: &str, b: &str) -> f64 {
    fn tokens(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    let tokens_a = tokens(a);
    let tokens_b = tokens(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let unique_b: Vec<&str> = tokens_b
        .iter()
        .filter(|token| !tokens_a.contains(token))
        .map(String::as_str)
        .collect();
    let distance =
        unique_b.join(" ").chars().count() as f64 / tokens_b.join(" ").chars().count() as f64;
    1.0 - distance
}

#[cfg(all(test, feature = "html"))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use readdown_dom::parse_document;

    fn metadata(html: &str) -> Metadata {
        collect(&Dom::from_node(&parse_document(html)))
    }

    #[test]
    fn test_meta_tags() {
        let result = metadata(
            r#"<html lang="en"><head>
                <title>Ignored | Site</title>
                <meta property="og:title" content="Open Graph Title">
                <meta name="author" content="Jane Smith">
                <meta name="description" content="  A short summary.  ">
                <meta property="og:site_name" content="Example News">
                <meta property="article:published_time" content="2024-05-01T10:00:00Z">
            </head><body></body></html>"#,
        );
        assert_eq!(result.title.as_deref(), Some("Open Graph Title"));
        assert_eq!(result.byline.as_deref(), Some("Jane Smith"));
        assert_eq!(result.excerpt.as_deref(), Some("A short summary."));
        assert_eq!(result.site_name.as_deref(), Some("Example News"));
        assert_eq!(result.published_time.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(result.lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_json_ld_takes_priority() {
        let result = metadata(
            r#"<html><head>
                <meta name="author" content="Meta Author">
                <script type="application/ld+json">
                {
                  "@context": "https://schema.org",
                  "@type": "NewsArticle",
                  "headline": "Structured Headline",
                  "author": [{"name": "Ann"}, {"name": "Bob"}],
                  "datePublished": "2024-01-02",
                  "publisher": {"name": "Daily"}
                }
                </script>
            </head><body></body></html>"#,
        );
        assert_eq!(result.title.as_deref(), Some("Structured Headline"));
        assert_eq!(result.byline.as_deref(), Some("Ann, Bob"));
        assert_eq!(result.site_name.as_deref(), Some("Daily"));
        assert_eq!(result.published_time.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_json_ld_graph_and_wrong_context() {
        let graph = metadata(
            r#"<script type="application/ld+json">
                {"@context": "http://schema.org/", "@graph": [
                    {"@type": "WebSite", "name": "Site"},
                    {"@type": "BlogPosting", "name": "Post Name"}
                ]}
            </script>"#,
        );
        assert_eq!(graph.title.as_deref(), Some("Post Name"));

        let foreign = metadata(
            r#"<script type="application/ld+json">
                {"@context": "https://example.org", "@type": "Article", "name": "Nope"}
            </script>"#,
        );
        assert_eq!(foreign.title, None);
    }

    #[test]
    fn test_title_site_name_removed() {
        let result = metadata("<title>Rust Ownership Explained In Depth | Example Blog</title>");
        assert_eq!(result.title.as_deref(), Some("Rust Ownership Explained In Depth"));
    }

    #[test]
    fn test_short_title_keeps_separator() {
        let result = metadata("<title>Home - Example</title>");
        assert_eq!(result.title.as_deref(), Some("Home - Example"));
    }

    #[test]
    fn test_title_colon_hierarchy() {
        let result = metadata("<title>Example News: Scientists find water on distant planet</title>");
        assert_eq!(
            result.title.as_deref(),
            Some("Scientists find water on distant planet")
        );
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let result = metadata("<body><h1>Only Heading</h1><p>text</p></body>");
        assert_eq!(result.title.as_deref(), Some("Only Heading"));
    }

    #[test]
    fn test_unclosed_heading_title_stops_at_first_block() {
        let result = metadata("<body><h1>Broken Heading<p>First paragraph<p>Second</body>");
        assert_eq!(result.title.as_deref(), Some("Broken Heading"));

        let wrapped = metadata("<body><h1><div>Wrapped Heading</div></h1></body>");
        assert_eq!(wrapped.title.as_deref(), Some("Wrapped Heading"));
    }

    #[test]
    fn test_url_author_ignored() {
        let result = metadata(
            r#"<head><meta property="article:author" content="https://example.com/staff/jo"></head>"#,
        );
        assert_eq!(result.byline, None);
    }

    #[test]
    fn test_text_similarity() {
        assert_eq!(text_similarity("Test Blog Post", "test blog post"), 1.0);
        assert_eq!(text_similarity("alpha", "beta"), 0.0);
        assert!(text_similarity("Rust tips", "Rust tips and tricks") < 0.75);
    }
}
