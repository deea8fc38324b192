//! Name patterns and tag tables for the content heuristics.

use once_cell::sync::Lazy;
use regex::Regex;

/// Class/id names of page furniture that is almost never article content
pub(crate) static UNLIKELY_CANDIDATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)-ad-|advert|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    )
    .expect("valid unlikely candidates regex")
});

/// Names that rescue an otherwise unlikely candidate
pub(crate) static MAYBE_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)and|article|body|column|content|main|mathjax|shadow")
        .expect("valid maybe candidate regex")
});

pub(crate) static POSITIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story",
    )
    .expect("valid positive regex")
});

pub(crate) static NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)-ad-|advertis|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget",
    )
    .expect("valid negative regex")
});

pub(crate) static BYLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)byline|author|dateline|writtenby|p-author").expect("valid byline regex")
});

pub(crate) static VIDEOS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)//(www\.)?((dailymotion|youtube|youtube-nocookie|player\.vimeo|v\.qq|bilibili|live\.bilibili)\.com|(archive|upload\.wikimedia)\.org|player\.twitch\.tv)",
    )
    .expect("valid videos regex")
});

pub(crate) static SHARE_ELEMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\b|_)(share|sharedaddy)(\b|_)").expect("valid share regex")
});

pub(crate) static COMMAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,\u{060C}\u{FE50}\u{FE10}\u{FE11}\u{2E41}\u{2E34}\u{2E32}\u{FF0C}]")
        .expect("valid commas regex")
});

pub(crate) static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.( |$)").expect("valid sentence end regex"));

pub(crate) static JSON_LD_ARTICLE_TYPES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(Article|AdvertiserContentArticle|NewsArticle|AnalysisNewsArticle|AskPublicNewsArticle|BackgroundNewsArticle|BlogPosting|DiscussionForumPosting|LiveBlogPosting|OpinionNewsArticle|ReportageNewsArticle|ReviewNewsArticle|Report|SatiricalArticle|ScholarlyArticle|MedicalScholarlyArticle|SocialMediaPosting|TechArticle)$",
    )
    .expect("valid json-ld types regex")
});

/// `role` values of page furniture
pub(crate) const UNLIKELY_ROLES: &[&str] = &[
    "menu",
    "menubar",
    "complementary",
    "navigation",
    "alert",
    "alertdialog",
    "dialog",
];

/// Elements whose text feeds the content score
pub(crate) const TAGS_TO_SCORE: &[&str] =
    &["section", "h2", "h3", "h4", "h5", "h6", "p", "td", "pre"];

/// Block children that stop a `div` from being treated as a paragraph
pub(crate) const DIV_TO_P_ELEMENTS: &[&str] = &[
    "blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul",
];

pub(crate) const PHRASING_ELEMENTS: &[&str] = &[
    "abbr", "audio", "b", "bdo", "br", "button", "cite", "code", "data", "datalist", "dfn", "em",
    "embed", "i", "img", "input", "kbd", "label", "mark", "math", "meter", "noscript", "object",
    "output", "progress", "q", "ruby", "samp", "script", "select", "small", "span", "strong",
    "sub", "sup", "textarea", "time", "var", "wbr",
];

/// Attributes that only affect presentation
pub(crate) const PRESENTATIONAL_ATTRIBUTES: &[&str] = &[
    "align",
    "background",
    "bgcolor",
    "border",
    "cellpadding",
    "cellspacing",
    "frame",
    "hspace",
    "rules",
    "style",
    "valign",
    "vspace",
];

/// Elements whose `width`/`height` attributes are presentational
pub(crate) const DEPRECATED_SIZE_ELEMENTS: &[&str] = &["table", "th", "td", "hr", "pre"];

pub(crate) const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlikely_names() {
        assert!(UNLIKELY_CANDIDATES.is_match("advertisement "));
        assert!(UNLIKELY_CANDIDATES.is_match("site-footer main-footer"));
        assert!(MAYBE_CANDIDATE.is_match("main-content sidebar"));
        assert!(!UNLIKELY_CANDIDATES.is_match("story-body "));
    }

    #[test]
    fn test_class_weight_patterns() {
        assert!(POSITIVE.is_match("entry-content"));
        assert!(NEGATIVE.is_match("share-buttons"));
        assert!(NEGATIVE.is_match("hid"));
        assert!(!NEGATIVE.is_match("article-body"));
    }

    #[test]
    fn test_commas_include_fullwidth() {
        assert_eq!(COMMAS.find_iter("a, b，c").count(), 2);
    }

    #[test]
    fn test_videos() {
        assert!(VIDEOS.is_match("https://www.youtube.com/embed/abc"));
        assert!(!VIDEOS.is_match("https://example.com/embed/abc"));
    }
}
