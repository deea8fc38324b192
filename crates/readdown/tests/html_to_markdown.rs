use pretty_assertions::assert_eq;
use readdown::{
    CodeBlockStyle, LinkReferencePlacement, LinkReferenceStyle, LinkStyle, MarkdownOptions,
    MarkdownService, OrderedListDelimiter,
};

fn service_with(options: MarkdownOptions) -> MarkdownService {
    MarkdownService::with_options(options).expect("options should be valid")
}

fn render(html: &str) -> String {
    MarkdownService::new().render_html(html)
}

#[test]
fn headings() {
    let result = render("<h1>Heading 1</h1><h2>Heading 2</h2><h3>Heading 3</h3>");
    assert_eq!(result, "# Heading 1\n\n## Heading 2\n\n### Heading 3");
}

#[test]
fn paragraphs_are_separated_by_one_blank_line() {
    let result = render("<p>First paragraph.</p>\n\n\n<p>Second paragraph.</p>");
    assert_eq!(result, "First paragraph.\n\nSecond paragraph.");
}

#[test]
fn strong_and_emphasis_delimiters() {
    let html = "<p>This is <strong>bold</strong> and <em>italic</em> text</p>";
    assert_eq!(render(html), "This is **bold** and *italic* text");

    let service = service_with(MarkdownOptions {
        strong_delimiter: "__".to_string(),
        em_delimiter: '_',
        ..Default::default()
    });
    assert_eq!(service.render_html(html), "This is __bold__ and _italic_ text");
}

#[test]
fn emphasis_flanking_whitespace_moves_outside() {
    assert_eq!(render("<p>This is<strong> bold </strong>text</p>"), "This is **bold** text");
}

#[test]
fn whitespace_collapses_across_inline_elements() {
    assert_eq!(render("<p>Hello <em> world</em></p>"), "Hello *world*");
    assert_eq!(render("<p><em>Hello </em> world</p>"), "*Hello* world");
    assert_eq!(
        render("<p>Read <a href=\"/a\"> the  guide </a> first</p>"),
        "Read [the guide](/a) first"
    );
}

#[test]
fn links_and_images() {
    assert_eq!(
        render(r#"<a href="https://example.com">Example</a>"#),
        "[Example](https://example.com)"
    );
    assert_eq!(
        render(r#"<a href="https://example.com" title="Example Site">Example</a>"#),
        r#"[Example](https://example.com "Example Site")"#
    );
    assert_eq!(
        render(r#"<img src="https://example.com/image.jpg" alt="Test Image">"#),
        "![Test Image](https://example.com/image.jpg)"
    );
    assert_eq!(
        render(r#"<img src="https://example.com/image.jpg" alt="Test" title="Image Title">"#),
        r#"![Test](https://example.com/image.jpg "Image Title")"#
    );
    assert_eq!(render(r#"<img src="x.png">"#), "![](x.png)");
    assert_eq!(render(r#"<a name="top">Top</a>"#), "Top");
}

#[test]
fn unordered_lists() {
    let result = render("<ul><li>Item 1</li><li>Item 2</li><li>Item 3</li></ul>");
    assert_eq!(result, "-   Item 1\n-   Item 2\n-   Item 3");

    let service = service_with(MarkdownOptions {
        bullet_list_marker: '*',
        ..Default::default()
    });
    assert_eq!(
        service.render_html("<ul><li>Item 1</li><li>Item 2</li></ul>"),
        "*   Item 1\n*   Item 2"
    );
}

#[test]
fn ordered_lists() {
    let result = render("<ol><li>First</li><li>Second</li><li>Third</li></ol>");
    assert_eq!(result, "1.  First\n2.  Second\n3.  Third");

    assert_eq!(
        render(r#"<ol start="9"><li>Nine</li><li>Ten</li></ol>"#),
        "9.  Nine\n10. Ten"
    );

    let service = service_with(MarkdownOptions {
        ordered_list_delimiter: OrderedListDelimiter::Paren,
        ..Default::default()
    });
    assert_eq!(service.render_html("<ol><li>One</li></ol>"), "1)  One");
}

#[test]
fn nested_lists_are_indented() {
    let html = r#"
        <ul>
          <li>Item 1</li>
          <li>Item 2
            <ul>
              <li>Nested 1</li>
              <li>Nested 2</li>
            </ul>
          </li>
          <li>Item 3</li>
        </ul>
    "#;
    assert_eq!(
        render(html),
        "-   Item 1\n-   Item 2\n    -   Nested 1\n    -   Nested 2\n-   Item 3"
    );
}

#[test]
fn list_item_with_paragraphs() {
    let result = render("<ul><li><p>First</p><p>Second</p></li></ul>");
    assert_eq!(result, "-   First\n\n    Second");
}

#[test]
fn task_list_items() {
    let html = r#"<ul><li><input type="checkbox" checked> Done</li><li><input type="checkbox">Todo</li></ul>"#;
    assert_eq!(render(html), "-   [x] Done\n-   [ ] Todo");
}

#[test]
fn inline_code() {
    assert_eq!(
        render("<p>Use the <code>console.log()</code> function.</p>"),
        "Use the `console.log()` function."
    );
    assert_eq!(
        render("<p><code>a `tick` b</code></p>"),
        "``a `tick` b``"
    );
}

#[test]
fn fenced_code_blocks() {
    let html = "<pre><code>function hello() {\n  console.log(\"Hello\");\n}</code></pre>";
    assert_eq!(
        render(html),
        "```\nfunction hello() {\n  console.log(\"Hello\");\n}\n```"
    );

    assert_eq!(
        render(r#"<pre><code class="language-javascript">const x = 1;</code></pre>"#),
        "```javascript\nconst x = 1;\n```"
    );

    let service = service_with(MarkdownOptions {
        fence: "~~~".to_string(),
        ..Default::default()
    });
    assert_eq!(
        service.render_html("<pre><code>code here</code></pre>"),
        "~~~\ncode here\n~~~"
    );
}

#[test]
fn fence_grows_past_backticks_in_code() {
    let result = render("<pre><code>```\ninner\n```</code></pre>");
    assert_eq!(result, "````\n```\ninner\n```\n````");
}

#[test]
fn code_is_not_escaped() {
    let result = render("<pre><code>let x = a * b_c [0];</code></pre>");
    assert_eq!(result, "```\nlet x = a * b_c [0];\n```");
}

#[test]
fn indented_code_blocks() {
    let service = service_with(MarkdownOptions {
        code_block_style: CodeBlockStyle::Indented,
        ..Default::default()
    });
    assert_eq!(
        service.render_html("<p>Code:</p><pre><code>line 1\n\nline 3\n</code></pre>"),
        "Code:\n\n    line 1\n\n    line 3"
    );
}

#[test]
fn pre_without_code_keeps_whitespace() {
    let result = render("<pre>  indented\n    more indented</pre>");
    assert_eq!(result, "```\n  indented\n    more indented\n```");
}

#[test]
fn blockquotes() {
    assert_eq!(
        render("<blockquote><p>This is a quote.</p></blockquote>"),
        "> This is a quote."
    );
    assert_eq!(
        render("<blockquote><p>First paragraph.</p><p>Second paragraph.</p></blockquote>"),
        "> First paragraph.\n>\n> Second paragraph."
    );
    assert_eq!(
        render("<blockquote><p>Outer quote</p><blockquote><p>Inner quote</p></blockquote></blockquote>"),
        "> Outer quote\n>\n> > Inner quote"
    );
}

#[test]
fn tables_with_header_section() {
    let html = r#"
        <table>
          <thead>
            <tr><th>Name</th><th>Age</th></tr>
          </thead>
          <tbody>
            <tr><td>John</td><td>25</td></tr>
            <tr><td>Jane</td><td>30</td></tr>
          </tbody>
        </table>
    "#;
    assert_eq!(
        render(html),
        "| Name | Age |\n| ---- | --- |\n| John | 25  |\n| Jane | 30  |"
    );
}

#[test]
fn table_alignment_and_caption() {
    let html = r#"
        <table>
          <caption>Prices</caption>
          <tr><th align="left">Item</th><th style="text-align: right">Cost</th></tr>
          <tr><td>Tea</td><td>3</td></tr>
        </table>
    "#;
    assert_eq!(
        render(html),
        "Prices\n\n| Item | Cost |\n| :--- | ---: |\n| Tea  |    3 |"
    );
}

#[test]
fn pipes_in_cells_are_escaped() {
    let html = "<table><tr><th>Expr</th></tr><tr><td>a | b</td></tr></table>";
    assert_eq!(render(html), "| Expr   |\n| ------ |\n| a \\| b |");
}

#[test]
fn horizontal_rules() {
    assert_eq!(render("<p>Before</p><hr><p>After</p>"), "Before\n\n---\n\nAfter");

    let service = service_with(MarkdownOptions {
        hr: "***".to_string(),
        ..Default::default()
    });
    assert_eq!(service.render_html("<p>Before</p><hr><p>After</p>"), "Before\n\n***\n\nAfter");
}

#[test]
fn strikethrough_and_highlight() {
    assert_eq!(
        render("<p><del>old</del> <s>gone</s> <mark>new</mark></p>"),
        "~~old~~ ~~gone~~ `new`"
    );
}

#[test]
fn line_breaks() {
    assert_eq!(render("<p>Line 1<br>Line 2</p>"), "Line 1  \nLine 2");
    let result = render("<p>Line 1<br><br><br>Line 2</p>");
    assert!(result.starts_with("Line 1"));
    assert!(result.ends_with("Line 2"));
}

#[test]
fn reference_links_full() {
    let service = service_with(MarkdownOptions {
        link_style: LinkStyle::Referenced,
        ..Default::default()
    });
    let html = r#"<p><a href="https://a.example">A</a> and <a href="https://b.example" title="Bee">B</a> and <a href="https://a.example">again</a></p>"#;
    assert_eq!(
        service.render_html(html),
        "[A][1] and [B][2] and [again][1]\n\n[1]: https://a.example\n[2]: https://b.example \"Bee\""
    );
}

#[test]
fn reference_links_collapsed_and_shortcut() {
    let html = r#"<p><a href="https://docs.example">Docs</a></p>"#;

    let collapsed = service_with(MarkdownOptions {
        link_style: LinkStyle::Referenced,
        link_reference_style: LinkReferenceStyle::Collapsed,
        ..Default::default()
    });
    assert_eq!(
        collapsed.render_html(html),
        "[Docs][]\n\n[Docs]: https://docs.example"
    );

    let shortcut = service_with(MarkdownOptions {
        link_style: LinkStyle::Referenced,
        link_reference_style: LinkReferenceStyle::Shortcut,
        ..Default::default()
    });
    assert_eq!(shortcut.render_html(html), "[Docs]\n\n[Docs]: https://docs.example");
}

#[test]
fn reference_definitions_after_each_block() {
    let service = service_with(MarkdownOptions {
        link_style: LinkStyle::Referenced,
        link_reference_placement: LinkReferencePlacement::Block,
        ..Default::default()
    });
    let html = r#"<p><a href="https://a.example">A</a></p><p><a href="https://b.example">B</a></p>"#;
    assert_eq!(
        service.render_html(html),
        "[A][1]\n\n[1]: https://a.example\n\n[B][2]\n\n[2]: https://b.example"
    );
}

#[test]
fn mixed_article() {
    let html = r#"
        <article>
          <h1>Article Title</h1>
          <p>This is a paragraph with <strong>bold</strong> and <em>italic</em> text.</p>
          <p>Here's a <a href="https://example.com">link</a>.</p>
          <ul>
            <li>List item 1</li>
            <li>List item 2</li>
          </ul>
          <pre><code class="language-javascript">console.log('Hello');</code></pre>
        </article>
    "#;
    assert_eq!(
        render(html),
        "# Article Title\n\n\
         This is a paragraph with **bold** and *italic* text.\n\n\
         Here's a [link](https://example.com).\n\n\
         -   List item 1\n-   List item 2\n\n\
         ```javascript\nconsole.log('Hello');\n```"
    );
}

#[test]
fn special_characters_pass_through() {
    assert_eq!(
        render("<p>Special chars: &lt; &gt; &amp; &quot;</p>"),
        "Special chars: < > & \""
    );
}

#[test]
fn text_that_looks_like_markdown_is_escaped() {
    assert_eq!(render("<p>1. not a list</p>"), "1\\. not a list");
    assert_eq!(render("<p># not a heading</p>"), "\\# not a heading");
    assert_eq!(render("<p>*stars* and [brackets]</p>"), "\\*stars\\* and \\[brackets\\]");
}

#[test]
fn empty_elements() {
    assert_eq!(render("<p></p><div></div><h1>Title</h1>"), "# Title");
    assert_eq!(render(""), "");
    assert_eq!(render("<div>   </div>"), "");
}

#[test]
fn non_content_elements_are_dropped() {
    let html = "<p>Visible</p><script>var x = 1;</script><style>p {}</style><noscript>js</noscript>";
    assert_eq!(render(html), "Visible");
}

#[test]
fn malformed_html() {
    let result = render("<p>Unclosed paragraph<div>Nested incorrectly</div>");
    assert_eq!(result, "Unclosed paragraph\n\nNested incorrectly");
}

#[test]
fn very_long_text() {
    let long_text = "a".repeat(10_000);
    let result = render(&format!("<p>{}</p>", long_text));
    assert_eq!(result.len(), 10_000);
}

#[test]
fn nested_divs() {
    let result = render("<div><div><div><div><p>Deeply nested</p></div></div></div></div>");
    assert_eq!(result, "Deeply nested");
}

#[test]
fn nesting_beyond_the_depth_limit_keeps_text() {
    let html = format!(
        "{}<p>deep <em>text</em></p>{}",
        "<div>".repeat(1_000),
        "</div>".repeat(1_000)
    );
    let result = render(&html);
    assert_eq!(result, "deep text");
}

#[test]
fn keep_and_remove_filters() {
    let mut service = MarkdownService::new();
    service
        .keep(readdown::Filter::tag("sup"))
        .remove(readdown::Filter::tag("aside"));
    let result = service.render_html("<p>E = mc<sup>2</sup></p><aside>Ad</aside>");
    assert_eq!(result, "E = mc<sup>2</sup>");
}

#[test]
fn service_is_shared_across_threads() {
    let service = MarkdownService::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = &service;
                scope.spawn(move || service.render_html(&format!("<h2>Part {}</h2>", i)))
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("## Part {}", i));
        }
    });
}

#[test]
fn options_from_json() {
    let service = MarkdownService::from_json(r#"{"heading_style": "setext", "bullet_list_marker": "+"}"#)
        .expect("valid json options");
    assert_eq!(
        service.render_html("<h1>Title</h1><ul><li>x</li></ul>"),
        "Title\n=====\n\n+   x"
    );
    assert!(MarkdownService::from_json(r#"{"fence": "``"}"#).is_err());
    assert!(MarkdownService::from_json("not json").is_err());
}

#[test]
fn rules_from_boxed_functions() {
    use readdown::{NodeRef, RenderContext};

    let only_notes: readdown::PredicateFn =
        Box::new(|tag: &str, node: &NodeRef<'_>, _: &RenderContext<'_>| {
            tag == "span" && node.attr("class") == Some("note")
        });
    let replacement: readdown::ReplacementFn =
        Box::new(|_: &NodeRef<'_>, content: &str, _: &RenderContext<'_>| format!("[{}]", content));

    let mut service = MarkdownService::new();
    service.add_rule(
        "note",
        readdown::Rule {
            filter: readdown::Filter::Predicate(only_notes),
            replacement,
        },
    );
    assert_eq!(
        service.render_html(r#"<p>See <span class="note">below</span> and <span>here</span></p>"#),
        "See [below] and here"
    );
}
