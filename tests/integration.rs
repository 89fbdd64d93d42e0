// End-to-end API tests for mdbridge.

mod common;

use common::{format, has_loose_list, item_count, md, tree};
use mdbridge::{
    html_to_markdown, tree_to_html, tree_to_json, ConvertError, Dialect, FormatRenderer, NodeKind,
    RenderOptions, Renderer,
};
use pretty_assertions::assert_eq;
use pulldown_cmark::{Event, Parser};

#[test]
fn test_empty_input() {
    assert_eq!(html_to_markdown("").unwrap(), "\n");
}

#[test]
fn test_plain_text_becomes_paragraph() {
    assert_eq!(html_to_markdown("Hello, world!").unwrap(), "Hello, world!\n");
}

#[test]
fn test_inline_runs() {
    assert_eq!(
        md("<p>a <em>b</em> and <strong>c</strong></p>", Dialect::Html),
        "a *b* and **c**\n"
    );
}

#[test]
fn test_heading_and_paragraph() {
    assert_eq!(md("<h1>Hello</h1><p>World</p>", Dialect::Html), "# Hello\n\nWorld\n");
}

#[test]
fn test_code_block_keeps_language() {
    assert_eq!(
        md("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>", Dialect::Html),
        "```rust\nfn main() {}\n```\n"
    );
}

#[test]
fn test_link_with_title() {
    assert_eq!(
        md("<p><a href=\"https://example.com\" title=\"t\">x</a></p>", Dialect::Html),
        "[x](https://example.com \"t\")\n"
    );
}

#[test]
fn test_ordered_list_start() {
    assert_eq!(md("<ol start=\"3\"><li>a</li><li>b</li></ol>", Dialect::Html), "3. a\n4. b\n");
}

#[test]
fn test_task_list() {
    let out = md(
        "<ul><li><input type=\"checkbox\" checked> done</li><li><input type=\"checkbox\"> todo</li></ul>",
        Dialect::Html,
    );
    assert_eq!(out, "* [X] done\n* [ ] todo\n");
}

#[test]
fn test_table_is_padded_and_aligned() {
    let html = "<table><thead><tr><th>a</th><th align=\"right\">b</th></tr></thead>\
                <tbody><tr><td>long</td><td align=\"right\">cc</td></tr></tbody></table>";
    assert_eq!(md(html, Dialect::Html), "| a    |  b |\n| ---- | -: |\n| long | cc |\n");
}

#[test]
fn test_unknown_tags_are_transparent() {
    assert_eq!(md("<p>a <x-widget>b</x-widget> c</p>", Dialect::Html), "a b c\n");
}

#[test]
fn test_unknown_wrapper_around_paragraph() {
    for html in ["<div class=\"x\"><p>a</p></div>", "<section><x-box><p>a</p></x-box></section>"] {
        let t = tree(html);
        let paragraphs = t
            .descendants(t.root())
            .into_iter()
            .filter(|&id| t[id].kind == NodeKind::Paragraph)
            .count();
        assert_eq!(paragraphs, 1, "{html}");
        assert_eq!(format(&t), "a\n");
    }
}

#[test]
fn test_code_span_with_backtick_runs() {
    let out = md("<p><code>a``b</code></p>", Dialect::Html);
    assert_eq!(out, "```a``b```\n");
    let code: Vec<_> = Parser::new(&out)
        .filter_map(|e| match e {
            Event::Code(c) => Some(c.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(code, vec!["a``b".to_string()]);
}

#[test]
fn test_scripts_and_styles_are_dropped() {
    let html = "<style>p { color: red }</style><p>kept</p><script>alert(1)</script>";
    assert_eq!(md(html, Dialect::Html), "kept\n");
}

// ---------------------------------------------------------------------------
// Tight and loose lists
// ---------------------------------------------------------------------------

#[test]
fn test_single_block_items_are_tight() {
    let t = tree("<ul><li>a</li><li>b</li></ul>");
    let out = format(&t);
    assert_eq!(out, "* a\n* b\n");
    assert!(!has_loose_list(&out));
    assert_eq!(item_count(&out), 2);

    let html = tree_to_html(&t, &RenderOptions::default()).unwrap();
    assert!(!html.contains("<p>"), "{html}");
}

#[test]
fn test_explicit_loose_flag() {
    let dom = "<ul data-tight=\"false\" data-marker=\"*\" data-block=\"0\">\
               <li data-marker=\"*\"><p data-block=\"0\">a</p></li>\
               <li data-marker=\"*\"><p data-block=\"0\">b</p></li></ul>";
    let out = md(dom, Dialect::Wysiwyg);
    assert_eq!(out, "* a\n\n* b\n");
    assert!(has_loose_list(&out));

    let t = mdbridge::dom_to_tree(dom, Dialect::Wysiwyg, &mdbridge::Options::default()).unwrap();
    let html = tree_to_html(&t, &RenderOptions::default()).unwrap();
    assert!(html.contains("<p>a</p>"), "{html}");
}

#[test]
fn test_item_with_two_paragraphs_is_loose() {
    let out = md("<ul><li><p>a</p><p>b</p></li><li><p>c</p></li></ul>", Dialect::Html);
    assert!(has_loose_list(&out), "{out:?}");
    assert_eq!(item_count(&out), 2);
}

// ---------------------------------------------------------------------------
// Other outputs
// ---------------------------------------------------------------------------

#[test]
fn test_json_output_is_nested() {
    let t = tree("<p>x</p>");
    let json = tree_to_json(&t, &RenderOptions::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["type"], "Document");
    assert_eq!(value["children"][0]["type"], "Paragraph");
    assert_eq!(value["children"][0]["children"][0]["data"], "x");
}

#[test]
fn test_missing_handler_is_an_error() {
    let t = tree("<hr>");
    let mut renderer = FormatRenderer::default();
    renderer.remove_handler(NodeKind::ThematicBreak);
    match renderer.render(&t) {
        Err(ConvertError::NoRenderer { kind, .. }) => assert_eq!(kind, NodeKind::ThematicBreak),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_extension_handler_replaces_output() {
    let t = tree("<p>a</p><hr>");
    let mut renderer = FormatRenderer::default();
    renderer.register_ext(
        NodeKind::ThematicBreak,
        Box::new(|_, _, entering| {
            let out = if entering { "***\n".to_string() } else { String::new() };
            (out, mdbridge::ast::WalkStatus::SkipChildren)
        }),
    );
    assert_eq!(renderer.render(&t).unwrap(), "a\n\n***\n");
}
