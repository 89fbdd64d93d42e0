// Shared test helpers for mdbridge.

#![allow(dead_code)]

use mdbridge::{
    dom_to_markdown_with, dom_to_tree, tree_to_dom, tree_to_markdown, Dialect, Options,
    RenderOptions, Tree,
};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Markdown for `html` read as `dialect`, with default options.
pub fn md(html: &str, dialect: Dialect) -> String {
    dom_to_markdown_with(html, dialect, &Options::default())
        .unwrap_or_else(|e| panic!("conversion failed for {html:?}: {e}"))
}

/// Markdown for editor DOM with the caret kept.
pub fn md_with_caret(html: &str, dialect: Dialect) -> String {
    let options = Options::new().with_keep_caret(true);
    dom_to_markdown_with(html, dialect, &options)
        .unwrap_or_else(|e| panic!("conversion failed for {html:?}: {e}"))
}

/// Tree built from plain HTML.
pub fn tree(html: &str) -> Tree {
    dom_to_tree(html, Dialect::Html, &Options::default())
        .unwrap_or_else(|e| panic!("transduce failed for {html:?}: {e}"))
}

pub fn format(tree: &Tree) -> String {
    tree_to_markdown(tree, &RenderOptions::default())
        .unwrap_or_else(|e| panic!("format failed: {e}"))
}

/// Markdown of `tree`, and Markdown of the same tree after a trip through
/// the `dialect` DOM.
pub fn roundtrip(tree: &Tree, dialect: Dialect) -> (String, String) {
    let dom = tree_to_dom(tree, dialect, &RenderOptions::default())
        .unwrap_or_else(|e| panic!("{dialect} render failed: {e}"));
    let back = dom_to_tree(&dom, dialect, &Options::new().with_keep_caret(true))
        .unwrap_or_else(|e| panic!("{dialect} transduce failed: {e}"));
    (format(tree), format(&back))
}

/// Whether CommonMark sees a paragraph inside any list item, i.e. whether
/// some list in `md` is loose.
pub fn has_loose_list(md: &str) -> bool {
    let mut depth = 0usize;
    for event in Parser::new(md) {
        match event {
            Event::Start(Tag::Item) => depth += 1,
            Event::End(TagEnd::Item) => depth = depth.saturating_sub(1),
            Event::Start(Tag::Paragraph) if depth > 0 => return true,
            _ => {}
        }
    }
    false
}

/// Number of list items CommonMark finds in `md`.
pub fn item_count(md: &str) -> usize {
    Parser::new(md)
        .filter(|e| matches!(e, Event::Start(Tag::Item)))
        .count()
}
