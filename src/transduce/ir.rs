// Instant-rendering editor DOM.
//
// The IR editor shows Markdown syntax next to its rendering: every inline
// node is a `span[data-type]` whose visible text is the node's own Markdown
// source, and block markers are spans of their own. Inline wrappers are
// therefore read back as source text, and marker spans are dropped where
// the tree regenerates them.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;

use super::builder::Builder;
use super::common::*;
use super::dom;
use super::table::{DialectTable, Outcome};
use super::Dialect;
use crate::ast::{Node, NodeKind};
use crate::sentinel::strip_zwsp;

/// Inline wrapper spans whose text is their Markdown source.
const SOURCE_SPANS: &[&str] = &[
    "em", "strong", "s", "mark", "sup", "sub", "link-ref", "a", "code", "emoji", "backslash",
    "inline-math", "inline-node", "img", "html-inline", "html-entity",
];

pub(crate) static TABLE: LazyLock<DialectTable> = LazyLock::new(|| {
    DialectTable::builder(Dialect::Ir)
        .text(text)
        .element(&["p"], paragraph)
        .element(&["div"], block_div)
        .element(&["h1", "h2", "h3", "h4", "h5", "h6"], ir_heading)
        .element(&["hr"], thematic_break)
        .element(&["blockquote"], blockquote)
        .element(&["ul", "ol"], list)
        .element(&["li"], list_item)
        .element(&["input"], input)
        .element(&["table"], table)
        .element(&["thead"], table_head)
        .element(&["tbody", "tfoot"], descend)
        .element(&["tr"], table_row)
        .element(&["th", "td"], table_cell)
        .element(&["pre"], pre)
        .element(&["code"], code)
        .element(&["em", "i", "strong", "b", "s", "del", "strike", "mark", "sub"], delimited)
        .element(&["sup"], sup)
        .element(&["a"], link)
        .element(&["img"], image)
        .element(&["br"], line_break)
        .element(&["span"], span)
        .filter(is_non_content)
        .filter(is_editor_preview)
        .build()
});

/// Text of the first child span with the given `data-type`.
fn typed_child_text(node: &Handle, data_type: &str) -> Option<String> {
    dom::element_children(node)
        .into_iter()
        .find(|c| dom::attr(c, "data-type").as_deref() == Some(data_type))
        .map(|c| strip_zwsp(&dom::dom_text(&c)))
}

/// The editable source `code` of a code-like block.
fn source_code(node: &Handle) -> Option<Handle> {
    let pre = dom::element_children(node)
        .into_iter()
        .find(|c| dom::is(c, "pre") && !is_editor_preview(c))?;
    Some(dom::first_element_child(&pre).filter(|c| dom::is(c, "code")).unwrap_or(pre))
}

fn block_div(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let data_type = dom::attr_or_empty(node, "data-type");
    let code = source_code(node);
    let source = code.as_ref().map(dom::dom_text).unwrap_or_default();
    match data_type.as_str() {
        "code-block" => {
            let fence = typed_child_text(node, "code-block-open-marker").unwrap_or_default();
            let info = typed_child_text(node, "code-block-info").unwrap_or_default();
            emit_code_block(b, fence.trim(), info.trim(), code_text(&source));
        }
        "math-block" => emit_math_block(b, code_text(&source)),
        "yaml-front-matter" => emit_yaml_front_matter(b, code_text(&source)),
        "html-block" => emit_html_block(b, &strip_zwsp(&source)),
        "link-ref-defs-block" => emit_link_ref_defs(b, &strip_zwsp(&dom::dom_text(node))),
        "toc-block" => return toc(b, node),
        "footnotes-block" => return footnotes_block(b, node),
        "footnotes-def" => return footnotes_def(b, &dom::attr_or_empty(node, "data-footnotes-label")),
        "super-block" => return super_block(b, node),
        _ => return div(b, node),
    }
    Outcome::Emitted
}

/// Headings take their level from the `#` run the user typed.
fn ir_heading(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let typed = typed_child_text(node, "heading-marker")
        .map(|m| m.trim().chars().take_while(|&c| c == '#').count())
        .filter(|&n| (1..=6).contains(&n));
    let level = typed.map_or_else(|| heading_level(node), |n| n as u8);
    heading_with_level(b, node, level)
}

fn sup(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if dom::attr(node, "data-type").as_deref() == Some("footnotes-ref") {
        return footnotes_ref(b, node);
    }
    delimited(b, node)
}

fn span(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let data_type = dom::attr_or_empty(node, "data-type");
    match data_type.as_str() {
        "heading-marker" => Outcome::Discard,
        "heading-id" => {
            let text = strip_zwsp(&dom::dom_text(node));
            let id = text.trim().trim_start_matches('{').trim_end_matches('}').trim();
            if !id.is_empty() {
                b.append(Node::with_tokens(NodeKind::HeadingId, id));
            }
            Outcome::Emitted
        }
        t if SOURCE_SPANS.contains(&t) => {
            let source = strip_zwsp(&dom::dom_text(node));
            if !source.is_empty() {
                append_text(b, NodeKind::Text, &source);
            }
            Outcome::Emitted
        }
        "" if is_footnote_label_marker(node) => Outcome::Discard,
        _ => Outcome::Descend,
    }
}

/// The `[^label]: ` marker leading a footnote definition.
fn is_footnote_label_marker(node: &Handle) -> bool {
    dom::has_class(node, "vditor-ir__marker")
        && dom::parent(node)
            .is_some_and(|p| dom::attr(&p, "data-type").as_deref() == Some("footnotes-def"))
}
