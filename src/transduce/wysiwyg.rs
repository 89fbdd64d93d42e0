// WYSIWYG editor DOM.
//
// Rendered Markdown with the syntax hidden: markers survive as `data-marker`
// attributes, code-like blocks are `div`s holding an editable `pre > code`
// next to a preview, and editor-only inline nodes are spans keyed by
// `data-type`.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;

use super::builder::Builder;
use super::common::*;
use super::dom;
use super::table::{DialectTable, Outcome};
use super::Dialect;
use crate::ast::{Node, NodeKind};
use crate::sentinel::strip_zwsp;

pub(crate) static TABLE: LazyLock<DialectTable> = LazyLock::new(|| {
    DialectTable::builder(Dialect::Wysiwyg)
        .text(text)
        .element(&["p"], paragraph)
        .element(&["div"], block_div)
        .element(&["h1", "h2", "h3", "h4", "h5", "h6"], heading)
        .element(&["hr"], thematic_break)
        .element(&["blockquote"], blockquote)
        .element(&["ul"], list)
        .element(&["ol"], ordered_list)
        .element(&["li"], list_item)
        .element(&["input"], input)
        .element(&["table"], table)
        .element(&["thead"], table_head)
        .element(&["tbody", "tfoot"], descend)
        .element(&["tr"], table_row)
        .element(&["th", "td"], table_cell)
        .element(&["pre"], pre)
        .element(&["code"], code)
        .element(&["em", "i", "strong", "b", "s", "del", "strike", "mark", "sup", "sub"], delimited)
        .element(&["a"], link)
        .element(&["img"], image)
        .element(&["br"], line_break)
        .element(&["span"], span)
        .element(&["u"], underline)
        .element(&["kbd"], inline_html)
        .element(&["details", "iframe", "video", "audio"], raw_html)
        .filter(is_non_content)
        .filter(is_editor_preview)
        .build()
});

/// The editable `code` of a code-like block `div` (not its preview).
pub(crate) fn editable_code(node: &Handle) -> Option<Handle> {
    let pre = dom::element_children(node)
        .into_iter()
        .find(|c| dom::is(c, "pre") && !is_editor_preview(c))?;
    Some(dom::first_element_child(&pre).filter(|c| dom::is(c, "code")).unwrap_or(pre))
}

fn block_div(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let data_type = dom::attr_or_empty(node, "data-type");
    let code = editable_code(node);
    let code_text_of = |c: &Option<Handle>| c.as_ref().map(dom::dom_text).unwrap_or_default();
    match data_type.as_str() {
        "code-block" => {
            let fence = dom::attr_or_empty(node, "data-marker");
            let language = code.as_ref().map(language_of).unwrap_or_default();
            emit_code_block(b, &fence, &language, code_text(&code_text_of(&code)));
        }
        "math-block" => emit_math_block(b, code_text(&code_text_of(&code))),
        "yaml-front-matter" => emit_yaml_front_matter(b, code_text(&code_text_of(&code))),
        "html-block" => emit_html_block(b, &strip_zwsp(&code_text_of(&code))),
        "link-ref-defs-block" => emit_link_ref_defs(b, &strip_zwsp(&dom::dom_text(node))),
        "toc-block" => return toc(b, node),
        "footnotes-block" => return footnotes_block(b, node),
        "super-block" => return super_block(b, node),
        _ => return div(b, node),
    }
    Outcome::Emitted
}

fn ordered_list(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if dom::attr(node, "data-type").as_deref() == Some("footnotes-defs-ol") {
        return Outcome::Descend;
    }
    list(b, node)
}

/// Editor-only inline nodes, keyed by `data-type`.
fn span(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    match dom::attr_or_empty(node, "data-type").as_str() {
        "link-ref" => link_ref(b, node),
        "math-inline" => {
            let content = editable_code(node)
                .or_else(|| dom::first_element_child(node))
                .map(|c| strip_zwsp(&dom::dom_text(&c)))
                .unwrap_or_default();
            emit_inline_math(b, &content);
            Outcome::Emitted
        }
        "html-entity" => {
            let entity = dom::first_element_child(node)
                .map(|c| strip_zwsp(&dom::dom_text(&c)))
                .unwrap_or_default();
            if entity.is_empty() {
                return Outcome::Discard;
            }
            b.append(Node::with_tokens(NodeKind::HtmlEntity, entity));
            Outcome::Emitted
        }
        "backslash" => backslash(b, node),
        "emoji" => {
            let glyph = strip_zwsp(&dom::dom_text(node));
            emit_emoji(b, &dom::attr_or_empty(node, "data-alias"), Some(&glyph), None);
            Outcome::Emitted
        }
        _ => Outcome::Descend,
    }
}

/// `\x`: the escaped character follows the backslash marker span.
pub(crate) fn backslash(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let text = strip_zwsp(&dom::dom_text(node));
    let content = text.strip_prefix('\\').unwrap_or(&text);
    if content.is_empty() {
        return Outcome::Discard;
    }
    let id = b.append(Node::new(NodeKind::Backslash));
    b.append_to(id, Node::with_tokens(NodeKind::BackslashContent, content));
    Outcome::Emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transduce::{transduce, TransduceOptions};
    use pretty_assertions::assert_eq;

    fn kinds_under_first_paragraph(html: &str) -> Vec<NodeKind> {
        let tree = transduce(html, Dialect::Wysiwyg, &TransduceOptions::default());
        let p = tree.first_child_of_kind(tree.root(), NodeKind::Paragraph).unwrap();
        tree.children(p).map(|c| tree[c].kind).collect()
    }

    #[test]
    fn test_code_block_div_reads_editable_code_only() {
        let html = "<div class=\"vditor-wysiwyg__block\" data-type=\"code-block\" data-block=\"0\" \
                    data-marker=\"```\"><pre class=\"vditor-wysiwyg__pre\"><code class=\"language-rust\">\
                    fn main() {}\n</code></pre><pre class=\"vditor-wysiwyg__preview\" data-render=\"2\">\
                    <code>fn main() {}</code></pre></div>";
        let tree = transduce(html, Dialect::Wysiwyg, &TransduceOptions::default());
        let block = tree.first_child_of_kind(tree.root(), NodeKind::CodeBlock).unwrap();
        let info = tree.first_child_of_kind(block, NodeKind::CodeBlockFenceInfoMarker).unwrap();
        assert_eq!(tree[info].code_block_info, "rust");
        assert_eq!(tree.text(block), "fn main() {}");
    }

    #[test]
    fn test_backslash_span() {
        let html = "<p>a<span data-type=\"backslash\"><span>\\</span>*</span></p>";
        assert_eq!(kinds_under_first_paragraph(html), vec![NodeKind::Text, NodeKind::Backslash]);
    }

    #[test]
    fn test_footnotes_block_holds_definitions() {
        let html = "<div data-block=\"0\" data-type=\"footnotes-block\"><ol data-type=\"footnotes-defs-ol\">\
                    <li data-type=\"footnotes-li\" data-marker=\"^1\"><p data-block=\"0\">note</p></li></ol></div>";
        let tree = transduce(html, Dialect::Wysiwyg, &TransduceOptions::default());
        let block = tree.first_child_of_kind(tree.root(), NodeKind::FootnotesDefBlock).unwrap();
        let def = tree.first_child_of_kind(block, NodeKind::FootnotesDef).unwrap();
        assert_eq!(tree[def].tokens, "^1");
        assert_eq!(tree.text(def), "note");
    }
}
