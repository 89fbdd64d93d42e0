// Block editor DOM.
//
// Every block is a `div[data-type="Node<Kind>"]` whose attributes carry the
// node id and its inline attribute list; inline content sits in a
// `contenteditable` child, and a `protyle-attr` strip plus action widgets
// decorate the block. Kinds are read straight from `data-type`, attributes
// become the node's IAL, and the decorations are filtered out.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;

use super::builder::Builder;
use super::common::*;
use super::dom;
use super::table::{DialectTable, Outcome};
use super::wysiwyg::backslash;
use super::Dialect;
use crate::ast::{ListData, ListType, Node, NodeId, NodeKind};
use crate::sentinel::strip_zwsp;

/// Block `div` attributes that encode structure rather than IAL pairs.
const STRUCTURAL_ATTRS: &[&str] = &[
    "data-node-id",
    "data-node-index",
    "data-type",
    "class",
    "data-subtype",
    "data-tight",
    "data-marker",
    "data-sb-layout",
    "data-footnotes-label",
    "data-content",
    "contenteditable",
    "spellcheck",
];

pub(crate) static TABLE: LazyLock<DialectTable> = LazyLock::new(|| {
    DialectTable::builder(Dialect::Block)
        .text(text)
        .element(&["div"], block_div)
        .element(&["p"], paragraph)
        .element(&["table"], table)
        .element(&["thead"], table_head)
        .element(&["tbody", "tfoot"], descend)
        .element(&["tr"], table_row)
        .element(&["th", "td"], table_cell)
        .element(&["code"], code)
        .element(&["em", "i", "strong", "b", "s", "del", "strike", "mark", "sup", "sub"], delimited)
        .element(&["a"], link)
        .element(&["img"], image)
        .element(&["br"], line_break)
        .element(&["span"], span)
        .element(&["u"], underline)
        .element(&["kbd"], inline_html)
        .filter(is_non_content)
        .filter(is_decoration)
        .build()
});

/// Attribute strips, action widgets, line numbers and render spinners.
fn is_decoration(node: &Handle) -> bool {
    if dom::attr(node, "spin").as_deref() == Some("1") {
        return true;
    }
    let class = dom::attr_or_empty(node, "class");
    class.split_whitespace().any(|c| {
        matches!(c, "protyle-attr" | "protyle-action" | "protyle-linenumber__rows") || c.contains("__copy")
    })
}

/// The `contenteditable` child holding a block's content.
fn editable(node: &Handle) -> Option<Handle> {
    dom::find(node, &|h| dom::attr(h, "contenteditable").as_deref() == Some("true"))
}

fn editable_text(node: &Handle) -> String {
    editable(node).map(|e| strip_zwsp(&dom::dom_text(&e))).unwrap_or_default()
}

fn block_div(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let Some(data_type) = dom::attr(node, "data-type").filter(|t| t.starts_with("Node")) else {
        return Outcome::Descend;
    };
    let Ok(kind) = data_type.parse::<NodeKind>() else {
        crate::log::warning!(data_type = data_type.as_str(), "unknown block type kept as html");
        emit_html_block(b, &dom::outer_html(node));
        return Outcome::Emitted;
    };
    let before = b.tree()[b.tip()].last_child();
    let outcome = match kind {
        NodeKind::Paragraph | NodeKind::Blockquote => {
            let id = b.append(Node::new(kind));
            Outcome::Open(id, None)
        }
        NodeKind::Heading => {
            let level = dom::attr_or_empty(node, "data-subtype")
                .trim_start_matches('h')
                .parse()
                .unwrap_or(1);
            let id = b.append(Node::heading(level));
            Outcome::Open(id, None)
        }
        NodeKind::ThematicBreak => thematic_break(b, node),
        NodeKind::SuperBlock => super_block(b, node),
        NodeKind::FootnotesDefBlock => footnotes_block(b, node),
        NodeKind::FootnotesDef => footnotes_def(b, &dom::attr_or_empty(node, "data-footnotes-label")),
        NodeKind::List => block_list(b, node),
        NodeKind::ListItem => block_list_item(b, node),
        NodeKind::Table => table(b, node),
        NodeKind::CodeBlock => {
            let language = dom::find(node, &|h| dom::has_class(h, "protyle-action__language"))
                .map(|l| dom::dom_text(&l).trim().to_string())
                .unwrap_or_default();
            emit_code_block(b, "```", &language, editable_text(node));
            Outcome::Emitted
        }
        NodeKind::MathBlock => {
            emit_math_block(b, dom::attr_or_empty(node, "data-content"));
            Outcome::Emitted
        }
        NodeKind::HtmlBlock => {
            emit_html_block(b, &editable_text(node));
            Outcome::Emitted
        }
        NodeKind::YamlFrontMatter => {
            emit_yaml_front_matter(b, editable_text(node));
            Outcome::Emitted
        }
        NodeKind::Toc => toc(b, node),
        NodeKind::LinkRefDefBlock => {
            emit_link_ref_defs(b, &editable_text(node));
            Outcome::Emitted
        }
        _ => {
            crate::log::warning!(kind = kind.name(), "block kind without a DOM form kept as html");
            emit_html_block(b, &dom::outer_html(node));
            Outcome::Emitted
        }
    };
    let created = match outcome {
        Outcome::Open(id, _) => Some(id),
        Outcome::Emitted => b.tree()[b.tip()].last_child().filter(|&last| Some(last) != before),
        Outcome::Discard | Outcome::Descend => None,
    };
    if let Some(created) = created {
        apply_ial(b, node, created);
    }
    outcome
}

/// Copy the block's id and IAL attributes onto `id`, and follow it with
/// the matching `{: …}` node.
fn apply_ial(b: &mut Builder<'_>, node: &Handle, id: NodeId) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(node_id) = dom::attr(node, "data-node-id").filter(|v| !v.is_empty()) {
        b.tree_mut()[id].id = node_id.clone();
        pairs.push(("id".to_string(), node_id));
    }
    pairs.extend(
        dom::attrs(node)
            .into_iter()
            .filter(|(k, _)| !STRUCTURAL_ATTRS.contains(&k.as_str())),
    );
    if pairs.is_empty() {
        return;
    }
    let tree = b.tree_mut();
    for (k, v) in &pairs {
        tree[id].set_ial(k, v.as_str());
    }
    if tree.parent_is(id, &[NodeKind::Table]) {
        return;
    }
    let body: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", v.replace('"', "&quot;")))
        .collect();
    let ial = tree.add(Node::with_tokens(
        NodeKind::KramdownBlockIal,
        format!("{{: {}}}", body.join(" ")),
    ));
    tree.insert_after(id, ial);
}

fn block_list(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let outcome = list(b, node);
    if let Outcome::Open(id, _) = outcome {
        let subtype = dom::attr_or_empty(node, "data-subtype");
        let tight = dom::attr(node, "data-tight").as_deref() != Some("false");
        let mut data = match subtype.as_str() {
            "o" => ListData::from_marker("1."),
            _ => ListData::from_marker("*"),
        };
        if subtype == "t" {
            data.list_type = ListType::Task;
        }
        data.tight = tight;
        b.tree_mut()[id].list = Some(data);
    }
    outcome
}

fn block_list_item(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    match list_item(b, node) {
        Outcome::Open(id, _) => {
            if dom::attr(node, "data-subtype").as_deref() == Some("t") {
                if let Some(data) = b.tree_mut()[id].list.as_mut() {
                    data.list_type = ListType::Task;
                }
            }
            Outcome::Open(id, Some(block_list_item_close))
        }
        other => other,
    }
}

/// Task items carry their state in the class; the checkbox itself is a
/// widget and gets recreated here.
fn block_list_item_close(b: &mut Builder<'_>, node: &Handle, id: NodeId) {
    if dom::attr(node, "data-subtype").as_deref() != Some("t") {
        return;
    }
    let checked = dom::has_class(node, "protyle-task--done");
    let tree = b.tree_mut();
    if task_marker_of(tree, id).is_some() {
        return;
    }
    let marker = tree.add(Node::task_marker(checked));
    match tree[id].first_child().filter(|&c| tree[c].kind == NodeKind::Paragraph) {
        Some(p) => tree.prepend_child(p, marker),
        None => tree.prepend_child(id, marker),
    }
}

fn span(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    match dom::attr_or_empty(node, "data-type").as_str() {
        "a" => link(b, node),
        "link-ref" => link_ref(b, node),
        "inline-math" => {
            emit_inline_math(b, &dom::attr_or_empty(node, "data-content"));
            Outcome::Emitted
        }
        "html-entity" => {
            let entity = dom::attr_or_empty(node, "data-content");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transduce::{transduce, TransduceOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paragraph_block_keeps_id_and_ial() {
        let html = "<div data-node-id=\"20200101-abc\" data-node-index=\"0\" data-type=\"NodeParagraph\" \
                    class=\"p\" bookmark=\"b\"><div contenteditable=\"true\" spellcheck=\"false\">hi</div>\
                    <div class=\"protyle-attr\"><div class=\"protyle-attr--bookmark\">b</div></div></div>";
        let tree = transduce(html, Dialect::Block, &TransduceOptions::default());
        let p = tree.first_child_of_kind(tree.root(), NodeKind::Paragraph).unwrap();
        assert_eq!(tree.text(p), "hi");
        assert_eq!(tree[p].id, "20200101-abc");
        assert_eq!(tree[p].ial_value("bookmark"), Some("b"));
        let ial = tree[p].next().unwrap();
        assert_eq!(tree[ial].kind, NodeKind::KramdownBlockIal);
        assert_eq!(tree[ial].tokens, "{: id=\"20200101-abc\" bookmark=\"b\"}");
    }

    #[test]
    fn test_done_task_item_gets_checked_marker() {
        let html = "<div data-subtype=\"t\" data-tight=\"true\" data-type=\"NodeList\" class=\"list\">\
                    <div data-marker=\"*\" data-subtype=\"t\" data-type=\"NodeListItem\" \
                    class=\"li protyle-task--done\"><div class=\"protyle-action protyle-action--task\"></div>\
                    <div data-type=\"NodeParagraph\" class=\"p\"><div contenteditable=\"true\">done</div></div>\
                    </div></div>";
        let tree = transduce(html, Dialect::Block, &TransduceOptions::default());
        let list = tree.first_child_of_kind(tree.root(), NodeKind::List).unwrap();
        assert_eq!(tree[list].list.as_ref().map(|d| d.list_type), Some(ListType::Task));
        let item = tree.first_child_of_kind(list, NodeKind::ListItem).unwrap();
        let marker = task_marker_of(&tree, item).unwrap();
        assert!(tree[marker].task_checked);
    }

    #[test]
    fn test_unknown_block_kind_kept_as_html() {
        let html = "<div data-type=\"NodeWidget\" class=\"x\">w</div>";
        let tree = transduce(html, Dialect::Block, &TransduceOptions::default());
        let block = tree.first_child_of_kind(tree.root(), NodeKind::HtmlBlock).unwrap();
        assert!(tree[block].tokens.contains("NodeWidget"));
    }

    #[test]
    fn test_decorations_are_filtered() {
        let dom = dom::parse("<div class=\"protyle-attr\"></div><span class=\"protyle-action__copy\"></span>");
        let body = dom::body_of(&dom).unwrap();
        assert!(dom::element_children(&body).iter().all(is_decoration));
    }
}
