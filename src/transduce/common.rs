// Element handlers shared by the dialects.
//
// Every dialect starts from these and overrides what its DOM encodes
// differently. Handlers read the DOM, append to the builder's tip and tell
// the walk what to do with the element's children.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;
use regex::Regex;

use super::builder::Builder;
use super::dom;
use super::table::Outcome;
use super::{Dialect, TransduceOptions};
use crate::ast::{Align, LinkType, ListData, ListType, Node, NodeId, NodeKind, Tree};
use crate::sentinel::{is_caret_only, strip_zwsp, CARET, ZWSP};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n\x0C]+").unwrap());

/// Tags that start a block of their own.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dl", "div", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol",
    "p", "pre", "section", "table", "ul",
];

/// Elements that carry content without carrying text.
const EMBEDDED_TAGS: &[&str] = &["img", "input", "iframe", "video", "audio", "hr"];

/// Tags that end the search for trailing line breaks.
const BREAK_SCOPE_TAGS: &[&str] = &[
    "body", "p", "li", "div", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Kinds whose direct children are blocks.
pub(crate) fn is_block_tip(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Document
            | NodeKind::List
            | NodeKind::ListItem
            | NodeKind::Blockquote
            | NodeKind::Table
            | NodeKind::TableHead
            | NodeKind::TableRow
            | NodeKind::FootnotesDefBlock
            | NodeKind::FootnotesDef
            | NodeKind::SuperBlock
    )
}

/// Text as the editors write it: placeholders removed, except for the
/// caret-plus-placeholder pair an empty editable keeps.
pub(crate) fn editor_text(text: &str) -> String {
    if text == format!("{CARET}{ZWSP}") {
        text.to_string()
    } else {
        strip_zwsp(text)
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Visible text of an element, without placeholders.
pub(crate) fn visible_text(node: &Handle) -> String {
    strip_zwsp(&dom::dom_text(node))
}

/// Whether the element holds an image, checkbox or similar.
pub(crate) fn has_embedded(node: &Handle) -> bool {
    dom::element_children(node).iter().any(|c| {
        dom::tag(c).is_some_and(|t| EMBEDDED_TAGS.contains(&t)) || has_embedded(c)
    })
}

/// Whether the element produces nothing worth keeping.
pub(crate) fn is_blank(node: &Handle) -> bool {
    visible_text(node).trim().is_empty() && !has_embedded(node)
}

pub(crate) fn has_block_child(node: &Handle) -> bool {
    dom::element_children(node)
        .iter()
        .any(|c| dom::tag(c).is_some_and(|t| BLOCK_TAGS.contains(&t)))
}

/// Append text to the tip, extending a trailing node of the same kind.
pub(crate) fn append_text(b: &mut Builder<'_>, kind: NodeKind, text: &str) {
    let tip = b.tip();
    if let Some(last) = b.tree()[tip].last_child() {
        if b.tree()[last].kind == kind {
            b.tree_mut()[last].tokens.push_str(text);
            return;
        }
    }
    b.append(Node::with_tokens(kind, text));
}

/// Link destination with the configured base and prefix stripped.
pub(crate) fn link_dest(options: &TransduceOptions, href: &str) -> String {
    let mut dest = href;
    if let Some(base) = &options.link_base {
        dest = dest.strip_prefix(base.as_str()).unwrap_or(dest);
    }
    if !options.link_prefix.is_empty() {
        dest = dest.strip_prefix(options.link_prefix.as_str()).unwrap_or(dest);
    }
    dest.to_string()
}

/// Code text read from the DOM: one trailing newline dropped.
pub(crate) fn code_text(text: &str) -> String {
    let text = strip_zwsp(text);
    match text.strip_suffix('\n') {
        Some(t) => t.to_string(),
        None => text,
    }
}

fn is_caret_only_element(node: &Handle) -> bool {
    is_caret_only(&dom::dom_text(node)) && !has_embedded(node)
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Text node handler of every built-in dialect.
pub(crate) fn text(b: &mut Builder<'_>, _: &Handle, text: String) {
    let text = match b.dialect() {
        Dialect::Html => collapse_whitespace(&text),
        _ => editor_text(&text),
    };
    if text.is_empty() {
        return;
    }
    let tip = b.tip();
    let tip_kind = b.tip_kind();
    if text.trim().is_empty() && is_block_tip(tip_kind) {
        let after_inline = b.tree()[tip]
            .last_child()
            .is_some_and(|last| !b.tree()[last].kind.is_block());
        if !after_inline {
            return;
        }
    }
    let kind = if tip_kind == NodeKind::Link {
        NodeKind::LinkText
    } else {
        NodeKind::Text
    };
    append_text(b, kind, &text);
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

pub(crate) fn paragraph(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if is_blank(node) && !dom::dom_text(node).contains(CARET) {
        return Outcome::Discard;
    }
    if matches!(b.tip_kind(), NodeKind::Paragraph | NodeKind::Heading | NodeKind::TableCell) {
        return Outcome::Descend;
    }
    let id = b.append(Node::new(NodeKind::Paragraph));
    Outcome::Open(id, None)
}

/// A `div` in a dialect where it only groups content.
pub(crate) fn div(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if has_block_child(node) || !is_block_tip(b.tip_kind()) {
        return Outcome::Descend;
    }
    paragraph(b, node)
}

pub(crate) fn heading_level(node: &Handle) -> u8 {
    dom::tag(node)
        .and_then(|t| t.strip_prefix('h'))
        .and_then(|d| d.parse().ok())
        .unwrap_or(1)
}

pub(crate) fn heading(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    heading_with_level(b, node, heading_level(node))
}

pub(crate) fn heading_with_level(b: &mut Builder<'_>, node: &Handle, level: u8) -> Outcome {
    if is_blank(node) && !dom::dom_text(node).contains(CARET) {
        return Outcome::Discard;
    }
    let mut heading = Node::heading(level);
    heading.heading_setext = level <= 2
        && matches!(dom::attr(node, "data-marker").as_deref(), Some("=" | "-"));
    let id = b.append(heading);
    Outcome::Open(id, Some(heading_close))
}

fn heading_close(b: &mut Builder<'_>, node: &Handle, id: NodeId) {
    if let Some(custom) = dom::attr(node, "data-id").filter(|v| !v.is_empty()) {
        b.append_to(id, Node::with_tokens(NodeKind::HeadingId, custom));
    }
}

pub(crate) fn thematic_break(b: &mut Builder<'_>, _: &Handle) -> Outcome {
    b.append(Node::new(NodeKind::ThematicBreak));
    Outcome::Emitted
}

pub(crate) fn blockquote(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let text = visible_text(node);
    if is_caret_only_element(node) {
        append_text(b, NodeKind::Text, CARET);
        return Outcome::Emitted;
    }
    if (text.trim().is_empty() && !has_embedded(node)) || text.trim() == ">" {
        return Outcome::Discard;
    }
    let id = b.append(Node::new(NodeKind::Blockquote));
    Outcome::Open(id, None)
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// Largest ordered list start CommonMark accepts (nine digits).
const MAX_LIST_START: u64 = 999_999_999;

pub(crate) fn list(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let ordered = dom::is(node, "ol");
    let start: Option<u32> = dom::attr(node, "start")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|n| n.min(MAX_LIST_START) as u32);
    let marker = dom::attr(node, "data-marker")
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| match (ordered, start) {
            (true, Some(n)) => format!("{n}."),
            (true, None) => "1.".to_string(),
            (false, _) => "*".to_string(),
        });
    let mut data = ListData::from_marker(&marker);
    if ordered != data.is_numbered() {
        data = ListData::from_marker(if ordered { "1." } else { "*" });
    }
    if ordered {
        let n = start.unwrap_or(1);
        data.start = n;
        data.num = n;
        data.marker = format!("{n}{}", data.delimiter as char);
    }
    data.tight = dom::attr(node, "data-tight").as_deref() != Some("false");
    let id = b.append(Node::list(NodeKind::List, data));
    Outcome::Open(id, Some(list_close))
}

/// Loose when an item holds more than one block of a kind, or a
/// paragraph next to any other block.
fn infer_tight(tree: &Tree, list: NodeId) -> bool {
    for item in tree.children_of_kind(list, NodeKind::ListItem) {
        let (mut paragraphs, mut lists, mut quotes, mut others) = (0, 0, 0, 0);
        for child in tree.children(item) {
            match tree[child].kind {
                NodeKind::Paragraph => paragraphs += 1,
                NodeKind::List => lists += 1,
                NodeKind::Blockquote => quotes += 1,
                NodeKind::LinkRefDefBlock | NodeKind::FootnotesDefBlock => {}
                kind if kind.is_block() => others += 1,
                _ => {}
            }
        }
        if paragraphs > 1 || lists > 1 || quotes > 1 || others > 1 {
            return false;
        }
        if paragraphs == 1 && lists + quotes + others > 0 {
            return false;
        }
    }
    true
}

fn list_close(b: &mut Builder<'_>, node: &Handle, id: NodeId) {
    let explicit_tight = dom::attr(node, "data-tight").map(|t| t != "false");
    let has_marker = dom::has_attr(node, "data-marker");
    let tree = b.tree_mut();
    let items = tree.children_of_kind(id, NodeKind::ListItem);
    if items.is_empty() && tree[id].first_child().is_none() {
        crate::log::debug!("dropping empty list");
        tree.unlink(id);
        return;
    }
    let tight = match explicit_tight {
        Some(tight) => tight,
        None => infer_tight(tree, id),
    };
    let is_task = items
        .iter()
        .any(|&i| tree[i].list.as_ref().is_some_and(|d| d.list_type == ListType::Task));
    let first = items.first().and_then(|&i| tree[i].list.clone());
    let mut data = tree[id].list.clone().unwrap_or_default();
    if let Some(first) = first.filter(|_| !has_marker) {
        if first.is_numbered() == data.is_numbered() || data.list_type == ListType::Task {
            data.marker = first.marker.clone();
            data.bullet_char = first.bullet_char;
            data.delimiter = first.delimiter;
            if first.is_numbered() {
                data.start = first.num;
            }
        }
    }
    data.tight = tight;
    if is_task {
        data.list_type = ListType::Task;
    }
    for item in items {
        if let Some(item_data) = tree[item].list.as_mut() {
            item_data.tight = tight;
        }
    }
    tree[id].list = Some(data);
}

pub(crate) fn list_item(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if dom::attr(node, "data-type").as_deref() == Some("footnotes-li") {
        return footnotes_def(b, &dom::attr_or_empty(node, "data-marker"));
    }
    let tip = b.tip();
    let (parent, index) = if b.tip_kind() == NodeKind::List {
        let tree = b.tree();
        (tree[tip].list.clone(), tree.children_of_kind(tip, NodeKind::ListItem).len() as u32)
    } else {
        (None, 0)
    };
    let numbered_marker =
        |p: &ListData| format!("{}{}", p.start.saturating_add(index), p.delimiter as char);
    let mut data = match dom::attr(node, "data-marker").filter(|m| !m.is_empty()) {
        Some(marker) => ListData::from_marker(&marker),
        None => match &parent {
            Some(p) if p.is_numbered() => ListData::from_marker(&numbered_marker(p)),
            Some(p) => ListData::from_marker(&p.marker),
            None => ListData::default(),
        },
    };
    if let Some(p) = parent.as_ref().filter(|p| p.is_numbered()) {
        if !data.is_numbered() {
            data = ListData::from_marker(&numbered_marker(p));
        }
        // Items of an `ol` count from its `start`, or from 1 without one,
        // whatever numbers the editor left in their markers.
        if let Some(ol) = dom::parent(node).filter(|ol| dom::is(ol, "ol")) {
            let start = if dom::has_attr(&ol, "start") { p.start } else { 1 };
            data.num = start.saturating_add(index);
            data.start = start;
            data.marker = format!("{}{}", data.num, data.delimiter as char);
        }
    }
    if let Some(p) = &parent {
        data.tight = p.tight;
    }
    let id = b.append(Node::list(NodeKind::ListItem, data));
    Outcome::Open(id, Some(list_item_close))
}

/// Task marker of an item: first child, or first child of its first
/// paragraph.
pub(crate) fn task_marker_of(tree: &Tree, item: NodeId) -> Option<NodeId> {
    let first = tree[item].first_child()?;
    if tree[first].kind == NodeKind::TaskListItemMarker {
        return Some(first);
    }
    if tree[first].kind == NodeKind::Paragraph {
        let inner = tree[first].first_child()?;
        if tree[inner].kind == NodeKind::TaskListItemMarker {
            return Some(inner);
        }
    }
    None
}

fn list_item_close(b: &mut Builder<'_>, _: &Handle, id: NodeId) {
    let tree = b.tree_mut();
    if task_marker_of(tree, id).is_some() {
        if let Some(data) = tree[id].list.as_mut() {
            data.list_type = ListType::Task;
        }
    }
}

pub(crate) fn input(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if dom::attr(node, "type").as_deref() != Some("checkbox") {
        return Outcome::Discard;
    }
    let tip = b.tip();
    let tree = b.tree();
    let at_item_start = tree[tip].first_child().is_none()
        && match tree[tip].kind {
            NodeKind::ListItem => true,
            NodeKind::Paragraph => tree[tip]
                .parent()
                .is_some_and(|p| tree[p].kind == NodeKind::ListItem && tree[p].first_child() == Some(tip)),
            _ => false,
        };
    if !at_item_start {
        return Outcome::Discard;
    }
    b.append(Node::task_marker(dom::has_attr(node, "checked")));
    Outcome::Emitted
}

// ---------------------------------------------------------------------------
// Footnotes
// ---------------------------------------------------------------------------

/// Open a footnote definition labelled `label`, inside a definition block.
pub(crate) fn footnotes_def(b: &mut Builder<'_>, label: &str) -> Outcome {
    let mut def = Node::with_tokens(NodeKind::FootnotesDef, label);
    def.link_ref_label = label.trim_start_matches('^').to_string();
    if b.tip_kind() == NodeKind::FootnotesDefBlock {
        let id = b.append(def);
        return Outcome::Open(id, None);
    }
    let block = b.append(Node::new(NodeKind::FootnotesDefBlock));
    let id = b.append_to(block, def);
    Outcome::Open(id, None)
}

pub(crate) fn footnotes_block(b: &mut Builder<'_>, _: &Handle) -> Outcome {
    let id = b.append(Node::new(NodeKind::FootnotesDefBlock));
    Outcome::Open(id, Some(drop_if_empty))
}

pub(crate) fn footnotes_ref(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let label = dom::attr_or_empty(node, "data-footnotes-label");
    if label.is_empty() {
        return Outcome::Descend;
    }
    let mut r = Node::with_tokens(NodeKind::FootnotesRef, label.clone());
    r.link_ref_label = label.trim_start_matches('^').to_string();
    b.append(r);
    Outcome::Emitted
}

fn drop_if_empty(b: &mut Builder<'_>, _: &Handle, id: NodeId) {
    if b.tree()[id].first_child().is_none() {
        b.tree_mut().unlink(id);
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub(crate) fn table(b: &mut Builder<'_>, _: &Handle) -> Outcome {
    if b.tip_kind() == NodeKind::Table {
        return Outcome::Descend;
    }
    let id = b.append(Node::new(NodeKind::Table));
    Outcome::Open(id, Some(table_close))
}

fn table_close(b: &mut Builder<'_>, _: &Handle, id: NodeId) {
    let tree = b.tree_mut();
    let head = match tree.first_child_of_kind(id, NodeKind::TableHead) {
        Some(head) => head,
        None => {
            let Some(row) = tree.first_child_of_kind(id, NodeKind::TableRow) else {
                crate::log::debug!("dropping table without rows");
                tree.unlink(id);
                return;
            };
            crate::log::debug!("synthesizing table head from first row");
            let head = tree.add(Node::new(NodeKind::TableHead));
            tree.insert_before(row, head);
            tree.append_child(head, row);
            head
        }
    };
    if tree[id].first_child() != Some(head) {
        tree.prepend_child(id, head);
    }
    let aligns: Vec<Align> = tree
        .first_child_of_kind(head, NodeKind::TableRow)
        .map(|row| {
            tree.children_of_kind(row, NodeKind::TableCell)
                .into_iter()
                .map(|c| tree[c].cell_align)
                .collect()
        })
        .unwrap_or_default();
    for row in tree.children_of_kind(id, NodeKind::TableRow) {
        for (col, cell) in tree.children_of_kind(row, NodeKind::TableCell).into_iter().enumerate() {
            if tree[cell].cell_align == Align::None {
                tree[cell].cell_align = aligns.get(col).copied().unwrap_or_default();
            }
        }
    }
    tree[id].table_aligns = aligns;
}

pub(crate) fn table_head(b: &mut Builder<'_>, _: &Handle) -> Outcome {
    if b.tip_kind() != NodeKind::Table {
        return Outcome::Descend;
    }
    let id = b.append(Node::new(NodeKind::TableHead));
    Outcome::Open(id, Some(drop_if_empty))
}

pub(crate) fn table_row(b: &mut Builder<'_>, _: &Handle) -> Outcome {
    if !matches!(b.tip_kind(), NodeKind::Table | NodeKind::TableHead) {
        return Outcome::Descend;
    }
    let id = b.append(Node::new(NodeKind::TableRow));
    Outcome::Open(id, None)
}

fn cell_align(node: &Handle) -> Align {
    if let Some(align) = dom::attr(node, "align") {
        return Align::from_attr(align.trim());
    }
    let style = dom::attr_or_empty(node, "style");
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(k, _)| k.trim() == "text-align")
        .map_or(Align::None, |(_, v)| Align::from_attr(v.trim()))
}

pub(crate) fn table_cell(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if b.tip_kind() != NodeKind::TableRow {
        return Outcome::Descend;
    }
    let id = b.append(Node::table_cell(cell_align(node)));
    Outcome::Open(id, Some(table_cell_close))
}

fn table_cell_close(b: &mut Builder<'_>, _: &Handle, id: NodeId) {
    let tree = b.tree_mut();
    let blank: Vec<NodeId> = tree
        .children(id)
        .filter(|&c| tree[c].kind == NodeKind::Text && strip_zwsp(&tree[c].tokens).trim().is_empty())
        .filter(|&c| !tree[c].tokens.contains(CARET))
        .collect();
    for c in blank {
        tree.unlink(c);
    }
}

// ---------------------------------------------------------------------------
// Code-like blocks
// ---------------------------------------------------------------------------

/// Append a fenced code block.
pub(crate) fn emit_code_block(b: &mut Builder<'_>, fence: &str, info: &str, code: String) {
    let fence = if fence.is_empty() { "```" } else { fence };
    let id = b.append(Node::code_block());
    b.append_to(id, Node::with_tokens(NodeKind::CodeBlockFenceOpenMarker, fence));
    let mut info_node = Node::new(NodeKind::CodeBlockFenceInfoMarker);
    info_node.code_block_info = info.to_string();
    b.append_to(id, info_node);
    b.append_to(id, Node::with_tokens(NodeKind::CodeBlockCode, code));
    b.append_to(id, Node::with_tokens(NodeKind::CodeBlockFenceCloseMarker, fence));
}

pub(crate) fn emit_math_block(b: &mut Builder<'_>, content: String) {
    let id = b.append(Node::new(NodeKind::MathBlock));
    b.append_to(id, Node::with_tokens(NodeKind::MathBlockOpenMarker, "$$"));
    b.append_to(id, Node::with_tokens(NodeKind::MathBlockContent, content));
    b.append_to(id, Node::with_tokens(NodeKind::MathBlockCloseMarker, "$$"));
}

pub(crate) fn emit_yaml_front_matter(b: &mut Builder<'_>, content: String) {
    let id = b.append(Node::new(NodeKind::YamlFrontMatter));
    b.append_to(id, Node::with_tokens(NodeKind::YamlFrontMatterOpenMarker, "---"));
    b.append_to(id, Node::with_tokens(NodeKind::YamlFrontMatterContent, content));
    b.append_to(id, Node::with_tokens(NodeKind::YamlFrontMatterCloseMarker, "---"));
}

pub(crate) fn emit_html_block(b: &mut Builder<'_>, html: &str) {
    let html = html.trim_end_matches('\n');
    if html.trim().is_empty() {
        return;
    }
    b.append(Node::with_tokens(NodeKind::HtmlBlock, html));
}

/// Language named by a `language-*` class.
pub(crate) fn language_of(node: &Handle) -> String {
    dom::attr_or_empty(node, "class")
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-"))
        .unwrap_or("")
        .to_string()
}

/// `pre`: the wrapper's `data-type` decides what it holds, the `language-`
/// class of its `code` names the language.
pub(crate) fn pre(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let code = dom::first_element_child(node).filter(|c| dom::is(c, "code"));
    let source = code.as_ref().unwrap_or(node);
    let data_type = dom::attr(source, "data-type")
        .or_else(|| dom::parent(node).and_then(|p| dom::attr(&p, "data-type")))
        .unwrap_or_default();
    let text = dom::dom_text(source);
    match data_type.as_str() {
        "html-block" => emit_html_block(b, &strip_zwsp(&text)),
        "math-block" => emit_math_block(b, code_text(&text)),
        "yaml-front-matter" => emit_yaml_front_matter(b, code_text(&text)),
        _ => {
            let language = language_of(source);
            let fence = dom::parent(node)
                .and_then(|p| dom::attr(&p, "data-marker"))
                .unwrap_or_default();
            emit_code_block(b, &fence, &language, code_text(&text));
        }
    }
    Outcome::Emitted
}

/// Raw HTML kept as is: a block at block level, inline elsewhere.
pub(crate) fn raw_html(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let html = dom::outer_html(node);
    if is_block_tip(b.tip_kind()) {
        emit_html_block(b, &html);
    } else {
        b.append(Node::with_tokens(NodeKind::InlineHtml, html));
    }
    Outcome::Emitted
}

// ---------------------------------------------------------------------------
// Editor-only blocks
// ---------------------------------------------------------------------------

static LINK_REF_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]:\s*(\S*)").unwrap());

/// Link reference definitions, one `[label]: dest` per line.
pub(crate) fn emit_link_ref_defs(b: &mut Builder<'_>, text: &str) {
    let mut block = None;
    for line in text.lines() {
        let Some(caps) = LINK_REF_DEF.captures(line.trim()) else {
            continue;
        };
        let parent = *block.get_or_insert_with(|| b.append(Node::new(NodeKind::LinkRefDefBlock)));
        let mut def = Node::new(NodeKind::LinkRefDef);
        def.link_ref_label = caps[1].to_string();
        let def = b.append_to(parent, def);
        b.append_to(def, Node::with_tokens(NodeKind::LinkDest, &caps[2]));
    }
}

pub(crate) fn toc(b: &mut Builder<'_>, _: &Handle) -> Outcome {
    b.append(Node::new(NodeKind::Toc));
    Outcome::Emitted
}

/// Super block: `{{{layout` … `}}}` around its blocks.
pub(crate) fn super_block(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let layout = dom::attr(node, "data-sb-layout")
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "row".to_string());
    let id = b.append(Node::new(NodeKind::SuperBlock));
    b.append_to(id, Node::with_tokens(NodeKind::SuperBlockOpenMarker, "{{{"));
    b.append_to(id, Node::with_tokens(NodeKind::SuperBlockLayoutMarker, layout));
    Outcome::Open(id, Some(super_block_close))
}

fn super_block_close(b: &mut Builder<'_>, _: &Handle, id: NodeId) {
    b.append_to(id, Node::with_tokens(NodeKind::SuperBlockCloseMarker, "}}}"));
}

// ---------------------------------------------------------------------------
// Inlines
// ---------------------------------------------------------------------------

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Append a code span holding `content`.
pub(crate) fn emit_code_span(b: &mut Builder<'_>, len: usize, content: &str) {
    let id = b.append(Node::code_span(len));
    let marker = "`".repeat(len.max(1));
    b.append_to(id, Node::with_tokens(NodeKind::CodeSpanOpenMarker, marker.clone()));
    b.append_to(id, Node::with_tokens(NodeKind::CodeSpanContent, content));
    b.append_to(id, Node::with_tokens(NodeKind::CodeSpanCloseMarker, marker));
}

pub(crate) fn code(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let text = strip_zwsp(&dom::dom_text(node));
    if dom::attr(node, "data-type").as_deref() == Some("html-inline") {
        if !text.is_empty() {
            b.append(Node::with_tokens(NodeKind::InlineHtml, text));
        }
        return Outcome::Emitted;
    }
    if is_caret_only(&text) {
        append_text(b, NodeKind::Text, CARET);
        return Outcome::Emitted;
    }
    if text.is_empty() {
        return Outcome::Discard;
    }
    let len = match dom::attr(node, "data-marker").filter(|m| !m.is_empty()) {
        Some(marker) => marker.len(),
        None if text.contains('`') => longest_backtick_run(&text) + 1,
        None => 1,
    };
    emit_code_span(b, len, &text);
    Outcome::Emitted
}

/// Inline math from its source text.
pub(crate) fn emit_inline_math(b: &mut Builder<'_>, content: &str) {
    let id = b.append(Node::new(NodeKind::InlineMath));
    b.append_to(id, Node::with_tokens(NodeKind::InlineMathOpenMarker, "$"));
    b.append_to(id, Node::with_tokens(NodeKind::InlineMathContent, content));
    b.append_to(id, Node::with_tokens(NodeKind::InlineMathCloseMarker, "$"));
}

fn run_kind(tag: &str) -> NodeKind {
    match tag {
        "em" | "i" => NodeKind::Emphasis,
        "strong" | "b" => NodeKind::Strong,
        "s" | "del" | "strike" => NodeKind::Strikethrough,
        "mark" => NodeKind::Mark,
        "sup" => NodeKind::Sup,
        _ => NodeKind::Sub,
    }
}

fn default_run_marker(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Emphasis => "*",
        NodeKind::Strong => "**",
        NodeKind::Strikethrough => "~~",
        NodeKind::Mark => "==",
        NodeKind::Sup => "^",
        _ => "~",
    }
}

/// Open and close marker kinds of a delimited run written with `marker`.
pub(crate) fn run_markers(kind: NodeKind, marker: &str) -> (NodeKind, NodeKind) {
    use NodeKind::*;
    match (kind, marker) {
        (Emphasis, "_") => (EmUnderscoreOpenMarker, EmUnderscoreCloseMarker),
        (Emphasis, _) => (EmAsteriskOpenMarker, EmAsteriskCloseMarker),
        (Strong, "__") => (StrongUnderscoreOpenMarker, StrongUnderscoreCloseMarker),
        (Strong, _) => (StrongAsteriskOpenMarker, StrongAsteriskCloseMarker),
        (Strikethrough, "~") => (Strikethrough1OpenMarker, Strikethrough1CloseMarker),
        (Strikethrough, _) => (Strikethrough2OpenMarker, Strikethrough2CloseMarker),
        (Mark, "=") => (Mark1OpenMarker, Mark1CloseMarker),
        (Mark, _) => (Mark2OpenMarker, Mark2CloseMarker),
        (Sup, _) => (SupOpenMarker, SupCloseMarker),
        _ => (SubOpenMarker, SubCloseMarker),
    }
}

/// Close marker kind matching an open marker kind.
fn close_of(open: NodeKind) -> NodeKind {
    use NodeKind::*;
    match open {
        EmUnderscoreOpenMarker => EmUnderscoreCloseMarker,
        EmAsteriskOpenMarker => EmAsteriskCloseMarker,
        StrongUnderscoreOpenMarker => StrongUnderscoreCloseMarker,
        StrongAsteriskOpenMarker => StrongAsteriskCloseMarker,
        Strikethrough1OpenMarker => Strikethrough1CloseMarker,
        Strikethrough2OpenMarker => Strikethrough2CloseMarker,
        Mark1OpenMarker => Mark1CloseMarker,
        Mark2OpenMarker => Mark2CloseMarker,
        SupOpenMarker => SupCloseMarker,
        _ => SubCloseMarker,
    }
}

/// Emphasis, strong, strikethrough, mark, superscript and subscript.
///
/// Empty runs are dropped, a caret-only run becomes bare caret text, and
/// spaces at the edges move outside the delimiters, where Markdown needs
/// them.
pub(crate) fn delimited(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let tag = dom::tag(node).unwrap_or("em");
    if tag == "sup" && dom::attr(node, "data-type").as_deref() == Some("footnotes-ref") {
        return footnotes_ref(b, node);
    }
    if is_caret_only_element(node) {
        append_text(b, NodeKind::Text, CARET);
        return Outcome::Emitted;
    }
    let text = visible_text(node);
    if text.trim().is_empty() && !has_embedded(node) {
        return Outcome::Discard;
    }
    let kind = run_kind(tag);
    let marker = dom::attr(node, "data-marker")
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_run_marker(kind).to_string());
    if text.starts_with(char::is_whitespace) && b.tip_kind() != NodeKind::Link {
        append_text(b, NodeKind::Text, " ");
    }
    let (open, _) = run_markers(kind, &marker);
    let id = b.append(Node::new(kind));
    b.append_to(id, Node::with_tokens(open, marker));
    Outcome::Open(id, Some(delimited_close))
}

fn delimited_close(b: &mut Builder<'_>, _: &Handle, id: NodeId) {
    let tree = b.tree_mut();
    let Some(open) = tree[id].first_child() else {
        tree.unlink(id);
        return;
    };
    let marker = tree[open].tokens.clone();
    let first = tree[open].next();
    let last = tree[id].last_child().filter(|&l| l != open);

    let first_text = first.filter(|&f| tree[f].kind == NodeKind::Text);
    let last_text = last.filter(|&l| tree[l].kind == NodeKind::Text);
    if let (Some(f), Some(l)) = (first_text, last_text) {
        let leaked = tree[f].tokens.starts_with(&marker)
            && tree[l].tokens.ends_with(&marker)
            && (f != l || tree[f].tokens.len() >= 2 * marker.len());
        if leaked && !marker.is_empty() {
            tree[f].tokens.drain(..marker.len());
            let end = tree[l].tokens.len() - marker.len();
            tree[l].tokens.truncate(end);
        }
    }
    if let Some(f) = first_text {
        let trimmed = tree[f].tokens.trim_start().to_string();
        tree[f].tokens = trimmed;
    }
    let mut trailing_space = false;
    if let Some(l) = last_text {
        let trimmed = tree[l].tokens.trim_end().to_string();
        trailing_space = trimmed.len() != tree[l].tokens.len();
        tree[l].tokens = trimmed;
    }
    for t in [first_text, last_text].into_iter().flatten() {
        if tree[t].tokens.is_empty() {
            tree.unlink(t);
        }
    }

    if tree[open].next().is_none() {
        tree.unlink(id);
        return;
    }
    let close = close_of(tree[open].kind);
    tree.append_new(id, Node::with_tokens(close, marker));
    let in_link = tree[id].parent().is_some_and(|p| tree[p].kind == NodeKind::Link);
    if trailing_space && !in_link {
        let space = tree.add(Node::text(" "));
        tree.insert_after(id, space);
    }
}

/// Append an image.
pub(crate) fn emit_image(b: &mut Builder<'_>, src: &str, alt: &str, title: &str) {
    let id = b.append(Node::new(NodeKind::Image));
    b.append_to(id, Node::with_tokens(NodeKind::Bang, "!"));
    b.append_to(id, Node::with_tokens(NodeKind::OpenBracket, "["));
    b.append_to(id, Node::with_tokens(NodeKind::LinkText, alt));
    b.append_to(id, Node::with_tokens(NodeKind::CloseBracket, "]"));
    b.append_to(id, Node::with_tokens(NodeKind::OpenParen, "("));
    b.append_to(id, Node::with_tokens(NodeKind::LinkDest, src));
    if !title.is_empty() {
        b.append_to(id, Node::with_tokens(NodeKind::LinkSpace, " "));
        b.append_to(id, Node::with_tokens(NodeKind::LinkTitle, title));
    }
    b.append_to(id, Node::with_tokens(NodeKind::CloseParen, ")"));
}

/// Append an emoji rendered from `glyph` (unicode) or `img` (custom image).
pub(crate) fn emit_emoji(b: &mut Builder<'_>, alias: &str, glyph: Option<&str>, img: Option<&str>) {
    let alias = if alias.starts_with(':') {
        alias.to_string()
    } else {
        format!(":{alias}:")
    };
    let id = b.append(Node::new(NodeKind::Emoji));
    let inner = match (glyph, img) {
        (_, Some(html)) => Node::with_tokens(NodeKind::EmojiImg, html),
        (glyph, None) => Node::with_tokens(NodeKind::EmojiUnicode, glyph.unwrap_or("")),
    };
    let inner = b.append_to(id, inner);
    b.append_to(inner, Node::with_tokens(NodeKind::EmojiAlias, alias));
}

pub(crate) fn image(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let alt = dom::attr_or_empty(node, "alt");
    if dom::has_class(node, "emoji") {
        let alias = dom::attr(node, "title").filter(|t| !t.is_empty()).unwrap_or(alt);
        let html = dom::outer_html(node);
        emit_emoji(b, &alias, None, Some(&html));
        return Outcome::Emitted;
    }
    let src = dom::attr(node, "data-src")
        .filter(|s| !s.is_empty())
        .or_else(|| dom::attr(node, "src"))
        .unwrap_or_default();
    if src.is_empty() {
        return Outcome::Discard;
    }
    let dest = link_dest(b.options(), &src);
    let title = dom::attr_or_empty(node, "title");
    emit_image(b, &dest, &alt, &title);
    Outcome::Emitted
}

/// `a`, or a span standing for one: `href`/`title` or their `data-`
/// forms.
pub(crate) fn link(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if b.tip_kind() == NodeKind::Link {
        return Outcome::Descend;
    }
    if is_caret_only_element(node) {
        append_text(b, NodeKind::Text, CARET);
        return Outcome::Emitted;
    }
    if is_blank(node) {
        return Outcome::Discard;
    }
    let id = b.append(Node::new(NodeKind::Link));
    b.append_to(id, Node::with_tokens(NodeKind::OpenBracket, "["));
    Outcome::Open(id, Some(link_close))
}

fn link_close(b: &mut Builder<'_>, node: &Handle, id: NodeId) {
    let href = dom::attr(node, "href")
        .or_else(|| dom::attr(node, "data-href"))
        .unwrap_or_default();
    let title = dom::attr(node, "title")
        .or_else(|| dom::attr(node, "data-title"))
        .unwrap_or_default();
    let dest = link_dest(b.options(), &href);
    b.append_to(id, Node::with_tokens(NodeKind::CloseBracket, "]"));
    b.append_to(id, Node::with_tokens(NodeKind::OpenParen, "("));
    b.append_to(id, Node::with_tokens(NodeKind::LinkDest, dest));
    if !title.is_empty() {
        b.append_to(id, Node::with_tokens(NodeKind::LinkSpace, " "));
        b.append_to(id, Node::with_tokens(NodeKind::LinkTitle, title));
    }
    b.append_to(id, Node::with_tokens(NodeKind::CloseParen, ")"));
}

/// Reference link: `[text][label]`.
pub(crate) fn link_ref(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if is_blank(node) {
        return Outcome::Discard;
    }
    let mut link = Node::new(NodeKind::Link);
    link.link_type = LinkType::Reference;
    link.link_ref_label = dom::attr_or_empty(node, "data-link-label");
    let id = b.append(link);
    b.append_to(id, Node::with_tokens(NodeKind::OpenBracket, "["));
    Outcome::Open(id, Some(link_ref_close))
}

fn link_ref_close(b: &mut Builder<'_>, _: &Handle, id: NodeId) {
    let tree = b.tree_mut();
    if tree[id].link_ref_label.is_empty() {
        tree[id].link_ref_label = tree.text(id);
    }
    tree.append_new(id, Node::with_tokens(NodeKind::CloseBracket, "]"));
}

/// Whether nothing but whitespace follows `node` up to its block.
fn is_trailing(node: &Handle) -> bool {
    let mut cur = node.clone();
    loop {
        if dom::next_significant_sibling(&cur).is_some() {
            return false;
        }
        match dom::parent(&cur) {
            Some(p) if !dom::tag(&p).is_some_and(|t| BREAK_SCOPE_TAGS.contains(&t)) => cur = p,
            _ => return true,
        }
    }
}

pub(crate) fn line_break(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let tip = b.tip();
    let tree = b.tree();
    let in_cell = tree[tip].kind == NodeKind::TableCell
        || tree.ancestor_of_kind(tip, &[NodeKind::TableCell]).is_some();
    if is_trailing(node) || tree[tip].first_child().is_none() {
        return Outcome::Discard;
    }
    if in_cell {
        b.append(Node::with_tokens(NodeKind::InlineHtml, "<br />"));
    } else if !is_block_tip(b.tip_kind()) {
        b.append(Node::new(NodeKind::HardBreak));
    }
    Outcome::Emitted
}

/// `u` has no Markdown form; it is kept as inline HTML around its content.
pub(crate) fn underline(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    if is_blank(node) {
        return Outcome::Discard;
    }
    b.append(Node::with_tokens(NodeKind::InlineHtml, "<u>"));
    b.visit_children(node);
    b.append(Node::with_tokens(NodeKind::InlineHtml, "</u>"));
    Outcome::Emitted
}

pub(crate) fn inline_html(b: &mut Builder<'_>, node: &Handle) -> Outcome {
    let html = strip_zwsp(&dom::outer_html(node));
    b.append(Node::with_tokens(NodeKind::InlineHtml, html));
    Outcome::Emitted
}

pub(crate) fn discard(_: &mut Builder<'_>, _: &Handle) -> Outcome {
    Outcome::Discard
}

pub(crate) fn descend(_: &mut Builder<'_>, _: &Handle) -> Outcome {
    Outcome::Descend
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Comments and elements no dialect renders.
pub(crate) fn is_non_content(node: &Handle) -> bool {
    match dom::tag(node) {
        Some(tag) => matches!(tag, "meta" | "script" | "style" | "template" | "svg" | "head" | "title"),
        None => false,
    }
}

/// Editor chrome: toolbars and previews rendered by the editor itself.
pub(crate) fn is_editor_preview(node: &Handle) -> bool {
    matches!(dom::attr(node, "data-render").as_deref(), Some("1" | "2"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_editor_text_keeps_caret_placeholder() {
        assert_eq!(editor_text(&format!("{CARET}{ZWSP}")), format!("{CARET}{ZWSP}"));
        assert_eq!(editor_text(&format!("a{ZWSP}b")), "ab");
    }

    #[test]
    fn test_collapse_whitespace_keeps_nbsp() {
        assert_eq!(collapse_whitespace("a \n\t b\u{a0}c"), "a b\u{a0}c");
    }

    #[test]
    fn test_link_dest_strips_base_and_prefix() {
        let options = TransduceOptions {
            link_base: url::Url::parse("https://example.com/docs/").ok(),
            link_prefix: "assets/".to_string(),
            keep_caret: false,
        };
        assert_eq!(link_dest(&options, "https://example.com/docs/assets/a.png"), "a.png");
        assert_eq!(link_dest(&options, "https://other.org/x"), "https://other.org/x");
    }

    fn item_numbers(html: &str) -> Vec<u32> {
        let tree = crate::transduce::transduce(html, crate::Dialect::Wysiwyg, &TransduceOptions::default());
        tree.descendants(tree.root())
            .into_iter()
            .filter(|&id| tree[id].kind == NodeKind::ListItem)
            .filter_map(|id| tree[id].list.as_ref().map(|d| d.num))
            .collect()
    }

    #[test]
    fn test_ordered_items_count_from_one_without_start() {
        assert_eq!(item_numbers("<ol><li data-marker=\"3.\">x</li><li data-marker=\"4.\">y</li></ol>"), vec![1, 2]);
        assert_eq!(item_numbers("<ol start=\"3\"><li>x</li><li>y</li></ol>"), vec![3, 4]);
    }

    #[test]
    fn test_huge_start_is_clamped() {
        let numbers = item_numbers("<ol start=\"4294967295\"><li>a</li><li>b</li></ol>");
        assert_eq!(numbers, vec![999_999_999, 1_000_000_000]);
    }

    #[test]
    fn test_run_markers() {
        assert_eq!(
            run_markers(NodeKind::Strong, "__"),
            (NodeKind::StrongUnderscoreOpenMarker, NodeKind::StrongUnderscoreCloseMarker)
        );
        assert_eq!(
            run_markers(NodeKind::Strikethrough, "~"),
            (NodeKind::Strikethrough1OpenMarker, NodeKind::Strikethrough1CloseMarker)
        );
        assert_eq!(close_of(NodeKind::Mark2OpenMarker), NodeKind::Mark2CloseMarker);
    }

    #[test]
    fn test_code_text_drops_one_newline() {
        assert_eq!(code_text("a\n\n"), "a\n");
        assert_eq!(code_text("a"), "a");
    }

    #[test]
    fn test_link_ref_def_line() {
        let caps = LINK_REF_DEF.captures("[foo]: https://example.com").unwrap();
        assert_eq!(&caps[1], "foo");
        assert_eq!(&caps[2], "https://example.com");
        assert!(LINK_REF_DEF.captures("plain text").is_none());
    }

    #[test]
    fn test_longest_backtick_run() {
        assert_eq!(longest_backtick_run("a``b`"), 2);
        assert_eq!(longest_backtick_run("ab"), 0);
    }
}
