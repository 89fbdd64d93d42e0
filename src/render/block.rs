// Tree → block editor DOM.
//
// Every block becomes a `div` carrying its identity (`data-node-id`, the
// top-level `data-node-index`), its kind (`data-type="Node<Kind>"`) and its
// inline attribute list as attributes, and closes with a `protyle-attr`
// strip showing name/alias/bookmark. Inline content lives in a
// `contenteditable` child. The caret is kept as the raw sentinel.

use std::collections::HashMap;

use super::{
    build_table, child_tokens, BaseRenderer, Handler, HandlerTable, RenderOptions, Renderer,
};
use crate::ast::{LinkType, ListType, NodeId, NodeKind, Tree, WalkStatus};
use crate::sentinel::{escape_html, strip_caret, CARET, FRONT_END_CARET};

/// Block DOM renderer.
#[derive(Debug)]
pub struct BlockRenderer {
    base: BaseRenderer,
    table: HandlerTable<BlockRenderer>,
    footnotes: HashMap<String, usize>,
    /// Index given to the next top-level block.
    node_index: usize,
}

impl Default for BlockRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl BlockRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            base: BaseRenderer::new(options),
            table: build_table(handler),
            footnotes: HashMap::new(),
            node_index: 0,
        }
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)], self_closing: bool) {
        self.base.tag(name, attrs, self_closing);
    }

    fn write(&mut self, s: &str) {
        self.base.writer.write_str(s);
    }

    /// Open the block `div` of `id`: `leading` attributes first, then the
    /// identity, type, class and remaining IAL pairs.
    fn open_block(&mut self, tree: &Tree, id: NodeId, class: &str, leading: &[(&str, &str)]) {
        let node = &tree[id];
        let mut attrs: Vec<(String, String)> = leading
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let node_id = match node.ial_value("id") {
            Some(v) => v.to_string(),
            None => node.id.clone(),
        };
        if !node_id.is_empty() {
            attrs.push(("data-node-id".into(), node_id));
        }
        if node.parent() == Some(tree.root()) {
            attrs.push(("data-node-index".into(), self.node_index.to_string()));
            self.node_index += 1;
        }
        attrs.push(("data-type".into(), format!("Node{}", node.kind.name())));
        attrs.push(("class".into(), class.to_string()));
        for (k, v) in &node.ial {
            if k != "id" {
                attrs.push((k.clone(), v.clone()));
            }
        }
        let attrs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        self.tag("div", &attrs, false);
    }

    /// The attribute strip and the closing `div` of a block.
    fn close_block(&mut self, tree: &Tree, id: NodeId) {
        self.tag("div", &[("class", "protyle-attr")], false);
        for name in ["name", "alias", "bookmark"] {
            if let Some(value) = tree[id].ial_value(name) {
                let class = format!("protyle-attr--{name}");
                self.tag("div", &[("class", class.as_str())], false);
                self.write(&escape_html(value));
                self.write("</div>");
            }
        }
        self.write("</div></div>");
    }

    fn open_editable(&mut self) {
        self.tag("div", &[("contenteditable", "true"), ("spellcheck", "false")], false);
    }
}

impl Renderer for BlockRenderer {
    fn base(&self) -> &BaseRenderer {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseRenderer {
        &mut self.base
    }

    fn table(&self) -> &HandlerTable<Self> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut HandlerTable<Self> {
        &mut self.table
    }

    fn begin(&mut self, tree: &Tree, root: NodeId) {
        self.node_index = 0;
        self.footnotes.clear();
        for id in tree.descendants(root) {
            if tree[id].kind == NodeKind::FootnotesDef {
                let next = self.footnotes.len() + 1;
                self.footnotes.entry(tree[id].tokens.clone()).or_insert(next);
            }
        }
    }
}

fn handler(kind: NodeKind) -> Option<Handler<BlockRenderer>> {
    use NodeKind::*;
    let h: Handler<BlockRenderer> = match kind {
        Document | Emoji => render_container,
        Paragraph => render_paragraph,
        Heading => render_heading,
        HeadingMarker | HeadingId | BlockquoteMarker | CodeBlockFenceOpenMarker
        | CodeBlockFenceInfoMarker | CodeBlockCode | CodeBlockFenceCloseMarker
        | KramdownBlockIal | KramdownSpanIal | MathBlockOpenMarker | MathBlockContent
        | MathBlockCloseMarker | YamlFrontMatterOpenMarker | YamlFrontMatterContent
        | YamlFrontMatterCloseMarker | SuperBlockOpenMarker | SuperBlockLayoutMarker
        | SuperBlockCloseMarker | LinkRefDef | TaskListItemMarker | Bang | OpenBracket
        | CloseBracket | OpenParen | CloseParen | LinkDest | LinkSpace | LinkTitle
        | InlineMathOpenMarker | InlineMathContent | InlineMathCloseMarker
        | CodeSpanOpenMarker | CodeSpanCloseMarker | EmojiAlias => render_nothing,
        EmAsteriskOpenMarker | EmAsteriskCloseMarker | EmUnderscoreOpenMarker
        | EmUnderscoreCloseMarker | StrongAsteriskOpenMarker | StrongAsteriskCloseMarker
        | StrongUnderscoreOpenMarker | StrongUnderscoreCloseMarker | Strikethrough1OpenMarker
        | Strikethrough1CloseMarker | Strikethrough2OpenMarker | Strikethrough2CloseMarker
        | Mark1OpenMarker | Mark1CloseMarker | Mark2OpenMarker | Mark2CloseMarker
        | SupOpenMarker | SupCloseMarker | SubOpenMarker | SubCloseMarker => render_nothing,
        Text | LinkText | BackslashContent | CodeSpanContent => render_escaped,
        ThematicBreak => render_thematic_break,
        Blockquote => |r, t, id, e| render_plain_block(r, t, id, e, "bq"),
        SuperBlock => render_super_block,
        FootnotesDefBlock => |r, t, id, e| render_plain_block(r, t, id, e, "footnotes-block"),
        FootnotesDef => render_footnotes_def,
        List => render_list,
        ListItem => render_list_item,
        HtmlBlock => render_html_block,
        CodeBlock => render_code_block,
        MathBlock => render_math_block,
        YamlFrontMatter => render_yaml_front_matter,
        Toc => render_toc,
        LinkRefDefBlock => render_link_ref_def_block,
        Table => render_table,
        TableHead => render_table_head,
        TableRow => render_table_row,
        TableCell => render_table_cell,
        Emphasis | Strong | Strikethrough | Mark | Sup | Sub => render_delimited,
        CodeSpan => render_code_span,
        InlineHtml => render_inline_html,
        HtmlEntity => render_html_entity,
        InlineMath => render_inline_math,
        Backslash => render_backslash,
        Link => render_link,
        Image => render_image,
        EmojiUnicode => render_emoji_unicode,
        EmojiImg => render_emoji_img,
        FootnotesRef => render_footnotes_ref,
        HardBreak => render_hard_break,
        SoftBreak => render_soft_break,
    };
    Some(h)
}

fn render_container(_: &mut BlockRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::Continue
}

fn render_nothing(_: &mut BlockRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::SkipChildren
}

fn render_escaped(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write(&escape_html(&tree[id].tokens));
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Block whose children are blocks: no editable wrapper.
fn render_plain_block(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool, class: &str) -> WalkStatus {
    if entering {
        r.open_block(tree, id, class, &[]);
    } else {
        r.close_block(tree, id);
    }
    WalkStatus::Continue
}

fn render_paragraph(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.open_block(tree, id, "p", &[]);
        r.open_editable();
    } else {
        r.write("</div>");
        r.close_block(tree, id);
    }
    WalkStatus::Continue
}

fn render_heading(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let level = super::heading_tag(tree[id].heading_level);
        r.open_block(tree, id, &level, &[("data-subtype", level.as_str())]);
        r.open_editable();
    } else {
        r.write("</div>");
        r.close_block(tree, id);
    }
    WalkStatus::Continue
}

fn render_thematic_break(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.open_block(tree, id, "hr", &[]);
        r.write("<div></div></div>");
    }
    WalkStatus::SkipChildren
}

fn render_super_block(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let layout = child_tokens(tree, id, NodeKind::SuperBlockLayoutMarker);
        let layout = if layout.is_empty() { "row" } else { layout };
        r.open_block(tree, id, "sb", &[("data-sb-layout", layout)]);
    } else {
        r.close_block(tree, id);
    }
    WalkStatus::Continue
}

fn subtype(list_type: ListType) -> &'static str {
    match list_type {
        ListType::Bullet => "u",
        ListType::Ordered => "o",
        ListType::Task => "t",
    }
}

fn render_list(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.close_block(tree, id);
        return WalkStatus::Continue;
    }
    let data = tree[id].list.clone().unwrap_or_default();
    let tight = if data.tight { "true" } else { "false" };
    r.open_block(
        tree,
        id,
        "list",
        &[("data-subtype", subtype(data.list_type)), ("data-tight", tight)],
    );
    WalkStatus::Continue
}

fn render_list_item(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.close_block(tree, id);
        return WalkStatus::Continue;
    }
    let data = tree[id].list.clone().unwrap_or_default();
    let marker = data.item_marker();
    let checked = tree
        .descendants(id)
        .into_iter()
        .find(|&d| tree[d].kind == NodeKind::TaskListItemMarker)
        .map(|m| tree[m].task_checked);
    let class = match (data.list_type, checked) {
        (ListType::Task, Some(true)) => "li protyle-task--done",
        _ => "li",
    };
    r.open_block(
        tree,
        id,
        class,
        &[("data-marker", marker.as_str()), ("data-subtype", subtype(data.list_type))],
    );
    match data.list_type {
        ListType::Task => r.write("<div class=\"protyle-action protyle-action--task\"></div>"),
        _ if data.is_numbered() => {
            r.write("<div class=\"protyle-action protyle-action--order\" contenteditable=\"false\">");
            r.write(&escape_html(&marker));
            r.write("</div>");
        }
        _ => r.write("<div class=\"protyle-action\"></div>"),
    }
    WalkStatus::Continue
}

fn render_footnotes_def(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let label = tree[id].tokens.as_str();
        r.open_block(tree, id, "footnotes-def", &[("data-footnotes-label", label)]);
    } else {
        r.close_block(tree, id);
    }
    WalkStatus::Continue
}

fn render_code_block(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let info = tree
        .first_child_of_kind(id, NodeKind::CodeBlockFenceInfoMarker)
        .map(|m| tree[m].code_block_info.as_str())
        .unwrap_or("");
    let caret_in_info = info.contains(CARET);
    let info = strip_caret(info);
    let language = info.split_whitespace().next().unwrap_or("");
    let code = if tree[id].fenced {
        child_tokens(tree, id, NodeKind::CodeBlockCode)
    } else {
        tree[id].first_child().map(|c| tree[c].tokens.as_str()).unwrap_or("")
    };
    let code = code.strip_suffix('\n').unwrap_or(code);

    r.open_block(tree, id, "code-block", &[]);
    r.write("<div class=\"protyle-action\">");
    r.tag("span", &[("class", "protyle-action--first protyle-action__language")], false);
    r.write(&escape_html(language));
    r.write("</span><span class=\"protyle-action__copy\"></span></div>");
    r.open_editable();
    if strip_caret(code).is_empty() {
        if caret_in_info || code.contains(CARET) {
            r.write(FRONT_END_CARET);
        }
    } else {
        r.write(&escape_html(code));
    }
    r.write("</div>");
    r.close_block(tree, id);
    WalkStatus::SkipChildren
}

fn render_math_block(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let content = child_tokens(tree, id, NodeKind::MathBlockContent).trim();
        r.open_block(
            tree,
            id,
            "render-node",
            &[("data-subtype", "math"), ("data-content", content)],
        );
        r.write("<div spin=\"1\"></div>");
        r.close_block(tree, id);
    }
    WalkStatus::SkipChildren
}

fn render_html_block(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.open_block(tree, id, "html", &[]);
        r.open_editable();
        r.write("<pre><code>");
        r.write(&escape_html(tree[id].tokens.trim()));
        r.write("</code></pre></div>");
        r.close_block(tree, id);
    }
    WalkStatus::SkipChildren
}

fn render_yaml_front_matter(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let content = child_tokens(tree, id, NodeKind::YamlFrontMatterContent);
        r.open_block(tree, id, "code-block", &[]);
        r.open_editable();
        r.write(&escape_html(content.trim_end_matches('\n')));
        r.write("</div>");
        r.close_block(tree, id);
    }
    WalkStatus::SkipChildren
}

fn render_toc(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.open_block(tree, id, "toc", &[]);
        r.close_block(tree, id);
    }
    WalkStatus::SkipChildren
}

fn render_link_ref_def_block(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.open_block(tree, id, "link-ref-defs", &[]);
        r.open_editable();
        for def in tree.children_of_kind(id, NodeKind::LinkRefDef) {
            let dest = child_tokens(tree, def, NodeKind::LinkDest);
            let sep = if dest == CARET { "" } else { " " };
            let line = format!("[{}]:{sep}{dest}\n", tree[def].link_ref_label);
            r.write(&escape_html(&line));
        }
        r.write("</div>");
        r.close_block(tree, id);
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn render_table(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.open_block(tree, id, "table", &[]);
        r.open_editable();
        r.write("<table>");
    } else {
        let has_body = tree[id]
            .first_child()
            .is_some_and(|head| tree[head].next().is_some());
        if has_body {
            r.write("</tbody>");
        }
        r.write("</table></div>");
        r.close_block(tree, id);
    }
    WalkStatus::Continue
}

fn render_table_head(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("<thead>");
    } else {
        r.write("</thead>");
        if tree[id].next().is_some() {
            r.write("<tbody>");
        }
    }
    WalkStatus::Continue
}

fn render_table_row(r: &mut BlockRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    r.write(if entering { "<tr>" } else { "</tr>" });
    WalkStatus::Continue
}

fn render_table_cell(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let in_head = tree[id]
        .parent()
        .and_then(|row| tree[row].parent())
        .is_some_and(|p| tree[p].kind == NodeKind::TableHead);
    let tag = if in_head { "th" } else { "td" };
    if entering {
        let mut attrs = Vec::new();
        if let Some(align) = tree[id].cell_align.as_attr() {
            attrs.push(("align", align));
        }
        r.tag(tag, &attrs, false);
        if !tree[id].has_children() {
            r.write(" ");
        }
    } else {
        r.tag(&format!("/{tag}"), &[], false);
    }
    WalkStatus::Continue
}

// ---------------------------------------------------------------------------
// Inlines
// ---------------------------------------------------------------------------

fn render_delimited(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let marker = tree[id]
        .first_child()
        .map(|m| tree[m].kind)
        .unwrap_or(NodeKind::Text);
    let (tag, data_marker) = match marker {
        NodeKind::EmUnderscoreOpenMarker => ("em", "_"),
        NodeKind::StrongAsteriskOpenMarker => ("strong", "**"),
        NodeKind::StrongUnderscoreOpenMarker => ("strong", "__"),
        NodeKind::Strikethrough1OpenMarker => ("s", "~"),
        NodeKind::Strikethrough2OpenMarker => ("s", "~~"),
        NodeKind::Mark1OpenMarker => ("mark", "="),
        NodeKind::Mark2OpenMarker => ("mark", "=="),
        NodeKind::SupOpenMarker => ("sup", "^"),
        NodeKind::SubOpenMarker => ("sub", "~"),
        _ => ("em", "*"),
    };
    if entering {
        r.tag(tag, &[("data-marker", data_marker)], false);
    } else {
        r.tag(&format!("/{tag}"), &[], false);
    }
    WalkStatus::Continue
}

fn render_code_span(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let marker = "`".repeat(tree[id].code_marker_len.max(1));
        r.tag("code", &[("data-marker", marker.as_str())], false);
    } else {
        r.write("</code>");
    }
    WalkStatus::Continue
}

fn render_inline_html(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = tree[id].tokens.as_str();
        if tokens == "<br />" && super::in_table_cell(tree, id) {
            r.write(tokens);
        } else {
            r.tag("code", &[("data-type", "html-inline")], false);
            r.write(&escape_html(tokens));
            r.write("</code>");
        }
    }
    WalkStatus::SkipChildren
}

fn render_html_entity(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = tree[id].tokens.as_str();
        r.tag("span", &[("data-type", "html-entity"), ("data-content", tokens)], false);
        r.write(&crate::sentinel::unescape_html(&strip_caret(tokens)));
        r.write("</span>");
    }
    WalkStatus::SkipChildren
}

fn render_inline_math(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let content = child_tokens(tree, id, NodeKind::InlineMathContent);
        r.tag(
            "span",
            &[
                ("data-type", "inline-math"),
                ("data-subtype", "math"),
                ("data-content", content),
                ("contenteditable", "false"),
                ("class", "render-node"),
            ],
            false,
        );
        r.write("</span>");
    }
    WalkStatus::SkipChildren
}

fn render_backslash(r: &mut BlockRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("<span data-type=\"backslash\"><span>\\</span>");
    } else {
        r.write("</span>");
    }
    WalkStatus::Continue
}

fn render_link(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.write("</span>");
        return WalkStatus::Continue;
    }
    let node = &tree[id];
    if node.link_type == LinkType::Reference {
        let label = node.link_ref_label.as_str();
        r.tag("span", &[("data-type", "link-ref"), ("data-link-label", label)], false);
        return WalkStatus::Continue;
    }
    let dest = child_tokens(tree, id, NodeKind::LinkDest);
    let dest = if r.base.options.sanitize && super::is_unsafe_dest(dest) { "" } else { dest };
    let title = child_tokens(tree, id, NodeKind::LinkTitle);
    let mut attrs = vec![("data-type", "a"), ("data-href", dest)];
    if !title.is_empty() {
        attrs.push(("data-title", title));
    }
    r.tag("span", &attrs, false);
    WalkStatus::Continue
}

fn render_image(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let dest = strip_caret(child_tokens(tree, id, NodeKind::LinkDest));
        let alt = strip_caret(child_tokens(tree, id, NodeKind::LinkText));
        let title = child_tokens(tree, id, NodeKind::LinkTitle);
        let mut attrs = vec![("src", dest.as_str()), ("data-src", dest.as_str()), ("alt", alt.as_str())];
        if !title.is_empty() {
            attrs.push(("title", title));
        }
        r.write("<span contenteditable=\"false\" data-type=\"img\" class=\"img\">");
        r.tag("img", &attrs, true);
        r.write("</span>");
    }
    WalkStatus::SkipChildren
}

fn render_emoji_unicode(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let alias = child_tokens(tree, id, NodeKind::EmojiAlias);
        r.tag("span", &[("data-type", "emoji"), ("data-alias", alias)], false);
        r.write(&tree[id].tokens);
        r.write("</span>");
    }
    WalkStatus::SkipChildren
}

fn render_emoji_img(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write(&tree[id].tokens);
    }
    WalkStatus::SkipChildren
}

fn render_hard_break(r: &mut BlockRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("br", &[], true);
    }
    WalkStatus::SkipChildren
}

fn render_soft_break(r: &mut BlockRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("\n");
    }
    WalkStatus::SkipChildren
}

fn render_footnotes_ref(r: &mut BlockRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let label = tree[id].tokens.as_str();
        let num = r.footnotes.get(label).copied().unwrap_or(0).to_string();
        r.tag(
            "sup",
            &[
                ("data-type", "footnotes-ref"),
                ("data-footnotes-label", label),
                ("class", "protyle-tooltipped protyle-tooltipped__s"),
            ],
            false,
        );
        r.write(&num);
        r.write("</sup>");
    }
    WalkStatus::SkipChildren
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ListData, Node};
    use pretty_assertions::assert_eq;

    fn block(tree: &Tree) -> String {
        BlockRenderer::default().render(tree).unwrap()
    }

    #[test]
    fn test_paragraph_carries_identity() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree[p].set_ial("id", "20210101-abc");
        tree[p].set_ial("style", "color: red");
        tree.append_new(p, Node::text(format!("a{CARET}")));
        assert_eq!(
            block(&tree),
            format!(
                "<div data-node-id=\"20210101-abc\" data-node-index=\"0\" data-type=\"NodeParagraph\" \
                 class=\"p\" style=\"color: red\"><div contenteditable=\"true\" spellcheck=\"false\">a{CARET}</div>\
                 <div class=\"protyle-attr\"></div></div>"
            )
        );
    }

    #[test]
    fn test_ordered_item_shows_its_number() {
        let mut tree = Tree::new();
        let root = tree.root();
        let list = tree.append_new(root, Node::list(NodeKind::List, ListData::from_marker("3.")));
        let item = tree.append_new(list, Node::list(NodeKind::ListItem, ListData::from_marker("3.")));
        let p = tree.append_new(item, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("x"));
        let out = block(&tree);
        assert!(out.contains("data-marker=\"3.\" data-subtype=\"o\""));
        assert!(out.contains("protyle-action--order\" contenteditable=\"false\">3.</div>"));
        assert!(!out.contains("data-node-index=\"1\""));
    }

    #[test]
    fn test_name_shows_in_attribute_strip() {
        let mut tree = Tree::new();
        let root = tree.root();
        let hr = tree.append_new(root, Node::new(NodeKind::ThematicBreak));
        tree[hr].set_ial("name", "sep");
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree[p].set_ial("name", "<n>");
        let out = block(&tree);
        assert!(out.contains("data-node-index=\"1\""));
        assert!(out.contains("<div class=\"protyle-attr--name\">&lt;n&gt;</div>"));
    }
}
