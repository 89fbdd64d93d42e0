// Tree → publishable HTML.
//
// Paragraphs directly inside items of a tight list render without `<p>`.
// Footnote references are numbered by the order of their definitions, and
// the definitions block renders where it sits in the tree. Code blocks go
// through an optional caller-supplied highlighter.

use std::collections::HashMap;

use super::{
    build_table, child_tokens, heading_anchor, heading_tag, in_table_cell, is_unsafe_dest,
    BaseRenderer, Handler, HandlerTable, RenderOptions, Renderer,
};
use crate::ast::{LinkType, NodeId, NodeKind, Tree, WalkStatus};
use crate::sentinel::escape_html;

/// Output of a [`Highlighter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    /// Highlighted code as HTML, already escaped.
    pub html: String,
    /// Language the highlighter settled on. Differs from the requested one
    /// when it was empty and the highlighter detected it.
    pub language: String,
}

/// Syntax highlighting hook for code blocks.
pub trait Highlighter {
    /// Highlight `code` written in `language`; an empty `language` asks
    /// for detection. `None` falls back to plain escaped text.
    fn highlight(&self, language: &str, code: &str) -> Option<Highlighted>;
}

/// HTML renderer.
pub struct HtmlRenderer {
    base: BaseRenderer,
    table: HandlerTable<HtmlRenderer>,
    highlighter: Option<Box<dyn Highlighter + Send + Sync>>,
    /// Tags are suppressed while > 0 (image alt text).
    disable_tags: usize,
    /// Footnote label → 1-based definition number.
    footnotes: HashMap<String, usize>,
    /// Link reference label → destination.
    link_refs: HashMap<String, String>,
    /// Headings in document order, for the table of contents.
    headings: Vec<NodeId>,
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("base", &self.base)
            .field("highlighter", &self.highlighter.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl HtmlRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            base: BaseRenderer::new(options),
            table: build_table(handler),
            highlighter: None,
            disable_tags: 0,
            footnotes: HashMap::new(),
            link_refs: HashMap::new(),
            headings: Vec::new(),
        }
    }

    /// Use `highlighter` for fenced code blocks with a language.
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + Send + Sync + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)], self_closing: bool) {
        if self.disable_tags == 0 {
            self.base.tag(name, attrs, self_closing);
        }
    }

    /// Block IAL pairs as tag attributes, when enabled.
    fn ial_attrs<'t>(&self, tree: &'t Tree, id: NodeId) -> Vec<(&'t str, &'t str)> {
        if !self.base.options.kramdown_block_ial {
            return Vec::new();
        }
        tree[id]
            .ial
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn dest(&self, tree: &Tree, id: NodeId) -> String {
        let dest = if tree[id].link_type == LinkType::Reference {
            self.link_refs
                .get(&tree[id].link_ref_label.to_lowercase())
                .cloned()
                .unwrap_or_default()
        } else {
            child_tokens(tree, id, NodeKind::LinkDest).to_string()
        };
        if self.base.options.sanitize && is_unsafe_dest(&dest) {
            return String::new();
        }
        dest
    }
}

impl Renderer for HtmlRenderer {
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
        self.disable_tags = 0;
        self.footnotes.clear();
        self.link_refs.clear();
        self.headings.clear();
        for id in tree.descendants(root) {
            let node = &tree[id];
            match node.kind {
                NodeKind::FootnotesDef => {
                    let next = self.footnotes.len() + 1;
                    self.footnotes.entry(node.tokens.clone()).or_insert(next);
                }
                NodeKind::LinkRefDef => {
                    let dest = child_tokens(tree, id, NodeKind::LinkDest).to_string();
                    self.link_refs
                        .entry(node.link_ref_label.to_lowercase())
                        .or_insert(dest);
                }
                NodeKind::Heading => self.headings.push(id),
                _ => {}
            }
        }
    }
}

fn handler(kind: NodeKind) -> Option<Handler<HtmlRenderer>> {
    use NodeKind::*;
    let h: Handler<HtmlRenderer> = match kind {
        Document | Backslash | Emoji | InlineMath | CodeSpan | Emphasis | Strong
        | Strikethrough | Mark | Sup | Sub => render_container,
        Paragraph => render_paragraph,
        Heading => render_heading,
        HeadingMarker | HeadingId | BlockquoteMarker | CodeBlockFenceOpenMarker
        | CodeBlockFenceInfoMarker | CodeBlockFenceCloseMarker | Bang | OpenBracket
        | CloseBracket | OpenParen | CloseParen | LinkDest | LinkSpace | LinkTitle
        | EmojiAlias | KramdownBlockIal | KramdownSpanIal | LinkRefDefBlock | LinkRefDef
        | SuperBlockOpenMarker | SuperBlockLayoutMarker | SuperBlockCloseMarker
        | MathBlockOpenMarker | MathBlockCloseMarker | YamlFrontMatterOpenMarker
        | YamlFrontMatterCloseMarker => render_nothing,
        InlineMathOpenMarker => render_inline_math_open,
        InlineMathCloseMarker => |r, _, _, e| open_close(r, e, "/span"),
        Text | LinkText | BackslashContent | CodeSpanContent | InlineMathContent
        | MathBlockContent | YamlFrontMatterContent => render_escaped,
        HtmlEntity | EmojiUnicode | EmojiImg => render_raw,
        ThematicBreak => render_thematic_break,
        Blockquote => render_blockquote,
        List => render_list,
        ListItem => render_list_item,
        TaskListItemMarker => render_task_list_item_marker,
        HtmlBlock => render_html_block,
        InlineHtml => render_inline_html,
        CodeBlock => render_code_block,
        CodeBlockCode => render_code_block_code,
        EmAsteriskOpenMarker | EmUnderscoreOpenMarker => |r, _, _, e| open_close(r, e, "em"),
        EmAsteriskCloseMarker | EmUnderscoreCloseMarker => |r, _, _, e| open_close(r, e, "/em"),
        StrongAsteriskOpenMarker | StrongUnderscoreOpenMarker => {
            |r, _, _, e| open_close(r, e, "strong")
        }
        StrongAsteriskCloseMarker | StrongUnderscoreCloseMarker => {
            |r, _, _, e| open_close(r, e, "/strong")
        }
        Strikethrough1OpenMarker | Strikethrough2OpenMarker => |r, _, _, e| open_close(r, e, "del"),
        Strikethrough1CloseMarker | Strikethrough2CloseMarker => {
            |r, _, _, e| open_close(r, e, "/del")
        }
        Mark1OpenMarker | Mark2OpenMarker => |r, _, _, e| open_close(r, e, "mark"),
        Mark1CloseMarker | Mark2CloseMarker => |r, _, _, e| open_close(r, e, "/mark"),
        SupOpenMarker => |r, _, _, e| open_close(r, e, "sup"),
        SupCloseMarker => |r, _, _, e| open_close(r, e, "/sup"),
        SubOpenMarker => |r, _, _, e| open_close(r, e, "sub"),
        SubCloseMarker => |r, _, _, e| open_close(r, e, "/sub"),
        CodeSpanOpenMarker => |r, _, _, e| open_close(r, e, "code"),
        CodeSpanCloseMarker => |r, _, _, e| open_close(r, e, "/code"),
        HardBreak => render_hard_break,
        SoftBreak => render_soft_break,
        Link => render_link,
        Image => render_image,
        Table => render_table,
        TableHead => render_table_head,
        TableRow => render_table_row,
        TableCell => render_table_cell,
        MathBlock => render_math_block,
        FootnotesDefBlock => render_footnotes_def_block,
        FootnotesDef => render_footnotes_def,
        FootnotesRef => render_footnotes_ref,
        Toc => render_toc,
        YamlFrontMatter => render_yaml_front_matter,
        SuperBlock => render_super_block,
    };
    Some(h)
}

// ---------------------------------------------------------------------------
// Generic handlers
// ---------------------------------------------------------------------------

fn render_container(_: &mut HtmlRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::Continue
}

fn render_nothing(_: &mut HtmlRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::SkipChildren
}

fn render_escaped(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&escape_html(&tree[id].tokens));
    }
    WalkStatus::SkipChildren
}

fn render_raw(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&tree[id].tokens);
    }
    WalkStatus::SkipChildren
}

fn open_close(r: &mut HtmlRenderer, entering: bool, tag: &str) -> WalkStatus {
    if entering {
        r.tag(tag, &[], false);
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

fn render_paragraph(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let in_tight_item = tree[id]
        .parent()
        .filter(|&p| tree[p].kind == NodeKind::ListItem)
        .and_then(|p| tree[p].parent())
        .is_some_and(|list| tree[list].kind == NodeKind::List && tree[list].is_tight());
    if in_tight_item {
        return WalkStatus::Continue;
    }
    if entering {
        r.base.writer.newline();
        let attrs = r.ial_attrs(tree, id);
        r.tag("p", &attrs, false);
    } else {
        r.tag("/p", &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_heading(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let tag = heading_tag(tree[id].heading_level);
    if entering {
        r.base.writer.newline();
        let anchor = heading_anchor(tree, id);
        let mut attrs = Vec::new();
        if r.base.options.heading_id || r.base.options.toc {
            attrs.push(("id", anchor.as_str()));
        }
        r.tag(&tag, &attrs, false);
    } else {
        r.tag(&format!("/{tag}"), &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_thematic_break(r: &mut HtmlRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.newline();
        r.tag("hr", &[], true);
        r.base.writer.newline();
    }
    WalkStatus::SkipChildren
}

fn render_blockquote(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    r.base.writer.newline();
    if entering {
        let attrs = r.ial_attrs(tree, id);
        r.tag("blockquote", &attrs, false);
    } else {
        r.tag("/blockquote", &[], false);
    }
    r.base.writer.newline();
    WalkStatus::Continue
}

fn render_list(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let data = tree[id].list.clone().unwrap_or_default();
    let tag = if data.is_numbered() { "ol" } else { "ul" };
    r.base.writer.newline();
    if entering {
        let start = data.start.to_string();
        let mut attrs = Vec::new();
        if data.is_numbered() && data.start != 1 {
            attrs.push(("start", start.as_str()));
        }
        attrs.extend(r.ial_attrs(tree, id));
        r.tag(tag, &attrs, false);
    } else {
        r.tag(&format!("/{tag}"), &[], false);
    }
    r.base.writer.newline();
    WalkStatus::Continue
}

/// First task marker of an item, in the item itself or its first paragraph.
fn item_task_marker(tree: &Tree, item: NodeId) -> Option<NodeId> {
    let first = tree[item].first_child()?;
    if tree[first].kind == NodeKind::TaskListItemMarker {
        return Some(first);
    }
    tree[first]
        .first_child()
        .filter(|&c| tree[c].kind == NodeKind::TaskListItemMarker)
}

fn render_list_item(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let class = r.base.options.task_list_item_class.clone();
        let mut attrs = r.ial_attrs(tree, id);
        if !class.is_empty() && item_task_marker(tree, id).is_some() {
            attrs.push(("class", class.as_str()));
        }
        r.tag("li", &attrs, false);
    } else {
        r.tag("/li", &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_task_list_item_marker(
    r: &mut HtmlRenderer,
    tree: &Tree,
    id: NodeId,
    entering: bool,
) -> WalkStatus {
    if entering {
        let mut attrs = Vec::new();
        if tree[id].task_checked {
            attrs.push(("checked", ""));
        }
        attrs.push(("disabled", ""));
        attrs.push(("type", "checkbox"));
        r.tag("input", &attrs, true);
        let spaced = tree[id]
            .next()
            .is_some_and(|n| tree[n].tokens.starts_with(' '));
        if !spaced {
            r.base.writer.write_byte(b' ');
        }
    }
    WalkStatus::SkipChildren
}

fn render_html_block(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.newline();
        render_html_tokens(r, &tree[id].tokens);
        r.base.writer.newline();
    }
    WalkStatus::SkipChildren
}

fn render_inline_html(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        render_html_tokens(r, &tree[id].tokens);
    }
    WalkStatus::SkipChildren
}

/// Raw HTML passes through unless sanitizing, which escapes it.
fn render_html_tokens(r: &mut HtmlRenderer, tokens: &str) {
    if r.base.options.sanitize {
        r.base.writer.write_str(&escape_html(tokens));
    } else {
        r.base.writer.write_str(tokens);
    }
}

fn render_code_block(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.newline();
    }
    if tree[id].fenced {
        return WalkStatus::Continue;
    }
    if entering {
        let code = tree[id]
            .first_child()
            .map(|c| tree[c].tokens.as_str())
            .unwrap_or("");
        let w = &mut r.base.writer;
        w.write_str("<pre><code>");
        w.write_str(&escape_html(code));
        w.write_str("</code></pre>");
        w.newline();
    }
    WalkStatus::SkipChildren
}

fn render_code_block_code(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let code = &tree[id].tokens;
    let info = tree[id]
        .parent()
        .and_then(|p| tree.first_child_of_kind(p, NodeKind::CodeBlockFenceInfoMarker))
        .map(|m| tree[m].code_block_info.as_str())
        .unwrap_or("");
    let language = info.split_whitespace().next().unwrap_or("");

    let highlighted = r.highlighter.as_ref().and_then(|h| h.highlight(language, code));
    let language = highlighted
        .as_ref()
        .map(|h| h.language.as_str())
        .filter(|l| !l.is_empty())
        .unwrap_or(language);
    let w = &mut r.base.writer;
    if language.is_empty() {
        w.write_str("<pre><code>");
    } else {
        w.write_str("<pre><code class=\"language-");
        w.write_str(&escape_html(language));
        if highlighted.is_some() {
            w.write_str(" highlight-chroma");
        }
        w.write_str("\">");
    }
    match highlighted {
        Some(h) => w.write_str(&h.html),
        None => w.write_str(&escape_html(code)),
    }
    w.write_str("</code></pre>");
    w.newline();
    WalkStatus::SkipChildren
}

fn render_math_block(r: &mut HtmlRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    r.base.writer.newline();
    if entering {
        r.tag("div", &[("class", "vditor-math")], false);
    } else {
        r.tag("/div", &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_yaml_front_matter(r: &mut HtmlRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    r.base.writer.newline();
    if entering {
        r.tag("div", &[("class", "vditor-yml-front-matter")], false);
    } else {
        r.tag("/div", &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_super_block(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    r.base.writer.newline();
    if entering {
        let layout = child_tokens(tree, id, NodeKind::SuperBlockLayoutMarker);
        let layout = if layout.is_empty() { "row" } else { layout };
        r.tag("div", &[("class", "sb"), ("data-sb-layout", layout)], false);
    } else {
        r.tag("/div", &[], false);
    }
    r.base.writer.newline();
    WalkStatus::Continue
}

fn render_toc(r: &mut HtmlRenderer, tree: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if !entering || !r.base.options.toc || r.headings.is_empty() {
        return WalkStatus::SkipChildren;
    }
    let mut out = String::from("<div class=\"vditor-toc\">");
    for &h in &r.headings {
        let level = tree[h].heading_level.clamp(1, 6) as usize;
        out.push_str(&"&emsp;".repeat((level - 1) * 2));
        out.push_str(&format!(
            "<span class=\"toc-h{level}\"><a class=\"toc-a\" href=\"#{}\">{}</a></span><br>",
            escape_html(&heading_anchor(tree, h)),
            escape_html(&crate::sentinel::strip_caret(&tree.text(h))),
        ));
    }
    out.push_str("</div>");
    r.base.writer.newline();
    r.base.writer.write_str(&out);
    r.base.writer.newline();
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Footnotes
// ---------------------------------------------------------------------------

fn render_footnotes_def_block(r: &mut HtmlRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if !r.base.options.footnotes {
        return WalkStatus::SkipChildren;
    }
    let w = &mut r.base.writer;
    if entering {
        w.newline();
        w.write_str("<div class=\"footnotes-defs-div\"><hr class=\"footnotes-defs-hr\" />\n");
        w.write_str("<ol class=\"footnotes-defs-ol\">");
    } else {
        w.write_str("</ol></div>");
        w.newline();
    }
    WalkStatus::Continue
}

fn render_footnotes_def(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !r.base.options.footnotes {
        return WalkStatus::SkipChildren;
    }
    if entering {
        let num = r.footnotes.get(&tree[id].tokens).copied().unwrap_or(0);
        let def_id = format!("footnotes-def-{num}");
        r.tag("li", &[("id", def_id.as_str())], false);
    } else {
        r.tag("/li", &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_footnotes_ref(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let label = &tree[id].tokens;
    match r.footnotes.get(label).copied() {
        Some(num) if r.base.options.footnotes => {
            let num = num.to_string();
            let ref_id = format!("footnotes-ref-{num}");
            let href = format!("#footnotes-def-{num}");
            r.tag("sup", &[("class", "footnotes-ref"), ("id", ref_id.as_str())], false);
            r.tag("a", &[("href", href.as_str())], false);
            r.base.writer.write_str(&num);
            r.tag("/a", &[], false);
            r.tag("/sup", &[], false);
        }
        _ => r.base.writer.write_str(&escape_html(&format!("[{label}]"))),
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Inlines
// ---------------------------------------------------------------------------

fn render_inline_math_open(r: &mut HtmlRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("span", &[("class", "vditor-math")], false);
    }
    WalkStatus::SkipChildren
}

fn render_hard_break(r: &mut HtmlRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("br", &[], true);
        r.base.writer.newline();
    }
    WalkStatus::SkipChildren
}

fn render_soft_break(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        if r.base.options.soft_break_to_hard_break && !in_table_cell(tree, id) {
            r.tag("br", &[], true);
        }
        r.base.writer.newline();
    }
    WalkStatus::SkipChildren
}

fn render_link(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let dest = r.dest(tree, id);
        let title = child_tokens(tree, id, NodeKind::LinkTitle);
        let mut attrs = vec![("href", dest.as_str())];
        if !title.is_empty() {
            attrs.push(("title", title));
        }
        r.tag("a", &attrs, false);
    } else {
        r.tag("/a", &[], false);
    }
    WalkStatus::Continue
}

fn render_image(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        if r.disable_tags == 0 {
            let dest = r.dest(tree, id);
            let w = &mut r.base.writer;
            w.write_str("<img src=\"");
            w.write_str(&escape_html(&dest));
            w.write_str("\" alt=\"");
        }
        r.disable_tags += 1;
        return WalkStatus::Continue;
    }
    r.disable_tags = r.disable_tags.saturating_sub(1);
    if r.disable_tags == 0 {
        let title = child_tokens(tree, id, NodeKind::LinkTitle);
        let w = &mut r.base.writer;
        w.write_byte(b'"');
        if !title.is_empty() {
            w.write_str(" title=\"");
            w.write_str(&escape_html(title));
            w.write_byte(b'"');
        }
        w.write_str(" />");
    }
    WalkStatus::Continue
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn render_table(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("table", &[], false);
        r.base.writer.newline();
    } else {
        let has_body = tree[id]
            .first_child()
            .is_some_and(|head| tree[head].next().is_some());
        if has_body {
            r.tag("/tbody", &[], false);
        }
        r.base.writer.newline();
        r.tag("/table", &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_table_head(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("thead", &[], false);
        r.base.writer.newline();
    } else {
        r.tag("/thead", &[], false);
        r.base.writer.newline();
        if tree[id].next().is_some() {
            r.tag("tbody", &[], false);
        }
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

fn render_table_row(r: &mut HtmlRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    r.tag(if entering { "tr" } else { "/tr" }, &[], false);
    r.base.writer.newline();
    WalkStatus::Continue
}

fn render_table_cell(r: &mut HtmlRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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
    } else {
        r.tag(&format!("/{tag}"), &[], false);
        r.base.writer.newline();
    }
    WalkStatus::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ListData, Node};
    use pretty_assertions::assert_eq;

    fn html(tree: &Tree) -> String {
        HtmlRenderer::default().render(tree).unwrap()
    }

    fn list(tight: bool) -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let data = ListData { tight, ..ListData::default() };
        let l = tree.append_new(root, Node::list(NodeKind::List, data.clone()));
        for text in ["a", "b"] {
            let li = tree.append_new(l, Node::list(NodeKind::ListItem, data.clone()));
            let p = tree.append_new(li, Node::new(NodeKind::Paragraph));
            tree.append_new(p, Node::text(text));
        }
        tree
    }

    #[test]
    fn test_tight_list_has_no_paragraphs() {
        assert_eq!(html(&list(true)), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_list_keeps_paragraphs() {
        assert_eq!(
            html(&list(false)),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("a < b & c"));
        assert_eq!(html(&tree), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn test_heading_gets_id() {
        let mut tree = Tree::new();
        let root = tree.root();
        let h = tree.append_new(root, Node::heading(2));
        tree.append_new(h, Node::text("Getting Started"));
        assert_eq!(html(&tree), "<h2 id=\"getting-started\">Getting Started</h2>\n");
    }

    struct Upper;

    impl Highlighter for Upper {
        fn highlight(&self, language: &str, code: &str) -> Option<Highlighted> {
            let language = match language {
                "" if code.starts_with("let ") => "rust",
                other => other,
            };
            (language == "rust").then(|| Highlighted {
                html: code.to_uppercase(),
                language: language.to_string(),
            })
        }
    }

    fn code_block(lang: &str) -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let cb = tree.append_new(root, Node::code_block());
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockFenceOpenMarker, "```"));
        let mut info = Node::new(NodeKind::CodeBlockFenceInfoMarker);
        info.code_block_info = lang.to_string();
        tree.append_new(cb, info);
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockCode, "let x;\n"));
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockFenceCloseMarker, "```"));
        tree
    }

    #[test]
    fn test_code_block_highlighter() {
        let mut r = HtmlRenderer::default().with_highlighter(Upper);
        assert_eq!(
            r.render(&code_block("rust")).unwrap(),
            "<pre><code class=\"language-rust highlight-chroma\">LET X;\n</code></pre>\n"
        );
        assert_eq!(
            r.render(&code_block("go")).unwrap(),
            "<pre><code class=\"language-go\">let x;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_highlighter_detects_missing_language() {
        let mut r = HtmlRenderer::default().with_highlighter(Upper);
        assert_eq!(
            r.render(&code_block("")).unwrap(),
            "<pre><code class=\"language-rust highlight-chroma\">LET X;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_sanitize_drops_script_links() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        let a = tree.append_new(p, Node::new(NodeKind::Link));
        tree.append_new(a, Node::new(NodeKind::OpenBracket));
        tree.append_new(a, Node::with_tokens(NodeKind::LinkText, "x"));
        tree.append_new(a, Node::new(NodeKind::CloseBracket));
        tree.append_new(a, Node::new(NodeKind::OpenParen));
        tree.append_new(a, Node::with_tokens(NodeKind::LinkDest, "javascript:alert(1)"));
        tree.append_new(a, Node::new(NodeKind::CloseParen));
        let options = RenderOptions { sanitize: true, ..RenderOptions::default() };
        let out = HtmlRenderer::new(options).render(&tree).unwrap();
        assert_eq!(out, "<p><a href=\"\">x</a></p>\n");
    }

    #[test]
    fn test_footnotes_are_numbered_by_definition() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("a"));
        tree.append_new(p, Node::with_tokens(NodeKind::FootnotesRef, "^x"));
        let block = tree.append_new(root, Node::new(NodeKind::FootnotesDefBlock));
        let def = tree.append_new(block, Node::with_tokens(NodeKind::FootnotesDef, "^x"));
        let dp = tree.append_new(def, Node::new(NodeKind::Paragraph));
        tree.append_new(dp, Node::text("note"));
        let out = html(&tree);
        assert!(out.contains(
            "<sup class=\"footnotes-ref\" id=\"footnotes-ref-1\"><a href=\"#footnotes-def-1\">1</a></sup>"
        ));
        assert!(out.contains("<li id=\"footnotes-def-1\">\n<p>note</p>\n</li>"));
    }
}
