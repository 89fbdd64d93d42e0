// Tree → WYSIWYG editor DOM.
//
// Every block carries `data-block="0"`; delimited inlines carry their
// Markdown delimiter in `data-marker` so the transducer can restore the exact
// surface syntax. Code, HTML, math and YAML blocks render as an editable
// `pre > code` followed by a preview the transducer skips (`data-render`).
// Zero-width spaces pad inline nodes the browser would otherwise collapse.

use std::collections::HashMap;

use super::{
    build_table, child_tokens, heading_anchor, heading_tag, in_table_cell, previous_text_is_empty,
    BaseRenderer, Handler, HandlerTable, RenderOptions, Renderer,
};
use crate::ast::{LinkType, ListType, NodeId, NodeKind, Tree, WalkStatus};
use crate::sentinel::{escape_html, strip_caret, strip_zwsp, CARET, FRONT_END_CARET, ZWSP};

/// WYSIWYG DOM renderer.
#[derive(Debug)]
pub struct WysiwygRenderer {
    base: BaseRenderer,
    table: HandlerTable<WysiwygRenderer>,
    /// Footnote label → 1-based definition number.
    footnotes: HashMap<String, usize>,
}

impl Default for WysiwygRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl WysiwygRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            base: BaseRenderer::new(options),
            table: build_table(handler),
            footnotes: HashMap::new(),
        }
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)], self_closing: bool) {
        self.base.tag(name, attrs, self_closing);
    }

    fn write(&mut self, s: &str) {
        self.base.writer.write_str(s);
    }
}

impl Renderer for WysiwygRenderer {
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
        self.footnotes.clear();
        for id in tree.descendants(root) {
            if tree[id].kind == NodeKind::FootnotesDef {
                let next = self.footnotes.len() + 1;
                self.footnotes.entry(tree[id].tokens.clone()).or_insert(next);
            }
        }
    }
}

fn handler(kind: NodeKind) -> Option<Handler<WysiwygRenderer>> {
    use NodeKind::*;
    let h: Handler<WysiwygRenderer> = match kind {
        Document | Emoji => render_container,
        Image | EmojiUnicode | EmojiImg => render_leaf_container,
        Paragraph => render_paragraph,
        Heading => render_heading,
        HeadingMarker | HeadingId | BlockquoteMarker | CodeBlockFenceOpenMarker
        | CodeBlockFenceInfoMarker | CodeBlockFenceCloseMarker | CodeBlockCode | Bang
        | OpenBracket | CloseBracket | OpenParen | CloseParen | LinkDest | LinkSpace
        | LinkTitle | EmojiAlias | KramdownBlockIal | KramdownSpanIal | MathBlockOpenMarker
        | MathBlockContent | MathBlockCloseMarker | YamlFrontMatterOpenMarker
        | YamlFrontMatterContent | YamlFrontMatterCloseMarker | InlineMathOpenMarker
        | InlineMathCloseMarker | CodeSpanOpenMarker | CodeSpanCloseMarker
        | SuperBlockOpenMarker | SuperBlockLayoutMarker | SuperBlockCloseMarker
        | LinkRefDef => render_nothing,
        EmAsteriskOpenMarker | EmAsteriskCloseMarker | EmUnderscoreOpenMarker
        | EmUnderscoreCloseMarker | StrongAsteriskOpenMarker | StrongAsteriskCloseMarker
        | StrongUnderscoreOpenMarker | StrongUnderscoreCloseMarker | Strikethrough1OpenMarker
        | Strikethrough1CloseMarker | Strikethrough2OpenMarker | Strikethrough2CloseMarker
        | Mark1OpenMarker | Mark1CloseMarker | Mark2OpenMarker | Mark2CloseMarker
        | SupOpenMarker | SupCloseMarker | SubOpenMarker | SubCloseMarker => render_nothing,
        Text => render_text,
        LinkText => render_link_text,
        BackslashContent => render_escaped,
        ThematicBreak => render_thematic_break,
        Blockquote => render_blockquote,
        List => render_list,
        ListItem => render_list_item,
        TaskListItemMarker => render_task_list_item_marker,
        HtmlBlock => render_html_block,
        InlineHtml => render_inline_html,
        CodeBlock => render_code_block,
        Emphasis | Strong | Strikethrough | Mark | Sup | Sub => render_delimited,
        CodeSpan => render_code_span,
        CodeSpanContent => render_escaped,
        HardBreak => render_hard_break,
        SoftBreak => render_soft_break,
        Link => render_link,
        HtmlEntity => render_html_entity,
        Table => render_table,
        TableHead => render_table_head,
        TableRow => |r, _, _, e| open_close(r, e, "tr"),
        TableCell => render_table_cell,
        MathBlock => render_math_block,
        InlineMath => render_inline_math,
        InlineMathContent => render_nothing,
        Backslash => render_backslash,
        FootnotesDefBlock => render_footnotes_def_block,
        FootnotesDef => render_footnotes_def,
        FootnotesRef => render_footnotes_ref,
        Toc => render_toc,
        YamlFrontMatter => render_yaml_front_matter,
        LinkRefDefBlock => render_link_ref_def_block,
        SuperBlock => render_super_block,
    };
    Some(h)
}

// ---------------------------------------------------------------------------
// Generic handlers
// ---------------------------------------------------------------------------

fn render_container(_: &mut WysiwygRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::Continue
}

fn render_nothing(_: &mut WysiwygRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::SkipChildren
}

fn render_escaped(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write(&escape_html(&tree[id].tokens));
    }
    WalkStatus::SkipChildren
}

fn open_close(r: &mut WysiwygRenderer, entering: bool, tag: &str) -> WalkStatus {
    if entering {
        r.tag(tag, &[], false);
    } else {
        r.tag(&format!("/{tag}"), &[], false);
    }
    WalkStatus::Continue
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

fn render_paragraph(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let in_tight_list = tree[id]
        .parent()
        .and_then(|item| tree[item].parent())
        .is_some_and(|list| tree[list].kind == NodeKind::List && tree[list].is_tight());
    if in_tight_list {
        return WalkStatus::Continue;
    }
    if entering {
        r.tag("p", &[("data-block", "0")], false);
    } else {
        r.tag("/p", &[], false);
    }
    WalkStatus::Continue
}

fn render_heading(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let node = &tree[id];
    let tag = heading_tag(node.heading_level);
    if !entering {
        r.tag(&format!("/{tag}"), &[], false);
        return WalkStatus::Continue;
    }
    let custom_id = child_tokens(tree, id, NodeKind::HeadingId);
    let anchor = format!("wysiwyg-{}", heading_anchor(tree, id));
    let marker = match (node.heading_setext, node.heading_level) {
        (false, _) => "#",
        (true, 1) => "=",
        (true, _) => "-",
    };
    let mut attrs = vec![("data-block", "0")];
    if r.base.options.heading_id && !custom_id.is_empty() {
        attrs.push(("data-id", custom_id));
    }
    attrs.push(("id", anchor.as_str()));
    attrs.push(("data-marker", marker));
    r.tag(&tag, &attrs, false);
    WalkStatus::Continue
}

fn render_thematic_break(r: &mut WysiwygRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("hr", &[("data-block", "0")], true);
    }
    WalkStatus::SkipChildren
}

fn render_blockquote(r: &mut WysiwygRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("blockquote", &[("data-block", "0")], false);
    } else {
        r.tag("/blockquote", &[], false);
    }
    WalkStatus::Continue
}

fn render_list(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let data = tree[id].list.clone().unwrap_or_default();
    let tag = if data.is_numbered() { "ol" } else { "ul" };
    if !entering {
        r.tag(&format!("/{tag}"), &[], false);
        return WalkStatus::Continue;
    }
    let start = data.start.to_string();
    let marker = if data.is_numbered() {
        format!("{}{}", data.start, data.delimiter as char)
    } else {
        data.marker.clone()
    };
    let mut attrs = vec![("data-tight", if data.tight { "true" } else { "false" })];
    if data.is_numbered() && data.start != 1 {
        attrs.push(("start", start.as_str()));
    }
    attrs.push(("data-marker", marker.as_str()));
    attrs.push(("data-block", "0"));
    r.tag(tag, &attrs, false);
    WalkStatus::Continue
}

fn render_list_item(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.tag("/li", &[], false);
        return WalkStatus::Continue;
    }
    let data = tree[id].list.clone().unwrap_or_default();
    let marker = data.item_marker();
    let class = r.base.options.task_list_item_class.clone();
    let mut attrs = vec![("data-marker", marker.as_str())];
    let is_task = data.list_type == ListType::Task
        && tree[id]
            .first_child()
            .and_then(|p| tree[p].first_child())
            .is_some_and(|m| tree[m].kind == NodeKind::TaskListItemMarker);
    if is_task && !class.is_empty() {
        attrs.push(("class", class.as_str()));
    }
    r.tag("li", &attrs, false);
    if !tree[id].has_children() {
        r.write(ZWSP);
    }
    WalkStatus::Continue
}

fn render_task_list_item_marker(
    r: &mut WysiwygRenderer,
    tree: &Tree,
    id: NodeId,
    entering: bool,
) -> WalkStatus {
    if entering {
        let mut attrs = Vec::new();
        if tree[id].task_checked {
            attrs.push(("checked", ""));
        }
        attrs.push(("type", "checkbox"));
        r.tag("input", &attrs, true);
    }
    WalkStatus::SkipChildren
}

/// Editable `pre > code` of a code-like block, plus its preview.
fn write_editable_block(
    r: &mut WysiwygRenderer,
    data_type: &str,
    code_attrs: &[(&str, &str)],
    code: &str,
    preview: Option<&str>,
) {
    r.write("<pre class=\"vditor-wysiwyg__pre\"");
    if preview.is_some() && !code.contains(CARET) {
        r.write(" style=\"display: none\"");
    }
    r.write(">");
    r.tag("code", code_attrs, false);
    if strip_caret(code).is_empty() {
        r.write(FRONT_END_CARET);
        r.write("\n");
    } else {
        r.write(&escape_html(code));
        if !code.ends_with('\n') {
            r.write("\n");
        }
    }
    r.write("</code></pre>");
    if let Some(preview) = preview {
        r.write("<pre class=\"vditor-wysiwyg__preview\" data-render=\"2\">");
        match data_type {
            "math-block" => {
                r.write("<div data-type=\"math-block\" class=\"language-math\">");
                r.write(&escape_html(&strip_caret(preview)));
                r.write("</div>");
            }
            "html-block" => r.write(&strip_caret(preview)),
            _ => {
                r.tag("code", code_attrs, false);
                r.write(&escape_html(&strip_caret(preview)));
                r.write("</code>");
            }
        }
        r.write("</pre>");
    }
}

fn open_block_div(r: &mut WysiwygRenderer, data_type: &str, marker: Option<&str>) {
    let mut attrs = vec![
        ("class", "vditor-wysiwyg__block"),
        ("data-type", data_type),
        ("data-block", "0"),
    ];
    if let Some(marker) = marker {
        attrs.push(("data-marker", marker));
    }
    r.tag("div", &attrs, false);
}

fn render_code_block(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let node = &tree[id];
    let (marker, info, code) = if node.fenced {
        let marker = child_tokens(tree, id, NodeKind::CodeBlockFenceOpenMarker);
        let info = tree
            .first_child_of_kind(id, NodeKind::CodeBlockFenceInfoMarker)
            .map(|m| tree[m].code_block_info.as_str())
            .unwrap_or("");
        let code = child_tokens(tree, id, NodeKind::CodeBlockCode);
        (if marker.is_empty() { "```" } else { marker }, info, code)
    } else {
        let code = node.first_child().map(|c| tree[c].tokens.as_str()).unwrap_or("");
        ("```", "", code)
    };
    let language = strip_caret(info.split_whitespace().next().unwrap_or(""));
    let class = format!("language-{language}");
    let mut code_attrs = Vec::new();
    if !language.is_empty() {
        code_attrs.push(("class", class.as_str()));
    }

    open_block_div(r, "code-block", Some(marker));
    let preview = r.base.options.code_block_preview.then_some(code);
    write_editable_block(r, "code-block", &code_attrs, code, preview);
    r.write("</div>");
    WalkStatus::SkipChildren
}

fn render_html_block(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = tree[id].tokens.trim();
        open_block_div(r, "html-block", None);
        r.write("<pre><code>");
        r.write(&escape_html(tokens));
        r.write("</code></pre>");
        r.write("<pre class=\"vditor-wysiwyg__preview\" data-render=\"2\">");
        r.write(&strip_caret(tokens));
        r.write("</pre></div>");
    }
    WalkStatus::SkipChildren
}

fn render_math_block(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let content = child_tokens(tree, id, NodeKind::MathBlockContent).trim();
        open_block_div(r, "math-block", None);
        let preview = r.base.options.math_block_preview.then_some(content);
        write_editable_block(r, "math-block", &[("data-type", "math-block")], content, preview);
        r.write("</div>");
    }
    WalkStatus::SkipChildren
}

fn render_yaml_front_matter(
    r: &mut WysiwygRenderer,
    tree: &Tree,
    id: NodeId,
    entering: bool,
) -> WalkStatus {
    if entering {
        let content = child_tokens(tree, id, NodeKind::YamlFrontMatterContent);
        open_block_div(r, "yaml-front-matter", None);
        write_editable_block(
            r,
            "yaml-front-matter",
            &[("data-type", "yaml-front-matter")],
            content,
            None,
        );
        r.write("</div>");
    }
    WalkStatus::SkipChildren
}

fn render_super_block(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let layout = child_tokens(tree, id, NodeKind::SuperBlockLayoutMarker);
        let layout = if layout.is_empty() { "row" } else { layout };
        r.tag(
            "div",
            &[("data-block", "0"), ("data-type", "super-block"), ("data-sb-layout", layout)],
            false,
        );
    } else {
        r.write("</div>");
    }
    WalkStatus::Continue
}

fn render_toc(r: &mut WysiwygRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering && r.base.options.toc {
        r.write(
            "<div class=\"vditor-toc\" data-block=\"0\" data-type=\"toc-block\" \
             contenteditable=\"false\"></div>",
        );
    }
    WalkStatus::SkipChildren
}

fn render_link_ref_def_block(
    r: &mut WysiwygRenderer,
    tree: &Tree,
    id: NodeId,
    entering: bool,
) -> WalkStatus {
    if entering {
        r.write("<div data-block=\"0\" data-type=\"link-ref-defs-block\">");
        for def in tree.children_of_kind(id, NodeKind::LinkRefDef) {
            let dest = child_tokens(tree, def, NodeKind::LinkDest);
            let line = format!("[{}]: {}\n", tree[def].link_ref_label, dest);
            r.write(&escape_html(&line));
        }
        r.write("</div>");
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Footnotes
// ---------------------------------------------------------------------------

fn render_footnotes_def_block(r: &mut WysiwygRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("<div data-block=\"0\" data-type=\"footnotes-block\">");
        r.write("<ol data-type=\"footnotes-defs-ol\">");
    } else {
        r.write("</ol></div>");
    }
    WalkStatus::Continue
}

fn render_footnotes_def(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let label = tree[id].tokens.as_str();
        r.tag("li", &[("data-type", "footnotes-li"), ("data-marker", label)], false);
    } else {
        r.write("</li>");
    }
    WalkStatus::Continue
}

fn render_footnotes_ref(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    if previous_text_is_empty(tree, id) {
        r.write(ZWSP);
    }
    let label = tree[id].tokens.as_str();
    let num = r.footnotes.get(label).copied().unwrap_or(0).to_string();
    let tooltip: String = tree
        .descendants(tree.root())
        .into_iter()
        .find(|&d| tree[d].kind == NodeKind::FootnotesDef && tree[d].tokens == label)
        .map(|def| strip_caret(&tree.text(def)).chars().take(24).collect())
        .unwrap_or_default();
    r.tag(
        "sup",
        &[
            ("data-type", "footnotes-ref"),
            ("data-footnotes-label", label),
            ("class", "vditor-tooltipped vditor-tooltipped__s"),
            ("aria-label", tooltip.as_str()),
        ],
        false,
    );
    r.write(&num);
    r.write("</sup>");
    r.write(ZWSP);
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Inlines
// ---------------------------------------------------------------------------

fn render_text(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = &tree[id].tokens;
        let mut text = if *tokens == format!("{CARET}{ZWSP}") {
            tokens.clone()
        } else {
            strip_zwsp(tokens)
        };
        if tree[id].next().is_none() {
            text.truncate(text.trim_end_matches('\n').len());
        }
        r.write(&escape_html(&text));
    }
    WalkStatus::SkipChildren
}

fn render_link_text(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let in_image = tree[id]
        .parent()
        .is_some_and(|p| tree[p].kind == NodeKind::Image);
    if in_image {
        return WalkStatus::SkipChildren;
    }
    render_escaped(r, tree, id, entering)
}

/// Tag name and `data-marker` of a delimited inline container.
fn delimited_tag(tree: &Tree, id: NodeId) -> (&'static str, &'static str) {
    let first = tree[id].first_child().map(|c| tree[c].kind);
    match (tree[id].kind, first) {
        (NodeKind::Emphasis, Some(NodeKind::EmUnderscoreOpenMarker)) => ("em", "_"),
        (NodeKind::Emphasis, _) => ("em", "*"),
        (NodeKind::Strong, Some(NodeKind::StrongUnderscoreOpenMarker)) => ("strong", "__"),
        (NodeKind::Strong, _) => ("strong", "**"),
        (NodeKind::Strikethrough, Some(NodeKind::Strikethrough1OpenMarker)) => ("s", "~"),
        (NodeKind::Strikethrough, _) => ("s", "~~"),
        (NodeKind::Mark, Some(NodeKind::Mark1OpenMarker)) => ("mark", "="),
        (NodeKind::Mark, _) => ("mark", "=="),
        (NodeKind::Sup, _) => ("sup", "^"),
        _ => ("sub", "~"),
    }
}

fn render_delimited(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let (tag, marker) = delimited_tag(tree, id);
    let padded = tag == "mark";
    if entering {
        if padded && previous_text_is_empty(tree, id) {
            r.write(ZWSP);
        }
        r.tag(tag, &[("data-marker", marker)], false);
    } else {
        r.tag(&format!("/{tag}"), &[], false);
        if padded {
            r.write(ZWSP);
        }
    }
    WalkStatus::Continue
}

fn render_code_span(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    if previous_text_is_empty(tree, id) {
        r.write(ZWSP);
    } else if r.base.writer.last_byte().is_ascii_alphanumeric() {
        r.write(" ");
    }
    let marker = "`".repeat(tree[id].code_marker_len.max(1));
    let content = child_tokens(tree, id, NodeKind::CodeSpanContent);
    r.tag("code", &[("data-marker", marker.as_str())], false);
    r.write(ZWSP);
    r.write(&escape_html(content));
    r.write("</code>");
    if !tree.parent_is(id, &[NodeKind::Link]) {
        r.write(ZWSP);
    }
    WalkStatus::SkipChildren
}

fn render_inline_html(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let tokens = &tree[id].tokens;
    if tokens == "<br />" && in_table_cell(tree, id) {
        r.write(tokens);
        return WalkStatus::SkipChildren;
    }
    r.write("<code data-type=\"html-inline\">");
    r.write(ZWSP);
    r.write(&escape_html(tokens));
    r.write("</code>");
    WalkStatus::SkipChildren
}

fn render_html_entity(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let tokens = &tree[id].tokens;
    if previous_text_is_empty(tree, id) {
        r.write(ZWSP);
    }
    r.write("<span class=\"vditor-wysiwyg__block\" data-type=\"html-entity\">");
    r.write("<code data-type=\"html-entity\" style=\"display: none\">");
    r.write(ZWSP);
    r.write(&escape_html(tokens));
    r.write("</code><span class=\"vditor-wysiwyg__preview\" data-render=\"2\"><code>");
    r.write(&strip_caret(tokens));
    r.write("</code></span></span>");
    r.write(ZWSP);
    WalkStatus::SkipChildren
}

fn render_inline_math(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let content = strip_zwsp(child_tokens(tree, id, NodeKind::InlineMathContent));
    r.write("<span class=\"vditor-wysiwyg__block\" data-type=\"math-inline\">");
    r.write("<code data-type=\"math-inline\"");
    if !content.contains(CARET) {
        r.write(" style=\"display: none\"");
    }
    r.write(">");
    r.write(ZWSP);
    r.write(&escape_html(&content));
    r.write("</code><span class=\"vditor-wysiwyg__preview\" data-render=\"2\">");
    r.write("<span class=\"language-math\">");
    r.write(&escape_html(&strip_caret(&content)));
    r.write("</span></span></span>");
    r.write(ZWSP);
    WalkStatus::SkipChildren
}

fn render_backslash(r: &mut WysiwygRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("<span data-type=\"backslash\"><span>\\</span>");
    } else {
        r.write("</span>");
    }
    WalkStatus::Continue
}

fn render_hard_break(r: &mut WysiwygRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("br", &[], true);
    }
    WalkStatus::SkipChildren
}

fn render_soft_break(r: &mut WysiwygRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("\n");
    }
    WalkStatus::SkipChildren
}

fn render_link(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let node = &tree[id];
    if node.link_type == LinkType::Reference {
        if entering {
            let label = node.link_ref_label.as_str();
            r.tag("span", &[("data-type", "link-ref"), ("data-link-label", label)], false);
        } else {
            r.write("</span>");
            r.write(ZWSP);
        }
        return WalkStatus::Continue;
    }
    if entering {
        let dest = child_tokens(tree, id, NodeKind::LinkDest);
        let title = child_tokens(tree, id, NodeKind::LinkTitle);
        let mut attrs = vec![("href", dest)];
        if !title.is_empty() {
            attrs.push(("title", title));
        }
        r.tag("a", &attrs, false);
    } else {
        r.write("</a>");
    }
    WalkStatus::Continue
}

fn render_image_tag(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId) {
    let dest = strip_caret(child_tokens(tree, id, NodeKind::LinkDest));
    let alt = strip_caret(child_tokens(tree, id, NodeKind::LinkText));
    let title = child_tokens(tree, id, NodeKind::LinkTitle);
    let mut attrs = vec![("src", dest.as_str()), ("alt", alt.as_str())];
    if !title.is_empty() {
        attrs.push(("title", title));
    }
    r.tag("img", &attrs, true);
}

fn render_emoji_unicode(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId) {
    let alias = child_tokens(tree, id, NodeKind::EmojiAlias);
    r.tag("span", &[("data-type", "emoji"), ("data-alias", alias)], false);
    r.write(&tree[id].tokens);
    r.write("</span>");
}

/// Images and emoji render as one element, so the containers write on
/// entry and skip their marker children.
fn render_leaf_container(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        match tree[id].kind {
            NodeKind::Image => render_image_tag(r, tree, id),
            NodeKind::EmojiUnicode => render_emoji_unicode(r, tree, id),
            NodeKind::EmojiImg => r.write(&tree[id].tokens),
            _ => return WalkStatus::Continue,
        }
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn render_table(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("table", &[("data-block", "0")], false);
    } else {
        let has_body = tree[id]
            .first_child()
            .is_some_and(|head| tree[head].next().is_some());
        if has_body {
            r.write("</tbody>");
        }
        r.write("</table>");
    }
    WalkStatus::Continue
}

fn render_table_head(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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

fn render_table_cell(r: &mut WysiwygRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Align, ListData, Node};
    use pretty_assertions::assert_eq;

    fn wysiwyg(tree: &Tree) -> String {
        WysiwygRenderer::default().render(tree).unwrap()
    }

    #[test]
    fn test_paragraph_with_emphasis() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("a "));
        let em = tree.append_new(p, Node::new(NodeKind::Emphasis));
        tree.append_new(em, Node::new(NodeKind::EmUnderscoreOpenMarker));
        tree.append_new(em, Node::text("b"));
        tree.append_new(em, Node::new(NodeKind::EmUnderscoreCloseMarker));
        assert_eq!(
            wysiwyg(&tree),
            "<p data-block=\"0\">a <em data-marker=\"_\">b</em></p>"
        );
    }

    #[test]
    fn test_tight_list_items_carry_markers() {
        let mut tree = Tree::new();
        let root = tree.root();
        let data = ListData::from_marker("-");
        let l = tree.append_new(root, Node::list(NodeKind::List, data.clone()));
        let li = tree.append_new(l, Node::list(NodeKind::ListItem, data));
        let p = tree.append_new(li, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("a"));
        assert_eq!(
            wysiwyg(&tree),
            "<ul data-tight=\"true\" data-marker=\"-\" data-block=\"0\"><li data-marker=\"-\">a</li></ul>"
        );
    }

    #[test]
    fn test_code_block_has_hidden_source_and_preview() {
        let mut tree = Tree::new();
        let root = tree.root();
        let cb = tree.append_new(root, Node::code_block());
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockFenceOpenMarker, "~~~"));
        let mut info = Node::new(NodeKind::CodeBlockFenceInfoMarker);
        info.code_block_info = "go".to_string();
        tree.append_new(cb, info);
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockCode, "a < b"));
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockFenceCloseMarker, "~~~"));
        let out = wysiwyg(&tree);
        assert!(out.starts_with(
            "<div class=\"vditor-wysiwyg__block\" data-type=\"code-block\" data-block=\"0\" data-marker=\"~~~\">\
             <pre class=\"vditor-wysiwyg__pre\" style=\"display: none\"><code class=\"language-go\">a &lt; b\n</code></pre>"
        ));
        assert!(out.contains("data-render=\"2\""));
    }

    #[test]
    fn test_empty_cell_gets_placeholder() {
        let mut tree = Tree::new();
        let root = tree.root();
        let table = tree.append_new(root, Node::new(NodeKind::Table));
        let head = tree.append_new(table, Node::new(NodeKind::TableHead));
        let row = tree.append_new(head, Node::new(NodeKind::TableRow));
        tree.append_new(row, Node::table_cell(Align::Center));
        assert_eq!(
            wysiwyg(&tree),
            "<table data-block=\"0\"><thead><tr><th align=\"center\"> </th></tr></thead></table>"
        );
    }

    #[test]
    fn test_footnote_ref_is_numbered() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("x"));
        tree.append_new(p, Node::with_tokens(NodeKind::FootnotesRef, "^n"));
        let block = tree.append_new(root, Node::new(NodeKind::FootnotesDefBlock));
        let def = tree.append_new(block, Node::with_tokens(NodeKind::FootnotesDef, "^n"));
        let dp = tree.append_new(def, Node::new(NodeKind::Paragraph));
        tree.append_new(dp, Node::text("note"));
        let out = wysiwyg(&tree);
        assert!(out.contains(
            "<sup data-type=\"footnotes-ref\" data-footnotes-label=\"^n\" \
             class=\"vditor-tooltipped vditor-tooltipped__s\" aria-label=\"note\">1</sup>"
        ));
        assert!(out.contains("<li data-type=\"footnotes-li\" data-marker=\"^n\"><p data-block=\"0\">note</p></li>"));
    }
}
