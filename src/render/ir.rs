// Tree → instant-rendering (IR) editor DOM.
//
// IR keeps the Markdown source visible: every inline node is a `span`
// holding its delimiters as marker spans around the rendered content, so the
// text content of the span is the node's Markdown. Code-like blocks expose
// their fences as typed marker spans around an editable `pre > code`.
// Previews carry `data-render="2"` and are never read back.

use std::collections::HashMap;

use super::{
    build_table, child_tokens, heading_anchor, heading_tag, previous_text_is_empty, BaseRenderer, Handler, HandlerTable,
    RenderOptions, Renderer,
};
use crate::ast::{LinkType, ListType, NodeId, NodeKind, Tree, WalkStatus};
use crate::sentinel::{escape_html, strip_caret, strip_zwsp, CARET, FRONT_END_CARET, ZWSP};

/// IR DOM renderer.
#[derive(Debug)]
pub struct IrRenderer {
    base: BaseRenderer,
    table: HandlerTable<IrRenderer>,
    /// Footnote label → 1-based definition number.
    footnotes: HashMap<String, usize>,
}

impl Default for IrRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl IrRenderer {
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

    /// `<span class="vditor-ir__marker…">text</span>`.
    fn marker(&mut self, class: &str, text: &str) {
        self.tag("span", &[("class", class)], false);
        self.write(&escape_html(text));
        self.write("</span>");
    }
}

impl Renderer for IrRenderer {
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

const MARKER: &str = "vditor-ir__marker";
const MARKER_BI: &str = "vditor-ir__marker vditor-ir__marker--bi";
const MARKER_BRACKET: &str = "vditor-ir__marker vditor-ir__marker--bracket";
const MARKER_PAREN: &str = "vditor-ir__marker vditor-ir__marker--paren";
const MARKER_LINK: &str = "vditor-ir__marker vditor-ir__marker--link";

fn handler(kind: NodeKind) -> Option<Handler<IrRenderer>> {
    use NodeKind::*;
    let h: Handler<IrRenderer> = match kind {
        Document => render_container,
        Paragraph => render_paragraph,
        Heading => render_heading,
        HeadingMarker | BlockquoteMarker | CodeBlockFenceOpenMarker | CodeBlockFenceInfoMarker
        | CodeBlockFenceCloseMarker | CodeBlockCode | KramdownBlockIal | KramdownSpanIal
        | MathBlockOpenMarker | MathBlockContent | MathBlockCloseMarker
        | YamlFrontMatterOpenMarker | YamlFrontMatterContent | YamlFrontMatterCloseMarker
        | SuperBlockOpenMarker | SuperBlockLayoutMarker | SuperBlockCloseMarker | LinkRefDef
        | EmojiAlias => render_nothing,
        HeadingId => render_heading_id,
        Text => render_text,
        LinkText => render_link_text,
        BackslashContent | CodeSpanContent => render_escaped,
        ThematicBreak => render_thematic_break,
        Blockquote => render_blockquote,
        List => render_list,
        ListItem => render_list_item,
        TaskListItemMarker => render_task_list_item_marker,
        HtmlBlock => render_html_block,
        InlineHtml => render_inline_html,
        CodeBlock => render_code_block,
        Emphasis | Strong | Strikethrough | Mark | Sup | Sub | CodeSpan | Link | Backslash
        | InlineMath | Emoji => render_span_node,
        EmAsteriskOpenMarker => |r, _, _, e| open_marker(r, e, MARKER_BI, "*", "em"),
        EmAsteriskCloseMarker => |r, _, _, e| close_marker(r, e, MARKER_BI, "*", "em"),
        EmUnderscoreOpenMarker => |r, _, _, e| open_marker(r, e, MARKER_BI, "_", "em"),
        EmUnderscoreCloseMarker => |r, _, _, e| close_marker(r, e, MARKER_BI, "_", "em"),
        StrongAsteriskOpenMarker => |r, _, _, e| open_marker(r, e, MARKER_BI, "**", "strong"),
        StrongAsteriskCloseMarker => |r, _, _, e| close_marker(r, e, MARKER_BI, "**", "strong"),
        StrongUnderscoreOpenMarker => |r, _, _, e| open_marker(r, e, MARKER_BI, "__", "strong"),
        StrongUnderscoreCloseMarker => |r, _, _, e| close_marker(r, e, MARKER_BI, "__", "strong"),
        Strikethrough1OpenMarker => |r, _, _, e| open_marker(r, e, MARKER, "~", "s"),
        Strikethrough1CloseMarker => |r, _, _, e| close_marker(r, e, MARKER, "~", "s"),
        Strikethrough2OpenMarker => |r, _, _, e| open_marker(r, e, MARKER, "~~", "s"),
        Strikethrough2CloseMarker => |r, _, _, e| close_marker(r, e, MARKER, "~~", "s"),
        Mark1OpenMarker => |r, _, _, e| open_marker(r, e, MARKER, "=", "mark"),
        Mark1CloseMarker => |r, _, _, e| close_marker(r, e, MARKER, "=", "mark"),
        Mark2OpenMarker => |r, _, _, e| open_marker(r, e, MARKER, "==", "mark"),
        Mark2CloseMarker => |r, _, _, e| close_marker(r, e, MARKER, "==", "mark"),
        SupOpenMarker => |r, _, _, e| open_marker(r, e, MARKER, "^", "sup"),
        SupCloseMarker => |r, _, _, e| close_marker(r, e, MARKER, "^", "sup"),
        SubOpenMarker => |r, _, _, e| open_marker(r, e, MARKER, "~", "sub"),
        SubCloseMarker => |r, _, _, e| close_marker(r, e, MARKER, "~", "sub"),
        CodeSpanOpenMarker => render_code_span_open,
        CodeSpanCloseMarker => render_code_span_close,
        InlineMathOpenMarker => render_inline_math_open,
        InlineMathContent => render_inline_math_content,
        InlineMathCloseMarker => |r, _, _, e| plain_marker(r, e, MARKER, "$"),
        HardBreak => render_hard_break,
        SoftBreak => render_soft_break,
        Image => render_image,
        Bang => |r, _, _, e| plain_marker(r, e, MARKER, "!"),
        OpenBracket => |r, _, _, e| plain_marker(r, e, MARKER_BRACKET, "["),
        CloseBracket => render_close_bracket,
        OpenParen => render_open_paren,
        CloseParen => render_close_paren,
        LinkDest => render_link_dest,
        LinkSpace => render_link_space,
        LinkTitle => render_link_title,
        HtmlEntity => render_html_entity,
        EmojiUnicode | EmojiImg => render_emoji_glyph,
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
        LinkRefDefBlock => render_link_ref_def_block,
        SuperBlock => render_super_block,
    };
    Some(h)
}

// ---------------------------------------------------------------------------
// Generic handlers
// ---------------------------------------------------------------------------

fn render_container(_: &mut IrRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::Continue
}

fn render_nothing(_: &mut IrRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::SkipChildren
}

fn render_escaped(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write(&escape_html(&tree[id].tokens));
    }
    WalkStatus::SkipChildren
}

fn plain_marker(r: &mut IrRenderer, entering: bool, class: &str, text: &str) -> WalkStatus {
    if entering {
        r.marker(class, text);
    }
    WalkStatus::SkipChildren
}

/// Marker span followed by the element holding the rendered content.
fn open_marker(r: &mut IrRenderer, entering: bool, class: &str, text: &str, tag: &str) -> WalkStatus {
    if entering {
        r.marker(class, text);
        r.tag(tag, &[("data-newline", "1")], false);
    }
    WalkStatus::SkipChildren
}

fn close_marker(r: &mut IrRenderer, entering: bool, class: &str, text: &str, tag: &str) -> WalkStatus {
    if entering {
        r.tag(&format!("/{tag}"), &[], false);
        r.marker(class, text);
    }
    WalkStatus::SkipChildren
}

/// Whether the caret sits in or right next to the node, which expands it.
fn is_expanded(tree: &Tree, id: NodeId) -> bool {
    if tree.text(id).contains(CARET) {
        return true;
    }
    let before = tree[id].prev().is_some_and(|p| tree.text(p).ends_with(CARET));
    let after = tree[id].next().is_some_and(|n| tree.text(n).starts_with(CARET));
    before || after
}

fn node_class(tree: &Tree, id: NodeId) -> &'static str {
    if is_expanded(tree, id) {
        "vditor-ir__node vditor-ir__node--expand"
    } else {
        "vditor-ir__node"
    }
}

/// Wrapper span of an inline node; its `data-type` tells the transducer to
/// read the span back as Markdown text.
fn render_span_node(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.write("</span>");
        return WalkStatus::Continue;
    }
    let data_type = match tree[id].kind {
        NodeKind::Emphasis => "em",
        NodeKind::Strong => "strong",
        NodeKind::Strikethrough => "s",
        NodeKind::Mark => "mark",
        NodeKind::Sup => "sup",
        NodeKind::Sub => "sub",
        NodeKind::Link if tree[id].link_type == LinkType::Reference => "link-ref",
        NodeKind::Link => "a",
        NodeKind::CodeSpan => "code",
        NodeKind::Emoji => "emoji",
        NodeKind::Backslash => "backslash",
        NodeKind::InlineMath => "inline-math",
        _ => "inline-node",
    };
    if tree[id].kind == NodeKind::Emoji && previous_text_is_empty(tree, id) {
        r.write(ZWSP);
    }
    r.tag("span", &[("data-type", data_type), ("class", node_class(tree, id))], false);
    if tree[id].kind == NodeKind::Backslash {
        r.marker(MARKER_BI, "\\");
    }
    WalkStatus::Continue
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

fn render_paragraph(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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
        r.write("</p>");
    }
    WalkStatus::Continue
}

fn render_heading(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let node = &tree[id];
    let tag = heading_tag(node.heading_level);
    if entering {
        let anchor = format!("ir-{}", heading_anchor(tree, id));
        let marker = match (node.heading_setext, node.heading_level) {
            (false, _) => "#",
            (true, 1) => "=",
            (true, _) => "-",
        };
        let attrs = [
            ("data-block", "0"),
            ("class", node_class(tree, id)),
            ("id", anchor.as_str()),
            ("data-marker", marker),
        ];
        r.tag(&tag, &attrs, false);
        if !node.heading_setext {
            let hashes = format!("{} ", "#".repeat(node.heading_level as usize));
            r.tag(
                "span",
                &[
                    ("class", "vditor-ir__marker vditor-ir__marker--heading"),
                    ("data-type", "heading-marker"),
                ],
                false,
            );
            r.write(&hashes);
            r.write("</span>");
        }
        return WalkStatus::Continue;
    }
    if node.heading_setext {
        let len = strip_caret(&tree.text(id)).chars().count().max(3);
        let underline = if node.heading_level == 1 { "=" } else { "-" };
        r.tag(
            "span",
            &[
                ("class", "vditor-ir__marker vditor-ir__marker--heading"),
                ("data-type", "heading-marker"),
                ("data-render", "2"),
            ],
            false,
        );
        r.write("\n");
        r.write(&underline.repeat(len));
        r.write("</span>");
    }
    r.tag(&format!("/{tag}"), &[], false);
    WalkStatus::Continue
}

fn render_heading_id(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("span", &[("data-type", "heading-id"), ("class", MARKER)], false);
        r.write(&escape_html(&format!(" {{{}}}", tree[id].tokens)));
        r.write("</span>");
    }
    WalkStatus::SkipChildren
}

fn render_thematic_break(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("hr", &[("data-block", "0")], true);
    }
    WalkStatus::SkipChildren
}

fn render_blockquote(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    r.write(if entering { "<blockquote data-block=\"0\">" } else { "</blockquote>" });
    WalkStatus::Continue
}

fn render_list(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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

fn render_list_item(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        r.write("</li>");
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
    WalkStatus::Continue
}

fn render_task_list_item_marker(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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

fn open_block_div(r: &mut IrRenderer, tree: &Tree, id: NodeId, data_type: &str) {
    let class = if tree.text(id).contains(CARET) {
        "vditor-ir__node vditor-ir__node--expand"
    } else {
        "vditor-ir__node"
    };
    r.tag("div", &[("data-block", "0"), ("data-type", data_type), ("class", class)], false);
}

fn typed_marker(r: &mut IrRenderer, data_type: &str, text: &str) {
    r.tag("span", &[("data-type", data_type)], false);
    r.write(&escape_html(text));
    r.write("</span>");
}

/// Editable source of a code-like block.
fn write_source(r: &mut IrRenderer, code_attrs: &[(&str, &str)], code: &str, preview: bool) {
    let class = if preview {
        "vditor-ir__marker--pre vditor-ir__marker"
    } else {
        "vditor-ir__marker--pre"
    };
    r.tag("pre", &[("class", class)], false);
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
}

fn render_code_block(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let node = &tree[id];
    let (open, info, code, close) = if node.fenced {
        let open = child_tokens(tree, id, NodeKind::CodeBlockFenceOpenMarker);
        let info = tree
            .first_child_of_kind(id, NodeKind::CodeBlockFenceInfoMarker)
            .map(|m| tree[m].code_block_info.as_str())
            .unwrap_or("");
        let close = child_tokens(tree, id, NodeKind::CodeBlockFenceCloseMarker);
        let code = child_tokens(tree, id, NodeKind::CodeBlockCode);
        (open, info, code, close)
    } else {
        let code = node.first_child().map(|c| tree[c].tokens.as_str()).unwrap_or("");
        ("```", "", code, "```")
    };
    let open = if open.is_empty() { "```" } else { open };
    let close = if close.is_empty() { open } else { close };
    let language = strip_caret(info.split_whitespace().next().unwrap_or(""));
    let class = format!("language-{language}");
    let mut code_attrs = Vec::new();
    if !language.is_empty() {
        code_attrs.push(("class", class.as_str()));
    }
    let preview = r.base.options.code_block_preview;

    open_block_div(r, tree, id, "code-block");
    typed_marker(r, "code-block-open-marker", open);
    r.tag(
        "span",
        &[("class", "vditor-ir__marker vditor-ir__marker--info"), ("data-type", "code-block-info")],
        false,
    );
    r.write(ZWSP);
    r.write(&escape_html(info));
    r.write("</span>");
    write_source(r, &code_attrs, code, preview);
    if preview {
        r.tag("pre", &[("class", "vditor-ir__preview"), ("data-render", "2")], false);
        r.tag("code", &code_attrs, false);
        r.write(&escape_html(&strip_caret(code)));
        r.write("</code></pre>");
    }
    typed_marker(r, "code-block-close-marker", close);
    r.write("</div>");
    WalkStatus::SkipChildren
}

fn render_math_block(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let content = child_tokens(tree, id, NodeKind::MathBlockContent).trim();
    let preview = r.base.options.math_block_preview;
    open_block_div(r, tree, id, "math-block");
    typed_marker(r, "math-block-open-marker", "$$");
    write_source(
        r,
        &[("data-type", "math-block"), ("class", "language-math")],
        content,
        preview,
    );
    if preview {
        r.write("<pre class=\"vditor-ir__preview\" data-render=\"2\">");
        r.write("<div data-type=\"math-block\" class=\"language-math\">");
        r.write(&escape_html(&strip_caret(content)));
        r.write("</div></pre>");
    }
    typed_marker(r, "math-block-close-marker", "$$");
    r.write("</div>");
    WalkStatus::SkipChildren
}

fn render_yaml_front_matter(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let content = child_tokens(tree, id, NodeKind::YamlFrontMatterContent);
    open_block_div(r, tree, id, "yaml-front-matter");
    typed_marker(r, "yaml-front-matter-open-marker", "---");
    write_source(r, &[("data-type", "yaml-front-matter")], content, false);
    typed_marker(r, "yaml-front-matter-close-marker", "---");
    r.write("</div>");
    WalkStatus::SkipChildren
}

fn render_html_block(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = tree[id].tokens.trim();
        open_block_div(r, tree, id, "html-block");
        r.write("<pre class=\"vditor-ir__marker--pre vditor-ir__marker\">");
        r.write("<code data-type=\"html-block\">");
        r.write(&escape_html(tokens));
        r.write("</code></pre>");
        r.write("<pre class=\"vditor-ir__preview\" data-render=\"2\">");
        r.write(&strip_caret(tokens));
        r.write("</pre></div>");
    }
    WalkStatus::SkipChildren
}

fn render_super_block(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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

fn render_toc(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering && r.base.options.toc {
        r.write(
            "<div class=\"vditor-toc\" data-block=\"0\" data-type=\"toc-block\" \
             contenteditable=\"false\"></div>",
        );
    }
    WalkStatus::SkipChildren
}

fn render_link_ref_def_block(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("<div data-block=\"0\" data-type=\"link-ref-defs-block\">");
        for def in tree.children_of_kind(id, NodeKind::LinkRefDef) {
            let dest = child_tokens(tree, def, NodeKind::LinkDest);
            let sep = if dest == CARET { "" } else { " " };
            let line = format!("[{}]:{sep}{dest}\n", tree[def].link_ref_label);
            r.write(&escape_html(&line));
        }
        r.write("</div>");
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Footnotes
// ---------------------------------------------------------------------------

fn render_footnotes_def_block(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    r.write(if entering {
        "<div data-block=\"0\" data-type=\"footnotes-block\">"
    } else {
        "</div>"
    });
    WalkStatus::Continue
}

fn render_footnotes_def(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let label = tree[id].tokens.as_str();
        r.tag("div", &[("data-type", "footnotes-def"), ("data-footnotes-label", label)], false);
        r.marker(MARKER, &format!("[{label}]: "));
    } else {
        r.write("</div>");
    }
    WalkStatus::Continue
}

fn render_footnotes_ref(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    if previous_text_is_empty(tree, id) {
        r.write(ZWSP);
    }
    let label = tree[id].tokens.as_str();
    let num = r.footnotes.get(label).copied().unwrap_or(0).to_string();
    let class = if tree[id].tokens.contains(CARET) {
        "vditor-ir__node vditor-ir__node--expand vditor-tooltipped vditor-tooltipped__s"
    } else {
        "vditor-ir__node vditor-tooltipped vditor-tooltipped__s"
    };
    r.tag(
        "sup",
        &[("data-type", "footnotes-ref"), ("class", class), ("data-footnotes-label", label)],
        false,
    );
    r.marker(MARKER_BRACKET, "[");
    r.marker(MARKER_LINK, label);
    r.tag("span", &[("class", "vditor-ir__marker--hide"), ("data-render", "1")], false);
    r.write(&num);
    r.write("</span>");
    r.marker(MARKER_BRACKET, "]");
    r.write("</sup>");
    r.write(ZWSP);
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Inlines
// ---------------------------------------------------------------------------

fn render_text(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = &tree[id].tokens;
        let text = if *tokens == format!("{CARET}{ZWSP}") {
            tokens.clone()
        } else {
            strip_zwsp(tokens)
        };
        r.write(&escape_html(&text));
    }
    WalkStatus::SkipChildren
}

fn render_link_text(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let parent = tree[id].parent();
    let in_image = parent.is_some_and(|p| tree[p].kind == NodeKind::Image);
    let reference = parent.is_some_and(|p| tree[p].link_type == LinkType::Reference);
    match (in_image, reference) {
        (true, _) => r.tag("span", &[("class", MARKER_BRACKET)], false),
        (false, true) => r.write("<span>"),
        (false, false) => r.tag("span", &[("class", "vditor-ir__link")], false),
    }
    r.write(&escape_html(&tree[id].tokens));
    r.write("</span>");
    WalkStatus::SkipChildren
}

/// Whether the node belongs to a reference link, which has no destination
/// part of its own.
fn in_reference_link(tree: &Tree, id: NodeId) -> bool {
    tree[id]
        .parent()
        .is_some_and(|p| tree[p].kind == NodeKind::Link && tree[p].link_type == LinkType::Reference)
}

fn render_close_bracket(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    r.marker(MARKER_BRACKET, "]");
    if let Some(link) = tree[id]
        .parent()
        .filter(|&p| tree[p].link_type == LinkType::Reference)
    {
        let label = tree[link].link_ref_label.as_str();
        if child_tokens(tree, link, NodeKind::LinkText) != label {
            r.marker(MARKER_LINK, &format!("[{label}]"));
        }
    }
    WalkStatus::SkipChildren
}

fn render_open_paren(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering && !in_reference_link(tree, id) {
        r.marker(MARKER_PAREN, "(");
    }
    WalkStatus::SkipChildren
}

fn render_close_paren(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering && !in_reference_link(tree, id) {
        r.marker(MARKER_PAREN, ")");
    }
    WalkStatus::SkipChildren
}

fn render_link_dest(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering && !in_reference_link(tree, id) {
        let dest = tree[id].tokens.as_str();
        let dest = if r.base.options.sanitize && super::is_unsafe_dest(dest) { "" } else { dest };
        r.marker(MARKER_LINK, dest);
    }
    WalkStatus::SkipChildren
}

fn render_link_space(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering && !in_reference_link(tree, id) {
        r.write(" ");
    }
    WalkStatus::SkipChildren
}

fn render_link_title(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering && !in_reference_link(tree, id) {
        let title = format!("\"{}\"", tree[id].tokens);
        r.marker("vditor-ir__marker vditor-ir__marker--title", &title);
    }
    WalkStatus::SkipChildren
}

fn render_image(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("span", &[("class", node_class(tree, id)), ("data-type", "img")], false);
        return WalkStatus::Continue;
    }
    let dest = strip_caret(child_tokens(tree, id, NodeKind::LinkDest));
    let alt = strip_caret(child_tokens(tree, id, NodeKind::LinkText));
    let mut attrs = vec![("src", dest.as_str())];
    if !alt.is_empty() {
        attrs.push(("alt", alt.as_str()));
    }
    r.tag("img", &attrs, true);
    r.write("</span>");
    WalkStatus::Continue
}

fn render_code_span_open(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let len = tree[id].parent().map_or(1, |p| tree[p].code_marker_len.max(1));
        let content = tree[id].next().map(|n| tree[n].tokens.as_str()).unwrap_or("");
        let mut marker = "`".repeat(len);
        if len > 1 && content.starts_with('`') {
            marker.push(' ');
        }
        r.marker(MARKER, &marker);
        r.tag("code", &[("data-newline", "1")], false);
    }
    WalkStatus::SkipChildren
}

fn render_code_span_close(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let len = tree[id].parent().map_or(1, |p| tree[p].code_marker_len.max(1));
        let content = tree[id].prev().map(|n| tree[n].tokens.as_str()).unwrap_or("");
        let mut marker = String::new();
        if len > 1 && content.ends_with('`') {
            marker.push(' ');
        }
        marker.push_str(&"`".repeat(len));
        r.write("</code>");
        r.marker(MARKER, &marker);
    }
    WalkStatus::SkipChildren
}

fn render_inline_math_open(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.marker(MARKER, "$");
        r.tag(
            "code",
            &[
                ("data-newline", "1"),
                ("class", "vditor-ir__marker vditor-ir__marker--pre"),
                ("data-type", "math-inline"),
            ],
            false,
        );
    }
    WalkStatus::SkipChildren
}

fn render_inline_math_content(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = escape_html(&tree[id].tokens);
        r.write(&tokens);
        r.write("</code>");
        r.write("<span class=\"vditor-ir__preview\" data-render=\"2\"><span class=\"language-math\">");
        r.write(&strip_caret(&tokens));
        r.write("</span></span>");
    }
    WalkStatus::SkipChildren
}

fn render_inline_html(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("span", &[("data-type", "html-inline"), ("class", node_class(tree, id))], false);
        r.tag("code", &[("class", MARKER)], false);
        r.write(&escape_html(&tree[id].tokens));
        r.write("</code></span>");
    }
    WalkStatus::SkipChildren
}

fn render_html_entity(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = &tree[id].tokens;
        r.tag("span", &[("data-type", "html-entity"), ("class", node_class(tree, id))], false);
        r.tag(
            "code",
            &[
                ("data-newline", "1"),
                ("class", "vditor-ir__marker vditor-ir__marker--pre"),
                ("data-type", "html-entity"),
            ],
            false,
        );
        r.write(&escape_html(tokens));
        r.write("</code><span class=\"vditor-ir__preview\" data-render=\"2\"><code>");
        r.write(&strip_caret(tokens));
        r.write("</code></span></span>");
    }
    WalkStatus::SkipChildren
}

fn render_emoji_glyph(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("<span data-render=\"2\">");
        r.write(&tree[id].tokens);
        r.write("</span>");
        let alias = child_tokens(tree, id, NodeKind::EmojiAlias);
        r.marker(MARKER, alias);
    }
    WalkStatus::SkipChildren
}

fn render_hard_break(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("br", &[], true);
    }
    WalkStatus::SkipChildren
}

fn render_soft_break(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.write("\n");
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn render_table(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.tag("table", &[("data-block", "0"), ("data-type", "table")], false);
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

fn render_table_head(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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

fn render_table_row(r: &mut IrRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    r.write(if entering { "<tr>" } else { "</tr>" });
    WalkStatus::Continue
}

fn render_table_cell(r: &mut IrRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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
    use crate::ast::Node;
    use pretty_assertions::assert_eq;

    fn ir(tree: &Tree) -> String {
        IrRenderer::default().render(tree).unwrap()
    }

    #[test]
    fn test_strong_keeps_markers_visible() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        let strong = tree.append_new(p, Node::new(NodeKind::Strong));
        tree.append_new(strong, Node::new(NodeKind::StrongAsteriskOpenMarker));
        tree.append_new(strong, Node::text("b"));
        tree.append_new(strong, Node::new(NodeKind::StrongAsteriskCloseMarker));
        assert_eq!(
            ir(&tree),
            "<p data-block=\"0\"><span data-type=\"strong\" class=\"vditor-ir__node\">\
             <span class=\"vditor-ir__marker vditor-ir__marker--bi\">**</span>\
             <strong data-newline=\"1\">b</strong>\
             <span class=\"vditor-ir__marker vditor-ir__marker--bi\">**</span></span></p>"
        );
    }

    #[test]
    fn test_caret_expands_node() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        let em = tree.append_new(p, Node::new(NodeKind::Emphasis));
        tree.append_new(em, Node::new(NodeKind::EmAsteriskOpenMarker));
        tree.append_new(em, Node::text(format!("a{CARET}")));
        tree.append_new(em, Node::new(NodeKind::EmAsteriskCloseMarker));
        assert!(ir(&tree).contains("class=\"vditor-ir__node vditor-ir__node--expand\""));
    }

    #[test]
    fn test_heading_marker_span() {
        let mut tree = Tree::new();
        let root = tree.root();
        let h = tree.append_new(root, Node::heading(3));
        tree.append_new(h, Node::text("T"));
        assert_eq!(
            ir(&tree),
            "<h3 data-block=\"0\" class=\"vditor-ir__node\" id=\"ir-t\" data-marker=\"#\">\
             <span class=\"vditor-ir__marker vditor-ir__marker--heading\" data-type=\"heading-marker\">### </span>T</h3>"
        );
    }

    #[test]
    fn test_code_block_fences_are_typed_spans() {
        let mut tree = Tree::new();
        let root = tree.root();
        let cb = tree.append_new(root, Node::code_block());
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockFenceOpenMarker, "```"));
        let mut info = Node::new(NodeKind::CodeBlockFenceInfoMarker);
        info.code_block_info = "js".to_string();
        tree.append_new(cb, info);
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockCode, "x\n"));
        tree.append_new(cb, Node::with_tokens(NodeKind::CodeBlockFenceCloseMarker, "```"));
        let options = RenderOptions { code_block_preview: false, ..RenderOptions::default() };
        assert_eq!(
            IrRenderer::new(options).render(&tree).unwrap(),
            format!(
                "<div data-block=\"0\" data-type=\"code-block\" class=\"vditor-ir__node\">\
                 <span data-type=\"code-block-open-marker\">```</span>\
                 <span class=\"vditor-ir__marker vditor-ir__marker--info\" data-type=\"code-block-info\">{ZWSP}js</span>\
                 <pre class=\"vditor-ir__marker--pre\"><code class=\"language-js\">x\n</code></pre>\
                 <span data-type=\"code-block-close-marker\">```</span></div>"
            )
        );
    }
}
