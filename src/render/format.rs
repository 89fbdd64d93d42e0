// Tree → Markdown pretty-printer.
//
// Containers whose content needs rewriting once complete (the document,
// blockquotes, lists and list items) render into their own buffer. On exit
// the buffer is popped, re-prefixed or re-indented line by line, and spliced
// into the enclosing buffer, which is then trimmed so block separators stay
// canonical no matter how deeply the container was nested.

use std::collections::{HashMap, HashSet};

use super::{
    build_table, child_tokens, in_table_cell, is_last_node, BaseRenderer, Handler, HandlerTable,
    RenderOptions, Renderer,
};
use crate::ast::{walk, Align, ListType, NodeId, NodeKind, Tree, WalkStatus};
use crate::sentinel::CARET;

/// Markdown renderer.
#[derive(Debug)]
pub struct FormatRenderer {
    base: BaseRenderer,
    table: HandlerTable<FormatRenderer>,
    /// Root of the current walk; "last node" checks are relative to it.
    root: Option<NodeId>,
    /// Block IAL nodes already written inline by a list item.
    consumed: HashSet<NodeId>,
    /// Per table cell: rendered width and the width of its column.
    cell_widths: HashMap<NodeId, (usize, usize)>,
}

impl Default for FormatRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl FormatRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            base: BaseRenderer::new(options),
            table: build_table(handler),
            root: None,
            consumed: HashSet::new(),
            cell_widths: HashMap::new(),
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &RenderOptions {
        &self.base.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: RenderOptions) {
        self.base.options = options;
    }

    fn is_last(&self, tree: &Tree, id: NodeId) -> bool {
        is_last_node(tree, self.root.unwrap_or_else(|| tree.root()), id)
    }

    /// No IAL will be written after `id`.
    fn without_ial(&self, tree: &Tree, id: NodeId) -> bool {
        !self.base.options.kramdown_block_ial || tree[id].ial.is_empty()
    }

    /// Write the IAL following `id` inline and remember it was consumed.
    fn consume_next_ial(&mut self, tree: &Tree, id: NodeId) {
        if let Some(next) = tree[id].next() {
            if tree[next].kind == NodeKind::KramdownBlockIal && self.consumed.insert(next) {
                self.base.writer.write_str(&tree[next].tokens);
            }
        }
    }

    /// Pop a container buffer, splice `content` into the enclosing buffer
    /// and trim it.
    fn splice(&mut self, content: &[u8]) {
        let w = &mut self.base.writer;
        w.write_bytes(content);
        w.trim();
    }

    /// Render every cell of `table` once to size its columns.
    fn measure_table(&mut self, tree: &Tree, table: NodeId) {
        let mut rows = Vec::new();
        for child in tree.children(table) {
            match tree[child].kind {
                NodeKind::TableHead => rows.extend(tree.children_of_kind(child, NodeKind::TableRow)),
                NodeKind::TableRow => rows.push(child),
                _ => {}
            }
        }

        let mut widths: Vec<Vec<(NodeId, usize)>> = Vec::with_capacity(rows.len());
        let mut max: Vec<usize> = Vec::new();
        for row in rows {
            let mut cells = Vec::new();
            for (col, cell) in tree.children_of_kind(row, NodeKind::TableCell).into_iter().enumerate() {
                self.base.writer.push_buffer();
                for child in tree.children(cell) {
                    walk(tree, child, &mut |t: &Tree, n, entering| self.dispatch(t, n, entering));
                }
                let rendered = self.base.writer.pop_buffer();
                let width = String::from_utf8_lossy(&rendered).chars().count();
                if max.len() <= col {
                    max.resize(col + 1, 0);
                }
                max[col] = max[col].max(width);
                cells.push((cell, width));
            }
            widths.push(cells);
        }

        for cells in widths {
            for (col, (cell, width)) in cells.into_iter().enumerate() {
                self.cell_widths.insert(cell, (width, max[col]));
            }
        }
    }
}

impl Renderer for FormatRenderer {
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

    fn begin(&mut self, _tree: &Tree, root: NodeId) {
        self.root = Some(root);
        self.consumed.clear();
        self.cell_widths.clear();
    }
}

fn handler(kind: NodeKind) -> Option<Handler<FormatRenderer>> {
    use NodeKind::*;
    let h: Handler<FormatRenderer> = match kind {
        Document => render_document,
        Paragraph => render_paragraph,
        Heading => render_heading,
        HeadingMarker | BlockquoteMarker => render_nothing,
        HeadingId => render_heading_id,
        ThematicBreak => render_thematic_break,
        Blockquote => render_blockquote,
        List => render_list,
        ListItem => render_list_item,
        TaskListItemMarker => render_task_list_item_marker,
        HtmlBlock => render_html_block,
        InlineHtml | Text | LinkText | LinkDest | CodeBlockFenceOpenMarker | CodeBlockCode
        | HtmlEntity | BackslashContent | EmojiAlias | InlineMathContent => render_tokens,
        CodeBlock => render_code_block,
        CodeBlockFenceInfoMarker => render_code_block_info,
        CodeBlockFenceCloseMarker => render_code_block_close,
        Emphasis | Strong | Strikethrough | Mark | Sup | Sub | Image | Emoji | EmojiUnicode
        | EmojiImg | InlineMath | CodeSpan | FootnotesDefBlock => render_container,
        TableRow | TableHead => render_table_part,
        EmAsteriskOpenMarker | EmAsteriskCloseMarker | EmUnderscoreOpenMarker
        | EmUnderscoreCloseMarker | StrongAsteriskOpenMarker | StrongAsteriskCloseMarker
        | StrongUnderscoreOpenMarker | StrongUnderscoreCloseMarker | Strikethrough1OpenMarker
        | Strikethrough1CloseMarker | Strikethrough2OpenMarker | Strikethrough2CloseMarker
        | Mark1OpenMarker | Mark1CloseMarker | Mark2OpenMarker | Mark2CloseMarker
        | SupOpenMarker | SupCloseMarker | SubOpenMarker | SubCloseMarker | Bang
        | OpenBracket | CloseBracket | OpenParen | CloseParen | LinkSpace
        | InlineMathOpenMarker | InlineMathCloseMarker => render_marker,
        CodeSpanOpenMarker => render_code_span_open,
        CodeSpanContent => render_code_span_content,
        CodeSpanCloseMarker => render_code_span_close,
        HardBreak => render_hard_break,
        SoftBreak => render_soft_break,
        Link => render_link,
        LinkTitle => render_link_title,
        Table => render_table,
        TableCell => render_table_cell,
        MathBlock => render_math_block,
        MathBlockOpenMarker | MathBlockCloseMarker => render_math_block_marker,
        MathBlockContent | YamlFrontMatterContent => render_line,
        Backslash => render_backslash,
        FootnotesDef => render_footnotes_def,
        FootnotesRef => render_footnotes_ref,
        Toc => render_toc,
        YamlFrontMatter => render_yaml_front_matter,
        YamlFrontMatterOpenMarker | YamlFrontMatterCloseMarker => render_yaml_marker,
        KramdownBlockIal => render_block_ial,
        KramdownSpanIal => render_span_ial,
        LinkRefDefBlock => render_link_ref_def_block,
        LinkRefDef => render_link_ref_def,
        SuperBlock => render_super_block,
        SuperBlockOpenMarker | SuperBlockLayoutMarker | SuperBlockCloseMarker => render_nothing,
    };
    Some(h)
}

// ---------------------------------------------------------------------------
// Generic handlers
// ---------------------------------------------------------------------------

fn render_nothing(_: &mut FormatRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::SkipChildren
}

fn render_container(_: &mut FormatRenderer, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
    WalkStatus::Continue
}

fn render_tokens(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        if tree[id].kind == NodeKind::Text {
            task_text_spacing(r, tree, id);
        }
        r.base.writer.write_str(&tree[id].tokens);
    }
    WalkStatus::SkipChildren
}

/// Keep a space between a task checkbox and the item text.
fn task_text_spacing(r: &mut FormatRenderer, tree: &Tree, id: NodeId) {
    let node = &tree[id];
    let after_marker = node
        .prev()
        .is_some_and(|p| tree[p].kind == NodeKind::TaskListItemMarker);
    let first_in_task = node.prev().is_none()
        && node
            .parent()
            .and_then(|p| tree[p].parent())
            .and_then(|gp| tree[gp].list.as_ref())
            .is_some_and(|l| l.list_type == ListType::Task);
    if (after_marker || first_in_task)
        && !node.tokens.starts_with(' ')
        && r.base.writer.last_byte() != b' '
    {
        r.base.writer.write_byte(b' ');
    }
}

fn render_marker(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let text = match tree[id].kind {
            NodeKind::EmAsteriskOpenMarker | NodeKind::EmAsteriskCloseMarker => "*",
            NodeKind::EmUnderscoreOpenMarker | NodeKind::EmUnderscoreCloseMarker => "_",
            NodeKind::StrongAsteriskOpenMarker | NodeKind::StrongAsteriskCloseMarker => "**",
            NodeKind::StrongUnderscoreOpenMarker | NodeKind::StrongUnderscoreCloseMarker => "__",
            NodeKind::Strikethrough1OpenMarker | NodeKind::Strikethrough1CloseMarker => "~",
            NodeKind::Strikethrough2OpenMarker | NodeKind::Strikethrough2CloseMarker => "~~",
            NodeKind::Mark1OpenMarker | NodeKind::Mark1CloseMarker => "=",
            NodeKind::Mark2OpenMarker | NodeKind::Mark2CloseMarker => "==",
            NodeKind::SupOpenMarker | NodeKind::SupCloseMarker => "^",
            NodeKind::SubOpenMarker | NodeKind::SubCloseMarker => "~",
            NodeKind::InlineMathOpenMarker | NodeKind::InlineMathCloseMarker => "$",
            NodeKind::Bang => "!",
            NodeKind::OpenBracket => "[",
            NodeKind::CloseBracket => "]",
            NodeKind::OpenParen => "(",
            NodeKind::CloseParen => ")",
            NodeKind::LinkSpace => " ",
            _ => "",
        };
        r.base.writer.write_str(text);
    }
    WalkStatus::SkipChildren
}

/// Tokens followed by a newline.
fn render_line(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&tree[id].tokens);
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::SkipChildren
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

fn render_document(r: &mut FormatRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    let w = &mut r.base.writer;
    if entering {
        w.push_buffer();
    } else {
        let content = w.pop_buffer();
        let start = content
            .iter()
            .position(|b| !matches!(b, b' ' | b'\t' | b'\n'))
            .unwrap_or(content.len());
        let end = content
            .iter()
            .rposition(|b| !matches!(b, b' ' | b'\t' | b'\n'))
            .map_or(start, |i| i + 1);
        w.write_bytes(&content[start..end.max(start)]);
        w.write_byte(b'\n');
    }
    WalkStatus::Continue
}

fn render_paragraph(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let parent = tree[id].parent();
    if entering {
        if r.base.options.kramdown_block_ial {
            if let Some(item) = parent.filter(|&p| tree[p].kind == NodeKind::ListItem) {
                if tree[item].first_child() == Some(id) {
                    r.consume_next_ial(tree, item);
                }
            }
        }
        return WalkStatus::Continue;
    }

    let in_cell = in_table_cell(tree, id);
    if !in_cell && r.without_ial(tree, id) {
        r.base.writer.newline();
    }

    let mut in_tight_list = false;
    let mut last_para_of_last_item = false;
    if let Some(item) = parent.filter(|&p| tree[p].kind == NodeKind::ListItem) {
        match tree[item].parent().and_then(|l| tree[l].list.as_ref()) {
            Some(list) => {
                in_tight_list = list.tight;
                if tree[item].next().is_none() {
                    last_para_of_last_item = tree[id].next().is_none();
                }
            }
            None => in_tight_list = true,
        }
    }
    if (!in_tight_list || last_para_of_last_item) && !in_cell && r.without_ial(tree, id) {
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::Continue
}

fn render_heading(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let node = &tree[id];
    if entering {
        if !node.heading_setext {
            let w = &mut r.base.writer;
            w.write_str(&"#".repeat(node.heading_level as usize));
            w.write_byte(b' ');
        }
        return WalkStatus::Continue;
    }

    if node.heading_setext {
        let len = setext_underline_len(tree, id);
        let w = &mut r.base.writer;
        w.write_byte(b'\n');
        match node.heading_level {
            1 => w.write_str(&"=".repeat(len)),
            2 => w.write_str(&"-".repeat(len)),
            _ => {}
        }
    }
    if !in_table_cell(tree, id) && r.without_ial(tree, id) {
        r.base.writer.newline();
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::Continue
}

/// Display width of the heading's last line: wide characters count two,
/// the caret counts nothing, never less than three.
fn setext_underline_len(tree: &Tree, id: NodeId) -> usize {
    let mut content = String::new();
    for n in tree.descendants(id) {
        match tree[n].kind {
            NodeKind::Text | NodeKind::LinkText => content.push_str(&tree[n].tokens),
            NodeKind::SoftBreak => content.push('\n'),
            _ => {}
        }
    }
    let content = content.replace(CARET, "");
    let last_line = content.rsplit('\n').next().unwrap_or("");
    let len: usize = last_line.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
    if len == 0 {
        3
    } else {
        len
    }
}

fn render_heading_id(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&format!(" {{{}}}", tree[id].tokens));
    }
    WalkStatus::SkipChildren
}

fn render_thematic_break(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        if in_table_cell(tree, id) {
            r.base.writer.write_str("<hr/>");
        } else {
            r.base.writer.write_str("---\n\n");
        }
    }
    WalkStatus::SkipChildren
}

fn render_blockquote(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.push_buffer();
        return WalkStatus::Continue;
    }

    let content = r.base.writer.pop_buffer();
    let content = String::from_utf8_lossy(&content);
    let mut lines: Vec<&str> = content.split('\n').collect();
    while lines.len() > 1 && lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let mut quoted = String::with_capacity(content.len() + lines.len() * 2);
    for line in lines {
        if line.is_empty() {
            quoted.push_str(">\n");
            continue;
        }
        quoted.push_str(if line.starts_with('>') { ">" } else { "> " });
        quoted.push_str(line);
        quoted.push('\n');
    }
    r.splice(quoted.as_bytes());
    if !in_table_cell(tree, id) && r.without_ial(tree, id) {
        r.base.writer.write_str("\n\n");
    }
    WalkStatus::Continue
}

fn render_list(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.push_buffer();
        return WalkStatus::Continue;
    }
    let content = r.base.writer.pop_buffer();
    r.splice(&content);
    if !in_table_cell(tree, id) && r.without_ial(tree, id) {
        r.base.writer.write_str("\n\n");
    }
    WalkStatus::Continue
}

fn render_list_item(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.push_buffer();
        return WalkStatus::Continue;
    }

    let data = tree[id].list.clone().unwrap_or_default();
    let marker = data.item_marker();
    let indent = " ".repeat(marker.len() + 1);

    let content = r.base.writer.pop_buffer();
    let content = String::from_utf8_lossy(&content);
    let mut indented = String::with_capacity(content.len() * 2);
    for line in content.split('\n') {
        if !line.is_empty() {
            indented.push_str(&indent);
            indented.push_str(line);
        }
        indented.push('\n');
    }
    let body = indented.strip_prefix(indent.as_str()).unwrap_or(&indented);

    let mut item = format!("{marker} {body}");
    let in_cell = in_table_cell(tree, id);
    if in_cell {
        item.retain(|c| c != '\n');
    }
    r.splice(item.as_bytes());

    if !in_cell {
        r.base.writer.write_byte(b'\n');
        let loose = tree[id]
            .parent()
            .is_some_and(|list| !tree[list].is_tight());
        if loose && tree.next_of_kind(id, NodeKind::ListItem).is_some() {
            r.base.writer.write_byte(b'\n');
        }
    }
    WalkStatus::Continue
}

fn render_task_list_item_marker(
    r: &mut FormatRenderer,
    tree: &Tree,
    id: NodeId,
    entering: bool,
) -> WalkStatus {
    if entering {
        if r.base.options.kramdown_block_ial {
            if let Some(item) = tree[id].parent().filter(|&p| tree[p].kind == NodeKind::ListItem) {
                r.consume_next_ial(tree, item);
            }
        }
        let mark = if tree[id].task_checked { "[X]" } else { "[ ]" };
        r.base.writer.write_str(mark);
    }
    WalkStatus::SkipChildren
}

fn render_html_block(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let last = r.is_last(tree, id);
        let w = &mut r.base.writer;
        w.newline();
        w.write_str(&tree[id].tokens);
        w.newline();
        if !last {
            w.write_byte(b'\n');
        }
    }
    WalkStatus::SkipChildren
}

fn render_code_block(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
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
        let last = r.is_last(tree, id);
        let without_ial = r.without_ial(tree, id);
        let w = &mut r.base.writer;
        w.write_str("```\n");
        w.write_str(code);
        w.newline();
        w.write_str("```");
        w.newline();
        if !last && without_ial {
            w.write_byte(b'\n');
        }
    }
    WalkStatus::SkipChildren
}

fn render_code_block_info(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&tree[id].code_block_info);
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::SkipChildren
}

fn render_code_block_close(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let last = r.is_last(tree, id);
        let without_ial = tree[id].parent().is_none_or(|p| r.without_ial(tree, p));
        let w = &mut r.base.writer;
        w.newline();
        w.write_str(&tree[id].tokens);
        w.newline();
        if !last && without_ial {
            w.write_byte(b'\n');
        }
    }
    WalkStatus::SkipChildren
}

fn render_math_block(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    r.base.writer.newline();
    if !entering && !r.is_last(tree, id) && r.without_ial(tree, id) {
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::Continue
}

fn render_math_block_marker(r: &mut FormatRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str("$$\n");
    }
    WalkStatus::SkipChildren
}

fn render_yaml_front_matter(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    r.base.writer.newline();
    if !entering && !r.is_last(tree, id) {
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::Continue
}

fn render_yaml_marker(r: &mut FormatRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str("---\n");
    }
    WalkStatus::SkipChildren
}

fn render_toc(r: &mut FormatRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str("[toc]\n\n");
    }
    WalkStatus::SkipChildren
}

fn render_footnotes_def(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&format!("[{}]: ", tree[id].tokens));
    }
    WalkStatus::Continue
}

fn render_footnotes_ref(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&format!("[{}]", tree[id].tokens));
    }
    WalkStatus::SkipChildren
}

fn render_block_ial(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !r.base.options.kramdown_block_ial || r.consumed.contains(&id) {
        return WalkStatus::SkipChildren;
    }
    let w = &mut r.base.writer;
    if entering {
        w.newline();
        w.write_str(&tree[id].tokens);
        return WalkStatus::SkipChildren;
    }
    let parent = tree[id].parent();
    let in_list = parent.is_some_and(|p| matches!(tree[p].kind, NodeKind::ListItem | NodeKind::List));
    if !in_list || parent.is_some_and(|p| !tree[p].is_tight()) {
        w.newline();
    }
    w.write_byte(b'\n');
    WalkStatus::SkipChildren
}

fn render_span_ial(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering && r.base.options.kramdown_span_ial {
        r.base.writer.write_str(&tree[id].tokens);
    }
    WalkStatus::SkipChildren
}

fn render_link_ref_def_block(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.newline();
    } else if !r.is_last(tree, id) {
        r.base.writer.newline();
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::Continue
}

fn render_link_ref_def(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let dest = child_tokens(tree, id, NodeKind::LinkDest);
        let line = format!("[{}]: {}\n", tree[id].link_ref_label, dest);
        r.base.writer.write_str(&line);
    }
    WalkStatus::SkipChildren
}

fn render_super_block(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let layout = child_tokens(tree, id, NodeKind::SuperBlockLayoutMarker);
        let layout = if layout.is_empty() { "row" } else { layout };
        r.base.writer.newline();
        r.base.writer.write_str(&format!("{{{{{{{layout}\n"));
        return WalkStatus::Continue;
    }
    let last = r.is_last(tree, id);
    let without_ial = r.without_ial(tree, id);
    let w = &mut r.base.writer;
    w.trim_end();
    w.write_str("\n}}}\n");
    if !last && without_ial {
        w.write_byte(b'\n');
    }
    WalkStatus::Continue
}

// ---------------------------------------------------------------------------
// Inlines
// ---------------------------------------------------------------------------

fn render_code_span_open(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let content = tree[id].next().map(|n| tree[n].tokens.as_str()).unwrap_or("");
    if in_table_cell(tree, id) && (content.contains('|') || content.contains('`')) {
        r.base.writer.write_str("<code>");
        return WalkStatus::SkipChildren;
    }
    let (fence, pad) = code_span_fence(tree, id, content);
    let w = &mut r.base.writer;
    w.write_str(&fence);
    if pad {
        w.write_byte(b' ');
    }
    WalkStatus::SkipChildren
}

fn render_code_span_content(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let tokens = &tree[id].tokens;
        if in_table_cell(tree, id) {
            let escaped = tokens
                .replace("\\|", "|")
                .replace('|', "\\|")
                .replace("<br/>", "");
            r.base.writer.write_str(&escaped);
        } else {
            r.base.writer.write_str(tokens);
        }
    }
    WalkStatus::SkipChildren
}

fn render_code_span_close(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        return WalkStatus::SkipChildren;
    }
    let content = tree[id].prev().map(|n| tree[n].tokens.as_str()).unwrap_or("");
    if in_table_cell(tree, id) && (content.contains('|') || content.contains('`')) {
        r.base.writer.write_str("</code>");
        return WalkStatus::SkipChildren;
    }
    let (fence, pad) = code_span_fence(tree, id, content);
    let w = &mut r.base.writer;
    if pad {
        w.write_byte(b' ');
    }
    w.write_str(&fence);
    WalkStatus::SkipChildren
}

/// Backtick fence around a code span and whether the content needs a space
/// on both sides. The recorded marker length is kept unless the content
/// holds a backtick run of exactly that length, which would close the span.
fn code_span_fence(tree: &Tree, marker: NodeId, content: &str) -> (String, bool) {
    let mut runs = Vec::new();
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
        } else if run > 0 {
            runs.push(run);
            run = 0;
        }
    }
    if run > 0 {
        runs.push(run);
    }
    let recorded = tree[marker].parent().map_or(1, |p| tree[p].code_marker_len).max(1);
    let len = if runs.contains(&recorded) {
        runs.iter().max().map_or(recorded, |m| m + 1)
    } else {
        recorded
    };
    let spaced = content.len() > 1
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.trim().is_empty();
    let pad = content.starts_with('`') || content.ends_with('`') || spaced;
    ("`".repeat(len), pad)
}

fn render_hard_break(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        if !r.base.options.soft_break_to_hard_break {
            r.base.writer.write_str("\\\n");
        } else if in_table_cell(tree, id) {
            r.base.writer.write_str("<br/>");
        } else {
            r.base.writer.write_byte(b'\n');
        }
    }
    WalkStatus::SkipChildren
}

fn render_soft_break(r: &mut FormatRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.newline();
    }
    WalkStatus::SkipChildren
}

fn render_link(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let node = &tree[id];
    if entering && node.link_type == crate::ast::LinkType::Reference {
        let text = child_tokens(tree, id, NodeKind::LinkText);
        let label = &node.link_ref_label;
        if text == label {
            r.base.writer.write_str(&format!("[{text}]"));
        } else {
            r.base.writer.write_str(&format!("[{text}][{label}]"));
        }
        return WalkStatus::SkipChildren;
    }
    WalkStatus::Continue
}

fn render_link_title(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_str(&format!("\"{}\"", tree[id].tokens));
    }
    WalkStatus::SkipChildren
}

fn render_backslash(r: &mut FormatRenderer, _: &Tree, _: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.base.writer.write_byte(b'\\');
    }
    WalkStatus::Continue
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn render_table(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        r.measure_table(tree, id);
        return WalkStatus::Continue;
    }
    let last = r.is_last(tree, id);
    let without_ial = r.without_ial(tree, id);
    r.base.writer.newline();
    if !last && without_ial {
        r.base.writer.write_byte(b'\n');
    }
    WalkStatus::Continue
}

fn render_table_cell(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    let (width, max) = r.cell_widths.get(&id).copied().unwrap_or((0, 0));
    let padding = max.saturating_sub(width);
    let align = tree[id].cell_align;
    let w = &mut r.base.writer;
    if entering {
        w.write_str("| ");
        match align {
            Align::Center => w.write_str(&" ".repeat(padding / 2)),
            Align::Right => w.write_str(&" ".repeat(padding)),
            _ => {}
        }
    } else {
        match align {
            Align::Center => w.write_str(&" ".repeat(padding / 2)),
            Align::Right => {}
            _ => w.write_str(&" ".repeat(padding)),
        }
        w.write_byte(b' ');
    }
    WalkStatus::Continue
}

/// Closes both head and body rows; the head additionally gets the
/// delimiter row.
fn render_table_row_exit(r: &mut FormatRenderer) {
    r.base.writer.write_str("|\n");
}

fn render_table_head_exit(r: &mut FormatRenderer, tree: &Tree, head: NodeId) {
    let Some(row) = tree.first_child_of_kind(head, NodeKind::TableRow) else {
        return;
    };
    let mut delim = String::new();
    for cell in tree.children_of_kind(row, NodeKind::TableCell) {
        let max = r.cell_widths.get(&cell).map_or(0, |&(_, m)| m);
        let dashes = |n: usize| "-".repeat(max.saturating_sub(n));
        match tree[cell].cell_align {
            Align::None => {
                delim.push_str("| -");
                delim.push_str(&dashes(1));
                delim.push(' ');
            }
            Align::Left => {
                delim.push_str("| :-");
                delim.push_str(&dashes(2));
                delim.push(' ');
            }
            Align::Center => {
                delim.push_str("| :-");
                delim.push_str(&dashes(3));
                delim.push_str(": ");
            }
            Align::Right => {
                delim.push_str("| -");
                delim.push_str(&dashes(2));
                delim.push_str(": ");
            }
        }
    }
    delim.push_str("|\n");
    r.base.writer.write_str(&delim);
}

fn render_table_part(r: &mut FormatRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if !entering {
        match tree[id].kind {
            NodeKind::TableRow => render_table_row_exit(r),
            NodeKind::TableHead => render_table_head_exit(r, tree, id),
            _ => {}
        }
    }
    WalkStatus::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ListData, Node};

    fn format(tree: &Tree) -> String {
        FormatRenderer::default().render(tree).unwrap()
    }

    fn para(tree: &mut Tree, parent: NodeId, text: &str) -> NodeId {
        let p = tree.append_new(parent, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text(text));
        p
    }

    fn list(tree: &mut Tree, parent: NodeId, tight: bool, items: &[&str]) -> NodeId {
        let data = ListData { tight, ..ListData::default() };
        let l = tree.append_new(parent, Node::list(NodeKind::List, data.clone()));
        for text in items {
            let li = tree.append_new(l, Node::list(NodeKind::ListItem, data.clone()));
            para(tree, li, text);
        }
        l
    }

    #[test]
    fn test_paragraphs_are_separated_by_one_blank_line() {
        let mut tree = Tree::new();
        let root = tree.root();
        para(&mut tree, root, "a");
        para(&mut tree, root, "b");
        assert_eq!(format(&tree), "a\n\nb\n");
    }

    #[test]
    fn test_tight_and_loose_lists() {
        let mut tree = Tree::new();
        let root = tree.root();
        list(&mut tree, root, true, &["a", "b"]);
        assert_eq!(format(&tree), "* a\n* b\n");

        let mut tree = Tree::new();
        let root = tree.root();
        list(&mut tree, root, false, &["a", "b"]);
        assert_eq!(format(&tree), "* a\n\n* b\n");
    }

    #[test]
    fn test_nested_list_is_indented() {
        let mut tree = Tree::new();
        let root = tree.root();
        let outer = list(&mut tree, root, true, &["a"]);
        let item = tree[outer].first_child().unwrap();
        list(&mut tree, item, true, &["b"]);
        assert_eq!(format(&tree), "* a\n  * b\n");
    }

    #[test]
    fn test_quote_in_list_in_quote_is_reindented() {
        let mut tree = Tree::new();
        let root = tree.root();
        let outer = tree.append_new(root, Node::new(NodeKind::Blockquote));
        let l = list(&mut tree, outer, true, &["a"]);
        let item = tree[l].first_child().unwrap();
        let inner = tree.append_new(item, Node::new(NodeKind::Blockquote));
        para(&mut tree, inner, "b");
        assert_eq!(format(&tree), "> * a\n>   > b\n");
    }

    #[test]
    fn test_nested_quote_has_no_trailing_marker_line() {
        let mut tree = Tree::new();
        let root = tree.root();
        let outer = tree.append_new(root, Node::new(NodeKind::Blockquote));
        let inner = tree.append_new(outer, Node::new(NodeKind::Blockquote));
        para(&mut tree, inner, "a");
        para(&mut tree, outer, "b");
        assert_eq!(format(&tree), ">> a\n>\n> b\n");
    }

    #[test]
    fn test_blockquote_prefixes_lines() {
        let mut tree = Tree::new();
        let root = tree.root();
        let quote = tree.append_new(root, Node::new(NodeKind::Blockquote));
        para(&mut tree, quote, "a");
        para(&mut tree, quote, "b");
        assert_eq!(format(&tree), "> a\n>\n> b\n");
    }

    #[test]
    fn test_ordered_item_indent_matches_marker() {
        let mut tree = Tree::new();
        let root = tree.root();
        let data = ListData::from_marker("1.");
        let l = tree.append_new(root, Node::list(NodeKind::List, data.clone()));
        let li = tree.append_new(l, Node::list(NodeKind::ListItem, data));
        para(&mut tree, li, "a");
        list(&mut tree, li, true, &["b"]);
        assert_eq!(format(&tree), "1. a\n   * b\n");
    }

    #[test]
    fn test_setext_underline_counts_wide_chars_twice() {
        let mut tree = Tree::new();
        let root = tree.root();
        let mut h = Node::heading(1);
        h.heading_setext = true;
        let h = tree.append_new(root, h);
        tree.append_new(h, Node::text("中a"));
        assert_eq!(format(&tree), "中a\n===\n");
    }

    #[test]
    fn test_code_span_padding() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        let code = tree.append_new(p, Node::code_span(2));
        tree.append_new(code, Node::new(NodeKind::CodeSpanOpenMarker));
        tree.append_new(code, Node::with_tokens(NodeKind::CodeSpanContent, "`a`"));
        tree.append_new(code, Node::new(NodeKind::CodeSpanCloseMarker));
        assert_eq!(format(&tree), "`` `a` ``\n");
    }

    #[test]
    fn test_code_span_fence_outgrows_inner_run() {
        for (recorded, content, expected) in [
            (3, "a``b", "```a``b```\n"),
            (2, "a``b", "```a``b```\n"),
            (4, "x```y", "````x```y````\n"),
        ] {
            let mut tree = Tree::new();
            let root = tree.root();
            let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
            let code = tree.append_new(p, Node::code_span(recorded));
            tree.append_new(code, Node::new(NodeKind::CodeSpanOpenMarker));
            tree.append_new(code, Node::with_tokens(NodeKind::CodeSpanContent, content));
            tree.append_new(code, Node::new(NodeKind::CodeSpanCloseMarker));
            assert_eq!(format(&tree), expected, "{content:?}");
        }
    }

    #[test]
    fn test_table_columns_are_padded() {
        let mut tree = Tree::new();
        let root = tree.root();
        let table = tree.append_new(root, Node::new(NodeKind::Table));
        let head = tree.append_new(table, Node::new(NodeKind::TableHead));
        let row = tree.append_new(head, Node::new(NodeKind::TableRow));
        for (text, align) in [("a", Align::None), ("b", Align::Right)] {
            let cell = tree.append_new(row, Node::table_cell(align));
            tree.append_new(cell, Node::text(text));
        }
        let row = tree.append_new(table, Node::new(NodeKind::TableRow));
        for (text, align) in [("long", Align::None), ("cc", Align::Right)] {
            let cell = tree.append_new(row, Node::table_cell(align));
            tree.append_new(cell, Node::text(text));
        }
        assert_eq!(
            format(&tree),
            "| a    |  b |\n| ---- | -: |\n| long | cc |\n"
        );
    }

    #[test]
    fn test_caret_passes_through() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        let em = tree.append_new(p, Node::new(NodeKind::Emphasis));
        tree.append_new(em, Node::new(NodeKind::EmAsteriskOpenMarker));
        tree.append_new(em, Node::text(format!("a{CARET}")));
        tree.append_new(em, Node::new(NodeKind::EmAsteriskCloseMarker));
        assert_eq!(format(&tree), format!("*a{CARET}*\n"));
    }
}
