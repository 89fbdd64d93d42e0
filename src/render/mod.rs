// Tree → output renderers.
//
// Every renderer is a table from node kind to handler, driven by `walk`.
// Handlers receive the tree, the node and whether the walk is entering or
// leaving it, write into the renderer's `Writer`, and steer the walk with
// their return value. Callers may plug extension handlers in front of the
// table, or override single table entries.

pub mod block;
pub mod format;
pub mod html;
pub mod ir;
pub mod json;
pub(crate) mod shared;
pub mod wysiwyg;
pub mod writer;

use std::collections::HashMap;

use crate::ast::{walk, NodeId, NodeKind, Tree, WalkStatus};
use crate::error::ConvertError;
use crate::sentinel::escape_html;

pub use block::BlockRenderer;
pub use format::FormatRenderer;
pub use html::{Highlighted, Highlighter, HtmlRenderer};
pub use ir::IrRenderer;
pub use json::JsonRenderer;
pub use wysiwyg::WysiwygRenderer;
pub use writer::Writer;

/// Built-in handler of a renderer `R`.
pub type Handler<R> = fn(&mut R, &Tree, NodeId, bool) -> WalkStatus;

/// Kind → handler table.
pub type HandlerTable<R> = HashMap<NodeKind, Handler<R>>;

/// Caller-supplied handler: returns the text to write and the walk signal.
pub type ExtRenderFn = Box<dyn Fn(&Tree, NodeId, bool) -> (String, WalkStatus) + Send + Sync>;

/// Build a table from a per-kind lookup, visiting every kind once.
pub fn build_table<R>(lookup: fn(NodeKind) -> Option<Handler<R>>) -> HandlerTable<R> {
    NodeKind::ALL
        .iter()
        .filter_map(|&kind| lookup(kind).map(|h| (kind, h)))
        .collect()
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Rendering switches shared by every renderer.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit block inline attribute lists (`{: id="…"}`).
    pub kramdown_block_ial: bool,
    /// Emit span inline attribute lists after inline nodes.
    pub kramdown_span_ial: bool,
    /// Treat hard breaks as plain newlines, and `<br/>` inside table cells.
    pub soft_break_to_hard_break: bool,
    /// Render custom heading ids.
    pub heading_id: bool,
    /// Add a preview element after editable code blocks.
    pub code_block_preview: bool,
    /// Add a preview element after editable math blocks.
    pub math_block_preview: bool,
    /// Class put on task list items.
    pub task_list_item_class: String,
    /// Render footnote references and definitions.
    pub footnotes: bool,
    /// Render the table of contents placeholder.
    pub toc: bool,
    /// Drop `javascript:` link destinations from HTML output.
    pub sanitize: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            kramdown_block_ial: false,
            kramdown_span_ial: false,
            soft_break_to_hard_break: false,
            heading_id: true,
            code_block_preview: true,
            math_block_preview: true,
            task_list_item_class: "vditor-task".to_string(),
            footnotes: true,
            toc: true,
            sanitize: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Base renderer
// ---------------------------------------------------------------------------

/// State every renderer carries: output sink, options, extension handlers
/// and the first error a handler recorded.
pub struct BaseRenderer {
    pub writer: Writer,
    pub options: RenderOptions,
    ext: HashMap<NodeKind, ExtRenderFn>,
    error: Option<ConvertError>,
}

impl std::fmt::Debug for BaseRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseRenderer")
            .field("writer", &self.writer)
            .field("options", &self.options)
            .field("ext", &self.ext.keys().collect::<Vec<_>>())
            .field("error", &self.error)
            .finish()
    }
}

impl BaseRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            writer: Writer::new(),
            options,
            ext: HashMap::new(),
            error: None,
        }
    }

    /// Clear output and error state; options and extensions are kept.
    pub fn reset(&mut self) {
        self.writer.reset();
        self.error = None;
    }

    /// Write an HTML tag. `name` starting with `/` writes a closing tag.
    pub fn tag(&mut self, name: &str, attrs: &[(&str, &str)], self_closing: bool) {
        let w = &mut self.writer;
        w.write_byte(b'<');
        w.write_str(name);
        for (k, v) in attrs {
            w.write_byte(b' ');
            w.write_str(k);
            w.write_str("=\"");
            w.write_str(&escape_html(v));
            w.write_byte(b'"');
        }
        if self_closing {
            w.write_str(" /");
        }
        w.write_byte(b'>');
    }

    /// Record that no handler exists for the node and stop the walk.
    pub fn no_renderer(&mut self, tree: &Tree, id: NodeId) -> WalkStatus {
        let node = &tree[id];
        crate::log::warning!(kind = %node.kind, "no renderer for node");
        if self.error.is_none() {
            self.error = Some(ConvertError::NoRenderer {
                kind: node.kind,
                tokens: node.tokens.clone(),
            });
        }
        WalkStatus::Stop
    }

    /// Record an error raised inside a handler; the first one wins.
    pub fn fail(&mut self, error: ConvertError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer protocol
// ---------------------------------------------------------------------------

/// Dispatch protocol shared by the concrete renderers.
pub trait Renderer: Sized {
    fn base(&self) -> &BaseRenderer;
    fn base_mut(&mut self) -> &mut BaseRenderer;
    fn table(&self) -> &HandlerTable<Self>;
    fn table_mut(&mut self) -> &mut HandlerTable<Self>;

    /// Prepare renderer-specific state for a walk starting at `root`.
    fn begin(&mut self, _tree: &Tree, _root: NodeId) {}

    /// Produce the final output once the walk completed.
    fn finish(&mut self, _tree: &Tree) -> Result<String, ConvertError> {
        Ok(self.base_mut().writer.take_string())
    }

    /// Route one walk event: extension handler, then table, then the
    /// missing-renderer default.
    fn dispatch(&mut self, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
        let kind = tree[id].kind;
        if let Some(ext) = self.base().ext.get(&kind) {
            let (out, status) = ext(tree, id, entering);
            self.base_mut().writer.write_str(&out);
            return status;
        }
        match self.table().get(&kind).copied() {
            Some(handler) => handler(self, tree, id, entering),
            None => self.base_mut().no_renderer(tree, id),
        }
    }

    /// Render the whole tree.
    fn render(&mut self, tree: &Tree) -> Result<String, ConvertError> {
        self.render_from(tree, tree.root())
    }

    /// Render the subtree at `id`.
    fn render_from(&mut self, tree: &Tree, id: NodeId) -> Result<String, ConvertError> {
        self.base_mut().reset();
        self.begin(tree, id);
        walk(tree, id, &mut |t: &Tree, n, entering| self.dispatch(t, n, entering));
        if let Some(err) = self.base_mut().error.take() {
            return Err(err);
        }
        self.finish(tree)
    }

    /// Put `handler` in front of the built-in table for `kind`.
    fn register_ext(&mut self, kind: NodeKind, handler: ExtRenderFn) {
        self.base_mut().ext.insert(kind, handler);
    }

    /// Replace the built-in handler for `kind`.
    fn override_handler(&mut self, kind: NodeKind, handler: Handler<Self>) {
        self.table_mut().insert(kind, handler);
    }

    /// Remove the built-in handler for `kind`, so that rendering it fails.
    fn remove_handler(&mut self, kind: NodeKind) {
        self.table_mut().remove(&kind);
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by handlers
// ---------------------------------------------------------------------------

/// Whether nothing follows `id` up to the end of the walk root: it is the
/// root, or it has no next sibling and its top-level ancestor is the root's
/// last child.
pub(crate) fn is_last_node(tree: &Tree, root: NodeId, id: NodeId) -> bool {
    if id == root {
        return true;
    }
    if tree[id].next().is_some() {
        return false;
    }
    let mut top = id;
    while let Some(parent) = tree[top].parent() {
        if parent == root {
            break;
        }
        top = parent;
    }
    tree[root].last_child() == Some(top)
}

/// Whether `id` sits inside a table cell.
pub(crate) fn in_table_cell(tree: &Tree, id: NodeId) -> bool {
    tree.parent_is(id, &[NodeKind::TableCell])
}

/// Tokens of the first child of `id` with `kind`, or "".
pub(crate) fn child_tokens(tree: &Tree, id: NodeId, kind: NodeKind) -> &str {
    tree.first_child_of_kind(id, kind)
        .map(|c| tree[c].tokens.as_str())
        .unwrap_or("")
}

/// Heading level as the digit used in tag names.
pub(crate) fn heading_tag(level: u8) -> String {
    format!("h{}", level.clamp(1, 6))
}

/// Slug used for heading anchors: lowercase, whitespace to `-`, markup
/// characters and the caret removed.
pub(crate) fn heading_slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in crate::sentinel::strip_caret(text).trim().chars() {
        if c.is_whitespace() {
            out.push('-');
        } else if c.is_alphanumeric() || c == '-' || c == '_' {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Anchor id of a heading: its explicit `{#id}` when present, otherwise the
/// slug of its text.
pub(crate) fn heading_anchor(tree: &Tree, heading: NodeId) -> String {
    match tree.first_child_of_kind(heading, NodeKind::HeadingId) {
        Some(id) => tree[id].tokens.clone(),
        None => heading_slug(&tree.text(heading)),
    }
}

/// Whether the inline text before `id` is empty once sentinels are removed.
pub(crate) fn previous_text_is_empty(tree: &Tree, id: NodeId) -> bool {
    match tree[id].prev() {
        Some(prev) => {
            crate::sentinel::strip_caret(&crate::sentinel::strip_zwsp(&tree.text(prev))).is_empty()
        }
        None => true,
    }
}

/// Whether a link destination must be dropped under sanitizing.
pub(crate) fn is_unsafe_dest(dest: &str) -> bool {
    let dest = dest.trim_start().to_ascii_lowercase();
    dest.starts_with("javascript:") || dest.starts_with("vbscript:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    struct Echo {
        base: BaseRenderer,
        table: HandlerTable<Echo>,
    }

    fn echo_text(r: &mut Echo, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
        if entering {
            r.base.writer.write_str(&tree[id].tokens);
        }
        WalkStatus::SkipChildren
    }

    fn pass(_: &mut Echo, _: &Tree, _: NodeId, _: bool) -> WalkStatus {
        WalkStatus::Continue
    }

    fn lookup(kind: NodeKind) -> Option<Handler<Echo>> {
        match kind {
            NodeKind::Document | NodeKind::Paragraph => Some(pass),
            NodeKind::Text => Some(echo_text),
            _ => None,
        }
    }

    impl Renderer for Echo {
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
    }

    fn echo() -> Echo {
        Echo {
            base: BaseRenderer::new(RenderOptions::default()),
            table: build_table(lookup),
        }
    }

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("a"));
        tree.append_new(p, Node::text("b"));
        tree
    }

    #[test]
    fn test_table_dispatch() {
        assert_eq!(echo().render(&sample()).unwrap(), "ab");
    }

    #[test]
    fn test_ext_runs_before_table() {
        let mut r = echo();
        r.register_ext(
            NodeKind::Text,
            Box::new(|tree, id, entering| {
                let out = if entering { tree[id].tokens.to_uppercase() } else { String::new() };
                (out, WalkStatus::SkipChildren)
            }),
        );
        assert_eq!(r.render(&sample()).unwrap(), "AB");
    }

    #[test]
    fn test_missing_renderer_is_reported() {
        let mut tree = sample();
        let root = tree.root();
        tree.append_new(root, Node::new(NodeKind::ThematicBreak));
        match echo().render(&tree) {
            Err(ConvertError::NoRenderer { kind, .. }) => assert_eq!(kind, NodeKind::ThematicBreak),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_is_last_node() {
        let mut tree = Tree::new();
        let root = tree.root();
        let quote = tree.append_new(root, Node::new(NodeKind::Blockquote));
        let p = tree.append_new(quote, Node::new(NodeKind::Paragraph));
        assert!(is_last_node(&tree, root, p));
        tree.append_new(root, Node::new(NodeKind::ThematicBreak));
        assert!(!is_last_node(&tree, root, p));
        assert!(is_last_node(&tree, quote, p));
    }

    #[test]
    fn test_heading_slug() {
        assert_eq!(heading_slug(" Hello World\u{2038} "), "hello-world");
    }

    #[test]
    fn test_heading_anchor_prefers_explicit_id() {
        let mut tree = Tree::new();
        let root = tree.root();
        let h = tree.append_new(root, Node::heading(1));
        tree.append_new(h, Node::text("Intro Part"));
        assert_eq!(heading_anchor(&tree, h), "intro-part");
        tree.append_new(h, Node::with_tokens(NodeKind::HeadingId, "start"));
        assert_eq!(heading_anchor(&tree, h), "start");
    }

    #[test]
    fn test_unsafe_dest() {
        assert!(is_unsafe_dest(" JavaScript:alert(1)"));
        assert!(!is_unsafe_dest("https://example.com"));
    }
}
