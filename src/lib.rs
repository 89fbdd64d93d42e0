// mdbridge: lossless conversion between editor DOM dialects and a Markdown
// document tree.
//
// Architecture:
//   editor HTML → html5ever parse → dialect handler table → Tree → renderer → output
//
// The tree is the hub: every input dialect is transduced into it and every
// output (Markdown, HTML, JSON, the editor DOMs) is a renderer walking it.
// The caret sentinel travels through all of them unchanged.

mod log;

pub mod ast;
mod error;
mod panic;
pub mod render;
pub mod sentinel;
pub mod transduce;

pub use ast::{Node, NodeId, NodeKind, Tree};
pub use error::ConvertError;
pub use render::{
    BlockRenderer, FormatRenderer, Highlighted, Highlighter, HtmlRenderer, IrRenderer,
    JsonRenderer, RenderOptions, Renderer, WysiwygRenderer,
};
pub use transduce::{Dialect, TransduceOptions};

use sentinel::{CARET, FRONT_END_CARET};
use url::Url;

/// Conversion options for both directions.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Tree → output switches.
    pub render: RenderOptions,
    /// DOM → tree switches.
    pub transduce: TransduceOptions,
}

impl Options {
    /// Create a new Options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `{: …}` block attribute lines in Markdown output.
    pub fn with_kramdown_block_ial(mut self, enabled: bool) -> Self {
        self.render.kramdown_block_ial = enabled;
        self
    }

    /// Emit span attribute lists after inline nodes.
    pub fn with_kramdown_span_ial(mut self, enabled: bool) -> Self {
        self.render.kramdown_span_ial = enabled;
        self
    }

    /// Write hard breaks as plain newlines.
    pub fn with_soft_break_to_hard_break(mut self, enabled: bool) -> Self {
        self.render.soft_break_to_hard_break = enabled;
        self
    }

    /// Render custom heading ids.
    pub fn with_heading_id(mut self, enabled: bool) -> Self {
        self.render.heading_id = enabled;
        self
    }

    /// Add previews after editable code blocks in editor DOM output.
    pub fn with_code_block_preview(mut self, enabled: bool) -> Self {
        self.render.code_block_preview = enabled;
        self
    }

    /// Add previews after editable math blocks in editor DOM output.
    pub fn with_math_block_preview(mut self, enabled: bool) -> Self {
        self.render.math_block_preview = enabled;
        self
    }

    /// Set the class put on task list items.
    pub fn with_task_list_item_class(mut self, class: impl Into<String>) -> Self {
        self.render.task_list_item_class = class.into();
        self
    }

    /// Render footnotes.
    pub fn with_footnotes(mut self, enabled: bool) -> Self {
        self.render.footnotes = enabled;
        self
    }

    /// Render the table of contents placeholder.
    pub fn with_toc(mut self, enabled: bool) -> Self {
        self.render.toc = enabled;
        self
    }

    /// Drop `javascript:` destinations from HTML output.
    pub fn with_sanitize(mut self, enabled: bool) -> Self {
        self.render.sanitize = enabled;
        self
    }

    /// Strip this absolute prefix from link and image destinations.
    pub fn with_link_base(mut self, base: Url) -> Self {
        self.transduce.link_base = Some(base);
        self
    }

    /// Strip this relative prefix from link and image destinations.
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.transduce.link_prefix = prefix.into();
        self
    }

    /// Keep the front-end caret as the caret sentinel.
    pub fn with_keep_caret(mut self, keep: bool) -> Self {
        self.transduce.keep_caret = keep;
        self
    }
}

/// Build a document tree from `html` written in `dialect`.
pub fn dom_to_tree(html: &str, dialect: Dialect, options: &Options) -> Result<Tree, ConvertError> {
    panic::recover(|| Ok(transduce::transduce(html, dialect, &options.transduce)))
}

/// Convert editor DOM to Markdown using default options.
///
/// # Examples
///
/// ```
/// use mdbridge::{dom_to_markdown, Dialect};
///
/// let md = dom_to_markdown("<p>Hello <strong>world</strong></p>", Dialect::Wysiwyg).unwrap();
/// assert_eq!(md, "Hello **world**\n");
/// ```
pub fn dom_to_markdown(html: &str, dialect: Dialect) -> Result<String, ConvertError> {
    dom_to_markdown_with(html, dialect, &Options::default())
}

/// Convert editor DOM to Markdown with custom options.
pub fn dom_to_markdown_with(
    html: &str,
    dialect: Dialect,
    options: &Options,
) -> Result<String, ConvertError> {
    panic::recover(|| {
        let tree = transduce::transduce(html, dialect, &options.transduce);
        FormatRenderer::new(options.render.clone()).render(&tree)
    })
}

/// Convert arbitrary HTML to Markdown.
///
/// # Examples
///
/// ```
/// let md = mdbridge::html_to_markdown("<h1>Hello</h1><p>World</p>").unwrap();
/// assert_eq!(md, "# Hello\n\nWorld\n");
/// ```
pub fn html_to_markdown(html: &str) -> Result<String, ConvertError> {
    dom_to_markdown(html, Dialect::Html)
}

/// Serialize a tree as Markdown.
pub fn tree_to_markdown(tree: &Tree, options: &RenderOptions) -> Result<String, ConvertError> {
    panic::recover(|| FormatRenderer::new(options.clone()).render(tree))
}

/// Render a tree as publishable HTML.
pub fn tree_to_html(tree: &Tree, options: &RenderOptions) -> Result<String, ConvertError> {
    panic::recover(|| HtmlRenderer::new(options.clone()).render(tree))
}

/// Render a tree as JSON.
pub fn tree_to_json(tree: &Tree, options: &RenderOptions) -> Result<String, ConvertError> {
    panic::recover(|| JsonRenderer::new(options.clone()).render(tree))
}

/// Render a tree as the DOM of `dialect`. The caret stays a sentinel
/// character; [`spin`] turns it back into the front-end marker.
pub fn tree_to_dom(
    tree: &Tree,
    dialect: Dialect,
    options: &RenderOptions,
) -> Result<String, ConvertError> {
    panic::recover(|| render_dom(tree, dialect, options))
}

fn render_dom(tree: &Tree, dialect: Dialect, options: &RenderOptions) -> Result<String, ConvertError> {
    let options = options.clone();
    match dialect {
        Dialect::Html => HtmlRenderer::new(options).render(tree),
        Dialect::Wysiwyg => WysiwygRenderer::new(options).render(tree),
        Dialect::Ir => IrRenderer::new(options).render(tree),
        Dialect::Block => BlockRenderer::new(options).render(tree),
    }
}

/// Normalize editor DOM: parse it into a tree and render it back in the
/// same dialect, keeping the caret where the editor put it.
///
/// # Examples
///
/// ```
/// use mdbridge::{spin, Dialect, Options};
///
/// let html = spin("<p>a<wbr></p>", Dialect::Wysiwyg, &Options::default()).unwrap();
/// assert!(html.contains("a<wbr>"));
/// ```
pub fn spin(html: &str, dialect: Dialect, options: &Options) -> Result<String, ConvertError> {
    panic::recover(|| {
        let transduce_options = TransduceOptions {
            keep_caret: true,
            ..options.transduce.clone()
        };
        let tree = transduce::transduce(html, dialect, &transduce_options);
        let out = render_dom(&tree, dialect, &options.render)?;
        Ok(out.replace(CARET, FRONT_END_CARET))
    })
}

/// Format the subtree at `id` as Markdown.
///
/// Calls share one renderer, so repeated single-block formatting does not
/// rebuild handler tables.
pub fn format_node(tree: &Tree, id: NodeId, options: &RenderOptions) -> Result<String, ConvertError> {
    panic::recover(|| render::shared::format_node(tree, id, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_empty() {
        assert_eq!(html_to_markdown("").unwrap(), "\n");
    }

    #[test]
    fn test_convert_simple_paragraph() {
        assert_eq!(html_to_markdown("<p>Hello, world!</p>").unwrap(), "Hello, world!\n");
    }

    #[test]
    fn test_convert_heading() {
        assert_eq!(html_to_markdown("<h2>Title</h2>").unwrap(), "## Title\n");
    }

    #[test]
    fn test_options_builder() {
        let options = Options::new()
            .with_kramdown_block_ial(true)
            .with_task_list_item_class("task")
            .with_link_prefix("/docs/")
            .with_keep_caret(true);

        assert!(options.render.kramdown_block_ial);
        assert_eq!(options.render.task_list_item_class, "task");
        assert_eq!(options.transduce.link_prefix, "/docs/");
        assert!(options.transduce.keep_caret);
    }

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert!(!options.render.kramdown_block_ial);
        assert!(options.render.footnotes);
        assert_eq!(options.render.task_list_item_class, "vditor-task");
        assert!(options.transduce.link_base.is_none());
        assert!(!options.transduce.keep_caret);
    }

    #[test]
    fn test_spin_keeps_caret() {
        for dialect in [Dialect::Wysiwyg, Dialect::Ir] {
            let out = spin("<p>ab<wbr>c</p>", dialect, &Options::default()).unwrap();
            assert!(out.contains("ab<wbr>c"), "{dialect}: {out}");
            assert!(!out.contains(CARET));
        }
    }

    #[test]
    fn test_format_node_formats_one_block() {
        let tree = dom_to_tree("<p>one</p><p>two</p>", Dialect::Html, &Options::default()).unwrap();
        let second = tree.children(tree.root()).nth(1).unwrap();
        let md = format_node(&tree, second, &RenderOptions::default()).unwrap();
        assert_eq!(md.trim_end(), "two");
    }

    #[test]
    fn test_link_prefix_is_stripped() {
        let options = Options::new().with_link_prefix("/docs/");
        let md = dom_to_markdown_with("<p><a href=\"/docs/intro\">intro</a></p>", Dialect::Html, &options)
            .unwrap();
        assert_eq!(md, "[intro](intro)\n");
    }
}
