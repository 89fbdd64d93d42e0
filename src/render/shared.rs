// Process-wide Markdown renderer for single-node formatting.
//
// Formatting one node happens often (an editor re-serializes the block it
// just edited), so one `FormatRenderer` is kept behind a mutex instead of
// rebuilding its handler table per call. Configure, walk, read and reset all
// happen under the lock; the reset runs from a drop guard so it also happens
// when the walk panics, and a poisoned lock is taken over as is.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use super::{FormatRenderer, RenderOptions, Renderer};
use crate::ast::{NodeId, Tree};
use crate::error::ConvertError;

static SHARED: LazyLock<Mutex<FormatRenderer>> =
    LazyLock::new(|| Mutex::new(FormatRenderer::default()));

/// Lock holder that returns the renderer to its pristine state on drop.
struct Lease<'a> {
    renderer: MutexGuard<'a, FormatRenderer>,
}

impl Lease<'_> {
    fn acquire() -> Lease<'static> {
        let renderer = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
        crate::log::trace!("reusing shared format renderer");
        Lease { renderer }
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.renderer.base_mut().reset();
        self.renderer.set_options(RenderOptions::default());
    }
}

/// Format the subtree at `id` as Markdown with `options`.
pub(crate) fn format_node(tree: &Tree, id: NodeId, options: &RenderOptions) -> Result<String, ConvertError> {
    let mut lease = Lease::acquire();
    lease.renderer.set_options(options.clone());
    lease.renderer.render_from(tree, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formats_single_node() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("one"));
        let q = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(q, Node::text("two"));
        let out = format_node(&tree, q, &RenderOptions::default()).unwrap();
        assert_eq!(out.trim_end(), "two");
    }

    #[test]
    fn test_options_do_not_leak_between_calls() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("x"));
        let options = RenderOptions { kramdown_block_ial: true, ..RenderOptions::default() };
        format_node(&tree, p, &options).unwrap();
        let lease = Lease::acquire();
        assert!(!lease.renderer.options().kramdown_block_ial);
    }
}
