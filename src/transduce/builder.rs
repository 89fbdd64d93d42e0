// Tip-cursor tree builder.
//
// The builder walks the DOM in pre-order and appends every produced node to
// the current tip. Containers push themselves as the tip through `enter`,
// whose guard pops them again when it goes out of scope, so a handler that
// returns early can never leave a stale tip behind.

use std::ops::{Deref, DerefMut};

use markup5ever_rcdom::{Handle, NodeData};

use super::table::{DialectTable, Outcome};
use super::{dom, repair, Dialect, TransduceOptions};
use crate::ast::{Node, NodeId, NodeKind, Tree};

/// Tree under construction plus the stack of insertion points.
#[derive(Debug)]
pub struct Builder<'t> {
    tree: Tree,
    tips: Vec<NodeId>,
    table: &'t DialectTable,
    options: &'t TransduceOptions,
}

impl<'t> Builder<'t> {
    pub(crate) fn new(table: &'t DialectTable, options: &'t TransduceOptions) -> Self {
        let tree = Tree::new();
        let root = tree.root();
        Self {
            tree,
            tips: vec![root],
            table,
            options,
        }
    }

    /// Current insertion point.
    pub fn tip(&self) -> NodeId {
        self.tips.last().copied().unwrap_or_else(|| self.tree.root())
    }

    pub fn tip_kind(&self) -> NodeKind {
        self.tree[self.tip()].kind
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn options(&self) -> &TransduceOptions {
        self.options
    }

    pub fn dialect(&self) -> Dialect {
        self.table.dialect
    }

    /// Append `node` to the tip.
    pub fn append(&mut self, node: Node) -> NodeId {
        let tip = self.tip();
        self.tree.append_new(tip, node)
    }

    /// Append `node` to `parent`.
    pub fn append_to(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.tree.append_new(parent, node)
    }

    /// Make `container` the tip until the returned guard is dropped.
    pub fn enter(&mut self, container: NodeId) -> Scope<'_, 't> {
        let depth = self.tips.len();
        self.tips.push(container);
        Scope {
            builder: self,
            depth,
        }
    }

    /// Convert one DOM node.
    pub fn visit(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                let handler = self.table.text;
                handler(self, node, text);
            }
            NodeData::Element { .. } => self.visit_element(node),
            NodeData::Document => self.visit_children(node),
            _ => {}
        }
    }

    /// Convert the children of `node` against the current tip.
    pub fn visit_children(&mut self, node: &Handle) {
        for child in dom::children(node) {
            self.visit(&child);
        }
    }

    fn visit_element(&mut self, node: &Handle) {
        let table = self.table;
        if table.skips(node) {
            crate::log::trace!(tag = dom::tag(node).unwrap_or(""), "filtered");
            return;
        }
        let tag = dom::tag(node).unwrap_or("");
        let outcome = match table.element(tag) {
            Some(handler) => handler(self, node),
            None => Outcome::Descend,
        };
        match outcome {
            Outcome::Discard => {
                crate::log::trace!(tag = tag, "discarded");
            }
            Outcome::Emitted => {}
            Outcome::Descend => self.visit_children(node),
            Outcome::Open(container, hook) => {
                {
                    let mut scope = self.enter(container);
                    scope.visit_children(node);
                    if let Some(hook) = hook {
                        hook(&mut scope, node, container);
                    }
                }
                if self.tree.is_attached(container) {
                    repair::merge_with_previous(&mut self.tree, container);
                }
            }
        }
    }

    pub(crate) fn into_tree(self) -> Tree {
        self.tree
    }
}

/// Guard returned by [`Builder::enter`]; pops the tip on drop.
#[derive(Debug)]
pub struct Scope<'b, 't> {
    builder: &'b mut Builder<'t>,
    depth: usize,
}

impl<'t> Deref for Scope<'_, 't> {
    type Target = Builder<'t>;

    fn deref(&self) -> &Builder<'t> {
        self.builder
    }
}

impl<'t> DerefMut for Scope<'_, 't> {
    fn deref_mut(&mut self) -> &mut Builder<'t> {
        self.builder
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        self.builder.tips.truncate(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_restores_tip() {
        let options = TransduceOptions::default();
        let table = DialectTable::of(Dialect::Html);
        let mut b = Builder::new(table, &options);
        let root = b.tip();
        let quote = b.append(Node::new(NodeKind::Blockquote));
        {
            let mut scope = b.enter(quote);
            let p = scope.append(Node::new(NodeKind::Paragraph));
            let _inner = scope.enter(p);
        }
        assert_eq!(b.tip(), root);
    }

    #[test]
    fn test_nested_scopes_pop_in_order() {
        let options = TransduceOptions::default();
        let table = DialectTable::of(Dialect::Html);
        let mut b = Builder::new(table, &options);
        let quote = b.append(Node::new(NodeKind::Blockquote));
        let mut outer = b.enter(quote);
        let p = outer.append(Node::new(NodeKind::Paragraph));
        {
            let inner = outer.enter(p);
            assert_eq!(inner.tip(), p);
        }
        assert_eq!(outer.tip(), quote);
    }
}
