// Document tree.
//
// Nodes live in one arena (`Vec<Node>`) and refer to each other by `NodeId`.
// Sibling lists are doubly linked so every structural edit is O(1); a node is
// never freed, only unlinked, which keeps every id handed out valid for the
// life of the tree.

mod kind;
mod node;
pub mod walk;

use std::ops::{Index, IndexMut};

pub use kind::{NodeKind, UnknownKind};
pub use node::{Align, LinkType, ListData, ListType, Node};
pub use walk::{walk, WalkStatus};

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena-backed document tree rooted at a Document node.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

impl Tree {
    /// An empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            root: NodeId(0),
        }
    }

    /// The Document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no content.
    pub fn is_empty(&self) -> bool {
        self[self.root].first_child.is_none()
    }

    /// Allocate a detached node.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = node;
        node.parent = None;
        node.first_child = None;
        node.last_child = None;
        node.prev = None;
        node.next = None;
        self.nodes.push(node);
        id
    }

    // -----------------------------------------------------------------------
    // Structural edits
    // -----------------------------------------------------------------------

    /// Detach `id` (and its subtree) from its parent and siblings.
    pub fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let n = &self[id];
            (n.parent, n.prev, n.next)
        };
        match prev {
            Some(p) => self[p].next = next,
            None => {
                if let Some(parent) = parent {
                    self[parent].first_child = next;
                }
            }
        }
        match next {
            Some(n) => self[n].prev = prev,
            None => {
                if let Some(parent) = parent {
                    self[parent].last_child = prev;
                }
            }
        }
        let n = &mut self[id];
        n.parent = None;
        n.prev = None;
        n.next = None;
    }

    /// Make `child` the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.unlink(child);
        let last = self[parent].last_child;
        self[child].parent = Some(parent);
        self[child].prev = last;
        match last {
            Some(last) => self[last].next = Some(child),
            None => self[parent].first_child = Some(child),
        }
        self[parent].last_child = Some(child);
    }

    /// Make `child` the first child of `parent`, moving it if attached.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.unlink(child);
        let first = self[parent].first_child;
        self[child].parent = Some(parent);
        self[child].next = first;
        match first {
            Some(first) => self[first].prev = Some(child),
            None => self[parent].last_child = Some(child),
        }
        self[parent].first_child = Some(child);
    }

    /// Insert `sibling` directly before `id`.
    pub fn insert_before(&mut self, id: NodeId, sibling: NodeId) {
        self.unlink(sibling);
        let parent = self[id].parent;
        let prev = self[id].prev;
        self[sibling].parent = parent;
        self[sibling].prev = prev;
        self[sibling].next = Some(id);
        self[id].prev = Some(sibling);
        match prev {
            Some(prev) => self[prev].next = Some(sibling),
            None => {
                if let Some(parent) = parent {
                    self[parent].first_child = Some(sibling);
                }
            }
        }
    }

    /// Insert `sibling` directly after `id`.
    pub fn insert_after(&mut self, id: NodeId, sibling: NodeId) {
        self.unlink(sibling);
        let parent = self[id].parent;
        let next = self[id].next;
        self[sibling].parent = parent;
        self[sibling].prev = Some(id);
        self[sibling].next = next;
        self[id].next = Some(sibling);
        match next {
            Some(next) => self[next].prev = Some(sibling),
            None => {
                if let Some(parent) = parent {
                    self[parent].last_child = Some(sibling);
                }
            }
        }
    }

    /// Allocate `node` and append it to `parent`.
    pub fn append_new(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add(node);
        self.append_child(parent, id);
        id
    }

    /// Move every child of `from` to the end of `to`, keeping order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        while let Some(child) = self[from].first_child {
            self.append_child(to, child);
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Iterate over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self[id].first_child,
        }
    }

    /// First direct child of `id` with the given kind.
    pub fn first_child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id).find(|&c| self[c].kind == kind)
    }

    /// Next following sibling of `id` with the given kind.
    pub fn next_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut cur = self[id].next;
        while let Some(n) = cur {
            if self[n].kind == kind {
                return Some(n);
            }
            cur = self[n].next;
        }
        None
    }

    /// Direct children of `id` with the given kind.
    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.children(id).filter(|&c| self[c].kind == kind).collect()
    }

    /// Whether any ancestor of `id` has one of `kinds`.
    pub fn parent_is(&self, id: NodeId, kinds: &[NodeKind]) -> bool {
        self.ancestor_of_kind(id, kinds).is_some()
    }

    /// Nearest ancestor of `id` whose kind is one of `kinds`.
    pub fn ancestor_of_kind(&self, id: NodeId, kinds: &[NodeKind]) -> Option<NodeId> {
        let mut cur = self[id].parent;
        while let Some(p) = cur {
            if kinds.contains(&self[p].kind) {
                return Some(p);
            }
            cur = self[p].parent;
        }
        None
    }

    /// Pre-order list of `id` and every node below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut child = self[n].last_child;
            while let Some(c) = child {
                stack.push(c);
                child = self[c].prev;
            }
        }
        out
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self[cur].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Follow last children down from `id` to a leaf.
    pub fn last_deepest_child(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(last) = self[cur].last_child {
            cur = last;
        }
        cur
    }

    /// Concatenated textual payload of the subtree at `id`.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(id) {
            let node = &self[n];
            match node.kind {
                NodeKind::Text
                | NodeKind::LinkText
                | NodeKind::CodeBlockCode
                | NodeKind::CodeSpanContent
                | NodeKind::InlineMathContent
                | NodeKind::MathBlockContent
                | NodeKind::HtmlEntity
                | NodeKind::BackslashContent
                | NodeKind::EmojiUnicode
                | NodeKind::YamlFrontMatterContent => out.push_str(&node.tokens),
                _ => {}
            }
        }
        out
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree[cur].next;
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tree: &Tree, id: NodeId) -> Vec<NodeKind> {
        tree.children(id).map(|c| tree[c].kind).collect()
    }

    /// Check parent/sibling links agree in both directions.
    fn assert_consistent(tree: &Tree, id: NodeId) {
        let children: Vec<_> = tree.children(id).collect();
        assert_eq!(tree[id].first_child, children.first().copied());
        assert_eq!(tree[id].last_child, children.last().copied());
        for (i, &c) in children.iter().enumerate() {
            assert_eq!(tree[c].parent, Some(id));
            let prev = if i == 0 { None } else { Some(children[i - 1]) };
            assert_eq!(tree[c].prev, prev);
            assert_consistent(tree, c);
        }
    }

    #[test]
    fn test_append_and_prepend() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        let h = tree.add(Node::heading(2));
        tree.prepend_child(root, h);
        assert_eq!(kinds(&tree, root), vec![NodeKind::Heading, NodeKind::Paragraph]);
        assert_eq!(tree[p].prev(), Some(h));
        assert_consistent(&tree, root);
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.append_new(root, Node::text("a"));
        let c = tree.append_new(root, Node::text("c"));
        let b = tree.add(Node::text("b"));
        tree.insert_before(c, b);
        let d = tree.add(Node::text("d"));
        tree.insert_after(c, d);
        let z = tree.add(Node::text("z"));
        tree.insert_before(a, z);
        assert_eq!(tree.text(root), "zabcd");
        assert_consistent(&tree, root);
    }

    #[test]
    fn test_unlink_middle_first_last() {
        let mut tree = Tree::new();
        let root = tree.root();
        let ids: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| tree.append_new(root, Node::text(*t)))
            .collect();
        tree.unlink(ids[1]);
        tree.unlink(ids[0]);
        tree.unlink(ids[3]);
        assert_eq!(tree.text(root), "c");
        assert!(!tree.is_attached(ids[0]));
        assert!(tree.is_attached(ids[2]));
        assert_consistent(&tree, root);
    }

    #[test]
    fn test_move_subtree() {
        let mut tree = Tree::new();
        let root = tree.root();
        let quote = tree.append_new(root, Node::new(NodeKind::Blockquote));
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("x"));
        tree.append_child(quote, p);
        assert_eq!(kinds(&tree, root), vec![NodeKind::Blockquote]);
        assert!(tree.parent_is(tree.last_deepest_child(root), &[NodeKind::Blockquote]));
        assert_consistent(&tree, root);
    }

    #[test]
    fn test_lookups() {
        let mut tree = Tree::new();
        let root = tree.root();
        let list = tree.append_new(root, Node::list(NodeKind::List, ListData::default()));
        let first = tree.append_new(list, Node::list(NodeKind::ListItem, ListData::default()));
        let second = tree.append_new(list, Node::list(NodeKind::ListItem, ListData::default()));
        assert_eq!(tree.first_child_of_kind(list, NodeKind::ListItem), Some(first));
        assert_eq!(tree.next_of_kind(first, NodeKind::ListItem), Some(second));
        assert_eq!(tree.next_of_kind(second, NodeKind::ListItem), None);
        assert_eq!(tree.children_of_kind(list, NodeKind::ListItem).len(), 2);
        assert_eq!(tree.descendants(root), vec![root, list, first, second]);
    }
}
