// Post-walk tree repair.
//
// The walk appends whatever the DOM holds, and editor DOMs are frequently
// not shaped like a Markdown tree: lists nested directly in lists, items
// outside any list, bare inline content at block level, delimiter runs split
// by an edit. This pass puts the tree back into the shape the renderers
// expect.

use super::Dialect;
use crate::ast::{ListData, Node, NodeId, NodeKind, Tree};
use crate::sentinel::{is_empty_text, CARET};

/// Containers whose inline children are gathered into paragraphs.
const PARAGRAPH_HOSTS: &[NodeKind] = &[
    NodeKind::Document,
    NodeKind::ListItem,
    NodeKind::Blockquote,
    NodeKind::FootnotesDef,
    NodeKind::SuperBlock,
];

/// Repair the whole tree built from a `dialect` DOM.
pub(crate) fn repair(tree: &mut Tree, dialect: Dialect) {
    let root = tree.root();
    fix_lists(tree, root);
    wrap_inlines(tree, root);
    remove_empty_paragraphs(tree, root);
    merge_text(tree, root);
    merge_runs(tree, root);
    if dialect == Dialect::Html {
        trim_block_edges(tree, root);
    }
    crate::log::debug!(nodes = tree.len(), "tree repaired");
}

// ---------------------------------------------------------------------------
// Delimiter runs
// ---------------------------------------------------------------------------

fn boundary_is_footnote_ref(tree: &Tree, id: NodeId, first: bool) -> bool {
    let content: Vec<NodeId> = tree.children(id).filter(|&c| !tree[c].kind.is_marker()).collect();
    let edge = if first { content.first() } else { content.last() };
    edge.is_some_and(|&c| tree[c].kind == NodeKind::FootnotesRef)
}

/// Merge `id` into its previous sibling when both are runs of the same
/// kind written with the same delimiter.
pub(crate) fn merge_with_previous(tree: &mut Tree, id: NodeId) {
    let kind = tree[id].kind;
    if !kind.is_delimited_run() {
        return;
    }
    let Some(prev) = tree[id].prev() else {
        return;
    };
    if tree[prev].kind != kind {
        return;
    }
    let (Some(open), Some(prev_open)) = (tree[id].first_child(), tree[prev].first_child()) else {
        return;
    };
    if tree[open].kind != tree[prev_open].kind {
        return;
    }
    if boundary_is_footnote_ref(tree, prev, false) || boundary_is_footnote_ref(tree, id, true) {
        return;
    }
    if let Some(prev_close) = tree[prev].last_child().filter(|&c| tree[c].kind.is_marker()) {
        tree.unlink(prev_close);
    }
    tree.unlink(open);
    tree.move_children(id, prev);
    tree.unlink(id);
    crate::log::trace!(kind = kind.name(), "merged adjacent runs");
}

fn merge_runs(tree: &mut Tree, root: NodeId) {
    for id in tree.descendants(root).into_iter().rev() {
        if tree[id].kind.is_delimited_run() && tree.is_attached(id) {
            merge_with_previous(tree, id);
        }
    }
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// Previous sibling item, or a new empty item inserted before `id`.
fn item_before(tree: &mut Tree, id: NodeId) -> NodeId {
    if let Some(prev) = tree[id].prev().filter(|&p| tree[p].kind == NodeKind::ListItem) {
        return prev;
    }
    let data = tree[id]
        .parent()
        .and_then(|p| tree[p].list.clone())
        .unwrap_or_default();
    let item = tree.add(Node::list(NodeKind::ListItem, data));
    tree.insert_before(id, item);
    item
}

fn fix_lists(tree: &mut Tree, root: NodeId) {
    for id in tree.descendants(root) {
        if !tree.is_attached(id) {
            continue;
        }
        let parent_kind = tree[id].parent().map(|p| tree[p].kind);
        match tree[id].kind {
            NodeKind::ListItem if parent_kind != Some(NodeKind::List) => {
                let list = match tree[id].prev().filter(|&p| tree[p].kind == NodeKind::List) {
                    Some(list) => list,
                    None => {
                        let data = tree[id].list.clone().unwrap_or_else(ListData::default);
                        let list = tree.add(Node::list(NodeKind::List, data));
                        tree.insert_before(id, list);
                        list
                    }
                };
                crate::log::debug!("moving stray list item into a list");
                tree.append_child(list, id);
            }
            kind if parent_kind == Some(NodeKind::List) && kind != NodeKind::ListItem && !kind.is_ial() => {
                if kind == NodeKind::Text && is_empty_text(&tree[id].tokens) && !tree[id].tokens.contains(CARET) {
                    tree.unlink(id);
                    continue;
                }
                let item = item_before(tree, id);
                tree.append_child(item, id);
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

fn is_inline(kind: NodeKind) -> bool {
    !kind.is_block() && !kind.is_ial() && !kind.is_marker()
}

fn is_blank_run(tree: &Tree, run: &[NodeId]) -> bool {
    run.iter().all(|&c| {
        matches!(tree[c].kind, NodeKind::Text | NodeKind::SoftBreak)
            && tree[c].tokens.trim().is_empty()
            && !tree[c].tokens.contains(CARET)
    })
}

fn wrap_run(tree: &mut Tree, run: &[NodeId]) {
    if is_blank_run(tree, run) {
        for &c in run {
            tree.unlink(c);
        }
        return;
    }
    let paragraph = tree.add(Node::new(NodeKind::Paragraph));
    tree.insert_before(run[0], paragraph);
    for &c in run {
        tree.append_child(paragraph, c);
    }
}

fn wrap_inlines(tree: &mut Tree, root: NodeId) {
    for host in tree.descendants(root) {
        if !PARAGRAPH_HOSTS.contains(&tree[host].kind) {
            continue;
        }
        let mut run = Vec::new();
        let children: Vec<NodeId> = tree.children(host).collect();
        for child in children {
            if is_inline(tree[child].kind) {
                run.push(child);
            } else if !run.is_empty() {
                wrap_run(tree, &run);
                run.clear();
            }
        }
        if !run.is_empty() {
            wrap_run(tree, &run);
        }
    }
}

fn remove_empty_paragraphs(tree: &mut Tree, root: NodeId) {
    for id in tree.descendants(root) {
        if tree[id].kind == NodeKind::Paragraph && !tree[id].has_children() {
            tree.unlink(id);
        }
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

fn merge_text(tree: &mut Tree, root: NodeId) {
    for id in tree.descendants(root) {
        let kind = tree[id].kind;
        if !matches!(kind, NodeKind::Text | NodeKind::LinkText) || !tree.is_attached(id) {
            continue;
        }
        while let Some(next) = tree[id].next().filter(|&n| tree[n].kind == kind) {
            let tokens = std::mem::take(&mut tree[next].tokens);
            tree[id].tokens.push_str(&tokens);
            tree.unlink(next);
        }
    }
}

/// Leading and trailing whitespace of paragraphs, headings and cells comes
/// from source formatting, not content.
fn trim_block_edges(tree: &mut Tree, root: NodeId) {
    for id in tree.descendants(root) {
        if !matches!(tree[id].kind, NodeKind::Paragraph | NodeKind::Heading | NodeKind::TableCell) {
            continue;
        }
        if let Some(first) = tree[id].first_child().filter(|&c| tree[c].kind == NodeKind::Text) {
            let trimmed = tree[first].tokens.trim_start().to_string();
            tree[first].tokens = trimmed;
        }
        let last = tree
            .children(id)
            .filter(|&c| tree[c].kind != NodeKind::HeadingId)
            .last()
            .filter(|&c| tree[c].kind == NodeKind::Text);
        if let Some(last) = last {
            let trimmed = tree[last].tokens.trim_end().to_string();
            tree[last].tokens = trimmed;
        }
        let empty: Vec<NodeId> = tree
            .children(id)
            .filter(|&c| tree[c].kind == NodeKind::Text && tree[c].tokens.is_empty())
            .collect();
        for c in empty {
            tree.unlink(c);
        }
        if tree[id].kind == NodeKind::Paragraph && !tree[id].has_children() {
            tree.unlink(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strong(tree: &mut Tree, parent: NodeId, text: &str) -> NodeId {
        let id = tree.append_new(parent, Node::new(NodeKind::Strong));
        tree.append_new(id, Node::with_tokens(NodeKind::StrongAsteriskOpenMarker, "**"));
        tree.append_new(id, Node::text(text));
        tree.append_new(id, Node::with_tokens(NodeKind::StrongAsteriskCloseMarker, "**"));
        id
    }

    #[test]
    fn test_merges_adjacent_runs() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        let a = strong(&mut tree, p, "a");
        let b = strong(&mut tree, p, "b");
        merge_with_previous(&mut tree, b);
        assert!(!tree.is_attached(b));
        let kinds: Vec<NodeKind> = tree.children(a).map(|c| tree[c].kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::StrongAsteriskOpenMarker,
                NodeKind::Text,
                NodeKind::Text,
                NodeKind::StrongAsteriskCloseMarker,
            ]
        );
    }

    #[test]
    fn test_runs_with_different_markers_stay_apart() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        strong(&mut tree, p, "a");
        let b = tree.append_new(p, Node::new(NodeKind::Strong));
        tree.append_new(b, Node::with_tokens(NodeKind::StrongUnderscoreOpenMarker, "__"));
        tree.append_new(b, Node::text("b"));
        merge_with_previous(&mut tree, b);
        assert!(tree.is_attached(b));
    }

    #[test]
    fn test_wraps_bare_inlines_and_drops_blank_runs() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_new(root, Node::text("  "));
        tree.append_new(root, Node::new(NodeKind::ThematicBreak));
        tree.append_new(root, Node::text("tail"));
        repair(&mut tree, Dialect::Wysiwyg);
        let kinds: Vec<NodeKind> = tree.children(root).map(|c| tree[c].kind).collect();
        assert_eq!(kinds, vec![NodeKind::ThematicBreak, NodeKind::Paragraph]);
    }

    #[test]
    fn test_nested_list_moves_into_previous_item() {
        let mut tree = Tree::new();
        let root = tree.root();
        let list = tree.append_new(root, Node::list(NodeKind::List, ListData::default()));
        let item = tree.append_new(list, Node::list(NodeKind::ListItem, ListData::default()));
        tree.append_new(item, Node::text("a"));
        let inner = tree.append_new(list, Node::list(NodeKind::List, ListData::default()));
        repair(&mut tree, Dialect::Html);
        assert_eq!(tree[inner].parent(), Some(item));
    }

    #[test]
    fn test_stray_item_gets_a_list() {
        let mut tree = Tree::new();
        let root = tree.root();
        let item = tree.append_new(root, Node::list(NodeKind::ListItem, ListData::default()));
        tree.append_new(item, Node::text("a"));
        repair(&mut tree, Dialect::Html);
        let parent = tree[item].parent().unwrap();
        assert_eq!(tree[parent].kind, NodeKind::List);
        assert_eq!(tree[parent].parent(), Some(root));
    }

    #[test]
    fn test_html_trims_paragraph_edges() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text(" a "));
        repair(&mut tree, Dialect::Html);
        assert_eq!(tree.text(p), "a");
    }
}
