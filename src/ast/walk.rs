// Depth-first traversal with enter/exit callbacks.

use super::{NodeId, Tree};

/// Signal returned by a visitor to steer the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    /// Descend into children (on entry) or carry on (on exit).
    Continue,
    /// Do not descend; the node's exit callback still runs.
    SkipChildren,
    /// Abort the whole walk. No further callbacks are made.
    Stop,
}

/// Walk the subtree at `id` in pre-order, calling `visitor(tree, node,
/// entering)` once on entry and once on exit of every node.
///
/// Returns `Stop` if the visitor stopped the walk, `Continue` otherwise.
pub fn walk<F>(tree: &Tree, id: NodeId, visitor: &mut F) -> WalkStatus
where
    F: FnMut(&Tree, NodeId, bool) -> WalkStatus,
{
    match visitor(tree, id, true) {
        WalkStatus::Stop => return WalkStatus::Stop,
        WalkStatus::SkipChildren => {}
        WalkStatus::Continue => {
            let mut child = tree[id].first_child();
            while let Some(c) = child {
                if walk(tree, c, visitor) == WalkStatus::Stop {
                    return WalkStatus::Stop;
                }
                child = tree[c].next();
            }
        }
    }
    match visitor(tree, id, false) {
        WalkStatus::Stop => WalkStatus::Stop,
        _ => WalkStatus::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeKind};

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree.append_new(p, Node::text("a"));
        let em = tree.append_new(p, Node::new(NodeKind::Emphasis));
        tree.append_new(em, Node::text("b"));
        tree.append_new(root, Node::new(NodeKind::ThematicBreak));
        tree
    }

    fn trace(tree: &Tree, mut decide: impl FnMut(NodeKind, bool) -> WalkStatus) -> Vec<String> {
        let mut events = Vec::new();
        walk(tree, tree.root(), &mut |t: &Tree, id, entering| {
            let kind = t[id].kind;
            events.push(format!("{}{}", if entering { "+" } else { "-" }, kind));
            decide(kind, entering)
        });
        events
    }

    #[test]
    fn test_enter_exit_pairs_in_pre_order() {
        let tree = sample();
        let events = trace(&tree, |_, _| WalkStatus::Continue);
        assert_eq!(
            events,
            vec![
                "+Document", "+Paragraph", "+Text", "-Text", "+Emphasis", "+Text", "-Text",
                "-Emphasis", "-Paragraph", "+ThematicBreak", "-ThematicBreak", "-Document",
            ]
        );
    }

    #[test]
    fn test_skip_children_still_exits() {
        let tree = sample();
        let events = trace(&tree, |kind, _| {
            if kind == NodeKind::Emphasis {
                WalkStatus::SkipChildren
            } else {
                WalkStatus::Continue
            }
        });
        assert!(events.contains(&"+Emphasis".to_string()));
        assert!(events.contains(&"-Emphasis".to_string()));
        assert_eq!(events.iter().filter(|e| e.ends_with("Text")).count(), 2);
    }

    #[test]
    fn test_stop_truncates() {
        let tree = sample();
        let events = trace(&tree, |kind, entering| {
            if kind == NodeKind::Emphasis && entering {
                WalkStatus::Stop
            } else {
                WalkStatus::Continue
            }
        });
        assert_eq!(events.last().map(String::as_str), Some("+Emphasis"));
        let status = walk(&tree, tree.root(), &mut |t: &Tree, id, _| {
            if t[id].kind == NodeKind::Text {
                WalkStatus::Stop
            } else {
                WalkStatus::Continue
            }
        });
        assert_eq!(status, WalkStatus::Stop);
    }
}
