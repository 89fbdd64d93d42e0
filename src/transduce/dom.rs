// Helpers over the html5ever DOM.

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Parse `html` as a full document. The returned DOM owns every node:
/// handles into it are only populated while it is alive.
pub(crate) fn parse(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

/// The `body` element of a parsed document.
pub(crate) fn body_of(dom: &RcDom) -> Option<Handle> {
    let html_el = children(&dom.document)
        .into_iter()
        .find(|c| tag(c) == Some("html"))?;
    children(&html_el).into_iter().find(|c| tag(c) == Some("body"))
}

/// Tag name of an element.
pub(crate) fn tag(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Whether `handle` is an element named `name`.
pub(crate) fn is(handle: &Handle, name: &str) -> bool {
    tag(handle) == Some(name)
}

/// Value of an attribute on an element node.
pub(crate) fn attr(handle: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Every attribute of an element, in document order.
pub(crate) fn attrs(handle: &Handle) -> Vec<(String, String)> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|a| (a.name.local.to_string(), a.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Value of an attribute, or "" when absent.
pub(crate) fn attr_or_empty(handle: &Handle, name: &str) -> String {
    attr(handle, name).unwrap_or_default()
}

pub(crate) fn has_attr(handle: &Handle, name: &str) -> bool {
    attr(handle, name).is_some()
}

/// Whether the `class` attribute contains `class` as a whole word.
pub(crate) fn has_class(handle: &Handle, class: &str) -> bool {
    attr(handle, "class").is_some_and(|c| c.split_whitespace().any(|w| w == class))
}

/// Contents of a text node.
pub(crate) fn text_of(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Snapshot of the children, so the DOM is not borrowed while visiting.
pub(crate) fn children(handle: &Handle) -> Vec<Handle> {
    handle.children.borrow().iter().cloned().collect()
}

/// Element children only.
pub(crate) fn element_children(handle: &Handle) -> Vec<Handle> {
    children(handle).into_iter().filter(|c| tag(c).is_some()).collect()
}

pub(crate) fn first_element_child(handle: &Handle) -> Option<Handle> {
    children(handle).into_iter().find(|c| tag(c).is_some())
}

pub(crate) fn parent(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    handle.parent.set(weak);
    parent
}

/// Siblings following `handle`, in order.
pub(crate) fn following_siblings(handle: &Handle) -> Vec<Handle> {
    let Some(parent) = parent(handle) else {
        return Vec::new();
    };
    let siblings = children(&parent);
    match siblings.iter().position(|s| std::rc::Rc::ptr_eq(s, handle)) {
        Some(i) => siblings[i + 1..].to_vec(),
        None => Vec::new(),
    }
}

/// Next sibling that is an element or non-blank text.
pub(crate) fn next_significant_sibling(handle: &Handle) -> Option<Handle> {
    following_siblings(handle)
        .into_iter()
        .find(|s| text_of(s).is_none_or(|t| !t.trim().is_empty()))
}

/// First descendant element, in document order, matching `pred`.
pub(crate) fn find(handle: &Handle, pred: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    for child in element_children(handle) {
        if pred(&child) {
            return Some(child);
        }
        if let Some(found) = find(&child, pred) {
            return Some(found);
        }
    }
    None
}

/// Text content of a subtree as the editor shows it: nodes the editor
/// renders itself (`data-render="1"|"2"`) and `svg` are skipped, `br`
/// counts as a newline.
pub(crate) fn dom_text(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            let local: &str = name.local.as_ref();
            if local == "svg" {
                return;
            }
            if matches!(attr(handle, "data-render").as_deref(), Some("1" | "2")) {
                return;
            }
            if local == "br" {
                out.push('\n');
                return;
            }
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

/// Serialized HTML of the element itself and its subtree.
pub(crate) fn outer_html(handle: &Handle) -> String {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let node: SerializableHandle = handle.clone().into();
    if serialize(&mut bytes, &node, opts).is_err() {
        return String::new();
    }
    String::from_utf8(bytes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_body_of_fragment() {
        let dom = parse("<p>a</p>");
        let body = body_of(&dom).unwrap();
        assert_eq!(element_children(&body).len(), 1);
        assert!(is(&element_children(&body)[0], "p"));
    }

    #[test]
    fn test_dom_text_skips_rendered_previews() {
        let dom = parse("<p>a<span data-render=\"2\">x</span><br>b<svg><text>s</text></svg></p>");
        let body = body_of(&dom).unwrap();
        assert_eq!(dom_text(&body), "a\nb");
    }

    #[test]
    fn test_class_match_is_per_word() {
        let dom = parse("<div class=\"protyle-attr--name x\"></div>");
        let body = body_of(&dom).unwrap();
        let div = first_element_child(&body).unwrap();
        assert!(has_class(&div, "x"));
        assert!(!has_class(&div, "protyle-attr"));
    }

    #[test]
    fn test_outer_html_round_trips_element() {
        let dom = parse("<kbd>Ctrl</kbd>");
        let body = body_of(&dom).unwrap();
        let kbd = first_element_child(&body).unwrap();
        assert_eq!(outer_html(&kbd), "<kbd>Ctrl</kbd>");
    }

    #[test]
    fn test_find_and_attrs() {
        let dom = parse("<div><span a=\"1\" b=\"2\"><i>x</i></span></div>");
        let body = body_of(&dom).unwrap();
        let i = find(&body, &|h| is(h, "i")).unwrap();
        assert_eq!(dom_text(&i), "x");
        let span = find(&body, &|h| is(h, "span")).unwrap();
        assert_eq!(
            attrs(&span),
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_siblings() {
        let dom = parse("<p>a</p> <ul></ul>");
        let body = body_of(&dom).unwrap();
        let p = first_element_child(&body).unwrap();
        assert!(following_siblings(&p).first().and_then(text_of).is_some());
        assert!(next_significant_sibling(&p).is_some_and(|s| is(&s, "ul")));
    }
}
