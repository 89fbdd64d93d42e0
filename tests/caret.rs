// The caret sentinel survives every conversion at the position the editor
// put it.

mod common;

use common::md_with_caret;
use mdbridge::{dom_to_markdown, spin, Dialect, Options};
use pretty_assertions::assert_eq;

#[test]
fn test_caret_inside_text() {
    assert_eq!(md_with_caret("<p>ab<wbr>c</p>", Dialect::Wysiwyg), "ab\u{2038}c\n");
}

#[test]
fn test_caret_dropped_without_keep_caret() {
    assert_eq!(dom_to_markdown("<p>ab<wbr>c</p>", Dialect::Wysiwyg).unwrap(), "abc\n");
}

#[test]
fn test_caret_at_end_of_strong() {
    let out = md_with_caret("<p><strong data-marker=\"**\">b<wbr></strong></p>", Dialect::Wysiwyg);
    assert_eq!(out, "**b\u{2038}**\n");
}

#[test]
fn test_caret_only_strong_collapses() {
    let out = md_with_caret("<p>a<strong data-marker=\"**\"><wbr></strong></p>", Dialect::Wysiwyg);
    assert_eq!(out, "a\u{2038}\n");
}

#[test]
fn test_caret_in_new_list_item() {
    let dom = "<ul data-tight=\"true\" data-marker=\"*\" data-block=\"0\">\
               <li data-marker=\"*\">a</li><li data-marker=\"*\"><wbr></li></ul>";
    assert_eq!(md_with_caret(dom, Dialect::Wysiwyg), "* a\n* \u{2038}\n");
}

#[test]
fn test_caret_in_table_cell() {
    let dom = "<table data-block=\"0\"><thead><tr><th>a<wbr></th></tr></thead>\
               <tbody><tr><td>b</td></tr></tbody></table>";
    let out = md_with_caret(dom, Dialect::Wysiwyg);
    assert!(out.contains("| a\u{2038} |"), "{out:?}");
}

#[test]
fn test_block_dialect_always_keeps_caret() {
    let dom = "<div data-node-id=\"1\" data-type=\"NodeParagraph\" class=\"p\">\
               <div contenteditable=\"true\">ab<wbr>c</div></div>";
    assert_eq!(dom_to_markdown(dom, Dialect::Block).unwrap(), "ab\u{2038}c\n");
}

#[test]
fn test_spin_restores_front_end_caret() {
    for dialect in [Dialect::Wysiwyg, Dialect::Ir] {
        let out = spin(
            "<p>a <strong data-marker=\"**\">b<wbr></strong></p>",
            dialect,
            &Options::default(),
        )
        .unwrap();
        assert!(out.contains("b<wbr>"), "{dialect}: {out}");
        assert!(!out.contains('\u{2038}'), "{dialect}: {out}");
    }
}
