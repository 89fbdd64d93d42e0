// Plain HTML, as found on web pages and in clipboard payloads.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;

use super::common::*;
use super::dom;
use super::table::DialectTable;
use super::Dialect;

pub(crate) static TABLE: LazyLock<DialectTable> = LazyLock::new(|| {
    DialectTable::builder(Dialect::Html)
        .text(text)
        .element(&["p"], paragraph)
        .element(&["div", "section", "article", "main", "header", "footer", "figure"], div)
        .element(&["h1", "h2", "h3", "h4", "h5", "h6"], heading)
        .element(&["hr"], thematic_break)
        .element(&["blockquote"], blockquote)
        .element(&["ul", "ol"], list)
        .element(&["li"], list_item)
        .element(&["input"], input)
        .element(&["table"], table)
        .element(&["thead"], table_head)
        .element(&["tbody", "tfoot"], descend)
        .element(&["tr"], table_row)
        .element(&["th", "td"], table_cell)
        .element(&["pre"], pre)
        .element(&["code", "tt"], code)
        .element(&["em", "i", "strong", "b", "s", "del", "strike", "mark", "sup", "sub"], delimited)
        .element(&["a"], link)
        .element(&["img"], image)
        .element(&["br"], line_break)
        .element(&["u"], underline)
        .element(&["kbd"], inline_html)
        .element(&["details", "iframe", "video", "audio"], raw_html)
        .element(&["button", "select", "textarea", "noscript"], discard)
        .filter(is_non_content)
        .filter(is_hidden_preview)
        .build()
});

/// Markup a page marks as not rendered.
fn is_hidden_preview(node: &Handle) -> bool {
    dom::attr(node, "data-render").as_deref() == Some("false")
}
