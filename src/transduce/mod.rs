// DOM → tree transduction.
//
// Four input dialects share one walk: html5ever parses the input, the
// builder visits the body in pre-order with a stack of insertion points, and
// the dialect's handler table decides what each element and text node turns
// into. A repair pass then reshapes what editor DOMs leave behind.

mod block;
mod builder;
mod common;
mod dom;
mod html;
mod ir;
mod repair;
mod table;
mod wysiwyg;

use std::fmt;
use std::str::FromStr;

use url::Url;

pub use builder::{Builder, Scope};
pub use table::{
    CloseHook, DialectTable, DialectTableBuilder, ElementHandler, Filter, Outcome, TextHandler,
};

use crate::ast::Tree;
use crate::sentinel::{CARET, FRONT_END_CARET};

/// Input DOM convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Arbitrary HTML.
    Html,
    /// WYSIWYG editor DOM.
    Wysiwyg,
    /// Instant-rendering editor DOM.
    Ir,
    /// Block editor DOM.
    Block,
}

impl Dialect {
    /// Every dialect.
    pub const ALL: [Dialect; 4] = [Dialect::Html, Dialect::Wysiwyg, Dialect::Ir, Dialect::Block];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Html => "html",
            Dialect::Wysiwyg => "wysiwyg",
            Dialect::Ir => "ir",
            Dialect::Block => "block",
        }
    }

    /// Editor dialects mark the caret and pad empty inlines with ZWSP.
    pub fn is_editor(self) -> bool {
        self != Dialect::Html
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown dialect `{s}` (expected html, wysiwyg, ir or block)"))
    }
}

/// Options of the DOM → tree direction.
#[derive(Debug, Clone, Default)]
pub struct TransduceOptions {
    /// Absolute prefix removed from link and image destinations.
    pub link_base: Option<Url>,
    /// Relative prefix removed from destinations after `link_base`.
    pub link_prefix: String,
    /// Keep the front-end caret (`<wbr>`) as the caret sentinel. The block
    /// dialect always keeps it.
    pub keep_caret: bool,
}

/// Build a tree from `html` written in `dialect`.
pub fn transduce(html: &str, dialect: Dialect, options: &TransduceOptions) -> Tree {
    transduce_with(html, DialectTable::of(dialect), options)
}

/// Build a tree from `html` with a custom handler table.
pub fn transduce_with(html: &str, table: &DialectTable, options: &TransduceOptions) -> Tree {
    let dialect = table.dialect();
    crate::log::debug!(dialect = dialect.name(), bytes = html.len(), "transducing");

    let keep_caret = options.keep_caret || dialect == Dialect::Block;
    let mut input = html.replace(FRONT_END_CARET, if keep_caret { CARET } else { "" });
    if dialect.is_editor() {
        input = input.replace("\t\n", "\n");
    }

    let mut builder = Builder::new(table, options);
    let dom = dom::parse(&input);
    match dom::body_of(&dom) {
        Some(body) => builder.visit_children(&body),
        None => {
            crate::log::warning!("input has no body");
        }
    }
    let mut tree = builder.into_tree();
    repair::repair(&mut tree, dialect);
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dialect_names_round_trip() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.name().parse::<Dialect>(), Ok(dialect));
        }
        assert!("markdown".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_caret_kept_only_on_request() {
        let html = "<p>a<wbr>b</p>";
        let dropped = transduce(html, Dialect::Wysiwyg, &TransduceOptions::default());
        assert_eq!(dropped.text(dropped.root()), "ab");
        let options = TransduceOptions { keep_caret: true, ..TransduceOptions::default() };
        let kept = transduce(html, Dialect::Wysiwyg, &options);
        assert_eq!(kept.text(kept.root()), format!("a{CARET}b"));
    }

    #[test]
    fn test_block_dialect_always_keeps_caret() {
        let html = "<div data-type=\"NodeParagraph\" class=\"p\"><div contenteditable=\"true\">x<wbr></div></div>";
        let tree = transduce(html, Dialect::Block, &TransduceOptions::default());
        assert_eq!(tree.text(tree.root()), format!("x{CARET}"));
    }

    #[test]
    fn test_custom_handler_overrides_builtin() {
        fn drop_all(_: &mut Builder<'_>, _: &markup5ever_rcdom::Handle) -> Outcome {
            Outcome::Discard
        }
        let table = DialectTable::of(Dialect::Html).clone().with_element("p", drop_all);
        let tree = transduce_with("<p>gone</p><h1>kept</h1>", &table, &TransduceOptions::default());
        let kinds: Vec<NodeKind> = tree.children(tree.root()).map(|c| tree[c].kind).collect();
        assert_eq!(kinds, vec![NodeKind::Heading]);
    }

    #[test]
    fn test_empty_input_gives_empty_document() {
        let tree = transduce("", Dialect::Html, &TransduceOptions::default());
        assert!(tree[tree.root()].first_child().is_none());
    }
}
