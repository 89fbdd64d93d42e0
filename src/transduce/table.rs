// Dialect handler tables.
//
// A dialect is nothing but a table: element handlers keyed by tag name, one
// handler for text nodes and a list of filters deciding which DOM nodes the
// dialect never looks at. The walk in `builder` is shared by all of them.

use std::collections::HashMap;
use std::fmt;

use markup5ever_rcdom::Handle;

use super::builder::Builder;
use super::Dialect;
use crate::ast::NodeId;

/// What an element handler did with its element.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// Nothing was emitted and the children are skipped.
    Discard,
    /// The element was converted as a whole, children included.
    Emitted,
    /// The element contributes nothing itself; its children are visited
    /// against the current tip.
    Descend,
    /// The handler appended a container to the tip. Children are visited
    /// with the container as tip, then the optional hook runs before the
    /// tip is popped.
    Open(NodeId, Option<CloseHook>),
}

/// Converts one element.
pub type ElementHandler = fn(&mut Builder<'_>, &Handle) -> Outcome;

/// Converts one text node; receives the node and its contents.
pub type TextHandler = fn(&mut Builder<'_>, &Handle, String);

/// Returns `true` for nodes the dialect skips entirely.
pub type Filter = fn(&Handle) -> bool;

/// Runs after the children of an opened container were visited, while the
/// container is still the tip.
pub type CloseHook = fn(&mut Builder<'_>, &Handle, NodeId);

/// Handler table of one input dialect.
#[derive(Clone)]
pub struct DialectTable {
    pub(crate) dialect: Dialect,
    pub(crate) elements: HashMap<&'static str, ElementHandler>,
    pub(crate) text: TextHandler,
    pub(crate) filters: Vec<Filter>,
}

impl fmt::Debug for DialectTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.elements.keys().collect();
        tags.sort();
        f.debug_struct("DialectTable")
            .field("dialect", &self.dialect)
            .field("elements", &tags)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl DialectTable {
    /// Start an empty table for `dialect`. Text is dropped until a text
    /// handler is set.
    pub fn builder(dialect: Dialect) -> DialectTableBuilder {
        DialectTableBuilder {
            table: DialectTable {
                dialect,
                elements: HashMap::new(),
                text: ignore_text,
                filters: Vec::new(),
            },
        }
    }

    /// The built-in table of `dialect`.
    pub fn of(dialect: Dialect) -> &'static DialectTable {
        match dialect {
            Dialect::Html => &super::html::TABLE,
            Dialect::Wysiwyg => &super::wysiwyg::TABLE,
            Dialect::Ir => &super::ir::TABLE,
            Dialect::Block => &super::block::TABLE,
        }
    }

    /// Copy of this table with `handler` registered for `tag`, replacing a
    /// built-in one.
    pub fn with_element(mut self, tag: &'static str, handler: ElementHandler) -> Self {
        self.elements.insert(tag, handler);
        self
    }

    /// Copy of this table with an extra filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Dialect whose conventions the handlers follow.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn element(&self, tag: &str) -> Option<ElementHandler> {
        self.elements.get(tag).copied()
    }

    pub(crate) fn skips(&self, node: &Handle) -> bool {
        self.filters.iter().any(|f| f(node))
    }
}

/// Incremental constructor for a [`DialectTable`].
#[derive(Debug)]
pub struct DialectTableBuilder {
    table: DialectTable,
}

impl DialectTableBuilder {
    /// Register `handler` for each tag in `tags`.
    pub fn element(mut self, tags: &[&'static str], handler: ElementHandler) -> Self {
        for tag in tags {
            self.table.elements.insert(tag, handler);
        }
        self
    }

    pub fn text(mut self, handler: TextHandler) -> Self {
        self.table.text = handler;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.table.filters.push(filter);
        self
    }

    pub fn build(self) -> DialectTable {
        self.table
    }
}

fn ignore_text(_: &mut Builder<'_>, _: &Handle, _: String) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn discard(_: &mut Builder<'_>, _: &Handle) -> Outcome {
        Outcome::Discard
    }

    #[test]
    fn test_builder_registers_every_tag() {
        let table = DialectTable::builder(Dialect::Html)
            .element(&["b", "strong"], discard)
            .build();
        assert!(table.element("b").is_some());
        assert!(table.element("strong").is_some());
        assert!(table.element("em").is_none());
    }

    #[test]
    fn test_with_element_overrides_builtin() {
        let table = DialectTable::of(Dialect::Html).clone();
        assert!(table.element("p").is_some());
        let table = table.with_element("custom-widget", discard);
        assert!(table.element("custom-widget").is_some());
        assert_eq!(table.dialect(), Dialect::Html);
    }
}
