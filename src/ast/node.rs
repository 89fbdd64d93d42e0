// Node payloads.

use super::{NodeId, NodeKind};

/// List flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListType {
    /// `*`, `-` or `+` items.
    #[default]
    Bullet,
    /// `1.` or `1)` items.
    Ordered,
    /// Items starting with a checkbox; bulleted or numbered.
    Task,
}

/// List metadata, carried by both List and ListItem nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListData {
    pub list_type: ListType,
    /// Items render without blank lines between their blocks.
    pub tight: bool,
    /// Bullet byte for bulleted lists; `None` for numbered ones.
    pub bullet_char: Option<u8>,
    /// First number of an ordered list.
    pub start: u32,
    /// `.` or `)` for numbered items.
    pub delimiter: u8,
    /// Literal marker text, e.g. `*` or `3.`.
    pub marker: String,
    /// Number of a numbered item.
    pub num: u32,
}

impl Default for ListData {
    fn default() -> Self {
        Self {
            list_type: ListType::Bullet,
            tight: true,
            bullet_char: Some(b'*'),
            start: 1,
            delimiter: b'.',
            marker: "*".to_string(),
            num: 0,
        }
    }
}

impl ListData {
    /// Parse a literal item marker (`*`, `-`, `+`, `3.`, `1)`).
    pub fn from_marker(marker: &str) -> Self {
        let mut data = ListData {
            marker: marker.to_string(),
            ..ListData::default()
        };
        match marker.as_bytes() {
            [b @ (b'*' | b'-' | b'+')] => data.bullet_char = Some(*b),
            [digits @ .., delim @ (b'.' | b')')] if !digits.is_empty() => {
                data.list_type = ListType::Ordered;
                data.bullet_char = None;
                data.delimiter = *delim;
                data.num = std::str::from_utf8(digits)
                    .ok()
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(1);
                data.start = data.num;
            }
            _ => {}
        }
        data
    }

    /// Whether items are rendered with a number rather than a bullet.
    pub fn is_numbered(&self) -> bool {
        match self.list_type {
            ListType::Ordered => true,
            ListType::Task => self.bullet_char.is_none(),
            ListType::Bullet => false,
        }
    }

    /// Marker text an item of this list renders with.
    pub fn item_marker(&self) -> String {
        if self.is_numbered() {
            format!("{}{}", self.num, self.delimiter as char)
        } else {
            self.marker.clone()
        }
    }
}

/// Table column or cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Align {
    /// Read an HTML `align` attribute value.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "left" => Align::Left,
            "center" => Align::Center,
            "right" => Align::Right,
            _ => Align::None,
        }
    }

    /// The `align` attribute value, if any.
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Center => Some("center"),
            Align::Right => Some("right"),
        }
    }
}

/// How a link or image refers to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkType {
    /// `[text](dest)`.
    #[default]
    Inline,
    /// `[text][label]`, resolved through a link reference definition.
    Reference,
}

/// One node of a [`Tree`](super::Tree).
///
/// Auxiliary fields are only meaningful for the kinds noted on each.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Raw payload of leaf and marker kinds.
    pub tokens: String,
    /// List and ListItem.
    pub list: Option<ListData>,
    /// Heading: 1 to 6.
    pub heading_level: u8,
    /// Heading: underlined with `=` or `-`.
    pub heading_setext: bool,
    /// CodeBlock: fenced rather than indented.
    pub fenced: bool,
    /// CodeBlockFenceInfoMarker: the info string.
    pub code_block_info: String,
    /// CodeSpan: number of backticks in each delimiter.
    pub code_marker_len: usize,
    /// Table: per-column alignment.
    pub table_aligns: Vec<Align>,
    /// TableCell.
    pub cell_align: Align,
    /// TaskListItemMarker.
    pub task_checked: bool,
    /// Link and Image.
    pub link_type: LinkType,
    /// Link and Image of reference type; FootnotesRef and FootnotesDef label.
    pub link_ref_label: String,
    /// Inline attribute pairs carried over from the source DOM.
    pub ial: Vec<(String, String)>,
    /// Block id from the block DOM.
    pub id: String,

    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl Node {
    /// A node of `kind` with no payload.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            tokens: String::new(),
            list: None,
            heading_level: 0,
            heading_setext: false,
            fenced: false,
            code_block_info: String::new(),
            code_marker_len: 0,
            table_aligns: Vec::new(),
            cell_align: Align::None,
            task_checked: false,
            link_type: LinkType::Inline,
            link_ref_label: String::new(),
            ial: Vec::new(),
            id: String::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }

    /// A node of `kind` carrying `tokens`.
    pub fn with_tokens(kind: NodeKind, tokens: impl Into<String>) -> Self {
        Self {
            tokens: tokens.into(),
            ..Self::new(kind)
        }
    }

    /// A Text node.
    pub fn text(tokens: impl Into<String>) -> Self {
        Self::with_tokens(NodeKind::Text, tokens)
    }

    /// A Heading of the given level.
    pub fn heading(level: u8) -> Self {
        Self {
            heading_level: level.clamp(1, 6),
            ..Self::new(NodeKind::Heading)
        }
    }

    /// A List or ListItem carrying `data`.
    pub fn list(kind: NodeKind, data: ListData) -> Self {
        Self {
            list: Some(data),
            ..Self::new(kind)
        }
    }

    /// A fenced CodeBlock container (markers are added separately).
    pub fn code_block() -> Self {
        Self {
            fenced: true,
            ..Self::new(NodeKind::CodeBlock)
        }
    }

    /// A CodeSpan with `len` backticks per delimiter.
    pub fn code_span(len: usize) -> Self {
        Self {
            code_marker_len: len.max(1),
            ..Self::new(NodeKind::CodeSpan)
        }
    }

    /// A TableCell aligned `align`.
    pub fn table_cell(align: Align) -> Self {
        Self {
            cell_align: align,
            ..Self::new(NodeKind::TableCell)
        }
    }

    /// A TaskListItemMarker.
    pub fn task_marker(checked: bool) -> Self {
        Self {
            task_checked: checked,
            ..Self::new(NodeKind::TaskListItemMarker)
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Whether the node has any children.
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    /// Tight flag of a List (or of the list data a ListItem carries).
    pub fn is_tight(&self) -> bool {
        self.list.as_ref().is_some_and(|l| l.tight)
    }

    /// Set an inline attribute, replacing an existing value.
    pub fn set_ial(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.ial.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.ial.push((name.to_string(), value)),
        }
    }

    /// Look up an inline attribute.
    pub fn ial_value(&self, name: &str) -> Option<&str> {
        self.ial
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_marker_bullet() {
        let data = ListData::from_marker("-");
        assert_eq!(data.list_type, ListType::Bullet);
        assert_eq!(data.bullet_char, Some(b'-'));
        assert!(!data.is_numbered());
        assert_eq!(data.item_marker(), "-");
    }

    #[test]
    fn test_from_marker_ordered() {
        let data = ListData::from_marker("12)");
        assert_eq!(data.list_type, ListType::Ordered);
        assert_eq!(data.num, 12);
        assert_eq!(data.delimiter, b')');
        assert_eq!(data.item_marker(), "12)");
    }

    #[test]
    fn test_numbered_task() {
        let data = ListData {
            list_type: ListType::Task,
            bullet_char: None,
            num: 2,
            ..ListData::default()
        };
        assert!(data.is_numbered());
        assert_eq!(data.item_marker(), "2.");
    }

    #[test]
    fn test_align_attr() {
        assert_eq!(Align::from_attr("center"), Align::Center);
        assert_eq!(Align::from_attr("justify"), Align::None);
        assert_eq!(Align::Right.as_attr(), Some("right"));
        assert_eq!(Align::None.as_attr(), None);
    }

    #[test]
    fn test_ial_replace() {
        let mut node = Node::new(NodeKind::Paragraph);
        node.set_ial("id", "a");
        node.set_ial("id", "b");
        assert_eq!(node.ial_value("id"), Some("b"));
        assert_eq!(node.ial.len(), 1);
    }
}
