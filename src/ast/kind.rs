// Node kinds.
//
// One closed enum for every node the tree can hold. Containers own children;
// marker kinds exist so that the exact surface syntax (delimiter style, fence
// length, literal spacing) can be reproduced on output.

use std::fmt;
use std::str::FromStr;

macro_rules! node_kinds {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        /// Discriminant of a [`Node`](super::Node).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum NodeKind {
            $($(#[$doc])* $name,)+
        }

        impl NodeKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$name,)+];

            /// Stable name used by the JSON renderer and the block DOM
            /// `data-type` attribute (prefixed with `Node` there).
            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$name => stringify!($name),)+
                }
            }
        }
    };
}

node_kinds! {
    /// Root of every tree.
    Document,
    Paragraph,
    Heading,
    /// `#` run of an ATX heading.
    HeadingMarker,
    /// Custom heading id (`{#id}`).
    HeadingId,
    ThematicBreak,
    Blockquote,
    BlockquoteMarker,
    List,
    ListItem,
    TaskListItemMarker,
    HtmlBlock,
    InlineHtml,
    CodeBlock,
    CodeBlockFenceOpenMarker,
    CodeBlockFenceInfoMarker,
    CodeBlockCode,
    CodeBlockFenceCloseMarker,
    Text,
    Emphasis,
    EmAsteriskOpenMarker,
    EmAsteriskCloseMarker,
    EmUnderscoreOpenMarker,
    EmUnderscoreCloseMarker,
    Strong,
    StrongAsteriskOpenMarker,
    StrongAsteriskCloseMarker,
    StrongUnderscoreOpenMarker,
    StrongUnderscoreCloseMarker,
    CodeSpan,
    CodeSpanOpenMarker,
    CodeSpanContent,
    CodeSpanCloseMarker,
    HardBreak,
    SoftBreak,
    Link,
    Image,
    Bang,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    LinkText,
    LinkDest,
    LinkSpace,
    LinkTitle,
    HtmlEntity,
    Strikethrough,
    Strikethrough1OpenMarker,
    Strikethrough1CloseMarker,
    Strikethrough2OpenMarker,
    Strikethrough2CloseMarker,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Emoji,
    EmojiUnicode,
    EmojiImg,
    EmojiAlias,
    MathBlock,
    MathBlockOpenMarker,
    MathBlockContent,
    MathBlockCloseMarker,
    InlineMath,
    InlineMathOpenMarker,
    InlineMathContent,
    InlineMathCloseMarker,
    Backslash,
    BackslashContent,
    FootnotesDefBlock,
    FootnotesDef,
    FootnotesRef,
    Toc,
    YamlFrontMatter,
    YamlFrontMatterOpenMarker,
    YamlFrontMatterContent,
    YamlFrontMatterCloseMarker,
    Mark,
    Mark1OpenMarker,
    Mark1CloseMarker,
    Mark2OpenMarker,
    Mark2CloseMarker,
    Sup,
    SupOpenMarker,
    SupCloseMarker,
    Sub,
    SubOpenMarker,
    SubCloseMarker,
    /// Block inline attribute list (`{: id="…"}`).
    KramdownBlockIal,
    /// Span inline attribute list following an inline node.
    KramdownSpanIal,
    LinkRefDefBlock,
    LinkRefDef,
    SuperBlock,
    SuperBlockOpenMarker,
    SuperBlockLayoutMarker,
    SuperBlockCloseMarker,
}

impl NodeKind {
    /// Block-level kinds.
    pub fn is_block(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Document
                | Paragraph
                | Heading
                | ThematicBreak
                | Blockquote
                | List
                | ListItem
                | HtmlBlock
                | CodeBlock
                | Table
                | MathBlock
                | FootnotesDefBlock
                | FootnotesDef
                | Toc
                | YamlFrontMatter
                | LinkRefDefBlock
                | SuperBlock
        )
    }

    /// Blocks that hold other blocks.
    pub fn is_container_block(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Document | Blockquote | List | ListItem | FootnotesDefBlock | FootnotesDef | SuperBlock
        )
    }

    /// Delimiter and punctuation kinds that only reproduce surface syntax.
    pub fn is_marker(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            HeadingMarker
                | BlockquoteMarker
                | CodeBlockFenceOpenMarker
                | CodeBlockFenceInfoMarker
                | CodeBlockFenceCloseMarker
                | EmAsteriskOpenMarker
                | EmAsteriskCloseMarker
                | EmUnderscoreOpenMarker
                | EmUnderscoreCloseMarker
                | StrongAsteriskOpenMarker
                | StrongAsteriskCloseMarker
                | StrongUnderscoreOpenMarker
                | StrongUnderscoreCloseMarker
                | CodeSpanOpenMarker
                | CodeSpanCloseMarker
                | Bang
                | OpenBracket
                | CloseBracket
                | OpenParen
                | CloseParen
                | LinkSpace
                | Strikethrough1OpenMarker
                | Strikethrough1CloseMarker
                | Strikethrough2OpenMarker
                | Strikethrough2CloseMarker
                | MathBlockOpenMarker
                | MathBlockCloseMarker
                | InlineMathOpenMarker
                | InlineMathCloseMarker
                | YamlFrontMatterOpenMarker
                | YamlFrontMatterCloseMarker
                | Mark1OpenMarker
                | Mark1CloseMarker
                | Mark2OpenMarker
                | Mark2CloseMarker
                | SupOpenMarker
                | SupCloseMarker
                | SubOpenMarker
                | SubCloseMarker
                | SuperBlockOpenMarker
                | SuperBlockLayoutMarker
                | SuperBlockCloseMarker
        )
    }

    /// Inline containers whose adjacent fragments are merged back together.
    pub fn is_delimited_run(self) -> bool {
        use NodeKind::*;
        matches!(self, Emphasis | Strong | Strikethrough | Mark | Sup | Sub)
    }

    /// Inline attribute lists, which break adjacency for run merging.
    pub fn is_ial(self) -> bool {
        matches!(self, NodeKind::KramdownBlockIal | NodeKind::KramdownSpanIal)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node kind `{}`", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for NodeKind {
    type Err = UnknownKind;

    /// Accepts both `Paragraph` and the prefixed `NodeParagraph` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix("Node").unwrap_or(s);
        NodeKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == bare)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
