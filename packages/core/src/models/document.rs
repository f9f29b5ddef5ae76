//! Editor Document Model
//!
//! The rich-text editor works on an ordered tree of typed blocks. This module
//! mirrors the editor's JSON encoding so that legacy values stored as document
//! JSON can be decoded directly:
//!
//! ```json
//! [
//!   { "type": "h2", "children": [{ "text": "Title" }] },
//!   { "type": "p", "children": [{ "text": "bold", "bold": true }] }
//! ]
//! ```
//!
//! Documents are transient: they are serialized to Markdown before being
//! attached to a problem field (see [`crate::markdown`]).

use serde::{Deserialize, Serialize};

/// Block type tag as written by the editor
///
/// Unknown tags are kept as [`BlockKind::Other`] and render as paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedList,
    NumberedList,
    ListItem,
    /// List item content wrapper (`li > lic > text`)
    ListItemContent,
    CodeBlock,
    CodeLine,
    Blockquote,
    Other(String),
}

impl From<String> for BlockKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "p" => BlockKind::Paragraph,
            "h1" => BlockKind::Heading1,
            "h2" => BlockKind::Heading2,
            "h3" => BlockKind::Heading3,
            "ul" => BlockKind::BulletedList,
            "ol" => BlockKind::NumberedList,
            "li" => BlockKind::ListItem,
            "lic" => BlockKind::ListItemContent,
            "code_block" => BlockKind::CodeBlock,
            "code_line" => BlockKind::CodeLine,
            "blockquote" => BlockKind::Blockquote,
            _ => BlockKind::Other(tag),
        }
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.as_str().to_string()
    }
}

impl BlockKind {
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Heading3 => "h3",
            BlockKind::BulletedList => "ul",
            BlockKind::NumberedList => "ol",
            BlockKind::ListItem => "li",
            BlockKind::ListItemContent => "lic",
            BlockKind::CodeBlock => "code_block",
            BlockKind::CodeLine => "code_line",
            BlockKind::Blockquote => "blockquote",
            BlockKind::Other(tag) => tag,
        }
    }

    /// Heading level for `h1`..`h3`, `None` for every other kind
    pub fn heading_level(&self) -> Option<usize> {
        match self {
            BlockKind::Heading1 => Some(1),
            BlockKind::Heading2 => Some(2),
            BlockKind::Heading3 => Some(3),
            _ => None,
        }
    }

    /// Kind for a heading level, `None` outside 1..=3
    pub fn heading(level: usize) -> Option<Self> {
        match level {
            1 => Some(BlockKind::Heading1),
            2 => Some(BlockKind::Heading2),
            3 => Some(BlockKind::Heading3),
            _ => None,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A leaf run of text with its inline marks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    /// Markdown source kept as typed; written back without escaping
    #[serde(default, skip_serializing_if = "is_false")]
    pub raw: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Whether two runs carry the same marks and can be merged
    pub fn same_marks(&self, other: &TextRun) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.code == other.code
            && self.raw == other.raw
    }
}

/// A child of a block: either a text leaf or a nested block
///
/// Text is tried first: any object carrying a `text` field is a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    Text(TextRun),
    Block(Block),
}

impl From<TextRun> for Element {
    fn from(run: TextRun) -> Self {
        Element::Text(run)
    }
}

impl From<Block> for Element {
    fn from(block: Block) -> Self {
        Element::Block(block)
    }
}

/// A typed block node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    /// Language tag, only meaningful for code blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Element>) -> Self {
        Self {
            kind,
            lang: None,
            children,
        }
    }

    /// Block whose children are text runs
    pub fn with_runs(kind: BlockKind, runs: Vec<TextRun>) -> Self {
        Self::new(kind, runs.into_iter().map(Element::Text).collect())
    }

    pub fn paragraph(runs: Vec<TextRun>) -> Self {
        Self::with_runs(BlockKind::Paragraph, runs)
    }

    pub fn heading(level: usize, runs: Vec<TextRun>) -> Self {
        let kind = BlockKind::heading(level).unwrap_or(BlockKind::Paragraph);
        Self::with_runs(kind, runs)
    }

    pub fn blockquote(runs: Vec<TextRun>) -> Self {
        Self::with_runs(BlockKind::Blockquote, runs)
    }

    /// List block; each entry becomes an `li` holding the runs directly
    pub fn list(ordered: bool, items: Vec<Vec<TextRun>>) -> Self {
        let kind = if ordered {
            BlockKind::NumberedList
        } else {
            BlockKind::BulletedList
        };
        let children = items
            .into_iter()
            .map(|runs| Element::Block(Block::with_runs(BlockKind::ListItem, runs)))
            .collect();
        Self::new(kind, children)
    }

    /// Code block holding one `code_line` per line of `code`
    pub fn code_block(lang: Option<String>, code: &str) -> Self {
        let children = if code.is_empty() {
            Vec::new()
        } else {
            code.split('\n')
                .map(|line| {
                    Element::Block(Block::with_runs(
                        BlockKind::CodeLine,
                        vec![TextRun::plain(line)],
                    ))
                })
                .collect()
        };
        Self {
            kind: BlockKind::CodeBlock,
            lang: lang.filter(|l| !l.is_empty()),
            children,
        }
    }

    /// Concatenated raw text of all leaves below this block, marks ignored
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_plain_text(&self.children, &mut out);
        out
    }
}

fn collect_plain_text(children: &[Element], out: &mut String) {
    for child in children {
        match child {
            Element::Text(run) => out.push_str(&run.text),
            Element::Block(block) => collect_plain_text(&block.children, out),
        }
    }
}

/// An ordered sequence of blocks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The value the editor starts from when there is no content: one empty paragraph
    pub fn empty_paragraph() -> Self {
        Self::new(vec![Block::paragraph(vec![TextRun::plain("")])])
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self::new(blocks)
    }
}
