//! Domain types shared by the chat front-end and the export pipeline.

use serde::{Deserialize, Serialize};

/// Parsed markdown, independent of any output format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTree {
    /// Top-level blocks in document order.
    pub blocks: Vec<Block>,
}

impl ElementTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Whether the tree holds no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of every block, joined with single spaces.
    ///
    /// List items contribute their own text without prefixes.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading { runs, .. } | Block::Paragraph { runs } => {
                    parts.push(InlineRun::plain_text(runs));
                }
                Block::List(list) => {
                    list.visit_items(&mut |item| parts.push(InlineRun::plain_text(&item.runs)));
                }
            }
        }
        parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Text of every list item in the tree, any list type, nested included.
    pub fn list_item_texts(&self) -> Vec<String> {
        let mut texts = Vec::new();
        for block in &self.blocks {
            if let Block::List(list) = block {
                list.visit_items(&mut |item| {
                    texts.push(InlineRun::plain_text(&item.runs).trim().to_string())
                });
            }
        }
        texts
    }
}

/// A block-level element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// Heading, level 1 through 6.
    Heading { level: u8, runs: Vec<InlineRun> },
    /// Ordinary paragraph, also used for blocks we don't otherwise recognize.
    Paragraph { runs: Vec<InlineRun> },
    /// Ordered or unordered list.
    List(List),
}

/// A list and its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// Numbered (`1. `) rather than bulleted.
    pub ordered: bool,
    /// Items in source order.
    pub items: Vec<ListItem>,
}

impl List {
    /// Create an empty list.
    pub fn new(ordered: bool) -> Self {
        Self {
            ordered,
            items: Vec::new(),
        }
    }

    /// Prefix for the item at 1-based position `ordinal`.
    pub fn prefix_for(&self, ordinal: usize) -> String {
        if self.ordered {
            format!("{}. ", ordinal)
        } else {
            BULLET_PREFIX.to_string()
        }
    }

    /// Visit every item depth-first, parents before their sub-lists.
    pub fn visit_items(&self, f: &mut dyn FnMut(&ListItem)) {
        for item in &self.items {
            f(item);
            for sublist in &item.sublists {
                sublist.visit_items(f);
            }
        }
    }
}

/// Prefix rendered in front of unordered list items.
pub const BULLET_PREFIX: &str = "• ";

/// One list item with its rendered prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// 1-based position within the owning list.
    pub ordinal: usize,
    /// `"• "` or `"<n>. "`.
    pub prefix: String,
    /// Inline content of the item itself.
    pub runs: Vec<InlineRun>,
    /// Lists nested inside this item.
    pub sublists: Vec<List>,
}

/// A span of text with inline emphasis flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl InlineRun {
    /// Unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    /// Run with explicit flags.
    pub fn styled(text: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            text: text.into(),
            bold,
            italic,
        }
    }

    /// Concatenated text of a run sequence.
    pub fn plain_text(runs: &[InlineRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single transcript entry, also the wire shape of the chat API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Message from the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Message from the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Downloadable document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Word-processor document (.docx).
    Word,
    /// Slide deck (.pptx).
    PowerPoint,
}

impl ExportFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "docx" => Some(Self::Word),
            "pptx" => Some(Self::PowerPoint),
            _ => None,
        }
    }

    /// File name offered for download.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Word => "exported_content.docx",
            Self::PowerPoint => "presentation.pptx",
        }
    }

    /// MIME type offered for download.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::PowerPoint => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }
}

/// Which slide layout a record is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideLayout {
    /// Title plus subtitle; only used for the empty-deck fallback.
    Title,
    /// Title plus a bulleted body.
    TitleAndContent,
}

/// One slide's title and body lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    pub layout: SlideLayout,
    /// Never empty.
    pub title: String,
    /// Bullet lines, or the subtitle for [`SlideLayout::Title`].
    pub body: Vec<String>,
}

impl SlideRecord {
    /// Title-and-content slide.
    pub fn content(title: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            layout: SlideLayout::TitleAndContent,
            title: title.into(),
            body,
        }
    }

    /// Title slide with a subtitle.
    pub fn title_only(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            layout: SlideLayout::Title,
            title: title.into(),
            body: vec![subtitle.into()],
        }
    }
}

/// The slides of a deck, ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckOutline {
    /// At least one slide.
    pub slides: Vec<SlideRecord>,
    /// Model output segments dropped for lacking a `bullet points:` marker.
    pub skipped_segments: usize,
}

impl DeckOutline {
    /// Whether this deck is the synthesized single-slide fallback.
    pub fn is_fallback(&self) -> bool {
        self.slides.len() == 1 && self.slides[0].layout == SlideLayout::Title
    }
}
