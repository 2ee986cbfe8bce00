//! Word-processor document model and the composer that builds it from an
//! element tree.

use aied_core::{Block, ElementTree, InlineRun, List};
use serde::{Deserialize, Serialize};

/// Left indent of a top-level list item, in points. Nested lists add this
/// much again per level.
pub const LIST_INDENT_PT: u32 = 20;

/// Font size of the heading style, in points.
pub const HEADING_SIZE_PT: u32 = 16;

/// A document as an ordered sequence of styled paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a paragraph and return it for further editing.
    pub fn add_paragraph(&mut self, style: ParagraphStyle) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::new(style));
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }
}

/// Paragraph-level style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphStyle {
    Normal,
    /// Bold, larger text. The level is kept as the outline level.
    Heading { level: u8 },
}

/// One paragraph with its runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    /// Left indent in points.
    pub indent_pt: Option<u32>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            indent_pt: None,
            runs: Vec::new(),
        }
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A span of text with character formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }
}

impl From<&InlineRun> for Run {
    fn from(run: &InlineRun) -> Self {
        Self {
            text: run.text.clone(),
            bold: run.bold,
            italic: run.italic,
        }
    }
}

/// Walks an element tree and lays it out as document paragraphs.
#[derive(Debug, Clone, Default)]
pub struct DocumentComposer;

impl DocumentComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose a document from `tree`, one paragraph per block or list item.
    pub fn compose(&self, tree: &ElementTree) -> Document {
        let mut doc = Document::new();

        for block in &tree.blocks {
            match block {
                Block::Heading { level, runs } => {
                    let paragraph = doc.add_paragraph(ParagraphStyle::Heading { level: *level });
                    copy_runs(paragraph, runs);
                }
                Block::Paragraph { runs } => {
                    let paragraph = doc.add_paragraph(ParagraphStyle::Normal);
                    copy_runs(paragraph, runs);
                }
                Block::List(list) => add_list(&mut doc, list, 1),
            }
        }

        log::debug!("Composed document with {} paragraphs", doc.paragraphs.len());
        doc
    }
}

fn add_list(doc: &mut Document, list: &List, depth: u32) {
    for item in &list.items {
        let paragraph = doc.add_paragraph(ParagraphStyle::Normal);
        paragraph.indent_pt = Some(LIST_INDENT_PT * depth);
        paragraph.add_run(Run::new(item.prefix.clone()));
        copy_runs(paragraph, &item.runs);

        for sublist in &item.sublists {
            add_list(doc, sublist, depth + 1);
        }
    }
}

fn copy_runs(paragraph: &mut Paragraph, runs: &[InlineRun]) {
    paragraph.runs.extend(runs.iter().map(Run::from));
}

#[cfg(test)]
mod tests {
    use super::*;
    use aied_core::MarkdownNormalizer;

    fn compose(markdown: &str) -> Document {
        let tree = MarkdownNormalizer::new().normalize(markdown);
        DocumentComposer::new().compose(&tree)
    }

    #[test]
    fn test_heading_and_bullets() {
        let doc = compose("## Title\n\n- one\n- two");

        assert_eq!(doc.paragraphs.len(), 3);
        assert_eq!(doc.paragraphs[0].style, ParagraphStyle::Heading { level: 2 });
        assert_eq!(doc.paragraphs[0].text(), "Title");
        assert_eq!(doc.paragraphs[0].indent_pt, None);

        for (paragraph, text) in doc.paragraphs[1..].iter().zip(["one", "two"]) {
            assert_eq!(paragraph.style, ParagraphStyle::Normal);
            assert_eq!(paragraph.indent_pt, Some(LIST_INDENT_PT));
            assert_eq!(paragraph.runs[0], Run::new("• "));
            assert_eq!(paragraph.text(), format!("• {}", text));
        }
    }

    #[test]
    fn test_one_paragraph_per_block_in_order() {
        let doc = compose("# One\n\nTwo\n\n### Three\n\nFour");
        let texts: Vec<String> = doc.paragraphs.iter().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["One", "Two", "Three", "Four"]);
    }

    #[test]
    fn test_ordered_list_prefixes() {
        let doc = compose("1. a\n2. b\n\ntext\n\n1. c");
        let texts: Vec<String> = doc.paragraphs.iter().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["1. a", "2. b", "text", "1. c"]);
    }

    #[test]
    fn test_nested_list_indent() {
        let doc = compose("- outer\n  - inner\n- last");

        assert_eq!(doc.paragraphs.len(), 3);
        assert_eq!(doc.paragraphs[1].text(), "• inner");
        assert_eq!(doc.paragraphs[1].indent_pt, Some(LIST_INDENT_PT * 2));
        assert_eq!(doc.paragraphs[2].indent_pt, Some(LIST_INDENT_PT));
    }

    #[test]
    fn test_run_flags_copied() {
        let doc = compose("# A **bold** *move*\n\n- *it* works");

        let heading = &doc.paragraphs[0];
        assert!(heading.runs[1].bold && !heading.runs[1].italic);
        assert!(heading.runs[3].italic && !heading.runs[3].bold);

        let item = &doc.paragraphs[1];
        assert!(!item.runs[0].italic);
        assert_eq!(item.runs[1].text, "it");
        assert!(item.runs[1].italic);
    }

    #[test]
    fn test_empty_tree() {
        assert!(compose("").paragraphs.is_empty());
    }
}
