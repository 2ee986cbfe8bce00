//! Word (.docx) export for chat content.
//!
//! Markdown is normalized into an element tree, composed into a
//! [`Document`], and serialized as a WordprocessingML package in memory.

pub mod document;
pub mod reader;
pub mod writer;

pub use document::{Document, DocumentComposer, Paragraph, ParagraphStyle, Run};
pub use reader::DocxReader;
pub use writer::DocxWriter;

use aied_core::{Block, ElementTree, InlineRun, MarkdownNormalizer, Result};

/// Convert markdown text straight to `.docx` bytes.
///
/// The first heading, if any, becomes the document title.
pub fn export_markdown(markdown: &str) -> Result<Vec<u8>> {
    let tree = MarkdownNormalizer::new().normalize(markdown);
    let doc = DocumentComposer::new().compose(&tree);
    let writer = match first_heading(&tree) {
        Some(title) => DocxWriter::new().with_title(title),
        None => DocxWriter::new(),
    };
    writer.write(&doc)
}

fn first_heading(tree: &ElementTree) -> Option<String> {
    tree.blocks.iter().find_map(|block| match block {
        Block::Heading { runs, .. } => {
            let text = InlineRun::plain_text(runs).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aied_core::package::{open_package, read_part};

    fn round_trip(markdown: &str) -> Document {
        let bytes = export_markdown(markdown).unwrap();
        DocxReader::new().read(&bytes).unwrap()
    }

    #[test]
    fn test_export_heading_and_bullets() {
        let doc = round_trip("## Title\n\n- one\n- two");

        assert_eq!(doc.paragraphs.len(), 3);
        assert!(matches!(doc.paragraphs[0].style, ParagraphStyle::Heading { level: 2 }));
        assert_eq!(doc.paragraphs[0].text(), "Title");
        assert_eq!(doc.paragraphs[1].text(), "• one");
        assert_eq!(doc.paragraphs[2].text(), "• two");
        assert_eq!(doc.paragraphs[2].indent_pt, Some(document::LIST_INDENT_PT));
    }

    #[test]
    fn test_bold_italic_survive_export() {
        let doc = round_trip("Some **strong** and *soft* and ***both*** words");
        let runs = &doc.paragraphs[0].runs;

        let flags: Vec<(&str, bool, bool)> = runs
            .iter()
            .map(|r| (r.text.as_str(), r.bold, r.italic))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("Some ", false, false),
                ("strong", true, false),
                (" and ", false, false),
                ("soft", false, true),
                (" and ", false, false),
                ("both", true, true),
                (" words", false, false),
            ]
        );
    }

    #[test]
    fn test_paragraph_per_block_preserves_order() {
        let markdown = "# Lesson\n\nIntro text.\n\n1. first\n2. second\n\n## Wrap up\n\nBye.";
        let doc = round_trip(markdown);
        let texts: Vec<String> = doc.paragraphs.iter().map(Paragraph::text).collect();
        assert_eq!(
            texts,
            vec!["Lesson", "Intro text.", "1. first", "2. second", "Wrap up", "Bye."]
        );
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let bytes = export_markdown("Before\u{1}after \u{C} page").unwrap();
        let mut archive = open_package(&bytes).unwrap();
        let xml = read_part(&mut archive, "word/document.xml").unwrap();
        assert!(!xml.chars().any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')));

        let doc = DocxReader::new().read(&bytes).unwrap();
        assert_eq!(doc.paragraphs[0].text(), "Beforeafter  page");
    }

    #[test]
    fn test_first_heading_becomes_title() {
        let bytes = export_markdown("Intro\n\n## Water *cycle*\n\n# Later").unwrap();
        let mut archive = open_package(&bytes).unwrap();
        let core = read_part(&mut archive, "docProps/core.xml").unwrap();
        assert!(core.contains("<dc:title>Water cycle</dc:title>"));

        let bytes = export_markdown("no headings").unwrap();
        let mut archive = open_package(&bytes).unwrap();
        let core = read_part(&mut archive, "docProps/core.xml").unwrap();
        assert!(core.contains("<dc:title>Exported content</dc:title>"));
    }

    #[test]
    fn test_empty_markdown_still_valid_package() {
        let doc = round_trip("");
        assert!(doc.paragraphs.is_empty());
    }
}
