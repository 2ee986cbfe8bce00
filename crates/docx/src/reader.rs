//! Reads a `.docx` package back into the document model.
//!
//! Only what [`crate::DocxWriter`] emits is understood: paragraph style,
//! left indent, and bold/italic runs. Anything else is ignored.

use crate::document::{Document, Paragraph, ParagraphStyle, Run};
use crate::writer::{DOCUMENT_PART, HEADING_STYLE_ID};
use aied_core::package::{local_name, open_package, read_part};
use aied_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Reader for `.docx` packages.
pub struct DocxReader;

impl DocxReader {
    pub fn new() -> Self {
        Self
    }

    /// Read the paragraphs of a package held in memory.
    pub fn read(&self, bytes: &[u8]) -> Result<Document> {
        let mut archive = open_package(bytes)?;
        let xml = read_part(&mut archive, DOCUMENT_PART)?;
        self.parse_document_xml(&xml)
    }

    fn parse_document_xml(&self, xml: &str) -> Result<Document> {
        let mut reader = Reader::from_str(xml);
        let mut state = ReadState::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    state.on_element(e);
                    if local_name(e.name().as_ref()) == b"t" {
                        state.in_text = true;
                    }
                }
                Ok(Event::Empty(ref e)) => state.on_element(e),
                Ok(Event::Text(ref e)) => {
                    if state.in_text {
                        if let Some(run) = state.run.as_mut() {
                            let text = e
                                .unescape()
                                .map_err(|e| Error::XmlError(format!("Bad text: {}", e)))?;
                            run.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"t" => state.in_text = false,
                    b"r" => {
                        if let (Some(run), Some(paragraph)) =
                            (state.run.take(), state.paragraph.as_mut())
                        {
                            paragraph.runs.push(run);
                        }
                    }
                    b"p" => {
                        if let Some(paragraph) = state.paragraph.take() {
                            state.doc.paragraphs.push(paragraph);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing {}: {}",
                        DOCUMENT_PART, e
                    )));
                }
                _ => {}
            }
        }

        Ok(state.doc)
    }
}

impl Default for DocxReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct ReadState {
    doc: Document,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    in_text: bool,
}

impl ReadState {
    /// Handle an opening or self-closing element.
    fn on_element(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"p" => self.paragraph = Some(Paragraph::new(ParagraphStyle::Normal)),
            b"pStyle" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    if attr(e, b"val").as_deref() == Some(HEADING_STYLE_ID) {
                        paragraph.style = ParagraphStyle::Heading { level: 1 };
                    }
                }
            }
            b"outlineLvl" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    if let ParagraphStyle::Heading { ref mut level } = paragraph.style {
                        if let Some(outline) = attr(e, b"val").and_then(|v| v.parse::<u8>().ok()) {
                            *level = outline + 1;
                        }
                    }
                }
            }
            b"ind" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.indent_pt = attr(e, b"left")
                        .and_then(|v| v.parse::<u32>().ok())
                        .map(|twips| twips / 20);
                }
            }
            b"r" => self.run = Some(Run::new("")),
            b"b" => {
                if let Some(run) = self.run.as_mut() {
                    run.bold = is_on(e);
                }
            }
            b"i" => {
                if let Some(run) = self.run.as_mut() {
                    run.italic = is_on(e);
                }
            }
            b"br" => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Value of the attribute whose local name is `key`.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Toggle properties are on unless `w:val` says otherwise.
fn is_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr(e, b"val").as_deref(), Some("0" | "false" | "off"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hand_written_xml() {
        let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading"/><w:outlineLvl w:val="1"/></w:pPr>
      <w:r><w:t>Head</w:t></w:r></w:p>
    <w:p><w:pPr><w:ind w:left="400"/></w:pPr>
      <w:r><w:rPr><w:b w:val="0"/><w:i/></w:rPr><w:t xml:space="preserve">a &amp; b</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        let doc = DocxReader::new().parse_document_xml(xml).unwrap();

        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(doc.paragraphs[0].style, ParagraphStyle::Heading { level: 2 });
        assert_eq!(doc.paragraphs[0].text(), "Head");
        assert_eq!(doc.paragraphs[1].indent_pt, Some(20));
        let run = &doc.paragraphs[1].runs[0];
        assert_eq!(run.text, "a & b");
        assert!(!run.bold);
        assert!(run.italic);
    }

    #[test]
    fn test_not_a_package() {
        assert!(matches!(
            DocxReader::new().read(b"plain text"),
            Err(Error::ZipError(_))
        ));
    }
}
