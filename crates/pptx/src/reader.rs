//! Reads slide titles and body text back out of a `.pptx` file.

use aied_core::package::{local_name, read_part};
use aied_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

/// Text found on one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSummary {
    /// 1-based slide number.
    pub number: usize,
    /// Text of the title or centered-title placeholder.
    pub title: Option<String>,
    /// Paragraphs of every other shape, top-to-bottom then left-to-right.
    pub body: Vec<String>,
}

/// Reader for PPTX (Office Open XML) files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a deck held in memory.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<SlideSummary>> {
        self.read(Cursor::new(bytes))
    }

    /// Read every slide, in presentation order.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideSummary>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;

        let mut slides = Vec::with_capacity(slide_order.len());
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = read_part(&mut archive, slide_path)?;
            slides.push(self.parse_slide(&content, idx + 1)?);
        }

        log::debug!("Read {} slides", slides.len());
        Ok(slides)
    }

    /// Get the ordered list of slide paths from the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_part(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let rel_type = attr(e, b"Type").unwrap_or_default();
                    let target = attr(e, b"Target").unwrap_or_default();
                    let id = attr(e, b"Id").unwrap_or_default();

                    if rel_type.ends_with("/slide") {
                        let order_num =
                            extract_slide_number(&target).or_else(|| extract_slide_number(&id));
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((full_path, order_num));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Collect the title and body text of one slide part.
    fn parse_slide(&self, xml_content: &str, number: usize) -> Result<SlideSummary> {
        let mut shapes = self.extract_shapes_from_xml(xml_content)?;
        shapes.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut summary = SlideSummary {
            number,
            ..Default::default()
        };
        for shape in shapes {
            if shape.is_title() && summary.title.is_none() {
                summary.title = Some(shape.paragraphs.join("\n"));
            } else {
                summary
                    .body
                    .extend(shape.paragraphs.into_iter().filter(|p| !p.trim().is_empty()));
            }
        }
        Ok(summary)
    }

    /// Extract shapes with their placeholder type, paragraphs and position.
    fn extract_shapes_from_xml(&self, xml_content: &str) -> Result<Vec<ShapeInfo>> {
        let mut shapes = Vec::new();
        let mut reader = Reader::from_str(xml_content);

        let mut current_shape: Option<ShapeInfo> = None;
        let mut in_text_body = false;
        let mut in_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" => current_shape = Some(ShapeInfo::default()),
                    b"txBody" => in_text_body = true,
                    b"p" if in_text_body => {
                        if let Some(shape) = current_shape.as_mut() {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"t" if in_text_body => in_text = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                    b"ph" => {
                        if let Some(shape) = current_shape.as_mut() {
                            shape.placeholder =
                                Some(attr(e, b"type").unwrap_or_else(|| "body".to_string()));
                        }
                    }
                    b"off" => {
                        if let Some(shape) = current_shape.as_mut() {
                            shape.set_offset(e);
                        }
                    }
                    b"p" if in_text_body => {
                        if let Some(shape) = current_shape.as_mut() {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"br" if in_text_body => {
                        if let Some(paragraph) =
                            current_shape.as_mut().and_then(|s| s.paragraphs.last_mut())
                        {
                            paragraph.push('\n');
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if in_text {
                        if let Some(paragraph) =
                            current_shape.as_mut().and_then(|s| s.paragraphs.last_mut())
                        {
                            let text = e.unescape().unwrap_or_default();
                            paragraph.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" => {
                        if let Some(shape) = current_shape.take() {
                            shapes.push(shape);
                        }
                        in_text_body = false;
                        in_text = false;
                    }
                    b"txBody" => in_text_body = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("XML parsing error (continuing): {}", e);
                }
                _ => {}
            }
        }

        Ok(shapes)
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a shape extracted from XML.
#[derive(Debug, Default)]
struct ShapeInfo {
    /// Placeholder type, `body` when the placeholder names none.
    placeholder: Option<String>,
    paragraphs: Vec<String>,
    x: f64,
    y: f64,
}

impl ShapeInfo {
    fn is_title(&self) -> bool {
        matches!(self.placeholder.as_deref(), Some("title" | "ctrTitle"))
    }

    fn set_offset(&mut self, e: &BytesStart<'_>) {
        if let Some(x) = attr(e, b"x").and_then(|v| v.parse::<f64>().ok()) {
            self.x = x;
        }
        if let Some(y) = attr(e, b"y").and_then(|v| v.parse::<f64>().ok()) {
            self.y = y;
        }
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Extract a slide number from a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_parse_slide_sorts_and_splits_title() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
  <p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
    <p:spPr><a:xfrm><a:off x="0" y="200"/></a:xfrm></p:spPr>
    <p:txBody><a:p><a:r><a:t>lower</a:t></a:r></a:p><a:p/></p:txBody></p:sp>
  <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
    <p:spPr><a:xfrm><a:off x="0" y="100"/></a:xfrm></p:spPr>
    <p:txBody><a:p><a:r><a:t>Heading &amp; more</a:t></a:r></a:p></p:txBody></p:sp>
  <p:sp><p:nvSpPr><p:nvPr/></p:nvSpPr>
    <p:spPr><a:xfrm><a:off x="0" y="50"/></a:xfrm></p:spPr>
    <p:txBody><a:p><a:r><a:t>upper</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let slide = PptxReader::new().parse_slide(xml, 4).unwrap();

        assert_eq!(slide.number, 4);
        assert_eq!(slide.title.as_deref(), Some("Heading & more"));
        assert_eq!(slide.body, vec!["upper", "lower"]);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            PptxReader::new().read_bytes(b"nope"),
            Err(Error::ZipError(_))
        ));
    }
}
