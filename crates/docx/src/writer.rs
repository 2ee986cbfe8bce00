//! WordprocessingML package writer.

use crate::document::{Document, Paragraph, ParagraphStyle, Run, HEADING_SIZE_PT};
use aied_core::package::{
    app_properties_xml, content_types_xml, core_properties_xml, relationships_xml,
    PackageWriter, Relationship, XmlPart, REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES,
    REL_OFFICE_DOCUMENT,
};
use aied_core::Result;

pub(crate) const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

/// Style id of heading paragraphs.
pub(crate) const HEADING_STYLE_ID: &str = "Heading";
/// Style id of body paragraphs.
pub(crate) const NORMAL_STYLE_ID: &str = "Normal";

/// Twentieths of a point per point.
const TWIPS_PER_PT: u32 = 20;

/// Serializes a [`Document`] into `.docx` bytes.
pub struct DocxWriter {
    title: String,
}

impl DocxWriter {
    /// Create a writer with the default document title.
    pub fn new() -> Self {
        Self {
            title: "Exported content".to_string(),
        }
    }

    /// Set the title stored in the document properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Write the whole package into memory.
    pub fn write(&self, doc: &Document) -> Result<Vec<u8>> {
        let mut package = PackageWriter::new();

        package.add_part(
            "[Content_Types].xml",
            &content_types_xml(&[
                (
                    format!("/{}", DOCUMENT_PART),
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
                ),
                (
                    "/word/styles.xml".to_string(),
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
                ),
                (
                    "/docProps/core.xml".to_string(),
                    "application/vnd.openxmlformats-package.core-properties+xml",
                ),
                (
                    "/docProps/app.xml".to_string(),
                    "application/vnd.openxmlformats-officedocument.extended-properties+xml",
                ),
            ])?,
        )?;
        package.add_part(
            "_rels/.rels",
            &relationships_xml(&[
                Relationship::new("rId1", REL_OFFICE_DOCUMENT, DOCUMENT_PART),
                Relationship::new("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
                Relationship::new("rId3", REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
            ])?,
        )?;
        package.add_part(
            "word/_rels/document.xml.rels",
            &relationships_xml(&[Relationship::new("rId1", REL_STYLES, "styles.xml")])?,
        )?;
        package.add_part("word/styles.xml", &styles_xml()?)?;
        package.add_part(DOCUMENT_PART, &document_xml(doc)?)?;
        package.add_part("docProps/core.xml", &core_properties_xml(&self.title, "aied")?)?;
        package.add_part("docProps/app.xml", &app_properties_xml(&[])?)?;

        let bytes = package.finish()?;
        log::debug!(
            "Wrote docx with {} paragraphs ({} bytes)",
            doc.paragraphs.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn document_xml(doc: &Document) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.start("w:document", &[("xmlns:w", NS_W)])?;
    part.start("w:body", &[])?;

    for paragraph in &doc.paragraphs {
        write_paragraph(&mut part, paragraph)?;
    }

    // US Letter, one-inch margins.
    part.start("w:sectPr", &[])?;
    part.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
    part.empty(
        "w:pgMar",
        &[
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    part.end("w:sectPr")?;

    part.end("w:body")?;
    part.end("w:document")?;
    Ok(part.into_bytes())
}

fn write_paragraph(part: &mut XmlPart, paragraph: &Paragraph) -> Result<()> {
    part.start("w:p", &[])?;
    part.start("w:pPr", &[])?;
    match paragraph.style {
        ParagraphStyle::Normal => {
            part.empty("w:pStyle", &[("w:val", NORMAL_STYLE_ID)])?;
        }
        ParagraphStyle::Heading { level } => {
            part.empty("w:pStyle", &[("w:val", HEADING_STYLE_ID)])?;
            let outline = level.saturating_sub(1).to_string();
            part.empty("w:outlineLvl", &[("w:val", outline.as_str())])?;
        }
    }
    if let Some(indent) = paragraph.indent_pt {
        let twips = (indent * TWIPS_PER_PT).to_string();
        part.empty("w:ind", &[("w:left", twips.as_str())])?;
    }
    part.end("w:pPr")?;

    for run in &paragraph.runs {
        write_run(part, run)?;
    }
    part.end("w:p")
}

fn write_run(part: &mut XmlPart, run: &Run) -> Result<()> {
    part.start("w:r", &[])?;
    if run.bold || run.italic {
        part.start("w:rPr", &[])?;
        if run.bold {
            part.empty("w:b", &[])?;
        }
        if run.italic {
            part.empty("w:i", &[])?;
        }
        part.end("w:rPr")?;
    }
    for (idx, line) in run.text.split('\n').enumerate() {
        if idx > 0 {
            part.empty("w:br", &[])?;
        }
        if !line.is_empty() {
            part.text_element("w:t", &[("xml:space", "preserve")], line)?;
        }
    }
    part.end("w:r")
}

fn styles_xml() -> Result<Vec<u8>> {
    let heading_size = (HEADING_SIZE_PT * 2).to_string();

    let mut part = XmlPart::new()?;
    part.start("w:styles", &[("xmlns:w", NS_W)])?;

    part.start("w:docDefaults", &[])?;
    part.start("w:rPrDefault", &[])?;
    part.start("w:rPr", &[])?;
    part.empty(
        "w:rFonts",
        &[
            ("w:ascii", "Calibri"),
            ("w:hAnsi", "Calibri"),
            ("w:eastAsia", "Calibri"),
            ("w:cs", "Calibri"),
        ],
    )?;
    part.empty("w:sz", &[("w:val", "22")])?;
    part.empty("w:szCs", &[("w:val", "22")])?;
    part.end("w:rPr")?;
    part.end("w:rPrDefault")?;
    part.start("w:pPrDefault", &[])?;
    part.start("w:pPr", &[])?;
    part.empty(
        "w:spacing",
        &[("w:after", "160"), ("w:line", "259"), ("w:lineRule", "auto")],
    )?;
    part.end("w:pPr")?;
    part.end("w:pPrDefault")?;
    part.end("w:docDefaults")?;

    part.start(
        "w:style",
        &[
            ("w:type", "paragraph"),
            ("w:default", "1"),
            ("w:styleId", NORMAL_STYLE_ID),
        ],
    )?;
    part.empty("w:name", &[("w:val", NORMAL_STYLE_ID)])?;
    part.empty("w:qFormat", &[])?;
    part.end("w:style")?;

    part.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:styleId", HEADING_STYLE_ID)],
    )?;
    part.empty("w:name", &[("w:val", HEADING_STYLE_ID)])?;
    part.empty("w:basedOn", &[("w:val", NORMAL_STYLE_ID)])?;
    part.empty("w:next", &[("w:val", NORMAL_STYLE_ID)])?;
    part.empty("w:qFormat", &[])?;
    part.start("w:rPr", &[])?;
    part.empty("w:b", &[])?;
    part.empty("w:bCs", &[])?;
    part.empty("w:sz", &[("w:val", heading_size.as_str())])?;
    part.empty("w:szCs", &[("w:val", heading_size.as_str())])?;
    part.end("w:rPr")?;
    part.end("w:style")?;

    part.end("w:styles")?;
    Ok(part.into_bytes())
}
