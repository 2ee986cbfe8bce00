//! Office Open XML package plumbing shared by the DOCX and PPTX backends.
//!
//! A package is a ZIP archive of XML parts. [`PackageWriter`] collects parts
//! in memory, [`XmlPart`] writes one part, and [`read_part`] pulls a part
//! back out of an archive.

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Relationship type of the main document part.
pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Relationship type of the core properties part.
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

/// Relationship type of the extended (application) properties part.
pub const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// In-memory ZIP archive being filled with package parts.
pub struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl PackageWriter {
    /// Start an empty package.
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Add a part at `path` (no leading slash).
    pub fn add_part(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.zip
            .start_file(path, self.options)
            .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
        self.zip
            .write_all(content)
            .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", path, e)))?;
        log::debug!("Wrote package part {} ({} bytes)", path, content.len());
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming writer for a single XML part.
pub struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    /// Start a part with the standalone XML declaration.
    pub fn new() -> Result<Self> {
        let mut part = Self {
            writer: Writer::new(Vec::new()),
        };
        part.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    /// Open an element.
    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Start(elem))
    }

    /// Write a self-closing element.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Empty(elem))
    }

    /// Close an element.
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Write escaped character data. Characters XML 1.0 cannot carry are
    /// dropped.
    pub fn text(&mut self, text: &str) -> Result<()> {
        let text = xml_safe_text(text);
        self.write(Event::Text(BytesText::new(&text)))
    }

    /// Write `<name attrs>text</name>`.
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    /// Return the serialized part.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(format!("Failed to write XML: {}", e)))
    }
}

fn is_xml_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Remove characters that are not allowed anywhere in an XML 1.0 document.
pub fn xml_safe_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    log::debug!("Dropping control characters that XML cannot represent");
    Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
}

/// A package relationship (`Id`, `Type`, `Target`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, rel_type: &str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.to_string(),
            target: target.into(),
        }
    }
}

/// Serialize a `.rels` part.
pub fn relationships_xml(rels: &[Relationship]) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.start("Relationships", &[("xmlns", NS_RELATIONSHIPS)])?;
    for rel in rels {
        part.empty(
            "Relationship",
            &[
                ("Id", rel.id.as_str()),
                ("Type", rel.rel_type.as_str()),
                ("Target", rel.target.as_str()),
            ],
        )?;
    }
    part.end("Relationships")?;
    Ok(part.into_bytes())
}

/// Serialize `[Content_Types].xml` from `(part name, content type)` overrides.
pub fn content_types_xml(overrides: &[(String, &str)]) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    part.empty(
        "Default",
        &[
            ("Extension", "rels"),
            (
                "ContentType",
                "application/vnd.openxmlformats-package.relationships+xml",
            ),
        ],
    )?;
    part.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    for (name, content_type) in overrides {
        part.empty(
            "Override",
            &[("PartName", name.as_str()), ("ContentType", *content_type)],
        )?;
    }
    part.end("Types")?;
    Ok(part.into_bytes())
}

/// Serialize `docProps/core.xml` with a title and creator.
pub fn core_properties_xml(title: &str, creator: &str) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    part.text_element("dc:title", &[], title)?;
    part.text_element("dc:creator", &[], creator)?;
    part.end("cp:coreProperties")?;
    Ok(part.into_bytes())
}

/// Serialize `docProps/app.xml` naming the producing application.
pub fn app_properties_xml(extra: &[(&str, String)]) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.start(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    part.text_element("Application", &[], "aied")?;
    for (name, value) in extra {
        part.text_element(name, &[], value)?;
    }
    part.end("Properties")?;
    Ok(part.into_bytes())
}

/// Read a part from a package archive as UTF-8 text.
pub fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Open a package archive held in memory.
pub fn open_package(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))
}

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"w:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_xml_part_escapes_text() {
        let mut part = XmlPart::new().unwrap();
        part.text_element("t", &[("a", "x\"y")], "1 < 2 & 3").unwrap();
        let xml = String::from_utf8(part.into_bytes()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("1 &lt; 2 &amp; 3"));
        assert!(xml.contains("a=\"x&quot;y\""));
    }

    #[test]
    fn test_xml_part_drops_illegal_characters() {
        let mut part = XmlPart::new().unwrap();
        part.text_element("t", &[], "Before\u{1}after \u{C} page\tend\n").unwrap();
        let xml = String::from_utf8(part.into_bytes()).unwrap();

        assert!(xml.contains("<t>Beforeafter  page\tend\n</t>"));
        assert!(!xml.chars().any(|c| c == '\u{1}' || c == '\u{C}'));
    }

    #[test]
    fn test_xml_safe_text_borrows_clean_input() {
        assert!(matches!(xml_safe_text("plain\ttext"), Cow::Borrowed(_)));
        assert_eq!(xml_safe_text("\u{0}a\u{1F}b\u{FFFF}"), "ab");
    }

    #[test]
    fn test_package_round_trip() {
        let mut package = PackageWriter::new();
        let rels = relationships_xml(&[Relationship::new(
            "rId1",
            REL_OFFICE_DOCUMENT,
            "word/document.xml",
        )])
        .unwrap();
        package.add_part("_rels/.rels", &rels).unwrap();
        let bytes = package.finish().unwrap();

        assert!(bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]));
        let mut archive = open_package(&bytes).unwrap();
        let content = read_part(&mut archive, "_rels/.rels").unwrap();
        assert!(content.contains("Target=\"word/document.xml\""));
        assert!(read_part(&mut archive, "missing.xml").is_err());
    }
}
