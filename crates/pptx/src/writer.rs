//! PresentationML package writer.

use crate::template::{
    LAYOUTS, SLIDE_HEIGHT_EMU, SLIDE_MASTER_PATH, SLIDE_MASTER_RELS_PATH, SLIDE_MASTER_XML,
    SLIDE_WIDTH_EMU, THEME_PATH, THEME_XML,
};
use aied_core::package::{
    app_properties_xml, content_types_xml, core_properties_xml, relationships_xml,
    PackageWriter, Relationship, XmlPart, REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES,
    REL_OFFICE_DOCUMENT,
};
use aied_core::{DeckOutline, Result, SlideLayout, SlideRecord};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// First relationship id used for slides in `presentation.xml.rels`;
/// `rId1` is the master and `rId2` the theme.
const FIRST_SLIDE_REL: usize = 3;

/// First `p:sldId` value; lower ids are reserved.
const FIRST_SLIDE_ID: usize = 256;

const TITLE_PH: &[(&str, &str)] = &[("type", "title")];
const CONTENT_PH: &[(&str, &str)] = &[("idx", "1")];
const CENTER_TITLE_PH: &[(&str, &str)] = &[("type", "ctrTitle")];
const SUBTITLE_PH: &[(&str, &str)] = &[("type", "subTitle"), ("idx", "1")];

/// Serializes a [`DeckOutline`] into `.pptx` bytes.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter;

impl PptxWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the whole package into memory.
    pub fn write(&self, deck: &DeckOutline) -> Result<Vec<u8>> {
        let slide_count = deck.slides.len();
        let mut package = PackageWriter::new();

        package.add_part("[Content_Types].xml", &content_types(slide_count)?)?;
        package.add_part(
            "_rels/.rels",
            &relationships_xml(&[
                Relationship::new("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
                Relationship::new("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
                Relationship::new("rId3", REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
            ])?,
        )?;

        package.add_part("ppt/presentation.xml", &presentation_xml(slide_count)?)?;
        package.add_part(
            "ppt/_rels/presentation.xml.rels",
            &presentation_rels(slide_count)?,
        )?;

        package.add_part(SLIDE_MASTER_PATH, SLIDE_MASTER_XML.as_bytes())?;
        package.add_part(
            SLIDE_MASTER_RELS_PATH,
            &relationships_xml(&[
                Relationship::new("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                Relationship::new("rId2", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml"),
                Relationship::new("rId3", REL_THEME, "../theme/theme1.xml"),
            ])?,
        )?;
        let layout_rels = relationships_xml(&[Relationship::new(
            "rId1",
            REL_SLIDE_MASTER,
            "../slideMasters/slideMaster1.xml",
        )])?;
        for (idx, (path, xml)) in LAYOUTS.iter().enumerate() {
            package.add_part(path, xml.as_bytes())?;
            package.add_part(
                &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", idx + 1),
                &layout_rels,
            )?;
        }
        package.add_part(THEME_PATH, THEME_XML.as_bytes())?;

        for (idx, slide) in deck.slides.iter().enumerate() {
            let number = idx + 1;
            package.add_part(&format!("ppt/slides/slide{}.xml", number), &slide_xml(slide)?)?;
            package.add_part(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &relationships_xml(&[Relationship::new(
                    "rId1",
                    REL_SLIDE_LAYOUT,
                    format!("../slideLayouts/{}", layout_file(slide.layout)),
                )])?,
            )?;
        }

        let title = deck
            .slides
            .first()
            .map(|s| s.title.as_str())
            .unwrap_or("Presentation");
        package.add_part("docProps/core.xml", &core_properties_xml(title, "aied")?)?;
        package.add_part(
            "docProps/app.xml",
            &app_properties_xml(&[("Slides", slide_count.to_string())])?,
        )?;

        let bytes = package.finish()?;
        log::debug!("Wrote pptx with {} slides ({} bytes)", slide_count, bytes.len());
        Ok(bytes)
    }
}

fn layout_file(layout: SlideLayout) -> &'static str {
    match layout {
        SlideLayout::Title => "slideLayout1.xml",
        SlideLayout::TitleAndContent => "slideLayout2.xml",
    }
}

fn content_types(slide_count: usize) -> Result<Vec<u8>> {
    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
        (format!("/{}", SLIDE_MASTER_PATH), CT_SLIDE_MASTER),
    ];
    for (path, _) in LAYOUTS.iter() {
        overrides.push((format!("/{}", path), CT_SLIDE_LAYOUT));
    }
    overrides.push((format!("/{}", THEME_PATH), CT_THEME));
    for number in 1..=slide_count {
        overrides.push((format!("/ppt/slides/slide{}.xml", number), CT_SLIDE));
    }
    overrides.push(("/docProps/core.xml".to_string(), CT_CORE));
    overrides.push(("/docProps/app.xml".to_string(), CT_APP));
    content_types_xml(&overrides)
}

fn presentation_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.start(
        "p:presentation",
        &[
            ("xmlns:a", NS_A),
            ("xmlns:r", NS_R),
            ("xmlns:p", NS_P),
            ("saveSubsetFonts", "1"),
        ],
    )?;
    part.start("p:sldMasterIdLst", &[])?;
    part.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    part.end("p:sldMasterIdLst")?;

    part.start("p:sldIdLst", &[])?;
    for idx in 0..slide_count {
        let id = (FIRST_SLIDE_ID + idx).to_string();
        let rel = format!("rId{}", FIRST_SLIDE_REL + idx);
        part.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel.as_str())])?;
    }
    part.end("p:sldIdLst")?;

    part.empty(
        "p:sldSz",
        &[
            ("cx", SLIDE_WIDTH_EMU),
            ("cy", SLIDE_HEIGHT_EMU),
            ("type", "screen4x3"),
        ],
    )?;
    part.empty("p:notesSz", &[("cx", SLIDE_HEIGHT_EMU), ("cy", SLIDE_WIDTH_EMU)])?;
    part.end("p:presentation")?;
    Ok(part.into_bytes())
}

fn presentation_rels(slide_count: usize) -> Result<Vec<u8>> {
    let mut rels = vec![
        Relationship::new("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        Relationship::new("rId2", REL_THEME, "theme/theme1.xml"),
    ];
    for idx in 0..slide_count {
        rels.push(Relationship::new(
            format!("rId{}", FIRST_SLIDE_REL + idx),
            REL_SLIDE,
            format!("slides/slide{}.xml", idx + 1),
        ));
    }
    relationships_xml(&rels)
}

fn slide_xml(slide: &SlideRecord) -> Result<Vec<u8>> {
    let (title_ph, body_ph) = match slide.layout {
        SlideLayout::Title => (CENTER_TITLE_PH, SUBTITLE_PH),
        SlideLayout::TitleAndContent => (TITLE_PH, CONTENT_PH),
    };

    let mut part = XmlPart::new()?;
    part.start(
        "p:sld",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
    )?;
    part.start("p:cSld", &[])?;
    part.start("p:spTree", &[])?;

    part.start("p:nvGrpSpPr", &[])?;
    part.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    part.empty("p:cNvGrpSpPr", &[])?;
    part.empty("p:nvPr", &[])?;
    part.end("p:nvGrpSpPr")?;
    part.start("p:grpSpPr", &[])?;
    part.start("a:xfrm", &[])?;
    part.empty("a:off", &[("x", "0"), ("y", "0")])?;
    part.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    part.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    part.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    part.end("a:xfrm")?;
    part.end("p:grpSpPr")?;

    write_placeholder(
        &mut part,
        "2",
        "Title 1",
        title_ph,
        std::slice::from_ref(&slide.title),
    )?;
    write_placeholder(&mut part, "3", "Content Placeholder 2", body_ph, &slide.body)?;

    part.end("p:spTree")?;
    part.end("p:cSld")?;
    part.start("p:clrMapOvr", &[])?;
    part.empty("a:masterClrMapping", &[])?;
    part.end("p:clrMapOvr")?;
    part.end("p:sld")?;
    Ok(part.into_bytes())
}

/// A placeholder shape holding one paragraph per line.
fn write_placeholder(
    part: &mut XmlPart,
    id: &str,
    name: &str,
    ph_attrs: &[(&str, &str)],
    lines: &[String],
) -> Result<()> {
    part.start("p:sp", &[])?;
    part.start("p:nvSpPr", &[])?;
    part.empty("p:cNvPr", &[("id", id), ("name", name)])?;
    part.start("p:cNvSpPr", &[])?;
    part.empty("a:spLocks", &[("noGrp", "1")])?;
    part.end("p:cNvSpPr")?;
    part.start("p:nvPr", &[])?;
    part.empty("p:ph", ph_attrs)?;
    part.end("p:nvPr")?;
    part.end("p:nvSpPr")?;
    part.empty("p:spPr", &[])?;

    part.start("p:txBody", &[])?;
    part.empty("a:bodyPr", &[])?;
    part.empty("a:lstStyle", &[])?;
    for line in lines {
        part.start("a:p", &[])?;
        part.start("a:r", &[])?;
        part.empty("a:rPr", &[("lang", "en-US"), ("dirty", "0")])?;
        part.text_element("a:t", &[], line)?;
        part.end("a:r")?;
        part.end("a:p")?;
    }
    if lines.is_empty() {
        part.empty("a:p", &[])?;
    }
    part.end("p:txBody")?;
    part.end("p:sp")
}
