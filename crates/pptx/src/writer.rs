//! PPTX output.
//!
//! [`PptxWriter`] starts from the template package with its slides removed
//! and appends one slide per [`SlideBuild`]. Masters, layouts and the theme
//! are reused untouched, so generated slides inherit the template's look.

use crate::package::{
    escape, local_name, next_rel_id, rels_path, relationships_xml, relative_target,
    resolve_target, Package, Relationship, REL_IMAGE, REL_NOTES_MASTER, REL_NOTES_SLIDE,
    REL_SLIDE, REL_SLIDE_LAYOUT,
};
use crate::template::{discover_parts, placeholder_token, TemplateParts};
use deck_core::geometry::{inches_to_emu, Rect};
use deck_core::{
    parse_runs, DocumentSink, Error, FilledPlaceholder, ImagePool, ImagePoolEntry,
    PlaceholderRole, ResolvedFont, Result, SlideBuild, TextBox,
};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashSet;
use std::fmt::Write as FmtWrite;
use std::io::Cursor;

const CONTENT_TYPES: &str = "[Content_Types].xml";

const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_NOTES_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const GROUP_PROPERTIES: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

/// First id handed out in `<p:sldIdLst>`.
const FIRST_SLIDE_ID: u32 = 256;

/// Font sizes are written in hundredths of a point within these bounds.
const MIN_FONT_HUNDREDTHS: u32 = 100;
const MAX_FONT_HUNDREDTHS: u32 = 400_000;

fn xml_error(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// MIME type for an image extension.
fn image_content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// The `[Content_Types].xml` part.
#[derive(Debug, Clone, Default, PartialEq)]
struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let value = |key: &[u8]| crate::package::attribute(e, key).unwrap_or_default();
                    match local_name(e.name().as_ref()) {
                        b"Default" => types
                            .defaults
                            .push((value(b"Extension"), value(b"ContentType"))),
                        b"Override" => types
                            .overrides
                            .push((value(b"PartName"), value(b"ContentType"))),
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing content types: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(types)
    }

    fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self
            .defaults
            .iter()
            .any(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    fn set_override(&mut self, part: &str, content_type: &str) {
        let name = format!("/{}", part);
        self.overrides.retain(|(p, _)| *p != name);
        self.overrides.push((name, content_type.to_string()));
    }

    fn remove_override(&mut self, part: &str) {
        let name = format!("/{}", part);
        self.overrides.retain(|(p, _)| *p != name);
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (extension, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(extension),
                escape(content_type)
            ));
        }
        for (part, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(part),
                escape(content_type)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Writes generated slides into a copy of a template package.
#[derive(Debug)]
pub struct PptxWriter {
    package: Package,
    parts: TemplateParts,
    content_types: ContentTypes,
    presentation_rels: Vec<Relationship>,

    /// `(sldId id, relationship id)` per written slide.
    slide_ids: Vec<(u32, String)>,

    media_count: usize,
}

impl PptxWriter {
    /// Start from template bytes.
    pub fn new(template: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(template)
            .map_err(|e| Error::TemplateUnreadable(e.to_string()))?;
        Self::from_package(package)
    }

    /// Start from an unpacked template, dropping its slides and notes.
    pub fn from_package(mut package: Package) -> Result<Self> {
        let parts = discover_parts(&package).map_err(|e| match e {
            Error::TemplateUnreadable(_) => e,
            other => Error::TemplateUnreadable(other.to_string()),
        })?;

        let mut content_types = ContentTypes::parse(&package.part_text(CONTENT_TYPES)?)?;
        let presentation_rels: Vec<Relationship> = package
            .relationships(&parts.presentation)?
            .into_iter()
            .filter(|r| !r.is(REL_SLIDE))
            .collect();

        let stale: Vec<String> = package
            .part_names()
            .filter(|n| n.starts_with("ppt/slides/") || n.starts_with("ppt/notesSlides/"))
            .map(str::to_string)
            .collect();
        for name in &stale {
            package.remove_part(name);
            content_types.remove_override(name);
        }
        log::debug!("removed {} template slide parts", stale.len());

        Ok(Self {
            package,
            parts,
            content_types,
            presentation_rels,
            slide_ids: Vec::new(),
            media_count: 0,
        })
    }

    /// Number of slides written so far.
    pub fn slide_count(&self) -> usize {
        self.slide_ids.len()
    }

    /// Close the package and return its bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let presentation = self.package.part_text(&self.parts.presentation)?;
        let rewritten = rewrite_slide_list(&presentation, &self.slide_ids)?;
        self.package
            .set_part(&self.parts.presentation, rewritten.into_bytes());
        self.package.set_part(
            &rels_path(&self.parts.presentation),
            relationships_xml(&self.presentation_rels).into_bytes(),
        );

        self.prune_media()?;
        self.package
            .set_part(CONTENT_TYPES, self.content_types.to_xml().into_bytes());
        self.package.to_bytes()
    }

    /// Drop media parts that no relationship points at any more.
    fn prune_media(&mut self) -> Result<()> {
        let mut referenced = HashSet::new();
        let rels_parts: Vec<String> = self
            .package
            .part_names()
            .filter(|n| n.ends_with(".rels"))
            .map(str::to_string)
            .collect();
        for rels in rels_parts {
            let source = source_of_rels(&rels);
            for rel in crate::package::parse_relationships(&self.package.part_text(&rels)?)? {
                if !rel.external {
                    referenced.insert(resolve_target(&source, &rel.target));
                }
            }
        }

        let orphans: Vec<String> = self
            .package
            .part_names()
            .filter(|n| n.starts_with("ppt/media/") && !referenced.contains(*n))
            .map(str::to_string)
            .collect();
        for name in orphans {
            log::debug!("dropping unreferenced media '{}'", name);
            self.package.remove_part(&name);
            self.content_types.remove_override(&name);
        }
        Ok(())
    }

    fn add_media(&mut self, entry: &ImagePoolEntry) -> String {
        let extension: String = entry
            .extension
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase();
        let extension = if extension.is_empty() {
            "png".to_string()
        } else {
            extension
        };

        let name = loop {
            self.media_count += 1;
            let candidate = format!("ppt/media/deck_image{}.{}", self.media_count, extension);
            if !self.package.contains(&candidate) {
                break candidate;
            }
        };
        self.package.set_part(&name, entry.bytes.clone());
        self.content_types
            .ensure_default(&extension, image_content_type(&extension));
        name
    }

    fn add_notes(&mut self, number: usize, slide_part: &str, notes_master: &str, text: &str) -> Result<String> {
        let part = format!("ppt/notesSlides/notesSlide{}.xml", number);

        let mut paragraphs = String::new();
        for line in text.lines() {
            write!(
                paragraphs,
                r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                escape(line)
            )
            .map_err(xml_error)?;
        }
        if paragraphs.is_empty() {
            paragraphs.push_str("<a:p/>");
        }

        let xml = format!(
            r#"{XML_DECLARATION}<p:notes {NAMESPACES}><p:cSld><p:spTree>{GROUP_PROPERTIES}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>"#
        );
        let rels = vec![
            Relationship::new("rId1", REL_NOTES_MASTER, relative_target(&part, notes_master)),
            Relationship::new("rId2", REL_SLIDE, relative_target(&part, slide_part)),
        ];

        self.package.set_part(&part, xml.into_bytes());
        self.package
            .set_part(&rels_path(&part), relationships_xml(&rels).into_bytes());
        self.content_types.set_override(&part, CT_NOTES_SLIDE);
        Ok(part)
    }
}

impl DocumentSink for PptxWriter {
    fn add_slide(&mut self, slide: &SlideBuild, pool: &ImagePool) -> Result<()> {
        let number = self.slide_ids.len() + 1;
        let slide_part = format!("ppt/slides/slide{}.xml", number);
        let layout_part = self
            .parts
            .layouts
            .get(slide.layout_index)
            .cloned()
            .ok_or_else(|| {
                Error::SerializeError(format!(
                    "slide {} refers to missing layout {}",
                    slide.number, slide.layout_index
                ))
            })?;

        let mut rels = vec![Relationship::new(
            "rId1",
            REL_SLIDE_LAYOUT,
            relative_target(&slide_part, &layout_part),
        )];
        let mut shapes = String::new();
        let mut shape_id = 2;

        for text in &slide.texts {
            write_placeholder(&mut shapes, shape_id, text)?;
            shape_id += 1;
        }
        for text_box in &slide.text_boxes {
            write_text_box(&mut shapes, shape_id, text_box)?;
            shape_id += 1;
        }
        for image in &slide.images {
            let entry = pool.get(image.pool_index).ok_or_else(|| {
                Error::SerializeError(format!(
                    "slide {} refers to missing image {}",
                    slide.number, image.pool_index
                ))
            })?;
            let media = self.add_media(entry);
            let rel_id = next_rel_id(&rels);
            rels.push(Relationship::new(
                rel_id.clone(),
                REL_IMAGE,
                relative_target(&slide_part, &media),
            ));
            write_picture(&mut shapes, shape_id, &rel_id, &image.region)?;
            shape_id += 1;
        }

        if let Some(notes) = slide.notes.as_deref() {
            match self.parts.notes_master.clone() {
                Some(master) => {
                    let notes_part = self.add_notes(number, &slide_part, &master, notes)?;
                    rels.push(Relationship::new(
                        next_rel_id(&rels),
                        REL_NOTES_SLIDE,
                        relative_target(&slide_part, &notes_part),
                    ));
                }
                None => log::debug!("slide {}: template has no notes master, notes dropped", number),
            }
        }

        let xml = format!(
            r#"{XML_DECLARATION}<p:sld {NAMESPACES}><p:cSld><p:spTree>{GROUP_PROPERTIES}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
        );
        self.package.set_part(&slide_part, xml.into_bytes());
        self.package
            .set_part(&rels_path(&slide_part), relationships_xml(&rels).into_bytes());
        self.content_types.set_override(&slide_part, CT_SLIDE);

        let rel_id = next_rel_id(&self.presentation_rels);
        self.presentation_rels.push(Relationship::new(
            rel_id.clone(),
            REL_SLIDE,
            relative_target(&self.parts.presentation, &slide_part),
        ));
        self.slide_ids
            .push((FIRST_SLIDE_ID + self.slide_ids.len() as u32, rel_id));
        Ok(())
    }
}

/// The part a `.rels` part belongs to.
fn source_of_rels(rels: &str) -> String {
    rels.trim_end_matches(".rels").replacen("_rels/", "", 1)
}

fn font_size(size: f64) -> u32 {
    ((size * 100.0).round() as u32).clamp(MIN_FONT_HUNDREDTHS, MAX_FONT_HUNDREDTHS)
}

fn write_paragraphs(
    xml: &mut String,
    paragraphs: &[String],
    font: &ResolvedFont,
    bulleted: bool,
) -> Result<()> {
    for paragraph in paragraphs {
        xml.push_str("<a:p>");
        if !bulleted {
            xml.push_str(r#"<a:pPr marL="0" indent="0"><a:buNone/></a:pPr>"#);
        }
        for run in parse_runs(paragraph) {
            if run.text.is_empty() {
                continue;
            }
            write!(
                xml,
                r#"<a:r><a:rPr lang="en-US" sz="{}"{}{} dirty="0"><a:latin typeface="{}"/></a:rPr><a:t>{}</a:t></a:r>"#,
                font_size(font.size),
                if font.bold || run.bold { r#" b="1""# } else { "" },
                if font.italic || run.italic { r#" i="1""# } else { "" },
                escape(&font.family),
                escape(&run.text)
            )
            .map_err(xml_error)?;
        }
        xml.push_str("</a:p>");
    }
    Ok(())
}

fn shape_label(role: PlaceholderRole) -> &'static str {
    match role {
        PlaceholderRole::Title => "Title",
        PlaceholderRole::Subtitle => "Subtitle",
        PlaceholderRole::SupplementalText => "Text Placeholder",
        _ => "Content Placeholder",
    }
}

/// A filled placeholder. Geometry is inherited from the layout.
fn write_placeholder(xml: &mut String, id: u32, text: &FilledPlaceholder) -> Result<()> {
    let placeholder = &text.placeholder;
    let (token, vertical) = placeholder_token(placeholder.raw_code);

    let mut ph = String::from("<p:ph");
    if let Some(token) = token {
        write!(ph, r#" type="{}""#, token).map_err(xml_error)?;
    }
    if vertical {
        ph.push_str(r#" orient="vert""#);
    }
    if placeholder.index != 0 {
        write!(ph, r#" idx="{}""#, placeholder.index).map_err(xml_error)?;
    }
    ph.push_str("/>");

    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{} {id}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
        shape_label(placeholder.role)
    )
    .map_err(xml_error)?;
    write_paragraphs(xml, &text.paragraphs, &text.font, text.bulleted)?;
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_transform(xml: &mut String, region: &Rect) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        inches_to_emu(region.left),
        inches_to_emu(region.top),
        inches_to_emu(region.width),
        inches_to_emu(region.height)
    )
    .map_err(xml_error)
}

fn write_text_box(xml: &mut String, id: u32, text_box: &TextBox) -> Result<()> {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#
    )
    .map_err(xml_error)?;
    write_transform(xml, &text_box.region)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0" anchor="ctr"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#);
    write_paragraphs(xml, std::slice::from_ref(&text_box.text), &text_box.font, false)?;
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_picture(xml: &mut String, id: u32, rel_id: &str, region: &Rect) -> Result<()> {
    write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#
    )
    .map_err(xml_error)?;
    write_transform(xml, region)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}

/// Namespace prefix of an element name, including the colon.
fn prefix_of(name: &[u8]) -> String {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => String::from_utf8_lossy(&name[..=pos]).to_string(),
        None => String::new(),
    }
}

fn write_slide_list(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    prefix: &str,
    slides: &[(u32, String)],
) -> Result<()> {
    if slides.is_empty() {
        return Ok(());
    }
    let list = format!("{}sldIdLst", prefix);
    let to_error = |e: quick_xml::Error| Error::XmlError(e.to_string());

    writer
        .write_event(Event::Start(BytesStart::new(list.as_str())))
        .map_err(to_error)?;
    for (id, rel_id) in slides {
        let id = id.to_string();
        let element = BytesStart::new(format!("{}sldId", prefix))
            .with_attributes([("id", id.as_str()), ("r:id", rel_id.as_str())]);
        writer.write_event(Event::Empty(element)).map_err(to_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(list.as_str())))
        .map_err(to_error)?;
    Ok(())
}

/// Extension holding PowerPoint 2010 slide sections.
const SECTIONS_EXT_URI: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

/// Whether `e` opens the slide-section extension. Sections list the
/// template's slide ids, which no longer exist in the output.
fn is_section_list(e: &BytesStart) -> bool {
    match local_name(e.name().as_ref()) {
        b"sectionLst" => true,
        b"ext" => crate::package::attribute(e, b"uri").as_deref() == Some(SECTIONS_EXT_URI),
        _ => false,
    }
}

/// Replace the root's `<p:sldIdLst>` in presentation.xml, inserting it
/// before `<p:sldSz>` when the template has none. Slide sections are
/// dropped.
fn rewrite_slide_list(xml: &str, slides: &[(u32, String)]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut written = false;

    // Element depth, and the depth at which a skipped subtree started.
    let mut depth = 0usize;
    let mut skipping: Option<usize> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing presentation: {}", e)))?;

        if let Some(level) = skipping {
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == level {
                        skipping = None;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match &event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if depth == 1 && local == b"sldIdLst" {
                    write_slide_list(&mut writer, &prefix_of(name.as_ref()), slides)?;
                    written = true;
                    skipping = Some(depth);
                    depth += 1;
                    continue;
                }
                if is_section_list(e) {
                    skipping = Some(depth);
                    depth += 1;
                    continue;
                }
                if depth == 1 && !written && local == b"sldSz" {
                    write_slide_list(&mut writer, &prefix_of(name.as_ref()), slides)?;
                    written = true;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if depth == 1 && local == b"sldIdLst" {
                    write_slide_list(&mut writer, &prefix_of(name.as_ref()), slides)?;
                    written = true;
                    continue;
                }
                if is_section_list(e) {
                    continue;
                }
                if depth == 1 && !written && local == b"sldSz" {
                    write_slide_list(&mut writer, &prefix_of(name.as_ref()), slides)?;
                    written = true;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }

        writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))?;
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::XmlError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TemplateBuilder;
    use crate::{analyze, generate};
    use deck_core::{GenerationOptions, SlideContentRequest, SlidePlan};

    fn output(plan: Vec<SlideContentRequest>, template: &TemplateBuilder) -> Package {
        let bytes = generate(&template.build(), &SlidePlan::new(plan), &GenerationOptions::default())
            .unwrap();
        Package::from_bytes(&bytes).unwrap()
    }

    fn slide_xml(package: &Package, number: usize) -> String {
        package
            .part_text(&format!("ppt/slides/slide{}.xml", number))
            .unwrap()
    }

    #[test]
    fn test_slides_replace_template_slides() {
        let package = output(
            vec![
                SlideContentRequest::new("Intro").with_bullets(["Alpha", "Beta"]),
                SlideContentRequest::new("Next").with_bullets(["Gamma"]),
            ],
            &TemplateBuilder::standard(),
        );

        let presentation = package.part_text("ppt/presentation.xml").unwrap();
        assert_eq!(presentation.matches("<p:sldId ").count(), 2);
        assert!(presentation.contains(r#"<p:sldId id="256" r:id=""#));
        assert!(presentation.find("<p:sldIdLst>") < presentation.find("<p:sldSz"));

        let rels = package
            .relationships("ppt/presentation.xml")
            .unwrap();
        assert_eq!(rels.iter().filter(|r| r.is(REL_SLIDE)).count(), 2);

        let types = package.part_text(CONTENT_TYPES).unwrap();
        assert_eq!(types.matches(CT_SLIDE).count(), 2);

        // The template's picture belonged to its own slide only
        assert!(!package.contains("ppt/media/image1.png"));

        let first = slide_xml(&package, 1);
        assert!(first.contains(r#"<p:ph type="title"/>"#));
        assert!(first.contains(r#"<p:ph idx="1"/>"#));
        assert!(first.contains("<a:t>Alpha</a:t>"));
        assert!(first.contains(r#"sz="1800""#));
    }

    #[test]
    fn test_output_is_a_readable_template() {
        let package = output(
            vec![SlideContentRequest::new("Intro").with_bullets(["Alpha"])],
            &TemplateBuilder::standard(),
        );
        let reread = analyze(&package.to_bytes().unwrap()).unwrap();
        assert_eq!(reread.structure.layouts.len(), 3);
        assert!(reread.pool.is_empty());
    }

    #[test]
    fn test_slide_references_its_layout() {
        let package = output(
            vec![SlideContentRequest::new("Chapter").with_hint("image")],
            &TemplateBuilder::standard(),
        );
        let rels = package.relationships("ppt/slides/slide1.xml").unwrap();
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", &rels[0].target),
            "ppt/slideLayouts/slideLayout3.xml"
        );
    }

    #[test]
    fn test_images_are_embedded() {
        let package = output(
            vec![SlideContentRequest::new("Gallery").with_hint("image")],
            &TemplateBuilder::standard(),
        );

        assert_eq!(package.part("ppt/media/deck_image1.png"), Some(crate::fixtures::PNG_BYTES));
        let rels = package.relationships("ppt/slides/slide1.xml").unwrap();
        let image = rels.iter().find(|r| r.is(REL_IMAGE)).unwrap();
        assert_eq!(image.target, "../media/deck_image1.png");

        let xml = slide_xml(&package, 1);
        assert!(xml.contains(&format!(r#"<a:blip r:embed="{}"/>"#, image.id)));
        // Picture placeholder rectangle: 5in from the left, 1.75in from the top
        assert!(xml.contains(r#"<a:off x="4572000" y="1600200"/>"#));

        let reread = analyze(&package.to_bytes().unwrap()).unwrap();
        assert_eq!(reread.pool.len(), 1);
    }

    #[test]
    fn test_notes_need_a_notes_master() {
        let request = SlideContentRequest::new("Talk").with_notes("Line one\nLine & two");

        let with_master = output(vec![request.clone()], &TemplateBuilder::standard().with_notes_master());
        let notes = with_master
            .part_text("ppt/notesSlides/notesSlide1.xml")
            .unwrap();
        assert!(notes.contains("<a:t>Line one</a:t>"));
        assert!(notes.contains("<a:t>Line &amp; two</a:t>"));
        let rels = with_master.relationships("ppt/slides/slide1.xml").unwrap();
        assert!(rels.iter().any(|r| r.is(REL_NOTES_SLIDE)));
        assert!(with_master
            .part_text(CONTENT_TYPES)
            .unwrap()
            .contains(CT_NOTES_SLIDE));

        let without = output(vec![request], &TemplateBuilder::standard());
        assert!(!without.contains("ppt/notesSlides/notesSlide1.xml"));
    }

    #[test]
    fn test_runs_and_escaping() {
        let package = output(
            vec![SlideContentRequest::new("R&D <plan>").with_bullets(["**Bold** move"])],
            &TemplateBuilder::standard(),
        );
        let xml = slide_xml(&package, 1);
        assert!(xml.contains("<a:t>R&amp;D &lt;plan&gt;</a:t>"));
        assert!(xml.contains(r#"b="1""#));
        assert!(xml.contains("<a:t>Bold</a:t>"));
        assert!(xml.contains("<a:t> move</a:t>"));
        assert!(!xml.contains("**"));
    }

    #[test]
    fn test_missing_layout_is_an_error() {
        let mut writer = PptxWriter::new(&TemplateBuilder::standard().build()).unwrap();
        let pool = ImagePool::default();
        let slide = SlideBuild {
            number: 1,
            layout_index: 99,
            texts: Vec::new(),
            text_boxes: Vec::new(),
            images: Vec::new(),
            notes: None,
        };
        assert!(matches!(
            writer.add_slide(&slide, &pool),
            Err(Error::SerializeError(_))
        ));
        assert_eq!(writer.slide_count(), 0);
    }

    #[test]
    fn test_rewrite_slide_list_inserts_when_absent() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldMasterIdLst/><p:sldSz cx="1" cy="1"/></p:presentation>"#;
        let out = rewrite_slide_list(xml, &[(256, "rId7".to_string())]).unwrap();
        assert!(out.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId7"/></p:sldIdLst><p:sldSz"#));
    }

    #[test]
    fn test_rewrite_slide_list_drops_sections() {
        let xml = concat!(
            r#"<p:presentation xmlns:p="p" xmlns:r="r">"#,
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>"#,
            r#"<p:sldSz cx="1" cy="1"/><p:extLst>"#,
            r#"<p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst xmlns:p14="p14">"#,
            r#"<p14:section name="A" id="{1}"><p14:sldIdLst><p14:sldId id="256"/></p14:sldIdLst></p14:section>"#,
            r#"<p14:section name="B" id="{2}"><p14:sldIdLst><p14:sldId id="257"/></p14:sldIdLst></p14:section>"#,
            r#"</p14:sectionLst></p:ext>"#,
            r#"<p:ext uri="{EFAFB233-063F-42B5-8137-9DF3F51BA10A}"><p15:sldGuideLst xmlns:p15="p15"/></p:ext>"#,
            r#"</p:extLst></p:presentation>"#,
        );
        let slides = vec![(256, "rId7".to_string()), (257, "rId8".to_string())];
        let out = rewrite_slide_list(xml, &slides).unwrap();

        assert_eq!(out.matches("sldIdLst>").count(), 2);
        assert!(out.contains(
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId7"/><p:sldId id="257" r:id="rId8"/></p:sldIdLst><p:sldSz"#
        ));
        assert!(!out.contains("section"));
        assert!(!out.contains("rId2"));
        assert!(out.contains("<p15:sldGuideLst"));
        assert!(out.ends_with("</p:extLst></p:presentation>"));
    }

    #[test]
    fn test_content_types_round_trip() {
        let mut types = ContentTypes::default();
        types.ensure_default("png", "image/png");
        types.ensure_default("PNG", "image/png");
        types.set_override("ppt/slides/slide1.xml", CT_SLIDE);
        types.set_override("ppt/slides/slide1.xml", CT_SLIDE);

        let parsed = ContentTypes::parse(&types.to_xml()).unwrap();
        assert_eq!(parsed, types);
        assert_eq!(parsed.defaults.len(), 1);
        assert_eq!(parsed.overrides.len(), 1);
    }

    #[test]
    fn test_unreadable_template_is_reported() {
        let result = generate(b"nope", &SlidePlan::default(), &GenerationOptions::default());
        assert!(matches!(result, Err(Error::TemplateUnreadable(_))));
    }
}
