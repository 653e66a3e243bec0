//! Template analysis.
//!
//! Reads a PPTX template into the layout model used by the assembler,
//! together with the theme font, the theme accent colours and every
//! picture found on the template's own slides.

use crate::package::{
    attribute, extract_number, int_attribute, local_name, resolve_target, Package,
    REL_NOTES_MASTER, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, REL_THEME,
};
use deck_core::geometry::{emu_to_inches, Rect};
use deck_core::{
    Error, FontDescriptor, ImagePool, ImagePoolEntry, LayoutDescriptor, PlaceholderDescriptor,
    PlaceholderRole, Result, TemplateStructure,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;

const DEFAULT_PRESENTATION: &str = "ppt/presentation.xml";

/// 10 x 7.5 inches, used when `<p:sldSz>` is missing.
const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;
const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;

const MAX_ACCENTS: usize = 6;

/// Raw placeholder code for a `<p:ph>` type token. `None` for footer
/// placeholders, which are not content regions.
pub fn placeholder_code(token: Option<&str>, vertical: bool) -> Option<u16> {
    let code = match token.unwrap_or("body") {
        "title" => 1,
        "body" => 2,
        "ctrTitle" => 3,
        "subTitle" => 4,
        "obj" => 7,
        "chart" => 8,
        "clipArt" => 9,
        "media" => 10,
        "dgm" => 11,
        "tbl" => 12,
        "pic" => 18,
        "sldImg" => 101,
        "sldNum" | "hdr" | "ftr" | "dt" => return None,
        _ => 0,
    };

    Some(match (code, vertical) {
        (1, true) => 5,
        (2, true) => 6,
        (7, true) => 17,
        (code, _) => code,
    })
}

/// The `<p:ph>` type token and orientation for a raw code.
pub fn placeholder_token(code: u16) -> (Option<&'static str>, bool) {
    match code {
        1 => (Some("title"), false),
        2 => (None, false),
        3 => (Some("ctrTitle"), false),
        4 => (Some("subTitle"), false),
        5 => (Some("title"), true),
        6 => (None, true),
        7 => (Some("obj"), false),
        8 => (Some("chart"), false),
        9 => (Some("clipArt"), false),
        10 => (Some("media"), false),
        11 => (Some("dgm"), false),
        12 => (Some("tbl"), false),
        17 => (Some("obj"), true),
        18 => (Some("pic"), false),
        101 => (Some("sldImg"), false),
        _ => (None, false),
    }
}

/// Where the parts that matter live inside a template package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParts {
    pub presentation: String,
    pub master: String,

    /// Layout parts in layout index order.
    pub layouts: Vec<String>,

    pub notes_master: Option<String>,
    pub theme: Option<String>,

    /// Existing slide parts in presentation order.
    pub slides: Vec<String>,
}

/// Everything learned from a template.
#[derive(Debug, Clone)]
pub struct AnalyzedTemplate {
    pub structure: TemplateStructure,
    pub pool: ImagePool,

    /// Typeface for text whose placeholder names none.
    pub theme_font: Option<String>,

    /// Theme accent colours as hex RGB.
    pub accent_colors: Vec<String>,
}

/// Serializable view of an analysed template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateReport<'a> {
    pub width: f64,
    pub height: f64,
    pub aspect_ratio: f64,
    pub theme_font: Option<&'a str>,
    pub accent_colors: &'a [String],
    pub images: usize,
    pub layouts: Vec<LayoutReport<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport<'a> {
    pub index: usize,
    pub name: &'a str,
    pub summary: String,
    pub placeholders: &'a [PlaceholderDescriptor],
}

impl AnalyzedTemplate {
    pub fn report(&self) -> TemplateReport<'_> {
        TemplateReport {
            width: self.structure.width,
            height: self.structure.height,
            aspect_ratio: self.structure.aspect_ratio(),
            theme_font: self.theme_font.as_deref(),
            accent_colors: &self.accent_colors,
            images: self.pool.len(),
            layouts: self
                .structure
                .layouts
                .iter()
                .map(|l| LayoutReport {
                    index: l.index,
                    name: &l.name,
                    summary: l.summary(),
                    placeholders: &l.placeholders,
                })
                .collect(),
        }
    }
}

/// Analyse template bytes. Any failure is reported as
/// [`Error::TemplateUnreadable`].
pub fn analyze(bytes: &[u8]) -> Result<AnalyzedTemplate> {
    let package = Package::from_bytes(bytes).map_err(unreadable)?;
    analyze_package(&package).map_err(unreadable)
}

fn unreadable(e: Error) -> Error {
    match e {
        Error::TemplateUnreadable(_) => e,
        other => Error::TemplateUnreadable(other.to_string()),
    }
}

pub(crate) fn analyze_package(package: &Package) -> Result<AnalyzedTemplate> {
    let parts = discover_parts(package)?;
    let presentation = parse_presentation(&package.part_text(&parts.presentation)?)?;
    let width = emu_to_inches(presentation.width);
    let height = emu_to_inches(presentation.height);

    let master = parse_shapes(&package.part_text(&parts.master)?)?;

    let mut layouts = Vec::with_capacity(parts.layouts.len());
    for (index, path) in parts.layouts.iter().enumerate() {
        let shapes = parse_shapes(&package.part_text(path)?)?;
        let name = shapes.name.unwrap_or_else(|| format!("Layout {}", index + 1));
        let placeholders = shapes
            .placeholders
            .iter()
            .filter_map(|raw| build_placeholder(raw, &master.placeholders, width, height))
            .collect();
        layouts.push(LayoutDescriptor::new(index, name, placeholders));
    }
    if layouts.is_empty() {
        return Err(Error::TemplateUnreadable(
            "template has no slide layouts".to_string(),
        ));
    }

    let (major_font, accent_colors) = match &parts.theme {
        Some(theme) => parse_theme(&package.part_text(theme)?)?,
        None => (None, Vec::new()),
    };

    let layout_font = layouts[0]
        .placeholders
        .iter()
        .find(|p| p.role == PlaceholderRole::Title)
        .and_then(|p| p.font.as_ref())
        .and_then(|f| f.family.clone());

    let pool = harvest_images(package, &parts.slides);
    log::debug!(
        "analysed template: {} layouts, {} reusable images",
        layouts.len(),
        pool.len()
    );

    Ok(AnalyzedTemplate {
        structure: TemplateStructure::new(width, height, layouts),
        pool,
        theme_font: layout_font.or(major_font),
        accent_colors,
    })
}

/// Follow the relationships from the package root to the master, its
/// layouts, the theme and the existing slides.
pub fn discover_parts(package: &Package) -> Result<TemplateParts> {
    let presentation = package
        .relationships("")?
        .iter()
        .find(|r| r.rel_type.ends_with("/officeDocument"))
        .map(|r| resolve_target("", &r.target))
        .unwrap_or_else(|| DEFAULT_PRESENTATION.to_string());

    let info = parse_presentation(&package.part_text(&presentation)?)?;
    let presentation_rels = package.relationships(&presentation)?;
    let rels: HashMap<&str, String> = presentation_rels
        .iter()
        .map(|r| (r.id.as_str(), resolve_target(&presentation, &r.target)))
        .collect();

    // Without a master id list, take the first master relationship.
    let master = info
        .masters
        .first()
        .and_then(|id| rels.get(id.as_str()))
        .cloned()
        .or_else(|| {
            presentation_rels
                .iter()
                .find(|r| r.is(REL_SLIDE_MASTER))
                .map(|r| resolve_target(&presentation, &r.target))
        })
        .ok_or_else(|| Error::TemplateUnreadable("template has no slide master".to_string()))?;

    let slides = info
        .slides
        .iter()
        .filter_map(|id| rels.get(id.as_str()).cloned())
        .collect();

    let notes_master = presentation_rels
        .iter()
        .find(|r| r.is(REL_NOTES_MASTER))
        .map(|r| resolve_target(&presentation, &r.target));

    let master_rels = package.relationships(&master)?;
    let master_targets: HashMap<&str, String> = master_rels
        .iter()
        .map(|r| (r.id.as_str(), resolve_target(&master, &r.target)))
        .collect();

    let mut layouts: Vec<String> = layout_ids(&package.part_text(&master)?)?
        .iter()
        .filter_map(|id| master_targets.get(id.as_str()).cloned())
        .collect();
    if layouts.is_empty() {
        let mut linked: Vec<&str> = master_rels
            .iter()
            .filter(|r| r.is(REL_SLIDE_LAYOUT))
            .map(|r| r.target.as_str())
            .collect();
        linked.sort_by_key(|t| extract_number(t));
        layouts = linked.iter().map(|t| resolve_target(&master, t)).collect();
    }
    layouts.retain(|l| package.contains(l));

    let theme = master_rels
        .iter()
        .find(|r| r.is(REL_THEME))
        .map(|r| resolve_target(&master, &r.target));

    Ok(TemplateParts {
        presentation,
        master,
        layouts,
        notes_master,
        theme,
        slides,
    })
}

/// The relationship id attribute (`r:id`) of an element.
fn rel_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| {
            let key = a.key.as_ref();
            key.contains(&b':') && local_name(key) == b"id"
        })
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

#[derive(Debug, Default)]
struct PresentationInfo {
    width: i64,
    height: i64,
    masters: Vec<String>,
    slides: Vec<String>,
}

fn parse_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut info = PresentationInfo {
        width: DEFAULT_SLIDE_WIDTH,
        height: DEFAULT_SLIDE_HEIGHT,
        ..Default::default()
    };

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match local_name(e.name().as_ref()) {
                    b"sldMasterId" => info.masters.extend(rel_id(e)),
                    b"sldId" => info.slides.extend(rel_id(e)),
                    b"sldSz" => {
                        if let (Some(cx), Some(cy)) = (int_attribute(e, b"cx"), int_attribute(e, b"cy")) {
                            info.width = cx;
                            info.height = cy;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(info)
}

fn layout_ids(master_xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(master_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"sldLayoutId" =>
            {
                ids.extend(rel_id(e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide master: {}", e)));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Font properties gathered from a text body; first value wins per field.
#[derive(Debug, Clone, Default, PartialEq)]
struct FontSample {
    family: Option<String>,
    size: Option<f64>,
    bold: Option<bool>,
    italic: Option<bool>,
}

impl FontSample {
    fn absorb(&mut self, e: &BytesStart) {
        if self.size.is_none() {
            self.size = int_attribute(e, b"sz").map(|sz| sz as f64 / 100.0);
        }
        if self.bold.is_none() {
            self.bold = attribute(e, b"b").map(|v| flag(&v));
        }
        if self.italic.is_none() {
            self.italic = attribute(e, b"i").map(|v| flag(&v));
        }
    }

    fn descriptor(&self) -> Option<FontDescriptor> {
        if *self == Self::default() {
            return None;
        }
        Some(FontDescriptor {
            family: self.family.clone(),
            size: self.size,
            bold: self.bold.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
        })
    }
}

fn flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "on")
}

#[derive(Debug, Clone, Default)]
struct RawPlaceholder {
    token: Option<String>,
    idx: u32,
    vertical: bool,
    geometry: Option<Rect>,
    font: FontSample,
}

impl RawPlaceholder {
    fn code(&self) -> Option<u16> {
        placeholder_code(self.token.as_deref(), self.vertical)
    }
}

#[derive(Debug, Default)]
struct ShapeTree {
    name: Option<String>,
    placeholders: Vec<RawPlaceholder>,
}

/// Shape currently being read.
#[derive(Debug, Default)]
struct OpenShape {
    placeholder: Option<RawPlaceholder>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    font: FontSample,
}

/// Read the name and the placeholders of a layout or master.
fn parse_shapes(xml: &str) -> Result<ShapeTree> {
    let mut tree = ShapeTree::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut current: Option<OpenShape> = None;
    let mut in_sp_pr = false;
    let mut in_tx_body = false;
    let mut in_run_props = false;

    loop {
        let (e, is_start) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(ref e)) => {
                match local_name(e.name().as_ref()) {
                    b"sp" => {
                        if let Some(shape) = current.take() {
                            tree.placeholders.extend(shape.finish());
                        }
                        in_sp_pr = false;
                        in_tx_body = false;
                    }
                    b"spPr" => in_sp_pr = false,
                    b"txBody" => in_tx_body = false,
                    b"rPr" | b"defRPr" => in_run_props = false,
                    _ => {}
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing shapes: {}", e)));
            }
            _ => continue,
        };

        let name = e.name();
        match local_name(name.as_ref()) {
            b"cSld" => tree.name = attribute(&e, b"name").filter(|n| !n.trim().is_empty()),
            b"sp" if is_start => current = Some(OpenShape::default()),
            b"ph" => {
                if let Some(shape) = current.as_mut() {
                    shape.placeholder = Some(RawPlaceholder {
                        token: attribute(&e, b"type"),
                        idx: int_attribute(&e, b"idx").unwrap_or(0).max(0) as u32,
                        vertical: attribute(&e, b"orient").as_deref() == Some("vert"),
                        ..Default::default()
                    });
                }
            }
            b"spPr" if is_start && current.is_some() => in_sp_pr = true,
            b"off" if in_sp_pr => {
                if let (Some(shape), Some(x), Some(y)) =
                    (current.as_mut(), int_attribute(&e, b"x"), int_attribute(&e, b"y"))
                {
                    shape.offset = Some((x, y));
                }
            }
            b"ext" if in_sp_pr => {
                if let (Some(shape), Some(cx), Some(cy)) =
                    (current.as_mut(), int_attribute(&e, b"cx"), int_attribute(&e, b"cy"))
                {
                    shape.extent = Some((cx, cy));
                }
            }
            b"txBody" if is_start && current.is_some() => in_tx_body = true,
            b"rPr" | b"defRPr" if in_tx_body => {
                if let Some(shape) = current.as_mut() {
                    shape.font.absorb(&e);
                }
                in_run_props = is_start;
            }
            b"latin" if in_run_props => {
                if let Some(shape) = current.as_mut() {
                    if shape.font.family.is_none() {
                        shape.font.family = attribute(&e, b"typeface")
                            .filter(|t| !t.is_empty() && !t.starts_with('+'));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(tree)
}

impl OpenShape {
    fn finish(self) -> Option<RawPlaceholder> {
        let mut placeholder = self.placeholder?;
        if let (Some((x, y)), Some((cx, cy))) = (self.offset, self.extent) {
            placeholder.geometry = Some(Rect::from_emu(x, y, cx, cy));
        }
        placeholder.font = self.font;
        Some(placeholder)
    }
}

fn is_title_code(code: u16) -> bool {
    matches!(code, 1 | 3 | 5)
}

/// The master placeholder a layout placeholder inherits from.
fn master_counterpart<'a>(
    raw: &RawPlaceholder,
    code: u16,
    master: &'a [RawPlaceholder],
) -> Option<&'a RawPlaceholder> {
    let family: Vec<&RawPlaceholder> = master
        .iter()
        .filter(|m| m.code().is_some_and(|c| is_title_code(c) == is_title_code(code)))
        .collect();

    family
        .iter()
        .find(|m| m.idx == raw.idx)
        .or_else(|| family.first())
        .copied()
        .or_else(|| master.iter().find(|m| m.idx == raw.idx))
}

fn build_placeholder(
    raw: &RawPlaceholder,
    master: &[RawPlaceholder],
    width: f64,
    height: f64,
) -> Option<PlaceholderDescriptor> {
    let code = raw.code()?;
    let inherited = master_counterpart(raw, code, master);

    let geometry = raw
        .geometry
        .or_else(|| inherited.and_then(|m| m.geometry))
        .unwrap_or_default();
    let font = raw
        .font
        .descriptor()
        .or_else(|| inherited.and_then(|m| m.font.descriptor()));

    Some(PlaceholderDescriptor::new(code, raw.idx, geometry, width, height).with_font(font))
}

/// Major latin typeface and accent colours of a theme.
fn parse_theme(xml: &str) -> Result<(Option<String>, Vec<String>)> {
    let mut major = None;
    let mut accents = Vec::new();

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut in_major = false;
    let mut in_accent = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"majorFont" => in_major = true,
                    b"latin" if in_major && major.is_none() => {
                        major = attribute(e, b"typeface").filter(|t| !t.is_empty());
                    }
                    b"srgbClr" if in_accent => {
                        accents.extend(attribute(e, b"val").map(|v| v.to_uppercase()));
                        in_accent = false;
                    }
                    b"sysClr" if in_accent => {
                        accents.extend(attribute(e, b"lastClr").map(|v| v.to_uppercase()));
                        in_accent = false;
                    }
                    _ if is_accent(local) && accents.len() < MAX_ACCENTS => in_accent = true,
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"majorFont" {
                    in_major = false;
                } else if is_accent(local) {
                    in_accent = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing theme: {}", e)));
            }
            _ => {}
        }
    }

    Ok((major, accents))
}

fn is_accent(name: &[u8]) -> bool {
    name.len() == 7 && name.starts_with(b"accent") && name[6].is_ascii_digit()
}

#[derive(Debug)]
struct RawPicture {
    embed: String,
    extent: Option<(i64, i64)>,
}

/// Pictures on a slide, in document order.
fn parse_pictures(xml: &str) -> Result<Vec<RawPicture>> {
    let mut pictures = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut current: Option<(Option<String>, Option<(i64, i64)>)> = None;
    let mut in_sp_pr = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"pic" => current = Some((None, None)),
                    b"blip" => {
                        if let Some((embed, _)) = current.as_mut() {
                            *embed = e
                                .attributes()
                                .flatten()
                                .find(|a| local_name(a.key.as_ref()) == b"embed")
                                .map(|a| String::from_utf8_lossy(&a.value).to_string());
                        }
                    }
                    b"spPr" if current.is_some() => in_sp_pr = true,
                    b"ext" if in_sp_pr => {
                        if let (Some((_, extent)), Some(cx), Some(cy)) =
                            (current.as_mut(), int_attribute(e, b"cx"), int_attribute(e, b"cy"))
                        {
                            *extent = Some((cx, cy));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"pic" => {
                    if let Some((Some(embed), extent)) = current.take() {
                        pictures.push(RawPicture { embed, extent });
                    }
                    in_sp_pr = false;
                }
                b"spPr" => in_sp_pr = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(pictures)
}

/// Collect every picture on the template's slides. Problems with a single
/// slide or picture are logged and skipped.
fn harvest_images(package: &Package, slides: &[String]) -> ImagePool {
    let mut entries = Vec::new();

    for (slide_index, slide) in slides.iter().enumerate() {
        let pictures = match package.part_text(slide).and_then(|xml| parse_pictures(&xml)) {
            Ok(pictures) => pictures,
            Err(e) => {
                log::warn!("skipping images on '{}': {}", slide, e);
                continue;
            }
        };
        if pictures.is_empty() {
            continue;
        }
        let rels = match package.relationships(slide) {
            Ok(rels) => rels,
            Err(e) => {
                log::warn!("skipping images on '{}': {}", slide, e);
                continue;
            }
        };

        for picture in pictures {
            let Some(rel) = rels.iter().find(|r| r.id == picture.embed && !r.external) else {
                log::warn!("'{}': picture {} has no image part", slide, picture.embed);
                continue;
            };
            let target = resolve_target(slide, &rel.target);
            let Some(bytes) = package.part(&target) else {
                log::warn!("'{}': image part '{}' is missing", slide, target);
                continue;
            };
            let (cx, cy) = picture.extent.unwrap_or((0, 0));
            let extension = target
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .unwrap_or_else(|| "png".to_string());

            entries.push(ImagePoolEntry {
                bytes: bytes.to_vec(),
                width: emu_to_inches(cx),
                height: emu_to_inches(cy),
                source_slide: slide_index,
                extension,
            });
        }
    }

    ImagePool::new(entries)
}
