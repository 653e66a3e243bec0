//! In-memory template packages for tests.

use crate::package::Package;

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

/// Builds a small but complete PPTX template: one master, three layouts
/// ("Title Slide", "Title and Content", "Picture with Caption"), a theme,
/// and one slide carrying a 4in x 3in picture.
pub struct TemplateBuilder {
    plain_title_font: bool,
    dangling_picture: bool,
    notes_master: bool,
}

fn placeholder(id: u32, ph: &str, xfrm: Option<(i64, i64, i64, i64)>, body: &str) -> String {
    let sp_pr = match xfrm {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Placeholder {id}"/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr>{sp_pr}<p:txBody><a:bodyPr/>{body}</p:txBody></p:sp>"#
    )
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_NS, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn layout(name: &str, shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS}><p:cSld name="{name}"><p:spTree>{GROUP_PROPS}{}</p:spTree></p:cSld></p:sldLayout>"#,
        shapes.concat()
    )
}

impl TemplateBuilder {
    pub fn standard() -> Self {
        Self {
            plain_title_font: false,
            dangling_picture: false,
            notes_master: false,
        }
    }

    /// Leave the first layout's title without its own font.
    pub fn with_plain_title_font(mut self) -> Self {
        self.plain_title_font = true;
        self
    }

    /// Add a second picture whose relationship does not exist.
    pub fn with_dangling_picture(mut self) -> Self {
        self.dangling_picture = true;
        self
    }

    pub fn with_notes_master(mut self) -> Self {
        self.notes_master = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut package = Package::default();

        let notes_override = if self.notes_master {
            r#"<Override PartName="/ppt/notesMasters/notesMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml"/>"#
        } else {
            ""
        };
        package.set_part(
            "[Content_Types].xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout3.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{notes_override}</Types>"#
            )
            .into_bytes(),
        );

        package.set_part(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]).into_bytes(),
        );

        let notes_list = if self.notes_master {
            r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId4"/></p:notesMasterIdLst>"#
        } else {
            ""
        };
        package.set_part(
            "ppt/presentation.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{notes_list}<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
            )
            .into_bytes(),
        );

        let mut presentation_rels = vec![
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            ("rId2", "slide", "slides/slide1.xml"),
            ("rId3", "theme", "theme/theme1.xml"),
        ];
        if self.notes_master {
            presentation_rels.push(("rId4", "notesMaster", "notesMasters/notesMaster1.xml"));
        }
        package.set_part(
            "ppt/_rels/presentation.xml.rels",
            rels(&presentation_rels).into_bytes(),
        );

        let master_shapes = [
            placeholder(
                2,
                r#"<p:ph type="title"/>"#,
                Some((457_200, 274_320, 8_229_600, 1_143_000)),
                r#"<a:lstStyle><a:lvl1pPr><a:defRPr sz="4400"/></a:lvl1pPr></a:lstStyle><a:p/>"#,
            ),
            placeholder(
                3,
                r#"<p:ph type="body" idx="1"/>"#,
                Some((457_200, 1_600_200, 8_229_600, 4_525_963)),
                "<a:p/>",
            ),
            placeholder(
                4,
                r#"<p:ph type="dt" sz="half" idx="2"/>"#,
                Some((457_200, 6_356_350, 2_133_600, 365_125)),
                "<a:p/>",
            ),
        ];
        package.set_part(
            "ppt/slideMasters/slideMaster1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {NS}><p:cSld><p:spTree>{GROUP_PROPS}{}</p:spTree></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/><p:sldLayoutId id="2147483651" r:id="rId3"/></p:sldLayoutIdLst></p:sldMaster>"#,
                master_shapes.concat()
            )
            .into_bytes(),
        );
        package.set_part(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml"),
                ("rId3", "slideLayout", "../slideLayouts/slideLayout3.xml"),
                ("rId4", "theme", "../theme/theme1.xml"),
            ])
            .into_bytes(),
        );

        let title_font = if self.plain_title_font {
            r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>Click to edit title</a:t></a:r></a:p>"#
        } else {
            r#"<a:p><a:r><a:rPr lang="en-US" sz="4000" b="1"><a:latin typeface="Georgia"/></a:rPr><a:t>Click to edit title</a:t></a:r></a:p>"#
        };
        let layouts = [
            layout(
                "Title Slide",
                &[
                    placeholder(
                        2,
                        r#"<p:ph type="ctrTitle"/>"#,
                        Some((685_800, 2_130_425, 7_772_400, 1_470_025)),
                        title_font,
                    ),
                    placeholder(
                        3,
                        r#"<p:ph type="subTitle" idx="1"/>"#,
                        Some((1_371_600, 3_886_200, 6_400_800, 1_752_600)),
                        "<a:p/>",
                    ),
                ],
            ),
            layout(
                "Title and Content",
                &[
                    placeholder(2, r#"<p:ph type="title"/>"#, None, "<a:p/>"),
                    placeholder(
                        3,
                        r#"<p:ph idx="1"/>"#,
                        Some((457_200, 1_600_200, 8_229_600, 4_525_963)),
                        "<a:p/>",
                    ),
                    placeholder(
                        4,
                        r#"<p:ph type="ftr" sz="quarter" idx="11"/>"#,
                        Some((3_124_200, 6_356_350, 2_895_600, 365_125)),
                        "<a:p/>",
                    ),
                ],
            ),
            layout(
                "Picture with Caption",
                &[
                    placeholder(
                        2,
                        r#"<p:ph type="title"/>"#,
                        Some((457_200, 274_320, 3_657_600, 914_400)),
                        "<a:p/>",
                    ),
                    placeholder(
                        3,
                        r#"<p:ph type="pic" idx="1"/>"#,
                        Some((4_572_000, 1_600_200, 4_114_800, 4_525_963)),
                        "<a:p/>",
                    ),
                    placeholder(
                        4,
                        r#"<p:ph type="body" sz="half" idx="2"/>"#,
                        Some((457_200, 1_371_600, 3_657_600, 4_754_563)),
                        "<a:p/>",
                    ),
                ],
            ),
        ];
        for (i, xml) in layouts.iter().enumerate() {
            package.set_part(
                &format!("ppt/slideLayouts/slideLayout{}.xml", i + 1),
                xml.clone().into_bytes(),
            );
            package.set_part(
                &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).into_bytes(),
            );
        }

        package.set_part(
            "ppt/theme/theme1.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ed7d31"/></a:accent2></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Aptos Display"/></a:majorFont><a:minorFont><a:latin typeface="Aptos"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#
                .as_bytes()
                .to_vec(),
        );

        let picture = |id: u32, embed: &str| {
            format!(
                r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{embed}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="914400" y="1828800"/><a:ext cx="3657600" cy="2743200"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
            )
        };
        let mut slide_shapes = vec![
            placeholder(
                2,
                r#"<p:ph type="title"/>"#,
                None,
                "<a:p><a:r><a:t>Sample</a:t></a:r></a:p>",
            ),
            picture(3, "rId2"),
        ];
        if self.dangling_picture {
            slide_shapes.push(picture(4, "rId9"));
        }
        package.set_part(
            "ppt/slides/slide1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld><p:spTree>{GROUP_PROPS}{}</p:spTree></p:cSld></p:sld>"#,
                slide_shapes.concat()
            )
            .into_bytes(),
        );
        package.set_part(
            "ppt/slides/_rels/slide1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout3.xml"),
                ("rId2", "image", "../media/image1.png"),
            ])
            .into_bytes(),
        );
        package.set_part("ppt/media/image1.png", PNG_BYTES.to_vec());

        if self.notes_master {
            package.set_part(
                "ppt/notesMasters/notesMaster1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notesMaster {NS}><p:cSld><p:spTree>{GROUP_PROPS}</p:spTree></p:cSld></p:notesMaster>"#
                )
                .into_bytes(),
            );
            package.set_part(
                "ppt/notesMasters/_rels/notesMaster1.xml.rels",
                rels(&[("rId1", "theme", "../theme/theme1.xml")]).into_bytes(),
            );
        }

        package.to_bytes().unwrap()
    }
}
