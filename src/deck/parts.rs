//! XML parts of a minimal presentation package.
//!
//! One slide master, one blank layout, one theme. Slides reference the
//! layout; pictures are `p:pic` elements with a stretched `a:blip`.

use crate::types::{Placement, Rgb, SlideGeometry};
use std::fmt::Write;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_OFFICE_DOC: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

pub const CONTENT_TYPES: &str = "[Content_Types].xml";
pub const ROOT_RELS: &str = "_rels/.rels";
pub const APP: &str = "docProps/app.xml";
pub const CORE: &str = "docProps/core.xml";
pub const PRESENTATION: &str = "ppt/presentation.xml";
pub const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
pub const MASTER: &str = "ppt/slideMasters/slideMaster1.xml";
pub const MASTER_RELS: &str = "ppt/slideMasters/_rels/slideMaster1.xml.rels";
pub const LAYOUT: &str = "ppt/slideLayouts/slideLayout1.xml";
pub const LAYOUT_RELS: &str = "ppt/slideLayouts/_rels/slideLayout1.xml.rels";
pub const THEME: &str = "ppt/theme/theme1.xml";

/// `ppt/slides/slideN.xml`, 1-based.
pub fn slide_name(number: usize) -> String {
    format!("ppt/slides/slide{number}.xml")
}

pub fn slide_rels_name(number: usize) -> String {
    format!("ppt/slides/_rels/slide{number}.xml.rels")
}

/// Relationship id of slide `number` inside `presentation.xml.rels`.
/// rId1 and rId2 are the master and the theme.
fn slide_rel_id(number: usize) -> String {
    format!("rId{}", number + 2)
}

/// Relationship id of picture `index` inside a slide's rels. rId1 is the layout.
pub fn picture_rel_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

pub fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="jpeg" ContentType="image/jpeg"/>
<Default Extension="png" ContentType="image/png"/>
<Default Extension="gif" ContentType="image/gif"/>
<Default Extension="bmp" ContentType="image/bmp"/>
<Override PartName="/{PRESENTATION}" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
<Override PartName="/{MASTER}" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
<Override PartName="/{LAYOUT}" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
<Override PartName="/{THEME}" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
<Override PartName="/{CORE}" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/{APP}" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#
    );
    for n in 1..=slide_count {
        let _ = writeln!(
            xml,
            r#"<Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            slide_name(n)
        );
    }
    xml.push_str("</Types>");
    xml
}

pub fn root_rels() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_RELS}">
<Relationship Id="rId1" Type="{REL_OFFICE_DOC}" Target="{PRESENTATION}"/>
<Relationship Id="rId2" Type="{REL_CORE}" Target="{CORE}"/>
<Relationship Id="rId3" Type="{REL_APP}" Target="{APP}"/>
</Relationships>"#
    )
}

pub fn app(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>photodeck</Application>
<Slides>{slide_count}</Slides>
</Properties>"#
    )
}

pub fn core(title: &str) -> String {
    let title = quick_xml::escape::escape(title);
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>{title}</dc:title>
<dc:creator>photodeck</dc:creator>
<cp:revision>1</cp:revision>
</cp:coreProperties>"#
    )
}

pub fn presentation(geometry: SlideGeometry, slide_count: usize) -> String {
    let mut ids = String::new();
    for n in 1..=slide_count {
        let _ = write!(
            ids,
            r#"<p:sldId id="{}" r:id="{}"/>"#,
            255 + n,
            slide_rel_id(n)
        );
    }
    // an empty sldIdLst is invalid, omit it instead
    let id_list = if ids.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{ids}</p:sldIdLst>")
    };
    let (cx, cy) = (geometry.width, geometry.height);
    format!(
        r#"{XML_DECL}
<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
{id_list}
<p:sldSz cx="{cx}" cy="{cy}"/>
<p:notesSz cx="{cy}" cy="{cx}"/>
</p:presentation>"#
    )
}

pub fn presentation_rels(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_RELS}">
<Relationship Id="rId1" Type="{REL_MASTER}" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="{REL_THEME}" Target="theme/theme1.xml"/>
"#
    );
    for n in 1..=slide_count {
        let _ = writeln!(
            xml,
            r#"<Relationship Id="{}" Type="{REL_SLIDE}" Target="slides/slide{n}.xml"/>"#,
            slide_rel_id(n)
        );
    }
    xml.push_str("</Relationships>");
    xml
}

const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

pub fn master() -> String {
    format!(
        r#"{XML_DECL}
<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>"#
    )
}

pub fn master_rels() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_RELS}">
<Relationship Id="rId1" Type="{REL_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="{REL_THEME}" Target="../theme/theme1.xml"/>
</Relationships>"#
    )
}

pub fn layout() -> String {
    format!(
        r#"{XML_DECL}
<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1">
<p:cSld name="Blank"><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#
    )
}

pub fn layout_rels() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_RELS}">
<Relationship Id="rId1" Type="{REL_MASTER}" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#
    )
}

pub fn theme() -> String {
    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    format!(
        r#"{XML_DECL}
<a:theme xmlns:a="{NS_A}" name="Photodeck">
<a:themeElements>
<a:clrScheme name="Photodeck">
<a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1>
<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>
<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>
<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
</a:clrScheme>
<a:fontScheme name="Photodeck">
<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
</a:fontScheme>
<a:fmtScheme name="Photodeck">
<a:fillStyleLst>{solid}{solid}{solid}</a:fillStyleLst>
<a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>
<a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>
<a:bgFillStyleLst>{solid}{solid}{solid}</a:bgFillStyleLst>
</a:fmtScheme>
</a:themeElements>
</a:theme>"#
    )
}

/// A picture as referenced from slide XML.
pub struct PictureRef<'a> {
    pub rel_id: String,
    pub placement: &'a Placement,
}

pub fn slide(number: usize, background: Option<Rgb>, pictures: &[PictureRef<'_>]) -> String {
    let bg = match background {
        Some(color) => format!(
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            color.to_hex()
        ),
        None => String::new(),
    };

    let mut shapes = String::new();
    for (i, picture) in pictures.iter().enumerate() {
        let id = i + 2;
        let Placement {
            left,
            top,
            width,
            height,
            ..
        } = *picture.placement;
        let _ = write!(
            shapes,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{left}" y="{top}"/><a:ext cx="{width}" cy="{height}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            rel = picture.rel_id,
        );
    }

    format!(
        r#"{XML_DECL}
<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:cSld name="Slide {number}">{bg}<p:spTree>{EMPTY_TREE}{shapes}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#
    )
}

/// Slide relationships: the layout, then one image per entry of `media`.
pub fn slide_rels(media: &[String]) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_RELS}">
<Relationship Id="rId1" Type="{REL_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/>
"#
    );
    for (i, name) in media.iter().enumerate() {
        let _ = writeln!(
            xml,
            r#"<Relationship Id="{}" Type="{REL_IMAGE}" Target="../media/{name}"/>"#,
            picture_rel_id(i)
        );
    }
    xml.push_str("</Relationships>");
    xml
}
