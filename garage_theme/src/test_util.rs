use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};


pub(crate) const BRAND_THEME_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Garage Brand">"#,
    r#"<a:themeElements>"#,
    r#"<a:clrScheme name="Garage">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
    r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="0067B9"/></a:dk2>"#,
    r#"<a:lt2><a:srgbClr val="9EA1AE"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="00325C"/></a:accent1>"#,
    r#"<a:accent2><a:srgbClr val="1B9CD0"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="8637BA"/></a:accent3>"#,
    r#"<a:accent4><a:srgbClr val="179963"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="fed141"/></a:accent5>"#,
    r#"<a:accent6><a:srgbClr val="C81A28"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0067B9"/></a:hlink>"#,
    r#"<a:folHlink><a:srgbClr val="3C4157"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Garage">"#,
    r#"<a:majorFont><a:latin typeface="Barlow Medium"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Barlow"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Garage"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst></a:fmtScheme>"#,
    r#"</a:themeElements>"#,
    r#"</a:theme>"#,
);

pub(crate) const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"</Types>"#,
);


pub(crate) fn theme_xml(name: Option<&str>, color_scheme_body: &str, font_scheme_body: &str) -> String {
    let name_attribute = match name {
        Some(n) => format!(r#" name="{}""#, n),
        None => String::new(),
    };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"{}>"#,
            r#"<a:themeElements>"#,
            r#"<a:clrScheme name="Test">{}</a:clrScheme>"#,
            r#"<a:fontScheme name="Test">{}</a:fontScheme>"#,
            r#"</a:themeElements>"#,
            r#"</a:theme>"#,
        ),
        name_attribute, color_scheme_body, font_scheme_body,
    )
}


pub(crate) fn write_package(path: &Path, members: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, data) in members {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

pub(crate) fn read_package(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    let mut members = BTreeMap::new();
    for i in 0..archive.len() {
        let mut member = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        member.read_to_end(&mut data).unwrap();
        members.insert(member.name().to_owned(), data);
    }
    members
}

pub(crate) fn member_names(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_owned())
        .collect()
}


/// A small presentation package carrying `theme_xml` as its theme and a marker string in its
/// master and layout parts.
pub(crate) fn write_presentation(path: &Path, theme_xml: &str, marker: &str) {
    let master = format!("<sldMaster>{}</sldMaster>", marker);
    let layout = format!("<sldLayout>{}</sldLayout>", marker);
    let slide = format!("<sld>{}</sld>", marker);
    write_package(path, &[
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", "<Relationships/>".as_bytes()),
        ("ppt/presentation.xml", "<presentation/>".as_bytes()),
        ("ppt/slides/slide1.xml", slide.as_bytes()),
        ("ppt/theme/theme1.xml", theme_xml.as_bytes()),
        ("ppt/slideMasters/slideMaster1.xml", master.as_bytes()),
        ("ppt/slideMasters/_rels/slideMaster1.xml.rels", "<Relationships/>".as_bytes()),
        ("ppt/slideLayouts/slideLayout1.xml", layout.as_bytes()),
    ]);
}
