use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::SerializeMap;
use sxd_document::Package;
use sxd_document::dom::Element;
use tracing::{debug, warn};

use crate::Error;
use crate::color::HexPolicy;
use crate::semantic::SemanticColorMap;
use crate::xml::{DocExt, ElemExt};


pub const UNKNOWN_THEME_NAME: &str = "Unknown Theme";


/// One of the twelve color slots of a theme's color scheme.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ThemeRole {
    Dark1, // <dk1>
    Light1, // <lt1>
    Dark2, // <dk2>
    Light2, // <lt2>
    Accent1, // <accent1>
    Accent2, // <accent2>
    Accent3, // <accent3>
    Accent4, // <accent4>
    Accent5, // <accent5>
    Accent6, // <accent6>
    Hyperlink, // <hlink>
    FollowedHyperlink, // <folHlink>
}
impl ThemeRole {
    pub const ALL: [ThemeRole; 12] = [
        Self::Dark1, Self::Light1, Self::Dark2, Self::Light2,
        Self::Accent1, Self::Accent2, Self::Accent3, Self::Accent4, Self::Accent5, Self::Accent6,
        Self::Hyperlink, Self::FollowedHyperlink,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dark1 => "dk1",
            Self::Light1 => "lt1",
            Self::Dark2 => "dk2",
            Self::Light2 => "lt2",
            Self::Accent1 => "accent1",
            Self::Accent2 => "accent2",
            Self::Accent3 => "accent3",
            Self::Accent4 => "accent4",
            Self::Accent5 => "accent5",
            Self::Accent6 => "accent6",
            Self::Hyperlink => "hlink",
            Self::FollowedHyperlink => "folHlink",
        }
    }

    pub fn try_from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter()
            .filter(|role| role.as_str() == s)
            .nth(0)
    }
}
impl fmt::Display for ThemeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// The color values a theme states for its roles.
///
/// Values are kept as hex strings without `#`. Roles the theme does not define (or defines in a form
/// that carries no concrete value) are simply missing.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ThemeColorSet {
    colors: BTreeMap<ThemeRole, String>,
}
impl ThemeColorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from role names and values, skipping names that are not theme roles.
    pub fn from_named_values<I, K, V>(named_values: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: AsRef<str>,
            V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in named_values {
            match ThemeRole::try_from_str(name.as_ref()) {
                Some(role) => set.insert(role, value),
                None => warn!("skipping unknown theme color role {:?}", name.as_ref()),
            }
        }
        set
    }

    pub fn get(&self, role: ThemeRole) -> Option<&str> {
        self.colors.get(&role).map(|v| v.as_str())
    }

    pub fn insert<V: Into<String>>(&mut self, role: ThemeRole, value: V) {
        self.colors.insert(role, value.into());
    }

    pub fn len(&self) -> usize { self.colors.len() }
    pub fn is_empty(&self) -> bool { self.colors.is_empty() }

    /// Iterates over the defined roles in canonical role order.
    pub fn iter(&self) -> impl Iterator<Item = (ThemeRole, &str)> + '_ {
        self.colors.iter()
            .map(|(role, value)| (*role, value.as_str()))
    }

    pub fn semantic(&self) -> SemanticColorMap {
        SemanticColorMap::from_theme_colors(self)
    }
}
impl FromIterator<(ThemeRole, String)> for ThemeColorSet {
    fn from_iter<T: IntoIterator<Item = (ThemeRole, String)>>(iter: T) -> Self {
        Self { colors: iter.into_iter().collect() }
    }
}
impl Serialize for ThemeColorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.colors.len()))?;
        for (role, value) in self.iter() {
            map.serialize_entry(role.as_str(), value)?;
        }
        map.end()
    }
}
impl<'de> Deserialize<'de> for ThemeColorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named_values: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
        Ok(Self::from_named_values(named_values))
    }
}


#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FontRole {
    Major, // <majorFont>
    Minor, // <minorFont>
}
impl FontRole {
    pub const ALL: [FontRole; 2] = [Self::Major, Self::Minor];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "majorFont",
            Self::Minor => "minorFont",
        }
    }
}


/// Latin typefaces of the theme's heading (major) and body (minor) fonts.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct FontScheme {
    pub major: Option<String>,
    pub minor: Option<String>,
}
impl FontScheme {
    pub fn get(&self, role: FontRole) -> Option<&str> {
        match role {
            FontRole::Major => self.major.as_deref(),
            FontRole::Minor => self.minor.as_deref(),
        }
    }

    fn set(&mut self, role: FontRole, typeface: String) {
        match role {
            FontRole::Major => self.major = Some(typeface),
            FontRole::Minor => self.minor = Some(typeface),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FontRole, &str)> + '_ {
        FontRole::ALL.into_iter()
            .filter_map(|role| self.get(role).map(|typeface| (role, typeface)))
    }
}
impl Serialize for FontScheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (role, typeface) in self.iter() {
            map.serialize_entry(role.as_str(), typeface)?;
        }
        map.end()
    }
}


/// Everything read from the theme part of a package.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ExtractedTheme {
    pub name: String,
    pub colors: ThemeColorSet,
    pub fonts: FontScheme,
    pub member_path: String,
    pub raw_xml: Vec<u8>,
}
impl ExtractedTheme {
    pub fn parse(member_path: &str, raw_xml: Vec<u8>, hex_policy: HexPolicy) -> Result<Self, Error> {
        let package = decode_theme_xml(member_path, &raw_xml)?;
        let doc = package.as_document();
        let root = doc.root_element()
            .ok_or_else(|| Error::MissingRootElement { member: member_path.to_owned() })?;

        let name = root.attribute_value("name")
            .unwrap_or(UNKNOWN_THEME_NAME)
            .to_owned();

        let mut colors = ThemeColorSet::new();
        let mut fonts = FontScheme::default();
        for elem in root.descendants_or_self() {
            if elem.is_drawingml("clrScheme") {
                read_color_scheme(elem, hex_policy, &mut colors);
            } else if elem.is_drawingml("fontScheme") {
                read_font_scheme(elem, &mut fonts);
            }
        }
        debug!(
            "theme {:?} in {:?}: {} of {} color roles, {} font roles",
            name, member_path, colors.len(), ThemeRole::ALL.len(), fonts.iter().count(),
        );

        Ok(Self {
            name,
            colors,
            fonts,
            member_path: member_path.to_owned(),
            raw_xml,
        })
    }
}


pub(crate) fn decode_theme_xml(member_path: &str, raw_xml: &[u8]) -> Result<Package, Error> {
    let xml_string = String::from_utf8(raw_xml.to_vec())
        .map_err(|utf8_error| Error::ThemeNotUtf8 { member: member_path.to_owned(), utf8_error })?;
    let xml_str = xml_string.strip_prefix('\u{FEFF}').unwrap_or(&xml_string);
    sxd_document::parser::parse(xml_str)
        .map_err(|parse_error| Error::XmlParsingFailed { member: member_path.to_owned(), parse_error })
}


fn read_color_scheme(clr_scheme: Element<'_>, hex_policy: HexPolicy, colors: &mut ThemeColorSet) {
    for child in clr_scheme.child_elements() {
        let Some(role) = ThemeRole::try_from_str(child.name().local_part()) else { continue };
        if !child.is_drawingml(role.as_str()) {
            continue;
        }
        let Some(value) = color_value(child) else { continue };

        let value = value.to_uppercase();
        if !hex_policy.admits(&value) {
            warn!("ignoring malformed color {:?} for theme role {}", value, role);
            continue;
        }
        colors.insert(role, value);
    }
}

/// Obtains the concrete color value stated by a color role element.
///
/// The first `srgbClr` or `sysClr` child decides; for `sysClr`, the last known concrete value is used
/// and the symbolic name is ignored. Other color forms carry no concrete value.
fn color_value<'d>(role_elem: Element<'d>) -> Option<&'d str> {
    for child in role_elem.child_elements() {
        if child.is_drawingml("srgbClr") {
            return child.non_empty_attribute_value("val");
        } else if child.is_drawingml("sysClr") {
            return child.non_empty_attribute_value("lastClr");
        }
    }
    debug!("theme role {:?} has no concrete color value", role_elem.name().local_part());
    None
}

fn read_font_scheme(font_scheme: Element<'_>, fonts: &mut FontScheme) {
    for role in FontRole::ALL {
        for font_collection in font_scheme.child_elements_named_dml(role.as_str()) {
            for latin in font_collection.child_elements_named_dml("latin") {
                if let Some(typeface) = latin.non_empty_attribute_value("typeface") {
                    fonts.set(role, typeface.to_owned());
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{theme_xml, BRAND_THEME_XML};

    fn parse(xml: &str) -> ExtractedTheme {
        ExtractedTheme::parse("ppt/theme/theme1.xml", xml.as_bytes().to_vec(), HexPolicy::PassThrough)
            .unwrap()
    }

    #[test]
    fn test_full_theme() {
        let theme = parse(BRAND_THEME_XML);
        assert_eq!(theme.name, "Garage Brand");
        assert_eq!(theme.colors.len(), 12);
        assert_eq!(theme.colors.get(ThemeRole::Dark1), Some("000000"));
        assert_eq!(theme.colors.get(ThemeRole::Light1), Some("FFFFFF"));
        assert_eq!(theme.colors.get(ThemeRole::Accent1), Some("00325C"));
        assert_eq!(theme.colors.get(ThemeRole::Accent5), Some("FED141"));
        assert_eq!(theme.colors.get(ThemeRole::FollowedHyperlink), Some("3C4157"));
        assert_eq!(theme.fonts.major.as_deref(), Some("Barlow Medium"));
        assert_eq!(theme.fonts.minor.as_deref(), Some("Barlow"));
    }

    #[test]
    fn test_missing_roles() {
        let theme = parse(&theme_xml(
            Some("Sparse"),
            r#"<a:dk1><a:srgbClr val="000000"/></a:dk1><a:accent1><a:srgbClr val="FF0000"/></a:accent1>"#,
            "",
        ));
        let expected: ThemeColorSet = [
            (ThemeRole::Dark1, "000000".to_owned()),
            (ThemeRole::Accent1, "FF0000".to_owned()),
        ].into_iter().collect();
        assert_eq!(theme.colors, expected);
        assert_eq!(theme.fonts, FontScheme::default());
    }

    #[test]
    fn test_system_color_uses_last_known_value() {
        let theme = parse(&theme_xml(
            None,
            r#"<a:dk1><a:sysClr val="windowText" lastClr="1a2b3c"/></a:dk1>"#,
            "",
        ));
        assert_eq!(theme.colors.get(ThemeRole::Dark1), Some("1A2B3C"));
        assert_eq!(theme.name, UNKNOWN_THEME_NAME);
    }

    #[test]
    fn test_unknown_color_forms_are_absent() {
        let theme = parse(&theme_xml(
            None,
            concat!(
                r#"<a:dk2><a:schemeClr val="tx1"/></a:dk2>"#,
                r#"<a:lt2><a:prstClr val="red"/><a:srgbClr val="abcdef"/></a:lt2>"#,
                r#"<a:accent2><a:srgbClr/></a:accent2>"#,
                r#"<a:accent3><a:sysClr val="window"/></a:accent3>"#,
            ),
            "",
        ));
        assert_eq!(theme.colors.get(ThemeRole::Dark2), None);
        assert_eq!(theme.colors.get(ThemeRole::Light2), Some("ABCDEF"));
        assert_eq!(theme.colors.get(ThemeRole::Accent2), None);
        assert_eq!(theme.colors.get(ThemeRole::Accent3), None);
        assert_eq!(theme.colors.len(), 1);
    }

    #[test]
    fn test_malformed_hex_values() {
        let xml = theme_xml(
            None,
            r#"<a:accent1><a:srgbClr val="fff"/></a:accent1><a:accent2><a:srgbClr val="c0504d"/></a:accent2>"#,
            "",
        );
        let passed = parse(&xml);
        assert_eq!(passed.colors.get(ThemeRole::Accent1), Some("FFF"));

        let strict = ExtractedTheme::parse("theme.xml", xml.into_bytes(), HexPolicy::Strict).unwrap();
        assert_eq!(strict.colors.get(ThemeRole::Accent1), None);
        assert_eq!(strict.colors.get(ThemeRole::Accent2), Some("C0504D"));
    }

    #[test]
    fn test_fonts_need_latin_typeface() {
        let theme = parse(&theme_xml(
            None,
            "",
            concat!(
                r#"<a:majorFont><a:latin typeface=""/><a:ea typeface="MS Gothic"/></a:majorFont>"#,
                r#"<a:minorFont><a:latin typeface="Calibri"/></a:minorFont>"#,
            ),
        ));
        assert_eq!(theme.fonts.get(FontRole::Major), None);
        assert_eq!(theme.fonts.get(FontRole::Minor), Some("Calibri"));
        let listed: Vec<(FontRole, &str)> = theme.fonts.iter().collect();
        assert_eq!(listed, vec![(FontRole::Minor, "Calibri")]);
    }

    #[test]
    fn test_later_color_schemes_override() {
        let xml = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Layered">"#,
            r#"<a:themeElements><a:clrScheme name="one">"#,
            r#"<a:accent1><a:srgbClr val="111111"/></a:accent1><a:accent2><a:srgbClr val="222222"/></a:accent2>"#,
            r#"</a:clrScheme></a:themeElements>"#,
            r#"<a:extraClrSchemeLst><a:extraClrScheme><a:clrScheme name="two">"#,
            r#"<a:accent1><a:srgbClr val="333333"/></a:accent1>"#,
            r#"</a:clrScheme></a:extraClrScheme></a:extraClrSchemeLst>"#,
            r#"</a:theme>"#,
        );
        let theme = parse(xml);
        assert_eq!(theme.colors.get(ThemeRole::Accent1), Some("333333"));
        assert_eq!(theme.colors.get(ThemeRole::Accent2), Some("222222"));
    }

    #[test]
    fn test_foreign_namespace_is_ignored() {
        let xml = concat!(
            r#"<t:theme xmlns:t="urn:not-drawingml" name="Foreign">"#,
            r#"<t:clrScheme><t:accent1><t:srgbClr val="123456"/></t:accent1></t:clrScheme>"#,
            r#"</t:theme>"#,
        );
        let theme = parse(xml);
        assert_eq!(theme.name, "Foreign");
        assert!(theme.colors.is_empty());
    }

    #[test]
    fn test_byte_order_mark_and_bad_input() {
        let mut with_bom = "\u{FEFF}".as_bytes().to_vec();
        with_bom.extend_from_slice(BRAND_THEME_XML.as_bytes());
        let theme = ExtractedTheme::parse("theme.xml", with_bom, HexPolicy::PassThrough).unwrap();
        assert_eq!(theme.colors.len(), 12);

        let not_utf8 = ExtractedTheme::parse("theme.xml", vec![0xFF, 0xFE, 0x00], HexPolicy::PassThrough);
        assert!(matches!(not_utf8, Err(Error::ThemeNotUtf8 { .. })));

        let not_xml = ExtractedTheme::parse("theme.xml", b"<a:theme".to_vec(), HexPolicy::PassThrough);
        assert!(matches!(not_xml, Err(Error::XmlParsingFailed { .. })));
    }

    #[test]
    fn test_color_set_serde() {
        let colors = parse(BRAND_THEME_XML).colors;
        let json = serde_json::to_string(&colors).unwrap();
        assert!(json.starts_with(r#"{"dk1":"000000","lt1":"FFFFFF","dk2":"0067B9""#));
        let back: ThemeColorSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, colors);

        let with_unknown: ThemeColorSet = serde_json::from_str(r#"{"accent9":"000000","hlink":"0000FF"}"#).unwrap();
        assert_eq!(with_unknown.len(), 1);
        assert_eq!(with_unknown.get(ThemeRole::Hyperlink), Some("0000FF"));
    }

    #[test]
    fn test_role_names() {
        for role in ThemeRole::ALL {
            assert_eq!(ThemeRole::try_from_str(role.as_str()), Some(role));
        }
        assert_eq!(ThemeRole::try_from_str("folhlink"), None);
        assert_eq!(ThemeRole::FollowedHyperlink.to_string(), "folHlink");
    }
}
