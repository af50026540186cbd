pub mod apply;
pub mod color;
pub mod emit;
pub mod package;
pub mod semantic;
pub mod theme;
mod xml;
#[cfg(test)]
mod test_util;


use std::fmt;
use std::io;
use std::path::PathBuf;

use zip::result::ZipError;

pub use crate::apply::{load_raw_colors, ColorSourceKind, ThemeApplier};
pub use crate::color::{HexPolicy, Rgb};
pub use crate::emit::{generate_json_config, generate_python_config, Provenance};
pub use crate::package::ThemePackage;
pub use crate::semantic::{AccentPalette, SemanticColorMap, SemanticSlot};
pub use crate::theme::{ExtractedTheme, FontRole, FontScheme, ThemeColorSet, ThemeRole};
pub use crate::xml::NamespaceTable;


#[derive(Debug)]
pub enum Error {
    FileNotFound { path: PathBuf },
    ThemeNotFound { path: PathBuf },
    OpeningPackage { path: PathBuf, zip_error: ZipError },
    ReadingFileWithinPackage { member: String, zip_error: ZipError },
    ReadingBytesWithinPackage { member: String, io_error: io::Error },
    ExtractingPackage { path: PathBuf, zip_error: ZipError },
    WritingPackage { path: PathBuf, zip_error: ZipError },
    Io { path: PathBuf, io_error: io::Error },
    ThemeNotUtf8 { member: String, utf8_error: std::string::FromUtf8Error },
    XmlParsingFailed { member: String, parse_error: sxd_document::parser::Error },
    MissingRootElement { member: String },
    RewritingXml { member: String, xml_error: quick_xml::Error },
    EncodingJson { path: PathBuf, json_error: serde_json::Error },
    DecodingJson { path: PathBuf, json_error: serde_json::Error },
    UnsupportedColorSource { path: PathBuf },
    MalformedColorModule { path: PathBuf, reason: String },
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { path }
                => write!(f, "file not found: {}", path.display()),
            Self::ThemeNotFound { path }
                => write!(f, "no theme file found in package {}", path.display()),
            Self::OpeningPackage { path, zip_error }
                => write!(f, "ZIP format error while opening package {}: {}", path.display(), zip_error),
            Self::ReadingFileWithinPackage { member, zip_error }
                => write!(f, "ZIP error while opening path {:?} from package: {}", member, zip_error),
            Self::ReadingBytesWithinPackage { member, io_error }
                => write!(f, "input/output error while reading path {:?} from package: {}", member, io_error),
            Self::ExtractingPackage { path, zip_error }
                => write!(f, "failed to extract package {}: {}", path.display(), zip_error),
            Self::WritingPackage { path, zip_error }
                => write!(f, "failed to write package {}: {}", path.display(), zip_error),
            Self::Io { path, io_error }
                => write!(f, "input/output error on {}: {}", path.display(), io_error),
            Self::ThemeNotUtf8 { member, utf8_error }
                => write!(f, "theme file {:?} is not valid UTF-8: {}", member, utf8_error),
            Self::XmlParsingFailed { member, parse_error }
                => write!(f, "failed to parse file {:?} as XML: {}", member, parse_error),
            Self::MissingRootElement { member }
                => write!(f, "XML file {:?} is missing a root element", member),
            Self::RewritingXml { member, xml_error }
                => write!(f, "failed to rewrite XML file {:?}: {}", member, xml_error),
            Self::EncodingJson { path, json_error }
                => write!(f, "failed to encode JSON for {}: {}", path.display(), json_error),
            Self::DecodingJson { path, json_error }
                => write!(f, "failed to decode JSON from {}: {}", path.display(), json_error),
            Self::UnsupportedColorSource { path }
                => write!(f, "cannot load theme colors from {}: expected a .json or .py file", path.display()),
            Self::MalformedColorModule { path, reason }
                => write!(f, "generated module {} is malformed: {}", path.display(), reason),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileNotFound { .. } => None,
            Self::ThemeNotFound { .. } => None,
            Self::OpeningPackage { zip_error, .. } => Some(zip_error),
            Self::ReadingFileWithinPackage { zip_error, .. } => Some(zip_error),
            Self::ReadingBytesWithinPackage { io_error, .. } => Some(io_error),
            Self::ExtractingPackage { zip_error, .. } => Some(zip_error),
            Self::WritingPackage { zip_error, .. } => Some(zip_error),
            Self::Io { io_error, .. } => Some(io_error),
            Self::ThemeNotUtf8 { utf8_error, .. } => Some(utf8_error),
            Self::XmlParsingFailed { parse_error, .. } => Some(parse_error),
            Self::MissingRootElement { .. } => None,
            Self::RewritingXml { xml_error, .. } => Some(xml_error),
            Self::EncodingJson { json_error, .. } => Some(json_error),
            Self::DecodingJson { json_error, .. } => Some(json_error),
            Self::UnsupportedColorSource { .. } => None,
            Self::MalformedColorModule { .. } => None,
        }
    }
}
impl Error {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, io_error: io::Error) -> Self {
        Self::Io { path: path.into(), io_error }
    }
}
