use std::collections::BTreeSet;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use quick_xml::NsReader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::name::{QName, ResolveResult};
use serde::Deserialize;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::Error;
use crate::package::{pack_directory, unpack_into, ThemePackage};
use crate::theme::{decode_theme_xml, ThemeColorSet, ThemeRole};
use crate::xml::{is_drawingml_namespace, DocExt, NamespaceTable};


/// Folders below `ppt/` that make up the visual theme of a presentation.
pub const THEME_FOLDERS: [&str; 3] = ["theme", "slideMasters", "slideLayouts"];


#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ColorSourceKind {
    Json,
    PythonModule,
}
impl ColorSourceKind {
    pub fn for_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "py" => Some(Self::PythonModule),
            _ => None,
        }
    }
}


#[derive(Deserialize)]
struct JsonSidecar {
    #[serde(default)]
    raw_colors: ThemeColorSet,
}

/// Loads raw theme colors from a JSON sidecar or a generated Python module.
///
/// The Python module is read as text; only the `THEME_COLORS_RAW` dictionary literal is consulted.
pub fn load_raw_colors<P: AsRef<Path>>(path: P) -> Result<ThemeColorSet, Error> {
    let path = path.as_ref();
    let kind = ColorSourceKind::for_path(path)
        .ok_or_else(|| Error::UnsupportedColorSource { path: path.to_owned() })?;
    if !path.exists() {
        return Err(Error::FileNotFound { path: path.to_owned() });
    }
    let text = fs::read_to_string(path)
        .map_err(|io_error| Error::io(path, io_error))?;

    let colors = match kind {
        ColorSourceKind::Json => {
            let sidecar: JsonSidecar = serde_json::from_str(&text)
                .map_err(|json_error| Error::DecodingJson { path: path.to_owned(), json_error })?;
            sidecar.raw_colors
        },
        ColorSourceKind::PythonModule => {
            parse_python_raw_colors(&text)
                .map_err(|reason| Error::MalformedColorModule { path: path.to_owned(), reason })?
        },
    };
    debug!("loaded {} theme colors from {}", colors.len(), path.display());
    Ok(colors)
}


const PYTHON_RAW_COLORS_NAME: &str = "THEME_COLORS_RAW";

fn parse_python_raw_colors(text: &str) -> Result<ThemeColorSet, String> {
    // lines keep their terminators so that the offsets hold for CRLF files too
    let assignment_start = text.split_inclusive('\n')
        .scan(0usize, |offset, line| {
            let line_start = *offset;
            *offset += line.len();
            Some((line_start, line))
        })
        .filter(|(_, line)| {
            line.strip_prefix(PYTHON_RAW_COLORS_NAME)
                .map(|rest| rest.starts_with(':') || rest.trim_start().starts_with('='))
                .unwrap_or(false)
        })
        .map(|(line_start, _)| line_start)
        .nth(0)
        .ok_or_else(|| format!("no {} assignment found", PYTHON_RAW_COLORS_NAME))?;

    let assignment = &text[assignment_start..];
    let brace = assignment.find('{')
        .ok_or_else(|| format!("{} is not assigned a dictionary", PYTHON_RAW_COLORS_NAME))?;
    let pairs = parse_python_str_dict(&assignment[brace+1..])?;
    Ok(ThemeColorSet::from_named_values(pairs))
}

/// Parses the body of a Python dictionary literal whose keys and values are all string literals, up to
/// and including the closing brace.
fn parse_python_str_dict(body: &str) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    let mut rest = body;
    loop {
        rest = skip_python_filler(rest);
        if rest.starts_with('}') {
            return Ok(pairs);
        }
        if rest.is_empty() {
            return Err("dictionary is not closed".to_owned());
        }

        let (key, after_key) = parse_python_str(rest)?;
        let after_key = after_key.trim_start();
        let after_colon = after_key.strip_prefix(':')
            .ok_or_else(|| format!("expected ':' after key {:?}", key))?;
        let (value, after_value) = parse_python_str(after_colon.trim_start())?;
        pairs.push((key, value));
        rest = after_value;
    }
}

fn skip_python_filler(mut s: &str) -> &str {
    loop {
        let trimmed = s.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if let Some(comment) = trimmed.strip_prefix('#') {
            s = match comment.find('\n') {
                Some(newline) => &comment[newline..],
                None => "",
            };
        } else {
            return trimmed;
        }
    }
}

fn parse_python_str(s: &str) -> Result<(String, &str), String> {
    let mut chars = s.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('"' | '\''))) => q,
        Some((_, other)) => return Err(format!("expected a string literal, found {:?}", other)),
        None => return Err("expected a string literal, found end of file".to_owned()),
    };

    let mut value = String::new();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            return Ok((value, &s[i+c.len_utf8()..]));
        } else if c == '\\' {
            let escaped = match chars.next() {
                Some((_, 'n')) => '\n',
                Some((_, 'r')) => '\r',
                Some((_, 't')) => '\t',
                Some((_, e)) => e,
                None => break,
            };
            value.push(escaped);
        } else if c == '\n' {
            break;
        } else {
            value.push(c);
        }
    }
    Err("unterminated string literal".to_owned())
}


fn copy_tree(source: &Path, destination: &Path) -> Result<(), Error> {
    for entry_res in WalkDir::new(source) {
        let entry = entry_res
            .map_err(|walk_error| Error::io(source, walk_error.into()))?;
        let Ok(relative) = entry.path().strip_prefix(source) else { continue };
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|io_error| Error::io(&target, io_error))?;
        } else {
            fs::copy(entry.path(), &target)
                .map_err(|io_error| Error::io(&target, io_error))?;
        }
    }
    Ok(())
}

fn require_existing(path: &Path) -> Result<(), Error> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound { path: path.to_owned() })
    }
}


/// Applies theme colors to presentation packages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThemeApplier {
    colors: ThemeColorSet,
    namespaces: NamespaceTable,
}
impl ThemeApplier {
    pub fn new(colors: ThemeColorSet) -> Self {
        Self {
            colors,
            namespaces: NamespaceTable::default(),
        }
    }

    pub fn from_color_source<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::new(load_raw_colors(path)?))
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceTable) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn colors(&self) -> &ThemeColorSet {
        &self.colors
    }

    /// Replaces the theme, slide masters and slide layouts of the target with those of the template.
    ///
    /// Each folder is only replaced if the template has it. The result is written to `output_path`, or
    /// over the target if no output path is given.
    pub fn copy_theme_from_template(template_path: &Path, target_path: &Path, output_path: Option<&Path>) -> Result<PathBuf, Error> {
        let output_path = output_path.unwrap_or(target_path);
        require_existing(template_path)?;
        require_existing(target_path)?;

        let work_dir = TempDir::new()
            .map_err(|io_error| Error::io(std::env::temp_dir(), io_error))?;
        let template_dir = work_dir.path().join("template");
        let target_dir = work_dir.path().join("target");
        unpack_into(template_path, &template_dir)?;
        unpack_into(target_path, &target_dir)?;

        for folder in THEME_FOLDERS {
            let template_folder = template_dir.join("ppt").join(folder);
            if !template_folder.is_dir() {
                debug!("template {} has no {} folder; keeping the target's", template_path.display(), folder);
                continue;
            }
            let target_folder = target_dir.join("ppt").join(folder);
            if target_folder.exists() {
                fs::remove_dir_all(&target_folder)
                    .map_err(|io_error| Error::io(&target_folder, io_error))?;
            }
            copy_tree(&template_folder, &target_folder)?;
        }

        pack_directory(&target_dir, output_path)?;
        info!("copied theme from {} onto {} as {}", template_path.display(), target_path.display(), output_path.display());
        Ok(output_path.to_owned())
    }

    /// Rewrites the color scheme swatches of the package's theme, leaving everything else in place.
    pub fn apply_colors_to_theme_xml(&self, package_path: &Path, output_path: Option<&Path>) -> Result<PathBuf, Error> {
        let output_path = output_path.unwrap_or(package_path);
        let theme_member = ThemePackage::open(package_path)?
            .find_theme_member()?;

        let work_dir = TempDir::new()
            .map_err(|io_error| Error::io(std::env::temp_dir(), io_error))?;
        let package_dir = work_dir.path().join("package");
        unpack_into(package_path, &package_dir)?;

        match theme_member {
            Some(member) => {
                let theme_path = package_dir.join(&member);
                let raw_xml = fs::read(&theme_path)
                    .map_err(|io_error| Error::io(&theme_path, io_error))?;
                let patched_xml = self.patch_theme_xml(&member, &raw_xml)?;
                fs::write(&theme_path, patched_xml)
                    .map_err(|io_error| Error::io(&theme_path, io_error))?;
            },
            None => {
                warn!("{} has no theme; repackaging it unchanged", package_path.display());
            },
        }

        pack_directory(&package_dir, output_path)?;
        info!("applied theme colors to {} as {}", package_path.display(), output_path.display());
        Ok(output_path.to_owned())
    }

    /// Rewrites the color swatches within a theme document.
    ///
    /// Each role with a non-empty value loses its previous color definition and receives a single
    /// `srgbClr` with the new value. Only the first color scheme of the document is touched. Every byte
    /// outside the rewritten role elements is kept as it was.
    pub fn patch_theme_xml(&self, member_path: &str, raw_xml: &[u8]) -> Result<Vec<u8>, Error> {
        // same well-formedness requirements as extraction
        let package = decode_theme_xml(member_path, raw_xml)?;
        if package.as_document().root_element().is_none() {
            return Err(Error::MissingRootElement { member: member_path.to_owned() });
        }

        let xml_string = String::from_utf8(raw_xml.to_vec())
            .map_err(|utf8_error| Error::ThemeNotUtf8 { member: member_path.to_owned(), utf8_error })?;
        let (bom, xml_str) = match xml_string.strip_prefix('\u{FEFF}') {
            Some(rest) => ("\u{FEFF}", rest),
            None => ("", xml_string.as_str()),
        };

        let splices = self.color_scheme_splices(xml_str)
            .map_err(|xml_error| Error::RewritingXml { member: member_path.to_owned(), xml_error })?;
        let Some(splices) = splices else {
            warn!("theme {:?} has no color scheme to patch", member_path);
            return Ok(raw_xml.to_vec());
        };

        let mut patched = String::with_capacity(raw_xml.len() + 32 * splices.len());
        patched.push_str(bom);
        let mut copied_up_to = 0;
        for splice in &splices {
            patched.push_str(&xml_str[copied_up_to..splice.range.start]);
            patched.push_str(&splice.replacement);
            copied_up_to = splice.range.end;
        }
        patched.push_str(&xml_str[copied_up_to..]);
        Ok(patched.into_bytes())
    }

    /// Collects the replacements for the role elements of the first color scheme.
    ///
    /// Returns `None` if the document has no color scheme.
    fn color_scheme_splices(&self, xml: &str) -> Result<Option<Vec<Splice>>, quick_xml::Error> {
        let mut reader = NsReader::from_str(xml);
        let mut splices = Vec::new();
        let mut patched_roles = BTreeSet::new();
        let mut depth = 0usize;
        let mut scheme_depth: Option<usize> = None;
        let mut open_role: Option<OpenRole> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = StreamedNamespace::from_resolved(resolved);
            let event_end = reader.buffer_position() as usize;

            match event {
                Event::Start(start) => {
                    depth += 1;
                    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    match scheme_depth {
                        None => {
                            if local_name == "clrScheme" && namespace.is_drawingml() {
                                scheme_depth = Some(depth);
                            }
                        },
                        Some(sd) if depth == sd + 1 => {
                            if let Some((role, hex)) = self.pending_role(&local_name, &namespace, &patched_roles) {
                                patched_roles.insert(role);
                                let role_prefix = element_prefix(start.name());
                                open_role = Some(OpenRole {
                                    depth,
                                    content_start: event_end,
                                    swatch: self.swatch_element(role_prefix.as_deref(), &namespace, hex),
                                });
                            }
                        },
                        Some(_) => {},
                    }
                },
                Event::Empty(empty) => {
                    let local_name = String::from_utf8_lossy(empty.local_name().as_ref()).into_owned();
                    match scheme_depth {
                        None => {
                            if local_name == "clrScheme" && namespace.is_drawingml() {
                                // an empty color scheme has nothing to patch
                                scheme_depth = Some(depth + 1);
                                break;
                            }
                        },
                        Some(sd) if depth == sd => {
                            let Some((role, hex)) = self.pending_role(&local_name, &namespace, &patched_roles) else { continue };
                            let Some(tag_start) = xml[..event_end].rfind('<') else { continue };
                            patched_roles.insert(role);

                            let tag_open = xml[tag_start..event_end]
                                .trim_end_matches('>')
                                .trim_end_matches('/')
                                .trim_end();
                            let qualified_name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                            let role_prefix = element_prefix(empty.name());
                            let swatch = self.swatch_element(role_prefix.as_deref(), &namespace, hex);
                            splices.push(Splice {
                                range: tag_start..event_end,
                                replacement: format!("{}>{}</{}>", tag_open, swatch, qualified_name),
                            });
                        },
                        Some(_) => {},
                    }
                },
                Event::End(_) => {
                    let closes_role = open_role.as_ref()
                        .is_some_and(|open| open.depth == depth);
                    if closes_role {
                        let end_tag_start = xml[..event_end].rfind("</");
                        if let (Some(open), Some(end_tag_start)) = (open_role.take(), end_tag_start) {
                            splices.push(Splice {
                                range: open.content_start..end_tag_start,
                                replacement: open.swatch,
                            });
                        }
                    }
                    if scheme_depth == Some(depth) {
                        break;
                    }
                    depth = depth.saturating_sub(1);
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if scheme_depth.is_none() {
            return Ok(None);
        }
        for (role, hex) in self.colors.iter() {
            if !hex.is_empty() && !patched_roles.contains(&role) {
                debug!("color scheme has no {} slot", role);
            }
        }
        Ok(Some(splices))
    }

    fn pending_role<'a>(&'a self, local_name: &str, namespace: &StreamedNamespace, patched_roles: &BTreeSet<ThemeRole>) -> Option<(ThemeRole, &'a str)> {
        if !namespace.is_drawingml() {
            return None;
        }
        let role = ThemeRole::try_from_str(local_name)?;
        if patched_roles.contains(&role) {
            return None;
        }
        self.colors.get(role)
            .filter(|hex| !hex.is_empty())
            .map(|hex| (role, hex))
    }

    /// Serializes the new `srgbClr` for a role element.
    ///
    /// The namespace table decides the prefix; if the role element is spelled with a different prefix,
    /// the swatch declares its own.
    fn swatch_element(&self, role_prefix: Option<&str>, namespace: &StreamedNamespace, hex: &str) -> String {
        let table_prefix = match namespace {
            StreamedNamespace::Bound(uri) => self.namespaces.prefix_for(uri)
                .filter(|prefix| prefix.len() > 0)
                .map(|prefix| (prefix, uri.as_str())),
            _ => None,
        };
        let tag = match (table_prefix, role_prefix) {
            (Some((prefix, _)), Some(role_prefix)) if prefix == role_prefix
                => format!("{}:srgbClr", prefix),
            (Some((prefix, uri)), _)
                => format!("{}:srgbClr xmlns:{}=\"{}\"", prefix, prefix, escape(uri)),
            (None, Some(role_prefix))
                => format!("{}:srgbClr", role_prefix),
            (None, None)
                => "srgbClr".to_owned(),
        };
        format!("<{} val=\"{}\"/>", tag, escape(hex))
    }
}


/// A byte range of the theme text and what replaces it.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Splice {
    range: Range<usize>,
    replacement: String,
}

/// A role element of the color scheme whose closing tag has not been reached yet.
#[derive(Clone, Debug, Eq, PartialEq)]
struct OpenRole {
    depth: usize,
    content_start: usize,
    swatch: String,
}

/// The namespace an element was found in while streaming through a document.
#[derive(Clone, Debug, Eq, PartialEq)]
enum StreamedNamespace {
    Unbound,
    Bound(String),
    UnknownPrefix,
}
impl StreamedNamespace {
    fn from_resolved(resolved: ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Unbound => Self::Unbound,
            ResolveResult::Bound(namespace) => Self::Bound(String::from_utf8_lossy(namespace.as_ref()).into_owned()),
            ResolveResult::Unknown(_) => Self::UnknownPrefix,
        }
    }

    fn is_drawingml(&self) -> bool {
        match self {
            Self::Unbound => is_drawingml_namespace(None),
            Self::Bound(uri) => is_drawingml_namespace(Some(uri.as_str())),
            Self::UnknownPrefix => false,
        }
    }
}

fn element_prefix(name: QName<'_>) -> Option<String> {
    name.prefix()
        .map(|prefix| String::from_utf8_lossy(prefix.as_ref()).into_owned())
}
