use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::Error;
use crate::package::write_atomically;
use crate::semantic::{SemanticColorMap, SemanticSlot};
use crate::theme::{ExtractedTheme, FontScheme, ThemeColorSet};


pub const DEFAULT_PYTHON_OUTPUT: &str = "theme_config.py";
pub const DEFAULT_JSON_OUTPUT: &str = "theme_colors.json";

const SECTION_RULE: &str = "# =============================================================================";


/// Where and when a theme was extracted.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Provenance {
    pub template_path: PathBuf,
    pub theme_name: String,
    pub extracted_at: DateTime<Local>,
}
impl Provenance {
    pub fn new<P: Into<PathBuf>, N: Into<String>>(template_path: P, theme_name: N, extracted_at: DateTime<Local>) -> Self {
        Self {
            template_path: template_path.into(),
            theme_name: theme_name.into(),
            extracted_at,
        }
    }

    pub fn now<P: Into<PathBuf>>(template_path: P, theme: &ExtractedTheme) -> Self {
        Self::new(template_path, theme.name.clone(), Local::now())
    }

    fn template_file_name(&self) -> String {
        match self.template_path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.template_path.to_string_lossy().into_owned(),
        }
    }
}


fn python_string_literal(s: &str) -> String {
    let mut ret = String::with_capacity(s.len() + 2);
    ret.push('"');
    for c in s.chars() {
        match c {
            '\\' => ret.push_str("\\\\"),
            '"' => ret.push_str("\\\""),
            '\n' => ret.push_str("\\n"),
            '\r' => ret.push_str("\\r"),
            '\t' => ret.push_str("\\t"),
            c if c.is_control() => ret.push_str(&format!("\\u{:04x}", c as u32)),
            c => ret.push(c),
        }
    }
    ret.push('"');
    ret
}

/// Escapes text that is placed inside a triple-quoted docstring.
fn python_docstring_text(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn python_dict_items<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(items: I) -> String {
    let lines: Vec<String> = items.into_iter()
        .map(|(key, value)| format!("    {}: {},", python_string_literal(key), python_string_literal(value)))
        .collect();
    lines.join("\n")
}

fn python_section(out: &mut String, title: &str) {
    out.push_str(SECTION_RULE);
    out.push_str("\n# ");
    out.push_str(title);
    out.push('\n');
    out.push_str(SECTION_RULE);
    out.push_str("\n\n");
}


/// Renders the generated Python data module.
///
/// The output depends only on its inputs; the extraction timestamp is confined to a single line of the
/// module docstring.
pub fn render_python_config(colors: &ThemeColorSet, fonts: &FontScheme, provenance: &Provenance) -> String {
    let mapping = colors.semantic();
    let hashed = |slot: SemanticSlot| python_string_literal(&format!("#{}", mapping.get(slot)));
    let template_name = python_docstring_text(&provenance.template_file_name());

    let mut out = String::new();
    out.push_str("#!/usr/bin/env python3\n");
    out.push_str("\"\"\"\n");
    out.push_str("theme_config.py\n");
    out.push_str("===============\n");
    out.push_str("Auto-generated PowerPoint theme colors extracted from template.\n\n");
    out.push_str(&format!("Source Template: {}\n", template_name));
    out.push_str(&format!("Theme Name: {}\n", python_docstring_text(&provenance.theme_name)));
    out.push_str(&format!("Extracted: {}\n", provenance.extracted_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str("\nDO NOT EDIT MANUALLY - Regenerate using:\n");
    out.push_str(&format!("    theme_extractor {}\n", template_name));
    out.push_str("\"\"\"\n\n");
    out.push_str("from typing import Dict, Tuple\n\n");

    python_section(&mut out, "RAW THEME COLORS (as extracted from template)");
    out.push_str("THEME_COLORS_RAW: Dict[str, str] = {\n");
    push_dict_body(&mut out, python_dict_items(colors.iter().map(|(role, value)| (role.as_str(), value))));
    out.push_str("}\n\n");

    python_section(&mut out, "SEMANTIC COLOR MAPPING");
    out.push_str("THEME_COLORS: Dict[str, str] = {\n");
    push_dict_body(&mut out, python_dict_items(mapping.iter().map(|(slot, value)| (slot.as_str(), value))));
    out.push_str("}\n\n");

    python_section(&mut out, "ACCENT COLOR LIST (for charts and data visualization)");
    out.push_str("ACCENT_COLORS: Tuple[str, ...] = (\n");
    for accent in mapping.accent_palette().as_slice() {
        out.push_str(&format!("    {},\n", python_string_literal(accent)));
    }
    out.push_str(")\n\n");

    python_section(&mut out, "FONT SCHEME");
    out.push_str("THEME_FONTS: Dict[str, str] = {\n");
    push_dict_body(&mut out, python_dict_items(fonts.iter().map(|(role, typeface)| (role.as_str(), typeface))));
    out.push_str("}\n\n");

    python_section(&mut out, "CONVENIENCE CONSTANTS");
    out.push_str("# Primary brand color (accent1)\n");
    out.push_str(&format!("PRIMARY_COLOR = {}\n\n", hashed(SemanticSlot::Accent1)));
    out.push_str("# Background colors\n");
    out.push_str(&format!("DARK_BACKGROUND = {}\n", hashed(SemanticSlot::PrimaryDark)));
    out.push_str(&format!("LIGHT_BACKGROUND = {}\n\n", hashed(SemanticSlot::PrimaryLight)));
    out.push_str("# Text colors\n");
    out.push_str(&format!("TEXT_ON_LIGHT = {}\n", hashed(SemanticSlot::PrimaryDark)));
    out.push_str(&format!("TEXT_ON_DARK = {}\n\n", hashed(SemanticSlot::PrimaryLight)));

    python_section(&mut out, "HELPER FUNCTIONS");
    out.push_str(concat!(
        "def get_accent_color(index: int) -> str:\n",
        "    \"\"\"Get accent color by index (0-5), with wraparound.\"\"\"\n",
        "    return ACCENT_COLORS[index % len(ACCENT_COLORS)]\n",
        "\n",
        "\n",
        "def hex_to_rgb(hex_color: str) -> Tuple[int, int, int]:\n",
        "    \"\"\"Convert hex color to RGB tuple.\"\"\"\n",
        "    h = hex_color.lstrip('#')\n",
        "    return tuple(int(h[i:i+2], 16) for i in (0, 2, 4))\n",
        "\n",
        "\n",
        "def rgb_to_hex(r: int, g: int, b: int) -> str:\n",
        "    \"\"\"Convert RGB values to hex color string.\"\"\"\n",
        "    return f\"{r:02X}{g:02X}{b:02X}\"\n",
    ));
    out
}

fn push_dict_body(out: &mut String, body: String) {
    if body.len() > 0 {
        out.push_str(&body);
        out.push('\n');
    }
}


#[derive(Serialize)]
struct JsonConfig<'a> {
    source_template: String,
    theme_name: &'a str,
    extracted_date: String,
    raw_colors: &'a ThemeColorSet,
    semantic_mapping: SemanticColorMap,
    fonts: &'a FontScheme,
}

/// Renders the JSON sidecar.
pub fn render_json_config(colors: &ThemeColorSet, fonts: &FontScheme, provenance: &Provenance) -> Result<String, serde_json::Error> {
    let config = JsonConfig {
        source_template: provenance.template_path.to_string_lossy().into_owned(),
        theme_name: &provenance.theme_name,
        extracted_date: provenance.extracted_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        raw_colors: colors,
        semantic_mapping: colors.semantic(),
        fonts,
    };
    let mut json = serde_json::to_string_pretty(&config)?;
    json.push('\n');
    Ok(json)
}


fn write_text(output_path: &Path, text: &str) -> Result<(), Error> {
    write_atomically(output_path, |file| {
        file.write_all(text.as_bytes())
            .map_err(|io_error| Error::io(output_path, io_error))
    })
}

/// Writes the generated Python data module for an extracted theme.
pub fn generate_python_config<P: AsRef<Path>>(output_path: P, theme: &ExtractedTheme, provenance: &Provenance) -> Result<PathBuf, Error> {
    let output_path = output_path.as_ref();
    let text = render_python_config(&theme.colors, &theme.fonts, provenance);
    write_text(output_path, &text)?;
    info!("wrote Python theme module {}", output_path.display());
    Ok(output_path.to_owned())
}

/// Writes the JSON sidecar for an extracted theme.
pub fn generate_json_config<P: AsRef<Path>>(output_path: P, theme: &ExtractedTheme, provenance: &Provenance) -> Result<PathBuf, Error> {
    let output_path = output_path.as_ref();
    let text = render_json_config(&theme.colors, &theme.fonts, provenance)
        .map_err(|json_error| Error::EncodingJson { path: output_path.to_owned(), json_error })?;
    write_text(output_path, &text)?;
    info!("wrote JSON theme sidecar {}", output_path.display());
    Ok(output_path.to_owned())
}
