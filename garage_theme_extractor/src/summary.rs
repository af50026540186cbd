use garage_theme::{ExtractedTheme, Rgb};


pub(crate) const INTEGRATION_SNIPPET: &str = r#"
# =============================================================================
# Add to the workbench template configuration to use extracted theme colors
# =============================================================================

# Option 1: Import the generated config
try:
    from theme_config import (
        THEME_COLORS, ACCENT_COLORS, PRIMARY_COLOR,
        DARK_BACKGROUND, LIGHT_BACKGROUND
    )
    USE_EXTRACTED_THEME = True
except ImportError:
    USE_EXTRACTED_THEME = False

# Option 2: Override the palette if extraction was successful
if USE_EXTRACTED_THEME:
    @dataclass
    class ColorPalette:
        # Primary (from theme accent1)
        PRIMARY: str = PRIMARY_COLOR.lstrip('#')

        # Backgrounds (from theme dk1/lt1)
        DARK: str = DARK_BACKGROUND.lstrip('#')
        LIGHT: str = LIGHT_BACKGROUND.lstrip('#')

        # Accents (from theme accent1-6)
        CHART_1: str = ACCENT_COLORS[0].lstrip('#')
        CHART_2: str = ACCENT_COLORS[1].lstrip('#')
        CHART_3: str = ACCENT_COLORS[2].lstrip('#')
        CHART_4: str = ACCENT_COLORS[3].lstrip('#')
        CHART_5: str = ACCENT_COLORS[4].lstrip('#')
        CHART_6: str = ACCENT_COLORS[5].lstrip('#')
"#;


/// A two-cell terminal swatch with the color as 24-bit background, if the value is a valid color.
pub(crate) fn color_swatch(hex: &str) -> Option<String> {
    let rgb: Rgb = hex.parse().ok()?;
    Some(format!("\x1b[48;2;{};{};{}m  \x1b[0m", rgb.r, rgb.g, rgb.b))
}

/// Lists the theme name and every extracted color role.
pub(crate) fn theme_summary(theme: &ExtractedTheme) -> String {
    let mut lines = vec![
        format!("Theme Name: {}", theme.name),
        String::new(),
        "Extracted Colors:".to_owned(),
        "-".repeat(40),
    ];
    for (role, value) in theme.colors.iter() {
        let mut line = format!("  {:12} #{}", role.as_str(), value);
        if let Some(swatch) = color_swatch(value) {
            line.push_str("  ");
            line.push_str(&swatch);
        }
        lines.push(line);
    }
    for (role, typeface) in theme.fonts.iter() {
        lines.push(format!("  {:12} {}", role.as_str(), typeface));
    }
    lines.join("\n")
}
