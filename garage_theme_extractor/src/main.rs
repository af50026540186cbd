mod config;
mod errors;
mod summary;


use std::path::PathBuf;

use clap::Parser;
use garage_theme::{generate_json_config, generate_python_config, Provenance, ThemeApplier, ThemePackage};
use tracing::debug;

use crate::config::load_config;
use crate::errors::ExtractorError;
use crate::summary::{theme_summary, INTEGRATION_SNIPPET};


/// Extracts the theme colors of a presentation template into generated configuration files.
#[derive(Parser)]
#[command(name = "theme_extractor")]
struct Opts {
    /// Path to the template package.
    pub template: PathBuf,

    /// Output Python module (default: theme_config.py).
    #[arg(short, long)]
    pub python: Option<PathBuf>,

    /// Output JSON sidecar (default: theme_colors.json).
    #[arg(short, long)]
    pub json: Option<PathBuf>,

    /// Apply the template's theme to this presentation, in place.
    #[arg(short, long, value_name = "PPTX")]
    pub apply_to: Option<PathBuf>,

    /// Only patch the color swatches of --apply-to, using colors from this JSON sidecar or Python module.
    #[arg(long, value_name = "COLORS", requires = "apply_to")]
    pub patch_from: Option<PathBuf>,

    /// Print example code for importing the generated module.
    #[arg(short = 'i', long)]
    pub show_integration: bool,

    /// Configuration file (default: theme_extractor.toml, if present).
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}


fn run() -> Result<(), ExtractorError> {
    // set up tracing
    let (stderr_non_blocking, _guard) = tracing_appender::non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(stderr_non_blocking)
        .init();

    let opts = Opts::parse();
    run_with(&opts)
}

/// Extracts, generates and applies as requested. Nothing is written unless extraction succeeds.
fn run_with(opts: &Opts) -> Result<(), ExtractorError> {
    let config = load_config(opts.config.as_deref())?;
    debug!("hex policy: {:?}", config.hex_policy);

    // extract
    println!("Extracting theme from: {}", opts.template.display());
    let theme = ThemePackage::open(&opts.template)?
        .extract_theme(config.hex_policy)?;
    println!();
    println!("{}", theme_summary(&theme));

    // generate
    println!();
    println!("Generating config files:");
    let provenance = Provenance::now(&opts.template, &theme);
    let python_path = generate_python_config(config.python_output(opts.python.as_deref()), &theme, &provenance)?;
    println!("  Python: {}", python_path.display());
    let json_path = generate_json_config(config.json_output(opts.json.as_deref()), &theme, &provenance)?;
    println!("  JSON:   {}", json_path.display());

    // apply
    if let Some(target) = &opts.apply_to {
        println!();
        let output = match &opts.patch_from {
            Some(color_source) => {
                println!("Patching theme colors of {} from {}", target.display(), color_source.display());
                ThemeApplier::from_color_source(color_source)?
                    .apply_colors_to_theme_xml(target, None)?
            },
            None => {
                println!("Applying theme to: {}", target.display());
                ThemeApplier::copy_theme_from_template(&opts.template, target, None)?
            },
        };
        println!("  Theme applied: {}", output.display());
    }

    if opts.show_integration {
        println!("{}", INTEGRATION_SNIPPET);
    }

    println!();
    println!("Done!");
    println!();
    println!("To use in your code:");
    println!("    from theme_config import THEME_COLORS, ACCENT_COLORS");
    Ok(())
}

fn main() {
    let result = run();

    std::process::exit(
        match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}", e);
                1
            },
        }
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::write::{SimpleFileOptions, ZipWriter};

    const THEME_XML: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Garage Brand">"#,
        r#"<a:themeElements><a:clrScheme name="Garage">"#,
        r#"<a:dk1><a:srgbClr val="000000"/></a:dk1>"#,
        r#"<a:accent1><a:srgbClr val="00325C"/></a:accent1>"#,
        r#"</a:clrScheme></a:themeElements>"#,
        r#"</a:theme>"#,
    );

    fn write_package(path: &Path, members: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in members {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn opts_in(dir: &Path, template: PathBuf) -> Opts {
        let config = dir.join("empty.toml");
        fs::write(&config, "").unwrap();
        Opts {
            template,
            python: Some(dir.join("theme_config.py")),
            json: Some(dir.join("theme_colors.json")),
            apply_to: None,
            patch_from: None,
            show_integration: false,
            config: Some(config),
        }
    }

    #[test]
    fn test_command_definition() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let opts = Opts::try_parse_from([
            "theme_extractor", "template.pptx", "-p", "cfg.py", "--json", "cfg.json", "-a", "deck.pptx", "-i",
        ]).unwrap();
        assert_eq!(opts.template, PathBuf::from("template.pptx"));
        assert_eq!(opts.python, Some(PathBuf::from("cfg.py")));
        assert_eq!(opts.json, Some(PathBuf::from("cfg.json")));
        assert_eq!(opts.apply_to, Some(PathBuf::from("deck.pptx")));
        assert_eq!(opts.patch_from, None);
        assert!(opts.show_integration);
        assert_eq!(opts.config, None);

        let opts = Opts::try_parse_from(["theme_extractor", "template.pptx"]).unwrap();
        assert_eq!(opts.python, None);
        assert!(!opts.show_integration);
    }

    #[test]
    fn test_patch_requires_target() {
        assert!(Opts::try_parse_from(["theme_extractor", "t.pptx", "--patch-from", "c.json"]).is_err());
        let opts = Opts::try_parse_from([
            "theme_extractor", "t.pptx", "--apply-to", "d.pptx", "--patch-from", "c.json",
        ]).unwrap();
        assert_eq!(opts.patch_from, Some(PathBuf::from("c.json")));
        assert!(Opts::try_parse_from(["theme_extractor"]).is_err());
    }

    #[test]
    fn test_missing_theme_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("themeless.pptx");
        write_package(&template, &[
            ("[Content_Types].xml", "<Types/>"),
            ("ppt/presentation.xml", "<presentation/>"),
        ]);
        let opts = opts_in(dir.path(), template);

        let result = run_with(&opts);
        assert!(matches!(result, Err(ExtractorError::Theme(garage_theme::Error::ThemeNotFound { .. }))));
        assert!(!opts.python.as_ref().unwrap().exists());
        assert!(!opts.json.as_ref().unwrap().exists());

        let missing = opts_in(dir.path(), dir.path().join("missing.pptx"));
        let result = run_with(&missing);
        assert!(matches!(result, Err(ExtractorError::Theme(garage_theme::Error::FileNotFound { .. }))));
        assert!(!missing.python.as_ref().unwrap().exists());
    }

    #[test]
    fn test_extraction_writes_both_outputs() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template.pptx");
        write_package(&template, &[
            ("[Content_Types].xml", "<Types/>"),
            ("ppt/presentation.xml", "<presentation/>"),
            ("ppt/theme/theme1.xml", THEME_XML),
        ]);
        let opts = opts_in(dir.path(), template);

        run_with(&opts).unwrap();
        let python = fs::read_to_string(opts.python.as_ref().unwrap()).unwrap();
        assert!(python.contains("\"accent1\": \"00325C\""));
        let json = fs::read_to_string(opts.json.as_ref().unwrap()).unwrap();
        assert!(json.contains("Garage Brand"));
    }
}
