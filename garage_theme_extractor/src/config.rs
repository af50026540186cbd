use std::fs;
use std::path::{Path, PathBuf};

use garage_theme::HexPolicy;
use garage_theme::emit::{DEFAULT_JSON_OUTPUT, DEFAULT_PYTHON_OUTPUT};
use serde::Deserialize;
use tracing::debug;

use crate::errors::ConfigError;


pub(crate) const DEFAULT_CONFIG_FILE_NAME: &str = "theme_extractor.toml";


#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    pub python_output: Option<PathBuf>,
    pub json_output: Option<PathBuf>,
    pub hex_policy: HexPolicy,
}
impl Config {
    /// The Python module path: the flag if given, then the config file, then the default.
    pub fn python_output(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(|p| p.to_owned())
            .or_else(|| self.python_output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_OUTPUT))
    }

    /// The JSON sidecar path: the flag if given, then the config file, then the default.
    pub fn json_output(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(|p| p.to_owned())
            .or_else(|| self.json_output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JSON_OUTPUT))
    }
}


fn parse_config(path: &Path, text: &str) -> Result<Config, ConfigError> {
    toml::from_str(text)
        .map_err(|toml_error| ConfigError::Loading { path: path.to_owned(), toml_error })
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|io_error| ConfigError::OpeningFile { path: path.to_owned(), io_error })?;
    let config = parse_config(path, &text)?;
    debug!("loaded configuration from {}: {:?}", path.display(), config);
    Ok(config)
}

/// Loads the configuration.
///
/// An explicitly given file must exist. Otherwise, the default file in the working directory is read if
/// it exists, and the built-in defaults are used if it does not.
pub(crate) fn load_config(explicit_path: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit_path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE_NAME);
            if default_path.is_file() {
                read_config(default_path)
            } else {
                Ok(Config::default())
            }
        },
    }
}
