use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;


#[derive(Debug)]
pub(crate) enum ConfigError {
    OpeningFile { path: PathBuf, io_error: io::Error },
    Loading { path: PathBuf, toml_error: toml::de::Error },
}
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OpeningFile { path, io_error }
                => write!(f, "error opening config file {}: {}", path.display(), io_error),
            ConfigError::Loading { path, toml_error }
                => write!(f, "error loading configuration from {}: {}", path.display(), toml_error),
        }
    }
}
impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConfigError::OpeningFile { io_error, .. } => Some(io_error),
            ConfigError::Loading { toml_error, .. } => Some(toml_error),
        }
    }
}


#[derive(Debug)]
pub(crate) enum ExtractorError {
    Config(ConfigError),
    Theme(garage_theme::Error),
}
impl fmt::Display for ExtractorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorError::Config(e)
                => write!(f, "configuration error: {}", e),
            ExtractorError::Theme(e)
                => write!(f, "{}", e),
        }
    }
}
impl error::Error for ExtractorError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ExtractorError::Config(e) => Some(e),
            ExtractorError::Theme(e) => Some(e),
        }
    }
}
impl From<ConfigError> for ExtractorError {
    fn from(value: ConfigError) -> Self { Self::Config(value) }
}
impl From<garage_theme::Error> for ExtractorError {
    fn from(value: garage_theme::Error) -> Self { Self::Theme(value) }
}
