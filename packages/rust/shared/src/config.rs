//! Application configuration for EAD Bridge.
//!
//! User config lives at `~/.eadbridge/eadbridge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EadBridgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "eadbridge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".eadbridge";

// ---------------------------------------------------------------------------
// Config structs (matching eadbridge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Conversion engine settings.
    #[serde(default)]
    pub conversion: ConversionSection,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Import format used when `--format` is not given.
    #[serde(default = "default_format")]
    pub format: String,

    /// Directory converted JSON files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Pretty-print JSON output.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
            pretty: true,
        }
    }
}

fn default_format() -> String {
    "bhl_ead_xml".into()
}
fn default_output_dir() -> String {
    ".".into()
}
fn default_true() -> bool {
    true
}

/// `[conversion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSection {
    /// Digital object title used when neither the `<dao>` nor its
    /// archival object yields one.
    #[serde(default = "default_fallback_title")]
    pub fallback_title: String,

    /// Separator between several date labels in a derived title.
    #[serde(default = "default_date_separator")]
    pub date_separator: String,
}

impl Default for ConversionSection {
    fn default() -> Self {
        Self {
            fallback_title: default_fallback_title(),
            date_separator: default_date_separator(),
        }
    }
}

fn default_fallback_title() -> String {
    "Untitled".into()
}
fn default_date_separator() -> String {
    ", ".into()
}

// ---------------------------------------------------------------------------
// Conversion config (runtime, handed to the engine)
// ---------------------------------------------------------------------------

/// Runtime conversion settings, derived from the config file.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Last-resort digital object title.
    pub fallback_title: String,
    /// Separator between date labels.
    pub date_separator: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ConversionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fallback_title: config.conversion.fallback_title.clone(),
            date_separator: config.conversion.date_separator.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.eadbridge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EadBridgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.eadbridge/eadbridge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EadBridgeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| EadBridgeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EadBridgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EadBridgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EadBridgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("bhl_ead_xml"));
        assert!(toml_str.contains("fallback_title"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.format, "bhl_ead_xml");
        assert!(parsed.defaults.pretty);
        assert_eq!(parsed.conversion.date_separator, ", ");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[conversion]
fallback_title = "Digital surrogate"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.conversion.fallback_title, "Digital surrogate");
        assert_eq!(config.conversion.date_separator, ", ");
        assert_eq!(config.defaults.output_dir, ".");
    }

    #[test]
    fn conversion_config_from_app_config() {
        let mut app = AppConfig::default();
        app.conversion.date_separator = "; ".into();
        let conversion = ConversionConfig::from(&app);
        assert_eq!(conversion.fallback_title, "Untitled");
        assert_eq!(conversion.date_separator, "; ");
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/eadbridge.toml")).unwrap_err();
        assert!(matches!(err, EadBridgeError::Io { .. }));
    }
}
