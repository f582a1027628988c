use std::path::{Path, PathBuf};

use schemaguard_altercheck::AlterCheckSettings;
use schemaguard_policy::PolicyConfig;
use serde::{Deserialize, Serialize};

use crate::CliError;

pub const DEFAULT_SETTINGS_FILE: &str = "schemaguard.toml";

/// Contents of `schemaguard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub policy: PolicyConfig,
    pub alter_check: AlterCheckSettings,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }
}

/// Load settings from `path`, or from `schemaguard.toml` in the working
/// directory when no path is given.
///
/// A missing default file yields the defaults; a missing explicit file is
/// an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    if !explicit && !path.exists() {
        tracing::debug!(event = "settings_defaulted", path = %path.display());
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| CliError::Io {
        context: format!("failed to read settings: {}", path.display()),
        source,
    })?;
    let settings = Settings::from_toml_str(&content)?;
    tracing::debug!(event = "settings_loaded", path = %path.display());
    Ok(settings)
}
