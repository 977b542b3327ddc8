// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host settings stored as RON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vshader_graph::ShaderMode;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "vshaderc.ron";

/// Log filter used when neither `RUST_LOG` nor the settings provide one
pub const DEFAULT_LOG_FILTER: &str = "vshader=info";

/// Failure to read or write the settings file
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("settings file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid RON for [`CliSettings`]
    #[error("settings file {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: ron::error::SpannedError,
    },

    /// Settings could not be serialized
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version of the tool
    #[error("settings version {found} is newer than supported version {supported}")]
    Version {
        /// Version in the file
        found: u32,
        /// Highest version this binary reads
        supported: u32,
    },
}

/// Settings of the `vshaderc` host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliSettings {
    /// Settings format version
    pub version: u32,
    /// `tracing` filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Directory for compiled shaders when no output path is given
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Mode forced onto every loaded graph
    #[serde(default)]
    pub default_mode_override: Option<ShaderMode>,
    /// Write the uniform bindings next to the shader
    #[serde(default)]
    pub emit_uniform_manifest: bool,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            log_filter: default_log_filter(),
            output_dir: None,
            default_mode_override: None,
            emit_uniform_manifest: false,
        }
    }
}

impl CliSettings {
    /// Parse settings text
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, SettingsError> {
        let settings: CliSettings = ron::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::Version {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }
        Ok(settings)
    }

    /// Load settings from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_ron(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = CliSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
        assert!(settings.output_dir.is_none());
        assert!(!settings.emit_uniform_manifest);
    }

    #[test]
    fn test_serialization() {
        let settings = CliSettings {
            output_dir: Some(PathBuf::from("out/shaders")),
            default_mode_override: Some(ShaderMode::CanvasItem),
            emit_uniform_manifest: true,
            ..CliSettings::default()
        };
        let text = settings.to_ron().unwrap();
        let loaded = CliSettings::from_ron(&text, Path::new("test.ron")).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = CliSettings::from_ron("(version: 1)", Path::new("test.ron")).unwrap();
        assert_eq!(loaded, CliSettings::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = CliSettings::from_ron("(version: 99)", Path::new("test.ron")).unwrap_err();
        assert!(matches!(err, SettingsError::Version { found: 99, .. }));
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("vshaderc_settings_that_do_not_exist.ron");
        assert_eq!(CliSettings::load(&path).unwrap(), CliSettings::default());
    }
}
