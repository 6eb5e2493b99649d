//! Track construction configuration
//!
//! Loaded from TOML files or built from defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TtmlError};

/// What to do when a document ends before the running start time of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativeDurationPolicy {
    /// Fail the whole build
    #[default]
    Reject,
    /// Record a zero duration and keep the running start time
    Clamp,
    /// Record the negative duration and move the start time back
    Allow,
}

/// Track construction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Scheme part of rewritten image identifiers (`urn:<scheme>:<n><ext>`)
    pub urn_scheme: String,

    /// Indent width used when serializing documents into samples
    pub indent: usize,

    /// Policy for documents ending before the track's running start time
    pub negative_duration: NegativeDurationPolicy,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            urn_scheme: "ttml-track".to_string(),
            indent: 4,
            negative_duration: NegativeDurationPolicy::Reject,
        }
    }
}

impl TrackConfig {
    /// Largest accepted indent width
    pub const MAX_INDENT: usize = 16;

    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        if self.indent > Self::MAX_INDENT {
            return Err(TtmlError::Config(format!(
                "indent {} exceeds maximum of {}",
                self.indent,
                Self::MAX_INDENT
            )));
        }
        if self.urn_scheme.is_empty()
            || !self
                .urn_scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(TtmlError::Config(format!(
                "invalid urn scheme '{}'",
                self.urn_scheme
            )));
        }
        Ok(())
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TrackConfig =
            toml::from_str(content).map_err(|e| TtmlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TtmlError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = TrackConfig::default();
        assert_eq!(config.urn_scheme, "ttml-track");
        assert_eq!(config.indent, 4);
        assert_eq!(config.negative_duration, NegativeDurationPolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TrackConfig::from_toml_str("negative_duration = \"clamp\"\n").unwrap();
        assert_eq!(config.negative_duration, NegativeDurationPolicy::Clamp);
        assert_eq!(config.indent, 4);
        assert_eq!(config.urn_scheme, "ttml-track");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            TrackConfig::from_toml_str("indent = 40\n"),
            Err(TtmlError::Config(_))
        ));
        assert!(matches!(
            TrackConfig::from_toml_str("urn_scheme = \"a:b\"\n"),
            Err(TtmlError::Config(_))
        ));
        assert!(matches!(
            TrackConfig::from_toml_str("negative_duration = \"ignore\"\n"),
            Err(TtmlError::Config(_))
        ));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let config = TrackConfig {
            urn_scheme: "mp4parser".to_string(),
            indent: 2,
            negative_duration: NegativeDurationPolicy::Allow,
        };

        let temp_file = NamedTempFile::new().unwrap();
        config.to_file(temp_file.path()).unwrap();

        let loaded = TrackConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"urn_scheme = \"subs\"\nindent = 0\n")
            .unwrap();

        let loaded = TrackConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.urn_scheme, "subs");
        assert_eq!(loaded.indent, 0);
    }
}
