//! Configuration loading and typed config structures for the raid service.
//!
//! The canonical configuration lives in `uprising-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure, and provides a loader that reads and validates
//! the file. Every field has a default, so an empty or missing section
//! yields a playable configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `uprising-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// World-level settings (seed).
    #[serde(default)]
    pub world: WorldConfig,

    /// Countdown bounds and notification offsets.
    #[serde(default)]
    pub countdown: CountdownConfig,

    /// Cleanup timing (completion grace, inactivity eviction).
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed; fixes every raid roll for a given raid sequence.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// Countdown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountdownConfig {
    /// Shortest countdown a leader may request, in seconds.
    #[serde(default = "default_min_seconds")]
    pub min_seconds: u32,

    /// Longest countdown a leader may request, in seconds.
    #[serde(default = "default_max_seconds")]
    pub max_seconds: u32,

    /// Seconds-remaining marks at which a countdown notification is
    /// logged. Offsets at or above the countdown length are skipped.
    #[serde(default = "default_notify_offsets")]
    pub notify_offsets_seconds: Vec<u32>,
}

impl CountdownConfig {
    /// Whether a requested countdown length is inside the allowed bounds.
    pub fn permits(&self, seconds: u32) -> bool {
        (self.min_seconds..=self.max_seconds).contains(&seconds)
    }

    /// The notification offsets applicable to a countdown of the given
    /// length, preserving configured order.
    pub fn offsets_within(&self, countdown_seconds: u32) -> Vec<u32> {
        self.notify_offsets_seconds
            .iter()
            .copied()
            .filter(|offset| *offset < countdown_seconds)
            .collect()
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            min_seconds: default_min_seconds(),
            max_seconds: default_max_seconds(),
            notify_offsets_seconds: default_notify_offsets(),
        }
    }
}

/// Cleanup timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CleanupConfig {
    /// How long a completed party's results stay queryable before the
    /// party record is deleted, in seconds.
    #[serde(default = "default_grace_seconds")]
    pub grace_seconds: u64,

    /// Days of inactivity after which a rebel is evicted from memory.
    #[serde(default = "default_inactivity_days")]
    pub inactivity_days: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            grace_seconds: default_grace_seconds(),
            inactivity_days: default_inactivity_days(),
        }
    }
}

const fn default_seed() -> u64 {
    2077
}

const fn default_min_seconds() -> u32 {
    10
}

const fn default_max_seconds() -> u32 {
    60
}

fn default_notify_offsets() -> Vec<u32> {
    vec![30, 15, 10, 5, 3, 2, 1]
}

const fn default_grace_seconds() -> u64 {
    300
}

const fn default_inactivity_days() -> u32 {
    30
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.world.seed, 2077);
        assert_eq!(config.countdown.min_seconds, 10);
        assert_eq!(config.countdown.max_seconds, 60);
        assert_eq!(
            config.countdown.notify_offsets_seconds,
            vec![30, 15, 10, 5, 3, 2, 1]
        );
        assert_eq!(config.cleanup.grace_seconds, 300);
        assert_eq!(config.cleanup.inactivity_days, 30);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 99

countdown:
  min_seconds: 5
  max_seconds: 120
  notify_offsets_seconds:
    - 60
    - 10

cleanup:
  grace_seconds: 60
  inactivity_days: 7
";
        let config = GameConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 99);
        assert_eq!(config.countdown.min_seconds, 5);
        assert_eq!(config.countdown.max_seconds, 120);
        assert_eq!(config.countdown.notify_offsets_seconds, vec![60, 10]);
        assert_eq!(config.cleanup.grace_seconds, 60);
        assert_eq!(config.cleanup.inactivity_days, 7);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "world:\n  seed: 7\n";
        let config = GameConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.countdown.max_seconds, 60);
        assert_eq!(config.cleanup.grace_seconds, 300);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(GameConfig::parse("").is_ok());
    }

    #[test]
    fn parse_invalid_yaml_errors() {
        let result = GameConfig::parse("countdown: [not, a, mapping]");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("uprising-config.yaml");
        if path.exists() {
            let config = GameConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }

    #[test]
    fn countdown_bounds_are_inclusive() {
        let countdown = CountdownConfig::default();
        assert!(countdown.permits(10));
        assert!(countdown.permits(60));
        assert!(!countdown.permits(9));
        assert!(!countdown.permits(61));
    }

    #[test]
    fn offsets_clip_to_countdown_length() {
        let countdown = CountdownConfig::default();
        assert_eq!(countdown.offsets_within(10), vec![5, 3, 2, 1]);
        assert_eq!(countdown.offsets_within(60), vec![30, 15, 10, 5, 3, 2, 1]);
        // An offset equal to the countdown would fire immediately; skipped.
        assert_eq!(countdown.offsets_within(15), vec![10, 5, 3, 2, 1]);
    }
}
