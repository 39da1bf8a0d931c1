use anyhow::{Context, Result};
use common::{HostStrategy, ShellProfile, SpawnDirective};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{require_identity, validate_enum};

/// Longest spawn-directive wait accepted from config, in milliseconds
const MAX_SPAWN_TIMEOUT_MS: u32 = 60_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub shell: ShellSettings,
}

/// General settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Desktop shell identities.
///
/// Defaults match the classic Explorer shell. Override them when a shell
/// update renames a class or changes the spawn message.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellSettings {
    #[serde(default = "default_root_class")]
    pub root_class: String,

    #[serde(default)]
    pub root_title: Option<String>,

    #[serde(default = "default_icon_view_class")]
    pub icon_view_class: String,

    #[serde(default = "default_host_class")]
    pub host_class: String,

    #[serde(default = "default_spawn_message")]
    pub spawn_message: u32,

    #[serde(default)]
    pub spawn_wparam: usize,

    #[serde(default)]
    pub spawn_lparam: isize,

    #[serde(default = "default_spawn_timeout_ms")]
    pub spawn_timeout_ms: u32,

    #[serde(default = "default_host_strategy")]
    pub host_strategy: String,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            root_class: default_root_class(),
            root_title: None,
            icon_view_class: default_icon_view_class(),
            host_class: default_host_class(),
            spawn_message: default_spawn_message(),
            spawn_wparam: 0,
            spawn_lparam: 0,
            spawn_timeout_ms: default_spawn_timeout_ms(),
            host_strategy: default_host_strategy(),
        }
    }
}

fn default_root_class() -> String {
    common::PROGMAN_CLASS.to_string()
}
fn default_icon_view_class() -> String {
    common::SHELL_VIEW_CLASS.to_string()
}
fn default_host_class() -> String {
    common::WORKER_CLASS.to_string()
}
fn default_spawn_message() -> u32 {
    common::WM_SPAWN_WORKER
}
fn default_spawn_timeout_ms() -> u32 {
    common::SPAWN_TIMEOUT_MS
}
fn default_host_strategy() -> String {
    HostStrategy::default().name().to_string()
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded configuration from {}", path.display());
        config.validate()?;

        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("backdrop");

        Ok(config_dir.join("config.toml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        validate_enum!(
            self.general.log_level.as_str(),
            "trace",
            "debug",
            "info",
            "warn",
            "error"
        )?;

        let shell = &self.shell;
        require_identity!(shell.root_class, "shell.root_class");
        require_identity!(shell.icon_view_class, "shell.icon_view_class");
        require_identity!(shell.host_class, "shell.host_class");

        validate_enum!(
            shell.host_strategy.as_str(),
            "next-sibling",
            "matched"
        )?;

        if shell.spawn_timeout_ms == 0 || shell.spawn_timeout_ms > MAX_SPAWN_TIMEOUT_MS {
            anyhow::bail!(
                "shell.spawn_timeout_ms must be between 1 and {} (got {})",
                MAX_SPAWN_TIMEOUT_MS,
                shell.spawn_timeout_ms
            );
        }

        Ok(())
    }

    /// Build the shell profile the attacher runs with
    pub fn shell_profile(&self) -> Result<ShellProfile> {
        let shell = &self.shell;
        let host_strategy = shell
            .host_strategy
            .parse::<HostStrategy>()
            .map_err(anyhow::Error::msg)?;

        Ok(ShellProfile {
            root_class: shell.root_class.clone(),
            root_title: shell.root_title.clone(),
            icon_view_class: shell.icon_view_class.clone(),
            host_class: shell.host_class.clone(),
            spawn: SpawnDirective {
                message: shell.spawn_message,
                wparam: shell.spawn_wparam,
                lparam: shell.spawn_lparam,
                timeout_ms: shell.spawn_timeout_ms,
            },
            host_strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.shell.root_class, "Progman");
        assert_eq!(config.shell.spawn_timeout_ms, 1000);
        assert_eq!(config.shell.host_strategy, "next-sibling");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_profile_matches_common() {
        let profile = Config::default().shell_profile().unwrap();
        assert_eq!(profile, ShellProfile::default());
    }

    #[test]
    fn test_parse_shell_overrides() {
        let toml = r#"
[general]
log_level = "debug"

[shell]
host_class = "WorkerW"
spawn_message = 0x052C
spawn_wparam = 0xD
spawn_lparam = 1
spawn_timeout_ms = 2500
host_strategy = "matched"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());

        let profile = config.shell_profile().unwrap();
        assert_eq!(profile.root_class, "Progman");
        assert_eq!(profile.spawn.message, 0x052C);
        assert_eq!(profile.spawn.wparam, 0xD);
        assert_eq!(profile.spawn.lparam, 1);
        assert_eq!(profile.spawn.timeout_ms, 2500);
        assert_eq!(profile.host_strategy, HostStrategy::Matched);
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.general.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_host_strategy() {
        let mut config = Config::default();
        config.shell.host_strategy = "best-match".to_string();
        assert!(config.validate().is_err());
        assert!(config.shell_profile().is_err());
    }

    #[test]
    fn test_validate_spawn_timeout() {
        let mut config = Config::default();
        config.shell.spawn_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.shell.spawn_timeout_ms = 60_001;
        assert!(config.validate().is_err());

        config.shell.spawn_timeout_ms = 60_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_identity() {
        let mut config = Config::default();
        config.shell.icon_view_class = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shell.icon_view_class"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.shell.host_class, "WorkerW");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[shell]\nroot_title = \"Program Manager\"").unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.shell.root_title.as_deref(), Some("Program Manager"));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[shell]\nspawn_timeout_ms = 0").unwrap();
        assert!(Config::load_from_path(file.path()).is_err());

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "[shell\nroot_class = ").unwrap();
        let err = Config::load_from_path(broken.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
