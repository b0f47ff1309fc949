use crate::core::{PatternGrouping, PolicyConfig};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::UserDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

// ── Enums ─────────────────────────────────────────────────────────

/// Where candidate timestamps come from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum TimestampSource {
    #[default]
    Modified,
    Filename,
}

/// What happens to discarded items.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PruneAction {
    #[default]
    Delete,
    Move,
}

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from - not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Report decisions without pruning anything
    #[serde(default)]
    pub dry_run: bool,

    /// "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directories to apply the policy to (tilde-expanded)
    #[serde(default)]
    pub targets: Vec<String>,

    /// Regex; entries whose name matches are never considered
    #[serde(default)]
    pub exclude: Option<String>,

    /// Regex; entries sharing capture group 1 are kept or pruned together
    #[serde(default)]
    pub group_pattern: Option<String>,

    #[serde(default)]
    pub timestamp_source: TimestampSource,

    #[serde(default)]
    pub action: PruneAction,

    /// Archive directory for `action = "move"` (tilde-expanded)
    #[serde(default)]
    pub move_to: Option<String>,

    /// Named retention counts; read through [`PolicyConfig::from_options`]
    #[serde(default, deserialize_with = "policy_from_table")]
    pub policy: PolicyConfig,
}

fn policy_from_table<'de, D>(deserializer: D) -> Result<PolicyConfig, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let table = toml::Table::deserialize(deserializer)?;
    let options = table.into_iter().map(|(name, value)| {
        let value = match value {
            toml::Value::String(text) => text,
            other => other.to_string(),
        };
        (name, value)
    });
    PolicyConfig::from_options(options).map_err(serde::de::Error::custom)
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            dry_run: false,
            log_level: default_log_level(),
            targets: Vec::new(),
            exclude: None,
            group_pattern: None,
            timestamp_source: TimestampSource::default(),
            action: PruneAction::default(),
            move_to: None,
            policy: PolicyConfig::default().normalize(),
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// `~/.tierkeep/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Ok(home.join(".tierkeep").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// built-in defaults. Env overrides are applied and the result is
    /// validated either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Load(format!(
                        "config file {} does not exist",
                        path.display()
                    ))
                    .into());
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Self::default_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self {
                        config_path: default_path,
                        ..Self::default()
                    }
                }
            }
        };

        config.apply_env_overrides()?;
        config.policy = config.policy.normalize();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&contents)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment variable overrides to config.
    ///
    /// An unrecognized `TIERKEEP_DRY_RUN` value is an error rather than a
    /// silent "off".
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(flag) = std::env::var("TIERKEEP_DRY_RUN") {
            self.dry_run = parse_flag(&flag).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "TIERKEEP_DRY_RUN must be one of 1/true/yes/on or 0/false/no/off (got {flag:?})"
                ))
            })?;
        }

        if let Ok(level) = std::env::var("TIERKEEP_LOG_LEVEL") {
            if !level.is_empty() {
                self.log_level = level;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Validation(format!(
                "log_level must be one of trace, debug, info, warn, error (got {:?})",
                self.log_level
            )));
        }
        if let Some(pattern) = self.exclude.as_deref() {
            Regex::new(pattern)
                .map_err(|e| ConfigError::Validation(format!("exclude: {e}")))?;
        }
        if let Some(pattern) = self.group_pattern.as_deref() {
            Regex::new(pattern)
                .map_err(|e| ConfigError::Validation(format!("group_pattern: {e}")))?;
        }
        if self.action == PruneAction::Move && self.move_to.is_none() {
            return Err(ConfigError::Validation("action = \"move\" requires move_to".into()));
        }
        Ok(())
    }

    pub fn target_paths(&self) -> Vec<PathBuf> {
        self.targets.iter().map(|t| expand_path(t)).collect()
    }

    pub fn move_to_path(&self) -> Option<PathBuf> {
        self.move_to.as_deref().map(expand_path)
    }

    /// Grouping built from `group_pattern`, if configured.
    pub fn grouping(&self) -> Result<Option<PatternGrouping>, ConfigError> {
        self.group_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern)
                    .map(PatternGrouping::new)
                    .map_err(|e| ConfigError::Validation(format!("group_pattern: {e}")))
            })
            .transpose()
    }
}
