//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Active timer preset and the custom slot's durations
//! - Notification sound toggle
//! - Daily targets (tasks per day, focus minutes per day)
//!
//! Stored at `~/.config/focusnest/config.toml`. All values that enter the
//! timer or the dashboard are validated in one place (`validate`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, CoreError, ValidationError};
use crate::timer::{validate_durations, Preset, DEFAULT_PRESET_ID};

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Active preset id ("15-2", "25-5", "50-10" or "custom").
    #[serde(default = "default_preset_id")]
    pub preset: String,
    #[serde(default = "default_custom_work")]
    pub custom_work_min: u32,
    #[serde(default = "default_custom_break")]
    pub custom_break_min: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

/// Daily targets rendered by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default = "default_task_target")]
    pub daily_tasks: u32,
    #[serde(default = "default_focus_target")]
    pub daily_focus_min: u32,
}

/// Application configuration, serialized to/from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
}

// Default functions
fn default_preset_id() -> String {
    DEFAULT_PRESET_ID.to_string()
}
fn default_custom_work() -> u32 {
    25
}
fn default_custom_break() -> u32 {
    5
}
fn default_true() -> bool {
    true
}
fn default_task_target() -> u32 {
    3
}
fn default_focus_target() -> u32 {
    60
}

pub const TASK_TARGET_MIN: u32 = 1;
pub const TASK_TARGET_MAX: u32 = 20;
pub const FOCUS_TARGET_MIN: u32 = 15;
pub const FOCUS_TARGET_MAX: u32 = 480;

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            preset: default_preset_id(),
            custom_work_min: default_custom_work(),
            custom_break_min: default_custom_break(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { sound_enabled: true }
    }
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            daily_tasks: default_task_target(),
            daily_focus_min: default_focus_target(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, CoreError> {
        Ok(crate::store::data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path,
                        message: e.to_string(),
                    }
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning the defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Range checks for every value that feeds the timer or dashboard.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_durations(self.timer.custom_work_min, self.timer.custom_break_min)?;
        if !(TASK_TARGET_MIN..=TASK_TARGET_MAX).contains(&self.targets.daily_tasks) {
            return Err(ValidationError::OutOfRange {
                field: "targets.daily_tasks",
                value: self.targets.daily_tasks,
                min: TASK_TARGET_MIN,
                max: TASK_TARGET_MAX,
            });
        }
        if !(FOCUS_TARGET_MIN..=FOCUS_TARGET_MAX).contains(&self.targets.daily_focus_min) {
            return Err(ValidationError::OutOfRange {
                field: "targets.daily_focus_min",
                value: self.targets.daily_focus_min,
                min: FOCUS_TARGET_MIN,
                max: FOCUS_TARGET_MAX,
            });
        }
        Ok(())
    }

    /// The active preset, resolved against the custom durations. Falls back
    /// to the default preset for an unknown id.
    pub fn preset(&self) -> Preset {
        self.preset_by_id(&self.timer.preset)
            .unwrap_or_default()
    }

    /// Resolve any preset id against this config's custom slot.
    pub fn preset_by_id(&self, id: &str) -> Option<Preset> {
        Preset::resolve(id, self.timer.custom_work_min, self.timer.custom_break_min)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, validate, and save.
    ///
    /// # Errors
    /// Returns an error for an unknown key, an unparsable value, a value
    /// out of range, or a failed save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self).map_err(CoreError::Json)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(CoreError::Json)?;
        updated.validate()?;
        *self = updated;
        self.save()?;
        Ok(())
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| {
                                ConfigError::ParseFailed(format!(
                                    "cannot parse '{value}' as number"
                                ))
                            })?;
                        serde_json::Value::Number(n.into())
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }
}
