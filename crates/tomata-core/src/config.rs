//! TOML-based timer configuration.
//!
//! Stores the four tunable Pomodoro parameters: the durations of the
//! focus, short-break and long-break modes, and the number of focus
//! sessions completed before a long break is inserted.
//!
//! Configuration is stored at `~/.config/tomata/config.toml`.
//!
//! All values are validated on construction, on every setter and after
//! loading from disk: durations must be positive and the focus limit at
//! least 1. A zero duration would otherwise complete its mode on the
//! very next tick.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::timer::Mode;

/// Timer configuration: per-mode durations plus the long-break cadence.
///
/// Durations are whole seconds. Edits take effect on the next lookup,
/// including for a mode currently in progress -- the engine derives
/// remaining time from `duration_secs()` on every tick and never caches
/// it, so live reconfiguration is intentional and immediate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_secs")]
    focus_secs: u64,
    #[serde(default = "default_short_break_secs")]
    short_break_secs: u64,
    #[serde(default = "default_long_break_secs")]
    long_break_secs: u64,
    /// Number of completed focus sessions before a long break replaces
    /// the short break.
    #[serde(default = "default_focus_limit")]
    focus_limit: u32,
}

fn default_focus_secs() -> u64 {
    25 * 60
}
fn default_short_break_secs() -> u64 {
    5 * 60
}
fn default_long_break_secs() -> u64 {
    15 * 60
}
fn default_focus_limit() -> u32 {
    4
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_secs: default_focus_secs(),
            short_break_secs: default_short_break_secs(),
            long_break_secs: default_long_break_secs(),
            focus_limit: default_focus_limit(),
        }
    }
}

impl TimerConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any duration is zero or
    /// `focus_limit` is zero.
    pub fn new(
        focus_secs: u64,
        short_break_secs: u64,
        long_break_secs: u64,
        focus_limit: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            focus_secs,
            short_break_secs,
            long_break_secs,
            focus_limit,
        };
        config.validate()?;
        Ok(config)
    }

    /// Duration of the given mode, in seconds. Pure lookup.
    pub fn duration_secs(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => self.focus_secs,
            Mode::ShortBreak => self.short_break_secs,
            Mode::LongBreak => self.long_break_secs,
        }
    }

    /// Overwrite the stored duration for the given mode.
    ///
    /// Takes effect on the next `duration_secs()` lookup, including for
    /// a mode currently in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `secs` is zero.
    pub fn set_duration_secs(&mut self, mode: Mode, secs: u64) -> Result<(), ConfigError> {
        if secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: duration_field(mode),
                message: "duration must be positive".into(),
            });
        }
        match mode {
            Mode::Focus => self.focus_secs = secs,
            Mode::ShortBreak => self.short_break_secs = secs,
            Mode::LongBreak => self.long_break_secs = secs,
        }
        Ok(())
    }

    pub fn focus_limit(&self) -> u32 {
        self.focus_limit
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `limit` is zero.
    pub fn set_focus_limit(&mut self, limit: u32) -> Result<(), ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "focus_limit",
                message: "focus limit must be at least 1".into(),
            });
        }
        self.focus_limit = limit;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for mode in [Mode::Focus, Mode::ShortBreak, Mode::LongBreak] {
            if self.duration_secs(mode) == 0 {
                return Err(ConfigError::InvalidValue {
                    field: duration_field(mode),
                    message: "duration must be positive".into(),
                });
            }
        }
        if self.focus_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "focus_limit",
                message: "focus limit must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Path of the configuration file: `~/.config/tomata/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if the platform config
    /// directory cannot be determined.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("tomata").join("config.toml"))
    }

    /// Load from the default path, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or holds
    /// invalid values, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Same as [`TimerConfig::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: TimerConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                config.validate()?;
                Ok(config)
            }
            Err(_) => {
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
        }
    }

    /// Persist to the default path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SaveFailed`] if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SaveFailed`] if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }
}

fn duration_field(mode: Mode) -> &'static str {
    match mode {
        Mode::Focus => "focus_secs",
        Mode::ShortBreak => "short_break_secs",
        Mode::LongBreak => "long_break_secs",
    }
}
