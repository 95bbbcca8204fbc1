//! Configuration loading and typed config structures for Wallcycle.
//!
//! The configuration lives in `config.json` inside the configuration
//! directory. A legacy `wallpapers.json` in the same directory is still
//! accepted when `config.json` is absent. Wallpaper paths in the matrix are
//! relative to the base directory, the parent of the configuration
//! directory.
//!
//! ```json
//! {
//!   "flags": { "mode": "weather_based", "cache_enabled": true },
//!   "probabilities": { "fogChance": 0.3, "thunderChance": 0.5 },
//!   "update": { "interval_minutes": 30, "timezone": "UTC" },
//!   "matrix": { "night": "backgrounds/night.jpg", "dawn": { "clear": ["a.jpg"] } },
//!   "stats": { "enabled": true, "file": ".cache/weather_stats.json" }
//! }
//! ```
//!
//! Everything is validated eagerly in [`WallpaperConfig::parse`], so the
//! resolver can assume well-formed input.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wallcycle_resolver::EngineSettings;
use wallcycle_store::stats::DEFAULT_STATS_FILE;
use wallcycle_types::{Matrix, Mode, ProbabilityConfig};

/// Preferred configuration file name.
pub const CONFIG_FILE: &str = "config.json";

/// Legacy configuration file name, used only when [`CONFIG_FILE`] is absent.
pub const LEGACY_CONFIG_FILE: &str = "wallpapers.json";

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

    /// Failed to parse JSON content, including unknown modes, phases, or
    /// instance names.
    #[error("failed to parse config JSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        #[from]
        source: serde_json::Error,
    },

    /// The configuration parsed but holds invalid values.
    #[error("invalid configuration: {reason}")]
    Validation {
        /// Which key is wrong and why.
        reason: String,
    },

    /// Neither configuration file exists.
    #[error("no config.json or wallpapers.json in {}", dir.display())]
    NotFound {
        /// The directory that was searched.
        dir: PathBuf,
    },
}

impl ConfigError {
    fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

/// Top-level wallpaper configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallpaperConfig {
    /// Behavior switches.
    #[serde(default)]
    pub flags: FlagsConfig,

    /// Modifier chances.
    #[serde(default)]
    pub probabilities: ProbabilityConfig,

    /// Scheduler settings.
    #[serde(default)]
    pub update: UpdateConfig,

    /// Phase -> instance -> candidate files.
    pub matrix: Matrix,

    /// Weather statistics output.
    #[serde(default)]
    pub stats: StatsConfig,
}

impl WallpaperConfig {
    /// Load configuration from `config_dir`, falling back to the legacy file.
    ///
    /// Returns the parsed config and the path it was read from.
    pub fn load(config_dir: &Path) -> Result<(Self, PathBuf), ConfigError> {
        let path = locate(config_dir)?;
        let config = Self::from_file(&path)?;
        Ok((config, path))
    }

    /// Load and validate configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        if config.flags.apply_fog_for_all_phases {
            debug!("apply_fog_for_all_phases is set but ignored; fog applies at dawn only");
        }
        Ok(config)
    }

    /// Check value ranges and matrix structure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.probabilities.check_range().map_err(|key| {
            ConfigError::validation(format!("probabilities.{key}: must be a number in [0, 1]"))
        })?;
        if self.update.interval_minutes == 0 {
            return Err(ConfigError::validation(
                "update.interval_minutes: must be at least 1",
            ));
        }
        if self.update.timezone.trim().is_empty() {
            return Err(ConfigError::validation("update.timezone: must not be empty"));
        }
        if self.stats.file.trim().is_empty() {
            return Err(ConfigError::validation("stats.file: must not be empty"));
        }
        self.matrix
            .validate()
            .map_err(|e| ConfigError::validation(e.to_string()))
    }

    /// The settings the resolution engine needs.
    pub const fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            mode: self.flags.mode,
            probabilities: self.probabilities,
            use_random_selection: self.flags.use_random_selection,
            log_details: self.flags.log_details,
        }
    }
}

/// Locate the configuration file inside `config_dir`.
pub fn locate(config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let primary = config_dir.join(CONFIG_FILE);
    if primary.is_file() {
        return Ok(primary);
    }
    let legacy = config_dir.join(LEGACY_CONFIG_FILE);
    if legacy.is_file() {
        warn!(path = %legacy.display(), "config.json not found, using legacy wallpapers.json");
        return Ok(legacy);
    }
    Err(ConfigError::NotFound {
        dir: config_dir.to_path_buf(),
    })
}

/// The base directory wallpaper and cache paths are relative to.
///
/// This is the parent of the configuration directory (`.` for a bare
/// relative name), or the directory itself when it is a filesystem root.
pub fn base_dir(config_dir: &Path) -> PathBuf {
    match config_dir.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => config_dir.to_path_buf(),
    }
}

/// Behavior switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagsConfig {
    /// Operating mode.
    #[serde(default)]
    pub mode: Mode,

    /// Skip re-application when nothing changed.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Pick files at random instead of taking the first.
    #[serde(default = "default_true")]
    pub use_random_selection: bool,

    /// Verbose per-draw DEBUG logging.
    #[serde(default)]
    pub log_details: bool,

    /// Accepted for compatibility with older files. Has no effect: fog is
    /// restricted to dawn.
    #[serde(default)]
    pub apply_fog_for_all_phases: bool,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            cache_enabled: true,
            use_random_selection: true,
            log_details: false,
            apply_fog_for_all_phases: false,
        }
    }
}

/// Scheduler settings, consumed outside the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Fallback interval between cycles when no phase checkpoint is known.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,

    /// IANA timezone name of the location.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            timezone: default_timezone(),
        }
    }
}

/// Weather statistics output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Whether counters are updated after each apply.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Statistics file, relative to the base directory.
    #[serde(default = "default_stats_file")]
    pub file: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: default_stats_file(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_interval_minutes() -> u32 {
    30
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

fn default_stats_file() -> String {
    DEFAULT_STATS_FILE.to_owned()
}
