//! Core data structs shared across the workspace.
//!
//! These are the values that flow between the weather adapter, the
//! resolution engine, and the state cache.

use serde::{Deserialize, Serialize};

use crate::enums::{Phase, WeatherInstance};

/// A raw weather reading as reported by the provider adapter.
///
/// Every field is optional in practice: a provider may send only a
/// category, only a numeric condition code, or nothing usable at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWeather {
    /// Provider category keyword (`"Rain"`, `"Clouds"`, `"Mist"`, ...).
    #[serde(default)]
    pub category: String,

    /// Numeric condition code (2xx thunderstorm, 5xx rain, 800 clear, ...).
    #[serde(default)]
    pub code: Option<u16>,

    /// Cloud cover percentage, 0-100.
    #[serde(default)]
    pub cloud_pct: Option<u8>,
}

impl RawWeather {
    /// Create a reading with only a category keyword.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            code: None,
            cloud_pct: None,
        }
    }

    /// Attach a numeric condition code.
    #[must_use]
    pub fn with_code(self, code: u16) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    /// Attach a cloud cover percentage. Values above 100 are clamped.
    #[must_use]
    pub fn with_clouds(self, cloud_pct: u8) -> Self {
        Self {
            cloud_pct: Some(cloud_pct.min(100)),
            ..self
        }
    }
}

/// Probabilities for the random weather modifiers.
///
/// Key names follow the configuration file (`fogChance`, `thunderChance`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityConfig {
    /// Chance that a clear/cloudy dawn turns foggy, in `[0, 1]`.
    #[serde(rename = "fogChance", default = "default_fog_chance")]
    pub fog_chance: f64,

    /// Chance that heavy rain becomes a thunderstorm, in `[0, 1]`.
    #[serde(rename = "thunderChance", default = "default_thunder_chance")]
    pub thunder_chance: f64,
}

impl ProbabilityConfig {
    /// Create a probability config from explicit chances.
    pub const fn new(fog_chance: f64, thunder_chance: f64) -> Self {
        Self {
            fog_chance,
            thunder_chance,
        }
    }

    /// Check that both chances are finite and within `[0, 1]`.
    ///
    /// Returns the name of the first offending key.
    pub fn check_range(&self) -> Result<(), &'static str> {
        let in_range = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_range(self.fog_chance) {
            return Err("fogChance");
        }
        if !in_range(self.thunder_chance) {
            return Err("thunderChance");
        }
        Ok(())
    }
}

impl Default for ProbabilityConfig {
    fn default() -> Self {
        Self {
            fog_chance: default_fog_chance(),
            thunder_chance: default_thunder_chance(),
        }
    }
}

const fn default_fog_chance() -> f64 {
    0.3
}

const fn default_thunder_chance() -> f64 {
    0.5
}

/// The last successfully applied `(phase, instance, file)` triple.
///
/// Serialized as `{ "phase": ..., "weather": ..., "file": ... }`, which is
/// the on-disk cache format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CachedState {
    /// Phase at the time of application.
    pub phase: Phase,
    /// Weather instance that was applied.
    pub weather: WeatherInstance,
    /// Configured path of the applied file.
    pub file: String,
}

impl CachedState {
    /// Create a cached state triple.
    pub fn new(phase: Phase, weather: WeatherInstance, file: impl Into<String>) -> Self {
        Self {
            phase,
            weather,
            file: file.into(),
        }
    }
}

/// Outcome of one resolution: the chosen instance and file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Phase the resolution ran for.
    pub phase: Phase,
    /// Instance produced by classification and modifiers, before matrix lookup.
    pub requested: WeatherInstance,
    /// Instance whose files were actually used.
    pub instance: WeatherInstance,
    /// Selected file path, exactly as configured in the matrix.
    pub file: String,
    /// `false` when a matrix fallback was used instead of the requested instance.
    pub matched: bool,
}

impl Resolution {
    /// The cache triple this resolution would produce once applied.
    pub fn to_cached_state(&self) -> CachedState {
        CachedState::new(self.phase, self.instance, self.file.clone())
    }
}
