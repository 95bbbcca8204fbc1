//! Weather statistics: how often each instance was applied.
//!
//! Fog instances are aggregated under a single `fog` counter. Keys other
//! than the seven known counters are kept as-is when the file is rewritten.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wallcycle_types::WeatherInstance;

use crate::error::StoreError;
use crate::state_store::write_json_atomic;

/// Default statistics file, relative to the base directory.
pub const DEFAULT_STATS_FILE: &str = ".cache/weather_stats.json";

/// Per-instance counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherStats {
    /// `clear` applications.
    pub clear: u64,
    /// `cloudy` applications.
    pub cloudy: u64,
    /// `overcast` applications.
    pub overcast: u64,
    /// `rain` applications.
    pub rain: u64,
    /// `heavy_rain` applications.
    pub heavy_rain: u64,
    /// `thunderstorm` applications.
    pub thunderstorm: u64,
    /// `fog_clear` and `fog_cloudy` applications combined.
    pub fog: u64,
    /// Unrecognized keys, preserved on rewrite.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl WeatherStats {
    /// The counter key an instance is recorded under.
    pub const fn key_for(instance: WeatherInstance) -> &'static str {
        if instance.is_fog() {
            "fog"
        } else {
            instance.as_str()
        }
    }

    /// Increment the counter for `instance` and return its new value.
    pub const fn record(&mut self, instance: WeatherInstance) -> u64 {
        let counter = match instance {
            WeatherInstance::Clear => &mut self.clear,
            WeatherInstance::Cloudy => &mut self.cloudy,
            WeatherInstance::Overcast => &mut self.overcast,
            WeatherInstance::Rain => &mut self.rain,
            WeatherInstance::HeavyRain => &mut self.heavy_rain,
            WeatherInstance::Thunderstorm => &mut self.thunderstorm,
            WeatherInstance::FogClear | WeatherInstance::FogCloudy => &mut self.fog,
        };
        *counter = counter.saturating_add(1);
        *counter
    }

    /// Total of the seven known counters.
    pub const fn total(&self) -> u64 {
        self.clear
            .saturating_add(self.cloudy)
            .saturating_add(self.overcast)
            .saturating_add(self.rain)
            .saturating_add(self.heavy_rain)
            .saturating_add(self.thunderstorm)
            .saturating_add(self.fog)
    }
}

/// The statistics JSON file.
#[derive(Debug, Clone)]
pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    /// Statistics stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the counters. A missing or unreadable-as-JSON file yields zeros.
    pub fn load(&self) -> Result<WeatherStats, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
                debug!(path = %self.path.display(), error = %e, "weather stats unreadable, starting over");
                WeatherStats::default()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(WeatherStats::default()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    /// Record one application of `instance` and write the file back.
    pub fn bump(&self, instance: WeatherInstance) -> Result<WeatherStats, StoreError> {
        let mut stats = self.load()?;
        let total = stats.record(instance);
        write_json_atomic(&self.path, &stats)?;
        info!(key = WeatherStats::key_for(instance), total, "weather stats updated");
        Ok(stats)
    }
}
