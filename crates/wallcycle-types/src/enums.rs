//! Enumeration types for the Wallcycle resolver.
//!
//! Every enum serializes as its `snake_case` name, which is also the key
//! used in the configuration matrix and in the cache file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    /// The kind of value being parsed (`phase`, `weather instance`, `mode`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// A segment of the day/night solar cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Everything outside the sunrise/sunset windows.
    Night,
    /// Half an hour either side of sunrise. The only phase that can be foggy.
    Dawn,
    /// From the end of dawn until two hours after sunrise.
    Morning,
    /// Full daylight.
    Day,
    /// The two hours leading up to the sunset window.
    Evening,
    /// Half an hour either side of sunset.
    Sunset,
}

impl Phase {
    /// All phases in cyclic order, starting at night.
    pub const ALL: [Self; 6] = [
        Self::Night,
        Self::Dawn,
        Self::Morning,
        Self::Day,
        Self::Evening,
        Self::Sunset,
    ];

    /// The phase that follows this one in the daily cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Night => Self::Dawn,
            Self::Dawn => Self::Morning,
            Self::Morning => Self::Day,
            Self::Day => Self::Evening,
            Self::Evening => Self::Sunset,
            Self::Sunset => Self::Night,
        }
    }

    /// The configuration/cache key for this phase.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::Dawn => "dawn",
            Self::Morning => "morning",
            Self::Day => "day",
            Self::Evening => "evening",
            Self::Sunset => "sunset",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "phase",
                value: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Weather instance
// ---------------------------------------------------------------------------

/// The bucket a weather reading is classified into; used as a matrix key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherInstance {
    /// Clear sky, or few clouds.
    Clear,
    /// Cloud cover of at least 40%.
    Cloudy,
    /// Cloud cover of at least 85%.
    Overcast,
    /// Drizzle, light rain, light snow.
    Rain,
    /// Heavy rain or snow, and the base for thunderstorms.
    HeavyRain,
    /// Produced only by the thunderstorm modifier.
    Thunderstorm,
    /// Dawn fog over a clear sky. Produced only by the fog modifier.
    FogClear,
    /// Dawn fog over a cloudy sky. Produced only by the fog modifier.
    FogCloudy,
}

impl WeatherInstance {
    /// All instances in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Clear,
        Self::Cloudy,
        Self::Overcast,
        Self::Rain,
        Self::HeavyRain,
        Self::Thunderstorm,
        Self::FogClear,
        Self::FogCloudy,
    ];

    /// Whether this is one of the dawn-only fog instances.
    pub const fn is_fog(self) -> bool {
        matches!(self, Self::FogClear | Self::FogCloudy)
    }

    /// The configuration/cache key for this instance.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Overcast => "overcast",
            Self::Rain => "rain",
            Self::HeavyRain => "heavy_rain",
            Self::Thunderstorm => "thunderstorm",
            Self::FogClear => "fog_clear",
            Self::FogCloudy => "fog_cloudy",
        }
    }
}

impl fmt::Display for WeatherInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherInstance {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|instance| instance.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "weather instance",
                value: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Operating policy: which stages of the resolution engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Phase only; the instance is always `clear`.
    #[default]
    TimeOnly,
    /// Classification plus fog and thunderstorm modifiers.
    WeatherBased,
    /// Classification plus the thunderstorm modifier; fog never appears.
    WeatherNoFog,
    /// A uniformly random configured instance for the phase.
    RandomMode,
}

impl Mode {
    /// All modes.
    pub const ALL: [Self; 4] = [
        Self::TimeOnly,
        Self::WeatherBased,
        Self::WeatherNoFog,
        Self::RandomMode,
    ];

    /// Whether raw weather is classified in this mode.
    pub const fn uses_weather(self) -> bool {
        matches!(self, Self::WeatherBased | Self::WeatherNoFog)
    }

    /// The configuration key for this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeOnly => "time_only",
            Self::WeatherBased => "weather_based",
            Self::WeatherNoFog => "weather_no_fog",
            Self::RandomMode => "random_mode",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "mode",
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn phase_cycle_returns_to_start() {
        let mut phase = Phase::Night;
        for _ in 0..Phase::ALL.len() {
            phase = phase.next();
        }
        assert_eq!(phase, Phase::Night);
        assert_eq!(Phase::Sunset.next(), Phase::Night);
        assert_eq!(Phase::Night.next(), Phase::Dawn);
    }

    #[test]
    fn serde_keys_match_as_str() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
        for instance in WeatherInstance::ALL {
            let json = serde_json::to_string(&instance).unwrap();
            assert_eq!(json, format!("\"{}\"", instance.as_str()));
        }
        for mode in Mode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("Dawn".parse::<Phase>().unwrap(), Phase::Dawn);
        assert_eq!(
            "HEAVY_RAIN".parse::<WeatherInstance>().unwrap(),
            WeatherInstance::HeavyRain
        );
        assert_eq!("weather_no_fog".parse::<Mode>().unwrap(), Mode::WeatherNoFog);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "twilight".parse::<Phase>().unwrap_err();
        assert_eq!(err.kind, "phase");
        assert_eq!(err.to_string(), r#"unknown phase: "twilight""#);
        assert!("fog".parse::<WeatherInstance>().is_err());
    }

    #[test]
    fn only_fog_instances_are_fog() {
        let fog: Vec<_> = WeatherInstance::ALL
            .into_iter()
            .filter(|i| i.is_fog())
            .collect();
        assert_eq!(fog, vec![WeatherInstance::FogClear, WeatherInstance::FogCloudy]);
    }

    #[test]
    fn default_mode_is_time_only() {
        assert_eq!(Mode::default(), Mode::TimeOnly);
    }
}
