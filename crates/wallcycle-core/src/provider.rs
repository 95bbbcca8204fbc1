//! Weather-provider payload adapter.
//!
//! Turns an `OpenWeather` "current weather" response, already fetched and in
//! memory, into the resolver's [`RawWeather`] plus the localized sunrise and
//! sunset the phase clock needs. Fetching is the caller's business.
//!
//! Fields read:
//!
//! | Payload field      | Meaning                          |
//! |--------------------|----------------------------------|
//! | `weather[0].main`  | category (`"Clouds"`, `"Rain"`)  |
//! | `weather[0].id`    | numeric condition code           |
//! | `clouds.all`       | cloud cover, percent             |
//! | `sys.sunrise`      | unix seconds, required           |
//! | `sys.sunset`       | unix seconds, required           |
//! | `timezone`         | UTC offset in seconds            |

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use wallcycle_types::{Phase, RawWeather};

use crate::clock::{self, Checkpoint, ClockError};

/// Errors that can occur when reading a provider payload.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The payload is not valid JSON or has wrongly typed fields.
    #[error("invalid weather payload: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A required field is absent.
    #[error("weather payload is missing {field}")]
    MissingField {
        /// Dotted name of the field.
        field: &'static str,
    },

    /// A timestamp or offset is outside the representable range.
    #[error("weather payload has an out-of-range {field}: {value}")]
    OutOfRange {
        /// Dotted name of the field.
        field: &'static str,
        /// The offending value.
        value: i64,
    },
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    clouds: Option<Clouds>,
    #[serde(default)]
    sys: Option<Sys>,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: Option<String>,
    id: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct Clouds {
    all: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Sys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

/// One provider observation, localized to the observed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// The reading handed to the resolver.
    pub raw: RawWeather,
    /// Local sunrise.
    pub sunrise: DateTime<FixedOffset>,
    /// Local sunset.
    pub sunset: DateTime<FixedOffset>,
    /// The location's UTC offset.
    pub offset: FixedOffset,
}

impl Observation {
    /// Parse an `OpenWeather` current-weather payload.
    pub fn from_openweather_json(json: &str) -> Result<Self, ProviderError> {
        let payload: Payload = serde_json::from_str(json)?;

        let offset = FixedOffset::east_opt(payload.timezone).ok_or(ProviderError::OutOfRange {
            field: "timezone",
            value: i64::from(payload.timezone),
        })?;
        let sys = payload.sys.as_ref();
        let sunrise = local_time("sys.sunrise", sys.and_then(|s| s.sunrise), offset)?;
        let sunset = local_time("sys.sunset", sys.and_then(|s| s.sunset), offset)?;

        let first = payload.weather.into_iter().next();
        let (category, code) = first.map_or((None, None), |c| (c.main, c.id));
        let mut raw = RawWeather::new(category.unwrap_or_default());
        if let Some(code) = code {
            raw = raw.with_code(code);
        }
        if let Some(all) = payload.clouds.and_then(|c| c.all) {
            raw = raw.with_clouds(u8::try_from(all.min(100)).unwrap_or(100));
        }

        Ok(Self {
            raw,
            sunrise,
            sunset,
            offset,
        })
    }

    /// `now` expressed in the observed location's offset.
    pub fn localize<Tz: chrono::TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// The phase in effect at `now`.
    pub fn phase_at(&self, now: DateTime<FixedOffset>) -> Result<Phase, ClockError> {
        clock::phase_at(now, self.sunrise, self.sunset)
    }

    /// The next phase boundary after `now`.
    pub fn next_checkpoint(&self, now: DateTime<FixedOffset>) -> Result<Checkpoint, ClockError> {
        clock::next_checkpoint(now, self.sunrise, self.sunset)
    }
}

fn local_time(
    field: &'static str,
    secs: Option<i64>,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, ProviderError> {
    let secs = secs.ok_or(ProviderError::MissingField { field })?;
    DateTime::from_timestamp(secs, 0)
        .map(|utc| utc.with_timezone(&offset))
        .ok_or(ProviderError::OutOfRange { field, value: secs })
}
