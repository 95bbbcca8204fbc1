//! Solar phase clock.
//!
//! Phases are derived from the local sunrise and sunset of the current day:
//!
//! | Phase     | Window                              |
//! |-----------|-------------------------------------|
//! | `dawn`    | `[sunrise - 30m, sunrise + 30m)`    |
//! | `morning` | `[sunrise + 30m, sunrise + 2h)`     |
//! | `day`     | `[sunrise + 2h,  sunset - 2h)`      |
//! | `evening` | `[sunset - 2h,   sunset - 30m)`     |
//! | `sunset`  | `[sunset - 30m,  sunset + 30m)`     |
//! | `night`   | otherwise                           |
//!
//! Windows are tested in that order, so on very short days an earlier
//! window wins where two overlap. All offsets use checked arithmetic.

use chrono::{DateTime, FixedOffset, TimeDelta};
use wallcycle_types::Phase;

/// Phase used when no sunrise/sunset is available.
pub const FALLBACK_PHASE: Phase = Phase::Day;

const HALF_HOUR: i64 = 30;
const TWO_HOURS: i64 = 120;
const ONE_DAY: i64 = 24 * 60;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    /// A phase boundary fell outside the representable date range.
    #[error("phase boundary out of range near {anchor}")]
    OutOfRange {
        /// The sunrise or sunset the boundary was derived from.
        anchor: DateTime<FixedOffset>,
    },
}

/// The next phase boundary after some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// When the boundary is crossed.
    pub at: DateTime<FixedOffset>,
    /// The phase that begins there.
    pub phase: Phase,
}

impl Checkpoint {
    /// Whole seconds from `now` until the checkpoint, never below 1.
    pub fn seconds_from(&self, now: DateTime<FixedOffset>) -> i64 {
        self.at.signed_duration_since(now).num_seconds().max(1)
    }
}

/// The start of every phase window for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWindows {
    dawn: DateTime<FixedOffset>,
    morning: DateTime<FixedOffset>,
    day: DateTime<FixedOffset>,
    evening: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
    night: DateTime<FixedOffset>,
}

impl PhaseWindows {
    /// Compute the windows for a sunrise/sunset pair.
    pub fn new(
        sunrise: DateTime<FixedOffset>,
        sunset: DateTime<FixedOffset>,
    ) -> Result<Self, ClockError> {
        Ok(Self {
            dawn: shift(sunrise, -HALF_HOUR)?,
            morning: shift(sunrise, HALF_HOUR)?,
            day: shift(sunrise, TWO_HOURS)?,
            evening: shift(sunset, -TWO_HOURS)?,
            sunset: shift(sunset, -HALF_HOUR)?,
            night: shift(sunset, HALF_HOUR)?,
        })
    }

    /// The phase in effect at `now`.
    pub fn phase_at(&self, now: DateTime<FixedOffset>) -> Phase {
        let within =
            |start: DateTime<FixedOffset>, end: DateTime<FixedOffset>| start <= now && now < end;
        if within(self.dawn, self.morning) {
            Phase::Dawn
        } else if within(self.morning, self.day) {
            Phase::Morning
        } else if within(self.day, self.evening) {
            Phase::Day
        } else if within(self.evening, self.sunset) {
            Phase::Evening
        } else if within(self.sunset, self.night) {
            Phase::Sunset
        } else {
            Phase::Night
        }
    }

    /// The first boundary strictly after `now`.
    ///
    /// After the last boundary of the day this is the next day's dawn.
    pub fn next_checkpoint(&self, now: DateTime<FixedOffset>) -> Result<Checkpoint, ClockError> {
        let boundaries = [
            (self.dawn, Phase::Dawn),
            (self.morning, Phase::Morning),
            (self.day, Phase::Day),
            (self.evening, Phase::Evening),
            (self.sunset, Phase::Sunset),
            (self.night, Phase::Night),
        ];
        if let Some((at, phase)) = boundaries.into_iter().find(|(at, _)| now < *at) {
            return Ok(Checkpoint { at, phase });
        }
        Ok(Checkpoint {
            at: shift(self.dawn, ONE_DAY)?,
            phase: Phase::Dawn,
        })
    }
}

/// The phase in effect at `now` for the given sunrise and sunset.
pub fn phase_at(
    now: DateTime<FixedOffset>,
    sunrise: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
) -> Result<Phase, ClockError> {
    Ok(PhaseWindows::new(sunrise, sunset)?.phase_at(now))
}

/// The next phase boundary after `now` and the phase that begins there.
pub fn next_checkpoint(
    now: DateTime<FixedOffset>,
    sunrise: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
) -> Result<Checkpoint, ClockError> {
    PhaseWindows::new(sunrise, sunset)?.next_checkpoint(now)
}

fn shift(anchor: DateTime<FixedOffset>, minutes: i64) -> Result<DateTime<FixedOffset>, ClockError> {
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| anchor.checked_add_signed(delta))
        .ok_or(ClockError::OutOfRange { anchor })
}
