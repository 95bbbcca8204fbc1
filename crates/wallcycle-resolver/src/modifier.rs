//! Random weather modifiers applied after classification.
//!
//! Two independent draws may happen per resolution:
//!
//! - **Fog**: `weather_based` mode only, `dawn` only, base `clear`/`cloudy`.
//!   On `r < fogChance` the base becomes `fog_clear`/`fog_cloudy`, but only
//!   if that key is configured for `dawn`. Otherwise the base is kept.
//! - **Thunderstorm**: `weather_based` or `weather_no_fog`, base
//!   `heavy_rain`. On `r < thunderChance` the base becomes `thunderstorm`.
//!
//! The legacy `apply_fog_for_all_phases` flag is not an input here. Fog is
//! restricted to dawn regardless of it.

use rand::Rng;
use tracing::{debug, info};
use wallcycle_types::{Matrix, Mode, Phase, ProbabilityConfig, WeatherInstance};

/// What the modifiers did to a base instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierOutcome {
    /// The instance after modifiers.
    pub instance: WeatherInstance,
    /// The fog modifier replaced the base.
    pub fog_applied: bool,
    /// The thunderstorm modifier replaced the base.
    pub thunder_applied: bool,
}

impl ModifierOutcome {
    const fn unchanged(instance: WeatherInstance) -> Self {
        Self {
            instance,
            fog_applied: false,
            thunder_applied: false,
        }
    }
}

/// The fog instance a base instance turns into, if it can turn foggy at all.
pub const fn fog_target(base: WeatherInstance) -> Option<WeatherInstance> {
    match base {
        WeatherInstance::Clear => Some(WeatherInstance::FogClear),
        WeatherInstance::Cloudy => Some(WeatherInstance::FogCloudy),
        _ => None,
    }
}

/// Apply the fog and thunderstorm modifiers to a classified base instance.
///
/// `matrix` is consulted only to check that a fog key exists for `dawn`.
/// Draws come from `rng`; the number of draws depends only on the inputs,
/// so a seeded generator gives reproducible results.
pub fn apply_modifiers(
    phase: Phase,
    base: WeatherInstance,
    probs: &ProbabilityConfig,
    mode: Mode,
    matrix: &Matrix,
    log_details: bool,
    rng: &mut impl Rng,
) -> ModifierOutcome {
    if !mode.uses_weather() {
        return ModifierOutcome::unchanged(base);
    }

    let mut outcome = ModifierOutcome::unchanged(base);

    if mode == Mode::WeatherBased && phase == Phase::Dawn {
        if let Some(target) = fog_target(base) {
            let roll: f64 = rng.random();
            let configured = matrix.contains(Phase::Dawn, target);
            info!(
                target: "weather",
                %phase,
                %base,
                fog_target = %target,
                configured,
                roll,
                threshold = probs.fog_chance,
                "fog candidate"
            );
            if roll < probs.fog_chance {
                if configured {
                    if log_details {
                        debug!(%base, %target, roll, threshold = probs.fog_chance, "fog applied");
                    }
                    outcome.instance = target;
                    outcome.fog_applied = true;
                } else if log_details {
                    debug!(%target, "fog would apply but the dawn matrix has no such key");
                }
            }
        }
    }

    if outcome.instance == WeatherInstance::HeavyRain {
        let roll: f64 = rng.random();
        if log_details {
            debug!(roll, threshold = probs.thunder_chance, "thunderstorm draw");
        }
        if roll < probs.thunder_chance {
            outcome.instance = WeatherInstance::Thunderstorm;
            outcome.thunder_applied = true;
        }
    }

    outcome
}
