//! The resolution engine: phase + raw weather -> instance + file.
//!
//! Stages by mode:
//!
//! | Mode             | Classify | Modifiers        | Instance source          |
//! |------------------|----------|------------------|--------------------------|
//! | `time_only`      | no       | no               | always `clear`           |
//! | `weather_based`  | yes      | fog + thunder    | classified + modified    |
//! | `weather_no_fog` | yes      | thunder only     | classified + modified    |
//! | `random_mode`    | no       | no               | random configured key    |
//!
//! Every mode then runs the matrix lookup (with fallback) and the file
//! selector. The engine never touches the cache or the apply step.

use rand::Rng;
use tracing::{debug, info};
use wallcycle_types::{
    Matrix, Mode, Phase, ProbabilityConfig, RawWeather, Resolution, WeatherInstance,
};

use crate::classifier::{self, Condition};
use crate::error::ResolveError;
use crate::lookup;
use crate::modifier;
use crate::selector;

/// The subset of configuration the engine needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Which stages run.
    pub mode: Mode,
    /// Fog and thunderstorm chances.
    pub probabilities: ProbabilityConfig,
    /// Pick files at random instead of taking the first candidate.
    pub use_random_selection: bool,
    /// Emit per-draw DEBUG logs.
    pub log_details: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            probabilities: ProbabilityConfig::default(),
            use_random_selection: true,
            log_details: false,
        }
    }
}

/// Resolves wallpapers against one immutable matrix.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionEngine<'a> {
    settings: EngineSettings,
    matrix: &'a Matrix,
}

impl<'a> ResolutionEngine<'a> {
    /// Create an engine over a validated matrix.
    pub const fn new(settings: EngineSettings, matrix: &'a Matrix) -> Self {
        Self { settings, matrix }
    }

    /// The settings this engine was built with.
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Resolve the wallpaper for `phase`.
    ///
    /// `raw` is ignored outside the weather modes; a missing reading in a
    /// weather mode classifies as `clear`. The same inputs and the same
    /// generator state always produce the same result.
    pub fn resolve(
        &self,
        phase: Phase,
        raw: Option<&RawWeather>,
        rng: &mut impl Rng,
    ) -> Result<Resolution, ResolveError> {
        let settings = &self.settings;

        let requested = match settings.mode {
            Mode::TimeOnly => WeatherInstance::Clear,
            Mode::RandomMode => lookup::random_instance(phase, self.matrix, rng)?,
            Mode::WeatherBased | Mode::WeatherNoFog => {
                let base = self.classify(phase, raw);
                let outcome = modifier::apply_modifiers(
                    phase,
                    base,
                    &settings.probabilities,
                    settings.mode,
                    self.matrix,
                    settings.log_details,
                    rng,
                );
                info!(
                    target: "weather",
                    mode = %settings.mode,
                    %phase,
                    instance = %outcome.instance,
                    fog_applied = outcome.fog_applied,
                    thunder_applied = outcome.thunder_applied,
                    "final instance"
                );
                outcome.instance
            }
        };

        let hit = lookup::resolve(phase, requested, self.matrix)?;
        if !hit.matched {
            debug!(%phase, %requested, fallback = %hit.instance, "matrix fallback used");
        }

        // Lookups skip empty lists, so a hit always has a candidate.
        let file = selector::select(hit.files, settings.use_random_selection, rng)
            .ok_or(ResolveError::MissingPhaseConfiguration { phase })?;
        if settings.log_details {
            debug!(
                %phase,
                instance = %hit.instance,
                candidates = hit.files.len(),
                random = settings.use_random_selection,
                file,
                "file selected"
            );
        }

        Ok(Resolution {
            phase,
            requested,
            instance: hit.instance,
            file: file.to_owned(),
            matched: hit.matched,
        })
    }

    fn classify(&self, phase: Phase, raw: Option<&RawWeather>) -> WeatherInstance {
        let Some(raw) = raw else {
            debug!(%phase, "no weather reading, classifying as clear");
            return WeatherInstance::Clear;
        };
        let condition = classifier::categorize(raw);
        let base = classifier::classify(raw);
        info!(
            target: "weather",
            mode = %self.settings.mode,
            %phase,
            %base,
            category = raw.category.as_str(),
            code = ?raw.code,
            clouds = ?raw.cloud_pct,
            fog_observed = condition == Condition::Fog,
            "classified"
        );
        base
    }
}
