//! Subcommand handlers.
//!
//! Each handler returns the JSON document `main` prints on stdout. Logs go
//! to stderr, so the output can be piped straight into other tools.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use wallcycle_core::clock::FALLBACK_PHASE;
use wallcycle_core::config::{self, WallpaperConfig};
use wallcycle_core::{Applier, CommandApplier, CycleContext, CycleOutcome, Observation, run_cycle};
use wallcycle_resolver::ResolutionEngine;
use wallcycle_types::{Phase, RawWeather};

use crate::error::CliError;

/// A weather reading given on the command line.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct WeatherArgs {
    /// Provider category, e.g. `Clouds` or `Rain`
    #[arg(long)]
    pub category: Option<String>,

    /// Numeric provider condition code
    #[arg(long)]
    pub code: Option<u16>,

    /// Cloud cover in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub clouds: Option<u8>,
}

impl WeatherArgs {
    /// The reading, or `None` when no category was given.
    pub fn reading(&self) -> Option<RawWeather> {
        let mut raw = RawWeather::new(self.category.clone()?);
        if let Some(code) = self.code {
            raw = raw.with_code(code);
        }
        if let Some(clouds) = self.clouds {
            raw = raw.with_clouds(clouds);
        }
        Some(raw)
    }
}

/// Arguments for `wallcycle resolve`.
#[derive(Debug, Clone, clap::Args)]
pub struct ResolveArgs {
    /// Phase to resolve for
    #[arg(long)]
    pub phase: Phase,

    #[command(flatten)]
    pub weather: WeatherArgs,

    /// Seed for the random draws (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `wallcycle run`.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Phase to run for, instead of deriving it from sun times
    #[arg(long, conflicts_with = "weather_json")]
    pub phase: Option<Phase>,

    /// `OpenWeather` current-weather payload to take sun times and weather from
    #[arg(long)]
    pub weather_json: Option<PathBuf>,

    #[command(flatten)]
    pub weather: WeatherArgs,

    /// Program that sets the wallpaper; the image path is its last argument
    #[arg(long)]
    pub apply_cmd: Option<String>,

    /// Extra argument for the apply program, placed before the image path
    #[arg(long, requires = "apply_cmd")]
    pub apply_arg: Vec<String>,

    /// Seed for the random draws (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Evaluate the phase at this RFC 3339 instant instead of now
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for `wallcycle phase`.
#[derive(Debug, Clone, clap::Args)]
pub struct PhaseArgs {
    /// `OpenWeather` current-weather payload with sunrise and sunset
    #[arg(long)]
    pub weather_json: PathBuf,

    /// Evaluate at this RFC 3339 instant instead of now
    #[arg(long)]
    pub at: Option<String>,
}

/// Resolve one wallpaper without touching the cache.
pub fn resolve(config_dir: &Path, args: &ResolveArgs) -> Result<Value, CliError> {
    let (config, _) = WallpaperConfig::load(config_dir)?;
    let engine = ResolutionEngine::new(config.engine_settings(), &config.matrix);
    let raw = args.weather.reading();
    let resolution = engine.resolve(args.phase, raw.as_ref(), &mut seeded_rng(args.seed))?;
    Ok(serde_json::to_value(resolution)?)
}

/// Run one full cycle. Without `--apply-cmd` this is a dry run.
pub fn run(config_dir: &Path, args: &RunArgs) -> Result<Value, CliError> {
    let (config, source) = WallpaperConfig::load(config_dir)?;
    debug!(path = %source.display(), mode = %config.flags.mode, "configuration loaded");
    let ctx = CycleContext::new(config, config::base_dir(config_dir));

    let observation = args.weather_json.as_deref().and_then(|path| {
        read_observation(path)
            .inspect_err(|e| warn!(error = %e, "weather unavailable"))
            .ok()
    });
    let now = parse_at(args.at.as_deref())?;
    let phase = current_phase(args.phase, observation.as_ref(), now);
    let raw = args
        .weather
        .reading()
        .or_else(|| observation.map(|obs| obs.raw));

    let mut applier = args.apply_cmd.as_ref().map(|program| {
        args.apply_arg
            .iter()
            .fold(CommandApplier::new(program.clone()), |cmd, arg| {
                cmd.arg(arg.clone())
            })
    });
    if applier.is_none() {
        info!("no apply command given, dry run");
    }

    let outcome = run_cycle(
        &ctx,
        phase,
        raw.as_ref(),
        applier.as_mut().map(|cmd| cmd as &mut dyn Applier),
        &mut seeded_rng(args.seed),
    )?;
    Ok(outcome_json(&outcome))
}

/// Report the phase at an instant and the next phase boundary.
pub fn phase(args: &PhaseArgs) -> Result<Value, CliError> {
    let obs = read_observation(&args.weather_json)?;
    let now = obs.localize(&parse_at(args.at.as_deref())?);
    let phase = obs.phase_at(now)?;
    let next = obs.next_checkpoint(now)?;
    Ok(json!({
        "now": now.to_rfc3339(),
        "phase": phase,
        "sunrise": obs.sunrise.to_rfc3339(),
        "sunset": obs.sunset.to_rfc3339(),
        "next": {
            "phase": next.phase,
            "at": next.at.to_rfc3339(),
            "in_seconds": next.seconds_from(now),
        },
    }))
}

/// Load and validate the configuration and report the matrix shape.
///
/// Files the matrix names but the base directory lacks are listed, not
/// rejected; a cycle skips them at apply time.
pub fn validate(config_dir: &Path) -> Result<Value, CliError> {
    let (config, source) = WallpaperConfig::load(config_dir)?;
    let base_dir = config::base_dir(config_dir);

    let phases: serde_json::Map<String, Value> = config
        .matrix
        .phases()
        .map(|phase| (phase.to_string(), json!(config.matrix.instances(phase))))
        .collect();
    let files: Vec<&String> = config
        .matrix
        .entries()
        .flat_map(|(_, _, files)| files)
        .collect();
    let missing: Vec<&String> = files
        .iter()
        .copied()
        .filter(|file| !base_dir.join(file).is_file())
        .collect();
    for file in &missing {
        warn!(file = %file, "configured wallpaper does not exist");
    }

    Ok(json!({
        "source": source.display().to_string(),
        "mode": config.flags.mode,
        "cache_enabled": config.flags.cache_enabled,
        "phases": phases,
        "files": files.len(),
        "missing": missing,
    }))
}

fn current_phase(
    explicit: Option<Phase>,
    observation: Option<&Observation>,
    now: DateTime<Utc>,
) -> Phase {
    if let Some(phase) = explicit {
        return phase;
    }
    let Some(obs) = observation else {
        warn!(phase = %FALLBACK_PHASE, "no sun times available, using fallback phase");
        return FALLBACK_PHASE;
    };
    obs.phase_at(obs.localize(&now)).unwrap_or_else(|e| {
        warn!(
            error = %e,
            phase = %FALLBACK_PHASE,
            "phase computation failed, using fallback phase"
        );
        FALLBACK_PHASE
    })
}

fn read_observation(path: &Path) -> Result<Observation, CliError> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Observation::from_openweather_json(&json)?)
}

fn parse_at(at: Option<&str>) -> Result<DateTime<Utc>, CliError> {
    at.map_or_else(
        || Ok(Utc::now()),
        |value| {
            DateTime::parse_from_rfc3339(value)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|source| CliError::InvalidTime {
                    value: value.to_owned(),
                    source,
                })
        },
    )
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    seed.map_or_else(
        || SmallRng::from_rng(&mut rand::rng()),
        SmallRng::seed_from_u64,
    )
}

fn outcome_json(outcome: &CycleOutcome) -> Value {
    let path = match outcome {
        CycleOutcome::Applied { path, .. }
        | CycleOutcome::MissingFile { path, .. }
        | CycleOutcome::DryRun { path, .. } => Some(path.display().to_string()),
        CycleOutcome::Unchanged { .. } => None,
    };
    json!({
        "outcome": outcome.label(),
        "resolution": outcome.resolution(),
        "path": path,
    })
}
