//! One scheduling cycle: resolve, check, apply, remember.
//!
//! [`run_cycle`] performs, in order:
//!
//! 1. **Resolve** the wallpaper for the phase and reading.
//! 2. **Locate** the file under the base directory. A missing file is
//!    logged at WARN and the cycle ends without applying.
//! 3. **Compare** with the cached state under the store lock. An identical
//!    state ends the cycle.
//! 4. **Apply** through the [`Applier`] and persist the new state.
//! 5. **Count** the requested instance in the weather statistics. Failures
//!    here are logged at DEBUG and never fail the cycle.
//!
//! Without an applier the cycle is a dry run: steps 1-3 happen, nothing is
//! applied or written.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use rand::Rng;
use tracing::{debug, error, info, warn};
use wallcycle_resolver::{ResolutionEngine, ResolveError};
use wallcycle_store::{StateStore, StatsFile, StoreError};
use wallcycle_types::{Phase, RawWeather, Resolution};

use crate::config::WallpaperConfig;

/// Errors that can occur while applying a wallpaper.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// The apply program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// The program that was run.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The apply program exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Failed {
        /// The program that was run.
        program: String,
        /// Its exit status.
        status: ExitStatus,
    },

    /// The applier refused the file.
    #[error("apply rejected: {reason}")]
    Rejected {
        /// Why the file was refused.
        reason: String,
    },
}

/// Errors that abort a cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// Resolution failed, typically an unconfigured phase.
    #[error("resolution failed: {source}")]
    Resolve {
        /// The underlying resolver error.
        #[from]
        source: ResolveError,
    },

    /// The state cache could not be read or written.
    #[error("state store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// The applier failed.
    #[error("apply failed: {source}")]
    Apply {
        /// The underlying apply error.
        #[from]
        source: ApplyError,
    },
}

/// Sets the wallpaper somewhere outside this process.
pub trait Applier {
    /// Apply the image at `path`.
    fn apply(&mut self, path: &Path) -> Result<(), ApplyError>;
}

/// Runs an external program with the image path as its last argument.
#[derive(Debug, Clone)]
pub struct CommandApplier {
    program: String,
    args: Vec<String>,
}

impl CommandApplier {
    /// Run `program` with no extra arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument placed before the image path.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Applier for CommandApplier {
    fn apply(&mut self, path: &Path) -> Result<(), ApplyError> {
        debug!(program = %self.program, path = %path.display(), "running apply command");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|source| ApplyError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ApplyError::Failed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

/// Records applied paths instead of applying them.
#[derive(Debug, Clone, Default)]
pub struct RecordingApplier {
    /// Every path passed to [`Applier::apply`], in order.
    pub applied: Vec<PathBuf>,
    /// When set, every apply is rejected with this reason.
    pub reject_with: Option<String>,
}

impl RecordingApplier {
    /// An applier that accepts everything.
    pub const fn new() -> Self {
        Self {
            applied: Vec::new(),
            reject_with: None,
        }
    }
}

impl Applier for RecordingApplier {
    fn apply(&mut self, path: &Path) -> Result<(), ApplyError> {
        if let Some(reason) = &self.reject_with {
            return Err(ApplyError::Rejected {
                reason: reason.clone(),
            });
        }
        self.applied.push(path.to_path_buf());
        Ok(())
    }
}

/// Everything a cycle needs that outlives one call.
#[derive(Debug)]
pub struct CycleContext {
    config: WallpaperConfig,
    base_dir: PathBuf,
    store: StateStore,
    stats: Option<StatsFile>,
}

impl CycleContext {
    /// Build a context with the cache and statistics under `base_dir`.
    pub fn new(config: WallpaperConfig, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let store = StateStore::in_base_dir(&base_dir);
        let stats = config
            .stats
            .enabled
            .then(|| StatsFile::new(base_dir.join(&config.stats.file)));
        Self {
            config,
            base_dir,
            store,
            stats,
        }
    }

    /// The loaded configuration.
    pub const fn config(&self) -> &WallpaperConfig {
        &self.config
    }

    /// The directory wallpaper paths are relative to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The state cache.
    pub const fn store(&self) -> &StateStore {
        &self.store
    }

    /// The statistics file, when enabled.
    pub const fn stats(&self) -> Option<&StatsFile> {
        self.stats.as_ref()
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The wallpaper was applied and the cache updated.
    Applied {
        /// What was resolved.
        resolution: Resolution,
        /// The file that was applied.
        path: PathBuf,
    },
    /// The cached state matched; nothing was applied.
    Unchanged {
        /// What was resolved.
        resolution: Resolution,
    },
    /// The resolved file does not exist; nothing was applied.
    MissingFile {
        /// What was resolved.
        resolution: Resolution,
        /// The path that was looked for.
        path: PathBuf,
    },
    /// No applier was given; nothing was applied or written.
    DryRun {
        /// What was resolved.
        resolution: Resolution,
        /// The file that would be applied.
        path: PathBuf,
    },
}

impl CycleOutcome {
    /// The resolution behind the outcome.
    pub const fn resolution(&self) -> &Resolution {
        match self {
            Self::Applied { resolution, .. }
            | Self::Unchanged { resolution }
            | Self::MissingFile { resolution, .. }
            | Self::DryRun { resolution, .. } => resolution,
        }
    }

    /// Short label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Applied { .. } => "applied",
            Self::Unchanged { .. } => "unchanged",
            Self::MissingFile { .. } => "missing_file",
            Self::DryRun { .. } => "dry_run",
        }
    }
}

/// Run one cycle for `phase`.
///
/// `raw` is the current reading, if any. `applier` of `None` makes this a
/// dry run. Errors abort the cycle only; the caller decides when to retry.
pub fn run_cycle(
    ctx: &CycleContext,
    phase: Phase,
    raw: Option<&RawWeather>,
    applier: Option<&mut dyn Applier>,
    rng: &mut impl Rng,
) -> Result<CycleOutcome, CycleError> {
    let engine = ResolutionEngine::new(ctx.config.engine_settings(), &ctx.config.matrix);
    let resolution = engine.resolve(phase, raw, rng).inspect_err(|e| {
        error!(%phase, error = %e, "cycle aborted");
    })?;

    let outcome = apply_resolution(ctx, resolution, applier)?;
    let res = outcome.resolution();
    info!(
        phase = %res.phase,
        weather = %res.instance,
        file = %res.file,
        matched = res.matched,
        outcome = outcome.label(),
        "cycle finished"
    );
    Ok(outcome)
}

fn apply_resolution(
    ctx: &CycleContext,
    resolution: Resolution,
    applier: Option<&mut dyn Applier>,
) -> Result<CycleOutcome, CycleError> {
    let path = ctx.base_dir.join(&resolution.file);
    if !path.is_file() {
        warn!(path = %path.display(), "wallpaper file does not exist, skipping apply");
        return Ok(CycleOutcome::MissingFile { resolution, path });
    }

    let candidate = resolution.to_cached_state();
    let guard = ctx.store.lock()?;
    if guard.is_unchanged(&candidate, ctx.config.flags.cache_enabled)? {
        info!(phase = %candidate.phase, weather = %candidate.weather, "no change, skipping");
        return Ok(CycleOutcome::Unchanged { resolution });
    }

    let Some(applier) = applier else {
        return Ok(CycleOutcome::DryRun { resolution, path });
    };

    applier.apply(&path)?;
    guard.persist(&candidate)?;
    drop(guard);

    // Statistics describe the weather, so a matrix fallback still counts
    // as the instance that was asked for.
    if let Some(stats) = &ctx.stats {
        if let Err(e) = stats.bump(resolution.requested) {
            debug!(error = %e, "weather stats update failed");
        }
    }

    Ok(CycleOutcome::Applied { resolution, path })
}
