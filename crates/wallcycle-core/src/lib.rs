//! Configuration, phase clock, and the scheduling cycle for Wallcycle.
//!
//! This crate wires the pure resolver to the outside world: it loads and
//! validates `config.json`, derives the solar phase from provider data, and
//! runs one cycle of resolve, compare, apply, and remember.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `config.json` (or the legacy
//!   `wallpapers.json`) into strongly-typed structs.
//! - [`clock`] -- Solar phase windows and the next phase checkpoint.
//! - [`provider`] -- Weather-provider payload adapter.
//! - [`cycle`] -- [`run_cycle`] and the [`Applier`] seam.
//!
//! [`run_cycle`]: cycle::run_cycle
//! [`Applier`]: cycle::Applier

pub mod clock;
pub mod config;
pub mod cycle;
pub mod provider;

pub use clock::{Checkpoint, ClockError, PhaseWindows};
pub use config::{ConfigError, WallpaperConfig};
pub use cycle::{
    Applier, ApplyError, CommandApplier, CycleContext, CycleError, CycleOutcome, RecordingApplier,
    run_cycle,
};
pub use provider::{Observation, ProviderError};
