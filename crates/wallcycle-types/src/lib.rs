//! Shared type definitions for the Wallcycle wallpaper resolver.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace: the solar phase, the weather instances used as matrix keys,
//! the operating mode, and the value types that cross crate boundaries.
//!
//! # Modules
//!
//! - [`enums`] -- `Phase`, `WeatherInstance`, `Mode`
//! - [`structs`] -- Raw weather readings, probabilities, cache and resolution values
//! - [`matrix`] -- The ordered phase/instance/file matrix

pub mod enums;
pub mod matrix;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Mode, ParseEnumError, Phase, WeatherInstance};
pub use matrix::{Matrix, MatrixError, PhaseEntries};
pub use structs::{CachedState, ProbabilityConfig, RawWeather, Resolution};
