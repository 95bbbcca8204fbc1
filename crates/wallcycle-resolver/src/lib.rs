//! Weather/phase resolution for the Wallcycle wallpaper selector.
//!
//! Maps the current solar phase and an optional raw weather reading to a
//! concrete weather instance and wallpaper file, according to the operating
//! mode, the modifier probabilities, and the configured matrix.
//!
//! Everything here is synchronous and pure apart from the random draws,
//! which always come from a caller-supplied generator.
//!
//! # Modules
//!
//! - [`classifier`] -- Raw provider reading to weather instance.
//! - [`modifier`] -- Random fog (dawn only) and thunderstorm modifiers.
//! - [`lookup`] -- Matrix lookup with clear/first-instance fallback.
//! - [`selector`] -- Random or first file among candidates.
//! - [`engine`] -- [`ResolutionEngine`], which runs the stages for a mode.
//! - [`error`] -- [`ResolveError`].

pub mod classifier;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod modifier;
pub mod selector;

// Re-export primary types at crate root.
pub use classifier::{Condition, classify};
pub use engine::{EngineSettings, ResolutionEngine};
pub use error::ResolveError;
pub use lookup::MatrixLookup;
pub use modifier::{ModifierOutcome, apply_modifiers};
