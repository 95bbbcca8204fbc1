//! File-backed state for the Wallcycle scheduler.
//!
//! Two small JSON files live under the base directory's `.cache/`:
//!
//! ```text
//! Cycle
//!     |
//!     +-- lock, load, compare, persist --> last_state.json    (StateStore)
//!     |
//!     +-- bump counter -----------------> weather_stats.json (StatsFile)
//! ```
//!
//! # Modules
//!
//! - [`state_store`] -- Last-applied state cache and the `is_unchanged` check
//! - [`stats`] -- Per-instance application counters
//! - [`error`] -- Shared error types

pub mod error;
pub mod state_store;
pub mod stats;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use state_store::{StateGuard, StateStore, is_unchanged};
pub use stats::{StatsFile, WeatherStats};
