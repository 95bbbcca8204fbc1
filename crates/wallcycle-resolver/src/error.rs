//! Error types for the `wallcycle-resolver` crate.
//!
//! Every failure here is local to one resolution cycle. The scheduler logs
//! it and tries again on the next cycle.

use wallcycle_types::Phase;

/// Errors that can occur while resolving a wallpaper.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The matrix has no usable instances for the active phase.
    ///
    /// Entries with an empty file list do not count as usable.
    #[error("no matrix entries configured for phase {phase}")]
    MissingPhaseConfiguration {
        /// The phase that has no entries.
        phase: Phase,
    },
}
