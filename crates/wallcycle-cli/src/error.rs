//! Error types for the `wallcycle` binary.
//!
//! [`CliError`] is the top-level error type that wraps all possible
//! failure modes of a command. `main` reports it through `anyhow`.

use std::path::PathBuf;

/// Top-level error for the `wallcycle` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that command handlers can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: wallcycle_core::ConfigError,
    },

    /// The weather payload could not be read.
    #[error("weather payload error: {source}")]
    Provider {
        /// The underlying provider error.
        #[from]
        source: wallcycle_core::ProviderError,
    },

    /// Phase boundaries could not be computed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: wallcycle_core::ClockError,
    },

    /// Resolution failed outside a cycle.
    #[error("resolve error: {source}")]
    Resolve {
        /// The underlying resolver error.
        #[from]
        source: wallcycle_resolver::ResolveError,
    },

    /// A cycle was aborted.
    #[error("cycle error: {source}")]
    Cycle {
        /// The underlying cycle error.
        #[from]
        source: wallcycle_core::CycleError,
    },

    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// `--at` is not an RFC 3339 timestamp.
    #[error("invalid --at value {value:?}: {source}")]
    InvalidTime {
        /// The value given.
        value: String,
        /// The underlying parse error.
        source: chrono::ParseError,
    },

    /// Output could not be serialized.
    #[error("failed to render output: {source}")]
    Output {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
