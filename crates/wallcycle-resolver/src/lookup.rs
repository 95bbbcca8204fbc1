//! Matrix lookup with fallback.
//!
//! Lookup order for `(phase, instance)`:
//!
//! 1. the exact entry (`matched = true`);
//! 2. `(phase, clear)` (`matched = false`);
//! 3. the first instance configured for the phase, in configuration order
//!    (`matched = false`);
//! 4. otherwise [`ResolveError::MissingPhaseConfiguration`].

use rand::Rng;
use wallcycle_types::{Matrix, Phase, WeatherInstance};

use crate::error::ResolveError;

/// The entry a lookup landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLookup<'a> {
    /// The instance whose files are returned.
    pub instance: WeatherInstance,
    /// Candidate files, never empty.
    pub files: &'a [String],
    /// `false` when a fallback entry was used.
    pub matched: bool,
}

/// Look up candidate files for `(phase, instance)` with fallback.
pub fn resolve(
    phase: Phase,
    instance: WeatherInstance,
    matrix: &Matrix,
) -> Result<MatrixLookup<'_>, ResolveError> {
    if let Some(files) = matrix.files(phase, instance) {
        return Ok(MatrixLookup {
            instance,
            files,
            matched: true,
        });
    }

    if let Some(files) = matrix.files(phase, WeatherInstance::Clear) {
        return Ok(MatrixLookup {
            instance: WeatherInstance::Clear,
            files,
            matched: false,
        });
    }

    matrix
        .phase(phase)
        .and_then(|entries| entries.iter().find(|(_, files)| !files.is_empty()))
        .map(|(first, files)| MatrixLookup {
            instance: *first,
            files: files.as_slice(),
            matched: false,
        })
        .ok_or(ResolveError::MissingPhaseConfiguration { phase })
}

/// Pick one configured instance for `phase` uniformly at random.
///
/// Used by `random_mode`, which skips classification and modifiers.
pub fn random_instance(
    phase: Phase,
    matrix: &Matrix,
    rng: &mut impl Rng,
) -> Result<WeatherInstance, ResolveError> {
    let instances = matrix.instances(phase);
    if instances.is_empty() {
        return Err(ResolveError::MissingPhaseConfiguration { phase });
    }
    let idx = rng.random_range(0..instances.len());
    instances
        .get(idx)
        .copied()
        .ok_or(ResolveError::MissingPhaseConfiguration { phase })
}
