//! The last-applied state cache.
//!
//! The cache file holds a single JSON object:
//!
//! ```json
//! { "phase": "dawn", "weather": "fog_clear", "file": "backgrounds/dawn_fog_clear.jpg" }
//! ```
//!
//! An absent file, the all-empty placeholder object, or a file that no longer
//! parses are all read as "no prior state", so the next cycle always applies.
//!
//! A cycle must read, compare, and write under one [`StateStore::lock`]
//! guard so two overlapping cycles never decide "unchanged" against a stale
//! read. The guard holds an OS advisory lock on `last_state.json.lock`, so
//! the exclusion spans separate processes, not just threads.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use serde::Deserialize;
use tracing::{debug, warn};
use wallcycle_types::{CachedState, Phase, WeatherInstance};

use crate::error::StoreError;

/// Cache directory, relative to the base directory.
pub const CACHE_DIR: &str = ".cache";

/// Cache file name inside [`CACHE_DIR`].
pub const STATE_FILE: &str = "last_state.json";

/// Suffix of the lock file that guards the cache file.
pub const LOCK_SUFFIX: &str = ".lock";

/// Whether `candidate` equals the cached state, field by field.
///
/// Returns `false` when there is no cached state or when the cache check is
/// disabled.
pub fn is_unchanged(
    candidate: &CachedState,
    cached: Option<&CachedState>,
    cache_enabled: bool,
) -> bool {
    cache_enabled && cached.is_some_and(|prev| prev == candidate)
}

/// On-disk shape, tolerant of the empty placeholder.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredState {
    phase: String,
    weather: String,
    file: String,
}

impl StoredState {
    fn is_placeholder(&self) -> bool {
        self.phase.is_empty() && self.weather.is_empty() && self.file.is_empty()
    }

    fn into_cached(self) -> Option<CachedState> {
        let phase = self.phase.parse::<Phase>().ok()?;
        let weather = self.weather.parse::<WeatherInstance>().ok()?;
        if self.file.is_empty() {
            return None;
        }
        Some(CachedState::new(phase, weather, self.file))
    }
}

/// File-backed cache of the last applied `(phase, weather, file)` triple.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// A store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional store under `<base>/.cache/last_state.json`.
    pub fn in_base_dir(base: &Path) -> Self {
        Self::new(base.join(CACHE_DIR).join(STATE_FILE))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sibling lock file, `<state file>.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(LOCK_SUFFIX);
        PathBuf::from(name)
    }

    /// Enter the read-compare-write critical section.
    ///
    /// Blocks until an exclusive advisory lock on the sibling lock file is
    /// held. Every `StateStore` over the same path, in this process or
    /// another, contends for the same lock. The lock is released when the
    /// guard drops.
    pub fn lock(&self) -> Result<StateGuard<'_>, StoreError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| StoreError::io(&lock_path, e))?;
        debug!(path = %lock_path.display(), "state lock acquired");
        Ok(StateGuard {
            path: &self.path,
            _lock: file,
        })
    }
}

/// Exclusive access to the cache file for the duration of one cycle.
#[derive(Debug)]
pub struct StateGuard<'a> {
    path: &'a Path,
    // Closing the handle releases the advisory lock.
    _lock: File,
}

impl StateGuard<'_> {
    /// Read the cached state.
    ///
    /// Missing, placeholder, and unparsable files yield `Ok(None)`. Only a
    /// failing read of an existing file is an error.
    pub fn load(&self) -> Result<Option<CachedState>, StoreError> {
        let text = match fs::read_to_string(self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cached state");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(self.path, e)),
        };

        let stored: StoredState = match serde_json::from_str(&text) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cached state is corrupt, ignoring");
                return Ok(None);
            }
        };
        if stored.is_placeholder() {
            return Ok(None);
        }

        let cached = stored.into_cached();
        if cached.is_none() {
            warn!(path = %self.path.display(), "cached state has unknown values, ignoring");
        }
        Ok(cached)
    }

    /// Compare `candidate` against the cached state.
    pub fn is_unchanged(
        &self,
        candidate: &CachedState,
        cache_enabled: bool,
    ) -> Result<bool, StoreError> {
        if !cache_enabled {
            return Ok(false);
        }
        let cached = self.load()?;
        Ok(is_unchanged(candidate, cached.as_ref(), cache_enabled))
    }

    /// Write `state` as the new cached state.
    ///
    /// The parent directory is created on demand. The file is written to a
    /// sibling temp file first and renamed into place.
    pub fn persist(&self, state: &CachedState) -> Result<(), StoreError> {
        write_json_atomic(self.path, state)?;
        debug!(
            path = %self.path.display(),
            phase = %state.phase,
            weather = %state.weather,
            file = %state.file,
            "cached state persisted"
        );
        Ok(())
    }
}

/// Serialize `value` as pretty JSON into `path` via a temp file and rename.
pub(crate) fn write_json_atomic<T: serde::Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| {
        StoreError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn state() -> CachedState {
        CachedState::new(
            Phase::Dawn,
            WeatherInstance::FogClear,
            "backgrounds/dawn_fog_clear.jpg",
        )
    }

    #[test]
    fn identical_state_is_unchanged() {
        let cached = state();
        assert!(is_unchanged(&state(), Some(&cached), true));
    }

    #[test]
    fn missing_state_is_changed() {
        assert!(!is_unchanged(&state(), None, true));
    }

    #[test]
    fn any_field_difference_is_changed() {
        let cached = state();
        let mut other = state();
        other.file = "backgrounds/dawn_clear.jpg".to_owned();
        assert!(!is_unchanged(&other, Some(&cached), true));

        let mut other = state();
        other.weather = WeatherInstance::Clear;
        assert!(!is_unchanged(&other, Some(&cached), true));

        let mut other = state();
        other.phase = Phase::Morning;
        assert!(!is_unchanged(&other, Some(&cached), true));
    }

    #[test]
    fn disabled_cache_is_always_changed() {
        let cached = state();
        assert!(!is_unchanged(&state(), Some(&cached), false));
    }

    #[test]
    fn placeholder_is_not_a_state() {
        let stored: StoredState =
            serde_json::from_str(r#"{"phase":"","weather":"","file":""}"#).unwrap();
        assert!(stored.is_placeholder());

        let stored: StoredState = serde_json::from_str("{}").unwrap();
        assert!(stored.is_placeholder());
    }

    #[test]
    fn stored_state_parses_known_values() {
        let stored: StoredState = serde_json::from_str(
            r#"{"phase":"dawn","weather":"fog_clear","file":"backgrounds/dawn_fog_clear.jpg"}"#,
        )
        .unwrap();
        assert_eq!(stored.into_cached(), Some(state()));

        let stored: StoredState =
            serde_json::from_str(r#"{"phase":"noon","weather":"clear","file":"a.jpg"}"#).unwrap();
        assert_eq!(stored.into_cached(), None);
    }
}
