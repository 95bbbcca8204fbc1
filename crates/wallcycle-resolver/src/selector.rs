//! File selection among a candidate list.
//!
//! Existence on disk is not checked here. A missing file is reported by the
//! apply stage, and selection never skips to another candidate.

use rand::Rng;

/// Pick a file: uniformly at random when `use_random`, else the first one.
///
/// Returns `None` only for an empty list.
pub fn select<'a>(files: &'a [String], use_random: bool, rng: &mut impl Rng) -> Option<&'a str> {
    if files.is_empty() {
        return None;
    }
    let idx = if use_random {
        rng.random_range(0..files.len())
    } else {
        0
    };
    files.get(idx).map(String::as_str)
}
