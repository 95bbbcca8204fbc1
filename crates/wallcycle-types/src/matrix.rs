//! The wallpaper matrix: phase -> weather instance -> candidate files.
//!
//! Iteration order is the order of the configuration source. The resolver's
//! last-resort fallback picks the first instance listed for a phase, so
//! insertion order is part of the contract and is preserved with
//! [`IndexMap`].
//!
//! Two source shapes are accepted per phase:
//!
//! ```json
//! { "night": "backgrounds/night.jpg" }
//! { "dawn": { "clear": ["a.jpg", "b.jpg"], "fog_clear": "fog.jpg" } }
//! ```
//!
//! The first (legacy) form is shorthand for `{ "clear": [path] }`; a bare
//! string for an instance is shorthand for a one-element list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::enums::{Phase, WeatherInstance};

/// Candidate files for each instance of one phase.
pub type PhaseEntries = IndexMap<WeatherInstance, Vec<String>>;

/// A structural or semantic problem found in a matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {reason}")]
pub struct MatrixError {
    /// Dotted location of the problem (`matrix.dawn.fog_clear`).
    pub path: String,
    /// What is wrong there.
    pub reason: String,
}

impl MatrixError {
    fn at(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Configured table mapping `(phase, instance)` to candidate wallpaper files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "IndexMap<Phase, Value>")]
pub struct Matrix {
    phases: IndexMap<Phase, PhaseEntries>,
}

impl Matrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and programmatic setups.
    #[must_use]
    pub fn with(mut self, phase: Phase, instance: WeatherInstance, files: &[&str]) -> Self {
        self.insert(
            phase,
            instance,
            files.iter().map(|f| (*f).to_owned()).collect(),
        );
        self
    }

    /// Insert (or replace) the candidate list for `(phase, instance)`.
    ///
    /// A phase inserted for the first time goes to the end of the phase
    /// order; an instance likewise within its phase.
    pub fn insert(&mut self, phase: Phase, instance: WeatherInstance, files: Vec<String>) {
        self.phases
            .entry(phase)
            .or_default()
            .insert(instance, files);
    }

    /// Ensure a phase exists, even with no instances.
    pub fn insert_phase(&mut self, phase: Phase) {
        self.phases.entry(phase).or_default();
    }

    /// Entries for a phase, in configuration order.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseEntries> {
        self.phases.get(&phase)
    }

    /// Candidate files for `(phase, instance)`, if configured and non-empty.
    pub fn files(&self, phase: Phase, instance: WeatherInstance) -> Option<&[String]> {
        self.phases
            .get(&phase)
            .and_then(|entries| entries.get(&instance))
            .map(Vec::as_slice)
            .filter(|files| !files.is_empty())
    }

    /// Whether `(phase, instance)` has at least one candidate file.
    pub fn contains(&self, phase: Phase, instance: WeatherInstance) -> bool {
        self.files(phase, instance).is_some()
    }

    /// Instances with at least one file for a phase, in configuration order.
    pub fn instances(&self, phase: Phase) -> Vec<WeatherInstance> {
        self.phases
            .get(&phase)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, files)| !files.is_empty())
                    .map(|(instance, _)| *instance)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Configured phases, in configuration order.
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.phases.keys().copied()
    }

    /// Iterate over every `(phase, instance, files)` entry.
    pub fn entries(&self) -> impl Iterator<Item = (Phase, WeatherInstance, &[String])> + '_ {
        self.phases.iter().flat_map(|(phase, entries)| {
            entries
                .iter()
                .map(move |(instance, files)| (*phase, *instance, files.as_slice()))
        })
    }

    /// Whether no phase is configured at all.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Check the semantic rules the typed parse cannot express.
    ///
    /// - every file list is non-empty and contains no blank paths;
    /// - `fog_clear`/`fog_cloudy` appear only under `dawn`.
    pub fn validate(&self) -> Result<(), MatrixError> {
        for (phase, instance, files) in self.entries() {
            let path = format!("matrix.{phase}.{instance}");
            if instance.is_fog() && phase != Phase::Dawn {
                return Err(MatrixError::at(path, "fog instances are only valid for dawn"));
            }
            if files.is_empty() {
                return Err(MatrixError::at(path, "file list must not be empty"));
            }
            if files.iter().any(|f| f.trim().is_empty()) {
                return Err(MatrixError::at(path, "file paths must not be blank"));
            }
        }
        Ok(())
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.phases.serialize(serializer)
    }
}

impl TryFrom<IndexMap<Phase, Value>> for Matrix {
    type Error = MatrixError;

    fn try_from(raw: IndexMap<Phase, Value>) -> Result<Self, Self::Error> {
        let mut matrix = Self::new();
        for (phase, value) in raw {
            match value {
                Value::String(file) => matrix.insert(phase, WeatherInstance::Clear, vec![file]),
                Value::Object(map) => {
                    matrix.insert_phase(phase);
                    for (key, files) in map {
                        let path = format!("matrix.{phase}.{key}");
                        let instance: WeatherInstance = key
                            .parse()
                            .map_err(|e| MatrixError::at(path.clone(), format!("{e}")))?;
                        matrix.insert(phase, instance, file_list(&path, files)?);
                    }
                }
                _ => {
                    return Err(MatrixError::at(
                        format!("matrix.{phase}"),
                        "expected a path string or an object of instances",
                    ));
                }
            }
        }
        Ok(matrix)
    }
}

fn file_list(path: &str, value: Value) -> Result<Vec<String>, MatrixError> {
    match value {
        Value::String(file) => Ok(vec![file]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(file) => Ok(file),
                _ => Err(MatrixError::at(path, "file list entries must be strings")),
            })
            .collect(),
        _ => Err(MatrixError::at(
            path,
            "expected a path string or an array of path strings",
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_shapes_and_keeps_order() {
        let json = r#"{
            "night": "backgrounds/night.jpg",
            "dawn": {
                "overcast": "backgrounds/dawn_overcast.jpg",
                "clear": ["backgrounds/dawn_a.jpg", "backgrounds/dawn_b.jpg"],
                "fog_clear": "backgrounds/dawn_fog.jpg"
            }
        }"#;
        let matrix: Matrix = serde_json::from_str(json).unwrap();

        assert_eq!(matrix.phases().collect::<Vec<_>>(), vec![Phase::Night, Phase::Dawn]);
        assert_eq!(
            matrix.files(Phase::Night, WeatherInstance::Clear).unwrap(),
            ["backgrounds/night.jpg"]
        );
        assert_eq!(
            matrix.instances(Phase::Dawn),
            vec![
                WeatherInstance::Overcast,
                WeatherInstance::Clear,
                WeatherInstance::FogClear
            ]
        );
        assert_eq!(matrix.files(Phase::Dawn, WeatherInstance::Clear).unwrap().len(), 2);
        assert!(matrix.validate().is_ok());
    }

    #[test]
    fn unknown_instance_is_reported_with_its_path() {
        let err = serde_json::from_str::<Matrix>(r#"{"dawn": {"fogg": "x.jpg"}}"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("matrix.dawn.fogg"), "{msg}");
    }

    #[test]
    fn unknown_phase_is_rejected() {
        assert!(serde_json::from_str::<Matrix>(r#"{"twilight": "x.jpg"}"#).is_err());
    }

    #[test]
    fn non_string_files_are_rejected() {
        let err = serde_json::from_str::<Matrix>(r#"{"day": {"clear": [1, 2]}}"#).unwrap_err();
        assert!(err.to_string().contains("matrix.day.clear"));
        assert!(serde_json::from_str::<Matrix>(r#"{"day": 5}"#).is_err());
    }

    #[test]
    fn fog_outside_dawn_fails_validation() {
        let matrix = Matrix::new().with(Phase::Night, WeatherInstance::FogClear, &["fog.jpg"]);
        let err = matrix.validate().unwrap_err();
        assert_eq!(err.path, "matrix.night.fog_clear");
        assert_eq!(
            err.to_string(),
            "matrix.night.fog_clear: fog instances are only valid for dawn"
        );
        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }

    #[test]
    fn empty_and_blank_lists_fail_validation() {
        let empty = Matrix::new().with(Phase::Day, WeatherInstance::Clear, &[]);
        assert!(empty.validate().is_err());
        let blank = Matrix::new().with(Phase::Day, WeatherInstance::Clear, &["  "]);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn empty_lists_are_not_candidates() {
        let matrix = Matrix::new()
            .with(Phase::Day, WeatherInstance::Rain, &[])
            .with(Phase::Day, WeatherInstance::Cloudy, &["c.jpg"]);
        assert!(!matrix.contains(Phase::Day, WeatherInstance::Rain));
        assert_eq!(matrix.instances(Phase::Day), vec![WeatherInstance::Cloudy]);
    }

    #[test]
    fn serializes_in_normalized_form() {
        let matrix: Matrix = serde_json::from_str(r#"{"night": "n.jpg"}"#).unwrap();
        let value = serde_json::to_value(&matrix).unwrap();
        assert_eq!(value, serde_json::json!({"night": {"clear": ["n.jpg"]}}));
    }
}
