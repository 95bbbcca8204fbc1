//! End-to-end cycle tests for `wallcycle-core`.
//!
//! Each test builds a throwaway project directory (`config/`, `backgrounds/`,
//! `.cache/`) with `tempfile` and drives [`run_cycle`] against it with a
//! [`RecordingApplier`].

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;
use wallcycle_core::config::{self, WallpaperConfig};
use wallcycle_core::{
    ConfigError, CycleContext, CycleError, CycleOutcome, RecordingApplier, run_cycle,
};
use wallcycle_types::{CachedState, Phase, RawWeather, WeatherInstance};

const CONFIG: &str = r#"{
    "flags": {
        "mode": "weather_based",
        "cache_enabled": true,
        "use_random_selection": false,
        "log_details": true
    },
    "probabilities": { "fogChance": 1.0, "thunderChance": 0.0 },
    "matrix": {
        "night": "backgrounds/night.jpg",
        "dawn": {
            "clear": "backgrounds/dawn.jpg",
            "fog_clear": "backgrounds/dawn_fog_clear.jpg"
        },
        "day": {
            "clear": ["backgrounds/day.jpg"],
            "rain": ["backgrounds/day_rain_missing.jpg"]
        }
    }
}"#;

/// A project directory with the config and every referenced image except
/// `day_rain_missing.jpg`.
fn project(config_json: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.json"), config_json).unwrap();
    for name in ["night.jpg", "dawn.jpg", "dawn_fog_clear.jpg", "day.jpg"] {
        let path = dir.path().join("backgrounds").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"jpg").unwrap();
    }
    dir
}

fn load(root: &Path) -> CycleContext {
    let config_dir = root.join("config");
    let (config, source) = WallpaperConfig::load(&config_dir).unwrap();
    assert!(source.ends_with("config.json"));
    CycleContext::new(config, config::base_dir(&config_dir))
}

#[test]
fn first_cycle_applies_second_is_unchanged() {
    let dir = project(CONFIG);
    let ctx = load(dir.path());
    let mut applier = RecordingApplier::new();
    let clear = RawWeather::new("Clear");

    let first = run_cycle(
        &ctx,
        Phase::Dawn,
        Some(&clear),
        Some(&mut applier),
        &mut SmallRng::seed_from_u64(1),
    )
    .unwrap();
    let CycleOutcome::Applied { resolution, path } = &first else {
        panic!("expected an apply, got {first:?}");
    };
    assert_eq!(resolution.instance, WeatherInstance::FogClear);
    assert!(path.ends_with("backgrounds/dawn_fog_clear.jpg"));
    assert_eq!(applier.applied.len(), 1);

    let cached = ctx.store().lock().unwrap().load().unwrap();
    assert_eq!(
        cached,
        Some(CachedState::new(
            Phase::Dawn,
            WeatherInstance::FogClear,
            "backgrounds/dawn_fog_clear.jpg"
        ))
    );

    let second = run_cycle(
        &ctx,
        Phase::Dawn,
        Some(&clear),
        Some(&mut applier),
        &mut SmallRng::seed_from_u64(1),
    )
    .unwrap();
    assert_eq!(second.label(), "unchanged");
    assert_eq!(applier.applied.len(), 1);
}

#[test]
fn phase_change_reapplies() {
    let dir = project(CONFIG);
    let ctx = load(dir.path());
    let mut applier = RecordingApplier::new();
    let mut rng = SmallRng::seed_from_u64(1);

    run_cycle(&ctx, Phase::Night, None, Some(&mut applier), &mut rng).unwrap();
    let outcome = run_cycle(&ctx, Phase::Day, None, Some(&mut applier), &mut rng).unwrap();
    assert_eq!(outcome.label(), "applied");
    assert_eq!(applier.applied.len(), 2);
}

#[test]
fn cache_disabled_always_applies() {
    let dir = project(&CONFIG.replace(r#""cache_enabled": true"#, r#""cache_enabled": false"#));
    let ctx = load(dir.path());
    let mut applier = RecordingApplier::new();
    let mut rng = SmallRng::seed_from_u64(1);

    for _ in 0..3 {
        let outcome = run_cycle(&ctx, Phase::Night, None, Some(&mut applier), &mut rng).unwrap();
        assert_eq!(outcome.label(), "applied");
    }
    assert_eq!(applier.applied.len(), 3);
    assert!(ctx.store().path().exists());
}

#[test]
fn missing_file_is_skipped_without_touching_the_cache() {
    let dir = project(CONFIG);
    let ctx = load(dir.path());
    let mut applier = RecordingApplier::new();
    let rain = RawWeather::new("Rain").with_code(500);

    let outcome = run_cycle(
        &ctx,
        Phase::Day,
        Some(&rain),
        Some(&mut applier),
        &mut SmallRng::seed_from_u64(1),
    )
    .unwrap();
    let CycleOutcome::MissingFile { resolution, .. } = &outcome else {
        panic!("expected a missing file, got {outcome:?}");
    };
    assert_eq!(resolution.file, "backgrounds/day_rain_missing.jpg");
    assert!(applier.applied.is_empty());
    assert!(!ctx.store().path().exists());
}

#[test]
fn failed_apply_keeps_the_previous_state() {
    let dir = project(CONFIG);
    let ctx = load(dir.path());
    let mut rng = SmallRng::seed_from_u64(1);

    let mut ok = RecordingApplier::new();
    run_cycle(&ctx, Phase::Night, None, Some(&mut ok), &mut rng).unwrap();

    let mut failing = RecordingApplier {
        reject_with: Some("channel unavailable".to_owned()),
        ..RecordingApplier::new()
    };
    let err = run_cycle(&ctx, Phase::Day, None, Some(&mut failing), &mut rng).unwrap_err();
    assert!(matches!(err, CycleError::Apply { .. }));

    let cached = ctx.store().lock().unwrap().load().unwrap().unwrap();
    assert_eq!(cached.phase, Phase::Night);
}

#[test]
fn applied_cycles_update_statistics() {
    let dir = project(CONFIG);
    let ctx = load(dir.path());
    let mut applier = RecordingApplier::new();
    let mut rng = SmallRng::seed_from_u64(1);
    let clear = RawWeather::new("Clear");

    run_cycle(&ctx, Phase::Dawn, Some(&clear), Some(&mut applier), &mut rng).unwrap();
    run_cycle(&ctx, Phase::Day, Some(&clear), Some(&mut applier), &mut rng).unwrap();

    let stats = ctx.stats().unwrap().load().unwrap();
    assert_eq!(stats.fog, 1);
    assert_eq!(stats.clear, 1);
    assert!(dir.path().join(".cache/weather_stats.json").exists());
}

#[test]
fn statistics_count_the_weather_not_the_fallback() {
    let dir = project(
        r#"{
            "flags": { "mode": "weather_based", "use_random_selection": false },
            "matrix": { "day": "backgrounds/day.jpg" }
        }"#,
    );
    let ctx = load(dir.path());
    let mut applier = RecordingApplier::new();
    let rain = RawWeather::new("Rain").with_code(500);

    let outcome = run_cycle(
        &ctx,
        Phase::Day,
        Some(&rain),
        Some(&mut applier),
        &mut SmallRng::seed_from_u64(1),
    )
    .unwrap();
    let CycleOutcome::Applied { resolution, .. } = &outcome else {
        panic!("expected an apply, got {outcome:?}");
    };
    assert_eq!(resolution.requested, WeatherInstance::Rain);
    assert_eq!(resolution.instance, WeatherInstance::Clear);
    assert!(!resolution.matched);

    let stats = ctx.stats().unwrap().load().unwrap();
    assert_eq!(stats.rain, 1);
    assert_eq!(stats.clear, 0);
}

#[test]
fn legacy_file_is_used_when_config_json_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("wallpapers.json"),
        r#"{"matrix": {"day": "backgrounds/day.jpg"}}"#,
    )
    .unwrap();

    let (config, source) = WallpaperConfig::load(&config_dir).unwrap();
    assert!(source.ends_with("wallpapers.json"));
    assert!(config.matrix.contains(Phase::Day, WeatherInstance::Clear));
}

#[test]
fn no_config_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = WallpaperConfig::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}
