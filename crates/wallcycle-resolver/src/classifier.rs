//! Weather classification: raw provider reading -> weather instance.
//!
//! Rules are checked top to bottom, first match wins. A rule matches on the
//! category keyword (case-insensitive) or on the numeric condition code:
//!
//! | Category / code                  | Result                                   |
//! |----------------------------------|------------------------------------------|
//! | `thunderstorm`, 2xx              | `heavy_rain`                             |
//! | `blizzard`                       | `heavy_rain`                             |
//! | `drizzle`                        | `rain`                                   |
//! | `rain`, 5xx                      | `heavy_rain` for 502-504/522/531, else `rain` |
//! | `snow`, 6xx                      | `heavy_rain` for 602/622, else `rain`    |
//! | `mist`/`fog`/`haze`, 7xx         | fog (degraded by cloud cover)            |
//! | `clear`, 800                     | `clear`                                  |
//! | `clouds`, 801-809                | by cloud cover                           |
//! | anything else                    | `clear`                                  |
//!
//! Fog never reaches the matrix directly. The observed fog signal is
//! dropped and the instance is re-derived from cloud cover; dawn fog
//! instances come only from the probability modifier.

use wallcycle_types::{RawWeather, WeatherInstance};

/// Cloud cover (percent) at or above which the sky counts as overcast.
pub const OVERCAST_THRESHOLD: u8 = 85;

/// Cloud cover (percent) at or above which the sky counts as cloudy.
pub const CLOUDY_THRESHOLD: u8 = 40;

/// Rain codes treated as heavy rain.
const HEAVY_RAIN_CODES: [u16; 5] = [502, 503, 504, 522, 531];

/// Snow codes treated as heavy rain.
const HEAVY_SNOW_CODES: [u16; 2] = [602, 622];

/// Result of the rule table before fog degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// A concrete instance.
    Instance(WeatherInstance),
    /// Mist, fog or haze was reported.
    Fog,
}

/// Run the rule table, keeping the fog marker.
pub fn categorize(raw: &RawWeather) -> Condition {
    let category = raw.category.trim().to_ascii_lowercase();
    let category = category.as_str();
    let code_in = |lo: u16, hi: u16| raw.code.is_some_and(|c| (lo..=hi).contains(&c));
    let code_is = |codes: &[u16]| raw.code.is_some_and(|c| codes.contains(&c));

    let instance = if category == "thunderstorm" || code_in(200, 299) || category == "blizzard" {
        WeatherInstance::HeavyRain
    } else if category == "drizzle" {
        WeatherInstance::Rain
    } else if category == "rain" || code_in(500, 599) {
        if code_is(&HEAVY_RAIN_CODES) {
            WeatherInstance::HeavyRain
        } else {
            WeatherInstance::Rain
        }
    } else if category == "snow" || code_in(600, 699) {
        if code_is(&HEAVY_SNOW_CODES) {
            WeatherInstance::HeavyRain
        } else {
            WeatherInstance::Rain
        }
    } else if matches!(category, "mist" | "fog" | "haze") || code_in(700, 799) {
        return Condition::Fog;
    } else if category == "clear" || raw.code == Some(800) {
        WeatherInstance::Clear
    } else if category == "clouds" || code_in(801, 809) {
        from_cloud_cover(raw.cloud_pct)
    } else {
        WeatherInstance::Clear
    };
    Condition::Instance(instance)
}

/// Classify a raw reading into a weather instance.
///
/// Never returns `fog_clear` or `fog_cloudy`.
pub fn classify(raw: &RawWeather) -> WeatherInstance {
    match categorize(raw) {
        Condition::Instance(instance) => instance,
        Condition::Fog => from_cloud_cover(raw.cloud_pct),
    }
}

/// The clouds rule. Unknown cover counts as a clear sky.
pub fn from_cloud_cover(cloud_pct: Option<u8>) -> WeatherInstance {
    match cloud_pct {
        Some(pct) if pct >= OVERCAST_THRESHOLD => WeatherInstance::Overcast,
        Some(pct) if pct >= CLOUDY_THRESHOLD => WeatherInstance::Cloudy,
        _ => WeatherInstance::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavy_rain_codes() {
        assert_eq!(
            classify(&RawWeather::new("Rain").with_code(503)),
            WeatherInstance::HeavyRain
        );
        assert_eq!(
            classify(&RawWeather::new("Rain").with_code(500)),
            WeatherInstance::Rain
        );
        assert_eq!(classify(&RawWeather::new("rain")), WeatherInstance::Rain);
        assert_eq!(
            classify(&RawWeather::default().with_code(531)),
            WeatherInstance::HeavyRain
        );
    }

    #[test]
    fn thunderstorm_is_heavy_rain_before_modifiers() {
        assert_eq!(
            classify(&RawWeather::new("Thunderstorm")),
            WeatherInstance::HeavyRain
        );
        assert_eq!(
            classify(&RawWeather::default().with_code(211)),
            WeatherInstance::HeavyRain
        );
    }

    #[test]
    fn snow_aliases_to_rain_buckets() {
        assert_eq!(classify(&RawWeather::new("Snow")), WeatherInstance::Rain);
        assert_eq!(
            classify(&RawWeather::new("Snow").with_code(602)),
            WeatherInstance::HeavyRain
        );
        assert_eq!(
            classify(&RawWeather::default().with_code(622)),
            WeatherInstance::HeavyRain
        );
        assert_eq!(classify(&RawWeather::new("Blizzard")), WeatherInstance::HeavyRain);
    }

    #[test]
    fn drizzle_is_rain() {
        assert_eq!(classify(&RawWeather::new("Drizzle")), WeatherInstance::Rain);
    }

    #[test]
    fn clouds_follow_cover_thresholds() {
        let clouds = |pct| classify(&RawWeather::new("Clouds").with_clouds(pct));
        assert_eq!(clouds(90), WeatherInstance::Overcast);
        assert_eq!(clouds(85), WeatherInstance::Overcast);
        assert_eq!(clouds(50), WeatherInstance::Cloudy);
        assert_eq!(clouds(40), WeatherInstance::Cloudy);
        assert_eq!(clouds(39), WeatherInstance::Clear);
        assert_eq!(classify(&RawWeather::new("Clouds")), WeatherInstance::Clear);
        assert_eq!(
            classify(&RawWeather::default().with_code(804).with_clouds(100)),
            WeatherInstance::Overcast
        );
    }

    #[test]
    fn clear_and_unknown_default_to_clear() {
        assert_eq!(classify(&RawWeather::new("Clear")), WeatherInstance::Clear);
        assert_eq!(classify(&RawWeather::default().with_code(800)), WeatherInstance::Clear);
        assert_eq!(classify(&RawWeather::new("Tornado")), WeatherInstance::Clear);
        assert_eq!(classify(&RawWeather::default()), WeatherInstance::Clear);
    }

    #[test]
    fn fog_is_marked_then_degraded_by_cover() {
        for category in ["Mist", "Fog", "Haze"] {
            assert_eq!(categorize(&RawWeather::new(category)), Condition::Fog);
        }
        assert_eq!(categorize(&RawWeather::default().with_code(741)), Condition::Fog);

        assert_eq!(classify(&RawWeather::new("Mist")), WeatherInstance::Clear);
        assert_eq!(
            classify(&RawWeather::new("Fog").with_clouds(60)),
            WeatherInstance::Cloudy
        );
        assert_eq!(
            classify(&RawWeather::new("Haze").with_code(721).with_clouds(95)),
            WeatherInstance::Overcast
        );
    }

    #[test]
    fn classify_never_yields_fog_instances() {
        for code in 200_u16..=900 {
            for pct in [0_u8, 50, 100] {
                let instance = classify(&RawWeather::default().with_code(code).with_clouds(pct));
                assert!(!instance.is_fog(), "code {code} produced {instance}");
                assert_ne!(instance, WeatherInstance::Thunderstorm);
            }
        }
    }

    #[test]
    fn category_match_wins_over_code() {
        // Category "thunderstorm" is checked before the rain codes.
        assert_eq!(
            classify(&RawWeather::new("Thunderstorm").with_code(500)),
            WeatherInstance::HeavyRain
        );
        // Category "clear" with a cloudy code still matches the clear rule first.
        assert_eq!(
            classify(&RawWeather::new("Clear").with_code(803).with_clouds(90)),
            WeatherInstance::Clear
        );
    }
}
