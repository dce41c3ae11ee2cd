//! Yield estimator
//!
//! Pure computation: farm/soil attributes in, yield-per-hectare and a
//! confidence score out. The estimator never fails and never validates;
//! out-of-range inputs are used as-is (garbage in, garbage out). Input
//! validation is the recorder's job.

pub mod weather;

pub use weather::{FixedWeather, RandomWeather, WeatherProvider, WeatherSummary};

/// Result of a yield estimation
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Expected yield in tonnes per hectare, rounded to 2 decimals
    pub yield_per_hectare: f64,
    /// Confidence score, capped at 95. Not floored: poor soil factors can
    /// push this below the usual range, callers must not assume >= 0.
    pub confidence: i32,
}

/// Base yield factor (tonnes/ha) by crop type.
/// Unknown crops fall back to a conservative 3.0.
pub fn base_factor(crop: &str) -> f64 {
    match crop.trim().to_ascii_lowercase().as_str() {
        "maize" => 4.5,
        "wheat" => 3.2,
        "rice" => 5.8,
        "beans" => 2.1,
        "potato" | "potatoes" => 25.0,
        "tomato" => 45.0,
        _ => 3.0,
    }
}

/// Soil pH factor. Optimum is 6.5 (neutral, slightly acidic); each unit of
/// deviation costs 10%. Deliberately not clamped: extreme pH can drive the
/// factor negative.
fn ph_factor(soil_ph: f64) -> f64 {
    1.0 - (soil_ph - 6.5).abs() * 0.1
}

/// Soil moisture factor. 20-40% inclusive is the optimal band; there is no
/// gradation inside the band.
fn moisture_factor(soil_moisture: f64) -> f64 {
    if soil_moisture < 20.0 {
        0.7
    } else if soil_moisture > 40.0 {
        0.8
    } else {
        1.0
    }
}

/// Organic matter factor. 2-4% inclusive is rewarded above baseline.
fn organic_factor(organic_matter: f64) -> f64 {
    if organic_matter < 2.0 {
        0.8
    } else if organic_matter > 4.0 {
        0.9
    } else {
        1.1
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimate the expected yield for a crop given soil attributes.
pub fn estimate(crop: &str, soil_ph: f64, soil_moisture: f64, organic_matter: f64) -> Estimate {
    let base = base_factor(crop);
    let ph = ph_factor(soil_ph);
    let moisture = moisture_factor(soil_moisture);
    let organic = organic_factor(organic_matter);

    let yield_per_hectare = round2(base * ph * moisture * organic);
    let confidence = (70.0 + (ph + moisture + organic - 2.0) * 10.0).round() as i32;
    let confidence = confidence.min(95);

    Estimate {
        yield_per_hectare,
        confidence,
    }
}

/// Total yield for an area, using the same rounding as the per-hectare figure
pub fn total_yield(yield_per_hectare: f64, area_ha: f64) -> f64 {
    round2(yield_per_hectare * area_ha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_maize() {
        // ph 6.5, moisture 25, organic 3: all factors optimal
        let est = estimate("maize", 6.5, 25.0, 3.0);
        assert_eq!(est.yield_per_hectare, 4.95); // 4.5 * 1.0 * 1.0 * 1.1
        assert_eq!(est.confidence, 95); // capped
    }

    #[test]
    fn test_confidence_never_exceeds_cap() {
        for crop in ["maize", "wheat", "rice", "beans", "potato", "tomato", "barley"] {
            let est = estimate(crop, 6.5, 30.0, 3.0);
            assert!(est.confidence <= 95, "{} exceeded cap", crop);
        }
    }

    #[test]
    fn test_confidence_not_floored() {
        // pH 20 gives ph_factor = 1 - 13.5*0.1 = -0.35; poor moisture and
        // organic matter drag confidence well below the usual range.
        let est = estimate("maize", 20.0, 5.0, 0.5);
        assert!(est.confidence < 70);
    }

    #[test]
    fn test_extreme_ph_can_go_negative() {
        // Documented GIGO edge: ph_factor is not clamped
        let est = estimate("tomato", 20.0, 25.0, 3.0);
        assert!(est.yield_per_hectare < 0.0);
    }

    #[test]
    fn test_yield_non_negative_within_documented_ranges() {
        for ph in [5.0, 6.0, 6.5, 7.0, 8.0] {
            for moisture in [15.0, 20.0, 30.0, 40.0, 45.0] {
                for organic in [1.0, 2.0, 3.0, 4.0, 5.0] {
                    let est = estimate("wheat", ph, moisture, organic);
                    assert!(
                        est.yield_per_hectare >= 0.0,
                        "negative yield at ph={} moisture={} organic={}",
                        ph,
                        moisture,
                        organic
                    );
                }
            }
        }
    }

    #[test]
    fn test_unknown_crop_uses_default_factor() {
        assert_eq!(base_factor("barley"), 3.0);
        assert_eq!(base_factor("dragonfruit"), 3.0);
        assert_eq!(base_factor(""), 3.0);
    }

    #[test]
    fn test_crop_lookup_is_case_insensitive() {
        assert_eq!(base_factor("Maize"), 4.5);
        assert_eq!(base_factor("TOMATO"), 45.0);
        assert_eq!(base_factor("  potatoes "), 25.0);
    }

    #[test]
    fn test_moisture_band_is_inclusive() {
        // 20 and 40 are inside the optimal band
        assert_eq!(estimate("maize", 6.5, 20.0, 3.0).yield_per_hectare, 4.95);
        assert_eq!(estimate("maize", 6.5, 40.0, 3.0).yield_per_hectare, 4.95);
        // just outside
        assert_eq!(estimate("maize", 6.5, 19.9, 3.0).yield_per_hectare, round2(4.5 * 0.7 * 1.1));
        assert_eq!(estimate("maize", 6.5, 40.1, 3.0).yield_per_hectare, round2(4.5 * 0.8 * 1.1));
    }

    #[test]
    fn test_organic_band_is_inclusive() {
        assert_eq!(estimate("maize", 6.5, 25.0, 2.0).yield_per_hectare, 4.95);
        assert_eq!(estimate("maize", 6.5, 25.0, 4.0).yield_per_hectare, 4.95);
        assert_eq!(estimate("maize", 6.5, 25.0, 1.9).yield_per_hectare, round2(4.5 * 0.8));
        assert_eq!(estimate("maize", 6.5, 25.0, 4.1).yield_per_hectare, round2(4.5 * 0.9));
    }

    #[test]
    fn test_total_yield_rounding() {
        let est = estimate("maize", 6.5, 25.0, 3.0);
        assert_eq!(total_yield(est.yield_per_hectare, 2.5), round2(4.95 * 2.5));
        assert_eq!(total_yield(est.yield_per_hectare, 1.0), 4.95);
        // GIGO: negative area is used as-is, not validated here
        assert_eq!(total_yield(est.yield_per_hectare, -1.0), -4.95);
    }
}
