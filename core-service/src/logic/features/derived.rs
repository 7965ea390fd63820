//! Derived Feature Calculator
//!
//! Pure mapping RawFeatures → 5 engineered scalars. Used unchanged by dataset
//! generation, training and inference.
//!
//! Degenerate geometry (flat slope, vertical slope, friction angle of 90°,
//! zero joint spacing, blasting distance of -1) raises `UndefinedComputation` instead of leaking
//! an infinity into a classifier.

use serde::{Deserialize, Serialize};

use super::layout::DERIVED_FEATURE_COUNT;
use super::raw::RawFeatures;
use crate::error::{Result, RockfallError};

/// Guard for trigonometric zero tests
const TRIG_EPSILON: f64 = 1e-12;

/// Days after which a blast no longer contributes stress
const BLAST_DECAY_DAYS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub stability_index: f64,
    pub weather_risk_score: f64,
    pub operational_stress: f64,
    pub geological_weakness: f64,
    pub slope_steepness_factor: f64,
}

impl DerivedFeatures {
    /// Values in layout order
    pub fn to_values(&self) -> [f64; DERIVED_FEATURE_COUNT] {
        [
            self.stability_index,
            self.weather_risk_score,
            self.operational_stress,
            self.geological_weakness,
            self.slope_steepness_factor,
        ]
    }
}

/// Compute all derived features
pub fn compute(raw: &RawFeatures) -> Result<DerivedFeatures> {
    Ok(DerivedFeatures {
        stability_index: stability_index(raw)?,
        weather_risk_score: weather_risk_score(raw)?,
        operational_stress: operational_stress(raw)?,
        geological_weakness: geological_weakness(raw)?,
        slope_steepness_factor: slope_steepness_factor(raw)?,
    })
}

/// Resisting over driving force
pub fn stability_index(raw: &RawFeatures) -> Result<f64> {
    let weight_height = raw.unit_weight_kn_m3 * raw.slope_height_m;
    let sin_slope = raw.slope_angle_deg.to_radians().sin();

    if weight_height.abs() < TRIG_EPSILON {
        return Err(RockfallError::undefined("stability_index", "unit_weight * slope_height is zero"));
    }
    if sin_slope.abs() < TRIG_EPSILON {
        return Err(RockfallError::undefined(
            "stability_index",
            format!("sin({}°) is zero (flat slope)", raw.slope_angle_deg),
        ));
    }

    let friction = raw.friction_angle_deg.to_radians();
    if friction.cos().abs() < TRIG_EPSILON {
        return Err(RockfallError::undefined(
            "stability_index",
            format!("tan({}°) is undefined (friction angle)", raw.friction_angle_deg),
        ));
    }

    let resisting = raw.cohesion_kpa + weight_height * friction.tan();
    checked("stability_index", resisting / (weight_height * sin_slope))
}

pub fn weather_risk_score(raw: &RawFeatures) -> Result<f64> {
    let score = (raw.rainfall_mm * raw.temperature_range_c) / (raw.days_since_rain as f64 + 1.0);
    checked("weather_risk_score", score)
}

/// Vibration attenuated by distance and decayed over 60 days; older blasts add nothing
pub fn operational_stress(raw: &RawFeatures) -> Result<f64> {
    let distance = raw.blasting_distance_m + 1.0;
    if distance.abs() < TRIG_EPSILON {
        return Err(RockfallError::undefined("operational_stress", "blasting_distance is -1"));
    }

    let decay = (BLAST_DECAY_DAYS - raw.days_since_blast as f64).max(0.0) / BLAST_DECAY_DAYS;
    checked("operational_stress", raw.vibration_intensity / distance * decay)
}

pub fn geological_weakness(raw: &RawFeatures) -> Result<f64> {
    if raw.joint_spacing_m.abs() < TRIG_EPSILON {
        return Err(RockfallError::undefined("geological_weakness", "joint_spacing is zero"));
    }
    checked("geological_weakness", (100.0 - raw.rqd_percent) / raw.joint_spacing_m)
}

pub fn slope_steepness_factor(raw: &RawFeatures) -> Result<f64> {
    let angle = raw.slope_angle_deg.to_radians();
    if angle.cos().abs() < TRIG_EPSILON {
        return Err(RockfallError::undefined(
            "slope_steepness_factor",
            format!("tan({}°) is undefined (vertical slope)", raw.slope_angle_deg),
        ));
    }
    checked("slope_steepness_factor", angle.tan() * raw.slope_height_m)
}

fn checked(feature: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RockfallError::undefined(feature, format!("result is {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::raw::FieldPolicy;
    use serde_json::{json, Map};

    fn raw_from(value: serde_json::Value) -> RawFeatures {
        RawFeatures::from_map(value.as_object().unwrap(), FieldPolicy::WithDefaults).unwrap()
    }

    #[test]
    fn test_steepness_at_45_degrees() {
        let raw = raw_from(json!({
            "slope_angle_deg": 45, "slope_height_m": 80, "cohesion_kpa": 15,
            "friction_angle_deg": 30, "unit_weight_kn_m3": 25
        }));
        let steepness = slope_steepness_factor(&raw).unwrap();
        assert!((steepness - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_weather_risk_score() {
        let raw = raw_from(json!({"rainfall_mm": 25, "temperature_range_c": 20, "days_since_rain": 1}));
        assert_eq!(weather_risk_score(&raw).unwrap(), 250.0);
    }

    #[test]
    fn test_stability_index_formula() {
        let raw = raw_from(json!({
            "slope_angle_deg": 30, "slope_height_m": 10, "cohesion_kpa": 0,
            "friction_angle_deg": 30, "unit_weight_kn_m3": 20
        }));
        // tan(30°) / sin(30°) = 1 / cos(30°)
        let expected = 1.0 / 30f64.to_radians().cos();
        assert!((stability_index(&raw).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_geological_weakness_and_stress() {
        let raw = raw_from(json!({
            "rqd_percent": 40, "joint_spacing_m": 0.8,
            "vibration_intensity": 7, "blasting_distance_m": 50, "days_since_blast": 2
        }));
        assert!((geological_weakness(&raw).unwrap() - 75.0).abs() < 1e-12);
        let expected = 7.0 / 51.0 * (58.0 / 60.0);
        assert!((operational_stress(&raw).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        let a = compute(&raw).unwrap();
        let b = compute(&raw).unwrap();
        for (x, y) in a.to_values().iter().zip(b.to_values().iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_flat_slope_is_undefined() {
        let mut raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        raw.slope_angle_deg = 0.0;
        let err = compute(&raw).unwrap_err();
        assert!(matches!(err, RockfallError::UndefinedComputation { feature: "stability_index", .. }));
    }

    #[test]
    fn test_vertical_slope_is_undefined() {
        let mut raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        raw.slope_angle_deg = 90.0;
        assert!(matches!(
            slope_steepness_factor(&raw),
            Err(RockfallError::UndefinedComputation { feature: "slope_steepness_factor", .. })
        ));
    }

    #[test]
    fn test_zero_joint_spacing_and_negative_distance() {
        let mut raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        raw.joint_spacing_m = 0.0;
        assert!(geological_weakness(&raw).is_err());

        raw.joint_spacing_m = 1.0;
        raw.blasting_distance_m = -1.0;
        assert!(operational_stress(&raw).is_err());
    }

    #[test]
    fn test_stress_monotonic_in_vibration() {
        let mut raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        for days in [0u32, 7, 30, 60, 90, 365] {
            raw.days_since_blast = days;
            let mut previous = f64::NEG_INFINITY;
            for step in 0..=30 {
                raw.vibration_intensity = step as f64 * 0.5;
                let stress = operational_stress(&raw).unwrap();
                assert!(stress >= previous);
                previous = stress;
            }
        }
    }

    #[test]
    fn test_old_blast_adds_no_stress() {
        let raw = raw_from(json!({"days_since_blast": 90, "vibration_intensity": 5}));
        assert_eq!(operational_stress(&raw).unwrap(), 0.0);

        let low = raw_from(json!({"days_since_blast": 90, "vibration_intensity": 1}));
        assert!(operational_stress(&raw).unwrap() >= operational_stress(&low).unwrap());
    }

    #[test]
    fn test_vertical_friction_angle_is_undefined() {
        let raw = raw_from(json!({"friction_angle_deg": 90}));
        assert!(matches!(
            stability_index(&raw),
            Err(RockfallError::UndefinedComputation { feature: "stability_index", .. })
        ));
        assert!(compute(&raw).is_err());
    }
}
