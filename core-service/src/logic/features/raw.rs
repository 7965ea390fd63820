//! Raw Features - the 17 sensor / survey inputs
//!
//! Built from generated samples or from an inference payload (a JSON object of
//! field name → number). Partial payloads are a normal case for field sensors,
//! so `FieldPolicy::WithDefaults` fills gaps from a fixed table. The defaulted
//! value is used everywhere downstream, for the raw slot and the derived formulas.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::layout::{RAW_FEATURES, RAW_FEATURE_COUNT};
use crate::error::{Result, RockfallError};

// ============================================================================
// DEFAULTS
// ============================================================================

/// Fallback values for fields absent from a payload
pub const FIELD_DEFAULTS: &[(&str, f64)] = &[
    ("slope_height_m", 50.0),
    ("slope_angle_deg", 45.0),
    ("cohesion_kpa", 30.0),
    ("friction_angle_deg", 35.0),
    ("unit_weight_kn_m3", 24.0),
    ("rqd_percent", 60.0),
    ("joint_spacing_m", 1.5),
    ("rainfall_mm", 10.0),
    ("temperature_range_c", 15.0),
    ("blasting_distance_m", 100.0),
    ("vibration_intensity", 3.0),
    ("days_since_blast", 7.0),
    ("days_since_rain", 5.0),
];

/// Default for a field; fields without an observed default fall back to 0
pub fn default_value(name: &str) -> f64 {
    FIELD_DEFAULTS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, value)| *value)
        .unwrap_or(0.0)
}

/// How to treat fields missing from a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPolicy {
    /// Every raw field must be present
    Strict,
    /// Missing fields take the value from `FIELD_DEFAULTS`
    WithDefaults,
}

// ============================================================================
// SEASON
// ============================================================================

/// Season codes follow the sorted-name encoding used for the training data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Spring,
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Fall, Season::Spring, Season::Summer, Season::Winter];

    pub fn code(&self) -> u8 {
        match self {
            Season::Fall => 0,
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Winter => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }
}

// ============================================================================
// RAW FEATURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    pub slope_height_m: f64,
    pub slope_angle_deg: f64,
    pub cohesion_kpa: f64,
    pub friction_angle_deg: f64,
    pub unit_weight_kn_m3: f64,
    pub rqd_percent: f64,
    pub joint_spacing_m: f64,
    pub rainfall_mm: f64,
    pub temperature_range_c: f64,
    pub groundwater_depth_m: f64,
    pub freeze_thaw_cycles: u32,
    pub blasting_distance_m: f64,
    pub vibration_intensity: f64,
    pub days_since_blast: u32,
    pub mining_depth_m: f64,
    pub days_since_rain: u32,
    pub season_encoded: u8,
}

impl RawFeatures {
    /// Build from a payload map
    pub fn from_map(map: &Map<String, Value>, policy: FieldPolicy) -> Result<Self> {
        let mut values = [0.0f64; RAW_FEATURE_COUNT];

        for (slot, name) in values.iter_mut().zip(RAW_FEATURES) {
            *slot = match map.get(*name) {
                Some(value) => value
                    .as_f64()
                    .ok_or_else(|| RockfallError::invalid(*name, format!("expected a number, got {}", value)))?,
                None => match policy {
                    FieldPolicy::Strict => return Err(RockfallError::MissingField(name.to_string())),
                    FieldPolicy::WithDefaults => default_value(name),
                },
            };
        }

        Self::from_values(values)
    }

    /// Build from values in layout order, validating every domain
    pub fn from_values(values: [f64; RAW_FEATURE_COUNT]) -> Result<Self> {
        let raw = Self {
            slope_height_m: values[0],
            slope_angle_deg: values[1],
            cohesion_kpa: values[2],
            friction_angle_deg: values[3],
            unit_weight_kn_m3: values[4],
            rqd_percent: values[5],
            joint_spacing_m: values[6],
            rainfall_mm: values[7],
            temperature_range_c: values[8],
            groundwater_depth_m: values[9],
            freeze_thaw_cycles: count_field("freeze_thaw_cycles", values[10])?,
            blasting_distance_m: values[11],
            vibration_intensity: values[12],
            days_since_blast: count_field("days_since_blast", values[13])?,
            mining_depth_m: values[14],
            days_since_rain: count_field("days_since_rain", values[15])?,
            season_encoded: season_field(values[16])?,
        };

        raw.validate()?;
        Ok(raw)
    }

    /// Values in layout order
    pub fn to_values(&self) -> [f64; RAW_FEATURE_COUNT] {
        [
            self.slope_height_m,
            self.slope_angle_deg,
            self.cohesion_kpa,
            self.friction_angle_deg,
            self.unit_weight_kn_m3,
            self.rqd_percent,
            self.joint_spacing_m,
            self.rainfall_mm,
            self.temperature_range_c,
            self.groundwater_depth_m,
            self.freeze_thaw_cycles as f64,
            self.blasting_distance_m,
            self.vibration_intensity,
            self.days_since_blast as f64,
            self.mining_depth_m,
            self.days_since_rain as f64,
            self.season_encoded as f64,
        ]
    }

    pub fn season(&self) -> Option<Season> {
        Season::from_code(self.season_encoded)
    }

    /// Check physical domains of the continuous fields
    pub fn validate(&self) -> Result<()> {
        positive("slope_height_m", self.slope_height_m)?;
        within("slope_angle_deg", self.slope_angle_deg, 0.0, 90.0)?;
        non_negative("cohesion_kpa", self.cohesion_kpa)?;
        within("friction_angle_deg", self.friction_angle_deg, 0.0, 90.0)?;
        positive("unit_weight_kn_m3", self.unit_weight_kn_m3)?;
        within("rqd_percent", self.rqd_percent, 0.0, 100.0)?;
        positive("joint_spacing_m", self.joint_spacing_m)?;
        non_negative("rainfall_mm", self.rainfall_mm)?;
        non_negative("temperature_range_c", self.temperature_range_c)?;
        non_negative("groundwater_depth_m", self.groundwater_depth_m)?;
        non_negative("blasting_distance_m", self.blasting_distance_m)?;
        non_negative("vibration_intensity", self.vibration_intensity)?;
        non_negative("mining_depth_m", self.mining_depth_m)?;

        if self.season().is_none() {
            return Err(RockfallError::invalid("season_encoded", "must be in {0,1,2,3}"));
        }

        Ok(())
    }
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RockfallError::invalid(field, "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if finite(field, value)? > 0.0 {
        Ok(())
    } else {
        Err(RockfallError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if finite(field, value)? >= 0.0 {
        Ok(())
    } else {
        Err(RockfallError::invalid(field, format!("must be >= 0, got {}", value)))
    }
}

fn within(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    let value = finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RockfallError::invalid(field, format!("must be in [{}, {}], got {}", min, max, value)))
    }
}

fn count_field(field: &str, value: f64) -> Result<u32> {
    let value = finite(field, value)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(RockfallError::invalid(field, format!("must be a non-negative integer, got {}", value)));
    }
    Ok(value as u32)
}

fn season_field(value: f64) -> Result<u8> {
    let code = count_field("season_encoded", value)?;
    u8::try_from(code)
        .ok()
        .and_then(Season::from_code)
        .map(|season| season.code())
        .ok_or_else(|| RockfallError::invalid("season_encoded", format!("must be in {{0,1,2,3}}, got {}", code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_payload_uses_defaults() {
        let raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        assert_eq!(raw.cohesion_kpa, 30.0);
        assert_eq!(raw.unit_weight_kn_m3, 24.0);
        assert_eq!(raw.slope_height_m, 50.0);
        assert_eq!(raw.slope_angle_deg, 45.0);
        assert_eq!(raw.joint_spacing_m, 1.5);
        assert_eq!(raw.days_since_blast, 7);
        assert_eq!(raw.days_since_rain, 5);
        assert_eq!(raw.groundwater_depth_m, 0.0);
        assert_eq!(raw.season_encoded, 0);
    }

    #[test]
    fn test_strict_policy_reports_missing_field() {
        let err = RawFeatures::from_map(&payload(json!({"slope_height_m": 80})), FieldPolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, RockfallError::MissingField(ref f) if f == "slope_angle_deg"));
    }

    #[test]
    fn test_non_numeric_value_is_invalid() {
        let err = RawFeatures::from_map(
            &payload(json!({"rainfall_mm": "heavy"})),
            FieldPolicy::WithDefaults,
        )
        .unwrap_err();
        assert!(matches!(err, RockfallError::InvalidInput { ref field, .. } if field == "rainfall_mm"));
    }

    #[test]
    fn test_out_of_domain_values_are_invalid() {
        for bad in [
            json!({"slope_angle_deg": 95.0}),
            json!({"rqd_percent": -1.0}),
            json!({"joint_spacing_m": 0.0}),
            json!({"season_encoded": 4}),
            json!({"days_since_rain": 2.5}),
        ] {
            let result = RawFeatures::from_map(&payload(bad.clone()), FieldPolicy::WithDefaults);
            assert!(result.is_err(), "expected rejection for {}", bad);
        }
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let raw = RawFeatures::from_map(
            &payload(json!({"timestamp": "2024-01-01T00:00:00", "mine_id": "MINE_001", "rainfall_mm": 25})),
            FieldPolicy::WithDefaults,
        )
        .unwrap();
        assert_eq!(raw.rainfall_mm, 25.0);
    }

    #[test]
    fn test_values_roundtrip_in_layout_order() {
        let raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        let values = raw.to_values();
        assert_eq!(values[0], raw.slope_height_m);
        assert_eq!(values[16], raw.season_encoded as f64);
        assert_eq!(RawFeatures::from_values(values).unwrap(), raw);
    }

    #[test]
    fn test_season_codes_sorted_by_name() {
        let mut names: Vec<&str> = Season::ALL.iter().map(|s| s.as_str()).collect();
        names.sort();
        for (code, name) in names.iter().enumerate() {
            assert_eq!(Season::from_code(code as u8).unwrap().as_str(), *name);
        }
    }
}
