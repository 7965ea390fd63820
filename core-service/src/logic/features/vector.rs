//! Feature Vector - Core data structure for ML input
//!
//! **Versioned feature vector with layout validation**
//!
//! Always RawFeatures (17) followed by DerivedFeatures (5). There is no setter:
//! a vector is built once from its parts and never mutated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::derived::{self, DerivedFeatures};
use super::layout::{
    layout_hash, validate_layout, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, RAW_FEATURE_COUNT,
};
use super::raw::{FieldPolicy, RawFeatures, Season};
use crate::error::Result;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
///
/// Every classifier input goes through this type. Never hand a classifier a
/// hand-assembled `Vec<f64>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Concatenate raw and derived blocks
    pub fn from_parts(raw: &RawFeatures, derived: &DerivedFeatures) -> Self {
        let mut values = [0.0f64; FEATURE_COUNT];
        values[..RAW_FEATURE_COUNT].copy_from_slice(&raw.to_values());
        values[RAW_FEATURE_COUNT..].copy_from_slice(&derived.to_values());

        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Compute derived features and assemble the vector
    pub fn from_raw(raw: &RawFeatures) -> Result<Self> {
        let derived = derived::compute(raw)?;
        Ok(Self::from_parts(raw, &derived))
    }

    /// Full inference path for a request payload
    pub fn from_payload(map: &Map<String, Value>, policy: FieldPolicy) -> Result<Self> {
        let raw = RawFeatures::from_map(map, policy)?;
        Self::from_raw(&raw)
    }

    /// Get values as array reference
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<()> {
        validate_layout(self.version, self.layout_hash)
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        let season = self
            .get_by_name("season_encoded")
            .and_then(|code| Season::from_code(code as u8))
            .map(|s| s.as_str());

        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "season": season,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{DERIVED_FEATURES, RAW_FEATURES};
    use serde_json::json;

    fn sample() -> FeatureVector {
        let payload = json!({
            "slope_height_m": 80, "slope_angle_deg": 65, "cohesion_kpa": 15,
            "friction_angle_deg": 30, "unit_weight_kn_m3": 25, "rqd_percent": 40,
            "joint_spacing_m": 0.8, "rainfall_mm": 25, "temperature_range_c": 20,
            "groundwater_depth_m": 10, "freeze_thaw_cycles": 20, "blasting_distance_m": 50,
            "vibration_intensity": 7, "days_since_blast": 2, "mining_depth_m": 60,
            "days_since_rain": 1, "season_encoded": 2
        });
        FeatureVector::from_payload(payload.as_object().unwrap(), FieldPolicy::Strict).unwrap()
    }

    #[test]
    fn test_vector_has_22_values_in_layout_order() {
        let vector = sample();
        assert_eq!(vector.len(), 22);
        assert_eq!(vector.get(0), Some(80.0));
        assert_eq!(vector.get_by_name("season_encoded"), Some(2.0));
        assert_eq!(vector.get_by_name("weather_risk_score"), Some(250.0));
        assert_eq!(vector.get(17), vector.get_by_name("stability_index"));
    }

    #[test]
    fn test_raw_and_derived_blocks() {
        let raw = RawFeatures::from_map(&Map::new(), FieldPolicy::WithDefaults).unwrap();
        let derived = derived::compute(&raw).unwrap();
        let vector = FeatureVector::from_parts(&raw, &derived);

        for (i, name) in RAW_FEATURES.iter().enumerate() {
            assert_eq!(vector.get_by_name(name), Some(raw.to_values()[i]));
        }
        for (i, name) in DERIVED_FEATURES.iter().enumerate() {
            assert_eq!(vector.get_by_name(name), Some(derived.to_values()[i]));
        }
    }

    #[test]
    fn test_feature_vector_validation() {
        let mut vector = sample();
        assert!(vector.validate().is_ok());
        vector.layout_hash = vector.layout_hash.wrapping_add(1);
        assert!(vector.validate().is_err());
    }

    #[test]
    fn test_to_log_entry() {
        let log = sample().to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["named_values"].as_object().unwrap().len(), FEATURE_COUNT);
        assert_eq!(log["season"], "Summer");
    }
}
