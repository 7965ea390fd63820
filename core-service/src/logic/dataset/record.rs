use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::logic::features::{DerivedFeatures, FeatureVector, RawFeatures, FEATURE_COUNT};
use crate::logic::scoring::{BinaryRiskLabel, RiskLabel, ScoredSample};

/// One dataset row: 22 features in layout order, then the three targets.
///
/// Flat on purpose so the CSV header is exactly the feature layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
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
    pub stability_index: f64,
    pub weather_risk_score: f64,
    pub operational_stress: f64,
    pub geological_weakness: f64,
    pub slope_steepness_factor: f64,
    pub risk_score: f64,
    pub risk_level: RiskLabel,
    pub rockfall_binary: BinaryRiskLabel,
}

impl DatasetRecord {
    pub fn from_parts(raw: &RawFeatures, derived: &DerivedFeatures, scored: &ScoredSample) -> Self {
        Self {
            slope_height_m: raw.slope_height_m,
            slope_angle_deg: raw.slope_angle_deg,
            cohesion_kpa: raw.cohesion_kpa,
            friction_angle_deg: raw.friction_angle_deg,
            unit_weight_kn_m3: raw.unit_weight_kn_m3,
            rqd_percent: raw.rqd_percent,
            joint_spacing_m: raw.joint_spacing_m,
            rainfall_mm: raw.rainfall_mm,
            temperature_range_c: raw.temperature_range_c,
            groundwater_depth_m: raw.groundwater_depth_m,
            freeze_thaw_cycles: raw.freeze_thaw_cycles,
            blasting_distance_m: raw.blasting_distance_m,
            vibration_intensity: raw.vibration_intensity,
            days_since_blast: raw.days_since_blast,
            mining_depth_m: raw.mining_depth_m,
            days_since_rain: raw.days_since_rain,
            season_encoded: raw.season_encoded,
            stability_index: derived.stability_index,
            weather_risk_score: derived.weather_risk_score,
            operational_stress: derived.operational_stress,
            geological_weakness: derived.geological_weakness,
            slope_steepness_factor: derived.slope_steepness_factor,
            risk_score: scored.risk_score,
            risk_level: scored.risk_level,
            rockfall_binary: scored.rockfall_binary,
        }
    }

    pub fn raw(&self) -> Result<RawFeatures> {
        let raw = RawFeatures {
            slope_height_m: self.slope_height_m,
            slope_angle_deg: self.slope_angle_deg,
            cohesion_kpa: self.cohesion_kpa,
            friction_angle_deg: self.friction_angle_deg,
            unit_weight_kn_m3: self.unit_weight_kn_m3,
            rqd_percent: self.rqd_percent,
            joint_spacing_m: self.joint_spacing_m,
            rainfall_mm: self.rainfall_mm,
            temperature_range_c: self.temperature_range_c,
            groundwater_depth_m: self.groundwater_depth_m,
            freeze_thaw_cycles: self.freeze_thaw_cycles,
            blasting_distance_m: self.blasting_distance_m,
            vibration_intensity: self.vibration_intensity,
            days_since_blast: self.days_since_blast,
            mining_depth_m: self.mining_depth_m,
            days_since_rain: self.days_since_rain,
            season_encoded: self.season_encoded,
        };
        raw.validate()?;
        Ok(raw)
    }

    /// Stored derived columns (not recomputed)
    pub fn derived(&self) -> DerivedFeatures {
        DerivedFeatures {
            stability_index: self.stability_index,
            weather_risk_score: self.weather_risk_score,
            operational_stress: self.operational_stress,
            geological_weakness: self.geological_weakness,
            slope_steepness_factor: self.slope_steepness_factor,
        }
    }

    pub fn feature_vector(&self) -> Result<FeatureVector> {
        Ok(FeatureVector::from_parts(&self.raw()?, &self.derived()))
    }

    pub fn features(&self) -> Result<[f64; FEATURE_COUNT]> {
        Ok(*self.feature_vector()?.as_array())
    }

    pub fn apply_labels(&mut self, scored: &ScoredSample) {
        self.risk_score = scored.risk_score;
        self.risk_level = scored.risk_level;
        self.rockfall_binary = scored.rockfall_binary;
    }
}
