//! Sampling Profiles
//!
//! Distribution shape for every raw field, per call site. Dataset construction
//! and live simulation deliberately differ (freeze-thaw is Poisson in one and
//! uniform in the other); keep them as separate profiles, do not merge.

use serde::{Deserialize, Serialize};

/// Continuous uniform range `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

const fn range(min: f64, max: f64) -> Range {
    Range { min, max }
}

/// Distribution for integer count fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountDistribution {
    Poisson { mean: f64 },
    /// Inclusive on both ends
    Uniform { min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingProfile {
    pub name: String,
    pub slope_height_m: Range,
    pub slope_angle_deg: Range,
    pub cohesion_kpa: Range,
    pub friction_angle_deg: Range,
    pub unit_weight_kn_m3: Range,
    pub rqd_percent: Range,
    pub joint_spacing_m: Range,
    /// Mean of the exponential rainfall distribution (1 / rate)
    pub rainfall_mean_mm: f64,
    pub temperature_range_c: Range,
    pub groundwater_depth_m: Range,
    pub freeze_thaw_cycles: CountDistribution,
    pub blasting_distance_m: Range,
    pub vibration_intensity: Range,
    pub days_since_blast: CountDistribution,
    pub mining_depth_m: Range,
    pub days_since_rain: CountDistribution,
    /// Round continuous readings like a sensor payload
    pub round_readings: bool,
}

impl SamplingProfile {
    /// Ground-truth dataset construction
    pub fn dataset() -> Self {
        Self {
            name: "dataset".to_string(),
            slope_height_m: range(10.0, 200.0),
            slope_angle_deg: range(30.0, 85.0),
            cohesion_kpa: range(0.0, 100.0),
            friction_angle_deg: range(20.0, 45.0),
            unit_weight_kn_m3: range(20.0, 28.0),
            rqd_percent: range(10.0, 95.0),
            joint_spacing_m: range(0.1, 3.0),
            rainfall_mean_mm: 5.0,
            temperature_range_c: range(5.0, 30.0),
            groundwater_depth_m: range(1.0, 50.0),
            freeze_thaw_cycles: CountDistribution::Poisson { mean: 15.0 },
            blasting_distance_m: range(10.0, 500.0),
            vibration_intensity: range(0.0, 10.0),
            days_since_blast: CountDistribution::Uniform { min: 1, max: 60 },
            mining_depth_m: range(5.0, 150.0),
            days_since_rain: CountDistribution::Uniform { min: 0, max: 30 },
            round_readings: false,
        }
    }

    /// Live simulation behind `/simulate-and-predict`
    pub fn live() -> Self {
        Self {
            name: "live".to_string(),
            slope_height_m: range(40.0, 150.0),
            slope_angle_deg: range(30.0, 80.0),
            cohesion_kpa: range(10.0, 100.0),
            friction_angle_deg: range(20.0, 50.0),
            unit_weight_kn_m3: range(20.0, 30.0),
            rqd_percent: range(10.0, 95.0),
            joint_spacing_m: range(0.3, 3.5),
            rainfall_mean_mm: 10.0,
            temperature_range_c: range(5.0, 40.0),
            groundwater_depth_m: range(1.0, 50.0),
            freeze_thaw_cycles: CountDistribution::Uniform { min: 0, max: 30 },
            blasting_distance_m: range(10.0, 400.0),
            vibration_intensity: range(0.0, 15.0),
            days_since_blast: CountDistribution::Uniform { min: 0, max: 60 },
            mining_depth_m: range(5.0, 150.0),
            days_since_rain: CountDistribution::Uniform { min: 0, max: 20 },
            round_readings: true,
        }
    }

    /// Narrower sensor feed behind `/simulate-sensor-data`
    pub fn sensor_feed() -> Self {
        Self {
            name: "sensor_feed".to_string(),
            slope_height_m: range(40.0, 120.0),
            slope_angle_deg: range(35.0, 75.0),
            cohesion_kpa: range(10.0, 80.0),
            friction_angle_deg: range(25.0, 45.0),
            unit_weight_kn_m3: range(22.0, 27.0),
            rqd_percent: range(20.0, 90.0),
            joint_spacing_m: range(0.5, 3.0),
            rainfall_mean_mm: 8.0,
            temperature_range_c: range(10.0, 30.0),
            groundwater_depth_m: range(5.0, 40.0),
            freeze_thaw_cycles: CountDistribution::Uniform { min: 5, max: 25 },
            blasting_distance_m: range(20.0, 300.0),
            vibration_intensity: range(0.0, 10.0),
            days_since_blast: CountDistribution::Uniform { min: 1, max: 30 },
            mining_depth_m: range(10.0, 100.0),
            days_since_rain: CountDistribution::Uniform { min: 0, max: 15 },
            round_readings: true,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dataset" => Some(Self::dataset()),
            "live" => Some(Self::live()),
            "sensor_feed" => Some(Self::sensor_feed()),
            _ => None,
        }
    }
}

impl Default for SamplingProfile {
    fn default() -> Self {
        Self::dataset()
    }
}
