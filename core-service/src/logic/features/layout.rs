//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Classifiers are order-sensitive, not name-sensitive. Every trained artifact
//! records the layout it was fitted on and the registry refuses a mismatch.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::RockfallError;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Raw sensor / survey inputs, in vector order
pub const RAW_FEATURES: &[&str] = &[
    // === Geological (0-6) ===
    "slope_height_m",
    "slope_angle_deg",
    "cohesion_kpa",
    "friction_angle_deg",
    "unit_weight_kn_m3",
    "rqd_percent",
    "joint_spacing_m",
    // === Environmental (7-10) ===
    "rainfall_mm",
    "temperature_range_c",
    "groundwater_depth_m",
    "freeze_thaw_cycles",
    // === Operational (11-14) ===
    "blasting_distance_m",
    "vibration_intensity",
    "days_since_blast",
    "mining_depth_m",
    // === Temporal (15-16) ===
    "days_since_rain",
    "season_encoded",
];

/// Engineered features, appended after the raw block
pub const DERIVED_FEATURES: &[&str] = &[
    "stability_index",        // 17
    "weather_risk_score",     // 18
    "operational_stress",     // 19
    "geological_weakness",    // 20
    "slope_steepness_factor", // 21
];

/// Feature names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    "slope_height_m",
    "slope_angle_deg",
    "cohesion_kpa",
    "friction_angle_deg",
    "unit_weight_kn_m3",
    "rqd_percent",
    "joint_spacing_m",
    "rainfall_mm",
    "temperature_range_c",
    "groundwater_depth_m",
    "freeze_thaw_cycles",
    "blasting_distance_m",
    "vibration_intensity",
    "days_since_blast",
    "mining_depth_m",
    "days_since_rain",
    "season_encoded",
    "stability_index",
    "weather_risk_score",
    "operational_stress",
    "geological_weakness",
    "slope_steepness_factor",
];

pub const RAW_FEATURE_COUNT: usize = 17;
pub const DERIVED_FEATURE_COUNT: usize = 5;

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = RAW_FEATURE_COUNT + DERIVED_FEATURE_COUNT;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout stamp stored alongside trained artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStamp {
    pub version: u8,
    pub hash: u32,
}

impl LayoutStamp {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
        }
    }

    pub fn validate(&self) -> Result<(), RockfallError> {
        validate_layout(self.version, self.hash)
    }
}

impl Default for LayoutStamp {
    fn default() -> Self {
        Self::current()
    }
}

/// Complete layout information for logging / the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), RockfallError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(RockfallError::LayoutMismatch {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}
