//! Synthetic Sample Generator
//!
//! Seeded for batch generation, entropy-backed for live simulation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, Poisson};
use serde::{Deserialize, Serialize};

use super::profile::{CountDistribution, Range, SamplingProfile};
use crate::logic::features::RawFeatures;

/// A live reading as published by the simulation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: String,
    pub mine_id: String,
    #[serde(flatten)]
    pub features: RawFeatures,
}

pub struct SampleGenerator<R: Rng = StdRng> {
    profile: SamplingProfile,
    rng: R,
}

impl SampleGenerator<StdRng> {
    /// Reproducible generator
    pub fn seeded(profile: SamplingProfile, seed: u64) -> Self {
        Self::with_rng(profile, StdRng::seed_from_u64(seed))
    }

    /// Unseeded generator emulating real-time sensor noise
    pub fn from_entropy(profile: SamplingProfile) -> Self {
        Self::with_rng(profile, StdRng::from_entropy())
    }
}

impl<R: Rng> SampleGenerator<R> {
    pub fn with_rng(profile: SamplingProfile, rng: R) -> Self {
        Self { profile, rng }
    }

    pub fn profile(&self) -> &SamplingProfile {
        &self.profile
    }

    /// The underlying stream, so label noise can continue from it
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Draw one independent sample
    pub fn generate_raw(&mut self) -> RawFeatures {
        let p = &self.profile;
        let rng = &mut self.rng;
        let decimals = if p.round_readings { Some(1) } else { None };
        let fine = if p.round_readings { Some(2) } else { None };

        RawFeatures {
            slope_height_m: round(uniform(rng, p.slope_height_m), decimals),
            slope_angle_deg: round(uniform(rng, p.slope_angle_deg), decimals),
            cohesion_kpa: round(uniform(rng, p.cohesion_kpa), decimals),
            friction_angle_deg: round(uniform(rng, p.friction_angle_deg), decimals),
            unit_weight_kn_m3: round(uniform(rng, p.unit_weight_kn_m3), decimals),
            rqd_percent: round(uniform(rng, p.rqd_percent), decimals),
            joint_spacing_m: round(uniform(rng, p.joint_spacing_m), fine),
            rainfall_mm: round(exponential(rng, p.rainfall_mean_mm), decimals),
            temperature_range_c: round(uniform(rng, p.temperature_range_c), decimals),
            groundwater_depth_m: round(uniform(rng, p.groundwater_depth_m), decimals),
            freeze_thaw_cycles: count(rng, p.freeze_thaw_cycles),
            blasting_distance_m: round(uniform(rng, p.blasting_distance_m), decimals),
            vibration_intensity: round(uniform(rng, p.vibration_intensity), fine),
            days_since_blast: count(rng, p.days_since_blast),
            mining_depth_m: round(uniform(rng, p.mining_depth_m), decimals),
            days_since_rain: count(rng, p.days_since_rain),
            season_encoded: rng.gen_range(0..=3),
        }
    }

    pub fn generate_batch(&mut self, n: usize) -> Vec<RawFeatures> {
        (0..n).map(|_| self.generate_raw()).collect()
    }

    /// Timestamped reading for the live endpoints
    pub fn sensor_reading(&mut self, mine_id: &str) -> SensorReading {
        SensorReading {
            timestamp: chrono::Utc::now().to_rfc3339(),
            mine_id: mine_id.to_string(),
            features: self.generate_raw(),
        }
    }
}

// ============================================================================
// DISTRIBUTIONS
// ============================================================================

fn uniform<R: Rng>(rng: &mut R, range: Range) -> f64 {
    if range.max <= range.min {
        return range.min;
    }
    rng.gen_range(range.min..range.max)
}

fn exponential<R: Rng>(rng: &mut R, mean: f64) -> f64 {
    let unit: f64 = Exp1.sample(rng);
    unit * mean.max(0.0)
}

fn count<R: Rng>(rng: &mut R, distribution: CountDistribution) -> u32 {
    match distribution {
        CountDistribution::Poisson { mean } => match Poisson::new(mean) {
            Ok(poisson) => {
                let draw: f64 = poisson.sample(rng);
                draw as u32
            }
            Err(e) => {
                log::warn!("Invalid Poisson mean {} ({}), drawing 0", mean, e);
                0
            }
        },
        CountDistribution::Uniform { min, max } => {
            if max <= min {
                min
            } else {
                rng.gen_range(min..=max)
            }
        }
    }
}

fn round(value: f64, decimals: Option<i32>) -> f64 {
    match decimals {
        Some(d) => {
            let factor = 10f64.powi(d);
            (value * factor).round() / factor
        }
        None => value,
    }
}
