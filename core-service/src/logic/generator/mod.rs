//! Generator Module - synthetic geotechnical samples

pub mod profile;
pub mod sampler;

pub use profile::{CountDistribution, Range, SamplingProfile};
pub use sampler::{SampleGenerator, SensorReading};
