//! Response Module - caller-facing prediction responses
//!
//! # Components
//! - `ladder.rs`: probability → alert level
//! - `types.rs`: binary / multiclass wire shapes
//! - `builder.rs`: profiles and the response builder

pub mod ladder;
pub mod types;
pub mod builder;

pub use ladder::{AlertLevel, RiskLadder};
pub use types::{BinaryResponse, CombinedPrediction, MulticlassResponse, UNAVAILABLE_LABEL};
pub use builder::{PredictionResponseBuilder, Recommendations, ResponseProfile};
