//! Features Module - Feature Engineering Pipeline
//!
//! Raw inputs → derived features → versioned 22-value vector.
//! Dataset generation, training and inference all go through here.

pub mod layout;
pub mod raw;
pub mod derived;
pub mod vector;


// Re-export common types
pub use layout::{LayoutInfo, LayoutStamp, FEATURE_COUNT, FEATURE_LAYOUT};
pub use raw::{FieldPolicy, RawFeatures, Season};
pub use derived::DerivedFeatures;
pub use vector::FeatureVector;
