//! Dataset Module - Synthetic Training Data
//!
//! Generates labeled samples, stores them as CSV, relabels under a new
//! scoring policy, and splits them for training.

pub mod record;
pub mod writer;
pub mod builder;
pub mod split;

#[cfg(test)]
mod tests;

pub use record::DatasetRecord;
pub use writer::{dataset_header, read_csv, write_csv, TARGET_COLUMNS};
pub use builder::{generate_dataset, relabel, LabelDistribution};
pub use split::{select, stratified_split, to_matrix, SplitIndices};
