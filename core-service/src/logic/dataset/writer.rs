//! Dataset CSV Store
//!
//! Header = 22 feature columns in layout order, then `risk_score`,
//! `risk_level`, `rockfall_binary`.

use std::fs;
use std::path::Path;

use crate::error::{Result, RockfallError};
use crate::logic::dataset::record::DatasetRecord;
use crate::logic::features::FEATURE_LAYOUT;

pub const TARGET_COLUMNS: [&str; 3] = ["risk_score", "risk_level", "rockfall_binary"];

/// Expected CSV header
pub fn dataset_header() -> Vec<&'static str> {
    FEATURE_LAYOUT.iter().copied().chain(TARGET_COLUMNS).collect()
}

pub fn write_csv(path: &Path, records: &[DatasetRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<DatasetRecord>> {
    let mut reader = csv::Reader::from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let expected = dataset_header();
    if header != expected {
        return Err(RockfallError::invalid(
            "dataset",
            format!(
                "unexpected header in {} ({} columns, expected {})",
                path.display(),
                header.len(),
                expected.len()
            ),
        ));
    }

    let records = reader.deserialize().collect::<std::result::Result<Vec<DatasetRecord>, _>>()?;
    log::debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
