use super::builder::{generate_dataset, relabel, LabelDistribution};
use super::split::{select, stratified_split, to_matrix};
use super::writer::{dataset_header, read_csv, write_csv};
use crate::logic::features::FEATURE_COUNT;
use crate::logic::scoring::{RiskLabel, ScoringPolicy};
use tempfile::tempdir;
use std::fs;

#[test]
fn test_generation_is_reproducible() {
    let a = generate_dataset(60, 42, ScoringPolicy::Initial).unwrap();
    let b = generate_dataset(60, 42, ScoringPolicy::Initial).unwrap();
    let c = generate_dataset(60, 7, ScoringPolicy::Initial).unwrap();

    assert_eq!(a.len(), 60);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_generated_rows_are_consistent() {
    let records = generate_dataset(80, 42, ScoringPolicy::Initial).unwrap();

    for r in &records {
        // Derived columns match a recomputation from the raw ones
        let vector = r.feature_vector().unwrap();
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert!(vector.as_slice().iter().all(|v| v.is_finite()));

        let expected = ScoringPolicy::Initial.label(r.risk_score);
        assert_eq!(r.risk_level, expected);
        assert_eq!(r.rockfall_binary, ScoringPolicy::Initial.binary(r.risk_score));
    }
}

#[test]
fn test_csv_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("dataset.csv");

    let records = generate_dataset(25, 42, ScoringPolicy::Initial).unwrap();
    write_csv(&path, &records).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let first_line = content.lines().next().unwrap();
    assert_eq!(first_line, dataset_header().join(","));
    assert_eq!(content.lines().count(), 26);

    let loaded = read_csv(&path).unwrap();
    assert_eq!(loaded.len(), records.len());
    for (a, b) in loaded.iter().zip(&records) {
        assert_eq!(a.risk_level, b.risk_level);
        assert_eq!(a.rockfall_binary, b.rockfall_binary);
        assert_eq!(a.season_encoded, b.season_encoded);
        assert!((a.risk_score - b.risk_score).abs() < 1e-9);
    }
}

#[test]
fn test_read_rejects_foreign_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.csv");
    fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

    let err = read_csv(&path).unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_relabel_keeps_features_and_bounds_scores() {
    let mut records = generate_dataset(120, 42, ScoringPolicy::Initial).unwrap();
    let before = records.clone();

    relabel(&mut records, ScoringPolicy::Rebalanced, 123).unwrap();

    for (new, old) in records.iter().zip(&before) {
        assert_eq!(new.features().unwrap(), old.features().unwrap());
        assert!((0.0..=1.0).contains(&new.risk_score));
        assert_eq!(new.risk_level, ScoringPolicy::Rebalanced.label(new.risk_score));
    }

    // Same seed, same labels
    let mut again = before.clone();
    relabel(&mut again, ScoringPolicy::Rebalanced, 123).unwrap();
    assert_eq!(again, records);
}

#[test]
fn test_relabel_empty_is_error() {
    assert!(relabel(&mut [], ScoringPolicy::Rebalanced, 123).is_err());
}

#[test]
fn test_label_distribution_counts() {
    let records = generate_dataset(50, 42, ScoringPolicy::Initial).unwrap();
    let dist = LabelDistribution::of(&records);

    assert_eq!(dist.low + dist.medium + dist.high, 50);
    assert_eq!(dist.rockfall + dist.no_rockfall, 50);
}

#[test]
fn test_stratified_split_keeps_every_class() {
    // 10 Low, 6 Medium, 4 High
    let labels: Vec<usize> = std::iter::repeat(0)
        .take(10)
        .chain(std::iter::repeat(1).take(6))
        .chain(std::iter::repeat(2).take(4))
        .collect();

    let split = stratified_split(&labels, 0.3, 42).unwrap();
    assert_eq!(split.train.len() + split.test.len(), labels.len());
    assert_eq!(split.test.len(), 3 + 2 + 1);

    for class in 0..3 {
        assert!(split.train.iter().any(|&i| labels[i] == class));
        assert!(split.test.iter().any(|&i| labels[i] == class));
    }

    let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());

    assert_eq!(stratified_split(&labels, 0.3, 42).unwrap(), split);
}

#[test]
fn test_split_rejects_bad_ratio() {
    assert!(stratified_split(&[0, 1, 0, 1], 0.0, 1).is_err());
    assert!(stratified_split(&[0, 1, 0, 1], 1.0, 1).is_err());
    assert!(stratified_split(&[0], 0.3, 1).is_err());
}

#[test]
fn test_to_matrix_rows_follow_indices() {
    let records = generate_dataset(10, 42, ScoringPolicy::Initial).unwrap();
    let x = to_matrix(&records, &[3, 7]).unwrap();

    assert_eq!(x.dim(), (2, FEATURE_COUNT));
    assert_eq!(x[[0, 0]], records[3].slope_height_m);
    assert_eq!(x[[1, FEATURE_COUNT - 1]], records[7].slope_steepness_factor);

    let levels: Vec<RiskLabel> = records.iter().map(|r| r.risk_level).collect();
    assert_eq!(select(&levels, &[3, 7]), vec![records[3].risk_level, records[7].risk_level]);

    assert!(to_matrix(&records, &[99]).is_err());
}
