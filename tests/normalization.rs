use std::path::Path;

use sdg_ingest::identity::resolve_identity;
use sdg_ingest::ingestion::{open_rows, prepare_source};
use sdg_ingest::processing::{batches, normalize, validate};
use sdg_ingest::types::{CanonicalRecord, FileIdentity, Layout, Provenance, UNKNOWN_GOAL};

const FALLBACK_YEAR: i32 = 2019;

/// Run detection, resolution and normalization over a fixture without touching it.
fn normalize_fixture(name: &str) -> (FileIdentity, Vec<CanonicalRecord>) {
    let path = Path::new("tests/fixtures").join(name);
    let source = prepare_source(&path).unwrap();
    let rows = open_rows(&source.csv_path, source.delimiter).unwrap();
    let headers = rows.headers().to_vec();
    let identity = resolve_identity(&source, headers.as_slice(), FALLBACK_YEAR);
    let records = normalize(rows, headers.as_slice(), &identity, &Provenance::default()).unwrap();
    (identity, records)
}

#[test]
fn narrow_file_defaults_blank_values_to_zero() {
    let (identity, records) = normalize_fixture("sdg_4_quality-education.csv");

    assert_eq!(identity.layout, Layout::Narrow);
    assert_eq!(identity.goal.number, Some(4));
    assert_eq!(identity.goal.name, "Quality Education");
    assert_eq!(identity.year, FALLBACK_YEAR);
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].state.as_deref(), Some("Bihar"));
    assert_eq!(records[0].indicator_name.as_deref(), Some("Dropout Rate"));
    assert_eq!(records[0].indicator_value, 12.5);

    assert_eq!(records[1].state.as_deref(), Some("Kerala"));
    assert_eq!(records[1].indicator_value, 0.0);

    assert_eq!(records[2].indicator_name, None);
    assert_eq!(records[2].indicator_value, 7.0);
}

#[test]
fn narrow_file_drops_nameless_records_on_validation() {
    let (_, records) = normalize_fixture("sdg_4_quality-education.csv");
    let out = validate(records);

    assert_eq!(out.valid.len(), 2);
    assert_eq!(out.dropped, 1);
    assert!(out.valid.iter().all(|r| r.indicator_name.is_some()));
}

#[test]
fn wide_file_pivots_numeric_cells_only() {
    let (identity, records) = normalize_fixture("data_export.csv");

    assert_eq!(identity.layout, Layout::Wide);
    assert_eq!(identity.goal.number, Some(1));
    assert_eq!(identity.goal.name, "No Poverty");

    // Bihar: 3 numeric cells, Kerala: '-' skipped, Goa: 'NA' skipped.
    assert_eq!(records.len(), 7);
    let per_state = |s: &str| records.iter().filter(|r| r.state.as_deref() == Some(s)).count();
    assert_eq!(per_state("Bihar"), 3);
    assert_eq!(per_state("Kerala"), 2);
    assert_eq!(per_state("Goa"), 2);

    let names: Vec<&str> = records[..3]
        .iter()
        .filter_map(|r| r.indicator_name.as_deref())
        .collect();
    assert_eq!(
        names,
        vec!["Population below poverty line (%)", "Kachha houses (%)", "Sex Ratio"]
    );
    assert!(records.iter().all(|r| r.indicator_value.is_finite()));
}

#[test]
fn semicolon_file_is_split_on_semicolons() {
    let (identity, records) = normalize_fixture("sdg_5_gender-equality_2021-22.csv");

    assert_eq!(identity.delimiter, b';');
    assert_eq!(identity.year, 2021);
    assert_eq!(identity.goal.number, Some(5));
    // The slug runs up to the extension, so the year segment is part of the name.
    assert_eq!(identity.goal.name, "Gender Equality 2021 22");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].state.as_deref(), Some("Punjab"));
    assert_eq!(records[0].indicator_name.as_deref(), Some("Female LFPR (%)"));
    assert_eq!(records[0].indicator_value, 21.4);
}

#[test]
fn tab_file_is_split_on_tabs() {
    let (identity, records) = normalize_fixture("sdg_6_clean-water_2020-21.csv");

    assert_eq!(identity.delimiter, b'\t');
    assert_eq!(identity.year, 2020);
    assert_eq!(identity.goal.number, Some(6));
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].state.as_deref(), Some("Ladakh"));
    assert_eq!(records[1].indicator_value, 61.0);
}

#[test]
fn catalogue_without_goal_keeps_unknown_goal() {
    let (identity, records) = normalize_fixture("indicator_list_2023-24.csv");

    assert_eq!(identity.goal.number, None);
    assert_eq!(identity.goal.name, UNKNOWN_GOAL);
    assert_eq!(identity.year, 2023);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.sdg_goal.is_none() && r.indicator_value == 0.0));
}

#[test]
fn provenance_is_stamped_on_every_record() {
    let (_, records) = normalize_fixture("data_export.csv");
    assert!(records
        .iter()
        .all(|r| r.source_url == "https://ik.imagekit.io/sdg/" && r.data_source == "NITI Aayog"));
}

#[test]
fn large_inputs_split_into_full_batches_and_a_remainder() {
    let (_, records) = normalize_fixture("sdg_4_quality-education.csv");
    let template = records[0].clone();
    let many: Vec<CanonicalRecord> = (0..2500)
        .map(|i| CanonicalRecord {
            state: Some(format!("State {i}")),
            ..template.clone()
        })
        .collect();

    let sizes: Vec<usize> = batches(&many, 1000).map(<[CanonicalRecord]>::len).collect();
    assert_eq!(sizes, vec![1000, 1000, 500]);
}

#[test]
fn header_goal_follows_the_sniffed_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state_export.csv");
    std::fs::write(&path, "State;Sex ratio;Rice yield\nPunjab;924;4.3\n").unwrap();

    let source = prepare_source(&path).unwrap();
    let rows = open_rows(&source.csv_path, source.delimiter).unwrap();
    let identity = resolve_identity(&source, rows.headers(), FALLBACK_YEAR);

    // "sex ratio" is the first header that names a goal.
    assert_eq!(source.delimiter, b';');
    assert_eq!(identity.goal.number, Some(5));
    assert_eq!(identity.goal.name, "Gender Equality");
}
