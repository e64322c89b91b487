//! End-to-end pipeline behaviour on small parcel sets
//!
//! Covers the reference scenarios (dedupe, overlap rejection, minimum area,
//! malformed input), report determinism and the monotonicity of kept parcels.

use parcelnorm_core::config::{PipelineConfig, ProcessingOrder};
use parcelnorm_core::models::{OutcomeKind, RawRecord, Ring};
use parcelnorm_geo::spatial::overlap_acres;
use parcelnorm_geo::{dedupe_consecutive, parse, Pipeline};
use serde_json::json;

fn square(id: &str, x: f64, y: f64, size: f64) -> RawRecord {
    RawRecord::new(id, json!([[x, y], [x + size, y], [x + size, y + size], [x, y + size]]))
}

fn pipeline(config: PipelineConfig) -> Pipeline {
    Pipeline::new(config).unwrap()
}

#[test]
fn test_scenario_consecutive_duplicate_is_dropped() {
    let ring = parse(&json!([[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])).unwrap();
    let cleaned = dedupe_consecutive(&ring).unwrap();

    assert_eq!(cleaned.len(), 4);
    assert_eq!(cleaned.to_pairs(), vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
}

#[test]
fn test_scenario_quarter_overlap_is_rejected() {
    let config = PipelineConfig::default().with_negligible_overlap(0.1);
    let records = vec![square("first", 0.0, 0.0, 2.0), square("second", 1.0, 1.0, 2.0)];

    let report = pipeline(config).run(&records).unwrap();

    assert_eq!(report.records[0].outcome, OutcomeKind::Accepted);
    assert_eq!(report.records[1].outcome, OutcomeKind::Rejected);
    assert_eq!(report.records[1].reason.as_deref(), Some("overlaps_existing"));
    assert!(report.records[1].geometry.is_none());
}

#[test]
fn test_scenario_small_triangle_is_below_minimum() {
    let config = PipelineConfig::default().with_minimum_area(1.0);
    let records = vec![RawRecord::new(
        "sliver",
        json!([[115.0, -8.0], [115.0001, -8.0], [115.0, -8.0001]]),
    )];

    let report = pipeline(config).run(&records).unwrap();

    assert_eq!(report.records[0].outcome, OutcomeKind::Rejected);
    assert_eq!(report.records[0].reason.as_deref(), Some("below_minimum_area"));
    assert_eq!(report.summary.by_reason["below_minimum_area"], 1);
}

#[test]
fn test_small_invalid_rings_are_below_minimum() {
    let config = PipelineConfig::default().with_minimum_area(1.0);
    let records = vec![
        // Collinear: repair would collapse it to two vertices
        RawRecord::new("flat", json!([[115.0, -8.0], [115.0001, -8.0], [115.0002, -8.0]])),
        // Bowtie: repair cannot remove the crossing
        RawRecord::new(
            "bowtie",
            json!([[115.0, -8.0], [115.00001, -8.00001], [115.00001, -8.0], [115.0, -8.00001]]),
        ),
    ];

    let report = pipeline(config).run(&records).unwrap();

    for record in &report.records {
        assert_eq!(record.outcome, OutcomeKind::Rejected, "{}", record.id);
        assert_eq!(record.reason.as_deref(), Some("below_minimum_area"), "{}", record.id);
    }
    assert_eq!(report.summary.by_reason["below_minimum_area"], 2);
}

#[test]
fn test_scenario_missing_longitude_is_parse_error() {
    let records = vec![
        RawRecord::new(
            "broken",
            json!([{"latitude": 0.0}, {"latitude": 0.0, "longitude": 2.0}, {"latitude": 2.0, "longitude": 2.0}]),
        ),
        // Would overlap the broken record if it had been indexed
        square("neighbour", 0.0, 0.0, 2.0),
    ];

    let report = pipeline(PipelineConfig::default()).run(&records).unwrap();

    assert_eq!(report.records[0].outcome, OutcomeKind::Rejected);
    assert!(report.records[0].reason.as_deref().unwrap().starts_with("parse_error"));
    assert_eq!(report.records[1].outcome, OutcomeKind::Accepted);
}

#[test]
fn test_spreadsheet_and_wkt_inputs() {
    let records = vec![
        RawRecord::new(
            "sheet",
            json!("[{\"latitude\": \"-8.5\", \"longitude\": \"115.26\"}, {\"latitude\": -8.5, \"longitude\": 115.261}, {\"latitude\": -8.499, \"longitude\": 115.261}]"),
        ),
        RawRecord::from_wkt("wkt", "POLYGON((115.30 -8.50, 115.31 -8.50, 115.31 -8.49, 115.30 -8.49, 115.30 -8.50))"),
    ];

    let report = pipeline(PipelineConfig::default()).run(&records).unwrap();
    assert_eq!(report.summary.accepted, 2);
}

#[test]
fn test_negligible_overlap_is_clipped() {
    let records = vec![
        square("first", 115.0, -8.0, 0.001),
        square("second", 115.00095, -8.0, 0.001),
    ];

    let report = pipeline(PipelineConfig::default()).run(&records).unwrap();
    let second = report.get("second").unwrap();

    assert_eq!(second.outcome, OutcomeKind::Modified);
    assert_eq!(second.reason.as_deref(), Some("clipped_overlap: first"));
    assert!(second.area_acres.unwrap() < report.get("first").unwrap().area_acres.unwrap());
    assert_eq!(report.summary.by_reason["clipped_overlap"], 1);
}

#[test]
fn test_kept_parcels_do_not_overlap() {
    let config = PipelineConfig::default();
    let records: Vec<RawRecord> = (0..12)
        .map(|i| {
            let offset = i as f64 * 0.0007;
            square(&format!("p{}", i), 115.0 + offset, -8.0 + (i % 3) as f64 * 0.0004, 0.001)
        })
        .collect();

    let report = pipeline(config).run(&records).unwrap();
    let kept: Vec<Ring> = report
        .kept()
        .map(|r| Ring::from(r.geometry.clone().unwrap()))
        .collect();

    assert!(!kept.is_empty());
    for (i, a) in kept.iter().enumerate() {
        for b in &kept[i + 1..] {
            assert!(overlap_acres(a, b) <= config.overlap_tolerance_acres);
        }
    }
}

#[test]
fn test_adding_records_never_changes_earlier_outcomes() {
    let records = vec![
        square("a", 0.0, 0.0, 0.01),
        square("b", 0.005, 0.0, 0.01),
        square("c", 0.02, 0.0, 0.01),
        square("d", 0.025, 0.005, 0.01),
        square("e", 0.0, 0.0, 0.03),
    ];
    let pipeline = pipeline(PipelineConfig::default());
    let full = pipeline.run(&records).unwrap();

    for prefix in 1..records.len() {
        let partial = pipeline.run(&records[..prefix]).unwrap();
        assert_eq!(partial.records, full.records[..prefix].to_vec());
    }
}

#[test]
fn test_processing_order_changes_the_winner() {
    let records = vec![square("small", 0.0, 0.0, 0.01), square("large", 0.005, 0.005, 0.03)];

    let by_input = pipeline(PipelineConfig::default()).run(&records).unwrap();
    assert_eq!(by_input.get("small").unwrap().outcome, OutcomeKind::Accepted);

    let config = PipelineConfig::default().with_order(ProcessingOrder::AreaDescending);
    let by_area = pipeline(config).run(&records).unwrap();
    assert_eq!(by_area.get("large").unwrap().outcome, OutcomeKind::Accepted);
    assert_eq!(by_area.get("small").unwrap().outcome, OutcomeKind::Rejected);
    assert_eq!(by_area.records[0].id, "small");
}

#[test]
fn test_reports_are_byte_identical_across_runs() {
    let records = vec![
        square("a", 115.0, -8.0, 0.001).with_metadata("owner", "Wayan"),
        square("b", 115.00095, -8.0, 0.001),
        square("c", 115.0005, -8.0005, 0.001),
        RawRecord::new("d", json!("not json")),
        square("e", 115.01, -8.0, 0.002).with_rotation(12.5),
    ];
    let pipeline = pipeline(PipelineConfig::default());

    let first = pipeline.run(&records).unwrap().to_json().unwrap();
    let second = pipeline.run(&records).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}
