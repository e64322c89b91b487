//! End-to-end run: kernel cleanup, then overlap resolution, then the report.

use parcelnorm_core::config::PipelineConfig;
use parcelnorm_core::error::{ParcelError, Result};
use parcelnorm_core::models::{
    OutcomeKind, OutcomeRecord, Polygon, RawRecord, RejectionReason, ResolutionReport,
};
use std::collections::HashSet;

use crate::measure::area_acres;
use crate::parse::parse_record;
use crate::resolver::{IntersectionResolver, Resolution};
use crate::transform::rotate_with;
use crate::validation::{dedupe_consecutive, repair_validity, validate_ring};

/// Polygon normalization and conflict-resolution pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting out-of-range configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the kernel stage on one record
    ///
    /// Parses, drops consecutive duplicates and applies the record's rotation.
    /// The minimum area is enforced before repair, so a tiny ring is reported
    /// as undersized whatever its validity, and again on the repaired ring.
    pub fn clean_record(&self, record: &RawRecord) -> Result<Polygon> {
        let mut ring = dedupe_consecutive(&parse_record(record)?)?;

        if let Some(angle) = record.rotation_degrees {
            if !angle.is_finite() {
                return Err(ParcelError::parse(format!("rotation {} is not finite", angle)));
            }
            ring = rotate_with(&ring, angle, &self.config.rotation_default_origin);
            if let Some(i) = ring.iter().position(|p| !p.is_in_range()) {
                return Err(ParcelError::validity(format!(
                    "point {} is out of range after rotation",
                    i
                )));
            }
        }

        // Undersized rings are rejected on size even when they are also invalid
        self.check_minimum_area(area_acres(&ring))?;

        let issues = validate_ring(&ring);
        if !issues.is_valid {
            tracing::debug!(
                id = %record.id,
                issues = ?issues.errors.iter().map(|e| e.reason.as_str()).collect::<Vec<_>>(),
                "Repairing ring"
            );
        }
        let ring = repair_validity(&ring)?;
        self.check_minimum_area(area_acres(&ring))?;

        Ok(Polygon::new(record.id.clone(), ring).with_metadata(record.metadata.clone()))
    }

    fn check_minimum_area(&self, area: f64) -> Result<()> {
        if area < self.config.minimum_area_acres {
            return Err(ParcelError::BelowMinimumArea {
                area_acres: area,
                minimum_acres: self.config.minimum_area_acres,
            });
        }
        Ok(())
    }

    /// Process every record and build the report, records in input order
    ///
    /// Per-record failures become rejections; only run-level failures such
    /// as an inconsistent spatial index are returned as errors.
    pub fn run(&self, records: &[RawRecord]) -> Result<ResolutionReport> {
        tracing::info!(records = records.len(), "Starting pipeline run");

        let mut seen = HashSet::with_capacity(records.len());
        let mut cleaned: Vec<std::result::Result<usize, RejectionReason>> =
            Vec::with_capacity(records.len());
        let mut polygons = Vec::new();

        for record in records {
            let result = if seen.insert(record.id.as_str()) {
                self.clean_record(record)
            } else {
                Err(ParcelError::parse("duplicate id"))
            };

            match result {
                Ok(polygon) => {
                    cleaned.push(Ok(polygons.len()));
                    polygons.push(polygon);
                }
                Err(e) => {
                    let reason = RejectionReason::from_error(&e).ok_or(e)?;
                    tracing::debug!(id = %record.id, reason = %reason, "Rejected during cleanup");
                    cleaned.push(Err(reason));
                }
            }
        }

        let resolutions = IntersectionResolver::new(self.config).resolve(polygons)?;

        let mut outcome_records = Vec::with_capacity(records.len());
        let mut reason_codes = Vec::with_capacity(records.len());
        for (record, result) in records.iter().zip(cleaned) {
            match result {
                Ok(position) => {
                    let resolution = &resolutions[position];
                    reason_codes.push(resolution.outcome.reason_code());
                    outcome_records.push(resolved_record(record, resolution));
                }
                Err(reason) => {
                    reason_codes.push(Some(reason.code()));
                    outcome_records.push(rejected_record(record, &reason));
                }
            }
        }

        let report = ResolutionReport::new(outcome_records, &reason_codes);
        tracing::info!(
            total = report.summary.total,
            accepted = report.summary.accepted,
            modified = report.summary.modified,
            rejected = report.summary.rejected,
            total_area_acres = report.summary.total_area_acres,
            "Pipeline run complete"
        );

        Ok(report)
    }
}

fn resolved_record(record: &RawRecord, resolution: &Resolution) -> OutcomeRecord {
    let kept = resolution.outcome.is_kept();
    OutcomeRecord {
        id: record.id.clone(),
        outcome: resolution.outcome.kind(),
        reason: resolution.outcome.reason(),
        geometry: kept.then(|| resolution.polygon.exterior.to_closed_pairs()),
        area_acres: kept.then_some(resolution.area_acres),
        metadata: record.metadata.clone(),
    }
}

fn rejected_record(record: &RawRecord, reason: &RejectionReason) -> OutcomeRecord {
    OutcomeRecord {
        id: record.id.clone(),
        outcome: OutcomeKind::Rejected,
        reason: Some(reason.to_string()),
        geometry: None,
        area_acres: None,
        metadata: record.metadata.clone(),
    }
}
