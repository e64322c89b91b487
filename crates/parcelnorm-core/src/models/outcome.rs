//! Resolution outcomes and the run report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::geometry::Ring;
use crate::error::ParcelError;

/// Why a polygon left the pipeline without entering the output set
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Malformed raw coordinates
    ParseError(String),
    /// Ring could not be repaired in one pass
    InvalidGeometry(String),
    BelowMinimumArea,
    OverlapsExisting,
}

impl RejectionReason {
    /// Stable snake_case code used in reports
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::ParseError(_) => "parse_error",
            RejectionReason::InvalidGeometry(_) => "invalid_geometry",
            RejectionReason::BelowMinimumArea => "below_minimum_area",
            RejectionReason::OverlapsExisting => "overlaps_existing",
        }
    }

    /// Map a per-polygon error onto its report reason
    ///
    /// Returns `None` for run-level errors, which must propagate instead.
    pub fn from_error(error: &ParcelError) -> Option<Self> {
        match error {
            ParcelError::Parse { reason } => Some(RejectionReason::ParseError(reason.clone())),
            ParcelError::Validity { reason } => {
                Some(RejectionReason::InvalidGeometry(reason.clone()))
            }
            ParcelError::BelowMinimumArea { .. } => Some(RejectionReason::BelowMinimumArea),
            ParcelError::IntersectionConflict { .. } => Some(RejectionReason::OverlapsExisting),
            _ => None,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::ParseError(detail) | RejectionReason::InvalidGeometry(detail) => {
                write!(f, "{}: {}", self.code(), detail)
            }
            _ => f.write_str(self.code()),
        }
    }
}

/// Why an accepted polygon's geometry differs from its input
#[derive(Debug, Clone, PartialEq)]
pub enum ModificationReason {
    /// A negligible overlap with an earlier polygon was clipped away
    ClippedOverlap { overlapping_id: String },
}

impl ModificationReason {
    pub fn code(&self) -> &'static str {
        match self {
            ModificationReason::ClippedOverlap { .. } => "clipped_overlap",
        }
    }
}

impl fmt::Display for ModificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModificationReason::ClippedOverlap { overlapping_id } => {
                write!(f, "{}: {}", self.code(), overlapping_id)
            }
        }
    }
}

/// Terminal state of a polygon
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Accepted,
    Rejected { reason: RejectionReason },
    Modified { new_ring: Ring, reason: ModificationReason },
}

impl ResolutionOutcome {
    pub fn rejected(reason: RejectionReason) -> Self {
        ResolutionOutcome::Rejected { reason }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            ResolutionOutcome::Accepted => OutcomeKind::Accepted,
            ResolutionOutcome::Rejected { .. } => OutcomeKind::Rejected,
            ResolutionOutcome::Modified { .. } => OutcomeKind::Modified,
        }
    }

    /// Whether the polygon is part of the output set
    pub fn is_kept(&self) -> bool {
        !matches!(self, ResolutionOutcome::Rejected { .. })
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            ResolutionOutcome::Accepted => None,
            ResolutionOutcome::Rejected { reason } => Some(reason.to_string()),
            ResolutionOutcome::Modified { reason, .. } => Some(reason.to_string()),
        }
    }

    /// Report bucket for summary counts
    pub fn reason_code(&self) -> Option<&'static str> {
        match self {
            ResolutionOutcome::Accepted => None,
            ResolutionOutcome::Rejected { reason } => Some(reason.code()),
            ResolutionOutcome::Modified { reason, .. } => Some(reason.code()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Accepted,
    Rejected,
    Modified,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeKind::Accepted => "accepted",
            OutcomeKind::Rejected => "rejected",
            OutcomeKind::Modified => "modified",
        };
        f.write_str(label)
    }
}

/// One line of the output report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub id: String,
    pub outcome: OutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Closed ring as `[longitude, latitude]` pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_acres: Option<f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub accepted: usize,
    pub modified: usize,
    pub rejected: usize,
    pub total_area_acres: f64,
    pub by_reason: BTreeMap<String, usize>,
}

/// Output of one pipeline run, records in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub summary: ReportSummary,
    pub records: Vec<OutcomeRecord>,
}

impl ResolutionReport {
    /// Build a report and its summary; `reason_codes` pairs with `records`
    pub fn new(records: Vec<OutcomeRecord>, reason_codes: &[Option<&'static str>]) -> Self {
        let mut summary = ReportSummary { total: records.len(), ..Default::default() };

        for record in &records {
            match record.outcome {
                OutcomeKind::Accepted => summary.accepted += 1,
                OutcomeKind::Modified => summary.modified += 1,
                OutcomeKind::Rejected => summary.rejected += 1,
            }
            if let Some(area) = record.area_acres {
                summary.total_area_acres += area;
            }
        }

        for code in reason_codes.iter().flatten() {
            *summary.by_reason.entry((*code).to_string()).or_insert(0) += 1;
        }

        Self { summary, records }
    }

    /// Records that made it into the output set
    pub fn kept(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter().filter(|r| r.outcome != OutcomeKind::Rejected)
    }

    pub fn get(&self, id: &str) -> Option<&OutcomeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ParcelError::Serialization(e.to_string()))
    }
}
