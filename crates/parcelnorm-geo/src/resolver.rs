//! Single-pass, order-dependent overlap resolution.
//!
//! Polygons are visited once in a fixed order. Each is checked against the
//! polygons already kept; it is accepted when nothing overlaps, clipped when
//! exactly one kept polygon overlaps it by a negligible share of its area, and
//! rejected otherwise. Kept geometry is frozen, so a later polygon can never
//! invalidate an earlier decision.

use parcelnorm_core::config::{PipelineConfig, ProcessingOrder};
use parcelnorm_core::error::{ParcelError, Result};
use parcelnorm_core::models::{ModificationReason, RejectionReason, ResolutionOutcome};
use std::collections::HashMap;

use crate::index::SpatialIndex;
use crate::measure::area_acres;
use crate::models::{Polygon, Ring};
use crate::spatial::{clip, conflict_acres};
use crate::validation::repair_validity;

/// Terminal state of one polygon with its final geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Polygon as it leaves the resolver; clipped when the outcome is `Modified`
    pub polygon: Polygon,
    pub area_acres: f64,
    pub outcome: ResolutionOutcome,
}

/// Resolves overlaps among cleaned polygons
pub struct IntersectionResolver {
    config: PipelineConfig,
}

impl IntersectionResolver {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Resolve every polygon, returning resolutions in input order
    ///
    /// Ids must be unique; a repeated id fails the whole run, as does an
    /// inconsistent spatial index.
    pub fn resolve(&self, polygons: Vec<Polygon>) -> Result<Vec<Resolution>> {
        let mut run = ResolverRun::new(polygons)?;
        let order = processing_order(&run.areas, self.config.processing_order);

        tracing::debug!(
            polygons = order.len(),
            indexed = run.index.len(),
            order = %self.config.processing_order,
            "Resolving overlaps"
        );

        for idx in order {
            let outcome = match self.decide(&run, idx) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::debug!(id = %run.polygons[idx].id, error = %e, "Conflict");
                    ResolutionOutcome::rejected(RejectionReason::from_error(&e).ok_or(e)?)
                }
            };
            run.commit(idx, outcome)?;
        }

        Ok(run.finish())
    }

    /// Choose the outcome for one pending polygon
    ///
    /// Errors are per-polygon rejections unless they map to no report reason.
    fn decide(&self, run: &ResolverRun, idx: usize) -> Result<ResolutionOutcome> {
        let ring = &run.rings[idx];
        let id = &run.polygons[idx].id;
        let bbox = ring.bounding_box().ok_or_else(|| ParcelError::validity("empty ring"))?;

        let conflicts: Vec<(usize, f64)> = run
            .index
            .query(&bbox)
            .into_iter()
            .filter_map(|other_id| run.positions.get(other_id).copied())
            .filter(|&other| other != idx && run.is_kept(other))
            .filter_map(|other| {
                conflict_acres(ring, &run.rings[other], self.config.overlap_tolerance_acres)
                    .map(|overlap| (other, overlap))
            })
            .collect();

        match conflicts.as_slice() {
            [] => Ok(ResolutionOutcome::Accepted),
            [(other, overlap)] if self.is_negligible(*overlap, run.areas[idx]) => {
                let other_id = &run.polygons[*other].id;
                let new_ring = self.clip_to_fit(ring, &run.rings[*other]).map_err(|e| {
                    ParcelError::IntersectionConflict {
                        id: id.clone(),
                        reason: format!("clipping against {} failed: {}", other_id, e),
                    }
                })?;

                Ok(ResolutionOutcome::Modified {
                    new_ring,
                    reason: ModificationReason::ClippedOverlap { overlapping_id: other_id.clone() },
                })
            }
            [(other, overlap)] => Err(ParcelError::IntersectionConflict {
                id: id.clone(),
                reason: format!(
                    "overlaps {} by {:.4} acres of {:.4}",
                    run.polygons[*other].id, overlap, run.areas[idx]
                ),
            }),
            _ => Err(ParcelError::IntersectionConflict {
                id: id.clone(),
                reason: format!("overlaps {} kept polygons", conflicts.len()),
            }),
        }
    }

    fn is_negligible(&self, overlap_acres: f64, own_acres: f64) -> bool {
        own_acres > 0.0 && overlap_acres / own_acres < self.config.negligible_overlap_fraction
    }

    /// Clip away the overlap, then repair and re-check the minimum area
    fn clip_to_fit(&self, ring: &Ring, other: &Ring) -> Result<Ring> {
        let clipped = repair_validity(&clip(ring, other)?)?;

        let area = area_acres(&clipped);
        if area < self.config.minimum_area_acres {
            return Err(ParcelError::BelowMinimumArea {
                area_acres: area,
                minimum_acres: self.config.minimum_area_acres,
            });
        }

        Ok(clipped)
    }
}

/// Working state for one resolver run; the index never outlives it
struct ResolverRun {
    polygons: Vec<Polygon>,
    rings: Vec<Ring>,
    areas: Vec<f64>,
    outcomes: Vec<Option<ResolutionOutcome>>,
    positions: HashMap<String, usize>,
    index: SpatialIndex,
}

impl ResolverRun {
    fn new(polygons: Vec<Polygon>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(polygons.len());
        for (i, polygon) in polygons.iter().enumerate() {
            if positions.insert(polygon.id.clone(), i).is_some() {
                return Err(ParcelError::Index {
                    reason: format!("polygon id {} appears more than once", polygon.id),
                });
            }
        }

        let rings: Vec<Ring> = polygons.iter().map(|p| p.exterior.clone()).collect();
        let areas = rings.iter().map(area_acres).collect();
        let index = SpatialIndex::build(&polygons);
        let outcomes = vec![None; polygons.len()];

        Ok(Self { polygons, rings, areas, outcomes, positions, index })
    }

    /// Accepted and modified polygons form the output set
    fn is_kept(&self, idx: usize) -> bool {
        self.outcomes[idx].as_ref().is_some_and(ResolutionOutcome::is_kept)
    }

    /// Record the single terminal transition of a polygon and update the index
    fn commit(&mut self, idx: usize, outcome: ResolutionOutcome) -> Result<()> {
        debug_assert!(self.outcomes[idx].is_none(), "polygon resolved twice");

        let id = self.polygons[idx].id.clone();
        match &outcome {
            ResolutionOutcome::Accepted => {
                tracing::debug!(id = %id, "Accepted");
            }
            ResolutionOutcome::Rejected { reason } => {
                tracing::debug!(id = %id, reason = %reason, "Rejected");
                self.index.remove(&id)?;
            }
            ResolutionOutcome::Modified { new_ring, reason } => {
                tracing::debug!(id = %id, reason = %reason, "Modified");
                self.rings[idx] = new_ring.clone();
                self.areas[idx] = area_acres(new_ring);
                self.index.insert(&Polygon::new(id, new_ring.clone()))?;
            }
        }

        self.outcomes[idx] = Some(outcome);
        Ok(())
    }

    fn finish(self) -> Vec<Resolution> {
        self.polygons
            .into_iter()
            .zip(self.rings)
            .zip(self.areas)
            .zip(self.outcomes)
            .map(|(((mut polygon, ring), area), outcome)| {
                polygon.exterior = ring;
                Resolution {
                    polygon,
                    area_acres: area,
                    outcome: outcome.unwrap_or_else(|| {
                        ResolutionOutcome::rejected(RejectionReason::InvalidGeometry(
                            "not resolved".to_string(),
                        ))
                    }),
                }
            })
            .collect()
    }
}

/// Visiting order for the given areas
fn processing_order(areas: &[f64], order: ProcessingOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..areas.len()).collect();
    if order == ProcessingOrder::AreaDescending {
        indices.sort_by(|&a, &b| areas[b].total_cmp(&areas[a]).then(a.cmp(&b)));
    }
    indices
}
