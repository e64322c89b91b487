use parcelnorm_core::error::{ParcelError, Result};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;

use crate::models::{BoundingBox, Polygon, RawPoint};

/// Polygon id with its bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Id of the indexed polygon
    pub id: String,

    /// Bounding box for spatial indexing
    envelope: AABB<[f64; 2]>,
}

impl IndexEntry {
    /// Create a new index entry
    pub fn new(id: impl Into<String>, bbox: &BoundingBox) -> Self {
        Self { id: id.into(), envelope: to_envelope(bbox) }
    }

    /// Entry for a polygon, `None` when its ring is empty
    pub fn for_polygon(polygon: &Polygon) -> Option<Self> {
        polygon.exterior.bounding_box().map(|bbox| Self::new(polygon.id.clone(), &bbox))
    }

    pub fn bbox(&self) -> BoundingBox {
        from_envelope(&self.envelope)
    }
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Broad-phase bounding-box index over polygons
///
/// Answers which polygons *may* intersect a box; callers still run an exact
/// test on the candidates.
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
    envelopes: HashMap<String, AABB<[f64; 2]>>,
}

impl SpatialIndex {
    /// Create a new empty spatial index
    pub fn new() -> Self {
        Self { tree: RTree::new(), envelopes: HashMap::new() }
    }

    /// Bulk-load an index from a collection of polygons
    ///
    /// Polygons with empty rings are skipped; a repeated id keeps its first entry.
    pub fn build(polygons: &[Polygon]) -> Self {
        let mut envelopes = HashMap::with_capacity(polygons.len());
        let mut entries = Vec::with_capacity(polygons.len());

        for entry in polygons.iter().filter_map(IndexEntry::for_polygon) {
            if envelopes.contains_key(&entry.id) {
                tracing::warn!(id = %entry.id, "Skipping repeated polygon id while building index");
                continue;
            }
            envelopes.insert(entry.id.clone(), entry.envelope);
            entries.push(entry);
        }

        Self { tree: RTree::bulk_load(entries), envelopes }
    }

    /// Insert a polygon, replacing any entry with the same id
    ///
    /// Returns `false` when the polygon's ring is empty and nothing was indexed.
    pub fn insert(&mut self, polygon: &Polygon) -> Result<bool> {
        let Some(entry) = IndexEntry::for_polygon(polygon) else {
            return Ok(false);
        };

        self.remove(&entry.id)?;
        self.envelopes.insert(entry.id.clone(), entry.envelope);
        self.tree.insert(entry);
        Ok(true)
    }

    /// Remove a polygon by id, returning its bounding box if it was indexed
    pub fn remove(&mut self, id: &str) -> Result<Option<BoundingBox>> {
        let Some(envelope) = self.envelopes.remove(id) else {
            return Ok(None);
        };

        let target = IndexEntry { id: id.to_string(), envelope };
        match self.tree.remove(&target) {
            Some(removed) => Ok(Some(removed.bbox())),
            None => Err(ParcelError::Index {
                reason: format!("entry for polygon {} is missing from the R-tree", id),
            }),
        }
    }

    /// Ids of polygons whose bounding boxes overlap `bbox`, sorted
    pub fn query(&self, bbox: &BoundingBox) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .tree
            .locate_in_envelope_intersecting(&to_envelope(bbox))
            .map(|entry| entry.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Get the total number of polygons in the index
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn to_envelope(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners(bbox.min(), bbox.max())
}

fn from_envelope(envelope: &AABB<[f64; 2]>) -> BoundingBox {
    let lower = envelope.lower();
    let upper = envelope.upper();
    BoundingBox::new(RawPoint::new(lower[0], lower[1]), RawPoint::new(upper[0], upper[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ring;

    fn square(id: &str, x: f64, y: f64, size: f64) -> Polygon {
        Polygon::new(
            id,
            Ring::from(vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size]]),
        )
    }

    fn bbox(min: [f64; 2], max: [f64; 2]) -> BoundingBox {
        BoundingBox::new(RawPoint::from(min), RawPoint::from(max))
    }

    #[test]
    fn test_spatial_index_creation() {
        let index = SpatialIndex::new();
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_build_and_query() {
        let index = SpatialIndex::build(&[
            square("a", 0.0, 0.0, 2.0),
            square("b", 1.0, 1.0, 2.0),
            square("c", 10.0, 10.0, 1.0),
        ]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.query(&bbox([0.5, 0.5], [1.5, 1.5])), vec!["a", "b"]);
        assert_eq!(index.query(&bbox([9.0, 9.0], [10.5, 10.5])), vec!["c"]);
        assert!(index.query(&bbox([5.0, 5.0], [6.0, 6.0])).is_empty());
    }

    #[test]
    fn test_query_returns_partially_overlapping_boxes() {
        let index = SpatialIndex::build(&[square("big", 0.0, 0.0, 100.0)]);
        assert_eq!(index.query(&bbox([99.0, 99.0], [101.0, 101.0])), vec!["big"]);
    }

    #[test]
    fn test_touching_boxes_are_candidates() {
        let index = SpatialIndex::build(&[square("a", 0.0, 0.0, 1.0)]);
        assert_eq!(index.query(&bbox([1.0, 0.0], [2.0, 1.0])), vec!["a"]);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut index = SpatialIndex::new();
        assert!(index.insert(&square("a", 0.0, 0.0, 1.0)).unwrap());
        assert!(index.insert(&square("b", 5.0, 5.0, 1.0)).unwrap());
        assert_eq!(index.len(), 2);

        let removed = index.remove("a").unwrap();
        assert_eq!(removed, Some(bbox([0.0, 0.0], [1.0, 1.0])));
        assert_eq!(index.len(), 1);
        assert!(index.query(&bbox([0.0, 0.0], [1.0, 1.0])).is_empty());

        assert_eq!(index.remove("a").unwrap(), None);
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let mut index = SpatialIndex::build(&[square("a", 0.0, 0.0, 2.0)]);
        index.insert(&square("a", 0.0, 0.0, 1.0)).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.query(&bbox([1.5, 1.5], [1.8, 1.8])).is_empty());
        assert_eq!(index.remove("a").unwrap(), Some(bbox([0.0, 0.0], [1.0, 1.0])));
    }

    #[test]
    fn test_empty_ring_is_not_indexed() {
        let mut index = SpatialIndex::new();
        assert!(!index.insert(&Polygon::new("empty", Ring::default())).unwrap());
        assert!(index.is_empty());
    }

    #[test]
    fn test_build_skips_repeated_ids() {
        let mut index =
            SpatialIndex::build(&[square("a", 0.0, 0.0, 1.0), square("a", 5.0, 5.0, 1.0)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.remove("a").unwrap(), Some(bbox([0.0, 0.0], [1.0, 1.0])));
        assert!(index.is_empty());
    }
}
