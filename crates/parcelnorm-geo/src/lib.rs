//! parcelnorm Geo - Polygon normalization and conflict resolution
//!
//! This crate holds the geometry kernel (parsing, cleanup, repair, area),
//! the transform engine, the R-tree spatial index, and the intersection
//! resolver that turns raw parcel records into a non-overlapping set.

pub mod index;
pub mod measure;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod resolver;
pub mod spatial;
pub mod transform;
pub mod validation;

// Re-export key types for convenience
pub use index::{IndexEntry, SpatialIndex};
pub use measure::{area_acres, area_centroid, centroid};
pub use parse::{parse, parse_record, parse_wkt};
pub use pipeline::Pipeline;
pub use resolver::{IntersectionResolver, Resolution};
pub use transform::{rotate, rotate_with};
pub use validation::{dedupe_consecutive, has_self_intersection, repair_validity, validate_ring};
