pub mod geometry;
pub mod outcome;
pub mod parcel;

pub use geometry::{BoundingBox, RawPoint, Ring};
pub use outcome::{
    ModificationReason, OutcomeKind, OutcomeRecord, RejectionReason, ReportSummary,
    ResolutionOutcome, ResolutionReport,
};
pub use parcel::{Polygon, RawRecord};
