use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::geometry::Ring;

/// A polygon record as handed over by the loading layer
///
/// `coordinates` is kept as raw JSON: spreadsheet exports routinely carry it
/// as a JSON-encoded string, and malformed content is only rejected when the
/// record is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,

    #[serde(default)]
    pub coordinates: serde_json::Value,

    /// WKT `POLYGON` text, used when `coordinates` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,

    /// Alignment correction applied before validity repair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_degrees: Option<f64>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, coordinates: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            coordinates,
            wkt: None,
            rotation_degrees: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn from_wkt(id: impl Into<String>, wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            ..Self::new(id, serde_json::Value::Null)
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = Some(degrees);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A cleaned parcel polygon
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Opaque identifier, stable across pipeline stages
    pub id: String,
    pub exterior: Ring,
    /// Passed through untouched
    pub metadata: BTreeMap<String, String>,
}

impl Polygon {
    pub fn new(id: impl Into<String>, exterior: Ring) -> Self {
        Self { id: id.into(), exterior, metadata: BTreeMap::new() }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}
