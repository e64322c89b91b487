//! GeoJSON export of the kept parcels

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use parcelnorm_core::models::{OutcomeRecord, ResolutionReport};

/// Accepted and modified parcels as a FeatureCollection, in input order
///
/// Metadata entries become properties; `id`, `outcome`, `reason` and
/// `area_acres` are written last and win over metadata with the same key.
pub fn to_feature_collection(report: &ResolutionReport) -> FeatureCollection {
    let features = report.kept().filter_map(to_feature).collect();

    FeatureCollection { features, bbox: None, foreign_members: None }
}

fn to_feature(record: &OutcomeRecord) -> Option<Feature> {
    let ring = record.geometry.as_ref()?;
    let positions = ring.iter().map(|[lon, lat]| vec![*lon, *lat]).collect();
    let geometry = Geometry::new(geojson::Value::Polygon(vec![positions]));

    let mut properties = JsonObject::new();
    for (key, value) in &record.metadata {
        properties.insert(key.clone(), JsonValue::from(value.clone()));
    }
    properties.insert("id".to_string(), JsonValue::from(record.id.clone()));
    properties.insert("outcome".to_string(), JsonValue::from(record.outcome.to_string()));
    if let Some(reason) = &record.reason {
        properties.insert("reason".to_string(), JsonValue::from(reason.clone()));
    }
    if let Some(area) = record.area_acres {
        properties.insert("area_acres".to_string(), JsonValue::from(area));
    }

    Some(Feature {
        geometry: Some(geometry),
        properties: Some(properties),
        id: None,
        bbox: None,
        foreign_members: None,
    })
}
