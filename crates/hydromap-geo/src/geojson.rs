//! GeoJSON output types.
//!
//! The encode half of the geometry codec: decoded geometries serialize as
//! RFC 7946 geometry objects, and features pair a geometry with a flat
//! properties bag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wkb::Geometry;

/// GeoJSON geometry object. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl From<Geometry> for GeoJsonGeometry {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Point(p) => GeoJsonGeometry::Point {
                coordinates: [p.lon, p.lat],
            },
            Geometry::LineString(points) => GeoJsonGeometry::LineString {
                coordinates: points.into_iter().map(|p| [p.lon, p.lat]).collect(),
            },
            Geometry::Polygon(rings) => GeoJsonGeometry::Polygon {
                coordinates: rings
                    .into_iter()
                    .map(|ring| ring.into_iter().map(|p| [p.lon, p.lat]).collect())
                    .collect(),
            },
        }
    }
}

/// GeoJSON Feature: one geometry plus arbitrary properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub geometry: GeoJsonGeometry,
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: GeoJsonGeometry, properties: Map<String, Value>) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

/// GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            collection_type: "FeatureCollection".to_string(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wkb::Position;

    #[test]
    fn test_point_serializes_as_geojson() {
        let geometry: GeoJsonGeometry = Geometry::Point(Position {
            lon: 171.8,
            lat: -42.08,
        })
        .into();
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Point", "coordinates": [171.8, -42.08]})
        );
    }

    #[test]
    fn test_linestring_serializes_as_geojson() {
        let geometry: GeoJsonGeometry = Geometry::LineString(vec![
            Position { lon: 0.0, lat: 0.0 },
            Position { lon: 1.0, lat: 2.0 },
        ])
        .into();
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["type"], "LineString");
        assert_eq!(json["coordinates"][1], serde_json::json!([1.0, 2.0]));
    }

    #[test]
    fn test_feature_carries_type_tag() {
        let mut properties = Map::new();
        properties.insert("id".to_string(), serde_json::json!(7));
        let feature = Feature::new(
            GeoJsonGeometry::Point {
                coordinates: [1.0, 2.0],
            },
            properties,
        );
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["properties"]["id"], 7);
    }

    #[test]
    fn test_feature_collection_wraps_features() {
        let collection = FeatureCollection::new(vec![Feature::new(
            GeoJsonGeometry::Point {
                coordinates: [0.0, 0.0],
            },
            Map::new(),
        )]);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"].as_array().unwrap().len(), 1);
    }
}
