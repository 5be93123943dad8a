//! Cotes (longueurs d'arêtes) et aires des sous-parcelles sélectionnées
//!
//! Les valeurs restent en pleine précision ; l'arrondi à 2 décimales n'a lieu qu'à la
//! présentation (`text()` et propriété `length` / `area` des features).

use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Serialize;
use serde_json::json;

use crate::geometry::{
    bearing_degrees, distance_meters, label_angle, midpoint, ring_edges, shape_centroid, LngLat,
};
use crate::model::SubParcel;

/// Cote d'une arête d'anneau
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthLabel {
    pub midpoint: LngLat,
    pub length_m: f64,
    /// Rotation du texte, dans [-90, 90]
    pub rotation_deg: f64,
}

impl LengthLabel {
    /// Cote de l'arête `a → b`
    pub fn between(a: LngLat, b: LngLat) -> Self {
        Self {
            midpoint: midpoint(a, b),
            length_m: distance_meters(a, b),
            rotation_deg: label_angle(bearing_degrees(a, b)),
        }
    }

    pub fn text(&self) -> String {
        format!("{:.2}", self.length_m)
    }
}

/// Aire d'une sous-parcelle, placée au centroïde
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaLabel {
    pub centroid: LngLat,
    pub area_sqm: f64,
}

impl AreaLabel {
    pub fn text(&self) -> String {
        format!("{:.2}", self.area_sqm)
    }
}

/// Une cote par arête de chaque anneau (extérieur et trous) de chaque sous-parcelle
pub fn length_labels(sub_parcels: &[SubParcel]) -> Vec<LengthLabel> {
    sub_parcels
        .iter()
        .flat_map(|sub| sub.shape.iter())
        .flat_map(|poly| std::iter::once(poly.exterior()).chain(poly.interiors()))
        .flat_map(|ring| ring_edges(ring))
        .map(|(a, b)| LengthLabel::between(a, b))
        .collect()
}

/// Une étiquette d'aire par sous-parcelle
pub fn area_labels(sub_parcels: &[SubParcel]) -> Vec<AreaLabel> {
    sub_parcels
        .iter()
        .filter_map(|sub| {
            shape_centroid(&sub.shape).map(|centroid| AreaLabel {
                centroid,
                area_sqm: sub.area_sqm,
            })
        })
        .collect()
}

/// Couche des cotes : propriétés `length` (texte), `length_m` (brut), `angle`
pub fn length_collection(labels: &[LengthLabel]) -> FeatureCollection {
    collection(labels.iter().map(|l| {
        point_feature(
            l.midpoint,
            json!({ "length": l.text(), "length_m": l.length_m, "angle": l.rotation_deg }),
        )
    }))
}

/// Couche des aires : propriétés `area` (texte) et `area_sqm` (brut)
pub fn area_collection(labels: &[AreaLabel]) -> FeatureCollection {
    collection(
        labels
            .iter()
            .map(|l| point_feature(l.centroid, json!({ "area": l.text(), "area_sqm": l.area_sqm }))),
    )
}

fn collection(features: impl Iterator<Item = Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.collect(),
        foreign_members: None,
    }
}

fn point_feature(at: LngLat, properties: serde_json::Value) -> Feature {
    let properties: JsonObject = match properties {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
            at.lng, at.lat,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
