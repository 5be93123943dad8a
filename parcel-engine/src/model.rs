//! Modèle de données : features rendues, groupes de parcelles, état de sélection

use std::fmt;
use std::str::FromStr;

use geo::{Geometry, MultiPolygon};
use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AttributeConfig;
use crate::geometry::{shape_centroid, LngLat};
use crate::identity::FeatureId;

/// Valeur sentinelle des attributs absents dans les tuiles cadastrales
pub const SENTINEL: &str = "None";

/// Une feature telle que renvoyée par le moteur de rendu
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    /// Identifiant porté par la tuile (absent pour certaines couches)
    pub id: Option<String>,

    /// Géométrie en WGS84
    pub geometry: Geometry,

    /// Attributs bruts de la tuile
    pub properties: JsonObject,
}

impl RenderedFeature {
    pub fn new(id: Option<String>, geometry: Geometry, properties: JsonObject) -> Self {
        Self {
            id,
            geometry,
            properties,
        }
    }

    /// Identité stable utilisée pour le dédoublonnage
    pub fn identity(&self) -> FeatureId {
        FeatureId::of(self.id.as_deref(), &self.geometry)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Attribut sous forme texte (nombres convertis, null ignoré)
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Attribut numérique (accepte aussi un nombre encodé en texte)
    pub fn property_f64(&self, key: &str) -> Option<f64> {
        match self.properties.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Attribut texte en écartant la sentinelle `"None"` et les chaînes vides
    pub fn property_opt(&self, key: &str) -> Option<String> {
        self.property_str(key)
            .filter(|s| !s.trim().is_empty() && s != SENTINEL)
    }

    /// Convertit en feature GeoJSON pour un `set_layer_data`
    pub fn to_geojson(&self) -> geojson::Feature {
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: self.id.clone().map(geojson::feature::Id::String),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

impl TryFrom<geojson::Feature> for RenderedFeature {
    type Error = geojson::Error;

    fn try_from(mut feature: geojson::Feature) -> Result<Self, Self::Error> {
        let id = feature.id.as_ref().map(|id| match id {
            geojson::feature::Id::String(s) => s.clone(),
            geojson::feature::Id::Number(n) => n.to_string(),
        });
        let Some(geometry) = feature.geometry.take() else {
            return Err(geojson::Error::FeatureHasNoGeometry(feature));
        };

        Ok(Self {
            id,
            geometry: Geometry::try_from(geometry)?,
            properties: feature.properties.unwrap_or_default(),
        })
    }
}

/// Identifiant de groupe (entier ou texte dans les tuiles, normalisé en texte)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    /// Lit l'identifiant de groupe d'une feature
    pub fn from_feature(feature: &RenderedFeature, key: &str) -> Option<Self> {
        feature
            .property_str(key)
            .filter(|s| !s.is_empty())
            .map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Couleur RGB au format tuile `"r,g,b"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Couleur de surbrillance quand la tuile n'en fournit pas
    pub const HIGHLIGHT_FALLBACK: Rgb = Rgb::new(0, 0, 255);

    /// Pastille de la légende quand la tuile n'en fournit pas
    pub const SWATCH_FALLBACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Expression CSS `rgb(r,g,b)`
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Triplet brut `r,g,b`
    pub fn triple(&self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(format!("Invalid color triple: {}", s));
        };
        let channel = |v: &str| {
            v.parse::<u8>()
                .map_err(|_| format!("Invalid color channel {:?} in {}", v, s))
        };
        Ok(Self::new(channel(r)?, channel(g)?, channel(b)?))
    }
}

/// Sous-parcelle : une zone d'usage du sol à l'intérieur d'une parcelle
#[derive(Debug, Clone, PartialEq)]
pub struct SubParcel {
    pub id: FeatureId,
    pub shape: MultiPolygon,
    pub land_use_label: String,
    /// Aire en m², pleine précision
    pub area_sqm: f64,
    pub color: Option<Rgb>,
}

impl SubParcel {
    /// Décode une feature de la couche sous-parcelles
    ///
    /// Retourne `None` si la géométrie n'est pas surfacique ou n'a aucun sommet : une
    /// sous-parcelle retenue a toujours une étiquette d'aire.
    pub fn from_feature(
        feature: &RenderedFeature,
        attrs: &AttributeConfig,
        unknown_label: &str,
    ) -> Option<Self> {
        let shape = match &feature.geometry {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            Geometry::MultiPolygon(mp) => mp.clone(),
            _ => return None,
        };
        shape_centroid(&shape)?;

        Some(Self {
            id: feature.identity(),
            shape,
            land_use_label: feature
                .property_opt(&attrs.land_use)
                .unwrap_or_else(|| unknown_label.to_string()),
            area_sqm: feature
                .property_f64(&attrs.area)
                .filter(|a| a.is_finite())
                .unwrap_or(0.0)
                .max(0.0),
            color: feature
                .property_str(&attrs.color)
                .and_then(|s| s.parse().ok()),
        })
    }
}

/// Parcelle cadastrale faisant foi (contour parent d'un groupe)
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: FeatureId,
    pub sheet_number: String,
    pub lot_number: String,
    pub house_number: Option<String>,
    pub street_name: Option<String>,
    pub ward_name: Option<String>,
    pub district_name: Option<String>,
    /// Feature source, réinjectée telle quelle dans les couches de surbrillance
    pub feature: RenderedFeature,
}

impl Parcel {
    /// Décode une feature de la source parcelles
    pub fn from_feature(feature: &RenderedFeature, attrs: &AttributeConfig) -> Self {
        Self {
            id: feature.identity(),
            sheet_number: feature.property_str(&attrs.sheet_number).unwrap_or_default(),
            lot_number: feature.property_str(&attrs.lot_number).unwrap_or_default(),
            house_number: feature.property_opt(&attrs.house_number),
            street_name: feature.property_opt(&attrs.street_name),
            ward_name: feature.property_opt(&attrs.ward_name),
            district_name: feature.property_opt(&attrs.district_name),
            feature: feature.clone(),
        }
    }
}

/// Groupe de parcelles reconstruit à chaque interaction
///
/// Construit uniquement par [`ParcelGroup::new`] : un groupe a toujours au moins une
/// parcelle parente.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelGroup {
    pub group_id: GroupId,
    /// Couleur de la sous-parcelle survolée (ou couleur de repli)
    pub color: Rgb,
    /// Usage du sol de la sous-parcelle sous le pointeur
    pub hit_land_use: String,
    pub sub_parcels: Vec<SubParcel>,
    primary: Parcel,
    /// Fragments suivants de la même parcelle (découpage par tuiles)
    fragments: Vec<Parcel>,
}

impl ParcelGroup {
    /// `None` sans parcelle parente (groupe orphelin)
    pub fn new(
        group_id: GroupId,
        color: Rgb,
        hit_land_use: String,
        sub_parcels: Vec<SubParcel>,
        parents: Vec<Parcel>,
    ) -> Option<Self> {
        let mut parents = parents.into_iter();
        let primary = parents.next()?;
        Some(Self {
            group_id,
            color,
            hit_land_use,
            sub_parcels,
            primary,
            fragments: parents.collect(),
        })
    }

    /// Première parcelle parente (porte le numéro de feuille/lot et l'adresse)
    pub fn primary(&self) -> &Parcel {
        &self.primary
    }

    /// Toutes les parcelles parentes, la principale en tête
    pub fn parents(&self) -> impl Iterator<Item = &Parcel> {
        std::iter::once(&self.primary).chain(&self.fragments)
    }

    /// Aire totale des sous-parcelles, pleine précision
    pub fn total_area(&self) -> f64 {
        self.sub_parcels.iter().map(|s| s.area_sqm).sum()
    }

    /// Contours parents, données des couches de survol et de sélection
    pub fn outline_collection(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.parents().map(|p| p.feature.to_geojson()).collect(),
            foreign_members: None,
        }
    }

    /// Légende d'usage du sol : une ligne par sous-parcelle
    pub fn land_use_rows(&self) -> Vec<LandUseRow> {
        self.sub_parcels
            .iter()
            .map(|s| LandUseRow {
                label: s.land_use_label.clone(),
                color: s.color.unwrap_or(Rgb::SWATCH_FALLBACK),
                area_sqm: s.area_sqm,
            })
            .collect()
    }
}

/// Ligne de la légende d'usage du sol du panneau de détail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandUseRow {
    pub label: String,
    pub color: Rgb,
    pub area_sqm: f64,
}

impl LandUseRow {
    pub fn area_text(&self) -> String {
        format!("{:.2}", self.area_sqm)
    }
}

/// État de sélection exposé au panneau de détail (lecture seule)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    pub group_id: GroupId,
    pub address: String,
    pub sheet_number: String,
    pub lot_number: String,
    pub coordinate: LngLat,
    pub land_use: Vec<LandUseRow>,
}

impl SelectionState {
    /// Coordonnée cliquée, 6 décimales
    pub fn coordinate_text(&self) -> String {
        self.coordinate.display_6()
    }

    /// Aire totale affichée, arrondie au moment de la présentation
    pub fn total_area_text(&self) -> String {
        format!("{:.2}", self.land_use.iter().map(|r| r.area_sqm).sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Point, Polygon};
    use serde_json::json;

    fn props(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    fn square() -> Geometry {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        ))
    }

    #[test]
    fn test_rgb_parse() {
        assert_eq!("165,124,0".parse::<Rgb>(), Ok(Rgb::new(165, 124, 0)));
        assert_eq!(" 1, 2 ,3 ".parse::<Rgb>(), Ok(Rgb::new(1, 2, 3)));
        assert!("1,2".parse::<Rgb>().is_err());
        assert!("1,2,300".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(1, 2, 3).css(), "rgb(1,2,3)");
    }

    #[test]
    fn test_property_accessors() {
        let f = RenderedFeature::new(
            None,
            Geometry::Point(Point::new(0.0, 0.0)),
            props(json!({"gid": 17, "dientich": "40.5", "tenduong": "None", "empty": " "})),
        );
        assert_eq!(f.property_str("gid").as_deref(), Some("17"));
        assert_eq!(f.property_f64("dientich"), Some(40.5));
        assert_eq!(f.property_opt("tenduong"), None);
        assert_eq!(f.property_opt("empty"), None);
        assert_eq!(f.property_opt("missing"), None);
    }

    #[test]
    fn test_sub_parcel_defaults() {
        let attrs = AttributeConfig::default();
        let f = RenderedFeature::new(Some("s1".into()), square(), props(json!({"gid": 1})));
        let sub = SubParcel::from_feature(&f, &attrs, "Không xác định").unwrap();

        assert_eq!(sub.land_use_label, "Không xác định");
        assert_eq!(sub.area_sqm, 0.0);
        assert_eq!(sub.color, None);
        assert_eq!(sub.id, FeatureId::Explicit("s1".into()));
    }

    #[test]
    fn test_sub_parcel_rejects_points() {
        let attrs = AttributeConfig::default();
        let f = RenderedFeature::new(None, Geometry::Point(Point::new(0.0, 0.0)), JsonObject::new());
        assert!(SubParcel::from_feature(&f, &attrs, "?").is_none());
    }

    #[test]
    fn test_sub_parcel_rejects_empty_ring() {
        let attrs = AttributeConfig::default();
        let empty = Geometry::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        let f = RenderedFeature::new(Some("s1".into()), empty, props(json!({"gid": 1, "dientich": 5.0})));
        assert!(SubParcel::from_feature(&f, &attrs, "?").is_none());

        let mixed = Geometry::MultiPolygon(MultiPolygon::new(vec![
            Polygon::new(LineString::new(vec![]), vec![]),
            Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
                vec![],
            ),
        ]));
        let f = RenderedFeature::new(Some("s2".into()), mixed, props(json!({"gid": 1, "dientich": 5.0})));
        let sub = SubParcel::from_feature(&f, &attrs, "?").unwrap();
        assert_eq!(crate::labels::area_labels(&[sub]).len(), 1);
    }

    #[test]
    fn test_group_requires_a_parent() {
        let attrs = AttributeConfig::default();
        let parcel = Parcel::from_feature(
            &RenderedFeature::new(Some("G1".into()), square(), props(json!({"soto": 1, "sothua": 2}))),
            &attrs,
        );
        let group = |parents| {
            ParcelGroup::new(GroupId("G1".into()), Rgb::new(1, 2, 3), "ODT".into(), vec![], parents)
        };

        assert!(group(vec![]).is_none());
        let group = group(vec![parcel.clone(), parcel]).unwrap();
        assert_eq!(group.primary().lot_number, "2");
        assert_eq!(group.parents().count(), 2);
        assert_eq!(group.outline_collection().features.len(), 2);
    }

    #[test]
    fn test_parcel_sentinels() {
        let attrs = AttributeConfig::default();
        let f = RenderedFeature::new(
            Some("p1".into()),
            square(),
            props(json!({
                "soto": 42, "sothua": "128", "sonha": "None",
                "tenduong": "Main", "tenphuongxa": "None", "tenquanhuyen": "District 1"
            })),
        );
        let parcel = Parcel::from_feature(&f, &attrs);

        assert_eq!(parcel.sheet_number, "42");
        assert_eq!(parcel.lot_number, "128");
        assert_eq!(parcel.house_number, None);
        assert_eq!(parcel.street_name.as_deref(), Some("Main"));
        assert_eq!(parcel.ward_name, None);
        assert_eq!(parcel.district_name.as_deref(), Some("District 1"));
    }

    #[test]
    fn test_geojson_roundtrip_keeps_id_and_properties() {
        let f = RenderedFeature::new(Some("7".into()), square(), props(json!({"gid": "G1"})));
        let back = RenderedFeature::try_from(f.to_geojson()).unwrap();
        assert_eq!(back, f);
    }
}
