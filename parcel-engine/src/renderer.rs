//! Contrat avec le moteur de rendu cartographique
//!
//! Le moteur n'accède à la carte qu'à travers le trait [`MapRenderer`] : requêtes sur les
//! features rendues, remplacement des données d'une couche, popup, caméra et marqueur.
//! Les événements pointeur sont transmis explicitement via [`MapEvent`] au lieu de
//! callbacks enregistrés sur la carte.

use geojson::FeatureCollection;

use crate::geometry::{LngLat, Pixel};
use crate::model::RenderedFeature;

/// Zone d'une requête sur les features rendues
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryArea {
    /// Features sous un pixel
    Pixel(Pixel),
    /// Toutes les features actuellement rendues dans la vue
    Viewport,
}

/// Filtre de couches (et optionnellement d'attribut) pour les requêtes rendues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFilter {
    pub layers: Vec<String>,
    /// Égalité stricte `attribut == valeur` (comparaison sur la forme texte)
    pub property_eq: Option<(String, String)>,
}

impl LayerFilter {
    /// Filtre sur une seule couche
    pub fn layer(name: impl Into<String>) -> Self {
        Self {
            layers: vec![name.into()],
            property_eq: None,
        }
    }

    /// Ajoute une contrainte d'égalité sur un attribut
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.property_eq = Some((key.into(), value.into()));
        self
    }

    /// Indique si une feature d'une couche donnée passe le filtre
    pub fn matches(&self, layer: &str, feature: &RenderedFeature) -> bool {
        if !self.layers.iter().any(|l| l == layer) {
            return false;
        }
        match &self.property_eq {
            Some((key, value)) => feature.property_str(key).as_deref() == Some(value.as_str()),
            None => true,
        }
    }
}

/// Requête sur une source vectorielle, indépendante de ce qui est affiché
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub source_layer: String,
    /// Identifiants de features recherchés
    pub ids: Vec<String>,
}

impl SourceQuery {
    pub fn new(source_layer: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            source_layer: source_layer.into(),
            ids,
        }
    }

    /// Indique si une feature de la couche de source correspond
    pub fn matches(&self, source_layer: &str, feature: &RenderedFeature) -> bool {
        source_layer == self.source_layer
            && feature
                .id
                .as_deref()
                .is_some_and(|id| self.ids.iter().any(|wanted| wanted == id))
    }
}

/// Valeur d'une propriété de style
#[derive(Debug, Clone, PartialEq)]
pub enum PaintValue {
    Color(String),
    Number(f64),
}

/// Moteur de rendu cartographique
pub trait MapRenderer {
    /// Features rendues dans une zone, restreintes par le filtre
    fn query_rendered_features(&self, area: QueryArea, filter: &LayerFilter)
        -> Vec<RenderedFeature>;

    /// Features d'une source vectorielle, rendues ou non
    fn query_source_features(&self, source: &str, query: &SourceQuery) -> Vec<RenderedFeature>;

    /// Remplace en une fois les données d'une couche GeoJSON
    fn set_layer_data(&mut self, layer: &str, data: FeatureCollection);

    fn set_paint_property(&mut self, layer: &str, property: &str, value: PaintValue);

    fn show_popup(&mut self, at: LngLat, html: &str);

    fn hide_popup(&mut self);

    fn pan_to(&mut self, center: LngLat);

    /// Déplace la caméra avec changement de zoom
    fn fly_to(&mut self, center: LngLat, zoom: f64);

    fn move_marker(&mut self, at: LngLat);

    /// Projette une coordonnée en pixel écran (caméra courante)
    fn project(&self, coord: LngLat) -> Pixel;
}

/// Événement transmis par la boucle d'événements de la carte
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Le style et les sources sont chargés, les requêtes deviennent valides
    Loaded,
    PointerMove { pixel: Pixel, lng_lat: LngLat },
    Click { pixel: Pixel, lng_lat: LngLat },
    /// Fin de glisser du marqueur à la coordonnée de dépôt
    MarkerDragEnd { lng_lat: LngLat },
}

/// Collection GeoJSON vide (effacement d'une couche)
pub fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}
