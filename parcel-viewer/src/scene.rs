//! Rendu « sans écran » d'une scène GeoJSON
//!
//! Une scène est une `FeatureCollection` dont chaque feature porte en membre étranger soit
//! `"layer"` (couche rendue, ex. `subparcels`, `diachi`), soit `"source"` et `"sourceLayer"`
//! (source vectorielle interrogeable hors affichage, ex. `extra` / `parcels`).
//!
//! ```json
//! {"type": "Feature", "layer": "subparcels", "id": "101",
//!  "geometry": {...}, "properties": {"gid": "G1", "dientich": 40.12}}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use geo::{BoundingRect, Geometry, Intersects, Point, Rect};
use geojson::{FeatureCollection, GeoJson};
use parcel_engine::{
    LayerFilter, LngLat, MapRenderer, PaintValue, Pixel, QueryArea, RenderedFeature, SourceQuery,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::mercator::Camera;

/// Tolérance de clic sur les symboles ponctuels, en pixels
pub const HIT_TOLERANCE_PX: f64 = 8.0;

/// Au-delà, une feature n'est plus dupliquée par tuile
const MAX_TILE_COPIES: usize = 16;

/// Popup affichée sur la carte
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub at: LngLat,
    pub html: String,
}

#[derive(Debug, Clone)]
struct SourceFeature {
    source: String,
    source_layer: String,
    feature: RenderedFeature,
}

/// Moteur de rendu simulé sur une scène GeoJSON
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    camera: Camera,
    rendered: Vec<(String, RenderedFeature)>,
    sources: Vec<SourceFeature>,
    layer_data: BTreeMap<String, FeatureCollection>,
    paint: BTreeMap<(String, String), PaintValue>,
    popup: Option<Popup>,
    marker: Option<LngLat>,
    tile_duplicates: bool,
}

impl SceneRenderer {
    /// Scène vide
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            rendered: Vec::new(),
            sources: Vec::new(),
            layer_data: BTreeMap::new(),
            paint: BTreeMap::new(),
            popup: None,
            marker: None,
            tile_duplicates: false,
        }
    }

    /// Charge une scène depuis un fichier GeoJSON
    pub fn load(path: &Path, camera: Camera) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
        let geojson: GeoJson = content
            .parse()
            .with_context(|| format!("Invalid GeoJSON in {}", path.display()))?;
        let collection = FeatureCollection::try_from(geojson)
            .with_context(|| format!("Scene must be a FeatureCollection: {}", path.display()))?;

        let scene = Self::from_collection(collection, camera)?;
        debug!(
            path = %path.display(),
            rendered = scene.rendered.len(),
            sources = scene.sources.len(),
            "Scene loaded"
        );
        Ok(scene)
    }

    /// Construit une scène depuis une collection déjà parsée
    pub fn from_collection(collection: FeatureCollection, camera: Camera) -> Result<Self> {
        let mut scene = Self::new(camera);

        for (index, feature) in collection.features.into_iter().enumerate() {
            let members = feature.foreign_members.clone().unwrap_or_default();
            let member = |key: &str| members.get(key).and_then(|v| v.as_str()).map(String::from);

            let rendered = RenderedFeature::try_from(feature)
                .with_context(|| format!("Scene feature #{} has no usable geometry", index))?;

            match (member("layer"), member("source"), member("sourceLayer")) {
                (Some(layer), _, _) => scene.add_rendered(&layer, rendered),
                (None, Some(source), Some(source_layer)) => {
                    scene.add_source(&source, &source_layer, rendered)
                }
                _ => warn!(index, "Scene feature without layer or source, skipped"),
            }
        }

        Ok(scene)
    }

    pub fn add_rendered(&mut self, layer: &str, feature: RenderedFeature) {
        self.rendered.push((layer.to_string(), feature));
    }

    pub fn add_source(&mut self, source: &str, source_layer: &str, feature: RenderedFeature) {
        self.sources.push(SourceFeature {
            source: source.to_string(),
            source_layer: source_layer.to_string(),
            feature,
        });
    }

    /// Renvoie une copie par tuile traversée sur les requêtes de vue, comme un vrai moteur
    pub fn set_tile_duplicates(&mut self, enabled: bool) {
        self.tile_duplicates = enabled;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Recentre la caméra sans animation (position initiale)
    pub fn jump_to(&mut self, center: LngLat) {
        self.camera.center = center;
    }

    /// Données courantes d'une couche GeoJSON
    pub fn layer(&self, name: &str) -> Option<&FeatureCollection> {
        self.layer_data.get(name)
    }

    pub fn paint(&self, layer: &str, property: &str) -> Option<&PaintValue> {
        self.paint.get(&(layer.to_string(), property.to_string()))
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn marker(&self) -> Option<LngLat> {
        self.marker
    }

    /// Nombre de features rendues par couche
    pub fn rendered_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for (layer, _) in &self.rendered {
            *counts.entry(layer.as_str()).or_insert(0) += 1;
        }
        counts
    }

    fn viewport(&self) -> Rect {
        let (sw, ne) = self.camera.bounds();
        Rect::new(geo::Coord::from(sw), geo::Coord::from(ne))
    }

    fn near(&self, point: Point, pixel: Pixel) -> bool {
        self.camera.project(LngLat::from(point)).distance(pixel) <= HIT_TOLERANCE_PX
    }

    fn hit(&self, geometry: &Geometry, pixel: Pixel) -> bool {
        match geometry {
            Geometry::Point(p) => self.near(*p, pixel),
            Geometry::MultiPoint(mp) => mp.iter().any(|p| self.near(*p, pixel)),
            other => other.intersects(&Point::from(self.camera.unproject(pixel))),
        }
    }

    /// Nombre de tuiles couvertes par l'emprise d'une géométrie
    fn tile_copies(&self, geometry: &Geometry) -> usize {
        if !self.tile_duplicates {
            return 1;
        }
        let Some(bbox) = geometry.bounding_rect() else {
            return 1;
        };
        let (x0, y1) = self.camera.tile_of(LngLat::from(bbox.min()));
        let (x1, y0) = self.camera.tile_of(LngLat::from(bbox.max()));
        let count = ((x1 - x0).abs() + 1) * ((y1 - y0).abs() + 1);
        (count as usize).clamp(1, MAX_TILE_COPIES)
    }
}

impl MapRenderer for SceneRenderer {
    fn query_rendered_features(
        &self,
        area: QueryArea,
        filter: &LayerFilter,
    ) -> Vec<RenderedFeature> {
        // Dernière feature ajoutée = dessinée au-dessus = renvoyée en premier
        let candidates = self
            .rendered
            .iter()
            .rev()
            .filter(|(layer, f)| filter.matches(layer, f));

        match area {
            // Hors de la fenêtre, rien n'est rendu
            QueryArea::Pixel(pixel) if !self.camera.on_canvas(pixel) => Vec::new(),
            QueryArea::Pixel(pixel) => candidates
                .filter(|(_, f)| self.hit(&f.geometry, pixel))
                .map(|(_, f)| f.clone())
                .collect(),
            QueryArea::Viewport => {
                let viewport = self.viewport();
                candidates
                    .filter(|(_, f)| {
                        f.geometry
                            .bounding_rect()
                            .is_some_and(|bbox| bbox.intersects(&viewport))
                    })
                    .flat_map(|(_, f)| std::iter::repeat(f).take(self.tile_copies(&f.geometry)))
                    .cloned()
                    .collect()
            }
        }
    }

    fn query_source_features(&self, source: &str, query: &SourceQuery) -> Vec<RenderedFeature> {
        self.sources
            .iter()
            .filter(|s| s.source == source && query.matches(&s.source_layer, &s.feature))
            .map(|s| s.feature.clone())
            .collect()
    }

    fn set_layer_data(&mut self, layer: &str, data: FeatureCollection) {
        self.layer_data.insert(layer.to_string(), data);
    }

    fn set_paint_property(&mut self, layer: &str, property: &str, value: PaintValue) {
        self.paint
            .insert((layer.to_string(), property.to_string()), value);
    }

    fn show_popup(&mut self, at: LngLat, html: &str) {
        self.popup = Some(Popup {
            at,
            html: html.to_string(),
        });
    }

    fn hide_popup(&mut self) {
        self.popup = None;
    }

    fn pan_to(&mut self, center: LngLat) {
        self.camera.center = center;
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.camera.center = center;
        self.camera.zoom = zoom;
    }

    fn move_marker(&mut self, at: LngLat) {
        self.marker = Some(at);
    }

    fn project(&self, coord: LngLat) -> Pixel {
        self.camera.project(coord)
    }
}
