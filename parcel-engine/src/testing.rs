//! Moteur de rendu factice pour les tests unitaires

use std::collections::HashMap;

use geo::{Geometry, Intersects, LineString, Point, Polygon};
use geojson::FeatureCollection;
use serde_json::json;

use crate::geometry::{LngLat, Pixel};
use crate::model::RenderedFeature;
use crate::renderer::{LayerFilter, MapRenderer, PaintValue, QueryArea, SourceQuery};

/// Pixels par degré (~0.11 m par pixel)
const SCALE: f64 = 1_000_000.0;

/// Tolérance de clic sur un symbole ponctuel, en pixels
const POINT_TOLERANCE_PX: f64 = 5.0;

#[derive(Debug, Default)]
pub struct FakeRenderer {
    pub origin: LngLat,
    pub rendered: Vec<(String, RenderedFeature)>,
    pub sources: Vec<(String, String, RenderedFeature)>,
    pub layer_data: HashMap<String, FeatureCollection>,
    pub paint: HashMap<(String, String), PaintValue>,
    pub popup: Option<(LngLat, String)>,
    pub camera: Option<LngLat>,
    pub marker: Option<LngLat>,
}

impl FakeRenderer {
    pub fn add_rendered(&mut self, layer: &str, feature: RenderedFeature) {
        self.rendered.push((layer.to_string(), feature));
    }

    pub fn add_source(&mut self, source: &str, source_layer: &str, feature: RenderedFeature) {
        self.sources
            .push((source.to_string(), source_layer.to_string(), feature));
    }

    pub fn unproject(&self, pixel: Pixel) -> LngLat {
        LngLat::new(
            self.origin.lng + pixel.x / SCALE,
            self.origin.lat - pixel.y / SCALE,
        )
    }

    pub fn layer_len(&self, layer: &str) -> Option<usize> {
        self.layer_data.get(layer).map(|fc| fc.features.len())
    }

    fn hit(&self, feature: &RenderedFeature, pixel: Pixel) -> bool {
        match &feature.geometry {
            Geometry::Point(p) => {
                self.project(LngLat::from(*p)).distance(pixel) <= POINT_TOLERANCE_PX
            }
            geometry => geometry.intersects(&Point::from(self.unproject(pixel))),
        }
    }
}

impl MapRenderer for FakeRenderer {
    fn query_rendered_features(
        &self,
        area: QueryArea,
        filter: &LayerFilter,
    ) -> Vec<RenderedFeature> {
        self.rendered
            .iter()
            .filter(|(layer, f)| filter.matches(layer, f))
            .filter(|(_, f)| match area {
                QueryArea::Pixel(p) => self.hit(f, p),
                QueryArea::Viewport => true,
            })
            .map(|(_, f)| f.clone())
            .collect()
    }

    fn query_source_features(&self, source: &str, query: &SourceQuery) -> Vec<RenderedFeature> {
        self.sources
            .iter()
            .filter(|(s, layer, f)| s == source && query.matches(layer, f))
            .map(|(_, _, f)| f.clone())
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
        self.popup = Some((at, html.to_string()));
    }

    fn hide_popup(&mut self) {
        self.popup = None;
    }

    fn pan_to(&mut self, center: LngLat) {
        self.camera = Some(center);
    }

    fn fly_to(&mut self, center: LngLat, _zoom: f64) {
        self.camera = Some(center);
    }

    fn move_marker(&mut self, at: LngLat) {
        self.marker = Some(at);
    }

    fn project(&self, coord: LngLat) -> Pixel {
        Pixel::new(
            (coord.lng - self.origin.lng) * SCALE,
            (self.origin.lat - coord.lat) * SCALE,
        )
    }
}

/// Carré de côté `size` degrés, coin sud-ouest en `sw`
pub fn square(sw: LngLat, size: f64) -> Geometry {
    Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            (sw.lng, sw.lat),
            (sw.lng + size, sw.lat),
            (sw.lng + size, sw.lat + size),
            (sw.lng, sw.lat + size),
            (sw.lng, sw.lat),
        ]),
        vec![],
    ))
}

/// Sous-parcelle au schéma d'attributs par défaut
pub fn sub_parcel_feature(
    id: Option<&str>,
    gid: &str,
    rgb: &str,
    land_use: &str,
    area: f64,
    geometry: Geometry,
) -> RenderedFeature {
    RenderedFeature::new(
        id.map(String::from),
        geometry,
        json!({ "gid": gid, "rgbcolor": rgb, "chucnangsdd": land_use, "dientich": area })
            .as_object()
            .cloned()
            .unwrap_or_default(),
    )
}

/// Parcelle au schéma d'attributs par défaut : `[sonha, tenduong, tenphuongxa, tenquanhuyen]`
pub fn parcel_feature(id: &str, sheet: &str, lot: &str, address: [&str; 4]) -> RenderedFeature {
    RenderedFeature::new(
        Some(id.to_string()),
        square(LngLat::new(0.0, 0.0), 0.0001),
        json!({
            "soto": sheet,
            "sothua": lot,
            "sonha": address[0],
            "tenduong": address[1],
            "tenphuongxa": address[2],
            "tenquanhuyen": address[3],
        })
        .as_object()
        .cloned()
        .unwrap_or_default(),
    )
}

pub fn point_feature(at: LngLat, key: &str, value: &str) -> RenderedFeature {
    let mut properties = geojson::JsonObject::new();
    properties.insert(key.to_string(), json!(value));
    RenderedFeature::new(None, Geometry::Point(Point::from(at)), properties)
}
