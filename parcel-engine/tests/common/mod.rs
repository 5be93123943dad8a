//! Collaborateur de rendu factice partagé par les tests d'intégration
//!
//! Projection linéaire autour d'une origine ; chaque feature rendue peut être dupliquée
//! `tile_copies` fois pour imiter les doublons des requêtes sur tuiles.

#![allow(dead_code)]

use std::collections::HashMap;

use geo::{Geometry, Intersects, LineString, Point, Polygon};
use geojson::FeatureCollection;
use parcel_engine::{
    LayerFilter, LngLat, MapRenderer, PaintValue, Pixel, QueryArea, RenderedFeature, SourceQuery,
};
use serde_json::{json, Value};

/// Pixels par degré
pub const SCALE: f64 = 500_000.0;

#[derive(Debug, Default)]
pub struct TileRenderer {
    pub origin: LngLat,
    pub tile_copies: usize,
    rendered: Vec<(String, RenderedFeature)>,
    sources: Vec<(String, String, RenderedFeature)>,
    pub layers: HashMap<String, FeatureCollection>,
    pub paint: HashMap<(String, String), PaintValue>,
    pub popup: Option<(LngLat, String)>,
    pub camera: Option<(LngLat, Option<f64>)>,
    pub marker: Option<LngLat>,
    pub set_data_calls: Vec<String>,
}

impl TileRenderer {
    pub fn new(origin: LngLat) -> Self {
        Self {
            origin,
            tile_copies: 1,
            ..Default::default()
        }
    }

    pub fn render(&mut self, layer: &str, feature: RenderedFeature) -> &mut Self {
        self.rendered.push((layer.to_string(), feature));
        self
    }

    pub fn source(&mut self, source: &str, layer: &str, feature: RenderedFeature) -> &mut Self {
        self.sources
            .push((source.to_string(), layer.to_string(), feature));
        self
    }

    pub fn layer(&self, name: &str) -> Option<&FeatureCollection> {
        self.layers.get(name)
    }

    pub fn layer_len(&self, name: &str) -> usize {
        self.layer(name).map_or(0, |fc| fc.features.len())
    }

    fn unproject(&self, pixel: Pixel) -> LngLat {
        LngLat::new(
            self.origin.lng + pixel.x / SCALE,
            self.origin.lat - pixel.y / SCALE,
        )
    }

    fn under(&self, feature: &RenderedFeature, pixel: Pixel) -> bool {
        match &feature.geometry {
            Geometry::Point(p) => self.project(LngLat::from(*p)).distance(pixel) <= 3.0,
            g => g.intersects(&Point::from(self.unproject(pixel))),
        }
    }
}

impl MapRenderer for TileRenderer {
    fn query_rendered_features(
        &self,
        area: QueryArea,
        filter: &LayerFilter,
    ) -> Vec<RenderedFeature> {
        let hits: Vec<RenderedFeature> = self
            .rendered
            .iter()
            .filter(|(layer, f)| filter.matches(layer, f))
            .filter(|(_, f)| match area {
                QueryArea::Pixel(p) => self.under(f, p),
                QueryArea::Viewport => true,
            })
            .map(|(_, f)| f.clone())
            .collect();

        // Une copie par tuile traversée
        let copies = self.tile_copies.max(1);
        (0..copies).flat_map(|_| hits.iter().cloned()).collect()
    }

    fn query_source_features(&self, source: &str, query: &SourceQuery) -> Vec<RenderedFeature> {
        let copies = self.tile_copies.max(1);
        let hits: Vec<RenderedFeature> = self
            .sources
            .iter()
            .filter(|(s, layer, f)| s == source && query.matches(layer, f))
            .map(|(_, _, f)| f.clone())
            .collect();
        (0..copies).flat_map(|_| hits.iter().cloned()).collect()
    }

    fn set_layer_data(&mut self, layer: &str, data: FeatureCollection) {
        self.set_data_calls.push(layer.to_string());
        self.layers.insert(layer.to_string(), data);
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
        self.camera = Some((center, None));
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.camera = Some((center, Some(zoom)));
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

fn object(value: Value) -> geojson::JsonObject {
    value.as_object().cloned().unwrap_or_default()
}

/// Rectangle `[w, s, e, n]`
pub fn rect(w: f64, s: f64, e: f64, n: f64) -> Geometry {
    Geometry::Polygon(Polygon::new(
        LineString::from(vec![(w, s), (e, s), (e, n), (w, n), (w, s)]),
        vec![],
    ))
}

pub fn sub_parcel(
    id: Option<&str>,
    gid: Value,
    rgb: &str,
    land_use: &str,
    area: f64,
    geometry: Geometry,
) -> RenderedFeature {
    RenderedFeature::new(
        id.map(String::from),
        geometry,
        object(json!({ "gid": gid, "rgbcolor": rgb, "chucnangsdd": land_use, "dientich": area })),
    )
}

pub fn parcel(
    id: &str,
    sheet: &str,
    lot: &str,
    fields: [&str; 4],
    geometry: Geometry,
) -> RenderedFeature {
    RenderedFeature::new(
        Some(id.to_string()),
        geometry,
        object(json!({
            "soto": sheet,
            "sothua": lot,
            "sonha": fields[0],
            "tenduong": fields[1],
            "tenphuongxa": fields[2],
            "tenquanhuyen": fields[3],
        })),
    )
}

pub fn address_point(at: LngLat, house_number: &str) -> RenderedFeature {
    RenderedFeature::new(
        None,
        Geometry::Point(Point::from(at)),
        object(json!({ "housenumber": house_number })),
    )
}

/// Scène de référence : groupe `G1` (deux sous-parcelles de 40.12 et 59.88 m²) dans la
/// parcelle tờ 42 / thửa 128, et un groupe orphelin `G9` absent de la source.
pub fn reference_scene() -> TileRenderer {
    let s101 = rect(106.6999, 10.7799, 106.7001, 10.7801);
    let s102 = rect(106.7001, 10.7799, 106.7002, 10.7801);
    let s900 = rect(106.7010, 10.7799, 106.7011, 10.7801);
    let outline = rect(106.6999, 10.7799, 106.7002, 10.7801);

    let mut r = TileRenderer::new(LngLat::new(106.699, 10.782));
    r.render(
        "subparcels",
        sub_parcel(Some("101"), json!("G1"), "255,200,0", "ODT", 40.12, s101),
    )
    .render(
        "subparcels",
        sub_parcel(Some("102"), json!("G1"), "120,200,80", "CLN", 59.88, s102),
    )
    .render(
        "subparcels",
        sub_parcel(Some("900"), json!("G9"), "10,10,10", "ODT", 12.0, s900),
    )
    .source(
        "extra",
        "parcels",
        parcel("G1", "42", "128", ["12", "Main", "None", "District 1"], outline),
    );
    r
}
