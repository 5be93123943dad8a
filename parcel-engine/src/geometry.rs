//! Utilitaires géométriques (sphère terrestre, centroïdes, angles d'étiquettes)
//!
//! Modèle sphérique : la précision est suffisante aux niveaux de zoom cadastraux (≥ 17),
//! aucune correction ellipsoïdale n'est appliquée.

use geo::{Centroid, Coord, LineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Rayon moyen de la Terre en mètres
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Coordonnée géographique en degrés (longitude, latitude)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Vérifie que la coordonnée est dans les bornes WGS84
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Texte "lat, lng" à 6 décimales (affichage du panneau)
    pub fn display_6(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl From<Coord> for LngLat {
    fn from(c: Coord) -> Self {
        Self { lng: c.x, lat: c.y }
    }
}

impl From<LngLat> for Coord {
    fn from(ll: LngLat) -> Self {
        Coord {
            x: ll.lng,
            y: ll.lat,
        }
    }
}

impl From<Point> for LngLat {
    fn from(p: Point) -> Self {
        Self {
            lng: p.x(),
            lat: p.y(),
        }
    }
}

impl From<LngLat> for Point {
    fn from(ll: LngLat) -> Self {
        Point::new(ll.lng, ll.lat)
    }
}

/// Position écran en pixels (origine en haut à gauche)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance euclidienne en pixels
    pub fn distance(&self, other: Pixel) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Distance orthodromique (haversine) entre deux points, en mètres
pub fn distance_meters(a: LngLat, b: LngLat) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Cap initial de `a` vers `b`, en degrés dans [0, 360), sens horaire depuis le nord
pub fn bearing_degrees(a: LngLat, b: LngLat) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid peut arrondir à 360 pour un résidu négatif infime
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Point milieu sur le grand cercle reliant `a` et `b`
pub fn midpoint(a: LngLat, b: LngLat) -> LngLat {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let lambda1 = a.lng.to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let bx = phi2.cos() * d_lambda.cos();
    let by = phi2.cos() * d_lambda.sin();

    let phi_m = (phi1.sin() + phi2.sin()).atan2(((phi1.cos() + bx).powi(2) + by.powi(2)).sqrt());
    let lambda_m = lambda1 + by.atan2(phi1.cos() + bx);

    // Renormaliser la longitude dans [-180, 180]
    let lng = (lambda_m.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    LngLat::new(lng, phi_m.to_degrees())
}

/// Angle de rotation du texte d'une cote, toujours dans [-90, 90]
///
/// Purement cosmétique : le texte suit l'arête sans jamais apparaître à l'envers.
/// Ne jamais l'utiliser pour un calcul de distance ou de direction.
pub fn label_angle(bearing: f64) -> f64 {
    let mut angle = bearing.rem_euclid(360.0) - 90.0;
    if !(-90.0..=90.0).contains(&angle) {
        angle -= 180.0;
    }
    angle
}

/// Centroïde pondéré par l'aire d'un anneau simple
///
/// Différent de la moyenne des sommets : reste pertinent pour les parcelles non convexes.
pub fn centroid(ring: &LineString) -> Option<LngLat> {
    Polygon::new(ring.clone(), vec![]).centroid().map(LngLat::from)
}

/// Centroïde pondéré d'une forme complète (trous et parties multiples compris)
pub fn shape_centroid(shape: &MultiPolygon) -> Option<LngLat> {
    shape.centroid().map(LngLat::from)
}

/// Arêtes consécutives d'un anneau
///
/// Un anneau stocké fermé (premier sommet répété en dernier) donne autant d'arêtes que de
/// sommets distincts. Un anneau ouvert est fermé implicitement.
pub fn ring_edges(ring: &LineString) -> Vec<(LngLat, LngLat)> {
    let mut edges: Vec<(LngLat, LngLat)> = ring
        .lines()
        .map(|line| (LngLat::from(line.start), LngLat::from(line.end)))
        .collect();

    if !ring.is_closed() && ring.0.len() > 2 {
        if let (Some(&first), Some(&last)) = (ring.0.first(), ring.0.last()) {
            edges.push((LngLat::from(last), LngLat::from(first)));
        }
    }

    edges
}
