//! Projection Web Mercator (EPSG:3857) et caméra écran
//!
//! Même convention que les moteurs de tuiles vectorielles : tuiles de 512 px, monde de
//! `512 · 2^zoom` pixels, origine en haut à gauche.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use parcel_engine::{LngLat, Pixel};
use serde::{Deserialize, Serialize};

/// Rayon équatorial WGS84 en mètres (sphère Web Mercator)
pub const EARTH_RADIUS_A: f64 = 6_378_137.0;

/// Latitude maximale représentable
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Taille d'une tuile en pixels
pub const TILE_SIZE: f64 = 512.0;

/// Convertit des degrés WGS84 vers Web Mercator (mètres)
pub fn geographic_to_web_mercator(ll: LngLat) -> (f64, f64) {
    let lat = ll.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = EARTH_RADIUS_A * ll.lng.to_radians();
    let y = EARTH_RADIUS_A * (FRAC_PI_4 + lat / 2.0).tan().ln();
    (x, y)
}

/// Convertit Web Mercator (mètres) vers des degrés WGS84
pub fn web_mercator_to_geographic(x: f64, y: f64) -> LngLat {
    let lng = (x / EARTH_RADIUS_A).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_A).exp().atan() - FRAC_PI_2).to_degrees();
    LngLat::new(lng, lat)
}

/// Taille du monde en pixels à un zoom donné
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Coordonnée monde en pixels (0..world_size), y vers le bas
pub fn to_world(ll: LngLat, zoom: f64) -> (f64, f64) {
    let (x, y) = geographic_to_web_mercator(ll);
    let half = PI * EARTH_RADIUS_A;
    let size = world_size(zoom);
    ((x + half) / (2.0 * half) * size, (half - y) / (2.0 * half) * size)
}

/// Inverse de [`to_world`]
pub fn from_world(wx: f64, wy: f64, zoom: f64) -> LngLat {
    let half = PI * EARTH_RADIUS_A;
    let size = world_size(zoom);
    web_mercator_to_geographic(wx / size * 2.0 * half - half, half - wy / size * 2.0 * half)
}

/// Caméra : centre, zoom et taille de la fenêtre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: LngLat,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Camera {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// Coordonnée → pixel écran
    pub fn project(&self, ll: LngLat) -> Pixel {
        let (cx, cy) = to_world(self.center, self.zoom);
        let (x, y) = to_world(ll, self.zoom);
        Pixel::new(x - cx + self.width / 2.0, y - cy + self.height / 2.0)
    }

    /// Pixel écran → coordonnée
    pub fn unproject(&self, pixel: Pixel) -> LngLat {
        let (cx, cy) = to_world(self.center, self.zoom);
        from_world(
            cx + pixel.x - self.width / 2.0,
            cy + pixel.y - self.height / 2.0,
            self.zoom,
        )
    }

    /// Emprise visible `(sud-ouest, nord-est)`
    pub fn bounds(&self) -> (LngLat, LngLat) {
        let sw = self.unproject(Pixel::new(0.0, self.height));
        let ne = self.unproject(Pixel::new(self.width, 0.0));
        (sw, ne)
    }

    /// Indique si une coordonnée est visible à l'écran
    pub fn contains(&self, ll: LngLat) -> bool {
        self.on_canvas(self.project(ll))
    }

    /// Pixel dans la fenêtre
    pub fn on_canvas(&self, p: Pixel) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Indices `(x, y)` de la tuile contenant un point monde
    pub fn tile_of(&self, ll: LngLat) -> (i64, i64) {
        let (x, y) = to_world(ll, self.zoom.floor());
        ((x / TILE_SIZE).floor() as i64, (y / TILE_SIZE).floor() as i64)
    }
}
