//! Identité stable des features rendues
//!
//! Une même géométrie logique peut revenir plusieurs fois d'une requête sur des tuiles
//! (une copie par tuile ou par couche de style). L'identité sert à dédoublonner avant toute
//! agrégation. Si la feature porte un identifiant, il fait foi ; sinon on calcule un hash
//! de la géométrie, normalisé pour être indépendant du sommet de départ des anneaux.

use std::fmt;

use blake3::Hasher;
use geo::{Coord, Geometry, LineString, Polygon};

/// Identifiant stable d'une feature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureId {
    /// Identifiant porté par la donnée (tuile ou source)
    Explicit(String),
    /// Hash hexadécimal de la géométrie, faute d'identifiant
    Geometry(String),
}

impl FeatureId {
    /// Construit l'identité d'une feature : id explicite, sinon hash de géométrie
    pub fn of(explicit: Option<&str>, geometry: &Geometry) -> Self {
        match explicit.filter(|s| !s.is_empty()) {
            Some(id) => Self::Explicit(id.to_string()),
            None => Self::Geometry(hex::encode(geometry_hash(geometry))),
        }
    }

    /// Valeur textuelle (utilisée comme clé de filtre par identifiant)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Explicit(s) | Self::Geometry(s) => s,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(s) => write!(f, "{}", s),
            Self::Geometry(h) => write!(f, "geom:{}", &h[..h.len().min(12)]),
        }
    }
}

/// Hash blake3 d'une géométrie, indépendant du sommet de départ des anneaux
///
/// Coordonnées arrondies à 1e-7 degré (~1 cm) : deux copies d'une même géométrie issues de
/// tuiles différentes donnent le même hash.
pub fn geometry_hash(geom: &Geometry) -> [u8; 32] {
    let mut hasher = Hasher::new();
    feed_geometry(&mut hasher, geom);
    *hasher.finalize().as_bytes()
}

fn feed_geometry(hasher: &mut Hasher, geom: &Geometry) {
    match geom {
        Geometry::Point(p) => {
            hasher.update(b"P");
            feed_coord(hasher, p.0);
        }
        Geometry::MultiPoint(mp) => {
            hasher.update(b"MP");
            mp.iter().for_each(|p| feed_coord(hasher, p.0));
        }
        Geometry::LineString(ls) => {
            hasher.update(b"L");
            ls.coords().for_each(|c| feed_coord(hasher, *c));
        }
        Geometry::Polygon(polygon) => feed_polygon(hasher, polygon),
        Geometry::MultiPolygon(mp) => {
            hasher.update(b"MA");
            mp.iter().for_each(|polygon| feed_polygon(hasher, polygon));
        }
        other => {
            hasher.update(format!("{:?}", other).as_bytes());
        }
    }
}

fn feed_polygon(hasher: &mut Hasher, polygon: &Polygon) {
    hasher.update(b"A");
    feed_ring(hasher, polygon.exterior());
    for hole in polygon.interiors() {
        hasher.update(b"H");
        feed_ring(hasher, hole);
    }
}

/// Parcourt l'anneau à partir de son plus petit sommet (x puis y), sans le point de fermeture
fn feed_ring(hasher: &mut Hasher, ring: &LineString) {
    let coords = match ring.0.as_slice() {
        [body @ .., last] if ring.0.len() > 1 && Some(last) == ring.0.first() => body,
        all => all,
    };
    let Some(start) = coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)))
        .map(|(i, _)| i)
    else {
        return;
    };

    coords[start..]
        .iter()
        .chain(&coords[..start])
        .for_each(|c| feed_coord(hasher, *c));
}

fn feed_coord(hasher: &mut Hasher, coord: Coord) {
    let x = (coord.x * 1e7).round() as i64;
    let y = (coord.y * 1e7).round() as i64;
    hasher.update(&x.to_le_bytes());
    hasher.update(&y.to_le_bytes());
}
