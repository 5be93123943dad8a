//! Utilitaires partagés par les tests d'intégration du viewer

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use parcel_engine::LngLat;
use parcel_viewer::{FileStore, Session, ViewerConfig};
use serde_json::Value;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Scènes GeoJSON des fixtures
pub fn scene_files() -> Vec<PathBuf> {
    let pattern = fixtures_dir().join("*.geojson");
    let files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(Result::ok)
        .collect();
    assert!(!files.is_empty(), "no scene fixture found");
    files
}

/// Chemin de stockage temporaire propre à un test
pub fn temp_store(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "parcel-viewer-it-{}-{}.json",
        name,
        std::process::id()
    ));
    std::fs::remove_file(&path).ok();
    path
}

pub fn open_session(scene: &Path, store: &Path, tile_duplicates: bool) -> Session {
    let config = ViewerConfig::from_preset("hcm").expect("preset");
    let store = FileStore::open(store).expect("store");
    Session::open(scene, &config, store, tile_duplicates).expect("scene")
}

/// Point de sondage d'une sous-parcelle (membre `sample` des fixtures)
#[derive(Debug, Clone)]
pub struct Sample {
    pub feature_id: String,
    pub group_id: String,
    pub at: LngLat,
}

/// Vérité terrain lue directement dans le fichier de scène
#[derive(Debug, Default)]
pub struct SceneTruth {
    pub samples: Vec<Sample>,
    /// Aire totale par groupe
    pub group_area: HashMap<String, f64>,
    /// Nombre d'arêtes par groupe (tous anneaux, trous compris)
    pub group_edges: HashMap<String, usize>,
    /// Groupes présents dans la source des parcelles
    pub sourced: HashSet<String>,
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Arêtes d'une géométrie surfacique (anneaux fermés)
fn edge_count(geometry: &Value) -> usize {
    let rings = |polygon: &Value| -> usize {
        polygon
            .as_array()
            .map(|rings| {
                rings
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|ring| ring.len().saturating_sub(1))
                    .sum()
            })
            .unwrap_or(0)
    };
    match geometry["type"].as_str() {
        Some("Polygon") => rings(&geometry["coordinates"]),
        Some("MultiPolygon") => geometry["coordinates"]
            .as_array()
            .map(|polys| polys.iter().map(rings).sum())
            .unwrap_or(0),
        _ => 0,
    }
}

pub fn scene_truth(path: &Path) -> SceneTruth {
    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("json");
    let mut truth = SceneTruth::default();

    for feature in raw["features"].as_array().expect("features") {
        let props = &feature["properties"];
        if feature["layer"] == "subparcels" {
            let gid = as_text(&props["gid"]).expect("gid");
            *truth.group_area.entry(gid.clone()).or_default() +=
                as_number(&props["dientich"]).unwrap_or(0.0);
            *truth.group_edges.entry(gid.clone()).or_default() +=
                edge_count(&feature["geometry"]);
            if let Some(sample) = feature["sample"].as_array() {
                truth.samples.push(Sample {
                    feature_id: as_text(&feature["id"]).unwrap_or_default(),
                    group_id: gid,
                    at: LngLat::new(
                        sample[0].as_f64().expect("lng"),
                        sample[1].as_f64().expect("lat"),
                    ),
                });
            }
        } else if feature["source"] == "extra" {
            if let Some(id) = as_text(&feature["id"]) {
                truth.sourced.insert(id);
            }
        }
    }
    truth
}
