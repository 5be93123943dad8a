//! Export des couches du moteur en GeoJSON
//!
//! Un fichier `<couche>.geojson` par couche possédée par le moteur (survol, sélection,
//! cotes, aires), l'état du panneau dans `selection.json` et un `manifest.json` avec le
//! checksum blake3 de chaque fichier.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geojson::FeatureCollection;
use parcel_engine::{empty_collection, LayerConfig, SelectionState};
use serde::Serialize;
use tracing::{debug, info};

use crate::scene::SceneRenderer;

/// Fichier écrit par l'export
#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub layer: String,
    pub path: PathBuf,
    pub features: usize,
    pub checksum: String,
}

/// Manifeste de l'export
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportManifest {
    pub files: Vec<ExportedFile>,
    /// Checksum de `selection.json` si une sélection existe
    pub selection_checksum: Option<String>,
}

/// Exporte les couches du moteur et la sélection courante dans `output`
pub fn export_layers(
    renderer: &SceneRenderer,
    layers: &LayerConfig,
    selection: Option<&SelectionState>,
    output: &Path,
) -> Result<ExportManifest> {
    std::fs::create_dir_all(output)
        .context(format!("Failed to create directory: {}", output.display()))?;

    let mut manifest = ExportManifest::default();
    let empty = empty_collection();

    for name in [
        &layers.hover,
        &layers.selection,
        &layers.length_labels,
        &layers.area_labels,
    ] {
        let collection = renderer.layer(name).unwrap_or(&empty);
        let path = output.join(format!("{}.geojson", name));
        let checksum = write_collection(collection, &path)?;
        debug!(
            layer = %name,
            features = collection.features.len(),
            checksum = &checksum[..12],
            "Layer exported"
        );
        manifest.files.push(ExportedFile {
            layer: name.clone(),
            path,
            features: collection.features.len(),
            checksum,
        });
    }

    if let Some(selection) = selection {
        let checksum = write_json(selection, &output.join("selection.json"))?;
        debug!(group = %selection.group_id, lot = %selection.lot_number, "Selection exported");
        manifest.selection_checksum = Some(checksum);
    }

    write_json(&manifest, &output.join("manifest.json"))?;
    info!(output = %output.display(), layers = manifest.files.len(), "Export manifest written");
    Ok(manifest)
}

/// Écrit une collection GeoJSON, retourne le checksum blake3 du fichier
pub fn write_collection(collection: &FeatureCollection, path: &Path) -> Result<String> {
    write_json(collection, path)
}

/// Le checksum porte sur les octets écrits, sans relire le fichier
fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<String> {
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, &bytes).context(format!("Failed to write file: {}", path.display()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
