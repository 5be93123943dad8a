//! Configuration du viewer

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parcel_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::mercator::Camera;

/// Fichier de persistance par défaut de la dernière position
pub const DEFAULT_STORE_PATH: &str = ".parcel-viewer.json";

/// Variable d'environnement surchargeant le fichier de persistance
pub const STORE_ENV_VAR: &str = "PARCEL_VIEWER_STORE";

/// Configuration principale
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Noms de couches, attributs, centre par défaut, persistance
    pub engine: EngineConfig,

    /// Fenêtre de rendu simulée
    pub viewport: Viewport,
}

/// Taille et zoom initial de la fenêtre
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            zoom: 18.0,
        }
    }
}

impl ViewerConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "hcm" => Self::load_embedded(include_str!("presets/hcm.json")),
            "hanoi" => Self::load_embedded(include_str!("presets/hanoi.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: hcm, hanoi", preset),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(name: &str) -> Result<Self> {
        match name {
            "hcm" | "hanoi" => Self::from_preset(name),
            _ => Self::load(Path::new(name)),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Caméra centrée sur un point avec le viewport configuré
    pub fn camera_at(&self, center: parcel_engine::LngLat) -> Camera {
        Camera::new(
            center,
            self.viewport.zoom,
            self.viewport.width,
            self.viewport.height,
        )
    }
}

/// Fichier de persistance : argument CLI, sinon `PARCEL_VIEWER_STORE`, sinon défaut
pub fn store_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| std::env::var_os(STORE_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
}
