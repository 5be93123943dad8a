//! Session d'interaction : moteur + scène + stockage fichier
//!
//! Un script de session est un tableau JSON d'événements :
//!
//! ```json
//! [
//!   {"type": "loaded"},
//!   {"type": "hover", "lng": 106.70005, "lat": 10.78005},
//!   {"type": "click", "lng": 106.70005, "lat": 10.78005},
//!   {"type": "drag", "lng": 106.7001, "lat": 10.7800},
//!   {"type": "search", "query": "10.7800, 106.7001"},
//!   {"type": "close_panel"}
//! ]
//! ```

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use parcel_engine::{LngLat, MapEvent, MapRenderer, Outcome, ParcelEngine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::report::{Interaction, SessionReport};
use crate::scene::SceneRenderer;
use crate::store::FileStore;

/// Événement d'un script de session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Loaded,
    Hover { lng: f64, lat: f64 },
    Click { lng: f64, lat: f64 },
    Drag { lng: f64, lat: f64 },
    Search { query: String },
    ClosePanel,
}

impl ScriptEvent {
    fn coordinate(&self) -> Option<LngLat> {
        match *self {
            Self::Hover { lng, lat } | Self::Click { lng, lat } | Self::Drag { lng, lat } => {
                Some(LngLat::new(lng, lat))
            }
            _ => None,
        }
    }
}

/// Charge et valide un script de session
pub fn load_script(path: &Path) -> Result<Vec<ScriptEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let events: Vec<ScriptEvent> =
        serde_json::from_str(&content).context("Failed to parse script JSON")?;

    for (index, event) in events.iter().enumerate() {
        if let Some(ll) = event.coordinate().filter(|ll| !ll.is_valid()) {
            anyhow::bail!(
                "Event #{} has an out-of-range coordinate: {}, {}",
                index,
                ll.lng,
                ll.lat
            );
        }
    }
    Ok(events)
}

/// Session rejouable sur une scène
pub struct Session {
    engine: ParcelEngine<SceneRenderer, FileStore>,
    report: SessionReport,
    started: Instant,
}

impl Session {
    /// Ouvre une session : lit la dernière position, y place marqueur et caméra
    pub fn open(
        scene_path: &Path,
        config: &ViewerConfig,
        store: FileStore,
        tile_duplicates: bool,
    ) -> Result<Self> {
        let camera = config.camera_at(config.engine.default_center);
        let mut renderer = SceneRenderer::load(scene_path, camera)?;
        renderer.set_tile_duplicates(tile_duplicates);

        let name = scene_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::with_renderer(&name, renderer, config, store))
    }

    /// Session sur un moteur de rendu déjà construit
    pub fn with_renderer(
        name: &str,
        renderer: SceneRenderer,
        config: &ViewerConfig,
        store: FileStore,
    ) -> Self {
        let mut engine = ParcelEngine::new(renderer, store, config.engine.clone());
        let center = engine.start();
        engine.renderer_mut().jump_to(center);
        info!(scene = name, lng = center.lng, lat = center.lat, "Session opened");

        Self {
            engine,
            report: SessionReport::new(name),
            started: Instant::now(),
        }
    }

    /// Rejoue un événement et l'enregistre dans le rapport
    pub fn apply(&mut self, event: &ScriptEvent) -> Option<Outcome> {
        let outcome = match *event {
            ScriptEvent::Loaded => {
                self.engine.handle(MapEvent::Loaded);
                self.report.record_control();
                return None;
            }
            ScriptEvent::ClosePanel => {
                self.engine.close_panel();
                self.report.record_control();
                return None;
            }
            ScriptEvent::Search { ref query } => {
                let result = self.engine.search(query);
                let error = result.as_ref().err().map(|e| e.to_string());
                self.report.record_search(query, error.as_deref());
                return None;
            }
            // Le survol ne déplace jamais la vue : hors écran, il ne touche rien
            ScriptEvent::Hover { lng, lat } => {
                let lng_lat = LngLat::new(lng, lat);
                let pixel = self.engine.renderer().project(lng_lat);
                let outcome = self.engine.handle(MapEvent::PointerMove { pixel, lng_lat });
                self.report
                    .record_outcome(Interaction::Hover, outcome.as_ref());
                outcome
            }
            ScriptEvent::Click { lng, lat } => {
                let lng_lat = self.reveal(LngLat::new(lng, lat));
                let pixel = self.engine.renderer().project(lng_lat);
                let outcome = self.engine.handle(MapEvent::Click { pixel, lng_lat });
                self.report
                    .record_outcome(Interaction::Click, outcome.as_ref());
                outcome
            }
            ScriptEvent::Drag { lng, lat } => {
                let lng_lat = self.reveal(LngLat::new(lng, lat));
                let outcome = self.engine.handle(MapEvent::MarkerDragEnd { lng_lat });
                self.report
                    .record_outcome(Interaction::Drag, outcome.as_ref());
                outcome
            }
        };
        debug!(?event, ?outcome, "Event replayed");
        outcome
    }

    /// Recentre la caméra avant un clic ou un dépôt hors écran : un pointeur ne peut viser
    /// que ce qui est affiché
    fn reveal(&mut self, lng_lat: LngLat) -> LngLat {
        if !self.engine.renderer().camera().contains(lng_lat) {
            debug!(lng = lng_lat.lng, lat = lng_lat.lat, "Coordinate off screen, camera moved");
            self.look_at(lng_lat);
        }
        lng_lat
    }

    /// Centre la vue sur une coordonnée, sans événement moteur
    pub fn look_at(&mut self, center: LngLat) {
        self.engine.renderer_mut().jump_to(center);
    }

    /// Rejoue une suite d'événements
    pub fn replay(&mut self, events: &[ScriptEvent]) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn engine(&self) -> &ParcelEngine<SceneRenderer, FileStore> {
        &self.engine
    }

    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    /// Termine la session et rend le rapport finalisé
    pub fn finish(mut self) -> (SessionReport, ParcelEngine<SceneRenderer, FileStore>) {
        self.report.set_duration(self.started.elapsed());
        self.report.finalize();
        (self.report, self.engine)
    }
}
