//! Machine à états de l'interaction carte
//!
//! Reçoit les événements de la carte sous forme de [`MapEvent`] et les distribue aux deux
//! pipelines indépendants (survol, sélection). Tant que la carte n'a pas signalé son
//! chargement, les événements pointeur sont ignorés.

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::correlator::Outcome;
use crate::error::EngineError;
use crate::geometry::LngLat;
use crate::hover::{HoverPipeline, Tooltip};
use crate::model::SelectionState;
use crate::renderer::{MapEvent, MapRenderer};
use crate::search::parse_coordinate_query;
use crate::selection::SelectionPipeline;
use crate::view_state::{KeyValueStore, ViewState};

/// Moteur d'interaction sur une carte de parcelles
pub struct ParcelEngine<R: MapRenderer, S: KeyValueStore> {
    renderer: R,
    store: S,
    config: EngineConfig,
    view_state: ViewState,
    hover: HoverPipeline,
    selection: SelectionPipeline,
    loaded: bool,
}

impl<R: MapRenderer, S: KeyValueStore> ParcelEngine<R, S> {
    pub fn new(renderer: R, store: S, config: EngineConfig) -> Self {
        let view_state = ViewState::from_config(&config);
        Self {
            renderer,
            store,
            config,
            view_state,
            hover: HoverPipeline::new(),
            selection: SelectionPipeline::new(),
            loaded: false,
        }
    }

    /// Démarrage : lit la dernière position une seule fois et y place le marqueur
    ///
    /// Retourne le centre initial de la caméra.
    pub fn start(&mut self) -> LngLat {
        let center = self
            .view_state
            .initial_center(&self.store, self.config.default_center);
        self.selection.place_marker(&mut self.renderer, center);
        info!(lng = center.lng, lat = center.lat, "Initial map center");
        center
    }

    /// Traite un événement de la carte
    ///
    /// Retourne le résultat du pipeline déclenché, `None` si l'événement a été ignoré.
    pub fn handle(&mut self, event: MapEvent) -> Option<Outcome> {
        if let MapEvent::Loaded = event {
            self.loaded = true;
            debug!("Map loaded, accepting pointer events");
            return None;
        }
        if !self.loaded {
            debug!(?event, "Map not loaded yet, event ignored");
            return None;
        }

        let outcome = match event {
            MapEvent::PointerMove { pixel, lng_lat } => {
                self.hover
                    .on_pointer_move(&mut self.renderer, pixel, lng_lat, &self.config)
            }
            MapEvent::Click { pixel, lng_lat } => self.selection.on_click(
                &mut self.renderer,
                &mut self.store,
                &self.view_state,
                pixel,
                lng_lat,
                &self.config,
            ),
            MapEvent::MarkerDragEnd { lng_lat } => self.selection.on_marker_drag_end(
                &mut self.renderer,
                &mut self.store,
                &self.view_state,
                lng_lat,
                &self.config,
            ),
            MapEvent::Loaded => return None,
        };
        Some(outcome)
    }

    /// Recherche `"lat, lng"` : vol de la caméra vers la coordonnée
    ///
    /// Ne modifie ni la sélection ni la position persistée.
    pub fn search(&mut self, query: &str) -> Result<LngLat, EngineError> {
        let target = parse_coordinate_query(query)?;
        self.renderer.fly_to(target, self.config.search_zoom);
        info!(lng = target.lng, lat = target.lat, "Flying to searched coordinate");
        Ok(target)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Sélection exposée au panneau de détail
    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.state()
    }

    pub fn is_panel_open(&self) -> bool {
        self.selection.is_panel_open()
    }

    pub fn close_panel(&mut self) {
        self.selection.close_panel();
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.hover.tooltip()
    }

    pub fn marker(&self) -> Option<LngLat> {
        self.selection.marker()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rend le moteur de rendu et le stockage
    pub fn into_parts(self) -> (R, S) {
        (self.renderer, self.store)
    }
}
