//! Sélection persistante d'un groupe de parcelles
//!
//! Le pipeline possède la couche de sélection, les couches de cotes et d'aires, le marqueur
//! et l'écriture de la dernière position. Chaque couche est remplacée d'un seul appel.

use tracing::{debug, warn};

use crate::address::resolve_address;
use crate::config::EngineConfig;
use crate::correlator::{correlate, Correlation, Outcome};
use crate::geometry::{LngLat, Pixel};
use crate::labels::{area_collection, area_labels, length_collection, length_labels};
use crate::model::SelectionState;
use crate::renderer::{empty_collection, MapRenderer, PaintValue};
use crate::view_state::{KeyValueStore, ViewState};

/// Pipeline de sélection
#[derive(Debug, Default)]
pub struct SelectionPipeline {
    state: Option<SelectionState>,
    panel_open: bool,
    marker: Option<LngLat>,
}

impl SelectionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sélection courante (lecture seule pour le panneau de détail)
    pub fn state(&self) -> Option<&SelectionState> {
        self.state.as_ref()
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Position courante du marqueur
    pub fn marker(&self) -> Option<LngLat> {
        self.marker
    }

    /// Ferme le panneau sans effacer les couches
    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    /// Place le marqueur sans sélection (démarrage)
    pub fn place_marker<R: MapRenderer + ?Sized>(&mut self, renderer: &mut R, at: LngLat) {
        renderer.move_marker(at);
        self.marker = Some(at);
    }

    /// Traite un clic au pixel `pixel`, de coordonnée `lng_lat`
    pub fn on_click<R, S>(
        &mut self,
        renderer: &mut R,
        store: &mut S,
        view_state: &ViewState,
        pixel: Pixel,
        lng_lat: LngLat,
        config: &EngineConfig,
    ) -> Outcome
    where
        R: MapRenderer + ?Sized,
        S: KeyValueStore + ?Sized,
    {
        let layers = &config.layers;

        let group = match correlate(&*renderer, pixel, config) {
            Correlation::Group(group) => group,
            Correlation::Empty(reason) => {
                // Marqueur et position persistée restent inchangés
                self.panel_open = false;
                self.state = None;
                for layer in [&layers.selection, &layers.length_labels, &layers.area_labels] {
                    renderer.set_layer_data(layer, empty_collection());
                }
                debug!(?reason, "Selection cleared");
                return Outcome::Empty(reason);
            }
        };

        // 1. Contours
        renderer.set_layer_data(&layers.selection, group.outline_collection());
        renderer.set_paint_property(
            &layers.selection,
            "fill-color",
            PaintValue::Color(group.color.css()),
        );

        // 2-3. Cotes et aires, une fois les doublons écartés par le corrélateur
        let lengths = length_labels(&group.sub_parcels);
        let areas = area_labels(&group.sub_parcels);
        renderer.set_layer_data(&layers.length_labels, length_collection(&lengths));
        renderer.set_layer_data(&layers.area_labels, area_collection(&areas));

        // 4. Panneau
        let primary = group.primary();
        let address = resolve_address(&*renderer, pixel, primary, config);
        self.state = Some(SelectionState {
            group_id: group.group_id.clone(),
            address,
            sheet_number: primary.sheet_number.clone(),
            lot_number: primary.lot_number.clone(),
            coordinate: lng_lat,
            land_use: group.land_use_rows(),
        });
        self.panel_open = true;

        // 5. Marqueur
        renderer.move_marker(lng_lat);
        self.marker = Some(lng_lat);

        // 6. Persistance : un échec d'écriture n'annule pas la sélection
        if let Err(e) = view_state.save(store, lng_lat) {
            warn!(error = %e, "Failed to persist view state");
        }

        debug!(
            group = %group.group_id,
            sub_parcels = group.sub_parcels.len(),
            length_labels = lengths.len(),
            area_labels = areas.len(),
            "Parcel group selected"
        );

        Outcome::Matched(group.group_id)
    }

    /// Fin de glisser du marqueur : équivaut à un clic au point de dépôt, puis recentrage
    pub fn on_marker_drag_end<R, S>(
        &mut self,
        renderer: &mut R,
        store: &mut S,
        view_state: &ViewState,
        lng_lat: LngLat,
        config: &EngineConfig,
    ) -> Outcome
    where
        R: MapRenderer + ?Sized,
        S: KeyValueStore + ?Sized,
    {
        let pixel = renderer.project(lng_lat);
        let outcome = self.on_click(renderer, store, view_state, pixel, lng_lat, config);
        renderer.pan_to(lng_lat);
        outcome
    }
}
