//! # parcel-engine
//!
//! Moteur d'interaction et de mesure pour une carte cadastrale en tuiles vectorielles.
//!
//! ## Features
//!
//! - Corrélation pixel → groupe de parcelles (sous-parcelles dédoublonnées + contours parents)
//! - Surbrillance au survol avec infobulle (usage du sol, tờ/thửa, adresse)
//! - Sélection au clic : contours, cotes d'arêtes, aires, panneau de détail, marqueur
//! - Adresse composée depuis les points d'adresse et les attributs de parcelle
//! - Dernière position persistée avec expiration (12 mois)
//!
//! Le moteur ne parle à la carte qu'à travers le trait [`MapRenderer`] et reçoit ses
//! événements sous forme de [`MapEvent`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parcel_engine::{EngineConfig, MapEvent, MemoryStore, ParcelEngine};
//!
//! let mut engine = ParcelEngine::new(renderer, MemoryStore::new(), EngineConfig::default());
//! let center = engine.start();
//! engine.handle(MapEvent::Loaded);
//! engine.handle(MapEvent::Click { pixel, lng_lat });
//!
//! if let Some(selection) = engine.selection() {
//!     println!("Tờ {} - Thửa {}: {}", selection.sheet_number, selection.lot_number, selection.address);
//! }
//! ```

pub mod address;
pub mod config;
pub mod correlator;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hover;
pub mod identity;
pub mod labels;
pub mod model;
pub mod renderer;
pub mod search;
pub mod selection;
pub mod view_state;

#[cfg(test)]
mod testing;

pub use config::{AttributeConfig, EngineConfig, LayerConfig};
pub use correlator::{correlate, Correlation, EmptyReason, Outcome};
pub use engine::ParcelEngine;
pub use error::EngineError;
pub use geometry::{LngLat, Pixel};
pub use hover::Tooltip;
pub use labels::{AreaLabel, LengthLabel};
pub use model::{GroupId, LandUseRow, Parcel, ParcelGroup, RenderedFeature, Rgb, SelectionState};
pub use renderer::{
    empty_collection, LayerFilter, MapEvent, MapRenderer, PaintValue, QueryArea, SourceQuery,
};
pub use view_state::{KeyValueStore, MemoryStore, ViewState};
