//! # parcel-viewer
//!
//! Hôte « sans écran » du moteur `parcel-engine` : une scène GeoJSON tient lieu de carte en
//! tuiles vectorielles, un fichier JSON tient lieu de stockage du navigateur.
//!
//! - [`scene::SceneRenderer`] : implémentation de `MapRenderer` (projection Web Mercator,
//!   test de point dans polygone)
//! - [`store::FileStore`] : stockage clé/valeur avec expiration
//! - [`session::Session`] : rejoue des événements et alimente un [`report::SessionReport`]
//! - [`export`] : couches du moteur écrites en GeoJSON
//!
//! ## Usage CLI
//!
//! ```bash
//! parcel-viewer click --scene ./district1.geojson --lng 106.70005 --lat 10.78005 --output ./layers/
//! parcel-viewer replay --scene ./district1.geojson --script ./session.json --report ./report.json
//! parcel-viewer center
//! ```

pub mod cli;
pub mod config;
pub mod export;
pub mod mercator;
pub mod report;
pub mod scene;
pub mod session;
pub mod store;

pub use config::ViewerConfig;
pub use report::SessionReport;
pub use scene::SceneRenderer;
pub use session::{ScriptEvent, Session};
pub use store::FileStore;
