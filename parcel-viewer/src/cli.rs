//! Définition et implémentation des commandes CLI
//!
//! - `center` : centre initial de la carte (dernière position ou défaut)
//! - `hover` / `click` / `drag` : une interaction sur une scène GeoJSON
//! - `replay` : rejoue un script d'événements et produit un rapport
//! - `search` : valide une recherche `"lat, lng"`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use parcel_engine::search::parse_coordinate_query;
use parcel_engine::{LngLat, Outcome, SelectionState, Tooltip, ViewState};
use tracing::{info, warn};

use crate::config::{self, ViewerConfig};
use crate::export::export_layers;
use crate::session::{load_script, ScriptEvent, Session};
use crate::store::FileStore;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the initial map center (last selected coordinate or default)
    Center {
        #[command(flatten)]
        viewer: ViewerArgs,
    },

    /// Hover a coordinate and print the tooltip
    Hover {
        #[command(flatten)]
        point: PointArgs,

        #[command(flatten)]
        viewer: ViewerArgs,
    },

    /// Click a coordinate, print the detail panel and optionally export the layers
    Click {
        #[command(flatten)]
        point: PointArgs,

        /// Output directory for the layer GeoJSON files
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        viewer: ViewerArgs,
    },

    /// Drop the marker at a coordinate (selects and re-centers)
    Drag {
        #[command(flatten)]
        point: PointArgs,

        /// Output directory for the layer GeoJSON files
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        viewer: ViewerArgs,
    },

    /// Replay a JSON event script over a scene
    Replay {
        /// Path to the scene GeoJSON
        #[arg(short, long)]
        scene: PathBuf,

        /// Path to the event script (JSON array)
        #[arg(long)]
        script: PathBuf,

        /// Save the session report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output directory for the final layer GeoJSON files
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        viewer: ViewerArgs,
    },

    /// Parse a "lat, lng" search query
    Search {
        /// Query text, e.g. "10.7755, 106.7021"
        query: String,
    },
}

/// Scène et coordonnée d'une interaction
#[derive(Args)]
pub struct PointArgs {
    /// Path to the scene GeoJSON
    #[arg(short, long)]
    pub scene: PathBuf,

    /// Longitude (WGS84)
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Latitude (WGS84)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,
}

/// Options communes
#[derive(Args)]
pub struct ViewerArgs {
    /// Config preset name (hcm/hanoi) or path to a JSON config
    #[arg(long, default_value = "hcm")]
    pub config: String,

    /// View-state file (default: $PARCEL_VIEWER_STORE or .parcel-viewer.json)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Return one copy of each feature per covered tile, like a tiled renderer
    #[arg(long)]
    pub tile_duplicates: bool,
}

impl ViewerArgs {
    fn load(&self) -> Result<(ViewerConfig, FileStore)> {
        let config = ViewerConfig::resolve(&self.config)?;
        let path = config::store_path(self.store.clone());
        let store = FileStore::open(&path)
            .with_context(|| format!("Failed to open view-state store: {}", path.display()))?;
        Ok((config, store))
    }

    fn open_session(&self, scene: &Path) -> Result<Session> {
        let (config, store) = self.load()?;
        Session::open(scene, &config, store, self.tile_duplicates)
    }
}

impl PointArgs {
    fn coordinate(&self) -> Result<LngLat> {
        let ll = LngLat::new(self.lng, self.lat);
        if !ll.is_valid() {
            anyhow::bail!("Coordinate out of range: {}, {}", self.lng, self.lat);
        }
        Ok(ll)
    }
}

/// Exécute la commande
pub fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Center { viewer } => cmd_center(&viewer),
        Commands::Hover { point, viewer } => cmd_hover(&point, &viewer),
        Commands::Click {
            point,
            output,
            viewer,
        } => cmd_select(&point, output.as_deref(), &viewer, false),
        Commands::Drag {
            point,
            output,
            viewer,
        } => cmd_select(&point, output.as_deref(), &viewer, true),
        Commands::Replay {
            scene,
            script,
            report,
            output,
            viewer,
        } => cmd_replay(
            &scene,
            &script,
            report.as_deref(),
            output.as_deref(),
            &viewer,
        ),
        Commands::Search { query } => cmd_search(&query),
    }
}

fn cmd_center(viewer: &ViewerArgs) -> Result<()> {
    let (config, store) = viewer.load()?;
    let view_state = ViewState::from_config(&config.engine);
    let center = view_state.initial_center(&store, config.engine.default_center);
    println!("{}", center.display_6());
    Ok(())
}

fn cmd_hover(point: &PointArgs, viewer: &ViewerArgs) -> Result<()> {
    let at = point.coordinate()?;
    let mut session = viewer.open_session(&point.scene)?;
    session.apply(&ScriptEvent::Loaded);
    session.look_at(at);
    let outcome = session.apply(&ScriptEvent::Hover {
        lng: at.lng,
        lat: at.lat,
    });

    match session.engine().tooltip() {
        Some(tooltip) if outcome.as_ref().is_some_and(Outcome::is_match) => {
            print_tooltip(tooltip)
        }
        _ => println!("No parcel under {}", at.display_6()),
    }
    Ok(())
}

fn cmd_select(
    point: &PointArgs,
    output: Option<&Path>,
    viewer: &ViewerArgs,
    drag: bool,
) -> Result<()> {
    let at = point.coordinate()?;
    let mut session = viewer.open_session(&point.scene)?;
    session.apply(&ScriptEvent::Loaded);
    let event = if drag {
        ScriptEvent::Drag {
            lng: at.lng,
            lat: at.lat,
        }
    } else {
        ScriptEvent::Click {
            lng: at.lng,
            lat: at.lat,
        }
    };
    let outcome = session.apply(&event);

    match (outcome, session.engine().selection()) {
        (Some(Outcome::Matched(_)), Some(selection)) => print_selection(selection),
        (Some(Outcome::Empty(reason)), _) => {
            println!("No parcel under {} ({:?})", at.display_6(), reason)
        }
        _ => println!("No parcel under {}", at.display_6()),
    }

    if let Some(output) = output {
        let engine = session.engine();
        export_layers(
            engine.renderer(),
            &engine.config().layers,
            engine.selection(),
            output,
        )?;
    }
    Ok(())
}

fn cmd_replay(
    scene: &Path,
    script: &Path,
    report_path: Option<&Path>,
    output: Option<&Path>,
    viewer: &ViewerArgs,
) -> Result<()> {
    let events = load_script(script)?;
    info!(
        scene = %scene.display(),
        script = %script.display(),
        events = events.len(),
        "Replaying session"
    );

    let mut session = viewer.open_session(scene)?;
    if !events.iter().any(|e| *e == ScriptEvent::Loaded) {
        warn!("Script has no loaded event, every pointer event will be ignored");
    }
    session.replay(&events);

    let (report, engine) = session.finish();
    report.display();

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to save report: {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    if let Some(output) = output {
        export_layers(
            engine.renderer(),
            &engine.config().layers,
            engine.selection(),
            output,
        )?;
    }

    info!("{}", report.summary());
    Ok(())
}

fn cmd_search(query: &str) -> Result<()> {
    let target = parse_coordinate_query(query)?;
    println!("{}", target.display_6());
    Ok(())
}

fn print_tooltip(tooltip: &Tooltip) {
    println!("Land use: {}", tooltip.land_use);
    println!("Tờ: {} - Thửa: {}", tooltip.sheet_number, tooltip.lot_number);
    println!("Address: {}", tooltip.address);
}

fn print_selection(selection: &SelectionState) {
    println!("\n{}", "=".repeat(60));
    println!(
        "Tờ {} - Thửa {}",
        selection.sheet_number, selection.lot_number
    );
    println!("{}", "=".repeat(60));
    println!("Address: {}", selection.address);
    println!("Coordinate: {}", selection.coordinate_text());
    println!("Area: {} m²", selection.total_area_text());

    if !selection.land_use.is_empty() {
        println!("\n--- LAND USE ---");
        for row in &selection.land_use {
            println!(
                "  [{}] {}: {} m²",
                row.color.triple(),
                row.label,
                row.area_text()
            );
        }
    }
}
