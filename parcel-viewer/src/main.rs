//! Point d'entrée CLI pour parcel-viewer

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

use parcel_viewer::cli::{self, Commands};

/// Charge `.env` (répertoire courant, puis celui du binaire) et retourne le fichier lu
///
/// Le journal n'est pas encore initialisé ici : l'appelant trace le résultat.
fn load_env() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }
    let path = std::env::current_exe().ok()?.parent()?.join(".env");
    dotenvy::from_path(&path).ok().map(|()| path)
}

/// Rejouer des interactions de carte cadastrale sur une scène GeoJSON
#[derive(Parser)]
#[command(name = "parcel-viewer")]
#[command(author, version)]
#[command(about = "Survol, sélection et mesures de parcelles cadastrales sur une scène GeoJSON")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // .env avant tout : PARCEL_VIEWER_STORE et RUST_LOG peuvent y être définis
    let env_file = load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match env_file {
        Some(path) => debug!(path = %path.display(), "Environment file loaded"),
        None => debug!("No environment file"),
    }
    if let Ok(store) = std::env::var("PARCEL_VIEWER_STORE") {
        debug!(store = %store, "View-state store set from environment");
    }

    cli::run(cli.command)
}

/// `RUST_LOG` prime ; sinon le niveau issu de -v/-q s'applique aux deux crates du workspace,
/// les dépendances restent à `warn`
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,parcel_viewer={level},parcel_engine={level}"))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(verbose > 0)
        .without_time()
        .init();
}
