//! # Imgfit - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento configurazione JSON + override da preset/CLI
//! - Dispatch tra modalità interattiva (browser) e batch
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (config path, preset, override, interactive)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica la configurazione (file mancante/malformato → default)
//! 4. Applica preset nominato e override, poi valida (min ≤ max è fatale)
//! 5. Interattivo: browser → singolo file; altrimenti batch su BASE_DIR
//!
//! ## Esempio di utilizzo:
//! ```bash
//! imgfit --config ./preconfig.json --verbose
//! imgfit --interactive --preset web
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use imgfit::file_manager::FileManager;
use imgfit::{Config, DirectoryScanner, FitOutcome, ImageFitter, PresetStore};

#[derive(Parser)]
#[command(name = "imgfit")]
#[command(about = "Fit images into a target size window by stepping down JPEG quality")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "./preconfig.json")]
    config: PathBuf,

    /// Pick the image interactively with the terminal browser
    #[arg(short, long)]
    interactive: bool,

    /// Named size preset to apply on top of the configuration
    #[arg(short, long)]
    preset: Option<String>,

    /// Minimum acceptable output size in KB (overrides config)
    #[arg(long)]
    min_kb: Option<u64>,

    /// Maximum acceptable output size in KB (overrides config)
    #[arg(long)]
    max_kb: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(&args.config).await;

    if let Some(ref name) = args.preset {
        let store = PresetStore::open_default().await?;
        let preset = store
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown preset {:?} (available: {:?})", name, store.names()))?;
        config.min_size_kb = preset.min_size_kb;
        config.max_size_kb = preset.max_size_kb;
        info!("Applied preset {:?}: {}-{} KB", name, preset.min_size_kb, preset.max_size_kb);
    }

    if let Some(min_kb) = args.min_kb {
        config.min_size_kb = min_kb;
    }
    if let Some(max_kb) = args.max_kb {
        config.max_size_kb = max_kb;
    }

    // The only fatal failure mode: a broken size window.
    config.validate()?;

    let fitter = ImageFitter::new(config.clone())?;

    if args.interactive {
        let scanner = DirectoryScanner::new(config.valid_extensions.clone());
        let start_dir = std::env::current_dir()?;

        // The browser blocks on every keypress; keep it off the runtime.
        let selected =
            tokio::task::spawn_blocking(move || imgfit::navigator::run_navigator(scanner, start_dir))
                .await??;

        match selected {
            Some(path) => match fitter.process_one(&path).await {
                Ok(outcome) => report_outcome(&outcome),
                // Skipped/unfittable candidates are reported, not fatal.
                Err(e) if e.is_per_candidate() => warn!("{}", e),
                Err(e) => return Err(e.into()),
            },
            None => info!("Selection cancelled"),
        }
    } else {
        fitter.process_all().await?;
    }

    Ok(())
}

fn report_outcome(outcome: &FitOutcome) {
    match *outcome {
        FitOutcome::AlreadyWithin { size_bytes } => {
            info!(
                "File is within the size limits at {}",
                FileManager::format_size(size_bytes)
            );
        }
        FitOutcome::Compressed {
            quality,
            initial_bytes,
            final_bytes,
        } => {
            info!(
                "Compressed {} -> {} at quality {}",
                FileManager::format_size(initial_bytes),
                FileManager::format_size(final_bytes),
                quality
            );
        }
    }
}
