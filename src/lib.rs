//! # Imgfit Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione JSON e validazione parametri
//! - `error`: Tipi di errore custom per le diverse operazioni
//! - `ladder`: Scala fissa di livelli di qualità JPEG (95 → 15)
//! - `file_manager`: Sanitizzazione nomi, filtro estensioni, discovery file
//! - `targeter`: Ricerca della qualità che porta il file nella finestra di dimensione
//! - `scanner`: Listing directory per il browser (cartelle + immagini riconosciute)
//! - `navigator`: Browser interattivo da terminale per scegliere un'immagine
//! - `presets`: Preset nominati di finestre di dimensione, persistiti su disco
//! - `progress`: Progress tracking e statistiche
//! - `processor`: Orchestratore (singolo file o batch su directory)
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use imgfit::{Config, ImageFitter};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::default();
//! let fitter = ImageFitter::new(config)?;
//! let stats = fitter.process_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod ladder;
pub mod navigator;
pub mod presets;
pub mod processor;
pub mod progress;
pub mod scanner;
pub mod targeter;

pub use config::Config;
pub use error::FitError;
pub use navigator::{Navigator, NavigatorEvent, NavigatorOutcome};
pub use presets::{PresetStore, SizePreset};
pub use processor::ImageFitter;
pub use scanner::{BrowserEntry, DirectoryScanner};
pub use targeter::{FitOutcome, ImageCandidate, SizeBounds, SizeTargeter};
