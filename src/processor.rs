//! # Image Fitter Orchestrator
//!
//! Orchestratore principale: valida la configurazione e processa un singolo
//! candidato (`process_one`) o tutti i candidati della base directory
//! (`process_all`). Due entry point espliciti, nessuna auto-chiamata
//! ricorsiva con sentinelle.
//!
//! La modalità batch è strettamente sequenziale: un candidato alla volta in
//! ordine di listing, e il fallimento di un candidato non interrompe mai gli
//! altri. Solo un errore di configurazione è fatale per l'intera invocazione.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::FitError;
use crate::file_manager::FileManager;
use crate::progress::{FitStats, ProgressManager};
use crate::targeter::{FitOutcome, ImageCandidate, SizeTargeter};

/// Drives size targeting over one file or a whole directory.
pub struct ImageFitter {
    config: Config,
    targeter: SizeTargeter,
}

impl ImageFitter {
    /// Build a fitter from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let targeter = SizeTargeter::new(config.bounds());
        Ok(Self { config, targeter })
    }

    /// Run the ladder search for a single candidate path.
    pub async fn process_one(&self, path: &Path) -> Result<FitOutcome, FitError> {
        let candidate = ImageCandidate::prepare(path, &self.config.valid_extensions).await?;
        info!(
            "{}: initial size {:.2} KB",
            candidate.source_path.display(),
            candidate.size_kb()
        );
        self.targeter.target_size(&candidate).await
    }

    /// Process every target in the base directory, one at a time, in listing
    /// order. Per-candidate failures are reported and iteration continues.
    pub async fn process_all(&self) -> Result<FitStats> {
        let targets = self.resolve_targets()?;
        let mut stats = FitStats::new();

        info!(
            "Targeting {} file(s) in {} into the {}-{} KB window",
            targets.len(),
            self.config.base_dir.display(),
            self.config.min_size_kb,
            self.config.max_size_kb
        );

        if targets.is_empty() {
            info!("No matching files found to process");
            return Ok(stats);
        }

        let progress = ProgressManager::new(targets.len() as u64);

        for path in &targets {
            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();

            match self.process_one(path).await {
                Ok(FitOutcome::AlreadyWithin { size_bytes }) => {
                    stats.add_already_within(size_bytes);
                    progress.update(&format!("✅ {}: already within window", name));
                }
                Ok(FitOutcome::Compressed {
                    quality,
                    initial_bytes,
                    final_bytes,
                }) => {
                    stats.add_fitted(initial_bytes, final_bytes);
                    progress.update(&format!(
                        "✅ {}: {} -> {} (quality {})",
                        name,
                        FileManager::format_size(initial_bytes),
                        FileManager::format_size(final_bytes),
                        quality
                    ));
                }
                Err(e @ FitError::UnrecognizedFormat(_)) => {
                    warn!("{}", e);
                    stats.add_skipped();
                    progress.update(&format!("⏭️ {}: unrecognized format", name));
                }
                Err(e @ FitError::LadderExhausted { .. }) => {
                    warn!("{}", e);
                    stats.add_unfittable();
                    progress.update(&format!("❌ {}: no quality level fits", name));
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", path.display(), e);
                    stats.add_error();
                    progress.update(&format!("❌ {}: error", name));
                }
            }
        }

        progress.finish(&stats.format_summary());
        self.log_final_stats(&stats);
        Ok(stats)
    }

    /// Expand the configured target selector into concrete paths.
    ///
    /// `"*"` means every recognized file directly inside the base directory
    /// (non-recursive); anything else is a literal filename joined to it.
    fn resolve_targets(&self) -> Result<Vec<PathBuf>> {
        if self.config.target_files == "*" {
            FileManager::find_candidate_files(&self.config.base_dir, &self.config.valid_extensions)
        } else {
            Ok(vec![self.config.base_dir.join(&self.config.target_files)])
        }
    }

    fn log_final_stats(&self, stats: &FitStats) {
        info!("=== Targeting Complete ===");
        info!("Files processed: {}", stats.files_processed);
        info!("Files fitted: {}", stats.files_fitted);
        info!("Files already within window: {}", stats.files_already_within);
        info!("Files no ladder level could fit: {}", stats.files_unfittable);
        info!("Files skipped: {}", stats.files_skipped);
        info!("Errors: {}", stats.errors);
        info!(
            "Bytes saved: {}",
            FileManager::format_size(stats.total_bytes_saved)
        );
    }
}
