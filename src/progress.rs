//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking della modalità batch.
//!
//! ## Responsabilità:
//! - Progress bar con `indicatif` per feedback real-time
//! - Statistiche cumulative della run (fitted, già in finestra, falliti, errori)
//! - Riepilogo finale con byte risparmiati formattati

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::file_manager::FileManager;

/// Manages progress reporting for a batch run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for one targeting run
#[derive(Debug, Default)]
pub struct FitStats {
    /// Candidates examined
    pub files_processed: usize,
    /// Candidates re-encoded into the window
    pub files_fitted: usize,
    /// Candidates already inside the window (left untouched)
    pub files_already_within: usize,
    /// Candidates no ladder level could fit
    pub files_unfittable: usize,
    /// Candidates skipped for an unrecognized extension
    pub files_skipped: usize,
    /// Candidates aborted by I/O or codec failures
    pub errors: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
}

impl FitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fitted(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_fitted += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_already_within(&mut self, size: u64) {
        self.files_processed += 1;
        self.files_already_within += 1;
        self.total_original_size += size;
    }

    pub fn add_unfittable(&mut self) {
        self.files_processed += 1;
        self.files_unfittable += 1;
    }

    pub fn add_skipped(&mut self) {
        self.files_processed += 1;
        self.files_skipped += 1;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Fitted: {} | Already within: {} | Unfittable: {} | Errors: {} | Saved: {} ({:.2}%)",
            self.files_processed,
            self.files_fitted,
            self.files_already_within,
            self.files_unfittable,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}
