//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery dei candidati.
//!
//! ## Responsabilità:
//! - Sanitizzazione dei nomi file (stem → `[A-Za-z0-9_]`, estensione minuscola)
//! - Rinomina in-place al nome sanitizzato prima di ogni misurazione
//! - Filtro estensioni case-insensitive sul set configurato
//! - Discovery NON ricorsiva dei candidati in una directory (batch mode)
//! - Utilità per misurazione in KB e formattazione human-readable
//!
//! ## Semantica KB:
//! "KB" è sempre `bytes / 1024.0` (kibibyte binario), mai decimale.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Manages file naming, filtering and discovery
pub struct FileManager;

impl FileManager {
    /// Sanitize a file name: stem characters outside `[A-Za-z0-9_]` become
    /// `_` and the extension is lower-cased.
    ///
    /// Idempotent: an already sanitized name comes back unchanged.
    /// `"a b!.PNG"` becomes `"a_b_.png"`.
    pub fn sanitize_file_name(file_name: &str) -> String {
        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let clean: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();

        match path.extension() {
            Some(ext) => format!("{}.{}", clean, ext.to_string_lossy().to_lowercase()),
            None => clean,
        }
    }

    /// Rename a file in place to its sanitized name, returning the new path.
    ///
    /// The rename is unconditional for every processed candidate, even when
    /// no compression turns out to be needed. A no-op when the name is
    /// already sanitized.
    pub async fn apply_sanitized_name(path: &Path) -> Result<PathBuf> {
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Path has no file name: {}", path.display()))?
            .to_string_lossy()
            .into_owned();

        let sanitized = Self::sanitize_file_name(&file_name);
        if sanitized == file_name {
            return Ok(path.to_path_buf());
        }

        let sanitized_path = path.with_file_name(&sanitized);
        fs::rename(path, &sanitized_path).await?;
        Ok(sanitized_path)
    }

    /// Check whether a path's extension (case-insensitive, with leading dot)
    /// is in the configured recognized set.
    pub fn is_recognized(path: &Path, extensions: &[String]) -> bool {
        let ext = match path.extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
            None => return false,
        };
        extensions.iter().any(|e| e.to_lowercase() == ext)
    }

    /// File size in binary kilobytes.
    pub fn size_kb(bytes: u64) -> f64 {
        bytes as f64 / 1024.0
    }

    /// Size in bytes of a file on disk.
    pub async fn file_size_bytes(path: &Path) -> Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Find all recognized image files directly inside a directory.
    ///
    /// Non-recursive by design: batch mode processes only the flat contents
    /// of the base directory, in listing order.
    pub fn find_candidate_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if Self::is_recognized(path, extensions) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
