//! # Size Preset Module
//!
//! Preset nominati di finestre di dimensione, persistiti come lookup
//! chiave-valore in un file JSON nella config directory dell'utente.
//!
//! ## Strategia di persistence:
//! - Un unico file `presets.json` in `~/.config/imgfit/` (via `dirs`)
//! - Caricamento tollerante: file corrotto → store vuoto
//! - Nessun design di persistence oltre il lookup piatto

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A named size window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePreset {
    pub min_size_kb: u64,
    pub max_size_kb: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct PresetFile {
    presets: HashMap<String, SizePreset>,
}

/// Flat key-value store of named size presets.
pub struct PresetStore {
    store_path: PathBuf,
    contents: PresetFile,
}

impl PresetStore {
    /// Open the per-user preset store, creating its directory if needed.
    pub async fn open_default() -> Result<Self> {
        let store_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find user config directory"))?
            .join("imgfit");
        Self::open_at(store_dir.join("presets.json")).await
    }

    /// Open a preset store at an explicit path.
    pub async fn open_at(store_path: PathBuf) -> Result<Self> {
        if let Some(parent) = store_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = if store_path.exists() {
            let raw = fs::read_to_string(&store_path).await?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            PresetFile::default()
        };

        Ok(Self {
            store_path,
            contents,
        })
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Option<SizePreset> {
        self.contents.presets.get(name).copied()
    }

    /// Insert or replace a preset.
    pub fn set(&mut self, name: &str, preset: SizePreset) {
        self.contents.presets.insert(name.to_string(), preset);
    }

    /// All preset names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.contents.presets.keys().cloned().collect();
        names.sort();
        names
    }

    /// Persist the store to disk.
    pub async fn save(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.contents)?;
        fs::write(&self.store_path, raw).await?;
        Ok(())
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}
