//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri della finestra di dimensione
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento configurazione da file JSON (chiavi storiche maiuscole)
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `MIN_SIZE_KB`: Dimensione minima accettabile in KB (default: 100)
//! - `MAX_SIZE_KB`: Dimensione massima accettabile in KB (default: 2048)
//! - `VALID_EXTENSIONS`: Estensioni riconosciute, con punto iniziale (default: .jpg, .jpeg, .png)
//! - `BASE_DIR`: Directory base per la modalità batch (default: "./")
//! - `TARGET_FILES`: `"*"` per tutti i file riconosciuti in `BASE_DIR`, oppure un nome file
//!
//! ## Tolleranza agli errori:
//! File di configurazione mancante o JSON malformato NON sono fatali: si
//! applicano i default e si logga un warning. `min > max` invece è un errore
//! di configurazione fatale, rilevato da `validate()` all'avvio.
//!
//! La configurazione è un valore immutabile passato per argomento: nessuno
//! stato globale mutabile.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::FitError;
use crate::targeter::SizeBounds;

/// Configuration for size-window targeting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum acceptable output size in KB
    #[serde(rename = "MIN_SIZE_KB")]
    pub min_size_kb: u64,
    /// Maximum acceptable output size in KB
    #[serde(rename = "MAX_SIZE_KB")]
    pub max_size_kb: u64,
    /// Recognized image extensions, each including the leading dot
    #[serde(rename = "VALID_EXTENSIONS")]
    pub valid_extensions: Vec<String>,
    /// Base directory for batch mode
    #[serde(rename = "BASE_DIR")]
    pub base_dir: PathBuf,
    /// `"*"` for every recognized file directly inside `base_dir`, or a literal filename
    #[serde(rename = "TARGET_FILES")]
    pub target_files: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size_kb: 100,
            max_size_kb: 2048,
            valid_extensions: vec![".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()],
            base_dir: PathBuf::from("./"),
            target_files: "*".to_string(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), FitError> {
        if self.min_size_kb == 0 {
            return Err(FitError::Validation(
                "MIN_SIZE_KB must be greater than 0".to_string(),
            ));
        }

        if self.min_size_kb > self.max_size_kb {
            return Err(FitError::Validation(format!(
                "MIN_SIZE_KB ({}) must not exceed MAX_SIZE_KB ({})",
                self.min_size_kb, self.max_size_kb
            )));
        }

        if self.valid_extensions.is_empty() {
            return Err(FitError::Validation(
                "VALID_EXTENSIONS must not be empty".to_string(),
            ));
        }

        for ext in &self.valid_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(FitError::Validation(format!(
                    "Invalid extension {:?}: extensions must include the leading dot",
                    ext
                )));
            }
        }

        if self.target_files.is_empty() {
            return Err(FitError::Validation(
                "TARGET_FILES must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The inclusive size window described by this configuration.
    pub fn bounds(&self) -> SizeBounds {
        SizeBounds::new(self.min_size_kb as f64, self.max_size_kb as f64)
    }

    /// Load configuration from file, falling back to defaults.
    ///
    /// A missing file or malformed JSON is not fatal: defaults apply and a
    /// warning is logged. Validation is left to the caller so CLI overrides
    /// can be applied first.
    pub async fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            warn!(
                "No config file found at {}, using default settings",
                path.display()
            );
            return Self::default();
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Could not read config file {}: {}, using default settings",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Config file {} is not valid JSON: {}, using default settings",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.min_size_kb, 100);
        assert_eq!(config.max_size_kb, 2048);
        assert_eq!(config.valid_extensions, vec![".jpg", ".jpeg", ".png"]);
        assert_eq!(config.base_dir, PathBuf::from("./"));
        assert_eq!(config.target_files, "*");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.min_size_kb = 0;
        assert!(config.validate().is_err());

        config.min_size_kb = 4096;
        assert!(config.validate().is_err());

        config.min_size_kb = 100;
        config.valid_extensions = vec!["jpg".to_string()];
        assert!(config.validate().is_err());

        config.valid_extensions = vec![".jpg".to_string()];
        config.target_files.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_broken_window_is_a_validation_error() {
        let config = Config {
            min_size_kb: 4096,
            max_size_kb: 100,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FitError::Validation(_))
        ));
    }

    #[test]
    fn test_config_parses_historic_keys() {
        let json = r#"{
            "MIN_SIZE_KB": 50,
            "MAX_SIZE_KB": 500,
            "VALID_EXTENSIONS": [".png"],
            "BASE_DIR": "/tmp/images",
            "TARGET_FILES": "photo.png"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.min_size_kb, 50);
        assert_eq!(config.max_size_kb, 500);
        assert_eq!(config.valid_extensions, vec![".png"]);
        assert_eq!(config.base_dir, PathBuf::from("/tmp/images"));
        assert_eq!(config.target_files, "photo.png");
    }

    #[test]
    fn test_config_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"MAX_SIZE_KB": 512}"#).unwrap();
        assert_eq!(config.min_size_kb, 100);
        assert_eq!(config.max_size_kb, 512);
        assert_eq!(config.valid_extensions, vec![".jpg", ".jpeg", ".png"]);
    }

    #[tokio::test]
    async fn test_load_missing_file_yields_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/preconfig.json")).await;
        assert_eq!(config.min_size_kb, 100);
        assert_eq!(config.max_size_kb, 2048);
    }

    #[tokio::test]
    async fn test_load_malformed_json_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("preconfig.json");
        tokio::fs::write(&config_path, "{not json").await.unwrap();

        let config = Config::load_or_default(&config_path).await;
        assert_eq!(config.min_size_kb, 100);
        assert_eq!(config.max_size_kb, 2048);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("preconfig.json");

        let original = Config {
            min_size_kb: 64,
            max_size_kb: 1024,
            valid_extensions: vec![".jpg".to_string()],
            base_dir: PathBuf::from("/media"),
            target_files: "*".to_string(),
        };

        original.save_to_file(&config_path).await.unwrap();
        let loaded = Config::load_or_default(&config_path).await;

        assert_eq!(loaded.min_size_kb, 64);
        assert_eq!(loaded.max_size_kb, 1024);
        assert_eq!(loaded.valid_extensions, vec![".jpg"]);
        assert_eq!(loaded.base_dir, PathBuf::from("/media"));
    }
}
