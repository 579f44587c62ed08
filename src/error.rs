//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce l'enum `FitError` per categorizzare gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori di decodifica/codifica immagini
//! - `UnrecognizedFormat`: Estensione fuori dal set configurato (non fatale, il file viene saltato)
//! - `LadderExhausted`: Nessun livello di qualità porta il file nella finestra (non fatale in batch)
//! - `Validation`: Errori di configurazione (fatali solo all'avvio)

use std::path::PathBuf;

/// Custom error types for size-window targeting
#[derive(thiserror::Error, Debug)]
pub enum FitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unrecognized image format: {0}")]
    UnrecognizedFormat(String),

    #[error(
        "Unable to fit {} into the {min_kb:.0}-{max_kb:.0} KB window at any ladder quality",
        .path.display()
    )]
    LadderExhausted {
        path: PathBuf,
        min_kb: f64,
        max_kb: f64,
    },

    #[error("Configuration error: {0}")]
    Validation(String),
}

impl FitError {
    /// Failures that skip the current candidate without aborting the
    /// invocation. Only configuration and I/O failures stay fatal.
    pub fn is_per_candidate(&self) -> bool {
        matches!(
            self,
            FitError::UnrecognizedFormat(_) | FitError::LadderExhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_per_candidate_failures_do_not_abort() {
        assert!(FitError::UnrecognizedFormat("notes.txt".to_string()).is_per_candidate());
        assert!(FitError::LadderExhausted {
            path: PathBuf::from("tiny.jpg"),
            min_kb: 100.0,
            max_kb: 2048.0,
        }
        .is_per_candidate());
    }

    #[test]
    fn test_fatal_failures_abort() {
        let io = FitError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!io.is_per_candidate());
        assert!(!FitError::Validation("MIN_SIZE_KB must not exceed MAX_SIZE_KB".to_string())
            .is_per_candidate());
    }
}
