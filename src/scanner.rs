//! # Directory Scanner Module
//!
//! Listing non ricorsivo di una directory per il browser interattivo.
//!
//! ## Responsabilità:
//! - Classifica ogni entry come Directory / Immagine / Altro
//! - Le directory passano sempre, i file solo se l'estensione è riconosciuta,
//!   tutto il resto è invisibile
//! - La lista inizia sempre con il marker della directory padre (`..`)
//! - Directory illeggibile o permessi negati → solo il marker padre, mai un errore

use std::path::Path;

use tracing::debug;

use crate::file_manager::FileManager;

/// One visible entry in the browser listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEntry {
    /// The `..` marker leading to the parent directory.
    Parent,
    /// A subdirectory, always listed regardless of content.
    Directory(String),
    /// A file whose extension is in the recognized set.
    Image(String),
}

impl BrowserEntry {
    /// The name shown in the listing.
    pub fn label(&self) -> &str {
        match self {
            BrowserEntry::Parent => "..",
            BrowserEntry::Directory(name) => name,
            BrowserEntry::Image(name) => name,
        }
    }

    /// Whether confirming this entry navigates instead of selecting.
    pub fn is_directory_like(&self) -> bool {
        matches!(self, BrowserEntry::Parent | BrowserEntry::Directory(_))
    }
}

/// Lists the visible entries of a directory for the navigator.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    extensions: Vec<String>,
}

impl DirectoryScanner {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// List the immediate children of a directory: the parent marker first,
    /// then every subdirectory, then every recognized image, each group in
    /// lexicographic order.
    ///
    /// An unreadable directory yields just the parent marker.
    pub fn list_visible(&self, directory: &Path) -> Vec<BrowserEntry> {
        let mut entries = vec![BrowserEntry::Parent];

        let read_dir = match std::fs::read_dir(directory) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                debug!("Cannot list {}: {}", directory.display(), e);
                return entries;
            }
        };

        let mut directories = Vec::new();
        let mut images = Vec::new();

        for entry in read_dir.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            if path.is_dir() {
                directories.push(name);
            } else if FileManager::is_recognized(&path, &self.extensions) {
                images.push(name);
            }
        }

        directories.sort();
        images.sort();

        entries.extend(directories.into_iter().map(BrowserEntry::Directory));
        entries.extend(images.into_iter().map(BrowserEntry::Image));
        entries
    }
}
