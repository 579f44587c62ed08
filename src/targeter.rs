//! # Size Targeting Module
//!
//! Questo modulo contiene la ricerca che porta un'immagine dentro la
//! finestra di dimensione configurata.
//!
//! ## Responsabilità:
//! - Definisce `SizeBounds` (finestra inclusiva `[min_kb, max_kb]`)
//! - Definisce `ImageCandidate` (file già filtrato e rinominato al nome sanitizzato)
//! - `SizeTargeter` percorre la quality ladder dall'alto verso il basso
//!
//! ## Algoritmo:
//! 1. Se la dimensione iniziale è già nella finestra → successo immediato,
//!    i byte originali restano intatti
//! 2. Per ogni livello della ladder: decodifica il sorgente sanitizzato,
//!    forza a 3 canali RGB (scarta alpha/indexed), ri-codifica in JPEG a
//!    quella qualità su un artefatto temporaneo
//! 3. Artefatto nella finestra → rinominato SOPRA il sorgente sanitizzato
//!    (un file logico per candidato), la ricerca si ferma
//! 4. Fuori finestra → artefatto eliminato, si passa al livello più basso
//! 5. Ladder esaurita → `LadderExhausted` (non fatale per il batch)
//!
//! ## Caso limite:
//! La ladder sa solo RIDURRE la dimensione: un file già sotto `min_kb` la
//! esaurirà senza successo. Viene riportato come la stessa `LadderExhausted`,
//! mai come crash.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::{debug, info};

use crate::error::FitError;
use crate::file_manager::FileManager;
use crate::ladder::QualityLadder;

/// Inclusive acceptable output size range, in binary kilobytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    pub min_kb: f64,
    pub max_kb: f64,
}

impl SizeBounds {
    /// Build a window. `min_kb <= max_kb` is a configuration invariant
    /// enforced by [`crate::config::Config::validate`].
    pub fn new(min_kb: f64, max_kb: f64) -> Self {
        Self { min_kb, max_kb }
    }

    /// Whether a byte size falls inside the window, inclusive on both ends.
    pub fn contains_bytes(&self, bytes: u64) -> bool {
        let kb = FileManager::size_kb(bytes);
        self.min_kb <= kb && kb <= self.max_kb
    }
}

/// One image file being considered for size-targeted re-encoding.
///
/// Created only after the extension filter passes; the sanitize-rename has
/// already happened by the time a candidate exists, so `source_path` always
/// points at the sanitized name.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub source_path: PathBuf,
    pub current_size_bytes: u64,
}

impl ImageCandidate {
    /// Validate the extension, rename the file in place to its sanitized
    /// name and measure it.
    ///
    /// The rename is irreversible and happens even if no compression turns
    /// out to be needed.
    pub async fn prepare(path: &Path, extensions: &[String]) -> Result<Self, FitError> {
        if !FileManager::is_recognized(path, extensions) {
            return Err(FitError::UnrecognizedFormat(path.display().to_string()));
        }

        let source_path = FileManager::apply_sanitized_name(path)
            .await
            .map_err(|e| FitError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        let current_size_bytes = tokio::fs::metadata(&source_path).await?.len();

        Ok(Self {
            source_path,
            current_size_bytes,
        })
    }

    /// Current size in binary kilobytes.
    pub fn size_kb(&self) -> f64 {
        FileManager::size_kb(self.current_size_bytes)
    }
}

/// Outcome of a successful targeting run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitOutcome {
    /// The file was already inside the window; its bytes were left untouched.
    AlreadyWithin { size_bytes: u64 },
    /// A ladder level produced a compliant artifact that replaced the source.
    Compressed {
        quality: u8,
        initial_bytes: u64,
        final_bytes: u64,
    },
}

impl FitOutcome {
    /// Final size on disk, in bytes.
    pub fn final_bytes(&self) -> u64 {
        match *self {
            FitOutcome::AlreadyWithin { size_bytes } => size_bytes,
            FitOutcome::Compressed { final_bytes, .. } => final_bytes,
        }
    }
}

/// Drives the quality ladder to produce an output inside the bounds.
pub struct SizeTargeter {
    bounds: SizeBounds,
}

impl SizeTargeter {
    pub fn new(bounds: SizeBounds) -> Self {
        Self { bounds }
    }

    /// Walk the ladder top to bottom until one attempt lands inside the
    /// window, overwriting the sanitized source with the winning artifact.
    ///
    /// Every rejected attempt is deleted before the next level is tried, so
    /// failure leaves no temporary artifacts behind.
    pub async fn target_size(&self, candidate: &ImageCandidate) -> Result<FitOutcome, FitError> {
        if self.bounds.contains_bytes(candidate.current_size_bytes) {
            info!(
                "{} is already within the size window at {:.2} KB",
                candidate.source_path.display(),
                candidate.size_kb()
            );
            return Ok(FitOutcome::AlreadyWithin {
                size_bytes: candidate.current_size_bytes,
            });
        }

        for quality in QualityLadder::levels() {
            let attempt_path = Self::attempt_path(&candidate.source_path, quality);

            let source = candidate.source_path.clone();
            let destination = attempt_path.clone();
            let encode = tokio::task::spawn_blocking(move || {
                encode_rgb_jpeg(&source, &destination, quality)
            })
            .await
            .map_err(|e| FitError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

            if let Err(e) = encode {
                // Abort this candidate, but never leave a partial artifact.
                let _ = tokio::fs::remove_file(&attempt_path).await;
                return Err(e);
            }

            let produced_bytes = tokio::fs::metadata(&attempt_path).await?.len();
            debug!(
                "Quality {} produced {:.2} KB for {}",
                quality,
                FileManager::size_kb(produced_bytes),
                candidate.source_path.display()
            );

            if self.bounds.contains_bytes(produced_bytes) {
                tokio::fs::rename(&attempt_path, &candidate.source_path).await?;
                info!(
                    "Compressed {} to {:.2} KB at quality {}",
                    candidate.source_path.display(),
                    FileManager::size_kb(produced_bytes),
                    quality
                );
                return Ok(FitOutcome::Compressed {
                    quality,
                    initial_bytes: candidate.current_size_bytes,
                    final_bytes: produced_bytes,
                });
            }

            tokio::fs::remove_file(&attempt_path).await?;
        }

        Err(FitError::LadderExhausted {
            path: candidate.source_path.clone(),
            min_kb: self.bounds.min_kb,
            max_kb: self.bounds.max_kb,
        })
    }

    /// Distinctly-named temporary artifact for one ladder attempt, placed
    /// next to the source.
    fn attempt_path(source: &Path, quality: u8) -> PathBuf {
        let stem = source
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        let file_name = match source.extension() {
            Some(ext) => format!("{}_temp_{}.{}", stem, quality, ext.to_string_lossy()),
            None => format!("{}_temp_{}", stem, quality),
        };

        source.with_file_name(file_name)
    }
}

/// Decode an image, force it to 3-channel RGB (dropping alpha/indexed
/// information) and re-encode it as JPEG at the given quality.
///
/// The destination keeps the source's extension even though the payload is
/// JPEG; the winning artifact replaces the sanitized source name as-is.
fn encode_rgb_jpeg(source: &Path, destination: &Path, quality: u8) -> Result<(), FitError> {
    let decoded = image::open(source)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let file = std::fs::File::create(destination)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    rgb.write_with_encoder(encoder)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn default_extensions() -> Vec<String> {
        vec![".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()]
    }

    /// Deterministic high-entropy RGB image, hard to compress losslessly.
    fn noise_image(width: u32, height: u32) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        ImageBuffer::from_fn(width, height, |_, _| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let bytes = state.to_be_bytes();
            Rgb([bytes[0], bytes[1], bytes[2]])
        })
    }

    fn temp_artifacts(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.to_string_lossy().contains("_temp_"))
            .collect()
    }

    #[tokio::test]
    async fn test_prepare_rejects_unrecognized_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        tokio::fs::write(&path, b"not an image").await.unwrap();

        let result = ImageCandidate::prepare(&path, &default_extensions()).await;
        assert!(matches!(result, Err(FitError::UnrecognizedFormat(_))));
        // The reject happens before the sanitize-rename.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_prepare_sanitizes_before_measuring() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("my photo!.JPG");
        tokio::fs::write(&path, vec![0u8; 2048]).await.unwrap();

        let candidate = ImageCandidate::prepare(&path, &default_extensions())
            .await
            .unwrap();
        assert_eq!(candidate.source_path, temp_dir.path().join("my_photo_.jpg"));
        assert_eq!(candidate.current_size_bytes, 2048);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_within_bounds_is_a_noop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        // 150 KB of arbitrary bytes: the fast path never decodes.
        let payload = vec![0xabu8; 150 * 1024];
        tokio::fs::write(&path, &payload).await.unwrap();

        let candidate = ImageCandidate::prepare(&path, &default_extensions())
            .await
            .unwrap();
        let targeter = SizeTargeter::new(SizeBounds::new(100.0, 2048.0));
        let outcome = targeter.target_size(&candidate).await.unwrap();

        assert_eq!(
            outcome,
            FitOutcome::AlreadyWithin {
                size_bytes: payload.len() as u64
            }
        );
        let after = tokio::fs::read(&path).await.unwrap();
        assert_eq!(after, payload);
        assert!(temp_artifacts(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_file_below_min_exhausts_ladder_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tiny.jpg");
        // A 1x1 image is far below 100 KB at every ladder quality.
        let pixel: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(1, 1, Rgb([200, 10, 10]));
        pixel.save(&path).unwrap();

        let candidate = ImageCandidate::prepare(&path, &default_extensions())
            .await
            .unwrap();
        let targeter = SizeTargeter::new(SizeBounds::new(100.0, 2048.0));
        let result = targeter.target_size(&candidate).await;

        assert!(matches!(result, Err(FitError::LadderExhausted { .. })));
        assert!(path.exists());
        assert!(temp_artifacts(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_oversized_image_is_compressed_into_window() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("noise.png");
        noise_image(384, 384).save(&path).unwrap();

        let candidate = ImageCandidate::prepare(&path, &default_extensions())
            .await
            .unwrap();
        // A window whose ceiling sits below the initial size forces the
        // ladder walk; lossy JPEG always undercuts lossless noise PNG.
        let max_kb = candidate.size_kb() * 0.9;
        let bounds = SizeBounds::new(0.001, max_kb);
        let targeter = SizeTargeter::new(bounds);

        let outcome = targeter.target_size(&candidate).await.unwrap();
        match outcome {
            FitOutcome::Compressed {
                quality,
                initial_bytes,
                final_bytes,
            } => {
                assert!(QualityLadder::levels().any(|q| q == quality));
                assert_eq!(initial_bytes, candidate.current_size_bytes);
                assert!(bounds.contains_bytes(final_bytes));
            }
            other => panic!("expected Compressed, got {:?}", other),
        }

        // Winner replaced the sanitized source; rejects were deleted.
        let on_disk = tokio::fs::metadata(&path).await.unwrap().len();
        assert_eq!(on_disk, outcome.final_bytes());
        assert!(temp_artifacts(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_walk_stops_at_highest_fitting_quality() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("noise.png");
        noise_image(256, 256).save(&path).unwrap();

        // Measure every ladder level independently against the same source.
        let mut level_sizes = Vec::new();
        for quality in QualityLadder::levels() {
            let level_path = temp_dir.path().join(format!("level_{}.jpg", quality));
            encode_rgb_jpeg(&path, &level_path, quality).unwrap();
            let bytes = std::fs::metadata(&level_path).unwrap().len();
            std::fs::remove_file(&level_path).unwrap();
            level_sizes.push((quality, bytes));
        }

        // A ceiling just below the top level's output forces at least one
        // rejection before a lower level can be accepted.
        let (top_quality, top_bytes) = level_sizes[0];
        assert_eq!(top_quality, QualityLadder::top());
        let bounds = SizeBounds::new(0.001, FileManager::size_kb(top_bytes) - 0.01);

        let expected = level_sizes
            .iter()
            .find(|(_, bytes)| bounds.contains_bytes(*bytes))
            .map(|(quality, _)| *quality)
            .expect("some ladder level must fit below the q95 output");
        assert!(expected < QualityLadder::top());

        let candidate = ImageCandidate::prepare(&path, &default_extensions())
            .await
            .unwrap();
        // Lossless noise PNG outweighs its own q95 JPEG, so the fast path
        // cannot short-circuit this walk.
        assert!(!bounds.contains_bytes(candidate.current_size_bytes));

        let outcome = SizeTargeter::new(bounds)
            .target_size(&candidate)
            .await
            .unwrap();
        match outcome {
            FitOutcome::Compressed { quality, .. } => {
                assert!(quality < QualityLadder::top());
                assert_eq!(quality, expected);
            }
            other => panic!("expected Compressed, got {:?}", other),
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = SizeBounds::new(100.0, 2048.0);
        assert!(bounds.contains_bytes(100 * 1024));
        assert!(bounds.contains_bytes(2048 * 1024));
        assert!(!bounds.contains_bytes(100 * 1024 - 1));
        assert!(!bounds.contains_bytes(2048 * 1024 + 1));
    }

    #[test]
    fn test_attempt_path_keeps_extension() {
        let path = SizeTargeter::attempt_path(Path::new("/images/photo.png"), 85);
        assert_eq!(path, PathBuf::from("/images/photo_temp_85.png"));
    }
}
