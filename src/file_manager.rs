//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file della pipeline.
//!
//! ## Responsabilità:
//! - Persistenza degli upload nella directory dedicata (creata on demand)
//! - Discovery della libreria di immagini sorgente
//! - Determinazione formato file supportato (JPG, JPEG, PNG, WebP)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Note:
//! - Upload e output non vengono mai ripuliti, i file si accumulano
//! - Un upload con lo stesso nome sovrascrive il precedente

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn get_file_size(path: &Path) -> std::io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Write uploaded bytes to `path`, creating the parent directory if needed
    pub async fn save_upload(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, bytes).await?;
        debug!("Saved upload {} ({})", path.display(), Self::format_size(bytes.len() as u64));
        Ok(())
    }

    /// Supported image files directly inside the library directory, sorted by name
    pub fn find_library_images(content_dir: &Path) -> Result<Vec<PathBuf>> {
        if !content_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Library directory does not exist: {}",
                content_dir.display()
            ));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(content_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| Self::is_supported_image(p))
            .collect();
        files.sort();

        Ok(files)
    }

    /// Check if a file is an accepted source image
    pub fn is_supported_image(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "jpg" | "jpeg" | "png" | "webp")
        } else {
            false
        }
    }

    /// File name of `path` as a string, empty when there is none
    pub fn basename(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
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
