//! # Source Resolution Module
//!
//! Risolve l'immagine sorgente dalla libreria fissa o da un upload.
//! Gli upload vengono salvati su disco prima della decodifica.

use crate::{
    error::{PipelineError, PipelineResult},
    file_manager::FileManager,
    layout::StudioLayout,
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// What the caller picked as content image
#[derive(Debug, Clone)]
pub enum SourceSelection {
    /// A file from the content-image library, by name
    Library { name: String },
    /// Raw uploaded bytes plus the client-side file name
    Upload { filename: String, bytes: Vec<u8> },
}

impl SourceSelection {
    pub fn library(name: impl Into<String>) -> Self {
        Self::Library { name: name.into() }
    }

    pub fn upload(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Upload {
            filename: filename.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Library,
    Upload,
}

/// A decoded content image
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub original_bytes: u64,
    pub origin: PathBuf,
    pub kind: SourceKind,
}

impl SourceImage {
    pub fn basename(&self) -> String {
        FileManager::basename(&self.origin)
    }

    /// Library images are assumed pre-sized
    pub fn needs_compression(&self) -> bool {
        self.kind == SourceKind::Upload
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }
}

/// Load and decode the selected source image
pub async fn resolve(layout: &StudioLayout, selection: &SourceSelection) -> PipelineResult<SourceImage> {
    match selection {
        SourceSelection::Library { name } => {
            let path = layout.library_image(name)?;
            if !path.is_file() {
                return Err(PipelineError::UnknownLibraryImage(name.clone()));
            }

            let bytes = tokio::fs::read(&path).await?;
            let image = image::load_from_memory(&bytes)
                .map_err(|e| PipelineError::ImageDecode(format!("{}: {}", path.display(), e)))?;
            info!(
                "Library image {} ({}x{}, {})",
                name,
                image.width(),
                image.height(),
                FileManager::format_size(bytes.len() as u64)
            );

            Ok(SourceImage {
                image,
                original_bytes: bytes.len() as u64,
                origin: path,
                kind: SourceKind::Library,
            })
        }
        SourceSelection::Upload { filename, bytes } => {
            let path = layout.upload_path(filename)?;
            FileManager::save_upload(&path, bytes).await?;

            let image = image::load_from_memory(bytes)
                .map_err(|e| PipelineError::ImageDecode(format!("{}: {}", filename, e)))?;
            info!(
                "Uploaded image {} ({}x{}, {})",
                filename,
                image.width(),
                image.height(),
                FileManager::format_size(bytes.len() as u64)
            );

            Ok(SourceImage {
                image,
                original_bytes: bytes.len() as u64,
                origin: path,
                kind: SourceKind::Upload,
            })
        }
    }
}
