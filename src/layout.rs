//! # Layout Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path: libreria di immagini,
//! modelli salvati, immagini di stile, upload e output. Tutte le directory
//! arrivano dalla `Config`, niente dipende dalla working directory implicita.

use crate::{
    config::Config,
    error::{PipelineError, PipelineResult},
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolved filesystem layout of one studio root
#[derive(Debug, Clone)]
pub struct StudioLayout {
    root: PathBuf,
    upload_dir: PathBuf,
    output_dir: PathBuf,
    model_extension: String,
    styles: Vec<String>,
}

/// A style identifier resolved to its artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSelection {
    pub style_id: String,
    pub model_path: PathBuf,
    pub style_image_path: PathBuf,
}

impl StudioLayout {
    pub fn from_config(config: &Config) -> Self {
        let output_dir = config
            .output_dir
            .clone()
            .unwrap_or_else(|| config.root_dir.join("images").join("output-images"));

        Self {
            root: config.root_dir.clone(),
            upload_dir: config.upload_dir.clone(),
            output_dir,
            model_extension: config.model_extension.clone(),
            styles: config.styles.clone(),
        }
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join("images").join("content-images")
    }

    pub fn style_images_dir(&self) -> PathBuf {
        self.root.join("images").join("style-images")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("saved_models")
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    /// Path of a library image; the name must be a plain file name
    pub fn library_image(&self, name: &str) -> PipelineResult<PathBuf> {
        let name = plain_file_name(name)
            .ok_or_else(|| PipelineError::UnknownLibraryImage(name.to_string()))?;
        let path = self.content_dir().join(name);
        debug!("Library image {} -> {}", name, path.display());
        Ok(path)
    }

    /// Resolve a style id to its model artifact and reference image
    pub fn style(&self, style_id: &str) -> PipelineResult<StyleSelection> {
        if !self.styles.iter().any(|s| s == style_id) {
            return Err(PipelineError::UnknownStyle(style_id.to_string()));
        }

        Ok(StyleSelection {
            style_id: style_id.to_string(),
            model_path: self
                .models_dir()
                .join(format!("{}.{}", style_id, self.model_extension)),
            style_image_path: self.style_images_dir().join(format!("{}.jpg", style_id)),
        })
    }

    /// Where an upload named `original_filename` is persisted
    pub fn upload_path(&self, original_filename: &str) -> PipelineResult<PathBuf> {
        let name = plain_file_name(original_filename).ok_or_else(|| {
            PipelineError::Validation(format!("Invalid upload file name: {}", original_filename))
        })?;
        Ok(self.upload_dir.join(name))
    }
}

/// Last component of `name` when it is a normal file name
fn plain_file_name(name: &str) -> Option<&str> {
    match Path::new(name).components().last() {
        Some(Component::Normal(last)) => last.to_str().filter(|s| !s.is_empty()),
        _ => None,
    }
}
