//! # Artifact Writer Module
//!
//! Naming deterministico e creazione idempotente delle directory per i
//! risultati della stylization.
//!
//! ## Formato path:
//! ```text
//! {output_dir}/{style_id}-{source_basename}-{YYYYmmdd-HHMMSS}.jpg
//! ```
//!
//! Due run con stesso stile, stesso basename e stesso secondo producono lo
//! stesso path: il secondo sovrascrive il primo senza errori.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Second-resolution, lexically sortable timestamp format used in file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A persisted stylization result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylizationArtifact {
    pub path: PathBuf,
    pub created_at: NaiveDateTime,
    pub style_id: String,
    pub source_basename: String,
}

impl StylizationArtifact {
    /// File name offered when the result is downloaded
    pub fn download_name(&self) -> String {
        format!("stylized-{}", self.source_basename)
    }
}

pub struct ArtifactWriter;

impl ArtifactWriter {
    /// Pure path computation for an output artifact
    pub fn build_output_path(
        output_dir: &Path,
        style_id: &str,
        source_basename: &str,
        timestamp: &NaiveDateTime,
    ) -> PathBuf {
        output_dir.join(format!(
            "{}-{}-{}.jpg",
            style_id,
            source_basename,
            timestamp.format(TIMESTAMP_FORMAT)
        ))
    }

    /// Create `path` and its parents if absent; no-op when it already exists
    pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await?;
        debug!("Output directory ready: {}", path.display());
        Ok(())
    }
}
