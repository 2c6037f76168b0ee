//! # Pipeline Module
//!
//! Separa le responsabilità della run in sottomoduli:
//! - `state`: stati e funzione di transizione
//! - `source`: risoluzione immagine sorgente (libreria o upload)
//! - `orchestrator`: state machine che esegue la run

pub mod orchestrator;
pub mod source;
pub mod state;

pub use orchestrator::{PipelineOrchestrator, StylizeRequest};
pub use source::{SourceImage, SourceKind, SourceSelection};
pub use state::{PipelineState, StateMachine};

use crate::{artifact::StylizationArtifact, compressor::CompressionResult, file_manager::FileManager};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// What the compressor did to an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionSummary {
    pub original_bytes: u64,
    pub achieved_bytes: u64,
    pub quality: u8,
    pub attempts: Vec<u8>,
    pub target_size_kb: u32,
    pub within_budget: bool,
    /// Compressed file handed to the stylizer
    pub path: PathBuf,
}

impl CompressionSummary {
    pub fn new(original_bytes: u64, result: &CompressionResult, path: PathBuf) -> Self {
        Self {
            original_bytes,
            achieved_bytes: result.achieved_bytes(),
            quality: result.quality,
            attempts: result.attempts.clone(),
            target_size_kb: result.target_size_kb,
            within_budget: result.within_budget(),
            path,
        }
    }

    pub fn achieved_size_kb(&self) -> f64 {
        self.achieved_bytes as f64 / 1024.0
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Terminal state, `Completed` or `Failed`
    pub state: PipelineState,
    /// Every state visited, starting at `Idle`
    pub history: Vec<PipelineState>,
    pub compression: Option<CompressionSummary>,
    pub artifact: Option<StylizationArtifact>,
    /// User-facing failure message
    pub error: Option<String>,
    pub duration: Duration,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.state == PipelineState::Completed
    }

    /// One-line summary for the terminal
    pub fn format_summary(&self) -> String {
        let compression = self
            .compression
            .as_ref()
            .map(|c| {
                format!(
                    " | Upload: {} -> {} at quality {}{}",
                    FileManager::format_size(c.original_bytes),
                    FileManager::format_size(c.achieved_bytes),
                    c.quality,
                    if c.within_budget { "" } else { " (over budget)" }
                )
            })
            .unwrap_or_default();

        match (&self.artifact, &self.error) {
            (Some(artifact), _) => format!(
                "Stylization complete: {} ({:.1}s){}",
                artifact.path.display(),
                self.duration.as_secs_f64(),
                compression
            ),
            (None, Some(message)) => format!("An error occurred during stylization: {}{}", message, compression),
            (None, None) => format!("Run ended in state {:?}", self.state),
        }
    }
}
