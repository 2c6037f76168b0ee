//! # JSON Output Module
//!
//! Output strutturato in JSON (una riga per evento) per chi pilota la CLI
//! da un altro processo.
//!
//! ## Tipi di messaggi:
//! - `library`: immagini e stili disponibili
//! - `start`: inizio della run
//! - `state`: ogni transizione della state machine
//! - `compressed`: esito della ricodifica di un upload
//! - `preview_error`: errore di uno dei due pannelli di anteprima
//! - `complete`: artifact prodotto
//! - `error`: run terminata in `Failed`

use crate::{
    artifact::StylizationArtifact,
    compressor::CompressionResult,
    pipeline::{PipelineState, RunReport},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "library")]
    Library {
        images: Vec<String>,
        styles: Vec<String>,
    },

    #[serde(rename = "start")]
    Start {
        source: String,
        style: String,
        target_size_kb: u32,
    },

    #[serde(rename = "state")]
    State { state: PipelineState },

    #[serde(rename = "compressed")]
    Compressed {
        original_size: u64,
        compressed_size: u64,
        quality: u8,
        attempts: Vec<u8>,
        within_budget: bool,
    },

    #[serde(rename = "preview_error")]
    PreviewError { pane: String, message: String },

    #[serde(rename = "complete")]
    Complete {
        output_path: PathBuf,
        download_name: String,
        style: String,
        duration_seconds: f64,
    },

    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn library(images: Vec<String>, styles: Vec<String>) -> Self {
        Self::Library { images, styles }
    }

    pub fn start(source: String, style: String, target_size_kb: u32) -> Self {
        Self::Start {
            source,
            style,
            target_size_kb,
        }
    }

    pub fn state(state: PipelineState) -> Self {
        Self::State { state }
    }

    pub fn compressed(original_size: u64, result: &CompressionResult) -> Self {
        Self::Compressed {
            original_size,
            compressed_size: result.achieved_bytes(),
            quality: result.quality,
            attempts: result.attempts.clone(),
            within_budget: result.within_budget(),
        }
    }

    pub fn preview_error(pane: &str, message: String) -> Self {
        Self::PreviewError {
            pane: pane.to_string(),
            message,
        }
    }

    pub fn complete(artifact: &StylizationArtifact, duration_seconds: f64) -> Self {
        Self::Complete {
            output_path: artifact.path.clone(),
            download_name: artifact.download_name(),
            style: artifact.style_id.clone(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }

    /// Terminal message for a finished run
    pub fn from_report(report: &RunReport) -> Self {
        match (&report.artifact, &report.error) {
            (Some(artifact), _) => Self::complete(artifact, report.duration.as_secs_f64()),
            (None, message) => Self::error(
                message.clone().unwrap_or_else(|| "Run did not complete".to_string()),
                Some(format!("state history: {:?}", report.history)),
            ),
        }
    }
}
