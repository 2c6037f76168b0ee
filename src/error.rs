//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore della pipeline di stylization.
//!
//! ## Responsabilità:
//! - Definisce `PipelineError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi leggibili, mostrati così come sono all'utente nello stato `Failed`
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `ImageDecode`: bytes sorgente non leggibili come immagine
//! - `ImageEncode`: il compressor non riesce a produrre nessun JPEG valido
//! - `ModelLoad`: artifact di stile mancante o corrotto
//! - `Stylization`: errore durante l'inferenza
//! - `Io`: errori di scrittura su filesystem
//! - `Validation`, `UnknownStyle`, `UnknownLibraryImage`: input non validi
//! - `InvalidTransition`: transizione non ammessa della state machine
//! - `Timeout`: stylization oltre il limite configurato
//!
//! ## Esempio:
//! ```rust
//! use style_transfer_studio::PipelineError;
//!
//! let err = PipelineError::ModelLoad("not found".to_string());
//! assert!(err.to_string().contains("not found"));
//! ```

use crate::pipeline::PipelineState;

/// Result alias used across the library
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Custom error types for a stylization run
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Stylization error: {0}")]
    Stylization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    #[error("Unknown library image: {0}")]
    UnknownLibraryImage(String),

    #[error("Invalid pipeline transition: {from:?} -> {to:?}")]
    InvalidTransition { from: PipelineState, to: PipelineState },

    #[error("Stylization timed out after {0} seconds")]
    Timeout(u64),
}

impl PipelineError {
    /// Maps a decoder failure onto `ImageDecode`
    pub fn decode(err: image::ImageError) -> Self {
        Self::ImageDecode(err.to_string())
    }

    /// Maps an encoder failure onto `ImageEncode`
    pub fn encode(err: image::ImageError) -> Self {
        Self::ImageEncode(err.to_string())
    }
}
