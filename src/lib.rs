//! # Style Transfer Studio Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tassonomia degli errori della pipeline
//! - `compressor`: Ricodifica JPEG con budget in KB (best-effort)
//! - `artifact`: Naming degli output e creazione directory
//! - `layout`: Path di libreria, modelli, stili, upload e output
//! - `file_manager`: Upload, discovery libreria, formattazione dimensioni
//! - `stylizer`: Trait verso l'inferenza e backend a processo esterno
//! - `pipeline`: State machine che orchestra la run
//! - `preview`: Pannelli Source/Style e immagine risultato
//! - `json_output` / `progress`: Output per programmi e per terminale
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use style_transfer_studio::{CommandStylizer, Config, PipelineOrchestrator, SourceSelection, StylizeRequest};
//!
//! let config = Config::default();
//! let orchestrator = PipelineOrchestrator::new(config.clone(), CommandStylizer::from_config(&config))?;
//! let report = orchestrator
//!     .run(StylizeRequest::new(SourceSelection::library("cat.png"), "mosaic"))
//!     .await;
//! println!("{}", report.format_summary());
//! ```

pub mod artifact;
pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod layout;
pub mod pipeline;
pub mod platform;
pub mod preview;
pub mod progress;
pub mod stylizer;
pub mod utils;

pub use artifact::{ArtifactWriter, StylizationArtifact};
pub use compressor::{AdaptiveCompressor, CompressionResult, CompressionSettings};
pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use layout::{StudioLayout, StyleSelection};
pub use pipeline::{PipelineOrchestrator, PipelineState, RunReport, SourceSelection, StylizeRequest};
pub use stylizer::{CommandStylizer, Stylizer};
