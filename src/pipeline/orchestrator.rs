//! # Pipeline Orchestrator
//!
//! Coordina una singola run di stylization dall'inizio alla fine.
//!
//! ## Flusso:
//! 1. **Select**: risolve stile e immagine sorgente (libreria o upload) → `SourceReady`
//! 2. **Compress**: gli upload passano dall'`AdaptiveCompressor`, la libreria no → `Compressed`
//! 3. **Stylize**: `load_model` + `apply` su un thread bloccante → `Stylizing`
//! 4. **Persist**: registra lo `StylizationArtifact` → `Completed`
//!
//! ## Error handling:
//! - Qualsiasi errore porta la run in `Failed` con il messaggio originale
//! - `run` non ritorna mai `Err`: il chiamante riceve sempre un `RunReport`
//! - Nessun retry automatico, una nuova run richiede una nuova istanza
//!
//! ## Esempio:
//! ```rust,ignore
//! let orchestrator = PipelineOrchestrator::new(config, CommandStylizer::from_config(&config))?;
//! let report = orchestrator.run(StylizeRequest::new(SourceSelection::library("cat.png"), "mosaic")).await;
//! ```

use crate::{
    artifact::{ArtifactWriter, StylizationArtifact},
    compressor::{AdaptiveCompressor, CompressionSettings},
    config::Config,
    error::{PipelineError, PipelineResult},
    file_manager::FileManager,
    json_output::JsonMessage,
    layout::StudioLayout,
    pipeline::{
        source::{self, SourceImage, SourceSelection},
        state::{PipelineState, StateMachine},
        CompressionSummary, RunReport,
    },
    progress::ProgressManager,
    stylizer::Stylizer,
};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// One stylization request: source + style
#[derive(Debug, Clone)]
pub struct StylizeRequest {
    pub source: SourceSelection,
    pub style_id: String,
}

impl StylizeRequest {
    pub fn new(source: SourceSelection, style_id: impl Into<String>) -> Self {
        Self {
            source,
            style_id: style_id.into(),
        }
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Single-run state machine driving one stylization request
pub struct PipelineOrchestrator<S: Stylizer> {
    config: Config,
    layout: StudioLayout,
    compressor: AdaptiveCompressor,
    stylizer: Arc<S>,
    machine: StateMachine,
    compression: Option<CompressionSummary>,
    clock: fn() -> NaiveDateTime,
    show_progress: bool,
}

impl<S: Stylizer> PipelineOrchestrator<S> {
    /// Create an orchestrator in `Idle`
    pub fn new(config: Config, stylizer: S) -> PipelineResult<Self> {
        Self::with_shared_stylizer(config, Arc::new(stylizer))
    }

    /// Create an orchestrator reusing an already shared stylizer
    pub fn with_shared_stylizer(config: Config, stylizer: Arc<S>) -> PipelineResult<Self> {
        config.validate()?;

        Ok(Self {
            layout: StudioLayout::from_config(&config),
            compressor: AdaptiveCompressor::new(CompressionSettings::from(&config)),
            stylizer,
            machine: StateMachine::new(),
            compression: None,
            clock: local_now,
            show_progress: false,
            config,
        })
    }

    /// Replace the timestamp source used for artifact names
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Show a terminal spinner while the stylizer runs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.machine.state()
    }

    /// Run the request to completion. Failures end in `Failed`, never in `Err`.
    pub async fn run(mut self, request: StylizeRequest) -> RunReport {
        let started = Instant::now();
        self.machine.reset();
        self.compression = None;

        if self.config.json_output {
            JsonMessage::start(
                describe_source(&request.source),
                request.style_id.clone(),
                self.config.target_size_kb,
            )
            .emit();
        }

        let outcome = self.execute(&request).await;
        let duration = started.elapsed();

        let report = match outcome {
            Ok(artifact) => {
                info!(
                    "Stylization complete in {:.1}s: {}",
                    duration.as_secs_f64(),
                    artifact.path.display()
                );
                RunReport {
                    state: self.machine.state(),
                    history: self.machine.history().to_vec(),
                    compression: self.compression,
                    artifact: Some(artifact),
                    error: None,
                    duration,
                }
            }
            Err(e) => {
                error!("An error occurred during stylization: {}", e);
                self.machine.fail();
                if self.config.json_output {
                    JsonMessage::state(PipelineState::Failed).emit();
                }
                RunReport {
                    state: self.machine.state(),
                    history: self.machine.history().to_vec(),
                    compression: self.compression,
                    artifact: None,
                    error: Some(e.to_string()),
                    duration,
                }
            }
        };

        if self.config.json_output {
            JsonMessage::from_report(&report).emit();
        }
        report
    }

    async fn execute(&mut self, request: &StylizeRequest) -> PipelineResult<StylizationArtifact> {
        // Idle -> SourceReady
        let style = self.layout.style(&request.style_id)?;
        let source = source::resolve(&self.layout, &request.source).await?;
        self.transition(PipelineState::SourceReady)?;

        // SourceReady -> Compressed
        let input_path = self.prepare_input(&source).await?;
        self.transition(PipelineState::Compressed)?;

        // Compressed -> Stylizing
        let output_dir = self.layout.output_dir().to_path_buf();
        ArtifactWriter::ensure_dir(&output_dir).await?;
        let created_at = (self.clock)();
        let source_basename = source.basename();
        let output_path = ArtifactWriter::build_output_path(
            &output_dir,
            &style.style_id,
            &source_basename,
            &created_at,
        );
        self.transition(PipelineState::Stylizing)?;
        self.stylize(&style.model_path, &input_path, &output_path).await?;

        // Stylizing -> Completed
        if !output_path.is_file() {
            return Err(PipelineError::Stylization(format!(
                "no output written to {}",
                output_path.display()
            )));
        }
        let artifact = StylizationArtifact {
            path: output_path,
            created_at,
            style_id: style.style_id,
            source_basename,
        };
        self.transition(PipelineState::Completed)?;

        Ok(artifact)
    }

    /// Path handed to the stylizer: the library file as is, or the compressed upload
    async fn prepare_input(&mut self, source: &SourceImage) -> PipelineResult<PathBuf> {
        if !source.needs_compression() {
            debug!("Library image {} skips compression", source.origin().display());
            return Ok(source.origin().to_path_buf());
        }

        let result = self.compressor.compress(&source.image, self.config.target_size_kb)?;
        let compressed_path = compressed_path_for(source.origin());
        tokio::fs::write(&compressed_path, &result.data).await?;

        info!(
            "Upload compressed {} -> {} (quality {})",
            FileManager::format_size(source.original_bytes),
            FileManager::format_size(result.achieved_bytes()),
            result.quality
        );
        if self.config.json_output {
            JsonMessage::compressed(source.original_bytes, &result).emit();
        }

        self.compression = Some(CompressionSummary::new(
            source.original_bytes,
            &result,
            compressed_path.clone(),
        ));
        Ok(compressed_path)
    }

    /// Blocking `load_model` + `apply`, optionally bounded by the configured timeout
    async fn stylize(&self, model_path: &Path, input: &Path, output: &Path) -> PipelineResult<()> {
        let stylizer = Arc::clone(&self.stylizer);
        let model_path = model_path.to_path_buf();
        let input = input.to_path_buf();
        let output = output.to_path_buf();

        let spinner = self
            .show_progress
            .then(|| ProgressManager::spinner("Stylizing image..."));

        let task = tokio::task::spawn_blocking(move || {
            let model = stylizer.load_model(&model_path)?;
            stylizer.apply(&model, &input, &output)
        });

        let joined = match self.config.stylize_timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), task).await {
                Ok(joined) => joined,
                Err(_) => {
                    if let Some(spinner) = &spinner {
                        spinner.clear();
                    }
                    return Err(PipelineError::Timeout(secs));
                }
            },
            None => task.await,
        };

        if let Some(spinner) = &spinner {
            spinner.clear();
        }

        joined.map_err(|e| PipelineError::Stylization(format!("stylizer task failed: {}", e)))?
    }

    fn transition(&mut self, next: PipelineState) -> PipelineResult<()> {
        self.machine.transition(next)?;
        if self.config.json_output {
            JsonMessage::state(next).emit();
        }
        Ok(())
    }
}

/// `{dir}/{file_name}-compressed.jpg` next to the saved upload
fn compressed_path_for(upload: &Path) -> PathBuf {
    let name = upload
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    upload.with_file_name(format!("{}-compressed.jpg", name))
}

fn describe_source(selection: &SourceSelection) -> String {
    match selection {
        SourceSelection::Library { name } => name.clone(),
        SourceSelection::Upload { filename, .. } => format!("upload:{}", filename),
    }
}
