//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con directory, budget di compressione e comando di stylization
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `root_dir`: Root del layout `images/` + `saved_models/` (default: `neural_style`)
//! - `upload_dir`: Directory upload (default: `uploaded_images` nella cwd)
//! - `output_dir`: Override della directory di output (default: `{root}/images/output-images`)
//! - `target_size_kb`: Budget per le immagini caricate (default: 1024)
//! - `start_quality` / `min_quality` / `quality_step`: 50 / 30 / 5
//! - `model_extension`: Estensione dei modelli salvati (default: `pth`)
//! - `stylize_timeout_secs`: Timeout opzionale della stylization (default: nessuno)
//! - `stylizer_program` / `stylizer_script`: Comando esterno di inferenza
//! - `use_cuda`: Inferenza su GPU (default: false, `--cuda 0`)
//! - `library_images` / `styles`: Selezioni disponibili
//!
//! ## Esempio:
//! ```rust
//! use style_transfer_studio::Config;
//!
//! let config = Config {
//!     target_size_kb: 512,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a stylization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding `images/` and `saved_models/`
    pub root_dir: PathBuf,
    /// Directory where uploaded files are persisted
    pub upload_dir: PathBuf,
    /// Output directory override (None = `{root}/images/output-images`)
    pub output_dir: Option<PathBuf>,
    /// Byte budget (KB) for uploaded images
    pub target_size_kb: u32,
    /// First JPEG quality tried by the compressor
    pub start_quality: u8,
    /// Quality floor of the compressor
    pub min_quality: u8,
    /// Quality decrement between attempts
    pub quality_step: u8,
    /// Extension of the saved style models
    pub model_extension: String,
    /// Abandon the stylization wait after this many seconds (None = unbounded)
    pub stylize_timeout_secs: Option<u64>,
    /// Interpreter used to run the inference script
    pub stylizer_program: String,
    /// Inference script, relative paths resolve against `root_dir`
    pub stylizer_script: PathBuf,
    /// Run inference on the GPU
    pub use_cuda: bool,
    /// Selectable library images
    pub library_images: Vec<String>,
    /// Selectable style identifiers
    pub styles: Vec<String>,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("neural_style"),
            upload_dir: PathBuf::from("uploaded_images"),
            output_dir: None,
            target_size_kb: 1024,
            start_quality: 50,
            min_quality: 30,
            quality_step: 5,
            model_extension: "pth".to_string(),
            stylize_timeout_secs: None,
            stylizer_program: crate::platform::PlatformCommands::instance()
                .python()
                .to_string(),
            stylizer_script: PathBuf::from("neural_style.py"),
            use_cuda: false,
            library_images: ["amber.jpg", "cat.png", "room.jpg", "buildings.jpg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            styles: ["candy", "mosaic", "rain_princess", "udnie"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> PipelineResult<()> {
        if self.target_size_kb == 0 {
            return Err(PipelineError::Validation(
                "Target size must be greater than 0 KB".to_string(),
            ));
        }

        if self.start_quality == 0 || self.start_quality > 100 {
            return Err(PipelineError::Validation(
                "Start quality must be between 1 and 100".to_string(),
            ));
        }

        if self.min_quality == 0 || self.min_quality > self.start_quality {
            return Err(PipelineError::Validation(format!(
                "Minimum quality must be between 1 and the start quality ({})",
                self.start_quality
            )));
        }

        if self.quality_step == 0 {
            return Err(PipelineError::Validation(
                "Quality step must be greater than 0".to_string(),
            ));
        }

        if self.model_extension.is_empty() || self.model_extension.contains('.') {
            return Err(PipelineError::Validation(format!(
                "Model extension must be a bare extension, got '{}'",
                self.model_extension
            )));
        }

        if self.stylize_timeout_secs == Some(0) {
            return Err(PipelineError::Validation(
                "Stylization timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.styles.is_empty() {
            return Err(PipelineError::Validation(
                "At least one style must be configured".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolved inference script path
    pub fn script_path(&self) -> PathBuf {
        if self.stylizer_script.is_absolute() {
            self.stylizer_script.clone()
        } else {
            self.root_dir.join(&self.stylizer_script)
        }
    }

    /// Load configuration from file, falling back to defaults when absent
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
