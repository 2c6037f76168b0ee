//! # Stylizer Module
//!
//! Confine verso l'inferenza di style transfer. La pipeline conosce solo il
//! trait `Stylizer` con due operazioni:
//!
//! - `load_model(path)`: carica l'artifact di stile pre-addestrato
//! - `apply(model, input, output)`: scrive il JPEG stilizzato in `output`
//!
//! ## Backend incluso
//!
//! `CommandStylizer` esegue lo script di valutazione fast-neural-style come
//! processo esterno:
//!
//! ```text
//! python3 neural_style.py eval --content-image <in> --model <model> --output-image <out> --cuda 0
//! ```
//!
//! Qualsiasi altro backend (ONNX, servizio remoto, stub nei test) può essere
//! usato implementando il trait, senza toccare l'orchestratore.

use crate::args;
use crate::error::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Capability that turns a content image into a stylized image
pub trait Stylizer: Send + Sync + 'static {
    /// Loaded model handle
    type Model: Send + 'static;

    /// Load a pretrained style artifact, failing with `ModelLoad`
    fn load_model(&self, path: &Path) -> PipelineResult<Self::Model>;

    /// Stylize `input` into a JPEG at `output`, failing with `Stylization`
    fn apply(&self, model: &Self::Model, input: &Path, output: &Path) -> PipelineResult<()>;
}

/// A validated model artifact on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorchModel {
    pub path: PathBuf,
    pub size: u64,
}

/// Stylizer backed by the external fast-neural-style evaluation script
#[derive(Debug, Clone)]
pub struct CommandStylizer {
    program: String,
    script: PathBuf,
    model_extension: String,
    use_cuda: bool,
}

impl CommandStylizer {
    pub fn new(program: impl Into<String>, script: impl Into<PathBuf>, model_extension: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
            model_extension: model_extension.into(),
            use_cuda: false,
        }
    }

    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(
            config.stylizer_program.clone(),
            config.script_path(),
            config.model_extension.clone(),
        )
        .with_cuda(config.use_cuda)
    }

    pub fn with_cuda(mut self, use_cuda: bool) -> Self {
        self.use_cuda = use_cuda;
        self
    }

    /// Check that the interpreter and script can be found
    pub fn check_available(&self) -> PipelineResult<()> {
        if !crate::platform::PlatformCommands::instance().is_command_available(&self.program) {
            return Err(PipelineError::Stylization(format!(
                "Stylizer program not found: {}",
                self.program
            )));
        }
        if !self.script.is_file() {
            return Err(PipelineError::Stylization(format!(
                "Stylizer script not found: {}",
                self.script.display()
            )));
        }
        Ok(())
    }

    /// Arguments of one evaluation call
    fn eval_args(&self, model: &TorchModel, input: &Path, output: &Path) -> Vec<String> {
        args![
            self.script.to_string_lossy(),
            "eval",
            "--content-image",
            input.to_string_lossy(),
            "--model",
            model.path.to_string_lossy(),
            "--output-image",
            output.to_string_lossy(),
            "--cuda",
            if self.use_cuda { "1" } else { "0" },
        ]
    }
}

impl Stylizer for CommandStylizer {
    type Model = TorchModel;

    fn load_model(&self, path: &Path) -> PipelineResult<TorchModel> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| PipelineError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(PipelineError::ModelLoad(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        if ext.as_deref() != Some(self.model_extension.as_str()) {
            return Err(PipelineError::ModelLoad(format!(
                "{} is not a .{} model",
                path.display(),
                self.model_extension
            )));
        }

        if metadata.len() == 0 {
            return Err(PipelineError::ModelLoad(format!(
                "{} is empty",
                path.display()
            )));
        }

        info!("Loaded style model {}", path.display());
        Ok(TorchModel {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    fn apply(&self, model: &TorchModel, input: &Path, output: &Path) -> PipelineResult<()> {
        let args = self.eval_args(model, input, output);
        debug!("Running {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| PipelineError::Stylization(format!("failed to start {}: {}", self.program, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(PipelineError::Stylization(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }

        if !output.is_file() {
            return Err(PipelineError::Stylization(format!(
                "no output written to {}",
                output.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stylizer() -> CommandStylizer {
        CommandStylizer::new("python3", "/studio/neural_style.py", "pth")
    }

    #[test]
    fn test_load_missing_model() {
        let err = stylizer().load_model(Path::new("/nope/mosaic.pth")).unwrap_err();
        assert!(matches!(err, PipelineError::ModelLoad(_)));
        assert!(err.to_string().contains("/nope/mosaic.pth"));
    }

    #[test]
    fn test_load_rejects_malformed_artifacts() {
        let temp_dir = TempDir::new().unwrap();

        let empty = temp_dir.path().join("candy.pth");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(stylizer().load_model(&empty), Err(PipelineError::ModelLoad(_))));

        let wrong_ext = temp_dir.path().join("candy.onnx");
        std::fs::write(&wrong_ext, b"weights").unwrap();
        assert!(matches!(stylizer().load_model(&wrong_ext), Err(PipelineError::ModelLoad(_))));

        assert!(matches!(stylizer().load_model(temp_dir.path()), Err(PipelineError::ModelLoad(_))));
    }

    #[test]
    fn test_load_valid_model() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("udnie.pth");
        std::fs::write(&path, b"weights").unwrap();

        let model = stylizer().load_model(&path).unwrap();
        assert_eq!(model.path, path);
        assert_eq!(model.size, 7);
    }

    #[test]
    fn test_eval_args() {
        let model = TorchModel { path: PathBuf::from("/m/mosaic.pth"), size: 1 };
        let args = stylizer()
            .with_cuda(true)
            .eval_args(&model, Path::new("/in/cat.png"), Path::new("/out/x.jpg"));
        assert_eq!(
            args,
            vec![
                "/studio/neural_style.py", "eval",
                "--content-image", "/in/cat.png",
                "--model", "/m/mosaic.pth",
                "--output-image", "/out/x.jpg",
                "--cuda", "1",
            ]
        );
    }

    #[test]
    fn test_from_config_passes_cuda_flag() {
        let model = TorchModel { path: PathBuf::from("/m/mosaic.pth"), size: 1 };
        let cuda_flag = |use_cuda| {
            let config = crate::Config { use_cuda, ..Default::default() };
            CommandStylizer::from_config(&config)
                .eval_args(&model, Path::new("in.jpg"), Path::new("out.jpg"))
                .last()
                .cloned()
        };
        assert_eq!(cuda_flag(false).as_deref(), Some("0"));
        assert_eq!(cuda_flag(true).as_deref(), Some("1"));
    }

    #[test]
    fn test_apply_reports_spawn_failure() {
        let model = TorchModel { path: PathBuf::from("/m/mosaic.pth"), size: 1 };
        let err = CommandStylizer::new("/definitely/not/a/program", "s.py", "pth")
            .apply(&model, Path::new("in.jpg"), Path::new("out.jpg"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Stylization(_)));
    }
}
