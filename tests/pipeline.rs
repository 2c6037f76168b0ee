//! End-to-end runs of the orchestrator against stub stylizers.

use chrono::{NaiveDate, NaiveDateTime};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use style_transfer_studio::{
    Config, PipelineError, PipelineOrchestrator, PipelineResult, PipelineState, SourceSelection,
    Stylizer, StylizeRequest,
};
use tempfile::TempDir;

/// Records what it was asked to do and writes a small JPEG
#[derive(Default)]
struct RecordingStylizer {
    calls: Mutex<Vec<(PathBuf, u64, PathBuf)>>,
}

impl Stylizer for RecordingStylizer {
    type Model = PathBuf;

    fn load_model(&self, path: &Path) -> PipelineResult<PathBuf> {
        Ok(path.to_path_buf())
    }

    fn apply(&self, _model: &PathBuf, input: &Path, output: &Path) -> PipelineResult<()> {
        let input_size = std::fs::metadata(input)?.len();
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), input_size, output.to_path_buf()));
        DynamicImage::new_rgb8(8, 8)
            .save(output)
            .map_err(|e| PipelineError::Stylization(e.to_string()))
    }
}

struct MissingModelStylizer {
    applied: Mutex<bool>,
}

impl Stylizer for MissingModelStylizer {
    type Model = ();

    fn load_model(&self, _path: &Path) -> PipelineResult<()> {
        Err(PipelineError::ModelLoad("not found".to_string()))
    }

    fn apply(&self, _model: &(), _input: &Path, _output: &Path) -> PipelineResult<()> {
        *self.applied.lock().unwrap() = true;
        Ok(())
    }
}

struct FailingInference;

impl Stylizer for FailingInference {
    type Model = ();

    fn load_model(&self, _path: &Path) -> PipelineResult<()> {
        Ok(())
    }

    fn apply(&self, _model: &(), _input: &Path, _output: &Path) -> PipelineResult<()> {
        Err(PipelineError::Stylization("CUDA out of memory".to_string()))
    }
}

/// Reports success without producing an image
struct SilentStylizer;

impl Stylizer for SilentStylizer {
    type Model = ();

    fn load_model(&self, _path: &Path) -> PipelineResult<()> {
        Ok(())
    }

    fn apply(&self, _model: &(), _input: &Path, _output: &Path) -> PipelineResult<()> {
        Ok(())
    }
}

struct PanickingStylizer;

impl Stylizer for PanickingStylizer {
    type Model = ();

    fn load_model(&self, _path: &Path) -> PipelineResult<()> {
        Ok(())
    }

    fn apply(&self, _model: &(), _input: &Path, _output: &Path) -> PipelineResult<()> {
        panic!("inference backend crashed");
    }
}

struct SlowStylizer;

impl Stylizer for SlowStylizer {
    type Model = ();

    fn load_model(&self, _path: &Path) -> PipelineResult<()> {
        Ok(())
    }

    fn apply(&self, _model: &(), _input: &Path, _output: &Path) -> PipelineResult<()> {
        std::thread::sleep(std::time::Duration::from_secs(3));
        Ok(())
    }
}

fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(9, 30, 15)
        .unwrap()
}

fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

/// Gradient with low-amplitude noise: heavy as PNG, light as JPEG
fn large_photo(width: u32, height: u32) -> DynamicImage {
    let mut seed: u32 = 42;
    let img = RgbImage::from_fn(width, height, |x, y| {
        let mut noise = || {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            ((seed >> 16) & 0x0f) as u8
        };
        let base = ((x + y) % 224) as u8;
        Rgb([base + noise(), base / 2 + noise(), 200 - base / 4 + noise()])
    });
    DynamicImage::ImageRgb8(img)
}

/// Studio root with one library image and one model per default style
fn studio(temp_dir: &TempDir) -> Config {
    let root = temp_dir.path().join("neural_style");
    let content = root.join("images").join("content-images");
    let models = root.join("saved_models");
    std::fs::create_dir_all(&content).unwrap();
    std::fs::create_dir_all(&models).unwrap();

    DynamicImage::new_rgb8(64, 48).save(content.join("cat.png")).unwrap();
    for style in ["candy", "mosaic", "rain_princess", "udnie"] {
        std::fs::write(models.join(format!("{}.pth", style)), b"weights").unwrap();
    }

    Config {
        root_dir: root,
        upload_dir: temp_dir.path().join("uploaded_images"),
        ..Default::default()
    }
}

fn output_files(config: &Config) -> Vec<PathBuf> {
    let dir = config.root_dir.join("images").join("output-images");
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn library_image_run_completes() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);
    let stylizer = Arc::new(RecordingStylizer::default());

    let report = PipelineOrchestrator::with_shared_stylizer(config.clone(), Arc::clone(&stylizer))
        .unwrap()
        .with_clock(fixed_clock)
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "mosaic"))
        .await;

    assert_eq!(report.state, PipelineState::Completed);
    assert!(report.error.is_none());
    assert!(report.compression.is_none());
    assert_eq!(
        report.history,
        vec![
            PipelineState::Idle,
            PipelineState::SourceReady,
            PipelineState::Compressed,
            PipelineState::Stylizing,
            PipelineState::Completed,
        ]
    );

    let artifact = report.artifact.unwrap();
    assert_eq!(
        artifact.path,
        config
            .root_dir
            .join("images/output-images/mosaic-cat.png-20240517-093015.jpg")
    );
    assert!(artifact.path.is_file());
    assert_eq!(artifact.style_id, "mosaic");
    assert_eq!(artifact.download_name(), "stylized-cat.png");

    let calls = stylizer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, config.root_dir.join("images/content-images/cat.png"));
}

#[tokio::test]
async fn artifact_name_uses_current_time_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);

    let report = PipelineOrchestrator::new(config, RecordingStylizer::default())
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "candy"))
        .await;

    let name = report.artifact.unwrap().path.file_name().unwrap().to_string_lossy().to_string();
    let stamp = name
        .strip_prefix("candy-cat.png-")
        .and_then(|rest| rest.strip_suffix(".jpg"))
        .unwrap();
    assert!(NaiveDateTime::parse_from_str(stamp, "%Y%m%d-%H%M%S").is_ok());
}

#[tokio::test]
async fn model_load_failure_ends_in_failed_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);
    let stylizer = Arc::new(MissingModelStylizer { applied: Mutex::new(false) });

    let report = PipelineOrchestrator::with_shared_stylizer(config.clone(), Arc::clone(&stylizer))
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "mosaic"))
        .await;

    assert_eq!(report.state, PipelineState::Failed);
    assert!(report.error.as_deref().unwrap().contains("not found"));
    assert!(report.artifact.is_none());
    assert_eq!(report.history.last(), Some(&PipelineState::Failed));
    assert!(!*stylizer.applied.lock().unwrap());
    assert!(output_files(&config).is_empty());
}

#[tokio::test]
async fn large_upload_is_compressed_before_stylization() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        target_size_kb: 1024,
        ..studio(&temp_dir)
    };
    let upload = png_bytes(&large_photo(2000, 1500));
    assert!(upload.len() > 1024 * 1024);
    let upload_len = upload.len() as u64;
    let stylizer = Arc::new(RecordingStylizer::default());

    let report = PipelineOrchestrator::with_shared_stylizer(config.clone(), Arc::clone(&stylizer))
        .unwrap()
        .with_clock(fixed_clock)
        .run(StylizeRequest::new(SourceSelection::upload("holiday.png", upload), "udnie"))
        .await;

    assert_eq!(report.state, PipelineState::Completed, "{:?}", report.error);

    let compression = report.compression.unwrap();
    assert_eq!(compression.original_bytes, upload_len);
    assert!(compression.achieved_size_kb() <= 1024.0);
    assert!(compression.within_budget);
    assert_eq!(compression.attempts.first(), Some(&50));

    let compressed_at = report.history.iter().position(|s| *s == PipelineState::Compressed);
    let stylizing_at = report.history.iter().position(|s| *s == PipelineState::Stylizing);
    assert!(compressed_at < stylizing_at);

    // The stylizer saw the compressed file, not the raw upload
    let calls = stylizer.calls.lock().unwrap();
    assert_eq!(calls[0].0, compression.path);
    assert_eq!(calls[0].1, compression.achieved_bytes);
    assert!(calls[0].1 <= 1024 * 1024);

    // Raw upload is kept, artifact keeps the original name
    assert!(config.upload_dir.join("holiday.png").is_file());
    assert_eq!(
        report.artifact.unwrap().path.file_name().unwrap(),
        "udnie-holiday.png-20240517-093015.jpg"
    );
}

#[tokio::test]
async fn undecodable_upload_fails_before_stylizer() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);
    let stylizer = Arc::new(RecordingStylizer::default());

    let report = PipelineOrchestrator::with_shared_stylizer(config, Arc::clone(&stylizer))
        .unwrap()
        .run(StylizeRequest::new(
            SourceSelection::upload("broken.jpg", b"definitely not a jpeg".to_vec()),
            "candy",
        ))
        .await;

    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(report.history, vec![PipelineState::Idle, PipelineState::Failed]);
    assert!(report.error.unwrap().starts_with("Image decode error"));
    assert!(stylizer.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn inference_failure_message_is_kept_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);

    let report = PipelineOrchestrator::new(config, FailingInference)
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "rain_princess"))
        .await;

    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(
        report.history,
        vec![
            PipelineState::Idle,
            PipelineState::SourceReady,
            PipelineState::Compressed,
            PipelineState::Stylizing,
            PipelineState::Failed,
        ]
    );
    assert!(report.error.unwrap().contains("CUDA out of memory"));
}

#[tokio::test]
async fn missing_output_file_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);

    let report = PipelineOrchestrator::new(config.clone(), SilentStylizer)
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "mosaic"))
        .await;

    assert_eq!(report.state, PipelineState::Failed);
    assert!(report.artifact.is_none());
    assert_eq!(
        report.history,
        vec![
            PipelineState::Idle,
            PipelineState::SourceReady,
            PipelineState::Compressed,
            PipelineState::Stylizing,
            PipelineState::Failed,
        ]
    );
    let error = report.error.unwrap();
    assert!(error.starts_with("Stylization error: no output written to"), "{}", error);
    assert!(output_files(&config).is_empty());
}

#[tokio::test]
async fn unwritable_output_dir_fails_with_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"plain file").unwrap();
    let config = Config {
        output_dir: Some(blocker.join("outputs")),
        ..studio(&temp_dir)
    };
    let stylizer = Arc::new(RecordingStylizer::default());

    let report = PipelineOrchestrator::with_shared_stylizer(config, Arc::clone(&stylizer))
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "candy"))
        .await;

    assert_eq!(report.state, PipelineState::Failed);
    assert!(report.error.as_deref().unwrap().starts_with("IO error"));
    assert_eq!(
        report.history,
        vec![
            PipelineState::Idle,
            PipelineState::SourceReady,
            PipelineState::Compressed,
            PipelineState::Failed,
        ]
    );
    assert!(stylizer.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn panicking_stylizer_fails_without_taking_down_the_caller() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);

    let report = PipelineOrchestrator::new(config, PanickingStylizer)
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "udnie"))
        .await;

    assert_eq!(report.state, PipelineState::Failed);
    assert!(report.error.unwrap().contains("stylizer task failed"));
}

#[tokio::test]
async fn unknown_style_and_image_fail_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let config = studio(&temp_dir);

    let report = PipelineOrchestrator::new(config.clone(), RecordingStylizer::default())
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "cubism"))
        .await;
    assert_eq!(report.state, PipelineState::Failed);
    assert!(report.error.unwrap().contains("cubism"));

    let report = PipelineOrchestrator::new(config, RecordingStylizer::default())
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("dog.png"), "mosaic"))
        .await;
    assert_eq!(report.state, PipelineState::Failed);
    assert!(report.error.unwrap().contains("dog.png"));
}

#[tokio::test]
async fn stylization_timeout_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        stylize_timeout_secs: Some(1),
        ..studio(&temp_dir)
    };

    let report = PipelineOrchestrator::new(config, SlowStylizer)
        .unwrap()
        .run(StylizeRequest::new(SourceSelection::library("cat.png"), "mosaic"))
        .await;

    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(report.error.as_deref(), Some("Stylization timed out after 1 seconds"));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = Config {
        target_size_kb: 0,
        ..Default::default()
    };
    assert!(PipelineOrchestrator::new(config, RecordingStylizer::default()).is_err());
}
