//! # Style Transfer Studio - Main Entry Point
//!
//! Punto di ingresso della CLI `style-transfer`.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (file JSON + override da CLI)
//! - Render dei pannelli di anteprima, avvio della run e report finale
//!
//! ## Esempio di utilizzo:
//! ```bash
//! style-transfer --root neural_style --image cat.png --style mosaic
//! style-transfer --upload ~/Pictures/me.jpg --style udnie --target-size-kb 512 --json
//! style-transfer --list
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use style_transfer_studio::{
    file_manager::FileManager,
    json_output::JsonMessage,
    preview::{self, PreviewPanes},
    CommandStylizer, Config, PipelineOrchestrator, SourceSelection, StudioLayout, StylizeRequest,
};

#[derive(Parser)]
#[command(name = "style-transfer")]
#[command(about = "Apply a pretrained neural style to an image")]
struct Args {
    /// Library image name (from images/content-images)
    #[arg(short, long, conflicts_with = "upload")]
    image: Option<String>,

    /// Upload your own image instead of using the library
    #[arg(short, long)]
    upload: Option<PathBuf>,

    /// Style identifier (candy, mosaic, rain_princess, udnie, ...)
    #[arg(short, long)]
    style: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory holding images/ and saved_models/
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Directory where uploads are saved
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Output directory for stylized images
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Size budget for uploaded images, in KB
    #[arg(short, long)]
    target_size_kb: Option<u32>,

    /// Give up waiting for the stylizer after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Interpreter used to run the inference script
    #[arg(long)]
    program: Option<String>,

    /// Inference script (relative to the root)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Run inference on the GPU
    #[arg(long)]
    cuda: bool,

    /// Also write a 500x500 display copy of the result here
    #[arg(long)]
    display_output: Option<PathBuf>,

    /// List library images and styles, then exit
    #[arg(long)]
    list: bool,

    /// Output progress and status as JSON lines
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref root) = self.root {
            config.root_dir = root.clone();
        }
        if let Some(ref upload_dir) = self.upload_dir {
            config.upload_dir = upload_dir.clone();
        }
        if let Some(ref output) = self.output {
            config.output_dir = Some(output.clone());
        }
        if let Some(target) = self.target_size_kb {
            config.target_size_kb = target;
        }
        if let Some(timeout) = self.timeout {
            config.stylize_timeout_secs = Some(timeout);
        }
        if let Some(ref program) = self.program {
            config.stylizer_program = program.clone();
        }
        if let Some(ref script) = self.script {
            config.stylizer_script = script.clone();
        }
        config.use_cuda |= self.cuda;
        config.json_output |= self.json;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; logs go to stderr so --json keeps stdout clean
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    let layout = StudioLayout::from_config(&config);

    if args.list {
        list_library(&config, &layout);
        return Ok(());
    }

    let style_id = args
        .style
        .clone()
        .ok_or_else(|| anyhow::anyhow!("--style is required (see --list)"))?;

    let source = match (&args.image, &args.upload) {
        (_, Some(upload)) => {
            if !upload.is_file() {
                return Err(anyhow::anyhow!("Upload file does not exist: {}", upload.display()));
            }
            let bytes = tokio::fs::read(upload).await?;
            SourceSelection::upload(FileManager::basename(upload), bytes)
        }
        (Some(name), None) => SourceSelection::library(name.clone()),
        (None, None) => {
            return Err(anyhow::anyhow!("Choose a library image with --image or upload one with --upload"));
        }
    };

    render_previews(&config, &layout, &source, &style_id);

    let stylizer = CommandStylizer::from_config(&config);
    if let Err(e) = stylizer.check_available() {
        warn!("{}", e);
    }

    let orchestrator = PipelineOrchestrator::new(config.clone(), stylizer)?
        .with_progress(!config.json_output);
    let report = orchestrator.run(StylizeRequest::new(source, style_id)).await;

    if !config.json_output {
        println!("{}", report.format_summary());
    }

    let artifact = match report.artifact.as_ref() {
        Some(artifact) if report.is_completed() => artifact,
        _ => std::process::exit(1),
    };

    info!("Download as: {}", artifact.download_name());
    if let Some(ref display_path) = args.display_output {
        match preview::result_display(&artifact.path) {
            Ok(display) => {
                display.save(display_path)?;
                info!("Display copy written to {}", display_path.display());
            }
            Err(e) => warn!("Could not render display copy: {}", e),
        }
    }

    Ok(())
}

/// Print library images and styles
fn list_library(config: &Config, layout: &StudioLayout) {
    let images: Vec<String> = match FileManager::find_library_images(&layout.content_dir()) {
        Ok(found) if !found.is_empty() => found.iter().map(|p| FileManager::basename(p)).collect(),
        Ok(_) => config.library_images.clone(),
        Err(e) => {
            warn!("{}; showing configured library", e);
            config.library_images.clone()
        }
    };

    if config.json_output {
        JsonMessage::library(images, config.styles.clone()).emit();
        return;
    }

    println!("Source images:");
    for image in &images {
        println!("  {}", image);
    }
    println!("Styles:");
    for style in &config.styles {
        println!("  {}", style);
    }
}

/// Source and Style panes; each failure is reported inline and never stops the run
fn render_previews(config: &Config, layout: &StudioLayout, source: &SourceSelection, style_id: &str) {
    let panes = PreviewPanes::render(layout, source, style_id);
    for (pane, result) in [("source", &panes.source), ("style", &panes.style)] {
        match result {
            Ok(preview) => info!(
                "{} preview ready ({}x{})",
                pane, preview.original_dimensions.0, preview.original_dimensions.1
            ),
            Err(message) => {
                warn!("{}", message);
                if config.json_output {
                    JsonMessage::preview_error(pane, message.clone()).emit();
                }
            }
        }
    }
}
