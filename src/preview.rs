//! # Preview Module
//!
//! Anteprime per chi presenta la run: immagine sorgente, immagine di stile
//! e risultato finale.
//!
//! I due pannelli (Source / Style) falliscono in modo indipendente: un errore
//! su uno diventa un messaggio inline e non blocca né l'altro pannello né la
//! run vera e propria.

use crate::{
    error::{PipelineError, PipelineResult},
    layout::StudioLayout,
    pipeline::SourceSelection,
};
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use std::path::Path;

/// Width of the Source/Style panes
pub const PANE_WIDTH: u32 = 300;
/// Square size of the displayed result
pub const RESULT_SIZE: u32 = 500;

/// One rendered pane
#[derive(Debug, Clone)]
pub struct Preview {
    pub image: DynamicImage,
    pub original_dimensions: (u32, u32),
}

/// Source and Style panes, each rendered or failed on its own
#[derive(Debug)]
pub struct PreviewPanes {
    pub source: Result<Preview, String>,
    pub style: Result<Preview, String>,
}

impl PreviewPanes {
    /// Render both panes; a failure in one never affects the other
    pub fn render(layout: &StudioLayout, source: &SourceSelection, style_id: &str) -> Self {
        let source = source_preview(layout, source)
            .map_err(|e| format!("Error loading source image: {}", e));
        let style = style_preview(layout, style_id)
            .map_err(|e| format!("Error loading style image: {}", e));

        Self { source, style }
    }
}

fn source_preview(layout: &StudioLayout, selection: &SourceSelection) -> PipelineResult<Preview> {
    match selection {
        SourceSelection::Library { name } => pane_from_path(&layout.library_image(name)?),
        SourceSelection::Upload { bytes, .. } => {
            let image = image::load_from_memory(bytes).map_err(PipelineError::decode)?;
            Ok(pane(image))
        }
    }
}

fn style_preview(layout: &StudioLayout, style_id: &str) -> PipelineResult<Preview> {
    let style = layout.style(style_id)?;
    pane_from_path(&style.style_image_path)
}

fn pane_from_path(path: &Path) -> PipelineResult<Preview> {
    let image = image::open(path)
        .map_err(|e| PipelineError::ImageDecode(format!("{}: {}", path.display(), e)))?;
    Ok(pane(image))
}

/// Scale to the pane width keeping the aspect ratio
fn pane(image: DynamicImage) -> Preview {
    let original_dimensions = image.dimensions();
    let (width, height) = original_dimensions;
    let scaled_height = ((height as f64 * PANE_WIDTH as f64 / width.max(1) as f64).round() as u32).max(1);

    Preview {
        image: image.resize_exact(PANE_WIDTH, scaled_height, FilterType::Triangle),
        original_dimensions,
    }
}

/// Load a stylized artifact and stretch it to the fixed result size
pub fn result_display(path: &Path) -> PipelineResult<DynamicImage> {
    let image = image::open(path)
        .map_err(|e| PipelineError::ImageDecode(format!("{}: {}", path.display(), e)))?;
    Ok(image.resize_exact(RESULT_SIZE, RESULT_SIZE, FilterType::Triangle))
}
