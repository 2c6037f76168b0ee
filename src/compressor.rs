//! # Adaptive Compressor Module
//!
//! Ricodifica un'immagine in JPEG abbassando progressivamente la qualità
//! finché il risultato non rientra nel budget in KB.
//!
//! ## Strategia:
//! 1. Conversione a RGB 8-bit (il JPEG non supporta alpha)
//! 2. Encode alla `start_quality`, misura dei byte prodotti
//! 3. Se `size_kb <= target_size_kb` ritorna subito
//! 4. Altrimenti qualità -= `step`, fino al floor `min_quality` incluso
//! 5. Se il floor non basta ritorna l'ultimo tentativo (best-effort, non è un errore)
//!
//! ## Esempio:
//! ```rust
//! use style_transfer_studio::compressor::{AdaptiveCompressor, CompressionSettings};
//!
//! let image = image::DynamicImage::new_rgb8(10, 10);
//! let result = AdaptiveCompressor::new(CompressionSettings::default())
//!     .compress(&image, 1024)
//!     .unwrap();
//! assert_eq!(result.quality, 50);
//! ```

use crate::error::{PipelineError, PipelineResult};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Quality schedule of the compressor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionSettings {
    pub start_quality: u8,
    pub min_quality: u8,
    pub step: u8,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            start_quality: 50,
            min_quality: 30,
            step: 5,
        }
    }
}

impl From<&crate::Config> for CompressionSettings {
    fn from(config: &crate::Config) -> Self {
        Self {
            start_quality: config.start_quality,
            min_quality: config.min_quality,
            step: config.quality_step,
        }
    }
}

impl CompressionSettings {
    fn validate(&self, target_size_kb: u32) -> PipelineResult<()> {
        if target_size_kb == 0 {
            return Err(PipelineError::Validation(
                "Target size must be greater than 0 KB".to_string(),
            ));
        }
        if self.start_quality == 0 || self.start_quality > 100 {
            return Err(PipelineError::Validation(format!(
                "Start quality {} outside 1-100",
                self.start_quality
            )));
        }
        if self.min_quality == 0 || self.min_quality > self.start_quality {
            return Err(PipelineError::Validation(format!(
                "Minimum quality {} outside 1-{}",
                self.min_quality, self.start_quality
            )));
        }
        if self.step == 0 {
            return Err(PipelineError::Validation(
                "Quality step must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A re-encoded JPEG buffer and how it was produced
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// Encoded JPEG bytes
    pub data: Vec<u8>,
    /// Quality of the returned encoding
    pub quality: u8,
    /// Every quality tried, in order
    pub attempts: Vec<u8>,
    /// Budget the encoding was measured against
    pub target_size_kb: u32,
}

impl CompressionResult {
    pub fn achieved_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn achieved_size_kb(&self) -> f64 {
        self.data.len() as f64 / 1024.0
    }

    /// True when the encoding fits the budget, false for a floor exit over budget
    pub fn within_budget(&self) -> bool {
        self.achieved_size_kb() <= self.target_size_kb as f64
    }
}

/// Size-bounded JPEG re-encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveCompressor {
    settings: CompressionSettings,
}

impl AdaptiveCompressor {
    pub fn new(settings: CompressionSettings) -> Self {
        Self { settings }
    }

    /// Re-encode `image` so that it fits `target_size_kb`, or return the
    /// floor-quality attempt when no quality in the schedule fits.
    ///
    /// # Errors
    /// - `Validation` for a zero budget or an invalid quality schedule
    /// - `ImageEncode` when the image cannot be encoded at all
    pub fn compress(&self, image: &DynamicImage, target_size_kb: u32) -> PipelineResult<CompressionResult> {
        self.settings.validate(target_size_kb)?;

        let rgb = image.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(PipelineError::ImageEncode(format!(
                "cannot encode a {}x{} image",
                rgb.width(),
                rgb.height()
            )));
        }

        let budget = target_size_kb as f64;
        let mut quality = self.settings.start_quality;
        let mut attempts = Vec::new();

        loop {
            let data = encode_jpeg(&rgb, quality)?;
            attempts.push(quality);
            let size_kb = data.len() as f64 / 1024.0;
            debug!("JPEG attempt at quality {}: {:.1} KB (budget {} KB)", quality, size_kb, target_size_kb);

            if size_kb <= budget {
                info!("Compressed to {:.1} KB at quality {} after {} attempt(s)", size_kb, quality, attempts.len());
                return Ok(CompressionResult { data, quality, attempts, target_size_kb });
            }

            if quality <= self.settings.min_quality {
                warn!(
                    "Quality floor {} reached at {:.1} KB, keeping best-effort encoding over the {} KB budget",
                    quality, size_kb, target_size_kb
                );
                return Ok(CompressionResult { data, quality, attempts, target_size_kb });
            }

            // Clamp so the floor itself is always tried
            quality = quality
                .saturating_sub(self.settings.step)
                .max(self.settings.min_quality);
        }
    }
}

/// One JPEG encode into a fresh buffer
fn encode_jpeg(rgb: &image::RgbImage, quality: u8) -> PipelineResult<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(rgb)
        .map_err(PipelineError::encode)?;
    Ok(buffer)
}
