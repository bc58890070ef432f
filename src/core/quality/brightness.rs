//! Blank page detection from mean brightness.

use crate::core::pixel::{GrayscaleMethod, PixelBuffer};

/// Detects blank pages by mean brightness.
///
/// A near-pure-white page (mean above ~98% of the scale) is almost
/// certainly blank. The threshold is deliberately conservative so
/// light-colored but non-blank scans do not trip it; a deliberate blank
/// cover sheet will, and that is an accepted false positive.
pub struct BrightnessAnalyzer {
    /// Mean brightness above which the page is classified blank (0-255 scale)
    threshold: f64,
    grayscale: GrayscaleMethod,
}

impl BrightnessAnalyzer {
    /// Create an analyzer with the given blank threshold
    pub fn new(threshold: f64, grayscale: GrayscaleMethod) -> Self {
        Self {
            threshold,
            grayscale,
        }
    }

    /// Mean grayscale brightness over every pixel, in 0.0..=255.0
    pub fn mean_brightness(&self, buffer: &PixelBuffer) -> f64 {
        let mut total = 0.0;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                total += self.grayscale.luminance_at(buffer, x, y);
            }
        }
        total / buffer.pixel_count() as f64
    }

    /// Analyze the page; returns (is_blank, mean_brightness)
    pub fn analyze(&self, buffer: &PixelBuffer) -> (bool, f64) {
        let mean = self.mean_brightness(buffer);
        (mean > self.threshold, mean)
    }
}
