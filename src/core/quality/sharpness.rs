//! Blur detection from Laplacian-response variance.

use crate::core::pixel::{GrayscaleMethod, PixelBuffer};
use crate::error::BufferError;

/// Laplacian kernel, row-major 3x3
const LAPLACIAN_KERNEL: [f64; 9] = [0.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 0.0];

/// Sampling stride over interior pixels, in both axes
const SAMPLE_STRIDE: usize = 2;

/// Detects blurred captures by the variance of the Laplacian response.
///
/// The Laplacian operator responds strongly to edges; a low-variance
/// response field means the page lacks sharp edges, i.e. is out of focus.
/// Only every second row and column is sampled, which introduces minor
/// bias on very fine textures but keeps the pass near-instant on
/// multi-megapixel scans.
pub struct SharpnessAnalyzer {
    /// Variance below which the page is classified blurred
    threshold: f64,
    grayscale: GrayscaleMethod,
}

impl SharpnessAnalyzer {
    /// Create an analyzer with the given blur-variance threshold
    pub fn new(threshold: f64, grayscale: GrayscaleMethod) -> Self {
        Self {
            threshold,
            grayscale,
        }
    }

    /// Variance of the Laplacian response over the sampled interior.
    ///
    /// Accumulates sum and sum-of-squares in one pass; the 1-pixel border
    /// is excluded so the kernel never leaves the buffer.
    pub fn laplacian_variance(&self, buffer: &PixelBuffer) -> Result<f64, BufferError> {
        buffer.require_interior()?;

        let width = buffer.width();
        let height = buffer.height();

        let mut sum = 0.0;
        let mut sq_sum = 0.0;
        let mut samples = 0u64;

        for y in (1..height - 1).step_by(SAMPLE_STRIDE) {
            for x in (1..width - 1).step_by(SAMPLE_STRIDE) {
                let mut response = 0.0;
                for ky in 0..3u32 {
                    for kx in 0..3u32 {
                        let weight = LAPLACIAN_KERNEL[(ky * 3 + kx) as usize];
                        if weight == 0.0 {
                            continue;
                        }
                        let gray =
                            self.grayscale
                                .luminance_at(buffer, x + kx - 1, y + ky - 1);
                        response += gray * weight;
                    }
                }
                sum += response;
                sq_sum += response * response;
                samples += 1;
            }
        }

        let n = samples as f64;
        let mean = sum / n;
        Ok(sq_sum / n - mean * mean)
    }

    /// Analyze the page; returns (is_blurred, variance)
    pub fn analyze(&self, buffer: &PixelBuffer) -> Result<(bool, f64), BufferError> {
        let variance = self.laplacian_variance(buffer)?;
        Ok((variance < self.threshold, variance))
    }
}
