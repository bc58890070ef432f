//! # Pixel Module
//!
//! Decoded raster buffers and the capability seam for producing them.
//!
//! The analyzers never touch encoded images or the filesystem; they operate
//! on a validated [`PixelBuffer`] of interleaved RGBA bytes. Decoding lives
//! behind the [`PixelSource`] trait so the numeric core stays portable
//! across hosts (server, embedded, webview).

pub mod source;

pub use source::{decode_with_timeout, ImageDecoder, ImageRef, PixelSource};

use crate::error::BufferError;
use serde::{Deserialize, Serialize};

/// Number of channels per pixel in a [`PixelBuffer`]
pub const CHANNELS: usize = 4;

/// Minimum width/height for Laplacian analysis (needs interior pixels)
pub const MIN_ANALYSIS_DIM: u32 = 3;

/// A decoded page image: dense, interleaved RGBA, row-major.
///
/// Owned exclusively by the analysis call that decoded it and dropped once
/// the result is produced. Construction validates the dimension/length
/// invariant so the analyzers can index without bounds anxiety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer from raw RGBA bytes.
    ///
    /// Fails if either dimension is zero or if the data length does not
    /// equal `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::EmptyDimensions { width, height });
        }

        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw interleaved RGBA bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA channels of the pixel at (x, y).
    ///
    /// Callers stay within `width`/`height`; the analyzers iterate the
    /// buffer's own dimensions so this never goes out of range.
    #[inline]
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Check that the buffer has interior pixels for kernel analysis.
    ///
    /// A page smaller than 3x3 has no interior and cannot be meaningfully
    /// quality-checked; rejecting it here keeps the analyzers total.
    pub fn require_interior(&self) -> Result<(), BufferError> {
        if self.width < MIN_ANALYSIS_DIM || self.height < MIN_ANALYSIS_DIM {
            return Err(BufferError::TooSmall {
                width: self.width,
                height: self.height,
                min: MIN_ANALYSIS_DIM,
            });
        }
        Ok(())
    }
}

/// Grayscale conversion strategy.
///
/// The whole engine (blank check, blur check, hashing) reads pixels through
/// one of these, so swapping the strategy changes every threshold's
/// effective meaning at once. The unweighted channel average is the default
/// the thresholds are calibrated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrayscaleMethod {
    /// Unweighted `(R + G + B) / 3`
    ChannelAverage,
    /// Perceptual luma `0.299 R + 0.587 G + 0.114 B`
    Luma,
}

impl Default for GrayscaleMethod {
    fn default() -> Self {
        GrayscaleMethod::ChannelAverage
    }
}

impl GrayscaleMethod {
    /// Grayscale value of an RGB triple, in 0.0..=255.0
    #[inline]
    pub fn luminance(&self, r: u8, g: u8, b: u8) -> f64 {
        match self {
            GrayscaleMethod::ChannelAverage => (r as f64 + g as f64 + b as f64) / 3.0,
            GrayscaleMethod::Luma => 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64,
        }
    }

    /// Grayscale value of the pixel at (x, y)
    #[inline]
    pub fn luminance_at(&self, buffer: &PixelBuffer, x: u32, y: u32) -> f64 {
        let [r, g, b, _] = buffer.rgba(x, y);
        self.luminance(r, g, b)
    }
}
