//! # Hasher Module
//!
//! Perceptual page hashing (aHash) for duplicate detection.
//!
//! ## How It Works
//! 1. Convert the page to a grayscale plane
//! 2. Downscale to a small fixed grid (8x8 by default)
//! 3. Compute the mean brightness over the grid
//! 4. Emit one bit per sample: 1 if brighter than the mean, else 0
//!
//! aHash is cheap (one small downscale + one pass) and tolerant of minor
//! recompression artifacts. Matching is exact string equality; a single
//! differing bit is a miss. That keeps false-positive duplicate flags off
//! genuinely distinct but visually similar pages, at the cost of missing
//! near-identical recaptures.
//!
//! ## Performance
//! Uses `fast_image_resize` for the SIMD-accelerated downscale, the same
//! path a full-size resize would take but over a single-channel plane.

use crate::core::pixel::{GrayscaleMethod, PixelBuffer};
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A computed page fingerprint.
///
/// `Perceptual` is the aHash bitstring ('0'/'1' per grid sample, raster
/// order). `Degraded` is the scalar fallback used when the downscale
/// primitive fails; it is clearly weaker and exists so the engine degrades
/// instead of crashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageHash {
    /// Bitstring from the average-hash grid
    Perceptual(String),
    /// Scalar fallback: width, height, first and last raw channel value
    Degraded(String),
}

impl PageHash {
    /// The raw hash string, regardless of how it was produced
    pub fn as_str(&self) -> &str {
        match self {
            PageHash::Perceptual(s) | PageHash::Degraded(s) => s,
        }
    }

    /// Whether this hash came from the weakened fallback path
    pub fn is_degraded(&self) -> bool {
        matches!(self, PageHash::Degraded(_))
    }

    /// Whether two hashes identify the same page.
    ///
    /// Exact equality only. This is the single seam where a
    /// Hamming-distance tolerance would go if duplicate matching is ever
    /// loosened; callers must not compare hash strings directly.
    pub fn matches(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl fmt::Display for PageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Average-hash (aHash) page hasher
pub struct PageHasher {
    /// Grid edge length; the hash has `grid_size * grid_size` bits
    grid_size: u32,
    grayscale: GrayscaleMethod,
}

impl PageHasher {
    /// Create a hasher over a `grid_size` x `grid_size` sample grid
    pub fn new(grid_size: u32, grayscale: GrayscaleMethod) -> Self {
        Self {
            grid_size,
            grayscale,
        }
    }

    /// Hash a page, falling back to the scalar hash if downscaling fails.
    ///
    /// The fallback is logged and marked on the returned value so callers
    /// can tell a confident duplicate check from a degraded one.
    pub fn hash(&self, buffer: &PixelBuffer) -> PageHash {
        match self.average_hash(buffer) {
            Ok(bits) => PageHash::Perceptual(bits),
            Err(reason) => {
                warn!(
                    width = buffer.width(),
                    height = buffer.height(),
                    %reason,
                    "perceptual hash unavailable, using degraded scalar hash"
                );
                PageHash::Degraded(Self::degraded_hash(buffer))
            }
        }
    }

    /// Primary path: downscale a grayscale plane and threshold against its mean
    fn average_hash(&self, buffer: &PixelBuffer) -> Result<String, String> {
        let samples = self.downscale_gray(buffer)?;

        let total: u64 = samples.iter().map(|&s| s as u64).sum();
        let mean = total as f64 / samples.len() as f64;

        let bits = samples
            .iter()
            .map(|&s| if s as f64 > mean { '1' } else { '0' })
            .collect();

        Ok(bits)
    }

    /// Grayscale the page and resize it to the hash grid
    fn downscale_gray(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, String> {
        let mut gray = Vec::with_capacity(buffer.pixel_count());
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                gray.push(self.grayscale.luminance_at(buffer, x, y).round() as u8);
            }
        }

        let src = Image::from_vec_u8(buffer.width(), buffer.height(), gray, PixelType::U8)
            .map_err(|e| format!("failed to create source plane: {e}"))?;
        let mut dst = Image::new(self.grid_size, self.grid_size, PixelType::U8);

        let options = ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
            fast_image_resize::FilterType::Bilinear,
        ));

        Resizer::new()
            .resize(&src, &mut dst, &options)
            .map_err(|e| format!("resize failed: {e}"))?;

        Ok(dst.into_vec())
    }

    /// Weakened fallback from dimensions and the first and last raw channel value
    fn degraded_hash(buffer: &PixelBuffer) -> String {
        let data = buffer.data();
        format!(
            "{}-{}-{}-{}",
            buffer.width(),
            buffer.height(),
            data[0],
            data[data.len() - 1]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: u32 = 8;

    fn hasher() -> PageHasher {
        PageHasher::new(GRID, GrayscaleMethod::ChannelAverage)
    }

    fn buffer_from_fn(width: u32, height: u32, gray: impl Fn(u32, u32) -> u8) -> PixelBuffer {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let v = gray(x, y);
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PixelBuffer::from_rgba(width, height, data).unwrap()
    }

    #[test]
    fn hash_is_64_bits_in_raster_order() {
        let buffer = buffer_from_fn(100, 100, |x, _| if x < 50 { 0 } else { 255 });
        let hash = hasher().hash(&buffer);

        assert!(!hash.is_degraded());
        assert_eq!(hash.as_str().len(), 64);
        assert!(hash.as_str().chars().all(|c| c == '0' || c == '1'));

        // Left half dark, right half bright: every row reads 0000 1111
        assert_eq!(&hash.as_str()[..8], "00001111");
    }

    #[test]
    fn hashing_is_deterministic() {
        let buffer = buffer_from_fn(120, 90, |x, y| ((x * 7 + y * 13) % 256) as u8);

        let first = hasher().hash(&buffer);
        let second = hasher().hash(&buffer);

        assert_eq!(first, second);
    }

    #[test]
    fn solid_page_hashes_to_all_zeros() {
        // No sample exceeds the mean when every sample equals it
        let buffer = buffer_from_fn(64, 64, |_, _| 200);
        let hash = hasher().hash(&buffer);

        assert_eq!(hash.as_str(), "0".repeat(64));
    }

    #[test]
    fn distinct_pages_hash_differently() {
        // Left half dark vs top half dark: same mean, different bit layout
        let left_dark = buffer_from_fn(100, 100, |x, _| if x < 50 { 0 } else { 255 });
        let top_dark = buffer_from_fn(100, 100, |_, y| if y < 50 { 0 } else { 255 });

        let a = hasher().hash(&left_dark);
        let b = hasher().hash(&top_dark);

        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn matches_is_exact() {
        let hash = PageHash::Perceptual("1010".to_string());

        assert!(hash.matches("1010"));
        assert!(!hash.matches("1011"));
        assert!(!hash.matches("10"));
    }

    #[test]
    fn degraded_hash_encodes_dimensions_and_corners() {
        let mut data = vec![0u8; 3 * 3 * 4];
        data[0] = 17;
        let last = data.len() - 1;
        data[last] = 99;
        let buffer = PixelBuffer::from_rgba(3, 3, data).unwrap();

        assert_eq!(PageHasher::degraded_hash(&buffer), "3-3-17-99");
    }

    #[test]
    fn degraded_flag_is_visible() {
        assert!(PageHash::Degraded("1-1-0-0".to_string()).is_degraded());
        assert!(!PageHash::Perceptual("0".repeat(64)).is_degraded());
    }
}
