//! # Quality Analysis Module
//!
//! The per-page defect analyzers: blank detection from mean brightness,
//! blur detection from Laplacian variance, and skew estimation behind a
//! swappable trait.
//!
//! All three are pure functions of a [`PixelBuffer`](crate::core::pixel::PixelBuffer)
//! with no suspension points; the engine fans them out in parallel since
//! none depends on another's output.

mod brightness;
mod sharpness;
mod skew;

pub use brightness::BrightnessAnalyzer;
pub use sharpness::SharpnessAnalyzer;
pub use skew::{HoughSkewEstimator, SkewEstimator};
