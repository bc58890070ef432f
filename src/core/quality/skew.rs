//! Skew estimation extension point.

use crate::core::pixel::PixelBuffer;

/// Estimates the rotation of a scanned page from upright, in degrees.
///
/// The engine flags a page as skewed when the estimated angle exceeds its
/// configured threshold; implementations only produce the angle.
pub trait SkewEstimator: Send + Sync {
    /// Estimated skew angle in degrees; positive is clockwise
    fn estimate_skew(&self, buffer: &PixelBuffer) -> f64;
}

/// Placeholder skew estimator.
///
/// Always reports 0 degrees. Reliable skew estimation needs edge detection
/// plus a line-orientation vote (Hough-style) over detected text or ruling
/// lines; until that lands, reporting no skew avoids false positives that
/// would make operators retake good pages.
pub struct HoughSkewEstimator;

impl SkewEstimator for HoughSkewEstimator {
    fn estimate_skew(&self, _buffer: &PixelBuffer) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_buffer() -> PixelBuffer {
        PixelBuffer::from_rgba(4, 4, vec![128; 4 * 4 * 4]).unwrap()
    }

    #[test]
    fn placeholder_reports_no_skew() {
        let estimator = HoughSkewEstimator;
        assert_eq!(estimator.estimate_skew(&any_buffer()), 0.0);
    }

    #[test]
    fn estimators_are_swappable() {
        struct FixedAngle(f64);
        impl SkewEstimator for FixedAngle {
            fn estimate_skew(&self, _buffer: &PixelBuffer) -> f64 {
                self.0
            }
        }

        let estimator: Box<dyn SkewEstimator> = Box::new(FixedAngle(3.5));
        assert_eq!(estimator.estimate_skew(&any_buffer()), 3.5);
    }
}
