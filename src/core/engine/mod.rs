//! # Engine Module
//!
//! Orchestrates decode, the three page analyzers, and the duplicate check
//! into a single [`QcResult`] per captured page.
//!
//! ## Flow
//! 1. Decode the image reference (bounded by the decode timeout)
//! 2. Validate the buffer has interior pixels
//! 3. Run brightness, sharpness, and skew in parallel (they are independent)
//! 4. Hash the page and check it against the batch session
//! 5. Assemble the flags, metrics, and issue labels
//!
//! Any failure along the way is an error; the engine never substitutes a
//! passing result for an analysis it could not run.

use crate::core::hasher::PageHasher;
use crate::core::pixel::{
    decode_with_timeout, GrayscaleMethod, ImageDecoder, ImageRef, PixelBuffer, PixelSource,
};
use crate::core::quality::{
    BrightnessAnalyzer, HoughSkewEstimator, SharpnessAnalyzer, SkewEstimator,
};
use crate::core::session::QcSession;
use crate::error::Result;
use crate::events::{null_sender, AnalysisEvent, EventSender, QcEvent, SessionEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Issue label for a blank page
pub const ISSUE_BLANK: &str = "Blank Page";
/// Issue label for a blurred capture
pub const ISSUE_BLURRED: &str = "Blurred Image";
/// Issue label for a skewed capture
pub const ISSUE_SKEWED: &str = "Skewed (> 2°)";
/// Issue label for a duplicate capture
pub const ISSUE_DUPLICATE: &str = "Potential Duplicate";

/// Tunable thresholds and strategies for the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcConfig {
    /// Mean brightness above which a page is blank (0-255 scale)
    pub blank_brightness_threshold: f64,
    /// Laplacian variance below which a page is blurred
    pub blur_variance_threshold: f64,
    /// Estimated skew angle (degrees) above which a page is skewed
    pub skew_angle_threshold: f64,
    /// Edge length of the perceptual hash grid
    pub hash_grid_size: u32,
    /// Grayscale strategy shared by every analyzer and the hasher
    pub grayscale: GrayscaleMethod,
    /// Upper bound on decode wall-clock time
    pub decode_timeout: Duration,
    /// Static confidence attached to every result
    pub confidence: f64,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            blank_brightness_threshold: 250.0,
            blur_variance_threshold: 100.0,
            skew_angle_threshold: 2.0,
            hash_grid_size: 8,
            grayscale: GrayscaleMethod::default(),
            decode_timeout: Duration::from_secs(30),
            confidence: 0.9,
        }
    }
}

/// The raw numbers behind the flags, for operator-facing explanations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcMetrics {
    /// Mean grayscale brightness over the page (0-255)
    pub mean_brightness: f64,
    /// Variance of the sampled Laplacian response
    pub laplacian_variance: f64,
    /// Estimated skew angle in degrees
    pub skew_angle: f64,
}

/// The outcome of analyzing one captured page.
///
/// Immutable once produced; a pure function of the decoded pixels and the
/// session state at call time. Serializes to the camelCase JSON shape the
/// scanning UI consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcResult {
    pub is_blank: bool,
    pub is_blurred: bool,
    pub is_skewed: bool,
    pub is_duplicate: bool,
    /// Static engine confidence; not derived per result
    pub confidence: f64,
    /// Human-readable labels for the true flags, in fixed order:
    /// blank, blurred, skewed, duplicate
    pub issues: Vec<String>,
    /// True when the duplicate check ran on the weakened fallback hash
    pub degraded_duplicate_check: bool,
    pub metrics: QcMetrics,
}

impl QcResult {
    /// Whether the page passed every check
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// The page quality control engine.
///
/// Holds no per-page state; the only state shared across calls is the
/// caller-supplied [`QcSession`]. One engine can serve any number of
/// concurrent analyses.
pub struct QcEngine {
    config: QcConfig,
    brightness: BrightnessAnalyzer,
    sharpness: SharpnessAnalyzer,
    hasher: PageHasher,
    skew: Arc<dyn SkewEstimator>,
    source: Arc<dyn PixelSource>,
}

impl QcEngine {
    /// Create an engine with default configuration and the built-in decoder
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a customized engine
    pub fn builder() -> QcEngineBuilder {
        QcEngineBuilder::new()
    }

    /// Engine configuration
    pub fn config(&self) -> &QcConfig {
        &self.config
    }

    /// Start a fresh batch session, announcing it to listeners
    pub fn start_session(&self, events: &EventSender) -> QcSession {
        let session = QcSession::new();
        events.send(QcEvent::Session(SessionEvent::Started {
            session_id: session.id(),
        }));
        session
    }

    /// Wipe a session's duplicate memory, announcing how much was cleared
    pub fn reset_session(&self, session: &QcSession, events: &EventSender) -> usize {
        let cleared = session.reset();
        events.send(QcEvent::Session(SessionEvent::Reset {
            session_id: session.id(),
            hashes_cleared: cleared,
        }));
        cleared
    }

    /// Analyze one captured page against the batch session.
    ///
    /// Decoding failures, degenerate buffers, and analyzer preconditions
    /// all surface as errors - never as a result with `false` flags.
    pub fn analyze(&self, reference: ImageRef, session: &QcSession) -> Result<QcResult> {
        self.analyze_with_events(reference, session, &null_sender())
    }

    /// Analyze one captured page, emitting progress events along the way
    pub fn analyze_with_events(
        &self,
        reference: ImageRef,
        session: &QcSession,
        events: &EventSender,
    ) -> Result<QcResult> {
        let description = reference.describe();
        events.send(QcEvent::Analysis(AnalysisEvent::Started {
            reference: description.clone(),
        }));

        match self.run_checks(reference, session, events) {
            Ok(result) => {
                events.send(QcEvent::Analysis(AnalysisEvent::Completed {
                    reference: description,
                    passed: result.passed(),
                }));
                Ok(result)
            }
            Err(error) => {
                events.send(QcEvent::Analysis(AnalysisEvent::Error {
                    reference: description,
                    message: error.to_string(),
                }));
                Err(error)
            }
        }
    }

    fn run_checks(
        &self,
        reference: ImageRef,
        session: &QcSession,
        events: &EventSender,
    ) -> Result<QcResult> {
        let description = reference.describe();

        let buffer = decode_with_timeout(
            Arc::clone(&self.source),
            reference,
            self.config.decode_timeout,
        )?;

        events.send(QcEvent::Analysis(AnalysisEvent::Decoded {
            reference: description.clone(),
            width: buffer.width(),
            height: buffer.height(),
        }));

        buffer.require_interior()?;

        // Brightness, sharpness, and skew have no cross-dependencies
        let ((is_blank, mean_brightness), (sharpness, skew_angle)) = rayon::join(
            || self.brightness.analyze(&buffer),
            || {
                rayon::join(
                    || self.sharpness.analyze(&buffer),
                    || self.skew.estimate_skew(&buffer),
                )
            },
        );
        let (is_blurred, laplacian_variance) = sharpness?;
        let is_skewed = skew_angle.abs() > self.config.skew_angle_threshold;

        let hash = self.hasher.hash(&buffer);
        let degraded_duplicate_check = hash.is_degraded();
        let is_duplicate = session.check_and_record(&hash);

        let mut issues = Vec::new();
        if is_blank {
            issues.push(ISSUE_BLANK.to_string());
        }
        if is_blurred {
            issues.push(ISSUE_BLURRED.to_string());
        }
        if is_skewed {
            issues.push(ISSUE_SKEWED.to_string());
        }
        if is_duplicate {
            issues.push(ISSUE_DUPLICATE.to_string());
        }

        if !issues.is_empty() {
            events.send(QcEvent::Analysis(AnalysisEvent::IssuesFound {
                reference: description.clone(),
                issues: issues.clone(),
            }));
        }

        debug!(
            reference = %description,
            is_blank,
            is_blurred,
            is_skewed,
            is_duplicate,
            mean_brightness,
            laplacian_variance,
            "page analyzed"
        );

        Ok(QcResult {
            is_blank,
            is_blurred,
            is_skewed,
            is_duplicate,
            confidence: self.config.confidence,
            issues,
            degraded_duplicate_check,
            metrics: QcMetrics {
                mean_brightness,
                laplacian_variance,
                skew_angle,
            },
        })
    }
}

impl Default for QcEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration builder for [`QcEngine`]
pub struct QcEngineBuilder {
    config: QcConfig,
    skew: Option<Arc<dyn SkewEstimator>>,
    source: Option<Arc<dyn PixelSource>>,
}

impl QcEngineBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self {
            config: QcConfig::default(),
            skew: None,
            source: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: QcConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom pixel source instead of the built-in decoder
    pub fn source(mut self, source: Arc<dyn PixelSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Use a custom skew estimator instead of the placeholder
    pub fn skew_estimator(mut self, estimator: Arc<dyn SkewEstimator>) -> Self {
        self.skew = Some(estimator);
        self
    }

    /// Build the engine
    pub fn build(self) -> QcEngine {
        let config = self.config;
        QcEngine {
            brightness: BrightnessAnalyzer::new(
                config.blank_brightness_threshold,
                config.grayscale,
            ),
            sharpness: SharpnessAnalyzer::new(config.blur_variance_threshold, config.grayscale),
            hasher: PageHasher::new(config.hash_grid_size, config.grayscale),
            skew: self.skew.unwrap_or_else(|| Arc::new(HoughSkewEstimator)),
            source: self.source.unwrap_or_else(|| Arc::new(ImageDecoder)),
            config,
        }
    }
}

impl Default for QcEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
