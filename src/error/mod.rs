//! # Error Module
//!
//! Caller-facing error types for the scan QC engine.
//!
//! ## Design Principles
//! - **Never panic** on operator data - return errors instead
//! - **Include context** - image references, dimensions, what went wrong
//! - **Never downgrade** - a failed analysis must never surface as a passing result

use std::time::Duration;
use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug)]
pub enum QcError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),
}

/// Errors that occur while turning an image reference into pixels
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read image {reference}: {source}")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {reference}: {reason}")]
    DecodeFailed { reference: String, reason: String },

    #[error("Unsupported image format for {reference}: {format}")]
    UnsupportedFormat { reference: String, format: String },

    #[error("Decoding {reference} did not finish within {waited:?}")]
    TimedOut { reference: String, waited: Duration },
}

/// Errors raised by a decoded buffer that cannot be analyzed
#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Image has degenerate dimensions {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("Image is {width}x{height}, at least {min}x{min} required for analysis")]
    TooSmall { width: u32, height: u32, min: u32 },

    #[error("Pixel data length {actual} does not match dimensions (expected {expected})")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, QcError>;
