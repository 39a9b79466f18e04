// edgekit-ops/src/lib.rs
// ============================================================
// edgekit-ops  –  Vision-primitive seam for EdgeKit
// The edge pipeline only ever touches the heavy vision code
// through the VisionOps trait below, so the backend can be the
// pure-Rust default, OpenCV, or a deterministic test fake.
// ------------------------------------------------------------
// Public API
//   * VisionOps            – convert_format / to_grayscale / detect_edges
//   * ImageProcOps         – default CPU backend (image + imageproc)
//   * OpenCvOps            – opt-in backend, `--features opencv`
//   * EdgeThresholds       – named Canny tuning, overridable
// ============================================================

//! EdgeKit – vision operations layer
//!
//! This crate pins down the three primitives the edge pipeline needs from
//! a vision library: channel-order conversion, luminance-weighted
//! grayscale reduction, and gradient-threshold edge detection.  Everything
//! behind [`VisionOps`] is stateless and re-entrant; swapping backends is
//! a matter of constructing a different implementation, the outer API
//! stays identical.

use thiserror::Error;

mod imageops;
pub use imageops::ImageProcOps;

#[cfg(feature = "opencv")]
mod opencv_backend;
#[cfg(feature = "opencv")]
pub use opencv_backend::OpenCvOps;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("buffer holds {actual} bytes, expected {width}x{height} with {channels} channels")]
    BadLength {
        width: u32,
        height: u32,
        channels: u32,
        actual: usize,
    },
    #[error("invalid thresholds: low {low} must be below high {high}")]
    BadThresholds { low: f32, high: f32 },
    #[error("unsupported sobel aperture {0}, this backend only supports 3")]
    UnsupportedAperture(i32),
    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, OpsError>;

/// Canny lower hysteresis threshold: gradients below are never edges.
pub const DEFAULT_LOW_THRESHOLD: f32 = 100.0;
/// Canny upper hysteresis threshold: gradients above are always edges.
pub const DEFAULT_HIGH_THRESHOLD: f32 = 200.0;
/// Sobel kernel size used for gradient computation.
pub const DEFAULT_APERTURE: i32 = 3;

/// Edge-detection tuning for one pipeline instance.
///
/// The defaults are the pipeline's fixed configuration; tests and callers
/// may override them per [`EdgeThresholds::new`] or struct literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeThresholds {
    pub low: f32,
    pub high: f32,
    pub aperture: i32,
}

impl EdgeThresholds {
    /// Custom hysteresis pair with the default aperture.
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            aperture: DEFAULT_APERTURE,
        }
    }

    /// Reject unusable pairs before they reach a backend.  The negated
    /// comparison also catches NaN.
    pub fn validate(&self) -> Result<()> {
        if !(self.low < self.high) {
            return Err(OpsError::BadThresholds {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
            aperture: DEFAULT_APERTURE,
        }
    }
}

/// The channel-order conversions the pipeline asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatConversion {
    /// Drop the alpha channel.
    RgbaToRgb,
    /// Replicate intensity into three channels.
    GrayToRgb,
    /// Append a fully-opaque alpha channel.
    RgbToRgba,
}

impl FormatConversion {
    pub fn src_channels(self) -> u32 {
        match self {
            FormatConversion::RgbaToRgb => 4,
            FormatConversion::GrayToRgb => 1,
            FormatConversion::RgbToRgba => 3,
        }
    }

    pub fn dst_channels(self) -> u32 {
        match self {
            FormatConversion::RgbaToRgb => 3,
            FormatConversion::GrayToRgb => 3,
            FormatConversion::RgbToRgba => 4,
        }
    }
}

/// Vision primitives consumed by the edge pipeline.
///
/// All methods take interleaved 8-bit channel data, allocate their output,
/// and leave the input untouched.  Implementations must validate the
/// buffer length against the stated dimensions before touching pixels.
pub trait VisionOps {
    /// Pure channel reordering between the formats in [`FormatConversion`].
    fn convert_format(
        &self,
        src: &[u8],
        width: u32,
        height: u32,
        conversion: FormatConversion,
    ) -> Result<Vec<u8>>;

    /// Luminance-weighted reduction of a 3-channel image to one channel.
    fn to_grayscale(&self, rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>>;

    /// Gradient-threshold edge filter over a single-channel image.
    fn detect_edges(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
        thresholds: &EdgeThresholds,
    ) -> Result<Vec<u8>>;
}

impl<O: VisionOps + ?Sized> VisionOps for &O {
    fn convert_format(
        &self,
        src: &[u8],
        width: u32,
        height: u32,
        conversion: FormatConversion,
    ) -> Result<Vec<u8>> {
        (**self).convert_format(src, width, height, conversion)
    }

    fn to_grayscale(&self, rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        (**self).to_grayscale(rgb, width, height)
    }

    fn detect_edges(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
        thresholds: &EdgeThresholds,
    ) -> Result<Vec<u8>> {
        (**self).detect_edges(gray, width, height, thresholds)
    }
}

// Shared precondition: exact length, overflow-checked.
pub(crate) fn check_len(src: &[u8], width: u32, height: u32, channels: u32) -> Result<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(channels as usize));
    if expected != Some(src.len()) {
        return Err(OpsError::BadLength {
            width,
            height,
            channels,
            actual: src.len(),
        });
    }
    Ok(())
}
