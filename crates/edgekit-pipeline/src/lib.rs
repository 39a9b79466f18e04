// edgekit-pipeline/src/lib.rs
// ============================================================
// edgekit-pipeline  –  Frame transformation stage for EdgeKit
// Borrows a packed ARGB frame, runs drop-alpha → grayscale →
// Canny → expand back to ARGB through a pluggable VisionOps
// backend, and returns a freshly allocated frame.
// ------------------------------------------------------------
// Public API
//   * FrameTransformer::new(ops)        – default thresholds
//   * FrameTransformer::transform(..)   – Result with error detail
//   * FrameTransformer::process_frame() – success-or-nothing boundary
//   * ready_message() / run_self_test() – diagnostics
// ============================================================

//! EdgeKit – frame transformation layer
//!
//! The input is a flat `[u32]` buffer of `0xAARRGGBB` pixels on loan from
//! the caller for the duration of one call.  All work happens on copies:
//! the loaned buffer is never written, never retained, and its release is
//! tied to a lease guard so it runs on every exit path.  Every pixel
//! operation is delegated to a [`VisionOps`] backend, which lets tests
//! substitute a deterministic or fault-injecting implementation.

use edgekit_ops::{EdgeThresholds, FormatConversion, OpsError, VisionOps};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use log::{error, info};
use thiserror::Error;

mod lease;
pub mod pack;

pub use lease::{AcquireError, FrameSource};

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("invalid dimensions {width}x{height}")]
    BadDimensions { width: u32, height: u32 },
    #[error("buffer holds {actual} pixels, expected {expected} for {width}x{height}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame acquisition failed: {0}")]
    Acquire(#[from] AcquireError),
    #[error("{stage} stage returned {actual} bytes, expected {expected}")]
    BadStageOutput {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Ops(#[from] OpsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;

// Self-test canvas, width x height.
const SELF_TEST_WIDTH: u32 = 480;
const SELF_TEST_HEIGHT: u32 = 640;

/// Static identification string confirming the pipeline is linked in.
/// Pure; no failure modes.
pub fn ready_message() -> &'static str {
    "Edge Detection Ready!"
}

// A backend handing back a wrong-size buffer must never become a partial
// output frame.
fn checked_stage(
    stage: &'static str,
    expected: usize,
    out: edgekit_ops::Result<Vec<u8>>,
) -> Result<Vec<u8>> {
    let out = out?;
    if out.len() != expected {
        return Err(TransformError::BadStageOutput {
            stage,
            expected,
            actual: out.len(),
        });
    }
    Ok(out)
}

/// One edge-detection pipeline instance: a vision backend plus its
/// threshold configuration.  Holds no per-call state, so a single value
/// may serve any number of concurrent callers.
pub struct FrameTransformer<O> {
    ops: O,
    thresholds: EdgeThresholds,
}

impl<O: VisionOps> FrameTransformer<O> {
    pub fn new(ops: O) -> Self {
        Self {
            ops,
            thresholds: EdgeThresholds::default(),
        }
    }

    pub fn with_thresholds(ops: O, thresholds: EdgeThresholds) -> Self {
        Self { ops, thresholds }
    }

    pub fn thresholds(&self) -> EdgeThresholds {
        self.thresholds
    }

    /// Run the fixed pipeline over one borrowed frame and return the edge
    /// map as a new buffer of the same dimensions.
    ///
    /// Stage order matters: drop alpha, reduce to intensity, detect
    /// edges, expand back to three then four channels.  Each stage
    /// consumes the previous stage's output; the caller's buffer is read
    /// once during unpacking and never touched again.
    pub fn transform<S>(&self, frame: &S, width: u32, height: u32) -> Result<Vec<u32>>
    where
        S: FrameSource + ?Sized,
    {
        info!("processing frame: {width}x{height}");

        if width == 0 || height == 0 {
            return Err(TransformError::BadDimensions { width, height });
        }
        // byte-plane sizes (4 channels) must stay addressable too
        let expected = (width as usize)
            .checked_mul(height as usize)
            .filter(|px| px.checked_mul(4).is_some())
            .ok_or(TransformError::BadDimensions { width, height })?;

        let lease = lease::Lease::acquire(frame)?;
        let pixels = lease.pixels();
        if pixels.len() != expected {
            return Err(TransformError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        let rgba = pack::unpack_argb(pixels);
        let rgb = checked_stage(
            "rgba-to-rgb",
            expected * 3,
            self.ops
                .convert_format(&rgba, width, height, FormatConversion::RgbaToRgb),
        )?;
        let gray = checked_stage(
            "grayscale",
            expected,
            self.ops.to_grayscale(&rgb, width, height),
        )?;
        let edges = checked_stage(
            "edge-detection",
            expected,
            self.ops
                .detect_edges(&gray, width, height, &self.thresholds),
        )?;
        let rgb_edges = checked_stage(
            "gray-to-rgb",
            expected * 3,
            self.ops
                .convert_format(&edges, width, height, FormatConversion::GrayToRgb),
        )?;
        let rgba_edges = checked_stage(
            "rgb-to-rgba",
            expected * 4,
            self.ops
                .convert_format(&rgb_edges, width, height, FormatConversion::RgbToRgba),
        )?;

        let out = pack::pack_argb(&rgba_edges);
        info!("frame processed: {width}x{height}");
        Ok(out)
    }

    /// Outer boundary: the caller sees success or nothing.  Any failure
    /// is logged with its detail and collapsed to `None`; no internal
    /// error type crosses this call.
    pub fn process_frame<S>(&self, frame: &S, width: u32, height: u32) -> Option<Vec<u32>>
    where
        S: FrameSource + ?Sized,
    {
        match self.transform(frame, width, height) {
            Ok(out) => Some(out),
            Err(err) => {
                error!("frame processing failed: {err}");
                None
            }
        }
    }

    /// Diagnostic check that the pipeline is wired correctly: draws the
    /// same shape on the same canvas every call and runs the normal
    /// transform path.  Not part of the production data path.
    pub fn run_self_test(&self) -> String {
        let pixels = self_test_canvas();
        match self.transform(&pixels, SELF_TEST_WIDTH, SELF_TEST_HEIGHT) {
            Ok(out) => {
                let edge_pixels = out.iter().filter(|&&px| px & 0x00ff_ffff != 0).count();
                format!(
                    "self-test passed: processed {SELF_TEST_WIDTH}x{SELF_TEST_HEIGHT} frame, {edge_pixels} edge pixels"
                )
            }
            Err(err) => format!("self-test failed: {err}"),
        }
    }
}

// Dark canvas with one bright filled rectangle: four strong step edges.
fn self_test_canvas() -> Vec<u32> {
    let mut canvas = RgbaImage::from_pixel(
        SELF_TEST_WIDTH,
        SELF_TEST_HEIGHT,
        Rgba([24, 24, 24, 255]),
    );
    let rect = Rect::at(120, 160).of_size(240, 320);
    draw_filled_rect_mut(&mut canvas, rect, Rgba([230, 230, 230, 255]));
    pack::pack_argb(canvas.as_raw())
}
