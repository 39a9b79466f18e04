//! OpenCV-backed implementation, opt-in via the `opencv` feature.
//!
//! Uses the `_def` variant of `cvt_color` so the module compiles against
//! both pre- and post-4.11 OpenCV installs; `canny` keeps the full
//! signature because the aperture is part of the pipeline configuration.

use opencv::{
    core::{Scalar, CV_8UC1, CV_8UC3, CV_8UC4},
    imgproc,
    prelude::*,
};

use crate::{check_len, EdgeThresholds, FormatConversion, OpsError, Result, VisionOps};

/// Backend bound to the system OpenCV library.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvOps;

fn cv_err(err: opencv::Error) -> OpsError {
    OpsError::Backend(err.to_string())
}

fn mat_with_bytes(src: &[u8], width: u32, height: u32, typ: i32) -> Result<Mat> {
    let mut mat =
        Mat::new_rows_cols_with_default(height as i32, width as i32, typ, Scalar::all(0.0))
            .map_err(cv_err)?;
    mat.data_bytes_mut().map_err(cv_err)?.copy_from_slice(src);
    Ok(mat)
}

fn mat_bytes(mat: &Mat) -> Result<Vec<u8>> {
    Ok(mat.data_bytes().map_err(cv_err)?.to_vec())
}

impl VisionOps for OpenCvOps {
    fn convert_format(
        &self,
        src: &[u8],
        width: u32,
        height: u32,
        conversion: FormatConversion,
    ) -> Result<Vec<u8>> {
        check_len(src, width, height, conversion.src_channels())?;
        let (typ, code) = match conversion {
            FormatConversion::RgbaToRgb => (CV_8UC4, imgproc::COLOR_RGBA2RGB),
            FormatConversion::GrayToRgb => (CV_8UC1, imgproc::COLOR_GRAY2RGB),
            FormatConversion::RgbToRgba => (CV_8UC3, imgproc::COLOR_RGB2RGBA),
        };
        let src_mat = mat_with_bytes(src, width, height, typ)?;
        let mut dst = Mat::default();
        imgproc::cvt_color_def(&src_mat, &mut dst, code).map_err(cv_err)?;
        mat_bytes(&dst)
    }

    fn to_grayscale(&self, rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        check_len(rgb, width, height, 3)?;
        let src_mat = mat_with_bytes(rgb, width, height, CV_8UC3)?;
        let mut dst = Mat::default();
        imgproc::cvt_color_def(&src_mat, &mut dst, imgproc::COLOR_RGB2GRAY).map_err(cv_err)?;
        mat_bytes(&dst)
    }

    fn detect_edges(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
        thresholds: &EdgeThresholds,
    ) -> Result<Vec<u8>> {
        check_len(gray, width, height, 1)?;
        thresholds.validate()?;
        let src_mat = mat_with_bytes(gray, width, height, CV_8UC1)?;
        let mut dst = Mat::default();
        imgproc::canny(
            &src_mat,
            &mut dst,
            f64::from(thresholds.low),
            f64::from(thresholds.high),
            thresholds.aperture,
            false,
        )
        .map_err(cv_err)?;
        mat_bytes(&dst)
    }
}
