//! Default pure-Rust backend built on the `image` and `imageproc` crates.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::{
    check_len, EdgeThresholds, FormatConversion, OpsError, Result, VisionOps, DEFAULT_APERTURE,
};

/// CPU backend with no native dependencies.  Stateless, so a single value
/// can be shared freely across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageProcOps;

impl VisionOps for ImageProcOps {
    fn convert_format(
        &self,
        src: &[u8],
        width: u32,
        height: u32,
        conversion: FormatConversion,
    ) -> Result<Vec<u8>> {
        let channels = conversion.src_channels();
        check_len(src, width, height, channels)?;
        let bad = || OpsError::BadLength {
            width,
            height,
            channels,
            actual: src.len(),
        };

        let out = match conversion {
            FormatConversion::RgbaToRgb => {
                let img = RgbaImage::from_raw(width, height, src.to_vec()).ok_or_else(bad)?;
                DynamicImage::from(img).to_rgb8().into_raw()
            }
            FormatConversion::GrayToRgb => {
                let img = GrayImage::from_raw(width, height, src.to_vec()).ok_or_else(bad)?;
                DynamicImage::from(img).to_rgb8().into_raw()
            }
            // `to_rgba8` fills the new alpha channel with 255
            FormatConversion::RgbToRgba => {
                let img = RgbImage::from_raw(width, height, src.to_vec()).ok_or_else(bad)?;
                DynamicImage::from(img).to_rgba8().into_raw()
            }
        };
        Ok(out)
    }

    fn to_grayscale(&self, rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        check_len(rgb, width, height, 3)?;
        let img = RgbImage::from_raw(width, height, rgb.to_vec()).ok_or(OpsError::BadLength {
            width,
            height,
            channels: 3,
            actual: rgb.len(),
        })?;
        Ok(image::imageops::grayscale(&img).into_raw())
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
        // imageproc's canny has a fixed 3x3 sobel; anything else must go
        // through a backend that can honour it.
        if thresholds.aperture != DEFAULT_APERTURE {
            return Err(OpsError::UnsupportedAperture(thresholds.aperture));
        }
        let img = GrayImage::from_raw(width, height, gray.to_vec()).ok_or(OpsError::BadLength {
            width,
            height,
            channels: 1,
            actual: gray.len(),
        })?;
        Ok(imageproc::edges::canny(&img, thresholds.low, thresholds.high).into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 32;
    const H: u32 = 24;

    fn px_count() -> usize {
        (W * H) as usize
    }

    #[test]
    fn rgba_to_rgb_drops_alpha() {
        let src: Vec<u8> = (0..px_count())
            .flat_map(|_| [10u8, 20, 30, 77])
            .collect();
        let out = ImageProcOps
            .convert_format(&src, W, H, FormatConversion::RgbaToRgb)
            .unwrap();
        assert_eq!(out.len(), px_count() * 3);
        assert_eq!(&out[..3], &[10, 20, 30]);
    }

    #[test]
    fn gray_to_rgb_replicates_intensity() {
        let src = vec![140u8; px_count()];
        let out = ImageProcOps
            .convert_format(&src, W, H, FormatConversion::GrayToRgb)
            .unwrap();
        assert_eq!(out.len(), px_count() * 3);
        assert!(out.chunks_exact(3).all(|c| c == [140, 140, 140]));
    }

    #[test]
    fn rgb_to_rgba_appends_opaque_alpha() {
        let src: Vec<u8> = (0..px_count()).flat_map(|_| [1u8, 2, 3]).collect();
        let out = ImageProcOps
            .convert_format(&src, W, H, FormatConversion::RgbToRgba)
            .unwrap();
        assert_eq!(out.len(), px_count() * 4);
        assert!(out.chunks_exact(4).all(|c| c == [1, 2, 3, 255]));
    }

    #[test]
    fn grayscale_of_uniform_gray_is_identity() {
        let src: Vec<u8> = (0..px_count()).flat_map(|_| [90u8, 90, 90]).collect();
        let out = ImageProcOps.to_grayscale(&src, W, H).unwrap();
        assert_eq!(out.len(), px_count());
        assert!(out.iter().all(|&v| v == 90));
    }

    #[test]
    fn flat_image_has_no_edges() {
        let src = vec![128u8; px_count()];
        let out = ImageProcOps
            .detect_edges(&src, W, H, &EdgeThresholds::default())
            .unwrap();
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn step_edge_is_detected() {
        // left half black, right half white
        let src: Vec<u8> = (0..H)
            .flat_map(|_| (0..W).map(|x| if x < W / 2 { 0u8 } else { 255 }))
            .collect();
        let out = ImageProcOps
            .detect_edges(&src, W, H, &EdgeThresholds::default())
            .unwrap();
        assert!(out.iter().any(|&v| v > 0));
    }

    #[test]
    fn nonstandard_aperture_rejected() {
        let src = vec![0u8; px_count()];
        let thresholds = EdgeThresholds {
            aperture: 5,
            ..EdgeThresholds::default()
        };
        let err = ImageProcOps.detect_edges(&src, W, H, &thresholds);
        assert!(matches!(err, Err(OpsError::UnsupportedAperture(5))));
    }

    #[test]
    fn wrong_length_rejected_before_any_work() {
        let src = vec![0u8; 7];
        for conversion in [
            FormatConversion::RgbaToRgb,
            FormatConversion::GrayToRgb,
            FormatConversion::RgbToRgba,
        ] {
            let err = ImageProcOps.convert_format(&src, W, H, conversion);
            assert!(matches!(err, Err(OpsError::BadLength { .. })));
        }
        assert!(ImageProcOps.to_grayscale(&src, W, H).is_err());
        assert!(ImageProcOps
            .detect_edges(&src, W, H, &EdgeThresholds::default())
            .is_err());
    }
}
