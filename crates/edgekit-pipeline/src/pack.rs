// edgekit-pipeline/src/pack.rs
//! Packed `0xAARRGGBB` pixel marshalling.
//!
//! The caller side of the boundary speaks 32-bit alpha-first words; the
//! vision backends speak interleaved byte planes.  These helpers convert
//! between the two, always into a fresh allocation.

use crate::{Result, TransformError};

/// Unpack ARGB words into interleaved RGBA bytes.
pub fn unpack_argb(pixels: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for px in pixels {
        bytes.push((px >> 16) as u8);
        bytes.push((px >> 8) as u8);
        bytes.push(*px as u8);
        bytes.push((px >> 24) as u8);
    }
    bytes
}

/// Pack interleaved RGBA bytes back into ARGB words.  The input length
/// must be a multiple of four; the pipeline checks stage output sizes
/// before calling this.
pub fn pack_argb(rgba: &[u8]) -> Vec<u32> {
    rgba.chunks_exact(4)
        .map(|px| {
            (u32::from(px[3]) << 24)
                | (u32::from(px[0]) << 16)
                | (u32::from(px[1]) << 8)
                | u32::from(px[2])
        })
        .collect()
}

/// Convert an 8-bit luma plane into packed opaque gray ARGB words.
///
/// Camera stacks hand out luma planes with a row stride that can exceed
/// `width * pixel_stride`; both strides are honoured here.  The plane is
/// bounds-checked up front so a lying caller gets an error, not a panic.
pub fn luma_plane_to_argb(
    plane: &[u8],
    width: u32,
    height: u32,
    row_stride: usize,
    pixel_stride: usize,
) -> Result<Vec<u32>> {
    if width == 0 || height == 0 || pixel_stride == 0 {
        return Err(TransformError::BadDimensions { width, height });
    }
    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(TransformError::BadDimensions { width, height })?;
    // highest index the stride walk will touch
    let last = (height as usize - 1)
        .checked_mul(row_stride)
        .and_then(|rows| {
            (width as usize - 1)
                .checked_mul(pixel_stride)
                .and_then(|cols| rows.checked_add(cols))
        })
        .ok_or(TransformError::BadDimensions { width, height })?;
    if last >= plane.len() {
        return Err(TransformError::LengthMismatch {
            width,
            height,
            expected: last + 1,
            actual: plane.len(),
        });
    }

    let mut out = Vec::with_capacity(count);
    for row in 0..height as usize {
        for col in 0..width as usize {
            let y = u32::from(plane[row * row_stride + col * pixel_stride]);
            out.push(0xff00_0000 | (y << 16) | (y << 8) | y);
        }
    }
    Ok(out)
}
