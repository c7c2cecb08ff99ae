//! Byte-exact extraction of a rectangular region from an encoded image.
//!
//! A crop is a copy, never a resample. Callers that prefer "no image" over an
//! error on failure apply that fallback themselves.

use crate::codec::{CodecError, ImageCodec, PixelBuffer, BYTES_PER_PIXEL};
use crate::geometry::Rectangle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("crop region {rect} exceeds image bounds {width}x{height}")]
    OutOfBounds {
        rect: Rectangle,
        width: u32,
        height: u32,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl CropError {
    pub fn is_decode(&self) -> bool {
        matches!(self, CropError::Codec(e) if e.is_decode())
    }
}

/// Decode `source` and return exactly the pixels covered by `rect`.
pub fn crop<C: ImageCodec + ?Sized>(
    codec: &C,
    source: &[u8],
    rect: Rectangle,
) -> Result<PixelBuffer, CropError> {
    let decoded = codec.decode(source)?;
    tracing::debug!(
        src_width = decoded.width(),
        src_height = decoded.height(),
        %rect,
        "cropping decoded image"
    );
    crop_pixels(&decoded, rect)
}

/// Copy the `rect` sub-region out of an already decoded buffer.
pub fn crop_pixels(source: &PixelBuffer, rect: Rectangle) -> Result<PixelBuffer, CropError> {
    let inside = rect.left() >= 0
        && rect.top() >= 0
        && (rect.left() as i64) < source.width() as i64
        && (rect.top() as i64) < source.height() as i64
        && rect.right() <= source.width() as i64
        && rect.bottom() <= source.height() as i64;
    if !inside {
        return Err(CropError::OutOfBounds {
            rect,
            width: source.width(),
            height: source.height(),
        });
    }

    let x0 = rect.left() as usize;
    let y0 = rect.top() as usize;
    let row_bytes = rect.width() as usize * BYTES_PER_PIXEL;
    let stride = source.stride();

    let mut data = Vec::with_capacity(row_bytes * rect.height() as usize);
    for y in y0..y0 + rect.height() as usize {
        let start = y * stride + x0 * BYTES_PER_PIXEL;
        data.extend_from_slice(&source.data()[start..start + row_bytes]);
    }

    Ok(PixelBuffer::new(rect.width(), rect.height(), data)?)
}
