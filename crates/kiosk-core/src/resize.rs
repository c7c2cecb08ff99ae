//! Height-bounded downscaling with scale-factor bookkeeping.
//!
//! Images taller than the target are shrunk with bilinear interpolation,
//! width derived from height so the aspect ratio is kept. Smaller images pass
//! through untouched (never upscaled). The returned [`ScaleFactors`] map
//! coordinates found on the output back onto the source image.

use crate::codec::{CodecError, ImageCodec, PixelBuffer, BYTES_PER_PIXEL};
use crate::geometry::{GeometryError, Rectangle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("invalid argument: target height must be positive, got {0}")]
    InvalidArgument(i32),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ResizeError {
    pub fn is_decode(&self) -> bool {
        matches!(self, ResizeError::Codec(e) if e.is_decode())
    }
}

/// Original-to-resized ratio on each axis. `1.0` means the axis was untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ScaleFactors {
    pub const IDENTITY: ScaleFactors = ScaleFactors {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Map a rectangle measured on the resized image into source coordinates.
    ///
    /// Fails with `InvalidArgument` when a mapped value does not fit in `i32`
    /// or the factors are negative or non-finite.
    pub fn map_to_original(&self, rect: &Rectangle) -> Result<Rectangle, GeometryError> {
        let scale = |v: f64, s: f64| -> Result<i32, GeometryError> {
            let mapped = (v * s).round();
            if mapped.is_finite() && mapped >= i32::MIN as f64 && mapped <= i32::MAX as f64 {
                Ok(mapped as i32)
            } else {
                Err(GeometryError::InvalidArgument(format!(
                    "{v} scaled by {s} does not fit a pixel coordinate"
                )))
            }
        };
        Rectangle::new(
            scale(rect.left() as f64, self.scale_x)?,
            scale(rect.top() as f64, self.scale_y)?,
            scale(rect.width() as f64, self.scale_x)?,
            scale(rect.height() as f64, self.scale_y)?,
        )
    }
}

/// Output of [`resize`]: the re-encoded image and how it relates to the source.
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub scale: ScaleFactors,
}

/// Decode `source`, shrink it to `target_height` if taller, and re-encode with `codec`.
///
/// The image is always re-encoded, even when no resize was needed.
pub fn resize<C: ImageCodec + ?Sized>(
    codec: &C,
    source: &[u8],
    target_height: i32,
) -> Result<ResizedImage, ResizeError> {
    if target_height <= 0 {
        return Err(ResizeError::InvalidArgument(target_height));
    }

    let decoded = codec.decode(source)?;
    let (resized, scale) = resize_pixels(decoded, target_height as u32)?;
    let bytes = codec.encode(&resized)?;

    Ok(ResizedImage {
        bytes,
        width: resized.width(),
        height: resized.height(),
        scale,
    })
}

/// Pixel-level half of [`resize`], for callers already holding a decoded buffer.
pub fn resize_pixels(
    source: PixelBuffer,
    target_height: u32,
) -> Result<(PixelBuffer, ScaleFactors), CodecError> {
    let (orig_w, orig_h) = (source.width(), source.height());
    if orig_h <= target_height {
        tracing::debug!(width = orig_w, height = orig_h, target_height, "no resize needed");
        return Ok((source, ScaleFactors::IDENTITY));
    }

    let (new_w, new_h) = scaled_dimensions(orig_w, orig_h, target_height);
    let data = bilinear_resize(source.data(), orig_w as usize, orig_h as usize, new_w as usize, new_h as usize);
    let resized = PixelBuffer::new(new_w, new_h, data)?;

    let scale = ScaleFactors {
        scale_x: orig_w as f64 / new_w as f64,
        scale_y: orig_h as f64 / new_h as f64,
    };
    tracing::debug!(
        from = ?(orig_w, orig_h),
        to = ?(new_w, new_h),
        scale_x = scale.scale_x,
        scale_y = scale.scale_y,
        "resized image"
    );
    Ok((resized, scale))
}

/// Width follows height: `round(w * target / h)`, at least one pixel.
fn scaled_dimensions(width: u32, height: u32, target_height: u32) -> (u32, u32) {
    let new_w = (width as f64 * target_height as f64 / height as f64).round() as u32;
    (new_w.max(1), target_height)
}

/// Bilinear resample of a packed 4-channel raster, sampling at pixel centres.
fn bilinear_resize(
    src: &[u8],
    width: usize,
    height: usize,
    new_w: usize,
    new_h: usize,
) -> Vec<u8> {
    let inv_scale_x = width as f32 / new_w as f32;
    let inv_scale_y = height as f32 / new_h as f32;
    let mut out = vec![0u8; new_w * new_h * BYTES_PER_PIXEL];

    for y in 0..new_h {
        let src_y = (y as f32 + 0.5) * inv_scale_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, height as i32 - 1) as usize;
        let y1 = (y0 + 1).min(height - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..new_w {
            let src_x = (x as f32 + 0.5) * inv_scale_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, width as i32 - 1) as usize;
            let x1 = (x0 + 1).min(width - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            let px = |xx: usize, yy: usize, c: usize| src[(yy * width + xx) * BYTES_PER_PIXEL + c] as f32;

            for c in 0..BYTES_PER_PIXEL {
                let val = px(x0, y0, c) * (1.0 - fx) * (1.0 - fy)
                    + px(x1, y0, c) * fx * (1.0 - fy)
                    + px(x0, y1, c) * (1.0 - fx) * fy
                    + px(x1, y1, c) * fx * fy;

                out[(y * new_w + x) * BYTES_PER_PIXEL + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::{gradient, solid};
    use crate::codec::{JpegCodec, PngCodec};

    #[test]
    fn test_hd_to_360() {
        let source = PngCodec.encode(&solid(1920, 1080, [40, 80, 120, 255])).unwrap();
        let out = resize(&PngCodec, &source, 360).unwrap();
        assert_eq!((out.width, out.height), (640, 360));
        assert_eq!(out.scale, ScaleFactors { scale_x: 3.0, scale_y: 3.0 });

        let back = PngCodec.decode(&out.bytes).unwrap();
        assert_eq!((back.width(), back.height()), (640, 360));
    }

    #[test]
    fn test_no_upscale_when_target_taller() {
        let src = gradient(50, 40);
        let source = PngCodec.encode(&src).unwrap();
        for target in [40, 41, 1000] {
            let out = resize(&PngCodec, &source, target).unwrap();
            assert_eq!((out.width, out.height), (50, 40), "target {target}");
            assert_eq!(out.scale, ScaleFactors::IDENTITY);
            assert_eq!(PngCodec.decode(&out.bytes).unwrap(), src, "pixels must be unmodified");
        }
    }

    #[test]
    fn test_non_integral_ratio() {
        // 1000 * 300 / 700 = 428.57 -> 429
        let (resized, scale) = resize_pixels(gradient(1000, 700), 300).unwrap();
        assert_eq!(resized.height(), 300);
        assert_eq!(resized.width(), 429);
        assert!((scale.scale_y - 700.0 / 300.0).abs() < 1e-12);
        assert!((scale.scale_x - 1000.0 / 429.0).abs() < 1e-12);
    }

    #[test]
    fn test_width_never_zero() {
        let (resized, _) = resize_pixels(gradient(1, 500), 10).unwrap();
        assert_eq!((resized.width(), resized.height()), (1, 10));
    }

    #[test]
    fn test_uniform_stays_uniform() {
        let (resized, _) = resize_pixels(solid(90, 60, [12, 34, 56, 78]), 20).unwrap();
        assert!(
            resized.data().chunks_exact(4).all(|px| px == [12, 34, 56, 78]),
            "uniform resize should stay uniform"
        );
    }

    #[test]
    fn test_halving_averages_neighbours() {
        // 2x2 -> 1x1 samples the exact centre: mean of all four pixels
        let data = vec![
            0, 0, 0, 255, 100, 100, 100, 255, //
            100, 100, 100, 255, 200, 200, 200, 255,
        ];
        let (resized, _) = resize_pixels(PixelBuffer::new(2, 2, data).unwrap(), 1).unwrap();
        assert_eq!(resized.data(), &[100, 100, 100, 255]);
    }

    #[test]
    fn test_jpeg_output() {
        let source = PngCodec.encode(&gradient(400, 300)).unwrap();
        let out = resize(&JpegCodec::default(), &source, 150).unwrap();
        assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!((out.width, out.height), (200, 150));
    }

    #[test]
    fn test_invalid_target_height() {
        let source = PngCodec.encode(&gradient(4, 4)).unwrap();
        assert!(matches!(resize(&PngCodec, &source, 0), Err(ResizeError::InvalidArgument(0))));
        assert!(matches!(resize(&PngCodec, &source, -5), Err(ResizeError::InvalidArgument(-5))));
    }

    #[test]
    fn test_decode_error_propagates() {
        let err = resize(&JpegCodec::default(), &[0xFF, 0xD8, 0x00], 100).unwrap_err();
        assert!(err.is_decode(), "unexpected error: {err}");
    }

    #[test]
    fn test_map_to_original() {
        let scale = ScaleFactors { scale_x: 3.0, scale_y: 3.0 };
        let face = Rectangle::new(100, 50, 40, 60).unwrap();
        assert_eq!(
            scale.map_to_original(&face).unwrap(),
            Rectangle::new(300, 150, 120, 180).unwrap()
        );
        assert_eq!(ScaleFactors::IDENTITY.map_to_original(&face).unwrap(), face);
    }

    #[test]
    fn test_map_to_original_rejects_overflow() {
        let face = Rectangle::new(100, 50, 40, 60).unwrap();
        let huge = ScaleFactors { scale_x: 1e10, scale_y: 1.0 };
        assert!(matches!(huge.map_to_original(&face), Err(GeometryError::InvalidArgument(_))));

        let nan = ScaleFactors { scale_x: f64::NAN, scale_y: 1.0 };
        assert!(nan.map_to_original(&face).is_err());

        let negative = ScaleFactors { scale_x: -1.0, scale_y: 1.0 };
        assert!(negative.map_to_original(&face).is_err());
    }
}
