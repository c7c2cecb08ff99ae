//! Decoded pixel buffers and the codec capability that produces them.
//!
//! The pipeline works on BGRA8 rasters regardless of the container format.
//! [`JpegCodec`] is the kiosk's output format; [`PngCodec`] is lossless and is
//! used wherever pixels must survive an encode/decode round trip unchanged.

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// Bytes per pixel in the BGRA8 layout.
pub const BYTES_PER_PIXEL: usize = 4;
/// Encode density used when no display density is known.
pub const DEFAULT_DPI: u16 = 96;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("pixel buffer length {actual} does not match {width}x{height}x4 = {expected}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

impl CodecError {
    /// True when the source bytes could not be parsed as an image.
    pub fn is_decode(&self) -> bool {
        matches!(self, CodecError::Decode(_))
    }
}

/// A decoded raster in BGRA8 byte order, rows packed without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CodecError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(CodecError::InvalidBuffer {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw BGRA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Decode any format the `image` crate recognises into BGRA8.
    fn from_image_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let img = image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        swap_red_blue(&mut data);
        Self::new(width, height, data)
    }

    fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = self.data.clone();
        swap_red_blue(&mut rgba);
        rgba
    }

    /// Packed RGB with alpha dropped.
    fn to_rgb(&self) -> Vec<u8> {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .flat_map(|bgra| [bgra[2], bgra[1], bgra[0]])
            .collect()
    }
}

/// BGRA <-> RGBA is the same swap in both directions.
fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
}

/// Decode/encode capability consumed by the crop and resize transforms.
pub trait ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError>;
    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, CodecError>;
}

/// JPEG output with alpha ignored and a fixed pixel density in the header.
#[derive(Debug, Clone, Copy)]
pub struct JpegCodec {
    pub quality: u8,
    pub dpi: u16,
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            dpi: DEFAULT_DPI,
        }
    }
}

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
        PixelBuffer::from_image_bytes(bytes)
    }

    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, self.quality.clamp(1, 100));
        encoder.set_pixel_density(PixelDensity::dpi(self.dpi));
        encoder
            .write_image(
                &buffer.to_rgb(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(out)
    }
}

/// Lossless PNG, alpha preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
        PixelBuffer::from_image_bytes(bytes)
    }

    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                &buffer.to_rgba(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(out)
    }
}
