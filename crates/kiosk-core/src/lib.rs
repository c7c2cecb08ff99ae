//! kiosk-core — Face-region correlation and image geometry.
//!
//! Correlates detector rectangles across frames and materialises crops and
//! height-bounded resizes of encoded images, keeping the scale factors needed
//! to map coordinates back to the source image.

pub mod codec;
pub mod crop;
pub mod geometry;
pub mod matcher;
pub mod resize;
pub mod snapshot;
pub mod text;

pub use codec::{CodecError, ImageCodec, JpegCodec, PixelBuffer, PngCodec};
pub use crop::{crop, crop_pixels, CropError};
pub use geometry::{GeometryError, Rectangle};
pub use matcher::{find_closest_match, is_potential_same_face, OverlapMatcher, RegionMatcher};
pub use resize::{resize, resize_pixels, ResizeError, ResizedImage, ScaleFactors};
