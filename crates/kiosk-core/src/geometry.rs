//! Axis-aligned rectangles in pixel coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cannot parse rectangle from {0:?}; expected \"left,top,width,height\"")]
    Parse(String),
}

/// A face or crop region: origin plus non-negative extent.
///
/// Construct with [`Rectangle::new`]; negative extents are rejected so every
/// value in circulation satisfies `width >= 0 && height >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRectangle", into = "RawRectangle")]
pub struct Rectangle {
    left: i32,
    top: i32,
    width: u32,
    height: u32,
}

/// Unvalidated wire form, so deserialization goes through [`Rectangle::new`].
#[derive(Serialize, Deserialize)]
struct RawRectangle {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl Rectangle {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Result<Self, GeometryError> {
        if width < 0 || height < 0 {
            return Err(GeometryError::InvalidArgument(format!(
                "rectangle extent must be non-negative, got {width}x{height}"
            )));
        }
        Ok(Self {
            left,
            top,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Rectangle anchored at the origin covering a whole `width × height` image.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive right edge. Widened to i64 so `i32::MAX + width` cannot overflow.
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Area shared by both rectangles (0 when disjoint or merely touching).
    pub fn intersection_area(&self, other: &Rectangle) -> u64 {
        let x1 = (self.left as i64).max(other.left as i64);
        let y1 = (self.top as i64).max(other.top as i64);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        let inter_w = (x2 - x1).max(0) as u64;
        let inter_h = (y2 - y1).max(0) as u64;
        inter_w * inter_h
    }

    /// Manhattan distance between the top-left corners.
    pub fn corner_distance(&self, other: &Rectangle) -> u64 {
        (self.left as i64 - other.left as i64).unsigned_abs()
            + (self.top as i64 - other.top as i64).unsigned_abs()
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.width, self.height)
    }
}

impl FromStr for Rectangle {
    type Err = GeometryError;

    /// Parses `"left,top,width,height"` (whitespace around numbers allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<i32> = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| GeometryError::Parse(s.to_string()))?;

        match parts.as_slice() {
            [left, top, width, height] => Rectangle::new(*left, *top, *width, *height),
            _ => Err(GeometryError::Parse(s.to_string())),
        }
    }
}

impl TryFrom<RawRectangle> for Rectangle {
    type Error = GeometryError;

    fn try_from(raw: RawRectangle) -> Result<Self, Self::Error> {
        Rectangle::new(raw.left, raw.top, raw.width, raw.height)
    }
}

impl From<Rectangle> for RawRectangle {
    fn from(r: Rectangle) -> Self {
        // Extents above i32::MAX never come from `new`; `from_size` saturates.
        RawRectangle {
            left: r.left,
            top: r.top,
            width: i32::try_from(r.width).unwrap_or(i32::MAX),
            height: i32::try_from(r.height).unwrap_or(i32::MAX),
        }
    }
}
