/*!
 * Positioned primitives produced by page sources.
 *
 * Coordinates are in the page's native units. For PDF sources that is points
 * with the y axis growing upwards, so a larger `top` is closer to the top of
 * the page.
 */

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Smallest box containing all of the given points, y-up
    pub fn enclosing(points: &[(f64, f64)]) -> Self {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &(x, y) in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if points.is_empty() {
            return Self::default();
        }
        Self {
            left: min_x,
            top: max_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// A single character (or short run) placed on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedGlyph {
    /// Text carried by the glyph
    pub value: String,
    /// Baseline start X
    pub start_x: f64,
    /// Baseline end X
    pub end_x: f64,
    /// Vertical position used for row grouping
    pub top: f64,
    /// Glyph bounding box
    #[serde(default)]
    pub bounds: Bounds,
}

impl PositionedGlyph {
    /// Glyph whose box is the flat baseline extent
    pub fn new(value: impl Into<String>, start_x: f64, end_x: f64, top: f64) -> Self {
        Self {
            value: value.into(),
            start_x,
            end_x,
            top,
            bounds: Bounds::new(start_x, top, end_x - start_x, 0.0),
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Horizontal ordering key within a row
    pub fn left(&self) -> f64 {
        self.bounds.left
    }
}

/// An embedded image with its placement on the page
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedImage {
    /// Encoded image bytes (PNG or JPEG when the source could provide one)
    pub payload: Bytes,
    pub bounds: Bounds,
    /// Ordinal assigned in discovery order
    pub index: usize,
    /// Native pixel size, when the source knows it
    pub pixel_size: Option<(u32, u32)>,
}

impl PositionedImage {
    pub fn new(payload: impl Into<Bytes>, bounds: Bounds, index: usize) -> Self {
        Self {
            payload: payload.into(),
            bounds,
            index,
            pixel_size: None,
        }
    }

    pub fn with_pixel_size(mut self, width: u32, height: u32) -> Self {
        self.pixel_size = Some((width, height));
        self
    }
}

/// Everything a page source yields for one page, unordered
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub glyphs: Vec<PositionedGlyph>,
    pub images: Vec<PositionedImage>,
}

impl RawPage {
    pub fn new(glyphs: Vec<PositionedGlyph>, images: Vec<PositionedImage>) -> Self {
        Self { glyphs, images }
    }
}
