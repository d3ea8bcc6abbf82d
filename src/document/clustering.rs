/*!
 * Geometric row clustering.
 *
 * Turns the unordered glyphs and images of a page into reading-order content.
 * Primitives share a row exactly when their vertical positions round to the
 * same integer. Rows are emitted top of page first, and left to right inside
 * a row. Consecutive pure-text rows are merged into one text block; a row
 * holding any image flushes the pending block and contributes only its
 * images.
 */

use crate::app_config::ExtractionConfig;

use super::geometry::{PositionedGlyph, PositionedImage};
use super::model::{ContentItem, PageImage, RowId, TextRow};

/// Default gap threshold, in the page's coordinate units
pub const DEFAULT_GAP_THRESHOLD: f64 = 0.3;

/// Padding never grows a row past this many characters. Covers the largest
/// page PDF allows (14400 units) at the default threshold.
pub const MAX_PADDED_ROW_CHARS: usize = 4_320;

#[derive(Debug, Clone, Copy)]
enum Primitive<'a> {
    Glyph(&'a PositionedGlyph),
    Image(&'a PositionedImage),
}

impl Primitive<'_> {
    fn row_key(&self) -> i64 {
        // f64::round rounds half away from zero
        match self {
            Primitive::Glyph(glyph) => glyph.top.round() as i64,
            Primitive::Image(image) => image.bounds.top.round() as i64,
        }
    }

    fn left(&self) -> f64 {
        match self {
            Primitive::Glyph(glyph) => glyph.left(),
            Primitive::Image(image) => image.bounds.left,
        }
    }
}

/// Groups positioned primitives into ordered rows of text and images
#[derive(Debug, Clone)]
pub struct RowClusterer {
    gap_threshold: f64,
    padding_char: char,
    include_images: bool,
}

impl Default for RowClusterer {
    fn default() -> Self {
        Self {
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            padding_char: ' ',
            include_images: true,
        }
    }
}

impl RowClusterer {
    pub fn new(gap_threshold: f64) -> Self {
        Self {
            gap_threshold,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            gap_threshold: config.gap_threshold,
            padding_char: config.padding_char,
            include_images: config.include_images,
        }
    }

    pub fn with_images(mut self, include_images: bool) -> Self {
        self.include_images = include_images;
        self
    }

    pub fn with_padding_char(mut self, padding_char: char) -> Self {
        self.padding_char = padding_char;
        self
    }

    pub fn gap_threshold(&self) -> f64 {
        self.gap_threshold
    }

    /// Produce the ordered content of one page.
    ///
    /// Text rows receive sequential `RowId`s starting at zero.
    pub fn cluster(&self, glyphs: &[PositionedGlyph], images: &[PositionedImage]) -> Vec<ContentItem> {
        let mut primitives: Vec<Primitive<'_>> = glyphs.iter().map(Primitive::Glyph).collect();
        if self.include_images {
            primitives.extend(images.iter().map(Primitive::Image));
        }

        // Stable sort: descending row key, then ascending left edge
        primitives.sort_by(|a, b| {
            b.row_key()
                .cmp(&a.row_key())
                .then_with(|| a.left().total_cmp(&b.left()))
        });

        let mut items = Vec::new();
        let mut block: Vec<String> = Vec::new();
        let mut next_row_id = 0;

        for group in primitives.chunk_by(|a, b| a.row_key() == b.row_key()) {
            let row_glyphs: Vec<&PositionedGlyph> = group
                .iter()
                .filter_map(|p| match p {
                    Primitive::Glyph(glyph) => Some(*glyph),
                    Primitive::Image(_) => None,
                })
                .collect();

            if row_glyphs.len() == group.len() {
                block.push(self.build_row_text(&row_glyphs));
                continue;
            }

            Self::flush_block(&mut block, &mut items, &mut next_row_id);
            for primitive in group {
                if let Primitive::Image(image) = primitive {
                    items.push(ContentItem::Image(PageImage::from(*image)));
                }
            }
        }

        Self::flush_block(&mut block, &mut items, &mut next_row_id);
        items
    }

    fn flush_block(block: &mut Vec<String>, items: &mut Vec<ContentItem>, next_row_id: &mut usize) {
        if block.is_empty() {
            return;
        }
        items.push(ContentItem::TextRow(TextRow {
            id: RowId(*next_row_id),
            text: block.join("\n"),
        }));
        *next_row_id += 1;
        block.clear();
    }

    /// Build the text of one row from glyphs already sorted left to right.
    ///
    /// When the distance from the previous glyph's right edge exceeds the gap
    /// threshold, `max(0, start_x * threshold - line_length)` padding
    /// characters are prepended to the glyph, up to [`MAX_PADDED_ROW_CHARS`].
    pub fn build_row_text(&self, row: &[&PositionedGlyph]) -> String {
        let mut line = String::new();
        let mut line_len = 0usize;
        let mut previous_right = 0.0;

        for glyph in row {
            let gap = glyph.start_x - previous_right;
            if gap > self.gap_threshold {
                let padding = ((glyph.start_x * self.gap_threshold - line_len as f64).max(0.0) as usize)
                    .min(MAX_PADDED_ROW_CHARS.saturating_sub(line_len));
                line.extend(std::iter::repeat_n(self.padding_char, padding));
                line_len += padding;
            }
            line.push_str(&glyph.value);
            line_len += glyph.value.chars().count();
            previous_right = glyph.end_x;
        }

        line.trim().chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
    }
}
