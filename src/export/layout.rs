/*!
 * Export page layout.
 *
 * Pure geometry shared by the reconstructor and the renderers. All lengths
 * are PDF points (1/72 inch) with the origin at the bottom-left corner of
 * the page.
 */

use image::DynamicImage;

use crate::app_config::ExportConfig;

const POINTS_PER_MM: f64 = 72.0 / 25.4;
/// Average glyph advance as a fraction of the font size
const AVERAGE_GLYPH_EM: f64 = 0.5;
const LINE_HEIGHT_EM: f64 = 1.2;

/// Size and margins of the output pages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub font_size: f64,
}

impl Default for PageSetup {
    /// A4 with 1.5 cm margins and 11 pt text
    fn default() -> Self {
        Self {
            width: 210.0 * POINTS_PER_MM,
            height: 297.0 * POINTS_PER_MM,
            margin: 15.0 * POINTS_PER_MM,
            font_size: 11.0,
        }
    }
}

impl PageSetup {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            width: config.page_width_mm * POINTS_PER_MM,
            height: config.page_height_mm * POINTS_PER_MM,
            margin: config.margin_cm * 10.0 * POINTS_PER_MM,
            font_size: config.font_size,
        }
    }

    pub fn writable_width(&self) -> f64 {
        (self.width - 2.0 * self.margin).max(0.0)
    }

    pub fn writable_height(&self) -> f64 {
        (self.height - 2.0 * self.margin).max(0.0)
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_EM
    }

    /// Characters that fit on one line at the average glyph advance
    pub fn chars_per_line(&self) -> usize {
        ((self.writable_width() / (self.font_size * AVERAGE_GLYPH_EM)).floor() as usize).max(1)
    }
}

pub fn points_to_mm(points: f64) -> f64 {
    points / POINTS_PER_MM
}

/// Fit an image into the writable area.
///
/// Images reaching the limit in either dimension are scaled down uniformly so
/// both fit; smaller images keep their size.
pub fn fit_image(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (width, height);
    }
    if width >= max_width || height >= max_height {
        let scale = (max_width / width).min(max_height / height);
        (width * scale, height * scale)
    } else {
        (width, height)
    }
}

/// One piece of exported content
#[derive(Debug, Clone)]
pub enum ExportBlock {
    Paragraph(String),
    Image {
        index: usize,
        image: DynamicImage,
        /// Placed size in points
        width: f64,
        height: f64,
    },
}

/// Exported content of one source page
#[derive(Debug, Clone, Default)]
pub struct ExportSection {
    /// 1-based number of the source page
    pub page_number: usize,
    pub blocks: Vec<ExportBlock>,
}

impl ExportSection {
    pub fn new(page_number: usize) -> Self {
        Self {
            page_number,
            blocks: Vec::new(),
        }
    }

    pub fn image_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, ExportBlock::Image { .. }))
            .count()
    }
}

/// Positioned drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text line with its baseline at `y`
    Text { text: String, x: f64, y: f64 },
    /// Image with its bottom-left corner at (`x`, `y`). `section` and `block`
    /// index into the laid out sections.
    Image {
        section: usize,
        block: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// Drawing instructions for one output page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub ops: Vec<DrawOp>,
}

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// Embedded newlines are kept as line breaks, words longer than a line are
/// split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;

        for word in source_line.split_whitespace() {
            let word_len = word.chars().count();
            let needed = if line_len == 0 { word_len } else { line_len + 1 + word_len };

            if needed <= max_chars {
                if line_len > 0 {
                    line.push(' ');
                }
                line.push_str(word);
                line_len = needed;
                continue;
            }

            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }

            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(max_chars).peekable();
            while let Some(piece) = pieces.next() {
                if pieces.peek().is_some() {
                    lines.push(piece.iter().collect());
                } else {
                    line = piece.iter().collect();
                    line_len = piece.len();
                }
            }
        }

        lines.push(line);
    }

    lines
}

/// Flows sections onto pages top to bottom. Each section starts a new page.
pub fn layout(sections: &[ExportSection], setup: &PageSetup) -> Vec<LaidOutPage> {
    let mut flow = Flow::new(setup);

    for (section_index, section) in sections.iter().enumerate() {
        flow.new_page();
        for (block_index, block) in section.blocks.iter().enumerate() {
            match block {
                ExportBlock::Paragraph(text) => {
                    for line in wrap_text(text, setup.chars_per_line()) {
                        flow.text_line(line);
                    }
                }
                ExportBlock::Image { width, height, .. } => {
                    flow.image(section_index, block_index, *width, *height);
                }
            }
        }
    }

    flow.pages
}

struct Flow<'a> {
    setup: &'a PageSetup,
    pages: Vec<LaidOutPage>,
    /// Distance from the page bottom of the next free line
    cursor: f64,
}

impl<'a> Flow<'a> {
    fn new(setup: &'a PageSetup) -> Self {
        Self {
            setup,
            pages: Vec::new(),
            cursor: 0.0,
        }
    }

    fn top(&self) -> f64 {
        self.setup.height - self.setup.margin
    }

    fn new_page(&mut self) {
        self.pages.push(LaidOutPage::default());
        self.cursor = self.top();
    }

    /// Nothing has advanced the cursor on the current page yet, blank lines
    /// included
    fn is_fresh(&self) -> bool {
        self.cursor >= self.top()
    }

    fn ensure_room(&mut self, height: f64) {
        if self.pages.is_empty() || (self.cursor - height < self.setup.margin && !self.is_fresh()) {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text_line(&mut self, text: String) {
        let line_height = self.setup.line_height();
        self.ensure_room(line_height);
        let baseline = self.cursor - self.setup.font_size;
        self.cursor -= line_height;
        if !text.is_empty() {
            self.push(DrawOp::Text {
                text,
                x: self.setup.margin,
                y: baseline,
            });
        }
    }

    fn image(&mut self, section: usize, block: usize, width: f64, height: f64) {
        self.ensure_room(height);
        let y = self.cursor - height;
        self.push(DrawOp::Image {
            section,
            block,
            x: self.setup.margin,
            y,
            width,
            height,
        });
        // line break after the image
        self.cursor = y - self.setup.line_height();
    }
}
