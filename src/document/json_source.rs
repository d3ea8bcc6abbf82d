/*!
 * JSON page dumps.
 *
 * Lets word boxes from an OCR engine or any other extractor feed the
 * pipeline. Layout:
 *
 * ```json
 * { "pages": [ { "glyphs": [ { "value": "Hi", "start_x": 10, "end_x": 22, "top": 700 } ],
 *                "images": [ { "data": "<base64>", "bounds": { "left": 0, "top": 650, "width": 80, "height": 40 } } ] } ] }
 * ```
 */

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::ExtractionError;

use super::geometry::{Bounds, PositionedGlyph, PositionedImage, RawPage};
use super::source::PageSource;

#[derive(Debug, Deserialize)]
struct JsonDump {
    pages: Vec<JsonPage>,
}

#[derive(Debug, Deserialize)]
struct JsonPage {
    #[serde(default)]
    glyphs: Vec<PositionedGlyph>,
    #[serde(default)]
    images: Vec<JsonImage>,
}

#[derive(Debug, Deserialize)]
struct JsonImage {
    /// Base64 payload
    data: String,
    bounds: Bounds,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

/// Page source backed by a JSON dump
#[derive(Debug)]
pub struct JsonPageSource {
    path: Option<PathBuf>,
    pages: Vec<JsonPage>,
}

impl JsonPageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ExtractionError::Open(format!("{}: {}", path.display(), e)))?;
        let dump: JsonDump = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ExtractionError::Format(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            pages: dump.pages,
        })
    }

    pub fn parse(json: &str) -> Result<Self, ExtractionError> {
        let dump: JsonDump = serde_json::from_str(json).map_err(|e| ExtractionError::Format(e.to_string()))?;
        Ok(Self { path: None, pages: dump.pages })
    }
}

impl PageSource for JsonPageSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&mut self, number: usize) -> Result<RawPage, ExtractionError> {
        let page = number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .ok_or_else(|| ExtractionError::Page {
                page: number,
                message: "page out of range".to_string(),
            })?;

        let mut images = Vec::with_capacity(page.images.len());
        for (index, image) in page.images.iter().enumerate() {
            let payload = STANDARD.decode(image.data.trim()).map_err(|e| ExtractionError::Page {
                page: number,
                message: format!("image {} has invalid base64 data: {}", index, e),
            })?;
            let mut positioned = PositionedImage::new(payload, image.bounds, index);
            if let (Some(width), Some(height)) = (image.width, image.height) {
                positioned = positioned.with_pixel_size(width, height);
            }
            images.push(positioned);
        }

        let glyphs = page
            .glyphs
            .iter()
            .map(|glyph| {
                if glyph.bounds == Bounds::default() {
                    PositionedGlyph::new(glyph.value.clone(), glyph.start_x, glyph.end_x, glyph.top)
                } else {
                    glyph.clone()
                }
            })
            .collect();

        Ok(RawPage::new(glyphs, images))
    }

    fn origin(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn close(&mut self) {
        self.pages.clear();
    }
}
