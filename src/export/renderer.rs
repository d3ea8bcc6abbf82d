/*!
 * Export renderers.
 */

use log::{debug, warn};
use printpdf::{BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::errors::ExportError;

use super::layout::{self, DrawOp, ExportBlock, ExportSection, PageSetup, points_to_mm};

/// Turns laid out sections into the bytes of an output document
pub trait DocumentRenderer {
    fn render(&mut self, sections: &[ExportSection], setup: &PageSetup) -> Result<Vec<u8>, ExportError>;
}

/// PDF output through printpdf
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    title: String,
    /// TrueType font to embed instead of Helvetica
    font_path: Option<PathBuf>,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new("Translated document")
    }
}

impl PdfRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            font_path: None,
        }
    }

    pub fn with_font(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    fn load_font(&self, doc: &PdfDocumentReference) -> Result<IndirectFontRef, ExportError> {
        match &self.font_path {
            Some(path) => {
                let file = File::open(path).map_err(|e| ExportError::Font(format!("{}: {}", path.display(), e)))?;
                doc.add_external_font(BufReader::new(file))
                    .map_err(|e| ExportError::Font(format!("{}: {}", path.display(), e)))
            }
            None => doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ExportError::Font(e.to_string())),
        }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&mut self, sections: &[ExportSection], setup: &PageSetup) -> Result<Vec<u8>, ExportError> {
        let pages = layout::layout(sections, setup);
        let page_width = Mm(points_to_mm(setup.width) as f32);
        let page_height = Mm(points_to_mm(setup.height) as f32);
        let mm = |points: f64| Mm(points_to_mm(points) as f32);

        let (doc, first_page, first_layer) = PdfDocument::new(&self.title, page_width, page_height, "Layer 1");
        let font = self.load_font(&doc)?;

        for (page_index, page) in pages.iter().enumerate() {
            let layer = if page_index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_ref, layer_ref) = doc.add_page(page_width, page_height, "Layer 1");
                doc.get_page(page_ref).get_layer(layer_ref)
            };

            for op in &page.ops {
                match op {
                    DrawOp::Text { text, x, y } => {
                        layer.use_text(text.as_str(), setup.font_size as f32, mm(*x), mm(*y), &font);
                    }
                    DrawOp::Image {
                        section,
                        block,
                        x,
                        y,
                        width,
                        ..
                    } => {
                        let Some(ExportBlock::Image { index, image, .. }) =
                            sections.get(*section).and_then(|s| s.blocks.get(*block))
                        else {
                            warn!("Layout referenced a missing image block {}/{}", section, block);
                            continue;
                        };
                        if image.width() == 0 || image.height() == 0 {
                            let error = ExportError::Image {
                                index: *index,
                                message: "image has no pixels".to_string(),
                            };
                            warn!("{}", error);
                            continue;
                        }

                        // At 72 dpi one pixel is one point
                        let scale = (*width / image.width() as f64) as f32;
                        let rgb = image::DynamicImage::ImageRgb8(image.to_rgb8());
                        Image::from_dynamic_image(&rgb).add_to_layer(
                            layer.clone(),
                            ImageTransform {
                                translate_x: Some(mm(*x)),
                                translate_y: Some(mm(*y)),
                                scale_x: Some(scale),
                                scale_y: Some(scale),
                                dpi: Some(72.0),
                                ..Default::default()
                            },
                        );
                    }
                }
            }
        }

        debug!("Rendered {} page(s)", pages.len().max(1));
        doc.save_to_bytes().map_err(|e| ExportError::Render(e.to_string()))
    }
}
