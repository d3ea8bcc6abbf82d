/*!
 * Page and document model.
 *
 * A `Page` is built once from a raw page and is read-only afterwards. A
 * `Document` owns its pages behind `Arc` so a translation run can share them
 * with its row tasks, and owns the page source handle until `clear`.
 */

use bytes::Bytes;
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::ExtractionConfig;
use crate::errors::ExtractionError;

use super::clustering::RowClusterer;
use super::geometry::{Bounds, PositionedImage, RawPage};
use super::json_source::JsonPageSource;
use super::pdf_source::PdfPageSource;
use super::source::PageSource;

/// Identity of a text row inside its page, assigned at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub usize);

/// A block of text in reading order
#[derive(Debug, Clone, PartialEq)]
pub struct TextRow {
    pub id: RowId,
    pub text: String,
}

impl TextRow {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// An image placed in reading order
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub index: usize,
    pub payload: Bytes,
    pub bounds: Bounds,
    pub pixel_size: Option<(u32, u32)>,
}

impl From<&PositionedImage> for PageImage {
    fn from(image: &PositionedImage) -> Self {
        Self {
            index: image.index,
            // Bytes clones share the buffer
            payload: image.payload.clone(),
            bounds: image.bounds,
            pixel_size: image.pixel_size,
        }
    }
}

/// One unit of page content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    TextRow(TextRow),
    Image(PageImage),
}

/// Ordered content of a single page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: usize,
    items: Vec<ContentItem>,
}

impl Page {
    /// Cluster a raw page into reading order. `number` is 1-based.
    pub fn build(number: usize, raw: &RawPage, clusterer: &RowClusterer) -> Self {
        Self {
            number,
            items: clusterer.cluster(&raw.glyphs, &raw.images),
        }
    }

    /// Page from already ordered content
    pub fn from_items(number: usize, items: Vec<ContentItem>) -> Self {
        Self { number, items }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn text_rows(&self) -> impl Iterator<Item = &TextRow> {
        self.items.iter().filter_map(|item| match item {
            ContentItem::TextRow(row) => Some(row),
            ContentItem::Image(_) => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &PageImage> {
        self.items.iter().filter_map(|item| match item {
            ContentItem::Image(image) => Some(image),
            ContentItem::TextRow(_) => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.images().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            match item {
                ContentItem::TextRow(row) => writeln!(f, "{}", row.text)?,
                ContentItem::Image(image) => writeln!(f, "<IMAGE #{}>", image.index)?,
            }
        }
        Ok(())
    }
}

/// A loaded document: its pages in source order plus the open source
#[derive(Debug, Default)]
pub struct Document {
    source: Option<Box<dyn PageSource>>,
    origin: Option<PathBuf>,
    pages: Vec<Arc<Page>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document made of already built pages, with no source behind it
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            source: None,
            origin: None,
            pages: pages.into_iter().map(Arc::new).collect(),
        }
    }

    /// Open a file, picking the page source from its extension
    pub fn open<P: AsRef<Path>>(path: P, config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"));

        if is_json {
            Self::open_json(path, config)
        } else {
            Self::open_pdf(path, config)
        }
    }

    pub fn open_pdf<P: AsRef<Path>>(path: P, config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let source = PdfPageSource::open(path)?;
        Self::from_source(Box::new(source), config)
    }

    pub fn open_json<P: AsRef<Path>>(path: P, config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let source = JsonPageSource::open(path)?;
        Self::from_source(Box::new(source), config)
    }

    fn from_source(source: Box<dyn PageSource>, config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let mut document = Self::new();
        document.load(source, &RowClusterer::from_config(config))?;
        Ok(document)
    }

    /// Build every page of `source`.
    ///
    /// Pages are published only once all of them were built. On failure the
    /// source is closed and the document is left empty.
    pub fn load(&mut self, mut source: Box<dyn PageSource>, clusterer: &RowClusterer) -> Result<(), ExtractionError> {
        let count = source.page_count();
        let mut pages = Vec::with_capacity(count);

        for number in 1..=count {
            match source.page(number) {
                Ok(raw) => {
                    let page = Page::build(number, &raw, clusterer);
                    debug!(
                        "Page {}: {} glyphs, {} images -> {} items",
                        number,
                        raw.glyphs.len(),
                        raw.images.len(),
                        page.items().len()
                    );
                    pages.push(Arc::new(page));
                }
                Err(e) => {
                    source.close();
                    self.clear();
                    return Err(e);
                }
            }
        }

        self.clear();
        self.origin = source.origin().map(Path::to_path_buf);
        self.source = Some(source);
        self.pages = pages;
        info!("Loaded {} page(s)", self.pages.len());
        Ok(())
    }

    /// Release the source handle and all pages. Safe to call repeatedly.
    pub fn clear(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
        self.pages.clear();
        self.origin = None;
    }

    pub fn pages(&self) -> &[Arc<Page>] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Arc<Page>> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_loaded(&self) -> bool {
        !self.pages.is_empty()
    }

    /// Path the document was opened from, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        self.clear();
    }
}
