/*!
 * Translation session.
 *
 * The result of one successful translation run: every page of the document
 * paired with the translations of its text rows, plus a page cursor for
 * navigation. A session is only ever handed out complete.
 */

use image::DynamicImage;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::document::{ContentItem, Page, PageImage, RowId, TextRow};
use crate::errors::TranslationError;

use super::record::TranslationRecord;

/// Largest thumbnail edge, in pixels
pub const THUMBNAIL_MAX_EDGE: u32 = 256;

/// A page with the translations of its rows
#[derive(Debug)]
pub struct TranslatedPage {
    page: Arc<Page>,
    records: HashMap<RowId, TranslationRecord>,
    /// Decoded previews keyed by image index
    thumbnails: HashMap<usize, DynamicImage>,
}

impl TranslatedPage {
    /// Pair a page with its records and decode image thumbnails
    pub fn new(page: Arc<Page>, records: HashMap<RowId, TranslationRecord>) -> Self {
        let thumbnails = page
            .images()
            .filter_map(|image| thumbnail(image).map(|thumb| (image.index, thumb)))
            .collect();
        Self {
            page,
            records,
            thumbnails,
        }
    }

    /// Same as [`TranslatedPage::new`] with the thumbnails decoded on the
    /// blocking pool
    pub async fn decode(page: Arc<Page>, records: HashMap<RowId, TranslationRecord>) -> Result<Self, TranslationError> {
        if page.image_count() == 0 {
            return Ok(Self::new(page, records));
        }
        tokio::task::spawn_blocking(move || Self::new(page, records))
            .await
            .map_err(|e| TranslationError::Task(e.to_string()))
    }

    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// 1-based number of the source page
    pub fn number(&self) -> usize {
        self.page.number()
    }

    pub fn items(&self) -> &[ContentItem] {
        self.page.items()
    }

    pub fn record(&self, row: RowId) -> Option<&TranslationRecord> {
        self.records.get(&row)
    }

    pub fn record_mut(&mut self, row: RowId) -> Option<&mut TranslationRecord> {
        self.records.get_mut(&row)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Translation currently selected for `row`, if it was translated
    pub fn translated_text(&self, row: &TextRow) -> Option<&str> {
        self.records.get(&row.id).map(TranslationRecord::current)
    }

    pub fn thumbnail(&self, image_index: usize) -> Option<&DynamicImage> {
        self.thumbnails.get(&image_index)
    }

    pub fn thumbnail_count(&self) -> usize {
        self.thumbnails.len()
    }
}

impl fmt::Display for TranslatedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.page.items() {
            match item {
                ContentItem::TextRow(row) => match self.translated_text(row) {
                    Some(text) => writeln!(f, "{}", text)?,
                    None => writeln!(f, "{}", row.text)?,
                },
                ContentItem::Image(image) => writeln!(f, "<IMAGE #{}>", image.index)?,
            }
        }
        Ok(())
    }
}

fn thumbnail(image: &PageImage) -> Option<DynamicImage> {
    match image::load_from_memory(&image.payload) {
        Ok(decoded) if decoded.width() > THUMBNAIL_MAX_EDGE || decoded.height() > THUMBNAIL_MAX_EDGE => {
            Some(decoded.thumbnail(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE))
        }
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!("No thumbnail for image #{}: {}", image.index, e);
            None
        }
    }
}

/// Every translated page of a document plus the page on display
#[derive(Debug)]
pub struct TranslationSession {
    id: Uuid,
    source_language: String,
    target_language: String,
    pages: Vec<TranslatedPage>,
    current_page: usize,
}

impl TranslationSession {
    /// `start_page` is clamped into range
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        pages: Vec<TranslatedPage>,
        start_page: usize,
    ) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            pages,
            current_page: 0,
        };
        session.go_to_page(start_page);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn pages(&self) -> &[TranslatedPage] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&TranslatedPage> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 0-based index of the page on display
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn current(&self) -> Option<&TranslatedPage> {
        self.pages.get(self.current_page)
    }

    /// Move to `index`, clamped to the last page. Returns the new position.
    pub fn go_to_page(&mut self, index: usize) -> usize {
        self.current_page = index.min(self.pages.len().saturating_sub(1));
        self.current_page
    }

    pub fn go_next(&mut self) -> usize {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    pub fn go_back(&mut self) -> usize {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page + 1 < self.pages.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.current_page > 0
    }

    /// Record of one row, for cycling through its alternatives
    pub fn record_mut(&mut self, page_index: usize, row: RowId) -> Option<&mut TranslationRecord> {
        self.pages.get_mut(page_index)?.record_mut(row)
    }

    pub fn image_count(&self) -> usize {
        self.pages.iter().map(|page| page.page().image_count()).sum()
    }
}
