/*!
 * Export reconstruction.
 *
 * Replays a translation session page by page into export sections and hands
 * them to a renderer once every page is done. The job is an iterator so the
 * caller drives it and can report progress between pages.
 */

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_config::ExportConfig;
use crate::document::{ContentItem, PageImage};
use crate::errors::ExportError;
use crate::translation::{ProgressCounter, TranslatedPage, TranslationSession};

use super::layout::{ExportBlock, ExportSection, PageSetup, fit_image};
use super::renderer::DocumentRenderer;

/// Builds export jobs for translated sessions
#[derive(Debug, Clone, Default)]
pub struct ExportReconstructor {
    setup: PageSetup,
}

impl ExportReconstructor {
    pub fn new(setup: PageSetup) -> Self {
        Self { setup }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(PageSetup::from_config(config))
    }

    pub fn setup(&self) -> &PageSetup {
        &self.setup
    }

    /// Start exporting `session` to `destination`. Nothing is written until
    /// the returned job is drained and finished.
    pub fn export<'a>(&self, session: &'a TranslationSession, destination: impl Into<PathBuf>) -> ExportJob<'a> {
        ExportJob {
            session,
            destination: destination.into(),
            setup: self.setup,
            sections: Vec::with_capacity(session.page_count()),
            next_page: 0,
            progress: None,
        }
    }
}

/// In-progress export. Yields the index of each page once its section is built.
#[derive(Debug)]
pub struct ExportJob<'a> {
    session: &'a TranslationSession,
    destination: PathBuf,
    setup: PageSetup,
    sections: Vec<ExportSection>,
    next_page: usize,
    progress: Option<ProgressCounter>,
}

impl ExportJob<'_> {
    /// Count finished pages on `progress` as well
    pub fn with_progress(mut self, progress: ProgressCounter) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn total_pages(&self) -> usize {
        self.session.page_count()
    }

    pub fn pages_done(&self) -> usize {
        self.sections.len()
    }

    pub fn is_complete(&self) -> bool {
        self.next_page >= self.session.page_count()
    }

    pub fn sections(&self) -> &[ExportSection] {
        &self.sections
    }

    /// Render and write the output file, replacing any existing one
    pub fn finish<R: DocumentRenderer + ?Sized>(self, renderer: &mut R) -> Result<PathBuf, ExportError> {
        if !self.is_complete() {
            return Err(ExportError::Incomplete {
                written: self.sections.len(),
                total: self.session.page_count(),
            });
        }

        if self.destination.exists() {
            fs::remove_file(&self.destination)?;
        }
        if let Some(parent) = self.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = renderer.render(&self.sections, &self.setup)?;
        fs::write(&self.destination, bytes)?;
        info!(
            "Exported {} page(s) to {}",
            self.sections.len(),
            self.destination.display()
        );
        Ok(self.destination)
    }

    /// Drain the remaining pages, then finish
    pub fn run<R: DocumentRenderer + ?Sized>(mut self, renderer: &mut R) -> Result<PathBuf, ExportError> {
        self.by_ref().for_each(drop);
        self.finish(renderer)
    }

    fn build_section(&self, page: &TranslatedPage) -> ExportSection {
        let mut section = ExportSection::new(page.number());

        for item in page.items() {
            match item {
                ContentItem::TextRow(row) => {
                    if let Some(record) = page.record(row.id) {
                        section.blocks.push(ExportBlock::Paragraph(record.primary().to_string()));
                    }
                }
                ContentItem::Image(image) => match self.image_block(image) {
                    Ok(block) => section.blocks.push(block),
                    Err(e) => warn!("Skipping image on page {}: {}", page.number(), e),
                },
            }
        }

        section
    }

    fn image_block(&self, image: &PageImage) -> Result<ExportBlock, ExportError> {
        let decoded = image::load_from_memory(&image.payload).map_err(|e| ExportError::Image {
            index: image.index,
            message: e.to_string(),
        })?;
        let (width, height) = fit_image(
            decoded.width() as f64,
            decoded.height() as f64,
            self.setup.writable_width(),
            self.setup.writable_height(),
        );
        Ok(ExportBlock::Image {
            index: image.index,
            image: decoded,
            width,
            height,
        })
    }
}

impl Iterator for ExportJob<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.next_page;
        let session = self.session;
        let page = session.page(index)?;
        let section = self.build_section(page);
        self.sections.push(section);
        self.next_page += 1;
        if let Some(progress) = &self.progress {
            progress.increment();
        }
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.session.page_count().saturating_sub(self.next_page);
        (remaining, Some(remaining))
    }
}
