/*!
 * Page source abstraction.
 */

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::ExtractionError;

use super::geometry::RawPage;

/// Yields unordered glyphs and images per page
///
/// Page numbers are 1-based. `close` releases any underlying handle and may
/// be called more than once.
pub trait PageSource: Send + Debug {
    fn page_count(&self) -> usize;

    fn page(&mut self, number: usize) -> Result<RawPage, ExtractionError>;

    /// File the source was opened from
    fn origin(&self) -> Option<&Path> {
        None
    }

    fn close(&mut self) {}
}

/// In-memory source, used for pre-built pages and in tests
#[derive(Debug, Default)]
pub struct MemoryPageSource {
    pages: Vec<RawPage>,
    fail_on: Option<usize>,
    closed: Arc<AtomicBool>,
}

impl MemoryPageSource {
    pub fn new(pages: Vec<RawPage>) -> Self {
        Self {
            pages,
            fail_on: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make reading the given 1-based page fail
    pub fn failing_on(mut self, page: usize) -> Self {
        self.fail_on = Some(page);
        self
    }

    /// Flag set once the source is closed
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl PageSource for MemoryPageSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&mut self, number: usize) -> Result<RawPage, ExtractionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ExtractionError::Open("source already closed".to_string()));
        }
        if self.fail_on == Some(number) {
            return Err(ExtractionError::Page {
                page: number,
                message: "simulated read failure".to_string(),
            });
        }
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .cloned()
            .ok_or_else(|| ExtractionError::Page {
                page: number,
                message: format!("page out of range (1..={})", self.pages.len()),
            })
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
