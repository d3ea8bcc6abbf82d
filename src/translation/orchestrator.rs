/*!
 * Translation orchestrator.
 *
 * Pages are translated strictly in order. Inside a page every non-blank text
 * row goes to the service in its own task and the page completes only when
 * all of them are back. A single failed row fails the run and nothing is
 * kept; an abort request is honoured before and after each page.
 */

use futures::future::join_all;
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::app_config::TranslationConfig;
use crate::document::{Document, Page, RowId};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{Provider, TranslatedText, TranslationRequest};

use super::control::{AbortSignal, TranslationControl};
use super::record::TranslationRecord;
use super::session::{TranslatedPage, TranslationSession};

/// Tuning for a translation run
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOptions {
    /// Alternatives requested per row during a document run
    pub page_alternatives: usize,
    /// Alternatives requested by `translate_block`
    pub block_alternatives: usize,
    /// Upper bound on in-flight service calls, `None` for one per row
    pub max_concurrent_requests: Option<usize>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            page_alternatives: 1,
            block_alternatives: 3,
            max_concurrent_requests: None,
        }
    }
}

impl TranslationOptions {
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            page_alternatives: config.page_alternatives,
            block_alternatives: config.block_alternatives,
            max_concurrent_requests: config.max_concurrent_requests,
        }
    }
}

/// What to translate
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationJob {
    pub source_language: String,
    pub target_language: String,
    /// 0-based page the returned session starts on
    pub start_page: usize,
}

impl TranslationJob {
    pub fn new(source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            start_page: 0,
        }
    }

    pub fn starting_at(mut self, start_page: usize) -> Self {
        self.start_page = start_page;
        self
    }
}

/// How a run ended when no error occurred
#[derive(Debug)]
pub enum TranslateOutcome {
    Translated(TranslationSession),
    Aborted,
}

impl TranslateOutcome {
    pub fn session(self) -> Option<TranslationSession> {
        match self {
            TranslateOutcome::Translated(session) => Some(session),
            TranslateOutcome::Aborted => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, TranslateOutcome::Aborted)
    }
}

/// Result of a single row task
enum RowOutcome {
    Translated(TranslatedText),
    Failed(ProviderError),
    /// Abort was requested before the call was made
    Skipped,
}

/// Drives a provider over a document
#[derive(Debug, Clone)]
pub struct TranslationOrchestrator {
    provider: Arc<dyn Provider>,
    options: TranslationOptions,
}

impl TranslationOrchestrator {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            options: TranslationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Translate every page of `document`.
    ///
    /// Returns `Aborted` if `control.abort` is raised at a page boundary or
    /// before a row's call was made. `control.progress` is incremented once per
    /// completed page.
    pub async fn translate(
        &self,
        document: &Document,
        job: &TranslationJob,
        control: &TranslationControl,
    ) -> Result<TranslateOutcome, TranslationError> {
        if !document.is_loaded() {
            return Err(TranslationError::NotLoaded);
        }

        info!(
            "Translating {} page(s) {} -> {} with {}",
            document.page_count(),
            job.source_language,
            job.target_language,
            self.provider.name()
        );

        let semaphore = self
            .options
            .max_concurrent_requests
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let mut pages = Vec::with_capacity(document.page_count());

        for page in document.pages() {
            if control.abort.is_requested() {
                info!("Translation aborted before page {}", page.number());
                return Ok(TranslateOutcome::Aborted);
            }

            let Some(records) = self.translate_page(page, job, &control.abort, semaphore.as_ref()).await? else {
                info!("Translation aborted during page {}", page.number());
                return Ok(TranslateOutcome::Aborted);
            };

            debug!("Page {} translated ({} rows)", page.number(), records.len());
            pages.push(TranslatedPage::decode(Arc::clone(page), records).await?);
            control.progress.increment();

            if control.abort.is_requested() {
                info!("Translation aborted after page {}", page.number());
                return Ok(TranslateOutcome::Aborted);
            }
        }

        let session = TranslationSession::new(&job.source_language, &job.target_language, pages, job.start_page);
        info!("Translation session {} ready", session.id());
        Ok(TranslateOutcome::Translated(session))
    }

    /// Translate the rows of one page. `None` means a row was skipped on abort.
    async fn translate_page(
        &self,
        page: &Arc<Page>,
        job: &TranslationJob,
        abort: &AbortSignal,
        semaphore: Option<&Arc<Semaphore>>,
    ) -> Result<Option<HashMap<RowId, TranslationRecord>>, TranslationError> {
        let tasks: Vec<(RowId, _)> = page
            .text_rows()
            .filter(|row| !row.is_blank())
            .map(|row| {
                let provider = Arc::clone(&self.provider);
                let abort = abort.clone();
                let semaphore = semaphore.cloned();
                let request = TranslationRequest::new(&row.text, &job.source_language, &job.target_language)
                    .with_alternatives(self.options.page_alternatives);

                let handle = tokio::spawn(async move {
                    let _permit = match semaphore {
                        Some(semaphore) => match semaphore.acquire_owned().await {
                            Ok(permit) => Some(permit),
                            Err(_) => return RowOutcome::Skipped,
                        },
                        None => None,
                    };
                    if abort.is_requested() {
                        return RowOutcome::Skipped;
                    }
                    match provider.translate(request).await {
                        Ok(text) => RowOutcome::Translated(text),
                        Err(e) => RowOutcome::Failed(e),
                    }
                });
                (row.id, handle)
            })
            .collect();

        let ids: Vec<RowId> = tasks.iter().map(|(id, _)| *id).collect();
        let results = join_all(tasks.into_iter().map(|(_, handle)| handle)).await;

        let mut records = HashMap::with_capacity(results.len());
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(RowOutcome::Translated(text)) => {
                    records.insert(id, TranslationRecord::new(text));
                }
                Ok(RowOutcome::Failed(source)) => {
                    error!("Row {} on page {} failed: {}", id.0, page.number(), source);
                    return Err(TranslationError::Provider {
                        page: page.number(),
                        source,
                    });
                }
                Ok(RowOutcome::Skipped) => return Ok(None),
                Err(e) => return Err(TranslationError::Task(e.to_string())),
            }
        }

        Ok(Some(records))
    }

    /// Translate one block of text on demand, asking for more alternatives
    /// than a document run does.
    pub async fn translate_block(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslationRecord, ProviderError> {
        let request = TranslationRequest::new(text, source_language, target_language)
            .with_alternatives(self.options.block_alternatives);
        self.provider.translate(request).await.map(TranslationRecord::new)
    }
}
