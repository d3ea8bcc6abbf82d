use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, TranslationProvider};
use crate::document::Document;
use crate::export::{ExportReconstructor, PdfRenderer};
use crate::file_utils::{FileManager, FileType, INPUT_EXTENSIONS};
use crate::language_utils;
use crate::providers::{LanguageInfo, LibreTranslate, MockProvider, Provider};
use crate::translation::{
    TranslateOutcome, TranslationControl, TranslationJob, TranslationOptions, TranslationOrchestrator,
    TranslationRecord, TranslationSession,
};

// @module: Application controller for document translation

/// Interval at which the progress bar polls the page counter
const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation service shared by every run
    provider: Arc<dyn Provider>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = build_provider(&config)?;
        Ok(Self { config, provider })
    }

    /// Create a controller around an already built provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn orchestrator(&self) -> TranslationOrchestrator {
        TranslationOrchestrator::new(Arc::clone(&self.provider))
            .with_options(TranslationOptions::from_config(&self.config.translation))
    }

    /// Open a document, using the file header when the extension says nothing
    pub fn open_document(&self, input_file: &Path) -> Result<Document> {
        let extraction = &self.config.extraction;
        let document = match FileManager::detect_file_type(input_file)? {
            FileType::Pdf => Document::open_pdf(input_file, extraction)?,
            FileType::PageDump => Document::open_json(input_file, extraction)?,
            FileType::Unknown => return Err(anyhow!("Unsupported input file: {:?}", input_file)),
        };
        Ok(document)
    }

    /// Translate one document and export it as PDF into `output_dir`.
    ///
    /// Returns the written path, or `None` when the file was skipped or the
    /// run was aborted.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        FileManager::ensure_dir(&output_dir)?;

        let output_path =
            FileManager::generate_output_path(&input_file, &output_dir, &self.config.target_language, "pdf");
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(None);
        }

        let document = self.open_document(&input_file)?;
        info!(
            "🚀 DocLingo: {} - {} page(s)",
            self.config.translation.provider.display_name(),
            document.page_count()
        );

        let job = TranslationJob::new(
            language_utils::to_service_code(&self.config.source_language)?,
            language_utils::to_service_code(&self.config.target_language)?,
        );

        let control = TranslationControl::new();
        let progress_bar = page_progress_bar(document.page_count() as u64);
        progress_bar.set_message("Translating");

        // Poll the shared counter until the run finishes
        let poller = {
            let progress = control.progress.clone();
            let pb = progress_bar.clone();
            tokio::spawn(async move {
                loop {
                    pb.set_position(progress.get() as u64);
                    tokio::time::sleep(PROGRESS_POLL_INTERVAL).await;
                }
            })
        };

        // Ctrl-C asks the run to stop at the next boundary
        let interrupt = {
            let abort = control.abort.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after the current page");
                    abort.request();
                }
            })
        };

        let outcome = self.orchestrator().translate(&document, &job, &control).await;

        poller.abort();
        progress_bar.set_position(control.progress.get() as u64);
        progress_bar.finish_and_clear();

        let session = match outcome {
            Ok(TranslateOutcome::Translated(session)) => session,
            Ok(TranslateOutcome::Aborted) => {
                interrupt.abort();
                warn!("Translation aborted, nothing was written");
                return Ok(None);
            }
            Err(e) => {
                interrupt.abort();
                return Err(e).context("Translation failed");
            }
        };
        let translation_elapsed = start_time.elapsed();

        let written = self.export_session(&session, &output_path, &input_file, &control).await;
        interrupt.abort();
        let Some(written) = written? else {
            return Ok(None);
        };

        info!(
            "Translation complete. Translation: {} - Total: {}",
            Self::format_duration(translation_elapsed),
            Self::format_duration(start_time.elapsed())
        );
        info!("Success: {}", written.display());
        Ok(Some(written))
    }

    /// Export a translated session to `output_path`.
    ///
    /// The abort signal is checked between pages; an aborted export writes
    /// nothing and returns `None`.
    pub async fn export_session(
        &self,
        session: &TranslationSession,
        output_path: &Path,
        input_file: &Path,
        control: &TranslationControl,
    ) -> Result<Option<PathBuf>> {
        let export_bar = page_progress_bar(session.page_count() as u64);
        export_bar.set_message("Exporting");
        let mut job = ExportReconstructor::from_config(&self.config.export).export(session, output_path);

        loop {
            if control.abort.is_requested() {
                export_bar.finish_and_clear();
                warn!("Export aborted after {} page(s), nothing was written", job.pages_done());
                return Ok(None);
            }
            if job.next().is_none() {
                break;
            }
            export_bar.set_position(job.pages_done() as u64);
            // Let the interrupt listener run between pages
            tokio::task::yield_now().await;
        }
        export_bar.finish_and_clear();

        let mut renderer = PdfRenderer::new(document_title(input_file)).with_font(self.config.export.font_path.clone());
        let written = job.finish(&mut renderer)?;
        Ok(Some(written))
    }

    /// Run the workflow in folder mode, processing all documents in a directory.
    /// Files that already have a translation are skipped.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let target_language = &self.config.target_language;
        let documents: Vec<PathBuf> = FileManager::find_files(&input_dir, &INPUT_EXTENSIONS)?
            .into_iter()
            .filter(|path| {
                let output = FileManager::is_translation_output(path, target_language);
                if output {
                    debug!("Skipping earlier output {}", path.display());
                }
                !output
            })
            .collect();
        if documents.is_empty() {
            return Err(anyhow!("No documents found in directory: {:?}", input_dir));
        }

        let mut success_count = 0;
        let mut skip_count = 0;
        let mut error_count = 0;

        for document in &documents {
            let output_dir = document.parent().map_or_else(|| input_dir.clone(), Path::to_path_buf);
            match self.run(document.clone(), output_dir, force_overwrite).await {
                Ok(Some(_)) => success_count += 1,
                Ok(None) => skip_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", document.display(), e);
                    error_count += 1;
                }
            }
        }

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors",
            success_count, skip_count, error_count
        );
        Ok(())
    }

    /// Print or write the extracted pages of a document without translating
    pub fn extract(&self, input_file: &Path, output_file: Option<&Path>) -> Result<()> {
        let document = self.open_document(input_file)?;
        let text = document
            .pages()
            .iter()
            .map(|page| format!("--- Page {} ---\n{}", page.number(), page))
            .collect::<Vec<_>>()
            .join("\n");

        match output_file {
            Some(path) => {
                FileManager::write_to_file(path, &text)?;
                info!("Extracted {} page(s) to {}", document.page_count(), path.display());
            }
            None => println!("{}", text),
        }
        Ok(())
    }

    /// Translate a single block of text with alternatives
    pub async fn translate_text(&self, text: &str) -> Result<TranslationRecord> {
        let source = language_utils::to_service_code(&self.config.source_language)?;
        let target = language_utils::to_service_code(&self.config.target_language)?;
        let record = self
            .orchestrator()
            .translate_block(text, &source, &target)
            .await
            .context("Block translation failed")?;
        Ok(record)
    }

    /// Languages the configured service supports
    pub async fn list_languages(&self) -> Result<Vec<LanguageInfo>> {
        self.provider
            .languages()
            .await
            .with_context(|| format!("Failed to list languages from {}", self.provider.name()))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Build the provider named by the configuration
pub fn build_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let translation = &config.translation;
    let provider: Arc<dyn Provider> = match translation.provider {
        TranslationProvider::LibreTranslate => Arc::new(
            LibreTranslate::new_with_config(
                &translation.endpoint,
                translation.api_key.clone(),
                translation.timeout_secs,
                translation.retry_count,
                translation.retry_backoff_ms,
            )
            .context("Failed to create LibreTranslate provider")?,
        ),
        TranslationProvider::Mock => Arc::new(MockProvider::working()),
    };
    Ok(provider)
}

fn page_progress_bar(len: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({percent}%) {msg} {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}

fn document_title(input_file: &Path) -> String {
    input_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "Translated document".to_string())
}
