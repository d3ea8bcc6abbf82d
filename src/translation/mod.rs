/*!
 * Document translation.
 *
 * - `orchestrator`: page-by-page concurrent translation with abort and rollback
 * - `session`: the translated document and its page cursor
 * - `record`: one row's translation and its alternatives
 * - `control`: progress counter and abort signal shared with the caller
 */

// Re-export main types for easier usage
pub use self::control::{AbortSignal, ProgressCounter, TranslationControl};
pub use self::orchestrator::{TranslateOutcome, TranslationJob, TranslationOptions, TranslationOrchestrator};
pub use self::record::TranslationRecord;
pub use self::session::{THUMBNAIL_MAX_EDGE, TranslatedPage, TranslationSession};

// Submodules
pub mod control;
pub mod orchestrator;
pub mod record;
pub mod session;
