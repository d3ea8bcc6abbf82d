/*!
 * Error types for the doclingo application.
 *
 * Each pipeline stage owns an error enum built with thiserror. Extraction and
 * translation failures abort the whole operation; image embedding failures
 * during export are recoverable per item and only ever logged.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The service answered, but without a usable translation
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors raised while reading a page source
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The source could not be opened at all
    #[error("Failed to open page source: {0}")]
    Open(String),

    /// A single page could not be read
    #[error("Failed to read page {page}: {message}")]
    Page { page: usize, message: String },

    /// The source data is structurally invalid
    #[error("Malformed page data: {0}")]
    Format(String),
}

/// Errors that abort a translation run
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Nothing to translate
    #[error("No document loaded")]
    NotLoaded,

    /// A row on the given page failed; the whole run is discarded
    #[error("Failed translation on page {page}: {source}")]
    Provider {
        /// 1-based page number
        page: usize,
        #[source]
        source: ProviderError,
    },

    /// A row task panicked or was cancelled by the runtime
    #[error("Translation task failed: {0}")]
    Task(String),
}

/// Errors raised while reconstructing the exported document
#[derive(Error, Debug)]
pub enum ExportError {
    /// `finish` was called before every page was written
    #[error("Export incomplete: {written} of {total} pages written")]
    Incomplete { written: usize, total: usize },

    /// Writing the destination file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The renderer could not produce the document
    #[error("Render error: {0}")]
    Render(String),

    /// The configured font could not be loaded
    #[error("Font error: {0}")]
    Font(String),

    /// A single image could not be embedded
    #[error("Image #{index} could not be embedded: {message}")]
    Image { index: usize, message: String },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error while loading a document
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error while exporting
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
