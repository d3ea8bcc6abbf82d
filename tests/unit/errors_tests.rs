/*!
 * Tests for error types and conversions
 */

use std::error::Error as _;

use doclingo::errors::{AppError, ExportError, ExtractionError, ProviderError, TranslationError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_connectionError_shouldDisplayCorrectly() {
    let error = ProviderError::ConnectionError("Host unreachable".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Connection error"));
    assert!(display.contains("Host unreachable"));
}

#[test]
fn test_translationError_provider_shouldNamePageAndKeepSource() {
    let error = TranslationError::Provider {
        page: 2,
        source: ProviderError::InvalidResponse("missing translatedText".to_string()),
    };
    assert!(error.to_string().contains("page 2"));
    let source = error.source().expect("provider error as source");
    assert!(source.to_string().contains("missing translatedText"));
}

#[test]
fn test_extractionError_page_shouldDisplayPageNumber() {
    let error = ExtractionError::Page {
        page: 7,
        message: "bad stream".to_string(),
    };
    assert_eq!(error.to_string(), "Failed to read page 7: bad stream");
}

#[test]
fn test_exportError_incomplete_shouldShowProgress() {
    let error = ExportError::Incomplete { written: 1, total: 3 };
    assert_eq!(error.to_string(), "Export incomplete: 1 of 3 pages written");
}

#[test]
fn test_appError_fromStageErrors_shouldWrap() {
    let app: AppError = ProviderError::RequestFailed("boom".to_string()).into();
    assert!(matches!(app, AppError::Provider(_)));

    let app: AppError = TranslationError::NotLoaded.into();
    assert!(app.to_string().contains("No document loaded"));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(message) if message.contains("gone")));

    let app: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(app, AppError::Unknown(_)));
}
