/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use doclingo::app_config::{Config, LogLevel, TranslationProvider};

use crate::common::{create_temp_dir, create_test_file};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.translation.provider, TranslationProvider::LibreTranslate);
    assert_eq!(config.translation.endpoint, "http://127.0.0.1:5000");
    assert_eq!(config.translation.timeout_secs, 30);
    assert_eq!(config.translation.retry_count, 0);
    assert_eq!(config.translation.page_alternatives, 1);
    assert_eq!(config.translation.block_alternatives, 3);
    assert_eq!(config.translation.max_concurrent_requests, None);
    assert!((config.extraction.gap_threshold - 0.3).abs() < f64::EPSILON);
    assert_eq!(config.extraction.padding_char, ' ');
    assert!(config.extraction.include_images);
    assert!((config.export.page_width_mm - 210.0).abs() < f64::EPSILON);
    assert!((config.export.margin_cm - 1.5).abs() < f64::EPSILON);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Auto-detected source is allowed
    config.source_language = "auto".to_string();
    assert!(config.validate().is_ok());

    // Invalid source language
    config.source_language = "e".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    // Target can never be auto-detected
    config.target_language = "auto".to_string();
    assert!(config.validate().is_err());
    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "deu".to_string();
    assert!(config.validate().is_ok());

    // Source and target naming the same language in different code forms
    config.target_language = "eng".to_string();
    assert!(config.validate().is_err());
    config.source_language = "ger".to_string();
    config.target_language = "de".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();
    config.target_language = "deu".to_string();

    // Endpoint must be a URL for LibreTranslate only
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.translation.provider = TranslationProvider::Mock;
    assert!(config.validate().is_ok());
    config.translation.provider = TranslationProvider::LibreTranslate;
    config.translation.endpoint = "http://localhost:5000".to_string();

    config.translation.max_concurrent_requests = Some(0);
    assert!(config.validate().is_err());
    config.translation.max_concurrent_requests = Some(4);
    assert!(config.validate().is_ok());

    config.extraction.gap_threshold = -1.0;
    assert!(config.validate().is_err());
    config.extraction.gap_threshold = 0.3;

    // Margins wider than the page
    config.export.margin_cm = 11.0;
    assert!(config.validate().is_err());
    config.export.margin_cm = 1.5;

    config.export.font_size = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_fromFile_withPartialConfig_shouldFillDefaults() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "source_language": "de",
            "target_language": "es",
            "translation": { "provider": "mock", "max_concurrent_requests": 2 },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.source_language, "de");
    assert_eq!(config.translation.provider, TranslationProvider::Mock);
    assert_eq!(config.translation.max_concurrent_requests, Some(2));
    assert_eq!(config.translation.block_alternatives, 3);
    assert!(config.extraction.include_images);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_save_thenFromFile_shouldKeepValues() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("nested").join("conf.json");

    let mut config = Config::default();
    config.target_language = "it".to_string();
    config.export.font_path = Some("/fonts/DejaVuSans.ttf".into());
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.target_language, "it");
    assert_eq!(loaded.export, config.export);
    Ok(())
}

#[test]
fn test_translationProvider_fromStr_shouldAcceptAliases() {
    assert_eq!("LibreTranslate".parse::<TranslationProvider>().unwrap(), TranslationProvider::LibreTranslate);
    assert_eq!("libre".parse::<TranslationProvider>().unwrap(), TranslationProvider::LibreTranslate);
    assert_eq!("mock".parse::<TranslationProvider>().unwrap(), TranslationProvider::Mock);
    assert!("deepl".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::Mock.to_string(), "mock");
    assert_eq!(TranslationProvider::LibreTranslate.display_name(), "LibreTranslate");
}

#[test]
fn test_logLevel_shouldConvertToLevelFilter() {
    assert_eq!(log::LevelFilter::from(LogLevel::Warn), log::LevelFilter::Warn);
    assert_eq!(log::LevelFilter::from(LogLevel::Trace), log::LevelFilter::Trace);
}
