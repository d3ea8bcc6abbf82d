/*!
 * Controller driven runs over files on disk
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use doclingo::app_config::{Config, TranslationProvider};
use doclingo::app_controller::Controller;
use doclingo::providers::MockProvider;
use doclingo::translation::{TranslationControl, TranslationJob, TranslationOrchestrator};

use crate::common::{create_page_dump, create_temp_dir, create_test_file, create_test_pdf, init_logging};

fn mock_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config
}

#[tokio::test]
async fn test_run_withPageDump_shouldWriteTranslatedPdfOnce() -> Result<()> {
    init_logging();
    let dir = create_temp_dir()?;
    let input = create_page_dump(dir.path(), "scan.json", &["Hello", "World"])?;
    let output_dir = dir.path().join("out");
    let provider = MockProvider::working();
    let controller = Controller::with_provider(mock_config(), Arc::new(provider.clone()));

    let written = controller.run(input.clone(), output_dir.clone(), false).await?;
    let expected = output_dir.join("scan.fr.pdf");
    assert_eq!(written.as_deref(), Some(expected.as_path()));
    assert_eq!(lopdf::Document::load(&expected)?.get_pages().len(), 2);
    assert_eq!(provider.request_count(), 2);

    // Existing output is skipped unless forced
    assert!(controller.run(input.clone(), output_dir.clone(), false).await?.is_none());
    assert_eq!(provider.request_count(), 2);
    assert!(controller.run(input, output_dir, true).await?.is_some());
    assert_eq!(provider.request_count(), 4);
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldWriteNothing() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_page_dump(dir.path(), "scan.json", &["Hello", "World"])?;
    let controller = Controller::with_provider(mock_config(), Arc::new(MockProvider::failing_on("World")));

    let result = controller.run(input, dir.path().to_path_buf(), false).await;
    assert!(result.is_err());
    assert!(!dir.path().join("scan.fr.pdf").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let controller = Controller::with_config(mock_config())?;
    let result = controller.run(dir.path().join("missing.pdf"), dir.path().to_path_buf(), false).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_shouldTranslateEveryDocument() -> Result<()> {
    let dir = create_temp_dir()?;
    create_page_dump(dir.path(), "a.json", &["Alpha"])?;
    create_test_pdf(&dir.path().join("b.pdf"), &["Beta"], true)?;
    create_test_file(dir.path(), "notes.txt", "ignored")?;

    let controller = Controller::with_config(mock_config())?;
    controller.run_folder(dir.path().to_path_buf(), false).await?;

    assert!(dir.path().join("a.fr.pdf").exists());
    assert!(dir.path().join("b.fr.pdf").exists());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_twice_shouldNotTranslateItsOwnOutputs() -> Result<()> {
    let dir = create_temp_dir()?;
    create_page_dump(dir.path(), "a.json", &["Alpha"])?;
    create_test_pdf(&dir.path().join("b.pdf"), &["Beta"], false)?;
    let provider = MockProvider::working();
    let controller = Controller::with_provider(mock_config(), Arc::new(provider.clone()));

    controller.run_folder(dir.path().to_path_buf(), false).await?;
    assert_eq!(provider.request_count(), 2);

    controller.run_folder(dir.path().to_path_buf(), true).await?;
    assert_eq!(provider.request_count(), 4);

    let mut files: Vec<String> = fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["a.fr.pdf", "a.json", "b.fr.pdf", "b.pdf"]);
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withoutDocuments_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "notes.txt", "ignored")?;
    let controller = Controller::with_config(mock_config())?;
    assert!(controller.run_folder(dir.path().to_path_buf(), false).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_exportSession_withAbortRequested_shouldWriteNothing() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_page_dump(dir.path(), "scan.json", &["Hello", "World"])?;
    let controller = Controller::with_config(mock_config())?;
    let document = controller.open_document(&input)?;
    let session = TranslationOrchestrator::new(Arc::new(MockProvider::working()))
        .translate(&document, &TranslationJob::new("en", "fr"), &TranslationControl::new())
        .await?
        .session()
        .expect("not aborted");

    let output = dir.path().join("scan.fr.pdf");
    let control = TranslationControl::new();
    control.abort.request();
    assert!(controller.export_session(&session, &output, &input, &control).await?.is_none());
    assert!(!output.exists());

    control.abort.reset();
    let written = controller.export_session(&session, &output, &input, &control).await?;
    assert_eq!(written.as_deref(), Some(output.as_path()));
    assert_eq!(lopdf::Document::load(&output)?.get_pages().len(), 2);
    Ok(())
}

#[test]
fn test_extract_shouldWritePageText() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_page_dump(dir.path(), "scan.json", &["Hello", "World"])?;
    let output = dir.path().join("scan.txt");

    let controller = Controller::with_config(mock_config())?;
    controller.extract(&input, Some(&output))?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "--- Page 1 ---\nHello\n<IMAGE #0>\n\n--- Page 2 ---\nWorld\n"
    );
    Ok(())
}

#[test]
fn test_openDocument_withUnknownFile_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_file(dir.path(), "mystery.bin", "plain text")?;
    let controller = Controller::with_config(mock_config())?;
    assert!(controller.open_document(&input).is_err());
    Ok(())
}

#[tokio::test]
async fn test_translateText_andLanguages_shouldUseProvider() -> Result<()> {
    let mut config = mock_config();
    config.source_language = "eng".to_string();
    config.target_language = "deu".to_string();
    let controller = Controller::with_config(config)?;

    let record = controller.translate_text("Good morning").await?;
    assert_eq!(record.primary(), "[de] Good morning");
    assert_eq!(record.alternatives().len(), 3);

    let languages = controller.list_languages().await?;
    assert_eq!(languages.len(), 3);
    Ok(())
}
