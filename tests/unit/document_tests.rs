/*!
 * Tests for page sources and document loading
 */

use anyhow::Result;
use doclingo::app_config::ExtractionConfig;
use doclingo::document::{
    ContentItem, Document, JsonPageSource, MemoryPageSource, PageSource, RowClusterer,
};
use doclingo::errors::ExtractionError;
use std::sync::atomic::Ordering;

use crate::common::{create_page_dump, create_temp_dir, create_test_file, hello_image_world_page, text_page};

#[test]
fn test_load_withHelloImageWorld_shouldOrderRowsAroundImage() -> Result<()> {
    let mut document = Document::new();
    let source = MemoryPageSource::new(vec![hello_image_world_page()]);
    document.load(Box::new(source), &RowClusterer::default())?;

    let page = document.page(0).expect("first page");
    assert_eq!(page.number(), 1);
    assert_eq!(page.to_string(), "Hello\n<IMAGE #0>\nWorld\n");
    assert_eq!(page.image_count(), 1);
    assert_eq!(page.text_rows().count(), 2);
    Ok(())
}

#[test]
fn test_load_twice_shouldReplacePagesAndCloseOldSource() -> Result<()> {
    let mut document = Document::new();
    let first = MemoryPageSource::new(vec![text_page("one"), text_page("two")]);
    let first_closed = first.closed_flag();
    document.load(Box::new(first), &RowClusterer::default())?;
    assert_eq!(document.page_count(), 2);

    document.load(Box::new(MemoryPageSource::new(vec![text_page("three")])), &RowClusterer::default())?;
    assert!(first_closed.load(Ordering::SeqCst));
    assert_eq!(document.page_count(), 1);
    assert_eq!(document.page(0).map(|p| p.to_string()), Some("three\n".to_string()));
    Ok(())
}

#[test]
fn test_openJson_shouldReadPageDump() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_page_dump(dir.path(), "dump.json", &["Hello", "Second"])?;

    let document = Document::open(&path, &ExtractionConfig::default())?;
    assert_eq!(document.page_count(), 2);
    assert_eq!(document.origin(), Some(path.as_path()));

    let first = document.page(0).expect("first page");
    assert!(matches!(&first.items()[0], ContentItem::TextRow(row) if row.text == "Hello"));
    assert!(matches!(&first.items()[1], ContentItem::Image(image) if image.pixel_size == Some((40, 20))));
    assert_eq!(document.page(1).map(|p| p.image_count()), Some(0));
    Ok(())
}

#[test]
fn test_open_withExcludedImages_shouldDropImages() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_page_dump(dir.path(), "dump.json", &["Hello"])?;
    let config = ExtractionConfig {
        include_images: false,
        ..ExtractionConfig::default()
    };

    let document = Document::open(&path, &config)?;
    assert_eq!(document.page(0).map(|p| p.image_count()), Some(0));
    Ok(())
}

#[test]
fn test_openJson_withMissingFile_shouldBeOpenError() {
    let result = Document::open("/definitely/not/here.json", &ExtractionConfig::default());
    assert!(matches!(result, Err(ExtractionError::Open(_))));
}

#[test]
fn test_openJson_withInvalidContent_shouldBeFormatError() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(dir.path(), "broken.json", "{ \"pages\": 3 }")?;
    let result = Document::open(&path, &ExtractionConfig::default());
    assert!(matches!(result, Err(ExtractionError::Format(_))));
    Ok(())
}

#[test]
fn test_jsonSource_withPageOutOfRange_shouldReportPage() -> Result<()> {
    let mut source = JsonPageSource::parse(r#"{ "pages": [ { "glyphs": [] } ] }"#)?;
    assert_eq!(source.page_count(), 1);
    assert!(source.page(1)?.glyphs.is_empty());
    assert!(matches!(source.page(2), Err(ExtractionError::Page { page: 2, .. })));
    Ok(())
}

#[test]
fn test_load_withFailingSecondPage_shouldLeaveDocumentEmpty() -> Result<()> {
    let mut document = Document::new();
    let previous = MemoryPageSource::new(vec![text_page("previous")]);
    let previous_closed = previous.closed_flag();
    document.load(Box::new(previous), &RowClusterer::default())?;
    assert_eq!(document.page_count(), 1);

    let failing = MemoryPageSource::new(vec![text_page("a"), text_page("b")]).failing_on(2);
    let result = document.load(Box::new(failing), &RowClusterer::default());

    assert!(result.is_err());
    assert!(!document.is_loaded());
    assert_eq!(document.page_count(), 0);
    assert!(document.page(0).is_none());
    assert!(previous_closed.load(std::sync::atomic::Ordering::SeqCst));
    Ok(())
}
