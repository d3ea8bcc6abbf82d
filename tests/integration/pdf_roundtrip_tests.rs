/*!
 * Tests reading PDF files with lopdf and writing them with printpdf
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use doclingo::app_config::ExtractionConfig;
use lopdf::{Dictionary, Object, ObjectId};

use doclingo::document::{Bounds, Document, MemoryPageSource, PageSource, PdfPageSource, PositionedImage, RowClusterer};
use doclingo::errors::ExtractionError;
use doclingo::export::{ExportReconstructor, PageSetup, PdfRenderer};
use doclingo::providers::MockProvider;
use doclingo::translation::{TranslationControl, TranslationJob, TranslationOrchestrator};

use crate::common::{create_temp_dir, create_test_pdf, hello_image_world_page, init_logging, png_bytes, text_page};

#[test]
fn test_pdfSource_shouldPositionGlyphsAndImages() -> Result<()> {
    init_logging();
    let dir = create_temp_dir()?;
    let path = dir.path().join("sample.pdf");
    create_test_pdf(&path, &["Hello"], true)?;

    let mut source = PdfPageSource::open(&path)?;
    assert_eq!(source.page_count(), 1);
    assert_eq!(source.origin(), Some(path.as_path()));

    let raw = source.page(1)?;
    let text: String = raw.glyphs.iter().map(|g| g.value.as_str()).collect();
    assert_eq!(text, "Hello");

    // Courier advances 600/1000 em at 12pt
    let first = &raw.glyphs[0];
    assert!((first.start_x - 100.0).abs() < 1e-6);
    assert!((first.end_x - 107.2).abs() < 1e-6);
    assert!((first.top - 700.0).abs() < 1e-6);
    assert!((raw.glyphs[4].start_x - 128.8).abs() < 1e-6);

    assert_eq!(raw.images.len(), 1);
    let image = &raw.images[0];
    assert_eq!(image.pixel_size, Some((2, 2)));
    assert!((image.bounds.left - 100.0).abs() < 1e-6);
    assert!((image.bounds.top - 640.0).abs() < 1e-6);
    assert!((image.bounds.width - 50.0).abs() < 1e-6);
    assert!((image.bounds.height - 40.0).abs() < 1e-6);

    let decoded = image::load_from_memory(&image.payload)?.to_rgb8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0]);

    source.close();
    assert!(source.page(1).is_err());
    Ok(())
}

#[test]
fn test_openPdf_shouldBuildPagesInOrder() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("pages.pdf");
    create_test_pdf(&path, &["First", "Second", "Third"], true)?;

    let document = Document::open(&path, &ExtractionConfig::default())?;
    assert_eq!(document.page_count(), 3);
    assert_eq!(document.page(0).map(|p| p.to_string()), Some("First\n<IMAGE #0>\n".to_string()));
    assert_eq!(document.page(2).map(|p| p.to_string()), Some("Third\n".to_string()));
    Ok(())
}

#[test]
fn test_pdfSource_withGarbage_shouldFailToOpen() -> Result<()> {
    assert!(matches!(PdfPageSource::from_bytes(b"definitely not a pdf"), Err(ExtractionError::Open(_))));

    let dir = create_temp_dir()?;
    let path = dir.path().join("broken.pdf");
    fs::write(&path, b"%PDF-1.5\ngarbage")?;
    assert!(Document::open(&path, &ExtractionConfig::default()).is_err());
    Ok(())
}

#[test]
fn test_pdfSource_pageOutOfRange_shouldReportPage() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("one.pdf");
    create_test_pdf(&path, &["Only"], false)?;

    let mut source = PdfPageSource::from_bytes(&fs::read(&path)?)?;
    assert!(source.origin().is_none());
    assert!(matches!(source.page(0), Err(ExtractionError::Page { page: 0, .. })));
    assert!(matches!(source.page(2), Err(ExtractionError::Page { page: 2, .. })));
    Ok(())
}

#[tokio::test]
async fn test_export_shouldPreservePageCount() -> Result<()> {
    init_logging();
    let dir = create_temp_dir()?;
    let input = dir.path().join("input.pdf");
    create_test_pdf(&input, &["One", "Two", "Three"], true)?;

    let document = Document::open(&input, &ExtractionConfig::default())?;
    let session = TranslationOrchestrator::new(Arc::new(MockProvider::working()))
        .translate(&document, &TranslationJob::new("en", "fr"), &TranslationControl::new())
        .await?
        .session()
        .expect("not aborted");

    let output = dir.path().join("out").join("input.fr.pdf");
    let written = ExportReconstructor::new(PageSetup::default())
        .export(&session, &output)
        .run(&mut PdfRenderer::new("input"))?;

    let exported = lopdf::Document::load(&written)?;
    assert_eq!(exported.get_pages().len(), 3);
    Ok(())
}

/// Number of image XObjects a page references from its resources
fn image_xobject_count(document: &lopdf::Document, page_id: ObjectId) -> usize {
    fn resolve<'a>(document: &'a lopdf::Document, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => document.get_object(*id).unwrap_or(object),
            _ => object,
        }
    }
    fn as_dict(object: &Object) -> Option<&Dictionary> {
        match object {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    let page = document.get_dictionary(page_id).expect("page dictionary");
    let Some(resources) = page.get(b"Resources").ok().and_then(|r| as_dict(resolve(document, r))) else {
        return 0;
    };
    let Some(xobjects) = resources.get(b"XObject").ok().and_then(|x| as_dict(resolve(document, x))) else {
        return 0;
    };
    xobjects
        .iter()
        .filter_map(|(_, object)| as_dict(resolve(document, object)))
        .filter(|dict| matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Image"))
        .count()
}

#[tokio::test]
async fn test_export_shouldPreserveImageCountPerPage() -> Result<()> {
    init_logging();
    let mut two_images = text_page("Two");
    two_images.images = vec![
        PositionedImage::new(png_bytes(40, 20), Bounds::new(10.0, 650.0, 40.0, 20.0), 0),
        PositionedImage::new(png_bytes(30, 30), Bounds::new(10.0, 500.0, 30.0, 30.0), 1),
    ];
    let mut document = Document::new();
    document.load(
        Box::new(MemoryPageSource::new(vec![text_page("Zero"), hello_image_world_page(), two_images])),
        &RowClusterer::default(),
    )?;
    let source_images: Vec<usize> = document.pages().iter().map(|page| page.image_count()).collect();
    assert_eq!(source_images, vec![0, 1, 2]);

    let session = TranslationOrchestrator::new(Arc::new(MockProvider::working()))
        .translate(&document, &TranslationJob::new("en", "fr"), &TranslationControl::new())
        .await?
        .session()
        .expect("not aborted");

    let dir = create_temp_dir()?;
    let written = ExportReconstructor::default()
        .export(&session, dir.path().join("images.fr.pdf"))
        .run(&mut PdfRenderer::new("images"))?;

    let exported = lopdf::Document::load(&written)?;
    let exported_images: Vec<usize> = exported
        .get_pages()
        .values()
        .map(|page_id| image_xobject_count(&exported, *page_id))
        .collect();
    assert_eq!(exported_images, source_images);
    Ok(())
}
