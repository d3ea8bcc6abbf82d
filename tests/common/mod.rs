/*!
 * Common test utilities for the doclingo test suite
 */

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use doclingo::document::{Bounds, PositionedGlyph, PositionedImage, RawPage};


/// Route library logs to the test output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// One glyph per character, 6 units wide, touching each other
pub fn word(text: &str, x: f64, top: f64) -> Vec<PositionedGlyph> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let start = x + i as f64 * 6.0;
            PositionedGlyph::new(c.to_string(), start, start + 6.0, top)
        })
        .collect()
}

/// PNG bytes of a black RGB image
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .expect("PNG encoding of an in-memory image");
    out
}

/// "Hello" above an image above "World"
pub fn hello_image_world_page() -> RawPage {
    let mut glyphs = word("World", 10.0, 600.0);
    glyphs.extend(word("Hello", 10.0, 700.0));
    let image = PositionedImage::new(png_bytes(40, 20), Bounds::new(10.0, 650.0, 40.0, 20.0), 0);
    RawPage::new(glyphs, vec![image])
}

/// A page holding a single line of text
pub fn text_page(text: &str) -> RawPage {
    RawPage::new(word(text, 10.0, 700.0), Vec::new())
}

/// Write a JSON page dump where each entry of `pages` is one line of text,
/// and the first page also carries a 40x20 PNG image under its text
pub fn create_page_dump(dir: &Path, filename: &str, pages: &[&str]) -> Result<PathBuf> {
    let image_data = STANDARD.encode(png_bytes(40, 20));
    let pages: Vec<serde_json::Value> = pages
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let glyphs: Vec<serde_json::Value> = word(text, 10.0, 700.0)
                .into_iter()
                .map(|g| serde_json::json!({ "value": g.value, "start_x": g.start_x, "end_x": g.end_x, "top": g.top }))
                .collect();
            let images = if index == 0 {
                serde_json::json!([{
                    "data": image_data,
                    "bounds": { "left": 10.0, "top": 650.0, "width": 40.0, "height": 20.0 },
                    "width": 40,
                    "height": 20
                }])
            } else {
                serde_json::json!([])
            };
            serde_json::json!({ "glyphs": glyphs, "images": images })
        })
        .collect();

    let content = serde_json::to_string_pretty(&serde_json::json!({ "pages": pages }))?;
    create_test_file(dir, filename, &content)
}

/// Write a PDF with one page per entry of `pages`.
///
/// Each page shows its text in 12pt Courier at (100, 700). With `with_image`
/// the first page also paints a 2x2 RGB image scaled to 50x40 at (100, 600).
pub fn create_test_pdf(path: &Path, pages: &[&str], with_image: bool) -> Result<()> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 255, 255,
        ],
    ));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => dictionary! { "Im1" => image_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (index, text) in pages.iter().enumerate() {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(*text)]),
            Operation::new("ET", vec![]),
        ];
        if with_image && index == 0 {
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![50.into(), 0.into(), 0.into(), 40.into(), 100.into(), 600.into()],
                ),
                Operation::new("Do", vec!["Im1".into()]),
                Operation::new("Q", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_tree = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}
