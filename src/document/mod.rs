/*!
 * Document model and page extraction.
 *
 * - `geometry`: positioned glyphs and images as page sources report them
 * - `clustering`: geometric row clustering into reading order
 * - `model`: `Page` and `Document`
 * - `source`: the `PageSource` trait and an in-memory source
 * - `pdf_source`: PDF content stream extraction
 * - `json_source`: pre-extracted page dumps
 */

// Re-export main types for easier usage
pub use self::clustering::{DEFAULT_GAP_THRESHOLD, RowClusterer};
pub use self::geometry::{Bounds, PositionedGlyph, PositionedImage, RawPage};
pub use self::json_source::JsonPageSource;
pub use self::model::{ContentItem, Document, Page, PageImage, RowId, TextRow};
pub use self::pdf_source::PdfPageSource;
pub use self::source::{MemoryPageSource, PageSource};

// Submodules
pub mod clustering;
pub mod geometry;
pub mod json_source;
pub mod model;
pub mod pdf_source;
pub mod source;
