/*!
 * Export of translated sessions.
 *
 * - `reconstructor`: page-by-page export jobs
 * - `layout`: page setup, image fitting and text flow
 * - `renderer`: the `DocumentRenderer` trait and the printpdf renderer
 */

// Re-export main types for easier usage
pub use self::layout::{ExportBlock, ExportSection, PageSetup, fit_image};
pub use self::reconstructor::{ExportJob, ExportReconstructor};
pub use self::renderer::{DocumentRenderer, PdfRenderer};

// Submodules
pub mod layout;
pub mod reconstructor;
pub mod renderer;
