//! Docshelf Processing Library
//!
//! Content classification and preview generation. Classification is pure
//! signature sniffing over a bounded byte window; preview generation
//! dispatches on the classified kind (image pass-through, PDF rasterization,
//! office-to-PDF-then-rasterization). The rasterizer and office converter
//! are external tools fronted by traits, so everything above the subprocess
//! boundary stays testable.

pub mod classify;
pub mod error;
pub mod office;
pub mod pdf;
pub mod preview;

// Re-export commonly used types
pub use classify::{classify, CLASSIFY_WINDOW};
pub use error::PreviewError;
pub use office::{OfficeConverter, SofficeConverter};
pub use pdf::{pdf_page_count, PdfRenderer, PdftoppmRenderer};
pub use preview::{Preview, PreviewGenerator, PreviewOptions};
