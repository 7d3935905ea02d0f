//! PDF layer: lopdf load/serialise, base64 encoding under a size budget,
//! and the one-shot raster downgrade used when a document is too large.

mod encoder;
mod error;
mod raster;

#[cfg(feature = "pdfium")]
mod pdfium;

pub use encoder::{DocumentEncoder, PdfEncoder, budget_bytes, compose_raster_document};
pub use error::PdfError;
pub use raster::{PageRasterizer, RasterPage};

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
