//! Page rasterisation seam.

use std::path::Path;

use image::DynamicImage;

use crate::PdfError;

/// PDF points per inch; a 1x render maps one point to one pixel.
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// One rendered page plus the size of the page it came from.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// Page width in PDF points (1/72 inch)
    pub width_pts: f32,
    /// Page height in PDF points (1/72 inch)
    pub height_pts: f32,
    pub image: DynamicImage,
}

/// Renders every page of a PDF to a bitmap at 1x scale.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<RasterPage>, PdfError>;
}
