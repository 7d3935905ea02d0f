//! pdfium-backed [`PageRasterizer`].
//!
//! The pdfium shared library is bound on each call, so a missing library
//! only matters for documents that actually need the raster downgrade.

#![allow(clippy::cast_possible_truncation)]

use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;
use tracing::debug;

use crate::raster::{PDF_POINTS_PER_INCH, PageRasterizer, RasterPage};
use crate::PdfError;

/// Render resolution for downgraded pages (1x scale).
const RENDER_DPI: f32 = 72.0;

#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Bind to the system pdfium library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the pdfium library found in `dir`.
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, PdfError> {
        let bindings = match &self.library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfError::Rasterizer(format!("{e:?}")))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<RasterPage>, PdfError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| PdfError::Rasterizer(format!("{e:?}")))?;

        let mut pages = Vec::with_capacity(document.pages().len() as usize);
        for (i, page) in document.pages().iter().enumerate() {
            let width = page.width().value;
            let height = page.height().value;

            let render_config = PdfRenderConfig::new()
                .set_target_width((width * RENDER_DPI / PDF_POINTS_PER_INCH) as i32)
                .set_target_height((height * RENDER_DPI / PDF_POINTS_PER_INCH) as i32);

            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| PdfError::Render {
                    page: i + 1,
                    message: format!("{e:?}"),
                })?;

            debug!(page = i + 1, width, height, "rasterised page");
            pages.push(RasterPage {
                width_pts: width,
                height_pts: height,
                image: bitmap.as_image(),
            });
        }

        Ok(pages)
    }
}
