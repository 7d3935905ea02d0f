use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("cannot open PDF {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("PDF serialisation failed: {0}")]
    Serialize(#[source] lopdf::Error),

    #[error("page {page} could not be rasterised: {message}")]
    Render { page: usize, message: String },

    #[error("rasteriser unavailable: {0}")]
    Rasterizer(String),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}
