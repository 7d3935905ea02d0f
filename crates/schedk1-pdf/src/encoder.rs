//! Size-budgeted base64 encoding of PDF documents.
//!
//! The document is loaded and re-serialised with lopdf. When the base64 form
//! is over budget, every page is rasterised once at 1x scale and the pages
//! are rebuilt as image-only pages of the same size. The downgrade runs at
//! most once per call; the result is returned even if still over budget.

#![allow(clippy::cast_possible_truncation)]

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::{debug, info};

use crate::raster::{PageRasterizer, RasterPage};
use crate::PdfError;

/// JPEG quality for rasterised pages.
const RASTER_JPEG_QUALITY: u8 = 80;

/// Convert a megabyte limit into a byte budget.
pub fn budget_bytes(megabytes: u64) -> usize {
    (megabytes as usize).saturating_mul(1024 * 1024)
}

/// Turns a document on disk into a base64 payload no larger than a budget
/// (best effort).
pub trait DocumentEncoder: Send + Sync {
    fn encode(&self, path: &Path, max_bytes: usize) -> Result<String, PdfError>;
}

/// lopdf-backed encoder with a pluggable rasteriser for the downgrade pass.
pub struct PdfEncoder {
    rasterizer: Box<dyn PageRasterizer>,
}

impl PdfEncoder {
    pub fn new(rasterizer: impl PageRasterizer + 'static) -> Self {
        Self {
            rasterizer: Box::new(rasterizer),
        }
    }
}

impl DocumentEncoder for PdfEncoder {
    fn encode(&self, path: &Path, max_bytes: usize) -> Result<String, PdfError> {
        let mut document = Document::load(path).map_err(|source| PdfError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|e| PdfError::Serialize(e.into()))?;
        let encoded = STANDARD.encode(&bytes);

        if encoded.len() <= max_bytes {
            debug!(path = %path.display(), encoded_len = encoded.len(), "encoded PDF within budget");
            return Ok(encoded);
        }

        info!(
            path = %path.display(),
            encoded_len = encoded.len(),
            max_bytes,
            "PDF over budget, rasterising pages"
        );
        let pages = self.rasterizer.rasterize(path)?;
        let downgraded = compose_raster_document(&pages)?;
        let encoded = STANDARD.encode(&downgraded);
        info!(
            path = %path.display(),
            pages = pages.len(),
            encoded_len = encoded.len(),
            "rasterised PDF encoded"
        );
        Ok(encoded)
    }
}

/// Build a new PDF where each page is a single full-page image.
pub fn compose_raster_document(pages: &[RasterPage]) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in pages {
        let rgb = page.image.to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, RASTER_JPEG_QUALITY)
            .encode_image(&rgb)?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => rgb.width() as i64,
                "Height" => rgb.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        // Scale the unit image square up to the full page.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        page.width_pts.into(),
                        0.into(),
                        0.into(),
                        page.height_pts.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(PdfError::Serialize)?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width_pts.into(), page.height_pts.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PdfError::Serialize(e.into()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Rasteriser that paints flat grey pages and counts calls.
    struct FlatRasterizer {
        pages: usize,
        calls: Arc<AtomicUsize>,
    }

    impl PageRasterizer for FlatRasterizer {
        fn rasterize(&self, _pdf_path: &Path) -> Result<Vec<RasterPage>, PdfError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.pages)
                .map(|_| RasterPage {
                    width_pts: 612.0,
                    height_pts: 792.0,
                    image: DynamicImage::ImageRgb8(RgbImage::from_pixel(
                        61,
                        79,
                        image::Rgb([200, 200, 200]),
                    )),
                })
                .collect())
        }
    }

    fn encoder(pages: usize) -> (PdfEncoder, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let encoder = PdfEncoder::new(FlatRasterizer {
            pages,
            calls: calls.clone(),
        });
        (encoder, calls)
    }

    fn write_text_pdf(path: &Path, pages: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let mut kids: Vec<Object> = Vec::new();
        for i in 0..pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!(
                            "Line 1. Ordinary business income (loss) page {i}"
                        ))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn decode(encoded: &str) -> Document {
        let bytes = STANDARD.decode(encoded).unwrap();
        Document::load_mem(&bytes).unwrap()
    }

    #[test]
    fn budget_is_megabytes() {
        assert_eq!(budget_bytes(20), 20 * 1024 * 1024);
        assert_eq!(budget_bytes(0), 0);
    }

    #[test]
    fn within_budget_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k1.pdf");
        write_text_pdf(&path, 2);

        let (encoder, calls) = encoder(2);
        let encoded = encoder.encode(&path, budget_bytes(20)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let doc = decode(&encoded);
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn over_budget_rasterises_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k1.pdf");
        write_text_pdf(&path, 2);

        let (encoder, calls) = encoder(2);
        // Budget below any real document: the downgraded result is returned anyway.
        let encoded = encoder.encode(&path, 16).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let doc = decode(&encoded);
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn raster_pages_keep_page_size_and_hold_one_image() {
        let pages = vec![RasterPage {
            width_pts: 612.0,
            height_pts: 792.0,
            image: DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 12, image::Rgb([0, 0, 0]))),
        }];
        let bytes = compose_raster_document(&pages).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box.len(), 4);
        assert_eq!(media_box[2].as_float().unwrap(), 612.0);
        assert_eq!(media_box[3].as_float().unwrap(), 792.0);

        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert_eq!(xobjects.len(), 1);
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let (encoder, calls) = encoder(1);
        let err = encoder
            .encode(&dir.path().join("absent.pdf"), budget_bytes(20))
            .unwrap_err();
        assert!(matches!(err, PdfError::Open { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
