//! Directory scan and sequential batch extraction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use schedk1_ai::ExtractionClient;
use schedk1_core::K1Extraction;
use tracing::{info, warn};

/// PDFs directly inside `dir`, sorted by file name. The extension match is
/// case-insensitive.
pub fn find_pdfs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read PDF directory {}", dir.display()))?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pdfs)
}

/// File name used as the document key in results and the ground truth.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract every document in order. A failed document is logged and
/// skipped.
pub async fn extract_all(
    client: &ExtractionClient,
    pdfs: &[PathBuf],
) -> BTreeMap<String, K1Extraction> {
    let mut results = BTreeMap::new();
    for (i, path) in pdfs.iter().enumerate() {
        let name = document_name(path);
        info!(document = %name, index = i + 1, total = pdfs.len(), "processing document");
        match client.extract_k1(path).await {
            Ok(extraction) => {
                results.insert(name, extraction);
            }
            Err(e) => warn!(document = %name, error = %e, "skipping document"),
        }
    }
    info!(
        extracted = results.len(),
        skipped = pdfs.len() - results.len(),
        "batch complete"
    );
    results
}
