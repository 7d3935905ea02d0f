//! Text rendering of evaluation results.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use schedk1_core::RecordKind;
use tracing::info;

use crate::EvalError;
use crate::score::{DocumentScore, EvalReport, FieldComparison};

const RULE_WIDTH: usize = 80;
const SECTION_RULE_WIDTH: usize = 30;

fn mark(field: &FieldComparison) -> char {
    if field.matched { '✓' } else { '✗' }
}

fn expected_text(field: &FieldComparison) -> &str {
    field.expected_raw.as_deref().unwrap_or("")
}

/// Console report: per-field marks, per-document and overall accuracy.
pub fn render_console(report: &EvalReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(
        out,
        "COMPARISON WITH EVALUATION SET ({})",
        report.mode.describe()
    );
    let _ = writeln!(out, "{rule}");

    for doc in &report.documents {
        let _ = writeln!(out, "\n{}:", doc.name);
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        for field in &doc.fields {
            let _ = writeln!(
                out,
                " {} {}: extracted={}, expected={}",
                mark(field),
                field.name,
                field.extracted,
                expected_text(field)
            );
        }
        let _ = writeln!(
            out,
            "\n Document Accuracy: {}/{} ({:.1}%)",
            doc.correct(),
            doc.total(),
            doc.accuracy()
        );
    }

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "OVERALL ACCURACY: {report}");
    let _ = writeln!(out, "{rule}");
    out
}

/// Per-document report with cover page and footnote sections.
pub fn render_document(doc: &DocumentScore, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Evaluation Report for {}", doc.name);
    let _ = writeln!(out, "Generated: {}", generated_at.to_rfc3339());
    let _ = writeln!(out, "{}\n", "=".repeat(50));

    for (i, (kind, header)) in [
        (RecordKind::CoverPage, "COVER PAGE FIELDS:"),
        (RecordKind::Footnotes, "FOOTNOTES FIELDS:"),
    ]
    .into_iter()
    .enumerate()
    {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{header}");
        let _ = writeln!(out, "{}", "-".repeat(SECTION_RULE_WIDTH));
        for field in doc.fields_of(kind) {
            let _ = writeln!(
                out,
                "{} {}: {} (expected: {})",
                mark(field),
                field.name,
                field.extracted,
                expected_text(field)
            );
        }
    }

    let _ = writeln!(
        out,
        "\nAccuracy: {}/{} ({:.1}%)",
        doc.correct(),
        doc.total(),
        doc.accuracy()
    );
    out
}

/// Write `<dir>/<document>_evaluation.txt` for every scored document.
pub fn write_document_reports(
    report: &EvalReport,
    dir: &Path,
    generated_at: DateTime<Utc>,
) -> Result<Vec<PathBuf>, EvalError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(report.documents.len());
    for doc in &report.documents {
        let path = dir.join(format!("{}_evaluation.txt", doc.name));
        std::fs::write(&path, render_document(doc, generated_at))?;
        info!(path = %path.display(), "evaluation report saved");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScoringMode;
    use chrono::TimeZone;

    fn field(record: RecordKind, name: &'static str, extracted: i64, raw: &str) -> FieldComparison {
        let expected = schedk1_core::normalize_str(raw);
        FieldComparison {
            record,
            name,
            extracted,
            expected_raw: Some(raw.to_string()),
            expected,
            matched: extracted == expected,
        }
    }

    fn report() -> EvalReport {
        EvalReport {
            mode: ScoringMode::NonZero,
            documents: vec![DocumentScore {
                name: "fund_a.pdf".into(),
                fields: vec![
                    field(RecordKind::CoverPage, "line_7_royalties", 5, "5"),
                    field(RecordKind::Footnotes, "line_15o_backup_withholding", 2, "(2)"),
                ],
            }],
        }
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn console_report_lists_marks_and_totals() {
        let text = render_console(&report());
        assert!(text.contains("COMPARISON WITH EVALUATION SET (Non-Zero Fields Only)"));
        assert!(text.contains(" ✓ line_7_royalties: extracted=5, expected=5"));
        assert!(text.contains(" ✗ line_15o_backup_withholding: extracted=2, expected=(2)"));
        assert!(text.contains("Document Accuracy: 1/2 (50.0%)"));
        assert!(text.contains("OVERALL ACCURACY: 1/2 (50.0%)"));
    }

    #[test]
    fn document_report_has_sections() {
        let text = render_document(&report().documents[0], timestamp());
        let cover = text.find("COVER PAGE FIELDS:").unwrap();
        let notes = text.find("FOOTNOTES FIELDS:").unwrap();
        let royalties = text.find("✓ line_7_royalties: 5 (expected: 5)").unwrap();
        let withholding = text.find("✗ line_15o_backup_withholding").unwrap();

        assert!(cover < royalties && royalties < notes && notes < withholding);
        assert!(text.contains("Generated: 2026-03-01T12:00:00+00:00"));
        assert!(text.trim_end().ends_with("Accuracy: 1/2 (50.0%)"));
    }

    #[test]
    fn reports_are_written_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("evaluation_reports");
        let written = write_document_reports(&report(), &out, timestamp()).unwrap();

        assert_eq!(written, vec![out.join("fund_a.pdf_evaluation.txt")]);
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert!(text.starts_with("Evaluation Report for fund_a.pdf"));
    }
}
