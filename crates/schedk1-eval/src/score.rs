//! Field-level accuracy scoring.

use std::collections::BTreeMap;
use std::fmt;

use schedk1_core::{FieldKind, K1Extraction, RecordKind, normalize_str};

/// Which integer fields count towards accuracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringMode {
    /// Only fields where the extracted or the expected value is non-zero.
    #[default]
    NonZero,
    /// Every integer field.
    Strict,
}

impl ScoringMode {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::NonZero => "Non-Zero Fields Only",
            Self::Strict => "All Integer Fields",
        }
    }
}

/// One considered field of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldComparison {
    pub record: RecordKind,
    pub name: &'static str,
    pub extracted: i64,
    /// Ground-truth cell as written, `None` when the table has no cell.
    pub expected_raw: Option<String>,
    pub expected: i64,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentScore {
    pub name: String,
    pub fields: Vec<FieldComparison>,
}

impl DocumentScore {
    pub fn correct(&self) -> usize {
        self.fields.iter().filter(|f| f.matched).count()
    }

    pub fn total(&self) -> usize {
        self.fields.len()
    }

    /// Percentage correct; 0 when nothing was considered.
    pub fn accuracy(&self) -> f64 {
        percentage(self.correct(), self.total())
    }

    pub fn fields_of(&self, record: RecordKind) -> impl Iterator<Item = &FieldComparison> {
        self.fields.iter().filter(move |f| f.record == record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalReport {
    pub mode: ScoringMode,
    pub documents: Vec<DocumentScore>,
}

impl EvalReport {
    pub fn correct(&self) -> usize {
        self.documents.iter().map(DocumentScore::correct).sum()
    }

    pub fn total(&self) -> usize {
        self.documents.iter().map(DocumentScore::total).sum()
    }

    pub fn accuracy(&self) -> f64 {
        percentage(self.correct(), self.total())
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%)",
            self.correct(),
            self.total(),
            self.accuracy()
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

/// Score every document present in both `results` and `table`, in name
/// order. Documents missing from either side contribute nothing.
pub fn compare(
    results: &BTreeMap<String, K1Extraction>,
    table: &crate::EvalTable,
    mode: ScoringMode,
) -> EvalReport {
    let documents = results
        .iter()
        .filter_map(|(name, extraction)| {
            let truth = table.get(name)?;
            Some(score_document(name, extraction, truth, mode))
        })
        .collect();
    EvalReport { mode, documents }
}

/// Compare the integer fields of one extraction (cover page, then
/// footnotes) against its ground truth.
pub fn score_document(
    name: &str,
    extraction: &K1Extraction,
    truth: &BTreeMap<String, String>,
    mode: ScoringMode,
) -> DocumentScore {
    let mut fields = Vec::new();
    for kind in RecordKind::ALL {
        for (field, value) in extraction.record(kind).iter() {
            if FieldKind::of(field) != FieldKind::Integer {
                continue;
            }
            let Some(extracted) = value.as_integer() else {
                continue;
            };
            let expected_raw = truth.get(field).cloned();
            let expected = expected_raw.as_deref().map_or(0, normalize_str);

            let considered = match mode {
                ScoringMode::NonZero => extracted != 0 || expected != 0,
                ScoringMode::Strict => true,
            };
            if !considered {
                continue;
            }
            fields.push(FieldComparison {
                record: kind,
                name: field,
                extracted,
                expected_raw,
                expected,
                matched: extracted == expected,
            });
        }
    }
    DocumentScore {
        name: name.to_string(),
        fields,
    }
}
