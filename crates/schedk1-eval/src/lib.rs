//! Scoring extracted K-1 records against a hand-labelled ground-truth table.

pub mod error;
pub mod report;
pub mod score;
pub mod table;

pub use error::EvalError;
pub use report::{render_console, render_document, write_document_reports};
pub use score::{DocumentScore, EvalReport, FieldComparison, ScoringMode, compare, score_document};
pub use table::{DEFAULT_EVAL_SET, EvalTable};
