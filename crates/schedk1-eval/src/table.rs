//! Ground-truth table loading.
//!
//! The table is a CSV laid out with documents as columns:
//!
//! ```text
//! field,fund_a.pdf,fund_b.pdf
//! line_1_ordinary_business_income_loss,"1,200",(50)
//! line_5_interest_income,0,37
//! ```
//!
//! The first cell of the header row is ignored; every other header cell,
//! trimmed, names a document. A document only exists once some row has a
//! cell for it. Rows with fewer than two cells are skipped, and short rows
//! leave the remaining documents without a value for that field.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::EvalError;

/// Default location of the ground-truth table.
pub const DEFAULT_EVAL_SET: &str = "eval_set.csv";

/// Document name → field name → raw ground-truth cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalTable {
    documents: BTreeMap<String, BTreeMap<String, String>>,
}

impl EvalTable {
    pub fn from_path(path: &Path) -> Result<Self, EvalError> {
        let file = std::fs::File::open(path).map_err(|source| EvalError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            documents = table.documents.len(),
            "loaded ground-truth table"
        );
        Ok(table)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, EvalError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = reader.records();
        let Some(header) = rows.next().transpose()? else {
            return Ok(Self::default());
        };
        let names: Vec<String> = header
            .iter()
            .skip(1)
            .map(|name| name.trim().to_string())
            .collect();

        let mut documents: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for row in rows {
            let row = row?;
            if row.len() < 2 {
                continue;
            }
            let field = &row[0];
            for (name, cell) in names.iter().zip(row.iter().skip(1)) {
                documents
                    .entry(name.clone())
                    .or_default()
                    .insert(field.to_string(), cell.to_string());
            }
        }
        Ok(Self { documents })
    }

    /// Ground truth for one document, keyed by field name.
    pub fn get(&self, document: &str) -> Option<&BTreeMap<String, String>> {
        self.documents.get(document)
    }

    pub fn contains(&self, document: &str) -> bool {
        self.documents.contains_key(document)
    }

    /// Document names in order.
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
