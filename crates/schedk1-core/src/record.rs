//! Typed K-1 records built from extracted field values.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::normalize::normalize_str;
use crate::schema::{FieldKind, RecordKind};

/// A single extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

/// Field name → value, as returned by one extraction call.
pub type FieldMap = BTreeMap<String, FieldValue>;

impl FieldValue {
    /// Default value for a kind: 0 or "".
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Integer => Self::Integer(0),
            FieldKind::Text => Self::Text(String::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Integer(_) => FieldKind::Integer,
            Self::Text(_) => FieldKind::Text,
        }
    }

    /// Convert to `kind`. Text becomes an amount through the normaliser;
    /// an amount becomes text, with zero rendered as "".
    pub fn coerce(self, kind: FieldKind) -> Self {
        match (self, kind) {
            (v @ Self::Integer(_), FieldKind::Integer) | (v @ Self::Text(_), FieldKind::Text) => v,
            (Self::Text(s), FieldKind::Integer) => Self::Integer(normalize_str(&s)),
            (Self::Integer(0), FieldKind::Text) => Self::Text(String::new()),
            (Self::Integer(n), FieldKind::Text) => Self::Text(n.to_string()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Integer(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Whether this is the "not found" default of its kind.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Integer(n) => *n == 0,
            Self::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Build a map holding the default value of every named field.
pub fn defaulted_fields<'a>(names: impl IntoIterator<Item = &'a str>) -> FieldMap {
    names
        .into_iter()
        .map(|name| {
            (
                name.to_string(),
                FieldValue::default_for(FieldKind::of(name)),
            )
        })
        .collect()
}

/// A fixed-shape K-1 record: one value per declared field of its kind.
///
/// Records are built wholesale and never patched; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    values: Vec<FieldValue>,
}

/// Cover page (Parts I-III) of a K-1.
pub type CoverPageRecord = Record;
/// Federal footnotes / attached statements of a K-1.
pub type FootnoteRecord = Record;

impl Record {
    /// Record with every field at its default.
    pub fn defaulted(kind: RecordKind) -> Self {
        Self {
            kind,
            values: kind.fields().map(|f| FieldValue::default_for(f.kind)).collect(),
        }
    }

    /// Build from extracted values. Undeclared names are ignored, missing
    /// fields are defaulted and values are coerced to the declared kind.
    pub fn from_fields(kind: RecordKind, fields: &FieldMap) -> Self {
        let values = kind
            .fields()
            .map(|spec| match fields.get(spec.name) {
                Some(value) => value.clone().coerce(spec.kind),
                None => FieldValue::default_for(spec.kind),
            })
            .collect();
        Self { kind, values }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let idx = self.kind.field_names().iter().position(|&n| n == name)?;
        self.values.get(idx)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Fields in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.kind
            .field_names()
            .iter()
            .copied()
            .zip(self.values.iter())
    }

    /// Number of fields holding something other than the default.
    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| !v.is_default()).count()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Everything extracted from one K-1 document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct K1Extraction {
    pub cover_page: CoverPageRecord,
    pub footnotes: FootnoteRecord,
}

impl K1Extraction {
    /// Split a combined field map into the two records.
    pub fn from_fields(fields: &FieldMap) -> Self {
        Self {
            cover_page: Record::from_fields(RecordKind::CoverPage, fields),
            footnotes: Record::from_fields(RecordKind::Footnotes, fields),
        }
    }

    pub fn defaulted() -> Self {
        Self {
            cover_page: Record::defaulted(RecordKind::CoverPage),
            footnotes: Record::defaulted(RecordKind::Footnotes),
        }
    }

    pub fn record(&self, kind: RecordKind) -> &Record {
        match kind {
            RecordKind::CoverPage => &self.cover_page,
            RecordKind::Footnotes => &self.footnotes,
        }
    }

    pub fn populated(&self) -> usize {
        self.cover_page.populated() + self.footnotes.populated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{COVER_PAGE_FIELDS, FOOTNOTE_FIELDS};

    fn map(entries: &[(&str, FieldValue)]) -> FieldMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn defaulted_record_has_every_field() {
        let record = Record::defaulted(RecordKind::CoverPage);
        assert_eq!(record.iter().count(), COVER_PAGE_FIELDS.len());
        assert_eq!(record.text("partnership_name"), Some(""));
        assert_eq!(record.integer("line_5_interest_income"), Some(0));
        assert_eq!(record.populated(), 0);
    }

    #[test]
    fn from_fields_defaults_missing_and_ignores_extras() {
        let fields = map(&[
            ("line_1_ordinary_business_income_loss", FieldValue::Integer(100)),
            ("not_a_field", FieldValue::Integer(7)),
        ]);
        let record = Record::from_fields(RecordKind::CoverPage, &fields);
        assert_eq!(record.integer("line_1_ordinary_business_income_loss"), Some(100));
        assert_eq!(record.integer("line_2_net_rental_real_estate_income_loss"), Some(0));
        assert!(record.get("not_a_field").is_none());
        assert_eq!(record.populated(), 1);
    }

    #[test]
    fn from_fields_coerces_kinds() {
        let fields = map(&[
            ("partnership_name", FieldValue::Integer(0)),
            ("ending_capital_account", FieldValue::Text("(1,250)".into())),
        ]);
        let record = Record::from_fields(RecordKind::CoverPage, &fields);
        assert_eq!(record.text("partnership_name"), Some(""));
        assert_eq!(record.integer("ending_capital_account"), Some(-1250));
    }

    #[test]
    fn split_into_records() {
        let fields = map(&[
            ("partnership_name", FieldValue::Text("Acme Fund LP".into())),
            ("line_15o_backup_withholding", FieldValue::Integer(12)),
        ]);
        let k1 = K1Extraction::from_fields(&fields);
        assert_eq!(k1.cover_page.text("partnership_name"), Some("Acme Fund LP"));
        assert!(k1.cover_page.get("line_15o_backup_withholding").is_none());
        assert_eq!(k1.footnotes.integer("line_15o_backup_withholding"), Some(12));
        assert_eq!(k1.footnotes.iter().count(), FOOTNOTE_FIELDS.len());
        assert_eq!(k1.populated(), 2);
    }

    #[test]
    fn defaulted_fields_follow_kinds() {
        let fields = defaulted_fields(["partnership_name", "line_7_royalties"]);
        assert_eq!(fields["partnership_name"], FieldValue::Text(String::new()));
        assert_eq!(fields["line_7_royalties"], FieldValue::Integer(0));
    }

    #[test]
    fn record_serializes_as_flat_object() {
        let fields = map(&[("line_7_royalties", FieldValue::Integer(9))]);
        let record = Record::from_fields(RecordKind::CoverPage, &fields);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["line_7_royalties"], 9);
        assert_eq!(json["partnership_name"], "");
        assert_eq!(json.as_object().unwrap().len(), COVER_PAGE_FIELDS.len());
    }

    #[test]
    fn value_display() {
        assert_eq!(FieldValue::Integer(-5).to_string(), "-5");
        assert_eq!(FieldValue::Text("x".into()).to_string(), "\"x\"");
    }
}
