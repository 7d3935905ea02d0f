pub mod normalize;
pub mod record;
pub mod schema;

pub use normalize::{normalize, normalize_str};
pub use record::{
    CoverPageRecord, FieldMap, FieldValue, FootnoteRecord, K1Extraction, Record, defaulted_fields,
};
pub use schema::{
    COVER_PAGE_FIELDS, FOOTNOTE_FIELDS, FieldKind, FieldSpec, RecordKind, all_field_names,
};
