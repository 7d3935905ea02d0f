//! Plain-text rendering for extracted K-1 records and the field schema.

use std::fmt::Write as _;

use schedk1_core::{FieldKind, K1Extraction, RecordKind};

const NAME_WIDTH: usize = 58;

// ── Cover page groupings ──

const IDENTITY: &[&str] = &[
    "partnership_name",
    "partnership_employer_identification_number",
];

const CAPITAL_ACCOUNT: &[&str] = &[
    "capital_contributions_during_year",
    "withdrawals_and_distributions_cash",
    "ending_capital_account",
];

fn header(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::CoverPage => "COVER PAGE",
        RecordKind::Footnotes => "FEDERAL FOOTNOTES",
    }
}

/// Card view of one document's extraction.
///
/// Identity fields come first, then the remaining cover page amounts with
/// the capital account last, then footnotes. With `all` unset only
/// populated fields are listed.
pub fn extraction_card(document: &str, k1: &K1Extraction, all: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {document} ===");
    let _ = writeln!(out, "  {} populated field(s)\n", k1.populated());

    let cover = &k1.cover_page;
    let ordered = IDENTITY
        .iter()
        .copied()
        .chain(
            cover
                .iter()
                .map(|(name, _)| name)
                .filter(|n| !IDENTITY.contains(n) && !CAPITAL_ACCOUNT.contains(n)),
        )
        .chain(CAPITAL_ACCOUNT.iter().copied());

    let _ = writeln!(out, "{}", header(RecordKind::CoverPage));
    let mut shown = 0;
    for name in ordered {
        if let Some(value) = cover.get(name) {
            if all || !value.is_default() {
                let _ = writeln!(out, "  {name:<NAME_WIDTH$} {value}");
                shown += 1;
            }
        }
    }
    if shown == 0 {
        let _ = writeln!(out, "  (none)");
    }

    let _ = writeln!(out, "\n{}", header(RecordKind::Footnotes));
    let mut shown = 0;
    for (name, value) in k1.footnotes.iter() {
        if all || !value.is_default() {
            let _ = writeln!(out, "  {name:<NAME_WIDTH$} {value}");
            shown += 1;
        }
    }
    if shown == 0 {
        let _ = writeln!(out, "  (none)");
    }
    out
}

/// Schema listing: every field of every record with its kind.
pub fn schema_listing() -> String {
    let mut out = String::new();
    for (i, kind) in RecordKind::ALL.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "{} ({} fields)",
            header(kind),
            kind.field_names().len()
        );
        for spec in kind.fields() {
            let _ = writeln!(out, "  {:<NAME_WIDTH$} {}", spec.name, spec.kind);
        }
    }
    let text = RecordKind::ALL
        .iter()
        .flat_map(|k| k.fields())
        .filter(|f| f.kind == FieldKind::Text)
        .count();
    let _ = writeln!(out, "\n{text} text field(s), the rest are integer amounts");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use schedk1_core::{FieldMap, FieldValue};

    fn k1() -> K1Extraction {
        let fields: FieldMap = [
            ("partnership_name", FieldValue::Text("Acme Fund LP".into())),
            ("ending_capital_account", FieldValue::Integer(5000)),
            ("line_5_interest_income", FieldValue::Integer(12)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        K1Extraction::from_fields(&fields)
    }

    #[test]
    fn card_orders_identity_then_amounts_then_capital() {
        let card = extraction_card("fund_a.pdf", &k1(), false);
        assert!(card.starts_with("=== fund_a.pdf ==="));
        let name = card.find("partnership_name").unwrap();
        let interest = card.find("line_5_interest_income").unwrap();
        let capital = card.find("ending_capital_account").unwrap();
        assert!(name < interest && interest < capital);
        assert!(card.contains("\"Acme Fund LP\""));
        assert!(!card.contains("line_7_royalties"));
    }

    #[test]
    fn empty_footnotes_say_none() {
        let card = extraction_card("fund_a.pdf", &k1(), false);
        let footnotes = card.split("FEDERAL FOOTNOTES").nth(1).unwrap();
        assert!(footnotes.contains("(none)"));
    }

    #[test]
    fn all_lists_defaults_too() {
        let card = extraction_card("fund_a.pdf", &K1Extraction::defaulted(), true);
        assert!(card.contains("line_7_royalties"));
        assert!(card.contains("line_15o_backup_withholding"));
    }

    #[test]
    fn schema_lists_kinds() {
        let listing = schema_listing();
        assert!(listing.contains("COVER PAGE (30 fields)"));
        assert!(listing.contains("FEDERAL FOOTNOTES (182 fields)"));
        assert!(
            listing
                .lines()
                .any(|l| l.trim_start().starts_with("partnership_name") && l.ends_with("text"))
        );
    }
}
