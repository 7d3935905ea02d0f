//! Prompt templates for K-1 field extraction.
//!
//! The prompt is assembled from a closed field whitelist, fixed
//! normalisation and section rules, a per-field guide and optional few-shot
//! examples. Building is pure: the same inputs always give the same text.

/// Cap on the number of fields described in the field guide.
pub const MAX_GUIDE_FIELDS: usize = 200;

// ── Prompt templates ──

/// Fixed instruction sent ahead of the document.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert at extracting data from IRS Schedule K-1 (Form 1065) tax forms. \
Your task is to find EXACT matches for field labels and extract their values. \
DO NOT move values between fields or split/combine values. \
If a field's label is not found, use 0 for numbers or \"\" for text.";

/// Few-shot examples used for whole-document K-1 extraction.
pub const K1_EXAMPLES: &str = "
EXACT FIELD MATCHING EXAMPLES:
1. Main Form Fields (ONLY extract if label matches EXACTLY):
   - Label \"Line 1. Ordinary business income (loss)\" with \"$100\" → \"line_1_ordinary_business_income_loss\": 100
   - Label \"Line 2. Net rental real estate income (loss)\" with \"(50)\" → \"line_2_net_rental_real_estate_income_loss\": -50
   - Label \"Line 5. Interest income\" with \"$75\" → \"line_5_interest_income\": 75
   - Label \"Line 6a. Ordinary dividends\" with \"$200\" → \"line_6a_ordinary_dividends\": 200
   - Label \"Line 6b. Qualified dividends\" with \"$150\" → \"line_6b_qualified_dividends\": 150

2. Supplemental Fields (ONLY extract if label matches EXACTLY):
   - Label \"Section 1256 contracts & straddles\" with \"(300)\" → \"line_11c_section_1256_gain_loss\": -300
   - Label \"Investment interest expense - Schedule A\" with \"$25\" → \"line_13h_investment_interest_investing_schedule_A\": 25
   - Label \"Investment interest expense - Schedule E\" with \"$10\" → \"line_13h_investment_interest_trading_schedule_E\": 10
   - Label \"Other deductions\" with \"$125\" → \"line_13ZZ_other_deductions_total\": 125

IMPORTANT:
- ONLY extract a value if the label matches EXACTLY
- DO NOT move values between fields
- DO NOT split or combine values
- If a field's label is not found, use 0 for numbers or \"\" for text";

// ── Field guide ──

/// How a guide rule selects field names.
#[derive(Debug, Clone, Copy)]
enum NameMatch {
    Contains(&'static str),
    Exact(&'static str),
    Prefix(&'static str),
}

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Contains(s) => name.contains(s),
            Self::Exact(s) => name == *s,
            Self::Prefix(s) => name.starts_with(s),
        }
    }
}

use NameMatch::{Contains, Exact, Prefix};

/// Ordered (matcher, hint) table; the first matching rule wins.
const GUIDE_RULES: &[(NameMatch, &str)] = &[
    (Contains("partnership_name"), "Partnership's legal name (top of form)"),
    (Contains("employer_identification_number"), "Partnership EIN (nine digits)"),
    (
        Contains("line_1_ordinary_business_income_loss_passive"),
        "Part III Line 1 passive indicator (checkbox/text)",
    ),
    (
        Exact("line_1_ordinary_business_income_loss"),
        "Part III Line 1 - Ordinary business income (loss)",
    ),
    (
        Exact("line_2_net_rental_real_estate_income_loss"),
        "Part III Line 2 - Net rental real estate income (loss)",
    ),
    (
        Exact("line_3_other_rental_income_loss"),
        "Part III Line 3 - Other net rental income (loss)",
    ),
    (
        Exact("line_4a_guaranteed_payments_for_services"),
        "Part III Line 4a - Guaranteed payments for services",
    ),
    (
        Exact("line_4b_guaranteed_payments_for_capital"),
        "Part III Line 4b - Guaranteed payments for capital",
    ),
    (
        Exact("line_4c_total_guaranteed_payments"),
        "Part III Line 4c - Total guaranteed payments",
    ),
    (Exact("line_5_interest_income"), "Part III Line 5 - Interest income (main form)"),
    (
        Exact("line_5_interest_income_us_government_interest"),
        "Part III Line 5 subset - U.S. government interest",
    ),
    (Exact("line_6a_ordinary_dividends"), "Part III Line 6a - Ordinary dividends"),
    (Exact("line_6b_qualified_dividends"), "Part III Line 6b - Qualified dividends"),
    (Exact("line_7_royalties"), "Part III Line 7 - Royalties"),
    (
        Exact("line_8_net_short_term_capital_gain_loss"),
        "Part III Line 8 - Net short-term capital gain (loss)",
    ),
    (
        Exact("line_9a_net_long_term_capital_gain_loss"),
        "Part III Line 9a - Net long-term capital gain (loss)",
    ),
    (
        Exact("line_9b_collectibles_28_percent_gain_loss"),
        "Part III Line 9b - Collectibles (28%) gain (loss)",
    ),
    (
        Exact("line_9c_uncaptured_section_1250_gain"),
        "Part III Line 9c - Unrecaptured section 1250 gain",
    ),
    (
        Exact("line_10_net_section_1231_gain_loss"),
        "Part III Line 10 - Net section 1231 gain (loss)",
    ),
    (Exact("line_11a_other_income_total"), "Statement: Other income (loss) total"),
    (
        Exact("line_11c_section_1256_gain_loss"),
        "Statement: Section 1256 contracts & straddles gain (loss)",
    ),
    (
        Exact("line_11ZZ_ordinary_income_section_475f"),
        "Statement: Section 475(f) mark-to-market income",
    ),
    (Exact("line_11ZZ_pfic_qef_income"), "Statement: PFIC QEF income"),
    (
        Exact("line_11ZZ_section_988_total"),
        "Statement: Section 988 foreign currency gain (loss)",
    ),
    (
        Exact("line_11ZZ_swap_net_income_loss"),
        "Statement: Swap/derivative net income (loss)",
    ),
    (Exact("line_11ZZ_other_income_loss"), "Statement: Other income (loss)"),
    (
        Exact("line_11ZZ_other_portfolio_income_loss"),
        "Statement: Other portfolio income (loss)",
    ),
    (
        Exact("line_11ZZ_other_ordinary_income_loss_total"),
        "Statement: Other ordinary income (loss) total",
    ),
    (
        Exact("line_11ZZ_interest_income_domestic"),
        "Statement: Interest income - domestic",
    ),
    (
        Exact("line_11ZZ_interest_income_foreign"),
        "Statement: Interest income - foreign",
    ),
    (
        Exact("line_11ZZ_dividends_qualified_domestic"),
        "Statement: Qualified dividends - domestic",
    ),
    (
        Exact("line_11ZZ_dividends_qualified_foreign"),
        "Statement: Qualified dividends - foreign",
    ),
    (
        Exact("line_11ZZ_dividends_non_qualified_domestic"),
        "Statement: Non-qualified dividends - domestic",
    ),
    (
        Exact("line_11ZZ_dividends_non_qualified_foreign"),
        "Statement: Non-qualified dividends - foreign",
    ),
    (
        Prefix("line_13h_investment_interest_investing_schedule_A"),
        "Statement/Schedule A - Investment interest (investing)",
    ),
    (
        Prefix("line_13h_investment_interest_trading_schedule_E"),
        "Statement/Schedule E - Investment interest (trading)",
    ),
    (
        Exact("line_13l_deductions_portfolio_other"),
        "Statement: Portfolio deductions - other",
    ),
    (
        Contains("13ZZ"),
        "Statement (supplemental) - detailed item in line 13 category",
    ),
    (
        Exact("line_15o_backup_withholding"),
        "Statement: Backup withholding / Form 1099 withholding",
    ),
    (Exact("line_15zz_other_credits"), "Statement: Other credits"),
    (
        Exact("line_18a_tax_exempt_interest_income"),
        "Tax-exempt interest income (keep decimals when shown)",
    ),
    (
        Exact("line_18b_other_tax_exempt_income"),
        "Other tax-exempt income (keep decimals when shown)",
    ),
    (
        Exact("line_18c_nondeductible_expenses"),
        "Nondeductible expenses (keep decimals when shown)",
    ),
    (
        Exact("line_20V_unrelated_business_taxable_income"),
        "Statement: Unrelated business taxable income (UBTI)",
    ),
    (
        Exact("line_20AA_section_704c_information"),
        "Statement: Section 704(c) information",
    ),
    (
        Exact("line_20AG_gross_receipts_section_448_c"),
        "Statement: Gross receipts per Section 448(c)",
    ),
    (
        Exact("capital_contributions_during_year"),
        "Part II - Capital contributions during year",
    ),
    (
        Exact("withdrawals_and_distributions_cash"),
        "Part II - Withdrawals & distributions (negative if parentheses)",
    ),
    (Exact("ending_capital_account"), "Part II - Ending capital account"),
];

/// One-line hint for a field: the first matching rule, or the field name
/// with underscores turned into spaces.
pub fn field_hint(name: &str) -> String {
    GUIDE_RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(name))
        .map(|(_, hint)| (*hint).to_string())
        .unwrap_or_else(|| name.replace('_', " "))
}

/// Field guide block: one `- name: hint` line per field, at most
/// [`MAX_GUIDE_FIELDS`] lines.
pub fn field_guide<S: AsRef<str>>(field_names: &[S]) -> String {
    field_names
        .iter()
        .take(MAX_GUIDE_FIELDS)
        .map(|name| {
            let name = name.as_ref();
            format!("- {name}: {}", field_hint(name))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the user prompt for one extraction call.
pub fn build_prompt<S: AsRef<str>>(
    section: &str,
    field_names: &[S],
    field_guide: &str,
    examples: &str,
) -> String {
    let whitelist = field_names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "\
You are an expert at extracting structured data from IRS Schedule K-1 (Form 1065) PDFs.
Section: {section}
Your goal is to return values for EXACTLY these fields (whitelist): {whitelist}

Strategy:
- Use reliable cues: printed labels, nearby headers, layout, and attached statements.
- Prefer authoritative sections (Part III for primary line items; statements for ZZ items).
- Do not speculate. If a value is not clearly present, use the default (0 for numbers, \"\" for strings).

Normalization rules (must apply):
- Remove currency symbols, commas and spaces (\"$1,234\" -> 1234).
- Parentheses mean negative (\"(100)\" -> -100).
- Round decimals unless a field is clearly marked to preserve decimals.
- Strings: trim; use \"\" for absent string fields (*_logic fields, partnership name, EIN).
- Never infer a value, and never copy a value across fields, when a label is not an exact match.

Section constraints (strict):
- Lines 1-10: only from Part III of the main K-1 page.
- 11a/11c and all 11ZZ/13ZZ/20XX items: only from attached statements or supplemental schedules, never the main form.
- Capital account (contributions, withdrawals, ending balance): Part II of the main page; parentheses are negative.

Permitted aliases (closed list):
- 20V: \"UBTI\" or \"Unrelated Business\" means unrelated business taxable income.
- 20AA: mentions of \"Section 704(c)\".
- 20AG: mentions of \"Section 448(c)\" or \"gross receipts\".
- 11c: mentions of \"Section 1256\" for contracts & straddles.
- PFIC QEF: mentions of \"PFIC QEF\".

Output format (STRICT):
- Respond with exactly one JSON object mapping each requested field to its value, and no other text.
- Include ALL and ONLY the requested fields as top-level keys.
- Numeric fields must be integers. String fields must be strings.

Field guide (hints only):
{field_guide}

Examples:
- \"(300)\" -> -300
- \"$1,234\" -> 1234
- Missing/unclear -> 0 (numbers) or \"\" (strings)

Return only the JSON object with the requested fields.
{examples}
"
    )
}
