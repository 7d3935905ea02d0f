//! Field schema for Schedule K-1 (Form 1065) extraction.
//!
//! Two flat record definitions: the cover page (Parts I-III of the main
//! form) and the federal footnotes (attached statements). Every field is
//! either an integer amount or a text value, and the kind is decided from
//! the field name alone.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier fields that carry text rather than amounts.
pub const TEXT_IDENTIFIERS: &[&str] = &[
    "partnership_name",
    "partnership_employer_identification_number",
];

/// Suffix marking an explanation field that accompanies an amount.
pub const TEXT_SUFFIX: &str = "_logic";

// ── Record layouts ──

pub const COVER_PAGE_FIELDS: &[&str] = &[
    "partnership_name",
    "partnership_employer_identification_number",
    "line_1_ordinary_business_income_loss_passive",
    "line_1_ordinary_business_income_loss",
    "line_2_net_rental_real_estate_income_loss",
    "line_3_other_rental_income_loss",
    "line_4a_guaranteed_payments_for_services",
    "line_4b_guaranteed_payments_for_capital",
    "line_4c_total_guaranteed_payments",
    "line_5_interest_income",
    "line_5_interest_income_us_government_interest",
    "line_6a_ordinary_dividends",
    "line_6b_qualified_dividends",
    "line_6c_dividend_equivalents",
    "line_7_royalties",
    "line_8_net_short_term_capital_gain_loss",
    "line_9a_net_long_term_capital_gain_loss",
    "line_9b_collectibles_28_percent_gain_loss",
    "line_9c_uncaptured_section_1250_gain",
    "line_10_net_section_1231_gain_loss",
    "line_12_section_179_deduction",
    "line_18a_tax_exempt_interest_income",
    "line_18b_other_tax_exempt_income",
    "line_18c_nondeductible_expenses",
    "line_21_foreign_taxes_paid_or_accrued",
    "line_13m_amounts_paid_for_medical_insurance",
    "capital_contributions_during_year",
    "other_increase_decrease_income_items",
    "withdrawals_and_distributions_cash",
    "ending_capital_account",
];

pub const FOOTNOTE_FIELDS: &[&str] = &[
    "line_9a_net_long_term_capital_gain_loss_property_held_3_years_or_less_logic",
    "line_9a_net_long_term_capital_gain_loss_property_held_3_years_or_less",
    "line_9a_net_long_term_capital_gain_loss_property_held_more_than_3_years_logic",
    "line_9a_net_long_term_capital_gain_loss_property_held_more_than_3_years",
    "line_11a_other_income_total",
    "line_11b_involuntary_conversions",
    "line_11c_section_1256_gain_loss_logic",
    "line_11c_section_1256_gain_loss",
    "line_11d_mining_exploration_costs_recapture",
    "line_11e_cancellation_of_debt",
    "line_11f_section_743b_positive_adjustments",
    "line_11h_section_951a_inclusion",
    "line_11i_gain_loss_from_disposition_of_oil_gas_geothermal_mineral_properties",
    "line_11j_recovery_of_tax_benefit_items",
    "line_11k_gambling_gains_losses",
    "line_11l_any_income_gain_loss_to_partnership_under_distribution_under_751b",
    "line_11m_gain_eligible_for_section_1045_rollover_purchased_partnership_short_term",
    "line_11m_gain_eligible_for_section_1045_rollover_purchased_partnership_long_term",
    "line_11n_gain_eligible_for_section_1045_rollover_not_purchased_partnership_short_term",
    "line_11n_gain_eligible_for_section_1045_rollover_not_purchased_partnership_long_term",
    "line_11o_sale_or_exchange_of_qsb_stock_with_section_1202_exclusion_short_term",
    "line_11o_sale_or_exchange_of_qsb_stock_with_section_1202_exclusion_long_term",
    "line_11p_gain_or_loss_on_disposition_of_farm_recapture_property_and_other_items_to_which_section_1252_applies_short_term",
    "line_11q_gain_or_loss_on_fannie_mae_or_freddie_mac_qualified_preferred_stock",
    "line_11r_specially_allocated_ordinary_gain_loss",
    "line_11s_non_portfolio_gain_loss_stcg",
    "line_11s_non_portfolio_gain_loss_ltcg",
    "line_11ZZ_from_pass_through_entities_other_income_loss",
    "line_11ZZ_income_from_depletion_properties",
    "line_11ZZ_gain_loss_capital_net_long_term",
    "line_11ZZ_gain_loss_capital_net_long_term_qsbs",
    "line_11ZZ_gain_loss_capital_net_short_term",
    "line_11ZZ_gain_loss_capital_sale_of_pfic_long_term",
    "line_11ZZ_gain_loss_ordinary_from_form_4797",
    "line_11ZZ_foreign_futures_trading_gain_loss",
    "line_11ZZ_interest_income",
    "line_11ZZ_interest_income_self_charged_interest",
    "line_11ZZ_interest_income_us_government",
    "line_11ZZ_interest_income_trader_expense",
    "line_11ZZ_mtm_income_loss",
    "line_11ZZ_ordinary_income_section_475f",
    "line_11ZZ_other_income_loss",
    "line_11ZZ_other_portfolio_income_loss",
    "line_11ZZ_other_trade_business_expense",
    "line_11ZZ_other_trade_business_income",
    "line_11ZZ_pfic_1291_excess_distributions",
    "line_11ZZ_pfic_qef_income",
    "line_11ZZ_pfic_qef_income_section_1250_gain",
    "line_11ZZ_section_965_income",
    "line_11ZZ_section_986_total",
    "line_11ZZ_section_987_total",
    "line_11zz_section_988_total_logic",
    "line_11ZZ_section_988_total",
    "line_11ZZ_swap_net_income_loss",
    "line_11ZZ_divedends_equivalent_swap_income_total",
    "line_11ZZ_other_ordinary_income_loss_total",
    "line_11ZZ_interest_income_domestic",
    "line_11ZZ_interest_income_foreign",
    "line_11ZZ_dividends_qualified_domestic",
    "line_11ZZ_dividends_qualified_foreign",
    "line_11ZZ_dividends_non_qualified_domestic",
    "line_11ZZ_dividends_non_qualified_foreign",
    "line_11ZZ_operating_expense",
    "line_11ZZ_business_interest_expense",
    "line_11ZZ_ptp_ordinary_income",
    "line_13a_cash_contributions_50_percent",
    "line_13b_cash_contributions_30_percent",
    "line_13g_cash_contributions_100_percent",
    "line_13c_non_cash_contributions_50_percent",
    "line_13d_non_cash_contributions_30_percent",
    "line_13e_capital_gain_property_to_50_percent_organization_30_percent",
    "line_13f_capital_gain_property_20_percent",
    "line_13g_non_cash_contributions_qualified_conservation_100_percent",
    "line_13h_investment_interest_investing_schedule_A_logic",
    "line_13h_investment_interest_investing_schedule_A",
    "line_13h_investment_interest_trading_schedule_E_logic",
    "line_13h_investment_interest_trading_schedule_E",
    "line_13i_royalty_deductions",
    "line_13j_section_59_e_2_expenditures",
    "line_13k_excess_business_interest_expense",
    "line_13l_deductions_portfolio_other_logic",
    "line_13l_deductions_portfolio_other",
    "line_13n_educational_assistance_benefits",
    "line_13o_dependent_care_benefits",
    "line_13p_preproductive_period_expenses",
    "line_13r_pension_and_iras",
    "line_13s_reforestation_expense_deduction",
    "line_13v_section_743b_negative_adjustments",
    "line_13w_soil_and_water_conservation",
    "line_13x_film_television_and_theatrical_production_expenditures",
    "line_13y_expenditures_for_removal_of_barriers",
    "line_13z_itemized_deductions_total",
    "line_13z_total",
    "line_13AA_contributions_to_a_capital_construction_fund",
    "line_13AB_penalty_on_early_withdrawal_of_savings",
    "line_13AC_interest_expense_allocated_to_debt_financed_distributions",
    "line_13AD_interest_expense_on_working_interest_in_oil_or_gas",
    "line_13AE_deductions_portfolio_income_logic",
    "line_13AE_deductions_portfolio_income",
    "line_13ZZ_other_deductions_total_logic",
    "line_13ZZ_other_deductions_total",
    "line_14_net_earnings_loss_from_self_employment",
    "line_15e_qualified_rehabilitation_expenditures",
    "line_15f_other_rental_real_estate_credits",
    "line_15g_other_rental_credits",
    "line_15h_undistributed_capital_gains_credit",
    "line_15i_biofuel_producer_credit",
    "line_15j_work_opportunity_credit",
    "line_15l_empowerment_zone_employment_credit",
    "line_15m_credit_for_increasing_research_activities",
    "line_15n_credit_for_employer_social_security_and_medicare_taxes",
    "line_15o_backup_withholding",
    "line_15v_advanced_manufacturing_production_credit",
    "line_15y_clean_hydrogen_production_credit",
    "line_15aa_enhanced_oil_recovery_credit",
    "line_15ab_renewable_electricity_production_credit",
    "line_15zz_other_credits",
    "line_15_small_employer_auto_enrollment_credit_form_8881",
    "line_15_aviation_fuels_form_8864",
    "line_15_reserved",
    "line_15_alternative_fuel_vehicle_refueling_property_form_8911",
    "line_15_alternative_motor_vehicle",
    "line_15_alternative_motor_vehicle_refueling_property_form_8911",
    "line_15_biodiesel_and_renewable_diesel_fuels_form_8864",
    "line_15_build_america_bond",
    "line_15_carbon_oxide_sequestration",
    "line_15_clean_renewable_energy_bond",
    "line_15_disabled_access",
    "line_15_distilled_spirits",
    "line_15_electricity_closed_loop_biomass",
    "line_15_electricity_open_loop_biomass",
    "line_15_employer_provided_childcare_facilities",
    "line_15_empowerment_zone_employment_form_8844",
    "line_15_increasing_research_eligible_small_business",
    "line_15_increase_research_activities_form_6765",
    "line_15_indian_coal_production_facility",
    "line_15_indian_employment_form_8845",
    "line_15_low_sulfur_diesel_fuel_production",
    "line_15_military_spouse_participation",
    "line_15_qualified_commercial_clean_vehicle",
    "line_15_lih_section_42_j_5",
    "line_15_lih_from_other_partnerships",
    "line_15_new_markets",
    "line_15_employer_credit_for_paid_family_and_medical_leave_form_8994",
    "line_15_employee_retention_credit",
    "line_15_new_clean_renewable_energy_bond",
    "line_15_orphan_drug",
    "line_15_qual_energy_conservation_energy_bond",
    "line_15_new_clean_vehicle_business_investment_use",
    "line_15_qualified_railroad_track_maintenance_form_8900",
    "line_15_qual_school_construction_bond",
    "line_15_refined_coal_not_produced_in_4_year_period",
    "line_15_small_employer_health_insurance_premiums",
    "line_15_small_employer_pension_plan_start_up",
    "line_15_oil_and_gas_production_from_marginal_wells_form_8904",
    "line_15_taxable_income_attributable_to_pass_through",
    "line_15_work_opportunity_credit",
    "line_15_energy_efficient_home_credit",
    "line_15_mine_rescue_team_training_form_8923",
    "line_15_employer_differential_wage_payments_8932",
    "line_17a_post_1986_depreciation_adjustment",
    "line_17b_adjusted_gain_or_loss",
    "line_17c_depletion_other_than_oil_gas",
    "line_17d_oil_gas_geothermal_mineral_gross_income",
    "line_17e_oil_gas_geothermal_mineral_deductions",
    "line_17f_other_amt_items",
    "line_20_net_irc_section_988_gross_losses",
    "line_20AA_section_704c_information",
    "line_20AB_section_751_gain_loss",
    "line_20AD_deemed_section_1250_unrecaptured_gain",
    "line_20AG_gross_receipts_section_448_c",
    "line_20_installment_sale_deferred_gain_capital_gain",
    "line_20_installment_sale_outstanding_obligations",
    "line_20_installment_sale_deferred_gain_interest",
    "line_20N_interest_expense_for_corporate_partners",
    "line_20V_unrelated_business_taxable_income_logic",
    "line_20V_unrelated_business_taxable_income",
    "line_20AE_excess_taxable_income",
    "line_20AF_excess_business_interest_income",
    "line_20AM_section_1061_information",
    "line_20O_453I3_information",
    "line_20P_452Ac_information",
];

// ── Kinds ──

/// Value kind of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    /// Kind of a field, derived from its name.
    ///
    /// Names ending in `_logic` and the partnership identifiers are text;
    /// everything else is an integer amount.
    pub fn of(name: &str) -> Self {
        if name.ends_with(TEXT_SUFFIX) || TEXT_IDENTIFIERS.contains(&name) {
            Self::Text
        } else {
            Self::Integer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared field: name plus value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::of(name),
        }
    }
}

/// Which of the two K-1 records a field list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    CoverPage,
    Footnotes,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::CoverPage, RecordKind::Footnotes];

    /// Declared field names, in layout order.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::CoverPage => COVER_PAGE_FIELDS,
            Self::Footnotes => FOOTNOTE_FIELDS,
        }
    }

    /// Declared fields with their kinds, in layout order.
    pub fn fields(self) -> impl Iterator<Item = FieldSpec> {
        self.field_names().iter().map(|name| FieldSpec::new(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoverPage => "cover_page",
            Self::Footnotes => "footnotes",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every declared field name: cover page first, then footnotes.
pub fn all_field_names() -> Vec<&'static str> {
    COVER_PAGE_FIELDS
        .iter()
        .chain(FOOTNOTE_FIELDS.iter())
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifiers_are_text() {
        assert_eq!(FieldKind::of("partnership_name"), FieldKind::Text);
        assert_eq!(
            FieldKind::of("partnership_employer_identification_number"),
            FieldKind::Text
        );
    }

    #[test]
    fn logic_suffix_is_text() {
        assert_eq!(
            FieldKind::of("line_11c_section_1256_gain_loss_logic"),
            FieldKind::Text
        );
        assert_eq!(
            FieldKind::of("line_11c_section_1256_gain_loss"),
            FieldKind::Integer
        );
    }

    #[test]
    fn passive_indicator_is_integer() {
        assert_eq!(
            FieldKind::of("line_1_ordinary_business_income_loss_passive"),
            FieldKind::Integer
        );
    }

    #[test]
    fn record_sizes() {
        assert_eq!(COVER_PAGE_FIELDS.len(), 30);
        assert_eq!(FOOTNOTE_FIELDS.len(), 182);
        assert_eq!(all_field_names().len(), 212);
    }

    #[test]
    fn field_names_are_unique_across_records() {
        let names = all_field_names();
        let distinct: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(distinct.len(), names.len());
    }

    #[test]
    fn cover_page_text_fields() {
        let text: Vec<&str> = RecordKind::CoverPage
            .fields()
            .filter(|f| f.kind == FieldKind::Text)
            .map(|f| f.name)
            .collect();
        assert_eq!(text, TEXT_IDENTIFIERS);
    }

    #[test]
    fn kind_display() {
        assert_eq!(FieldKind::Integer.to_string(), "integer");
        assert_eq!(RecordKind::Footnotes.to_string(), "footnotes");
    }
}
