//! Serde mirror of the rule file. Only the keys the engine reads are
//! declared; anything else in the document is ignored.

use serde::Deserialize;

use super::tiers::TierEntry;

#[derive(Debug, Deserialize)]
pub(crate) struct RuleDocument {
    pub search_parameters: SearchParameters,
    pub record_categories: RecordCategories,
    pub charge_classification: ChargeClassification,
    pub disposition_filters: DispositionFilters,
    pub risk_scoring: RiskScoring,
    pub scoring_rules: ScoringRules,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParameters {
    pub lookback_period: LookbackSection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookbackSection {
    pub selected_period: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordCategories {
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryEntry {
    pub category: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChargeClassification {
    pub types: Vec<ChargeTypeEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChargeTypeEntry {
    pub input_key: String,
    pub enabled: bool,
    pub severity_weight: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DispositionFilters {
    pub dispositions: Vec<DispositionEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DispositionEntry {
    pub input_key: String,
    pub enabled: bool,
    pub risk_impact: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RiskScoring {
    pub categories: Vec<RiskCategoryEntry>,
    #[serde(default)]
    pub tier_overrides: Vec<TierEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RiskCategoryEntry {
    pub category: String,
    pub base_weight: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoringRules {
    pub thresholds: ThresholdSection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThresholdSection {
    pub critical_risk: ThresholdBound,
    pub high_risk: ThresholdBound,
    pub medium_risk: ThresholdBound,
    pub low_risk: ThresholdBound,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThresholdBound {
    pub min: f64,
}
