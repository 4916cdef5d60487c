use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::super::domain::Charge;
use super::super::rules::{RiskTier, RuleSet};

const UNCLASSIFIED: &str = "unclassified";
const UNCLASSIFIED_BASE_SCORE: f64 = 35.0;

/// Factors behind a single charge score, kept for audit logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub tier: RiskTier,
    pub base_score: f64,
    pub severity_weight: u32,
    pub disposition_multiplier: f64,
    pub recency_multiplier: Option<f64>,
    pub score: f64,
}

/// Computes risk scores for charges that already passed eligibility.
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer<'a> {
    rules: &'a RuleSet,
    as_of: NaiveDateTime,
}

impl<'a> RiskScorer<'a> {
    pub fn new(rules: &'a RuleSet, as_of: NaiveDateTime) -> Self {
        Self { rules, as_of }
    }

    pub fn score(&self, charge: &Charge) -> ScoreBreakdown {
        let tier = self
            .rules
            .tiers()
            .lookup(&charge.category, &charge.subcategory);
        let base_score = if charge.category.eq_ignore_ascii_case(UNCLASSIFIED) {
            UNCLASSIFIED_BASE_SCORE
        } else {
            tier.base_score()
        };

        let severity_weight = self.rules.severity_weight(&charge.charge_type);
        let disposition_multiplier = self.rules.risk_impact(&charge.disposition).multiplier();

        let mut score = base_score * (f64::from(severity_weight) / 2.0) * disposition_multiplier;

        // Unreadable dates simply skip the recency adjustment.
        let recency_multiplier = charge
            .offense_date()
            .map(|date| recency_multiplier(date, self.as_of));
        if let Some(factor) = recency_multiplier {
            score *= factor;
        }

        ScoreBreakdown {
            tier,
            base_score,
            severity_weight,
            disposition_multiplier,
            recency_multiplier,
            score: round_to_hundredths(score),
        }
    }
}

/// Weight favouring recent offenses, by whole elapsed days over 365.
pub fn recency_multiplier(offense_date: NaiveDate, as_of: NaiveDateTime) -> f64 {
    let elapsed = as_of - offense_date.and_time(NaiveTime::default());
    let years_ago = elapsed.num_days() as f64 / 365.0;

    if years_ago <= 1.0 {
        1.5
    } else if years_ago <= 3.0 {
        1.2
    } else if years_ago <= 5.0 {
        1.0
    } else {
        0.8
    }
}

/// Two-decimal rounding with exact ties going to the even neighbour.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
