//! Per-charge screening pipeline: eligibility, scoring, classification,
//! and bucketing by risk level.

mod classify;
mod eligibility;
mod scoring;
mod summary;

pub use classify::classify;
pub use eligibility::{Eligibility, EligibilityFilter};
pub use scoring::{recency_multiplier, RiskScorer, ScoreBreakdown};
pub use summary::AssessmentSummary;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{Charge, ProcessedCase, RecordDocument, RiskLevel};
use super::rules::RuleSet;

const NO_HISTORY_DESCRIPTION: &str = "No criminal records found";
const NO_HISTORY_REASON: &str = "No criminal history found";
const NO_QUALIFYING_DESCRIPTION: &str = "No qualifying criminal records found";
const NO_QUALIFYING_REASON: &str = "No records meet the configured criteria";

/// Processed cases keyed by risk level. Every level is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskBuckets {
    buckets: BTreeMap<RiskLevel, Vec<ProcessedCase>>,
}

impl Default for RiskBuckets {
    fn default() -> Self {
        Self {
            buckets: RiskLevel::ALL
                .into_iter()
                .map(|level| (level, Vec::new()))
                .collect(),
        }
    }
}

impl RiskBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a case under its own risk level.
    pub fn push(&mut self, case: ProcessedCase) {
        self.buckets.entry(case.risk_level).or_default().push(case);
    }

    pub fn get(&self, level: RiskLevel) -> &[ProcessedCase] {
        self.buckets.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.get(level).len()
    }

    pub fn has(&self, level: RiskLevel) -> bool {
        self.count(level) > 0
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskLevel, &[ProcessedCase])> {
        self.buckets
            .iter()
            .map(|(level, cases)| (*level, cases.as_slice()))
    }

    fn has_scored(&self) -> bool {
        [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High]
            .into_iter()
            .any(|level| self.has(level))
    }
}

impl FromIterator<ProcessedCase> for RiskBuckets {
    fn from_iter<T: IntoIterator<Item = ProcessedCase>>(iter: T) -> Self {
        let mut buckets = Self::new();
        for case in iter {
            buckets.push(case);
        }
        buckets
    }
}

/// Walks a record document and emits one processed case per charge.
#[derive(Debug, Clone, Copy)]
pub struct CaseAggregator<'a> {
    rules: &'a RuleSet,
    filter: EligibilityFilter<'a>,
    scorer: RiskScorer<'a>,
}

impl<'a> CaseAggregator<'a> {
    pub fn new(rules: &'a RuleSet, as_of: NaiveDateTime) -> Self {
        Self {
            rules,
            filter: EligibilityFilter::new(rules, as_of),
            scorer: RiskScorer::new(rules, as_of),
        }
    }

    pub fn process(&self, document: &RecordDocument) -> RiskBuckets {
        let mut buckets = RiskBuckets::new();

        let groups = match document.results.as_deref() {
            Some(groups) if !groups.is_empty() => groups,
            _ => {
                buckets.push(ProcessedCase::clean(
                    NO_HISTORY_DESCRIPTION,
                    NO_HISTORY_REASON,
                ));
                return buckets;
            }
        };

        for group in groups {
            let category = group.category.as_deref().unwrap_or_default();
            if !self.filter.is_record_category_enabled(category) {
                warn!(
                    record_category = category,
                    cases = group.cases.len(),
                    "skipping disabled record category"
                );
                continue;
            }

            for case in &group.cases {
                let case_number = case.case_number.as_deref().unwrap_or("unknown");
                for record in &case.charges {
                    let charge = Charge::from_record(case_number, record);
                    buckets.push(self.process_charge(charge));
                }
            }
        }

        // Ignored entries suppress the synthetic clean record on purpose:
        // only a document with nothing to evaluate gets one.
        if !buckets.has_scored() && !buckets.has(RiskLevel::Ignored) {
            buckets.push(ProcessedCase::clean(
                NO_QUALIFYING_DESCRIPTION,
                NO_QUALIFYING_REASON,
            ));
        }

        buckets
    }

    pub fn process_charge(&self, charge: Charge) -> ProcessedCase {
        if let Eligibility::Ignored(reason) = self.filter.check(&charge) {
            debug!(
                case_number = %charge.case_number,
                reason = %reason,
                "charge ignored"
            );
            return ProcessedCase::ignored(charge, &reason);
        }

        let breakdown = self.scorer.score(&charge);
        let level = classify(breakdown.score, &charge.category, self.rules.thresholds());
        debug!(
            case_number = %charge.case_number,
            tier = %breakdown.tier,
            score = breakdown.score,
            level = %level,
            "charge scored"
        );
        ProcessedCase::scored(charge, level, breakdown.score)
    }
}
