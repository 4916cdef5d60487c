//! Criminal background-check screening: rule tables, per-charge assessment,
//! person-level policy, and the orchestration surface around them.

pub mod assessment;
pub mod domain;
pub mod engine;
pub mod policy;
pub mod router;
pub mod rules;

#[cfg(test)]
mod tests;

pub use assessment::{
    classify, AssessmentSummary, CaseAggregator, Eligibility, EligibilityFilter, RiskBuckets,
    RiskScorer, ScoreBreakdown,
};
pub use domain::{
    CaseRecord, Charge, ChargeRecord, CheckRequest, CheckRequestError, DispositionEntry,
    IgnoreReason, PersonInfo, PostalAddress, ProcessedCase, RecordDocument, RecordGroup,
    RiskLevel,
};
pub use engine::{
    start_of_day, Assessment, RecordSource, RecordSourceError, ScreeningEngine, ScreeningError,
    ScreeningReport,
};
pub use policy::{overall_risk, recommendation};
pub use router::screening_router;
pub use rules::{
    ChargeTypeRule, DispositionRule, LookbackPeriod, RiskImpact, RiskTier, RiskTierTable,
    RuleSet, RuleSetError, ScoreThresholds, TierEntry, TierTableError,
};
