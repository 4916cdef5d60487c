use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::RiskLevel;
use super::RiskBuckets;

/// Counts and headline notes derived from the bucketed cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub total_cases: usize,
    pub risk_distribution: BTreeMap<RiskLevel, usize>,
    pub highest_risk_score: f64,
    pub recommendations: Vec<String>,
}

impl AssessmentSummary {
    pub fn from_buckets(buckets: &RiskBuckets) -> Self {
        let risk_distribution = buckets
            .iter()
            .map(|(level, cases)| (level, cases.len()))
            .collect();

        let highest_risk_score = buckets
            .iter()
            .flat_map(|(_, cases)| cases.iter().map(|case| case.risk_score))
            .fold(0.0_f64, f64::max);

        let mut recommendations = Vec::new();
        if buckets.has(RiskLevel::High) {
            recommendations.push("High-risk cases require immediate review".to_string());
        }
        if buckets.has(RiskLevel::Medium) {
            recommendations.push("Medium-risk cases should be evaluated".to_string());
        }
        if buckets.has(RiskLevel::Clean) {
            recommendations.push("No concerning criminal history found".to_string());
        }
        let ignored = buckets.count(RiskLevel::Ignored);
        if ignored > 0 {
            recommendations.push(format!("{ignored} cases ignored due to filters"));
        }

        Self {
            total_cases: buckets.total(),
            risk_distribution,
            highest_risk_score,
            recommendations,
        }
    }
}
