use super::assessment::RiskBuckets;
use super::domain::RiskLevel;

/// Person-level risk: the worst scored level wins, otherwise Clean.
pub fn overall_risk(buckets: &RiskBuckets) -> RiskLevel {
    if buckets.has(RiskLevel::High) {
        return RiskLevel::High;
    }
    if buckets.has(RiskLevel::Medium) {
        return RiskLevel::Medium;
    }
    if buckets.has(RiskLevel::Low) {
        return RiskLevel::Low;
    }
    // Only ignored or clean entries remain (or nothing at all).
    RiskLevel::Clean
}

/// Actionable recommendation text for the overall level.
pub fn recommendation(overall: RiskLevel, buckets: &RiskBuckets) -> String {
    match overall {
        RiskLevel::High => format!(
            "REJECT - High risk profile identified. {} high-risk case(s) require immediate review and likely disqualification.",
            buckets.count(RiskLevel::High)
        ),
        RiskLevel::Medium => format!(
            "REVIEW REQUIRED - Medium risk profile. {} case(s) need manual review before making a decision.",
            buckets.count(RiskLevel::Medium)
        ),
        RiskLevel::Low => format!(
            "CONDITIONAL APPROVAL - Low risk profile. {} minor case(s) identified but may be acceptable depending on role requirements.",
            buckets.count(RiskLevel::Low)
        ),
        RiskLevel::Clean => match buckets.count(RiskLevel::Ignored) {
            0 => "APPROVE - Clean background check with no concerning records found.".to_string(),
            ignored => format!(
                "APPROVE - Clean background check. {ignored} case(s) were outside assessment criteria."
            ),
        },
        RiskLevel::Ignored => {
            "MANUAL REVIEW - Unable to determine risk level automatically.".to_string()
        }
    }
}
