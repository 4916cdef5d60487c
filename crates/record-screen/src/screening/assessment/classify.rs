use super::super::domain::RiskLevel;
use super::super::rules::ScoreThresholds;

/// Maps a charge score onto a risk level.
///
/// Unclassified charges with any positive score are High regardless of the
/// thresholds. Scores under `low` still land in Low; there is no separate
/// no-risk tier.
pub fn classify(score: f64, category: &str, thresholds: &ScoreThresholds) -> RiskLevel {
    if category.eq_ignore_ascii_case("unclassified") && score > 0.0 {
        return RiskLevel::High;
    }

    if score >= thresholds.critical || score >= thresholds.high {
        RiskLevel::High
    } else if score >= thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> ScoreThresholds {
        ScoreThresholds {
            critical: 60.0,
            high: 40.0,
            medium: 20.0,
            low: 5.0,
        }
    }

    #[test]
    fn thresholds_are_inclusive_lower_bounds() {
        let thresholds = thresholds();
        assert_eq!(classify(75.0, "violence", &thresholds), RiskLevel::High);
        assert_eq!(classify(40.0, "violence", &thresholds), RiskLevel::High);
        assert_eq!(classify(39.99, "violence", &thresholds), RiskLevel::Medium);
        assert_eq!(classify(20.0, "statutory", &thresholds), RiskLevel::Medium);
        assert_eq!(classify(5.0, "statutory", &thresholds), RiskLevel::Low);
    }

    #[test]
    fn scores_below_low_floor_remain_low() {
        assert_eq!(classify(1.0, "statutory", &thresholds()), RiskLevel::Low);
        assert_eq!(classify(0.0, "statutory", &thresholds()), RiskLevel::Low);
    }

    #[test]
    fn unclassified_positive_scores_are_high() {
        assert_eq!(classify(0.5, "Unclassified", &thresholds()), RiskLevel::High);
        assert_eq!(classify(0.0, "unclassified", &thresholds()), RiskLevel::Low);
    }
}
