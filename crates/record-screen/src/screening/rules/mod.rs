//! Rule tables loaded once at startup and shared read-only by every
//! assessment.

mod schema;
mod tiers;

pub use tiers::{RiskTier, RiskTierTable, TierEntry, TierTableError};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use schema::RuleDocument;

/// Number of years an offense stays relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookbackPeriod {
    pub years: u32,
}

impl LookbackPeriod {
    /// Longest window accepted from a rule file.
    pub const MAX_YEARS: u32 = 200;

    pub const fn days(self) -> i64 {
        self.years as i64 * 365
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeTypeRule {
    pub key: String,
    pub enabled: bool,
    pub severity_weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispositionRule {
    pub key: String,
    pub enabled: bool,
    pub risk_impact: RiskImpact,
}

/// Configured weight of a disposition. Values outside the four known
/// impacts are kept verbatim and score as neutral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum RiskImpact {
    High,
    Medium,
    Low,
    Negligible,
    Unrecognized(String),
}

impl RiskImpact {
    pub fn parse(value: &str) -> Self {
        match value {
            "high" => RiskImpact::High,
            "medium" => RiskImpact::Medium,
            "low" => RiskImpact::Low,
            "none" => RiskImpact::Negligible,
            other => RiskImpact::Unrecognized(other.to_string()),
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            RiskImpact::High => 1.5,
            RiskImpact::Medium => 1.2,
            RiskImpact::Low => 1.0,
            RiskImpact::Negligible => 0.5,
            RiskImpact::Unrecognized(_) => 1.0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RiskImpact::High => "high",
            RiskImpact::Medium => "medium",
            RiskImpact::Low => "low",
            RiskImpact::Negligible => "none",
            RiskImpact::Unrecognized(other) => other,
        }
    }
}

impl From<RiskImpact> for String {
    fn from(value: RiskImpact) -> Self {
        value.as_str().to_string()
    }
}

/// Ascending score cutoffs used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl ScoreThresholds {
    fn validate(&self) -> Result<(), RuleSetError> {
        let bounds = [
            ("low_risk", self.low),
            ("medium_risk", self.medium),
            ("high_risk", self.high),
            ("critical_risk", self.critical),
        ];
        for (name, value) in bounds {
            if !value.is_finite() || value < 0.0 {
                return Err(RuleSetError::Invalid(format!(
                    "scoring_rules.thresholds.{name}.min must be a non-negative number"
                )));
            }
        }
        for pair in bounds.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            if lower > upper {
                return Err(RuleSetError::Invalid(format!(
                    "threshold {lower_name} ({lower}) exceeds {upper_name} ({upper})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("rule configuration file not readable: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rule configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rule configuration rejected: {0}")]
    Invalid(String),
    #[error(transparent)]
    TierTable(#[from] TierTableError),
}

/// Validated, immutable rule tables. Keys are stored lower-cased.
#[derive(Debug, Clone)]
pub struct RuleSet {
    lookback: LookbackPeriod,
    record_categories: HashMap<String, bool>,
    charge_types: HashMap<String, ChargeTypeRule>,
    dispositions: HashMap<String, DispositionRule>,
    category_weights: HashMap<String, f64>,
    thresholds: ScoreThresholds,
    tiers: RiskTierTable,
}

impl RuleSet {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleSetError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RuleSetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            lookback_years = rules.lookback.years,
            charge_types = rules.charge_types.len(),
            dispositions = rules.dispositions.len(),
            "loaded screening rules"
        );
        Ok(rules)
    }

    /// Rule file plus an optional CSV tier table layered over the defaults.
    pub fn load(
        rules_path: impl AsRef<Path>,
        tier_table_path: Option<&Path>,
    ) -> Result<Self, RuleSetError> {
        let rules = Self::from_path(rules_path)?;
        match tier_table_path {
            Some(path) => {
                let entries = RiskTierTable::read_csv_path(path)?;
                info!(path = %path.display(), entries = entries.len(), "loaded risk tier overrides");
                Ok(rules.with_tier_overrides(entries))
            }
            None => Ok(rules),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RuleSetError> {
        let document: RuleDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    fn from_document(document: RuleDocument) -> Result<Self, RuleSetError> {
        let lookback = LookbackPeriod {
            years: document.search_parameters.lookback_period.selected_period,
        };
        if lookback.years > LookbackPeriod::MAX_YEARS {
            return Err(RuleSetError::Invalid(format!(
                "lookback_period.selected_period is {} years (at most {} allowed)",
                lookback.years,
                LookbackPeriod::MAX_YEARS
            )));
        }

        let mut record_categories = HashMap::new();
        for entry in document.record_categories.categories {
            record_categories
                .entry(entry.category.to_lowercase())
                .or_insert(entry.enabled);
        }

        let mut charge_types = HashMap::new();
        for entry in document.charge_classification.types {
            let severity_weight = u32::try_from(entry.severity_weight).map_err(|_| {
                RuleSetError::Invalid(format!(
                    "charge type '{}' has severity_weight {} (must be 0 or greater)",
                    entry.input_key, entry.severity_weight
                ))
            })?;
            charge_types
                .entry(entry.input_key.to_lowercase())
                .or_insert(ChargeTypeRule {
                    key: entry.input_key,
                    enabled: entry.enabled,
                    severity_weight,
                });
        }

        let mut dispositions = HashMap::new();
        for entry in document.disposition_filters.dispositions {
            dispositions
                .entry(entry.input_key.to_lowercase())
                .or_insert(DispositionRule {
                    risk_impact: RiskImpact::parse(&entry.risk_impact),
                    key: entry.input_key,
                    enabled: entry.enabled,
                });
        }

        let mut category_weights = HashMap::new();
        for entry in document.risk_scoring.categories {
            if !entry.base_weight.is_finite() {
                return Err(RuleSetError::Invalid(format!(
                    "risk category '{}' has a non-finite base_weight",
                    entry.category
                )));
            }
            category_weights
                .entry(entry.category.to_lowercase())
                .or_insert(entry.base_weight);
        }

        let bounds = document.scoring_rules.thresholds;
        let thresholds = ScoreThresholds {
            critical: bounds.critical_risk.min,
            high: bounds.high_risk.min,
            medium: bounds.medium_risk.min,
            low: bounds.low_risk.min,
        };
        thresholds.validate()?;

        let mut tiers = RiskTierTable::standard();
        tiers.merge_entries(document.risk_scoring.tier_overrides);

        Ok(Self {
            lookback,
            record_categories,
            charge_types,
            dispositions,
            category_weights,
            thresholds,
            tiers,
        })
    }

    /// Layers additional tier entries over the current table.
    pub fn with_tier_overrides<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = TierEntry>,
    {
        self.tiers.merge_entries(entries);
        self
    }

    pub fn lookback(&self) -> LookbackPeriod {
        self.lookback
    }

    pub fn thresholds(&self) -> &ScoreThresholds {
        &self.thresholds
    }

    pub fn tiers(&self) -> &RiskTierTable {
        &self.tiers
    }

    /// Unknown record categories are not enabled.
    pub fn is_record_category_enabled(&self, category: &str) -> bool {
        self.record_categories
            .get(&category.to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    pub fn charge_type(&self, charge_type: &str) -> Option<&ChargeTypeRule> {
        self.charge_types.get(&charge_type.to_lowercase())
    }

    pub fn is_charge_type_enabled(&self, charge_type: &str) -> bool {
        self.charge_type(charge_type)
            .map(|rule| rule.enabled)
            .unwrap_or(false)
    }

    pub fn severity_weight(&self, charge_type: &str) -> u32 {
        self.charge_type(charge_type)
            .map(|rule| rule.severity_weight)
            .unwrap_or(1)
    }

    pub fn disposition(&self, disposition: &str) -> Option<&DispositionRule> {
        self.dispositions.get(&disposition.to_lowercase())
    }

    pub fn is_disposition_enabled(&self, disposition: &str) -> bool {
        self.disposition(disposition)
            .map(|rule| rule.enabled)
            .unwrap_or(false)
    }

    pub fn risk_impact(&self, disposition: &str) -> RiskImpact {
        self.disposition(disposition)
            .map(|rule| rule.risk_impact.clone())
            .unwrap_or(RiskImpact::Low)
    }

    /// Configured base weight for a risk category (1.0 when absent).
    ///
    /// Loaded and validated but not consulted by the scorer: the tier table
    /// decides score magnitude.
    pub fn category_base_weight(&self, category: &str) -> f64 {
        self.category_weights
            .get(&category.to_lowercase())
            .copied()
            .unwrap_or(1.0)
    }
}
