use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::assessment::{AssessmentSummary, CaseAggregator, RiskBuckets};
use super::domain::{CheckRequest, CheckRequestError, PersonInfo, RecordDocument, RiskLevel};
use super::policy::{overall_risk, recommendation};
use super::rules::RuleSet;

/// Boundary to whatever fetches raw records for a person (e.g. a vendor API).
pub trait RecordSource: Send + Sync {
    fn fetch(&self, request: &CheckRequest) -> Result<Value, RecordSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecordSourceError {
    #[error("no records available for '{0}'")]
    NotFound(String),
    #[error("record source unavailable: {0}")]
    Unavailable(String),
}

impl RecordSourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordSourceError::NotFound(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error(transparent)]
    Request(#[from] CheckRequestError),
    #[error("record document does not match the expected schema: {0}")]
    MalformedDocument(#[source] serde_json::Error),
    #[error("record retrieval failed after {elapsed_seconds:.2} seconds: {source}")]
    Source {
        elapsed_seconds: f64,
        #[source]
        source: RecordSourceError,
    },
}

/// Bucketed cases plus the person-level decision for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub processed_cases: RiskBuckets,
    pub summary: AssessmentSummary,
    pub overall_risk_level: RiskLevel,
    pub recommendation: String,
}

/// Full result of a background check, including the provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub checkr_check_id: String,
    pub checkr_response: Value,
    pub processed_cases: RiskBuckets,
    pub summary: AssessmentSummary,
    pub execution_time_seconds: f64,
    pub person_info: PersonInfo,
    pub recommendation: String,
    pub overall_risk_level: RiskLevel,
}

/// Stateless engine applying a shared, immutable rule set.
#[derive(Debug, Clone)]
pub struct ScreeningEngine {
    rules: Arc<RuleSet>,
}

impl ScreeningEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self::from_shared(Arc::new(rules))
    }

    pub fn from_shared(rules: Arc<RuleSet>) -> Self {
        info!(
            lookback_years = rules.lookback().years,
            tier_entries = rules.tiers().len(),
            "screening engine ready"
        );
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn assess(&self, document: &Value) -> Result<Assessment, ScreeningError> {
        self.assess_at(document, Local::now().naive_local())
    }

    pub fn assess_at(
        &self,
        document: &Value,
        as_of: NaiveDateTime,
    ) -> Result<Assessment, ScreeningError> {
        let document =
            RecordDocument::from_value(document).map_err(ScreeningError::MalformedDocument)?;
        Ok(self.assess_document(&document, as_of))
    }

    pub fn assess_document(&self, document: &RecordDocument, as_of: NaiveDateTime) -> Assessment {
        let processed_cases = CaseAggregator::new(&self.rules, as_of).process(document);
        let summary = AssessmentSummary::from_buckets(&processed_cases);
        let overall_risk_level = overall_risk(&processed_cases);
        let recommendation = recommendation(overall_risk_level, &processed_cases);

        Assessment {
            processed_cases,
            summary,
            overall_risk_level,
            recommendation,
        }
    }

    pub fn run_background_check<S>(
        &self,
        source: &S,
        request: CheckRequest,
    ) -> Result<ScreeningReport, ScreeningError>
    where
        S: RecordSource + ?Sized,
    {
        self.run_background_check_at(source, request, Local::now().naive_local())
    }

    /// Fetch, assess, and package a check as of a fixed instant.
    pub fn run_background_check_at<S>(
        &self,
        source: &S,
        request: CheckRequest,
        as_of: NaiveDateTime,
    ) -> Result<ScreeningReport, ScreeningError>
    where
        S: RecordSource + ?Sized,
    {
        let started = Instant::now();
        let request = request.normalized()?;
        let person_info = PersonInfo {
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            dob: request.dob.clone().unwrap_or_default(),
            reference_id: request.reference_id.clone().unwrap_or_default(),
            processed_at: as_of.format("%Y-%m-%dT%H:%M:%S").to_string(),
        };

        let response = source
            .fetch(&request)
            .map_err(|err| ScreeningError::Source {
                elapsed_seconds: started.elapsed().as_secs_f64(),
                source: err,
            })?;

        let document =
            RecordDocument::from_value(&response).map_err(ScreeningError::MalformedDocument)?;
        let assessment = self.assess_document(&document, as_of);
        let execution_time_seconds = started.elapsed().as_secs_f64();

        info!(
            check_id = document.check_id(),
            overall = %assessment.overall_risk_level,
            cases = assessment.summary.total_cases,
            elapsed_seconds = execution_time_seconds,
            "background check assessed"
        );

        Ok(ScreeningReport {
            checkr_check_id: document.check_id().to_string(),
            checkr_response: response,
            processed_cases: assessment.processed_cases,
            summary: assessment.summary,
            execution_time_seconds,
            person_info,
            recommendation: assessment.recommendation,
            overall_risk_level: assessment.overall_risk_level,
        })
    }
}

/// Midnight at the start of `date`, the instant used for date-only "as of" inputs.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}
