use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use record_screen::screening::{CheckRequest, RecordSource, RecordSourceError, ScreeningError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

pub(crate) const SAMPLE_REFERENCE_ID: &str = "employee-screening-001";

const SAMPLE_DOCUMENT: &str =
    include_str!("../../../crates/record-screen/fixtures/sample_check.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Record documents held in memory, keyed by the caller's reference id.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordSource {
    documents: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryRecordSource {
    /// Source preloaded with the sample provider response.
    pub(crate) fn seeded() -> Result<Self, ScreeningError> {
        let document =
            serde_json::from_str(SAMPLE_DOCUMENT).map_err(ScreeningError::MalformedDocument)?;
        let source = Self::default();
        source
            .insert(SAMPLE_REFERENCE_ID, document)
            .map_err(|err| ScreeningError::Source {
                elapsed_seconds: 0.0,
                source: err,
            })?;
        Ok(source)
    }

    pub(crate) fn insert(
        &self,
        reference_id: &str,
        document: Value,
    ) -> Result<(), RecordSourceError> {
        let mut guard = self.documents.write().map_err(|_| poisoned())?;
        guard.insert(reference_id.to_string(), document);
        Ok(())
    }
}

impl RecordSource for InMemoryRecordSource {
    fn fetch(&self, request: &CheckRequest) -> Result<Value, RecordSourceError> {
        let key = request.reference_id.as_deref().unwrap_or_default();
        let guard = self.documents.read().map_err(|_| poisoned())?;
        guard
            .get(key)
            .cloned()
            .ok_or_else(|| RecordSourceError::NotFound(key.to_string()))
    }
}

fn poisoned() -> RecordSourceError {
    RecordSourceError::Unavailable("record store lock poisoned".to_string())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
