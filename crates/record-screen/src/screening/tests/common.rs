use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use crate::screening::domain::{Charge, CheckRequest, ProcessedCase, RiskLevel};
use crate::screening::engine::{RecordSource, RecordSourceError};
use crate::screening::rules::RuleSet;

pub(super) const RULES_JSON: &str = include_str!("../../../fixtures/rules.json");
pub(super) const SAMPLE_CHECK_JSON: &str = include_str!("../../../fixtures/sample_check.json");

pub(super) fn rules() -> RuleSet {
    RuleSet::from_json_str(RULES_JSON).expect("fixture rules load")
}

/// Fixture rules with an in-place edit applied to the raw document.
pub(super) fn rules_with(edit: impl FnOnce(&mut Value)) -> RuleSet {
    let mut raw: Value = serde_json::from_str(RULES_JSON).expect("fixture is json");
    edit(&mut raw);
    RuleSet::from_json_str(&raw.to_string()).expect("edited rules load")
}

pub(super) fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 9, 1)
        .expect("valid date")
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
}

pub(super) fn sample_check() -> Value {
    serde_json::from_str(SAMPLE_CHECK_JSON).expect("sample check is json")
}

pub(super) fn charge(
    offense_date: &str,
    charge_type: &str,
    category: &str,
    subcategory: &str,
    disposition: &str,
) -> Charge {
    Charge {
        case_number: "CR-2023-0001".to_string(),
        offense_date: offense_date.to_string(),
        charge_type: charge_type.to_string(),
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        description: format!("{category} / {subcategory}"),
        disposition: disposition.to_string(),
    }
}

pub(super) fn charge_json(
    offense_date: &str,
    charge_type: &str,
    category: &str,
    subcategory: &str,
    disposition: &str,
) -> Value {
    json!({
        "offense_date": offense_date,
        "type": charge_type,
        "category": category,
        "subcategory": subcategory,
        "description": format!("{category} / {subcategory}"),
        "dispositions": [{ "disposition_type": disposition }],
    })
}

pub(super) fn group(record_category: &str, case_number: &str, charges: Vec<Value>) -> Value {
    json!({
        "category": record_category,
        "cases": [{ "case_number": case_number, "charges": charges }],
    })
}

pub(super) fn document(groups: Vec<Value>) -> Value {
    json!({ "id": "chk-test-001", "results": groups })
}

pub(super) fn levels(cases: &[ProcessedCase]) -> Vec<RiskLevel> {
    cases.iter().map(|case| case.risk_level).collect()
}

pub(super) fn person(reference_id: &str) -> CheckRequest {
    CheckRequest {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        dob: Some("1990-01-15".to_string()),
        reference_id: Some(reference_id.to_string()),
        ..CheckRequest::default()
    }
}

/// Record source serving canned documents by reference id.
#[derive(Default)]
pub(super) struct CannedSource {
    documents: HashMap<String, Value>,
    pub(super) requests: Mutex<Vec<CheckRequest>>,
}

impl CannedSource {
    pub(super) fn with(reference_id: &str, document: Value) -> Self {
        let mut documents = HashMap::new();
        documents.insert(reference_id.to_string(), document);
        Self {
            documents,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl RecordSource for CannedSource {
    fn fetch(&self, request: &CheckRequest) -> Result<Value, RecordSourceError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        let key = request.reference_id.clone().unwrap_or_default();
        self.documents
            .get(&key)
            .cloned()
            .ok_or(RecordSourceError::NotFound(key))
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
