//! End-to-end screening scenarios driven through the public engine facade,
//! with rule tables loaded from disk the way the service loads them.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use record_screen::screening::{
    CheckRequest, RecordSource, RecordSourceError, RiskLevel, RiskTier, RiskTierTable, RuleSet,
    RuleSetError, ScreeningEngine, TierTableError,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 9, 1)
        .expect("valid date")
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
}

fn sample_check() -> Value {
    serde_json::from_str(include_str!("../fixtures/sample_check.json")).expect("fixture is json")
}

struct SingleDocumentSource(Value);

impl RecordSource for SingleDocumentSource {
    fn fetch(&self, _request: &CheckRequest) -> Result<Value, RecordSourceError> {
        Ok(self.0.clone())
    }
}

#[test]
fn rules_load_from_disk_with_the_standard_tier_table() {
    let rules = RuleSet::load(fixture("rules.json"), None).expect("rules load");
    let engine = ScreeningEngine::new(rules);

    let assessment = engine
        .assess_at(&sample_check(), as_of())
        .expect("sample assesses");

    assert_eq!(assessment.overall_risk_level, RiskLevel::Low);
    assert_eq!(assessment.processed_cases.count(RiskLevel::Ignored), 2);
    assert_eq!(assessment.summary.highest_risk_score, 11.25);
}

#[test]
fn tier_csv_overrides_reclassify_charges() {
    let tier_path = fixture("risk_tiers.csv");
    let rules =
        RuleSet::load(fixture("rules.json"), Some(tier_path.as_path())).expect("rules load");

    assert_eq!(
        rules.tiers().lookup("Vehicles & Traffic", "Speeding"),
        RiskTier::Med
    );
    assert_eq!(
        rules.tiers().lookup("Weapons", "Possession"),
        RiskTier::High
    );

    let engine = ScreeningEngine::new(rules);
    let assessment = engine
        .assess_at(&sample_check(), as_of())
        .expect("sample assesses");

    // Med base 15 * petty_offense 2/2 * conviction 1.5 * recency 1.5
    let medium = assessment.processed_cases.get(RiskLevel::Medium);
    assert_eq!(medium.len(), 1);
    assert_eq!(medium[0].risk_score, 33.75);
    assert_eq!(assessment.overall_risk_level, RiskLevel::Medium);
    assert_eq!(
        assessment.recommendation,
        "REVIEW REQUIRED - Medium risk profile. 1 case(s) need manual review before making a decision."
    );
}

#[test]
fn parking_rows_drop_to_unscored() {
    let tier_path = fixture("risk_tiers.csv");
    let rules =
        RuleSet::load(fixture("rules.json"), Some(tier_path.as_path())).expect("rules load");
    let engine = ScreeningEngine::new(rules);

    let document = json!({
        "id": "chk-parking",
        "results": [{
            "category": "Criminal/traffic",
            "cases": [{
                "case_number": "PK-1",
                "charges": [{
                    "offense_date": "20230301",
                    "type": "misdemeanor",
                    "category": "Vehicles & Traffic",
                    "subcategory": "Parking",
                    "dispositions": [{ "disposition_type": "Conviction" }],
                }],
            }],
        }],
    });

    let assessment = engine.assess_at(&document, as_of()).expect("document assesses");

    // Unscored base 10 * 1.5 * 1.5 * 1.5
    assert_eq!(assessment.processed_cases.get(RiskLevel::Medium)[0].risk_score, 33.75);
}

#[test]
fn missing_rule_file_is_a_read_error() {
    let error = RuleSet::load(fixture("absent.json"), None).expect_err("file is missing");

    assert!(matches!(error, RuleSetError::Read { .. }));
}

#[test]
fn descending_thresholds_are_rejected() {
    let mut raw: Value = serde_json::from_str(include_str!("../fixtures/rules.json"))
        .expect("fixture is json");
    raw["scoring_rules"]["thresholds"]["medium_risk"]["min"] = json!(80);

    let error = RuleSet::from_json_str(&raw.to_string()).expect_err("thresholds must ascend");

    assert!(matches!(error, RuleSetError::Invalid(_)));
}

#[test]
fn unknown_tier_labels_in_overrides_fail_to_load() {
    let csv = "category,subcategory,risk_score\nWeapons,,Severe\n";

    let error = RiskTierTable::read_csv(csv.as_bytes())
        .expect_err("tier label is unknown");

    assert!(matches!(error, TierTableError::UnknownTier { .. }));
}

#[test]
fn background_check_report_serializes_with_every_bucket() {
    let engine = ScreeningEngine::new(RuleSet::load(fixture("rules.json"), None).expect("rules"));
    let source = SingleDocumentSource(sample_check());
    let request = CheckRequest {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        dob: Some("1990-01-15".to_string()),
        reference_id: Some("employee-screening-001".to_string()),
        ..CheckRequest::default()
    };

    let report = engine
        .run_background_check_at(&source, request, as_of())
        .expect("check succeeds");
    let payload = serde_json::to_value(&report).expect("report serializes");

    for level in ["Ignored", "Low", "Medium", "High", "Clean"] {
        assert!(payload["processed_cases"][level].is_array(), "missing {level}");
        assert!(payload["summary"]["risk_distribution"][level].is_u64());
    }
    assert_eq!(payload["overall_risk_level"], "Low");
    assert_eq!(payload["person_info"]["processed_at"], "2023-09-01T09:00:00");
}
