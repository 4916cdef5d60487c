use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const NOT_APPLICABLE: &str = "N/A";

/// Record document returned by the background-check provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<RecordGroup>>,
}

impl RecordDocument {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Check identifier, `"unknown"` when the provider omitted it.
    pub fn check_id(&self) -> &str {
        self.id.as_deref().unwrap_or("unknown")
    }
}

/// One result group; its category gates every case beneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordGroup {
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cases: Vec<CaseRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub case_number: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub charges: Vec<ChargeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub offense_date: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub charge_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dispositions: Vec<DispositionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispositionEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub disposition_type: Option<String>,
}

/// Providers are inconsistent about scalar types, so any scalar is read as text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a scalar value, found {other}"
            )))
        }
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalized charge: the unit every screening decision is made on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub case_number: String,
    pub offense_date: String,
    pub charge_type: String,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    pub disposition: String,
}

impl Charge {
    pub fn from_record(case_number: &str, record: &ChargeRecord) -> Self {
        let disposition = record
            .dispositions
            .first()
            .and_then(|entry| entry.disposition_type.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            case_number: case_number.to_string(),
            offense_date: record.offense_date.clone().unwrap_or_default(),
            charge_type: record
                .charge_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            category: record
                .category
                .clone()
                .unwrap_or_else(|| "unclassified".to_string()),
            subcategory: record.subcategory.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            disposition,
        }
    }

    /// Offense date parsed from `YYYYMMDD`; `None` when it is not exactly that shape.
    pub fn offense_date(&self) -> Option<NaiveDate> {
        parse_compact_date(&self.offense_date)
    }
}

pub(crate) fn parse_compact_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
}

/// Per-charge and per-person classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Ignored,
    Low,
    Medium,
    High,
    Clean,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Ignored,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Clean,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Ignored => "Ignored",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Clean => "Clean",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a charge was left out of scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    OutsideLookback { years: u32 },
    ChargeTypeDisabled(String),
    DispositionDisabled(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::OutsideLookback { years } => {
                write!(f, "Outside {years}-year lookback period")
            }
            IgnoreReason::ChargeTypeDisabled(charge_type) => {
                write!(f, "Charge type '{charge_type}' not enabled in configuration")
            }
            IgnoreReason::DispositionDisabled(disposition) => {
                write!(f, "Disposition '{disposition}' not enabled in configuration")
            }
        }
    }
}

pub const PROCESSED_REASON: &str = "Processed successfully";

/// Decision record emitted for every charge, plus the synthetic clean entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedCase {
    pub case_number: String,
    pub charge_description: String,
    pub offense_date: String,
    pub charge_type: String,
    pub disposition: String,
    pub category: String,
    pub subcategory: String,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub reason: String,
}

impl ProcessedCase {
    pub(crate) fn ignored(charge: Charge, reason: &IgnoreReason) -> Self {
        Self::from_charge(charge, RiskLevel::Ignored, 0.0, reason.to_string())
    }

    pub(crate) fn scored(charge: Charge, risk_level: RiskLevel, risk_score: f64) -> Self {
        Self::from_charge(charge, risk_level, risk_score, PROCESSED_REASON.to_string())
    }

    pub(crate) fn clean(description: &str, reason: &str) -> Self {
        Self {
            case_number: NOT_APPLICABLE.to_string(),
            charge_description: description.to_string(),
            offense_date: NOT_APPLICABLE.to_string(),
            charge_type: NOT_APPLICABLE.to_string(),
            disposition: NOT_APPLICABLE.to_string(),
            category: NOT_APPLICABLE.to_string(),
            subcategory: NOT_APPLICABLE.to_string(),
            risk_level: RiskLevel::Clean,
            risk_score: 0.0,
            reason: reason.to_string(),
        }
    }

    fn from_charge(charge: Charge, risk_level: RiskLevel, risk_score: f64, reason: String) -> Self {
        Self {
            case_number: charge.case_number,
            charge_description: charge.description,
            offense_date: charge.offense_date,
            charge_type: charge.charge_type,
            disposition: charge.disposition,
            category: charge.category,
            subcategory: charge.subcategory,
            risk_level,
            risk_score,
            reason,
        }
    }
}

/// Person-identifying input handed to the record source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl PostalAddress {
    fn normalized(self) -> Option<Self> {
        let address = Self {
            street: trimmed(self.street),
            city: trimmed(self.city),
            state: trimmed(self.state),
            zip_code: trimmed(self.zip_code),
        };
        if address == Self::default() {
            None
        } else {
            Some(address)
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CheckRequestError {
    #[error("first name is required")]
    MissingFirstName,
    #[error("last name is required")]
    MissingLastName,
    #[error("invalid date of birth '{0}': expected YYYY-MM-DD or YYYYMMDD")]
    InvalidDob(String),
}

impl CheckRequest {
    /// Trims every field, drops blank optionals, and rewrites `dob` as `YYYYMMDD`.
    pub fn normalized(self) -> Result<Self, CheckRequestError> {
        let first_name = self.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(CheckRequestError::MissingFirstName);
        }
        let last_name = self.last_name.trim().to_string();
        if last_name.is_empty() {
            return Err(CheckRequestError::MissingLastName);
        }

        let dob = trimmed(self.dob).map(|raw| compact_dob(&raw)).transpose()?;

        Ok(Self {
            first_name,
            last_name,
            middle_name: trimmed(self.middle_name),
            dob,
            ssn: trimmed(self.ssn),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            address: self.address.and_then(PostalAddress::normalized),
            reference_id: trimmed(self.reference_id),
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn compact_dob(raw: &str) -> Result<String, CheckRequestError> {
    if raw.len() == 8 && raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Ok(raw.to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.format("%Y%m%d").to_string())
        .map_err(|_| CheckRequestError::InvalidDob(raw.to_string()))
}

/// Person details echoed back on every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInfo {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub reference_id: String,
    pub processed_at: String,
}
