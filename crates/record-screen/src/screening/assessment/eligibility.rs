use chrono::{Duration, NaiveDateTime, NaiveTime};

use super::super::domain::{Charge, IgnoreReason};
use super::super::rules::RuleSet;

/// Outcome of the admission checks for a single charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ignored(IgnoreReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    pub fn reason(&self) -> Option<&IgnoreReason> {
        match self {
            Eligibility::Eligible => None,
            Eligibility::Ignored(reason) => Some(reason),
        }
    }
}

/// Decides whether a charge is admitted into scoring.
///
/// Checks run in a fixed order and the first failure wins: lookback window,
/// charge type, then disposition. Unknown keys and unreadable dates fail
/// closed.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityFilter<'a> {
    rules: &'a RuleSet,
    cutoff: NaiveDateTime,
}

impl<'a> EligibilityFilter<'a> {
    pub fn new(rules: &'a RuleSet, as_of: NaiveDateTime) -> Self {
        let cutoff = Duration::try_days(rules.lookback().days())
            .and_then(|window| as_of.checked_sub_signed(window))
            .unwrap_or(NaiveDateTime::MIN);
        Self { rules, cutoff }
    }

    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    /// Record categories gate whole result groups, one level above charges.
    pub fn is_record_category_enabled(&self, category: &str) -> bool {
        self.rules.is_record_category_enabled(category)
    }

    pub fn is_within_lookback(&self, charge: &Charge) -> bool {
        charge
            .offense_date()
            .map(|date| date.and_time(NaiveTime::default()) >= self.cutoff)
            .unwrap_or(false)
    }

    pub fn check(&self, charge: &Charge) -> Eligibility {
        if !self.is_within_lookback(charge) {
            return Eligibility::Ignored(IgnoreReason::OutsideLookback {
                years: self.rules.lookback().years,
            });
        }

        if !self.rules.is_charge_type_enabled(&charge.charge_type) {
            return Eligibility::Ignored(IgnoreReason::ChargeTypeDisabled(
                charge.charge_type.clone(),
            ));
        }

        if !self.rules.is_disposition_enabled(&charge.disposition) {
            return Eligibility::Ignored(IgnoreReason::DispositionDisabled(
                charge.disposition.clone(),
            ));
        }

        Eligibility::Eligible
    }
}
