use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::household::{EmploymentStatus, Household};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    EmploymentStatus,
    MonthlyIncome,
}

/// One detected change in household circumstances. Previous/current are
/// loosely typed because changes mix status strings and dollar figures.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HouseholdChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub previous_value: Value,
    pub current_value: Value,
    pub change_date: NaiveDate,
    pub trigger_scan: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeReport {
    pub household_id: String,
    pub changes_detected: Vec<HouseholdChange>,
    pub scan_recommended: bool,
    pub reason: String,
}

/// Derives eligibility-triggering changes from the employment record: a
/// household that is no longer employed surfaces both the status change
/// and the income drop from its last employed salary.
pub fn detect(household: &Household) -> ChangeReport {
    let mut changes_detected = Vec::new();

    if household.employment.status != EmploymentStatus::Employed {
        changes_detected.push(HouseholdChange {
            kind: ChangeKind::EmploymentStatus,
            previous_value: json!("employed"),
            current_value: json!(household.employment.status.as_str()),
            change_date: household.employment.last_employment_date,
            trigger_scan: true,
        });

        let previous_monthly = (household.employment.last_annual_income as f64 / 12.0).round() as i64;
        if previous_monthly != household.monthly_income {
            changes_detected.push(HouseholdChange {
                kind: ChangeKind::MonthlyIncome,
                previous_value: json!(previous_monthly),
                current_value: json!(household.monthly_income),
                change_date: household.employment.last_employment_date,
                trigger_scan: previous_monthly > household.monthly_income,
            });
        }
    }

    let scan_recommended = changes_detected.iter().any(|change| change.trigger_scan);
    let reason = if scan_recommended {
        "Significant income reduction and employment status change detected. \
         Household likely now eligible for additional benefits."
            .to_string()
    } else {
        "No eligibility-triggering changes detected.".to_string()
    };

    ChangeReport {
        household_id: household.id.0.clone(),
        changes_detected,
        scan_recommended,
        reason,
    }
}
