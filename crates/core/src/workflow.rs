use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::household::Household;
use crate::domain::program::ProgramId;
use crate::errors::DomainError;

/// Application lifecycle for one (household, program) pair. Transitions
/// are driven externally, one tool call per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    NotStarted,
    Prefilled,
    AwaitingConfirmation,
    Submitted,
    Pending,
    Approved,
    Waitlist,
    InReview,
}

impl ApplicationState {
    pub fn can_transition_to(&self, next: ApplicationState) -> bool {
        use ApplicationState::*;
        matches!(
            (self, next),
            (NotStarted, Prefilled)
                | (Prefilled, AwaitingConfirmation)
                | (AwaitingConfirmation, Submitted)
                | (Submitted, Pending)
                | (Submitted, Approved)
                | (Submitted, Waitlist)
                | (Submitted, InReview)
                | (Pending, Approved)
                | (InReview, Approved)
                | (Waitlist, Pending)
        )
    }

    pub fn transition_to(&mut self, next: ApplicationState) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            *self = next;
            return Ok(());
        }
        Err(DomainError::InvalidApplicationTransition { from: *self, to: next })
    }
}

// ---------------------------------------------------------------------------
// Prefill
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrefilledDependent {
    pub name: String,
    pub dob: NaiveDate,
    pub age: u32,
    pub school: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrefilledFields {
    pub applicant_name: String,
    pub applicant_dob: NaiveDate,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
    pub household_size: u32,
    pub monthly_income: i64,
    pub annual_income: i64,
    pub employment_status: &'static str,
    pub children: Vec<PrefilledDependent>,
    pub rent_amount: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttentionField {
    pub field: &'static str,
    pub reason: &'static str,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrefillResult {
    pub household_id: String,
    pub program_id: ProgramId,
    pub program_name: &'static str,
    pub prefilled_fields: PrefilledFields,
    pub fields_needing_attention: Vec<AttentionField>,
    pub estimated_completion_time: &'static str,
    pub ready_to_review: bool,
}

/// Projects the household record into an application-shaped structure.
/// Signature and verification consent are never auto-filled.
pub fn prefill(
    catalog: &Catalog,
    household: &Household,
    program_id: &ProgramId,
) -> Result<PrefillResult, DomainError> {
    let program = catalog.find(program_id)?;

    Ok(PrefillResult {
        household_id: household.id.0.clone(),
        program_id: program.id.clone(),
        program_name: program.name,
        prefilled_fields: PrefilledFields {
            applicant_name: household.name.clone(),
            applicant_dob: household.date_of_birth,
            address: format!("{}, {}", household.address.street, household.address.unit),
            city: household.address.city.clone(),
            state: household.address.state.clone(),
            zip: household.address.zip.clone(),
            phone: household.phone.clone(),
            email: household.email.clone(),
            household_size: household.household_size,
            monthly_income: household.monthly_income,
            annual_income: household.annual_income,
            employment_status: household.employment.status.as_str(),
            children: household
                .dependents
                .iter()
                .map(|dependent| PrefilledDependent {
                    name: dependent.name.clone(),
                    dob: dependent.date_of_birth,
                    age: dependent.age,
                    school: dependent.school.clone(),
                })
                .collect(),
            rent_amount: household.rent_amount,
        },
        fields_needing_attention: vec![
            AttentionField {
                field: "signature",
                reason: "Requires your signature",
                required: true,
            },
            AttentionField {
                field: "consent_to_verify",
                reason: "Please check box to consent to income verification",
                required: true,
            },
        ],
        estimated_completion_time: "5 minutes",
        ready_to_review: true,
    })
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub household_id: String,
    pub program_id: ProgramId,
    pub program_name: &'static str,
    pub submission_date: NaiveDate,
    pub confirmation_number: String,
    pub expected_processing_time: &'static str,
    pub next_steps: Vec<&'static str>,
    pub status_check_url: String,
}

/// Submitting without consent is a normal declined outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Declined { reason: &'static str },
    Submitted(SubmissionReceipt),
}

/// Submits an application. Consent gates the submission; a successful
/// submission is recorded in the ledger so later status checks track it.
pub fn submit(
    catalog: &Catalog,
    ledger: &ApplicationLedger,
    household: &Household,
    program_id: &ProgramId,
    consent_given: bool,
) -> Result<SubmissionOutcome, DomainError> {
    let program = catalog.find(program_id)?;

    if !consent_given {
        return Ok(SubmissionOutcome::Declined {
            reason: "Cannot submit without family consent",
        });
    }

    let submission_date = Utc::now().date_naive();
    let confirmation_number = confirmation_number(program_id);
    let status_check_url = format!("https://example.gov/check-status/{confirmation_number}");

    ledger.record_submission(&household.id.0, program_id, submission_date);

    Ok(SubmissionOutcome::Submitted(SubmissionReceipt {
        household_id: household.id.0.clone(),
        program_id: program.id.clone(),
        program_name: program.name,
        submission_date,
        confirmation_number,
        expected_processing_time: program.processing_time,
        next_steps: vec![
            "Watch for confirmation letter in mail within 7 days",
            "Agency may contact you for additional information",
            "Check application status online or call agency",
        ],
        status_check_url,
    }))
}

fn confirmation_number(program_id: &ProgramId) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", program_id.as_str().to_uppercase(), suffix[..6].to_uppercase())
}

// ---------------------------------------------------------------------------
// Status tracking
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusDetail {
    Approved {
        approved_date: NaiveDate,
        benefit_start_date: NaiveDate,
        monthly_amount: i64,
    },
    Pending {
        submitted_date: NaiveDate,
        #[serde(skip_serializing_if = "Option::is_none")]
        expected_decision: Option<NaiveDate>,
    },
    Waitlist {
        submitted_date: NaiveDate,
        waitlist_position: u32,
        estimated_wait: &'static str,
    },
    InReview {
        submitted_date: NaiveDate,
        next_update: NaiveDate,
    },
    NotSubmitted,
}

impl StatusDetail {
    pub fn application_state(&self) -> ApplicationState {
        match self {
            Self::Approved { .. } => ApplicationState::Approved,
            Self::Pending { .. } => ApplicationState::Pending,
            Self::Waitlist { .. } => ApplicationState::Waitlist,
            Self::InReview { .. } => ApplicationState::InReview,
            Self::NotSubmitted => ApplicationState::NotStarted,
        }
    }
}

/// In-memory record of submitted applications per household, in
/// submission order. Status checks derive from this ledger, so a fresh
/// submission is immediately visible as pending.
#[derive(Debug, Default)]
pub struct ApplicationLedger {
    records: Mutex<HashMap<String, Vec<(ProgramId, StatusDetail)>>>,
}

impl ApplicationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-loaded with the demo household's application history.
    pub fn seeded() -> Self {
        let ledger = Self::new();
        let seed = [
            (
                "snap",
                StatusDetail::Approved {
                    approved_date: naive(2024, 11, 20),
                    benefit_start_date: naive(2024, 12, 1),
                    monthly_amount: 740,
                },
            ),
            (
                "medicaid",
                StatusDetail::Approved {
                    approved_date: naive(2024, 11, 24),
                    benefit_start_date: naive(2024, 12, 1),
                    monthly_amount: 850,
                },
            ),
            (
                "wic",
                StatusDetail::Approved {
                    approved_date: naive(2024, 11, 22),
                    benefit_start_date: naive(2024, 12, 1),
                    monthly_amount: 47,
                },
            ),
            (
                "tafdc",
                StatusDetail::Pending {
                    submitted_date: naive(2024, 11, 18),
                    expected_decision: Some(naive(2024, 12, 15)),
                },
            ),
            (
                "section8",
                StatusDetail::Waitlist {
                    submitted_date: naive(2024, 11, 19),
                    waitlist_position: 2847,
                    estimated_wait: "2-3 years",
                },
            ),
            (
                "fuel_assist",
                StatusDetail::InReview {
                    submitted_date: naive(2024, 11, 20),
                    next_update: naive(2024, 12, 5),
                },
            ),
        ];
        for (program_id, detail) in seed {
            ledger.upsert("PARENT_001", &ProgramId::new(program_id), detail);
        }
        ledger
    }

    /// A new submission replaces any previously tracked state: a
    /// resubmission restarts processing from pending.
    pub fn record_submission(
        &self,
        household_id: &str,
        program_id: &ProgramId,
        submitted_date: NaiveDate,
    ) {
        self.upsert(
            household_id,
            program_id,
            StatusDetail::Pending { submitted_date, expected_decision: None },
        );
    }

    pub fn status_of(&self, household_id: &str, program_id: &ProgramId) -> StatusDetail {
        let records = self.records.lock().expect("ledger lock poisoned");
        records
            .get(household_id)
            .and_then(|entries| {
                entries.iter().find(|(id, _)| id == program_id).map(|(_, detail)| detail.clone())
            })
            .unwrap_or(StatusDetail::NotSubmitted)
    }

    /// Programs with a tracked application for this household, in
    /// first-submission order.
    pub fn tracked_programs(&self, household_id: &str) -> Vec<ProgramId> {
        let records = self.records.lock().expect("ledger lock poisoned");
        records
            .get(household_id)
            .map(|entries| entries.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    fn upsert(&self, household_id: &str, program_id: &ProgramId, detail: StatusDetail) {
        let mut records = self.records.lock().expect("ledger lock poisoned");
        let entries = records.entry(household_id.to_string()).or_default();
        if let Some(entry) = entries.iter_mut().find(|(id, _)| id == program_id) {
            entry.1 = detail;
        } else {
            entries.push((program_id.clone(), detail));
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    pub program_id: ProgramId,
    pub program_name: &'static str,
    #[serde(flatten)]
    pub detail: StatusDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub approved: usize,
    pub pending: usize,
    pub waitlist: usize,
    pub not_submitted: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub household_id: String,
    pub check_date: NaiveDate,
    pub applications_checked: usize,
    pub statuses: Vec<StatusResult>,
    pub summary: StatusSummary,
}

/// Reports application status for the selected programs. An empty
/// selection checks everything tracked for the household. Pending and
/// in-review land in the same summary bucket.
pub fn check_status(
    catalog: &Catalog,
    ledger: &ApplicationLedger,
    household: &Household,
    program_ids: &[ProgramId],
) -> Result<StatusReport, DomainError> {
    let selection: Vec<ProgramId> = if program_ids.is_empty() {
        ledger.tracked_programs(&household.id.0)
    } else {
        program_ids.to_vec()
    };

    let statuses: Vec<StatusResult> = selection
        .iter()
        .map(|program_id| {
            let program = catalog.find(program_id)?;
            Ok(StatusResult {
                program_id: program.id.clone(),
                program_name: program.name,
                detail: ledger.status_of(&household.id.0, program_id),
            })
        })
        .collect::<Result<_, DomainError>>()?;

    let summary = StatusSummary {
        approved: count_matching(&statuses, |d| matches!(d, StatusDetail::Approved { .. })),
        pending: count_matching(&statuses, |d| {
            matches!(d, StatusDetail::Pending { .. } | StatusDetail::InReview { .. })
        }),
        waitlist: count_matching(&statuses, |d| matches!(d, StatusDetail::Waitlist { .. })),
        not_submitted: count_matching(&statuses, |d| matches!(d, StatusDetail::NotSubmitted)),
    };

    Ok(StatusReport {
        household_id: household.id.0.clone(),
        check_date: Utc::now().date_naive(),
        applications_checked: statuses.len(),
        statuses,
        summary,
    })
}

fn count_matching(statuses: &[StatusResult], predicate: impl Fn(&StatusDetail) -> bool) -> usize {
    statuses.iter().filter(|status| predicate(&status.detail)).count()
}

fn naive(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("static date literal")
}

#[cfg(test)]
mod tests {
    use super::{
        check_status, prefill, submit, ApplicationLedger, ApplicationState, StatusDetail,
        SubmissionOutcome,
    };
    use crate::catalog::standard_catalog;
    use crate::domain::household::sample_household;
    use crate::domain::program::ProgramId;
    use crate::errors::DomainError;

    #[test]
    fn lifecycle_transitions_follow_the_table() {
        let mut state = ApplicationState::NotStarted;
        state.transition_to(ApplicationState::Prefilled).expect("prefill");
        state.transition_to(ApplicationState::AwaitingConfirmation).expect("review");
        state.transition_to(ApplicationState::Submitted).expect("submit");
        state.transition_to(ApplicationState::Pending).expect("pending");
        state.transition_to(ApplicationState::Approved).expect("approve");
    }

    #[test]
    fn skipping_review_is_rejected() {
        let mut state = ApplicationState::Prefilled;
        let error = state
            .transition_to(ApplicationState::Submitted)
            .expect_err("prefilled -> submitted must fail");
        assert!(matches!(error, DomainError::InvalidApplicationTransition { .. }));
    }

    #[test]
    fn prefill_projects_household_fields_and_flags_consent() {
        let catalog = standard_catalog();
        let household = sample_household();
        let result = prefill(&catalog, &household, &ProgramId::new("snap")).expect("prefill");

        assert_eq!(result.prefilled_fields.applicant_name, "Maria Santos");
        assert_eq!(result.prefilled_fields.address, "42 Woodrow Avenue, 2R");
        assert_eq!(result.prefilled_fields.household_size, 3);
        assert_eq!(result.prefilled_fields.children.len(), 2);
        assert_eq!(result.prefilled_fields.rent_amount, 1800);
        assert!(result.ready_to_review);

        let attention: Vec<&str> =
            result.fields_needing_attention.iter().map(|field| field.field).collect();
        assert_eq!(attention, vec!["signature", "consent_to_verify"]);
    }

    #[test]
    fn prefill_rejects_unknown_programs() {
        let catalog = standard_catalog();
        let household = sample_household();
        let result = prefill(&catalog, &household, &ProgramId::new("nothing"));
        assert!(matches!(result, Err(DomainError::ProgramNotFound(_))));
    }

    #[test]
    fn submit_without_consent_is_declined_with_no_confirmation() {
        let catalog = standard_catalog();
        let ledger = ApplicationLedger::new();
        let household = sample_household();

        let outcome =
            submit(&catalog, &ledger, &household, &ProgramId::new("snap"), false).expect("submit");
        assert!(matches!(outcome, SubmissionOutcome::Declined { .. }));
        assert!(ledger.tracked_programs("PARENT_001").is_empty());
    }

    #[test]
    fn submit_with_consent_issues_a_prefixed_confirmation_number() {
        let catalog = standard_catalog();
        let ledger = ApplicationLedger::new();
        let household = sample_household();

        let outcome =
            submit(&catalog, &ledger, &household, &ProgramId::new("snap"), true).expect("submit");
        let receipt = match outcome {
            SubmissionOutcome::Submitted(receipt) => receipt,
            SubmissionOutcome::Declined { .. } => panic!("expected submission"),
        };

        assert!(receipt.confirmation_number.starts_with("SNAP-"));
        assert!(receipt.confirmation_number.len() > "SNAP-".len());
        assert_eq!(receipt.expected_processing_time, "7-30 days");
        assert!(receipt.status_check_url.ends_with(&receipt.confirmation_number));
    }

    #[test]
    fn status_derives_from_submission_state() {
        let catalog = standard_catalog();
        let ledger = ApplicationLedger::new();
        let household = sample_household();
        let program = ProgramId::new("mrvp");

        let before = check_status(&catalog, &ledger, &household, &[program.clone()])
            .expect("status before");
        assert!(matches!(before.statuses[0].detail, StatusDetail::NotSubmitted));

        submit(&catalog, &ledger, &household, &program, true).expect("submit");

        let after = check_status(&catalog, &ledger, &household, &[program.clone()])
            .expect("status after");
        assert!(matches!(after.statuses[0].detail, StatusDetail::Pending { .. }));
        assert_eq!(after.summary.pending, 1);
        assert_eq!(after.summary.not_submitted, 0);
    }

    #[test]
    fn empty_selection_checks_all_tracked_applications() {
        let catalog = standard_catalog();
        let ledger = ApplicationLedger::seeded();
        let household = sample_household();

        let report = check_status(&catalog, &ledger, &household, &[]).expect("status");
        assert_eq!(report.applications_checked, 6);
        assert_eq!(report.summary.approved, 3);
        // tafdc pending plus fuel_assist in review share a bucket.
        assert_eq!(report.summary.pending, 2);
        assert_eq!(report.summary.waitlist, 1);
        assert_eq!(report.summary.not_submitted, 0);
        assert_eq!(report.statuses[0].program_id, ProgramId::new("snap"));
    }

    #[test]
    fn untracked_programs_report_not_submitted() {
        let catalog = standard_catalog();
        let ledger = ApplicationLedger::seeded();
        let household = sample_household();

        let report =
            check_status(&catalog, &ledger, &household, &[ProgramId::new("cc_tuition")])
                .expect("status");
        assert!(matches!(report.statuses[0].detail, StatusDetail::NotSubmitted));
        assert_eq!(report.summary.not_submitted, 1);
    }

    #[test]
    fn status_detail_maps_to_application_states() {
        assert_eq!(
            StatusDetail::NotSubmitted.application_state(),
            ApplicationState::NotStarted
        );
        let approved = StatusDetail::Approved {
            approved_date: super::naive(2024, 11, 20),
            benefit_start_date: super::naive(2024, 12, 1),
            monthly_amount: 740,
        };
        assert_eq!(approved.application_state(), ApplicationState::Approved);
    }
}
