pub mod benefits;
pub mod catalog;
pub mod changes;
pub mod config;
pub mod documents;
pub mod domain;
pub mod eligibility;
pub mod errors;
pub mod workflow;

pub use benefits::{BenefitAmount, BenefitStatement};
pub use catalog::{standard_catalog, Catalog};
pub use changes::{ChangeKind, ChangeReport, HouseholdChange};
pub use documents::{DocumentChecklist, ProgramDocuments};
pub use domain::household::{
    sample_household, Dependent, Household, HouseholdDirectory, HouseholdId,
};
pub use domain::program::{
    AmountModel, BenefitRule, Category, IncomeLimitRule, Program, ProgramId, SizeBracket,
};
pub use eligibility::{EligibilityReport, EligibilityResult};
pub use errors::DomainError;
pub use workflow::{
    ApplicationLedger, ApplicationState, PrefillResult, StatusDetail, StatusReport,
    SubmissionOutcome, SubmissionReceipt,
};
