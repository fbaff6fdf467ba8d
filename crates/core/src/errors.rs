use thiserror::Error;

use crate::domain::program::ProgramId;
use crate::workflow::ApplicationState;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown benefit program `{}`", .0.as_str())]
    ProgramNotFound(ProgramId),
    #[error("unknown household `{0}`")]
    HouseholdNotFound(String),
    #[error("unknown program category `{0}` (expected federal|state|city|education)")]
    UnknownCategory(String),
    #[error("invalid application transition from {from:?} to {to:?}")]
    InvalidApplicationTransition { from: ApplicationState, to: ApplicationState },
}

#[cfg(test)]
mod tests {
    use super::DomainError;
    use crate::domain::program::ProgramId;

    #[test]
    fn program_not_found_names_the_offending_id() {
        let error = DomainError::ProgramNotFound(ProgramId("snapp".to_string()));
        assert_eq!(error.to_string(), "unknown benefit program `snapp`");
    }
}
