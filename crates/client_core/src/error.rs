use shared::error::ServiceError;
use thiserror::Error;

/// Validation signals raised by the lab request form.
///
/// Each one carries only its message key; callers translate the key before
/// showing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LabRequestError {
    #[error("no provider selected")]
    SelectProviderFromList,
    #[error("no tests selected")]
    AddAtLeastOneTestToTestOrder,
    #[error("no test chosen to add")]
    SelectTestFromList,
    #[error("no profile chosen to add")]
    SelectProfileFromList,
    #[error("test already added")]
    TestAlreadyAdded,
    #[error("date is after today")]
    DateInFuture,
}

impl LabRequestError {
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::SelectProviderFromList => "SELECT_PROVIDER_FROM_LIST",
            Self::AddAtLeastOneTestToTestOrder => "ADD_AT_LEAST_ONE_TEST_TO_TEST_ORDER",
            Self::SelectTestFromList => "SELECT_TEST_FROM_LIST",
            Self::SelectProfileFromList => "SELECT_PROFILE_FROM_LIST",
            Self::TestAlreadyAdded => "TEST_ALREADY_ADDED",
            Self::DateInFuture => "DATE_IN_FUTURE",
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("test order request is invalid: {0}")]
    Validation(#[from] LabRequestError),
    #[error("test order submission failed: {0}")]
    Remote(#[from] ServiceError),
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("no test order is open in the detail view")]
    NoOrderInDetail,
    #[error("test deletion failed: {0}")]
    Remote(#[from] ServiceError),
}
