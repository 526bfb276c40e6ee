pub mod collaborators;
pub mod config;
pub mod error;
pub mod form;
pub mod lab_request;
pub mod patient_service;
pub mod services;

pub use collaborators::{CatalogTranslator, TracingNotifier};
pub use error::{DeleteError, LabRequestError, SaveError};
pub use form::{LabRequestForm, ProfileExpansion};
pub use lab_request::{
    ActivationReport, DeleteOutcome, InitialLoad, InitialLoadFailure, LabRequestContext,
    LabRequestController, LabRequestServices, LabRequestState, TestOrderDetail,
};
pub use patient_service::{PatientService, RestPatientService};
