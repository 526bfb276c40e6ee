//! Patient lookups against the OpenMRS REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Patient, PatientIdentifier, PatientIdentifierType},
    error::{ErrorCode, RestErrorEnvelope, ServiceError},
    protocol::ResultsPage,
};
use tracing::{debug, error};
use url::Url;

use crate::{config::Settings, services::ServiceResult};

const FULL_REPRESENTATION: (&str, &str) = ("v", "full");

#[async_trait]
pub trait PatientService: Send + Sync {
    async fn search(&self, query: &str) -> ServiceResult<Vec<Patient>>;
    async fn get_patient(&self, patient_uuid: &str) -> ServiceResult<Patient>;
    async fn identifier_types(&self) -> ServiceResult<Vec<PatientIdentifierType>>;
    async fn patient_identifiers(&self, patient_uuid: &str)
        -> ServiceResult<Vec<PatientIdentifier>>;
    async fn update_patient_identifier(
        &self,
        patient_uuid: &str,
        identifier_uuid: &str,
        identifier: &PatientIdentifier,
    ) -> ServiceResult<PatientIdentifier>;
}

pub struct RestPatientService {
    http: Client,
    rest_url: Url,
}

impl RestPatientService {
    /// `rest_url` must end with a slash, as [`Settings::rest_url`] returns it.
    pub fn new(http: Client, rest_url: Url) -> Self {
        Self { http, rest_url }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self::new(http, settings.rest_url()?))
    }

    fn endpoint(&self, path: &str) -> ServiceResult<Url> {
        self.rest_url.join(path).map_err(|err| {
            ServiceError::new(
                ErrorCode::Internal,
                format!("invalid resource path '{path}': {err}"),
            )
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ServiceResult<T> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| ServiceError::transport(err.to_string()))?;
        let response = check_status(response).await?;
        response.json::<T>().await.map_err(|err| {
            ServiceError::new(ErrorCode::Internal, format!("malformed response: {err}"))
        })
    }
}

async fn check_status(response: Response) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = match serde_json::from_str::<RestErrorEnvelope>(&body) {
        Ok(envelope) => envelope.into_service_error(status.as_u16()),
        Err(_) => ServiceError::new(
            ErrorCode::from_status(status.as_u16()),
            format!("request failed with status {status}"),
        ),
    };
    Err(err)
}

#[async_trait]
impl PatientService for RestPatientService {
    async fn search(&self, query: &str) -> ServiceResult<Vec<Patient>> {
        let url = self.endpoint("patient")?;
        let page: ResultsPage<Patient> = self
            .send(self.http.get(url).query(&[
                ("q", query),
                ("identifier", query),
                FULL_REPRESENTATION,
            ]))
            .await?;
        debug!(query, matches = page.results.len(), "patient search finished");
        Ok(page.results)
    }

    async fn get_patient(&self, patient_uuid: &str) -> ServiceResult<Patient> {
        let url = self.endpoint(&format!("patient/{patient_uuid}"))?;
        self.send(self.http.get(url).query(&[FULL_REPRESENTATION]))
            .await
            .inspect_err(|err| {
                error!(patient_uuid, error = %err, "request failed for get_patient");
            })
    }

    async fn identifier_types(&self) -> ServiceResult<Vec<PatientIdentifierType>> {
        let url = self.endpoint("patientidentifiertype")?;
        let page: ResultsPage<PatientIdentifierType> = self
            .send(self.http.get(url).query(&[FULL_REPRESENTATION]))
            .await?;
        Ok(page.results)
    }

    async fn patient_identifiers(
        &self,
        patient_uuid: &str,
    ) -> ServiceResult<Vec<PatientIdentifier>> {
        let url = self.endpoint(&format!("patient/{patient_uuid}/identifier"))?;
        let page: ResultsPage<PatientIdentifier> = self.send(self.http.get(url)).await?;
        Ok(page.results)
    }

    async fn update_patient_identifier(
        &self,
        patient_uuid: &str,
        identifier_uuid: &str,
        identifier: &PatientIdentifier,
    ) -> ServiceResult<PatientIdentifier> {
        let url = self.endpoint(&format!(
            "patient/{patient_uuid}/identifier/{identifier_uuid}"
        ))?;
        self.send(self.http.post(url).json(identifier)).await
    }
}

#[cfg(test)]
#[path = "tests/patient_service_tests.rs"]
mod tests;
