//! Collaborators the lab request workflow talks to.
//!
//! Transport, authentication and wire mapping live behind these traits.

use async_trait::async_trait;
use shared::{
    domain::{LabTest, Location, Provider, TestProfile, Visit},
    error::ServiceError,
    protocol::{NewTestOrder, TestOrder},
};

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait ProviderService: Send + Sync {
    async fn providers(&self) -> ServiceResult<Vec<Provider>>;
}

#[async_trait]
pub trait TestCatalogService: Send + Sync {
    async fn tests(&self) -> ServiceResult<Vec<LabTest>>;
}

#[async_trait]
pub trait TestProfileService: Send + Sync {
    async fn test_profiles(&self) -> ServiceResult<Vec<TestProfile>>;
}

#[async_trait]
pub trait SessionService: Send + Sync {
    async fn current_provider(&self) -> ServiceResult<Provider>;
    fn current_location(&self) -> Location;
}

#[async_trait]
pub trait VisitService: Send + Sync {
    async fn todays_visit(&self, patient_uuid: &str) -> ServiceResult<Option<Visit>>;
}

#[async_trait]
pub trait TestOrderService: Send + Sync {
    async fn test_orders_by_patient(&self, patient_uuid: &str) -> ServiceResult<Vec<TestOrder>>;
    async fn create(&self, order: NewTestOrder) -> ServiceResult<TestOrder>;
    async fn delete_test_order(&self, encounter_uuid: &str, test_uuid: &str) -> ServiceResult<()>;
}

pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}
