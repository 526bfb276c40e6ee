//! Lab test order workflow for a single patient.
//!
//! The controller owns the form being filled in, the catalogs it picks from
//! and the patient's existing orders. Every user-facing failure is translated
//! and pushed to the [`Notifier`].

use std::{future::Future, sync::Arc};

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use shared::{
    domain::{LabTest, Provider, Reference, TestProfile},
    error::{ErrorCode, ServiceError},
    protocol::{NewTestOrder, TestOrder, TestOrderItem},
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    error::{DeleteError, LabRequestError, SaveError},
    form::{LabRequestForm, ProfileExpansion},
    services::{
        Notifier, ProviderService, ServiceResult, SessionService, TestCatalogService,
        TestOrderService, TestProfileService, Translator, VisitService,
    },
};

pub const SUCCESS_MESSAGE_KEY: &str = "COMMON_MESSAGE_SUCCESS_ACTION_COMPLETED";

/// Patient and request kind the workflow was opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabRequestContext {
    pub patient_uuid: String,
    /// Requests raised outside the clinic need an explicit provider and date.
    pub external_request: bool,
}

#[derive(Clone)]
pub struct LabRequestServices {
    pub providers: Arc<dyn ProviderService>,
    pub tests: Arc<dyn TestCatalogService>,
    pub profiles: Arc<dyn TestProfileService>,
    pub session: Arc<dyn SessionService>,
    pub visits: Arc<dyn VisitService>,
    pub test_orders: Arc<dyn TestOrderService>,
    pub translator: Arc<dyn Translator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Existing order currently open for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOrderDetail {
    pub order: TestOrder,
    pub items: Vec<TestOrderItem>,
}

#[derive(Debug, Clone, Default)]
pub struct LabRequestState {
    pub providers: Vec<Provider>,
    pub profiles: Vec<TestProfile>,
    pub tests: Vec<LabTest>,
    pub session_provider_uuid: Option<String>,
    pub patient_checked_in: bool,
    pub existing_test_orders: Vec<TestOrder>,
    pub form: LabRequestForm,
    pub detail: Option<TestOrderDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialLoad {
    Providers,
    TestProfiles,
    Tests,
    SessionProvider,
    ExistingTestOrders,
    TodaysVisit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialLoadFailure {
    pub load: InitialLoad,
    pub error: ServiceError,
}

/// Outcome of [`LabRequestController::activate`]. Loads fail independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub failures: Vec<InitialLoadFailure>,
}

impl ActivationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, load: InitialLoad) -> bool {
        self.failures.iter().any(|failure| failure.load == load)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The deleted item was the order's last one, so the order itself is gone
    /// and the order list was reloaded.
    pub order_removed: bool,
}

pub struct LabRequestController {
    context: LabRequestContext,
    services: LabRequestServices,
    state: Mutex<LabRequestState>,
}

impl LabRequestController {
    pub fn new(context: LabRequestContext, services: LabRequestServices) -> Arc<Self> {
        Arc::new(Self {
            context,
            services,
            state: Mutex::new(LabRequestState::default()),
        })
    }

    pub fn context(&self) -> &LabRequestContext {
        &self.context
    }

    pub async fn state(&self) -> LabRequestState {
        self.state.lock().await.clone()
    }

    /// Latest date the request date may take.
    pub fn max_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Runs the initial loads concurrently. Each load fills its own part of
    /// the state; a failing load is logged and reported without affecting
    /// the others.
    pub async fn activate(self: &Arc<Self>) -> ActivationReport {
        info!(
            patient_uuid = %self.context.patient_uuid,
            external_request = self.context.external_request,
            "activating lab request workflow"
        );

        let loads = vec![
            (
                InitialLoad::Providers,
                self.spawn_load(|c| async move { c.load_providers().await }),
            ),
            (
                InitialLoad::TestProfiles,
                self.spawn_load(|c| async move { c.load_test_profiles().await }),
            ),
            (
                InitialLoad::Tests,
                self.spawn_load(|c| async move { c.load_tests().await }),
            ),
            (
                InitialLoad::SessionProvider,
                self.spawn_load(|c| async move { c.load_session_provider().await }),
            ),
            (
                InitialLoad::ExistingTestOrders,
                self.spawn_load(|c| async move { c.load_existing_test_orders().await }),
            ),
            (
                InitialLoad::TodaysVisit,
                self.spawn_load(|c| async move { c.load_todays_visit().await }),
            ),
        ];

        let (names, handles): (Vec<_>, Vec<_>) = loads.into_iter().unzip();
        let mut report = ActivationReport::default();
        for (load, joined) in names.into_iter().zip(join_all(handles).await) {
            let result = joined.unwrap_or_else(|err| {
                Err(ServiceError::new(
                    ErrorCode::Internal,
                    format!("load task aborted: {err}"),
                ))
            });
            if let Err(err) = result {
                error!(?load, error = %err, "initial lab request load failed");
                report.failures.push(InitialLoadFailure { load, error: err });
            }
        }
        report
    }

    fn spawn_load<F, Fut>(self: &Arc<Self>, load: F) -> JoinHandle<ServiceResult<()>>
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = ServiceResult<()>> + Send + 'static,
    {
        tokio::spawn(load(Arc::clone(self)))
    }

    async fn load_providers(&self) -> ServiceResult<()> {
        let providers = self.services.providers.providers().await?;
        self.state.lock().await.providers = providers;
        Ok(())
    }

    async fn load_test_profiles(&self) -> ServiceResult<()> {
        let profiles = self.services.profiles.test_profiles().await?;
        self.state.lock().await.profiles = profiles;
        Ok(())
    }

    async fn load_tests(&self) -> ServiceResult<()> {
        let mut tests = self.services.tests.tests().await?;
        self.translate_tests(&mut tests);
        self.state.lock().await.tests = tests;
        Ok(())
    }

    async fn load_session_provider(&self) -> ServiceResult<()> {
        let provider = self.services.session.current_provider().await?;
        self.state.lock().await.session_provider_uuid = Some(provider.uuid);
        Ok(())
    }

    async fn load_todays_visit(&self) -> ServiceResult<()> {
        let visit = self
            .services
            .visits
            .todays_visit(&self.context.patient_uuid)
            .await?;
        if visit.is_some() {
            self.state.lock().await.patient_checked_in = true;
        }
        Ok(())
    }

    fn translate_tests(&self, tests: &mut [LabTest]) {
        for test in tests {
            test.translated_display = Some(self.services.translator.translate(&test.display));
        }
    }

    fn translate_items(&self, items: &mut [TestOrderItem]) {
        for item in items {
            if let Some(display) = &item.display {
                item.translated_display = Some(self.services.translator.translate(display));
            }
        }
    }

    /// Replaces the existing-orders list with the server's current view.
    pub async fn load_existing_test_orders(&self) -> ServiceResult<()> {
        let mut orders = self
            .services
            .test_orders
            .test_orders_by_patient(&self.context.patient_uuid)
            .await?;
        for order in &mut orders {
            self.translate_items(&mut order.test_order_items);
        }
        debug!(count = orders.len(), "loaded existing test orders");
        self.state.lock().await.existing_test_orders = orders;
        Ok(())
    }

    fn report(&self, err: LabRequestError) {
        let message = self.services.translator.translate(err.message_key());
        self.services.notifier.error(&message);
    }

    pub async fn select_provider(&self, provider: Option<Provider>) {
        self.state.lock().await.form.selected_provider = provider;
    }

    pub async fn select_test(&self, test: Option<LabTest>) {
        self.state.lock().await.form.selected_test = test;
    }

    pub async fn select_profile(&self, profile: Option<TestProfile>) {
        self.state.lock().await.form.selected_profile = profile;
    }

    pub async fn set_date(&self, date: Option<NaiveDate>) -> Result<(), LabRequestError> {
        let today = self.max_date();
        let result = self.state.lock().await.form.set_date(date, today);
        if let Err(err) = result {
            self.report(err);
        }
        result
    }

    pub async fn add_test(&self) -> Result<(), LabRequestError> {
        let result = self.state.lock().await.form.add_selected_test();
        if let Err(err) = result {
            self.report(err);
        }
        result
    }

    pub async fn add_test_profile(&self) -> Result<ProfileExpansion, LabRequestError> {
        let result = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state.form.add_selected_profile(&state.tests)
        };
        if let Err(err) = &result {
            self.report(*err);
        }
        result
    }

    pub async fn remove_test(&self, test: &LabTest) -> bool {
        self.state.lock().await.form.remove_test(test)
    }

    pub async fn reset_form(&self) {
        self.state.lock().await.form.reset();
    }

    /// Validates and submits the form. On success the order list is reloaded
    /// and the form reset; on a remote failure the form is kept for a retry.
    pub async fn save_test_order_request(&self) -> Result<TestOrder, SaveError> {
        let (form, session_provider_uuid) = {
            let state = self.state.lock().await;
            (state.form.clone(), state.session_provider_uuid.clone())
        };

        if let Err(err) = form.validate(self.context.external_request) {
            self.report(err);
            return Err(err.into());
        }

        let (provider_uuid, date_creation) =
            match (&form.selected_provider, self.context.external_request) {
                (Some(provider), true) => (provider.uuid.clone(), form.date),
                _ => match session_provider_uuid {
                    Some(uuid) => (uuid, None),
                    None => match self.services.session.current_provider().await {
                        Ok(provider) => (provider.uuid, None),
                        Err(err) => {
                            self.services.notifier.error(&err.display_message());
                            return Err(err.into());
                        }
                    },
                },
            };

        let order = NewTestOrder {
            patient: Reference::new(self.context.patient_uuid.clone()),
            provider: Reference::new(provider_uuid),
            location: self.services.session.current_location().reference(),
            date_creation,
            test_order_items: form
                .selected_tests()
                .iter()
                .map(TestOrderItem::from_test)
                .collect(),
        };

        match self.services.test_orders.create(order).await {
            Ok(created) => {
                info!(
                    patient_uuid = %self.context.patient_uuid,
                    test_order_uuid = %created.uuid,
                    "test order created"
                );
                self.services
                    .notifier
                    .success(&self.services.translator.translate(SUCCESS_MESSAGE_KEY));
                if let Err(err) = self.load_existing_test_orders().await {
                    error!(error = %err, "reloading test orders after create failed");
                }
                self.reset_form().await;
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "test order submission rejected");
                self.services.notifier.error(&err.display_message());
                Err(err.into())
            }
        }
    }

    pub async fn show_test_order_details(&self, order: TestOrder) {
        let items = order.test_order_items.clone();
        self.state.lock().await.detail = Some(TestOrderDetail { order, items });
    }

    /// Deletes one test from the order in the detail view. Removing the last
    /// item removes the order server-side, so the order list is reloaded.
    ///
    /// A failed deletion is returned to the caller and leaves the detail
    /// view untouched; no notification is shown.
    pub async fn delete_test(&self, item: &TestOrderItem) -> Result<DeleteOutcome, DeleteError> {
        let encounter_uuid = {
            let state = self.state.lock().await;
            state
                .detail
                .as_ref()
                .map(|detail| detail.order.encounter.uuid.clone())
                .ok_or(DeleteError::NoOrderInDetail)?
        };

        if let Err(err) = self
            .services
            .test_orders
            .delete_test_order(&encounter_uuid, item.test_uuid())
            .await
        {
            warn!(
                encounter_uuid = %encounter_uuid,
                test_uuid = %item.test_uuid(),
                error = %err,
                "test deletion failed"
            );
            return Err(err.into());
        }

        let order_removed = {
            let mut state = self.state.lock().await;
            match state.detail.as_mut() {
                Some(detail) => {
                    if let Some(index) = detail
                        .items
                        .iter()
                        .position(|i| i.test_uuid() == item.test_uuid())
                    {
                        detail.items.remove(index);
                    }
                    detail.items.is_empty()
                }
                None => false,
            }
        };

        if order_removed {
            if let Err(err) = self.load_existing_test_orders().await {
                error!(error = %err, "reloading test orders after delete failed");
            }
        }
        Ok(DeleteOutcome { order_removed })
    }

    pub async fn is_test_order_in_detail_completed(&self) -> bool {
        self.state
            .lock()
            .await
            .detail
            .as_ref()
            .is_some_and(|detail| detail.order.is_completed())
    }
}

#[cfg(test)]
#[path = "tests/lab_request_tests.rs"]
mod tests;
