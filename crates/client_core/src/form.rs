//! In-progress lab order form: selections, the pending test list and its
//! validation rules.

use chrono::NaiveDate;
use shared::domain::{LabTest, Provider, TestProfile};
use tracing::error;

use crate::error::LabRequestError;

/// Result of expanding a profile into the selection list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileExpansion {
    /// Catalog uuids appended to the selection, in profile order.
    pub added: Vec<String>,
    /// Members already selected before the expansion.
    pub already_selected: Vec<String>,
    /// Members the loaded catalog does not know.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabRequestForm {
    pub selected_provider: Option<Provider>,
    pub date: Option<NaiveDate>,
    pub selected_profile: Option<TestProfile>,
    pub selected_test: Option<LabTest>,
    selected_tests: Vec<LabTest>,
}

impl LabRequestForm {
    pub fn selected_tests(&self) -> &[LabTest] {
        &self.selected_tests
    }

    pub fn contains_test(&self, uuid: &str) -> bool {
        self.selected_tests.iter().any(|test| test.uuid == uuid)
    }

    /// Sets the request date. Dates after `today` are rejected and the
    /// previous value is kept.
    pub fn set_date(
        &mut self,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<(), LabRequestError> {
        if matches!(date, Some(d) if d > today) {
            return Err(LabRequestError::DateInFuture);
        }
        self.date = date;
        Ok(())
    }

    pub fn add_selected_test(&mut self) -> Result<(), LabRequestError> {
        let test = match &self.selected_test {
            Some(test) if !test.display.is_empty() => test,
            _ => return Err(LabRequestError::SelectTestFromList),
        };
        if self.contains_test(&test.uuid) {
            return Err(LabRequestError::TestAlreadyAdded);
        }

        if let Some(mut test) = self.selected_test.take() {
            test.profile_name = None;
            self.selected_tests.push(test);
        }
        Ok(())
    }

    /// Appends every member of the selected profile found in `catalog`,
    /// tagged with the profile name. Unknown members are logged and skipped.
    pub fn add_selected_profile(
        &mut self,
        catalog: &[LabTest],
    ) -> Result<ProfileExpansion, LabRequestError> {
        let profile = match self.selected_profile.take() {
            Some(profile) if !profile.name.is_empty() => profile,
            other => {
                self.selected_profile = other;
                return Err(LabRequestError::SelectProfileFromList);
            }
        };

        let mut expansion = ProfileExpansion::default();
        for uuid in &profile.tests {
            let Some(test) = catalog.iter().find(|test| &test.uuid == uuid) else {
                error!(
                    test_uuid = %uuid,
                    profile = %profile.name,
                    "profile test not found in catalog"
                );
                expansion.missing.push(uuid.clone());
                continue;
            };
            if self.contains_test(&test.uuid) {
                expansion.already_selected.push(uuid.clone());
                continue;
            }

            let mut test = test.clone();
            test.profile_name = Some(profile.name.clone());
            self.selected_tests.push(test);
            expansion.added.push(uuid.clone());
        }
        Ok(expansion)
    }

    /// Removes the first selected test with the same catalog uuid.
    pub fn remove_test(&mut self, test: &LabTest) -> bool {
        match self.selected_tests.iter().position(|t| t.same_test(test)) {
            Some(index) => {
                self.selected_tests.remove(index);
                true
            }
            None => false,
        }
    }

    /// Checks the form is ready to submit. The provider check runs first and
    /// only applies to externally originated requests.
    pub fn validate(&self, external_request: bool) -> Result<(), LabRequestError> {
        let has_provider = self
            .selected_provider
            .as_ref()
            .is_some_and(|provider| !provider.display.is_empty());
        if external_request && !has_provider {
            return Err(LabRequestError::SelectProviderFromList);
        }
        if self.selected_tests.is_empty() {
            return Err(LabRequestError::AddAtLeastOneTestToTestOrder);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
