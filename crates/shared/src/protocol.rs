use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{LabTest, Reference};

pub const COMPLETED_STATUS: &str = "COMPLETE";
pub const TEST_ORDER_CONCEPT_TYPE: &str = "testorder";

/// List envelope used by the OpenMRS REST resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOrderConcept {
    #[serde(rename = "type")]
    pub kind: String,
    pub concept: Reference,
}

impl TestOrderConcept {
    pub fn new(concept_uuid: impl Into<String>) -> Self {
        Self {
            kind: TEST_ORDER_CONCEPT_TYPE.to_string(),
            concept: Reference::new(concept_uuid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOrderItem {
    pub test_order: TestOrderConcept,
    pub category: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_display: Option<String>,
}

impl TestOrderItem {
    pub fn from_test(test: &LabTest) -> Self {
        Self {
            test_order: TestOrderConcept::new(test.uuid.clone()),
            category: test.category.clone(),
            display: None,
            translated_display: None,
        }
    }

    /// Catalog uuid of the ordered test.
    pub fn test_uuid(&self) -> &str {
        &self.test_order.concept.uuid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOrder {
    pub uuid: String,
    pub encounter: Reference,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub test_order_items: Vec<TestOrderItem>,
}

impl TestOrder {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }
}

/// Submission payload for a new test order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestOrder {
    pub patient: Reference,
    pub provider: Reference,
    pub location: Reference,
    pub date_creation: Option<NaiveDate>,
    pub test_order_items: Vec<TestOrderItem>,
}
