use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uuid-only reference to a server-side resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub uuid: String,
}

impl Reference {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self { uuid: uuid.into() }
    }
}

macro_rules! display_resource {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub uuid: String,
            #[serde(default)]
            pub display: String,
        }

        impl $name {
            pub fn new(uuid: impl Into<String>, display: impl Into<String>) -> Self {
                Self {
                    uuid: uuid.into(),
                    display: display.into(),
                }
            }

            pub fn reference(&self) -> Reference {
                Reference::new(self.uuid.clone())
            }
        }
    };
}

display_resource!(Provider);
display_resource!(Location);
display_resource!(PatientIdentifierType);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,
}

/// A lab test from the catalog, as held in the selection list.
///
/// Identity is the catalog uuid. `profile_name` is set when the test was
/// pulled in by a profile and cleared when it is added on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub uuid: String,
    pub display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    pub category: Reference,
}

impl LabTest {
    pub fn new(
        uuid: impl Into<String>,
        display: impl Into<String>,
        category: Reference,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            display: display.into(),
            translated_display: None,
            profile_name: None,
            category,
        }
    }

    pub fn same_test(&self, other: &LabTest) -> bool {
        self.uuid == other.uuid
    }
}

/// A named bundle of catalog tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestProfile {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub tests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<PatientIdentifierType>,
    #[serde(default)]
    pub preferred: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub uuid: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub identifiers: Vec<PatientIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<serde_json::Value>,
    #[serde(default)]
    pub voided: bool,
}
