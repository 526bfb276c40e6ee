use super::{apply_overrides, Settings};

use std::{collections::HashMap, path::PathBuf};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_openmrs() {
    let settings = apply_overrides(Settings::default(), None, env_from(&[]));
    assert_eq!(
        settings.rest_url().expect("rest url").as_str(),
        "http://localhost:8080/openmrs/ws/rest/v1/"
    );
    assert_eq!(settings.request_timeout().as_secs(), 30);
}

#[test]
fn file_values_are_overridden_by_environment() {
    let file = r#"
openmrs_url = "http://records.example.org/openmrs"
translations_path = "./i18n/pt.json"
request_timeout_seconds = "5"
"#;
    let settings = apply_overrides(
        Settings::default(),
        Some(file),
        env_from(&[("APP__OPENMRS_URL", "https://clinic.example.org/openmrs/")]),
    );

    assert_eq!(settings.openmrs_url, "https://clinic.example.org/openmrs/");
    assert_eq!(
        settings.translations_path,
        Some(PathBuf::from("./i18n/pt.json"))
    );
    assert_eq!(settings.request_timeout_seconds, 5);
}

#[test]
fn app_prefixed_variable_wins_over_plain_one() {
    let settings = apply_overrides(
        Settings::default(),
        None,
        env_from(&[
            ("OPENMRS_URL", "http://plain.example.org"),
            ("APP__OPENMRS_URL", "http://prefixed.example.org"),
        ]),
    );
    assert_eq!(settings.openmrs_url, "http://prefixed.example.org");
}

#[test]
fn invalid_timeout_keeps_previous_value() {
    let settings = apply_overrides(
        Settings::default(),
        Some(r#"request_timeout_seconds = "soon""#),
        env_from(&[("APP__REQUEST_TIMEOUT_SECONDS", "-1")]),
    );
    assert_eq!(settings.request_timeout_seconds, 30);
}

#[test]
fn rest_url_normalizes_slashes() {
    let settings = Settings {
        openmrs_url: "https://clinic.example.org/openmrs///".into(),
        rest_base_path: "/ws/rest/v1/".into(),
        ..Settings::default()
    };
    assert_eq!(
        settings.rest_url().expect("rest url").as_str(),
        "https://clinic.example.org/openmrs/ws/rest/v1/"
    );
}

#[test]
fn rest_url_rejects_garbage() {
    let settings = Settings {
        openmrs_url: "not a url".into(),
        ..Settings::default()
    };
    assert!(settings.rest_url().is_err());
}
