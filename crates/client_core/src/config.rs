use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "poc.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub openmrs_url: String,
    pub rest_base_path: String,
    pub translations_path: Option<PathBuf>,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openmrs_url: "http://localhost:8080/openmrs".into(),
            rest_base_path: "ws/rest/v1".into(),
            translations_path: None,
            request_timeout_seconds: 30,
        }
    }
}

impl Settings {
    /// Base URL of the REST resources, always ending in a slash so resource
    /// paths can be joined onto it.
    pub fn rest_url(&self) -> Result<Url> {
        let root = format!("{}/", self.openmrs_url.trim_end_matches('/'));
        let base = Url::parse(&root)
            .with_context(|| format!("invalid OpenMRS url '{}'", self.openmrs_url))?;
        let path = format!("{}/", self.rest_base_path.trim_matches('/'));
        base.join(&path)
            .with_context(|| format!("invalid REST base path '{}'", self.rest_base_path))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(SETTINGS_FILE).ok();
    apply_overrides(Settings::default(), raw.as_deref(), |key| {
        std::env::var(key).ok()
    })
}

fn apply_overrides(
    mut settings: Settings,
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("openmrs_url") {
                settings.openmrs_url = v.clone();
            }
            if let Some(v) = file_cfg.get("rest_base_path") {
                settings.rest_base_path = v.clone();
            }
            if let Some(v) = file_cfg.get("translations_path") {
                settings.translations_path = Some(PathBuf::from(v));
            }
            if let Some(v) = file_cfg.get("request_timeout_seconds") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.request_timeout_seconds = parsed;
                }
            }
        }
    }

    if let Some(v) = env("OPENMRS_URL") {
        settings.openmrs_url = v;
    }
    if let Some(v) = env("APP__OPENMRS_URL") {
        settings.openmrs_url = v;
    }

    if let Some(v) = env("APP__REST_BASE_PATH") {
        settings.rest_base_path = v;
    }

    if let Some(v) = env("APP__TRANSLATIONS_PATH") {
        settings.translations_path = Some(PathBuf::from(v));
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
