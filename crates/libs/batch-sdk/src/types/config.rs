use crate::error::{code, ErrorCategory, SdkError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Client configuration, consumed once by `set_config` before `start`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct BatchConfig {
    #[serde(default)]
    pub android_api_key: Option<String>,
    #[serde(default)]
    pub ios_api_key: Option<String>,
    /// Whether the SDK may read the advertising identifier (IDFA on iOS).
    #[serde(default = "default_true")]
    pub can_use_advertising_identifier: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { android_api_key: None, ios_api_key: None, can_use_advertising_identifier: true }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_android_api_key(mut self, key: impl Into<String>) -> Self {
        self.android_api_key = Some(key.into());
        self
    }

    pub fn with_ios_api_key(mut self, key: impl Into<String>) -> Self {
        self.ios_api_key = Some(key.into());
        self
    }

    pub fn with_advertising_identifier(mut self, allowed: bool) -> Self {
        self.can_use_advertising_identifier = allowed;
        self
    }

    pub fn from_toml(input: &str) -> Result<Self, SdkError> {
        toml::from_str(input).map_err(|err| {
            SdkError::new(code::CONFIG_INVALID, ErrorCategory::Config, err.to_string())
                .with_user_actionable(true)
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            SdkError::new(code::CONFIG_INVALID, ErrorCategory::Config, err.to_string())
                .with_user_actionable(true)
                .with_detail("path", JsonValue::String(path.display().to_string()))
        })?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        for (field, key) in
            [("android_api_key", &self.android_api_key), ("ios_api_key", &self.ios_api_key)]
        {
            let Some(key) = key else {
                continue;
            };
            if key.trim().is_empty() || key.chars().any(char::is_whitespace) {
                return Err(SdkError::new(
                    code::CONFIG_INVALID,
                    ErrorCategory::Config,
                    "API keys must be non-empty and contain no whitespace",
                )
                .with_user_actionable(true)
                .with_detail("field", JsonValue::String(field.to_owned())));
            }
        }

        if self.android_api_key.is_none() && self.ios_api_key.is_none() {
            return Err(SdkError::new(
                code::CONFIG_MISSING,
                ErrorCategory::Config,
                "at least one of android_api_key or ios_api_key must be set",
            )
            .with_user_actionable(true));
        }

        Ok(())
    }
}
