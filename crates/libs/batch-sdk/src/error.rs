use batch_bridge::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error;

pub mod code {
    pub const VALIDATION_INVALID_KEY: &str = "BATCH_VALIDATION_INVALID_KEY";
    pub const VALIDATION_INVALID_TAG: &str = "BATCH_VALIDATION_INVALID_TAG";
    pub const VALIDATION_INVALID_ATTRIBUTE_VALUE: &str = "BATCH_VALIDATION_INVALID_ATTRIBUTE_VALUE";
    pub const VALIDATION_INVALID_ARGUMENT: &str = "BATCH_VALIDATION_INVALID_ARGUMENT";
    pub const VALIDATION_LIMIT_EXCEEDED: &str = "BATCH_VALIDATION_LIMIT_EXCEEDED";
    pub const EDITOR_ALREADY_COMMITTED: &str = "BATCH_EDITOR_ALREADY_COMMITTED";
    pub const CONFIG_INVALID: &str = "BATCH_CONFIG_INVALID";
    pub const CONFIG_MISSING: &str = "BATCH_CONFIG_MISSING";
    pub const RUNTIME_INVALID_STATE: &str = "BATCH_RUNTIME_INVALID_STATE";
    pub const RUNTIME_OPTED_OUT: &str = "BATCH_RUNTIME_OPTED_OUT";
    pub const INBOX_FETCH_NETWORK: &str = "BATCH_INBOX_FETCH_NETWORK";
    pub const INBOX_FETCH_AUTH_REJECTED: &str = "BATCH_INBOX_FETCH_AUTH_REJECTED";
    pub const INBOX_FETCH_NOT_READY: &str = "BATCH_INBOX_FETCH_NOT_READY";
    pub const INBOX_MALFORMED_PAGE: &str = "BATCH_INBOX_MALFORMED_PAGE";
    pub const INBOX_UNKNOWN_NOTIFICATION: &str = "BATCH_INBOX_UNKNOWN_NOTIFICATION";
    pub const BRIDGE_UNAVAILABLE: &str = "BATCH_BRIDGE_UNAVAILABLE";
    pub const BRIDGE_NOT_IMPLEMENTED: &str = "BATCH_BRIDGE_NOT_IMPLEMENTED";
    pub const BRIDGE_REJECTED: &str = "BATCH_BRIDGE_REJECTED";
    pub const INTERNAL: &str = "BATCH_INTERNAL_ERROR";
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub enum ErrorCategory {
    Validation,
    Transaction,
    Config,
    Runtime,
    Fetch,
    Bridge,
    Internal,
}

pub type ErrorDetails = BTreeMap<String, JsonValue>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Error)]
#[error("{machine_code}: {message}")]
#[non_exhaustive]
pub struct SdkError {
    pub machine_code: String,
    pub category: ErrorCategory,
    pub retryable: bool,
    pub is_user_actionable: bool,
    pub message: String,
    #[serde(default)]
    pub details: ErrorDetails,
    pub cause_code: Option<String>,
}

impl SdkError {
    pub fn new(
        machine_code: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            machine_code: machine_code.into(),
            category,
            retryable: false,
            is_user_actionable: false,
            message: message.into(),
            details: ErrorDetails::new(),
            cause_code: None,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_user_actionable(mut self, is_user_actionable: bool) -> Self {
        self.is_user_actionable = is_user_actionable;
        self
    }

    pub fn with_cause_code(mut self, cause_code: impl Into<String>) -> Self {
        self.cause_code = Some(cause_code.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn code(&self) -> &str {
        self.machine_code.as_str()
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_actionable(&self) -> bool {
        self.is_user_actionable
    }

    /// Inbox failures delivered to the fetch caller: network, auth, not
    /// ready, or a page with no usable record.
    pub fn is_fetch_error(&self) -> bool {
        self.category == ErrorCategory::Fetch
    }

    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(code::VALIDATION_INVALID_ARGUMENT, ErrorCategory::Validation, message)
            .with_user_actionable(true)
            .with_detail("field", JsonValue::String(field.to_owned()))
    }

    pub fn already_committed(method: &'static str) -> Self {
        Self::new(
            code::EDITOR_ALREADY_COMMITTED,
            ErrorCategory::Transaction,
            format!("'{method}' called on a profile transaction that was already saved"),
        )
        .with_user_actionable(true)
        .with_detail("method", JsonValue::String(method.to_owned()))
    }

    pub fn invalid_state(method: &'static str, state: &'static str) -> Self {
        Self::new(
            code::RUNTIME_INVALID_STATE,
            ErrorCategory::Runtime,
            format!("method '{method}' is not legal in state '{state}'"),
        )
        .with_user_actionable(true)
        .with_detail("method", JsonValue::String(method.to_owned()))
        .with_detail("state", JsonValue::String(state.to_owned()))
    }

    pub fn opted_out(method: &'static str) -> Self {
        Self::new(
            code::RUNTIME_OPTED_OUT,
            ErrorCategory::Runtime,
            format!("method '{method}' is rejected while the SDK is opted out"),
        )
        .with_user_actionable(true)
        .with_detail("method", JsonValue::String(method.to_owned()))
    }

    pub fn fetch_not_ready(reason: impl Into<String>) -> Self {
        Self::new(code::INBOX_FETCH_NOT_READY, ErrorCategory::Fetch, reason).with_retryable(true)
    }

    pub fn malformed_page(record_count: usize) -> Self {
        Self::new(
            code::INBOX_MALFORMED_PAGE,
            ErrorCategory::Fetch,
            "every notification record in the page failed validation",
        )
        .with_detail("record_count", JsonValue::from(record_count))
    }

    /// Map a bridge failure raised by a dispatch call.
    pub fn from_bridge(operation: &str, err: BridgeError) -> Self {
        let retryable = err.is_retryable();
        let machine_code = match &err {
            BridgeError::NotImplemented { .. } => code::BRIDGE_NOT_IMPLEMENTED,
            BridgeError::Unavailable { .. }
            | BridgeError::NotReady { .. }
            | BridgeError::Transport { .. } => code::BRIDGE_UNAVAILABLE,
            BridgeError::AuthRejected { .. } | BridgeError::InvalidRequest { .. } => {
                code::BRIDGE_REJECTED
            }
            _ => code::INTERNAL,
        };
        Self::new(machine_code, ErrorCategory::Bridge, err.to_string())
            .with_retryable(retryable)
            .with_detail("operation", JsonValue::String(operation.to_owned()))
    }

    /// Map a bridge failure raised by an inbox page fetch into the fetch
    /// error family.
    pub fn from_fetch(err: BridgeError) -> Self {
        let retryable = err.is_retryable();
        let (machine_code, user_actionable) = match &err {
            BridgeError::AuthRejected { .. } => (code::INBOX_FETCH_AUTH_REJECTED, true),
            BridgeError::NotReady { .. } => (code::INBOX_FETCH_NOT_READY, false),
            BridgeError::InvalidRequest { .. } => (code::VALIDATION_INVALID_ARGUMENT, true),
            _ => (code::INBOX_FETCH_NETWORK, false),
        };
        Self::new(machine_code, ErrorCategory::Fetch, err.to_string())
            .with_retryable(retryable)
            .with_user_actionable(user_actionable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_mapping_distinguishes_auth_from_network() {
        let auth = SdkError::from_fetch(BridgeError::AuthRejected { message: "expired".into() });
        assert_eq!(auth.code(), code::INBOX_FETCH_AUTH_REJECTED);
        assert!(auth.is_fetch_error());
        assert!(auth.is_user_actionable());
        assert!(!auth.is_retryable());

        let network = SdkError::from_fetch(BridgeError::transport("connection reset"));
        assert_eq!(network.code(), code::INBOX_FETCH_NETWORK);
        assert!(network.is_retryable());

        let not_ready = SdkError::from_fetch(BridgeError::NotReady { reason: "boot".into() });
        assert_eq!(not_ready.code(), code::INBOX_FETCH_NOT_READY);
    }

    #[test]
    fn dispatch_mapping_keeps_operation_detail() {
        let err = SdkError::from_bridge("save_profile", BridgeError::not_implemented("x"));
        assert_eq!(err.code(), code::BRIDGE_NOT_IMPLEMENTED);
        assert_eq!(err.category, ErrorCategory::Bridge);
        assert_eq!(
            err.details.get("operation").and_then(JsonValue::as_str),
            Some("save_profile")
        );
    }

    #[test]
    fn error_roundtrips_through_json() {
        let err = SdkError::already_committed("save");
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["category"], "Transaction");
        let parsed: SdkError = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, err);
    }
}
