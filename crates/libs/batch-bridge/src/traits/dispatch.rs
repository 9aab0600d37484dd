use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::BridgeError;
use crate::types::OperationKind;

/// Request/response channel into the native SDK.
///
/// Every call resolves exactly once. Dropping the future does not cancel the
/// native operation; it only discards the result.
#[async_trait]
pub trait NativeBridge: Send + Sync {
    /// Hand a finished payload to the native runtime.
    ///
    /// The response is operation specific: `Null` for plain acknowledgements,
    /// a string for identifier lookups.
    async fn dispatch(
        &self,
        kind: OperationKind,
        payload: JsonValue,
    ) -> Result<JsonValue, BridgeError>;
}
