use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;

use crate::error::BridgeError;
use crate::traits::*;
use crate::types::*;

/// A bridge implementation that returns `NotImplemented` for every method.
///
/// Useful as the starting point of a new platform binding: wire it into the
/// client, then replace calls one operation at a time.
pub struct StubBridge;

#[async_trait]
impl NativeBridge for StubBridge {
    async fn dispatch(
        &self,
        kind: OperationKind,
        _payload: JsonValue,
    ) -> Result<JsonValue, BridgeError> {
        Err(BridgeError::not_implemented(kind.as_str()))
    }
}

#[async_trait]
impl InboxSource for StubBridge {
    async fn fetch_page(
        &self,
        _cursor: Option<PageCursor>,
        _scope: FetchScope,
    ) -> Result<NotificationPage, BridgeError> {
        Err(BridgeError::not_implemented("fetch_page"))
    }
}

#[async_trait]
impl BridgeEvents for StubBridge {
    async fn subscribe(&self) -> Result<broadcast::Receiver<BridgeEvent>, BridgeError> {
        Err(BridgeError::not_implemented("subscribe"))
    }
}
