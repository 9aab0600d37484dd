use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::BridgeError;
use crate::types::BridgeEvent;

/// Native lifecycle events (deep links, message display, ...) via
/// `tokio::sync::broadcast`.
#[async_trait]
pub trait BridgeEvents: Send + Sync {
    async fn subscribe(&self) -> Result<broadcast::Receiver<BridgeEvent>, BridgeError>;
}
