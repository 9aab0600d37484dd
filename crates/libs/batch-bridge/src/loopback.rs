use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;

use crate::error::BridgeError;
use crate::traits::*;
use crate::types::*;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One call received by [`LoopbackBridge::dispatch`].
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchRecord {
    pub kind: OperationKind,
    pub payload: JsonValue,
}

/// One call received by [`LoopbackBridge::fetch_page`].
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRecord {
    pub cursor: Option<PageCursor>,
    pub scope: FetchScope,
}

/// In-memory bridge for host-side runs and tests.
///
/// Dispatches are recorded and answered from per-operation response queues
/// (`Null` once a queue is empty). Inbox pages are served in the order they
/// were queued; an exhausted queue yields an empty last page.
pub struct LoopbackBridge {
    dispatched: Mutex<Vec<DispatchRecord>>,
    responses: Mutex<HashMap<OperationKind, VecDeque<Result<JsonValue, BridgeError>>>>,
    pages: Mutex<VecDeque<Result<NotificationPage, BridgeError>>>,
    fetches: Mutex<Vec<FetchRecord>>,
    events: broadcast::Sender<BridgeEvent>,
}

impl Default for LoopbackBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBridge {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            dispatched: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
            pages: Mutex::new(VecDeque::new()),
            fetches: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn with_response(
        self,
        kind: OperationKind,
        result: Result<JsonValue, BridgeError>,
    ) -> Self {
        self.queue_response(kind, result);
        self
    }

    pub fn with_page(self, result: Result<NotificationPage, BridgeError>) -> Self {
        self.queue_page(result);
        self
    }

    pub fn queue_response(&self, kind: OperationKind, result: Result<JsonValue, BridgeError>) {
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .entry(kind)
            .or_default()
            .push_back(result);
    }

    pub fn queue_page(&self, result: Result<NotificationPage, BridgeError>) {
        self.pages.lock().expect("pages mutex poisoned").push_back(result);
    }

    pub fn dispatched(&self) -> Vec<DispatchRecord> {
        self.dispatched.lock().expect("dispatched mutex poisoned").clone()
    }

    /// Payloads of every dispatch of `kind`, in call order.
    pub fn payloads(&self, kind: OperationKind) -> Vec<JsonValue> {
        self.dispatched
            .lock()
            .expect("dispatched mutex poisoned")
            .iter()
            .filter(|record| record.kind == kind)
            .map(|record| record.payload.clone())
            .collect()
    }

    pub fn fetches(&self) -> Vec<FetchRecord> {
        self.fetches.lock().expect("fetches mutex poisoned").clone()
    }

    /// Raise an event towards every subscriber. Returns how many received it.
    pub fn emit(&self, event: BridgeEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }
}

#[async_trait]
impl NativeBridge for LoopbackBridge {
    async fn dispatch(
        &self,
        kind: OperationKind,
        payload: JsonValue,
    ) -> Result<JsonValue, BridgeError> {
        log::debug!("loopback dispatch {kind}");
        self.dispatched
            .lock()
            .expect("dispatched mutex poisoned")
            .push(DispatchRecord { kind, payload });
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(JsonValue::Null))
    }
}

#[async_trait]
impl InboxSource for LoopbackBridge {
    async fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
        scope: FetchScope,
    ) -> Result<NotificationPage, BridgeError> {
        self.fetches.lock().expect("fetches mutex poisoned").push(FetchRecord { cursor, scope });
        self.pages
            .lock()
            .expect("pages mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(NotificationPage::default()))
    }
}

#[async_trait]
impl BridgeEvents for LoopbackBridge {
    async fn subscribe(&self) -> Result<broadcast::Receiver<BridgeEvent>, BridgeError> {
        Ok(self.events.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn dispatch_records_calls_and_serves_queued_responses() {
        let bridge = LoopbackBridge::new()
            .with_response(OperationKind::GetInstallationId, Ok(json!("install-1")));

        let id = bridge
            .dispatch(OperationKind::GetInstallationId, JsonValue::Null)
            .await
            .expect("queued response");
        assert_eq!(id, json!("install-1"));

        let fallback = bridge
            .dispatch(OperationKind::GetInstallationId, JsonValue::Null)
            .await
            .expect("default response");
        assert_eq!(fallback, JsonValue::Null);

        bridge.dispatch(OperationKind::ClearBadge, json!({})).await.expect("ack");
        assert_eq!(bridge.dispatched().len(), 3);
        assert_eq!(bridge.payloads(OperationKind::ClearBadge), vec![json!({})]);
    }

    #[tokio::test]
    async fn pages_are_served_in_order_then_end() {
        let bridge = LoopbackBridge::new()
            .with_page(Ok(NotificationPage::new(
                vec![RawNotification::new("n1", "hello", 10)],
                Some(PageCursor::from("c1")),
            )))
            .with_page(Err(BridgeError::transport("offline")));

        let first = bridge.fetch_page(None, FetchScope::Installation).await.expect("page");
        assert_eq!(first.notifications.len(), 1);
        assert!(!first.is_last());

        let second = bridge.fetch_page(first.next_cursor, FetchScope::Installation).await;
        assert!(matches!(second, Err(BridgeError::Transport { .. })));

        let exhausted = bridge.fetch_page(None, FetchScope::Installation).await.expect("page");
        assert!(exhausted.notifications.is_empty());
        assert!(exhausted.is_last());

        let fetches = bridge.fetches();
        assert_eq!(fetches.len(), 3);
        assert_eq!(fetches[1].cursor, Some(PageCursor::from("c1")));
    }

    #[tokio::test]
    async fn emitted_events_reach_subscribers() {
        let bridge = LoopbackBridge::new();
        assert_eq!(bridge.emit(BridgeEvent::new("nobody_listens")), 0);

        let mut rx = bridge.subscribe().await.expect("subscribe");
        let delivered =
            bridge.emit(BridgeEvent::new("deeplink").with_parameter("url", json!("app://x")));
        assert_eq!(delivered, 1);

        let event = rx.recv().await.expect("event");
        assert_eq!(event.name, "deeplink");
        assert_eq!(event.parameters.get("url"), Some(&json!("app://x")));
    }
}
