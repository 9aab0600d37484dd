use batch_bridge::BridgeEvent;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub type EventParameters = Map<String, JsonValue>;
pub type Listener = Arc<dyn Fn(&str, &EventParameters) + Send + Sync>;

/// Named-event listener registry.
///
/// Listeners for one event run in registration order. The registry lock is
/// released before listeners run, so a listener may call `on`/`off`.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&str, &EventParameters) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .expect("listeners mutex poisoned")
            .entry(event.to_owned())
            .or_default()
            .push(Arc::new(listener));
    }

    /// `None` removes every listener of every event.
    pub fn off(&self, event: Option<&str>) {
        let mut listeners = self.listeners.lock().expect("listeners mutex poisoned");
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
    }

    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &str, parameters: &EventParameters) -> usize {
        let targets = self
            .listeners
            .lock()
            .expect("listeners mutex poisoned")
            .get(event)
            .cloned()
            .unwrap_or_default();
        for listener in &targets {
            listener(event, parameters);
        }
        targets.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().expect("listeners mutex poisoned").get(event).map_or(0, Vec::len)
    }

    /// Drain bridge events into [`EventBus::emit`] until the sender side is
    /// dropped. Returns the number of events delivered.
    pub async fn forward(&self, mut receiver: broadcast::Receiver<BridgeEvent>) -> usize {
        let mut delivered = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.emit(&event.name, &event.parameters);
                    delivered += 1;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("event bus lagged behind the bridge; {skipped} events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    log::debug!("bridge event channel closed after {delivered} events");
                    return delivered;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(bus: &EventBus, event: &str, tag: &'static str) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.on(event, move |name, _| {
            sink.lock().expect("sink mutex poisoned").push(format!("{tag}:{name}"));
        });
        seen
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for index in 0..3 {
            let order = Arc::clone(&order);
            bus.on("push_opened", move |_, _| {
                order.lock().expect("order mutex poisoned").push(index);
            });
        }
        assert_eq!(bus.emit("push_opened", &Map::new()), 3);
        assert_eq!(*order.lock().expect("order mutex poisoned"), vec![0, 1, 2]);
        assert_eq!(bus.emit("other", &Map::new()), 0);
    }

    #[test]
    fn off_clears_one_event_or_all() {
        let bus = EventBus::new();
        let _a = recorder(&bus, "a", "x");
        let _b = recorder(&bus, "b", "y");
        bus.off(Some("a"));
        assert_eq!(bus.listener_count("a"), 0);
        assert_eq!(bus.listener_count("b"), 1);
        bus.off(None);
        assert_eq!(bus.listener_count("b"), 0);
    }

    #[test]
    fn listener_may_register_during_emit() {
        let bus = Arc::new(EventBus::new());
        let inner = Arc::clone(&bus);
        bus.on("boot", move |_, _| inner.on("late", |_, _| {}));
        bus.emit("boot", &Map::new());
        assert_eq!(bus.listener_count("late"), 1);
    }

    #[tokio::test]
    async fn forward_delivers_until_channel_closes() {
        let bus = EventBus::new();
        let params = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&params);
        bus.on("deeplink", move |_, parameters| {
            sink.lock().expect("sink mutex poisoned").push(parameters.clone());
        });

        let (sender, receiver) = broadcast::channel(8);
        sender
            .send(BridgeEvent::new("deeplink").with_parameter("url", json!("app://x")))
            .expect("send");
        sender.send(BridgeEvent::new("ignored")).expect("send");
        drop(sender);

        assert_eq!(bus.forward(receiver).await, 2);
        let params = params.lock().expect("params mutex poisoned");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].get("url"), Some(&json!("app://x")));
    }

    #[tokio::test]
    async fn forward_skips_lagged_events() {
        let bus = EventBus::new();
        let seen = recorder(&bus, "tick", "t");
        let (sender, receiver) = broadcast::channel(2);
        for _ in 0..5 {
            sender.send(BridgeEvent::new("tick")).expect("send");
        }
        drop(sender);

        assert_eq!(bus.forward(receiver).await, 2);
        assert_eq!(seen.lock().expect("seen mutex poisoned").len(), 2);
    }
}
