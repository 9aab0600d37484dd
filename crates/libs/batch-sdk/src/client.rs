mod modules;

pub use modules::{InboxModule, MessagingModule, PushModule, UserModule};

use crate::error::{code, ErrorCategory, SdkError};
use crate::event_bus::{EventBus, EventParameters};
use crate::lifecycle::{Lifecycle, RuntimeState, SdkMethod};
use crate::profile::{ProfileDelta, ProfileState};
use crate::types::BatchConfig;
use batch_bridge::{Bridge, OperationKind};
use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, Mutex, RwLock};

/// State shared between the client facade, open profile editors and inbox
/// paginators.
pub(crate) struct ClientCore<B: Bridge> {
    bridge: B,
    lifecycle: Mutex<Lifecycle>,
    profile: RwLock<ProfileState>,
    events: EventBus,
}

impl<B: Bridge> ClientCore<B> {
    pub(crate) fn bridge(&self) -> &B {
        &self.bridge
    }

    pub(crate) fn ensure_method_legal(&self, method: SdkMethod) -> Result<(), SdkError> {
        self.lifecycle.lock().expect("lifecycle mutex poisoned").ensure_method_legal(method)
    }

    pub(crate) async fn dispatch(
        &self,
        kind: OperationKind,
        payload: JsonValue,
    ) -> Result<JsonValue, SdkError> {
        log::debug!("dispatching {kind} to native runtime");
        self.bridge.dispatch(kind, payload).await.map_err(|err| {
            log::warn!("native runtime rejected {kind}: {err}");
            SdkError::from_bridge(kind.as_str(), err)
        })
    }

    /// Lifecycle check followed by a dispatch.
    pub(crate) async fn call(
        &self,
        method: SdkMethod,
        kind: OperationKind,
        payload: JsonValue,
    ) -> Result<JsonValue, SdkError> {
        self.ensure_method_legal(method)?;
        self.dispatch(kind, payload).await
    }

    /// Readers never see a partially applied delta.
    pub(crate) fn apply_profile_delta(&self, delta: &ProfileDelta) {
        self.profile.write().expect("profile mutex poisoned").apply(delta);
    }

    pub(crate) fn profile_snapshot(&self) -> ProfileState {
        self.profile.read().expect("profile mutex poisoned").clone()
    }
}

pub(crate) fn to_payload<T: serde::Serialize>(value: &T) -> Result<JsonValue, SdkError> {
    serde_json::to_value(value)
        .map_err(|err| SdkError::new(code::INTERNAL, ErrorCategory::Internal, err.to_string()))
}

/// Entry point of the SDK, generic over the native runtime it drives.
pub struct Batch<B: Bridge> {
    core: Arc<ClientCore<B>>,
}

impl<B: Bridge> Clone for Batch<B> {
    fn clone(&self) -> Self {
        Self { core: Arc::clone(&self.core) }
    }
}

impl<B: Bridge> Batch<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            core: Arc::new(ClientCore {
                bridge,
                lifecycle: Mutex::new(Lifecycle::default()),
                profile: RwLock::new(ProfileState::default()),
                events: EventBus::new(),
            }),
        }
    }

    pub fn bridge(&self) -> &B {
        self.core.bridge()
    }

    pub fn state(&self) -> RuntimeState {
        self.core.lifecycle.lock().expect("lifecycle mutex poisoned").state()
    }

    pub fn config(&self) -> Option<BatchConfig> {
        self.core.lifecycle.lock().expect("lifecycle mutex poisoned").config().cloned()
    }

    pub async fn set_config(&self, config: BatchConfig) -> Result<(), SdkError> {
        config.validate()?;
        self.core.call(SdkMethod::SetConfig, OperationKind::SetConfig, to_payload(&config)?).await?;
        self.core.lifecycle.lock().expect("lifecycle mutex poisoned").mark_configured(config)?;
        log::info!("configuration accepted");
        Ok(())
    }

    /// Starting an already started SDK is a no-op.
    pub async fn start(&self) -> Result<(), SdkError> {
        let advertising = {
            let mut lifecycle = self.core.lifecycle.lock().expect("lifecycle mutex poisoned");
            if !lifecycle.mark_started()? {
                return Ok(());
            }
            lifecycle.config().map(|config| config.can_use_advertising_identifier).unwrap_or(true)
        };

        let payload = json!({ "can_use_advertising_identifier": advertising });
        if let Err(err) = self.core.dispatch(OperationKind::Start, payload).await {
            self.core.lifecycle.lock().expect("lifecycle mutex poisoned").rollback_start();
            return Err(err);
        }
        log::info!("runtime started");
        Ok(())
    }

    pub async fn opt_in(&self) -> Result<(), SdkError> {
        self.core.call(SdkMethod::OptIn, OperationKind::OptIn, JsonValue::Null).await?;
        self.core.lifecycle.lock().expect("lifecycle mutex poisoned").mark_opted_in()?;
        log::info!("opted back in");
        Ok(())
    }

    pub async fn opt_out(&self) -> Result<(), SdkError> {
        self.core.call(SdkMethod::OptOut, OperationKind::OptOut, JsonValue::Null).await?;
        self.core.lifecycle.lock().expect("lifecycle mutex poisoned").mark_opted_out()?;
        log::info!("opted out");
        Ok(())
    }

    /// Opts out and drops the local profile mirror along with the native data.
    pub async fn opt_out_and_wipe_data(&self) -> Result<(), SdkError> {
        self.core
            .call(SdkMethod::OptOut, OperationKind::OptOutAndWipeData, JsonValue::Null)
            .await?;
        self.core.lifecycle.lock().expect("lifecycle mutex poisoned").mark_opted_out()?;
        *self.core.profile.write().expect("profile mutex poisoned") = ProfileState::default();
        log::info!("opted out and wiped local data");
        Ok(())
    }

    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&str, &EventParameters) + Send + Sync + 'static,
    {
        self.core.events.on(event, listener);
    }

    pub fn off(&self, event: Option<&str>) {
        self.core.events.off(event);
    }

    pub fn events(&self) -> &EventBus {
        &self.core.events
    }

    /// Subscribe to the bridge's event stream and deliver every event to the
    /// registered listeners until the bridge closes the stream.
    pub async fn forward_bridge_events(&self) -> Result<usize, SdkError> {
        let receiver = self
            .core
            .bridge
            .subscribe()
            .await
            .map_err(|err| SdkError::from_bridge("subscribe_events", err))?;
        Ok(self.core.events.forward(receiver).await)
    }

    pub fn push(&self) -> PushModule<'_, B> {
        PushModule::new(&self.core)
    }

    pub fn user(&self) -> UserModule<'_, B> {
        UserModule::new(&self.core)
    }

    pub fn messaging(&self) -> MessagingModule<'_, B> {
        MessagingModule::new(&self.core)
    }

    pub fn inbox(&self) -> InboxModule<'_, B> {
        InboxModule::new(&self.core)
    }
}
