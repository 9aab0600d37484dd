use super::{to_payload, ClientCore};
use crate::error::{code, ErrorCategory, SdkError};
use crate::event_data::{event_payload, EventPayload};
use crate::inbox::InboxPaginator;
use crate::lifecycle::SdkMethod;
use crate::profile::{ProfileEditor, ProfileState};
use crate::types::{AndroidNotificationTypes, InboxNotification, IosNotificationTypes, Location};
use batch_bridge::{Bridge, FetchScope, OperationKind};
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;

/// `Null` means the native runtime has no value yet.
fn optional_string(kind: OperationKind, value: JsonValue) -> Result<Option<String>, SdkError> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(value) => Ok(Some(value)),
        other => Err(SdkError::new(
            code::INTERNAL,
            ErrorCategory::Internal,
            format!("expected a string from {kind}, got {other}"),
        )
        .with_detail("operation", JsonValue::String(kind.as_str().to_owned()))),
    }
}

/// Push registration and notification presentation settings.
pub struct PushModule<'a, B: Bridge> {
    core: &'a Arc<ClientCore<B>>,
}

impl<'a, B: Bridge> PushModule<'a, B> {
    pub(super) fn new(core: &'a Arc<ClientCore<B>>) -> Self {
        Self { core }
    }

    pub async fn register_for_remote_notifications(&self) -> Result<(), SdkError> {
        self.core
            .call(
                SdkMethod::PushSettings,
                OperationKind::RegisterForRemoteNotifications,
                JsonValue::Null,
            )
            .await?;
        Ok(())
    }

    pub async fn set_android_notification_types(
        &self,
        types: AndroidNotificationTypes,
    ) -> Result<(), SdkError> {
        self.core
            .call(
                SdkMethod::PushSettings,
                OperationKind::SetAndroidNotificationTypes,
                json!({ "types": types.bits() }),
            )
            .await?;
        Ok(())
    }

    pub async fn set_ios_notification_types(
        &self,
        types: IosNotificationTypes,
    ) -> Result<(), SdkError> {
        self.core
            .call(
                SdkMethod::PushSettings,
                OperationKind::SetIosNotificationTypes,
                json!({ "types": types.bits() }),
            )
            .await?;
        Ok(())
    }

    pub async fn clear_badge(&self) -> Result<(), SdkError> {
        self.core.call(SdkMethod::PushSettings, OperationKind::ClearBadge, JsonValue::Null).await?;
        Ok(())
    }

    pub async fn dismiss_notifications(&self) -> Result<(), SdkError> {
        self.core
            .call(SdkMethod::PushSettings, OperationKind::DismissNotifications, JsonValue::Null)
            .await?;
        Ok(())
    }

    pub async fn last_known_push_token(&self) -> Result<Option<String>, SdkError> {
        let kind = OperationKind::GetLastKnownPushToken;
        let value = self.core.call(SdkMethod::GetPushToken, kind, JsonValue::Null).await?;
        optional_string(kind, value)
    }
}

/// Profile transactions, installation data and event tracking.
pub struct UserModule<'a, B: Bridge> {
    core: &'a Arc<ClientCore<B>>,
}

impl<'a, B: Bridge> UserModule<'a, B> {
    pub(super) fn new(core: &'a Arc<ClientCore<B>>) -> Self {
        Self { core }
    }

    /// A fresh, independent profile transaction.
    pub fn editor(&self) -> ProfileEditor<B> {
        ProfileEditor::new(Arc::clone(self.core))
    }

    pub async fn installation_id(&self) -> Result<Option<String>, SdkError> {
        let kind = OperationKind::GetInstallationId;
        let value = self.core.call(SdkMethod::GetInstallationId, kind, JsonValue::Null).await?;
        optional_string(kind, value)
    }

    /// The profile as of the last successful save.
    pub fn profile_snapshot(&self) -> ProfileState {
        self.core.profile_snapshot()
    }

    pub async fn print_debug_information(&self) -> Result<(), SdkError> {
        self.core
            .call(
                SdkMethod::PrintDebugInformation,
                OperationKind::PrintDebugInformation,
                JsonValue::Null,
            )
            .await?;
        Ok(())
    }

    pub async fn track_event(
        &self,
        name: &str,
        label: Option<&str>,
        data: Option<EventPayload>,
    ) -> Result<(), SdkError> {
        let payload = event_payload(name, label, data)?;
        self.core.call(SdkMethod::Track, OperationKind::TrackEvent, payload).await?;
        Ok(())
    }

    /// `data` is a free-form map forwarded to the native runtime as is.
    pub async fn track_transaction(
        &self,
        amount: f64,
        data: Option<Map<String, JsonValue>>,
    ) -> Result<(), SdkError> {
        if !amount.is_finite() {
            return Err(SdkError::invalid_argument("amount", "transaction amount must be finite"));
        }
        let payload = json!({ "amount": amount, "data": data });
        self.core.call(SdkMethod::Track, OperationKind::TrackTransaction, payload).await?;
        Ok(())
    }

    pub async fn track_location(&self, location: Location) -> Result<(), SdkError> {
        let location = location.validated()?;
        self.core
            .call(SdkMethod::Track, OperationKind::TrackLocation, to_payload(&location)?)
            .await?;
        Ok(())
    }
}

/// In-app message display controls.
pub struct MessagingModule<'a, B: Bridge> {
    core: &'a Arc<ClientCore<B>>,
}

impl<'a, B: Bridge> MessagingModule<'a, B> {
    pub(super) fn new(core: &'a Arc<ClientCore<B>>) -> Self {
        Self { core }
    }

    /// While enabled, the native runtime queues messages instead of showing
    /// them.
    pub async fn set_do_not_disturb_enabled(&self, enabled: bool) -> Result<(), SdkError> {
        self.core
            .call(
                SdkMethod::Messaging,
                OperationKind::SetDoNotDisturbEnabled,
                json!({ "enabled": enabled }),
            )
            .await?;
        Ok(())
    }

    pub async fn show_pending_message(&self) -> Result<(), SdkError> {
        self.core
            .call(SdkMethod::Messaging, OperationKind::ShowPendingMessage, JsonValue::Null)
            .await?;
        Ok(())
    }
}

/// Notification history.
pub struct InboxModule<'a, B: Bridge> {
    core: &'a Arc<ClientCore<B>>,
}

impl<'a, B: Bridge> InboxModule<'a, B> {
    pub(super) fn new(core: &'a Arc<ClientCore<B>>) -> Self {
        Self { core }
    }

    pub fn installation_paginator(&self) -> InboxPaginator<B> {
        InboxPaginator::new(Arc::clone(self.core), FetchScope::Installation)
    }

    /// `auth_key` is computed by the application backend and passed through
    /// untouched.
    pub fn user_paginator(
        &self,
        user_identifier: &str,
        auth_key: &str,
    ) -> Result<InboxPaginator<B>, SdkError> {
        if user_identifier.is_empty() {
            return Err(SdkError::invalid_argument(
                "user_identifier",
                "user identifier must not be empty",
            ));
        }
        if auth_key.is_empty() {
            return Err(SdkError::invalid_argument(
                "auth_key",
                "authentication key must not be empty",
            ));
        }
        let scope = FetchScope::User {
            user_identifier: user_identifier.to_owned(),
            auth_key: auth_key.to_owned(),
        };
        Ok(InboxPaginator::new(Arc::clone(self.core), scope))
    }

    /// Up to [`crate::inbox::INBOX_FETCH_LIMIT`] notifications of the current
    /// installation, most recent first.
    pub async fn fetch_notifications(&self) -> Result<Vec<InboxNotification>, SdkError> {
        let mut paginator = self.installation_paginator();
        paginator.fetch_all().await?;
        Ok(paginator.into_notifications())
    }

    pub async fn fetch_notifications_for_user_identifier(
        &self,
        user_identifier: &str,
        auth_key: &str,
    ) -> Result<Vec<InboxNotification>, SdkError> {
        let mut paginator = self.user_paginator(user_identifier, auth_key)?;
        paginator.fetch_all().await?;
        Ok(paginator.into_notifications())
    }
}
