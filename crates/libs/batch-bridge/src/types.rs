use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ── Operations ────────────────────────────────────────────────────────────────

/// Every call the client core forwards to the native runtime.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum OperationKind {
    SetConfig,
    Start,
    OptIn,
    OptOut,
    OptOutAndWipeData,
    SaveProfile,
    TrackEvent,
    TrackTransaction,
    TrackLocation,
    GetInstallationId,
    PrintDebugInformation,
    RegisterForRemoteNotifications,
    SetAndroidNotificationTypes,
    SetIosNotificationTypes,
    ClearBadge,
    DismissNotifications,
    GetLastKnownPushToken,
    SetDoNotDisturbEnabled,
    ShowPendingMessage,
    InboxMarkAsRead,
    InboxMarkAllAsRead,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetConfig => "set_config",
            Self::Start => "start",
            Self::OptIn => "opt_in",
            Self::OptOut => "opt_out",
            Self::OptOutAndWipeData => "opt_out_and_wipe_data",
            Self::SaveProfile => "save_profile",
            Self::TrackEvent => "track_event",
            Self::TrackTransaction => "track_transaction",
            Self::TrackLocation => "track_location",
            Self::GetInstallationId => "get_installation_id",
            Self::PrintDebugInformation => "print_debug_information",
            Self::RegisterForRemoteNotifications => "register_for_remote_notifications",
            Self::SetAndroidNotificationTypes => "set_android_notification_types",
            Self::SetIosNotificationTypes => "set_ios_notification_types",
            Self::ClearBadge => "clear_badge",
            Self::DismissNotifications => "dismiss_notifications",
            Self::GetLastKnownPushToken => "get_last_known_push_token",
            Self::SetDoNotDisturbEnabled => "set_do_not_disturb_enabled",
            Self::ShowPendingMessage => "show_pending_message",
            Self::InboxMarkAsRead => "inbox_mark_as_read",
            Self::InboxMarkAllAsRead => "inbox_mark_all_as_read",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Inbox ─────────────────────────────────────────────────────────────────────

/// Server-defined position in the notification history. Opaque to the client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PageCursor(pub String);

impl From<&str> for PageCursor {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Whose notification history a page request targets.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchScope {
    /// The current installation.
    Installation,
    /// A custom user identifier, authenticated by a key computed by the
    /// application backend. The key is passed through untouched.
    User { user_identifier: String, auth_key: String },
}

impl fmt::Debug for FetchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installation => f.write_str("Installation"),
            Self::User { user_identifier, .. } => f
                .debug_struct("User")
                .field("user_identifier", user_identifier)
                .field("auth_key", &"<redacted>")
                .finish(),
        }
    }
}

/// A notification record as delivered by the native runtime.
///
/// Every field is optional on the wire; the client validates records before
/// exposing them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct RawNotification {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub payload: BTreeMap<String, JsonValue>,
    /// Send date, milliseconds since the Unix epoch.
    pub sent_at_ms: Option<i64>,
    #[serde(default)]
    pub is_unread: bool,
    /// 0 = unknown, 1 = campaign, 2 = transactional.
    #[serde(default)]
    pub source: u8,
}

impl RawNotification {
    pub fn new(identifier: impl Into<String>, body: impl Into<String>, sent_at_ms: i64) -> Self {
        Self {
            identifier: Some(identifier.into()),
            body: Some(body.into()),
            sent_at_ms: Some(sent_at_ms),
            is_unread: true,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_source(mut self, source: u8) -> Self {
        self.source = source;
        self
    }

    pub fn with_unread(mut self, is_unread: bool) -> Self {
        self.is_unread = is_unread;
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct NotificationPage {
    #[serde(default)]
    pub notifications: Vec<RawNotification>,
    /// `None` once the server has nothing older to return.
    pub next_cursor: Option<PageCursor>,
}

impl NotificationPage {
    pub fn new(notifications: Vec<RawNotification>, next_cursor: Option<PageCursor>) -> Self {
        Self { notifications, next_cursor }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

/// A named event raised by the native runtime.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct BridgeEvent {
    pub name: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, JsonValue>,
}

impl BridgeEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), parameters: serde_json::Map::new() }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}
