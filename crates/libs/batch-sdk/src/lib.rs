#![allow(clippy::result_large_err)]

//! Client core of the Batch mobile SDK.
//!
//! The crate validates and batches everything an application hands to the
//! SDK (profile edits, tracked events, inbox requests) and forwards the
//! result to the native runtime through [`batch_bridge::Bridge`].

mod client;
mod error;
pub mod event_bus;
pub mod event_data;
pub mod inbox;
pub mod lifecycle;
pub mod profile;
pub mod types;
pub mod validation;

pub use client::{Batch, InboxModule, MessagingModule, PushModule, UserModule};
pub use error::{code as error_code, ErrorCategory, ErrorDetails, SdkError};
pub use event_bus::{EventBus, EventParameters};
pub use event_data::{EventData, EventPayload, MAX_EVENT_ATTRIBUTES, MAX_EVENT_TAGS};
pub use inbox::{InboxPaginator, INBOX_FETCH_LIMIT, INBOX_MAX_IDLE_PAGES};
pub use lifecycle::{RuntimeState, SdkMethod};
pub use profile::{
    AttributeChange, ProfileDelta, ProfileEditor, ProfileOperation, ProfileState,
    TagCollectionChange,
};
pub use types::{
    AndroidNotificationType, AndroidNotificationTypes, AttributeValue, BatchConfig,
    InboxNotification, IosNotificationType, IosNotificationTypes, Location, MalformedRecord,
    NotificationId, NotificationSource, TypedValue,
};
pub use validation::{AttributeKey, Tag, ValidationError, ValidationWarning};
