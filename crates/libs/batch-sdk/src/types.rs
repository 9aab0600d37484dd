mod config;
mod location;
mod notification;
mod push;
mod value;

pub use config::BatchConfig;
pub use location::Location;
pub use notification::{InboxNotification, MalformedRecord, NotificationId, NotificationSource};
pub use push::{
    AndroidNotificationType, AndroidNotificationTypes, IosNotificationType, IosNotificationTypes,
};
pub use value::{AttributeValue, TypedValue};
