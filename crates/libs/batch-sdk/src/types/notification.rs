use crate::validation::validate_date;
use batch_bridge::RawNotification;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use time::OffsetDateTime;

/// Opaque, stable identifier of an inbox notification.
///
/// Only ever compared for equality; its format is not part of any contract.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub String);

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What made Batch send the push.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSource {
    #[default]
    Unknown,
    Campaign,
    Transactional,
}

impl NotificationSource {
    pub fn from_wire(value: u8) -> Self {
        match value {
            1 => Self::Campaign,
            2 => Self::Transactional,
            _ => Self::Unknown,
        }
    }

    pub fn as_wire(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Campaign => 1,
            Self::Transactional => 2,
        }
    }
}

/// Why a raw record was dropped from a page.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("notification record has no identifier")]
    MissingIdentifier,
    #[error("notification record has no body")]
    MissingBody,
    #[error("notification record has no usable send date")]
    InvalidDate,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct InboxNotification {
    pub identifier: NotificationId,
    pub title: Option<String>,
    pub body: String,
    /// Rich attachment (image/audio/video); only populated on iOS.
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub payload: BTreeMap<String, JsonValue>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub is_unread: bool,
    pub source: NotificationSource,
}

impl InboxNotification {
    pub fn from_raw(raw: RawNotification) -> Result<Self, MalformedRecord> {
        let identifier = raw
            .identifier
            .filter(|identifier| !identifier.is_empty())
            .ok_or(MalformedRecord::MissingIdentifier)?;
        let body =
            raw.body.filter(|body| !body.trim().is_empty()).ok_or(MalformedRecord::MissingBody)?;
        let date = raw
            .sent_at_ms
            .and_then(|ms| {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
            })
            .and_then(|date| validate_date(date).ok())
            .ok_or(MalformedRecord::InvalidDate)?;

        Ok(Self {
            identifier: NotificationId(identifier),
            title: raw.title.filter(|title| !title.is_empty()),
            body,
            attachment_url: raw.attachment_url.filter(|url| !url.is_empty()),
            payload: raw.payload,
            date,
            is_unread: raw.is_unread,
            source: NotificationSource::from_wire(raw.source),
        })
    }
}
