//! Cursor-driven accumulation of the notification history.

use crate::client::ClientCore;
use crate::error::{code, ErrorCategory, SdkError};
use crate::lifecycle::SdkMethod;
use crate::types::{InboxNotification, NotificationId};
use batch_bridge::{Bridge, FetchScope, OperationKind, PageCursor};
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Most notifications `fetch_all` gathers in one run.
pub const INBOX_FETCH_LIMIT: usize = 100;

/// Consecutive pages without a new notification after which `fetch_all`
/// gives up on the current run.
pub const INBOX_MAX_IDLE_PAGES: usize = 3;

pub struct InboxPaginator<B: Bridge> {
    core: Arc<ClientCore<B>>,
    scope: FetchScope,
    cursor: Option<PageCursor>,
    notifications: Vec<InboxNotification>,
    seen: HashSet<NotificationId>,
    end_of_data: bool,
    malformed_count: usize,
}

impl<B: Bridge> fmt::Debug for InboxPaginator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboxPaginator")
            .field("scope", &self.scope)
            .field("cursor", &self.cursor)
            .field("notifications", &self.notifications.len())
            .field("end_of_data", &self.end_of_data)
            .finish_non_exhaustive()
    }
}

impl<B: Bridge> InboxPaginator<B> {
    pub(crate) fn new(core: Arc<ClientCore<B>>, scope: FetchScope) -> Self {
        Self {
            core,
            scope,
            cursor: None,
            notifications: Vec::new(),
            seen: HashSet::new(),
            end_of_data: false,
            malformed_count: 0,
        }
    }

    /// Fetch one page and merge it into the accumulated list.
    ///
    /// Returns the number of notifications that were not seen before. Once
    /// the end of the history was reached this returns `Ok(0)` without
    /// contacting the native runtime.
    pub async fn fetch_next_page(&mut self) -> Result<usize, SdkError> {
        if self.end_of_data {
            return Ok(0);
        }
        self.core.ensure_method_legal(SdkMethod::FetchInbox)?;

        let page = self
            .core
            .bridge()
            .fetch_page(self.cursor.clone(), self.scope.clone())
            .await
            .map_err(|err| {
                log::warn!("inbox page fetch failed: {err}");
                SdkError::from_fetch(err)
            })?;

        let record_count = page.notifications.len();
        let mut valid = Vec::with_capacity(record_count);
        for raw in page.notifications {
            match InboxNotification::from_raw(raw) {
                Ok(notification) => valid.push(notification),
                Err(reason) => {
                    self.malformed_count += 1;
                    log::warn!("dropping malformed inbox record: {reason}");
                }
            }
        }

        // Advance even on a fully malformed page so a retry moves on.
        self.advance(page.next_cursor);

        if record_count > 0 && valid.is_empty() {
            return Err(SdkError::malformed_page(record_count));
        }

        let mut added = 0;
        for notification in valid {
            if self.seen.insert(notification.identifier.clone()) {
                self.notifications.push(notification);
                added += 1;
            }
        }
        // Stable: equal dates keep arrival order.
        self.notifications.sort_by(|a, b| b.date.cmp(&a.date));
        log::debug!(
            "inbox page merged: {added} new, {} total, end_of_data={}",
            self.notifications.len(),
            self.end_of_data
        );
        Ok(added)
    }

    fn advance(&mut self, next_cursor: Option<PageCursor>) {
        match next_cursor {
            None => self.end_of_data = true,
            Some(next) if self.cursor.as_ref() == Some(&next) => {
                log::warn!("inbox cursor did not advance; treating history as complete");
                self.end_of_data = true;
            }
            Some(next) => self.cursor = Some(next),
        }
    }

    /// Fetch pages until the server reports the end of the history or
    /// [`INBOX_FETCH_LIMIT`] notifications are gathered. A page that pushes
    /// the count past the limit is kept whole.
    ///
    /// The run also stops after [`INBOX_MAX_IDLE_PAGES`] pages in a row that
    /// added nothing. The cursor is kept, so `has_more` stays true and a
    /// later call resumes from there.
    pub async fn fetch_all(&mut self) -> Result<&[InboxNotification], SdkError> {
        let mut idle_pages = 0;
        while !self.end_of_data && self.notifications.len() < INBOX_FETCH_LIMIT {
            if self.fetch_next_page().await? > 0 {
                idle_pages = 0;
                continue;
            }
            idle_pages += 1;
            if idle_pages >= INBOX_MAX_IDLE_PAGES && !self.end_of_data {
                log::warn!("{idle_pages} inbox pages in a row added nothing; stopping this run");
                break;
            }
        }
        Ok(&self.notifications)
    }

    /// Accumulated notifications, most recent first.
    pub fn notifications(&self) -> &[InboxNotification] {
        &self.notifications
    }

    pub fn into_notifications(self) -> Vec<InboxNotification> {
        self.notifications
    }

    pub fn has_more(&self) -> bool {
        !self.end_of_data
    }

    pub fn malformed_count(&self) -> usize {
        self.malformed_count
    }

    pub fn scope(&self) -> &FetchScope {
        &self.scope
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|notification| notification.is_unread).count()
    }

    /// Forward a read marker for one fetched notification.
    pub async fn mark_as_read(&mut self, identifier: &NotificationId) -> Result<(), SdkError> {
        let Some(index) = self
            .notifications
            .iter()
            .position(|notification| &notification.identifier == identifier)
        else {
            return Err(SdkError::new(
                code::INBOX_UNKNOWN_NOTIFICATION,
                ErrorCategory::Validation,
                format!("notification '{identifier}' was not fetched by this paginator"),
            )
            .with_user_actionable(true)
            .with_detail("identifier", JsonValue::String(identifier.to_string())));
        };

        let payload = json!({ "identifier": identifier, "scope": self.scope });
        self.core.call(SdkMethod::MarkInboxRead, OperationKind::InboxMarkAsRead, payload).await?;
        self.notifications[index].is_unread = false;
        Ok(())
    }

    pub async fn mark_all_as_read(&mut self) -> Result<(), SdkError> {
        let payload = json!({ "scope": self.scope });
        self.core
            .call(SdkMethod::MarkInboxRead, OperationKind::InboxMarkAllAsRead, payload)
            .await?;
        for notification in &mut self.notifications {
            notification.is_unread = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
