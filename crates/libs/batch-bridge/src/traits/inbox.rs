use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::{FetchScope, NotificationPage, PageCursor};

/// Remote notification history, one page per call.
#[async_trait]
pub trait InboxSource: Send + Sync {
    /// Fetch the page following `cursor` (`None` starts from the most recent
    /// notification). A page with `next_cursor == None` is the last one.
    async fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
        scope: FetchScope,
    ) -> Result<NotificationPage, BridgeError>;
}
