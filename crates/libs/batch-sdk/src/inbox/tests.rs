use super::*;
use crate::types::BatchConfig;
use crate::Batch;
use batch_bridge::{BridgeError, LoopbackBridge, NotificationPage, RawNotification};

async fn started_client() -> Batch<LoopbackBridge> {
    let batch = Batch::new(LoopbackBridge::new());
    batch.set_config(BatchConfig::new().with_ios_api_key("DEV_KEY")).await.expect("set_config");
    batch.start().await.expect("start");
    batch
}

fn record(id: &str, sent_at_ms: i64) -> RawNotification {
    RawNotification::new(id, format!("body of {id}"), sent_at_ms)
}

fn page(records: Vec<RawNotification>, next: Option<&str>) -> NotificationPage {
    NotificationPage::new(records, next.map(PageCursor::from))
}

fn ids(paginator: &InboxPaginator<LoopbackBridge>) -> Vec<String> {
    paginator.notifications().iter().map(|n| n.identifier.to_string()).collect()
}

#[tokio::test]
async fn pages_merge_in_descending_date_order_without_duplicates() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(vec![record("a", 300), record("b", 100)], Some("p2"))));
    batch.bridge().queue_page(Ok(page(vec![record("b", 100), record("c", 200)], None)));

    let mut paginator = batch.inbox().installation_paginator();
    assert_eq!(paginator.fetch_next_page().await.expect("page 1"), 2);
    assert_eq!(paginator.fetch_next_page().await.expect("page 2"), 1);
    assert_eq!(ids(&paginator), vec!["a", "c", "b"]);
    assert!(!paginator.has_more());

    let fetches = batch.bridge().fetches();
    assert_eq!(fetches.len(), 2);
    assert_eq!(fetches[0].cursor, None);
    assert_eq!(fetches[1].cursor, Some(PageCursor::from("p2")));
    assert_eq!(fetches[0].scope, FetchScope::Installation);
}

#[tokio::test]
async fn equal_dates_keep_arrival_order() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(vec![record("first", 50), record("second", 50)], Some("n"))));
    batch.bridge().queue_page(Ok(page(vec![record("third", 50)], None)));

    let mut paginator = batch.inbox().installation_paginator();
    paginator.fetch_all().await.expect("fetch_all");
    assert_eq!(ids(&paginator), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn fetch_after_end_of_data_does_not_call_bridge() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(vec![record("a", 1)], None)));

    let mut paginator = batch.inbox().installation_paginator();
    paginator.fetch_next_page().await.expect("only page");
    assert_eq!(paginator.fetch_next_page().await.expect("no-op"), 0);
    assert_eq!(batch.bridge().fetches().len(), 1);
}

#[tokio::test]
async fn malformed_records_are_dropped_and_counted() {
    let batch = started_client().await;
    let mut no_body = record("broken", 10);
    no_body.body = None;
    batch.bridge().queue_page(Ok(page(vec![record("ok", 20), no_body], None)));

    let mut paginator = batch.inbox().installation_paginator();
    assert_eq!(paginator.fetch_next_page().await.expect("page"), 1);
    assert_eq!(ids(&paginator), vec!["ok"]);
    assert_eq!(paginator.malformed_count(), 1);
}

#[tokio::test]
async fn fully_malformed_page_fails_and_moves_on() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(vec![record("", 10), record("x", i64::MAX)], Some("p2"))));
    batch.bridge().queue_page(Ok(page(vec![record("good", 5)], None)));

    let mut paginator = batch.inbox().installation_paginator();
    let err = paginator.fetch_next_page().await.expect_err("every record malformed");
    assert_eq!(err.code(), code::INBOX_MALFORMED_PAGE);
    assert!(err.is_fetch_error());
    assert_eq!(paginator.malformed_count(), 2);

    assert_eq!(paginator.fetch_next_page().await.expect("next page"), 1);
    assert_eq!(ids(&paginator), vec!["good"]);
}

#[tokio::test]
async fn empty_page_is_not_an_error() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(Vec::new(), None)));

    let mut paginator = batch.inbox().installation_paginator();
    assert_eq!(paginator.fetch_next_page().await.expect("empty page"), 0);
    assert!(paginator.notifications().is_empty());
}

#[tokio::test]
async fn fetch_all_stops_at_the_limit() {
    let batch = started_client().await;
    for page_index in 0..5i64 {
        let records = (0..30i64)
            .map(|i| {
                let n = page_index * 30 + i;
                record(&format!("n{n}"), 1_000_000 - n)
            })
            .collect();
        batch.bridge().queue_page(Ok(page(records, Some(&format!("p{}", page_index + 1)))));
    }

    let mut paginator = batch.inbox().installation_paginator();
    let count = paginator.fetch_all().await.expect("fetch_all").len();
    assert_eq!(count, 120);
    assert_eq!(batch.bridge().fetches().len(), 4);
    assert!(paginator.has_more());
}

#[tokio::test]
async fn stalled_cursor_ends_the_history() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(vec![record("a", 2)], Some("same"))));
    batch.bridge().queue_page(Ok(page(vec![record("a", 2)], Some("same"))));

    let mut paginator = batch.inbox().installation_paginator();
    paginator.fetch_all().await.expect("fetch_all");
    assert_eq!(batch.bridge().fetches().len(), 2);
    assert!(!paginator.has_more());
}

#[tokio::test]
async fn fetch_all_gives_up_after_idle_pages() {
    let batch = started_client().await;
    for index in 0..5 {
        batch.bridge().queue_page(Ok(page(Vec::new(), Some(&format!("empty{index}")))));
    }

    let mut paginator = batch.inbox().installation_paginator();
    assert!(paginator.fetch_all().await.expect("fetch_all").is_empty());
    assert_eq!(batch.bridge().fetches().len(), INBOX_MAX_IDLE_PAGES);
    assert!(paginator.has_more());

    paginator.fetch_next_page().await.expect("resumes from the kept cursor");
    let fetches = batch.bridge().fetches();
    assert_eq!(fetches.len(), INBOX_MAX_IDLE_PAGES + 1);
    assert_eq!(fetches[INBOX_MAX_IDLE_PAGES].cursor, Some(PageCursor::from("empty2")));
}

#[tokio::test]
async fn duplicate_pages_reset_only_when_something_new_arrives() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(vec![record("a", 3)], Some("p1"))));
    batch.bridge().queue_page(Ok(page(vec![record("a", 3)], Some("p2"))));
    batch.bridge().queue_page(Ok(page(vec![record("a", 3)], Some("p3"))));
    batch.bridge().queue_page(Ok(page(vec![record("b", 2)], None)));

    let mut paginator = batch.inbox().installation_paginator();
    paginator.fetch_all().await.expect("fetch_all");
    assert_eq!(ids(&paginator), vec!["a", "b"]);
    assert!(!paginator.has_more());
}

#[tokio::test]
async fn fetch_errors_map_to_fetch_family() {
    let batch = started_client().await;
    batch.bridge().queue_page(Err(BridgeError::AuthRejected { message: "bad key".into() }));
    batch.bridge().queue_page(Err(BridgeError::transport("offline")));

    let mut paginator =
        batch.inbox().user_paginator("user-1", "auth-key").expect("valid user scope");
    let err = paginator.fetch_next_page().await.expect_err("auth");
    assert_eq!(err.code(), code::INBOX_FETCH_AUTH_REJECTED);
    let err = paginator.fetch_next_page().await.expect_err("network");
    assert_eq!(err.code(), code::INBOX_FETCH_NETWORK);
    assert!(err.is_retryable());
    assert!(paginator.has_more());

    assert_eq!(
        batch.bridge().fetches()[0].scope,
        FetchScope::User { user_identifier: "user-1".into(), auth_key: "auth-key".into() }
    );
}

#[tokio::test]
async fn fetch_before_start_is_not_ready() {
    let batch = Batch::new(LoopbackBridge::new());
    let mut paginator = batch.inbox().installation_paginator();
    let err = paginator.fetch_next_page().await.expect_err("not started");
    assert_eq!(err.code(), code::INBOX_FETCH_NOT_READY);
    assert!(err.is_fetch_error());
    assert!(batch.bridge().fetches().is_empty());
}

#[tokio::test]
async fn user_scope_requires_identifier_and_key() {
    let batch = started_client().await;
    let err = batch.inbox().user_paginator("", "key").expect_err("empty identifier");
    assert_eq!(err.details.get("field"), Some(&JsonValue::from("user_identifier")));
    let err = batch.inbox().user_paginator("user", "").expect_err("empty key");
    assert_eq!(err.details.get("field"), Some(&JsonValue::from("auth_key")));
}

#[tokio::test]
async fn read_markers_are_forwarded() {
    let batch = started_client().await;
    batch.bridge().queue_page(Ok(page(vec![record("a", 2), record("b", 1)], None)));

    let mut paginator = batch.inbox().installation_paginator();
    paginator.fetch_all().await.expect("fetch_all");
    assert_eq!(paginator.unread_count(), 2);

    paginator.mark_as_read(&NotificationId::from("a")).await.expect("mark a");
    assert_eq!(paginator.unread_count(), 1);
    let marks = batch.bridge().payloads(OperationKind::InboxMarkAsRead);
    assert_eq!(marks, vec![json!({"identifier": "a", "scope": {"kind": "installation"}})]);

    let err = paginator.mark_as_read(&NotificationId::from("zzz")).await.expect_err("unknown");
    assert_eq!(err.code(), code::INBOX_UNKNOWN_NOTIFICATION);

    paginator.mark_all_as_read().await.expect("mark all");
    assert_eq!(paginator.unread_count(), 0);
    assert_eq!(batch.bridge().payloads(OperationKind::InboxMarkAllAsRead).len(), 1);
}
