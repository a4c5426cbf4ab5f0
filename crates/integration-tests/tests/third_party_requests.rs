//! Other bus clients sending JSON orders on `order_request`.

use std::time::Duration;

use order_relay_bus::{Bytes, MessageBus};
use order_relay_core::Order;
use order_relay_core::subjects::{ORDER_QUERY, ORDER_REQUEST, ORDER_RESPONSE};
use order_relay_integration_tests::{SAMPLE_ORDER_UID, TestContext, sample_order};
use tokio::time::Instant;

const TIMEOUT: Duration = Duration::from_millis(500);

fn soon() -> Instant {
    Instant::now() + Duration::from_millis(300)
}

#[tokio::test]
async fn test_uncached_order_is_forwarded_to_query() {
    let ctx = TestContext::new([sample_order(SAMPLE_ORDER_UID)], TIMEOUT).await;
    let mut queries = ctx.bus.subscribe(ORDER_QUERY).await.unwrap();
    let payload = Bytes::from(sample_order(SAMPLE_ORDER_UID).to_json().unwrap());

    ctx.bus
        .publish_with_reply(ORDER_REQUEST, "_INBOX.third-party", payload.clone())
        .await
        .unwrap();

    let forwarded = queries.next_before(soon()).await.unwrap();
    assert_eq!(forwarded.payload, payload);
    // The resolver only answers bare identifiers.
    assert_eq!(ctx.bus.published_on(ORDER_RESPONSE), 0);
}

#[tokio::test]
async fn test_cached_order_is_answered_to_reply_inbox() {
    let ctx = TestContext::new([sample_order(SAMPLE_ORDER_UID)], TIMEOUT).await;
    ctx.get(&format!("/order/?orderUID={SAMPLE_ORDER_UID}")).await;
    ctx.wait_until_cached(SAMPLE_ORDER_UID).await;

    let mut inbox = ctx.bus.subscribe("_INBOX.third-party").await.unwrap();
    ctx.bus
        .publish_with_reply(
            ORDER_REQUEST,
            "_INBOX.third-party",
            Bytes::from(sample_order(SAMPLE_ORDER_UID).to_json().unwrap()),
        )
        .await
        .unwrap();

    let reply = inbox.next_before(soon()).await.unwrap();
    assert_eq!(
        Order::from_json(&reply.payload).unwrap(),
        sample_order(SAMPLE_ORDER_UID)
    );
    assert_eq!(ctx.bus.published_on(ORDER_QUERY), 0);
}

#[tokio::test]
async fn test_uid_only_request_is_answered_from_cache() {
    let ctx = TestContext::new([sample_order(SAMPLE_ORDER_UID)], TIMEOUT).await;
    ctx.get(&format!("/order/?orderUID={SAMPLE_ORDER_UID}")).await;
    ctx.wait_until_cached(SAMPLE_ORDER_UID).await;

    let mut inbox = ctx.bus.subscribe("_INBOX.third-party").await.unwrap();
    let payload = format!(r#"{{"order_uid":"{SAMPLE_ORDER_UID}"}}"#);
    ctx.bus
        .publish_with_reply(ORDER_REQUEST, "_INBOX.third-party", Bytes::from(payload))
        .await
        .unwrap();

    let reply = inbox.next_before(soon()).await.unwrap();
    assert_eq!(
        Order::from_json(&reply.payload).unwrap(),
        sample_order(SAMPLE_ORDER_UID)
    );
    assert_eq!(ctx.bus.published_on(ORDER_QUERY), 0);
}

#[tokio::test]
async fn test_uid_only_request_miss_is_forwarded_unchanged() {
    let ctx = TestContext::new(Vec::<Order>::new(), TIMEOUT).await;
    let mut queries = ctx.bus.subscribe(ORDER_QUERY).await.unwrap();
    let payload = Bytes::from_static(br#"{"order_uid":"zzz"}"#);

    ctx.bus
        .publish_with_reply(ORDER_REQUEST, "_INBOX.third-party", payload.clone())
        .await
        .unwrap();

    let forwarded = queries.next_before(soon()).await.unwrap();
    assert_eq!(forwarded.payload, payload);
}

#[tokio::test]
async fn test_bare_identifier_from_third_party_is_resolved() {
    let ctx = TestContext::new([sample_order(SAMPLE_ORDER_UID)], TIMEOUT).await;
    let mut responses = ctx.bus.subscribe(ORDER_RESPONSE).await.unwrap();

    ctx.bus
        .publish_with_reply(
            ORDER_REQUEST,
            "_INBOX.third-party",
            Bytes::from_static(SAMPLE_ORDER_UID.as_bytes()),
        )
        .await
        .unwrap();

    let response = responses.next_before(soon()).await.unwrap();
    assert_eq!(response.reply.as_deref(), Some("_INBOX.third-party"));
    ctx.wait_until_cached(SAMPLE_ORDER_UID).await;
}

#[tokio::test]
async fn test_garbage_on_request_subject_is_ignored() {
    let ctx = TestContext::new([sample_order(SAMPLE_ORDER_UID)], TIMEOUT).await;

    ctx.bus
        .publish(ORDER_REQUEST, Bytes::from_static(b"{not json"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(ctx.bus.published_on(ORDER_QUERY), 0);
    assert_eq!(ctx.bus.published_on(ORDER_RESPONSE), 0);
    assert!(ctx.state.cache().is_empty());

    // Still serving afterwards.
    let (status, _) = ctx
        .get(&format!("/order/?orderUID={SAMPLE_ORDER_UID}"))
        .await;
    assert!(status.is_success());
}
