//! Order history and cancellation against the mock backend.

#![allow(clippy::unwrap_used)]

use spice_pantry_integration_tests::TestContext;
use spice_pantry_storefront::api::{ApiError, OrderClient};

#[tokio::test]
async fn user_orders_lists_placed_orders() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    let orders = OrderClient::new(&ctx.config);

    // Place two orders through the checkout workflow.
    for _ in 0..2 {
        let mut cart = ctx.seeded_cart();
        let mut workflow = ctx.review_workflow();
        workflow.submit(&mut cart, &session, &orders).await.unwrap();
    }

    let history = orders.user_orders(session.token().unwrap()).await.unwrap();
    assert_eq!(history.len(), 2);
    for order in &history {
        assert!(order.id().is_some());
        assert!(order.is_cancellable()); // freshly placed orders are pending
        assert_eq!(order.items.len(), 2);
    }
}

#[tokio::test]
async fn user_orders_requires_a_valid_token() {
    let ctx = TestContext::new().await;
    let orders = OrderClient::new(&ctx.config);

    let err = orders
        .user_orders(&secrecy::SecretString::from("stale-token"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn pending_order_can_be_cancelled_once() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    let orders = OrderClient::new(&ctx.config);

    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();
    let token = session.token().unwrap();

    orders.cancel(&confirmation.order_id, token).await.unwrap();

    let order = orders
        .get(&confirmation.order_id, Some(token))
        .await
        .unwrap();
    assert!(!order.is_cancellable());

    // A second cancel is refused with the server's message.
    let err = orders
        .cancel(&confirmation.order_id, token)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected(m) if m.contains("pending")));
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let ctx = TestContext::new().await;
    let orders = OrderClient::new(&ctx.config);

    let err = orders
        .get(&spice_pantry_core::OrderId::new("ORD-000000"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
