//! End-to-end tests for the checkout submission protocol.

#![allow(clippy::unwrap_used)]

use spice_pantry_integration_tests::{IdStyle, OrderMode, TestContext};
use spice_pantry_storefront::api::OrderClient;
use spice_pantry_storefront::cart::CartStore;
use spice_pantry_storefront::checkout::{
    CheckoutError, CheckoutStep, ConfirmationSource, OfflineOrderPolicy,
};
use spice_pantry_storefront::session::Session;

fn assert_synthesized(id: &str) {
    let digits = id.strip_prefix("ORD-").expect("ORD- prefix");
    assert_eq!(digits.len(), 6);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn authenticated_submission_completes_and_clears_cart() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();

    assert_eq!(confirmation.source, ConfirmationSource::Server);
    assert!(confirmation.order_id.as_str().starts_with("ORD-"));
    // subtotal 2×120 + 1×140 = 380, plus flat ₹50 shipping
    assert_eq!(confirmation.total.amount, rust_decimal::Decimal::from(430));
    assert_eq!(workflow.step(), CheckoutStep::Complete);
    assert!(cart.is_empty());
    // The cleared cart was persisted too.
    assert!(CartStore::load(&ctx.store).is_empty());
    assert_eq!(ctx.state.order_count(), 1);
}

#[tokio::test]
async fn session_less_submission_uses_guest_endpoint() {
    let ctx = TestContext::new().await;
    let session = Session::load(&ctx.store); // never logged in
    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();

    assert_eq!(confirmation.source, ConfirmationSource::Guest);
    assert_eq!(workflow.step(), CheckoutStep::Complete);
    assert!(cart.is_empty());
    assert_eq!(ctx.state.order_count(), 1);
}

#[tokio::test]
async fn http_401_falls_back_to_guest_checkout() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    ctx.state.set_order_mode(OrderMode::RejectAuth);

    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();

    // The retry went through the guest endpoint and still completed.
    assert_eq!(confirmation.source, ConfirmationSource::Guest);
    assert_eq!(workflow.step(), CheckoutStep::Complete);
    assert!(cart.is_empty());
    assert_eq!(ctx.state.order_count(), 1);
}

#[tokio::test]
async fn http_400_halts_in_review_and_preserves_cart() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    ctx.state
        .set_order_mode(OrderMode::RejectInvalid("Invalid shipping address".to_string()));

    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let err = workflow
        .submit(&mut cart, &session, &orders)
        .await
        .unwrap_err();

    // The server's message is surfaced verbatim.
    let CheckoutError::Rejected(message) = err else {
        panic!("expected Rejected, got {err:?}");
    };
    assert_eq!(message, "Invalid shipping address");
    // Still reviewable: the cart is intact and the user may resubmit.
    assert_eq!(workflow.step(), CheckoutStep::Review);
    assert_eq!(cart.lines().len(), 2);
    assert!(!workflow.is_submitting());
    assert_eq!(ctx.state.order_count(), 0);
}

#[tokio::test]
async fn guest_retry_rejection_still_halts_in_review() {
    // 401 on the authenticated endpoint, then 400 on the guest retry.
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    ctx.state
        .set_order_mode(OrderMode::GuestRejectInvalid("Order total mismatch".to_string()));

    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let err = workflow
        .submit(&mut cart, &session, &orders)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Rejected(m) if m == "Order total mismatch"));
    assert_eq!(workflow.step(), CheckoutStep::Review);
    assert_eq!(cart.lines().len(), 2);
}

#[tokio::test]
async fn transport_failure_synthesizes_offline_confirmation() {
    let ctx = TestContext::offline().await;
    let session = Session::load(&ctx.store);
    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();

    assert_eq!(confirmation.source, ConfirmationSource::Offline);
    assert_synthesized(confirmation.order_id.as_str());
    assert_eq!(workflow.step(), CheckoutStep::Complete);
    assert!(cart.is_empty());
    assert!(CartStore::load(&ctx.store).is_empty());
}

#[tokio::test]
async fn server_error_also_follows_offline_policy() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    ctx.state.set_order_mode(OrderMode::ServerError);

    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();

    assert_eq!(confirmation.source, ConfirmationSource::Offline);
    assert_synthesized(confirmation.order_id.as_str());
    assert!(cart.is_empty());
}

#[tokio::test]
async fn reject_policy_surfaces_transport_failure() {
    let mut ctx = TestContext::offline().await;
    ctx.config.checkout.offline = OfflineOrderPolicy::Reject;

    let session = Session::load(&ctx.store);
    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let err = workflow
        .submit(&mut cart, &session, &orders)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Api(_)));
    assert_eq!(workflow.step(), CheckoutStep::Review);
    assert_eq!(cart.lines().len(), 2);
}

#[tokio::test]
async fn missing_server_id_is_synthesized_client_side() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    ctx.state.set_id_style(IdStyle::Omit);

    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();

    assert_eq!(confirmation.source, ConfirmationSource::Server);
    assert_synthesized(confirmation.order_id.as_str());
    assert!(cart.is_empty());
}

#[tokio::test]
async fn mongo_style_id_is_adopted() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    ctx.state.set_id_style(IdStyle::MongoId);

    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    let confirmation = workflow.submit(&mut cart, &session, &orders).await.unwrap();

    assert!(confirmation.order_id.as_str().starts_with("66f0"));
}

#[tokio::test]
async fn submitted_draft_carries_normalized_form_data() {
    let ctx = TestContext::new().await;
    let session = ctx.login().await;
    let mut cart = ctx.seeded_cart();
    let mut workflow = ctx.review_workflow();
    let orders = OrderClient::new(&ctx.config);

    workflow.submit(&mut cart, &session, &orders).await.unwrap();

    let stored = ctx.state.orders.lock().unwrap();
    let draft = stored.first().unwrap();
    // Phone normalized to bare 10 digits; zip under zipCode; totals computed.
    assert_eq!(draft["customer"]["phone"], "9876543210");
    assert_eq!(draft["shippingAddress"]["zipCode"], "600017");
    assert_eq!(draft["subtotal"]["amount"], "380");
    assert_eq!(draft["shipping"]["amount"], "50");
    assert_eq!(draft["total"]["amount"], "430");
    assert_eq!(draft["paymentMethod"], "cod");
    assert_eq!(draft["items"].as_array().unwrap().len(), 2);
}
