//! Checkout workflow.
//!
//! Drives the user through Delivery → Payment → Review → Complete, gating
//! progress on field validation, and reconciles the cart with the remote
//! order service on submission. Collaborators (cart store, session, order
//! client) are passed in explicitly rather than read from ambient state.
//!
//! # Submission protocol
//!
//! On `Review → Complete`:
//!
//! 1. Compute subtotal + flat shipping fee from the cart snapshot.
//! 2. Compose the transient [`OrderDraft`].
//! 3. Submit to the authenticated endpoint when a token is cached,
//!    otherwise to the guest endpoint.
//! 4. On success, adopt the server's order id (or synthesize one if the
//!    server omits it), clear the cart, complete.
//! 5. On 401, retry once through the guest endpoint; the retry's failure
//!    is classified like any first-attempt failure.
//! 6. On 400, stop: stay in Review, surface the server's message, keep
//!    the cart.
//! 7. On any other failure, apply the configured [`OfflineOrderPolicy`]:
//!    `confirm` waits a short fixed delay, synthesizes an `ORD-` id,
//!    clears the cart and completes anyway; `reject` surfaces the error
//!    and stays in Review.
//!
//! Exactly one submission may be in flight at a time.

pub mod validate;

use std::time::Duration;

use chrono::Utc;
use rand::Rng as _;
use rust_decimal::Decimal;
use thiserror::Error;

use spice_pantry_core::{OrderId, OrderStatus, PaymentMethod, Phone, Price};

use crate::api::{ApiError, CustomerInfo, OrderClient, OrderDraft, OrderItem, ShippingAddress};
use crate::cart::{CartAction, CartStore};
use crate::session::Session;
use crate::storage::StorageError;

pub use validate::{DeliveryDetails, Field, FieldErrors, validate_delivery, validate_field};

/// Fixed delay before an offline confirmation is issued. Not
/// interruptible.
const OFFLINE_CONFIRM_DELAY: Duration = Duration::from_secs(2);

/// Default flat shipping fee in rupees.
const DEFAULT_SHIPPING_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// The steps of the checkout wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Collecting delivery details; forward transition is validated.
    Delivery,
    /// Selecting a payment method; always has a default, so the forward
    /// transition is unguarded.
    Payment,
    /// Reviewing the order; submission happens from here.
    Review,
    /// Terminal: an order identifier has been assigned.
    Complete,
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivery => write!(f, "delivery"),
            Self::Payment => write!(f, "payment"),
            Self::Review => write!(f, "review"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// What to do when the order service is unreachable at submit time.
///
/// `Confirm` trades consistency for availability: the user always sees a
/// confirmation, at the cost of possible orders with no server record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfflineOrderPolicy {
    /// Wait a short delay, synthesize an `ORD-` identifier, clear the
    /// cart, and complete anyway.
    #[default]
    Confirm,
    /// Surface the failure and stay in Review with the cart intact.
    Reject,
}

impl std::str::FromStr for OfflineOrderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "confirm" => Ok(Self::Confirm),
            "reject" => Ok(Self::Reject),
            _ => Err(format!(
                "invalid offline order policy: {s} (expected confirm or reject)"
            )),
        }
    }
}

/// Checkout knobs, usually taken from [`StorefrontConfig`](crate::config::StorefrontConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Behavior when the order service is unreachable.
    pub offline: OfflineOrderPolicy,
    /// Flat shipping fee added to every order, in rupees.
    pub shipping_fee: Decimal,
    /// Delay before an offline confirmation is issued.
    pub offline_confirm_delay: Duration,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            offline: OfflineOrderPolicy::default(),
            shipping_fee: DEFAULT_SHIPPING_FEE,
            offline_confirm_delay: OFFLINE_CONFIRM_DELAY,
        }
    }
}

/// Computed order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

/// Compute subtotal, flat shipping, and rounded total for the current
/// cart.
#[must_use]
pub fn order_totals(cart: &CartStore, shipping_fee: Decimal) -> OrderTotals {
    let subtotal = cart.subtotal();
    let shipping = Price::new(shipping_fee, subtotal.currency_code);
    let total = (subtotal + shipping).rounded();
    OrderTotals {
        subtotal,
        shipping,
        total,
    }
}

/// Where the confirmed order identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationSource {
    /// The authenticated endpoint accepted the order.
    Server,
    /// The guest endpoint accepted the order (first call or 401 retry).
    Guest,
    /// The service was unreachable; the identifier was synthesized
    /// locally under [`OfflineOrderPolicy::Confirm`].
    Offline,
}

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub source: ConfirmationSource,
    pub total: Price,
}

/// Errors that can end a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A submission is already in flight; repeated submits are ignored.
    #[error("an order submission is already in flight")]
    SubmissionInFlight,

    /// `submit` was called away from the Review step.
    #[error("checkout is not at the review step")]
    NotAtReview,

    /// The cart has nothing to order.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// The order service rejected the order as invalid (HTTP 400). The
    /// workflow stays in Review with the cart intact; the message is the
    /// server's own.
    #[error("{0}")]
    Rejected(String),

    /// The order service failed and the offline policy is `reject`.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting the cleared cart failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The checkout wizard state machine.
///
/// Owns the entered form data and the current step; the cart, session, and
/// order client are injected per call.
#[derive(Debug, Default)]
pub struct CheckoutWorkflow {
    step: CheckoutStepState,
    delivery: DeliveryDetails,
    payment_method: PaymentMethod,
    errors: FieldErrors,
    submitting: bool,
    policy: CheckoutPolicy,
}

/// Newtype wrapper so `Default` can start at Delivery.
#[derive(Debug)]
struct CheckoutStepState(CheckoutStep);

impl Default for CheckoutStepState {
    fn default() -> Self {
        Self(CheckoutStep::Delivery)
    }
}

impl CheckoutWorkflow {
    /// Start a new checkout at the Delivery step.
    #[must_use]
    pub fn new(policy: CheckoutPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step.0
    }

    /// The delivery form as entered so far.
    #[must_use]
    pub const fn delivery(&self) -> &DeliveryDetails {
        &self.delivery
    }

    /// Per-field validation errors from the last failed forward
    /// transition.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The selected payment method (defaults to cash on delivery).
    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Whether a submission is currently in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Select a payment method.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Enter a value into one delivery field. Clears only that field's
    /// previous error; other errors stay until the next full validation.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FullName => self.delivery.full_name = value,
            Field::Email => self.delivery.email = value,
            Field::Phone => self.delivery.phone = value,
            Field::Address => self.delivery.address = value,
            Field::City => self.delivery.city = value,
            Field::State => self.delivery.state = value,
            Field::Zip => self.delivery.zip = value,
        }
        self.errors.clear(field);
    }

    /// Replace the whole delivery form (e.g. a front end that collects
    /// everything at once). Clears all prior errors.
    pub fn set_delivery(&mut self, details: DeliveryDetails) {
        self.delivery = details;
        self.errors = FieldErrors::default();
    }

    /// Advance to the next step.
    ///
    /// Leaving Delivery re-runs every field rule; on any failure the
    /// workflow re-enters Delivery with all failing fields reported and
    /// the form data untouched. Payment → Review is unguarded. At Review
    /// and Complete this is a no-op - submission goes through
    /// [`submit`](Self::submit).
    ///
    /// # Errors
    ///
    /// Returns the full set of field errors when Delivery validation
    /// fails.
    pub fn next(&mut self) -> Result<CheckoutStep, FieldErrors> {
        match self.step.0 {
            CheckoutStep::Delivery => {
                let errors = validate_delivery(&self.delivery);
                if errors.is_empty() {
                    self.errors = FieldErrors::default();
                    self.step.0 = CheckoutStep::Payment;
                    Ok(self.step.0)
                } else {
                    self.errors = errors.clone();
                    Err(errors)
                }
            }
            CheckoutStep::Payment => {
                self.step.0 = CheckoutStep::Review;
                Ok(self.step.0)
            }
            CheckoutStep::Review | CheckoutStep::Complete => Ok(self.step.0),
        }
    }

    /// Step backward, preserving all entered form data. Always permitted
    /// and unguarded; a no-op at Delivery and Complete.
    pub fn back(&mut self) -> CheckoutStep {
        self.step.0 = match self.step.0 {
            CheckoutStep::Payment => CheckoutStep::Delivery,
            CheckoutStep::Review => CheckoutStep::Payment,
            step @ (CheckoutStep::Delivery | CheckoutStep::Complete) => step,
        };
        self.step.0
    }

    /// Submit the order (the `Review → Complete` transition).
    ///
    /// Runs the submission protocol described at the module level. On
    /// success the cart is cleared and the workflow reaches Complete; on a
    /// rejected order ([`CheckoutError::Rejected`]) or a `reject`-policy
    /// failure the workflow stays in Review with the cart intact.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`].
    pub async fn submit(
        &mut self,
        cart: &mut CartStore,
        session: &Session,
        orders: &OrderClient,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.submitting {
            return Err(CheckoutError::SubmissionInFlight);
        }
        if self.step.0 != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.submitting = true;
        let result = self.submit_once(cart, session, orders).await;
        self.submitting = false;

        if result.is_ok() {
            self.step.0 = CheckoutStep::Complete;
        }
        result
    }

    async fn submit_once(
        &self,
        cart: &mut CartStore,
        session: &Session,
        orders: &OrderClient,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let totals = order_totals(cart, self.policy.shipping_fee);
        let draft = self.compose_draft(cart, &totals);

        let outcome = match session.token() {
            // No session: straight to the guest endpoint.
            None => orders
                .create_guest(&draft)
                .await
                .map(|created| (created.order_id(), ConfirmationSource::Guest)),
            Some(token) => match orders.create(&draft, Some(token)).await {
                Ok(created) => Ok((created.order_id(), ConfirmationSource::Server)),
                Err(ApiError::Unauthorized(message)) => {
                    tracing::info!(
                        message = %message,
                        "order service rejected the session token, retrying as guest"
                    );
                    orders
                        .create_guest(&draft)
                        .await
                        .map(|created| (created.order_id(), ConfirmationSource::Guest))
                }
                Err(e) => Err(e),
            },
        };

        match outcome {
            Ok((server_id, source)) => {
                let order_id = server_id.unwrap_or_else(|| {
                    tracing::warn!("order service omitted the order id, synthesizing one");
                    synthesize_order_id()
                });
                cart.dispatch(CartAction::Clear)?;
                Ok(OrderConfirmation {
                    order_id,
                    source,
                    total: totals.total,
                })
            }
            Err(ApiError::Rejected(message)) => {
                tracing::warn!(message = %message, "order service rejected the order");
                Err(CheckoutError::Rejected(message))
            }
            Err(error) => match self.policy.offline {
                OfflineOrderPolicy::Reject => Err(CheckoutError::Api(error)),
                OfflineOrderPolicy::Confirm => {
                    tracing::warn!(
                        error = %error,
                        "order service unreachable, issuing offline confirmation"
                    );
                    tokio::time::sleep(self.policy.offline_confirm_delay).await;
                    let order_id = synthesize_order_id();
                    cart.dispatch(CartAction::Clear)?;
                    Ok(OrderConfirmation {
                        order_id,
                        source: ConfirmationSource::Offline,
                        total: totals.total,
                    })
                }
            },
        }
    }

    fn compose_draft(&self, cart: &CartStore, totals: &OrderTotals) -> OrderDraft {
        let d = &self.delivery;
        // The form was validated on the way to Review, so the phone
        // normalizes; fall back to the raw entry rather than failing here.
        let phone = Phone::parse(&d.phone)
            .map(Phone::into_inner)
            .unwrap_or_else(|_| d.phone.trim().to_owned());

        OrderDraft {
            customer: CustomerInfo {
                full_name: d.full_name.trim().to_owned(),
                email: d.email.trim().to_owned(),
                phone,
            },
            shipping_address: ShippingAddress {
                address: d.address.trim().to_owned(),
                city: d.city.trim().to_owned(),
                state: d.state.trim().to_owned(),
                zip_code: d.zip.trim().to_owned(),
            },
            items: cart.lines().iter().map(OrderItem::from).collect(),
            payment_method: self.payment_method,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            total: totals.total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Synthesize a client-side order identifier: `ORD-` plus six digits.
fn synthesize_order_id() -> OrderId {
    let digits = rand::rng().random_range(100_000..1_000_000u32);
    OrderId::new(format!("ORD-{digits}"))
}
