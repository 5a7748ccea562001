//! Order service client: order creation, history, and cancellation.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use spice_pantry_core::{OrderId, OrderStatus, PaymentMethod, Price};

use crate::cart::CartLine;
use crate::config::StorefrontConfig;

use super::{ApiError, check_response};

/// Customer contact details on an order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub full_name: String,
    pub email: String,
    /// Normalized 10-digit Indian mobile number.
    pub phone: String,
}

/// Delivery address on an order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// One purchased product on an order payload: a snapshot of a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "_id")]
    pub product_id: String,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.id.as_str().to_owned(),
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
            image: line.image.clone(),
            weight: line.weight.clone(),
            category: line.category.clone(),
        }
    }
}

/// The transient order payload composed at submit time.
///
/// Exists only for the duration of the submission call plus any fallback
/// attempts; never persisted locally.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer: CustomerInfo,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Successful order-creation response.
///
/// The service reports the new identifier under either `_id` or `orderId`
/// depending on the code path; it has also been observed to omit both, in
/// which case the workflow synthesizes an identifier client-side.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreated {
    #[serde(rename = "_id", default)]
    mongo_id: Option<OrderId>,
    #[serde(rename = "orderId", default)]
    order_id: Option<OrderId>,
}

impl OrderCreated {
    /// The server-assigned order identifier, under whichever field name it
    /// arrived.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id.clone().or_else(|| self.mongo_id.clone())
    }
}

/// An order as returned by the history endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", default)]
    mongo_id: Option<OrderId>,
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total: Option<Price>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// The order identifier, under whichever field name it arrived.
    #[must_use]
    pub fn id(&self) -> Option<&OrderId> {
        self.order_id.as_ref().or(self.mongo_id.as_ref())
    }

    /// Whether the customer may still cancel this order.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        self.status.is_cancellable()
    }
}

/// The two shapes the history endpoint returns: a bare array or a
/// `{ "orders": [...] }` wrapper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrdersPayload {
    Wrapped { orders: Vec<Order> },
    List(Vec<Order>),
}

/// Cancellation response: `{ success, message? }`.
#[derive(Debug, Deserialize)]
struct CancelResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the order service.
///
/// Authenticated calls attach the session's bearer token; order creation
/// without a token goes to the guest endpoint instead.
#[derive(Debug, Clone)]
pub struct OrderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl OrderClient {
    /// Create a new order service client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
        }
    }

    /// Create an order.
    ///
    /// With a token, submits to the authenticated endpoint; without one,
    /// submits to the guest endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the service rejects the
    /// token, [`ApiError::Rejected`] when it rejects the payload (HTTP
    /// 400), and transport/server errors otherwise.
    #[instrument(skip(self, draft, token), fields(items = draft.items.len()))]
    pub async fn create(
        &self,
        draft: &OrderDraft,
        token: Option<&SecretString>,
    ) -> Result<OrderCreated, ApiError> {
        match token {
            Some(token) => {
                let url = self.endpoint("orders")?;
                let response = self
                    .client
                    .post(url)
                    .bearer_auth(token.expose_secret())
                    .json(draft)
                    .send()
                    .await?;
                Self::parse_created(response).await
            }
            None => self.create_guest(draft).await,
        }
    }

    /// Create an order through the guest endpoint, ignoring any session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the service rejects the payload,
    /// and transport/server errors otherwise.
    #[instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn create_guest(&self, draft: &OrderDraft) -> Result<OrderCreated, ApiError> {
        let url = self.endpoint("orders/guest")?;
        let response = self.client.post(url).json(draft).send().await?;
        Self::parse_created(response).await
    }

    /// Fetch the authenticated user's order history.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is missing or
    /// rejected, and transport/server errors otherwise.
    #[instrument(skip(self, token))]
    pub async fn user_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("orders/user")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let response = check_response(response).await?;
        let body = response.text().await?;
        let payload: OrdersPayload = serde_json::from_str(&body)?;
        Ok(match payload {
            OrdersPayload::Wrapped { orders } | OrdersPayload::List(orders) => orders,
        })
    }

    /// Fetch a single order by id, authenticating when a token is present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, and
    /// transport/server errors otherwise.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn get(
        &self,
        order_id: &OrderId,
        token: Option<&SecretString>,
    ) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("orders/{order_id}"))?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        let response = check_response(request.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Cancel an order. The service only cancels orders still in a
    /// cancellable status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the order can no longer be
    /// cancelled, [`ApiError::Unauthorized`] for a bad token, and
    /// transport/server errors otherwise.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn cancel(&self, order_id: &OrderId, token: &SecretString) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("orders/{order_id}/cancel"))?;
        let response = self
            .client
            .put(url)
            .bearer_auth(token.expose_secret())
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = check_response(response).await?;
        let body = response.text().await?;
        let cancel: CancelResponse = serde_json::from_str(&body)?;
        if cancel.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(cancel.message.unwrap_or_else(|| {
                "Failed to cancel order".to_string()
            })))
        }
    }

    async fn parse_created(response: reqwest::Response) -> Result<OrderCreated, ApiError> {
        let response = check_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Server {
                status: 0,
                message: format!("invalid endpoint {path}: {e}"),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_created_prefers_order_id_field() {
        let created: OrderCreated =
            serde_json::from_str(r#"{"_id": "66f1", "orderId": "ORD-104217"}"#).unwrap();
        assert_eq!(created.order_id().unwrap().as_str(), "ORD-104217");

        let created: OrderCreated = serde_json::from_str(r#"{"_id": "66f1"}"#).unwrap();
        assert_eq!(created.order_id().unwrap().as_str(), "66f1");

        let created: OrderCreated = serde_json::from_str(r#"{"message": "ok"}"#).unwrap();
        assert!(created.order_id().is_none());
    }

    #[test]
    fn test_orders_payload_accepts_both_shapes() {
        let wrapped: OrdersPayload =
            serde_json::from_str(r#"{"orders": [{"_id": "a", "status": "pending"}]}"#).unwrap();
        let OrdersPayload::Wrapped { orders } = wrapped else {
            panic!("expected wrapped payload");
        };
        assert_eq!(orders.len(), 1);

        let bare: OrdersPayload =
            serde_json::from_str(r#"[{"_id": "a", "status": "shipped"}]"#).unwrap();
        let OrdersPayload::List(orders) = bare else {
            panic!("expected bare list payload");
        };
        assert_eq!(orders.len(), 1);
        assert!(!orders[0].is_cancellable());
    }

    #[test]
    fn test_order_item_from_cart_line() {
        use rust_decimal::Decimal;
        use spice_pantry_core::ProductId;

        let line = CartLine {
            id: ProductId::new("A"),
            name: "Turmeric Powder".to_string(),
            price: Price::rupees(Decimal::new(599, 2)),
            quantity: 2,
            stock: Some(100),
            image: Some("/images/turmeric.jpg".to_string()),
            weight: Some("250g".to_string()),
            category: Some("Spices".to_string()),
        };

        let item = OrderItem::from(&line);
        assert_eq!(item.product_id, "A");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.weight.as_deref(), Some("250g"));
    }

    #[test]
    fn test_order_draft_wire_shape_is_camel_case() {
        let draft = OrderDraft {
            customer: CustomerInfo {
                full_name: "Asha Kumar".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9876543210".to_string(),
            },
            shipping_address: ShippingAddress {
                address: "12 Spice Market Road, T Nagar".to_string(),
                city: "Chennai".to_string(),
                state: "Tamil Nadu".to_string(),
                zip_code: "600017".to_string(),
            },
            items: vec![],
            payment_method: PaymentMethod::Cod,
            subtotal: Price::zero(),
            shipping: Price::zero(),
            total: Price::zero(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["customer"]["fullName"], "Asha Kumar");
        assert_eq!(json["shippingAddress"]["zipCode"], "600017");
        assert_eq!(json["paymentMethod"], "cod");
        assert_eq!(json["status"], "pending");
    }
}
