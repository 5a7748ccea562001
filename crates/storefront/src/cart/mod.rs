//! Shopping cart: line type, pure reducer, and persistent store.
//!
//! The cart is the only shared mutable state in the storefront. It is
//! owned by [`CartStore`] and mutated exclusively by dispatching a
//! [`CartAction`] through the pure reducer; after every transition the new
//! state is write-through persisted to the [`storage`](crate::storage)
//! `cart` slot. On startup the slot is read back, validated line by line,
//! and anything that fails the cart-line invariant is dropped with a log
//! line rather than poisoning the cart.

mod reducer;

pub use reducer::{CartAction, MAX_LINE_QUANTITY, QuantityChange, reduce};

use serde::{Deserialize, Serialize};

use spice_pantry_core::{Price, ProductId};

use crate::storage::{LocalStore, StorageError, slots};

/// Version tag written into the persisted cart envelope.
///
/// Bump when the [`CartLine`] shape changes; the loader migrates or
/// discards older payloads rather than guessing at their shape.
const CART_SCHEMA_VERSION: u32 = 1;

/// A single line in the cart: one product and the quantity being bought.
///
/// Invariant: `quantity >= 1`, and `quantity <= stock` when stock is
/// known. The reducer enforces this on every mutation; a line that would
/// drop to zero is removed instead of being kept at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product identifier. The catalog service uses Mongo-style ids, so
    /// `_id` is accepted as an alias when restoring older payloads.
    #[serde(alias = "_id")]
    pub id: ProductId,
    /// Display name of the product.
    pub name: String,
    /// Unit price at the time the line was added.
    pub price: Price,
    /// Quantity being bought, always at least 1.
    pub quantity: u32,
    /// Available stock for this product, when the catalog reported it.
    /// Caps the quantity; unknown stock falls back to
    /// [`MAX_LINE_QUANTITY`].
    #[serde(default)]
    pub stock: Option<u32>,
    /// Product image URL for display.
    #[serde(default)]
    pub image: Option<String>,
    /// Pack weight label (e.g. "250g").
    #[serde(default)]
    pub weight: Option<String>,
    /// Catalog category (e.g. "Spices").
    #[serde(default)]
    pub category: Option<String>,
}

impl CartLine {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Envelope persisted into the `cart` storage slot.
#[derive(Serialize)]
struct CartEnvelope<'a> {
    version: u32,
    lines: &'a [CartLine],
}

/// The persistent cart store.
///
/// Single source of truth for "what is in the cart". Lines keep insertion
/// order (it drives checkout-summary and rendering order) and have unique
/// product ids. Every [`dispatch`](Self::dispatch) is synchronous and
/// atomic from the caller's perspective.
#[derive(Debug)]
pub struct CartStore {
    lines: Vec<CartLine>,
    store: LocalStore,
}

impl CartStore {
    /// Restore the cart from the `cart` storage slot.
    ///
    /// Restoring never fails: entries that do not satisfy the cart-line
    /// invariant (string id, numeric quantity > 0) are dropped
    /// individually, and unreadable or unrecognized top-level payloads are
    /// discarded wholesale. Both cases are logged.
    #[must_use]
    pub fn load(store: &LocalStore) -> Self {
        let lines = match store.get::<serde_json::Value>(slots::CART) {
            Ok(Some(value)) => restore_lines(value),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted cart");
                Vec::new()
            }
        };

        Self {
            lines,
            store: store.clone(),
        }
    }

    /// Apply an action through the pure reducer and persist the result.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write-through persist fails; the
    /// in-memory transition has already happened at that point.
    pub fn dispatch(&mut self, action: CartAction) -> Result<(), StorageError> {
        self.lines = reduce(std::mem::take(&mut self.lines), action);
        self.persist()
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items: the sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().fold(0, |n, l| n.saturating_add(l.quantity))
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines
            .iter()
            .map(CartLine::line_subtotal)
            .fold(Price::zero(), |acc, p| acc + p)
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.store.set(
            slots::CART,
            &CartEnvelope {
                version: CART_SCHEMA_VERSION,
                lines: &self.lines,
            },
        )
    }
}

/// Pull the line array out of a persisted payload.
///
/// Accepts the current versioned envelope and, as a migration path, the
/// legacy bare-array form. Anything else is discarded wholesale.
fn restore_lines(value: serde_json::Value) -> Vec<CartLine> {
    match value {
        serde_json::Value::Array(entries) => validate_entries(entries),
        serde_json::Value::Object(mut envelope) => {
            let version = envelope.get("version").and_then(serde_json::Value::as_u64);
            match (version, envelope.remove("lines")) {
                (Some(v), Some(serde_json::Value::Array(entries)))
                    if v == u64::from(CART_SCHEMA_VERSION) =>
                {
                    validate_entries(entries)
                }
                (version, _) => {
                    tracing::warn!(?version, "discarding persisted cart with unknown schema");
                    Vec::new()
                }
            }
        }
        other => {
            tracing::warn!(
                kind = %json_kind(&other),
                "discarding persisted cart: expected an array or envelope"
            );
            Vec::new()
        }
    }
}

/// Validate restored entries one by one, dropping anything that fails the
/// cart-line invariant and any duplicate product ids.
fn validate_entries(entries: Vec<serde_json::Value>) -> Vec<CartLine> {
    let mut lines: Vec<CartLine> = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<CartLine>(entry) {
            Ok(line) if line.id.is_empty() || line.quantity == 0 => {
                tracing::warn!(id = %line.id, quantity = line.quantity, "dropping invalid cart line");
            }
            Ok(line) if lines.iter().any(|l| l.id == line.id) => {
                tracing::warn!(id = %line.id, "dropping duplicate cart line");
            }
            Ok(line) => lines.push(line),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparseable cart line");
            }
        }
    }
    lines
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::LocalStore;

    fn temp_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("sp-cart-{}", uuid::Uuid::new_v4()));
        LocalStore::open(dir).unwrap()
    }

    fn line(id: &str, price: i64, quantity: u32, stock: Option<u32>) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::rupees(Decimal::from(price)),
            quantity,
            stock,
            image: None,
            weight: None,
            category: None,
        }
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let store = temp_store();
        let cart = CartStore::load(&store);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_dispatch_persists_and_reloads() {
        let store = temp_store();
        let mut cart = CartStore::load(&store);
        cart.dispatch(CartAction::Add {
            line: line("A", 100, 1, Some(5)),
            quantity: 2,
        })
        .unwrap();

        let reloaded = CartStore::load(&store);
        assert_eq!(reloaded.lines().len(), 1);
        assert_eq!(reloaded.lines()[0].quantity, 2);
        assert_eq!(reloaded.item_count(), 2);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let store = temp_store();
        let mut cart = CartStore::load(&store);
        cart.dispatch(CartAction::Add {
            line: line("A", 100, 1, Some(10)),
            quantity: 2,
        })
        .unwrap();
        cart.dispatch(CartAction::Add {
            line: line("B", 50, 1, Some(10)),
            quantity: 3,
        })
        .unwrap();

        // 2×100 + 3×50
        assert_eq!(cart.subtotal().amount, Decimal::from(350));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let store = temp_store();
        let mut cart = CartStore::load(&store);
        cart.dispatch(CartAction::Add {
            line: line("A", 100, 1, None),
            quantity: 1,
        })
        .unwrap();
        cart.dispatch(CartAction::Clear).unwrap();

        assert!(cart.is_empty());
        assert!(CartStore::load(&store).is_empty());
    }

    #[test]
    fn test_restore_drops_invalid_entries() {
        let store = temp_store();
        store
            .set(
                slots::CART,
                &serde_json::json!({
                    "version": 1,
                    "lines": [
                        {
                            "id": "A",
                            "name": "Turmeric Powder",
                            "price": {"amount": "100", "currencyCode": "INR"},
                            "quantity": 2
                        },
                        {
                            "id": "B",
                            "name": "Bad Quantity",
                            "price": {"amount": "50", "currencyCode": "INR"},
                            "quantity": "two"
                        },
                        {
                            "id": "C",
                            "name": "Zero Quantity",
                            "price": {"amount": "50", "currencyCode": "INR"},
                            "quantity": 0
                        }
                    ]
                }),
            )
            .unwrap();

        let cart = CartStore::load(&store);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].id.as_str(), "A");
    }

    #[test]
    fn test_restore_accepts_legacy_bare_array() {
        let store = temp_store();
        store
            .set(
                slots::CART,
                &serde_json::json!([
                    {
                        "_id": "A",
                        "name": "Garam Masala",
                        "price": {"amount": "6.99", "currencyCode": "INR"},
                        "quantity": 1
                    }
                ]),
            )
            .unwrap();

        let cart = CartStore::load(&store);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].id.as_str(), "A");
    }

    #[test]
    fn test_restore_discards_unknown_version_wholesale() {
        let store = temp_store();
        store
            .set(
                slots::CART,
                &serde_json::json!({"version": 99, "lines": [{"id": "A", "name": "x",
                    "price": {"amount": "1", "currencyCode": "INR"}, "quantity": 1}]}),
            )
            .unwrap();

        assert!(CartStore::load(&store).is_empty());
    }

    #[test]
    fn test_restore_discards_non_array_wholesale() {
        let store = temp_store();
        store.set(slots::CART, "not a cart").unwrap();
        assert!(CartStore::load(&store).is_empty());
    }

    #[test]
    fn test_restore_discards_duplicate_ids() {
        let store = temp_store();
        store
            .set(
                slots::CART,
                &serde_json::json!([
                    {"id": "A", "name": "x", "price": {"amount": "1", "currencyCode": "INR"}, "quantity": 1},
                    {"id": "A", "name": "x again", "price": {"amount": "1", "currencyCode": "INR"}, "quantity": 4}
                ]),
            )
            .unwrap();

        let cart = CartStore::load(&store);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
    }
}
