//! Order history commands.

use clap::Subcommand;
use secrecy::SecretString;

use spice_pantry_core::OrderId;
use spice_pantry_storefront::api::OrderClient;
use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::error::{Result, StorefrontError};
use spice_pantry_storefront::session::Session;
use spice_pantry_storefront::storage::LocalStore;

/// Orders subcommands. The bare `sp-cli orders` lists.
#[derive(Debug, Default, Subcommand)]
pub enum OrdersAction {
    /// List your orders
    #[default]
    List,
    /// Show one order in detail
    Show {
        /// Order identifier
        order_id: String,
    },
    /// Cancel a pending order
    Cancel {
        /// Order identifier
        order_id: String,
    },
}

/// Run one orders subcommand.
pub async fn run(
    config: &StorefrontConfig,
    store: &LocalStore,
    action: OrdersAction,
) -> Result<()> {
    let session = Session::load(store);
    let client = OrderClient::new(config);

    match action {
        OrdersAction::List => list(&client, &session).await,
        OrdersAction::Show { order_id } => show(&client, &session, &OrderId::new(order_id)).await,
        OrdersAction::Cancel { order_id } => {
            cancel(&client, &session, &OrderId::new(order_id)).await
        }
    }
}

fn require_token(session: &Session) -> Result<SecretString> {
    session.token().cloned().ok_or_else(|| {
        StorefrontError::AuthRequired("Please log in to see your orders.".to_string())
    })
}

async fn list(client: &OrderClient, session: &Session) -> Result<()> {
    let token = require_token(session)?;
    let orders = client.user_orders(&token).await?;

    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    for order in &orders {
        let id = order
            .id()
            .map_or_else(|| "(no id)".to_string(), ToString::to_string);
        let placed = order
            .created_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string());
        let total = order
            .total
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        println!(
            "{id:<26} {placed:<12} {:<10} {total:>10} ({} items)",
            order.status,
            order.items.len()
        );
    }

    Ok(())
}

async fn show(client: &OrderClient, session: &Session, order_id: &OrderId) -> Result<()> {
    let order = client.get(order_id, session.token()).await?;

    println!("Order {}", order.id().unwrap_or(order_id));
    println!("  status: {}", order.status);
    if let Some(placed) = order.created_at {
        println!("  placed: {}", placed.format("%Y-%m-%d %H:%M"));
    }
    for item in &order.items {
        println!(
            "  {:<22} {} × {} = {}",
            item.name,
            item.price,
            item.quantity,
            item.price.times(item.quantity)
        );
    }
    if let Some(total) = order.total {
        println!("  total: {total}");
    }
    if order.is_cancellable() {
        println!("\nThis order can still be cancelled: sp-cli orders cancel {order_id}");
    }

    Ok(())
}

async fn cancel(client: &OrderClient, session: &Session, order_id: &OrderId) -> Result<()> {
    let token = require_token(session)?;

    // Check the status first so a hopeless cancel never hits the service.
    let order = client.get(order_id, Some(&token)).await?;
    if !order.is_cancellable() {
        return Err(StorefrontError::Other(format!(
            "Order {order_id} is {} and can no longer be cancelled.",
            order.status
        )));
    }

    client.cancel(order_id, &token).await?;
    println!("Order {order_id} cancelled.");
    Ok(())
}
