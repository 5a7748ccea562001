//! Cart commands.
//!
//! The cart persists between invocations through the storefront's local
//! storage, so `add` / `remove` / `set` / `clear` each load it, dispatch
//! one action, and leave the write-through persistence to the store.

use clap::Subcommand;

use spice_pantry_core::ProductId;
use spice_pantry_storefront::api::ProductClient;
use spice_pantry_storefront::cart as store_cart;
use spice_pantry_storefront::cart::{CartStore, QuantityChange};
use spice_pantry_storefront::checkout::order_totals;
use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::error::Result;
use spice_pantry_storefront::storage::LocalStore;

/// Cart subcommands.
#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show the cart contents and totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product identifier (see `sp-cli products`)
        product_id: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product identifier
        product_id: String,
    },
    /// Set a product's quantity outright (0 removes it)
    Set {
        /// Product identifier
        product_id: String,

        /// New quantity
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

/// Run one cart subcommand.
pub async fn run(config: &StorefrontConfig, store: &LocalStore, action: CartAction) -> Result<()> {
    let mut cart = CartStore::load(store);

    match action {
        CartAction::Show => show(config, &cart),
        CartAction::Add {
            product_id,
            quantity,
        } => {
            // Fetch the product so the line carries a current price and
            // stock bound.
            let products = ProductClient::new(config);
            let product = products.get(&ProductId::new(product_id)).await?;
            cart.dispatch(store_cart::CartAction::Add {
                line: product.to_cart_line(),
                quantity,
            })?;
            println!("Added {} × {}.", quantity, product.name);
            show(config, &cart);
        }
        CartAction::Remove { product_id } => {
            cart.dispatch(store_cart::CartAction::Remove {
                id: ProductId::new(product_id),
            })?;
            show(config, &cart);
        }
        CartAction::Set {
            product_id,
            quantity,
        } => {
            cart.dispatch(store_cart::CartAction::SetQuantity {
                id: ProductId::new(product_id),
                change: QuantityChange::Set(quantity),
            })?;
            show(config, &cart);
        }
        CartAction::Clear => {
            cart.dispatch(store_cart::CartAction::Clear)?;
            println!("Cart cleared.");
        }
    }

    Ok(())
}

fn show(config: &StorefrontConfig, cart: &CartStore) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "{:<26} {:<22} {:>10} × {:<3} = {}",
            line.id,
            line.name,
            line.price,
            line.quantity,
            line.line_subtotal()
        );
    }

    let totals = order_totals(cart, config.checkout.shipping_fee);
    println!("\nitems:    {}", cart.item_count());
    println!("subtotal: {}", totals.subtotal);
    println!("shipping: {} (flat, added at checkout)", totals.shipping);
    println!("total:    {}", totals.total);
}
