//! Checkout command: drive the wizard end to end from one invocation.
//!
//! The delivery details arrive as flags, so the command walks the
//! workflow's steps programmatically: fill the form, advance (surfacing
//! every failing field if validation blocks), pick the payment method,
//! review, submit.

use clap::Args;

use spice_pantry_core::PaymentMethod;
use spice_pantry_storefront::api::OrderClient;
use spice_pantry_storefront::cart::CartStore;
use spice_pantry_storefront::checkout::{
    CheckoutWorkflow, DeliveryDetails, order_totals,
};
use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::error::{Result, StorefrontError};
use spice_pantry_storefront::session::Session;
use spice_pantry_storefront::storage::LocalStore;

/// Arguments for `sp-cli checkout`.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Full name of the recipient
    #[arg(long = "name")]
    pub full_name: String,

    /// Contact email
    #[arg(long)]
    pub email: String,

    /// Indian mobile number (optionally +91-prefixed)
    #[arg(long)]
    pub phone: String,

    /// Street address
    #[arg(long)]
    pub address: String,

    /// City
    #[arg(long)]
    pub city: String,

    /// State
    #[arg(long)]
    pub state: String,

    /// 6-digit PIN code
    #[arg(long)]
    pub zip: String,

    /// Payment method: cod, upi, or card
    #[arg(long, default_value = "cod")]
    pub payment: PaymentMethod,
}

/// Place an order from the current cart.
pub async fn place_order(
    config: &StorefrontConfig,
    store: &LocalStore,
    args: CheckoutArgs,
) -> Result<()> {
    let mut cart = CartStore::load(store);
    if cart.is_empty() {
        return Err(StorefrontError::Other(
            "Your cart is empty. Add products before checking out.".to_string(),
        ));
    }

    let session = Session::load(store);
    let mut workflow = CheckoutWorkflow::new(config.checkout);

    // Delivery step
    workflow.set_delivery(DeliveryDetails {
        full_name: args.full_name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        city: args.city,
        state: args.state,
        zip: args.zip,
    });
    if let Err(errors) = workflow.next() {
        eprintln!("The delivery details need attention:");
        for (field, message) in errors.iter() {
            eprintln!("  {field}: {message}");
        }
        return Err(StorefrontError::Other(
            "Please fix the delivery details and try again.".to_string(),
        ));
    }

    // Payment step (always has a default, so the transition is unguarded)
    workflow.set_payment_method(args.payment);
    let _ = workflow.next();

    // Review
    let totals = order_totals(&cart, config.checkout.shipping_fee);
    println!("Order summary");
    for line in cart.lines() {
        println!(
            "  {:<22} {} × {} = {}",
            line.name,
            line.price,
            line.quantity,
            line.line_subtotal()
        );
    }
    println!("  subtotal: {}", totals.subtotal);
    println!("  shipping: {}", totals.shipping);
    println!("  total:    {}", totals.total);
    println!("  payment:  {}", workflow.payment_method());
    let d = workflow.delivery();
    println!("  deliver to: {}, {}, {} {}", d.address, d.city, d.state, d.zip);
    if !session.is_authenticated() {
        println!("  (not logged in - placing a guest order)");
    }

    // Submit
    let orders = OrderClient::new(config);
    let confirmation = workflow.submit(&mut cart, &session, &orders).await?;

    println!();
    println!("Order placed successfully!");
    println!("Your order #{} has been received.", confirmation.order_id);
    println!("Order total: {}.", confirmation.total);
    println!("We will send a confirmation to your email shortly.");

    Ok(())
}
