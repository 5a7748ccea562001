//! Spice Pantry CLI - command-line storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! sp-cli products
//! sp-cli products --category Spices
//!
//! # Manage the cart (persisted between invocations)
//! sp-cli cart add 6601a2 --quantity 2
//! sp-cli cart show
//!
//! # Log in and place the order
//! sp-cli login -e asha@example.com -p <password>
//! sp-cli checkout --name "Asha Kumar" --email asha@example.com \
//!     --phone "+91 98765 43210" --address "12 Spice Market Road, T Nagar" \
//!     --city Chennai --state "Tamil Nadu" --zip 600017 --payment cod
//!
//! # Order history
//! sp-cli orders
//! sp-cli orders cancel ORD-104217
//! ```
//!
//! # Commands
//!
//! - `products` / `product` - Browse the catalog
//! - `cart` - Show and mutate the persistent cart
//! - `login` / `signup` / `logout` / `whoami` - Session management
//! - `checkout` - Place an order from the current cart
//! - `orders` - Order history and cancellation
//! - `contact` - Send a message to the store

#![cfg_attr(not(test), forbid(unsafe_code))]
// A CLI's job is to print.
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use clap::{Parser, Subcommand};

use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::error::StorefrontError;
use spice_pantry_storefront::storage::LocalStore;

mod commands;

#[derive(Parser)]
#[command(name = "sp-cli")]
#[command(author, version, about = "Spice Pantry command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products(commands::products::ListArgs),
    /// Show one product in detail
    Product {
        /// Product identifier
        id: String,
    },
    /// Show and mutate the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Log in with email and password
    Login(commands::account::LoginArgs),
    /// Create an account and log in
    Signup(commands::account::SignupArgs),
    /// Drop the cached session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Place an order from the current cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Order history and cancellation
    Orders {
        #[command(subcommand)]
        action: Option<commands::orders::OrdersAction>,
    },
    /// Send a message to the store
    Contact(commands::contact::ContactArgs),
}

#[tokio::main]
async fn main() {
    // Initialize tracing; default to warnings so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "spice_pantry=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), StorefrontError> {
    let config = StorefrontConfig::from_env()?;
    let store = LocalStore::open(&config.data_dir)?;

    match cli.command {
        Commands::Products(args) => commands::products::list(&config, &args).await?,
        Commands::Product { id } => commands::products::show(&config, &id).await?,
        Commands::Cart { action } => commands::cart::run(&config, &store, action).await?,
        Commands::Login(args) => commands::account::login(&config, &store, &args).await?,
        Commands::Signup(args) => commands::account::signup(&config, &store, &args).await?,
        Commands::Logout => commands::account::logout(&store)?,
        Commands::Whoami => commands::account::whoami(&config, &store).await?,
        Commands::Checkout(args) => commands::checkout::place_order(&config, &store, args).await?,
        Commands::Orders { action } => {
            commands::orders::run(&config, &store, action.unwrap_or_default()).await?;
        }
        Commands::Contact(args) => commands::contact::send(&config, &args).await?,
    }
    Ok(())
}
