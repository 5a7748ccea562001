//! Session commands: login, signup, logout, whoami.

use clap::Args;
use secrecy::SecretString;

use spice_pantry_storefront::api::{ApiError, AuthClient};
use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::error::Result;
use spice_pantry_storefront::session::Session;
use spice_pantry_storefront::storage::LocalStore;

/// Arguments for `sp-cli login`.
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email address
    #[arg(short, long)]
    pub email: String,

    /// Account password
    #[arg(short, long)]
    pub password: String,
}

/// Arguments for `sp-cli signup`.
#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Account email address
    #[arg(short, long)]
    pub email: String,

    /// Account password
    #[arg(short, long)]
    pub password: String,
}

/// Log in and cache the session.
pub async fn login(config: &StorefrontConfig, store: &LocalStore, args: &LoginArgs) -> Result<()> {
    let client = AuthClient::new(config);
    let response = client.login(&args.email, &args.password).await?;

    let mut session = Session::load(store);
    let name = response.profile.name.clone();
    session.establish(response.profile, SecretString::from(response.token), store)?;

    println!("Logged in as {name}.");
    Ok(())
}

/// Create an account and cache the session.
pub async fn signup(
    config: &StorefrontConfig,
    store: &LocalStore,
    args: &SignupArgs,
) -> Result<()> {
    let client = AuthClient::new(config);
    let response = client
        .signup(&args.name, &args.email, &args.password)
        .await?;

    let mut session = Session::load(store);
    let name = response.profile.name.clone();
    session.establish(response.profile, SecretString::from(response.token), store)?;

    println!("Welcome, {name}. Your account is ready and you are logged in.");
    Ok(())
}

/// Drop the cached session.
pub fn logout(store: &LocalStore) -> Result<()> {
    let mut session = Session::load(store);
    session.clear(store)?;
    println!("Logged out.");
    Ok(())
}

/// Show the logged-in user, refreshing the cached profile from the auth
/// service. A stale token drops the cached session.
pub async fn whoami(config: &StorefrontConfig, store: &LocalStore) -> Result<()> {
    let mut session = Session::load(store);

    let Some(token) = session.token().cloned() else {
        println!("Not logged in.");
        return Ok(());
    };

    let client = AuthClient::new(config);
    match client.current_user(&token).await {
        Ok(profile) => {
            println!("{} <{}>", profile.name, profile.email);
            session.update_user(profile, store)?;
            Ok(())
        }
        Err(ApiError::Unauthorized(_)) => {
            session.clear(store)?;
            println!("Session expired; please log in again.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
