//! Contact command: deliver a message to the store's contact sink.

use clap::Args;

use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::error::{Result, StorefrontError};
use spice_pantry_storefront::services::contact::{ContactClient, ContactMessage};

/// Arguments for `sp-cli contact`.
#[derive(Debug, Args)]
pub struct ContactArgs {
    /// Your name
    #[arg(short, long)]
    pub name: String,

    /// Your email address
    #[arg(short, long)]
    pub email: String,

    /// The message
    #[arg(short, long)]
    pub message: String,
}

/// Send one contact message.
pub async fn send(config: &StorefrontConfig, args: &ContactArgs) -> Result<()> {
    let Some(contact_config) = &config.contact else {
        return Err(StorefrontError::Other(
            "The contact form is not configured (set PANTRY_CONTACT_ENDPOINT and PANTRY_CONTACT_ACCESS_KEY)."
                .to_string(),
        ));
    };

    let client = ContactClient::new(contact_config);
    client
        .submit(&ContactMessage {
            name: args.name.clone(),
            email: args.email.clone(),
            message: args.message.clone(),
        })
        .await?;

    println!("Message sent. We'll get back to you soon.");
    Ok(())
}
