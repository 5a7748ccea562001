//! Catalog browsing commands.

use clap::Args;

use spice_pantry_core::ProductId;
use spice_pantry_storefront::api::{ProductClient, ProductQuery};
use spice_pantry_storefront::config::StorefrontConfig;
use spice_pantry_storefront::error::Result;

/// Arguments for `sp-cli products`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page to fetch
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Filter by category (e.g. Spices, Blends)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,
}

/// List a page of the catalog.
pub async fn list(config: &StorefrontConfig, args: &ListArgs) -> Result<()> {
    let client = ProductClient::new(config);
    let query = ProductQuery {
        page: args.page,
        limit: None,
        category: args.category.clone(),
        search: args.search.clone(),
    };

    let page = client.list(&query).await?;

    if page.products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &page.products {
        let weight = product.weight.as_deref().unwrap_or("-");
        let stock = product
            .stock
            .map_or_else(|| "?".to_string(), |s| s.to_string());
        println!(
            "{:<26} {:<22} {:>10} {:>8} in stock: {stock}",
            product.id, product.name, product.price, weight
        );
    }

    let p = &page.pagination;
    if p.total_pages > 1 {
        println!(
            "\npage {}/{} ({} products){}",
            p.current_page,
            p.total_pages,
            p.total_products,
            if p.has_next { " - use --page to see more" } else { "" }
        );
    }

    Ok(())
}

/// Show one product in detail.
pub async fn show(config: &StorefrontConfig, id: &str) -> Result<()> {
    let client = ProductClient::new(config);
    let product = client.get(&ProductId::new(id)).await?;

    println!("{}", product.full_name.as_deref().unwrap_or(&product.name));
    println!("  id:       {}", product.id);
    println!("  price:    {}", product.price);
    if let Some(weight) = &product.weight {
        println!("  weight:   {weight}");
    }
    if let Some(category) = &product.category {
        println!("  category: {category}");
    }
    if let Some(stock) = product.stock {
        println!("  stock:    {stock}");
    }
    if let Some(description) = &product.description {
        println!("\n{description}");
    }
    for feature in &product.features {
        println!("  - {feature}");
    }

    Ok(())
}
