//! Basic example demonstrating the Shopify Admin API client.
//!
//! Run with:
//! ```
//! SHOPIFY_SHOP=acme SHOPIFY_ACCESS_TOKEN=shpat_xxx cargo run --example basic
//! ```

use futures::TryStreamExt;
use shopapi::{Count, Fulfillment, Get, List, ListOptions, ShopifyClient, Theme};

#[tokio::main]
async fn main() -> shopapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Shopify client...");
    let client = ShopifyClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // List first page of themes
    println!("\n--- Listing Themes (first page) ---");
    let themes_page = Theme::list_page(&client, &ListOptions::with_limit(10)).await?;
    println!(
        "Found {} themes (more pages: {})",
        themes_page.len(),
        themes_page.has_more()
    );

    for theme in &themes_page {
        println!(
            "  - {} ({:?}, {})",
            theme.name.as_deref().unwrap_or("unnamed"),
            theme.id,
            theme.role.as_ref().map(ToString::to_string).unwrap_or_default()
        );
    }

    // Get the published theme with a reduced field set
    if let Some(main) = themes_page.iter().find(|t| t.is_main()) {
        if let Some(id) = main.id {
            println!("\n--- Main Theme Details ---");
            let theme = Theme::get(&client, id, Some("id,name,role,updated_at")).await?;
            println!("Theme: {:?}", theme.name);
            println!("  Updated: {:?}", theme.updated_at);
        }
    }

    // Walk an order's fulfillments, one page at a time behind the stream
    let Some(order_id) = std::env::args().nth(1).and_then(|a| a.parse::<u64>().ok()) else {
        println!("\nPass an order ID to also list its fulfillments.");
        return Ok(());
    };

    println!("\n--- Fulfillments for order {order_id} ---");
    let total = Fulfillment::count(&client, order_id).await?;
    println!("Order has {total} fulfillments");

    let query = (order_id, ListOptions::with_limit(50));
    let mut fulfillments = Fulfillment::list(&client, &query)?;
    while let Some(fulfillment) = fulfillments.try_next().await? {
        println!(
            "  {} - {} [{}]",
            fulfillment.name.as_deref().unwrap_or("-"),
            fulfillment
                .status
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            fulfillment.all_tracking_numbers().join(", ")
        );
    }

    println!("\nDone!");
    Ok(())
}
