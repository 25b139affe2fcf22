use basket_optimizer_sdk::{OptimizationItem, OptimizationRequestBuilder, OptimizerClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a client (adjust URL as needed)
    let client = OptimizerClient::new("http://127.0.0.1:8000")?;

    // Check if the server is healthy
    match client.health_check().await {
        Ok(true) => println!("✓ Server is healthy"),
        Ok(false) => println!("⚠ Server returned non-success status"),
        Err(e) => println!("✗ Health check failed: {}", e),
    }

    // A small list priced from central Tel Aviv, nearby stores only
    let request = OptimizationRequestBuilder::new()
        .location(32.0853, 34.7818)
        .add_item(OptimizationItem::new("7290000000001", 2).with_name("Milk 3%"))
        .add_item(OptimizationItem::new("7290000000002", 1).with_name("Whole wheat bread"))
        .add_item(OptimizationItem::new("7290000000003", 6))
        .max_store_distance(5.0)
        .build_single_store()?;

    println!("\n🛒 Ranking stores for {} item(s)...\n", request.items.len());

    let result = client.optimize_single_store(&request).await?;

    if result.is_partial_match {
        println!("⚠ No store carries the whole list\n");
    }

    for (i, store) in result.ranked_stores.iter().enumerate() {
        println!("Store {} ({}):", i + 1, store.store_key());
        println!("  Combined score: {:.2}", store.combined_score);
        println!("  Items: {:.2}, travel: {:.2}", store.item_cost_at_store, store.travel_cost_to_store);
        println!("  Distance: {:.1} km", store.distance_to_store_km);
        if !store.missing_items.is_empty() {
            println!("  Missing: {:?}", store.missing_items);
        }
        println!();
    }

    Ok(())
}
