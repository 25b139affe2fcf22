use basket_optimizer_sdk::{ErrorKind, OptimizationItem, OptimizationRequestBuilder, OptimizerClient};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Read configuration from environment variables
    let api_url = env::var("OPTIMIZER_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
    let device_id = env::var("DEVICE_ID").ok();

    let mut client = OptimizerClient::new(&api_url)?.with_timeout(Duration::from_secs(20));

    if let Some(id) = device_id {
        println!("📱 Sending device id {}", id);
        client = client.with_device_id(id);
    } else {
        println!("⚠ No device id provided (set DEVICE_ID environment variable)");
    }

    let request = OptimizationRequestBuilder::new()
        .location(31.7683, 35.2137)
        .add_item(OptimizationItem::new("7290000000001", 1).with_name("Milk 3%"))
        .add_item(OptimizationItem::new("7290000000004", 2).with_name("Eggs L"))
        // Favour nearby stores heavily
        .lambda_travel(10.0)
        .max_store_distance(8.0)
        .max_stores(2)
        .max_travel_distance(15.0)
        .build_multi_store()?;

    println!("🛒 Splitting list across stores...");

    match client.optimize_multi_store(&request).await {
        Ok(result) => {
            println!("✓ Success!\n");
            for solution in result.solutions {
                println!("Total: {:.2} (items {:.2} + travel {:.2})", solution.total_cost, solution.item_cost, solution.travel_cost);
                for (label, store) in solution.stores() {
                    println!("  {} [{}]: {} item(s)", label, store.store_key(), store.items.len());
                }
            }
        }
        Err(e) => {
            eprintln!("✗ Error: {}", e);
            if e.kind() == ErrorKind::Timeout {
                eprintln!("\nTip: the optimizer may be cold; try again");
            }
            return Err(e.into());
        }
    }

    Ok(())
}
