use std::fs;
use std::path::PathBuf;

use basket_compare::domain::presentation::solution_keys;
use basket_compare::{
    AppConfig, Coordinates, GroceryList, LocationStatus, OptimizationMode, OptimizationSettings,
    Orchestrator, OrchestratorState, Phase, PriorityChip, SessionHandle, StoreDirectory,
    StoreMetadata,
};
use basket_optimizer_sdk::{OptimizationItem, OptimizerClient, StoreKey};
use clap::Parser;
use dotenv::dotenv;
use log::info;
use serde::Deserialize;

/// Find the cheapest way to buy a shopping list nearby
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON array of items: [{"itemCode": "...", "quantity": 1, "itemName": "..."}]
    #[arg(long)]
    items: PathBuf,

    /// Shopper latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Shopper longitude
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// single or multi
    #[arg(long, default_value = "single")]
    mode: OptimizationMode,

    /// none, distance or cost
    #[arg(long, default_value = "none")]
    priority: PriorityChip,

    #[arg(long)]
    max_stores: Option<u32>,

    /// km
    #[arg(long)]
    max_store_distance: Option<f64>,

    /// km
    #[arg(long)]
    max_travel_distance: Option<f64>,

    /// JSON array of store metadata used for display names
    #[arg(long)]
    stores: Option<PathBuf>,

    /// Show the store breakdown of every solution, not just the best one
    #[arg(long)]
    expand_all: bool,
}

impl Args {
    fn settings(&self, base: OptimizationSettings) -> OptimizationSettings {
        OptimizationSettings {
            max_store_distance_km: self.max_store_distance.unwrap_or(base.max_store_distance_km),
            max_travel_distance_km: self
                .max_travel_distance
                .unwrap_or(base.max_travel_distance_km),
            max_stores: self.max_stores.unwrap_or(base.max_stores),
        }
    }

    fn location(&self) -> LocationStatus {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => LocationStatus::Available(Coordinates::new(lat, lon)),
            _ => LocationStatus::Unknown,
        }
    }
}

#[derive(Deserialize)]
struct StoreEntry {
    #[serde(flatten)]
    key: StoreKey,
    #[serde(flatten)]
    metadata: StoreMetadata,
}

// ---------- Output ----------

fn print_single_store(state: &mut OrchestratorState, directory: &StoreDirectory) {
    let Some(result) = state.single_store_result() else {
        return;
    };

    if let Some(notice) = state.take_partial_match_notice() {
        println!(
            "⚠ {} store(s) do not carry the whole list\n",
            notice.stores_with_missing
        );
    }

    for (rank, store) in result.ranked_stores.iter().enumerate() {
        let fallback = store
            .store_name
            .clone()
            .unwrap_or_else(|| store.store_key().to_string());
        println!("{}. {}", rank + 1, directory.display_name(&store.store_key(), &fallback));
        if let Some(ref address) = store.address {
            println!("   {}", address);
        }
        println!(
            "   score {:.2} = items {:.2} + travel {:.2} ({:.1} km)",
            store.combined_score,
            store.item_cost_at_store,
            store.travel_cost_to_store,
            store.distance_to_store_km
        );
        let missing = state.missing_items_for(store);
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|m| m.name.as_str()).collect();
            println!("   missing: {}", names.join(", "));
        }
    }
}

fn print_multi_store(state: &mut OrchestratorState, directory: &StoreDirectory, expand_all: bool) {
    let Some(result) = state.multi_store_result() else {
        return;
    };
    let keys = solution_keys(&result.solutions);

    for (index, (solution, key)) in result.solutions.iter().zip(&keys).enumerate() {
        if index == 0 || expand_all {
            state.toggle_solution(key);
            for (_, store) in solution.stores() {
                state.toggle_store(key, &store.store_id);
            }
        }

        println!(
            "{}. total {:.2} = items {:.2} + travel {:.2}",
            index + 1,
            solution.total_cost,
            solution.item_cost,
            solution.travel_cost
        );
        if !state.expansion().is_solution_expanded(key) {
            continue;
        }
        for (label, store) in solution.stores() {
            println!("   {}", directory.display_name(&store.store_key(), label));
            if state.expansion().is_store_expanded(key, &store.store_id) {
                for item in &store.items {
                    let name = item.item_name.as_deref().unwrap_or(&item.item_code);
                    println!("     {} x{} @ {:.2}", name, item.quantity, item.price);
                }
            }
        }
    }
}

// ---------- Bootstrap ----------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig::from_env();

    let items: Vec<OptimizationItem> = serde_json::from_str(&fs::read_to_string(&args.items)?)?;
    let list: GroceryList = items.into_iter().collect();

    let directory = StoreDirectory::with_capacity(config.store_directory_capacity);
    if let Some(ref path) = args.stores {
        let entries: Vec<StoreEntry> = serde_json::from_str(&fs::read_to_string(path)?)?;
        directory.extend(entries.into_iter().map(|e| (e.key, e.metadata)));
    }

    let mut client = OptimizerClient::new(&config.api_url)?.with_timeout(config.request_timeout);
    if let Some(ref device_id) = config.device_id {
        client = client.with_device_id(device_id);
    }

    let session = SessionHandle::new(OrchestratorState::new(args.settings(config.settings)));
    {
        let mut state = session.lock();
        state.select_mode(args.mode);
        if args.priority != PriorityChip::None {
            state.toggle_chip(args.priority);
        }
    }

    info!("comparing {} item(s) against {}", list.len(), config.api_url);
    let orchestrator =
        Orchestrator::new(client, session.clone()).with_timeout(config.request_timeout);
    orchestrator.update_items(list.into_items()).await;
    orchestrator.update_location(args.location()).await;

    let mut state = session.lock();
    if state.needs_input() {
        println!("Add items and share a location (--lat/--lon) to compare prices.");
        return Ok(());
    }
    if let Phase::Failed { message, .. } = state.phase() {
        eprintln!("{}", message);
        std::process::exit(1);
    }

    match state.mode() {
        OptimizationMode::SingleStore => print_single_store(&mut state, &directory),
        OptimizationMode::MultiStore => print_multi_store(&mut state, &directory, args.expand_all),
    }

    Ok(())
}
