//! # Basket Optimizer API Client
//!
//! A Rust client SDK for the grocery basket optimization REST API: given a
//! shopping list and a location, find the best single store or the cheapest
//! combination of stores.
//!
//! ## Example
//!
//! ```no_run
//! use basket_optimizer_sdk::{OptimizationItem, OptimizationRequestBuilder, OptimizerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OptimizerClient::new("http://localhost:8000")?;
//!
//!     let request = OptimizationRequestBuilder::new()
//!         .location(32.0853, 34.7818)
//!         .add_item(OptimizationItem::new("7290000000001", 2).with_name("Milk"))
//!         .add_item(OptimizationItem::new("7290000000002", 1).with_name("Bread"))
//!         .lambda_travel(1.0)
//!         .max_store_distance(10.0)
//!         .max_stores(3)
//!         .max_travel_distance(20.0)
//!         .build_multi_store()?;
//!
//!     let result = client.optimize_multi_store(&request).await?;
//!     println!("Solutions: {:?}", result.solutions);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod client;
pub mod builder;
pub mod error;

pub use client::{OptimizerClient, DEVICE_ID_HEADER};
pub use types::{
    AssignedItem, ListedItem, MultiStoreRequest, MultiStoreSolution, OptimizationItem,
    RankedStoresResult, SingleStoreEvaluation, SingleStoreRequest, StoreAssignment, StoreKey,
    TopMultiStoreSolutionsResult,
};
pub use builder::{
    OptimizationRequestBuilder, DEFAULT_COST_PER_DISTANCE_UNIT, DEFAULT_LAMBDA_TRAVEL,
};
pub use error::{ErrorKind, OptimizerError, Result, GENERIC_ERROR_MESSAGE};
