//! Client core for grocery price comparison: turns a shopping list, a
//! location and the shopper's constraints into single-store or multi-store
//! optimization requests, and keeps the results consistent with what is on
//! screen.

pub mod config;
pub mod domain;
pub mod models;

pub use config::AppConfig;
pub use domain::backend::OptimizationBackend;
pub use domain::grocery_list::GroceryList;
pub use domain::orchestrator::{
    Completion, Orchestrator, OrchestratorState, Outcome, PartialMatchNotice, PendingRequest,
    Phase, SessionHandle, Trigger,
};
pub use domain::presentation::{missing_items_for, solution_key, ExpansionState, MissingItem};
pub use domain::request::{build_request, lambda_travel, OptimizationRequest};
pub use domain::store_directory::{StoreDirectory, StoreMetadata};
pub use models::{
    Coordinates, LocationStatus, OptimizationMode, OptimizationSettings, PriorityChip,
};
