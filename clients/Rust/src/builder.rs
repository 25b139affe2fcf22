use std::collections::HashSet;

use crate::error::{OptimizerError, Result};
use crate::types::{MultiStoreRequest, OptimizationItem, SingleStoreRequest};

/// Neutral travel weighting used when the caller does not set one
pub const DEFAULT_LAMBDA_TRAVEL: f64 = 1.0;

/// Cost of one distance unit when the caller does not set one
pub const DEFAULT_COST_PER_DISTANCE_UNIT: f64 = 1.0;

/// Builder for constructing optimization requests with a fluent API
#[derive(Debug, Clone)]
pub struct OptimizationRequestBuilder {
    location: Option<(f64, f64)>,
    items: Vec<OptimizationItem>,
    lambda_travel: f64,
    cost_per_distance_unit: f64,
    max_store_distance: Option<f64>,
    max_stores: Option<u32>,
    max_travel_distance: Option<f64>,
}

impl Default for OptimizationRequestBuilder {
    fn default() -> Self {
        Self {
            location: None,
            items: Vec::new(),
            lambda_travel: DEFAULT_LAMBDA_TRAVEL,
            cost_per_distance_unit: DEFAULT_COST_PER_DISTANCE_UNIT,
            max_store_distance: None,
            max_stores: None,
            max_travel_distance: None,
        }
    }
}

impl OptimizationRequestBuilder {
    /// Create a new optimization request builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shopper's position
    ///
    /// # Example
    ///
    /// ```
    /// use basket_optimizer_sdk::OptimizationRequestBuilder;
    ///
    /// let builder = OptimizationRequestBuilder::new()
    ///     .location(32.0853, 34.7818);
    /// ```
    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some((latitude, longitude));
        self
    }

    /// Add an item to price
    ///
    /// # Example
    ///
    /// ```
    /// use basket_optimizer_sdk::{OptimizationItem, OptimizationRequestBuilder};
    ///
    /// let builder = OptimizationRequestBuilder::new()
    ///     .add_item(OptimizationItem::new("7290000000001", 2).with_name("Milk"));
    /// ```
    pub fn add_item(mut self, item: OptimizationItem) -> Self {
        self.items.push(item);
        self
    }

    /// Add multiple items
    pub fn add_items(mut self, items: impl IntoIterator<Item = OptimizationItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Set the travel weighting coefficient
    ///
    /// Higher values make nearby stores win; lower values let item prices dominate.
    pub fn lambda_travel(mut self, lambda_travel: f64) -> Self {
        self.lambda_travel = lambda_travel;
        self
    }

    /// Set the monetary cost of one distance unit
    pub fn cost_per_distance_unit(mut self, cost: f64) -> Self {
        self.cost_per_distance_unit = cost;
        self
    }

    /// Limit candidate stores to this radius (km)
    pub fn max_store_distance(mut self, km: f64) -> Self {
        self.max_store_distance = Some(km);
        self
    }

    /// Limit a multi-store solution to this many stores
    pub fn max_stores(mut self, max_stores: u32) -> Self {
        self.max_stores = Some(max_stores);
        self
    }

    /// Limit the total travel distance of a multi-store solution (km)
    pub fn max_travel_distance(mut self, km: f64) -> Self {
        self.max_travel_distance = Some(km);
        self
    }

    /// Build a single-store request
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No location has been set, or no items added (`MissingPreconditions`)
    /// - No store radius has been set
    /// - An item has zero quantity or an item code repeats
    ///
    /// # Example
    ///
    /// ```
    /// use basket_optimizer_sdk::{OptimizationItem, OptimizationRequestBuilder};
    ///
    /// let request = OptimizationRequestBuilder::new()
    ///     .location(32.0853, 34.7818)
    ///     .add_item(OptimizationItem::new("ABC123", 2).with_name("Milk"))
    ///     .max_store_distance(5.0)
    ///     .build_single_store()
    ///     .unwrap();
    ///
    /// assert_eq!(request.lambda_travel, 1.0);
    /// ```
    pub fn build_single_store(self) -> Result<SingleStoreRequest> {
        let (user_latitude, user_longitude) = self.location.ok_or_else(|| {
            OptimizerError::MissingPreconditions("User location is not available".to_string())
        })?;

        if self.items.is_empty() {
            return Err(OptimizerError::MissingPreconditions(
                "At least one item is required".to_string(),
            ));
        }

        validate_items(&self.items)?;

        let max_store_distance = self.max_store_distance.ok_or_else(|| {
            OptimizerError::InvalidRequest("Max store distance must be set".to_string())
        })?;

        Ok(SingleStoreRequest {
            user_latitude,
            user_longitude,
            items: self.items,
            lambda_travel: self.lambda_travel,
            cost_per_distance_unit: self.cost_per_distance_unit,
            max_store_distance,
        })
    }

    /// Build a multi-store request
    ///
    /// # Errors
    ///
    /// Everything [`build_single_store`](Self::build_single_store) rejects,
    /// plus a missing store count or travel bound.
    pub fn build_multi_store(self) -> Result<MultiStoreRequest> {
        let max_stores = self.max_stores;
        let max_travel_distance = self.max_travel_distance;
        let base = self.build_single_store()?;

        let max_stores = max_stores.ok_or_else(|| {
            OptimizerError::InvalidRequest("Max stores must be set".to_string())
        })?;
        if max_stores == 0 {
            return Err(OptimizerError::InvalidRequest(
                "Max stores must be at least 1".to_string(),
            ));
        }

        let max_travel_distance = max_travel_distance.ok_or_else(|| {
            OptimizerError::InvalidRequest("Max travel distance must be set".to_string())
        })?;

        Ok(MultiStoreRequest {
            base,
            max_stores,
            max_travel_distance,
        })
    }
}

fn validate_items(items: &[OptimizationItem]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());

    for item in items {
        if item.quantity == 0 {
            return Err(OptimizerError::InvalidRequest(format!(
                "Item {} has zero quantity",
                item.item_code
            )));
        }
        if !seen.insert(item.item_code.as_str()) {
            return Err(OptimizerError::InvalidRequest(format!(
                "Item {} appears more than once",
                item.item_code
            )));
        }
    }

    Ok(())
}
