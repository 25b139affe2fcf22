use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A grocery line the shopper wants priced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationItem {
    /// Product barcode / item code
    #[serde(alias = "item_code")]
    pub item_code: String,
    /// Requested quantity, always positive
    pub quantity: u32,
    /// Display name, when the source screen knew it
    #[serde(default, alias = "item_name", skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
}

impl OptimizationItem {
    /// Create a new item with the given code and quantity
    pub fn new(item_code: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_code: item_code.into(),
            quantity,
            item_name: None,
        }
    }

    /// Attach a display name
    pub fn with_name(mut self, item_name: impl Into<String>) -> Self {
        self.item_name = Some(item_name.into());
        self
    }
}

/// Request body for `POST /optimize/single-store`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleStoreRequest {
    /// Shopper latitude
    pub user_latitude: f64,
    /// Shopper longitude
    pub user_longitude: f64,
    /// Items to price
    pub items: Vec<OptimizationItem>,
    /// Weight of travel cost relative to item cost
    pub lambda_travel: f64,
    /// Monetary cost of one distance unit
    pub cost_per_distance_unit: f64,
    /// Stores farther than this (km) are not considered
    pub max_store_distance: f64,
}

/// Request body for `POST /optimize/multi-store`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStoreRequest {
    /// Fields shared with the single-store request
    #[serde(flatten)]
    pub base: SingleStoreRequest,
    /// Upper bound on the number of stores in one solution
    pub max_stores: u32,
    /// Upper bound on the total travel distance (km)
    pub max_travel_distance: f64,
}

/// Identity of a physical store: chain, sub-chain and branch
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreKey {
    pub chain_id: String,
    pub sub_chain_id: String,
    pub store_id: String,
}

impl StoreKey {
    pub fn new(
        chain_id: impl Into<String>,
        sub_chain_id: impl Into<String>,
        store_id: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            sub_chain_id: sub_chain_id.into(),
            store_id: store_id.into(),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.chain_id, self.sub_chain_id, self.store_id)
    }
}

/// An item a store carries, with that store's price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedItem {
    #[serde(rename = "itemCode", alias = "item_code", deserialize_with = "string_or_number")]
    pub item_code: String,
    #[serde(rename = "itemName", alias = "item_name", default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    pub price: f64,
}

/// One ranked store candidate from the single-store optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleStoreEvaluation {
    #[serde(rename = "chainId", alias = "chain_id", deserialize_with = "string_or_number")]
    pub chain_id: String,
    #[serde(rename = "subChainId", alias = "sub_chain_id", deserialize_with = "string_or_number")]
    pub sub_chain_id: String,
    #[serde(alias = "storeId", deserialize_with = "string_or_number")]
    pub store_id: String,
    #[serde(default, alias = "storeName")]
    pub store_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub combined_score: f64,
    pub item_cost_at_store: f64,
    pub travel_cost_to_store: f64,
    pub distance_to_store_km: f64,
    #[serde(default)]
    pub items_in_list: Vec<ListedItem>,
    #[serde(default)]
    pub missing_items: Vec<String>,
}

impl SingleStoreEvaluation {
    pub fn store_key(&self) -> StoreKey {
        StoreKey::new(&self.chain_id, &self.sub_chain_id, &self.store_id)
    }

    /// Whether this store lacks at least one requested item
    pub fn is_partial(&self) -> bool {
        !self.missing_items.is_empty()
    }
}

/// Response from the single-store endpoint, best candidate first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStoresResult {
    pub is_partial_match: bool,
    pub ranked_stores: Vec<SingleStoreEvaluation>,
}

impl RankedStoresResult {
    /// The partial-match flag as implied by the ranked stores themselves
    pub fn derived_partial_match(&self) -> bool {
        self.ranked_stores.iter().any(SingleStoreEvaluation::is_partial)
    }
}

/// An item placed in one store of a multi-store solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedItem {
    #[serde(rename = "itemCode", alias = "item_code", deserialize_with = "string_or_number")]
    pub item_code: String,
    #[serde(rename = "itemName", alias = "item_name", default)]
    pub item_name: Option<String>,
    pub quantity: u32,
    pub price: f64,
}

/// The part of a multi-store solution bought at a single store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreAssignment {
    #[serde(rename = "chainId", alias = "chain_id", deserialize_with = "string_or_number")]
    pub chain_id: String,
    #[serde(rename = "subChainId", alias = "sub_chain_id", deserialize_with = "string_or_number")]
    pub sub_chain_id: String,
    #[serde(alias = "storeId", deserialize_with = "string_or_number")]
    pub store_id: String,
    #[serde(default, alias = "storeName")]
    pub store_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub items: Vec<AssignedItem>,
}

impl StoreAssignment {
    pub fn store_key(&self) -> StoreKey {
        StoreKey::new(&self.chain_id, &self.sub_chain_id, &self.store_id)
    }
}

/// One way to split the list across stores.
///
/// `total_cost = item_cost + travel_cost` as computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiStoreSolution {
    /// Store label → what to buy there; `null` when the backend omits the breakdown
    #[serde(default)]
    pub assignments: Option<BTreeMap<String, StoreAssignment>>,
    pub total_cost: f64,
    pub item_cost: f64,
    pub travel_cost: f64,
}

impl MultiStoreSolution {
    /// Iterate over the store assignments, empty when the breakdown is absent
    pub fn stores(&self) -> impl Iterator<Item = (&String, &StoreAssignment)> {
        self.assignments.iter().flat_map(|a| a.iter())
    }
}

/// Response from the multi-store endpoint, best solution first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMultiStoreSolutionsResult {
    pub solutions: Vec<MultiStoreSolution>,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// Store and item identifiers arrive as strings from some chains and as
// bare numbers from others.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        UInt(u64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::UInt(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_serializes_camel_case_without_missing_name() {
        let value = serde_json::to_value(OptimizationItem::new("ABC123", 2)).unwrap();
        assert_eq!(value, json!({ "itemCode": "ABC123", "quantity": 2 }));
    }

    #[test]
    fn test_multi_store_request_flattens_base_fields() {
        let request = MultiStoreRequest {
            base: SingleStoreRequest {
                user_latitude: 32.0,
                user_longitude: 34.0,
                items: vec![OptimizationItem::new("A", 1)],
                lambda_travel: 1.0,
                cost_per_distance_unit: 1.0,
                max_store_distance: 5.0,
            },
            max_stores: 2,
            max_travel_distance: 12.5,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["userLatitude"], json!(32.0));
        assert_eq!(value["maxStores"], json!(2));
        assert_eq!(value["maxTravelDistance"], json!(12.5));
        assert!(value.get("base").is_none());
    }

    #[test]
    fn test_evaluation_accepts_numeric_ids() {
        let value = json!({
            "chainId": 7290027600007u64,
            "subChainId": "1",
            "store_id": 42,
            "combined_score": 120.5,
            "item_cost_at_store": 100.0,
            "travel_cost_to_store": 20.5,
            "distance_to_store_km": 2.1,
            "items_in_list": [{ "itemCode": "A", "price": 9.9 }],
            "missing_items": ["B"]
        });
        let evaluation: SingleStoreEvaluation = serde_json::from_value(value).unwrap();
        assert_eq!(
            evaluation.store_key(),
            StoreKey::new("7290027600007", "1", "42")
        );
        assert!(evaluation.is_partial());
        assert_eq!(evaluation.store_key().to_string(), "7290027600007/1/42");
    }

    #[test]
    fn test_ids_above_i64_range_keep_every_digit() {
        let item: ListedItem =
            serde_json::from_value(json!({ "itemCode": u64::MAX, "price": 1.0 })).unwrap();
        assert_eq!(item.item_code, "18446744073709551615");
    }

    #[test]
    fn test_solution_with_null_assignments() {
        let value = json!({
            "assignments": null,
            "total_cost": 10.0,
            "item_cost": 8.0,
            "travel_cost": 2.0
        });
        let solution: MultiStoreSolution = serde_json::from_value(value).unwrap();
        assert_eq!(solution.stores().count(), 0);
    }
}
