use std::collections::HashSet;

use basket_optimizer_sdk::{
    MultiStoreSolution, OptimizationItem, RankedStoresResult, SingleStoreEvaluation,
};
use serde::Serialize;

/// Stable key for a solution within one result set
pub fn solution_key(index: usize, total_cost: f64) -> String {
    format!("solution-{}-{}", index, total_cost)
}

/// Keys for every solution, in backend order
pub fn solution_keys(solutions: &[MultiStoreSolution]) -> Vec<String> {
    solutions
        .iter()
        .enumerate()
        .map(|(i, s)| solution_key(i, s.total_cost))
        .collect()
}

/// Which solutions, and which stores inside them, are expanded.
///
/// Collapsing a solution collapses its stores; expanding it does not
/// expand anything underneath.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded_solutions: HashSet<String>,
    expanded_stores: HashSet<(String, String)>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_solution(&mut self, key: &str) {
        if self.expanded_solutions.remove(key) {
            self.expanded_stores.retain(|(solution, _)| solution != key);
        } else {
            self.expanded_solutions.insert(key.to_string());
        }
    }

    /// No-op while the parent solution is collapsed.
    pub fn toggle_store(&mut self, solution_key: &str, store_id: &str) {
        if !self.expanded_solutions.contains(solution_key) {
            return;
        }
        let pair = (solution_key.to_string(), store_id.to_string());
        if !self.expanded_stores.remove(&pair) {
            self.expanded_stores.insert(pair);
        }
    }

    pub fn is_solution_expanded(&self, key: &str) -> bool {
        self.expanded_solutions.contains(key)
    }

    pub fn is_store_expanded(&self, solution_key: &str, store_id: &str) -> bool {
        self.expanded_stores
            .contains(&(solution_key.to_string(), store_id.to_string()))
    }

    pub fn expanded_store_count(&self, solution_key: &str) -> usize {
        self.expanded_stores
            .iter()
            .filter(|(s, _)| s == solution_key)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded_solutions.is_empty() && self.expanded_stores.is_empty()
    }

    pub fn reset(&mut self) {
        self.expanded_solutions.clear();
        self.expanded_stores.clear();
    }
}

/// A row in the missing-items panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingItem {
    pub id: String,
    pub name: String,
}

/// Resolve a store's missing codes to display names from the original list.
///
/// Items without a cached name (barcode scans) show their raw code.
pub fn missing_items_for(
    store: &SingleStoreEvaluation,
    requested: &[OptimizationItem],
) -> Vec<MissingItem> {
    store
        .missing_items
        .iter()
        .map(|code| {
            let name = requested
                .iter()
                .find(|i| &i.item_code == code)
                .and_then(|i| i.item_name.clone())
                .unwrap_or_else(|| code.clone());
            MissingItem {
                id: code.clone(),
                name,
            }
        })
        .collect()
}

/// Stores that lack at least one requested item, in rank order
pub fn stores_with_missing_items(result: &RankedStoresResult) -> Vec<&SingleStoreEvaluation> {
    result
        .ranked_stores
        .iter()
        .filter(|s| s.is_partial())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_solution_key_format() {
        assert_eq!(solution_key(0, 123.45), "solution-0-123.45");
        assert_eq!(solution_key(2, 80.0), "solution-2-80");
    }

    #[test]
    fn test_collapse_cascades_to_stores() {
        let mut state = ExpansionState::new();
        state.toggle_solution("solution-0-10");
        state.toggle_store("solution-0-10", "store-a");
        state.toggle_store("solution-0-10", "store-b");
        assert_eq!(state.expanded_store_count("solution-0-10"), 2);

        state.toggle_solution("solution-0-10");
        assert!(!state.is_solution_expanded("solution-0-10"));
        assert_eq!(state.expanded_store_count("solution-0-10"), 0);

        state.toggle_solution("solution-0-10");
        assert!(state.is_solution_expanded("solution-0-10"));
        assert_eq!(state.expanded_store_count("solution-0-10"), 0);
    }

    #[test]
    fn test_collapse_leaves_other_solutions_alone() {
        let mut state = ExpansionState::new();
        state.toggle_solution("solution-0-10");
        state.toggle_solution("solution-1-12");
        state.toggle_store("solution-0-10", "a");
        state.toggle_store("solution-1-12", "a");

        state.toggle_solution("solution-0-10");
        assert!(state.is_store_expanded("solution-1-12", "a"));
        assert!(!state.is_store_expanded("solution-0-10", "a"));
    }

    #[test]
    fn test_toggle_store_under_collapsed_solution_is_noop() {
        let mut state = ExpansionState::new();
        state.toggle_store("solution-0-10", "a");
        assert!(state.is_empty());
    }

    #[test]
    fn test_toggle_store_flips() {
        let mut state = ExpansionState::new();
        state.toggle_solution("s");
        state.toggle_store("s", "a");
        assert!(state.is_store_expanded("s", "a"));
        state.toggle_store("s", "a");
        assert!(!state.is_store_expanded("s", "a"));
    }

    #[test]
    fn test_missing_items_fall_back_to_code() {
        let store: SingleStoreEvaluation = serde_json::from_value(json!({
            "chainId": "1",
            "subChainId": "1",
            "store_id": "1",
            "combined_score": 1.0,
            "item_cost_at_store": 1.0,
            "travel_cost_to_store": 0.0,
            "distance_to_store_km": 0.4,
            "missing_items": ["X1", "X2"]
        }))
        .unwrap();
        let requested = vec![
            OptimizationItem::new("X1", 1).with_name("Hummus"),
            OptimizationItem::new("X2", 1),
        ];

        assert_eq!(
            missing_items_for(&store, &requested),
            vec![
                MissingItem { id: "X1".into(), name: "Hummus".into() },
                MissingItem { id: "X2".into(), name: "X2".into() },
            ]
        );
    }

    #[test]
    fn test_stores_with_missing_items_keeps_rank_order() {
        let store = |id: &str, missing: &[&str]| {
            json!({
                "chainId": "1", "subChainId": "1", "store_id": id,
                "combined_score": 1.0, "item_cost_at_store": 1.0,
                "travel_cost_to_store": 0.0, "distance_to_store_km": 0.4,
                "missing_items": missing
            })
        };
        let result: RankedStoresResult = serde_json::from_value(json!({
            "is_partial_match": true,
            "ranked_stores": [store("a", &["X1"]), store("b", &[]), store("c", &["X2"])]
        }))
        .unwrap();

        let ids: Vec<&str> = stores_with_missing_items(&result)
            .iter()
            .map(|s| s.store_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
