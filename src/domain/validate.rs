use std::collections::{HashMap, HashSet};

use basket_optimizer_sdk::{
    OptimizationItem, OptimizerError, RankedStoresResult, TopMultiStoreSolutionsResult,
};
use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{details}")]
pub struct ResponseShapeError {
    pub details: String,
}

impl From<ResponseShapeError> for OptimizerError {
    fn from(e: ResponseShapeError) -> Self {
        OptimizerError::MalformedResponse(e.details)
    }
}

/// Check that every store accounts for every requested item exactly once,
/// and bring `is_partial_match` in line with the stores.
pub fn validate_ranked_stores(
    mut result: RankedStoresResult,
    requested: &[OptimizationItem],
) -> Result<RankedStoresResult, ResponseShapeError> {
    let requested_codes: HashSet<&str> = requested.iter().map(|i| i.item_code.as_str()).collect();

    for store in &result.ranked_stores {
        let listed: HashSet<&str> = store
            .items_in_list
            .iter()
            .map(|i| i.item_code.as_str())
            .collect();
        let missing: HashSet<&str> = store.missing_items.iter().map(String::as_str).collect();

        if let Some(code) = listed.intersection(&missing).next() {
            return Err(ResponseShapeError {
                details: format!(
                    "Store {} lists item {} as both available and missing",
                    store.store_key(),
                    code,
                ),
            });
        }

        for code in &requested_codes {
            if !listed.contains(code) && !missing.contains(code) {
                return Err(ResponseShapeError {
                    details: format!(
                        "Store {} does not account for item {}",
                        store.store_key(),
                        code,
                    ),
                });
            }
        }
    }

    let derived = result.derived_partial_match();
    if result.is_partial_match != derived {
        warn!(
            "is_partial_match={} disagrees with ranked stores; using {}",
            result.is_partial_match, derived
        );
        result.is_partial_match = derived;
    }

    Ok(result)
}

/// Check that every requested item is assigned to exactly one store in
/// each solution. Solutions without a breakdown are accepted as-is.
pub fn validate_multi_store(
    result: TopMultiStoreSolutionsResult,
    requested: &[OptimizationItem],
) -> Result<TopMultiStoreSolutionsResult, ResponseShapeError> {
    for (index, solution) in result.solutions.iter().enumerate() {
        if solution.assignments.is_none() {
            continue;
        }

        let mut placements: HashMap<&str, &str> = HashMap::new();
        for (label, store) in solution.stores() {
            for item in &store.items {
                if let Some(previous) = placements.insert(item.item_code.as_str(), label.as_str()) {
                    return Err(ResponseShapeError {
                        details: format!(
                            "Solution {} assigns item {} to both {} and {}",
                            index, item.item_code, previous, label,
                        ),
                    });
                }
            }
        }

        for item in requested {
            if !placements.contains_key(item.item_code.as_str()) {
                return Err(ResponseShapeError {
                    details: format!(
                        "Solution {} does not cover item {}",
                        index, item.item_code,
                    ),
                });
            }
        }
    }

    Ok(result)
}
