use basket_optimizer_sdk::{
    MultiStoreRequest, OptimizationItem, OptimizationRequestBuilder, OptimizerError, Result,
    SingleStoreRequest, DEFAULT_COST_PER_DISTANCE_UNIT,
};

use crate::models::{Coordinates, OptimizationMode, OptimizationSettings, PriorityChip};

/// Travel weighting with no chip selected
pub const LAMBDA_NEUTRAL: f64 = 1.0;
/// "Cheapest" chip: travel barely counts, item prices dominate
pub const LAMBDA_COST_PRIORITY: f64 = 0.1;
/// "Closest" chip: travel dominates, nearby stores win
pub const LAMBDA_DISTANCE_PRIORITY: f64 = 10.0;

/// The ranking is sensitive to the absolute scale, not just the order.
pub fn lambda_travel(chip: PriorityChip) -> f64 {
    match chip {
        PriorityChip::None => LAMBDA_NEUTRAL,
        PriorityChip::Cost => LAMBDA_COST_PRIORITY,
        PriorityChip::Distance => LAMBDA_DISTANCE_PRIORITY,
    }
}

/// A request body ready for one of the two optimize endpoints
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizationRequest {
    SingleStore(SingleStoreRequest),
    MultiStore(MultiStoreRequest),
}

impl OptimizationRequest {
    pub fn mode(&self) -> OptimizationMode {
        match self {
            OptimizationRequest::SingleStore(_) => OptimizationMode::SingleStore,
            OptimizationRequest::MultiStore(_) => OptimizationMode::MultiStore,
        }
    }

    pub fn items(&self) -> &[OptimizationItem] {
        match self {
            OptimizationRequest::SingleStore(r) => &r.items,
            OptimizationRequest::MultiStore(r) => &r.base.items,
        }
    }

    pub fn lambda_travel(&self) -> f64 {
        match self {
            OptimizationRequest::SingleStore(r) => r.lambda_travel,
            OptimizationRequest::MultiStore(r) => r.base.lambda_travel,
        }
    }
}

/// Map the current search inputs to a request body.
///
/// Pure: nothing is sent. Missing location or an empty list yields
/// `MissingPreconditions`.
pub fn build_request(
    mode: OptimizationMode,
    chip: PriorityChip,
    items: &[OptimizationItem],
    location: Option<Coordinates>,
    settings: &OptimizationSettings,
) -> Result<OptimizationRequest> {
    let location = location.ok_or_else(|| {
        OptimizerError::MissingPreconditions("User location is not available".to_string())
    })?;
    if items.is_empty() {
        return Err(OptimizerError::MissingPreconditions(
            "The shopping list is empty".to_string(),
        ));
    }

    let builder = OptimizationRequestBuilder::new()
        .location(location.latitude, location.longitude)
        .add_items(items.iter().cloned())
        .lambda_travel(lambda_travel(chip))
        .cost_per_distance_unit(DEFAULT_COST_PER_DISTANCE_UNIT)
        .max_store_distance(settings.max_store_distance_km);

    match mode {
        OptimizationMode::SingleStore => builder
            .build_single_store()
            .map(OptimizationRequest::SingleStore),
        OptimizationMode::MultiStore => builder
            .max_stores(settings.max_stores)
            .max_travel_distance(settings.max_travel_distance_km)
            .build_multi_store()
            .map(OptimizationRequest::MultiStore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEL_AVIV: Coordinates = Coordinates {
        latitude: 32.0853,
        longitude: 34.7818,
    };

    fn milk() -> Vec<OptimizationItem> {
        vec![OptimizationItem::new("ABC123", 2).with_name("Milk")]
    }

    #[test]
    fn test_chip_maps_to_exact_lambda_in_every_mode() {
        let settings = OptimizationSettings::default();
        for mode in [OptimizationMode::SingleStore, OptimizationMode::MultiStore] {
            for (chip, expected) in [
                (PriorityChip::None, 1.0),
                (PriorityChip::Cost, 0.1),
                (PriorityChip::Distance, 10.0),
            ] {
                let request = build_request(mode, chip, &milk(), Some(TEL_AVIV), &settings).unwrap();
                assert_eq!(request.lambda_travel(), expected, "{mode} / {chip}");
                assert_eq!(request.mode(), mode);
            }
        }
    }

    #[test]
    fn test_single_store_body_matches_wire_contract() {
        let settings = OptimizationSettings {
            max_store_distance_km: 7.5,
            ..OptimizationSettings::default()
        };
        let request = build_request(
            OptimizationMode::SingleStore,
            PriorityChip::None,
            &milk(),
            Some(TEL_AVIV),
            &settings,
        )
        .unwrap();

        let OptimizationRequest::SingleStore(body) = request else {
            panic!("expected a single-store request");
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "userLatitude": 32.0853,
                "userLongitude": 34.7818,
                "items": [{ "itemCode": "ABC123", "quantity": 2, "itemName": "Milk" }],
                "lambdaTravel": 1.0,
                "costPerDistanceUnit": 1.0,
                "maxStoreDistance": 7.5
            })
        );
    }

    #[test]
    fn test_multi_store_body_carries_store_limits() {
        let settings = OptimizationSettings {
            max_store_distance_km: 5.0,
            max_travel_distance_km: 12.0,
            max_stores: 2,
        };
        let request = build_request(
            OptimizationMode::MultiStore,
            PriorityChip::Distance,
            &milk(),
            Some(TEL_AVIV),
            &settings,
        )
        .unwrap();

        let OptimizationRequest::MultiStore(body) = request else {
            panic!("expected a multi-store request");
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["maxStores"], json!(2));
        assert_eq!(value["maxTravelDistance"], json!(12.0));
        assert_eq!(value["maxStoreDistance"], json!(5.0));
        assert_eq!(value["lambdaTravel"], json!(10.0));
    }

    #[test]
    fn test_missing_location_or_items_is_precondition_error() {
        let settings = OptimizationSettings::default();

        let no_location = build_request(
            OptimizationMode::SingleStore,
            PriorityChip::None,
            &milk(),
            None,
            &settings,
        );
        assert!(matches!(no_location, Err(OptimizerError::MissingPreconditions(_))));

        let no_items = build_request(
            OptimizationMode::MultiStore,
            PriorityChip::None,
            &[],
            Some(TEL_AVIV),
            &settings,
        );
        assert!(matches!(no_items, Err(OptimizerError::MissingPreconditions(_))));
    }
}
