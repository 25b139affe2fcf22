use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use basket_compare::{
    AppConfig, Completion, Coordinates, LocationStatus, OptimizationMode, OptimizationSettings,
    Orchestrator, OrchestratorState, Phase, PriorityChip, SessionHandle,
};
use basket_optimizer_sdk::{
    ErrorKind, OptimizationItem, OptimizationRequestBuilder, OptimizerClient, OptimizerError,
    DEVICE_ID_HEADER, GENERIC_ERROR_MESSAGE,
};
use serde_json::{json, Value};
use serial_test::serial;
use std::env;

const TEL_AVIV: Coordinates = Coordinates {
    latitude: 32.0853,
    longitude: 34.7818,
};

// ---------- Mock optimization backend ----------

fn requested_codes(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["itemCode"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn scripted_failure(codes: &[String]) -> Option<HttpResponse> {
    match codes.first().map(String::as_str) {
        Some("ERR-MSG") => Some(
            HttpResponse::UnprocessableEntity()
                .json(json!({ "message": "No stores within range" })),
        ),
        Some("ERR-500") => Some(HttpResponse::InternalServerError().body("boom")),
        Some("GARBAGE") => Some(
            HttpResponse::Ok()
                .content_type("application/json")
                .body("{\"ranked_stores\": ["),
        ),
        _ => None,
    }
}

/// Store 1 carries everything; store 2 lacks the last item of longer lists.
/// `combined_score` echoes lambdaTravel and `store_name` echoes the device id.
async fn single_store(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    let codes = requested_codes(&body);
    if let Some(response) = scripted_failure(&codes) {
        return response;
    }

    let device = req
        .headers()
        .get(DEVICE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();
    let lambda = body["lambdaTravel"].as_f64().unwrap_or(-1.0);

    let listed = |codes: &[String]| -> Vec<Value> {
        codes
            .iter()
            .map(|c| json!({ "itemCode": c, "price": 5.9 }))
            .collect()
    };
    let (carried, missing) = if codes.len() > 1 {
        codes.split_at(codes.len() - 1)
    } else {
        (&codes[..], &[][..])
    };

    HttpResponse::Ok().json(json!({
        "is_partial_match": !missing.is_empty(),
        "ranked_stores": [
            {
                "chainId": "7290027600007", "subChainId": "1", "store_id": 1,
                "store_name": device,
                "address": "Dizengoff 50, Tel Aviv",
                "combined_score": lambda,
                "item_cost_at_store": 30.0,
                "travel_cost_to_store": 2.0,
                "distance_to_store_km": 0.8,
                "items_in_list": listed(&codes),
                "missing_items": []
            },
            {
                "chainId": 7290058140886u64, "subChainId": 1, "store_id": "2",
                "combined_score": lambda + 1.0,
                "item_cost_at_store": 25.0,
                "travel_cost_to_store": 8.0,
                "distance_to_store_km": 3.4,
                "items_in_list": listed(carried),
                "missing_items": missing
            }
        ]
    }))
}

/// Alternates items between two stores; `travel_cost` echoes maxStores.
async fn multi_store(body: web::Json<Value>) -> HttpResponse {
    let codes = requested_codes(&body);
    if let Some(response) = scripted_failure(&codes) {
        return response;
    }
    let max_stores = body["maxStores"].as_f64().unwrap_or(-1.0);

    let item = |c: &String| json!({ "itemCode": c, "quantity": 1, "price": 4.0 });
    let first: Vec<Value> = codes.iter().step_by(2).map(item).collect();
    let second: Vec<Value> = codes.iter().skip(1).step_by(2).map(item).collect();

    HttpResponse::Ok().json(json!({
        "solutions": [
            {
                "assignments": {
                    "Shufersal": { "chainId": "7290027600007", "subChainId": "1", "store_id": "1", "items": first },
                    "Rami Levy": { "chainId": "7290058140886", "subChainId": "1", "store_id": "2", "items": second }
                },
                "total_cost": 4.0 * codes.len() as f64 + max_stores,
                "item_cost": 4.0 * codes.len() as f64,
                "travel_cost": max_stores
            },
            {
                "assignments": null,
                "total_cost": 99.0,
                "item_cost": 90.0,
                "travel_cost": 9.0
            }
        ]
    }))
}

async fn start_mock_backend() -> (String, ServerHandle) {
    let server = HttpServer::new(|| {
        App::new()
            .route("/health", web::get().to(|| async { HttpResponse::Ok().body("OK") }))
            .route("/optimize/single-store", web::post().to(single_store))
            .route("/optimize/multi-store", web::post().to(multi_store))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind mock backend");

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    (format!("http://{}", addr), handle)
}

fn shopping_list() -> Vec<OptimizationItem> {
    vec![
        OptimizationItem::new("7290000000001", 2).with_name("Milk"),
        OptimizationItem::new("7290000000002", 1).with_name("Bread"),
        OptimizationItem::new("7290000000003", 6),
    ]
}

async fn ready_orchestrator(
    client: OptimizerClient,
    items: Vec<OptimizationItem>,
) -> (Orchestrator<OptimizerClient>, Option<Completion>) {
    let session = SessionHandle::new(OrchestratorState::new(OptimizationSettings::default()));
    let orchestrator = Orchestrator::new(client, session);
    orchestrator.update_items(items).await;
    let completion = orchestrator
        .update_location(LocationStatus::Available(TEL_AVIV))
        .await;
    (orchestrator, completion)
}

// ---------- Tests ----------

#[actix_web::test]
async fn test_health_endpoint() {
    let (base_url, handle) = start_mock_backend().await;
    let client = OptimizerClient::new(&base_url).unwrap();

    assert!(client.health_check().await.unwrap());

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_single_store_partial_match_flow() {
    let (base_url, handle) = start_mock_backend().await;
    let client = OptimizerClient::new(&base_url)
        .unwrap()
        .with_device_id("device-42");

    let (orchestrator, completion) = ready_orchestrator(client, shopping_list()).await;
    assert_eq!(completion, Some(Completion::Applied));

    let mut state = orchestrator.session().lock();
    assert_eq!(*state.phase(), Phase::Success);

    let result = state.single_store_result().unwrap();
    assert!(result.is_partial_match);
    assert_eq!(result.ranked_stores.len(), 2);
    assert_eq!(result.ranked_stores[0].store_id, "1");
    assert_eq!(result.ranked_stores[0].store_name.as_deref(), Some("device-42"));
    assert_eq!(result.ranked_stores[0].combined_score, 1.0);
    assert_eq!(result.ranked_stores[1].chain_id, "7290058140886");

    let notice = state.take_partial_match_notice().unwrap();
    assert_eq!(notice.stores_with_missing, 1);
    assert!(state.take_partial_match_notice().is_none());

    let missing = state.missing_items_for(&result.ranked_stores[1]);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].id, "7290000000003");
    assert_eq!(missing[0].name, "7290000000003");
    drop(state);

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_priority_chips_reach_backend() {
    let (base_url, handle) = start_mock_backend().await;
    let client = OptimizerClient::new(&base_url).unwrap();
    let (orchestrator, _) = ready_orchestrator(client, shopping_list()).await;

    orchestrator.toggle_chip(PriorityChip::Distance).await.unwrap();
    let score = orchestrator.session().lock().single_store_result().unwrap().ranked_stores[0]
        .combined_score;
    assert_eq!(score, 10.0);

    orchestrator.toggle_chip(PriorityChip::Cost).await.unwrap();
    let score = orchestrator.session().lock().single_store_result().unwrap().ranked_stores[0]
        .combined_score;
    assert_eq!(score, 0.1);

    // selecting the active chip again clears it
    orchestrator.toggle_chip(PriorityChip::Cost).await.unwrap();
    let state = orchestrator.session().lock();
    assert_eq!(state.chip(), PriorityChip::None);
    assert_eq!(state.single_store_result().unwrap().ranked_stores[0].combined_score, 1.0);
    drop(state);

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_multi_store_flow() {
    let (base_url, handle) = start_mock_backend().await;
    let client = OptimizerClient::new(&base_url).unwrap();
    let (orchestrator, _) = ready_orchestrator(client, shopping_list()).await;

    let switched = orchestrator
        .select_mode(OptimizationMode::MultiStore)
        .await
        .unwrap();
    assert_eq!(switched, Some(Completion::Applied));

    let state = orchestrator.session().lock();
    assert!(state.single_store_result().is_none());
    assert!(state.partial_match_notice().is_none());
    let result = state.multi_store_result().unwrap();
    assert_eq!(result.solutions.len(), 2);
    assert_eq!(result.solutions[0].travel_cost, 3.0);
    assert_eq!(result.solutions[0].stores().count(), 2);
    assert!(result.solutions[1].assignments.is_none());
    drop(state);

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_backend_message_is_surfaced() {
    let (base_url, handle) = start_mock_backend().await;
    let client = OptimizerClient::new(&base_url).unwrap();
    let (orchestrator, _) =
        ready_orchestrator(client, vec![OptimizationItem::new("ERR-MSG", 1)]).await;

    let state = orchestrator.session().lock();
    assert_eq!(state.error(), Some("No stores within range"));
    assert!(matches!(
        state.phase(),
        Phase::Failed { kind: ErrorKind::BackendError, .. }
    ));
    drop(state);

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_backend_error_without_message_uses_fallback() {
    let (base_url, handle) = start_mock_backend().await;
    let client = OptimizerClient::new(&base_url).unwrap();

    let request = OptimizationRequestBuilder::new()
        .location(TEL_AVIV.latitude, TEL_AVIV.longitude)
        .add_item(OptimizationItem::new("ERR-500", 1))
        .max_store_distance(5.0)
        .build_single_store()
        .unwrap();

    let error = client.optimize_single_store(&request).await.unwrap_err();
    assert!(matches!(error, OptimizerError::Backend { status: 500, message: None }));
    assert_eq!(error.user_message(), GENERIC_ERROR_MESSAGE);

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_malformed_body_is_reported() {
    let (base_url, handle) = start_mock_backend().await;
    let client = OptimizerClient::new(&base_url).unwrap();
    let (orchestrator, _) =
        ready_orchestrator(client, vec![OptimizationItem::new("GARBAGE", 1)]).await;

    let state = orchestrator.session().lock();
    assert!(matches!(
        state.phase(),
        Phase::Failed { kind: ErrorKind::MalformedResponse, .. }
    ));
    assert_eq!(state.error(), Some(GENERIC_ERROR_MESSAGE));
    drop(state);

    handle.stop(true).await;
}

#[actix_web::test]
#[serial]
async fn test_client_from_env_config() {
    let (base_url, handle) = start_mock_backend().await;
    env::set_var("OPTIMIZER_API_URL", &base_url);
    env::set_var("OPTIMIZER_TIMEOUT_SECS", "5");

    let config = AppConfig::from_env();
    env::remove_var("OPTIMIZER_API_URL");
    env::remove_var("OPTIMIZER_TIMEOUT_SECS");

    let client = OptimizerClient::new(&config.api_url)
        .unwrap()
        .with_timeout(config.request_timeout);
    assert!(client.health_check().await.unwrap());

    handle.stop(true).await;
}
