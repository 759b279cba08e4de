//! HTTP server for the car ledger
//!
//! Routes are organized into modules:
//! - routes::cars: legacy GET routes, JSON API, index page
//! - routes::settings: configuration display

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post, put},
    Router,
};
use carledger_config::Config;
use carledger_core::LedgerRef;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: LedgerRef,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::cars::{
        add_car, api_car_change_holder, api_car_create, api_car_detail, api_car_history, api_cars,
        change_holder, get_all_cars, get_car, htmx_cars_list, page_index,
    };
    use routes::settings::api_settings;

    Router::new()
        // Legacy routes used by the browser client
        .route("/get_car/:id", get(get_car))
        .route("/add_car/:car", get(add_car))
        .route("/get_all_cars", get(get_all_cars))
        .route("/get_all_cars/", get(get_all_cars))
        .route("/change_holder/:holder", get(change_holder))
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/cars", get(api_cars).post(api_car_create))
        .route("/api/cars/:id", get(api_car_detail))
        .route("/api/cars/:id/holder", put(api_car_change_holder))
        .route("/api/cars/:id/history", get(api_car_history))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(page_index))
        .route("/cars/list", get(htmx_cars_list))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - carledger</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50 text-gray-900">
    <main class="max-w-4xl mx-auto p-6">{}</main>
</body>
</html>"#,
        title, content
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(title, inner_content)
    }
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until Ctrl-C.
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `ledger` - The shared ledger
pub async fn start_server(config: Config, ledger: LedgerRef) -> std::io::Result<()> {
    let addr = config.bind_addr();
    let state = AppState { ledger, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting carledger server on http://{}", addr);
    log::info!("Legacy routes: /get_car/:id /add_car/:car /get_all_cars /change_holder/:holder");
    log::info!("JSON API: /api/cars, /api/settings, /api/health");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use carledger_core::{Car, CoreError, CoreResult, HistoryEntry, LedgerController, LedgerEntry, MemoryLedger};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    fn app_with(ledger: LedgerRef) -> Router {
        create_router(AppState { ledger, config: Config::default() })
    }

    fn seeded_app() -> Router {
        app_with(Arc::new(MemoryLedger::with_cars(vec![
            Car::new("10", "Prius", "Toyota", "Tomoko", "blue"),
            Car::new("2", "Mustang", "Ford", "Brad", "red"),
        ])))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn send_json(app: Router, method: &str, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    /// Ledger that records the arguments each operation received
    #[derive(Default)]
    struct RecordingLedger {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingLedger {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LedgerController for RecordingLedger {
        async fn get_car(&self, id: &str) -> CoreResult<Option<Car>> {
            self.calls.lock().unwrap().push(format!("get_car:{}", id));
            Ok(None)
        }

        async fn add_car(&self, car: Car) -> CoreResult<Car> {
            self.calls.lock().unwrap().push(format!("add_car:{}", carledger_core::wire::encode_car(&car)));
            Ok(car)
        }

        async fn get_all_cars(&self) -> CoreResult<Vec<LedgerEntry>> {
            self.calls.lock().unwrap().push("get_all_cars".to_string());
            Ok(vec![])
        }

        async fn change_holder(&self, id: &str, holder: &str) -> CoreResult<Option<Car>> {
            self.calls.lock().unwrap().push(format!("change_holder:{}:{}", id, holder));
            Ok(None)
        }

        async fn history(&self, _id: &str) -> CoreResult<Vec<HistoryEntry>> {
            Ok(vec![])
        }
    }

    /// Ledger whose snapshot storage is gone
    struct FailingLedger;

    fn disk_gone() -> CoreError {
        CoreError::IoError { message: "No space left on device".to_string() }
    }

    #[async_trait]
    impl LedgerController for FailingLedger {
        async fn get_car(&self, _id: &str) -> CoreResult<Option<Car>> {
            Err(disk_gone())
        }

        async fn add_car(&self, _car: Car) -> CoreResult<Car> {
            Err(disk_gone())
        }

        async fn get_all_cars(&self) -> CoreResult<Vec<LedgerEntry>> {
            Err(disk_gone())
        }

        async fn change_holder(&self, _id: &str, _holder: &str) -> CoreResult<Option<Car>> {
            Err(disk_gone())
        }

        async fn history(&self, _id: &str) -> CoreResult<Vec<HistoryEntry>> {
            Err(disk_gone())
        }
    }

    #[tokio::test]
    async fn test_route_params_reach_controller_unmodified() {
        let ledger = Arc::new(RecordingLedger::default());
        let app = app_with(ledger.clone());

        get(app.clone(), "/get_car/007").await;
        get(app.clone(), "/get_car/CAR%2012").await;
        get(app.clone(), "/add_car/1-m-k-o-c").await;
        get(app.clone(), "/change_holder/1-Mary-Jane").await;
        get(app.clone(), "/get_all_cars").await;
        get(app, "/get_all_cars/").await;

        assert_eq!(
            ledger.calls(),
            vec![
                "get_car:007",
                "get_car:CAR 12",
                "add_car:1-m-k-o-c",
                "change_holder:1:Mary-Jane",
                "get_all_cars",
                "get_all_cars",
            ]
        );
    }

    #[tokio::test]
    async fn test_legacy_get_car() {
        let (status, body) = get(seeded_app(), "/get_car/2").await;
        assert_eq!(status, StatusCode::OK);
        let record: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(record["make"], "Ford");
        assert_eq!(record["owner"], "Brad");
    }

    #[tokio::test]
    async fn test_legacy_get_car_miss_is_sentinel() {
        let (status, body) = get(seeded_app(), "/get_car/404").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Could not locate car");
    }

    #[tokio::test]
    async fn test_legacy_get_all_cars_shape() {
        let (status, body) = get(seeded_app(), "/get_all_cars/").await;
        assert_eq!(status, StatusCode::OK);
        let entries: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["Id"], "10");
        assert_eq!(entries[0]["Record"]["model"], "Prius");
    }

    #[tokio::test]
    async fn test_legacy_add_then_change_holder() {
        let app = seeded_app();

        let (status, body) = get(app.clone(), "/add_car/3-Polo-VW-Ann-white").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"owner\":\"Ann\""));

        let (status, body) = get(app.clone(), "/change_holder/3-alice").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"owner\":\"alice\""));

        let (_, body) = get(app, "/get_car/3").await;
        assert!(body.contains("alice"));
    }

    #[tokio::test]
    async fn test_legacy_change_holder_miss_is_sentinel() {
        let (status, body) = get(seeded_app(), "/change_holder/99-alice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Error: no car found");
    }

    #[tokio::test]
    async fn test_legacy_malformed_payload_is_bad_request() {
        let (status, body) = get(seeded_app(), "/add_car/1-only-three").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("INVALID_PAYLOAD"));

        let (status, _) = get(seeded_app(), "/change_holder/nohyphen").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legacy_ledger_failure_is_internal_error() {
        let app = app_with(Arc::new(FailingLedger));

        for uri in ["/add_car/1-Polo-VW-Ann-white", "/change_holder/1-alice", "/get_car/1", "/get_all_cars/"] {
            let (status, body) = get(app.clone(), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
            let details: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(details["code"], "IO_ERROR", "{}", uri);
            assert!(details["message"].as_str().unwrap().contains("No space left"));
        }
    }

    #[tokio::test]
    async fn test_pages_show_ledger_failure() {
        let app = app_with(Arc::new(FailingLedger));

        let (status, body) = get(app.clone(), "/?id=1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("error_ledger"));
        assert!(!body.contains("Could not locate car"));
        assert!(!body.contains("No cars recorded"));

        let (_, body) = get(app, "/cars/list").await;
        assert!(body.contains("Ledger unavailable"));
    }

    #[tokio::test]
    async fn test_api_create_rejects_hyphenated_id() {
        let app = seeded_app();

        let (status, body) = send_json(
            app.clone(),
            "POST",
            "/api/cars",
            serde_json::json!({"id": "10-A", "model": "Polo", "make": "VW", "owner": "Ann", "color": "white"}),
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PAYLOAD");

        let (status, _) = get(app.clone(), "/api/cars/10-A").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = get(app, "/api/cars/10").await;
        let car: Car = serde_json::from_str(&body).unwrap();
        assert_eq!(car.owner, "Tomoko");
    }

    #[tokio::test]
    async fn test_api_car_detail_and_not_found() {
        let (status, body) = get(seeded_app(), "/api/cars/10").await;
        assert_eq!(status, StatusCode::OK);
        let car: Car = serde_json::from_str(&body).unwrap();
        assert_eq!(car.id, "10");

        let (status, body) = get(seeded_app(), "/api/cars/77").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("CAR_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_api_create_transfer_history() {
        let app = seeded_app();

        let (status, car) = send_json(
            app.clone(),
            "POST",
            "/api/cars",
            serde_json::json!({"id": "5", "model": "Ghost", "make": "Rolls-Royce", "owner": "Ann", "color": "black"}),
        ).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(car["make"], "Rolls-Royce");

        let (status, car) = send_json(app.clone(), "PUT", "/api/cars/5/holder", serde_json::json!({"name": "Mary-Jane"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(car["owner"], "Mary-Jane");

        let (status, body) = get(app.clone(), "/api/cars/5/history").await;
        assert_eq!(status, StatusCode::OK);
        let history: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1]["kind"], "transfer");

        let (status, _) = send_json(app, "PUT", "/api/cars/nope/holder", serde_json::json!({"name": "x"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_create_rejects_bad_body() {
        let (status, body) = send_json(seeded_app(), "POST", "/api/cars", serde_json::json!({"id": "5"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PAYLOAD");

        let (status, _) = send_json(
            seeded_app(),
            "POST",
            "/api/cars",
            serde_json::json!({"id": " ", "model": "m", "make": "k", "owner": "o", "color": "c"}),
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_index_page_sorted_numerically() {
        let (status, body) = get(seeded_app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<!DOCTYPE html>"));
        let pos_2 = body.find("Mustang").unwrap();
        let pos_10 = body.find("Prius").unwrap();
        assert!(pos_2 < pos_10);
    }

    #[tokio::test]
    async fn test_index_lookup_miss() {
        let (_, body) = get(seeded_app(), "/?id=404").await;
        assert!(body.contains("Could not locate car"));
    }

    #[tokio::test]
    async fn test_health_and_settings() {
        let (status, body) = get(seeded_app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");

        let (status, body) = get(seeded_app(), "/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        let config: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(config["server"]["port"], 8000);
    }
}
