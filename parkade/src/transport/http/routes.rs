//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::health::LotHealth;
use crate::lot::{LotError, SlotStatus, WaitlistEntry};
use crate::service::{HealthSnapshot, ParkingService};
use crate::version::VersionInfo;

const CLEAR_MISSING_TARGET: &str =
    "Invalid request: Must provide slot_number or car_registration_no";

/// Uniform client-facing failure: `400 {"status": 400, "error": "..."}`.
#[derive(Debug)]
pub struct ErrorResponse {
    message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self.message, "Request rejected");
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": StatusCode::BAD_REQUEST.as_u16(),
                "error": self.message,
            })),
        )
            .into_response()
    }
}

impl From<LotError> for ErrorResponse {
    fn from(err: LotError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: LotHealth,
    pub total_slots: usize,
    pub available_slots: usize,
    pub waitlisted: usize,
    pub version: VersionInfo,
}

impl From<HealthSnapshot> for HealthCheckResponse {
    fn from(snapshot: HealthSnapshot) -> Self {
        Self {
            status: snapshot.state,
            total_slots: snapshot.total_slots,
            available_slots: snapshot.available_slots,
            waitlisted: snapshot.waitlisted,
            version: snapshot.version,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InitializeRequest {
    no_of_slot: i64,
}

#[derive(Debug, Deserialize)]
struct ExpandRequest {
    increment_slot: i64,
}

#[derive(Debug, Deserialize)]
struct ParkRequest {
    car_reg_no: String,
    car_color: String,
}

#[derive(Debug, Deserialize)]
struct ClearRequest {
    slot_number: Option<usize>,
    car_registration_no: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SlotQuery {
    registration_number: String,
}

type ApiResult<T> = Result<T, ErrorResponse>;

async fn health_check(State(service): State<Arc<ParkingService>>) -> Json<HealthCheckResponse> {
    Json(service.health().into())
}

async fn initialize(
    State(service): State<Arc<ParkingService>>,
    body: Result<Json<InitializeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    let total_slot = service.initialize(request.no_of_slot)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "total_slot": total_slot })),
    ))
}

async fn expand(
    State(service): State<Arc<ParkingService>>,
    body: Result<Json<ExpandRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(request) = body?;
    let total_slot = service.expand(request.increment_slot)?;
    Ok(Json(serde_json::json!({ "total_slot": total_slot })))
}

async fn park(
    State(service): State<Arc<ParkingService>>,
    body: Result<Json<ParkRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    let slot = service.allocate(&request.car_reg_no, &request.car_color)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "allocated_slot_number": slot })),
    ))
}

async fn registration_numbers(
    State(service): State<Arc<ParkingService>>,
    Path(color): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(service.registration_numbers_by_color(&color)?))
}

async fn slot_numbers(
    State(service): State<Arc<ParkingService>>,
    Path(color): Path<String>,
) -> ApiResult<Json<Vec<usize>>> {
    Ok(Json(service.slot_numbers_by_color(&color)?))
}

/// Free a slot by number or by registration; `slot_number` wins if both are sent.
async fn clear(
    State(service): State<Arc<ParkingService>>,
    body: Result<Json<ClearRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(request) = body?;
    let freed = match (request.slot_number, request.car_registration_no) {
        (Some(slot_number), _) => service.free_by_slot(slot_number)?,
        (None, Some(registration_number)) => service.free_by_registration(&registration_number)?,
        (None, None) => return Err(ErrorResponse::bad_request(CLEAR_MISSING_TARGET)),
    };
    Ok(Json(serde_json::json!({ "freed_slot_number": freed })))
}

async fn status(State(service): State<Arc<ParkingService>>) -> Json<Vec<SlotStatus>> {
    Json(service.parking_status())
}

async fn slot_by_registration(
    State(service): State<Arc<ParkingService>>,
    query: Result<Query<SlotQuery>, QueryRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Query(query) = query?;
    let slot_number = service.slot_number_by_registration(&query.registration_number)?;
    Ok(Json(serde_json::json!({ "slot_number": slot_number })))
}

async fn waitlist(State(service): State<Arc<ParkingService>>) -> Json<Vec<WaitlistEntry>> {
    Json(service.waitlist())
}

async fn shutdown(State(service): State<Arc<ParkingService>>) -> impl IntoResponse {
    tracing::info!("Shutdown requested via HTTP");
    service.trigger_shutdown();
    (StatusCode::OK, Json(serde_json::json!({})))
}

/// Build the lot router. `POST /shutdown` is mounted only when `enable_shutdown` is set.
pub fn routes(service: Arc<ParkingService>, enable_shutdown: bool) -> Router {
    let router = Router::new()
        .route("/health-check", get(health_check))
        .route("/parking_lot", post(initialize).patch(expand))
        .route("/park", post(park))
        .route("/registration_numbers/{color}", get(registration_numbers))
        .route("/slot_numbers/{color}", get(slot_numbers))
        .route("/clear", post(clear))
        .route("/status", get(status))
        .route("/slot", get(slot_by_registration))
        .route("/waitlist", get(waitlist));

    let router = if enable_shutdown {
        router.route("/shutdown", post(shutdown))
    } else {
        router
    };
    router.with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::lot::MAX_SLOTS;

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn patch_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::patch(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn lot_app(slots: i64) -> Router {
        let app = routes(Arc::new(ParkingService::new()), false);
        let (status, _) = send(
            &app,
            post_json("/parking_lot", serde_json::json!({ "no_of_slot": slots })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        app
    }

    async fn park_car(app: &Router, reg: &str, color: &str) -> (StatusCode, serde_json::Value) {
        send(
            app,
            post_json(
                "/park",
                serde_json::json!({ "car_reg_no": reg, "car_color": color }),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn initialize_returns_total_slot() {
        let app = routes(Arc::new(ParkingService::new()), false);

        let (status, json) = send(
            &app,
            post_json("/parking_lot", serde_json::json!({ "no_of_slot": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json, serde_json::json!({ "total_slot": 5 }));

        let (status, json) = send(
            &app,
            post_json("/parking_lot", serde_json::json!({ "no_of_slot": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({
                "status": 400,
                "error": "Parking lot is already initialized"
            })
        );
    }

    #[tokio::test]
    async fn initialize_missing_field_is_bad_request() {
        let app = routes(Arc::new(ParkingService::new()), false);

        let (status, json) = send(&app, post_json("/parking_lot", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], 400);
        assert!(json["error"].as_str().unwrap().contains("no_of_slot"));
    }

    #[tokio::test]
    async fn expand_grows_lot() {
        let app = routes(Arc::new(ParkingService::new()), false);

        let (status, json) = send(
            &app,
            patch_json("/parking_lot", serde_json::json!({ "increment_slot": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Parking lot is not initialized yet.");

        send(
            &app,
            post_json("/parking_lot", serde_json::json!({ "no_of_slot": 2 })),
        )
        .await;

        let (status, json) = send(
            &app,
            patch_json("/parking_lot", serde_json::json!({ "increment_slot": -2 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Cannot decrement parking slots");

        let (status, json) = send(
            &app,
            patch_json("/parking_lot", serde_json::json!({ "increment_slot": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "total_slot": 5 }));
    }

    #[tokio::test]
    async fn park_allocates_lowest_slot() {
        let app = lot_app(2).await;

        let (status, json) = park_car(&app, "KA123", "red").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json, serde_json::json!({ "allocated_slot_number": 1 }));

        let (_, json) = park_car(&app, "KA124", "red").await;
        assert_eq!(json["allocated_slot_number"], 2);
    }

    #[tokio::test]
    async fn park_when_full_reports_waitlist() {
        let app = lot_app(1).await;
        park_car(&app, "KA1", "red").await;

        let (status, json) = park_car(&app, "KA2", "Blue").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Parking lot is full. You have been added to waitlist"
        );

        let (status, json) = send(&app, get_request("/waitlist")).await;
        assert_eq!(status, StatusCode::OK);
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["registration_no"], "KA2");
        assert_eq!(entries[0]["color"], "blue");
        assert!(entries[0]["queued_at"].is_string());
    }

    #[tokio::test]
    async fn color_lookups() {
        let app = lot_app(3).await;
        park_car(&app, "KA122", "red").await;
        park_car(&app, "KA123", "Red").await;
        park_car(&app, "KA124", "blue").await;

        let (status, json) = send(&app, get_request("/registration_numbers/RED")).await;
        assert_eq!(status, StatusCode::OK);
        let mut regs: Vec<String> = serde_json::from_value(json).unwrap();
        regs.sort();
        assert_eq!(regs, vec!["KA122", "KA123"]);

        let (status, json) = send(&app, get_request("/slot_numbers/red")).await;
        assert_eq!(status, StatusCode::OK);
        let mut slots: Vec<usize> = serde_json::from_value(json).unwrap();
        slots.sort();
        assert_eq!(slots, vec![1, 2]);

        let (status, json) = send(&app, get_request("/slot_numbers/green")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No cars with color green found");
    }

    #[tokio::test]
    async fn clear_by_slot_and_registration() {
        let app = lot_app(2).await;
        park_car(&app, "KA122", "red").await;
        park_car(&app, "KA123", "blue").await;

        let (status, json) = send(
            &app,
            post_json("/clear", serde_json::json!({ "slot_number": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "freed_slot_number": 1 }));

        let (status, json) = send(
            &app,
            post_json(
                "/clear",
                serde_json::json!({ "car_registration_no": "KA123" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "freed_slot_number": 2 }));

        let (status, json) = send(
            &app,
            post_json("/clear", serde_json::json!({ "slot_number": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Slot already free");

        let (status, json) = send(
            &app,
            post_json(
                "/clear",
                serde_json::json!({ "car_registration_no": "KA999" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Car not found");
    }

    #[tokio::test]
    async fn clear_without_target_is_bad_request() {
        let app = lot_app(1).await;

        let (status, json) = send(&app, post_json("/clear", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], CLEAR_MISSING_TARGET);
    }

    #[tokio::test]
    async fn clear_slot_zero_does_not_fall_back_to_registration() {
        let app = lot_app(1).await;
        park_car(&app, "KA1", "red").await;

        let (status, json) = send(
            &app,
            post_json(
                "/clear",
                serde_json::json!({ "slot_number": 0, "car_registration_no": "KA1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Slot 0 does not exist");

        let (status, json) = send(&app, get_request("/slot?registration_number=KA1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["slot_number"], 1);
    }

    #[tokio::test]
    async fn clear_promotes_waitlisted_car() {
        let app = lot_app(2).await;
        park_car(&app, "KA11", "grey").await;
        park_car(&app, "KA22", "black").await;
        let (status, _) = park_car(&app, "KA33", "black").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, json) = send(
            &app,
            post_json("/clear", serde_json::json!({ "slot_number": 1 })),
        )
        .await;
        assert_eq!(json["freed_slot_number"], 1);

        let (status, json) = send(&app, get_request("/slot?registration_number=KA33")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "slot_number": 1 }));

        let (_, json) = send(&app, get_request("/waitlist")).await;
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn slot_lookup_errors() {
        let app = lot_app(1).await;

        let (status, json) = send(&app, get_request("/slot?registration_number=KA123")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Car with this registration number KA123 is not parked"
        );

        let (status, json) = send(&app, get_request("/slot")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], 400);
    }

    #[tokio::test]
    async fn status_lists_occupied_slots() {
        let app = lot_app(3).await;
        park_car(&app, "KA122", "red").await;
        park_car(&app, "KA123", "black").await;
        park_car(&app, "KA124", "white").await;
        send(
            &app,
            post_json("/clear", serde_json::json!({ "slot_number": 2 })),
        )
        .await;

        let (status, json) = send(&app, get_request("/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!([
                { "slot_no": 1, "registration_no": "KA122", "color": "red" },
                { "slot_no": 3, "registration_no": "KA124", "color": "white" }
            ])
        );
    }

    #[tokio::test]
    async fn status_empty_before_initialization() {
        let app = routes(Arc::new(ParkingService::new()), false);

        let (status, json) = send(&app, get_request("/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn health_check_reports_counts_and_version() {
        let app = routes(Arc::new(ParkingService::new()), false);

        let (status, json) = send(&app, get_request("/health-check")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "UNINITIALIZED");
        assert!(json["version"]["parkade"].is_string());

        send(
            &app,
            post_json("/parking_lot", serde_json::json!({ "no_of_slot": 1 })),
        )
        .await;
        park_car(&app, "KA1", "red").await;
        park_car(&app, "KA2", "red").await;

        let (_, json) = send(&app, get_request("/health-check")).await;
        assert_eq!(json["status"], "FULL");
        assert_eq!(json["total_slots"], 1);
        assert_eq!(json["available_slots"], 0);
        assert_eq!(json["waitlisted"], 1);
    }

    #[tokio::test]
    async fn shutdown_triggers_service_shutdown() {
        let service = Arc::new(ParkingService::new());
        let mut rx = service.shutdown_rx();
        let app = routes(Arc::clone(&service), true);

        let (status, json) = send(
            &app,
            Request::post("/shutdown").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({}));

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn shutdown_route_absent_unless_enabled() {
        let service = Arc::new(ParkingService::new());
        let rx = service.shutdown_rx();
        let app = routes(Arc::clone(&service), false);

        let response = app
            .oneshot(Request::post("/shutdown").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn oversized_lot_is_bad_request() {
        let app = routes(Arc::new(ParkingService::new()), false);

        let (status, json) = send(
            &app,
            post_json(
                "/parking_lot",
                serde_json::json!({ "no_of_slot": i64::MAX }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            format!("Parking lot cannot exceed {MAX_SLOTS} slots")
        );

        send(
            &app,
            post_json("/parking_lot", serde_json::json!({ "no_of_slot": 2 })),
        )
        .await;
        let (status, json) = send(
            &app,
            patch_json(
                "/parking_lot",
                serde_json::json!({ "increment_slot": i64::MAX }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            format!("Parking lot cannot exceed {MAX_SLOTS} slots")
        );

        let (_, json) = send(&app, get_request("/health-check")).await;
        assert_eq!(json["total_slots"], 2);
    }
}
