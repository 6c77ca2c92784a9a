use axum::{
    extract::{Query, Request},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;

const ETA: &str = include_str!("../../test-vectors/eta.json");
const RIDE_TYPES: &str = include_str!("../../test-vectors/ride_types.json");
const COST: &str = include_str!("../../test-vectors/cost.json");
const COST_SINGLE_LOCATION: &str = include_str!("../../test-vectors/cost_single_location.json");
const NEARBY_DRIVERS: &str = include_str!("../../test-vectors/nearby_drivers.json");
const ERROR: &str = include_str!("../../test-vectors/error.json");

/// An error body in the ride API's `error` / `error_description` shape.
pub struct ApiFailure {
    status: StatusCode,
    reason: &'static str,
    description: &'static str,
}

impl ApiFailure {
    fn new(status: StatusCode, reason: &'static str, description: &'static str) -> Self {
        Self {
            status,
            reason,
            description,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.reason,
            "error_description": self.description,
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
pub struct PositionQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Deserialize)]
pub struct CostQuery {
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    pub ride_type: Option<String>,
}

/// Serves the fixtures in `test-vectors/` for every ride API route.
pub fn app() -> Router {
    Router::new()
        .route("/v1/eta", get(eta))
        .route("/v1/ridetypes", get(ride_types))
        .route("/v1/cost", get(cost))
        .route("/v1/drivers", get(drivers))
        .layer(middleware::from_fn(require_bearer))
}

/// Answers every request with the error fixture and `status`.
pub fn failing_app(status: u16) -> Router {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Router::new().fallback(move || async move { (status, fixture(ERROR)) })
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn run_failing(listener: TcpListener, status: u16) -> Result<(), std::io::Error> {
    serve(listener, failing_app(status)).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn fixture(raw: &'static str) -> Json<Value> {
    Json(serde_json::from_str(raw).unwrap_or(Value::Null))
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer ") && value.len() > "Bearer ".len());

    if !authorized {
        tracing::info!(path = %request.uri().path(), "rejecting request without bearer token");
        return ApiFailure::new(StatusCode::UNAUTHORIZED, "invalid_token", "Missing or invalid access token")
            .into_response();
    }
    next.run(request).await
}

fn require_position(lat: Option<f64>, lng: Option<f64>) -> Result<(), ApiFailure> {
    match (lat, lng) {
        (Some(_), Some(_)) => Ok(()),
        _ => Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "bad_parameter",
            "lat and lng are required",
        )),
    }
}

async fn eta(Query(query): Query<PositionQuery>) -> Result<Json<Value>, ApiFailure> {
    require_position(query.lat, query.lng)?;
    Ok(fixture(ETA))
}

async fn ride_types(Query(query): Query<PositionQuery>) -> Result<Json<Value>, ApiFailure> {
    require_position(query.lat, query.lng)?;
    Ok(fixture(RIDE_TYPES))
}

async fn drivers(Query(query): Query<PositionQuery>) -> Result<Json<Value>, ApiFailure> {
    require_position(query.lat, query.lng)?;
    Ok(fixture(NEARBY_DRIVERS))
}

async fn cost(Query(query): Query<CostQuery>) -> Result<Json<Value>, ApiFailure> {
    require_position(query.start_lat, query.start_lng)?;

    let raw = match (query.end_lat, query.end_lng) {
        (Some(_), Some(_)) => COST,
        _ => COST_SINGLE_LOCATION,
    };
    let Json(mut body) = fixture(raw);

    if let Some(ride_type) = query.ride_type {
        if let Some(estimates) = body.get_mut("cost_estimates").and_then(Value::as_array_mut) {
            estimates.retain(|estimate| estimate["ride_type"] == ride_type.as_str());
        }
    }
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_valid_json() {
        for raw in [ETA, RIDE_TYPES, COST, COST_SINGLE_LOCATION, NEARBY_DRIVERS, ERROR] {
            assert!(serde_json::from_str::<Value>(raw).is_ok());
        }
    }

    #[test]
    fn require_position_needs_both_coordinates() {
        assert!(require_position(Some(1.0), Some(2.0)).is_ok());
        assert!(require_position(Some(1.0), None).is_err());
        assert!(require_position(None, None).is_err());
    }

    #[test]
    fn cost_query_fields_are_optional() {
        let query: CostQuery = serde_json::from_str(r#"{"start_lat":1.0,"start_lng":2.0}"#).unwrap();
        assert!(query.end_lat.is_none());
        assert!(query.ride_type.is_none());
    }
}
