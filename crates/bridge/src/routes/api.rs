//! Public API routes called from the merchant checkout.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::instrument;

use crate::config::BridgeConfig;
use crate::state::AppState;
use crate::workflow;

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Build the API router with CORS applied when origins are configured.
pub fn router(config: &BridgeConfig) -> Router<AppState> {
    let router = Router::new().route("/api/validate_code", post(validate_code));

    match cors_layer(&config.cors_allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// CORS for the checkout extension. Credentials are allowed, so origins,
/// methods, and headers must be explicit (wildcards are rejected by
/// browsers in that combination).
fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Skipping unparsable CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(CORS_MAX_AGE),
    )
}

#[derive(Debug, Deserialize)]
struct ValidateCodeRequest {
    #[serde(default)]
    code: Option<String>,
}

/// POST /api/validate_code - check a forwarding code.
///
/// Returns 200 with the match type and owning customer for a valid code,
/// 404 for an unknown code, 400 when the code is missing or blank.
#[instrument(skip(state, request))]
async fn validate_code(
    State(state): State<AppState>,
    Json(request): Json<ValidateCodeRequest>,
) -> Response {
    let Some(code) = request
        .code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
    else {
        tracing::warn!("No code provided in payload");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "Code is required" })),
        )
            .into_response();
    };

    match workflow::validate_code(state.pool(), code).await {
        Ok(Some(validation)) => Json(json!({
            "status": "success",
            "message": "Code is valid",
            "match_type": validation.match_type,
            "customer_id": validation.customer_id,
        }))
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "message": "Invalid code" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
