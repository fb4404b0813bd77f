//! Administrative order-link routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::instrument;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// Build the administrative order-link router.
pub fn router() -> Router<AppState> {
    Router::new().route("/orders/{merchant_order_id}", get(get_order_link))
}

/// GET /orders/{merchant_order_id} - look up the correlation for a merchant
/// order, so support staff can tell whether (and to which draft order) a
/// paid order was linked.
#[instrument(skip(state))]
async fn get_order_link(
    State(state): State<AppState>,
    Path(merchant_order_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(link) =
        db::order_links::get_by_merchant_order_id(state.pool(), &merchant_order_id).await?
    else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Order link not found" })),
        )
            .into_response());
    };

    Ok(Json(link).into_response())
}
