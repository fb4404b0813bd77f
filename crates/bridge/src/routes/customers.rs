//! Administrative customer routes.
//!
//! Customers are created by the provisioning webhook, never through this
//! API; these routes exist for support staff to inspect and correct records
//! (codes are read-only here).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::instrument;

use crate::db::{self, Customer, UpdateCustomer};
use crate::error::AppError;
use crate::state::AppState;

/// Build the administrative customer router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/customers/{id}",
        get(get_customer).put(update_customer).delete(delete_customer),
    )
}

fn customer_view(customer: &Customer) -> serde_json::Value {
    json!({
        "id": customer.id,
        "partner_customer_id": customer.partner_customer_id,
        "display_name": customer.display_name,
        "simple_code": customer.simple_code,
        "signature_code": customer.signature_code,
        "email": customer.email,
    })
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Customer not found" })),
    )
        .into_response()
}

/// GET /customers/{id} - fetch a customer record.
#[instrument(skip(state))]
async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let Some(customer) = db::customers::get_customer(state.pool(), id).await? else {
        return Ok(not_found());
    };

    Ok(Json(customer_view(&customer)).into_response())
}

/// PUT /customers/{id} - partial update of a customer record.
#[instrument(skip(state, update))]
async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<UpdateCustomer>,
) -> Result<Response, AppError> {
    match db::customers::update_customer(state.pool(), id, update).await {
        Ok(customer) => Ok(Json(customer_view(&customer)).into_response()),
        Err(crate::db::RepositoryError::NotFound) => Ok(not_found()),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /customers/{id} - remove a customer record.
#[instrument(skip(state))]
async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    if db::customers::delete_customer(state.pool(), id).await? {
        Ok(Json(json!({ "status": "deleted" })).into_response())
    } else {
        Ok(not_found())
    }
}
