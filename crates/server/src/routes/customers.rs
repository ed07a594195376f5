//! Customer API routes.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use punchcard_core::{Customer, CustomerId, PointsAward, StoreError};

use crate::error::Result;
use crate::state::AppState;

/// Request body for awarding points.
#[derive(Debug, Deserialize)]
pub struct AddPointsRequest {
    /// Points to add. Must be a positive integer.
    pub points: i64,
}

/// GET /api/customers
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    let customers = state.store().get_all().await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>> {
    let customer = state.store().get_by_id(CustomerId::new(id)).await?;
    Ok(Json(customer))
}

/// POST /api/customers/scan
pub async fn scan(State(state): State<AppState>) -> Result<Json<Customer>> {
    let customer = state.store().scan_random().await?;
    Ok(Json(customer))
}

/// POST /api/customers/{id}/points
pub async fn add_points(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AddPointsRequest>,
) -> Result<Json<PointsAward>> {
    // Negative and oversized amounts never reach the store.
    let amount =
        u32::try_from(body.points).map_err(|_| StoreError::InvalidAmount(body.points))?;

    let award = state
        .store()
        .add_points(CustomerId::new(id), amount)
        .await?;
    Ok(Json(award))
}
