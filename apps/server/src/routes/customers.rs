//! Customer registry endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use aqua_db::{CustomerUpdate, NewCustomer};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/:id", get(get_customer).put(update_customer))
}

#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_number: Option<String>,
    pub vehicle_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_number: Option<String>,
    pub vehicle_type: Option<String>,
}

async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = state.db.customers().list(query.search.as_deref()).await?;
    Ok(Json(customers))
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .db
        .customers()
        .create(NewCustomer {
            name: req.name,
            phone: req.phone,
            email: req.email,
            vehicle_number: req.vehicle_number,
            vehicle_type: req.vehicle_type,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &id))?;
    Ok(Json(customer))
}

async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .db
        .customers()
        .update(
            &id,
            CustomerUpdate {
                name: req.name,
                phone: req.phone,
                email: req.email,
                vehicle_number: req.vehicle_number,
                vehicle_type: req.vehicle_type,
            },
        )
        .await?;
    Ok(Json(customer))
}

// ============================================================================
// Tests
// ============================================================================
