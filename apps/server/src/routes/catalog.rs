//! Service menu and product shelf endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use aqua_db::{NewProduct, NewService};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route("/public/services", get(list_services))
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock_products))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_rupiah: i64,
    pub duration_minutes: i64,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub category: Option<String>,
    pub price_rupiah: i64,
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: Option<String>,
}

async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state.db.catalog().list_services().await?;
    Ok(Json(services))
}

async fn create_service(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let service = state
        .db
        .catalog()
        .create_service(NewService {
            name: req.name,
            description: req.description,
            price_rupiah: req.price_rupiah,
            duration_minutes: req.duration_minutes,
            category: req.category,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.db.catalog().list_products().await?;
    Ok(Json(products))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .db
        .catalog()
        .create_product(NewProduct {
            name: req.name,
            category: req.category,
            price_rupiah: req.price_rupiah,
            current_stock: req.current_stock,
            min_stock: req.min_stock,
            unit: req.unit,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn low_stock_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.db.catalog().low_stock().await?;
    Ok(Json(products))
}

// ============================================================================
// Tests
// ============================================================================
