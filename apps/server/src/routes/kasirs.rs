//! Kasir directory endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/kasirs", get(list_kasirs).post(create_kasir))
}

#[derive(Debug, Deserialize)]
struct CreateKasirRequest {
    name: String,
}

async fn list_kasirs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kasirs = state.db.kasirs().list_active().await?;
    Ok(Json(kasirs))
}

async fn create_kasir(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateKasirRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let kasir = state.db.kasirs().create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(kasir)))
}
