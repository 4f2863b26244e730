//! Shift endpoints: open, close, current, history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use aqua_core::Money;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shifts", get(list_shifts))
        .route("/shifts/open", post(open_shift))
        .route("/shifts/close", post(close_shift))
        .route("/shifts/current/:kasir_id", get(current_shift))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenShiftRequest {
    kasir_id: String,
    /// Counted opening float in whole rupiah.
    opening_balance: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloseShiftRequest {
    shift_id: String,
    /// Counted drawer in whole rupiah.
    closing_balance: i64,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListShiftsQuery {
    limit: Option<i64>,
}

async fn open_shift(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenShiftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = state
        .db
        .shifts()
        .open(&req.kasir_id, Money::from_rupiah(req.opening_balance))
        .await?;
    Ok((StatusCode::CREATED, Json(shift)))
}

async fn close_shift(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CloseShiftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = state
        .db
        .shifts()
        .close(
            &req.shift_id,
            Money::from_rupiah(req.closing_balance),
            req.notes.as_deref(),
        )
        .await?;
    Ok(Json(shift))
}

async fn current_shift(
    State(state): State<Arc<AppState>>,
    Path(kasir_id): Path<String>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let shift = state
        .db
        .shifts()
        .current(&kasir_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Open shift for kasir", &kasir_id))?;
    Ok(Json(shift))
}

async fn list_shifts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListShiftsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let shifts = state.db.shifts().list(query.limit.unwrap_or(50)).await?;
    Ok(Json(shifts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing;

    #[tokio::test]
    async fn test_open_shift_returns_201() {
        let state = testing::state().await;
        let kasir = state.db.kasirs().create("Budi").await.unwrap();

        let response = open_shift(
            State(state.clone()),
            Json(OpenShiftRequest {
                kasir_id: kasir.id.clone(),
                opening_balance: 100_000,
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_current_shift_404_when_none() {
        let state = testing::state().await;
        let kasir = state.db.kasirs().create("Budi").await.unwrap();

        let err = current_shift(State(state.clone()), Path(kasir.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_close_reports_variance() {
        let state = testing::state().await;
        let kasir = state.db.kasirs().create("Budi").await.unwrap();
        let shift = state
            .db
            .shifts()
            .open(&kasir.id, Money::from_rupiah(100_000))
            .await
            .unwrap();

        let response = close_shift(
            State(state.clone()),
            Json(CloseShiftRequest {
                shift_id: shift.id,
                closing_balance: 90_000,
                notes: None,
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
