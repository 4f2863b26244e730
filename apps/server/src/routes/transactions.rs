//! Checkout and sales history endpoints.
//!
//! Checkout resolves the kasir's open shift before the engine runs, so
//! a register that forgot to open a drawer gets a clean refusal instead
//! of a dangling foreign key.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aqua_core::{CartLine, CoreError, Money, PaymentMethod, Transaction, TransactionItem};
use aqua_db::{CheckoutInput, TransactionFilter};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transactions", get(list_transactions).post(checkout))
        .route("/transactions/today", get(today_transactions))
        .route("/transactions/:id", get(get_transaction))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub kasir_id: String,
    pub customer_id: Option<String>,
    pub lines: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub payment_received: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    pub kasir_id: Option<String>,
    pub customer_id: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A transaction with its line items, as receipts render it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let shift = state
        .db
        .shifts()
        .current(&req.kasir_id)
        .await?
        .ok_or_else(|| {
            ApiError::from(CoreError::NoOpenShift {
                kasir_id: req.kasir_id.clone(),
            })
        })?;

    let input = CheckoutInput {
        kasir_id: req.kasir_id,
        customer_id: req.customer_id,
        lines: req.lines,
        payment_method: req.payment_method,
        payment_received: Money::from_rupiah(req.payment_received),
        notes: req.notes,
    };
    let (transaction, items) = state.db.transactions().checkout(&shift.id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionDetail { transaction, items }),
    ))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let (transaction, items) = state.db.transactions().get(&id).await?;
    Ok(Json(TransactionDetail { transaction, items }))
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let defaults = TransactionFilter::default();
    let filter = TransactionFilter {
        kasir_id: query.kasir_id,
        customer_id: query.customer_id,
        date_from: query.date_from,
        date_to: query.date_to,
        search: query.search,
        limit: query.limit.unwrap_or(defaults.limit),
        offset: query.offset.unwrap_or(defaults.offset),
    };
    let page = state.db.transactions().list(&filter).await?;
    Ok(Json(page))
}

async fn today_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions = state.db.transactions().today().await?;
    Ok(Json(transactions))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::routes::testing::state;
    use aqua_core::{Kasir, Service};
    use aqua_db::NewService;

    async fn seed_register(state: &Arc<AppState>) -> (Kasir, Service) {
        let kasir = state.db.kasirs().create("Budi").await.unwrap();
        state
            .db
            .shifts()
            .open(&kasir.id, Money::from_rupiah(100_000))
            .await
            .unwrap();
        let service = state
            .db
            .catalog()
            .create_service(NewService {
                name: "Cuci Express".to_string(),
                description: None,
                price_rupiah: 35_000,
                duration_minutes: 20,
                category: None,
            })
            .await
            .unwrap();
        (kasir, service)
    }

    fn wash_line(service: &Service) -> CartLine {
        CartLine::Service {
            service_id: service.id.clone(),
            name: service.name.clone(),
            unit_price_rupiah: service.price_rupiah,
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn test_checkout_without_open_shift_is_422() {
        let state = state().await;
        let kasir = state.db.kasirs().create("Budi").await.unwrap();

        let err = checkout(
            State(state),
            Json(CheckoutRequest {
                kasir_id: kasir.id,
                customer_id: None,
                lines: vec![],
                payment_method: PaymentMethod::Cash,
                payment_received: 50_000,
                notes: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoOpenShift);
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_checkout_returns_201_with_receipt_detail() {
        let state = state().await;
        let (kasir, service) = seed_register(&state).await;

        let response = checkout(
            State(state.clone()),
            Json(CheckoutRequest {
                kasir_id: kasir.id,
                customer_id: None,
                lines: vec![wash_line(&service)],
                payment_method: PaymentMethod::Cash,
                payment_received: 50_000,
                notes: None,
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let today = state.db.transactions().today().await.unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].transaction.total_rupiah, 35_000);
    }

    #[tokio::test]
    async fn test_detail_fetch_includes_line_items() {
        let state = state().await;
        let (kasir, service) = seed_register(&state).await;
        let shift = state.db.shifts().current(&kasir.id).await.unwrap().unwrap();
        let (tx, _) = state
            .db
            .transactions()
            .checkout(
                &shift.id,
                &CheckoutInput {
                    kasir_id: kasir.id.clone(),
                    customer_id: None,
                    lines: vec![wash_line(&service)],
                    payment_method: PaymentMethod::Cash,
                    payment_received: Money::from_rupiah(35_000),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let response = get_transaction(State(state), Path(tx.id))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_404() {
        let state = state().await;

        let err = get_transaction(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_applies_default_paging() {
        let state = state().await;
        let (kasir, service) = seed_register(&state).await;
        let shift = state.db.shifts().current(&kasir.id).await.unwrap().unwrap();
        state
            .db
            .transactions()
            .checkout(
                &shift.id,
                &CheckoutInput {
                    kasir_id: kasir.id.clone(),
                    customer_id: None,
                    lines: vec![wash_line(&service)],
                    payment_method: PaymentMethod::Cash,
                    payment_received: Money::from_rupiah(35_000),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let page = state
            .db
            .transactions()
            .list(&TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let response = list_transactions(
            State(state),
            Query(ListTransactionsQuery {
                kasir_id: Some(kasir.id),
                customer_id: None,
                date_from: None,
                date_to: None,
                search: None,
                limit: None,
                offset: None,
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
