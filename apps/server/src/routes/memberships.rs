//! Membership lookup, sale, extension, and redemption endpoints.
//!
//! The register checks entitlement through the public lookup before a
//! wash, then redeems through `/memberships/use`, which hands back the
//! usage record that a later checkout references as payment proof.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aqua_core::{Customer, Membership, MembershipStatus, MembershipType, Money};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/public/check-membership", post(check_membership))
        .route("/memberships", get(list_memberships).post(create_membership))
        .route("/memberships/:id/extend", put(extend_membership))
        .route("/memberships/:id/usages", get(membership_usages))
        .route("/memberships/use", post(use_membership))
}

/// Membership as the register sees it: the stored row plus the derived
/// status and a display-friendly countdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    #[serde(flatten)]
    pub membership: Membership,
    pub status: MembershipStatus,
    pub days_remaining: i64,
}

impl MembershipView {
    /// Projects a membership at the given instant. The countdown is
    /// clamped at zero here; the raw value stays internal.
    pub fn at(membership: Membership, now: DateTime<Utc>) -> Self {
        let status = membership.status(now);
        let days_remaining = membership.days_remaining(now).max(0);
        MembershipView {
            membership,
            status,
            days_remaining,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMembershipResponse {
    pub customer: Customer,
    pub memberships: Vec<MembershipView>,
}

#[derive(Debug, Deserialize)]
pub struct CheckMembershipRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembershipRequest {
    pub customer_id: String,
    pub membership_type: MembershipType,
    pub price_rupiah: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtendQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseMembershipRequest {
    pub phone: String,
    pub service_id: String,
    pub kasir_id: String,
}

async fn check_membership(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckMembershipRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let (customer, memberships) = state.db.memberships().lookup_by_phone(&req.phone).await?;
    let now = Utc::now();
    let memberships = memberships
        .into_iter()
        .map(|m| MembershipView::at(m, now))
        .collect();
    Ok(Json(CheckMembershipResponse {
        customer,
        memberships,
    }))
}

async fn list_memberships(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let memberships = state.db.memberships().list_all().await?;
    let now = Utc::now();
    let views: Vec<MembershipView> = memberships
        .into_iter()
        .map(|m| MembershipView::at(m, now))
        .collect();
    Ok(Json(views))
}

async fn create_membership(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMembershipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = state
        .db
        .memberships()
        .create(
            &req.customer_id,
            req.membership_type,
            Money::from_rupiah(req.price_rupiah),
            req.notes.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

async fn extend_membership(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ExtendQuery>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let days = query
        .days
        .ok_or_else(|| ApiError::validation("days query parameter is required"))?;
    let membership = state.db.memberships().extend(&id, days).await?;
    Ok(Json(membership))
}

async fn membership_usages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let usages = state.db.memberships().usages(&id).await?;
    Ok(Json(usages))
}

async fn use_membership(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UseMembershipRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let (usage, _membership) = state
        .db
        .memberships()
        .consume(&req.phone, &req.service_id, &req.kasir_id)
        .await?;
    Ok((StatusCode::CREATED, Json(usage)))
}

// ============================================================================
// Tests
// ============================================================================
