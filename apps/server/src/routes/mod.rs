//! # Route Modules
//!
//! One module per resource, each exporting a `router()` that the
//! server nests under `/api`. Handlers stay thin: deserialize the
//! request, call a repository, serialize the result. Validation and
//! the transactional flows live below in aqua-core and aqua-db.

pub mod catalog;
pub mod customers;
pub mod dashboard;
pub mod kasirs;
pub mod memberships;
pub mod shifts;
pub mod transactions;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

/// Assembles the full `/api` router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(shifts::router())
        .merge(kasirs::router())
        .merge(customers::router())
        .merge(catalog::router())
        .merge(memberships::router())
        .merge(transactions::router())
        .merge(dashboard::router())
}
