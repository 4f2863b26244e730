//! # aqua-db: Database Layer for AquaPOS
//!
//! This crate provides database access for the AquaPOS car wash system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AquaPOS Data Flow                                │
//! │                                                                         │
//! │  HTTP Handler (POST /api/transactions)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      aqua-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (shift.rs ...) │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ShiftRepo      │    │ 001_init.sql │  │   │
//! │  │   │ WAL + busy    │◄───│ TransactionRepo│    │ 002_idx.sql  │  │   │
//! │  │   │ timeout       │    │ MembershipRepo │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./data/aquapos.db                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`retry`] - Write retry for lock contention and invoice races
//! - [`repository`] - Repository implementations (shift, transaction, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aqua_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("data/aquapos.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let shift = db.shifts().open("kasir-id", Money::from_rupiah(100_000)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::{CatalogRepository, NewProduct, NewService};
pub use repository::customer::{CustomerRepository, CustomerUpdate, NewCustomer};
pub use repository::kasir::KasirRepository;
pub use repository::membership::MembershipRepository;
pub use repository::shift::{ShiftRepository, ShiftWithKasir};
pub use repository::stats::{DashboardStats, KasirPerformance, StatsRepository};
pub use repository::transaction::{
    CheckoutInput, TransactionFilter, TransactionPage, TransactionRepository, TransactionSummary,
};
