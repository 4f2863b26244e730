//! # Repository Module
//!
//! Database repository implementations for AquaPOS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.shifts().open("kasir-id", Money::from_rupiah(100_000))     │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ShiftRepository                                                       │
//! │  ├── open(&self, kasir_id, opening_balance)                            │
//! │  ├── current(&self, kasir_id)                                          │
//! │  ├── close(&self, shift_id, closing_balance, notes)                    │
//! │  └── list(&self, limit)                                                │
//! │       │                                                                 │
//! │       │  SQL inside ONE sqlx transaction per mutating flow             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Transactional flows are single methods, tested as units             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`kasir::KasirRepository`] - Cashier directory
//! - [`customer::CustomerRepository`] - Customer CRUD and phone lookup
//! - [`catalog::CatalogRepository`] - Services and products
//! - [`shift::ShiftRepository`] - Shift open/close with cash reconciliation
//! - [`membership::MembershipRepository`] - Membership engine
//! - [`transaction::TransactionRepository`] - Checkout and transaction history
//! - [`stats::StatsRepository`] - Dashboard aggregates

pub mod catalog;
pub mod customer;
pub mod kasir;
pub mod membership;
pub mod shift;
pub mod stats;
pub mod transaction;
