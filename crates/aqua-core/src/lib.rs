//! # aqua-core: Pure Business Logic for AquaPOS
//!
//! This crate is the **heart** of AquaPOS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AquaPOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Register / Admin Frontends                     │   │
//! │  │    Shift UI ──► POS Cart UI ──► Member Check ──► Receipt       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    aqua-server (axum)                           │   │
//! │  │    /api/shifts, /api/transactions, /api/memberships, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ aqua-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │   Shift   │  │   Money   │  │ CartLine  │  │   rules   │  │   │
//! │  │   │Membership │  │  rupiah   │  │Settlement │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    aqua-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Shift, Membership, Transaction, etc.)
//! - [`money`] - Money type with integer rupiah arithmetic (no floating point!)
//! - [`cart`] - Checkout lines, subtotal, and payment settlement
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole rupiah (i64) to avoid float errors
//! 4. **Derived State**: Membership status is computed from `end_date`, never stored
//!
//! ## Example Usage
//!
//! ```rust
//! use aqua_core::money::Money;
//! use aqua_core::cart::{settle_payment, CartLine, subtotal};
//! use aqua_core::types::PaymentMethod;
//!
//! let lines = vec![CartLine::Service {
//!     service_id: "svc-1".into(),
//!     name: "Exterior Wash".into(),
//!     unit_price_rupiah: 50_000,
//!     quantity: 1,
//! }];
//!
//! let settlement = settle_payment(
//!     subtotal(&lines),
//!     PaymentMethod::Cash,
//!     Money::from_rupiah(100_000),
//! ).unwrap();
//!
//! assert_eq!(settlement.change.rupiah(), 50_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use aqua_core::Money` instead of
// `use aqua_core::money::Money`

pub use cart::{settle_payment, subtotal, validate_lines, CartLine, Settlement};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single checkout
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Days-remaining threshold at or below which a membership reports
/// `expiring_soon` instead of `active`
pub const EXPIRING_SOON_DAYS: i64 = 7;
