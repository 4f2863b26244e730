//! # Transaction Repository
//!
//! Checkout and the immutable sale ledger.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Checkout (one DB transaction, all-or-nothing)              │
//! │                                                                         │
//! │  1. GATE       shift exists and is open; kasir exists;                  │
//! │                customer exists when given                               │
//! │  2. CART       non-empty, ≤ 100 lines, qty 1..=999, price ≥ 0           │
//! │  3. PROOFS     member-usage lines reference a redemption row no         │
//! │                earlier sale has claimed                                 │
//! │  4. SETTLE     subtotal = Σ line totals, total = subtotal,              │
//! │                change = received − total                                │
//! │                (total 0 ⇒ forced subscription / 0 / 0)                  │
//! │  5. INVOICE    INV-YYYYMMDD-NNNN, next in today's sequence              │
//! │  6. WRITE      header + item rows with frozen name/price snapshots      │
//! │                product lines decrement stock, guarded ≥ qty             │
//! │  7. CUSTOMER   total_visits += 1, total_spending += total               │
//! │                                                                         │
//! │  Any refusal rolls the whole thing back. Committed rows are never       │
//! │  updated or deleted; there is no void.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two checkouts can race on the day's invoice sequence. The loser
//! fails the unique index, and the retry wrapper re-runs the whole
//! attempt with a fresh read.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::catalog::{decrement_stock, require_service};
use crate::repository::kasir::require_kasir;
use crate::retry::with_write_retry;
use aqua_core::validation::{validate_notes, validate_search_query};
use aqua_core::{
    settle_payment, subtotal, validate_lines, CartLine, CoreError, Money, PaymentMethod, Shift,
    Transaction, TransactionItem,
};

/// Everything the register sends to ring up a sale.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub kasir_id: String,

    /// Absent for walk-ins.
    pub customer_id: Option<String>,

    pub lines: Vec<CartLine>,

    pub payment_method: PaymentMethod,

    pub payment_received: Money,

    pub notes: Option<String>,
}

/// Filters for the transaction history page.
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub kasir_id: Option<String>,
    pub customer_id: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        TransactionFilter {
            kasir_id: None,
            customer_id: None,
            date_from: None,
            date_to: None,
            search: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// A ledger row joined with kasir and customer names for listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub transaction: Transaction,
    pub kasir_name: String,
    pub customer_name: Option<String>,
}

/// One page of transaction history.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

const SUMMARY_COLUMNS: &str = "t.id, t.invoice_number, t.shift_id, t.kasir_id, t.customer_id, \
     t.subtotal_rupiah, t.total_rupiah, t.payment_method, \
     t.payment_received_rupiah, t.change_rupiah, t.notes, t.created_at, \
     k.name AS kasir_name, c.name AS customer_name";

const SUMMARY_JOINS: &str = "FROM transactions t \
     JOIN kasirs k ON k.id = t.kasir_id \
     LEFT JOIN customers c ON c.id = t.customer_id";

/// Repository for checkout and transaction history.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Rings up a sale against an open shift.
    ///
    /// The whole pipeline runs in one DB transaction and commits
    /// nothing on any refusal. Retried on lock contention and on a
    /// lost invoice-number race, re-validating everything each time.
    pub async fn checkout(
        &self,
        shift_id: &str,
        input: &CheckoutInput,
    ) -> DbResult<(Transaction, Vec<TransactionItem>)> {
        with_write_retry("checkout", || self.checkout_attempt(shift_id, input)).await
    }

    async fn checkout_attempt(
        &self,
        shift_id: &str,
        input: &CheckoutInput,
    ) -> DbResult<(Transaction, Vec<TransactionItem>)> {
        debug!(shift_id, lines = input.lines.len(), "Checkout started");

        let mut tx = self.pool.begin().await?;

        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, kasir_id, status,
                   opening_balance_rupiah, closing_balance_rupiah,
                   expected_balance_rupiah, variance_rupiah,
                   notes, opened_at, closed_at
            FROM shifts
            WHERE id = ?1
            "#,
        )
        .bind(shift_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Shift", shift_id))?;

        if !shift.is_open() {
            return Err(CoreError::NoOpenShift {
                kasir_id: shift.kasir_id.clone(),
            }
            .into());
        }

        let kasir = require_kasir(&mut tx, &input.kasir_id).await?;

        if let Some(customer_id) = &input.customer_id {
            let exists: Option<String> =
                sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
                    .bind(customer_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(DbError::not_found("Customer", customer_id));
            }
        }

        validate_lines(&input.lines)?;
        validate_notes(input.notes.as_deref()).map_err(CoreError::from)?;

        for line in &input.lines {
            if let Some(usage_id) = line.usage_id() {
                let usage: Option<String> =
                    sqlx::query_scalar("SELECT id FROM membership_usages WHERE id = ?1")
                        .bind(usage_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if usage.is_none() {
                    return Err(DbError::not_found("Membership usage", usage_id));
                }

                let claimed: Option<String> =
                    sqlx::query_scalar("SELECT id FROM transaction_items WHERE usage_id = ?1")
                        .bind(usage_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if claimed.is_some() {
                    return Err(CoreError::UsageAlreadySpent {
                        usage_id: usage_id.to_string(),
                    }
                    .into());
                }
            }
        }

        let settlement = settle_payment(
            subtotal(&input.lines),
            input.payment_method,
            input.payment_received,
        )?;

        let created_at = Utc::now();
        let invoice_number = next_invoice_number(&mut tx, created_at).await?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            invoice_number,
            shift_id: shift.id.clone(),
            kasir_id: kasir.id.clone(),
            customer_id: input.customer_id.clone(),
            subtotal_rupiah: settlement.subtotal.rupiah(),
            total_rupiah: settlement.total.rupiah(),
            payment_method: settlement.payment_method,
            payment_received_rupiah: settlement.payment_received.rupiah(),
            change_rupiah: settlement.change.rupiah(),
            notes: input.notes.clone(),
            created_at,
        };

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, invoice_number, shift_id, kasir_id, customer_id,
                subtotal_rupiah, total_rupiah, payment_method,
                payment_received_rupiah, change_rupiah, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.invoice_number)
        .bind(&transaction.shift_id)
        .bind(&transaction.kasir_id)
        .bind(&transaction.customer_id)
        .bind(transaction.subtotal_rupiah)
        .bind(transaction.total_rupiah)
        .bind(transaction.payment_method)
        .bind(transaction.payment_received_rupiah)
        .bind(transaction.change_rupiah)
        .bind(&transaction.notes)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.lines.len());
        for (idx, line) in input.lines.iter().enumerate() {
            match line {
                CartLine::Service { service_id, .. } => {
                    require_service(&mut tx, service_id).await?;
                }
                CartLine::Product {
                    product_id,
                    quantity,
                    ..
                } => {
                    decrement_stock(&mut tx, product_id, *quantity).await?;
                }
                CartLine::MemberUsage { .. } => {}
            }

            let item = TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction.id.clone(),
                line_no: idx as i64 + 1,
                line_type: line.line_type(),
                item_id: line.item_id().to_string(),
                name: line.name().to_string(),
                unit_price_rupiah: line.unit_price().rupiah(),
                quantity: line.quantity(),
                usage_id: line.usage_id().map(str::to_string),
                notes: None,
            };

            let insert = sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, line_no, line_type, item_id,
                    name, unit_price_rupiah, quantity, usage_id, notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(item.line_no)
            .bind(item.line_type)
            .bind(&item.item_id)
            .bind(&item.name)
            .bind(item.unit_price_rupiah)
            .bind(item.quantity)
            .bind(&item.usage_id)
            .bind(&item.notes)
            .execute(&mut *tx)
            .await;

            // A racing checkout may have claimed the usage after our
            // pre-check; the unique index is the authority
            if let Err(e) = insert {
                let db_err = DbError::from(e);
                if let DbError::UniqueViolation { field, .. } = &db_err {
                    if field.contains("usage_id") {
                        if let Some(usage_id) = line.usage_id() {
                            return Err(CoreError::UsageAlreadySpent {
                                usage_id: usage_id.to_string(),
                            }
                            .into());
                        }
                    }
                }
                return Err(db_err);
            }

            items.push(item);
        }

        if let Some(customer_id) = &input.customer_id {
            let result = sqlx::query(
                r#"
                UPDATE customers
                SET total_visits = total_visits + 1,
                    total_spending_rupiah = total_spending_rupiah + ?2
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(settlement.total.rupiah())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Customer", customer_id));
            }
        }

        tx.commit().await?;

        info!(
            invoice = %transaction.invoice_number,
            total = %settlement.total,
            method = ?transaction.payment_method,
            items = items.len(),
            "Checkout completed"
        );

        Ok((transaction, items))
    }

    /// A transaction with its receipt lines in order.
    pub async fn get(&self, id: &str) -> DbResult<(Transaction, Vec<TransactionItem>)> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, invoice_number, shift_id, kasir_id, customer_id,
                   subtotal_rupiah, total_rupiah, payment_method,
                   payment_received_rupiah, change_rupiah, notes, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Transaction", id))?;

        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, line_no, line_type, item_id,
                   name, unit_price_rupiah, quantity, usage_id, notes
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok((transaction, items))
    }

    /// One page of history, newest first, with the total row count
    /// for the same filters.
    pub async fn list(&self, filter: &TransactionFilter) -> DbResult<TransactionPage> {
        if let Some(search) = &filter.search {
            validate_search_query(search).map_err(CoreError::from)?;
        }
        let limit = filter.limit.clamp(1, 200);
        let offset = filter.offset.max(0);

        let mut count_query =
            QueryBuilder::new(format!("SELECT COUNT(*) {} WHERE 1=1", SUMMARY_JOINS));
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query = QueryBuilder::new(format!(
            "SELECT {} {} WHERE 1=1",
            SUMMARY_COLUMNS, SUMMARY_JOINS
        ));
        push_filters(&mut page_query, filter);
        page_query.push(" ORDER BY t.created_at DESC LIMIT ");
        page_query.push_bind(limit);
        page_query.push(" OFFSET ");
        page_query.push_bind(offset);

        let transactions = page_query
            .build_query_as::<TransactionSummary>()
            .fetch_all(&self.pool)
            .await?;

        debug!(
            returned = transactions.len(),
            total, "Listed transactions"
        );
        Ok(TransactionPage {
            transactions,
            total,
            limit,
            offset,
        })
    }

    /// Today's sales (UTC day), newest first.
    pub async fn today(&self) -> DbResult<Vec<TransactionSummary>> {
        let day_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let transactions = sqlx::query_as::<_, TransactionSummary>(&format!(
            "SELECT {} {} WHERE t.created_at >= ?1 AND t.created_at < ?2 \
             ORDER BY t.created_at DESC",
            SUMMARY_COLUMNS, SUMMARY_JOINS
        ))
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}

fn push_filters<'args>(query: &mut QueryBuilder<'args, Sqlite>, filter: &TransactionFilter) {
    if let Some(kasir_id) = &filter.kasir_id {
        query.push(" AND t.kasir_id = ").push_bind(kasir_id.clone());
    }
    if let Some(customer_id) = &filter.customer_id {
        query
            .push(" AND t.customer_id = ")
            .push_bind(customer_id.clone());
    }
    if let Some(from) = filter.date_from {
        query.push(" AND t.created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        query.push(" AND t.created_at <= ").push_bind(to);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.trim());
        query
            .push(" AND (t.invoice_number LIKE ")
            .push_bind(pattern.clone());
        query.push(" OR c.name LIKE ").push_bind(pattern.clone());
        query.push(" OR k.name LIKE ").push_bind(pattern);
        query.push(")");
    }
}

/// Allocates the next invoice number for the UTC day: INV-YYYYMMDD-NNNN.
///
/// NNNN continues from the highest number already issued today and
/// restarts at 0001 after midnight. Zero padding keeps the column
/// lexicographically ordered, so the DESC scan finds the latest.
/// Two concurrent allocations can pick the same number; the unique
/// index rejects the loser and the caller's retry gets a fresh read.
async fn next_invoice_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let prefix = format!("INV-{}-", now.format("%Y%m%d"));

    let last: Option<String> = sqlx::query_scalar(
        r#"
        SELECT invoice_number
        FROM transactions
        WHERE invoice_number LIKE ?1
        ORDER BY invoice_number DESC
        LIMIT 1
        "#,
    )
    .bind(format!("{}%", prefix))
    .fetch_optional(&mut **tx)
    .await?;

    let seq = last
        .as_deref()
        .and_then(|number| number.strip_prefix(&prefix))
        .and_then(|tail| tail.parse::<u32>().ok())
        .map_or(1, |n| n + 1);

    Ok(format!("{}{:04}", prefix, seq))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::catalog::{NewProduct, NewService};
    use crate::repository::customer::NewCustomer;
    use aqua_core::{Customer, Kasir, MembershipType, Product, Service};

    struct Fixture {
        db: Database,
        kasir: Kasir,
        shift: Shift,
        service: Service,
        product: Product,
        customer: Customer,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kasir = db.kasirs().create("Budi").await.unwrap();
        let shift = db
            .shifts()
            .open(&kasir.id, Money::from_rupiah(100_000))
            .await
            .unwrap();
        let service = db
            .catalog()
            .create_service(NewService {
                name: "Cuci Express".to_string(),
                description: None,
                price_rupiah: 35_000,
                duration_minutes: 30,
                category: None,
            })
            .await
            .unwrap();
        let product = db
            .catalog()
            .create_product(NewProduct {
                name: "Shampoo Mobil".to_string(),
                category: None,
                price_rupiah: 25_000,
                current_stock: 10,
                min_stock: 2,
                unit: Some("botol".to_string()),
            })
            .await
            .unwrap();
        let customer = db
            .customers()
            .create(NewCustomer {
                name: "Siti".to_string(),
                phone: "08123456789".to_string(),
                email: None,
                vehicle_number: Some("B 1234 XYZ".to_string()),
                vehicle_type: None,
            })
            .await
            .unwrap();

        Fixture {
            db,
            kasir,
            shift,
            service,
            product,
            customer,
        }
    }

    fn service_line(f: &Fixture) -> CartLine {
        CartLine::Service {
            service_id: f.service.id.clone(),
            name: f.service.name.clone(),
            unit_price_rupiah: f.service.price_rupiah,
            quantity: 1,
        }
    }

    fn product_line(f: &Fixture, quantity: i64) -> CartLine {
        CartLine::Product {
            product_id: f.product.id.clone(),
            name: f.product.name.clone(),
            unit_price_rupiah: f.product.price_rupiah,
            quantity,
        }
    }

    fn cash_input(f: &Fixture, lines: Vec<CartLine>, received: i64) -> CheckoutInput {
        CheckoutInput {
            kasir_id: f.kasir.id.clone(),
            customer_id: None,
            lines,
            payment_method: PaymentMethod::Cash,
            payment_received: Money::from_rupiah(received),
            notes: None,
        }
    }

    async fn transaction_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn current_stock(f: &Fixture) -> i64 {
        f.db.catalog()
            .get_product(&f.product.id)
            .await
            .unwrap()
            .unwrap()
            .current_stock
    }

    #[tokio::test]
    async fn test_cash_checkout_happy_path() {
        let f = fixture().await;
        let input = cash_input(&f, vec![service_line(&f), product_line(&f, 2)], 100_000);

        let (transaction, items) = f.db.transactions().checkout(&f.shift.id, &input).await.unwrap();

        // 35.000 + 2 x 25.000
        assert_eq!(transaction.subtotal_rupiah, 85_000);
        assert_eq!(transaction.total_rupiah, 85_000);
        assert_eq!(transaction.change_rupiah, 15_000);
        assert_eq!(transaction.payment_method, PaymentMethod::Cash);
        assert!(transaction.invoice_number.ends_with("-0001"));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].line_no, 1);
        assert_eq!(items[1].line_no, 2);
        assert_eq!(items[1].quantity, 2);

        assert_eq!(current_stock(&f).await, 8);
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential() {
        let f = fixture().await;

        let (first, _) = f
            .db
            .transactions()
            .checkout(&f.shift.id, &cash_input(&f, vec![service_line(&f)], 35_000))
            .await
            .unwrap();
        let (second, _) = f
            .db
            .transactions()
            .checkout(&f.shift.id, &cash_input(&f, vec![service_line(&f)], 35_000))
            .await
            .unwrap();

        assert!(first.invoice_number.ends_with("-0001"));
        assert!(second.invoice_number.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_zero_total_forces_subscription() {
        let f = fixture().await;
        db_membership(&f).await;
        let (usage, _) = f
            .db
            .memberships()
            .consume(&f.customer.phone, &f.service.id, &f.kasir.id)
            .await
            .unwrap();

        // Register claims cash; the zero total overrules it
        let input = CheckoutInput {
            kasir_id: f.kasir.id.clone(),
            customer_id: Some(f.customer.id.clone()),
            lines: vec![CartLine::MemberUsage {
                service_id: f.service.id.clone(),
                name: f.service.name.clone(),
                usage_id: usage.id.clone(),
            }],
            payment_method: PaymentMethod::Cash,
            payment_received: Money::from_rupiah(50_000),
            notes: None,
        };

        let (transaction, items) = f.db.transactions().checkout(&f.shift.id, &input).await.unwrap();

        assert_eq!(transaction.total_rupiah, 0);
        assert_eq!(transaction.payment_method, PaymentMethod::Subscription);
        assert_eq!(transaction.payment_received_rupiah, 0);
        assert_eq!(transaction.change_rupiah, 0);
        assert_eq!(items[0].unit_price_rupiah, 0);
        assert_eq!(items[0].usage_id.as_deref(), Some(usage.id.as_str()));
    }

    async fn db_membership(f: &Fixture) {
        f.db.memberships()
            .create(
                &f.customer.id,
                MembershipType::Monthly,
                Money::from_rupiah(150_000),
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_usage_can_price_exactly_one_line_ever() {
        let f = fixture().await;
        db_membership(&f).await;
        let (usage, _) = f
            .db
            .memberships()
            .consume(&f.customer.phone, &f.service.id, &f.kasir.id)
            .await
            .unwrap();

        let wash = |usage_id: String| CheckoutInput {
            kasir_id: f.kasir.id.clone(),
            customer_id: None,
            lines: vec![CartLine::MemberUsage {
                service_id: f.service.id.clone(),
                name: f.service.name.clone(),
                usage_id,
            }],
            payment_method: PaymentMethod::Subscription,
            payment_received: Money::zero(),
            notes: None,
        };

        f.db.transactions()
            .checkout(&f.shift.id, &wash(usage.id.clone()))
            .await
            .unwrap();

        let err = f
            .db
            .transactions()
            .checkout(&f.shift.id, &wash(usage.id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::UsageAlreadySpent { .. })
        ));

        let err = f
            .db
            .transactions()
            .checkout(&f.shift.id, &wash("no-such-usage".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert_eq!(transaction_count(&f.db).await, 1);
    }

    #[tokio::test]
    async fn test_insufficient_payment_rolls_back() {
        let f = fixture().await;
        let input = cash_input(&f, vec![service_line(&f), product_line(&f, 1)], 10_000);

        let err = f
            .db
            .transactions()
            .checkout(&f.shift.id, &input)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientPayment { .. })
        ));

        assert_eq!(transaction_count(&f.db).await, 0);
        assert_eq!(current_stock(&f).await, 10);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let f = fixture().await;
        let mut input = cash_input(&f, vec![service_line(&f), product_line(&f, 11)], 1_000_000);
        input.customer_id = Some(f.customer.id.clone());

        let err = f
            .db
            .transactions()
            .checkout(&f.shift.id, &input)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                requested: 11,
                available: 10,
                ..
            })
        ));

        assert_eq!(transaction_count(&f.db).await, 0);
        assert_eq!(current_stock(&f).await, 10);

        let customer = f
            .db
            .customers()
            .get_by_id(&f.customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_visits, 0);
        assert_eq!(customer.total_spending_rupiah, 0);
    }

    #[tokio::test]
    async fn test_empty_cart_refused() {
        let f = fixture().await;
        let input = cash_input(&f, vec![], 10_000);

        let err = f
            .db
            .transactions()
            .checkout(&f.shift.id, &input)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_closed_shift_refuses_checkout() {
        let f = fixture().await;
        f.db.shifts()
            .close(&f.shift.id, Money::from_rupiah(100_000), None)
            .await
            .unwrap();

        let err = f
            .db
            .transactions()
            .checkout(&f.shift.id, &cash_input(&f, vec![service_line(&f)], 35_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NoOpenShift { .. })
        ));

        let err = f
            .db
            .transactions()
            .checkout("missing", &cash_input(&f, vec![service_line(&f)], 35_000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_customer_accumulators() {
        let f = fixture().await;
        let mut input = cash_input(&f, vec![service_line(&f)], 35_000);
        input.customer_id = Some(f.customer.id.clone());

        f.db.transactions().checkout(&f.shift.id, &input).await.unwrap();
        f.db.transactions().checkout(&f.shift.id, &input).await.unwrap();

        let customer = f
            .db
            .customers()
            .get_by_id(&f.customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_visits, 2);
        assert_eq!(customer.total_spending_rupiah, 70_000);
    }

    #[tokio::test]
    async fn test_get_returns_ordered_items() {
        let f = fixture().await;
        let (transaction, _) = f
            .db
            .transactions()
            .checkout(
                &f.shift.id,
                &cash_input(&f, vec![service_line(&f), product_line(&f, 3)], 150_000),
            )
            .await
            .unwrap();

        let (fetched, items) = f.db.transactions().get(&transaction.id).await.unwrap();
        assert_eq!(fetched.invoice_number, transaction.invoice_number);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].line_no, 1);
        assert_eq!(items[0].name, "Cuci Express");
        assert_eq!(items[1].name, "Shampoo Mobil");

        let err = f.db.transactions().get("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let f = fixture().await;
        let other_kasir = f.db.kasirs().create("Andi").await.unwrap();
        let other_shift = f
            .db
            .shifts()
            .open(&other_kasir.id, Money::zero())
            .await
            .unwrap();

        f.db.transactions()
            .checkout(&f.shift.id, &cash_input(&f, vec![service_line(&f)], 35_000))
            .await
            .unwrap();
        f.db.transactions()
            .checkout(&f.shift.id, &cash_input(&f, vec![service_line(&f)], 35_000))
            .await
            .unwrap();

        let mut with_customer = cash_input(&f, vec![service_line(&f)], 35_000);
        with_customer.kasir_id = other_kasir.id.clone();
        with_customer.customer_id = Some(f.customer.id.clone());
        f.db.transactions()
            .checkout(&other_shift.id, &with_customer)
            .await
            .unwrap();

        let all = f
            .db
            .transactions()
            .list(&TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.transactions.len(), 3);

        let by_kasir = f
            .db
            .transactions()
            .list(&TransactionFilter {
                kasir_id: Some(f.kasir.id.clone()),
                ..TransactionFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_kasir.total, 2);

        let by_name = f
            .db
            .transactions()
            .list(&TransactionFilter {
                search: Some("Siti".to_string()),
                ..TransactionFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.total, 1);
        assert_eq!(by_name.transactions[0].customer_name.as_deref(), Some("Siti"));

        let paged = f
            .db
            .transactions()
            .list(&TransactionFilter {
                limit: 1,
                offset: 1,
                ..TransactionFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.total, 3);
        assert_eq!(paged.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_today_sees_fresh_sales() {
        let f = fixture().await;
        f.db.transactions()
            .checkout(&f.shift.id, &cash_input(&f, vec![service_line(&f)], 35_000))
            .await
            .unwrap();

        let today = f.db.transactions().today().await.unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].kasir_name, "Budi");
    }
}
