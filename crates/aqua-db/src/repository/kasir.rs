//! # Kasir Repository
//!
//! Directory of cashiers. A projection of the external identity system:
//! shifts and transactions reference kasirs by id, and receipts and the
//! shift history display their names from here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use aqua_core::validation::validate_name;
use aqua_core::Kasir;

/// Repository for kasir directory operations.
#[derive(Debug, Clone)]
pub struct KasirRepository {
    pool: SqlitePool,
}

impl KasirRepository {
    /// Creates a new KasirRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KasirRepository { pool }
    }

    /// Registers a kasir in the directory.
    pub async fn create(&self, name: &str) -> DbResult<Kasir> {
        validate_name(name).map_err(aqua_core::CoreError::from)?;

        let kasir = Kasir {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %kasir.id, name = %kasir.name, "Creating kasir");

        sqlx::query(
            r#"
            INSERT INTO kasirs (id, name, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&kasir.id)
        .bind(&kasir.name)
        .bind(kasir.is_active)
        .bind(kasir.created_at)
        .execute(&self.pool)
        .await?;

        Ok(kasir)
    }

    /// Gets a kasir by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Kasir>> {
        let kasir = sqlx::query_as::<_, Kasir>(
            r#"
            SELECT id, name, is_active, created_at
            FROM kasirs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(kasir)
    }

    /// Lists active kasirs, alphabetical.
    pub async fn list_active(&self) -> DbResult<Vec<Kasir>> {
        let kasirs = sqlx::query_as::<_, Kasir>(
            r#"
            SELECT id, name, is_active, created_at
            FROM kasirs
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(kasirs)
    }

    /// Deactivates a kasir (they can no longer open shifts).
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE kasirs SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Kasir", id));
        }

        Ok(())
    }
}

/// Fetches a kasir inside an open transaction, erroring if unknown.
///
/// Shared by the flows (shift open, consume, checkout) that must pin the
/// kasir row within their own transaction scope.
pub(crate) async fn require_kasir(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    kasir_id: &str,
) -> DbResult<Kasir> {
    let kasir = sqlx::query_as::<_, Kasir>(
        r#"
        SELECT id, name, is_active, created_at
        FROM kasirs
        WHERE id = ?1
        "#,
    )
    .bind(kasir_id)
    .fetch_optional(&mut **tx)
    .await?;

    kasir.ok_or_else(|| DbError::not_found("Kasir", kasir_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_get_kasir() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let kasir = db.kasirs().create("Budi").await.unwrap();
        assert!(kasir.is_active);

        let found = db.kasirs().get_by_id(&kasir.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Budi");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.kasirs().create("  ").await.is_err());
    }

    #[tokio::test]
    async fn test_list_active_excludes_deactivated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let a = db.kasirs().create("Andi").await.unwrap();
        let _b = db.kasirs().create("Budi").await.unwrap();

        db.kasirs().deactivate(&a.id).await.unwrap();

        let active = db.kasirs().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Budi");
    }

    #[tokio::test]
    async fn test_deactivate_unknown_kasir_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.kasirs().deactivate("missing").await.is_err());
    }
}
