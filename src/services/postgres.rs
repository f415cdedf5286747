use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

use crate::models::Participant;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Pairing conflict: {0}")]
    PairConflict(String),
}

impl StoreError {
    /// Whether the caller can expect a retry of the same operation to work
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::PairConflict(_))
    }
}

const PARTICIPANT_COLUMNS: &str =
    "id, name, phone, latitude, longitude, matched_with, created_at";

/// PostgreSQL store for participants and their match links
///
/// The match relation is kept symmetric at the storage layer: both sides of
/// a pair are written in one transaction, and deletion unlinks the partner
/// in the same transaction that removes the row.
pub struct ParticipantStore {
    pool: PgPool,
}

impl ParticipantStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Create or update a participant, keyed by phone
    ///
    /// A resubmission with a known phone updates name and position in place;
    /// the id and any existing match link survive the update.
    pub async fn upsert_by_phone(
        &self,
        name: &str,
        phone: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Participant, StoreError> {
        let query = format!(
            r#"
            INSERT INTO participants (name, phone, latitude, longitude)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (phone)
            DO UPDATE SET
                name = EXCLUDED.name,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                updated_at = NOW()
            RETURNING {PARTICIPANT_COLUMNS}
        "#
        );

        let participant = sqlx::query_as::<_, Participant>(&query)
            .bind(name)
            .bind(phone)
            .bind(latitude)
            .bind(longitude)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            "Upserted participant {} ({})",
            participant.id,
            participant.phone
        );

        Ok(participant)
    }

    /// Full population, ordered by id (the engine's scan order)
    pub async fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        let query = format!(
            r#"
            SELECT {PARTICIPANT_COLUMNS}
            FROM participants
            ORDER BY id
        "#
        );

        let participants = sqlx::query_as::<_, Participant>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(participants)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Participant>, StoreError> {
        let query = format!(
            r#"
            SELECT {PARTICIPANT_COLUMNS}
            FROM participants
            WHERE phone = $1
        "#
        );

        let participant = sqlx::query_as::<_, Participant>(&query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(participant)
    }

    /// Link two participants as a pair
    ///
    /// Both `matched_with` sides are written in one transaction, each update
    /// guarded with `matched_with IS NULL`. If either side was claimed by a
    /// concurrent submission the whole transaction rolls back and the caller
    /// gets a retryable `PairConflict` instead of a one-sided link.
    pub async fn record_pair(&self, a: i64, b: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = r#"
            UPDATE participants
            SET matched_with = $2, updated_at = NOW()
            WHERE id = $1 AND matched_with IS NULL
        "#;

        let first = sqlx::query(query).bind(a).bind(b).execute(&mut *tx).await?;
        if first.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(StoreError::PairConflict(format!(
                "participant {} is missing or already matched",
                a
            )));
        }

        let second = sqlx::query(query).bind(b).bind(a).execute(&mut *tx).await?;
        if second.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(StoreError::PairConflict(format!(
                "participant {} is missing or already matched",
                b
            )));
        }

        tx.commit().await?;

        tracing::info!("Paired participants {} and {}", a, b);

        Ok(())
    }

    /// Remove a participant and unlink its partner, if any
    ///
    /// Returns false when the id does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE participants
            SET matched_with = NULL, updated_at = NOW()
            WHERE matched_with = $1
        "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("Deleted participant {}", id);
        }

        Ok(deleted)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_conflict_is_retryable() {
        let err = StoreError::PairConflict("participant 3 is missing or already matched".into());
        assert!(err.is_retryable());
        assert!(!StoreError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound("participant 9".to_string());
        assert_eq!(err.to_string(), "Not found: participant 9");
    }
}
